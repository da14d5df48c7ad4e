#![forbid(unsafe_code)]

//! Camera controller: view modes and smoothed motion.
//!
//! The controller keeps a *target* pose (where the camera wants to be) and
//! a *current* pose (what the renderer uses). Every tick, the current pose
//! moves 10% of the remaining distance toward the target — plain
//! exponential smoothing, intentionally simpler than a damped spring, and
//! stable for any time step.
//!
//! # View restore
//!
//! Entering a focused view saves the prior (mode, target) into a one-slot
//! "previous view" — not a stack; only the last non-overlay view is
//! restorable. A prior mode of `FolderExpanded` or `WidgetFocus` is never
//! saved, so overlays cannot nest into the restore slot.
//!
//! # Default-mode depth
//!
//! In `Default` mode, panning past the lateral bound widens the field of
//! view (up to a cap) instead of moving the eye back, so panning never
//! changes apparent camera depth.

use glam::{Mat4, Vec3};
use roomdesk_core::config::RoomBounds;
use roomdesk_core::item::Surface;
use roomdesk_core::scene::WidgetId;

/// Per-tick fraction of the remaining distance covered.
pub const CAMERA_APPROACH: f32 = 0.1;

/// Field of view in degrees when nothing forces it wider.
pub const DEFAULT_FOV_DEG: f32 = 45.0;

/// Widest the default view will go before clamping.
pub const MAX_FOV_DEG: f32 = 70.0;

/// Lateral pan distance in default view before FOV widening kicks in.
const PAN_LIMIT: f32 = 10.0;

/// Degrees of FOV gained per unit of pan beyond the limit.
const FOV_WIDEN_PER_UNIT: f32 = 2.0;

const DEFAULT_EYE: Vec3 = Vec3::new(0.0, 12.0, 25.0);
const DEFAULT_LOOK: Vec3 = Vec3::new(0.0, 0.0, 5.0);

/// How far the eye sits from a focused wall, folder, or widget.
const FOCUS_DISTANCE: f32 = 9.0;

/// Camera view-mode state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Default,
    Floor,
    BackWall,
    LeftWall,
    RightWall,
    FolderExpanded,
    WidgetFocus,
}

impl ViewMode {
    /// Overlay views are never saved as the restorable previous view.
    #[must_use]
    pub const fn is_overlay(self) -> bool {
        matches!(self, ViewMode::FolderExpanded | ViewMode::WidgetFocus)
    }
}

#[derive(Debug, Clone, Copy)]
struct SavedView {
    mode: ViewMode,
    target_pos: Vec3,
    target_look: Vec3,
}

/// View-mode state machine plus smoothed camera pose.
#[derive(Debug, Clone)]
pub struct CameraController {
    mode: ViewMode,
    target_pos: Vec3,
    target_look: Vec3,
    current_pos: Vec3,
    current_look: Vec3,
    /// Pinch zoom: fraction of the eye-to-look distance retained. 1.0 is
    /// no zoom; smaller values move the effective eye toward the look-at.
    zoom: f32,
    fov_deg: f32,
    previous: Option<SavedView>,
    /// Widget receiving passthrough input while in `WidgetFocus`.
    focused_widget: Option<WidgetId>,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraController {
    /// Camera at the default room view, current pose equal to target.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mode: ViewMode::Default,
            target_pos: DEFAULT_EYE,
            target_look: DEFAULT_LOOK,
            current_pos: DEFAULT_EYE,
            current_look: DEFAULT_LOOK,
            zoom: 1.0,
            fov_deg: DEFAULT_FOV_DEG,
            previous: None,
            focused_widget: None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Smoothed eye position (what the renderer uses this frame).
    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.current_pos
    }

    /// Smoothed look-at point.
    #[inline]
    #[must_use]
    pub fn look_at(&self) -> Vec3 {
        self.current_look
    }

    #[inline]
    #[must_use]
    pub fn fov_deg(&self) -> f32 {
        self.fov_deg
    }

    #[inline]
    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    #[must_use]
    pub fn focused_widget(&self) -> Option<WidgetId> {
        self.focused_widget
    }

    /// Set the pinch-zoom level, clamped to a sane range.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(0.2, 1.5);
    }

    /// View matrix for the current smoothed pose.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.current_pos, self.current_look, Vec3::Y)
    }

    /// Projection matrix for the given viewport aspect ratio.
    #[must_use]
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_deg.to_radians(), aspect.max(1e-3), 0.1, 200.0)
    }

    // ------------------------------------------------------------------
    // Per-tick update
    // ------------------------------------------------------------------

    /// Move the current pose 10% of the way toward the (zoom-adjusted)
    /// target pose.
    pub fn update(&mut self) {
        let effective = self.target_look + (self.target_pos - self.target_look) * self.zoom;
        self.current_pos += (effective - self.current_pos) * CAMERA_APPROACH;
        self.current_look += (self.target_look - self.current_look) * CAMERA_APPROACH;
    }

    // ------------------------------------------------------------------
    // View transitions
    // ------------------------------------------------------------------

    fn save_previous(&mut self) {
        if !self.mode.is_overlay() {
            self.previous = Some(SavedView {
                mode: self.mode,
                target_pos: self.target_pos,
                target_look: self.target_look,
            });
        }
    }

    /// Return to the default room view (no restore slot involved).
    pub fn set_default(&mut self) {
        self.mode = ViewMode::Default;
        self.target_pos = DEFAULT_EYE;
        self.target_look = DEFAULT_LOOK;
        self.focused_widget = None;
    }

    /// Face a wall or the floor head-on.
    pub fn focus_on_surface(&mut self, surface: Surface, room: &RoomBounds) {
        self.save_previous();
        let h = room.half_extent;
        let mid = room.height * 0.4;
        let (mode, look, eye) = match surface {
            Surface::Floor => (
                ViewMode::Floor,
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, FOCUS_DISTANCE * 1.4, 0.01),
            ),
            Surface::BackWall => (
                ViewMode::BackWall,
                Vec3::new(0.0, mid, -h),
                Vec3::new(0.0, mid, -h + FOCUS_DISTANCE),
            ),
            Surface::LeftWall => (
                ViewMode::LeftWall,
                Vec3::new(-h, mid, 0.0),
                Vec3::new(-h + FOCUS_DISTANCE, mid, 0.0),
            ),
            Surface::RightWall => (
                ViewMode::RightWall,
                Vec3::new(h, mid, 0.0),
                Vec3::new(h - FOCUS_DISTANCE, mid, 0.0),
            ),
        };
        tracing::debug!(?mode, "camera focusing surface");
        self.mode = mode;
        self.target_look = look;
        self.target_pos = eye;
        self.focused_widget = None;
    }

    /// Hover over an expanded pile (open folder).
    pub fn focus_on_folder(&mut self, anchor: Vec3) {
        self.save_previous();
        self.mode = ViewMode::FolderExpanded;
        self.target_look = Vec3::new(anchor.x, 3.0, anchor.z);
        self.target_pos = Vec3::new(anchor.x, 3.0 + FOCUS_DISTANCE * 0.8, anchor.z + FOCUS_DISTANCE * 0.6);
        self.focused_widget = None;
    }

    /// Face an embedded widget for passthrough interaction.
    pub fn focus_on_widget(&mut self, id: WidgetId, position: Vec3, surface: Surface) {
        self.save_previous();
        self.mode = ViewMode::WidgetFocus;
        self.target_look = position;
        self.target_pos = position + surface.normal() * FOCUS_DISTANCE;
        self.focused_widget = Some(id);
    }

    /// Restore the saved previous view; resets zoom and FOV.
    ///
    /// Falls back to the default view if nothing was saved.
    pub fn restore_previous_view(&mut self) {
        match self.previous.take() {
            Some(saved) => {
                self.mode = saved.mode;
                self.target_pos = saved.target_pos;
                self.target_look = saved.target_look;
            }
            None => self.set_default(),
        }
        self.zoom = 1.0;
        self.fov_deg = DEFAULT_FOV_DEG;
        self.focused_widget = None;
    }

    // ------------------------------------------------------------------
    // Pan / tilt
    // ------------------------------------------------------------------

    /// Pan the view. The deltas are interpreted per active view, because
    /// each wall view is a different 2D sub-plane of the room: the back
    /// wall pans along world X/Y, the side walls along world Z/Y, floor
    /// and default views along world X/Z.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let delta = match self.mode {
            ViewMode::Default | ViewMode::Floor | ViewMode::FolderExpanded => {
                Vec3::new(dx, 0.0, dy)
            }
            ViewMode::BackWall => Vec3::new(dx, dy, 0.0),
            ViewMode::LeftWall | ViewMode::RightWall => Vec3::new(0.0, dy, dx),
            ViewMode::WidgetFocus => return,
        };
        self.target_pos += delta;
        self.target_look += delta;

        if self.mode == ViewMode::Default {
            self.widen_instead_of_receding();
        }
    }

    /// Tilt the look-at point vertically.
    pub fn tilt(&mut self, dy: f32) {
        self.target_look.y = (self.target_look.y + dy).clamp(-2.0, 14.0);
    }

    /// Default-view rule: lateral pan past the bound converts to FOV
    /// widening rather than pulling the eye back.
    fn widen_instead_of_receding(&mut self) {
        let lateral = Vec3::new(
            self.target_pos.x - DEFAULT_EYE.x,
            0.0,
            self.target_pos.z - DEFAULT_EYE.z,
        );
        let len = lateral.length();
        if len > PAN_LIMIT {
            let excess = len - PAN_LIMIT;
            let pullback = lateral * (PAN_LIMIT / len) - lateral;
            self.target_pos += pullback;
            self.target_look += pullback;
            self.fov_deg = (self.fov_deg + excess * FOV_WIDEN_PER_UNIT).min(MAX_FOV_DEG);
        }
    }
}
