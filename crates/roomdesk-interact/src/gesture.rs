#![forbid(unsafe_code)]

//! Gesture state machine: pointer events in, scene mutations and
//! feedback events out.
//!
//! One engine instance tracks one active pointer. A pointer-down hit
//! tests widgets first (corner resize beats grab), then items, then arms
//! a lasso anchor in free-look views. Movement stays inert until the
//! tap-vs-drag slop is exceeded; past it, a pile member under mostly
//! vertical motion leafs through its pile, anything else drags.
//!
//! # Invariants
//!
//! 1. A second pointer touching down cancels every single-finger state
//!    and clears both drag pointers on the scene; partially completed
//!    gestures never leak into the next interaction.
//! 2. The engine runs on the same serialized queue as the physics tick,
//!    so scene access here never races the solver.
//! 3. Hit tests are pure; all mutation happens in the explicit
//!    transitions below.

use glam::{Vec2, Vec3};
use roomdesk_core::config::SimConfig;
use roomdesk_core::events::{FeedbackEvent, PointerEvent, PointerPhase, WidgetInput};
use roomdesk_core::geometry::{Ray, point_in_polygon_xz};
use roomdesk_core::item::Surface;
use roomdesk_core::scene::{ItemId, PileId, SceneState, WidgetId};
use roomdesk_core::widget::WidgetItem;
use roomdesk_sim::camera::{CameraController, ViewMode};

use crate::raycast::{hit_test_items, hit_test_surface, hit_test_widgets, ray_from_screen};
use crate::undo::{Command, History};

/// Gesture tunables. Pixel thresholds assume a touch display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Tap-vs-drag slop in pixels.
    pub drag_slop_px: f32,
    /// Vertical motion must exceed this multiple of horizontal motion to
    /// count as leafing.
    pub leaf_axis_ratio: f32,
    /// Minimum vertical travel in pixels before leafing starts.
    pub leaf_min_px: f32,
    /// Vertical travel per leaf step.
    pub leaf_step_px: f32,
    /// Release distance from a pile anchor that triggers an add offer.
    pub pile_offer_distance: f32,
    /// Fraction of the remaining distance a dragged item covers per move.
    pub drag_chase: f32,
    /// Normal offset (times item scale) a dragged item floats off its
    /// mounting surface.
    pub drag_lift: f32,
    /// Minimum spacing between accumulated lasso vertices.
    pub lasso_min_segment: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_slop_px: 15.0,
            leaf_axis_ratio: 2.5,
            leaf_min_px: 30.0,
            leaf_step_px: 80.0,
            pile_offer_distance: 1.5,
            drag_chase: 0.5,
            drag_lift: 0.3,
            lasso_min_segment: 0.2,
        }
    }
}

/// Everything a pointer event needs to act on.
pub struct PointerContext<'a> {
    pub scene: &'a mut SceneState,
    pub camera: &'a CameraController,
    pub config: &'a SimConfig,
    pub history: &'a mut History,
    /// Viewport size in pixels.
    pub viewport: Vec2,
}

#[derive(Debug, Clone)]
enum GestureState {
    Idle,
    /// Item under the pointer, slop not yet exceeded.
    PendingItem { item: ItemId, down: Vec2 },
    /// Background touch in a free-look view, slop not yet exceeded.
    PendingLasso { down: Vec2 },
    Dragging {
        item: ItemId,
        pile: Option<PileId>,
        /// Whether the whole pile follows the drag (member of a
        /// non-expanded pile).
        follow_pile: bool,
        start_position: Vec3,
        start_surface: Surface,
        start_pinned: bool,
    },
    Leafing {
        pile: PileId,
        down_y: f32,
        applied_steps: i64,
    },
    DraggingWidget { widget: WidgetId },
    ResizingWidget {
        widget: WidgetId,
        start_half: Vec2,
        start_coords: Vec2,
        grab_sign: Vec2,
    },
    Lasso { points: Vec<Vec3> },
    /// Forwarding input to the focused widget view.
    WidgetPassthrough {
        widget: WidgetId,
        widget_id: u64,
        last_uv: Vec2,
    },
}

/// Per-pointer gesture engine.
#[derive(Debug)]
pub struct GestureEngine {
    config: GestureConfig,
    state: GestureState,
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl GestureEngine {
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: GestureState::Idle,
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    /// Cancel any in-flight gesture and clear the scene's drag pointers.
    pub fn reset(&mut self, scene: &mut SceneState) {
        if !self.is_idle() {
            tracing::debug!("gesture cancelled");
        }
        scene.dragged_item = None;
        scene.dragged_widget = None;
        self.state = GestureState::Idle;
    }

    /// Feed one pointer event through the state machine.
    ///
    /// Returns the feedback events produced by this transition; the
    /// caller forwards them to the feedback sink.
    pub fn handle(&mut self, event: PointerEvent, ctx: &mut PointerContext<'_>) -> Vec<FeedbackEvent> {
        let mut out = Vec::new();
        if event.pointer_count >= 2 {
            // Multi-touch routes to pan/zoom handling elsewhere.
            self.reset(ctx.scene);
            return out;
        }
        match event.phase {
            PointerPhase::Down => self.on_down(event.screen, ctx, &mut out),
            PointerPhase::Move => self.on_move(event.screen, ctx, &mut out),
            PointerPhase::Up => self.on_up(event.screen, ctx, &mut out),
        }
        out
    }

    // ------------------------------------------------------------------
    // Pointer down
    // ------------------------------------------------------------------

    fn on_down(&mut self, screen: Vec2, ctx: &mut PointerContext<'_>, out: &mut Vec<FeedbackEvent>) {
        let Some(ray) = ray_from_screen(screen, ctx.viewport, ctx.camera) else {
            return;
        };

        // Widget-focus mode swallows input: touches on the focused widget
        // become synthetic events for its embedded view.
        if ctx.camera.mode() == ViewMode::WidgetFocus {
            if let Some(widget) = ctx.camera.focused_widget()
                && let Some(w) = ctx.scene.widget(widget)
                && let Some(uv) = plane_point(w, ray).and_then(|p| w.uv_at(p))
            {
                let widget_id = w.widget_id;
                out.push(FeedbackEvent::Widget(WidgetInput {
                    widget_id,
                    phase: PointerPhase::Down,
                    uv,
                }));
                self.state = GestureState::WidgetPassthrough {
                    widget,
                    widget_id,
                    last_uv: uv,
                };
            }
            return;
        }

        // Widgets are "on top": their hit test strictly precedes items.
        if let Some(hit) = hit_test_widgets(ctx.scene, ray) {
            ctx.scene.dragged_widget = Some(hit.id);
            if hit.is_corner() {
                let Some(w) = ctx.scene.widget(hit.id) else {
                    return;
                };
                let rel = hit.point - w.position;
                let coords = Vec2::new(
                    rel.dot(w.surface.primary_axis()),
                    rel.dot(w.surface.secondary_axis()),
                );
                tracing::debug!(widget = hit.id.0, "widget corner resize");
                self.state = GestureState::ResizingWidget {
                    widget: hit.id,
                    start_half: w.half_extent(),
                    start_coords: coords,
                    grab_sign: Vec2::new(coords.x.signum(), coords.y.signum()),
                };
            } else {
                tracing::debug!(widget = hit.id.0, "widget grab");
                self.state = GestureState::DraggingWidget { widget: hit.id };
            }
            return;
        }

        if let Some((item, _)) = hit_test_items(ctx.scene, ray) {
            ctx.scene.selection = vec![item];
            self.state = GestureState::PendingItem { item, down: screen };
            return;
        }

        // Background touch: arm a lasso anchor, but only in free-look
        // views. Not yet committed, so a plain tap never lassoes.
        if matches!(ctx.camera.mode(), ViewMode::Default | ViewMode::Floor) {
            self.state = GestureState::PendingLasso { down: screen };
        }
    }

    // ------------------------------------------------------------------
    // Pointer move
    // ------------------------------------------------------------------

    fn on_move(&mut self, screen: Vec2, ctx: &mut PointerContext<'_>, out: &mut Vec<FeedbackEvent>) {
        let state = std::mem::replace(&mut self.state, GestureState::Idle);
        match state {
            GestureState::Idle => {}

            GestureState::PendingItem { item, down } => {
                let delta = screen - down;
                let pile = ctx.scene.pile_of(item);
                let expanded = pile
                    .and_then(|pid| ctx.scene.pile(pid))
                    .is_some_and(|p| p.expanded);
                let vertical = delta.y.abs() > self.config.leaf_axis_ratio * delta.x.abs()
                    && delta.y.abs() > self.config.leaf_min_px;
                if let Some(pid) = pile
                    && !expanded
                    && vertical
                {
                    tracing::debug!(pile = pid.0, "leafing started");
                    let mut next = GestureState::Leafing {
                        pile: pid,
                        down_y: down.y,
                        applied_steps: 0,
                    };
                    leaf_step(&self.config, ctx, &mut next, screen.y);
                    self.state = next;
                } else if delta.length() > self.config.drag_slop_px {
                    let Some(it) = ctx.scene.item(item) else {
                        return;
                    };
                    let follow_pile = pile.is_some() && !expanded;
                    let next = GestureState::Dragging {
                        item,
                        pile,
                        follow_pile,
                        start_position: it.position,
                        start_surface: it.surface,
                        start_pinned: it.pinned,
                    };
                    ctx.scene.dragged_item = Some(item);
                    tracing::debug!(item = item.0, follow_pile, "drag started");
                    drag_step(&self.config, ctx, item, pile, follow_pile, screen);
                    self.state = next;
                } else {
                    self.state = GestureState::PendingItem { item, down };
                }
            }

            GestureState::PendingLasso { down } => {
                if (screen - down).length() > self.config.drag_slop_px {
                    let mut points = Vec::new();
                    lasso_accumulate(&self.config, ctx, &mut points, screen);
                    self.state = GestureState::Lasso { points };
                } else {
                    self.state = GestureState::PendingLasso { down };
                }
            }

            GestureState::Dragging {
                item,
                pile,
                follow_pile,
                start_position,
                start_surface,
                start_pinned,
            } => {
                drag_step(&self.config, ctx, item, pile, follow_pile, screen);
                self.state = GestureState::Dragging {
                    item,
                    pile,
                    follow_pile,
                    start_position,
                    start_surface,
                    start_pinned,
                };
            }

            GestureState::Leafing { .. } => {
                let mut next = state;
                leaf_step(&self.config, ctx, &mut next, screen.y);
                self.state = next;
            }

            GestureState::DraggingWidget { widget } => {
                widget_drag_step(ctx, widget, screen);
                self.state = GestureState::DraggingWidget { widget };
            }

            GestureState::ResizingWidget {
                widget,
                start_half,
                start_coords,
                grab_sign,
            } => {
                widget_resize_step(ctx, widget, start_half, start_coords, grab_sign, screen);
                self.state = GestureState::ResizingWidget {
                    widget,
                    start_half,
                    start_coords,
                    grab_sign,
                };
            }

            GestureState::Lasso { mut points } => {
                lasso_accumulate(&self.config, ctx, &mut points, screen);
                self.state = GestureState::Lasso { points };
            }

            GestureState::WidgetPassthrough {
                widget,
                widget_id,
                last_uv,
            } => {
                let uv = passthrough_uv(ctx, widget, screen).unwrap_or(last_uv);
                if uv != last_uv {
                    out.push(FeedbackEvent::Widget(WidgetInput {
                        widget_id,
                        phase: PointerPhase::Move,
                        uv,
                    }));
                }
                self.state = GestureState::WidgetPassthrough {
                    widget,
                    widget_id,
                    last_uv: uv,
                };
            }
        }
    }

    // ------------------------------------------------------------------
    // Pointer up
    // ------------------------------------------------------------------

    fn on_up(&mut self, _screen: Vec2, ctx: &mut PointerContext<'_>, out: &mut Vec<FeedbackEvent>) {
        let state = std::mem::replace(&mut self.state, GestureState::Idle);
        match state {
            GestureState::Idle
            | GestureState::PendingItem { .. }
            | GestureState::Leafing { .. } => {}

            GestureState::PendingLasso { .. } => {
                // Background tap: clear the selection.
                ctx.scene.selection.clear();
            }

            GestureState::Dragging {
                item,
                pile,
                follow_pile,
                start_position,
                start_surface,
                start_pinned,
            } => {
                finish_drag(
                    &self.config,
                    ctx,
                    out,
                    item,
                    pile,
                    follow_pile,
                    start_position,
                    start_surface,
                    start_pinned,
                );
            }

            GestureState::DraggingWidget { .. } | GestureState::ResizingWidget { .. } => {
                ctx.scene.dragged_widget = None;
            }

            GestureState::Lasso { points } => {
                let captured: Vec<ItemId> = ctx
                    .scene
                    .free_items()
                    .iter()
                    .copied()
                    .filter(|&id| {
                        ctx.scene.item(id).is_some_and(|it| {
                            point_in_polygon_xz(it.position.x, it.position.z, &points)
                        })
                    })
                    .collect();
                tracing::debug!(count = captured.len(), "lasso selection");
                if captured.len() > 1 {
                    out.push(FeedbackEvent::SelectionComplete(captured.len()));
                }
                ctx.scene.selection = captured;
            }

            GestureState::WidgetPassthrough {
                widget_id, last_uv, ..
            } => {
                out.push(FeedbackEvent::Widget(WidgetInput {
                    widget_id,
                    phase: PointerPhase::Up,
                    uv: last_uv,
                }));
            }
        }
    }
}

/// One drag increment: retag the surface under the ray, chase the hit
/// point at half the remaining distance, float off the surface a little.
fn drag_step(
    cfg: &GestureConfig,
    ctx: &mut PointerContext<'_>,
    item: ItemId,
    pile: Option<PileId>,
    follow_pile: bool,
    screen: Vec2,
) {
    let Some(ray) = ray_from_screen(screen, ctx.viewport, ctx.camera) else {
        return;
    };
    let Some(hit) = hit_test_surface(ray, ctx.config) else {
        return;
    };
    let Some(it) = ctx.scene.item_mut(item) else {
        return;
    };
    let target = hit.point + hit.surface.normal() * (cfg.drag_lift * it.scale());
    it.surface = hit.surface;
    it.velocity = (target - it.position) * cfg.drag_chase;
    it.position += it.velocity;

    if follow_pile
        && let Some(pid) = pile
        && let Some(p) = ctx.scene.pile_mut(pid)
    {
        p.surface = hit.surface;
        p.anchor += (hit.point - p.anchor) * cfg.drag_chase;
    }
}

/// Advance or retreat the pile's current leaf from accumulated vertical
/// travel. Downward travel moves forward through the pile.
fn leaf_step(cfg: &GestureConfig, ctx: &mut PointerContext<'_>, state: &mut GestureState, y: f32) {
    let GestureState::Leafing {
        pile,
        down_y,
        applied_steps,
    } = state
    else {
        return;
    };
    let steps = ((y - *down_y) / cfg.leaf_step_px) as i64;
    let delta = steps - *applied_steps;
    if delta != 0
        && let Some(p) = ctx.scene.pile_mut(*pile)
    {
        p.advance_leaf(delta);
        *applied_steps = steps;
    }
}

/// Direct widget reposition on its own mounting plane, clamped into the
/// room.
fn widget_drag_step(ctx: &mut PointerContext<'_>, widget: WidgetId, screen: Vec2) {
    let Some(ray) = ray_from_screen(screen, ctx.viewport, ctx.camera) else {
        return;
    };
    let room = ctx.config.room;
    let half_extent = room.active_half_extent(ctx.config.infinite_mode);
    let Some(w) = ctx.scene.widget_mut(widget) else {
        return;
    };
    let Some(point) = plane_point(w, ray) else {
        return;
    };
    let half = w.half_extent();
    let mut p = point;
    match w.surface {
        Surface::Floor => {
            p.x = p.x.clamp(-(half_extent - half.x), half_extent - half.x);
            p.z = p.z.clamp(-(half_extent - half.y), half_extent - half.y);
        }
        Surface::BackWall => {
            p.x = p.x.clamp(-(half_extent - half.x), half_extent - half.x);
            p.y = p.y.clamp(half.y, room.height - half.y);
        }
        Surface::LeftWall | Surface::RightWall => {
            p.z = p.z.clamp(-(half_extent - half.x), half_extent - half.x);
            p.y = p.y.clamp(half.y, room.height - half.y);
        }
    }
    w.position = p;
}

/// Corner resize: half extents grow by the in-plane delta toward the
/// grabbed corner; the setter clamps per axis.
fn widget_resize_step(
    ctx: &mut PointerContext<'_>,
    widget: WidgetId,
    start_half: Vec2,
    start_coords: Vec2,
    grab_sign: Vec2,
    screen: Vec2,
) {
    let Some(ray) = ray_from_screen(screen, ctx.viewport, ctx.camera) else {
        return;
    };
    let Some(w) = ctx.scene.widget_mut(widget) else {
        return;
    };
    let Some(point) = plane_point(w, ray) else {
        return;
    };
    let rel = point - w.position;
    let coords = Vec2::new(
        rel.dot(w.surface.primary_axis()),
        rel.dot(w.surface.secondary_axis()),
    );
    w.set_half_extent(start_half + (coords - start_coords) * grab_sign);
}

/// Append the touch's floor-plane projection to the lasso polygon,
/// skipping points closer than the minimum segment length.
fn lasso_accumulate(
    cfg: &GestureConfig,
    ctx: &mut PointerContext<'_>,
    points: &mut Vec<Vec3>,
    screen: Vec2,
) {
    let Some(ray) = ray_from_screen(screen, ctx.viewport, ctx.camera) else {
        return;
    };
    let Some(t) = ray.plane_hit_t(1, 0.0) else {
        return;
    };
    if t <= 0.0 {
        return;
    }
    let point = ray.point_at(t);
    if points
        .last()
        .is_none_or(|last| (point - *last).length() >= cfg.lasso_min_segment)
    {
        points.push(point);
    }
}

/// UV of the touch on the focused widget, if it lands on the footprint.
fn passthrough_uv(ctx: &PointerContext<'_>, widget: WidgetId, screen: Vec2) -> Option<Vec2> {
    let ray = ray_from_screen(screen, ctx.viewport, ctx.camera)?;
    let w = ctx.scene.widget(widget)?;
    plane_point(w, ray).and_then(|p| w.uv_at(p))
}

/// Ray intersection with a widget's mounting plane (unbounded).
fn plane_point(widget: &WidgetItem, ray: Ray) -> Option<Vec3> {
    let (axis, value) = match widget.surface {
        Surface::Floor => (1, widget.position.y),
        Surface::BackWall => (2, widget.position.z),
        Surface::LeftWall | Surface::RightWall => (0, widget.position.x),
    };
    let t = ray.plane_hit_t(axis, value)?;
    (t > 0.0).then(|| ray.point_at(t))
}

/// Drag-release bookkeeping: pin on walls, record the move for undo,
/// eject out-of-footprint pile members, offer nearby piles a new member.
#[allow(clippy::too_many_arguments)]
fn finish_drag(
    cfg: &GestureConfig,
    ctx: &mut PointerContext<'_>,
    out: &mut Vec<FeedbackEvent>,
    item: ItemId,
    pile: Option<PileId>,
    follow_pile: bool,
    start_position: Vec3,
    start_surface: Surface,
    start_pinned: bool,
) {
    ctx.scene.dragged_item = None;
    let Some(it) = ctx.scene.item(item) else {
        return;
    };
    let end_position = it.position;
    let end_surface = it.surface;
    let scale = it.scale();
    let package = it.package().map(str::to_owned);

    // Items released on a wall stick where they were put.
    let pinned = end_surface.is_wall();
    if let Some(it) = ctx.scene.item_mut(item) {
        it.pinned = pinned;
        if pinned {
            it.velocity = Vec3::ZERO;
        }
    }

    // Pile anchors are not commanded, so a whole-pile drag would not
    // round-trip through undo; only pure item moves are recorded.
    if !follow_pile {
        ctx.history.record(Command::Move {
            item,
            from_position: start_position,
            from_surface: start_surface,
            from_pinned: start_pinned,
            to_position: end_position,
            to_surface: end_surface,
            to_pinned: pinned,
        });
    }

    match pile {
        Some(pid) if !follow_pile => {
            // Dragged out of an expanded pile: eject unless the same app
            // is already loose on the desk.
            let Some(p) = ctx.scene.pile(pid) else {
                return;
            };
            let footprint = p.footprint_radius(ctx.config.grid_spacing_base) + scale;
            if (end_position - p.anchor).length() > footprint {
                let duplicate = package
                    .as_deref()
                    .is_some_and(|pkg| ctx.scene.has_app_on_desk(pkg));
                if duplicate {
                    tracing::debug!(item = item.0, "eject skipped: app already on desk");
                } else if let Err(err) = ctx.scene.eject_from_pile(pid, item) {
                    tracing::warn!(item = item.0, %err, "eject failed");
                }
            }
        }
        None => {
            // Released near a foreign pile: offer membership.
            let nearest = ctx
                .scene
                .pile_ids()
                .filter_map(|pid| {
                    let p = ctx.scene.pile(pid)?;
                    Some((pid, (end_position - p.anchor).length()))
                })
                .min_by(|a, b| a.1.total_cmp(&b.1));
            if let Some((pid, dist)) = nearest
                && dist < cfg.pile_offer_distance
            {
                out.push(FeedbackEvent::OfferAddToPile { pile: pid, item });
            }
        }
        _ => {}
    }
}
