#![forbid(unsafe_code)]

//! Pointer input and outbound feedback event types.
//!
//! Pointer events are the normalized touch input the interaction engine
//! consumes; feedback events are the only core-to-outside notifications
//! (fire-and-forget, carrying at most a magnitude float).

use glam::Vec2;

/// Phase of a pointer (touch) event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// A normalized touch event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    /// Screen position in pixels, origin top-left.
    pub screen: Vec2,
    /// Number of pointers currently down. `>= 2` cancels single-finger
    /// gestures and routes to pan/zoom handling.
    pub pointer_count: u32,
}

impl PointerEvent {
    #[must_use]
    pub const fn new(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self {
            phase,
            screen: Vec2::new(x, y),
            pointer_count: 1,
        }
    }

    /// Same event with an explicit active-pointer count.
    #[must_use]
    pub const fn with_pointer_count(mut self, count: u32) -> Self {
        self.pointer_count = count;
        self
    }
}

/// Synthetic input forwarded to an embedded widget view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetInput {
    pub widget_id: u64,
    pub phase: PointerPhase,
    /// UV-mapped coordinate on the widget surface, each in `[0, 1]`.
    pub uv: Vec2,
}

/// Fire-and-forget notifications from the core to external collaborators.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackEvent {
    /// A collision or bounce strong enough for audio/haptic feedback.
    /// Carries the impulse/bounce magnitude.
    Bump(f32),
    /// A lasso selection completed, capturing this many items.
    SelectionComplete(usize),
    /// A dragged item was released near a pile it does not belong to;
    /// the shell may offer to add it.
    OfferAddToPile {
        pile: crate::scene::PileId,
        item: crate::scene::ItemId,
    },
    /// Input to forward to an embedded widget view.
    Widget(WidgetInput),
}
