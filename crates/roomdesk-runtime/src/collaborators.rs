#![forbid(unsafe_code)]

//! Contracts with the excluded collaborators: renderer, feedback
//! (audio/haptics), and persistence.
//!
//! The core pushes notifications out through [`FeedbackSink`] and hands
//! the renderer an owned [`RenderSnapshot`] per frame; it never calls
//! into GPU, audio, or storage APIs itself.

use std::sync::Arc;

use glam::Vec3;
use roomdesk_core::events::{FeedbackEvent, WidgetInput};
use roomdesk_core::scene::{ItemId, PileId, SceneState};
use roomdesk_sim::camera::CameraController;

use crate::shared::SharedScene;

/// Fire-and-forget notifications to the host shell.
///
/// Implementations must be cheap or hand off to their own thread; the
/// simulation loop calls [`FeedbackSink::bump`] between ticks.
pub trait FeedbackSink: Send + Sync {
    /// A collision or bounce strong enough for audio/haptic feedback.
    fn bump(&self, magnitude: f32);
    /// A lasso selection completed with this many items.
    fn selection_complete(&self, count: usize);
    /// A dragged item was released near a pile it does not belong to.
    fn offer_add_to_pile(&self, pile: PileId, item: ItemId);
    /// Synthetic input for an embedded widget view.
    fn widget_input(&self, input: WidgetInput);
}

/// Sink that discards everything. Useful for tests and headless runs.
pub struct NullSink;

impl FeedbackSink for NullSink {
    fn bump(&self, _magnitude: f32) {}
    fn selection_complete(&self, _count: usize) {}
    fn offer_add_to_pile(&self, _pile: PileId, _item: ItemId) {}
    fn widget_input(&self, _input: WidgetInput) {}
}

/// Route one feedback event to the matching sink method.
pub fn dispatch(sink: &Arc<dyn FeedbackSink>, event: FeedbackEvent) {
    match event {
        FeedbackEvent::Bump(magnitude) => sink.bump(magnitude),
        FeedbackEvent::SelectionComplete(count) => sink.selection_complete(count),
        FeedbackEvent::OfferAddToPile { pile, item } => sink.offer_add_to_pile(pile, item),
        FeedbackEvent::Widget(input) => sink.widget_input(input),
    }
}

/// Everything the renderer needs for one frame, copied out of the locks.
#[derive(Debug, Clone)]
pub struct RenderSnapshot {
    pub scene: SceneState,
    pub camera_position: Vec3,
    pub camera_look_at: Vec3,
    pub fov_deg: f32,
    pub zoom: f32,
}

/// Take a per-frame snapshot for the render thread.
#[must_use]
pub fn render_snapshot(scene: &SharedScene, camera: &CameraController) -> RenderSnapshot {
    RenderSnapshot {
        scene: scene.snapshot(),
        camera_position: camera.position(),
        camera_look_at: camera.look_at(),
        fov_deg: camera.fov_deg(),
        zoom: camera.zoom(),
    }
}

/// Persistence load path: install a reconstructed scene wholesale.
pub fn install_loaded(scene: &SharedScene, loaded: SceneState) {
    scene.replace(loaded);
}

/// Persistence save path: owned copy for off-thread serialization.
#[must_use]
pub fn snapshot_for_save(scene: &SharedScene) -> SceneState {
    scene.snapshot()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl FeedbackSink for Recorder {
        fn bump(&self, magnitude: f32) {
            self.events.lock().unwrap().push(format!("bump {magnitude}"));
        }
        fn selection_complete(&self, count: usize) {
            self.events.lock().unwrap().push(format!("selection {count}"));
        }
        fn offer_add_to_pile(&self, pile: PileId, item: ItemId) {
            self.events
                .lock()
                .unwrap()
                .push(format!("offer {} {}", pile.0, item.0));
        }
        fn widget_input(&self, input: WidgetInput) {
            self.events
                .lock()
                .unwrap()
                .push(format!("widget {}", input.widget_id));
        }
    }

    #[test]
    fn dispatch_routes_every_variant() {
        let recorder = Arc::new(Recorder::default());
        let sink: Arc<dyn FeedbackSink> = recorder.clone();
        dispatch(&sink, FeedbackEvent::Bump(0.4));
        dispatch(&sink, FeedbackEvent::SelectionComplete(3));
        dispatch(
            &sink,
            FeedbackEvent::OfferAddToPile {
                pile: PileId(1),
                item: ItemId(2),
            },
        );
        let events = recorder.events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                "bump 0.4".to_owned(),
                "selection 3".to_owned(),
                "offer 1 2".to_owned()
            ]
        );
    }
}
