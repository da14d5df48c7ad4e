//! End-to-end scenarios across the interaction, simulation, and runtime
//! layers: a drag performed through the gesture engine, settled by the
//! solver, and round-tripped through undo.

use glam::{Vec2, Vec3, Vec4Swizzles};
use roomdesk_core::config::SimConfig;
use roomdesk_core::events::{PointerEvent, PointerPhase};
use roomdesk_core::item::{DeskItem, ItemKind, Surface};
use roomdesk_core::scene::SceneState;
use roomdesk_interact::gesture::{GestureEngine, PointerContext};
use roomdesk_interact::undo::History;
use roomdesk_sim::camera::CameraController;
use roomdesk_sim::solver;

const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

fn screen_of(world: Vec3, camera: &CameraController) -> Vec2 {
    let clip =
        camera.projection_matrix(VIEWPORT.x / VIEWPORT.y) * camera.view_matrix() * world.extend(1.0);
    let ndc = clip.xyz() / clip.w;
    Vec2::new(
        (ndc.x + 1.0) * 0.5 * VIEWPORT.x,
        (1.0 - ndc.y) * 0.5 * VIEWPORT.y,
    )
}

fn pointer(phase: PointerPhase, screen: Vec2) -> PointerEvent {
    PointerEvent::new(phase, screen.x, screen.y)
}

#[test]
fn drag_settle_and_undo_round_trip() {
    let mut scene = SceneState::new();
    let camera = CameraController::new();
    let config = SimConfig::default();
    let mut history = History::new();
    let mut engine = GestureEngine::default();

    let start = Vec3::new(-2.0, 0.5, 0.0);
    let id = scene.add_item(DeskItem::new(ItemKind::App, start, Surface::Floor));

    // Drag the item a few meters across the floor.
    let target = Vec3::new(4.0, 0.0, 3.0);
    let events = [
        pointer(PointerPhase::Down, screen_of(start, &camera)),
        pointer(PointerPhase::Move, screen_of(target, &camera)),
        pointer(PointerPhase::Move, screen_of(target, &camera)),
        pointer(PointerPhase::Move, screen_of(target, &camera)),
        pointer(PointerPhase::Up, Vec2::ZERO),
    ];
    for event in events {
        let mut ctx = PointerContext {
            scene: &mut scene,
            camera: &camera,
            config: &config,
            history: &mut history,
            viewport: VIEWPORT,
        };
        engine.handle(event, &mut ctx);
    }

    let dropped = scene.item(id).unwrap().position;
    assert!(dropped.x > 2.0, "drag landed at {dropped:?}");
    assert!(scene.dragged_item.is_none());

    // Let the residual fling settle; the item must stay inside the room.
    let mut bump = |_m: f32| {};
    for _ in 0..120 {
        solver::advance(&mut scene, &config, &mut bump);
    }
    let settled = scene.item(id).unwrap().position;
    let half = config.room.half_extent;
    assert!(settled.x.abs() <= half && settled.z.abs() <= half);
    assert!((settled.y - 1.0).abs() < 1e-3, "resting on the floor: {settled:?}");

    // Undo restores the pre-drag placement; redo reapplies the release.
    assert!(history.undo(&mut scene));
    assert_eq!(scene.item(id).unwrap().position, start);
    assert!(history.redo(&mut scene));
    assert_eq!(scene.item(id).unwrap().position, dropped);
}

#[test]
fn queued_interaction_and_physics_stay_serialized() {
    use roomdesk_runtime::{NullSink, SharedScene, SimulationLoop};
    use std::sync::Arc;

    let shared = SharedScene::default();
    let mut sim = SimulationLoop::spawn(shared.clone(), SimConfig::default(), Arc::new(NullSink));

    // Structural edits submitted from "the input thread".
    let queue = sim.queue();
    queue.submit(|scene| {
        let a = scene.add_item(DeskItem::new(
            ItemKind::App,
            Vec3::new(0.0, 0.5, 0.0),
            Surface::Floor,
        ));
        let b = scene.add_item(DeskItem::new(
            ItemKind::App,
            Vec3::new(0.4, 0.5, 0.0),
            Surface::Floor,
        ));
        scene
            .group_into_pile(&[a, b], Vec3::new(0.0, 0.5, 0.0), Surface::Floor)
            .unwrap();
    });
    std::thread::sleep(std::time::Duration::from_millis(150));
    sim.stop();

    let scene = shared.snapshot();
    assert_eq!(scene.pile_ids().count(), 1);
    // Membership invariant held across concurrent ticks.
    assert!(scene.free_items().is_empty());
}
