#![forbid(unsafe_code)]

//! The fixed-cadence simulation thread.
//!
//! One background thread wakes roughly every 16 ms, drains the task
//! queue, then runs the physics pass, all under the scene write lock.
//! Bump magnitudes collected during the pass are forwarded to the
//! feedback sink after the lock is released.
//!
//! # Invariants
//!
//! 1. Stopping is cooperative: the signal is checked at the top of each
//!    tick, never mid-pass, so `stop()` cannot deadlock against an
//!    in-flight tick.
//! 2. `stop()` is idempotent; dropping the loop stops it.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use web_time::Duration;

use roomdesk_core::config::SimConfig;
use roomdesk_sim::solver;

use crate::collaborators::FeedbackSink;
use crate::queue::{TaskQueue, task_queue};
use crate::shared::SharedScene;

/// Target tick interval, independent of render framerate.
pub const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Cooperative stop flag shared with the tick thread.
#[derive(Clone, Default)]
struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    /// Wait for either the stop signal or the tick timeout.
    ///
    /// Returns `true` if stopped.
    fn wait_timeout(&self, duration: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let mut stopped = lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if *stopped {
            return true;
        }
        let (guard, _) = cvar
            .wait_timeout(stopped, duration)
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        stopped = guard;
        *stopped
    }

    fn trigger(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = true;
        cvar.notify_all();
    }
}

/// Handle to the running simulation thread.
pub struct SimulationLoop {
    handle: Option<JoinHandle<()>>,
    stop: StopSignal,
    queue: TaskQueue,
}

impl SimulationLoop {
    /// Start the tick thread.
    ///
    /// The thread owns the receiving end of the task queue; submit work
    /// through [`SimulationLoop::queue`].
    #[must_use]
    pub fn spawn(scene: SharedScene, config: SimConfig, sink: Arc<dyn FeedbackSink>) -> Self {
        let (queue, receiver) = task_queue();
        let stop = StopSignal::default();
        let signal = stop.clone();
        let handle = std::thread::spawn(move || {
            tracing::debug!("simulation loop started");
            let mut bumps: Vec<f32> = Vec::new();
            while !signal.wait_timeout(TICK_INTERVAL) {
                {
                    let mut state = scene.write();
                    let drained = receiver.drain(&mut state);
                    if drained > 0 {
                        tracing::trace!(drained, "ran queued tasks");
                    }
                    solver::advance(&mut state, &config, &mut |magnitude| {
                        bumps.push(magnitude);
                    });
                }
                // Feedback fires outside the lock; sinks may be slow.
                for magnitude in bumps.drain(..) {
                    sink.bump(magnitude);
                }
            }
            tracing::debug!("simulation loop stopped");
        });
        Self {
            handle: Some(handle),
            stop,
            queue,
        }
    }

    /// Submission handle for deferred scene mutations.
    #[must_use]
    pub fn queue(&self) -> TaskQueue {
        self.queue.clone()
    }

    /// Signal the thread to stop and wait for the current tick to end.
    /// Safe to call more than once.
    pub fn stop(&mut self) {
        self.stop.trigger();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::warn!("simulation thread panicked");
        }
    }
}

impl Drop for SimulationLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::NullSink;
    use glam::Vec3;
    use roomdesk_core::item::{DeskItem, ItemKind, Surface};

    fn wall_item() -> DeskItem {
        DeskItem::new(ItemKind::App, Vec3::new(0.0, 8.0, -10.0), Surface::BackWall)
    }

    #[test]
    fn loop_advances_physics() {
        let shared = SharedScene::default();
        let id = shared.write().add_item(wall_item());
        let mut sim = SimulationLoop::spawn(
            shared.clone(),
            SimConfig::default(),
            Arc::new(NullSink),
        );
        std::thread::sleep(Duration::from_millis(200));
        sim.stop();
        // Wall gravity pulled the item down.
        assert!(shared.read().item(id).unwrap().position.y < 8.0);
    }

    #[test]
    fn queued_tasks_apply_before_the_tick() {
        let shared = SharedScene::default();
        let mut sim = SimulationLoop::spawn(
            shared.clone(),
            SimConfig::default(),
            Arc::new(NullSink),
        );
        sim.queue().submit(|scene| {
            scene.add_item(DeskItem::new(
                ItemKind::StickyNote,
                Vec3::new(1.0, 1.0, 1.0),
                Surface::Floor,
            ));
        });
        std::thread::sleep(Duration::from_millis(100));
        sim.stop();
        assert_eq!(shared.read().all_item_ids().count(), 1);
    }

    #[test]
    fn stop_is_idempotent() {
        let shared = SharedScene::default();
        let mut sim =
            SimulationLoop::spawn(shared, SimConfig::default(), Arc::new(NullSink));
        sim.stop();
        sim.stop();
        // Submissions after shutdown are rejected, not lost silently.
        assert!(!sim.queue().submit(|_| {}));
    }
}
