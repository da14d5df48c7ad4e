#![forbid(unsafe_code)]

//! The serialized simulation task queue.
//!
//! Interaction code never touches the scene from its own thread.
//! It submits closures here; the simulation thread drains them at the
//! top of each tick, under the same write lock as the physics pass.
//! Physics and interaction therefore never run concurrently on the
//! same entities, by construction rather than by locking discipline.

use std::sync::mpsc;

use roomdesk_core::scene::SceneState;

/// A deferred scene mutation.
pub type SimTask = Box<dyn FnOnce(&mut SceneState) + Send + 'static>;

/// Cloneable submission handle.
#[derive(Clone)]
pub struct TaskQueue {
    tx: mpsc::Sender<SimTask>,
}

/// Receiving end, owned by the simulation thread.
pub struct TaskReceiver {
    rx: mpsc::Receiver<SimTask>,
}

/// Create a connected queue pair.
#[must_use]
pub fn task_queue() -> (TaskQueue, TaskReceiver) {
    let (tx, rx) = mpsc::channel();
    (TaskQueue { tx }, TaskReceiver { rx })
}

impl TaskQueue {
    /// Submit a task for the next tick.
    ///
    /// Returns `false` if the simulation thread has shut down; the task
    /// is dropped in that case.
    pub fn submit(&self, task: impl FnOnce(&mut SceneState) + Send + 'static) -> bool {
        let accepted = self.tx.send(Box::new(task)).is_ok();
        if !accepted {
            tracing::warn!("task dropped: simulation loop is gone");
        }
        accepted
    }
}

impl TaskReceiver {
    /// Run every queued task against the scene, in submission order.
    /// Returns how many ran.
    pub fn drain(&self, scene: &mut SceneState) -> usize {
        let mut count = 0;
        while let Ok(task) = self.rx.try_recv() {
            task(scene);
            count += 1;
        }
        count
    }
}
