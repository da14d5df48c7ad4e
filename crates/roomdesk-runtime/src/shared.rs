#![forbid(unsafe_code)]

//! The shared scene container.
//!
//! Exactly one [`SceneState`] exists at runtime, behind a reader-writer
//! lock. Readers are the render pass and the persistence save path;
//! the only writers are the simulation thread (per tick, which also
//! drains the interaction queue) and the bulk-load path.
//!
//! # Invariants
//!
//! 1. Per-field mutation never goes through this type directly; it is
//!    submitted to the simulation queue and runs under the tick's write
//!    lock. See [`queue`](crate::queue).

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use roomdesk_core::scene::SceneState;

/// Cloneable handle to the single shared scene.
#[derive(Debug, Clone, Default)]
pub struct SharedScene {
    inner: Arc<RwLock<SceneState>>,
}

impl SharedScene {
    #[must_use]
    pub fn new(scene: SceneState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(scene)),
        }
    }

    /// Read access for the render pass and save snapshots.
    #[must_use]
    pub fn read(&self) -> RwLockReadGuard<'_, SceneState> {
        // A panicked writer must not take the render path down with it;
        // the scene audit self-heals structural damage.
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Write access. Reserved for the simulation tick and the bulk-load
    /// path; everything else submits to the queue.
    #[must_use]
    pub fn write(&self) -> RwLockWriteGuard<'_, SceneState> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Owned copy of the current scene (persistence save path).
    #[must_use]
    pub fn snapshot(&self) -> SceneState {
        self.read().clone()
    }

    /// Atomically replace the whole scene (persistence load path).
    ///
    /// Runs the structural audit on the installed state.
    pub fn replace(&self, scene: SceneState) {
        self.write().replace_all(scene);
        tracing::debug!("scene replaced");
    }
}
