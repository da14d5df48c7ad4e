#![forbid(unsafe_code)]

//! Runtime layer for the Roomdesk spatial desktop.
//!
//! Three actors touch the scene: the input thread (gesture handling),
//! the fixed-cadence simulation thread, and the render thread. This
//! crate pins down how they share it:
//!
//! - [`shared`]: the single scene behind a reader-writer lock.
//! - [`queue`]: interaction mutations are closures, serialized onto the
//!   simulation thread so physics and interaction never interleave.
//! - [`sim_loop`]: the ~16 ms tick thread with cooperative stop.
//! - [`collaborators`]: the narrow contracts with renderer, feedback,
//!   and persistence collaborators.

pub mod collaborators;
pub mod queue;
pub mod shared;
pub mod sim_loop;

pub use collaborators::{FeedbackSink, NullSink, RenderSnapshot, render_snapshot};
pub use queue::{SimTask, TaskQueue};
pub use shared::SharedScene;
pub use sim_loop::{SimulationLoop, TICK_INTERVAL};
