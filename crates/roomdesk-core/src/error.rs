#![forbid(unsafe_code)]

//! Error taxonomy for structural scene operations.
//!
//! Geometry degeneracy is deliberately *not* represented here: hit tests
//! and plane intersections answer `None` and recover locally. These errors
//! cover the structural operations that can be asked to do impossible
//! things (group one item, touch an id that was deleted). Invariant
//! violations discovered by the audit pass are asserted in debug builds
//! and self-healed in release builds rather than surfaced as errors.

use thiserror::Error;

use crate::scene::{ItemId, PileId};

pub type Result<T> = std::result::Result<T, RoomdeskError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomdeskError {
    #[error("unknown item id: {0:?}")]
    UnknownItem(ItemId),

    #[error("unknown pile id: {0:?}")]
    UnknownPile(PileId),

    #[error("a pile needs at least two members, got {0}")]
    PileTooSmall(usize),

    #[error("item {0:?} already belongs to a pile")]
    DuplicateMembership(ItemId),

    #[error("system piles cannot be dissolved")]
    SystemPile,
}
