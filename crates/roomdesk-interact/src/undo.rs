#![forbid(unsafe_code)]

//! Linear undo/redo history of reversible scene commands.
//!
//! Commands are a tagged enum rather than boxed trait objects: every
//! command kind is known at compile time, and adding a kind (delete,
//! pile membership) is a new variant plus two match arms — the stack
//! discipline below never changes.
//!
//! # Invariants
//!
//! 1. Executing or recording a new command clears the redo stack
//!    (linear history, no branching redo).
//! 2. The undo stack never exceeds the configured depth; the oldest
//!    entry is evicted first.

use glam::Vec3;
use roomdesk_core::item::Surface;
use roomdesk_core::scene::{ItemId, SceneState};

/// Default maximum number of undoable commands retained.
pub const DEFAULT_HISTORY_DEPTH: usize = 64;

/// A reversible mutation of the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// An item was repositioned (drag release). Captures the full
    /// placement on both sides so revert needs no other context.
    Move {
        item: ItemId,
        from_position: Vec3,
        from_surface: Surface,
        from_pinned: bool,
        to_position: Vec3,
        to_surface: Surface,
        to_pinned: bool,
    },
}

impl Command {
    /// Apply the forward effect.
    pub fn apply(&self, scene: &mut SceneState) {
        match *self {
            Command::Move {
                item,
                to_position,
                to_surface,
                to_pinned,
                ..
            } => place(scene, item, to_position, to_surface, to_pinned),
        }
    }

    /// Apply the reverse effect.
    pub fn revert(&self, scene: &mut SceneState) {
        match *self {
            Command::Move {
                item,
                from_position,
                from_surface,
                from_pinned,
                ..
            } => place(scene, item, from_position, from_surface, from_pinned),
        }
    }
}

/// Placement helper: a command referencing a since-removed item is a
/// silent no-op rather than an error.
fn place(scene: &mut SceneState, id: ItemId, position: Vec3, surface: Surface, pinned: bool) {
    if let Some(item) = scene.item_mut(id) {
        item.position = position;
        item.surface = surface;
        item.pinned = pinned;
        item.velocity = Vec3::ZERO;
    } else {
        tracing::debug!(item = id.0, "undo target no longer exists; skipping");
    }
}

/// Two-stack linear history.
#[derive(Debug)]
pub struct History {
    undo: Vec<Command>,
    redo: Vec<Command>,
    depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::with_depth(DEFAULT_HISTORY_DEPTH)
    }

    /// History with a custom depth limit (minimum 1).
    #[must_use]
    pub fn with_depth(depth: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            depth: depth.max(1),
        }
    }

    /// Apply a command and push it onto the undo stack.
    pub fn execute(&mut self, scene: &mut SceneState, command: Command) {
        command.apply(scene);
        self.push(command);
    }

    /// Push a command whose effect has already happened (drag releases
    /// record the move after the fact rather than re-applying it).
    pub fn record(&mut self, command: Command) {
        self.push(command);
    }

    fn push(&mut self, command: Command) {
        self.redo.clear();
        if self.undo.len() == self.depth {
            self.undo.remove(0);
        }
        self.undo.push(command);
    }

    /// Revert the most recent command. Returns whether anything happened.
    pub fn undo(&mut self, scene: &mut SceneState) -> bool {
        match self.undo.pop() {
            Some(command) => {
                command.revert(scene);
                self.redo.push(command);
                true
            }
            None => false,
        }
    }

    /// Re-apply the most recently undone command.
    pub fn redo(&mut self, scene: &mut SceneState) -> bool {
        match self.redo.pop() {
            Some(command) => {
                command.apply(scene);
                self.undo.push(command);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomdesk_core::item::{DeskItem, ItemKind};

    fn scene_with_item() -> (SceneState, ItemId) {
        let mut scene = SceneState::new();
        let id = scene.add_item(DeskItem::new(
            ItemKind::App,
            Vec3::new(1.0, 0.5, 1.0),
            Surface::Floor,
        ));
        (scene, id)
    }

    fn move_cmd(item: ItemId) -> Command {
        Command::Move {
            item,
            from_position: Vec3::new(1.0, 0.5, 1.0),
            from_surface: Surface::Floor,
            from_pinned: false,
            to_position: Vec3::new(0.0, 4.0, -10.0),
            to_surface: Surface::BackWall,
            to_pinned: true,
        }
    }

    #[test]
    fn undo_redo_round_trip_is_identity() {
        let (mut scene, id) = scene_with_item();
        let mut history = History::new();
        history.execute(&mut scene, move_cmd(id));
        let after = scene.item(id).unwrap().clone();

        assert!(history.undo(&mut scene));
        let item = scene.item(id).unwrap();
        assert_eq!(item.position, Vec3::new(1.0, 0.5, 1.0));
        assert_eq!(item.surface, Surface::Floor);
        assert!(!item.pinned);

        assert!(history.redo(&mut scene));
        assert_eq!(scene.item(id).unwrap(), &after);
    }

    #[test]
    fn new_command_clears_redo() {
        let (mut scene, id) = scene_with_item();
        let mut history = History::new();
        history.execute(&mut scene, move_cmd(id));
        history.undo(&mut scene);
        assert!(history.can_redo());
        history.execute(&mut scene, move_cmd(id));
        assert!(!history.can_redo());
    }

    #[test]
    fn depth_limit_evicts_oldest() {
        let (mut scene, id) = scene_with_item();
        let mut history = History::with_depth(2);
        for _ in 0..3 {
            history.execute(&mut scene, move_cmd(id));
        }
        assert!(history.undo(&mut scene));
        assert!(history.undo(&mut scene));
        assert!(!history.undo(&mut scene));
    }

    #[test]
    fn undo_on_removed_item_is_noop() {
        let (mut scene, id) = scene_with_item();
        let mut history = History::new();
        history.execute(&mut scene, move_cmd(id));
        scene.remove_item(id).unwrap();
        assert!(history.undo(&mut scene));
        assert!(scene.item(id).is_none());
    }

    proptest::proptest! {
        #[test]
        fn undoing_a_full_chain_restores_the_start(
            targets in proptest::collection::vec(
                (-10.0f32..10.0, 0.0f32..12.0, -10.0f32..10.0),
                1..12,
            ),
        ) {
            let (mut scene, id) = scene_with_item();
            let start = scene.item(id).unwrap().clone();
            let mut history = History::new();
            for (x, y, z) in targets {
                let from = scene.item(id).unwrap().clone();
                let command = Command::Move {
                    item: id,
                    from_position: from.position,
                    from_surface: from.surface,
                    from_pinned: from.pinned,
                    to_position: Vec3::new(x, y, z),
                    to_surface: Surface::Floor,
                    to_pinned: false,
                };
                history.execute(&mut scene, command);
            }
            while history.undo(&mut scene) {}
            let item = scene.item(id).unwrap();
            proptest::prop_assert_eq!(item.position, start.position);
            proptest::prop_assert_eq!(item.surface, start.surface);
            proptest::prop_assert_eq!(item.pinned, start.pinned);
        }
    }

    #[test]
    fn empty_history_reports_nothing_to_do() {
        let (mut scene, _) = scene_with_item();
        let mut history = History::new();
        assert!(!history.undo(&mut scene));
        assert!(!history.redo(&mut scene));
        assert!(!history.can_undo());
    }
}
