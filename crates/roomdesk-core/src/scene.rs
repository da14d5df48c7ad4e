#![forbid(unsafe_code)]

//! The shared scene container: single source of truth for all entities.
//!
//! Entities live in flat arenas with stable integer ids ([`ItemId`],
//! [`PileId`], [`WidgetId`]); piles reference members by id rather than
//! by pointer, so the whole state is a plain value that can be cloned for
//! snapshots and replaced wholesale on load.
//!
//! # Invariants
//!
//! 1. **Exclusive membership**: an item id present in a pile's member list
//!    is absent from `free_items`, and vice versa. Structural operations
//!    preserve this; [`SceneState::audit`] asserts it in debug builds and
//!    self-heals in release builds.
//! 2. A live pile has at least two members unless it is a system pile;
//!    ejections that drop a pile below that dissolve it.
//! 3. Ids are never reused while a slot is live; removing an entity leaves
//!    a vacant slot that later insertions may fill.
//!
//! # Concurrency
//!
//! `SceneState` itself is not synchronized. The runtime wraps exactly one
//! instance in a reader-writer lock and serializes all mutation onto one
//! execution queue; see `roomdesk-runtime`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RoomdeskError};
use crate::item::{AppBinding, DeskItem, Surface};
use crate::pile::{MIN_PILE_SIZE, Pile};
use crate::widget::WidgetItem;

/// Stable handle to a desk item slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u32);

/// Stable handle to a pile slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PileId(pub u32);

/// Stable handle to a widget slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WidgetId(pub u32);

/// The aggregate root: free items, piles, widgets, drag pointers, and the
/// installed-app catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneState {
    items: Vec<Option<DeskItem>>,
    piles: Vec<Option<Pile>>,
    widgets: Vec<Option<WidgetItem>>,
    /// Items not belonging to any pile; these are the dynamics bodies.
    free_items: Vec<ItemId>,
    /// Item currently being drag-manipulated, if any.
    pub dragged_item: Option<ItemId>,
    /// Widget currently being drag-manipulated, if any.
    pub dragged_widget: Option<WidgetId>,
    /// Current multi-selection (lasso result).
    pub selection: Vec<ItemId>,
    /// All known installed applications, as supplied by the catalog
    /// collaborator.
    pub catalog: Vec<AppBinding>,
}

impl SceneState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    /// Add an item to the desk; it starts in the free collection.
    pub fn add_item(&mut self, item: DeskItem) -> ItemId {
        let id = match self.items.iter().position(Option::is_none) {
            Some(slot) => {
                self.items[slot] = Some(item);
                ItemId(slot as u32)
            }
            None => {
                self.items.push(Some(item));
                ItemId((self.items.len() - 1) as u32)
            }
        };
        self.free_items.push(id);
        id
    }

    /// Look up an item.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&DeskItem> {
        self.items.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Look up an item mutably.
    #[must_use]
    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut DeskItem> {
        self.items.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    /// Remove an item from the desk entirely (free set or pile).
    ///
    /// Removing the penultimate member of a non-system pile dissolves it.
    pub fn remove_item(&mut self, id: ItemId) -> Result<DeskItem> {
        let slot = self
            .items
            .get_mut(id.0 as usize)
            .ok_or(RoomdeskError::UnknownItem(id))?;
        let item = slot.take().ok_or(RoomdeskError::UnknownItem(id))?;

        self.free_items.retain(|&f| f != id);
        self.selection.retain(|&s| s != id);
        if self.dragged_item == Some(id) {
            self.dragged_item = None;
        }
        let mut to_dissolve = None;
        for (idx, pile) in self.piles.iter_mut().enumerate() {
            if let Some(p) = pile
                && p.contains(id)
            {
                p.members.retain(|&m| m != id);
                p.clamp_indices();
                if p.len() < MIN_PILE_SIZE && !p.system {
                    to_dissolve = Some(PileId(idx as u32));
                }
            }
        }
        if let Some(pid) = to_dissolve {
            let _ = self.dissolve_pile(pid);
        }
        Ok(item)
    }

    /// Ids of items in the free collection (dynamics bodies).
    #[must_use]
    pub fn free_items(&self) -> &[ItemId] {
        &self.free_items
    }

    /// Whether an item id is currently in the free collection.
    #[must_use]
    pub fn is_free(&self, id: ItemId) -> bool {
        self.free_items.contains(&id)
    }

    /// Iterate all live item ids, free and piled.
    pub fn all_item_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| ItemId(i as u32))
    }

    /// Borrow two distinct items mutably (collision resolution needs both
    /// sides of a pair). Returns `None` if the ids are equal or either is
    /// dead.
    #[must_use]
    pub fn item_pair_mut(
        &mut self,
        a: ItemId,
        b: ItemId,
    ) -> Option<(&mut DeskItem, &mut DeskItem)> {
        let (ai, bi) = (a.0 as usize, b.0 as usize);
        if ai == bi || ai >= self.items.len() || bi >= self.items.len() {
            return None;
        }
        let (lo, hi) = (ai.min(bi), ai.max(bi));
        let (left, right) = self.items.split_at_mut(hi);
        let first = left[lo].as_mut()?;
        let second = right[0].as_mut()?;
        if ai < bi {
            Some((first, second))
        } else {
            Some((second, first))
        }
    }

    /// Whether any free item is bound to the given app package.
    ///
    /// Used as the duplicate guard when ejecting an app icon out of a pile.
    #[must_use]
    pub fn has_app_on_desk(&self, package: &str) -> bool {
        self.free_items
            .iter()
            .filter_map(|&id| self.item(id))
            .any(|item| item.package() == Some(package))
    }

    // ------------------------------------------------------------------
    // Piles
    // ------------------------------------------------------------------

    /// Look up a pile.
    #[must_use]
    pub fn pile(&self, id: PileId) -> Option<&Pile> {
        self.piles.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Look up a pile mutably.
    #[must_use]
    pub fn pile_mut(&mut self, id: PileId) -> Option<&mut Pile> {
        self.piles.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    /// Ids of all live piles.
    pub fn pile_ids(&self) -> impl Iterator<Item = PileId> + '_ {
        self.piles
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| PileId(i as u32))
    }

    /// Pile containing the given item, if any.
    #[must_use]
    pub fn pile_of(&self, id: ItemId) -> Option<PileId> {
        self.pile_ids().find(|&pid| {
            self.pile(pid).is_some_and(|p| p.contains(id))
        })
    }

    /// Group free items into a new pile anchored at `anchor`.
    ///
    /// All ids must be live and free; at least two are required.
    pub fn group_into_pile(
        &mut self,
        ids: &[ItemId],
        anchor: Vec3,
        surface: Surface,
    ) -> Result<PileId> {
        if ids.len() < MIN_PILE_SIZE {
            return Err(RoomdeskError::PileTooSmall(ids.len()));
        }
        for &id in ids {
            if self.item(id).is_none() {
                return Err(RoomdeskError::UnknownItem(id));
            }
            if !self.is_free(id) {
                return Err(RoomdeskError::DuplicateMembership(id));
            }
        }
        self.free_items.retain(|f| !ids.contains(f));
        let pile = Pile::new(ids.to_vec(), anchor, surface);
        let pid = match self.piles.iter().position(Option::is_none) {
            Some(slot) => {
                self.piles[slot] = Some(pile);
                PileId(slot as u32)
            }
            None => {
                self.piles.push(Some(pile));
                PileId((self.piles.len() - 1) as u32)
            }
        };
        tracing::debug!(pile = pid.0, count = ids.len(), "grouped items into pile");
        Ok(pid)
    }

    /// Break a pile apart; members return to the free collection.
    pub fn dissolve_pile(&mut self, id: PileId) -> Result<Vec<ItemId>> {
        {
            let pile = self.pile(id).ok_or(RoomdeskError::UnknownPile(id))?;
            if pile.system {
                return Err(RoomdeskError::SystemPile);
            }
        }
        let pile = self.piles[id.0 as usize].take().expect("checked above");
        for &member in &pile.members {
            if self.item(member).is_some() {
                self.free_items.push(member);
            }
        }
        tracing::debug!(pile = id.0, count = pile.members.len(), "dissolved pile");
        Ok(pile.members)
    }

    /// Absorb a free item into an existing pile.
    pub fn absorb_into_pile(&mut self, pile: PileId, item: ItemId) -> Result<()> {
        if self.item(item).is_none() {
            return Err(RoomdeskError::UnknownItem(item));
        }
        if !self.is_free(item) {
            return Err(RoomdeskError::DuplicateMembership(item));
        }
        let p = self.pile_mut(pile).ok_or(RoomdeskError::UnknownPile(pile))?;
        p.members.push(item);
        self.free_items.retain(|&f| f != item);
        Ok(())
    }

    /// Eject a member back to the free collection.
    ///
    /// Dissolves the pile if it drops below two members (non-system).
    pub fn eject_from_pile(&mut self, pile: PileId, item: ItemId) -> Result<()> {
        let p = self.pile_mut(pile).ok_or(RoomdeskError::UnknownPile(pile))?;
        if !p.contains(item) {
            return Err(RoomdeskError::UnknownItem(item));
        }
        p.members.retain(|&m| m != item);
        p.clamp_indices();
        let undersized = p.len() < MIN_PILE_SIZE && !p.system;
        self.free_items.push(item);
        if undersized {
            let _ = self.dissolve_pile(pile);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Widgets
    // ------------------------------------------------------------------

    /// Add a widget to the scene.
    pub fn add_widget(&mut self, widget: WidgetItem) -> WidgetId {
        match self.widgets.iter().position(Option::is_none) {
            Some(slot) => {
                self.widgets[slot] = Some(widget);
                WidgetId(slot as u32)
            }
            None => {
                self.widgets.push(Some(widget));
                WidgetId((self.widgets.len() - 1) as u32)
            }
        }
    }

    /// Look up a widget.
    #[must_use]
    pub fn widget(&self, id: WidgetId) -> Option<&WidgetItem> {
        self.widgets.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Look up a widget mutably.
    #[must_use]
    pub fn widget_mut(&mut self, id: WidgetId) -> Option<&mut WidgetItem> {
        self.widgets.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    /// Remove a widget.
    pub fn remove_widget(&mut self, id: WidgetId) -> Option<WidgetItem> {
        if self.dragged_widget == Some(id) {
            self.dragged_widget = None;
        }
        self.widgets.get_mut(id.0 as usize).and_then(Option::take)
    }

    /// Ids of all live widgets.
    pub fn widget_ids(&self) -> impl Iterator<Item = WidgetId> + '_ {
        self.widgets
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| WidgetId(i as u32))
    }

    // ------------------------------------------------------------------
    // Bulk replacement and auditing
    // ------------------------------------------------------------------

    /// Replace the entire scene (load path). Takes effect atomically from
    /// the caller's perspective; the runtime invokes this under the write
    /// lock.
    pub fn replace_all(&mut self, other: SceneState) {
        *self = other;
        self.audit();
    }

    /// Remove every entity, keeping the catalog.
    pub fn clear(&mut self) {
        let catalog = std::mem::take(&mut self.catalog);
        *self = SceneState {
            catalog,
            ..SceneState::default()
        };
    }

    /// Verify and restore structural invariants.
    ///
    /// Debug builds treat violations as precondition failures; release
    /// builds self-heal: duplicate memberships are dropped (first pile
    /// wins), ids both free and piled leave the free set, dangling ids and
    /// undersized non-system piles are removed.
    pub fn audit(&mut self) {
        // Drop dangling ids from the free set.
        let live: Vec<bool> = self.items.iter().map(Option::is_some).collect();
        self.free_items.retain(|id| {
            let ok = live.get(id.0 as usize).copied().unwrap_or(false);
            debug_assert!(ok, "free set held a dangling item id {id:?}");
            ok
        });

        // First pile wins duplicate membership; piled ids leave the free set.
        let mut seen: Vec<ItemId> = Vec::new();
        let mut to_dissolve: Vec<PileId> = Vec::new();
        for (idx, slot) in self.piles.iter_mut().enumerate() {
            let Some(pile) = slot else { continue };
            pile.members.retain(|&m| {
                let is_live = live.get(m.0 as usize).copied().unwrap_or(false);
                let duplicate = seen.contains(&m);
                debug_assert!(is_live, "pile held a dangling item id {m:?}");
                debug_assert!(!duplicate, "item {m:?} present in two piles");
                if is_live && !duplicate {
                    seen.push(m);
                    true
                } else {
                    tracing::warn!(item = m.0, pile = idx, "audit dropped bad pile membership");
                    false
                }
            });
            pile.clamp_indices();
            if pile.len() < MIN_PILE_SIZE && !pile.system {
                to_dissolve.push(PileId(idx as u32));
            }
        }
        let piled_and_free: Vec<ItemId> = self
            .free_items
            .iter()
            .copied()
            .filter(|id| seen.contains(id))
            .collect();
        for id in piled_and_free {
            debug_assert!(false, "item {id:?} both free and piled");
            tracing::warn!(item = id.0, "audit removed piled item from free set");
            self.free_items.retain(|&f| f != id);
        }
        for pid in to_dissolve {
            debug_assert!(false, "undersized pile {pid:?} survived structural ops");
            tracing::warn!(pile = pid.0, "audit dissolved undersized pile");
            let _ = self.dissolve_pile(pid);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemKind;

    fn item_at(x: f32) -> DeskItem {
        DeskItem::new(ItemKind::App, Vec3::new(x, 1.0, 0.0), Surface::Floor)
    }

    fn scene_with(n: usize) -> (SceneState, Vec<ItemId>) {
        let mut scene = SceneState::new();
        let ids = (0..n).map(|i| scene.add_item(item_at(i as f32))).collect();
        (scene, ids)
    }

    #[test]
    fn added_items_start_free() {
        let (scene, ids) = scene_with(3);
        for id in ids {
            assert!(scene.is_free(id));
        }
    }

    #[test]
    fn grouping_is_exclusive() {
        let (mut scene, ids) = scene_with(3);
        let pid = scene
            .group_into_pile(&ids[..2], Vec3::ZERO, Surface::Floor)
            .unwrap();
        assert!(!scene.is_free(ids[0]));
        assert!(!scene.is_free(ids[1]));
        assert!(scene.is_free(ids[2]));
        assert_eq!(scene.pile_of(ids[0]), Some(pid));
        assert_eq!(scene.pile_of(ids[2]), None);
    }

    #[test]
    fn grouping_one_item_fails() {
        let (mut scene, ids) = scene_with(1);
        assert_eq!(
            scene.group_into_pile(&ids, Vec3::ZERO, Surface::Floor),
            Err(RoomdeskError::PileTooSmall(1))
        );
    }

    #[test]
    fn grouping_piled_item_fails() {
        let (mut scene, ids) = scene_with(4);
        scene
            .group_into_pile(&ids[..2], Vec3::ZERO, Surface::Floor)
            .unwrap();
        assert_eq!(
            scene.group_into_pile(&[ids[0], ids[2]], Vec3::ZERO, Surface::Floor),
            Err(RoomdeskError::DuplicateMembership(ids[0]))
        );
    }

    #[test]
    fn dissolve_returns_members_to_free() {
        let (mut scene, ids) = scene_with(3);
        let pid = scene
            .group_into_pile(&ids, Vec3::ZERO, Surface::Floor)
            .unwrap();
        let members = scene.dissolve_pile(pid).unwrap();
        assert_eq!(members, ids);
        for id in ids {
            assert!(scene.is_free(id));
        }
        assert!(scene.pile(pid).is_none());
    }

    #[test]
    fn system_pile_resists_dissolution() {
        let (mut scene, ids) = scene_with(2);
        let pid = scene
            .group_into_pile(&ids, Vec3::ZERO, Surface::Floor)
            .unwrap();
        scene.pile_mut(pid).unwrap().system = true;
        assert_eq!(scene.dissolve_pile(pid), Err(RoomdeskError::SystemPile));
    }

    #[test]
    fn eject_below_minimum_dissolves() {
        let (mut scene, ids) = scene_with(2);
        let pid = scene
            .group_into_pile(&ids, Vec3::ZERO, Surface::Floor)
            .unwrap();
        scene.eject_from_pile(pid, ids[0]).unwrap();
        assert!(scene.pile(pid).is_none());
        assert!(scene.is_free(ids[0]));
        assert!(scene.is_free(ids[1]));
    }

    #[test]
    fn remove_item_clears_references() {
        let (mut scene, ids) = scene_with(3);
        scene.dragged_item = Some(ids[0]);
        scene.selection = vec![ids[0], ids[1]];
        scene.remove_item(ids[0]).unwrap();
        assert_eq!(scene.dragged_item, None);
        assert_eq!(scene.selection, vec![ids[1]]);
        assert!(scene.item(ids[0]).is_none());
        assert_eq!(
            scene.remove_item(ids[0]),
            Err(RoomdeskError::UnknownItem(ids[0]))
        );
    }

    #[test]
    fn slots_are_reused_after_removal() {
        let (mut scene, ids) = scene_with(2);
        scene.remove_item(ids[0]).unwrap();
        let new_id = scene.add_item(item_at(9.0));
        assert_eq!(new_id, ids[0]);
    }

    #[test]
    fn duplicate_app_detection() {
        let mut scene = SceneState::new();
        let bound = item_at(0.0).with_app(AppBinding::new("org.example.mail", "Mail"));
        scene.add_item(bound);
        assert!(scene.has_app_on_desk("org.example.mail"));
        assert!(!scene.has_app_on_desk("org.example.other"));
    }

    #[test]
    #[cfg_attr(debug_assertions, ignore = "audit self-heal is a release-build path")]
    fn audit_heals_double_membership() {
        let (mut scene, ids) = scene_with(4);
        let a = scene
            .group_into_pile(&ids[..2], Vec3::ZERO, Surface::Floor)
            .unwrap();
        let b = scene
            .group_into_pile(&ids[2..], Vec3::ZERO, Surface::Floor)
            .unwrap();
        // Corrupt: same item in both piles.
        scene.pile_mut(b).unwrap().members.push(ids[0]);
        scene.audit();
        assert!(scene.pile(a).unwrap().contains(ids[0]));
        assert!(!scene.pile(b).unwrap().contains(ids[0]));
    }

    #[test]
    fn clear_keeps_catalog() {
        let (mut scene, _) = scene_with(2);
        scene.catalog.push(AppBinding::new("a", "A"));
        scene.clear();
        assert_eq!(scene.catalog.len(), 1);
        assert_eq!(scene.all_item_ids().count(), 0);
    }
}
