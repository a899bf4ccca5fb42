//! Dirty-state bookkeeping for host nodes.
//!
//! A pattern never re-measures itself. It marks its host node dirty and the
//! pipeline picks the node up on the next frame (or immediately when a
//! synchronous flush is requested).

use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::collections::map::HashMap;

/// Identifier of a node in the host tree.
pub type NodeId = u64;

/// Which pipeline phases a node needs to rerun.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DirtyFlags(u8);

impl DirtyFlags {
    pub const NONE: Self = Self(0);
    /// Re-measure the node itself; children keep their cached sizes.
    pub const MEASURE_SELF: Self = Self(1 << 0);
    /// Re-measure the node and every child.
    pub const MEASURE: Self = Self(1 << 1);
    pub const LAYOUT: Self = Self(1 << 2);
    pub const RENDER: Self = Self(1 << 3);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for DirtyFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Tracks dirty flags per node and propagates them to ancestors.
#[derive(Default, Debug)]
pub struct DirtyTracker {
    parents: HashMap<NodeId, Option<NodeId>>,
    dirty: HashMap<NodeId, DirtyFlags>,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `parent` as the parent of `node_id`.
    pub fn attach(&mut self, node_id: NodeId, parent: Option<NodeId>) {
        self.parents.insert(node_id, parent);
    }

    pub fn detach(&mut self, node_id: NodeId) {
        self.parents.remove(&node_id);
        self.dirty.remove(&node_id);
    }

    /// Marks `node_id` and all of its ancestors with `flags`.
    pub fn mark_dirty(&mut self, node_id: NodeId, flags: DirtyFlags) {
        let mut current = Some(node_id);
        while let Some(id) = current {
            self.dirty
                .entry(id)
                .and_modify(|existing| existing.insert(flags))
                .or_insert(flags);
            current = self.parents.get(&id).and_then(|parent| *parent);
        }
    }

    pub fn mark_clean(&mut self, node_id: NodeId, flags: DirtyFlags) {
        if let Some(existing) = self.dirty.get_mut(&node_id) {
            existing.remove(flags);
            if existing.is_empty() {
                self.dirty.remove(&node_id);
            }
        }
    }

    pub fn is_dirty(&self, node_id: NodeId, flags: DirtyFlags) -> bool {
        self.dirty
            .get(&node_id)
            .map(|existing| existing.contains(flags))
            .unwrap_or(false)
    }

    pub fn has_dirty(&self, flags: DirtyFlags) -> bool {
        self.dirty.values().any(|existing| existing.contains(flags))
    }

    /// Nodes currently carrying any of `flags`, in ascending id order.
    pub fn dirty_nodes(&self, flags: DirtyFlags) -> SmallVec<[NodeId; 8]> {
        let mut nodes: SmallVec<[NodeId; 8]> = self
            .dirty
            .iter()
            .filter(|(_, existing)| existing.contains(flags))
            .map(|(id, _)| *id)
            .collect();
        nodes.sort_unstable();
        nodes
    }
}

/// Non-owning handle a pattern keeps to the node hosting it.
#[derive(Clone, Debug)]
pub struct HostNode {
    id: NodeId,
    tracker: Rc<RefCell<DirtyTracker>>,
}

impl HostNode {
    pub fn new(id: NodeId, tracker: Rc<RefCell<DirtyTracker>>) -> Self {
        Self { id, tracker }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn mark_dirty(&self, flags: DirtyFlags) {
        self.tracker.borrow_mut().mark_dirty(self.id, flags);
    }

    pub fn mark_clean(&self, flags: DirtyFlags) {
        self.tracker.borrow_mut().mark_clean(self.id, flags);
    }

    pub fn is_dirty(&self, flags: DirtyFlags) -> bool {
        self.tracker.borrow().is_dirty(self.id, flags)
    }
}
