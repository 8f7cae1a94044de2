use std::ops::Range;

use slotmap::{SecondaryMap, SlotMap};
use tracing::{debug, trace};

use crate::error::TreeError;
use crate::node::{Node, NodeId};
use crate::source::{ChildrenSource, TreeOptions};

/// Owns a tree of items and the flattened table of its visible rows.
///
/// A node is visible when every ancestor is expanded. The visible nodes, in depth-first
/// pre-order, form the slot table a virtualized viewport scrolls over. The table is patched
/// in place (a contiguous run of slots inserted or removed) whenever a node is expanded,
/// collapsed, inserted, moved or removed, so it is never rebuilt from scratch outside of
/// [`HierarchicalModel::set_roots`] and the bulk expand/collapse helpers.
pub struct HierarchicalModel<T> {
    options: TreeOptions,
    source: Option<Box<dyn ChildrenSource<T>>>,
    nodes: SlotMap<NodeId, Node<T>>,
    roots: Vec<NodeId>,
    slots: Vec<NodeId>,
    slot_of: SecondaryMap<NodeId, usize>,
}

impl<T> Default for HierarchicalModel<T> {
    fn default() -> Self {
        Self::new(TreeOptions::default())
    }
}

impl<T> HierarchicalModel<T> {
    /// A model whose tree is built by hand through [`HierarchicalModel::insert_child`].
    pub fn new(options: TreeOptions) -> Self {
        Self {
            options,
            source: None,
            nodes: SlotMap::with_key(),
            roots: Vec::new(),
            slots: Vec::new(),
            slot_of: SecondaryMap::new(),
        }
    }

    /// A model that pulls children from `source`.
    pub fn with_source(options: TreeOptions, source: impl ChildrenSource<T> + 'static) -> Self {
        let mut model = Self::new(options);
        model.source = Some(Box::new(source));
        model
    }

    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    pub fn set_root(&mut self, item: T) {
        self.set_roots([item]);
    }

    /// Replace the whole tree and rebuild the slot table.
    pub fn set_roots(&mut self, items: impl IntoIterator<Item = T>) {
        self.nodes.clear();
        self.roots.clear();
        self.slots.clear();
        self.slot_of.clear();

        for item in items {
            let id = self.alloc(item, None);
            self.roots.push(id);
        }

        if !self.options.virtualize_children {
            for root in self.roots.clone() {
                self.realize_subtree(root);
            }
        }

        self.rebuild_slots();
        debug!(
            roots = self.roots.len(),
            visible = self.slots.len(),
            "rebuilt slot table"
        );
    }

    // Queries.

    /// Number of visible rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total number of nodes held in memory, visible or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.get(id)
    }

    pub fn item(&self, id: NodeId) -> Option<&T> {
        self.nodes.get(id).map(Node::item)
    }

    pub fn item_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(id).map(Node::item_mut)
    }

    /// Slot of `id` in the visible projection, or `None` when the node is hidden under a
    /// collapsed ancestor (or unknown).
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let slot = self.slot_of.get(id).copied()?;
        debug_assert_eq!(
            self.slots.get(slot),
            Some(&id),
            "slot table out of sync for {id:?}"
        );
        Some(slot)
    }

    pub fn node_at(&self, slot: usize) -> Option<NodeId> {
        self.slots.get(slot).copied()
    }

    pub fn is_visible(&self, id: NodeId) -> bool {
        self.slot_of.contains_key(id)
    }

    /// Visible rows in slot order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = NodeId> + '_ {
        self.slots.iter().copied()
    }

    /// The visible rows in `range`, clamped to the table.
    pub fn visible_rows(&self, range: Range<usize>) -> &[NodeId] {
        let end = range.end.min(self.slots.len());
        let start = range.start.min(end);
        &self.slots[start..end]
    }

    /// Map a scroll window over uniformly sized rows to the slots it covers.
    ///
    /// Partially visible rows at either edge are included.
    pub fn slots_in_viewport(
        &self,
        scroll_offset: f32,
        viewport_height: f32,
        row_height: f32,
    ) -> Range<usize> {
        if !row_height.is_finite() || row_height <= 0.0 || self.slots.is_empty() {
            return 0..0;
        }
        let offset = scroll_offset.max(0.0);
        let height = viewport_height.max(0.0);
        let len = self.slots.len();
        let start = ((offset / row_height).floor() as usize).min(len);
        let end = (((offset + height) / row_height).ceil() as usize).clamp(start, len);
        start..end
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(Node::parent)
    }

    /// Children of `id` held in memory, see [`Node::children`].
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(Node::children).unwrap_or(&[])
    }

    /// Child count of `id`, asking the accessor when the node is not realized yet.
    pub fn child_count(&self, id: NodeId) -> usize {
        let Some(node) = self.nodes.get(id) else {
            return 0;
        };
        if node.realized {
            return node.children.len();
        }
        self.source
            .as_ref()
            .map(|source| source.children_of(node.item()).len())
            .unwrap_or(0)
    }

    /// Position of `id` within its parent's children (or the roots).
    pub fn child_index(&self, id: NodeId) -> Option<usize> {
        let node = self.nodes.get(id)?;
        self.siblings(node.parent)?
            .iter()
            .position(|&sibling| sibling == id)
    }

    /// Number of ancestors; roots have depth 0.
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent_of(id), move |&parent| self.parent_of(parent))
    }

    /// Whether `ancestor` is `node` or lies on `node`'s parent chain.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|id| id == ancestor)
    }

    /// Every node held in memory, depth-first pre-order, whatever its expand state.
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children_of(id).iter().rev().copied());
        }
        out
    }

    /// First node in pre-order whose item matches.
    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<NodeId> {
        self.pre_order()
            .into_iter()
            .find(|&id| self.item(id).is_some_and(&mut predicate))
    }

    /// Whether `id` takes `Inside` drops.
    pub fn accepts_children(&self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        node.accepts_children
            .unwrap_or_else(|| self.options.leaf_accepts_children || !node.is_leaf())
    }

    pub fn set_accepts_children(&mut self, id: NodeId, accept: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.accepts_children = Some(accept);
        }
    }

    // Expand state.

    /// Show the children of `id`. Returns `false` when nothing changed (unknown node,
    /// already expanded, or a leaf).
    pub fn expand(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        if node.expanded {
            return false;
        }
        self.realize(id);
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        if node.children.is_empty() {
            return false;
        }
        node.expanded = true;

        if let Some(slot) = self.index_of(id) {
            let mut run = Vec::new();
            for child in self.children_of(id).to_vec() {
                self.collect_run(child, &mut run);
            }
            trace!(?id, slot, rows = run.len(), "expand");
            self.splice_in(slot + 1, run);
        }
        true
    }

    /// Hide the children of `id`. They stay in memory for a cheap re-expand.
    pub fn collapse(&mut self, id: NodeId) -> bool {
        if !self.nodes.get(id).is_some_and(|node| node.expanded) {
            return false;
        }
        if let Some(slot) = self.index_of(id) {
            let len = self.visible_run_len(id) - 1;
            trace!(?id, slot, rows = len, "collapse");
            self.splice_out(slot + 1, len);
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.expanded = false;
        }
        true
    }

    pub fn toggle(&mut self, id: NodeId) -> bool {
        if self.nodes.get(id).is_some_and(|node| node.expanded) {
            self.collapse(id)
        } else {
            self.expand(id)
        }
    }

    /// Expand every node that has children, realizing the whole tree.
    pub fn expand_all(&mut self) {
        let mut stack = self.roots.clone();
        while let Some(id) = stack.pop() {
            self.realize(id);
            if let Some(node) = self.nodes.get_mut(id) {
                node.expanded = !node.children.is_empty();
                stack.extend(node.children.iter().copied());
            }
        }
        self.rebuild_slots();
    }

    pub fn collapse_all(&mut self) {
        for (_, node) in self.nodes.iter_mut() {
            node.expanded = false;
        }
        self.rebuild_slots();
    }

    // Structural mutation. Everything that changes a child list goes through here so the
    // slot table hooks below see it.

    /// Insert a new node for `item` at `index` among the children of `parent` (`None` for the
    /// root list).
    pub fn insert_child(
        &mut self,
        parent: Option<NodeId>,
        index: usize,
        item: T,
    ) -> Result<NodeId, TreeError> {
        if let Some(parent) = parent {
            if !self.nodes.contains_key(parent) {
                return Err(TreeError::UnknownNode(parent));
            }
            self.realize(parent);
        }
        let len = self.siblings(parent).map_or(0, Vec::len);
        if index > len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }

        let id = self.alloc(item, parent);
        if let Some(siblings) = self.siblings_mut(parent) {
            siblings.insert(index, id);
        }
        self.on_child_inserted(parent, index, id);
        Ok(id)
    }

    /// Append a new node for `item` as the last child of `parent`.
    pub fn push_child(&mut self, parent: Option<NodeId>, item: T) -> Result<NodeId, TreeError> {
        if let Some(parent) = parent {
            if !self.nodes.contains_key(parent) {
                return Err(TreeError::UnknownNode(parent));
            }
            self.realize(parent);
        }
        let index = self.siblings(parent).map_or(0, Vec::len);
        self.insert_child(parent, index, item)
    }

    /// Detach `id` and reattach it at `index` among the children of `new_parent`.
    ///
    /// `index` is read against the destination list as it looks once `id` has been taken out
    /// of its current list, so moving within one parent uses post-removal positions.
    pub fn move_node(
        &mut self,
        id: NodeId,
        new_parent: Option<NodeId>,
        index: usize,
    ) -> Result<(), TreeError> {
        let old_parent = self.nodes.get(id).ok_or(TreeError::UnknownNode(id))?.parent;
        if let Some(parent) = new_parent {
            if !self.nodes.contains_key(parent) {
                return Err(TreeError::UnknownNode(parent));
            }
            if self.is_ancestor_or_self(id, parent) {
                return Err(TreeError::WouldCreateCycle { node: id, parent });
            }
            self.realize(parent);
        }
        let old_index = self.child_index(id).ok_or(TreeError::UnknownNode(id))?;

        if old_parent == new_parent {
            let len = self.siblings(new_parent).map_or(0, Vec::len);
            if index >= len {
                return Err(TreeError::IndexOutOfRange { index, len: len - 1 });
            }
            if index == old_index {
                return Ok(());
            }
            if let Some(siblings) = self.siblings_mut(new_parent) {
                siblings.remove(old_index);
                siblings.insert(index, id);
            }
            self.on_child_moved(new_parent, old_index, index, id);
            return Ok(());
        }

        let len = self.siblings(new_parent).map_or(0, Vec::len);
        if index > len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }

        self.on_child_removed(old_parent, old_index, id);
        if let Some(siblings) = self.siblings_mut(old_parent) {
            siblings.remove(old_index);
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = new_parent;
        }
        if let Some(siblings) = self.siblings_mut(new_parent) {
            siblings.insert(index, id);
        }
        self.on_child_inserted(new_parent, index, id);
        Ok(())
    }

    /// Remove `id` and its whole subtree, returning its item.
    pub fn remove_node(&mut self, id: NodeId) -> Result<T, TreeError> {
        let parent = self.nodes.get(id).ok_or(TreeError::UnknownNode(id))?.parent;
        let index = self.child_index(id).ok_or(TreeError::UnknownNode(id))?;

        self.on_child_removed(parent, index, id);
        if let Some(siblings) = self.siblings_mut(parent) {
            siblings.remove(index);
        }

        let mut stack = self.children_of(id).to_vec();
        while let Some(descendant) = stack.pop() {
            if let Some(node) = self.nodes.remove(descendant) {
                stack.extend(node.children);
            }
        }
        self.nodes
            .remove(id)
            .map(Node::into_item)
            .ok_or(TreeError::UnknownNode(id))
    }

    // Slot table hooks. Each runs right after the child list named by `parent` changed.

    fn on_child_inserted(&mut self, parent: Option<NodeId>, index: usize, child: NodeId) {
        if !self.shows_children(parent) {
            return;
        }
        let at = self.slot_for_child(parent, index);
        let mut run = Vec::new();
        self.collect_run(child, &mut run);
        trace!(?parent, index, at, rows = run.len(), "child inserted");
        self.splice_in(at, run);
    }

    /// Runs before `child` leaves the list; the run length only depends on its own subtree.
    fn on_child_removed(&mut self, parent: Option<NodeId>, index: usize, child: NodeId) {
        let Some(at) = self.index_of(child) else {
            return;
        };
        let len = self.visible_run_len(child);
        trace!(?parent, index, at, rows = len, "child removed");
        self.splice_out(at, len);
    }

    fn on_child_moved(&mut self, parent: Option<NodeId>, from: usize, to: usize, child: NodeId) {
        let Some(at) = self.index_of(child) else {
            return;
        };
        let len = self.visible_run_len(child);
        let run = self.splice_out(at, len);
        let to_slot = self.slot_for_child(parent, to);
        trace!(?parent, from, to, at, to_slot, rows = len, "child moved");
        self.splice_in(to_slot, run);
    }

    // Internals.

    fn alloc(&mut self, item: T, parent: Option<NodeId>) -> NodeId {
        let (expanded, has_children) = match self.source.as_deref() {
            Some(source) => {
                let expanded = self
                    .options
                    .is_expanded_path
                    .as_deref()
                    .is_some_and(|path| source.is_expanded(&item, path));
                (expanded, source.has_children(&item))
            }
            None => (false, false),
        };
        let realized = self.source.is_none();
        self.nodes
            .insert(Node::new(item, parent, expanded, realized, has_children))
    }

    /// Pull the children of `id` from the accessor, once.
    fn realize(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if node.realized {
            return;
        }
        let items = match self.source.as_deref() {
            Some(source) => source.children_of(node.item()),
            None => Vec::new(),
        };
        let children: Vec<NodeId> = items
            .into_iter()
            .map(|item| self.alloc(item, Some(id)))
            .collect();
        trace!(?id, children = children.len(), "realized children");
        if let Some(node) = self.nodes.get_mut(id) {
            node.children = children;
            node.realized = true;
        }
    }

    fn realize_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            self.realize(id);
            stack.extend(self.children_of(id).iter().copied());
        }
    }

    fn siblings(&self, parent: Option<NodeId>) -> Option<&Vec<NodeId>> {
        match parent {
            None => Some(&self.roots),
            Some(parent) => self.nodes.get(parent).map(|node| &node.children),
        }
    }

    fn siblings_mut(&mut self, parent: Option<NodeId>) -> Option<&mut Vec<NodeId>> {
        match parent {
            None => Some(&mut self.roots),
            Some(parent) => self.nodes.get_mut(parent).map(|node| &mut node.children),
        }
    }

    /// Whether children of `parent` appear in the slot table.
    fn shows_children(&self, parent: Option<NodeId>) -> bool {
        match parent {
            None => true,
            Some(parent) => {
                self.is_visible(parent) && self.nodes.get(parent).is_some_and(|n| n.expanded)
            }
        }
    }

    /// Slot where the child at `index` of a shown `parent` starts.
    fn slot_for_child(&self, parent: Option<NodeId>, index: usize) -> usize {
        if index > 0
            && let Some(&prev) = self.siblings(parent).and_then(|s| s.get(index - 1))
        {
            return self.slot(prev) + self.visible_run_len(prev);
        }
        match parent {
            Some(parent) => self.slot(parent) + 1,
            None => 0,
        }
    }

    fn slot(&self, id: NodeId) -> usize {
        match self.index_of(id) {
            Some(slot) => slot,
            None => panic!("slot table out of sync: {id:?} should be visible"),
        }
    }

    /// Rows occupied by `id` and its visible descendants.
    fn visible_run_len(&self, id: NodeId) -> usize {
        let mut len = 0;
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            len += 1;
            if let Some(node) = self.nodes.get(id)
                && node.expanded
            {
                stack.extend(node.children.iter().copied());
            }
        }
        len
    }

    /// Pre-order run of `start` and its visible descendants, realizing expanded nodes on the
    /// way.
    fn collect_run(&mut self, start: NodeId, out: &mut Vec<NodeId>) {
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            out.push(id);
            if self.nodes.get(id).is_some_and(|node| node.expanded) {
                self.realize(id);
                stack.extend(self.children_of(id).iter().rev().copied());
            }
        }
    }

    fn rebuild_slots(&mut self) {
        let mut slots = Vec::with_capacity(self.roots.len());
        for root in self.roots.clone() {
            self.collect_run(root, &mut slots);
        }
        self.slots = slots;
        self.slot_of.clear();
        self.renumber_from(0);
    }

    fn splice_in(&mut self, at: usize, run: Vec<NodeId>) {
        if run.is_empty() {
            return;
        }
        self.slots.splice(at..at, run);
        self.renumber_from(at);
    }

    fn splice_out(&mut self, at: usize, len: usize) -> Vec<NodeId> {
        let removed: Vec<NodeId> = self.slots.drain(at..at + len).collect();
        for &id in &removed {
            self.slot_of.remove(id);
        }
        self.renumber_from(at);
        removed
    }

    fn renumber_from(&mut self, start: usize) {
        for (slot, &id) in self.slots.iter().enumerate().skip(start) {
            self.slot_of.insert(id, slot);
        }
    }

    /// Panic if the slot table or the parent links disagree with the tree.
    ///
    /// A mismatch means something mutated the tree behind the model's back; there is no way
    /// to recover from that.
    pub fn assert_consistent(&self) {
        let mut reached = 0usize;
        let mut visible = Vec::with_capacity(self.slots.len());
        let mut stack: Vec<(NodeId, Option<NodeId>, bool)> =
            self.roots.iter().rev().map(|&id| (id, None, true)).collect();
        while let Some((id, parent, shown)) = stack.pop() {
            reached += 1;
            assert!(
                reached <= self.nodes.len(),
                "tree walk visited more nodes than exist; a child list repeats a node"
            );
            let Some(node) = self.nodes.get(id) else {
                panic!("{id:?} is listed as a child but is not in the arena");
            };
            assert_eq!(node.parent, parent, "{id:?} has a stale parent link");
            if shown {
                visible.push(id);
                assert!(
                    !node.expanded || node.realized,
                    "{id:?} is shown expanded but its children were never realized"
                );
            }
            let shows = shown && node.expanded;
            stack.extend(node.children.iter().rev().map(|&child| (child, Some(id), shows)));
        }
        assert_eq!(reached, self.nodes.len(), "arena holds detached nodes");

        assert_eq!(self.slots, visible, "slot table is not the visible pre-order");
        assert_eq!(
            self.slot_of.len(),
            self.slots.len(),
            "slot index has stale entries"
        );
        for (slot, &id) in self.slots.iter().enumerate() {
            assert_eq!(self.slot_of.get(id), Some(&slot), "{id:?} has a stale slot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::children_fn;

    type Shape<'a> = &'a [(&'static str, &'a [&'static str])];

    fn model(shape: Shape<'_>) -> (HierarchicalModel<&'static str>, Vec<NodeId>) {
        let mut model = HierarchicalModel::new(TreeOptions::default());
        let mut ids = Vec::new();
        for (root, children) in shape {
            let root_id = model.push_child(None, *root).unwrap();
            ids.push(root_id);
            for child in children.iter() {
                ids.push(model.push_child(Some(root_id), *child).unwrap());
            }
        }
        (model, ids)
    }

    fn labels(model: &HierarchicalModel<&'static str>) -> Vec<&'static str> {
        model.rows().map(|id| *model.item(id).unwrap()).collect()
    }

    #[test]
    fn collapsed_children_are_not_slotted() {
        let (model, ids) = model(&[("A", &["A1", "A2"]), ("B", &[])]);
        assert_eq!(labels(&model), vec!["A", "B"]);
        assert_eq!(model.index_of(ids[1]), None);
        assert_eq!(model.index_of(ids[3]), Some(1));
        model.assert_consistent();
    }

    #[test]
    fn expand_inserts_run_and_collapse_removes_it() {
        let (mut model, ids) = model(&[("A", &["A1", "A2"]), ("B", &["B1"])]);
        let (a, b) = (ids[0], ids[3]);

        assert!(model.expand(b));
        assert_eq!(labels(&model), vec!["A", "B", "B1"]);
        assert!(model.expand(a));
        assert_eq!(labels(&model), vec!["A", "A1", "A2", "B", "B1"]);
        assert!(!model.expand(a));
        model.assert_consistent();

        assert!(model.collapse(a));
        assert_eq!(labels(&model), vec!["A", "B", "B1"]);
        assert_eq!(model.children_of(a).len(), 2);
        assert_eq!(model.index_of(b), Some(1));
        model.assert_consistent();
    }

    #[test]
    fn nested_expand_state_survives_ancestor_collapse() {
        let mut model = HierarchicalModel::new(TreeOptions::default());
        let a = model.push_child(None, "A").unwrap();
        let a1 = model.push_child(Some(a), "A1").unwrap();
        model.push_child(Some(a1), "A1x").unwrap();
        model.push_child(None, "B").unwrap();

        model.expand(a);
        model.expand(a1);
        assert_eq!(labels(&model), vec!["A", "A1", "A1x", "B"]);
        model.collapse(a);
        assert_eq!(labels(&model), vec!["A", "B"]);
        model.expand(a);
        assert_eq!(labels(&model), vec!["A", "A1", "A1x", "B"]);
        model.assert_consistent();
    }

    #[test]
    fn leaf_does_not_expand() {
        let (mut model, ids) = model(&[("A", &[])]);
        assert!(!model.expand(ids[0]));
        assert!(!model.node(ids[0]).unwrap().is_expanded());
    }

    #[test]
    fn node_at_out_of_range_is_none() {
        let (model, _) = model(&[("A", &[])]);
        assert!(model.node_at(1).is_none());
        assert!(model.node_at(0).is_some());
    }

    #[test]
    fn lazy_source_realizes_on_expand() {
        let source = children_fn(|n: &u32| {
            if *n < 100 {
                vec![n * 10 + 1, n * 10 + 2]
            } else {
                vec![]
            }
        });
        let mut model = HierarchicalModel::with_source(TreeOptions::default(), source);
        model.set_roots([1, 2]);

        assert_eq!(model.node_count(), 2);
        let root = model.node_at(0).unwrap();
        assert!(!model.node(root).unwrap().is_realized());
        assert!(!model.node(root).unwrap().is_leaf());

        model.expand(root);
        let rows: Vec<u32> = model.rows().map(|id| *model.item(id).unwrap()).collect();
        assert_eq!(rows, vec![1, 11, 12, 2]);
        assert_eq!(model.node_count(), 4);
        model.assert_consistent();
    }

    #[test]
    fn eager_source_realizes_everything() {
        let source = children_fn(|n: &u32| if *n < 10 { vec![n * 10 + 1] } else { vec![] });
        let options = TreeOptions::default().virtualize_children(false);
        let mut model = HierarchicalModel::with_source(options, source);
        model.set_root(1);
        assert_eq!(model.node_count(), 2);
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn viewport_maps_offsets_to_slots() {
        let mut model = HierarchicalModel::new(TreeOptions::default());
        for ix in 0..10 {
            model.push_child(None, ix).unwrap();
        }
        assert_eq!(model.slots_in_viewport(0.0, 50.0, 20.0), 0..3);
        assert_eq!(model.slots_in_viewport(30.0, 40.0, 20.0), 1..4);
        assert_eq!(model.slots_in_viewport(500.0, 40.0, 20.0), 10..10);
        assert_eq!(model.slots_in_viewport(0.0, 40.0, 0.0), 0..0);
        assert_eq!(model.visible_rows(8..20).len(), 2);
    }

    #[test]
    fn move_node_rejects_cycles() {
        let mut model = HierarchicalModel::new(TreeOptions::default());
        let a = model.push_child(None, "A").unwrap();
        let b = model.push_child(Some(a), "B").unwrap();
        assert_eq!(
            model.move_node(a, Some(b), 0),
            Err(TreeError::WouldCreateCycle { node: a, parent: b })
        );
        assert_eq!(
            model.move_node(a, Some(a), 0),
            Err(TreeError::WouldCreateCycle { node: a, parent: a })
        );
        model.assert_consistent();
    }

    #[test]
    fn move_within_parent_patches_slots() {
        let (mut model, ids) = model(&[("A", &["A1", "A2", "A3"])]);
        model.expand(ids[0]);
        model.move_node(ids[3], Some(ids[0]), 0).unwrap();
        assert_eq!(labels(&model), vec!["A", "A3", "A1", "A2"]);
        model.assert_consistent();
    }

    #[test]
    fn move_into_collapsed_parent_hides_subtree() {
        let (mut model, ids) = model(&[("A", &["A1"]), ("B", &["B1"])]);
        model.expand(ids[0]);
        model.move_node(ids[1], Some(ids[2]), 1).unwrap();
        assert_eq!(labels(&model), vec!["A", "B"]);
        assert_eq!(model.index_of(ids[1]), None);
        model.expand(ids[2]);
        assert_eq!(labels(&model), vec!["A", "B", "B1", "A1"]);
        model.assert_consistent();
    }

    #[test]
    fn remove_node_drops_subtree() {
        let (mut model, ids) = model(&[("A", &["A1", "A2"]), ("B", &[])]);
        model.expand(ids[0]);
        assert_eq!(model.remove_node(ids[0]), Ok("A"));
        assert_eq!(labels(&model), vec!["B"]);
        assert_eq!(model.node_count(), 1);
        assert!(!model.contains(ids[1]));
        model.assert_consistent();
    }

    #[test]
    fn depth_and_ancestry() {
        let mut model = HierarchicalModel::new(TreeOptions::default());
        let a = model.push_child(None, "A").unwrap();
        let b = model.push_child(Some(a), "B").unwrap();
        let c = model.push_child(Some(b), "C").unwrap();
        assert_eq!(model.depth(c), 2);
        assert!(model.is_ancestor_or_self(a, c));
        assert!(model.is_ancestor_or_self(c, c));
        assert!(!model.is_ancestor_or_self(c, a));
        assert_eq!(model.ancestors(c).collect::<Vec<_>>(), vec![b, a]);
    }
}
