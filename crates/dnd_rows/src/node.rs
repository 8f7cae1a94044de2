use slotmap::new_key_type;

new_key_type! {
    /// Handle into the model's node arena. Stable across moves and expand/collapse.
    pub struct NodeId;
}

/// A tree element: an item plus its place in the hierarchy.
///
/// Nodes live in the [`HierarchicalModel`](crate::HierarchicalModel) arena. The parent link
/// is a plain [`NodeId`], so a child never owns its parent; ownership flows from the parent's
/// child list (or the model's root list) down to the child.
#[derive(Debug, Clone)]
pub struct Node<T> {
    item: T,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) expanded: bool,
    /// Whether `children` reflects the children accessor yet.
    pub(crate) realized: bool,
    pub(crate) has_children_hint: bool,
    pub(crate) accepts_children: Option<bool>,
}

impl<T> Node<T> {
    pub(crate) fn new(
        item: T,
        parent: Option<NodeId>,
        expanded: bool,
        realized: bool,
        has_children_hint: bool,
    ) -> Self {
        Self {
            item,
            parent,
            children: Vec::new(),
            expanded,
            realized,
            has_children_hint,
            accepts_children: None,
        }
    }

    #[inline]
    pub fn item(&self) -> &T {
        &self.item
    }

    #[inline]
    pub(crate) fn item_mut(&mut self) -> &mut T {
        &mut self.item
    }

    pub(crate) fn into_item(self) -> T {
        self.item
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children currently held in memory.
    ///
    /// Empty for a node whose children have not been pulled from the accessor yet, see
    /// [`Node::is_realized`].
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[inline]
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    #[inline]
    pub fn is_realized(&self) -> bool {
        self.realized
    }

    /// A realized node is a leaf when it has no children; an unrealized one asks the
    /// accessor's `has_children` answer captured when the node was created.
    pub fn is_leaf(&self) -> bool {
        if self.realized {
            self.children.is_empty()
        } else {
            !self.has_children_hint
        }
    }
}
