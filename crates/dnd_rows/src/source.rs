//! Construction-time configuration of a [`HierarchicalModel`](crate::HierarchicalModel).

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// Tree-mode knobs supplied once by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeOptions {
    /// Pull a node's children from the accessor only when it is first expanded (or first
    /// receives an `Inside` drop). When `false`, the whole tree is realized up front.
    pub virtualize_children: bool,
    /// Property name the accessor is asked about for each node's initial expand state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_expanded_path: Option<String>,
    /// Whether a node without children accepts `Inside` drops.
    pub leaf_accepts_children: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            virtualize_children: true,
            is_expanded_path: None,
            leaf_accepts_children: true,
        }
    }
}

impl TreeOptions {
    pub fn virtualize_children(mut self, virtualize_children: bool) -> Self {
        self.virtualize_children = virtualize_children;
        self
    }

    pub fn is_expanded_path(mut self, path: impl Into<String>) -> Self {
        self.is_expanded_path = Some(path.into());
        self
    }

    pub fn leaf_accepts_children(mut self, accept: bool) -> Self {
        self.leaf_accepts_children = accept;
        self
    }
}

/// Children accessor for lazily expanded trees.
pub trait ChildrenSource<T> {
    /// Ordered children of `item`.
    fn children_of(&self, item: &T) -> Vec<T>;

    /// Cheap leaf test used before a node is realized.
    fn has_children(&self, item: &T) -> bool {
        !self.children_of(item).is_empty()
    }

    /// Initial expand state, consulted only when [`TreeOptions::is_expanded_path`] is set.
    fn is_expanded(&self, _item: &T, _path: &str) -> bool {
        false
    }
}

/// A [`ChildrenSource`] backed by a closure.
pub struct ChildrenFn<T, F> {
    children_of: F,
    _item: PhantomData<fn(&T)>,
}

pub fn children_fn<T, F>(children_of: F) -> ChildrenFn<T, F>
where
    F: Fn(&T) -> Vec<T>,
{
    ChildrenFn {
        children_of,
        _item: PhantomData,
    }
}

impl<T, F> ChildrenSource<T> for ChildrenFn<T, F>
where
    F: Fn(&T) -> Vec<T>,
{
    fn children_of(&self, item: &T) -> Vec<T> {
        (self.children_of)(item)
    }
}
