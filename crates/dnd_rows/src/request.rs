use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::node::NodeId;

/// Where a drop lands relative to the target row.
///
/// The host classifies the pointer against the row bounds before building the request; the
/// engine never sees pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPosition {
    Before,
    After,
    /// Become a child of the target.
    Inside,
}

/// Whether the dragged rows come from the grid receiving the drop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragSource {
    #[default]
    Local,
    /// Another grid; the rows are copied in and nothing is removed here.
    External,
}

/// View state captured when the drop gesture started.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    pub read_only: bool,
    /// The view applies an explicit sort order.
    pub sorted: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DraggedRow<T> {
    pub item: T,
    /// Row index in the source view at drag start.
    pub index: usize,
}

impl<T> DraggedRow<T> {
    pub fn new(item: T, index: usize) -> Self {
        Self { item, index }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DropTarget<T> {
    pub item: T,
    pub index: usize,
}

/// One requested move. Built once by the drag controller, then handed to a
/// [`RowDropHandler`](crate::RowDropHandler).
///
/// A request without a target drops after the last row (or as the last root).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DropRequest<T> {
    dragged: Vec<DraggedRow<T>>,
    #[serde(default)]
    target: Option<DropTarget<T>>,
    position: DropPosition,
    #[serde(default)]
    child_index: Option<usize>,
    #[serde(default)]
    source: DragSource,
    #[serde(default)]
    view: ViewState,
}

impl<T> DropRequest<T> {
    pub fn new(dragged: impl IntoIterator<Item = DraggedRow<T>>, position: DropPosition) -> Self {
        Self {
            dragged: dragged.into_iter().collect(),
            target: None,
            position,
            child_index: None,
            source: DragSource::Local,
            view: ViewState::default(),
        }
    }

    pub fn target(mut self, item: T, index: usize) -> Self {
        self.target = Some(DropTarget { item, index });
        self
    }

    /// Explicit position among the target's children for `Inside` drops.
    pub fn child_index(mut self, index: usize) -> Self {
        self.child_index = Some(index);
        self
    }

    pub fn source(mut self, source: DragSource) -> Self {
        self.source = source;
        self
    }

    pub fn view(mut self, view: ViewState) -> Self {
        self.view = view;
        self
    }

    #[inline]
    pub fn dragged(&self) -> &[DraggedRow<T>] {
        &self.dragged
    }

    /// Dragged rows sorted by their source index.
    pub fn dragged_in_order(&self) -> Vec<&DraggedRow<T>> {
        let mut rows: Vec<&DraggedRow<T>> = self.dragged.iter().collect();
        rows.sort_by_key(|row| row.index);
        rows
    }

    #[inline]
    pub fn drop_target(&self) -> Option<&DropTarget<T>> {
        self.target.as_ref()
    }

    #[inline]
    pub fn position(&self) -> DropPosition {
        self.position
    }

    #[inline]
    pub fn explicit_child_index(&self) -> Option<usize> {
        self.child_index
    }

    #[inline]
    pub fn drag_source(&self) -> DragSource {
        self.source
    }

    #[inline]
    pub fn view_state(&self) -> ViewState {
        self.view
    }

    pub fn is_external(&self) -> bool {
        self.source == DragSource::External
    }
}

/// The collection a drop lands in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DropDestination {
    /// The flat list.
    List,
    /// The model's root list.
    Roots,
    /// The children of a node.
    Children(NodeId),
}

impl DropDestination {
    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Self::Children(parent) => Some(*parent),
            Self::List | Self::Roots => None,
        }
    }
}

/// What a handler would do for a request, computed without mutating anything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropPlan {
    pub destination: DropDestination,
    /// Insertion point in the destination before any dragged row is taken out.
    pub insert_at: usize,
    /// Source rows that will be moved, ascending. Empty for external drops.
    pub rows: Vec<usize>,
}

/// A drop that has been applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropResult {
    pub destination: DropDestination,
    /// Index of the first dropped row within the destination.
    pub index: usize,
    pub count: usize,
    /// Moved or created nodes, in destination order. Empty in flat mode.
    pub nodes: Vec<NodeId>,
}

impl DropResult {
    /// Positions the dropped rows now occupy in the destination.
    pub fn range(&self) -> Range<usize> {
        self.index..self.index + self.count
    }
}
