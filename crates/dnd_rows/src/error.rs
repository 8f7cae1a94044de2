use thiserror::Error;

use crate::node::NodeId;

/// Why a drop request was refused.
///
/// Every variant is an ordinary outcome of a drag gesture. `validate` and `execute`
/// collapse them to `false`; `check` and `apply` hand them back for callers that want
/// to tell the user why the drop indicator turned red.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DropError {
    #[error("a dragged row is the drop target or one of its ancestors")]
    InvalidTarget,
    #[error("the backing collection does not support positional insert/remove")]
    ReadOnlyCollection,
    #[error("the view applies a sort order; manual reordering would be undone")]
    SortedViewConflict,
    #[error("the insertion point lies inside the dragged block")]
    NoOpDrop,
    #[error("no rows were dragged")]
    EmptyDrag,
    #[error("drop target row {index} is out of range")]
    TargetOutOfRange { index: usize },
    #[error("child index {index} is past the end of the target's {len} children")]
    ChildIndexOutOfRange { index: usize, len: usize },
    #[error("dragged row {index} is out of range")]
    DraggedRowOutOfRange { index: usize },
    #[error("row {index} no longer holds the item recorded in the request")]
    StaleRow { index: usize },
    #[error("`Inside` drops need a hierarchical view")]
    InsideOnFlatList,
    #[error("the drop target does not accept children")]
    TargetRejectsChildren,
    #[error("the host rejected the drop")]
    Vetoed,
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Failures of the model's structural mutation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node {0:?} does not belong to this model")]
    UnknownNode(NodeId),
    #[error("child index {index} is out of range for {len} siblings")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("moving {node:?} under {parent:?} would make it its own ancestor")]
    WouldCreateCycle { node: NodeId, parent: NodeId },
}
