mod error;
mod flat;
mod handler;
mod model;
mod node;
mod request;
mod source;
mod tree;

pub use error::{DropError, TreeError};
pub use flat::{FlatReorderHandler, RowCollection};
pub use handler::{ReorderHandler, RowDropHandler};
pub use model::HierarchicalModel;
pub use node::{Node, NodeId};
pub use request::{
    DragSource, DraggedRow, DropDestination, DropPlan, DropPosition, DropRequest, DropResult,
    DropTarget, ViewState,
};
pub use source::{ChildrenFn, ChildrenSource, TreeOptions, children_fn};
pub use tree::HierarchicalReorderHandler;
