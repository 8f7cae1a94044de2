use std::rc::Rc;

use crate::error::DropError;
use crate::flat::{FlatReorderHandler, RowCollection};
use crate::request::{DropPlan, DropRequest, DropResult};
use crate::tree::HierarchicalReorderHandler;

/// The contract between the drag controller and a reorder engine.
///
/// `check` and `apply` carry the reason a drop was refused; `validate` and `execute` are
/// the boolean forms the controller usually wants. A successful `apply` has already mutated
/// the backing rows; there is no separate commit step.
pub trait RowDropHandler<T> {
    fn check(&self, request: &DropRequest<T>) -> Result<DropPlan, DropError>;

    /// Re-validates, then performs the move.
    fn apply(&mut self, request: &DropRequest<T>) -> Result<DropResult, DropError>;

    fn validate(&self, request: &DropRequest<T>) -> bool {
        self.check(request).is_ok()
    }

    fn execute(&mut self, request: &DropRequest<T>) -> bool {
        self.apply(request).is_ok()
    }
}

pub(crate) struct DropCallbacks<T> {
    pub(crate) can_drop: Option<Rc<dyn Fn(&DropRequest<T>, &DropPlan) -> bool>>,
    pub(crate) on_drop: Option<Rc<dyn Fn(&DropRequest<T>, &DropResult)>>,
}

impl<T> Default for DropCallbacks<T> {
    fn default() -> Self {
        Self {
            can_drop: None,
            on_drop: None,
        }
    }
}

impl<T> DropCallbacks<T> {
    pub(crate) fn allows(&self, request: &DropRequest<T>, plan: &DropPlan) -> bool {
        self.can_drop
            .as_ref()
            .map(|f| f(request, plan))
            .unwrap_or(true)
    }

    pub(crate) fn dropped(&self, request: &DropRequest<T>, result: &DropResult) {
        if let Some(on_drop) = self.on_drop.as_ref() {
            on_drop(request, result);
        }
    }
}

/// Flat or tree reordering, picked once when the grid is configured.
pub enum ReorderHandler<T, C = Vec<T>> {
    Flat(FlatReorderHandler<T, C>),
    Tree(HierarchicalReorderHandler<T>),
}

impl<T, C> ReorderHandler<T, C> {
    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Tree(_))
    }

    pub fn as_flat(&self) -> Option<&FlatReorderHandler<T, C>> {
        match self {
            Self::Flat(handler) => Some(handler),
            Self::Tree(_) => None,
        }
    }

    pub fn as_tree(&self) -> Option<&HierarchicalReorderHandler<T>> {
        match self {
            Self::Tree(handler) => Some(handler),
            Self::Flat(_) => None,
        }
    }
}

impl<T, C> From<FlatReorderHandler<T, C>> for ReorderHandler<T, C> {
    fn from(handler: FlatReorderHandler<T, C>) -> Self {
        Self::Flat(handler)
    }
}

impl<T, C> From<HierarchicalReorderHandler<T>> for ReorderHandler<T, C> {
    fn from(handler: HierarchicalReorderHandler<T>) -> Self {
        Self::Tree(handler)
    }
}

impl<T, C> RowDropHandler<T> for ReorderHandler<T, C>
where
    T: Clone + PartialEq,
    C: RowCollection<T>,
{
    fn check(&self, request: &DropRequest<T>) -> Result<DropPlan, DropError> {
        match self {
            Self::Flat(handler) => handler.check(request),
            Self::Tree(handler) => handler.check(request),
        }
    }

    fn apply(&mut self, request: &DropRequest<T>) -> Result<DropResult, DropError> {
        match self {
            Self::Flat(handler) => handler.apply(request),
            Self::Tree(handler) => handler.apply(request),
        }
    }
}
