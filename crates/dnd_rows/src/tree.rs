use std::collections::HashSet;
use std::rc::Rc;

use tracing::debug;

use crate::error::DropError;
use crate::flat::drop_inside_block;
use crate::handler::{DropCallbacks, RowDropHandler};
use crate::model::HierarchicalModel;
use crate::node::NodeId;
use crate::request::{DropDestination, DropPlan, DropPosition, DropRequest, DropResult};

/// Moves rows across a [`HierarchicalModel`], reparenting them when the destination parent
/// differs from the source.
///
/// Request indices are slots in the model's visible projection. All mutation goes through
/// [`HierarchicalModel::move_node`] and [`HierarchicalModel::insert_child`], so the slot
/// table stays in step with the tree.
pub struct HierarchicalReorderHandler<T> {
    model: HierarchicalModel<T>,
    callbacks: DropCallbacks<T>,
}

impl<T> HierarchicalReorderHandler<T> {
    pub fn new(model: HierarchicalModel<T>) -> Self {
        Self {
            model,
            callbacks: DropCallbacks::default(),
        }
    }

    pub fn model(&self) -> &HierarchicalModel<T> {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut HierarchicalModel<T> {
        &mut self.model
    }

    pub fn into_model(self) -> HierarchicalModel<T> {
        self.model
    }

    /// Provide a predicate to control whether a drop is allowed, see
    /// [`FlatReorderHandler::can_drop`](crate::FlatReorderHandler::can_drop).
    pub fn can_drop(
        mut self,
        can_drop: impl Fn(&DropRequest<T>, &DropPlan) -> bool + 'static,
    ) -> Self {
        self.callbacks.can_drop = Some(Rc::new(can_drop));
        self
    }

    /// Provide a callback invoked after a successful drop.
    pub fn on_drop(mut self, on_drop: impl Fn(&DropRequest<T>, &DropResult) + 'static) -> Self {
        self.callbacks.on_drop = Some(Rc::new(on_drop));
        self
    }
}

impl<T: PartialEq> HierarchicalReorderHandler<T> {
    fn row(&self, index: usize, item: &T) -> Result<NodeId, DropError> {
        let id = self
            .model
            .node_at(index)
            .ok_or(DropError::DraggedRowOutOfRange { index })?;
        if self.model.item(id) != Some(item) {
            return Err(DropError::StaleRow { index });
        }
        Ok(id)
    }

    /// Dragged nodes in slot order, minus any whose ancestor is dragged too; those travel
    /// inside the ancestor.
    fn local_nodes(&self, request: &DropRequest<T>) -> Result<Vec<NodeId>, DropError> {
        let mut nodes = Vec::with_capacity(request.dragged().len());
        let mut dragged = HashSet::with_capacity(request.dragged().len());
        for row in request.dragged_in_order() {
            let id = self.row(row.index, &row.item)?;
            if dragged.insert(id) {
                nodes.push(id);
            }
        }
        nodes.retain(|&id| !self.model.ancestors(id).any(|a| dragged.contains(&a)));
        Ok(nodes)
    }

    /// Destination and insertion point (pre-removal), plus the target node if any.
    fn destination(
        &self,
        request: &DropRequest<T>,
    ) -> Result<(DropDestination, usize, Option<NodeId>), DropError> {
        let Some(target) = request.drop_target() else {
            return Ok((DropDestination::Roots, self.model.roots().len(), None));
        };
        let node = self
            .model
            .node_at(target.index)
            .ok_or(DropError::TargetOutOfRange {
                index: target.index,
            })?;
        if self.model.item(node) != Some(&target.item) {
            return Err(DropError::StaleRow {
                index: target.index,
            });
        }

        match request.position() {
            DropPosition::Inside => {
                if !self.model.accepts_children(node) {
                    return Err(DropError::TargetRejectsChildren);
                }
                let len = self.model.child_count(node);
                let index = request.explicit_child_index().unwrap_or(len);
                if index > len {
                    return Err(DropError::ChildIndexOutOfRange { index, len });
                }
                Ok((DropDestination::Children(node), index, Some(node)))
            }
            position @ (DropPosition::Before | DropPosition::After) => {
                let index = self
                    .model
                    .child_index(node)
                    .ok_or(DropError::TargetOutOfRange {
                        index: target.index,
                    })?;
                let destination = match self.model.parent_of(node) {
                    Some(parent) => DropDestination::Children(parent),
                    None => DropDestination::Roots,
                };
                let index = if position == DropPosition::After {
                    index + 1
                } else {
                    index
                };
                Ok((destination, index, Some(node)))
            }
        }
    }
}

impl<T> RowDropHandler<T> for HierarchicalReorderHandler<T>
where
    T: Clone + PartialEq,
{
    fn check(&self, request: &DropRequest<T>) -> Result<DropPlan, DropError> {
        let view = request.view_state();
        if view.read_only {
            return Err(DropError::ReadOnlyCollection);
        }
        if view.sorted {
            return Err(DropError::SortedViewConflict);
        }
        if request.dragged().is_empty() {
            return Err(DropError::EmptyDrag);
        }

        let (destination, insert_at, target) = self.destination(request)?;
        let nodes = if request.is_external() {
            Vec::new()
        } else {
            self.local_nodes(request)?
        };

        // Attaching a node under itself or one of its descendants would close a cycle.
        if let Some(target) = target
            && nodes
                .iter()
                .any(|&id| self.model.is_ancestor_or_self(id, target))
        {
            return Err(DropError::InvalidTarget);
        }

        let parent = destination.parent();
        if !nodes.is_empty() && nodes.iter().all(|&id| self.model.parent_of(id) == parent) {
            let mut positions: Vec<usize> = nodes
                .iter()
                .filter_map(|&id| self.model.child_index(id))
                .collect();
            positions.sort_unstable();
            if drop_inside_block(&positions, insert_at) {
                return Err(DropError::NoOpDrop);
            }
        }

        let plan = DropPlan {
            destination,
            insert_at,
            rows: nodes
                .iter()
                .filter_map(|&id| self.model.index_of(id))
                .collect(),
        };
        if !self.callbacks.allows(request, &plan) {
            return Err(DropError::Vetoed);
        }
        Ok(plan)
    }

    fn apply(&mut self, request: &DropRequest<T>) -> Result<DropResult, DropError> {
        let plan = match self.check(request) {
            Ok(plan) => plan,
            Err(err) => {
                debug!(%err, "tree drop rejected");
                return Err(err);
            }
        };

        let parent = plan.destination.parent();
        let mut index = plan.insert_at;
        let nodes = if request.is_external() {
            let mut created = Vec::with_capacity(request.dragged().len());
            for row in request.dragged_in_order() {
                created.push(self.model.insert_child(parent, index, row.item.clone())?);
                index += 1;
            }
            created
        } else {
            // Resolve every slot before the first move shifts the table.
            let moving: Vec<NodeId> = plan
                .rows
                .iter()
                .filter_map(|&slot| self.model.node_at(slot))
                .collect();
            for &id in &moving {
                if self.model.parent_of(id) == parent
                    && self.model.child_index(id).is_some_and(|ix| ix < index)
                {
                    index -= 1;
                }
                self.model.move_node(id, parent, index)?;
                index += 1;
            }
            moving
        };

        let result = DropResult {
            destination: plan.destination,
            index: index - nodes.len(),
            count: nodes.len(),
            nodes,
        };
        debug!(
            count = result.count,
            destination = ?result.destination,
            index = result.index,
            external = request.is_external(),
            "tree drop applied"
        );
        self.callbacks.dropped(request, &result);
        Ok(result)
    }
}
