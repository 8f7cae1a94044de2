use std::collections::VecDeque;
use std::rc::Rc;

use tracing::debug;

use crate::error::DropError;
use crate::handler::{DropCallbacks, RowDropHandler};
use crate::request::{DropDestination, DropPlan, DropPosition, DropRequest, DropResult};

/// A positional collection the flat handler reorders in place.
pub trait RowCollection<T> {
    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Option<&T>;

    /// Collections without positional insert/remove report `true` and refuse both.
    fn is_read_only(&self) -> bool {
        false
    }

    fn remove(&mut self, index: usize) -> Option<T>;

    /// Hands the item back when it cannot be inserted.
    fn insert(&mut self, index: usize, item: T) -> Result<(), T>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> RowCollection<T> for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    fn remove(&mut self, index: usize) -> Option<T> {
        (index < Vec::len(self)).then(|| Vec::remove(self, index))
    }

    fn insert(&mut self, index: usize, item: T) -> Result<(), T> {
        if index > Vec::len(self) {
            return Err(item);
        }
        Vec::insert(self, index, item);
        Ok(())
    }
}

impl<T> RowCollection<T> for VecDeque<T> {
    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn get(&self, index: usize) -> Option<&T> {
        VecDeque::get(self, index)
    }

    fn remove(&mut self, index: usize) -> Option<T> {
        VecDeque::remove(self, index)
    }

    fn insert(&mut self, index: usize, item: T) -> Result<(), T> {
        if index > VecDeque::len(self) {
            return Err(item);
        }
        VecDeque::insert(self, index, item);
        Ok(())
    }
}

/// A fixed-size boxed slice has no positional insert/remove.
impl<T> RowCollection<T> for Box<[T]> {
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn get(&self, index: usize) -> Option<&T> {
        <[T]>::get(self, index)
    }

    fn is_read_only(&self) -> bool {
        true
    }

    fn remove(&mut self, _index: usize) -> Option<T> {
        None
    }

    fn insert(&mut self, _index: usize, item: T) -> Result<(), T> {
        Err(item)
    }
}

/// Reorders a plain ordered collection.
///
/// Dragged rows are taken out highest index first, so the remaining indices stay put, and
/// the insertion point is shifted down by one for every removal in front of it. The rows
/// then go back in, in their original relative order, starting at the shifted point.
pub struct FlatReorderHandler<T, C = Vec<T>> {
    rows: C,
    callbacks: DropCallbacks<T>,
}

impl<T, C> FlatReorderHandler<T, C> {
    pub fn new(rows: C) -> Self {
        Self {
            rows,
            callbacks: DropCallbacks::default(),
        }
    }

    pub fn rows(&self) -> &C {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut C {
        &mut self.rows
    }

    pub fn into_rows(self) -> C {
        self.rows
    }

    /// Provide a predicate to control whether a drop is allowed.
    ///
    /// It runs last, after every built-in rule accepted the request, and receives the plan
    /// the handler is about to carry out.
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

impl<T, C> FlatReorderHandler<T, C>
where
    T: PartialEq,
    C: RowCollection<T>,
{
    /// Source indices of the dragged rows, ascending and de-duplicated.
    fn local_rows(&self, request: &DropRequest<T>) -> Result<Vec<usize>, DropError> {
        let mut rows = Vec::with_capacity(request.dragged().len());
        for row in request.dragged_in_order() {
            let Some(item) = self.rows.get(row.index) else {
                return Err(DropError::DraggedRowOutOfRange { index: row.index });
            };
            if *item != row.item {
                return Err(DropError::StaleRow { index: row.index });
            }
            rows.push(row.index);
        }
        rows.dedup();
        Ok(rows)
    }
}

impl<T, C> RowDropHandler<T> for FlatReorderHandler<T, C>
where
    T: Clone + PartialEq,
    C: RowCollection<T>,
{
    fn check(&self, request: &DropRequest<T>) -> Result<DropPlan, DropError> {
        let view = request.view_state();
        if view.read_only || self.rows.is_read_only() {
            return Err(DropError::ReadOnlyCollection);
        }
        if view.sorted {
            return Err(DropError::SortedViewConflict);
        }
        if request.dragged().is_empty() {
            return Err(DropError::EmptyDrag);
        }

        let insert_at = match request.drop_target() {
            Some(target) => {
                let Some(item) = self.rows.get(target.index) else {
                    return Err(DropError::TargetOutOfRange {
                        index: target.index,
                    });
                };
                if *item != target.item {
                    return Err(DropError::StaleRow {
                        index: target.index,
                    });
                }
                match request.position() {
                    DropPosition::Before => target.index,
                    DropPosition::After => target.index + 1,
                    DropPosition::Inside => return Err(DropError::InsideOnFlatList),
                }
            }
            None if request.position() == DropPosition::Inside => {
                return Err(DropError::InsideOnFlatList);
            }
            None => self.rows.len(),
        };

        let rows = if request.is_external() {
            Vec::new()
        } else {
            self.local_rows(request)?
        };
        if drop_inside_block(&rows, insert_at) {
            return Err(DropError::NoOpDrop);
        }

        let plan = DropPlan {
            destination: DropDestination::List,
            insert_at,
            rows,
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
                debug!(%err, "flat drop rejected");
                return Err(err);
            }
        };

        let mut insert_at = plan.insert_at;
        let moved: Vec<T> = if request.is_external() {
            request
                .dragged_in_order()
                .into_iter()
                .map(|row| row.item.clone())
                .collect()
        } else {
            let mut moved = Vec::with_capacity(plan.rows.len());
            for &index in plan.rows.iter().rev() {
                let item = self
                    .rows
                    .remove(index)
                    .ok_or(DropError::ReadOnlyCollection)?;
                if index < plan.insert_at {
                    insert_at -= 1;
                }
                moved.push(item);
            }
            moved.reverse();
            moved
        };

        let count = moved.len();
        for (offset, item) in moved.into_iter().enumerate() {
            self.rows
                .insert(insert_at + offset, item)
                .map_err(|_| DropError::ReadOnlyCollection)?;
        }

        let result = DropResult {
            destination: DropDestination::List,
            index: insert_at,
            count,
            nodes: Vec::new(),
        };
        debug!(
            count,
            from = ?plan.rows,
            to = insert_at,
            external = request.is_external(),
            "flat drop applied"
        );
        self.callbacks.dropped(request, &result);
        Ok(result)
    }
}

/// Whether `insert_at` falls within (or on either edge of) a contiguous block of rows, which
/// would put every row back where it was.
pub(crate) fn drop_inside_block(rows: &[usize], insert_at: usize) -> bool {
    let (Some(&first), Some(&last)) = (rows.first(), rows.last()) else {
        return false;
    };
    last - first + 1 == rows.len() && (first..=last + 1).contains(&insert_at)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::request::{DragSource, DraggedRow, ViewState};

    fn handler(ids: &[&'static str]) -> FlatReorderHandler<&'static str> {
        FlatReorderHandler::new(ids.to_vec())
    }

    fn drag(
        rows: &[&'static str],
        dragged: &[usize],
        target: usize,
        position: DropPosition,
    ) -> DropRequest<&'static str> {
        DropRequest::new(
            dragged.iter().map(|&ix| DraggedRow::new(rows[ix], ix)),
            position,
        )
        .target(rows[target], target)
    }

    #[test]
    fn move_first_after_last() {
        let rows = ["A", "B", "C"];
        let mut handler = handler(&rows);
        let request = drag(&rows, &[0], 2, DropPosition::After);

        assert!(handler.validate(&request));
        assert!(handler.execute(&request));
        assert_eq!(handler.rows(), &vec!["B", "C", "A"]);
    }

    #[test]
    fn move_last_before_first() {
        let rows = ["A", "B", "C", "D"];
        let mut handler = handler(&rows);
        let result = handler
            .apply(&drag(&rows, &[3], 1, DropPosition::Before))
            .unwrap();

        assert_eq!(handler.rows(), &vec!["A", "D", "B", "C"]);
        assert_eq!(result.range(), 1..2);
    }

    #[test]
    fn split_selection_keeps_relative_order() {
        let rows = ["A", "B", "C", "D", "E"];
        let mut handler = handler(&rows);
        let result = handler
            .apply(&drag(&rows, &[3, 1], 2, DropPosition::After))
            .unwrap();

        assert_eq!(handler.rows(), &vec!["A", "C", "B", "D", "E"]);
        assert_eq!(result.index, 2);
        assert_eq!(result.count, 2);
    }

    #[test]
    fn drop_inside_own_block_is_noop() {
        let rows = ["A", "B", "C", "D"];
        for (target, position) in [
            (1, DropPosition::After),
            (1, DropPosition::Before),
            (2, DropPosition::After),
            (3, DropPosition::Before),
        ] {
            let mut handler = handler(&rows);
            let request = drag(&rows, &[1, 2], target, position);
            assert_eq!(handler.check(&request), Err(DropError::NoOpDrop));
            assert!(!handler.execute(&request));
            assert_eq!(handler.rows(), &rows.to_vec());
        }
    }

    #[test]
    fn split_selection_onto_its_own_gap_still_moves() {
        let rows = ["A", "B", "C", "D"];
        let mut handler = handler(&rows);
        assert!(handler.execute(&drag(&rows, &[0, 2], 0, DropPosition::After)));
        assert_eq!(handler.rows(), &vec!["A", "C", "B", "D"]);
    }

    #[test]
    fn read_only_and_sorted_views_are_rejected() {
        let rows = ["A", "B", "C"];
        let request = drag(&rows, &[0], 2, DropPosition::After);

        let mut handler = handler(&rows);
        let read_only = request.clone().view(ViewState {
            read_only: true,
            sorted: false,
        });
        assert_eq!(handler.check(&read_only), Err(DropError::ReadOnlyCollection));

        let sorted = request.clone().view(ViewState {
            read_only: false,
            sorted: true,
        });
        assert_eq!(handler.check(&sorted), Err(DropError::SortedViewConflict));
        assert!(!handler.execute(&sorted));
        assert_eq!(handler.rows(), &rows.to_vec());

        let boxed: Box<[&str]> = rows.to_vec().into_boxed_slice();
        let fixed = FlatReorderHandler::new(boxed);
        assert!(!fixed.validate(&request));
    }

    #[test]
    fn malformed_requests_are_rejected() {
        let rows = ["A", "B", "C"];
        let handler = handler(&rows);

        let empty = DropRequest::new(Vec::new(), DropPosition::Before).target("A", 0);
        assert_eq!(handler.check(&empty), Err(DropError::EmptyDrag));

        let out_of_range = drag(&rows, &[0], 2, DropPosition::After).target("Z", 9);
        assert_eq!(
            handler.check(&out_of_range),
            Err(DropError::TargetOutOfRange { index: 9 })
        );

        let stale =
            DropRequest::new([DraggedRow::new("C", 0)], DropPosition::After).target("C", 2);
        assert_eq!(handler.check(&stale), Err(DropError::StaleRow { index: 0 }));

        let inside = drag(&rows, &[0], 2, DropPosition::Inside);
        assert_eq!(handler.check(&inside), Err(DropError::InsideOnFlatList));
    }

    #[test]
    fn untargeted_drop_appends() {
        let rows = ["A", "B", "C"];
        let mut handler = handler(&rows);
        let request = DropRequest::new([DraggedRow::new("A", 0)], DropPosition::After);
        assert!(handler.execute(&request));
        assert_eq!(handler.rows(), &vec!["B", "C", "A"]);
    }

    #[test]
    fn external_drop_inserts_copies() {
        let rows = ["A", "B"];
        let mut handler = handler(&rows);
        let request = DropRequest::new(
            [DraggedRow::new("Y", 7), DraggedRow::new("X", 3)],
            DropPosition::Before,
        )
        .target("B", 1)
        .source(DragSource::External);

        assert!(handler.execute(&request));
        assert_eq!(handler.rows(), &vec!["A", "X", "Y", "B"]);
    }

    #[test]
    fn callbacks_veto_and_observe() {
        let rows = ["A", "B", "C"];
        let vetoing = handler(&rows).can_drop(|_, plan| plan.insert_at != 3);
        assert_eq!(
            vetoing.check(&drag(&rows, &[0], 2, DropPosition::After)),
            Err(DropError::Vetoed)
        );

        let seen = Rc::new(Cell::new(0));
        let counter = seen.clone();
        let mut observed =
            handler(&rows).on_drop(move |_, result| counter.set(counter.get() + result.count));
        assert!(observed.execute(&drag(&rows, &[0, 1], 2, DropPosition::After)));
        assert_eq!(seen.get(), 2);
        assert_eq!(observed.rows(), &vec!["C", "A", "B"]);
    }

    #[test]
    fn deque_rows_reorder_like_vec() {
        let rows = ["A", "B", "C"];
        let mut handler = FlatReorderHandler::new(VecDeque::from(rows.to_vec()));
        assert!(handler.execute(&drag(&rows, &[2], 0, DropPosition::Before)));
        assert_eq!(handler.rows(), &VecDeque::from(vec!["C", "A", "B"]));
    }
}
