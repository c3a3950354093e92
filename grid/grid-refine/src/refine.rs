//! Iterative refinement driver.
//!
//! Each iteration consumes the whole fix queue:
//!
//! 1. check every queued factor against the rule
//! 2. split every queued cell (nothing is mutated if a split fails)
//! 3. delete all queued cells, then insert all children
//! 4. rebuild the spatial index
//! 5. run the topology check on every new cell and merge the repairs into
//!    the next queue
//! 6. report progress to the observer
//!
//! The loop stops when the queue is empty (the grid satisfies the rule), when
//! the observer asks to stop, or when the iteration limit is hit.

use std::ops::ControlFlow;

use grid_types::{Cell, CellId, CellStore};
use tracing::{debug, info, warn};

use crate::error::{ConsistencyError, InputError, RefineResult};
use crate::fix_queue::FixQueue;
use crate::generate::split_cell;
use crate::index::SpatialIndex;
use crate::params::RefineParams;
use crate::result::{IterationProgress, RefinementReport, RefinementStatus};
use crate::topology::check_topology;

/// Hook called once after every committed iteration.
///
/// Returning [`ControlFlow::Break`] stops the run before the next iteration
/// starts. Nothing is rolled back. Closures taking `&IterationProgress` and
/// returning `ControlFlow<()>` implement this trait.
pub trait RefineObserver {
    /// Inspect progress and decide whether to continue.
    fn on_iteration(&mut self, progress: &IterationProgress) -> ControlFlow<()>;
}

impl<F> RefineObserver for F
where
    F: FnMut(&IterationProgress) -> ControlFlow<()>,
{
    fn on_iteration(&mut self, progress: &IterationProgress) -> ControlFlow<()> {
        self(progress)
    }
}

/// Observer that never interrupts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RefineObserver for NoopObserver {
    fn on_iteration(&mut self, _progress: &IterationProgress) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// Refine the selected cells and propagate splits until the topology rule
/// holds everywhere.
///
/// Every selected cell is split by `params.factor`. New cells that end up
/// next to a neighbor more than `params.rule.max_ratio()` times larger along
/// the shared edge cause that neighbor to be split in turn.
///
/// Malformed requests are not errors: they come back as
/// [`RefinementStatus::Rejected`] with the store untouched.
///
/// # Errors
///
/// Returns a [`ConsistencyError`] if the store is found in an impossible
/// state mid-run, or if `params.max_iterations` is reached. Iterations
/// committed before the failure stay in the store.
///
/// # Example
///
/// ```
/// use grid_refine::{RefinementFactor, RefineParams, refine, regular_grid};
/// use grid_types::{Attributes, CellId, Rect};
///
/// let mut store = regular_grid(
///     &Rect::from_extents(0.0, 0.0, 4.0, 4.0),
///     RefinementFactor::new(2, 2),
///     &Attributes::new(),
/// )?;
///
/// let params = RefineParams::modflow(RefinementFactor::new(2, 2));
/// let report = refine(&mut store, &[CellId::new(0)], &params)?;
///
/// assert!(report.status.is_converged());
/// assert_eq!(report.iterations, 2);
/// assert_eq!(store.len(), 9);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn refine(
    store: &mut CellStore,
    selection: &[CellId],
    params: &RefineParams,
) -> RefineResult<RefinementReport> {
    refine_with_observer(store, selection, params, &mut NoopObserver)
}

/// Like [`refine`], calling `observer` after every committed iteration.
///
/// # Errors
///
/// Same as [`refine`].
///
/// # Example
///
/// ```
/// use std::ops::ControlFlow;
///
/// use grid_refine::{IterationProgress, RefineParams, RefinementFactor, RefinementStatus,
///     refine_with_observer, regular_grid};
/// use grid_types::{Attributes, CellId, Rect};
///
/// let mut store = regular_grid(
///     &Rect::from_extents(0.0, 0.0, 4.0, 4.0),
///     RefinementFactor::new(2, 2),
///     &Attributes::new(),
/// )?;
///
/// // Stop after the first iteration
/// let mut stop = |_: &IterationProgress| -> ControlFlow<()> { ControlFlow::Break(()) };
/// let params = RefineParams::modflow(RefinementFactor::new(2, 2));
/// let report = refine_with_observer(&mut store, &[CellId::new(0)], &params, &mut stop)?;
///
/// assert_eq!(report.iterations, 1);
/// assert_eq!(report.status, RefinementStatus::Cancelled { pending: 2 });
/// assert_eq!(store.len(), 7);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn refine_with_observer<O>(
    store: &mut CellStore,
    selection: &[CellId],
    params: &RefineParams,
    observer: &mut O,
) -> RefineResult<RefinementReport>
where
    O: RefineObserver + ?Sized,
{
    let mut queue = match initial_queue(store, selection, params) {
        Ok(queue) => queue,
        Err(err) => {
            warn!(error = %err, "Rejected refinement request");
            return Ok(RefinementReport::rejected(err));
        }
    };

    info!(
        selected = queue.len(),
        factor = %params.factor,
        rule = %params.rule,
        cells = store.len(),
        "Starting grid refinement"
    );

    let mut report = RefinementReport {
        iterations: 0,
        cells_created: 0,
        cells_removed: 0,
        status: RefinementStatus::Converged,
    };
    let mut resolved = 0;

    while !queue.is_empty() {
        if report.iterations >= params.max_iterations {
            return Err(ConsistencyError::IterationLimit {
                iterations: report.iterations,
                pending: queue.len(),
            });
        }
        check_admissible(&queue, params)?;

        let new_ids = apply_splits(store, &queue)?;
        let index = SpatialIndex::build(store);

        let mut next = FixQueue::new();
        for &id in &new_ids {
            let fixes = check_topology(
                id,
                params.factor,
                params.rule,
                store,
                &index,
                &params.tolerance,
            )?;
            next.merge(&fixes);
        }

        report.iterations += 1;
        report.cells_removed += queue.len();
        report.cells_created += new_ids.len();
        resolved += queue.len();

        debug!(
            iteration = report.iterations,
            split = queue.len(),
            created = new_ids.len(),
            pending = next.len(),
            "Committed refinement iteration"
        );

        queue = next;

        let progress = IterationProgress {
            iteration: report.iterations,
            resolved,
            pending: queue.len(),
            live_cells: store.len(),
        };
        if observer.on_iteration(&progress).is_break() && !queue.is_empty() {
            warn!(
                iteration = report.iterations,
                pending = queue.len(),
                "Refinement cancelled by observer"
            );
            report.status = RefinementStatus::Cancelled {
                pending: queue.len(),
            };
            return Ok(report);
        }
    }

    info!(
        iterations = report.iterations,
        created = report.cells_created,
        removed = report.cells_removed,
        cells = store.len(),
        "Grid refinement converged"
    );
    Ok(report)
}

/// Validate the request and build the first queue.
fn initial_queue(
    store: &CellStore,
    selection: &[CellId],
    params: &RefineParams,
) -> Result<FixQueue, InputError> {
    params.validate()?;
    if selection.is_empty() {
        return Err(InputError::EmptySelection);
    }
    if let Some(&id) = selection.iter().find(|&&id| !store.contains(id)) {
        return Err(InputError::UnknownCell(id));
    }
    Ok(FixQueue::with_uniform(selection, params.factor))
}

fn check_admissible(queue: &FixQueue, params: &RefineParams) -> RefineResult<()> {
    for (cell, factor) in queue.iter() {
        if params.rule.admits(factor).is_err() {
            return Err(ConsistencyError::InadmissibleFactor {
                cell,
                factor,
                rule: params.rule,
            });
        }
    }
    Ok(())
}

/// Split every queued cell, then swap parents for children in the store.
///
/// All children are generated before the store is touched, and all parents
/// are deleted before any child is inserted. Returns the new ids.
fn apply_splits(store: &mut CellStore, queue: &FixQueue) -> RefineResult<Vec<CellId>> {
    let mut batches: Vec<Vec<Cell>> = Vec::with_capacity(queue.len());
    for (id, factor) in queue.iter() {
        let parent = store.get(id).ok_or(ConsistencyError::MissingCell(id))?;
        let children = split_cell(parent, factor)?;
        if children.len() != factor.cell_count() {
            return Err(ConsistencyError::SplitCount {
                cell: id,
                expected: factor.cell_count(),
                actual: children.len(),
            });
        }
        batches.push(children);
    }

    store.delete(&queue.ids())?;

    let mut new_ids = Vec::with_capacity(batches.iter().map(Vec::len).sum());
    for children in batches {
        new_ids.extend(store.insert_many(children));
    }
    Ok(new_ids)
}
