//! Walks cycles and operations and flattens the matching ones into one table.

use arrow::array::RecordBatch;
use log::{debug, info};

use crate::assemble::assemble;
use crate::error::{Error, Result};
use crate::fields::{extract_fields, single_block, BlockError};
use crate::models::{Cycle, Document, Operation, OperationKind};
use crate::provenance::{enrich, start_time_from_json, Provenance};

/// Operations of `kind` in a cycle, in order, with their position in the cycle.
pub fn filter_operations(
    cycle: &Cycle,
    kind: OperationKind,
) -> impl Iterator<Item = (usize, &Operation)> + '_ {
    cycle
        .operations
        .iter()
        .enumerate()
        .filter(move |(_, op)| kind.matches(&op.type_name))
}

/// Extracts every operation of `kind` into a single table.
///
/// Rows come out in cycle order, then operation order, then sample order.
/// `operation_id` counts matching operations only and restarts at 0 in
/// every cycle.
///
/// # Errors
///
/// Fails with [`Error::EmptyResult`] when no operation matches, and with
/// [`Error::MalformedBlock`] or [`Error::MalformedTimestamp`] on the first
/// operation that cannot be converted.
pub fn extract(document: &Document, kind: OperationKind) -> Result<RecordBatch> {
    let mut batches = Vec::new();

    for (cycle_index, cycle) in document.cycles.iter().enumerate() {
        for (operation_id, (position, operation)) in filter_operations(cycle, kind).enumerate() {
            let block_err = |source| Error::MalformedBlock {
                cycle: cycle_index,
                operation: position,
                source,
            };

            let blocks = operation
                .blocks()
                .map_err(|e| block_err(BlockError::Decode(e.to_string())))?;
            let block = single_block(&blocks).map_err(block_err)?;
            let table = extract_fields(block, kind).map_err(block_err)?;

            let start_time =
                start_time_from_json(&operation.time).map_err(|source| Error::MalformedTimestamp {
                    cycle: cycle_index,
                    operation: position,
                    source,
                })?;

            let provenance = Provenance {
                operation_id: operation_id as i64,
                temperature: operation.ambient_temperature,
                kind,
                start_time,
            };

            debug!(
                "cycle {} operation {} ({} #{}): {} rows",
                cycle_index, position, kind, operation_id, table.num_rows
            );

            batches.push(enrich(table, &provenance)?);
        }
    }

    let table = assemble(&batches)?.ok_or(Error::EmptyResult { target: kind })?;

    info!(
        "Extracted {} {} rows from {} operations across {} cycles",
        table.num_rows(),
        kind,
        batches.len(),
        document.cycles.len()
    );

    Ok(table)
}

/// Like [`extract`], but takes the target kind by name.
///
/// Names other than `charge` and `discharge` are rejected before the
/// document is traversed.
pub fn extract_by_name(document: &Document, target: &str) -> Result<RecordBatch> {
    let kind = target.parse::<OperationKind>()?;
    extract(document, kind)
}
