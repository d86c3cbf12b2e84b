//! Conversion of one operation's measurement block into flat columns.

use thiserror::Error;

use crate::models::{ColumnTable, FieldValue, MeasurementBlock, OperationKind};

/// Name of the per-operation scalar that discharge blocks broadcast to every row.
pub const CAPACITY_FIELD: &str = "Capacity";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BlockError {
    #[error("operation has no measurement block")]
    MissingBlock,

    #[error("operation has {0} measurement blocks, expected exactly one")]
    MultipleBlocks(usize),

    #[error("measurement block has no fields")]
    NoFields,

    #[error("measurement block has no series field to determine the row count")]
    NoSeries,

    #[error("field '{field}' has {found} samples, expected {expected}")]
    LengthMismatch {
        field: String,
        expected: usize,
        found: usize,
    },

    #[error("discharge block is missing the 'Capacity' field")]
    MissingCapacity,

    #[error("'Capacity' must hold a single value, found {0}")]
    NonScalarCapacity(usize),

    #[error("'Capacity' is null")]
    NullCapacity,

    #[error("measurement block is not a map of numeric fields: {0}")]
    Decode(String),
}

/// Picks the single measurement block of an operation.
pub fn single_block(blocks: &[MeasurementBlock]) -> Result<&MeasurementBlock, BlockError> {
    match blocks {
        [] => Err(BlockError::MissingBlock),
        [block] => Ok(block),
        _ => Err(BlockError::MultipleBlocks(blocks.len())),
    }
}

/// Extracts the columns of a measurement block according to the operation kind.
///
/// Charge blocks keep every field. Discharge blocks keep every field but
/// `Capacity`, which is appended last as a column repeating its scalar value.
/// Scalars other than the discharge capacity are broadcast to the block length.
pub fn extract_fields(
    block: &MeasurementBlock,
    kind: OperationKind,
) -> Result<ColumnTable, BlockError> {
    if block.is_empty() {
        return Err(BlockError::NoFields);
    }

    let selected: Vec<(&String, &FieldValue)> = match kind {
        OperationKind::Charge => block.iter().collect(),
        OperationKind::Discharge => block
            .iter()
            .filter(|(name, _)| name.as_str() != CAPACITY_FIELD)
            .collect(),
    };

    let num_rows = series_length(&selected)?;
    let mut table = ColumnTable::new(num_rows);

    for (name, value) in selected {
        let values = match value {
            FieldValue::Series(values) => values.clone(),
            FieldValue::Scalar(v) => vec![Some(*v); num_rows],
        };
        table.push(name.as_str(), values);
    }

    if kind == OperationKind::Discharge {
        let capacity = capacity_of(block)?;
        table.push(CAPACITY_FIELD, vec![Some(capacity); num_rows]);
    }

    Ok(table)
}

fn series_length(fields: &[(&String, &FieldValue)]) -> Result<usize, BlockError> {
    let mut expected: Option<usize> = None;

    for (name, value) in fields {
        if let FieldValue::Series(values) = value {
            match expected {
                None => expected = Some(values.len()),
                Some(len) if len != values.len() => {
                    return Err(BlockError::LengthMismatch {
                        field: name.to_string(),
                        expected: len,
                        found: values.len(),
                    });
                }
                Some(_) => {}
            }
        }
    }

    expected.ok_or(BlockError::NoSeries)
}

fn capacity_of(block: &MeasurementBlock) -> Result<f64, BlockError> {
    match block.get(CAPACITY_FIELD) {
        None => Err(BlockError::MissingCapacity),
        Some(FieldValue::Scalar(v)) => Ok(*v),
        Some(FieldValue::Series(values)) if values.len() == 1 => {
            values[0].ok_or(BlockError::NullCapacity)
        }
        Some(FieldValue::Series(values)) => Err(BlockError::NonScalarCapacity(values.len())),
    }
}
