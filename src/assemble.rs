//! Row-wise concatenation of per-operation batches into the output table.

use arrow::array::{new_null_array, ArrayRef, RecordBatch};
use arrow::compute::concat_batches;
use arrow::datatypes::{Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use std::sync::Arc;

/// Union of the batches' columns, in the order they are first seen.
///
/// A column that is missing from some batch becomes nullable in the union.
pub fn union_schema(batches: &[RecordBatch]) -> Result<SchemaRef, ArrowError> {
    let mut fields: Vec<Field> = Vec::new();

    for batch in batches {
        for field in batch.schema().fields() {
            if let Some(existing) = fields.iter().find(|f| f.name() == field.name()) {
                if existing.data_type() != field.data_type() {
                    return Err(ArrowError::SchemaError(format!(
                        "column '{}' has type {} in one operation and {} in another",
                        field.name(),
                        existing.data_type(),
                        field.data_type()
                    )));
                }
                continue;
            }
            fields.push(field.as_ref().clone());
        }
    }

    let fields = fields
        .into_iter()
        .map(|f| {
            let everywhere = batches
                .iter()
                .all(|b| b.schema().column_with_name(f.name()).is_some());
            if everywhere {
                f
            } else {
                f.with_nullable(true)
            }
        })
        .collect::<Vec<_>>();

    Ok(Arc::new(Schema::new(fields)))
}

/// Lines a batch up with `schema`, filling columns it lacks with nulls.
fn align(batch: &RecordBatch, schema: &SchemaRef) -> Result<RecordBatch, ArrowError> {
    let columns: Vec<ArrayRef> = schema
        .fields()
        .iter()
        .map(|field| match batch.column_by_name(field.name()) {
            Some(column) => column.clone(),
            None => new_null_array(field.data_type(), batch.num_rows()),
        })
        .collect();

    RecordBatch::try_new(schema.clone(), columns)
}

/// Concatenates batches in order under their union schema.
///
/// Returns `None` when there is nothing to concatenate.
pub fn assemble(batches: &[RecordBatch]) -> Result<Option<RecordBatch>, ArrowError> {
    if batches.is_empty() {
        return Ok(None);
    }

    let schema = union_schema(batches)?;
    let aligned = batches
        .iter()
        .map(|b| align(b, &schema))
        .collect::<Result<Vec<_>, _>>()?;

    concat_batches(&schema, &aligned).map(Some)
}
