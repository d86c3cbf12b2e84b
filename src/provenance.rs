//! Provenance columns attached to every row extracted from an operation.

use arrow::array::{ArrayRef, Float64Array, Int64Array, RecordBatch, StringArray, TimestampSecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::error::ArrowError;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{ColumnTable, OperationKind};

pub const OPERATION_ID_COLUMN: &str = "operation_id";
pub const TEMPERATURE_COLUMN: &str = "temperature";
pub const TYPE_COLUMN: &str = "type";
pub const START_TIME_COLUMN: &str = "start_time";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimestampError {
    #[error("operation has no start time")]
    Missing,

    #[error("start time is not a list of components")]
    NotAList,

    #[error("time component {index} is not a number")]
    NotNumeric { index: usize },

    #[error("expected 6 time components, found {0}")]
    ComponentCount(usize),

    #[error("time component {index} is not a finite number")]
    NotFinite { index: usize },

    #[error("{0}-{1:02}-{2:02} {3:02}:{4:02}:{5:02} is not a valid date and time")]
    OutOfRange(i64, i64, i64, i64, i64, i64),
}

/// Metadata describing where a block of rows came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Provenance {
    pub operation_id: i64,
    pub temperature: f64,
    pub kind: OperationKind,
    pub start_time: NaiveDateTime,
}

/// Builds a wall clock timestamp from year, month, day, hour, minute, second.
///
/// Every component is truncated toward zero, so fractional seconds are dropped.
pub fn parse_start_time(components: &[f64]) -> Result<NaiveDateTime, TimestampError> {
    if components.len() != 6 {
        return Err(TimestampError::ComponentCount(components.len()));
    }

    let mut parts = [0i64; 6];
    for (index, value) in components.iter().enumerate() {
        if !value.is_finite() {
            return Err(TimestampError::NotFinite { index });
        }
        parts[index] = value.trunc() as i64;
    }

    let [year, month, day, hour, minute, second] = parts;
    let out_of_range = || TimestampError::OutOfRange(year, month, day, hour, minute, second);

    let year = i32::try_from(year).map_err(|_| out_of_range())?;
    let [month, day, hour, minute, second] = [month, day, hour, minute, second]
        .map(|v| u32::try_from(v).ok());

    match (month, day, hour, minute, second) {
        (Some(month), Some(day), Some(hour), Some(minute), Some(second)) => {
            NaiveDate::from_ymd_opt(year, month, day)
                .and_then(|date| date.and_hms_opt(hour, minute, second))
                .ok_or_else(out_of_range)
        }
        _ => Err(out_of_range()),
    }
}

/// Reads the start time components of an operation and builds its timestamp.
pub fn start_time_from_json(time: &Value) -> Result<NaiveDateTime, TimestampError> {
    let components = match time {
        Value::Null => return Err(TimestampError::Missing),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| item.as_f64().ok_or(TimestampError::NotNumeric { index }))
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(TimestampError::NotAList),
    };

    parse_start_time(&components)
}

/// Turns an extracted block into a record batch carrying its provenance on every row.
pub fn enrich(table: ColumnTable, provenance: &Provenance) -> Result<RecordBatch, ArrowError> {
    let rows = table.num_rows;
    let mut fields = Vec::with_capacity(table.columns.len() + 4);
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.columns.len() + 4);

    for (name, values) in table.columns {
        fields.push(Field::new(name, DataType::Float64, true));
        arrays.push(Arc::new(Float64Array::from(values)));
    }

    fields.push(Field::new(OPERATION_ID_COLUMN, DataType::Int64, false));
    fields.push(Field::new(TEMPERATURE_COLUMN, DataType::Float64, false));
    fields.push(Field::new(TYPE_COLUMN, DataType::Utf8, false));
    fields.push(Field::new(
        START_TIME_COLUMN,
        DataType::Timestamp(TimeUnit::Second, None),
        false,
    ));

    let start_seconds = provenance.start_time.and_utc().timestamp();
    arrays.push(Arc::new(Int64Array::from(vec![provenance.operation_id; rows])));
    arrays.push(Arc::new(Float64Array::from(vec![provenance.temperature; rows])));
    arrays.push(Arc::new(StringArray::from(vec![provenance.kind.as_str(); rows])));
    arrays.push(Arc::new(TimestampSecondArray::from(vec![start_seconds; rows])));

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
}
