use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The operation kinds that can be extracted from a cycle log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Charge,
    Discharge,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Charge => "charge",
            OperationKind::Discharge => "discharge",
        }
    }

    /// True when an operation's declared type names this kind.
    pub fn matches(&self, type_name: &str) -> bool {
        type_name == self.as_str()
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "charge" => Ok(OperationKind::Charge),
            "discharge" => Ok(OperationKind::Discharge),
            other => Err(Error::UnsupportedType(other.to_string())),
        }
    }
}

/// A single named value inside a measurement block.
///
/// Series samples may be `null`, which JSON exports use for missing (NaN) samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(f64),
    Series(Vec<Option<f64>>),
}

impl FieldValue {
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Scalar(v) => Value::from(*v),
            FieldValue::Series(values) => values
                .iter()
                .map(|v| v.map_or(Value::Null, Value::from))
                .collect(),
        }
    }
}

/// Named measurement fields recorded during one operation, in recording order.
pub type MeasurementBlock = IndexMap<String, FieldValue>;

/// One labeled activity within a cycle.
///
/// `time` and `data` stay undecoded JSON until the operation is selected for
/// extraction, so operations of other types (impedance blocks hold complex
/// values) never have to fit the numeric model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "type")]
    pub type_name: String,
    pub ambient_temperature: f64,
    /// Year, month, day, hour, minute, second.
    #[serde(default)]
    pub time: Value,
    /// A single measurement block or a list of them.
    #[serde(default)]
    pub data: Value,
}

impl Operation {
    pub fn new(
        type_name: impl Into<String>,
        ambient_temperature: f64,
        time: &[f64],
        blocks: &[MeasurementBlock],
    ) -> Self {
        Self {
            type_name: type_name.into(),
            ambient_temperature,
            time: time.iter().map(|&t| Value::from(t)).collect(),
            data: blocks.iter().map(block_to_json).collect(),
        }
    }

    /// Decodes the measurement blocks. A missing `data` field yields no blocks.
    pub fn blocks(&self) -> Result<Vec<MeasurementBlock>, serde_json::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(MeasurementBlock),
            Many(Vec<MeasurementBlock>),
        }

        if self.data.is_null() {
            return Ok(Vec::new());
        }

        Ok(match OneOrMany::deserialize(&self.data)? {
            OneOrMany::One(block) => vec![block],
            OneOrMany::Many(blocks) => blocks,
        })
    }
}

fn block_to_json(block: &MeasurementBlock) -> Value {
    Value::Object(
        block
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect(),
    )
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cycle {
    pub operations: Vec<Operation>,
}

/// A fully decoded cycle log: cycles of operations of measurement blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "cycle")]
    pub cycles: Vec<Cycle>,
}

/// Flat table of equal-length numeric columns produced from one measurement block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnTable {
    pub columns: Vec<(String, Vec<Option<f64>>)>,
    pub num_rows: usize,
}

impl ColumnTable {
    pub fn new(num_rows: usize) -> Self {
        Self {
            columns: Vec::new(),
            num_rows,
        }
    }

    pub fn push(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) {
        self.columns.push((name.into(), values));
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }
}
