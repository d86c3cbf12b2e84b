/// Test utilities for building cycle log documents
use cycle_extract::{Cycle, Document, FieldValue, MeasurementBlock, Operation};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Builder for creating cycle log documents, one cycle at a time
pub struct DocumentBuilder {
    cycles: Vec<Cycle>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self { cycles: Vec::new() }
    }

    /// Start a new, empty cycle; following operations are added to it
    pub fn cycle(mut self) -> Self {
        self.cycles.push(Cycle::default());
        self
    }

    /// Add an arbitrary operation to the current cycle
    pub fn operation(mut self, op: Operation) -> Self {
        if self.cycles.is_empty() {
            self.cycles.push(Cycle::default());
        }
        self.cycles.last_mut().unwrap().operations.push(op);
        self
    }

    /// Add a charge operation with voltage, current and time series of `samples` rows
    pub fn charge(self, samples: usize, temperature: f64, time: [f64; 6]) -> Self {
        let op = operation("charge", temperature, time, series_block(samples, None));
        self.operation(op)
    }

    /// Add a discharge operation carrying a scalar capacity
    pub fn discharge(self, samples: usize, capacity: f64, temperature: f64, time: [f64; 6]) -> Self {
        let op = operation(
            "discharge",
            temperature,
            time,
            series_block(samples, Some(capacity)),
        );
        self.operation(op)
    }

    /// Add an impedance operation, which extraction never selects
    pub fn impedance(self, time: [f64; 6]) -> Self {
        let mut block = MeasurementBlock::new();
        block.insert("Re".to_string(), FieldValue::Scalar(0.05));
        block.insert("Rct".to_string(), FieldValue::Scalar(0.07));
        block.insert("Battery_impedance".to_string(), FieldValue::Series(vec![Some(0.2), Some(0.3)]));
        self.operation(operation("impedance", 24.0, time, block))
    }

    pub fn build(self) -> Document {
        Document {
            cycles: self.cycles,
        }
    }

    /// Serialize the document as `{"<stem>": {"cycle": [...]}}` into `path`
    pub fn write_to(self, path: &Path) {
        let stem = path.file_stem().unwrap().to_str().unwrap().to_string();
        let document = self.build();
        write_json(path, &serde_json::json!({ stem: document }));
    }
}

/// Build an operation with a single measurement block
pub fn operation(type_name: &str, temperature: f64, time: [f64; 6], block: MeasurementBlock) -> Operation {
    Operation::new(type_name, temperature, &time, &[block])
}

/// A block whose `Time` column counts 0, 10, 20, ... and whose voltage and current
/// are derived from the sample index. With `capacity`, a scalar `Capacity` comes first.
pub fn series_block(samples: usize, capacity: Option<f64>) -> MeasurementBlock {
    let mut block = MeasurementBlock::new();
    if let Some(capacity) = capacity {
        block.insert("Capacity".to_string(), FieldValue::Scalar(capacity));
    }
    block.insert(
        "Voltage_measured".to_string(),
        FieldValue::Series((0..samples).map(|i| Some(4.2 - i as f64 * 0.01)).collect()),
    );
    block.insert(
        "Current_measured".to_string(),
        FieldValue::Series((0..samples).map(|i| Some(1.5 - i as f64 * 0.001)).collect()),
    );
    block.insert(
        "Time".to_string(),
        FieldValue::Series((0..samples).map(|i| Some(i as f64 * 10.0)).collect()),
    );
    block
}

/// Write an arbitrary JSON value to `path`
pub fn write_json(path: &Path, root: &serde_json::Value) {
    File::create(path)
        .unwrap()
        .write_all(serde_json::to_string(root).unwrap().as_bytes())
        .unwrap();
}

pub const JAN_1_2008: [f64; 6] = [2008.0, 1.0, 1.0, 0.0, 0.0, 0.0];
