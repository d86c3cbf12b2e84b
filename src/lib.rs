//! # Cycle Extract
//!
//! Flattens battery charge/discharge cycle logs into a single Arrow table.
//!
//! A cycle log is a tree: a list of cycles, each a list of operations
//! (`charge`, `discharge`, `impedance`, ...), each carrying an ambient
//! temperature, a start time and a block of equal-length measurement series.
//! Extraction keeps the operations of one kind, turns each block into columns,
//! tags every row with where it came from and concatenates the result.
//!
//! ## Quick Start
//!
//! ```no_run
//! use cycle_extract::{CycleReader, OperationKind, ParquetWriter};
//!
//! let reader = CycleReader::from_file("B0005.json")?;
//! let table = reader.extract(OperationKind::Discharge)?;
//!
//! println!("Extracted {} rows", table.num_rows());
//!
//! ParquetWriter::new("output_directory")
//!     .chunk_size(100_000)
//!     .write(&table)?;
//! # Ok::<(), cycle_extract::Error>(())
//! ```
//!
//! ## Output columns
//!
//! - every measurement field of the block (`Float64`); for discharge
//!   operations the scalar `Capacity` is repeated on every row
//! - `operation_id`: index of the operation among same-kind operations of
//!   its cycle, starting at 0
//! - `temperature`: ambient temperature of the operation
//! - `type`: `charge` or `discharge`
//! - `start_time`: operation start, to the second
//!
//! ## Error Handling
//!
//! ```no_run
//! use cycle_extract::{extract_by_name, Document, Error};
//!
//! let document = Document::default();
//! match extract_by_name(&document, "discharge") {
//!     Ok(table) => println!("{} rows", table.num_rows()),
//!     Err(Error::EmptyResult { target }) => eprintln!("no {} operations", target),
//!     Err(err) => eprintln!("Error: {}", err),
//! }
//! ```

pub mod assemble;
pub mod error;
pub mod fields;
pub mod flatten;
pub mod formats;
pub mod models;
pub mod provenance;
pub mod reader;
pub mod writer;

pub use error::{Error, Result};
pub use flatten::{extract, extract_by_name, filter_operations};
pub use models::{ColumnTable, Cycle, Document, FieldValue, MeasurementBlock, Operation, OperationKind};
pub use reader::CycleReader;
pub use writer::{ParquetWriter, ParquetWriterBuilder, WriteStats};
