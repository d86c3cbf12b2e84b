//! High-level API for writing extracted cycle tables to Parquet.

use arrow::array::RecordBatch;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::formats::parquet::ParquetFormatter;

const DEFAULT_CHUNK_SIZE: usize = 50_000;

/// Writer for outputting an extracted table to Apache Parquet format.
///
/// # Examples
///
/// ```no_run
/// use cycle_extract::{CycleReader, OperationKind, ParquetWriter};
///
/// let reader = CycleReader::from_file("B0005.json")?;
/// let table = reader.extract(OperationKind::Charge)?;
///
/// ParquetWriter::new("output_dir")
///     .write(&table)?;
/// # Ok::<(), cycle_extract::Error>(())
/// ```
pub struct ParquetWriter {
    output_directory: String,
    chunk_size: usize,
}

impl ParquetWriter {
    /// Create a new Parquet writer that will write to the specified directory.
    pub fn new<P: AsRef<Path>>(output_directory: P) -> Self {
        Self {
            output_directory: output_directory.as_ref().to_string_lossy().to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the maximum number of rows per Parquet file. Default is 50,000.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Write the table as `file_part000.parquet`, `file_part001.parquet`, ...
    ///
    /// # Errors
    ///
    /// Returns an error if the table is empty, the chunk size is zero, or the
    /// files cannot be written.
    pub fn write(self, table: &RecordBatch) -> Result<Vec<PathBuf>> {
        let formatter = ParquetFormatter::new(self.output_directory, self.chunk_size);

        formatter
            .convert(table)
            .map_err(|e| Error::OutputError(e.to_string()))
    }

    /// Write the table and return statistics about the write operation.
    pub fn write_with_stats(self, table: &RecordBatch) -> Result<WriteStats> {
        let num_records = table.num_rows();
        let chunk_size = self.chunk_size;

        let files = self.write(table)?;

        Ok(WriteStats {
            num_records,
            num_chunks: files.len(),
            chunk_size,
        })
    }
}

/// Statistics about a Parquet write operation.
#[derive(Debug, Clone)]
pub struct WriteStats {
    /// Total number of rows written
    pub num_records: usize,
    /// Number of Parquet files created
    pub num_chunks: usize,
    /// Rows per file (chunk size)
    pub chunk_size: usize,
}

impl WriteStats {
    /// Get a human-readable summary of the write operation.
    pub fn summary(&self) -> String {
        format!(
            "Wrote {} rows across {} file(s) ({} rows per file)",
            self.num_records, self.num_chunks, self.chunk_size
        )
    }
}

/// Builder for configuring Parquet write options.
pub struct ParquetWriterBuilder {
    output_directory: Option<String>,
    chunk_size: usize,
}

impl ParquetWriterBuilder {
    pub fn new() -> Self {
        Self {
            output_directory: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn output_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_directory = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Build the Parquet writer.
    ///
    /// # Errors
    ///
    /// Returns an error if output_directory was not set.
    pub fn build(self) -> Result<ParquetWriter> {
        let output_directory = self
            .output_directory
            .ok_or_else(|| Error::Other("Output directory not set".to_string()))?;

        Ok(ParquetWriter {
            output_directory,
            chunk_size: self.chunk_size,
        })
    }
}

impl Default for ParquetWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
