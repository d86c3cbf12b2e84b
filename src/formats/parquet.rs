use anyhow::Result;
use arrow::array::RecordBatch;
use log::info;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};

pub struct ParquetFormatter {
    output_directory: String,
    chunk_size: usize,
}

impl ParquetFormatter {
    pub fn new(output_directory: String, chunk_size: usize) -> Self {
        Self {
            output_directory,
            chunk_size,
        }
    }

    /// Writes the table as numbered part files of at most `chunk_size` rows.
    pub fn convert(&self, table: &RecordBatch) -> Result<Vec<PathBuf>> {
        if table.num_rows() == 0 {
            anyhow::bail!("No rows to write to Parquet");
        }
        if self.chunk_size == 0 {
            anyhow::bail!("Chunk size must be at least 1");
        }

        create_dir_all(&self.output_directory)?;

        let total_rows = table.num_rows();
        let total_chunks = total_rows.div_ceil(self.chunk_size);
        info!(
            "Generated a total of {} chunks, will now create that total amount of files.",
            total_chunks
        );

        let mut written = Vec::with_capacity(total_chunks);
        for i in 0..total_chunks {
            let offset = i * self.chunk_size;
            let length = self.chunk_size.min(total_rows - offset);
            info!("Writing chunk {}/{}, {} rows", i + 1, total_chunks, length);

            let output_path =
                Path::new(&self.output_directory).join(format!("file_part{:03}.parquet", i));

            self.write_chunk_to_parquet(&table.slice(offset, length), &output_path)?;
            written.push(output_path);
        }

        info!("All chunks have been written");
        Ok(written)
    }

    fn write_chunk_to_parquet(&self, batch: &RecordBatch, output_path: &Path) -> Result<()> {
        let file = File::create(output_path)?;
        let props = WriterProperties::builder().build();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;

        writer.write(batch)?;
        writer.close()?;

        Ok(())
    }
}
