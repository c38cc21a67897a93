use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::csv::Writer;
use arrow::datatypes::{Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchWriter};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::errors::ParquetError;
use parquet::file::properties::WriterProperties;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("output file {0} needs a .parquet or .csv extension")]
    UnsupportedExtension(PathBuf),
    #[error("failed to prepare output file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write parquet: {0}")]
    Parquet(#[from] ParquetError),
    #[error("failed to write arrow data: {0}")]
    Arrow(#[from] ArrowError),
}

/// Output file of a result table. The format follows the file extension.
#[derive(Debug)]
pub enum WriterType {
    Parquet(WriterParquet),
    Csv(WriterCsv),
}

impl WriterType {
    pub fn new(file_name: &Path, schema: Schema) -> Result<Self, OutputError> {
        let writer = match file_name.extension().and_then(|ext| ext.to_str()) {
            Some("parquet") => WriterType::Parquet(WriterParquet::new(file_name, schema)?),
            Some("csv") => WriterType::Csv(WriterCsv::new(file_name)?),
            _ => return Err(OutputError::UnsupportedExtension(file_name.to_path_buf())),
        };
        Ok(writer)
    }

    pub fn record_batch_to_file(&mut self, record_batch: &RecordBatch) -> Result<(), OutputError> {
        match self {
            WriterType::Parquet(to_output) => to_output.writer.write(record_batch)?,
            WriterType::Csv(to_output) => to_output.writer.write(record_batch)?,
        }
        Ok(())
    }

    pub fn close(self) -> Result<(), OutputError> {
        match self {
            WriterType::Parquet(to_output) => to_output.close(),
            WriterType::Csv(to_output) => to_output.close(),
        }
    }
}

#[derive(Debug)]
pub struct WriterParquet {
    pub writer: ArrowWriter<File>,
}

impl WriterParquet {
    fn new(file_name: &Path, schema: Schema) -> Result<Self, OutputError> {
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let output_file = File::create(file_name)?;
        let writer = ArrowWriter::try_new(output_file, SchemaRef::from(schema), Some(props))?;
        Ok(Self { writer })
    }

    pub fn close(self) -> Result<(), OutputError> {
        self.writer.close()?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct WriterCsv {
    pub writer: Writer<File>,
}

impl WriterCsv {
    fn new(file_name: &Path) -> Result<Self, OutputError> {
        let writer = Writer::new(File::create(file_name)?);
        Ok(Self { writer })
    }

    pub fn close(self) -> Result<(), OutputError> {
        self.writer.close()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_extension_is_refused() {
        let path = std::env::temp_dir().join("lorasim_writer_test.txt");
        let result = WriterType::new(&path, Schema::empty());
        assert!(matches!(result, Err(OutputError::UnsupportedExtension(_))));
    }
}
