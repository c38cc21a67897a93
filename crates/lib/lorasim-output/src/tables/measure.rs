use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, RecordBatch, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};

use lorasim_core::agent::AgentId;
use lorasim_core::bucket::TimeMS;

use crate::result::ResultWriter;
use crate::writer::{OutputError, WriterType};

/// One row per propagation sample taken at the gateway.
#[derive(Debug)]
pub struct MeasurementWriter {
    time_ms: Vec<f64>,
    agent_id: Vec<u64>,
    rss: Vec<f64>,
    snr: Vec<f64>,
    to_output: WriterType,
}

impl MeasurementWriter {
    pub fn new(output_file: &Path) -> Result<Self, OutputError> {
        Ok(Self {
            to_output: WriterType::new(output_file, Self::schema())?,
            time_ms: Vec::new(),
            agent_id: Vec::new(),
            rss: Vec::new(),
            snr: Vec::new(),
        })
    }

    pub fn add_data(&mut self, time: TimeMS, agent_id: AgentId, rss: f64, snr: f64) {
        self.time_ms.push(time.as_f64());
        self.agent_id.push(agent_id.as_u64());
        self.rss.push(rss);
        self.snr.push(snr);
    }

    pub fn pending(&self) -> usize {
        self.time_ms.len()
    }
}

impl ResultWriter for MeasurementWriter {
    fn schema() -> Schema {
        let time_ms = Field::new("time_ms", DataType::Float64, false);
        let agent_id = Field::new("agent_id", DataType::UInt64, false);
        let rss = Field::new("rss", DataType::Float64, false);
        let snr = Field::new("snr", DataType::Float64, false);
        Schema::new(vec![time_ms, agent_id, rss, snr])
    }

    fn write_to_file(&mut self) -> Result<(), OutputError> {
        let record_batch = RecordBatch::try_from_iter(vec![
            (
                "time_ms",
                Arc::new(Float64Array::from(std::mem::take(&mut self.time_ms))) as ArrayRef,
            ),
            (
                "agent_id",
                Arc::new(UInt64Array::from(std::mem::take(&mut self.agent_id))) as ArrayRef,
            ),
            (
                "rss",
                Arc::new(Float64Array::from(std::mem::take(&mut self.rss))) as ArrayRef,
            ),
            (
                "snr",
                Arc::new(Float64Array::from(std::mem::take(&mut self.snr))) as ArrayRef,
            ),
        ])?;
        self.to_output.record_batch_to_file(&record_batch)
    }

    fn close_file(self) -> Result<(), OutputError> {
        self.to_output.close()
    }
}
