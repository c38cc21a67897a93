use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, RecordBatch, UInt32Array, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};

use lorasim_core::bucket::TimeMS;
use lorasim_core::message::UplinkMessage;

use crate::result::ResultWriter;
use crate::writer::{OutputError, WriterType};

#[derive(Debug)]
pub struct ReceptionWriter {
    time_ms: Vec<f64>,
    agent_id: Vec<u64>,
    sf: Vec<u32>,
    snr: Vec<f64>,
    collided: Vec<bool>,
    decoded: Vec<bool>,
    to_output: WriterType,
}

impl ReceptionWriter {
    pub fn new(output_file: &Path) -> Result<Self, OutputError> {
        Ok(Self {
            to_output: WriterType::new(output_file, Self::schema())?,
            time_ms: Vec::new(),
            agent_id: Vec::new(),
            sf: Vec::new(),
            snr: Vec::new(),
            collided: Vec::new(),
            decoded: Vec::new(),
        })
    }

    pub fn add_data(&mut self, time: TimeMS, packet: &UplinkMessage, collided: bool, decoded: bool) {
        self.time_ms.push(time.as_f64());
        self.agent_id.push(packet.node_id().as_u64());
        self.sf.push(packet.lora_param.sf as u32);
        self.snr.push(packet.snr());
        self.collided.push(collided);
        self.decoded.push(decoded);
    }

    pub fn pending(&self) -> usize {
        self.time_ms.len()
    }
}

impl ResultWriter for ReceptionWriter {
    fn schema() -> Schema {
        let time_ms = Field::new("time_ms", DataType::Float64, false);
        let agent_id = Field::new("agent_id", DataType::UInt64, false);
        let sf = Field::new("sf", DataType::UInt32, false);
        let snr = Field::new("snr", DataType::Float64, false);
        let collided = Field::new("collided", DataType::Boolean, false);
        let decoded = Field::new("decoded", DataType::Boolean, false);
        Schema::new(vec![time_ms, agent_id, sf, snr, collided, decoded])
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
                "sf",
                Arc::new(UInt32Array::from(std::mem::take(&mut self.sf))) as ArrayRef,
            ),
            (
                "snr",
                Arc::new(Float64Array::from(std::mem::take(&mut self.snr))) as ArrayRef,
            ),
            (
                "collided",
                Arc::new(BooleanArray::from(std::mem::take(&mut self.collided))) as ArrayRef,
            ),
            (
                "decoded",
                Arc::new(BooleanArray::from(std::mem::take(&mut self.decoded))) as ArrayRef,
            ),
        ])?;
        self.to_output.record_batch_to_file(&record_batch)
    }

    fn close_file(self) -> Result<(), OutputError> {
        self.to_output.close()
    }
}
