use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, RecordBatch, UInt32Array, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};

use lorasim_core::message::{PacketId, UplinkMessage};
use lorasim_models::air::registry::InAirRegistry;

use crate::result::ResultWriter;
use crate::writer::{OutputError, WriterType};

/// Timeline of the channel: one row per packet that went on air. Collision flags are
/// final only once the gateway is done with a packet, so the trace is taken at the end
/// of the run.
#[derive(Debug)]
pub struct AirtimeWriter {
    packet_id: Vec<u64>,
    agent_id: Vec<u64>,
    freq_khz: Vec<f64>,
    sf: Vec<u32>,
    bw_khz: Vec<u32>,
    start_ms: Vec<f64>,
    end_ms: Vec<f64>,
    rss: Vec<f64>,
    snr: Vec<f64>,
    collided: Vec<bool>,
    to_output: WriterType,
}

impl AirtimeWriter {
    pub fn new(output_file: &Path) -> Result<Self, OutputError> {
        Ok(Self {
            to_output: WriterType::new(output_file, Self::schema())?,
            packet_id: Vec::new(),
            agent_id: Vec::new(),
            freq_khz: Vec::new(),
            sf: Vec::new(),
            bw_khz: Vec::new(),
            start_ms: Vec::new(),
            end_ms: Vec::new(),
            rss: Vec::new(),
            snr: Vec::new(),
            collided: Vec::new(),
        })
    }

    pub fn add_data(&mut self, packet_id: PacketId, packet: &UplinkMessage) {
        self.packet_id.push(packet_id.as_usize() as u64);
        self.agent_id.push(packet.node_id().as_u64());
        self.freq_khz.push(packet.lora_param.freq);
        self.sf.push(packet.lora_param.sf as u32);
        self.bw_khz.push(packet.lora_param.bw);
        self.start_ms.push(packet.start_on_air.as_f64());
        self.end_ms.push(packet.end_on_air().as_f64());
        self.rss.push(packet.rss());
        self.snr.push(packet.snr());
        self.collided.push(packet.collided());
    }

    pub fn add_registry(&mut self, registry: &InAirRegistry) {
        registry
            .iter()
            .for_each(|(packet_id, packet)| self.add_data(packet_id, packet));
    }

    pub fn pending(&self) -> usize {
        self.packet_id.len()
    }
}

impl ResultWriter for AirtimeWriter {
    fn schema() -> Schema {
        let packet_id = Field::new("packet_id", DataType::UInt64, false);
        let agent_id = Field::new("agent_id", DataType::UInt64, false);
        let freq_khz = Field::new("freq_khz", DataType::Float64, false);
        let sf = Field::new("sf", DataType::UInt32, false);
        let bw_khz = Field::new("bw_khz", DataType::UInt32, false);
        let start_ms = Field::new("start_ms", DataType::Float64, false);
        let end_ms = Field::new("end_ms", DataType::Float64, false);
        let rss = Field::new("rss", DataType::Float64, false);
        let snr = Field::new("snr", DataType::Float64, false);
        let collided = Field::new("collided", DataType::Boolean, false);
        Schema::new(vec![
            packet_id, agent_id, freq_khz, sf, bw_khz, start_ms, end_ms, rss, snr, collided,
        ])
    }

    fn write_to_file(&mut self) -> Result<(), OutputError> {
        let record_batch = RecordBatch::try_from_iter(vec![
            (
                "packet_id",
                Arc::new(UInt64Array::from(std::mem::take(&mut self.packet_id))) as ArrayRef,
            ),
            (
                "agent_id",
                Arc::new(UInt64Array::from(std::mem::take(&mut self.agent_id))) as ArrayRef,
            ),
            (
                "freq_khz",
                Arc::new(Float64Array::from(std::mem::take(&mut self.freq_khz))) as ArrayRef,
            ),
            (
                "sf",
                Arc::new(UInt32Array::from(std::mem::take(&mut self.sf))) as ArrayRef,
            ),
            (
                "bw_khz",
                Arc::new(UInt32Array::from(std::mem::take(&mut self.bw_khz))) as ArrayRef,
            ),
            (
                "start_ms",
                Arc::new(Float64Array::from(std::mem::take(&mut self.start_ms))) as ArrayRef,
            ),
            (
                "end_ms",
                Arc::new(Float64Array::from(std::mem::take(&mut self.end_ms))) as ArrayRef,
            ),
            (
                "rss",
                Arc::new(Float64Array::from(std::mem::take(&mut self.rss))) as ArrayRef,
            ),
            (
                "snr",
                Arc::new(Float64Array::from(std::mem::take(&mut self.snr))) as ArrayRef,
            ),
            (
                "collided",
                Arc::new(BooleanArray::from(std::mem::take(&mut self.collided))) as ArrayRef,
            ),
        ])?;
        self.to_output.record_batch_to_file(&record_batch)
    }

    fn close_file(self) -> Result<(), OutputError> {
        self.to_output.close()
    }
}
