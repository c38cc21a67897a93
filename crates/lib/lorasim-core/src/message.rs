use std::fmt;

use typed_builder::TypedBuilder;

use crate::agent::{AgentId, NodeInfo};
use crate::bucket::TimeMS;
use crate::radio::LoraParams;

/// Handle of a packet inside the in-air registry. Handles are never reused since the
/// registry never forgets a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PacketId(usize);

impl PacketId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl fmt::Display for PacketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An uplink frame sent by an end device.
///
/// The radio parameters and timing are fixed at creation. The received signal strength,
/// SNR and the collision flag are written by the air interface. Once the collision flag
/// is raised it stays raised.
#[derive(Debug, Clone, TypedBuilder)]
pub struct UplinkMessage {
    pub node: NodeInfo,
    pub lora_param: LoraParams,
    pub start_on_air: TimeMS,
    #[builder(default = 20)]
    pub payload_size: u32,
    #[builder(default, setter(skip))]
    rss: f64,
    #[builder(default, setter(skip))]
    snr: f64,
    #[builder(default, setter(skip))]
    collided: bool,
}

impl UplinkMessage {
    pub fn node_id(&self) -> AgentId {
        self.node.id
    }

    pub fn my_time_on_air(&self) -> TimeMS {
        self.lora_param.time_on_air(self.payload_size)
    }

    pub fn end_on_air(&self) -> TimeMS {
        self.start_on_air + self.my_time_on_air()
    }

    pub fn rss(&self) -> f64 {
        self.rss
    }

    pub fn snr(&self) -> f64 {
        self.snr
    }

    pub fn collided(&self) -> bool {
        self.collided
    }

    pub fn set_measurements(&mut self, rss: f64, snr: f64) {
        self.rss = rss;
        self.snr = snr;
    }

    pub fn mark_collided(&mut self) {
        self.collided = true;
    }
}
