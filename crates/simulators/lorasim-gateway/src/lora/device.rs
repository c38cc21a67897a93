use log::{debug, error};
use rand::Rng;
use rand_pcg::Pcg64Mcg;
use typed_builder::TypedBuilder;

use lorasim_core::agent::{Activatable, Agent, AgentId, AgentKind, NodeInfo};
use lorasim_core::bucket::TimeMS;
use lorasim_core::message::{PacketId, UplinkMessage};
use lorasim_core::radio::LoraParams;
use lorasim_models::dist::RngSampler;

use crate::lora::bucket::GatewayBucket;

/// Radio setup shared by a group of end devices.
#[derive(Debug, Clone, TypedBuilder)]
pub struct DeviceRadio {
    pub channels: Vec<f64>,
    pub bw: u32,
    pub sf: u8,
    pub tp: f64,
    #[builder(default = 1)]
    pub cr: u8,
    #[builder(default = 20)]
    pub payload_size: u32,
}

/// A class A end device: it sends an uplink frame, waits for it to leave the air and then
/// sleeps for a random gap before the next one.
#[derive(Clone, TypedBuilder)]
pub struct EndDevice {
    pub node: NodeInfo,
    pub radio: DeviceRadio,
    pub interval: RngSampler,
    pub channel_rng: Pcg64Mcg,
    #[builder(default)]
    pub max_transmissions: Option<u32>,
    #[builder(default)]
    pub tx_count: u32,
    #[builder(default)]
    pub in_air: Option<PacketId>,
    #[builder(default)]
    pub(crate) active: bool,
}

impl EndDevice {
    fn pick_channel(&mut self) -> f64 {
        match self.radio.channels.len() {
            0 => 0.0,
            1 => self.radio.channels[0],
            n => self.radio.channels[self.channel_rng.gen_range(0..n)],
        }
    }

    fn next_frame(&mut self, start: TimeMS) -> UplinkMessage {
        let lora_param = LoraParams::builder()
            .freq(self.pick_channel())
            .bw(self.radio.bw)
            .sf(self.radio.sf)
            .tp(self.radio.tp)
            .cr(self.radio.cr)
            .build();
        UplinkMessage::builder()
            .node(self.node)
            .lora_param(lora_param)
            .start_on_air(start)
            .payload_size(self.radio.payload_size)
            .build()
    }

    fn is_done(&self) -> bool {
        match self.max_transmissions {
            Some(max) => self.tx_count >= max,
            None => false,
        }
    }
}

impl Activatable for EndDevice {
    fn activate(&mut self) {
        self.active = true;
    }

    fn deactivate(&mut self) {
        self.active = false;
    }

    fn is_deactivated(&self) -> bool {
        !self.active
    }

    fn time_to_activation(&mut self, now: TimeMS) -> TimeMS {
        now + TimeMS::from(self.interval.sample().max(0.0))
    }
}

impl Agent<GatewayBucket> for EndDevice {
    fn id(&self) -> AgentId {
        self.node.id
    }

    fn kind(&self) -> AgentKind {
        AgentKind::EndDevice
    }

    fn on_start(&mut self, bucket: &mut GatewayBucket) -> TimeMS {
        let now = bucket.now();
        let frame = self.next_frame(now);
        let end = frame.end_on_air();
        self.tx_count += 1;
        match bucket.put_on_air(frame) {
            Ok(packet_id) => {
                debug!("Device {} sent packet {} at {}", self.node.id, packet_id, now);
                self.in_air = Some(packet_id);
                end
            }
            Err(e) => {
                error!("Device {} could not transmit at {}: {}", self.node.id, now, e);
                now
            }
        }
    }

    fn on_end(&mut self, bucket: &mut GatewayBucket) {
        if let Some(packet_id) = self.in_air.take() {
            if let Err(e) = bucket.receive(packet_id) {
                error!("Device {} lost track of packet {}: {}", self.node.id, packet_id, e);
            }
        }
        if self.is_done() {
            debug!("Device {} finished after {} frames", self.node.id, self.tx_count);
            self.deactivate();
        }
    }
}
