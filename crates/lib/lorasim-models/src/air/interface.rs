use std::fmt::{Display, Formatter};

use log::{info, warn};
use typed_builder::TypedBuilder;

use lorasim_core::agent::{AgentId, Location, NodeInfo};
use lorasim_core::bucket::Clock;
use lorasim_core::message::{PacketId, UplinkMessage};
use lorasim_core::model::{PropagationModel, SnrModel};

use crate::air::collision::{critical_section, mark_collision};
use crate::air::error::ChannelError;
use crate::air::measure::{MeasurementLog, PropMeasurement};
use crate::air::observe::AirObserver;
use crate::air::registry::InAirRegistry;

/// Packet counts of the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSummary {
    pub sent: u64,
    pub collided: u64,
}

impl ChannelSummary {
    pub fn collision_ratio(&self) -> f64 {
        self.collided as f64 / self.sent as f64
    }
}

impl Display for ChannelSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(sent: {}, collided: {}, collided share: {:2.2}%)",
            self.sent,
            self.collided,
            self.collision_ratio() * 100.0
        )
    }
}

/// The radio channel as observed by a single gateway.
///
/// Packets are registered when they go on air and checked for collisions when the gateway
/// has received them completely. Registration must precede the check of every packet that
/// could overlap the registered one; the event scheduler guarantees this.
#[derive(TypedBuilder)]
pub struct AirInterface<P, S, O>
where
    P: PropagationModel,
    S: SnrModel,
    O: AirObserver,
{
    gateway: NodeInfo,
    prop_model: P,
    snr_model: S,
    observer: O,
    #[builder(default)]
    registry: InAirRegistry,
    #[builder(default)]
    measurements: MeasurementLog,
    #[builder(default)]
    num_of_packets_sent: u64,
    #[builder(default)]
    num_of_packets_collided: u64,
}

impl<P, S, O> AirInterface<P, S, O>
where
    P: PropagationModel,
    S: SnrModel,
    O: AirObserver,
{
    pub fn new(gateway: NodeInfo, prop_model: P, snr_model: S, observer: O) -> Self {
        Self::builder()
            .gateway(gateway)
            .prop_model(prop_model)
            .snr_model(snr_model)
            .observer(observer)
            .build()
    }

    /// Puts a packet on air: measures it at the gateway, logs the measurement for its node
    /// and keeps it in the registry for the rest of the run.
    pub fn register<C: Clock>(
        &mut self,
        mut packet: UplinkMessage,
        clock: &C,
    ) -> Result<PacketId, ChannelError> {
        let from_node = packet.node;
        let distance = Location::distance(&self.gateway.location, &from_node.location);
        let rss = self.prop_model.received_power(
            from_node.location.indoor,
            packet.lora_param.tp,
            distance,
        );
        let snr = self.snr_model.snr(rss);
        self.measurements
            .record(from_node.id, clock.now(), rss, snr)?;

        self.num_of_packets_sent += 1;
        packet.set_measurements(rss, snr);
        let packet_id = self.registry.register(packet);
        if let Some(packet) = self.registry.get(packet_id) {
            self.observer.on_registered(packet_id, packet);
        }
        Ok(packet_id)
    }

    /// Decides whether the packet collided, once the gateway has received it completely.
    /// The packet is checked against every packet of the other nodes that could overlap it.
    /// Only this packet's flag is raised; the packets it collided with keep theirs.
    pub fn on_received(&mut self, packet_id: PacketId) -> Result<bool, ChannelError> {
        let mut candidate = self
            .registry
            .get(packet_id)
            .cloned()
            .ok_or(ChannelError::UnknownPacket(packet_id))?;
        self.observer.on_check(&candidate, self.registry.len());

        if !candidate.collided() {
            let (critical_start, critical_end) = critical_section(&candidate);
            for idx in self.registry.overlapping(critical_start, critical_end) {
                let other = &self.registry.packets()[idx];
                if other.node_id() == candidate.node_id() {
                    continue;
                }
                self.observer.on_compare(&candidate, other);
                mark_collision(&mut candidate, other, &mut self.observer);
            }
        }
        let collided = candidate.collided();
        self.observer.on_verdict(&candidate, collided);

        if collided {
            if let Some(packet) = self.registry.get_mut(packet_id) {
                packet.mark_collided();
            }
            self.num_of_packets_collided += 1;
        }
        Ok(collided)
    }

    pub fn packet(&self, packet_id: PacketId) -> Option<&UplinkMessage> {
        self.registry.get(packet_id)
    }

    pub fn measurements_for(&self, node_id: AgentId) -> Result<&PropMeasurement, ChannelError> {
        self.measurements.get(node_id)
    }

    pub fn summary(&self) -> Result<ChannelSummary, ChannelError> {
        if self.num_of_packets_sent == 0 {
            return Err(ChannelError::NoPacketsSent);
        }
        Ok(ChannelSummary {
            sent: self.num_of_packets_sent,
            collided: self.num_of_packets_collided,
        })
    }

    pub fn log_summary(&self) {
        match self.summary() {
            Ok(summary) => {
                info!("Total number of packets in the air {}", summary.sent);
                info!(
                    "Total number of packets collided {} {:2.2}%",
                    summary.collided,
                    summary.collision_ratio() * 100.0
                );
            }
            Err(e) => warn!("No channel summary: {}", e),
        }
    }

    pub fn packets_sent(&self) -> u64 {
        self.num_of_packets_sent
    }

    pub fn packets_collided(&self) -> u64 {
        self.num_of_packets_collided
    }

    pub fn gateway(&self) -> &NodeInfo {
        &self.gateway
    }

    pub fn registry(&self) -> &InAirRegistry {
        &self.registry
    }

    pub fn measurements(&self) -> &MeasurementLog {
        &self.measurements
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }
}
