use log::{debug, error, info};
use typed_builder::TypedBuilder;

use lorasim_core::bucket::{Bucket, Clock, SimClock, TimeMS};
use lorasim_core::message::{PacketId, UplinkMessage};
use lorasim_models::air::error::ChannelError;
use lorasim_models::air::interface::AirInterface;
use lorasim_models::air::observe::LogObserver;
use lorasim_models::net::propagation::PropagationType;
use lorasim_models::net::snr::NoiseFloorSnr;
use lorasim_output::result::Results;

use crate::lora::decode::Demodulator;

pub type GatewayAir = AirInterface<PropagationType, NoiseFloorSnr, LogObserver>;

/// What the gateway made of the frames it finished receiving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceptionStats {
    pub received: u64,
    pub collided: u64,
    pub delivered: u64,
    pub below_sensitivity: u64,
}

#[derive(TypedBuilder)]
pub struct GatewayBucket {
    pub air: GatewayAir,
    pub demodulator: Demodulator,
    pub results: Results,
    pub output_interval: TimeMS,
    #[builder(default)]
    pub clock: SimClock,
    #[builder(default)]
    pub next_output: TimeMS,
    #[builder(default)]
    pub stats: ReceptionStats,
}

impl GatewayBucket {
    pub fn now(&self) -> TimeMS {
        self.clock.now()
    }

    /// Puts the frame on air and notes what the gateway measured for it.
    pub fn put_on_air(&mut self, packet: UplinkMessage) -> Result<PacketId, ChannelError> {
        let packet_id = self.air.register(packet, &self.clock)?;
        if let (Some(writer), Some(packet)) =
            (&mut self.results.measurements, self.air.packet(packet_id))
        {
            writer.add_data(self.clock.now(), packet.node_id(), packet.rss(), packet.snr());
        }
        Ok(packet_id)
    }

    /// Called when the frame has left the air. Returns whether the gateway decoded it.
    pub fn receive(&mut self, packet_id: PacketId) -> Result<bool, ChannelError> {
        let collided = self.air.on_received(packet_id)?;
        let packet = self
            .air
            .packet(packet_id)
            .ok_or(ChannelError::UnknownPacket(packet_id))?;

        self.stats.received += 1;
        let decoded = match collided {
            true => {
                self.stats.collided += 1;
                false
            }
            false => {
                let decoded = self
                    .demodulator
                    .can_decode(packet.lora_param.sf, packet.snr());
                match decoded {
                    true => self.stats.delivered += 1,
                    false => self.stats.below_sensitivity += 1,
                }
                decoded
            }
        };

        if let Some(writer) = &mut self.results.receptions {
            writer.add_data(self.clock.now(), packet, collided, decoded);
        }
        Ok(decoded)
    }

    fn log_stats(&self) {
        info!(
            "Gateway received {} frames: {} delivered, {} collided, {} below sensitivity",
            self.stats.received,
            self.stats.delivered,
            self.stats.collided,
            self.stats.below_sensitivity
        );
    }
}

impl Bucket for GatewayBucket {
    fn initialize(&mut self, step: TimeMS) {
        self.clock.advance(step);
        self.next_output = step + self.output_interval;
        info!(
            "Gateway {} listening at ({}, {})",
            self.air.gateway().id,
            self.air.gateway().location.x,
            self.air.gateway().location.y
        );
    }

    fn before_agents(&mut self, step: TimeMS) {
        self.clock.advance(step);
        if self.output_interval > TimeMS::default() && step >= self.next_output {
            self.stream_output();
            while self.next_output <= step {
                self.next_output += self.output_interval;
            }
        }
    }

    fn stream_output(&mut self) {
        debug!("Writing output at {}", self.clock.now());
        if let Err(e) = self.results.write_to_file() {
            error!("Failed to write results at {}: {}", self.clock.now(), e);
        }
    }

    fn terminate(mut self) {
        if let Some(writer) = &mut self.results.airtime {
            writer.add_registry(self.air.registry());
        }
        if let Err(e) = self.results.write_to_file() {
            error!("Failed to write the final results: {}", e);
        }
        let results = std::mem::replace(
            &mut self.results,
            Results {
                measurements: None,
                airtime: None,
                receptions: None,
            },
        );
        if let Err(e) = results.close_files() {
            error!("Failed to close the result files: {}", e);
        }
        self.air.log_summary();
        self.log_stats();
    }
}
