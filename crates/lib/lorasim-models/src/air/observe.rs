use log::{debug, trace};

use lorasim_core::message::{PacketId, UplinkMessage};

/// Outcome of the frequency stage of a collision check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyVerdict {
    /// Too close for the guard band of the given bandwidth class (kHz).
    Overlap(u32),
    Separated,
    /// Neither packet uses a bandwidth with a known guard band.
    UnsupportedBandwidth,
}

/// Hooks into the decisions of the air interface. All hooks default to doing nothing so an
/// observer implements only what it is interested in.
pub trait AirObserver: Send {
    fn on_registered(&mut self, _id: PacketId, _packet: &UplinkMessage) {}
    fn on_check(&mut self, _candidate: &UplinkMessage, _in_air: usize) {}
    fn on_compare(&mut self, _candidate: &UplinkMessage, _other: &UplinkMessage) {}
    fn on_frequency(
        &mut self,
        _me: &UplinkMessage,
        _other: &UplinkMessage,
        _verdict: FrequencyVerdict,
    ) {
    }
    fn on_spreading_factor(
        &mut self,
        _me: &UplinkMessage,
        _other: &UplinkMessage,
        _collided: bool,
    ) {
    }
    fn on_timing(&mut self, _me: &UplinkMessage, _other: &UplinkMessage, _collided: bool) {}
    fn on_power(&mut self, _me: &UplinkMessage, _other: &UplinkMessage, _collided: bool) {}
    fn on_verdict(&mut self, _candidate: &UplinkMessage, _collided: bool) {}
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl AirObserver for Silent {}

/// Forwards every decision to the `log` facade. Per-pair decisions go to trace level,
/// per-packet decisions to debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl AirObserver for LogObserver {
    fn on_registered(&mut self, id: PacketId, packet: &UplinkMessage) {
        debug!(
            "packet {} of node {} on air at {}: rss {:3.2} dBm snr {:3.2} dB",
            id,
            packet.node_id(),
            packet.start_on_air,
            packet.rss(),
            packet.snr()
        );
    }

    fn on_check(&mut self, candidate: &UplinkMessage, in_air: usize) {
        debug!(
            "CHECK node {} (sf:{} bw:{} freq:{:.6e}) #others: {}",
            candidate.node_id(),
            candidate.lora_param.sf,
            candidate.lora_param.bw,
            candidate.lora_param.freq,
            in_air
        );
    }

    fn on_compare(&mut self, _candidate: &UplinkMessage, other: &UplinkMessage) {
        trace!(
            ">> node {} (sf:{} bw:{} freq:{:.6e})",
            other.node_id(),
            other.lora_param.sf,
            other.lora_param.bw,
            other.lora_param.freq
        );
    }

    fn on_frequency(
        &mut self,
        _me: &UplinkMessage,
        _other: &UplinkMessage,
        verdict: FrequencyVerdict,
    ) {
        match verdict {
            FrequencyVerdict::Overlap(class) => trace!("frequency coll {}", class),
            FrequencyVerdict::Separated => trace!("no frequency coll"),
            FrequencyVerdict::UnsupportedBandwidth => {
                trace!("no frequency coll, bandwidth without guard band")
            }
        }
    }

    fn on_spreading_factor(&mut self, me: &UplinkMessage, other: &UplinkMessage, collided: bool) {
        match collided {
            true => trace!(
                "collision sf node {} and node {}",
                me.node_id(),
                other.node_id()
            ),
            false => trace!("no sf collision"),
        }
    }

    fn on_timing(&mut self, me: &UplinkMessage, other: &UplinkMessage, collided: bool) {
        if collided {
            trace!(
                "timing coll node {} and node {}",
                me.node_id(),
                other.node_id()
            );
        }
    }

    fn on_power(&mut self, me: &UplinkMessage, other: &UplinkMessage, collided: bool) {
        trace!(
            "pwr: node {} {:3.2} dBm node {} {:3.2} dBm; diff {:3.2} dBm",
            me.node_id(),
            me.rss(),
            other.node_id(),
            other.rss(),
            me.rss() - other.rss()
        );
        if collided {
            trace!(
                "collision pwr both node {} and node {} (too close to each other)",
                me.node_id(),
                other.node_id()
            );
        }
    }

    fn on_verdict(&mut self, candidate: &UplinkMessage, collided: bool) {
        debug!(
            "packet of node {} started at {} collided: {}",
            candidate.node_id(),
            candidate.start_on_air,
            collided
        );
    }
}
