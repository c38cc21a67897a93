use std::ops::Range;

use log::warn;

use lorasim_core::bucket::TimeMS;
use lorasim_core::message::{PacketId, UplinkMessage};

/// Every packet that was ever put on air during the run, in registration order.
///
/// Packets are never removed, so a packet id stays valid for the whole run. As long as
/// packets are registered in order of their start time, the registry doubles as an index
/// over start times: together with the longest time on air seen so far it bounds the
/// packets that can overlap a given interval. A late-starting registration switches the
/// index off and lookups fall back to the whole registry.
#[derive(Debug, Clone)]
pub struct InAirRegistry {
    packets: Vec<UplinkMessage>,
    ordered: bool,
    max_time_on_air: TimeMS,
}

impl Default for InAirRegistry {
    fn default() -> Self {
        Self {
            packets: Vec::new(),
            ordered: true,
            max_time_on_air: TimeMS::default(),
        }
    }
}

impl InAirRegistry {
    pub fn register(&mut self, packet: UplinkMessage) -> PacketId {
        if let Some(last) = self.packets.last() {
            if self.ordered && packet.start_on_air < last.start_on_air {
                warn!(
                    "packet of node {} starts at {} before the last registered start {}; \
                     collision lookups scan the whole registry from now on",
                    packet.node_id(),
                    packet.start_on_air,
                    last.start_on_air
                );
                self.ordered = false;
            }
        }
        let time_on_air = packet.my_time_on_air();
        if time_on_air > self.max_time_on_air {
            self.max_time_on_air = time_on_air;
        }
        self.packets.push(packet);
        PacketId::new(self.packets.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    pub fn get(&self, id: PacketId) -> Option<&UplinkMessage> {
        self.packets.get(id.as_usize())
    }

    pub(crate) fn get_mut(&mut self, id: PacketId) -> Option<&mut UplinkMessage> {
        self.packets.get_mut(id.as_usize())
    }

    pub fn packets(&self) -> &[UplinkMessage] {
        &self.packets
    }

    pub fn iter(&self) -> impl Iterator<Item = (PacketId, &UplinkMessage)> {
        self.packets
            .iter()
            .enumerate()
            .map(|(idx, packet)| (PacketId::new(idx), packet))
    }

    /// Positions of the packets that may be on air at some point of `[from, to]`.
    /// Every packet on air during the interval is included; some that are not may be too.
    pub fn overlapping(&self, from: TimeMS, to: TimeMS) -> Range<usize> {
        if !self.ordered {
            return 0..self.packets.len();
        }
        // Same sum as the timing test so that a packet ending exactly at `from` is kept.
        let first = self
            .packets
            .partition_point(|packet| packet.start_on_air + self.max_time_on_air < from);
        let last = self
            .packets
            .partition_point(|packet| packet.start_on_air <= to);
        first..last.max(first)
    }
}
