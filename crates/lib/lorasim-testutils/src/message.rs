use lorasim_core::agent::{AgentId, Location, NodeInfo};
use lorasim_core::bucket::TimeMS;
use lorasim_core::message::UplinkMessage;
use lorasim_core::radio::LoraParams;

pub fn node(id: u64) -> NodeInfo {
    NodeInfo::builder()
        .id(AgentId::from(id))
        .location(Location::new(100.0 * id as f64, 0.0, false))
        .build()
}

/// A frame on 868.1 MHz with a 20 byte payload.
pub fn make_message(id: u64, sf: u8, bw: u32, tp: f64, start: f64) -> UplinkMessage {
    make_message_on(id, 868_100.0, sf, bw, tp, start)
}

pub fn make_message_on(id: u64, freq: f64, sf: u8, bw: u32, tp: f64, start: f64) -> UplinkMessage {
    UplinkMessage::builder()
        .node(node(id))
        .lora_param(
            LoraParams::builder()
                .freq(freq)
                .bw(bw)
                .sf(sf)
                .tp(tp)
                .build(),
        )
        .start_on_air(TimeMS::from(start))
        .build()
}
