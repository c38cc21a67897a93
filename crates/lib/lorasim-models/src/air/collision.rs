//! Pairwise collision test between two uplink frames seen by the same gateway.
//!
//! A frame `me` is lost because of `other` only when all four stages agree: the carriers are
//! inside the guard band, both use the same spreading factor, `other` is on air during the
//! critical section of `me`, and neither signal is strong enough to capture the receiver.
//! The test is one-sided: it answers whether `me` is lost, never whether `other` is.

use lorasim_core::bucket::TimeMS;
use lorasim_core::message::UplinkMessage;
use lorasim_core::radio::PREAMBLE_SYMBOLS;

use crate::air::observe::{AirObserver, FrequencyVerdict};

/// Minimum power difference (dB) for the stronger frame to capture the receiver.
pub const POWER_THRESHOLD: f64 = 6.0;

/// Preamble symbols that can be lost without losing the frame.
const LOSABLE_PREAMBLE_SYMBOLS: u32 = 5;

/// Guard band (kHz) for each supported bandwidth class, widest first.
const GUARD_BANDS: [(u32, f64); 3] = [(500, 120.0), (250, 60.0), (125, 30.0)];

pub fn frequency_verdict(p1: &UplinkMessage, p2: &UplinkMessage) -> FrequencyVerdict {
    if !p1.lora_param.has_supported_bandwidth() && !p2.lora_param.has_supported_bandwidth() {
        return FrequencyVerdict::UnsupportedBandwidth;
    }
    let delta = (p1.lora_param.freq - p2.lora_param.freq).abs();
    for (bandwidth, guard) in GUARD_BANDS.iter() {
        if p1.lora_param.bw != *bandwidth && p2.lora_param.bw != *bandwidth {
            continue;
        }
        if delta <= *guard {
            return FrequencyVerdict::Overlap(*bandwidth);
        }
    }
    FrequencyVerdict::Separated
}

pub fn frequency_collision<O>(p1: &UplinkMessage, p2: &UplinkMessage, observer: &mut O) -> bool
where
    O: AirObserver + ?Sized,
{
    let verdict = frequency_verdict(p1, p2);
    observer.on_frequency(p1, p2, verdict);
    matches!(verdict, FrequencyVerdict::Overlap(_))
}

pub fn sf_collision<O>(p1: &UplinkMessage, p2: &UplinkMessage, observer: &mut O) -> bool
where
    O: AirObserver + ?Sized,
{
    let collided = p1.lora_param.sf == p2.lora_param.sf;
    observer.on_spreading_factor(p1, p2, collided);
    collided
}

/// The part of the frame that must be received without interference: everything after the
/// first few preamble symbols.
pub fn critical_section(me: &UplinkMessage) -> (TimeMS, TimeMS) {
    let sym_duration = me.lora_param.symbol_duration();
    let lead = sym_duration * (PREAMBLE_SYMBOLS - LOSABLE_PREAMBLE_SYMBOLS) as f64;
    let start = me.start_on_air + TimeMS::from(lead);
    let end = me.start_on_air + me.my_time_on_air();
    (start, end)
}

pub fn timing_collision<O>(me: &UplinkMessage, other: &UplinkMessage, observer: &mut O) -> bool
where
    O: AirObserver + ?Sized,
{
    let (critical_start, critical_end) = critical_section(me);
    let other_end = other.start_on_air + other.my_time_on_air();
    let collided = !(other_end < critical_start || other.start_on_air > critical_end);
    observer.on_timing(me, other, collided);
    collided
}

pub fn power_collision<O>(me: &UplinkMessage, other: &UplinkMessage, observer: &mut O) -> bool
where
    O: AirObserver + ?Sized,
{
    let collided = (me.rss() - other.rss()).abs() < POWER_THRESHOLD;
    observer.on_power(me, other, collided);
    collided
}

/// Whether `candidate` is lost because of `other`. Stages are evaluated in order and stop at
/// the first one that clears the pair.
pub fn collides<O>(candidate: &UplinkMessage, other: &UplinkMessage, observer: &mut O) -> bool
where
    O: AirObserver + ?Sized,
{
    frequency_collision(candidate, other, observer)
        && sf_collision(candidate, other, observer)
        && timing_collision(candidate, other, observer)
        && power_collision(candidate, other, observer)
}

/// Runs [collides] and raises the collision flag of `candidate` on a hit. `other` is left
/// untouched; it has to be checked as a candidate on its own.
pub fn mark_collision<O>(
    candidate: &mut UplinkMessage,
    other: &UplinkMessage,
    observer: &mut O,
) -> bool
where
    O: AirObserver + ?Sized,
{
    let collided = collides(candidate, other, observer);
    if collided {
        candidate.mark_collided();
    }
    collided
}

#[cfg(test)]
mod tests {
    use lorasim_core::agent::{AgentId, Location, NodeInfo};
    use lorasim_core::radio::LoraParams;

    use crate::air::observe::Silent;

    use super::*;

    fn frame(id: u64, freq: f64, bw: u32, sf: u8, start: f64, rss: f64) -> UplinkMessage {
        let mut message = UplinkMessage::builder()
            .node(
                NodeInfo::builder()
                    .id(AgentId::from(id))
                    .location(Location::default())
                    .build(),
            )
            .lora_param(
                LoraParams::builder()
                    .freq(freq)
                    .bw(bw)
                    .sf(sf)
                    .tp(14.0)
                    .build(),
            )
            .start_on_air(TimeMS::from(start))
            .build();
        message.set_measurements(rss, rss + 120.0);
        message
    }

    fn on_freq(freq: f64, bw: u32) -> UplinkMessage {
        frame(2, freq, bw, 7, 0.0, -90.0)
    }

    #[test]
    fn frequency_thresholds() {
        let base = 868_000.0;
        let cases = [
            (120.0, 500, 500, true),
            (120.0, 500, 125, true),
            (121.0, 500, 500, false),
            (60.0, 250, 250, true),
            (61.0, 250, 125, false),
            (30.0, 125, 125, true),
            (31.0, 125, 125, false),
        ];
        for (delta, bw1, bw2, expected) in cases.iter() {
            let p1 = on_freq(base, *bw1);
            let p2 = on_freq(base + delta, *bw2);
            assert_eq!(
                frequency_collision(&p1, &p2, &mut Silent),
                *expected,
                "delta {} bw {} / {}",
                delta,
                bw1,
                bw2
            );
        }
    }

    #[test]
    fn frequency_test_is_symmetric_in_bandwidth() {
        let p1 = on_freq(868_000.0, 125);
        let p2 = on_freq(868_100.0, 500);
        assert!(frequency_collision(&p1, &p2, &mut Silent));
        assert!(frequency_collision(&p2, &p1, &mut Silent));
    }

    #[test]
    fn unsupported_bandwidth_never_overlaps() {
        let p1 = on_freq(868_000.0, 62);
        let p2 = on_freq(868_000.0, 62);
        assert_eq!(
            frequency_verdict(&p1, &p2),
            FrequencyVerdict::UnsupportedBandwidth
        );
        assert!(!frequency_collision(&p1, &p2, &mut Silent));
    }

    #[test]
    fn one_supported_bandwidth_is_enough() {
        let p1 = on_freq(868_000.0, 62);
        let near = on_freq(868_020.0, 125);
        let far = on_freq(868_040.0, 125);
        assert_eq!(frequency_verdict(&p1, &near), FrequencyVerdict::Overlap(125));
        assert_eq!(frequency_verdict(&p1, &far), FrequencyVerdict::Separated);
    }

    #[test]
    fn spreading_factors_are_orthogonal() {
        let p1 = frame(1, 868_100.0, 125, 7, 0.0, -90.0);
        let p2 = frame(2, 868_100.0, 125, 8, 0.0, -90.0);
        assert!(!sf_collision(&p1, &p2, &mut Silent));
        assert!(!collides(&p1, &p2, &mut Silent));
        assert!(!collides(&p2, &p1, &mut Silent));
    }

    #[test]
    fn critical_section_skips_early_preamble() {
        let p1 = frame(1, 868_100.0, 125, 7, 0.0, -90.0);
        let (start, end) = critical_section(&p1);
        assert!((start.as_f64() - 3.072).abs() < 1e-9);
        assert_eq!(end, p1.my_time_on_air());
    }

    #[test]
    fn frame_after_end_does_not_collide_on_timing() {
        let p1 = frame(1, 868_100.0, 125, 7, 0.0, -90.0);
        let after = p1.my_time_on_air().as_f64() + 0.001;
        let p2 = frame(2, 868_100.0, 125, 7, after, -90.0);
        assert!(!timing_collision(&p1, &p2, &mut Silent));
        assert!(!collides(&p1, &p2, &mut Silent));
    }

    #[test]
    fn frame_touching_the_end_collides_on_timing() {
        let p1 = frame(1, 868_100.0, 125, 7, 0.0, -90.0);
        let p2 = frame(2, 868_100.0, 125, 7, p1.my_time_on_air().as_f64(), -90.0);
        assert!(timing_collision(&p1, &p2, &mut Silent));
    }

    #[test]
    fn frame_ending_in_early_preamble_is_harmless() {
        let p2 = frame(2, 868_100.0, 125, 7, 0.0, -90.0);
        let p2_end = p2.end_on_air().as_f64();
        let p1 = frame(1, 868_100.0, 125, 7, p2_end - 2.0, -90.0);
        assert!(!timing_collision(&p1, &p2, &mut Silent));
        // p1 starts inside the critical section of p2.
        assert!(timing_collision(&p2, &p1, &mut Silent));
    }

    #[test]
    fn capture_threshold_is_exclusive() {
        let p1 = frame(1, 868_100.0, 125, 7, 0.0, -90.0);
        let close = frame(2, 868_100.0, 125, 7, 10.0, -95.0);
        let far = frame(2, 868_100.0, 125, 7, 10.0, -96.0);
        assert!(power_collision(&p1, &close, &mut Silent));
        assert!(collides(&p1, &close, &mut Silent));
        assert!(!power_collision(&p1, &far, &mut Silent));
        assert!(!collides(&p1, &far, &mut Silent));
    }

    #[test]
    fn marking_is_one_sided() {
        let mut p1 = frame(1, 868_100.0, 125, 7, 0.0, -90.0);
        let p2 = frame(2, 868_100.0, 125, 7, 5.0, -91.0);
        assert!(mark_collision(&mut p1, &p2, &mut Silent));
        assert!(p1.collided());
        assert!(!p2.collided());
    }
}
