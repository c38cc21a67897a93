use rand::Rng;

use lorasim_core::agent::{AgentId, Location, NodeInfo};
use lorasim_core::bucket::{Clock, SimClock, TimeMS};
use lorasim_core::message::{PacketId, UplinkMessage};
use lorasim_models::air::collision::{collides, critical_section};
use lorasim_models::air::error::ChannelError;
use lorasim_models::air::interface::AirInterface;
use lorasim_models::air::observe::{AirObserver, LogObserver, Silent};
use lorasim_models::rand_pcg::Pcg64Mcg;
use lorasim_testutils::message::{make_message, make_message_on};
use lorasim_testutils::model::{fixed_models, FixedLoss, FixedNoise};

type TestAir<O> = AirInterface<FixedLoss, FixedNoise, O>;

fn gateway() -> NodeInfo {
    NodeInfo::builder()
        .id(AgentId::from(0))
        .location(Location::new(0.0, 0.0, false))
        .build()
}

fn create_air() -> TestAir<Silent> {
    let (prop, snr) = fixed_models();
    AirInterface::new(gateway(), prop, snr, Silent)
}

fn clock_at(time: f64) -> SimClock {
    let mut clock = SimClock::default();
    clock.advance(TimeMS::from(time));
    clock
}

fn put_on_air<O: AirObserver>(air: &mut TestAir<O>, packet: UplinkMessage) -> PacketId {
    let clock = clock_at(packet.start_on_air.as_f64());
    air.register(packet, &clock).expect("clock is monotonic")
}

#[derive(Default)]
struct CountingObserver {
    compares: usize,
    verdicts: Vec<bool>,
}

impl AirObserver for CountingObserver {
    fn on_compare(&mut self, _candidate: &UplinkMessage, _other: &UplinkMessage) {
        self.compares += 1;
    }

    fn on_verdict(&mut self, _candidate: &UplinkMessage, collided: bool) {
        self.verdicts.push(collided);
    }
}

#[test]
fn test_register_measures_packet() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (prop, snr) = fixed_models();
    let mut air = AirInterface::new(gateway(), prop, snr, LogObserver);
    let id = put_on_air(&mut air, make_message(1, 7, 125, 14.0, 0.0));

    let packet = air.packet(id).expect("registered");
    assert_eq!(packet.rss(), -86.0);
    assert_eq!(packet.snr(), 34.0);
    assert!(!packet.collided());
    assert_eq!(air.packets_sent(), 1);
}

#[test]
fn test_overlapping_packets_collide() {
    let mut air = create_air();
    let a = put_on_air(&mut air, make_message(1, 7, 125, 14.0, 0.0));
    let b = put_on_air(&mut air, make_message(2, 7, 125, 12.0, 10.0));
    assert_eq!(air.on_received(a), Ok(true));
    assert_eq!(air.on_received(b), Ok(true));
    assert_eq!(air.packets_collided(), 2);
}

#[test]
fn test_marking_is_one_sided() {
    let mut air = create_air();
    let a = put_on_air(&mut air, make_message(1, 7, 125, 14.0, 0.0));
    let b = put_on_air(&mut air, make_message(2, 7, 125, 14.0, 0.0));
    assert_eq!(air.on_received(a), Ok(true));
    assert!(air.packet(a).map(|p| p.collided()).unwrap_or(false));
    assert!(!air.packet(b).map(|p| p.collided()).unwrap_or(true));
    assert_eq!(air.packets_collided(), 1);
}

#[test]
fn test_collided_packet_is_not_rescanned() {
    let (prop, snr) = fixed_models();
    let mut air = AirInterface::new(gateway(), prop, snr, CountingObserver::default());
    let a = put_on_air(&mut air, make_message(1, 7, 125, 14.0, 0.0));
    put_on_air(&mut air, make_message(2, 7, 125, 14.0, 1.0));

    assert_eq!(air.on_received(a), Ok(true));
    let compares = air.observer().compares;
    assert_eq!(compares, 1);
    assert_eq!(air.on_received(a), Ok(true));
    assert_eq!(air.on_received(a), Ok(true));
    assert_eq!(air.observer().compares, compares);
    assert_eq!(air.observer().verdicts, vec![true, true, true]);
    assert_eq!(air.packets_collided(), 3);
}

#[test]
fn test_capture_saves_the_stronger_packet() {
    let mut air = create_air();
    let strong = put_on_air(&mut air, make_message(1, 7, 125, 20.0, 0.0));
    let weak = put_on_air(&mut air, make_message(2, 7, 125, 14.0, 5.0));
    assert_eq!(air.on_received(strong), Ok(false));
    assert_eq!(air.on_received(weak), Ok(false));

    let close = put_on_air(&mut air, make_message(3, 7, 125, 15.0, 10.0));
    assert_eq!(air.on_received(close), Ok(true));
}

#[test]
fn test_different_sf_never_collide() {
    let mut air = create_air();
    let ids: Vec<PacketId> = (7..=12)
        .map(|sf| put_on_air(&mut air, make_message(sf as u64, sf, 125, 14.0, 0.0)))
        .collect();
    for id in ids {
        assert_eq!(air.on_received(id), Ok(false));
    }
}

#[test]
fn test_same_node_never_collides_with_itself() {
    let mut air = create_air();
    let a = put_on_air(&mut air, make_message(1, 7, 125, 14.0, 0.0));
    put_on_air(&mut air, make_message(1, 7, 125, 14.0, 1.0));
    assert_eq!(air.on_received(a), Ok(false));
}

#[test]
fn test_separated_channels_do_not_collide() {
    let mut air = create_air();
    let a = put_on_air(&mut air, make_message_on(1, 868_100.0, 7, 125, 14.0, 0.0));
    let b = put_on_air(&mut air, make_message_on(2, 868_300.0, 7, 125, 14.0, 0.0));
    assert_eq!(air.on_received(a), Ok(false));
    assert_eq!(air.on_received(b), Ok(false));
}

#[test]
fn test_registry_keeps_all_packets() {
    let mut air = create_air();
    let mut ids = Vec::new();
    for i in 0..20u64 {
        ids.push(put_on_air(
            &mut air,
            make_message(i % 4, 7, 125, 14.0, i as f64 * 20.0),
        ));
    }
    for id in ids.iter() {
        air.on_received(*id).expect("registered");
    }
    assert_eq!(air.registry().len(), 20);
    assert_eq!(air.packets_sent(), 20);
    assert!(air.packets_collided() <= 20);
}

#[test]
fn test_measurements_follow_transmissions() {
    let mut air = create_air();
    for start in [0.0, 5.0, 9.0] {
        put_on_air(&mut air, make_message(4, 7, 125, 14.0, start));
    }
    let record = air.measurements_for(AgentId::from(4)).expect("node sent");
    let times: Vec<f64> = record.time.iter().map(|t| t.as_f64()).collect();
    assert_eq!(times, vec![0.0, 5.0, 9.0]);
    assert_eq!(record.rss.len(), 3);
    assert_eq!(record.snr.len(), 3);
}

#[test]
fn test_measurement_time_comes_from_the_clock() {
    let mut air = create_air();
    let clock = clock_at(42.0);
    air.register(make_message(1, 7, 125, 14.0, 40.0), &clock)
        .expect("first sample");
    let record = air.measurements_for(AgentId::from(1)).expect("node sent");
    assert_eq!(record.time, vec![clock.now()]);
}

#[test]
fn test_clock_going_back_is_refused() {
    let mut air = create_air();
    put_on_air(&mut air, make_message(1, 7, 125, 14.0, 10.0));
    let result = air.register(make_message(1, 7, 125, 14.0, 5.0), &clock_at(5.0));
    assert!(matches!(result, Err(ChannelError::TimeRegression { .. })));
    assert_eq!(air.packets_sent(), 1);
    assert_eq!(air.registry().len(), 1);
}

#[test]
fn test_unknown_node_has_no_measurements() {
    let air = create_air();
    assert_eq!(
        air.measurements_for(AgentId::from(9)).map(|r| r.len()),
        Err(ChannelError::NodeNotFound(AgentId::from(9)))
    );
}

#[test]
fn test_unknown_packet_is_refused() {
    let mut air = create_air();
    assert_eq!(
        air.on_received(PacketId::new(3)),
        Err(ChannelError::UnknownPacket(PacketId::new(3)))
    );
}

#[test]
fn test_summary_needs_traffic() {
    let mut air = create_air();
    assert_eq!(air.summary(), Err(ChannelError::NoPacketsSent));

    let a = put_on_air(&mut air, make_message(1, 7, 125, 14.0, 0.0));
    put_on_air(&mut air, make_message(2, 7, 125, 14.0, 0.0));
    put_on_air(&mut air, make_message(3, 8, 125, 14.0, 0.0));
    put_on_air(&mut air, make_message(4, 9, 125, 14.0, 0.0));
    air.on_received(a).expect("registered");

    let summary = air.summary().expect("packets were sent");
    assert_eq!(summary.sent, 4);
    assert_eq!(summary.collided, 1);
    assert_eq!(summary.collision_ratio(), 0.25);
}

#[test]
fn test_indexed_lookup_matches_full_scan() {
    let mut rng = Pcg64Mcg::new(11);
    let mut air = create_air();
    let mut start = 0.0;
    let mut ids = Vec::new();
    for _ in 0..400 {
        start += rng.gen_range(0.0..40.0);
        let node = rng.gen_range(1..30u64);
        let sf = rng.gen_range(7..=9u8);
        let freq = [868_100.0, 868_300.0, 868_500.0][rng.gen_range(0..3)];
        let tp = rng.gen_range(2.0..20.0);
        ids.push(put_on_air(
            &mut air,
            make_message_on(node, freq, sf, 125, tp, start),
        ));
    }
    assert!(air.registry().is_ordered());

    for id in ids.iter() {
        let candidate = air.packet(*id).expect("registered").clone();
        let expected = air
            .registry()
            .packets()
            .iter()
            .filter(|other| other.node_id() != candidate.node_id())
            .any(|other| collides(&candidate, other, &mut Silent));
        assert_eq!(air.on_received(*id), Ok(expected), "packet {}", id);
    }
}

#[test]
fn test_packet_ending_on_critical_start_collides() {
    let mut hits = 0;
    for i in 0..500 {
        let start = 100.0 + i as f64 * 0.001237;
        let candidate = make_message(1, 7, 125, 14.0, start);
        let (critical_start, _) = critical_section(&candidate);
        let toa = candidate.my_time_on_air().as_f64();
        // One ulp before the start that puts the other end on the critical start.
        let other_start = f64::from_bits((critical_start.as_f64() - toa).to_bits() - 1);

        let mut air = create_air();
        put_on_air(&mut air, make_message(2, 7, 125, 14.0, other_start));
        let id = put_on_air(&mut air, candidate);
        let candidate = air.packet(id).expect("registered").clone();
        let expected = air
            .registry()
            .packets()
            .iter()
            .filter(|other| other.node_id() != candidate.node_id())
            .any(|other| collides(&candidate, other, &mut Silent));
        if expected {
            hits += 1;
        }
        assert_eq!(air.on_received(id), Ok(expected), "start {}", start);
    }
    assert!(hits > 0);
}
