use lorasim_core::agent::{Agent, AgentId};
use lorasim_core::bucket::TimeMS;
use lorasim_core::hashbrown::HashMap;
use lorasim_core::scheduler::{EventScheduler, Scheduler};
use lorasim_testutils::agent::TDevice;
use lorasim_testutils::bucket::MyBucket;

fn create_scheduler(devices: Vec<TDevice>, duration: f64) -> EventScheduler<TDevice, MyBucket> {
    let mut agents = HashMap::new();
    for device in devices.into_iter() {
        agents.insert(device.id(), device);
    }
    EventScheduler::builder()
        .bucket(MyBucket::default())
        .agents(agents)
        .duration(TimeMS::from(duration))
        .build()
}

fn run_to_end(scheduler: &mut EventScheduler<TDevice, MyBucket>) {
    scheduler.initialize();
    let mut now = TimeMS::default();
    while now < scheduler.duration() {
        now = scheduler.trigger();
    }
}

#[test]
fn test_start_precedes_end() {
    let device = TDevice::make_device(1, 5.0, 100.0, 10.0, 3);
    let mut scheduler = create_scheduler(vec![device], 1000.0);
    run_to_end(&mut scheduler);

    let starts: Vec<f64> = scheduler.bucket.starts.iter().map(|s| s.1.as_f64()).collect();
    let ends: Vec<f64> = scheduler.bucket.ends.iter().map(|s| s.1.as_f64()).collect();
    assert_eq!(starts, vec![5.0, 115.0, 225.0]);
    assert_eq!(ends, vec![15.0, 125.0, 235.0]);
}

#[test]
fn test_deactivated_agent_stops() {
    let device = TDevice::make_device(1, 0.0, 10.0, 1.0, 2);
    let mut scheduler = create_scheduler(vec![device], 1000.0);
    run_to_end(&mut scheduler);
    assert_eq!(scheduler.bucket.starts.len(), 2);
    assert_eq!(scheduler.pending_events(), 0);
    assert_eq!(scheduler.agent_of(&AgentId::from(1)).tx_count, 2);
}

#[test]
fn test_events_after_duration_are_dropped() {
    let device = TDevice::make_device(1, 0.0, 100.0, 10.0, 100);
    let mut scheduler = create_scheduler(vec![device], 225.0);
    run_to_end(&mut scheduler);
    assert_eq!(scheduler.bucket.starts.len(), 3);
    assert_eq!(scheduler.bucket.ends.len(), 2);
}

#[test]
fn test_simultaneous_events_keep_posting_order() {
    let first = TDevice::make_device(1, 0.0, 100.0, 10.0, 1);
    let second = TDevice::make_device(2, 0.0, 100.0, 10.0, 1);
    let mut scheduler = create_scheduler(vec![second, first], 100.0);
    run_to_end(&mut scheduler);
    let order: Vec<AgentId> = scheduler.bucket.starts.iter().map(|s| s.0).collect();
    assert_eq!(order, vec![AgentId::from(1), AgentId::from(2)]);
}
