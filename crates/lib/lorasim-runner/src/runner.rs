use std::time::Instant;

use log::info;

use lorasim_core::bucket::{Bucket, TimeMS};
use lorasim_core::scheduler::Scheduler;

/// Share of the simulated duration between two progress lines.
const PROGRESS_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub steps: u64,
    pub end_time: TimeMS,
}

/// Drives the scheduler until the simulated duration is reached and terminates it.
pub fn run_simulation<B, S>(mut scheduler: S) -> RunSummary
where
    S: Scheduler<B>,
    B: Bucket,
{
    let end_time = scheduler.duration();
    let progress_step = end_time * PROGRESS_STEP;
    let mut next_report = progress_step;
    let started = Instant::now();

    let mut now = TimeMS::default();
    let mut steps: u64 = 0;
    scheduler.initialize();
    info!("Simulation started with duration {} ms", end_time);
    while now < end_time {
        now = scheduler.trigger();
        steps += 1;
        if now >= next_report && now < end_time {
            info!(
                "Simulated {} of {} ms ({:.0}%) after {} steps",
                now,
                end_time,
                now.as_f64() / end_time.as_f64() * 100.0,
                steps
            );
            while next_report <= now {
                next_report += progress_step;
            }
        }
    }
    scheduler.terminate();
    info!(
        "Simulation finished at {} ms after {} steps in {:.2?}",
        now,
        steps,
        started.elapsed()
    );
    RunSummary {
        steps,
        end_time: now,
    }
}
