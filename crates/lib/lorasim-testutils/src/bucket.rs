use lorasim_core::agent::AgentId;
use lorasim_core::bucket::{Bucket, Clock, SimClock, TimeMS};

#[derive(Default, Clone)]
pub struct MyBucket {
    pub clock: SimClock,
    pub starts: Vec<(AgentId, TimeMS)>,
    pub ends: Vec<(AgentId, TimeMS)>,
}

impl MyBucket {
    pub fn now(&self) -> TimeMS {
        self.clock.now()
    }
}

impl Bucket for MyBucket {
    fn initialize(&mut self, step: TimeMS) {
        self.clock.advance(step);
    }

    fn before_agents(&mut self, step: TimeMS) {
        self.clock.advance(step);
    }

    fn terminate(self) {
        println!("End in MyBucket at {}", self.clock.now());
    }
}
