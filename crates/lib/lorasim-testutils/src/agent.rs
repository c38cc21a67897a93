use lorasim_core::agent::{Activatable, Agent, AgentId, AgentKind};
use lorasim_core::bucket::TimeMS;

use crate::bucket::MyBucket;

/// Device that transmits every `period` for `airtime` and stops after `max_tx` frames.
#[derive(Default, Clone, Debug)]
pub struct TDevice {
    pub id: AgentId,
    pub offset: TimeMS,
    pub period: TimeMS,
    pub airtime: TimeMS,
    pub max_tx: u32,
    pub tx_count: u32,
    pub(crate) active: bool,
}

impl TDevice {
    pub fn make_device(id: u64, offset: f64, period: f64, airtime: f64, max_tx: u32) -> Self {
        Self {
            id: AgentId::from(id),
            offset: TimeMS::from(offset),
            period: TimeMS::from(period),
            airtime: TimeMS::from(airtime),
            max_tx,
            tx_count: 0,
            active: false,
        }
    }
}

impl Activatable for TDevice {
    fn activate(&mut self) {
        self.active = true;
    }

    fn deactivate(&mut self) {
        self.active = false;
    }

    fn is_deactivated(&self) -> bool {
        !self.active
    }

    fn time_to_activation(&mut self, now: TimeMS) -> TimeMS {
        if self.tx_count == 0 {
            return now + self.offset;
        }
        now + self.period
    }
}

impl Agent<MyBucket> for TDevice {
    fn id(&self) -> AgentId {
        self.id
    }

    fn kind(&self) -> AgentKind {
        AgentKind::EndDevice
    }

    fn on_start(&mut self, bucket: &mut MyBucket) -> TimeMS {
        bucket.starts.push((self.id, bucket.now()));
        self.tx_count += 1;
        bucket.now() + self.airtime
    }

    fn on_end(&mut self, bucket: &mut MyBucket) {
        bucket.ends.push((self.id, bucket.now()));
        if self.tx_count >= self.max_tx {
            self.deactivate();
        }
    }
}
