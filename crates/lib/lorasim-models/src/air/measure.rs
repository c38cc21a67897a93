use indexmap::IndexMap;
use itertools::izip;

use lorasim_core::agent::AgentId;
use lorasim_core::bucket::TimeMS;

use crate::air::error::ChannelError;

/// Propagation samples of one node, one entry per transmission, in time order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropMeasurement {
    pub time: Vec<TimeMS>,
    pub rss: Vec<f64>,
    pub snr: Vec<f64>,
}

impl PropMeasurement {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn last_time(&self) -> Option<TimeMS> {
        self.time.last().copied()
    }

    pub fn samples(&self) -> impl Iterator<Item = (TimeMS, f64, f64)> + '_ {
        izip!(self.time.iter(), self.rss.iter(), self.snr.iter())
            .map(|(time, rss, snr)| (*time, *rss, *snr))
    }

    fn push(&mut self, time: TimeMS, rss: f64, snr: f64) {
        self.time.push(time);
        self.rss.push(rss);
        self.snr.push(snr);
    }
}

/// Measurement records of all the nodes that transmitted, in order of their first
/// transmission.
#[derive(Debug, Clone, Default)]
pub struct MeasurementLog {
    records: IndexMap<AgentId, PropMeasurement>,
}

impl MeasurementLog {
    /// Appends a sample. A sample older than the last one of the node is refused and the
    /// log is left unchanged.
    pub fn record(
        &mut self,
        node: AgentId,
        time: TimeMS,
        rss: f64,
        snr: f64,
    ) -> Result<(), ChannelError> {
        let record = self.records.entry(node).or_default();
        if let Some(last) = record.last_time() {
            if time < last {
                return Err(ChannelError::TimeRegression {
                    node,
                    last,
                    now: time,
                });
            }
        }
        record.push(time, rss, snr);
        Ok(())
    }

    pub fn get(&self, node: AgentId) -> Result<&PropMeasurement, ChannelError> {
        self.records
            .get(&node)
            .ok_or(ChannelError::NodeNotFound(node))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AgentId, &PropMeasurement)> {
        self.records.iter()
    }
}
