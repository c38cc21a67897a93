use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;

use serde::Deserialize;

/// Simulated time in milliseconds. Time on air of a LoRa frame is fractional, hence
/// the floating point representation. Ordering is total so that the type can be used
/// as a priority in the event queue.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct TimeMS(pub f64);

impl Display for TimeMS {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl FromStr for TimeMS {
    type Err = std::num::ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let time = s.parse::<f64>()?;
        Ok(Self(time))
    }
}

impl From<f64> for TimeMS {
    fn from(f: f64) -> Self {
        Self(f)
    }
}

impl From<u64> for TimeMS {
    fn from(f: u64) -> Self {
        Self(f as f64)
    }
}

impl From<i32> for TimeMS {
    fn from(f: i32) -> Self {
        Self(f as f64)
    }
}

impl TimeMS {
    pub fn as_f64(&self) -> f64 {
        self.0
    }
    pub fn as_u64(&self) -> u64 {
        self.0 as u64
    }
}

impl Eq for TimeMS {}

impl PartialOrd for TimeMS {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeMS {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add for TimeMS {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for TimeMS {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<f64> for TimeMS {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl AddAssign for TimeMS {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

/// Anything that can tell the current simulated time. The time must never go back.
pub trait Clock {
    fn now(&self) -> TimeMS;
}

/// Clock advanced by the scheduler through the bucket.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimClock {
    now: TimeMS,
}

impl SimClock {
    pub fn advance(&mut self, to: TimeMS) {
        if to < self.now {
            panic!("Clock cannot go back from {} to {}", self.now, to);
        }
        self.now = to;
    }
}

impl Clock for SimClock {
    fn now(&self) -> TimeMS {
        self.now
    }
}

/// A trait passed to the agent so that an agent can reach the shared models of the
/// simulation. In a single-gateway simulation this holds the air interface as seen by
/// the gateway along with the simulation clock.
pub trait Bucket: Send {
    fn initialize(&mut self, step: TimeMS);
    fn before_agents(&mut self, step: TimeMS);
    fn after_agents(&mut self) {}
    fn stream_output(&mut self) {}
    fn terminate(self);
}
