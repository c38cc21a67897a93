use std::fmt;
use std::fmt::Debug;
use std::hash::Hash;
use std::str::FromStr;

use serde::Deserialize;
use typed_builder::TypedBuilder;

use crate::bucket::{Bucket, TimeMS};

/// A unique ID that is a property of all the agents in the simulation.
#[derive(Deserialize, Default, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct AgentId(u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AgentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.parse::<u64>()?;
        Ok(Self(id))
    }
}

impl From<u64> for AgentId {
    fn from(f: u64) -> Self {
        Self(f)
    }
}

impl AgentId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Struct that represents the kind of agent. End devices transmit uplink frames.
#[derive(Deserialize, Debug, Hash, Copy, Default, Clone, PartialEq, Eq)]
pub enum AgentKind {
    #[default]
    EndDevice = 0,
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentKind::EndDevice => write!(f, "EndDevice"),
        }
    }
}

/// Position of an agent in metres along with the indoor flag that the propagation
/// models use to add building penetration loss.
#[derive(Deserialize, Debug, Copy, Clone, Default, PartialEq, TypedBuilder)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    #[builder(default)]
    #[serde(default)]
    pub indoor: bool,
}

impl Location {
    pub fn new(x: f64, y: f64, indoor: bool) -> Self {
        Self { x, y, indoor }
    }

    pub fn distance(a: &Location, b: &Location) -> f64 {
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
    }
}

/// Identity of a transmitting node as carried by each packet.
#[derive(Debug, Copy, Clone, Default, PartialEq, TypedBuilder)]
pub struct NodeInfo {
    pub id: AgentId,
    pub location: Location,
}

/// A trait that allows an agent to be scheduled for simulation.
pub trait Activatable {
    fn activate(&mut self);
    fn deactivate(&mut self);
    fn is_deactivated(&self) -> bool;
    /// Time at which the agent wants to be triggered next, given the current time.
    fn time_to_activation(&mut self, now: TimeMS) -> TimeMS;
}

/// A trait that represents an agent. Extend this to a custom device type (e.g. struct) that
/// you want to simulate.
///
/// An agent is triggered twice per transmission: once when the frame goes on air and once
/// when the frame has been fully received by the gateway.
pub trait Agent<B>: Activatable + Clone + Send
where
    B: Bucket,
{
    fn id(&self) -> AgentId;
    fn kind(&self) -> AgentKind;
    /// Puts a frame on air and returns the time at which it leaves the air.
    fn on_start(&mut self, bucket: &mut B) -> TimeMS;
    fn on_end(&mut self, bucket: &mut B);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let gateway = Location::new(0.0, 0.0, false);
        let node = Location::new(300.0, 400.0, true);
        assert_eq!(Location::distance(&gateway, &node), 500.0);
        assert_eq!(Location::distance(&node, &gateway), 500.0);
    }

    #[test]
    fn agent_id_parses() {
        let id: AgentId = "42".parse().expect("valid id");
        assert_eq!(id, AgentId::from(42));
        assert_eq!(id.to_string(), "42");
    }
}
