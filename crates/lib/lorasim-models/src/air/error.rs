use thiserror::Error;

use lorasim_core::agent::AgentId;
use lorasim_core::bucket::TimeMS;
use lorasim_core::message::PacketId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChannelError {
    #[error("no measurements recorded for node {0}")]
    NodeNotFound(AgentId),
    #[error("no packets were sent on the channel")]
    NoPacketsSent,
    #[error("packet {0} is not registered on the channel")]
    UnknownPacket(PacketId),
    #[error("measurement for node {node} at {now} precedes the last sample at {last}")]
    TimeRegression {
        node: AgentId,
        last: TimeMS,
        now: TimeMS,
    },
}
