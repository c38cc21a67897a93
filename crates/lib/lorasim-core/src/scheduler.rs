use std::cmp::Reverse;

use keyed_priority_queue::KeyedPriorityQueue;
use log::debug;
use typed_builder::TypedBuilder;

use crate::agent::{Agent, AgentId};
use crate::bucket::{Bucket, TimeMS};
use crate::hashbrown::HashMap;

/// A trait used to represent a scheduler. A scheduler is used to schedule entities. The order
/// of calling the scheduler's functions is important to ensure the correct behavior of the engine.
pub trait Scheduler<B: Bucket>: Send {
    fn duration(&self) -> TimeMS;
    fn initialize(&mut self);
    fn trigger(&mut self) -> TimeMS;
    fn terminate(self);
}

/// What happens to an agent at an instant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    TxStart,
    TxEnd,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub seq: u64,
    pub agent_id: AgentId,
    pub kind: EventKind,
}

/// Events are ordered by time and then by the order in which they were posted.
type EventPriority = Reverse<(TimeMS, u64)>;

/// A discrete event scheduler. Agents post a transmission start; the start posts the end
/// of the transmission at the time returned by the agent; the end posts the next start.
#[derive(TypedBuilder)]
pub struct EventScheduler<A, B>
where
    A: Agent<B>,
    B: Bucket,
{
    pub bucket: B,
    pub agents: HashMap<AgentId, A>,
    pub duration: TimeMS,
    #[builder(default)]
    pub event_queue: KeyedPriorityQueue<EventKey, EventPriority>,
    #[builder(default = TimeMS::default())]
    pub now: TimeMS,
    #[builder(default)]
    pub next_seq: u64,
    #[builder(default)]
    pub _marker: std::marker::PhantomData<fn() -> B>,
}

impl<A, B> EventScheduler<A, B>
where
    A: Agent<B>,
    B: Bucket,
{
    pub fn agent_of(&self, agent_id: &AgentId) -> &A {
        self.agents.get(agent_id).expect("Agent not found in scheduler")
    }

    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }

    #[inline]
    pub fn post(&mut self, agent_id: AgentId, kind: EventKind, at: TimeMS) {
        let key = EventKey {
            seq: self.next_seq,
            agent_id,
            kind,
        };
        self.event_queue.push(key, Reverse((at, self.next_seq)));
        self.next_seq += 1;
    }
}

impl<A, B> Scheduler<B> for EventScheduler<A, B>
where
    A: Agent<B>,
    B: Bucket,
{
    fn duration(&self) -> TimeMS {
        self.duration
    }

    fn initialize(&mut self) {
        let mut first_starts: Vec<(AgentId, TimeMS)> = Vec::with_capacity(self.agents.len());
        for agent in self.agents.values_mut() {
            debug!("Adding agent {} to the scheduler", agent.id());
            agent.activate();
            first_starts.push((agent.id(), agent.time_to_activation(self.now)));
        }
        // Deterministic posting order for agents starting at the same instant.
        first_starts.sort_by(|a, b| a.0.cmp(&b.0));
        for (agent_id, at) in first_starts.into_iter() {
            self.post(agent_id, EventKind::TxStart, at);
        }
        self.bucket.initialize(self.now);
    }

    fn trigger(&mut self) -> TimeMS {
        let (event, Reverse((at, _))) = match self.event_queue.pop() {
            Some(entry) => entry,
            None => {
                self.now = self.duration;
                return self.now;
            }
        };
        if at > self.duration {
            self.now = self.duration;
            return self.now;
        }

        self.now = at;
        self.bucket.before_agents(self.now);
        let agent = self
            .agents
            .get_mut(&event.agent_id)
            .expect("Agent not found in scheduler");

        match event.kind {
            EventKind::TxStart => {
                let end = agent.on_start(&mut self.bucket);
                self.post(event.agent_id, EventKind::TxEnd, end);
            }
            EventKind::TxEnd => {
                agent.on_end(&mut self.bucket);
                if !agent.is_deactivated() {
                    let next = agent.time_to_activation(self.now);
                    self.post(event.agent_id, EventKind::TxStart, next);
                }
            }
        }
        self.bucket.after_agents();
        self.now
    }

    fn terminate(self) {
        self.bucket.terminate();
    }
}
