//! Named one-shot and recurring events on a tick-driven clock.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::trace;

/// The kinds of timed event a room can have pending. At most one event of
/// each kind exists at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventName {
    StateChange,
    HintReveal,
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StateChange => write!(f, "state-change"),
            Self::HintReveal => write!(f, "hint-reveal"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("event already exists: {0}")]
    AlreadyExists(EventName),

    #[error("event not found: {0}")]
    NotFound(EventName),
}

#[derive(Debug)]
struct Entry<A> {
    next_run_at: Duration,
    /// `Some` for recurring events.
    interval: Option<Duration>,
    run_count: u32,
    /// `None` means unlimited.
    run_limit: Option<u32>,
    action: A,
}

/// Per-room event table.
///
/// Events carry an action value of type `A` instead of a callback; the
/// room runs the actions that [`tick`](Self::tick) returns. Time is the
/// sum of all deltas passed to `tick`, so the scheduler never looks at a
/// wall clock.
#[derive(Debug)]
pub struct Scheduler<A> {
    now: Duration,
    events: HashMap<EventName, Entry<A>>,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            events: HashMap::new(),
        }
    }

    /// The scheduler clock.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedules `action` to run once, `after` from now.
    pub fn add_one_shot(
        &mut self,
        name: EventName,
        after: Duration,
        action: A,
    ) -> Result<(), SchedulerError> {
        self.insert(
            name,
            Entry {
                next_run_at: self.now + after,
                interval: None,
                run_count: 0,
                run_limit: Some(1),
                action,
            },
        )
    }

    /// Schedules `action` every `interval`, first at `now + interval`.
    /// The event expires after `run_limit` runs.
    pub fn add_recurring(
        &mut self,
        name: EventName,
        interval: Duration,
        run_limit: Option<u32>,
        action: A,
    ) -> Result<(), SchedulerError> {
        self.insert(
            name,
            Entry {
                next_run_at: self.now + interval,
                interval: Some(interval),
                run_count: 0,
                run_limit,
                action,
            },
        )
    }

    fn insert(&mut self, name: EventName, entry: Entry<A>) -> Result<(), SchedulerError> {
        if self.events.contains_key(&name) {
            return Err(SchedulerError::AlreadyExists(name));
        }
        trace!(event = %name, at_ms = entry.next_run_at.as_millis() as u64, "event scheduled");
        self.events.insert(name, entry);
        Ok(())
    }

    pub fn cancel(&mut self, name: EventName) -> Result<(), SchedulerError> {
        self.events
            .remove(&name)
            .map(|_| ())
            .ok_or(SchedulerError::NotFound(name))
    }

    /// Removes every pending event. The clock keeps its value.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn contains(&self, name: EventName) -> bool {
        self.events.contains_key(&name)
    }

    /// When `name` fires next, on the scheduler clock.
    pub fn next_run_at(&self, name: EventName) -> Option<Duration> {
        self.events.get(&name).map(|e| e.next_run_at)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<A: Clone> Scheduler<A> {
    /// Advances the clock by `delta` and returns the actions of every due
    /// event, earliest first.
    ///
    /// Each event fires at most once per call. A recurring event that fell
    /// more than one interval behind catches up over the following ticks.
    pub fn tick(&mut self, delta: Duration) -> Vec<A> {
        self.now += delta;
        let now = self.now;

        let mut due: Vec<(Duration, EventName)> = self
            .events
            .iter()
            .filter(|(_, e)| e.next_run_at <= now)
            .map(|(name, e)| (e.next_run_at, *name))
            .collect();
        due.sort();

        let mut actions = Vec::with_capacity(due.len());
        for (_, name) in due {
            let Some(entry) = self.events.get_mut(&name) else {
                continue;
            };
            entry.run_count += 1;
            actions.push(entry.action.clone());

            let expired = entry.run_limit.is_some_and(|limit| entry.run_count >= limit);
            match entry.interval {
                Some(interval) if !expired => entry.next_run_at += interval,
                _ => {
                    self.events.remove(&name);
                }
            }
            trace!(event = %name, "event fired");
        }
        actions
    }
}
