//! The room ticker: wakes a room loop every period and reports the real
//! time that passed, so the room's [`Scheduler`](crate::Scheduler) clock
//! can follow it.

use std::time::{Duration, Instant};

use rand::Rng;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Ticks per second, clamped to `1..=MAX_TICK_RATE_HZ`.
    pub tick_rate_hz: u32,
    /// Upper bound (µs) of a random delay before the first tick, so rooms
    /// opened in the same instant spread out.
    pub initial_jitter_us: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 10,
            initial_jitter_us: 2_000,
        }
    }
}

impl TickConfig {
    pub const MAX_TICK_RATE_HZ: u32 = 100;

    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Self::default()
        }
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate_hz.clamp(1, Self::MAX_TICK_RATE_HZ)
    }
}

/// One wake-up of the ticker.
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Starts at 1.
    pub tick: u64,
    /// Time since the previous tick, or since creation or resume. A late
    /// tick reports the whole gap; ticks are never replayed.
    pub elapsed: Duration,
    /// Fired more than half a period late.
    pub late: bool,
}

/// Fixed-period ticker owned by one room actor.
///
/// Rooms pause it whenever nothing is scheduled, so an idle room costs
/// no wake-ups at all.
pub struct TickScheduler {
    period: Duration,
    count: u64,
    next: TokioInstant,
    last: TokioInstant,
    work_started: Option<Instant>,
    paused: bool,
}

impl TickScheduler {
    pub fn new(config: TickConfig) -> Self {
        if !(1..=TickConfig::MAX_TICK_RATE_HZ).contains(&config.tick_rate_hz) {
            warn!(rate_hz = config.tick_rate_hz, "tick rate out of range, clamping");
        }
        let period = config.tick_duration();
        let jitter = match config.initial_jitter_us {
            0 => Duration::ZERO,
            max => Duration::from_micros(rand::rng().random_range(0..max)),
        };
        let now = TokioInstant::now();
        debug!(period_ms = period.as_millis() as u64, "ticker created");

        Self {
            period,
            count: 0,
            next: now + period + jitter,
            last: now,
            work_started: None,
            paused: false,
        }
    }

    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(tick_rate_hz))
    }

    /// Resolves at the next tick. Never resolves while paused, so it can
    /// sit in a `tokio::select!` branch unconditionally.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        if self.paused {
            std::future::pending::<()>().await;
        }

        time::sleep_until(self.next).await;
        let now = TokioInstant::now();
        let late = now.saturating_duration_since(self.next) > self.period / 2;
        if late {
            debug!(
                tick = self.count + 1,
                late_ms = now.saturating_duration_since(self.next).as_millis() as u64,
                "late tick"
            );
        }

        self.count += 1;
        self.next = now + self.period;
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        self.work_started = Some(Instant::now());
        trace!(tick = self.count, elapsed_ms = elapsed.as_millis() as u64, "tick");

        TickInfo {
            tick: self.count,
            elapsed,
            late,
        }
    }

    /// Call once the room has handled a tick. Warns when the handling took
    /// a whole period.
    pub fn record_tick_end(&mut self) {
        if let Some(started) = self.work_started.take() {
            let spent = started.elapsed();
            if spent >= self.period {
                warn!(tick = self.count, spent_ms = spent.as_millis() as u64, "room tick overran its period");
            }
        }
    }

    /// Pausing twice is a no-op. Resuming restarts the period from now, so
    /// time spent paused never shows up in `elapsed`.
    pub fn set_paused(&mut self, paused: bool) {
        if paused == self.paused {
            return;
        }
        self.paused = paused;
        if !paused {
            let now = TokioInstant::now();
            self.next = now + self.period;
            self.last = now;
        }
        trace!(tick = self.count, paused, "ticker pause toggled");
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn tick_count(&self) -> u64 {
        self.count
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}
