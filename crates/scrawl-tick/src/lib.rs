//! Timing for Scrawl rooms.
//!
//! Two pieces cooperate inside a room actor:
//!
//! - [`TickScheduler`] is the periodic ticker (10 Hz by default) that wakes
//!   the room loop and reports how much time passed since the last tick.
//! - [`Scheduler`] is the room's table of named, timed events. It owns a
//!   monotonic clock that only moves when the room calls
//!   [`Scheduler::tick`] with the elapsed time.
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = event_rx.recv() => { /* handle commands */ }
//!         info = ticker.wait_for_tick() => {
//!             for action in scheduler.tick(info.elapsed) {
//!                 room.run(action);
//!             }
//!             ticker.record_tick_end();
//!         }
//!     }
//! }
//! ```

mod scheduler;
mod ticker;

pub use scheduler::{EventName, Scheduler, SchedulerError};
pub use ticker::{TickConfig, TickInfo, TickScheduler};
