//! Room timing constants and actor configuration.

use std::time::Duration;

use scrawl_tick::TickConfig;
use scrawl_transport::ConnectionConfig;

/// Chat history kept per room; the oldest message is dropped first.
pub const MAX_CHAT_MESSAGES: usize = 100;

/// Word options offered to the drawer.
pub const WORD_OPTION_COUNT: usize = 3;

/// How long the drawer has to pick a word.
pub const PICKING_TIME: Duration = Duration::from_secs(15);

/// Pause between the end of a drawing turn and the next pick.
pub const POST_DRAWING_TIME: Duration = Duration::from_secs(5);

/// How long a connect attempt may wait for the room to accept it.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Rooms with no activity for this long are shut down.
pub const ROOM_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// How often the manager looks for idle rooms.
pub const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for room actors.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Applied to every player connection in the room.
    pub connection: ConnectionConfig,

    /// The room loop's ticker (10 Hz by default).
    pub tick: TickConfig,

    /// Capacity of the channel carrying decoded commands into the room.
    pub event_channel_size: usize,

    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub eviction_interval: Duration,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            tick: TickConfig::default(),
            event_channel_size: 64,
            connect_timeout: CONNECT_TIMEOUT,
            idle_timeout: ROOM_TIMEOUT,
            eviction_interval: EVICTION_INTERVAL,
        }
    }
}
