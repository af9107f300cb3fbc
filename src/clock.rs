use std::fmt;
use std::sync::Arc;

use coarsetime::{Clock, UnixTimeStamp};

/// Where a decoder gets the current time from.
///
/// Chosen once, when the decoder is built. A decoder given a fixed instant or
/// a custom function never consults the system clock.
#[derive(Clone, Default)]
pub enum TimeSource {
    /// The system's real-time clock.
    #[default]
    System,
    /// A fixed reference instant.
    Fixed(UnixTimeStamp),
    /// A caller-provided function, called once per decode.
    Custom(Arc<dyn Fn() -> UnixTimeStamp + Send + Sync>),
}

impl TimeSource {
    pub fn now(&self) -> UnixTimeStamp {
        match self {
            TimeSource::System => Clock::now_since_epoch(),
            TimeSource::Fixed(instant) => *instant,
            TimeSource::Custom(now) => now(),
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, TimeSource::System)
    }
}

impl fmt::Debug for TimeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeSource::System => f.write_str("System"),
            TimeSource::Fixed(instant) => f.debug_tuple("Fixed").field(instant).finish(),
            TimeSource::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<UnixTimeStamp> for TimeSource {
    fn from(instant: UnixTimeStamp) -> Self {
        TimeSource::Fixed(instant)
    }
}
