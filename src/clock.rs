//! Wall-clock abstraction for timestamped chat lines.

use chrono::{DateTime, Local, NaiveTime, TimeZone};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Current local wall-clock time
    fn now(&self) -> DateTime<Local>;

    /// Current time as `HH:MM:SS`
    fn stamp(&self) -> String {
        self.now().format("%H:%M:%S").to_string()
    }
}

/// System clock implementation (uses actual local time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: DateTime<Local>,
}

impl FixedClock {
    pub fn new(fixed_time: DateTime<Local>) -> Self {
        Self { fixed_time }
    }

    /// Fixed clock reading `hour:min:sec` on the current local date
    ///
    /// Falls back to the current time for out-of-range or nonexistent
    /// local times.
    pub fn at(hour: u32, min: u32, sec: u32) -> Self {
        let today = Local::now().date_naive();
        let fixed_time = NaiveTime::from_hms_opt(hour, min, sec)
            .and_then(|t| Local.from_local_datetime(&today.and_time(t)).earliest())
            .unwrap_or_else(Local::now);
        Self { fixed_time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.fixed_time
    }
}
