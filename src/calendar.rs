//! Exchange calendar: timezone rule plus the Initial Balance window.
//!
//! Session math runs on the exchange-local clock. The calendar is an
//! explicit value passed wherever local time matters, so there is no global
//! timezone state; DST transitions come from the IANA database via chrono-tz.

use chrono::{DateTime, FixedOffset, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;

/// Initial Balance window (exchange-local, inclusive on both ends).
/// The extra 59 seconds keep the 08:15 minute bar inside the window.
pub const IB_START_HOUR: u32 = 8;
pub const IB_START_MIN: u32 = 0;
pub const IB_END_HOUR: u32 = 8;
pub const IB_END_MIN: u32 = 15;
pub const IB_END_SEC: u32 = 59;

/// Lenient fallback when the exact window is empty: any bar in this local hour
pub const IB_FALLBACK_HOUR: u32 = 8;

/// Timezone rule and session windows for one exchange.
#[derive(Debug, Clone)]
pub struct ExchangeCalendar {
    tz: Tz,
    ib_start: NaiveTime,
    ib_end: NaiveTime,
    fallback_hour: u32,
}

impl Default for ExchangeCalendar {
    /// CME equity index futures: US/Eastern clock, 08:00-08:15:59 IB window.
    fn default() -> Self {
        Self::new(chrono_tz::America::New_York)
    }
}

impl ExchangeCalendar {
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            ib_start: NaiveTime::from_hms_opt(IB_START_HOUR, IB_START_MIN, 0)
                .expect("valid IB window open"),
            ib_end: NaiveTime::from_hms_opt(IB_END_HOUR, IB_END_MIN, IB_END_SEC)
                .expect("valid IB window close"),
            fallback_hour: IB_FALLBACK_HOUR,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Convert a UTC instant to the exchange-local clock.
    pub fn localize(&self, ts: DateTime<Utc>) -> DateTime<FixedOffset> {
        ts.with_timezone(&self.tz).fixed_offset()
    }

    /// Whether a local timestamp falls inside the primary IB window.
    pub fn in_ib_window(&self, local: &DateTime<FixedOffset>) -> bool {
        let t = local.time();
        t >= self.ib_start && t <= self.ib_end
    }

    /// Whether a local timestamp falls in the fallback hour.
    pub fn in_ib_fallback(&self, local: &DateTime<FixedOffset>) -> bool {
        local.hour() == self.fallback_hour
    }
}
