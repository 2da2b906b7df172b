//! Initial Balance extraction.
//!
//! The Initial Balance is the high/low range set in the opening window of
//! the session (08:00-08:15:59 exchange time). The recommendation engine
//! trades breakouts from this range.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::bars::{round2, Bar, BarSeries};
use crate::calendar::ExchangeCalendar;

/// High/low structure of the opening window, prices rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialBalance {
    pub high: f64,
    pub low: f64,
    pub range: f64,
    pub midpoint: f64,
}

/// Compute the Initial Balance for one trading day.
///
/// Returns `None` when the day has no bars, or none in either the primary
/// window or the hour-8 fallback (provider gaps, holidays, DST edge cases).
/// Callers treat `None` as "skip this day", not as an error.
pub fn compute_initial_balance(
    series: &BarSeries,
    day: NaiveDate,
    calendar: &ExchangeCalendar,
) -> Option<InitialBalance> {
    let day_bars: Vec<&Bar> = series
        .bars()
        .iter()
        .filter(|b| b.trading_day() == day)
        .collect();
    if day_bars.is_empty() {
        return None;
    }

    let mut window: Vec<&Bar> = day_bars
        .iter()
        .copied()
        .filter(|b| calendar.in_ib_window(&b.ts_local))
        .collect();

    if window.is_empty() {
        // Some sessions have nothing in the exact window; take the open hour
        window = day_bars
            .iter()
            .copied()
            .filter(|b| calendar.in_ib_fallback(&b.ts_local))
            .collect();
    }
    if window.is_empty() {
        return None;
    }

    let high = round2(window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max));
    let low = round2(window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min));

    Some(InitialBalance {
        high,
        low,
        range: round2(high - low),
        midpoint: round2((high + low) / 2.0),
    })
}
