//! Minute OHLCV bars and the time-ordered series the engine consumes.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single minute OHLCV bar.
///
/// Carries both the UTC event time and the exchange-local time stamped at
/// ingest (see `ExchangeCalendar::localize`). Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub ts_event: DateTime<Utc>,
    /// Exchange-local wall clock; the offset varies with DST
    pub ts_local: DateTime<FixedOffset>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Trading day this bar belongs to (exchange-local calendar date)
    pub fn trading_day(&self) -> NaiveDate {
        self.ts_local.date_naive()
    }
}

/// Time-ordered, deduplicated bar series for one instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Build a series, sorting ascending by event time and dropping bars
    /// with duplicate timestamps.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.ts_event);
        bars.dedup_by_key(|b| b.ts_event);
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Group bars by trading day, oldest day first.
    pub fn by_trading_day(&self) -> BTreeMap<NaiveDate, Vec<&Bar>> {
        let mut days: BTreeMap<NaiveDate, Vec<&Bar>> = BTreeMap::new();
        for bar in &self.bars {
            days.entry(bar.trading_day()).or_default().push(bar);
        }
        days
    }
}

/// Round a price to two decimals.
pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::ExchangeCalendar;
    use chrono::TimeZone;

    fn bar(cal: &ExchangeCalendar, ts: DateTime<Utc>, close: f64) -> Bar {
        Bar {
            ts_event: ts,
            ts_local: cal.localize(ts),
            open: close,
            high: close,
            low: close,
            close,
            volume: 100,
        }
    }

    #[test]
    fn test_series_sorts_and_dedups() {
        let cal = ExchangeCalendar::default();
        let t0 = Utc.with_ymd_and_hms(2025, 1, 15, 13, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2025, 1, 15, 13, 1, 0).unwrap();

        let series = BarSeries::new(
            "ES",
            vec![
                bar(&cal, t1, 6001.0),
                bar(&cal, t0, 6000.0),
                bar(&cal, t1, 6002.0),
            ],
        );

        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[0].ts_event, t0);
        assert_eq!(series.bars()[1].ts_event, t1);
        // First bar for a duplicate timestamp wins after the sort
        assert_eq!(series.bars()[1].close, 6001.0);
    }

    #[test]
    fn test_trading_day_uses_local_date() {
        let cal = ExchangeCalendar::default();
        // 01:00 UTC on Jan 16 is 20:00 ET on Jan 15
        let ts = Utc.with_ymd_and_hms(2025, 1, 16, 1, 0, 0).unwrap();
        let b = bar(&cal, ts, 6000.0);
        assert_eq!(b.trading_day(), NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
    }

    #[test]
    fn test_by_trading_day_groups() {
        let cal = ExchangeCalendar::default();
        let d1 = Utc.with_ymd_and_hms(2025, 1, 15, 14, 0, 0).unwrap();
        let d2 = Utc.with_ymd_and_hms(2025, 1, 16, 14, 0, 0).unwrap();

        let series = BarSeries::new(
            "ES",
            vec![
                bar(&cal, d1, 6000.0),
                bar(&cal, d2, 6010.0),
                bar(&cal, d2 + chrono::Duration::minutes(1), 6011.0),
            ],
        );

        let days = series.by_trading_day();
        assert_eq!(days.len(), 2);
        assert_eq!(days[&NaiveDate::from_ymd_opt(2025, 1, 16).unwrap()].len(), 2);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(4502.4999), 4502.5);
        assert_eq!(round2(1.005), 1.0); // 1.005 is slightly below .005 in binary
        assert_eq!(round2(4510.0), 4510.0);
    }
}
