//! Recommendation engine.
//!
//! Orchestrates the per-day pipeline: Initial Balance -> bias -> breakout
//! entry -> magnet target -> stop -> close-basis WIN/LOSS label. Days are
//! processed independently and the engine holds no state between calls, so
//! the full recommendation set is recomputed on every invocation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::bars::{round2, Bar, BarSeries};
use crate::bias::daily_bias;
use crate::calendar::ExchangeCalendar;
use crate::initial_balance::compute_initial_balance;
use crate::magnets::{magnet_levels, target_above, target_below};

/// Trade direction for a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
        }
    }
}

/// Close-basis outcome label.
///
/// WIN means the day's close finished within the target tolerance in the
/// trade direction. The intraday path is never inspected: a day that tagged
/// the stop before reaching the target still labels WIN if it closed near
/// the target, so win rates read optimistic next to a path-aware backtest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeOutcome {
    Win,
    Loss,
}

impl std::fmt::Display for TradeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeOutcome::Win => write!(f, "WIN"),
            TradeOutcome::Loss => write!(f, "LOSS"),
        }
    }
}

/// Tunables for recommendation generation
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Most recent trading days to evaluate (default: 5)
    pub lookback_days: usize,
    /// Entry trigger offset beyond the IB boundary, in points (default: 0.25, one ES tick)
    pub entry_offset: f64,
    /// Stop distance beyond the opposite IB boundary, in points (default: 5.0)
    pub stop_buffer: f64,
    /// Close-to-target tolerance for the WIN label, in points (default: 5.0)
    pub target_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookback_days: 5,
            entry_offset: 0.25,
            stop_buffer: 5.0,
            target_tolerance: 5.0,
        }
    }
}

/// One day's trade recommendation with its backtest label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub date: NaiveDate,
    pub action: Action,
    pub bias: f64,
    pub ib_high: f64,
    pub ib_low: f64,
    pub entry: f64,
    pub target: f64,
    pub stop_loss: f64,
    pub close: f64,
    pub risk_reward: f64,
    pub result: TradeOutcome,
}

/// Generate recommendations for the most recent trading days in `series`.
///
/// Pure function of its inputs. Output is sorted date-descending with at
/// most `config.lookback_days` entries; the day selection happens before
/// per-day processing, so a day with no Initial Balance is skipped rather
/// than backfilled from further back. An empty series yields an empty vec.
pub fn generate_recommendations(
    series: &BarSeries,
    calendar: &ExchangeCalendar,
    config: &EngineConfig,
) -> Vec<Recommendation> {
    let by_day: BTreeMap<NaiveDate, Vec<&Bar>> = series.by_trading_day();

    // Most recent N distinct trading days, newest first
    let days: Vec<NaiveDate> = by_day
        .keys()
        .rev()
        .take(config.lookback_days)
        .copied()
        .collect();

    let mut recommendations = Vec::with_capacity(days.len());
    for day in days {
        if let Some(rec) = recommend_for_day(series, &by_day[&day], day, calendar, config) {
            recommendations.push(rec);
        }
    }
    recommendations
}

/// Run the pipeline for a single day; `None` when the day has no Initial Balance.
fn recommend_for_day(
    series: &BarSeries,
    day_bars: &[&Bar],
    day: NaiveDate,
    calendar: &ExchangeCalendar,
    config: &EngineConfig,
) -> Option<Recommendation> {
    let ib = compute_initial_balance(series, day, calendar)?;

    let bias = daily_bias(day_bars);
    let action = if bias > 0.0 { Action::Buy } else { Action::Sell };

    let close = day_bars.last()?.close;

    let entry = match action {
        Action::Buy => ib.high + config.entry_offset,
        Action::Sell => ib.low - config.entry_offset,
    };

    // Target: nearest magnet beyond the entry in the trade direction,
    // ladder centered on the day's close
    let levels = magnet_levels(close);
    let (target, stop_loss) = match action {
        Action::Buy => (target_above(&levels, entry), ib.low - config.stop_buffer),
        Action::Sell => (target_below(&levels, entry), ib.high + config.stop_buffer),
    };

    let risk = (entry - stop_loss).abs();
    let risk_reward = if risk == 0.0 {
        0.0
    } else {
        round2((target - entry).abs() / risk)
    };

    let result = match action {
        Action::Buy if close >= target - config.target_tolerance => TradeOutcome::Win,
        Action::Sell if close <= target + config.target_tolerance => TradeOutcome::Win,
        _ => TradeOutcome::Loss,
    };

    Some(Recommendation {
        date: day,
        action,
        bias,
        ib_high: ib.high,
        ib_low: ib.low,
        entry,
        target,
        stop_loss,
        close,
        risk_reward,
        result,
    })
}

/// Aggregate statistics over a recommendation set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationSummary {
    pub total: usize,
    pub wins: usize,
    /// Close-basis win rate in percent (see [`TradeOutcome`])
    pub win_rate: f64,
    pub avg_risk_reward: f64,
}

impl RecommendationSummary {
    pub fn from_recommendations(recs: &[Recommendation]) -> Self {
        let total = recs.len();
        let wins = recs.iter().filter(|r| r.result == TradeOutcome::Win).count();
        let win_rate = if total > 0 {
            wins as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        let avg_risk_reward = if total > 0 {
            recs.iter().map(|r| r.risk_reward).sum::<f64>() / total as f64
        } else {
            0.0
        };
        Self {
            total,
            wins,
            win_rate,
            avg_risk_reward,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    /// One synthetic trading day of minute bars starting 08:00 ET (winter,
    /// so 13:00 UTC). The first window bars carry the IB extremes; the rest
    /// of the session is flat at `close` with the given per-bar volume.
    fn session_day(
        cal: &ExchangeCalendar,
        date: NaiveDate,
        n: usize,
        open: f64,
        close: f64,
        window_high: f64,
        window_low: f64,
        volume: u64,
    ) -> Vec<Bar> {
        let first = date.and_hms_opt(13, 0, 0).unwrap().and_utc();
        (0..n)
            .map(|i| {
                let ts = first + Duration::minutes(i as i64);
                let (o, h, l, c) = if i == 0 {
                    (open, window_high.max(open), window_low.min(open), open)
                } else if i < 16 {
                    // Inside the 08:00-08:15 window
                    (window_low, window_high, window_low, window_low)
                } else if i == n - 1 {
                    (close, close, close, close)
                } else {
                    (open, open, open, open)
                };
                Bar {
                    ts_event: ts,
                    ts_local: cal.localize(ts),
                    open: o,
                    high: h,
                    low: l,
                    close: c,
                    volume,
                }
            })
            .collect()
    }

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    #[test]
    fn test_empty_series() {
        let cal = ExchangeCalendar::default();
        let series = BarSeries::new("ES", vec![]);
        let recs = generate_recommendations(&series, &cal, &EngineConfig::default());
        assert!(recs.is_empty());
    }

    #[test]
    fn test_worked_example_buy_day() {
        let cal = ExchangeCalendar::default();
        // 400 bars, open 4500, close 4530, IB window 4510/4495, flat volume
        let bars = session_day(&cal, jan(15), 400, 4500.0, 4530.0, 4510.0, 4495.0, 1000);
        let series = BarSeries::new("ES", bars);

        let recs = generate_recommendations(&series, &cal, &EngineConfig::default());
        assert_eq!(recs.len(), 1);
        let rec = &recs[0];

        assert_eq!(rec.date, jan(15));
        // +0.667% day, flat volume: bias = 1.33 -> BUY
        assert!(rec.bias > 0.0 && rec.bias < 2.0);
        assert_eq!(rec.action, Action::Buy);
        assert_eq!(rec.ib_high, 4510.0);
        assert_eq!(rec.ib_low, 4495.0);
        assert_eq!(rec.entry, 4510.25);
        // Magnets around 4530: [4450, 4500, 4550, 4600, 4650]
        assert_eq!(rec.target, 4550.0);
        assert_eq!(rec.stop_loss, 4490.0);
        assert_eq!(rec.close, 4530.0);
        // |4550 - 4510.25| / |4510.25 - 4490| = 39.75 / 20.25
        assert_eq!(rec.risk_reward, 1.96);
        // Close 4530 < 4545 tolerance line
        assert_eq!(rec.result, TradeOutcome::Loss);
    }

    #[test]
    fn test_sell_on_zero_bias() {
        let cal = ExchangeCalendar::default();
        // 100 bars < minimum sample, so bias is 0 -> SELL
        let bars = session_day(&cal, jan(15), 100, 4500.0, 4400.0, 4510.0, 4495.0, 1000);
        let series = BarSeries::new("ES", bars);

        let recs = generate_recommendations(&series, &cal, &EngineConfig::default());
        assert_eq!(recs.len(), 1);
        let rec = &recs[0];

        assert_eq!(rec.bias, 0.0);
        assert_eq!(rec.action, Action::Sell);
        assert_eq!(rec.entry, 4494.75);
        assert_eq!(rec.stop_loss, 4515.0);
        // Magnets around 4400: [4300, 4350, 4400, 4450, 4500]; first below entry
        assert_eq!(rec.target, 4450.0);
        // Close 4400 <= 4455: WIN on close basis
        assert_eq!(rec.result, TradeOutcome::Win);
    }

    #[test]
    fn test_lookback_limit_and_descending_dates() {
        let cal = ExchangeCalendar::default();
        let mut bars = Vec::new();
        for day in 6..=12 {
            bars.extend(session_day(&cal, jan(day), 60, 4500.0, 4510.0, 4505.0, 4495.0, 1000));
        }
        let series = BarSeries::new("ES", bars);

        let recs = generate_recommendations(&series, &cal, &EngineConfig::default());
        assert_eq!(recs.len(), 5);
        let dates: Vec<NaiveDate> = recs.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![jan(12), jan(11), jan(10), jan(9), jan(8)]);
        for pair in dates.windows(2) {
            assert!(pair[0] > pair[1]);
        }
    }

    #[test]
    fn test_day_without_ib_is_skipped_not_backfilled() {
        let cal = ExchangeCalendar::default();
        let mut bars = Vec::new();
        for day in 8..=12 {
            bars.extend(session_day(&cal, jan(day), 60, 4500.0, 4510.0, 4505.0, 4495.0, 1000));
        }
        // Jan 10: bars exist but only from 10:00 ET (15:00 UTC), no IB window
        bars.retain(|b| b.trading_day() != jan(10));
        let late = jan(10).and_hms_opt(15, 0, 0).unwrap().and_utc();
        for i in 0..30 {
            let ts = late + Duration::minutes(i);
            bars.push(Bar {
                ts_event: ts,
                ts_local: cal.localize(ts),
                open: 4500.0,
                high: 4500.0,
                low: 4500.0,
                close: 4500.0,
                volume: 1000,
            });
        }
        let series = BarSeries::new("ES", bars);

        let recs = generate_recommendations(&series, &cal, &EngineConfig::default());
        // Jan 10 is in the 5-day selection but yields nothing; Jan 7 and
        // earlier are not pulled in to replace it
        let dates: Vec<NaiveDate> = recs.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![jan(12), jan(11), jan(9), jan(8)]);
    }

    #[test]
    fn test_deterministic_output() {
        let cal = ExchangeCalendar::default();
        let bars = session_day(&cal, jan(15), 400, 4500.0, 4530.0, 4510.0, 4495.0, 1000);
        let series = BarSeries::new("ES", bars);
        let config = EngineConfig::default();

        let first = generate_recommendations(&series, &cal, &config);
        let second = generate_recommendations(&series, &cal, &config);
        assert_eq!(first, second);

        let a = serde_json::to_string(&first).unwrap();
        let b = serde_json::to_string(&second).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_summary() {
        let cal = ExchangeCalendar::default();
        let mut bars = session_day(&cal, jan(15), 400, 4500.0, 4530.0, 4510.0, 4495.0, 1000);
        bars.extend(session_day(&cal, jan(16), 100, 4500.0, 4400.0, 4510.0, 4495.0, 1000));
        let series = BarSeries::new("ES", bars);

        let recs = generate_recommendations(&series, &cal, &EngineConfig::default());
        assert_eq!(recs.len(), 2);

        let summary = RecommendationSummary::from_recommendations(&recs);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.wins, 1);
        assert_eq!(summary.win_rate, 50.0);
        assert!(summary.avg_risk_reward > 0.0);

        let empty = RecommendationSummary::from_recommendations(&[]);
        assert_eq!(empty.total, 0);
        assert_eq!(empty.win_rate, 0.0);
    }
}
