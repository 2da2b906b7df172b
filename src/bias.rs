//! Daily directional bias.
//!
//! A signed score in [-100, +100] combining the day's percent change with
//! whether the final hour traded heavier or lighter than the session
//! average. Positive = long bias, negative = short, 0 = neutral.

use crate::bars::Bar;

/// Minimum bars for a reliable read (one full session of minute bars)
pub const MIN_SESSION_BARS: usize = 390;
/// Final-hour window for the recent-volume read
pub const RECENT_VOLUME_BARS: usize = 60;
/// Recent volume above `avg * SURGE` scores +10
pub const VOLUME_SURGE_RATIO: f64 = 1.2;
/// Recent volume below `avg * FADE` scores -10
pub const VOLUME_FADE_RATIO: f64 = 0.8;
/// Points contributed by the volume read
pub const VOLUME_BIAS_POINTS: f64 = 10.0;
/// Multiplier on the percent change before the volume read is added
pub const CHANGE_WEIGHT: f64 = 2.0;
/// Score bound, either side of zero
pub const BIAS_LIMIT: f64 = 100.0;

/// Score one trading day's bars.
///
/// Days with fewer than [`MIN_SESSION_BARS`] bars score 0 (insufficient
/// sample). Recent volume between `FADE` and `SURGE` times the session
/// average reads as no signal.
pub fn daily_bias(bars: &[&Bar]) -> f64 {
    if bars.len() < MIN_SESSION_BARS {
        return 0.0;
    }

    let open = bars[0].open;
    let close = bars[bars.len() - 1].close;
    let daily_change_pct = (close - open) / open * 100.0;

    let avg_volume = mean_volume(bars);
    let recent_volume = mean_volume(&bars[bars.len() - RECENT_VOLUME_BARS..]);

    let volume_bias = if recent_volume > avg_volume * VOLUME_SURGE_RATIO {
        VOLUME_BIAS_POINTS
    } else if recent_volume < avg_volume * VOLUME_FADE_RATIO {
        -VOLUME_BIAS_POINTS
    } else {
        0.0
    };

    (daily_change_pct * CHANGE_WEIGHT + volume_bias).clamp(-BIAS_LIMIT, BIAS_LIMIT)
}

fn mean_volume(bars: &[&Bar]) -> f64 {
    bars.iter().map(|b| b.volume as f64).sum::<f64>() / bars.len() as f64
}
