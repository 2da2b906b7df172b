//! Recommendation output: CSV export and terminal report.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::bars::BarSeries;
use crate::engine::{Recommendation, RecommendationSummary};

/// Write one CSV row per recommendation.
pub fn write_recommendations_csv(recommendations: &[Recommendation], path: &Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("Failed to create {:?}", path))?;
    for rec in recommendations {
        writer
            .serialize(rec)
            .context("Failed to write recommendation row")?;
    }
    writer.flush().context("Failed to flush CSV output")?;
    info!(
        "Wrote {} recommendations to {:?}",
        recommendations.len(),
        path
    );
    Ok(())
}

/// Dump a bar series to CSV, one row per bar.
pub fn write_bars_csv(series: &BarSeries, path: &Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("Failed to create {:?}", path))?;
    for bar in series.bars() {
        writer.serialize(bar).context("Failed to write bar row")?;
    }
    writer.flush().context("Failed to flush CSV output")?;
    info!("Wrote {} bars to {:?}", series.len(), path);
    Ok(())
}

/// Print the recommendation table and aggregate summary to stdout.
pub fn print_report(recommendations: &[Recommendation]) {
    if recommendations.is_empty() {
        println!("No recommendations: no recent day had a valid Initial Balance.");
        return;
    }

    println!();
    println!(
        "{:<12} {:<6} {:>8} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>6} {:>7}",
        "Date", "Action", "Bias", "IB High", "IB Low", "Entry", "Target", "Stop", "Close", "RRR", "Result"
    );
    for rec in recommendations {
        println!(
            "{:<12} {:<6} {:>8.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>6.2} {:>7}",
            rec.date.format("%Y-%m-%d").to_string(),
            rec.action.to_string(),
            rec.bias,
            rec.ib_high,
            rec.ib_low,
            rec.entry,
            rec.target,
            rec.stop_loss,
            rec.close,
            rec.risk_reward,
            rec.result.to_string(),
        );
    }

    let summary = RecommendationSummary::from_recommendations(recommendations);
    println!();
    println!("Days evaluated:  {}", summary.total);
    println!(
        "Win rate:        {:.1}% ({} of {}, close-basis)",
        summary.win_rate, summary.wins, summary.total
    );
    println!("Average R:R:     {:.2}:1", summary.avg_risk_reward);
}
