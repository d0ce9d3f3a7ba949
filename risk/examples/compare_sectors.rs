//! Sector comparison example
//!
//! Runs the GAFAM vs Utilities analysis on synthetic prices and prints the
//! pooled statistics and VaR of each sector.
//!
//! Run with: cargo run --example compare_sectors

use ag_sector_risk::*;
use chrono::{Duration, NaiveDate};

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("=== GAFAM vs Utilities Risk Comparison ===\n");

    // 1. Simulate two years of closes; tech moves twice as much as utilities
    let start = NaiveDate::from_ymd_opt(2022, 1, 3).ok_or("invalid start date")?;
    let days = 730;
    let mut prices = Vec::new();
    for (sector, scale) in [(Sector::gafam(), 0.02), (Sector::utilities(), 0.01)] {
        for (k, ticker) in sector.tickers().iter().enumerate() {
            let mut price = 100.0;
            let points: Vec<_> = (0..days)
                .map(|i| {
                    let shock = ((i * (7 + k) % 23) as f64 - 11.0) / 11.0;
                    price *= f64::exp(shock * scale);
                    (start + Duration::days(i as i64), price)
                })
                .collect();
            prices.push(PriceSeries::new(ticker.clone(), points)?);
        }
    }

    // 2. Configure and run the pipeline
    let period = Period::new(start, start + Duration::days(days as i64))?;
    let pipeline = AnalysisPipeline::new(AnalysisConfig::for_period(period))?;
    let report = pipeline.run(&prices)?;

    println!("Aligned dates: {}", report.aligned_dates);
    println!(
        "Outlier rows (|z| >= {}): {}\n",
        report.outliers.threshold,
        report.outliers.rows_removed()
    );

    // 3. Pooled statistics and VaR per sector
    for sector in &report.sectors {
        println!("{} ({} observations)", sector.name, sector.stats.count);
        println!("  Mean:     {:.6}", sector.stats.mean);
        println!("  Std:      {:.6}", sector.stats.std);
        println!("  Skewness: {:.4}", sector.stats.skewness);
        println!("  Kurtosis: {:.4}", sector.stats.kurtosis);
        for var in &sector.risk.var {
            println!(
                "  VaR {:.0}%: normal {:.4}%, historical {:.4}%",
                var.confidence_level * 100.0,
                var.parametric * 100.0,
                var.historical * 100.0
            );
        }
        let ci = &sector.risk.confidence_interval;
        println!(
            "  {:.0}% CI on the mean: [{:.6}, {:.6}]\n",
            ci.level() * 100.0,
            ci.lower,
            ci.upper
        );
    }

    Ok(())
}
