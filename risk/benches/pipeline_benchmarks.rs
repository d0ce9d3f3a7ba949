//! Benchmarks for the sector risk pipeline
//!
//! Run with: cargo bench

use ag_sector_risk::*;
use chrono::{Duration, NaiveDate};

fn main() {
    println!("=== Sector Risk Pipeline Performance Benchmarks ===\n");

    benchmark_var_calculations();
    benchmark_outlier_filter();
    benchmark_full_pipeline();
}

fn synthetic_returns(n: usize) -> Vec<f64> {
    (0..n).map(|i| (i as f64 * 0.37).sin() * 0.02).collect()
}

fn synthetic_prices(ticker: &str, days: usize, phase: f64) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2000, 5, 31).unwrap();
    let mut price = 100.0;
    let points: Vec<_> = (0..days)
        .map(|i| {
            price *= f64::exp((i as f64 * 0.61 + phase).sin() * 0.015);
            (start + Duration::days(i as i64), price)
        })
        .collect();
    PriceSeries::new(Ticker::new(ticker), points).unwrap()
}

fn benchmark_var_calculations() {
    println!("## VaR Calculations");

    let returns = synthetic_returns(30_000);
    let stats = DescriptiveStats::describe(&returns).unwrap();

    let start = std::time::Instant::now();
    for _ in 0..100 {
        let _ = historical_var(&returns, 0.99);
    }
    let elapsed = start.elapsed();
    println!("  Historical VaR, 30k returns (100 iterations): {:?}", elapsed);
    println!("  Average: {:?}", elapsed / 100);

    let start = std::time::Instant::now();
    for _ in 0..10_000 {
        let _ = parametric_var(stats.mean, stats.std, 0.95);
    }
    let elapsed = start.elapsed();
    println!("  Parametric VaR (10,000 iterations): {:?}", elapsed);
    println!("  Average: {:?}", elapsed / 10_000);

    let calculator = RiskMetricsCalculator::default();
    let start = std::time::Instant::now();
    for _ in 0..100 {
        let _ = calculator.compute(&stats, &returns);
    }
    let elapsed = start.elapsed();
    println!("  Full risk metrics (100 iterations): {:?}", elapsed);

    println!();
}

fn benchmark_outlier_filter() {
    println!("## Outlier Filter");

    let prices: Vec<_> = (0..10)
        .map(|i| synthetic_prices(&format!("T{}", i), 6_000, i as f64))
        .collect();
    let matrix = ReturnSeriesBuilder::new().build_matrix(&prices).unwrap();

    for mode in [FilterMode::SinglePass, FilterMode::UntilStable] {
        let filter = OutlierFilter::default().with_mode(mode);
        let start = std::time::Instant::now();
        let outcome = filter.filter(&matrix);
        println!(
            "  {:?}: {:?} ({} passes, {} rows removed)",
            mode,
            start.elapsed(),
            outcome.passes,
            outcome.removed_dates.len()
        );
    }

    println!();
}

fn benchmark_full_pipeline() {
    println!("## Full Pipeline");

    let days = 6_000;
    let prices: Vec<_> = universe(&[Sector::gafam(), Sector::utilities()])
        .iter()
        .enumerate()
        .map(|(i, t)| synthetic_prices(t.as_str(), days, i as f64 * 0.3))
        .collect();

    let start_date = NaiveDate::from_ymd_opt(2000, 5, 31).unwrap();
    let period = Period::new(start_date, start_date + Duration::days(days as i64)).unwrap();
    let pipeline = AnalysisPipeline::new(AnalysisConfig::for_period(period)).unwrap();

    let start = std::time::Instant::now();
    for _ in 0..10 {
        let _ = pipeline.analyse(&prices);
    }
    let elapsed = start.elapsed();
    println!("  GAFAM vs Utilities, {} days (10 iterations): {:?}", days, elapsed);
    println!("  Average: {:?}", elapsed / 10);

    println!();
}
