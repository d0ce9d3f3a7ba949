//! Integration tests for the sector risk pipeline
//!
//! These tests verify end-to-end functionality including configuration
//! loading, pooled sector statistics, VaR estimators and the outlier filter.

use ag_sector_risk::{
    confidence_interval, historical_var, parametric_var, AnalysisConfig, AnalysisPipeline,
    DescriptiveStats, FilterMode, OutlierFilter, Period, PriceSeries, ReturnBasis,
    ReturnSeriesBuilder, RiskMetricsCalculator, Sector, Ticker,
};
use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::fs;

fn date(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(i as i64)
}

/// Geometric random walk with Gaussian log returns
fn random_walk(ticker: &str, seed: u64, days: usize, sigma: f64) -> PriceSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0003, sigma).unwrap();
    let mut price = 100.0;
    let points: Vec<_> = (0..days)
        .map(|i| {
            if i > 0 {
                price *= f64::exp(normal.sample(&mut rng));
            }
            (date(i), price)
        })
        .collect();
    PriceSeries::new(Ticker::new(ticker), points).unwrap()
}

fn default_universe(days: usize) -> Vec<PriceSeries> {
    let gafam = Sector::gafam();
    let utilities = Sector::utilities();
    let mut prices = Vec::new();
    for (i, t) in gafam.tickers().iter().enumerate() {
        prices.push(random_walk(t.as_str(), 10 + i as u64, days, 0.02));
    }
    for (i, t) in utilities.tickers().iter().enumerate() {
        prices.push(random_walk(t.as_str(), 100 + i as u64, days, 0.011));
    }
    prices
}

fn config_for(days: usize) -> AnalysisConfig {
    AnalysisConfig::for_period(Period::new(date(0), date(days)).unwrap())
}

#[test]
fn test_load_example_configs() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/configs/gafam_vs_utilities.yaml");
    let yaml = fs::read_to_string(path).expect("Failed to read example config");
    let config = AnalysisConfig::from_yaml(&yaml).expect("Failed to parse config");
    assert_eq!(config.sectors, vec![Sector::gafam(), Sector::utilities()]);
    assert_eq!(config.universe().len(), 10);

    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/configs/filtered.yaml");
    let yaml = fs::read_to_string(path).expect("Failed to read filtered config");
    let pipeline = AnalysisPipeline::from_yaml(&yaml).unwrap();
    assert_eq!(pipeline.config().basis, ReturnBasis::Filtered);
    assert_eq!(pipeline.config().outlier_mode, FilterMode::UntilStable);
}

#[test]
fn test_gafam_vs_utilities_end_to_end() {
    let days = 500;
    let report = AnalysisPipeline::new(config_for(days))
        .unwrap()
        .run(&default_universe(days))
        .unwrap();

    assert_eq!(report.aligned_dates, days - 1);
    assert_eq!(report.instruments.len(), 10);

    let gafam = report.sector("GAFAM").unwrap();
    let utilities = report.sector("Utilities").unwrap();

    // Pooled n = aligned dates x tickers
    assert_eq!(gafam.stats.count, 5 * (days - 1));
    assert_eq!(gafam.risk.confidence_interval.sample_size, gafam.stats.count);

    // The higher-volatility basket carries the larger loss quantiles
    assert!(gafam.stats.std > utilities.stats.std);
    let g95 = gafam.risk.var_at(0.95).unwrap();
    let u95 = utilities.risk.var_at(0.95).unwrap();
    assert!(g95.parametric < u95.parametric);
    assert!(g95.historical < u95.historical);

    for sector in &report.sectors {
        let v95 = sector.risk.var_at(0.95).unwrap();
        let v99 = sector.risk.var_at(0.99).unwrap();
        assert!(v99.historical <= v95.historical);
        assert!(v99.parametric <= v95.parametric);
        assert!(v95.expected_shortfall.unwrap() <= v95.historical);
        assert!(sector.risk.confidence_interval.contains(sector.stats.mean));
    }

    // Report survives a JSON round trip
    let json = report.to_json().unwrap();
    let parsed: ag_sector_risk::AnalysisReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.sectors.len(), 2);
    assert_eq!(parsed.outliers, report.outliers);
}

#[test]
fn test_pooled_stats_equal_instrument_stats_for_single_ticker() {
    let days = 300;
    let mut config = config_for(days);
    config.sectors = vec![Sector::new("Solo", ["NEE"]).unwrap()];

    let report = AnalysisPipeline::new(config)
        .unwrap()
        .run(&[random_walk("NEE", 7, days, 0.012)])
        .unwrap();

    let sector = report.sector("Solo").unwrap();
    let instrument = report.instruments_in("Solo").next().unwrap();
    assert_eq!(sector.stats, instrument.stats);
}

#[test]
fn test_pooled_stats_do_not_depend_on_price_order() {
    let days = 200;
    let pipeline = AnalysisPipeline::new(config_for(days)).unwrap();
    let prices = default_universe(days);
    let mut reversed = prices.clone();
    reversed.reverse();

    let a = pipeline.run(&prices).unwrap();
    let b = pipeline.run(&reversed).unwrap();
    assert_eq!(a.sectors, b.sectors);
}

#[test]
fn test_parametric_and_historical_var_converge_on_gaussian_sample() {
    let mut rng = StdRng::seed_from_u64(42);
    let normal = Normal::new(0.0005, 0.01).unwrap();
    let sample: Vec<f64> = (0..100_000).map(|_| normal.sample(&mut rng)).collect();

    let stats = DescriptiveStats::describe(&sample).unwrap();
    for c in [0.95, 0.99] {
        let parametric = parametric_var(stats.mean, stats.std, c).unwrap();
        let historical = historical_var(&sample, c).unwrap();
        assert!(
            (parametric - historical).abs() < 1e-3,
            "c={} parametric={} historical={}",
            c,
            parametric,
            historical
        );
    }
    assert!(stats.skewness.abs() < 0.05);
    assert!(stats.kurtosis.abs() < 0.1);
}

#[test]
fn test_concrete_return_scenario() {
    let sample = [-0.02, 0.01, 0.03, -0.01, 0.00];
    let stats = DescriptiveStats::describe(&sample).unwrap();
    let metrics = RiskMetricsCalculator::default().compute(&stats, &sample).unwrap();

    assert_relative_eq!(stats.mean, 0.002, epsilon = 1e-12);
    assert_relative_eq!(stats.std, 0.019235, epsilon = 1e-6);

    let v95 = metrics.var_at(0.95).unwrap();
    assert_relative_eq!(v95.parametric, -0.029639, epsilon = 1e-6);
    assert_eq!(v95.historical, -0.018000000000000002);
}

#[test]
fn test_confidence_interval_reference_values() {
    let ci = confidence_interval(0.001, 0.02, 2500, 0.05).unwrap();
    assert_relative_eq!(ci.margin_of_error, 0.000784, epsilon = 1e-6);
    assert_relative_eq!(ci.lower, 0.000216, epsilon = 1e-6);
    assert_relative_eq!(ci.upper, 0.001784, epsilon = 1e-6);
}

#[test]
fn test_outlier_filter_on_real_shaped_data() {
    let days = 400;
    let prices = default_universe(days);
    let matrix = ReturnSeriesBuilder::with_period(Period::new(date(0), date(days)).unwrap())
        .build_matrix(&prices)
        .unwrap();

    let single = OutlierFilter::default().filter(&matrix);
    assert!(single.matrix.len() <= matrix.len());
    assert_eq!(single.matrix.len() + single.removed_dates.len(), matrix.len());

    let stable = OutlierFilter::default().with_mode(FilterMode::UntilStable);
    let once = stable.apply(&matrix);
    assert_eq!(stable.apply(&once), once);
    assert!(once.len() <= single.matrix.len());
}

#[test]
fn test_single_pass_is_idempotent_when_one_pass_is_stable() {
    // No return lies beyond 2 std of its column, so the first pass removes nothing
    let days = 100;
    let points = |ticker: &str, shift: usize| {
        let closes: Vec<_> = (0..days)
            .map(|i| (date(i), 100.0 + ((i + shift) % 4) as f64))
            .collect();
        PriceSeries::new(Ticker::new(ticker), closes).unwrap()
    };
    let matrix = ReturnSeriesBuilder::new()
        .build_matrix(&[points("AAA", 0), points("BBB", 1)])
        .unwrap();

    let filter = OutlierFilter::default();
    let once = filter.apply(&matrix);
    assert_eq!(once, matrix);
    assert_eq!(filter.apply(&once), once);
}

proptest! {
    #[test]
    fn prop_historical_var99_not_above_var95(
        sample in prop::collection::vec(-0.2f64..0.2, 1..300)
    ) {
        let v95 = historical_var(&sample, 0.95).unwrap();
        let v99 = historical_var(&sample, 0.99).unwrap();
        prop_assert!(v99 <= v95);
    }

    #[test]
    fn prop_margin_shrinks_with_sample_size(
        std in 0.001f64..0.1,
        n in 2usize..100_000,
        extra in 1usize..100_000,
    ) {
        let small = confidence_interval(0.0, std, n, 0.05).unwrap();
        let large = confidence_interval(0.0, std, n + extra, 0.05).unwrap();
        prop_assert!(large.margin_of_error < small.margin_of_error);
    }

    #[test]
    fn prop_until_stable_filter_is_idempotent(
        values in prop::collection::vec(-0.1f64..0.1, 20..120),
        threshold in 1.0f64..4.0,
    ) {
        let closes: Vec<_> = values
            .iter()
            .scan(100.0, |price, r| {
                *price *= f64::exp(*r);
                Some(*price)
            })
            .enumerate()
            .map(|(i, p)| (date(i), p))
            .collect();
        let matrix = ReturnSeriesBuilder::new()
            .build_matrix(&[PriceSeries::new(Ticker::new("X"), closes).unwrap()])
            .unwrap();

        let filter = OutlierFilter::new(threshold).unwrap().with_mode(FilterMode::UntilStable);
        let once = filter.apply(&matrix);
        prop_assert_eq!(filter.apply(&once), once);
    }
}
