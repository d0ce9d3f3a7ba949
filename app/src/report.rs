//! Plain-text tables for the terminal

use std::fmt::Write;

use ag_sector_risk::{AnalysisReport, DescriptiveStats, SectorReport};

const RULE: usize = 78;

fn rule(out: &mut String) {
    let _ = writeln!(out, "{}", "-".repeat(RULE));
}

fn stats_header(out: &mut String, label: &str) {
    let _ = writeln!(
        out,
        "{:<12} {:>8} {:>12} {:>12} {:>12} {:>12}",
        label, "count", "mean", "std", "skew", "kurtosis"
    );
}

fn stats_row(out: &mut String, label: &str, stats: &DescriptiveStats) {
    let _ = writeln!(
        out,
        "{:<12} {:>8} {:>12.6} {:>12.6} {:>12.4} {:>12.4}",
        label, stats.count, stats.mean, stats.std, stats.skewness, stats.kurtosis
    );
}

/// Header lines: period, aligned dates, outlier filter outcome
pub fn summary(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Sector risk comparison {}", report.period);
    if let (Some(first), Some(last)) = (report.first_date, report.last_date) {
        let _ = writeln!(
            out,
            "Aligned returns: {} dates ({} .. {})",
            report.aligned_dates, first, last
        );
    }
    let outliers = &report.outliers;
    let _ = writeln!(
        out,
        "Outlier filter (|z| > {}, {:?}): removed {} of {} dates ({:.2}%), statistics on {:?} returns",
        outliers.threshold,
        outliers.mode,
        outliers.rows_removed(),
        outliers.rows_before,
        outliers.removed_fraction() * 100.0,
        report.basis,
    );
    out
}

/// One statistics table per sector, one row per ticker
pub fn instrument_tables(report: &AnalysisReport) -> String {
    let mut out = String::new();
    for sector in &report.sectors {
        let _ = writeln!(out, "\n{} instruments", sector.name);
        rule(&mut out);
        stats_header(&mut out, "ticker");
        for instrument in report.instruments_in(&sector.name) {
            stats_row(&mut out, instrument.ticker.as_str(), &instrument.stats);
        }
    }
    out
}

/// Pooled statistics, one row per sector
pub fn sector_table(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nPooled sector statistics");
    rule(&mut out);
    stats_header(&mut out, "sector");
    for sector in &report.sectors {
        stats_row(&mut out, &sector.name, &sector.stats);
    }
    out
}

/// Normal against historical VaR per sector and confidence level
pub fn var_table(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nValue at Risk (daily log return)");
    rule(&mut out);
    let _ = writeln!(
        out,
        "{:<12} {:>8} {:>14} {:>14} {:>14} {:>12}",
        "sector", "level", "normal", "historical", "difference", "ES"
    );
    for sector in &report.sectors {
        for var in &sector.risk.var {
            let es = var
                .expected_shortfall
                .map(|es| format!("{:.6}", es))
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "{:<12} {:>7.0}% {:>14.6} {:>14.6} {:>14.6} {:>12}",
                sector.name,
                var.confidence_level * 100.0,
                var.parametric,
                var.historical,
                var.parametric - var.historical,
                es,
            );
        }
    }
    out
}

fn interval_line(sector: &SectorReport) -> String {
    let ci = &sector.risk.confidence_interval;
    format!(
        "{}: {:.0}% CI for mean return: [{:.6}, {:.6}] (mean {:.6}, margin {:.6}, n = {})",
        sector.name,
        ci.level() * 100.0,
        ci.lower,
        ci.upper,
        ci.mean,
        ci.margin_of_error,
        ci.sample_size,
    )
}

/// Confidence interval on the mean, one line per sector
pub fn interval_lines(report: &AnalysisReport) -> String {
    let mut out = String::from("\n");
    for sector in &report.sectors {
        let _ = writeln!(out, "{}", interval_line(sector));
    }
    out
}

/// Everything the CLI prints, in order
pub fn render(report: &AnalysisReport) -> String {
    let mut out = summary(report);
    out.push_str(&instrument_tables(report));
    out.push_str(&sector_table(report));
    out.push_str(&var_table(report));
    out.push_str(&interval_lines(report));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_sector_risk::{AnalysisConfig, AnalysisPipeline, Period, PriceSeries, Sector, Ticker};
    use chrono::NaiveDate;

    fn report() -> AnalysisReport {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut config =
            AnalysisConfig::for_period(Period::new(start, start + chrono::Duration::days(90)).unwrap());
        config.sectors = vec![
            Sector::new("Tech", ["AAPL", "MSFT"]).unwrap(),
            Sector::new("Power", ["DUK"]).unwrap(),
        ];

        let series = |ticker: &str, seed: i64| {
            let closes = (0..60).map(|i| {
                let date = start + chrono::Duration::days(i);
                (date, 100.0 + ((i * seed) % 7) as f64)
            });
            PriceSeries::new(Ticker::new(ticker), closes).unwrap()
        };
        let prices = vec![series("AAPL", 3), series("MSFT", 5), series("DUK", 2)];
        AnalysisPipeline::new(config).unwrap().run(&prices).unwrap()
    }

    #[test]
    fn test_render_contains_every_section() {
        let report = report();
        let text = render(&report);

        assert!(text.contains("Tech instruments"));
        assert!(text.contains("Power instruments"));
        assert!(text.contains("Pooled sector statistics"));
        assert!(text.contains("Value at Risk"));
        assert!(text.contains("95% CI for mean return"));
        for ticker in ["AAPL", "MSFT", "DUK"] {
            assert!(text.contains(ticker));
        }
    }

    #[test]
    fn test_var_table_has_row_per_level() {
        let report = report();
        let table = var_table(&report);
        assert_eq!(table.matches("Tech").count(), 2);
        assert_eq!(table.matches("Power").count(), 2);
        assert!(table.contains("99%"));
    }

    #[test]
    fn test_interval_line_uses_six_decimals() {
        let report = report();
        let line = interval_line(&report.sectors[0]);
        let ci = &report.sectors[0].risk.confidence_interval;
        assert!(line.contains(&format!("[{:.6}, {:.6}]", ci.lower, ci.upper)));
    }
}
