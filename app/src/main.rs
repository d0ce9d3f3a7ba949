use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use ag_marketdata::{FetcherConfig, PriceFetcher, PriceSource, StaticPriceSource, YahooSource};
use ag_sector_risk::{AnalysisPipeline, Period, PriceSeries, Ticker};

mod chart;
mod config;
mod report;

use config::Config;

#[derive(Parser, Debug)]
#[clap(
    name = "sector-risk",
    about = "Compare the return distribution and Value at Risk of equity sectors"
)]
struct Args {
    /// YAML configuration file; built-in defaults are used without it
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// First date of the analysis period (YYYY-MM-DD)
    #[clap(long)]
    start: Option<NaiveDate>,

    /// Last date of the analysis period (YYYY-MM-DD)
    #[clap(long)]
    end: Option<NaiveDate>,

    /// Directory for the SVG charts
    #[clap(short, long)]
    output_dir: Option<PathBuf>,

    /// Write the full report as JSON to this path
    #[clap(long)]
    json: Option<PathBuf>,

    /// Skip chart rendering
    #[clap(long)]
    no_charts: bool,

    /// Read prices from a JSON fixture instead of downloading them
    #[clap(long)]
    prices: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    ag_marketdata::init_tracing();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Config::load(path)?
        }
        None => Config::default(),
    };

    if args.start.is_some() || args.end.is_some() {
        let start = args.start.unwrap_or(config.analysis.period.start);
        let end = args.end.unwrap_or(config.analysis.period.end);
        config.analysis.period = Period::new(start, end).context("Invalid analysis period")?;
    }
    let output_dir = args.output_dir.clone().unwrap_or_else(|| config.output.dir.clone());

    let pipeline = AnalysisPipeline::new(config.analysis.clone())
        .context("Invalid analysis configuration")?;
    let period = config.analysis.period;
    let universe = config.analysis.universe();

    let prices = match &args.prices {
        Some(path) => {
            info!("Loading price snapshot from {:?}", path);
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read price snapshot {}", path.display()))?;
            let source = StaticPriceSource::from_json(&json)
                .with_context(|| format!("Failed to parse price snapshot {}", path.display()))?;
            if source.is_empty() {
                bail!("Price snapshot {} holds no series", path.display());
            }
            info!("Loaded {} price series from snapshot", source.len());
            fetch(source, config.fetcher.clone(), &universe, &period).await?
        }
        None => {
            info!("Downloading prices from {}", config.yahoo.endpoint);
            let source = YahooSource::new(config.yahoo.clone())?;
            fetch(source, config.fetcher.clone(), &universe, &period).await?
        }
    };

    let run = pipeline.analyse(&prices).context("Sector analysis failed")?;
    println!("{}", report::render(&run.report));

    if let Some(path) = &args.json {
        write_file(path, &run.report.to_json()?)?;
        info!("Wrote report to {:?}", path);
    }

    if !args.no_charts && config.output.charts {
        for path in chart::write_charts(&output_dir, &run.distributions)? {
            info!("Wrote chart {:?}", path);
        }
    }

    Ok(())
}

async fn fetch<S: PriceSource>(
    source: S,
    config: FetcherConfig,
    tickers: &[Ticker],
    period: &Period,
) -> Result<Vec<PriceSeries>> {
    let fetcher = PriceFetcher::new(source, config);
    let prices = fetcher
        .fetch_all(tickers, period)
        .await
        .with_context(|| format!("Failed to fetch prices from {}", fetcher.source().name()))?;
    Ok(prices)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
