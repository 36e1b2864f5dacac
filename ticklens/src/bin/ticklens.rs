use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use clap::Parser;
use ticklens::{
    ConnectorBuilder, Dashboard, DashboardConfig, LensError, Lookback, MarketConnector, RangeSpec,
    Sampling, SnapshotConnector, render_json, render_text,
};
use ticklens_mock::MockConnector;
use ticklens_yfinance::YfConnector;

/// Single-ticker market dashboard: price history with a moving-average
/// overlay, company info, long-run history, latest close, annual statements
/// and the monthly volume split.
#[derive(Parser, Debug)]
#[command(name = "ticklens", version, about, long_about = None)]
struct Cli {
    /// Ticker symbol (case-insensitive).
    #[arg(default_value = "AAPL")]
    symbol: String,

    /// Lookback span of the price history (1d, 5d, 1mo, 3mo, 6mo, 1y, 5y, 10y, ytd, max).
    #[arg(long, default_value = "6mo", conflicts_with = "start")]
    period: Lookback,

    /// Bar cadence (1m, 5m, 15m, 30m, 1h, 1d, 5d, 1wk, 1mo).
    #[arg(long, default_value = "1d")]
    interval: Sampling,

    /// First day of an explicit date range (YYYY-MM-DD); replaces --period.
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Day after the last day of the range (exclusive); defaults to tomorrow.
    #[arg(long, requires = "start")]
    end: Option<NaiveDate>,

    /// Moving-average window in periods; defaults to the configured window.
    #[arg(long)]
    window: Option<usize>,

    /// TOML configuration file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Serve deterministic fixtures instead of live data.
    #[arg(long, env = "TICKLENS_USE_MOCK")]
    mock: bool,

    /// Serve history from an exported split-orient JSON file.
    #[arg(long, conflicts_with = "mock")]
    snapshot: Option<PathBuf>,

    /// Total attempts per provider call, including the first.
    #[arg(long)]
    retries: Option<u32>,

    /// Disable fetch memoization.
    #[arg(long)]
    no_cache: bool,
}

impl Cli {
    fn config(&self) -> Result<DashboardConfig, LensError> {
        let mut cfg = match &self.config {
            Some(path) => DashboardConfig::load(path)?,
            None => DashboardConfig::default(),
        };
        if let Some(attempts) = self.retries {
            cfg.retry.max_attempts = attempts;
        }
        if self.no_cache {
            cfg.cache.enabled = false;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    fn range(&self) -> Result<RangeSpec, LensError> {
        match self.start {
            Some(start) => {
                let end = match self.end {
                    Some(end) => end,
                    None => {
                        let today = Utc::now().date_naive();
                        today.checked_add_days(Days::new(1)).unwrap_or(today)
                    }
                };
                RangeSpec::between(start, end, self.interval)
            }
            None => Ok(RangeSpec::lookback(self.period, self.interval)),
        }
    }

    fn connector(&self, cfg: &DashboardConfig) -> Result<Arc<dyn MarketConnector>, LensError> {
        let builder = if let Some(path) = &self.snapshot {
            ConnectorBuilder::new(Arc::new(SnapshotConnector::load(path)?)).with_config(cfg)
        } else if self.mock {
            ConnectorBuilder::new(Arc::new(MockConnector::new())).with_config(cfg)
        } else {
            YfConnector::configured(cfg)?
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(stack = %builder.describe(), "connector stack");
        builder.build()
    }
}

#[cfg(feature = "tracing")]
fn init_tracing() {
    // Suggested: RUST_LOG=info,ticklens=debug,ticklens_middleware=debug
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(cli: Cli) -> Result<ExitCode, LensError> {
    let cfg = cli.config()?;
    let connector = cli.connector(&cfg)?;
    let dashboard = Dashboard::builder()
        .with_connector(connector)
        .config(cfg)
        .build()?;
    let req = dashboard.request(&cli.symbol, cli.range()?, cli.window)?;

    let report = dashboard.run(&req).await;
    if cli.json {
        println!("{}", render_json(&report)?);
    } else {
        print!("{}", render_text(&report));
    }
    Ok(if report.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    #[cfg(feature = "tracing")]
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}
