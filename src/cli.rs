//! CLI definition and pipeline stages.
//!
//! Each stage reads the previous stage's files from disk, so stages can be
//! rerun independently. `run` chains all five in order.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::NaiveDate;

use crate::adapters::csv_adapter::{
    UniverseRecord, chunk_file_name, list_chunks, read_rows, read_scored, write_rows, write_scored,
};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::markdown_report::MarkdownReportAdapter;
use crate::adapters::providers::create_provider;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult, PeriodRecord};
use crate::domain::config_validation::{
    parse_count, parse_date, parse_double, parse_int, parse_momentum_lists, validate_config,
};
use crate::domain::error::MomentumError;
use crate::domain::metrics::{MetricRecord, PerformanceSummary};
use crate::domain::observation::PriceBar;
use crate::domain::signals::{MomentumConfig, compute_scores};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::{ReportInput, ReportPort};

pub const DEFAULT_CONFIG: &str = "config.ini";
pub const NAV_FILE: &str = "nav.csv";
pub const METRICS_FILE: &str = "metrics.csv";
pub const UNIVERSE_FILE: &str = "universe.csv";

#[derive(Parser, Debug)]
#[command(
    name = "momentum-weekly",
    about = "Weekly top-N momentum backtest pipeline"
)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download raw daily prices in symbol chunks
    Fetch {
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },
    /// Sort raw chunks into prepared chunks
    Prepare {
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },
    /// Compute momentum scores for prepared chunks
    Signals {
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },
    /// Run the weekly backtest over signal files
    Backtest {
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },
    /// Render the markdown report from backtest outputs
    Report {
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },
    /// Run fetch, prepare, signals, backtest and report in order
    Run {
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },
}

impl Command {
    pub fn config_path(&self) -> &Path {
        match self {
            Command::Fetch { config }
            | Command::Prepare { config }
            | Command::Signals { config }
            | Command::Backtest { config }
            | Command::Report { config }
            | Command::Run { config }
            | Command::Validate { config } => config.as_path(),
        }
    }
}

/// Every setting a pipeline stage reads, resolved with defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub seed: i64,
    pub provider: String,
    pub num_stocks: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub fetch_chunk_size: usize,
    pub raw_dir: PathBuf,
    pub prepared_dir: PathBuf,
    pub result_dir: PathBuf,
    pub report_dir: PathBuf,
    pub title: String,
    pub backtest: BacktestConfig,
    pub momentum: MomentumConfig,
}

impl PipelineSettings {
    pub fn signal_dir(&self) -> PathBuf {
        self.prepared_dir.join("signals")
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let command = cli.command;
    let config_path = command.config_path().to_path_buf();

    let outcome = match command {
        Command::Validate { .. } => run_validate(&config_path),
        Command::Fetch { .. } => with_settings(&config_path, |config, settings| {
            let provider = create_provider(config)?;
            run_fetch(settings, provider.as_ref()).map(|_| ())
        }),
        Command::Prepare { .. } => {
            with_settings(&config_path, |_, settings| run_prepare(settings).map(|_| ()))
        }
        Command::Signals { .. } => {
            with_settings(&config_path, |_, settings| run_signals(settings).map(|_| ()))
        }
        Command::Backtest { .. } => with_settings(&config_path, |_, settings| {
            let result = run_backtest(settings)?;
            print_summary(&result.summary);
            Ok(())
        }),
        Command::Report { .. } => {
            with_settings(&config_path, |_, settings| run_report(settings).map(|_| ()))
        }
        Command::Run { .. } => with_settings(&config_path, |config, settings| {
            let provider = create_provider(config)?;
            run_pipeline(settings, provider.as_ref())
        }),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn with_settings<F>(config_path: &Path, stage: F) -> Result<(), MomentumError>
where
    F: FnOnce(&dyn ConfigPort, &PipelineSettings) -> Result<(), MomentumError>,
{
    let adapter = load_config(config_path)?;
    let settings = build_settings(&adapter)?;
    stage(&adapter, &settings)
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, MomentumError> {
    tracing::debug!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

fn run_validate(config_path: &Path) -> Result<(), MomentumError> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;
    validate_config(&adapter)?;
    eprintln!("Config validated successfully");
    Ok(())
}

/// Validates the whole config, then resolves it into settings.
pub fn build_settings(config: &dyn ConfigPort) -> Result<PipelineSettings, MomentumError> {
    validate_config(config)?;

    let path = |section: &str, key: &str, default: &str| {
        PathBuf::from(
            config
                .get_string(section, key)
                .unwrap_or_else(|| default.to_string()),
        )
    };

    Ok(PipelineSettings {
        seed: parse_int(config, "project", "seed", 42)?,
        provider: config
            .get_string("data", "provider")
            .unwrap_or_else(|| "mock".to_string())
            .to_lowercase(),
        num_stocks: parse_count(config, "data", "num_stocks", 300)?,
        start_date: parse_date(config, "start_date")?,
        end_date: parse_date(config, "end_date")?,
        fetch_chunk_size: parse_count(config, "data", "fetch_chunk_size", 50)?,
        raw_dir: path("data", "raw_dir", "data/raw"),
        prepared_dir: path("data", "prepared_dir", "data/prepared"),
        result_dir: path("backtest", "result_dir", "results"),
        report_dir: path("report", "report_dir", "reports"),
        title: config
            .get_string("report", "title")
            .unwrap_or_else(|| "Weekly Momentum Backtest".to_string()),
        backtest: build_backtest_config(config)?,
        momentum: build_momentum_config(config)?,
    })
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, MomentumError> {
    let days = parse_count(config, "data", "trading_days_per_year", 252)?;
    Ok(BacktestConfig {
        top_n: parse_count(config, "strategy", "top_n", 10)?,
        buy_cost_rate: parse_double(config, "backtest", "buy_cost", 0.0008)?,
        sell_cost_rate: parse_double(config, "backtest", "sell_cost", 0.0018)?,
        initial_nav: parse_double(config, "backtest", "initial_nav", 1.0)?,
        trading_days_per_year: u32::try_from(days).map_err(|_| {
            MomentumError::config_invalid(
                "data",
                "trading_days_per_year",
                "trading_days_per_year is out of range",
            )
        })?,
    })
}

pub fn build_momentum_config(config: &dyn ConfigPort) -> Result<MomentumConfig, MomentumError> {
    let (windows, weights) = parse_momentum_lists(config)?;
    MomentumConfig::new(windows, weights)
}

/// Fetches the universe in chunks of `fetch_chunk_size` symbols. Returns
/// the number of chunk files written.
pub fn run_fetch(settings: &PipelineSettings, provider: &dyn DataPort) -> Result<usize, MomentumError> {
    let symbols = provider.get_universe(settings.num_stocks)?;
    tracing::info!(
        provider = provider.name(),
        symbols = symbols.len(),
        "fetching prices"
    );

    let mut chunks = 0;
    for (i, chunk) in symbols.chunks(settings.fetch_chunk_size.max(1)).enumerate() {
        let rows = provider.get_price_data(chunk, settings.start_date, settings.end_date)?;
        let path = settings.raw_dir.join(chunk_file_name("prices", i + 1));
        write_rows(&path, &rows)?;
        tracing::info!(chunk = i + 1, rows = rows.len(), file = %path.display(), "raw chunk written");
        chunks += 1;
    }

    let universe: Vec<UniverseRecord> = symbols
        .into_iter()
        .map(|symbol| UniverseRecord {
            symbol,
            in_universe: 1,
        })
        .collect();
    write_rows(&settings.raw_dir.join(UNIVERSE_FILE), &universe)?;

    eprintln!("Fetched {} chunks into {}", chunks, settings.raw_dir.display());
    Ok(chunks)
}

fn renamed(path: &Path, from: &str, to: &str) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().replacen(from, to, 1))
        .unwrap_or_default()
}

/// Sorts every raw chunk by (symbol, date) into the prepared directory.
pub fn run_prepare(settings: &PipelineSettings) -> Result<usize, MomentumError> {
    let chunks = list_chunks(&settings.raw_dir, "prices")?;
    if chunks.is_empty() {
        return Err(MomentumError::MissingInput {
            what: "raw price chunks".to_string(),
            path: settings.raw_dir.display().to_string(),
        });
    }
    tracing::info!(chunks = chunks.len(), "preparing raw chunks");

    for chunk in &chunks {
        let mut rows: Vec<PriceBar> = read_rows(chunk)?;
        rows.sort_by(|a, b| a.symbol.cmp(&b.symbol).then_with(|| a.date.cmp(&b.date)));

        let out = settings
            .prepared_dir
            .join(renamed(chunk, "prices_chunk", "prepared_chunk"));
        write_rows(&out, &rows)?;
        tracing::debug!(input = %chunk.display(), rows = rows.len(), "prepared chunk written");
    }

    let universe_src = settings.raw_dir.join(UNIVERSE_FILE);
    if universe_src.exists() {
        let universe: Vec<UniverseRecord> = read_rows(&universe_src)?;
        write_rows(&settings.prepared_dir.join(UNIVERSE_FILE), &universe)?;
    }

    eprintln!(
        "Prepared {} chunks into {}",
        chunks.len(),
        settings.prepared_dir.display()
    );
    Ok(chunks.len())
}

/// Scores every prepared chunk and writes one signal file per chunk.
pub fn run_signals(settings: &PipelineSettings) -> Result<usize, MomentumError> {
    let chunks = list_chunks(&settings.prepared_dir, "prepared")?;
    if chunks.is_empty() {
        return Err(MomentumError::MissingInput {
            what: "prepared chunks".to_string(),
            path: settings.prepared_dir.display().to_string(),
        });
    }
    tracing::info!(
        chunks = chunks.len(),
        formula = %settings.momentum.formula(),
        "computing momentum scores"
    );

    let signal_dir = settings.signal_dir();
    for chunk in &chunks {
        let bars: Vec<PriceBar> = read_rows(chunk)?;
        let scored = compute_scores(&bars, &settings.momentum);
        let out = signal_dir.join(renamed(chunk, "prepared_chunk", "signals_chunk"));
        write_scored(&out, &scored, settings.momentum.windows())?;
        tracing::debug!(input = %chunk.display(), rows = scored.len(), "signal chunk written");
    }

    eprintln!("Generated {} signal chunks in {}", chunks.len(), signal_dir.display());
    Ok(chunks.len())
}

/// Loads all signal files, runs the backtest and writes `nav.csv` and
/// `metrics.csv`.
pub fn run_backtest(settings: &PipelineSettings) -> Result<BacktestResult, MomentumError> {
    let signal_dir = settings.signal_dir();
    let chunks = list_chunks(&signal_dir, "signals")?;
    if chunks.is_empty() {
        return Err(MomentumError::MissingInput {
            what: "signal files".to_string(),
            path: signal_dir.display().to_string(),
        });
    }

    let mut observations = Vec::new();
    for chunk in &chunks {
        observations.extend(read_scored(chunk)?);
    }
    observations.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.symbol.cmp(&b.symbol)));
    tracing::info!(rows = observations.len(), files = chunks.len(), "signals loaded");

    let result = backtest_engine::run_backtest(&observations, &settings.backtest)?;

    write_rows(&settings.result_dir.join(NAV_FILE), &result.periods)?;
    write_rows(&settings.result_dir.join(METRICS_FILE), &result.metric_records())?;
    tracing::info!(
        periods = result.periods.len(),
        dir = %settings.result_dir.display(),
        "backtest outputs written"
    );
    Ok(result)
}

/// Renders the report from stored backtest outputs.
pub fn run_report(settings: &PipelineSettings) -> Result<PathBuf, MomentumError> {
    let nav_path = settings.result_dir.join(NAV_FILE);
    let metrics_path = settings.result_dir.join(METRICS_FILE);
    for path in [&nav_path, &metrics_path] {
        if !path.exists() {
            return Err(MomentumError::MissingInput {
                what: "backtest output".to_string(),
                path: path.display().to_string(),
            });
        }
    }

    let periods: Vec<PeriodRecord> = read_rows(&nav_path)?;
    let metrics: Vec<MetricRecord> = read_rows(&metrics_path)?;
    let summary = PerformanceSummary::from_records(&metrics);

    let input = ReportInput {
        title: &settings.title,
        periods: &periods,
        summary: &summary,
        backtest: &settings.backtest,
        momentum: &settings.momentum,
    };
    let report = MarkdownReportAdapter::new().write(&input, &settings.report_dir)?;

    eprintln!("Report written to: {}", report.display());
    Ok(report)
}

pub fn run_pipeline(settings: &PipelineSettings, provider: &dyn DataPort) -> Result<(), MomentumError> {
    run_fetch(settings, provider)?;
    run_prepare(settings)?;
    run_signals(settings)?;
    let result = run_backtest(settings)?;
    print_summary(&result.summary);
    run_report(settings)?;
    Ok(())
}

fn print_summary(summary: &PerformanceSummary) {
    eprintln!("\n=== Backtest Results ===");
    eprintln!("Total Return:     {:.2}%", summary.total_return * 100.0);
    eprintln!("Annualized:       {:.2}%", summary.annualized_return * 100.0);
    eprintln!("Volatility:       {:.2}%", summary.annualized_volatility * 100.0);
    eprintln!("Sharpe Ratio:     {:.4}", summary.sharpe);
    eprintln!("Max Drawdown:     {:.2}%", summary.max_drawdown * 100.0);
    eprintln!("Avg Turnover:     {:.2}%", summary.average_turnover * 100.0);
    eprintln!("Cost Ratio:       {:.2}%", summary.cost_ratio * 100.0);
    eprintln!("Periods:          {}", summary.total_periods);
}
