//! Headroom CLI — on-demand watchlist screen.
//!
//! Commands:
//! - `run` — fetch history for every watchlist ticker, analyze the latest
//!   bar and print one card per ticker
//! - `config` — print the effective configuration as TOML

mod report;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use headroom_core::commentary::{CommentaryProvider, GeminiClient};
use headroom_core::data::{
    CsvProvider, DataError, DataProvider, FixedRate, RateProvider, SyntheticProvider, YahooProvider,
};
use headroom_core::{ScreenerConfig, Screener};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "headroom",
    version,
    about = "Headroom — trend, upside room and position size for a watchlist"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one screen over the watchlist.
    Run {
        #[command(flatten)]
        overrides: Overrides,

        /// Gemini API key. Defaults to the GEMINI_API_KEY environment variable.
        #[arg(long)]
        api_key: Option<String>,

        /// Read <SYMBOL>.csv files from this directory instead of the network.
        #[arg(long, conflicts_with = "synthetic")]
        csv_dir: Option<PathBuf>,

        /// Use deterministic synthetic prices instead of the network.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Use a fixed FX rate instead of fetching one.
        #[arg(long, value_parser = parse_positive)]
        fx_rate: Option<f64>,
    },
    /// Print the effective configuration as TOML.
    Config {
        #[command(flatten)]
        overrides: Overrides,
    },
}

/// Settings that override the config file.
#[derive(Args)]
struct Overrides {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Account capital in account currency.
    #[arg(long, value_parser = parse_positive)]
    capital: Option<f64>,

    /// Risk per position, in percent of capital (1.0 to 10.0).
    #[arg(long, value_parser = parse_risk_pct)]
    risk_pct: Option<f64>,

    /// Stop distance in ATR multiples (1.0 to 3.0).
    #[arg(long, value_parser = parse_atr_multiplier)]
    atr_multiplier: Option<f64>,

    /// Skip AI commentary even when an API key is available.
    #[arg(long, default_value_t = false)]
    no_commentary: bool,
}

impl Overrides {
    fn load(&self) -> Result<ScreenerConfig> {
        let mut config = match &self.config {
            Some(path) => ScreenerConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ScreenerConfig::default(),
        };
        if let Some(capital) = self.capital {
            config.account.initial_capital = capital;
        }
        if let Some(pct) = self.risk_pct {
            config.account.risk_tolerance = pct / 100.0;
        }
        if let Some(mult) = self.atr_multiplier {
            config.account.atr_multiplier = mult;
        }
        if self.no_commentary {
            config.commentary.enabled = false;
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse_positive(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(format!("must be a positive number, got {v}"))
    }
}

fn parse_in_range(s: &str, min: f64, max: f64) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if (min..=max).contains(&v) {
        Ok(v)
    } else {
        Err(format!("must be between {min:.1} and {max:.1}, got {v}"))
    }
}

fn parse_risk_pct(s: &str) -> Result<f64, String> {
    parse_in_range(s, 1.0, 10.0)
}

fn parse_atr_multiplier(s: &str) -> Result<f64, String> {
    parse_in_range(s, 1.0, 3.0)
}

/// Stands in for the FX source when running without network access.
struct Offline;

impl RateProvider for Offline {
    fn latest_rate(&self, _pair: &str) -> Result<f64, DataError> {
        Err(DataError::NetworkUnreachable("offline mode".into()))
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Commands::Run {
            overrides,
            api_key,
            csv_dir,
            synthetic,
            fx_rate,
        } => run_screen(&overrides, api_key, csv_dir, synthetic, fx_rate),
        Commands::Config { overrides } => {
            let config = overrides.load()?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) -> Result<()> {
    let default = match verbose {
        0 => "warn",
        1 => "headroom=info,headroom_core=info",
        _ => "headroom=debug,headroom_core=debug",
    };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default)?,
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter.add_directive("reqwest=warn".parse()?))
        .init();
    Ok(())
}

fn run_screen(
    overrides: &Overrides,
    api_key: Option<String>,
    csv_dir: Option<PathBuf>,
    synthetic: bool,
    fx_rate: Option<f64>,
) -> Result<()> {
    let config = overrides.load()?;
    let offline = synthetic || csv_dir.is_some();

    let data: Box<dyn DataProvider> = if let Some(dir) = csv_dir {
        Box::new(CsvProvider::new(dir))
    } else if synthetic {
        Box::new(SyntheticProvider::new(chrono::Local::now().date_naive()))
    } else {
        Box::new(YahooProvider::new().context("building HTTP client")?)
    };

    let rates: Box<dyn RateProvider> = match fx_rate {
        Some(rate) => Box::new(FixedRate(rate)),
        None if offline => Box::new(Offline),
        None => Box::new(YahooProvider::new().context("building HTTP client")?),
    };

    let api_key = api_key
        .or_else(|| std::env::var("GEMINI_API_KEY").ok())
        .filter(|k| !k.trim().is_empty());
    let gemini = match api_key {
        Some(key) if config.commentary.enabled => Some(GeminiClient::new(key)?),
        _ => None,
    };
    let commentary = gemini.as_ref().map(|g| g as &dyn CommentaryProvider);
    debug!(
        provider = data.name(),
        commentary = commentary.is_some(),
        "providers selected"
    );

    let screener = Screener::new(config, data.as_ref(), rates.as_ref(), commentary)?;
    let result = screener.run();
    info!(
        tickers = result.tickers.len(),
        failures = result.failures(),
        "screen finished"
    );

    report::print_report(&result, screener.config(), data.name());
    Ok(())
}
