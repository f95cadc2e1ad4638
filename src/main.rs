mod app;
mod config;
mod market;
mod util;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::BubbleConfig;
use crate::market::{CoinGeckoSource, DEFAULT_MARKETS_URL, JsonFileSource, MarketSource};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    Coingecko,
    File,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Where market data comes from.
    #[arg(long, value_enum, default_value_t = SourceKind::Coingecko)]
    source: SourceKind,

    /// JSON array in the markets endpoint shape, read on every poll.
    #[arg(long, required_if_eq("source", "file"))]
    file: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_MARKETS_URL)]
    api_url: String,

    #[arg(long, default_value = "usd")]
    vs_currency: String,

    #[arg(long, default_value_t = 2)]
    pages: u32,

    #[arg(long, default_value_t = 250)]
    per_page: u32,

    /// TOML file overriding layout and polling constants.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the initial bubble placement; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    poll_secs: Option<u64>,

    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::ERROR
        } else if self.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        }
    }

    fn load_config(&self) -> Result<BubbleConfig> {
        let mut config = match &self.config {
            Some(path) => BubbleConfig::load(path)?,
            None => BubbleConfig::default(),
        };
        if let Some(poll_secs) = self.poll_secs {
            config.poll_interval_secs = poll_secs;
            config = config.sanitized();
        }
        Ok(config)
    }

    fn market_source(&self) -> Result<Arc<dyn MarketSource>> {
        let source: Arc<dyn MarketSource> = match self.source {
            SourceKind::Coingecko => Arc::new(CoinGeckoSource::new(
                self.api_url.clone(),
                self.vs_currency.clone(),
                self.pages,
                self.per_page,
            )?),
            SourceKind::File => {
                let path = self
                    .file
                    .clone()
                    .context("--file is required with --source file")?;
                Arc::new(JsonFileSource::new(path))
            }
        };
        Ok(source)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(args.log_level().into())
                .from_env_lossy(),
        )
        .with_target(false)
        .init();

    let config = args.load_config()?;
    let source = args.market_source()?;
    info!(
        source = %source.describe(),
        poll_secs = config.poll_interval_secs,
        seed = ?args.seed,
        "starting market map"
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };
    let seed = args.seed;

    eframe::run_native(
        "Crypto Market Map",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::MarketBubblesApp::new(
                cc, source, config, seed,
            )))
        }),
    )
    .map_err(|error| anyhow!("failed to open the market map window: {error}"))
}
