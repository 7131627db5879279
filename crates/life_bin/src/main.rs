use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;

use life_launch::{DEFAULT_CONFIG_PATH, EntryMode, LaunchConfig, initialize_engine};

/// Desktop host for the lifeEngine launch shim.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Launch config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Library identifier, e.g. `LifeEngine` for libLifeEngine.so. Replaces any
    /// `library_path` from the config file
    #[arg(long, conflicts_with = "library_path")]
    library: Option<String>,
    /// Exact library path, bypasses the search
    #[arg(long)]
    library_path: Option<PathBuf>,
    /// Entry point symbol
    #[arg(long)]
    symbol: Option<String>,
    /// Directory searched before the platform default, may be repeated
    #[arg(long = "search-path")]
    search_paths: Vec<PathBuf>,
    /// Run the entry point on its own thread
    #[arg(long)]
    dedicated_thread: bool,
    /// Number of start transitions to deliver
    #[arg(long, default_value_t = 1)]
    starts: u32,
}

impl Args {
    fn launch_config(&self) -> anyhow::Result<LaunchConfig> {
        let mut config = LaunchConfig::load_or_default(&self.config)?;
        if let Some(library) = &self.library {
            config.library = library.clone();
            config.library_path = None;
        }
        if let Some(library_path) = &self.library_path {
            config.library_path = Some(library_path.clone());
        }
        if let Some(symbol) = &self.symbol {
            config.entry_symbol = symbol.clone();
        }
        config.search_paths.extend(self.search_paths.iter().cloned());
        if self.dedicated_thread {
            config.entry_mode = EntryMode::DedicatedThread;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = args.launch_config()?;
    info!("Launching with {:?}", config);
    let launcher = initialize_engine(&config).context("Failed to initialize the engine")?;

    for _ in 0..args.starts {
        if let Err(e) = launcher.on_start() {
            warn!("Start ignored: {}", e);
        }
    }
    launcher.join();
    info!("Delivered {} starts", launcher.starts());
    Ok(())
}
