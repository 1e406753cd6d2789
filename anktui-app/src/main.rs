mod cli;
mod config;
mod logging;
mod tui;

use anyhow::{Context, Result};
use clap::Parser; // needed for Cli::parse()
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::info;

use anktui_core::{Clock, DeckStore, SystemClock};
use anktui_json::{paths, JsonStore};
use cli::commands::{config_cmd, run_cli, CliContext};
use cli::opts::{Cli, Command};
use config::Config;
use tui::app::TuiApp;

fn main() -> Result<()> {
    let args = Cli::parse();

    let config_path = args.config.clone().unwrap_or_else(paths::default_config_file);
    let mut config = Config::load(&config_path)?;
    if let Some(dir) = &args.data_dir {
        config.data_directory = dir.to_string_lossy().into_owned();
    }

    // config subcommands work even when the file holds invalid values
    if let Some(Command::Config(cmd)) = &args.cmd {
        return config_cmd(cmd.clone(), &config, &config_path);
    }

    config
        .validate()
        .with_context(|| format!("invalid configuration in {}", config_path.display()))?;
    let data_dir = config.prepare_data_dir()?;
    let _guard = logging::init(&data_dir, args.debug)?;
    info!(data_dir = %data_dir.display(), "starting anktui");

    let store: Arc<dyn DeckStore> = Arc::new(JsonStore::open(data_dir, config.backup_policy())?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    match args.cmd {
        // TUI owns the runtime and spawns saves onto it
        None | Some(Command::Tui) => {
            let rt = Arc::new(Runtime::new()?);
            let mut app = TuiApp::new(store, clock, config, rt);
            app.run()
        }
        Some(cmd) => {
            let rt = Runtime::new()?;
            let ctx = CliContext { store, clock, config };
            rt.block_on(run_cli(cmd, &ctx))
        }
    }
}
