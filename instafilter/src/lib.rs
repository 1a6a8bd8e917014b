//! Instafilter
//!
//! Pick a photo, run it through one of ten filters with live slider values,
//! and share the result.
//!
//! # Architecture
//! - `config`: TOML configuration in the platform config directory, including
//!   the persisted filter change counter
//! - `cli`: command line entry points
//! - `logic`: concrete collaborators of the filter session, the interactive
//!   session loop and the one-shot batch mode

#[macro_use]
extern crate derivative;

pub mod cli;
pub mod config;
pub mod logic;

use clap::Parser;
use cli::{Cli, Command};

/// Initializes the logger.
///
/// Sets up a custom logger format with timestamp, log level, file name, line
/// number, and log message. `RUST_LOG` overrides the default level.
pub fn init_logger(verbose: bool) {
    use std::io::Write;

    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            let ts = chrono::Local::now().format("%H:%M:%S");

            writeln!(
                buf,
                "[{} {style}{}{style:#} {} {}] {}",
                ts,
                record.level(),
                record
                    .file()
                    .unwrap_or("None")
                    .split('/')
                    .next_back()
                    .unwrap_or("None"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}

/// Main entry point.
///
/// # Tasks
/// - Parses the command line
/// - Initializes the logger
/// - Loads configuration
/// - Runs the selected command
pub async fn desktop_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    log::debug!("start...");

    match cli.command.unwrap_or_default() {
        Command::Filters => cli::print_filters(),
        Command::Session => {
            let config = config::init(cli.config)?;
            let session = logic::build_session(&config);
            logic::session_loop::run(session).await?;
        }
        Command::Apply(args) => {
            let config = config::init(cli.config)?;
            logic::batch::apply(&config, args).await?;
        }
    }

    log::debug!("exit...");
    Ok(())
}
