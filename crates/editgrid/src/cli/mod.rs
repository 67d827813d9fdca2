//! # CLI Layer
//!
//! This module is **one possible host** for the grid engine, not the engine itself.
//!
//! The CLI layer is the **only** place in the workspace that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Installs a `tracing` subscriber
//! - Handles argument parsing
//! - Decides where the session directory and config file live
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: shell arguments to typed commands via clap (`setup`)
//! 2. **Context Setup**: logging, config and session directory (`run`)
//! 3. **Dispatch**: route commands to handlers (`commands`)
//! 4. **Output Formatting**: paint layouts and cells (`render`)
//!
//! ## Sessions
//!
//! View state is session-scoped. The session directory is, in order:
//! `--session-dir`, `EDITGRID_SESSION_DIR`, the user's runtime directory
//! (cleared at logout on most systems), or a directory under the system temp dir.
//!
//! ## Logging
//!
//! Diagnostics go to stderr. `EDITGRID_LOG` takes an `EnvFilter` directive
//! (default `warn`); `--verbose` forces `debug`.

mod commands;
mod document;
mod render;
pub mod setup;

use anyhow::Result;
use clap::Parser;
use commands::{AppContext, ShowArgs};
use directories::ProjectDirs;
use editgrid_core::config::GridConfig;
use setup::{Cli, Commands, StateCommands};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "EDITGRID_LOG";
const SESSION_DIR_ENV: &str = "EDITGRID_SESSION_DIR";
const CONFIG_FILE: &str = "editgrid.toml";

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = create_context(&cli)?;
    tracing::debug!(session_dir = %ctx.session_dir.display(), "session");

    match cli.command {
        Commands::Show {
            doc,
            view,
            width,
            expand,
            select,
            page,
        } => commands::show(
            &ctx,
            &doc,
            ShowArgs {
                view,
                width,
                expand,
                select,
                page,
            },
        ),
        Commands::Export { doc, view, format } => commands::export(&ctx, &doc, &view, format),
        Commands::Edit { doc, row, set } => commands::edit(&ctx, &doc, &row, &set),
        Commands::Add { doc, set } => commands::add(&ctx, &doc, &set),
        Commands::Delete { doc, rows } => commands::delete(&ctx, &doc, &rows),
        Commands::State { action } => match action {
            StateCommands::Show { doc } => commands::state_show(&ctx, &doc),
            StateCommands::Clear { doc } => commands::state_clear(&ctx, doc.as_deref()),
        },
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn create_context(cli: &Cli) -> Result<AppContext> {
    let dirs = ProjectDirs::from("", "", "editgrid");

    if let Some(path) = &cli.config {
        if !path.exists() {
            anyhow::bail!("config file not found: {}", path.display());
        }
    }

    let config_path = cli.config.clone().or_else(|| {
        dirs.as_ref()
            .map(|d| d.config_dir().join(CONFIG_FILE))
    });
    let config = GridConfig::load(config_path.as_deref())?;

    let session_dir = cli
        .session_dir
        .clone()
        .or_else(|| std::env::var_os(SESSION_DIR_ENV).map(PathBuf::from))
        .or_else(|| {
            dirs.as_ref()
                .and_then(|d| d.runtime_dir().map(|r| r.join("session")))
        })
        .unwrap_or_else(|| std::env::temp_dir().join("editgrid-session"));

    Ok(AppContext {
        session_dir,
        config,
    })
}
