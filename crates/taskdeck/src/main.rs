//! CLI entry point for taskdeck.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use taskdeck_app::{BASE_URL_ENV, ClientConfig, TaskStore};
use taskdeck_gateway::HttpGateway;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;

/// Manage tasks on a remote task service.
#[derive(Parser, Debug)]
#[command(name = "taskdeck", version, about = "taskdeck: a client for the task list service")]
struct Cli {
    /// Service root, e.g. `http://localhost:3000` (overrides env and config).
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Config file (defaults to the user config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tasks, incomplete first.
    Ls {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Create a task.
    Add {
        /// Task description.
        description: String,
    },

    /// Flip a task between complete and incomplete.
    Toggle {
        /// Task id.
        id: String,
    },

    /// Replace a task's description.
    Edit {
        /// Task id.
        id: String,
        /// New description.
        description: String,
    },

    /// Delete tasks in list order, stopping at the first failure.
    Rm {
        /// Task ids.
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Preview moving a task onto another's position (not saved).
    Move {
        /// Task to move.
        id: String,
        /// Task whose position it takes.
        over: String,
    },
}

fn main() -> Result<()> {
    let Cli {
        base_url,
        config,
        cmd,
    } = Cli::parse();
    install_tracing();

    let config = ClientConfig::load(config.as_deref())?
        .with_env_override(std::env::var(BASE_URL_ENV).ok())
        .with_base_url_override(base_url);
    let base_url = config.base_url()?;
    tracing::debug!(%base_url, "using task service");

    let store = TaskStore::new(HttpGateway::new(base_url.as_str())?);
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(commands::run(cmd, &store, &mut std::io::stdout().lock()))
}

fn install_tracing() {
    // RUST_LOG overrides the default level; stdout is reserved for output.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ls_with_global_flags() {
        let cli = Cli::parse_from([
            "taskdeck",
            "ls",
            "--json",
            "--base-url",
            "http://tasks.local/api",
        ]);

        assert_eq!(cli.base_url.as_deref(), Some("http://tasks.local/api"));
        assert!(matches!(cli.cmd, Command::Ls { json: true }));
    }

    #[test]
    fn parse_edit_command() {
        let cli = Cli::parse_from(["taskdeck", "edit", "42", "walk the dog"]);

        match cli.cmd {
            Command::Edit { id, description } => {
                assert_eq!(id, "42");
                assert_eq!(description, "walk the dog");
            }
            _ => panic!("expected edit command"),
        }
    }

    #[test]
    fn parse_rm_requires_ids() {
        assert!(Cli::try_parse_from(["taskdeck", "rm"]).is_err());

        let cli = Cli::parse_from(["taskdeck", "--config", "/tmp/c.toml", "rm", "a", "b"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        match cli.cmd {
            Command::Rm { ids } => assert_eq!(ids, ["a", "b"]),
            _ => panic!("expected rm command"),
        }
    }

    #[test]
    fn parse_move_command() {
        let cli = Cli::parse_from(["taskdeck", "move", "a", "c"]);
        assert!(matches!(cli.cmd, Command::Move { id, over } if id == "a" && over == "c"));
    }
}
