mod commands;

use clap::{Parser, Subcommand};
use locgate_core::{GateConfig, Timezone};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "locgate", version, about = "30-day access gate")]
struct Cli {
    /// Path to a TOML config file (defaults to $LOCGATE_CONFIG, then ./locgate.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Access log JSON document
    #[arg(long, global = true, env = "LOCGATE_DATA_FILE")]
    data_file: Option<PathBuf>,

    /// Zone used for calendar dates: UTC or a fixed offset such as +02:00
    #[arg(long, global = true, env = "LOCGATE_TIMEZONE")]
    timezone: Option<Timezone>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the gate over HTTP until interrupted.
    Serve {
        /// Bind address, e.g. 0.0.0.0:8080
        #[arg(long, env = "LOCGATE_BIND")]
        bind: Option<String>,
    },

    /// Print the access status of an identity.
    Check { identity: String },

    /// Record a payment for an identity, dated today.
    Log {
        identity: String,

        /// Transaction reference to store with the payment
        #[arg(long)]
        tx_hash: Option<String>,
    },
}

impl Cli {
    /// Load the config file and apply command-line overrides.
    fn resolve_config(&self) -> anyhow::Result<GateConfig> {
        let mut config = GateConfig::load(self.config.as_deref())?;

        if let Some(path) = &self.data_file {
            config.storage.path = path.clone();
        }
        if let Some(timezone) = self.timezone {
            config.policy.timezone = timezone;
        }
        if let Command::Serve {
            bind: Some(bind), ..
        } = &self.cmd
        {
            config.server.bind = bind.clone();
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout only carries status documents.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    match cli.cmd {
        Command::Serve { .. } => commands::serve::run(&config).await?,
        Command::Check { identity } => commands::check::run(&config, &identity)?,
        Command::Log { identity, tx_hash } => {
            commands::log::run(&config, &identity, tx_hash)?
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::parse_from([
            "locgate",
            "--config",
            "/nonexistent/locgate.toml",
            "serve",
            "--bind",
            "127.0.0.1:9999",
        ]);
        // Explicit config path that does not exist is an error.
        assert!(cli.resolve_config().is_err());

        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("locgate.toml");
        std::fs::write(&config_path, "[policy]\ntimezone = \"UTC\"\n").unwrap();

        let cli = Cli::parse_from([
            "locgate",
            "--config",
            config_path.to_str().unwrap(),
            "--data-file",
            "/tmp/gate.json",
            "--timezone",
            "+03:00",
            "serve",
            "--bind",
            "127.0.0.1:9999",
        ]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9999");
        assert_eq!(config.storage.path, PathBuf::from("/tmp/gate.json"));
        assert_eq!(config.policy.offset().local_minus_utc(), 3 * 3600);
    }

    #[test]
    fn test_log_subcommand_parses_tx_hash() {
        let cli = Cli::parse_from(["locgate", "log", "alice", "--tx-hash", "0xabc"]);
        match cli.cmd {
            Command::Log { identity, tx_hash } => {
                assert_eq!(identity, "alice");
                assert_eq!(tx_hash.as_deref(), Some("0xabc"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
