mod config;
mod observability;

use clap::{Args, Parser};
use config::{Config, ConfigError};
use observability::ObservabilityError;
use std::path::PathBuf;
use ticket_gateway::errors::GatewayError;

#[derive(Parser)]
#[command(name = "deskbridge", about = "Helpdesk ticket gateway")]
enum CliCommand {
    /// Serve the ticket and summary endpoints
    Gateway(ConfigArgs),
    /// Load and validate the configuration, then exit
    CheckConfig(ConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    /// YAML config file. FRESHDESK_DOMAIN, FRESHDESK_API_KEY and API_ACCESS_KEY override it.
    #[arg(long)]
    config_file: Option<PathBuf>,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Observability(#[from] ObservabilityError),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

fn main() -> Result<(), CliError> {
    let cli = CliCommand::parse();

    match cli {
        CliCommand::Gateway(args) => {
            let config = Config::load(args.config_file.as_deref())?;
            let _sentry = observability::init_logging(&config.logging);
            if let Some(metrics) = &config.metrics {
                observability::init_metrics(metrics)?;
            }

            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            if let Err(e) = rt.block_on(ticket_gateway::run(config.gateway)) {
                tracing::error!(error = %e, "Gateway stopped");
                return Err(e.into());
            }
        }
        CliCommand::CheckConfig(args) => {
            let config = Config::load(args.config_file.as_deref())?;
            println!(
                "Configuration OK: listening on {}:{}, upstream {}",
                config.gateway.listener.host,
                config.gateway.listener.port,
                config
                    .gateway
                    .upstream
                    .base_url
                    .as_ref()
                    .map_or("-", |u| u.as_str())
            );
        }
    }

    Ok(())
}
