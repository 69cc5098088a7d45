pub mod aggregator;
pub mod config;
pub mod errors;
mod http;
pub mod metrics_defs;
pub mod names;
pub mod service;
pub mod summary;
pub mod types;
pub mod upstream;

#[cfg(test)]
mod testutils;

use aggregator::Aggregator;
use errors::GatewayError;
use metrics_defs::ALL_METRICS;
use service::GatewayService;
use shared::admin_service::AdminService;
use shared::http::run_http_service;
use shared::metrics_defs::describe_all;
use upstream::UpstreamClient;

/// Serves the gateway and admin listeners until either fails.
pub async fn run(config: config::Config) -> Result<(), GatewayError> {
    config.validate()?;
    describe_all(ALL_METRICS);

    let client = UpstreamClient::new(&config.upstream)?;
    let gateway_service = GatewayService::new(&config.access_key, Aggregator::new(client));

    tracing::info!(
        upstream = ?config.upstream.base_url.as_ref().map(|u| u.as_str()),
        "Starting ticket gateway"
    );

    let gateway_task = run_http_service::<_, _, GatewayError>(
        &config.listener.host,
        config.listener.port,
        gateway_service,
    );
    let admin_task = run_http_service::<_, _, GatewayError>(
        &config.admin_listener.host,
        config.admin_listener.port,
        AdminService::new(|| true),
    );

    tokio::try_join!(gateway_task, admin_task)?;
    Ok(())
}
