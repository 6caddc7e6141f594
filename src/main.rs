use anyhow::Result;
use audial_auth::{config::Config, server, telemetry};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let metrics_handle = telemetry::init(&config.telemetry)?;

    info!(
        run_mode = ?config.run_mode,
        response_shape = config.response_shape.as_str(),
        "Starting Audial Auth"
    );

    server::run(config, metrics_handle).await
}
