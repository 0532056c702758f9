use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};

use onboard_views::clock::{Clock, FixedClock, SystemClock};
use onboard_views::config::EngineConfig;
use onboard_views::error::ConfigError;
use onboard_views::service::ViewService;
use onboard_views::snapshot::JsonFileProvider;
use onboard_views::views::ViewRequest;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries only the rendered view.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let snapshot_path = std::env::var("ONBOARD_SNAPSHOT_PATH")
        .map_err(|_| ConfigError::MissingEnvVar("ONBOARD_SNAPSHOT_PATH".into()))?;

    let role = std::env::var("ONBOARD_ROLE").unwrap_or_else(|_| "hr".to_string());
    let requester = match std::env::var("ONBOARD_REQUESTER") {
        Ok(id) => id,
        Err(_) if role.eq_ignore_ascii_case("hr") => String::new(),
        Err(_) => return Err(ConfigError::MissingEnvVar("ONBOARD_REQUESTER".into()).into()),
    };
    let request = ViewRequest::parse(&role, requester)?;

    let clock: Arc<dyn Clock> = match std::env::var("ONBOARD_NOW") {
        Ok(raw) => {
            let now = DateTime::parse_from_rfc3339(raw.trim())
                .map_err(|e| ConfigError::InvalidValue {
                    key: "ONBOARD_NOW".into(),
                    message: format!("{raw:?}: {e}"),
                })?
                .with_timezone(&Utc);
            Arc::new(FixedClock(now))
        }
        Err(_) => Arc::new(SystemClock),
    };

    let config = EngineConfig::from_env()?;

    tracing::info!(
        snapshot = %snapshot_path,
        role = %request.role,
        requester = %request.requester_id,
        "Building onboarding view"
    );

    let service = ViewService::new(Arc::new(JsonFileProvider::new(&snapshot_path)), clock, config);
    let view = service.view(request).await?;

    let rendered = serde_json::to_string_pretty(&view).context("Failed to render view as JSON")?;
    println!("{rendered}");

    Ok(())
}
