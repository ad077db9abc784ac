use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::AppConfig;

/// Structured JSON logs in production, compact human-readable lines
/// everywhere else. A malformed directive falls back to info with the noisy
/// HTTP layers quieted.
pub fn init_tracing(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=warn"));

    let builder = fmt().with_env_filter(filter).with_target(false);
    if config.is_production() {
        builder.json().init();
    } else {
        builder.compact().init();
    }

    Ok(())
}
