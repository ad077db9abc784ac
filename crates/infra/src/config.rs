use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_env: String,
    pub port: u16,
    pub log_level: String,
    pub jwt_secret: String,
    /// Base URL the verification link in outbound mail points at.
    pub verify_base_url: String,
    pub notify_from: String,
    pub notify_max_attempts: u32,
    pub notify_backoff_base_ms: u64,
    pub notify_backoff_max_ms: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let cfg = config::Config::builder()
            .set_default("app_env", "development")?
            .set_default("port", 3000)?
            .set_default("log_level", "info")?
            .set_default("jwt_secret", "dev-secret")?
            .set_default("verify_base_url", "http://127.0.0.1:3000/v1/alumni/verify")?
            .set_default("notify_from", "alumni@school.example")?
            .set_default("notify_max_attempts", 5)?
            .set_default("notify_backoff_base_ms", 1000)?
            .set_default("notify_backoff_max_ms", 60000)?
            .add_source(config::Environment::default().separator("__"))
            .build()?;
        cfg.try_deserialize()
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }
}
