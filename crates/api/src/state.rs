use std::sync::Arc;

use alumni_domain::ports::alumni::AlumniRepository;
use alumni_domain::ports::notify::NotificationDispatcher;
use alumni_infra::config::AppConfig;
use alumni_infra::dispatch::{LogMailer, RetryingDispatcher};
use alumni_infra::repositories::InMemoryAlumniRepository;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub alumni_repo: Arc<dyn AlumniRepository>,
    pub dispatcher: Arc<dyn NotificationDispatcher>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let mailer = Arc::new(LogMailer);
        let dispatcher = Arc::new(RetryingDispatcher::from_config(&config, mailer));
        Self {
            config,
            alumni_repo: Arc::new(InMemoryAlumniRepository::new()),
            dispatcher,
        }
    }

    #[allow(dead_code)]
    pub fn with_parts(
        config: AppConfig,
        alumni_repo: Arc<dyn AlumniRepository>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            config,
            alumni_repo,
            dispatcher,
        }
    }
}
