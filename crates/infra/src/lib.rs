pub mod config;
pub mod dispatch;
pub mod logging;
pub mod repositories;
