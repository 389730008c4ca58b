//! Core: configuration and application state

pub mod config;
pub mod state;

pub use config::Config;
pub use state::{AppState, Modules};

use crate::utils::logger;

/// Load `.env` and initialize logging from the resulting configuration
pub fn setup_environment() -> Config {
    // .env 不存在时忽略
    let _ = dotenv::dotenv();
    let config = Config::from_env();
    logger::init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    config
}
