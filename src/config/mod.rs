//! Client configuration

use clap::Args;

pub mod backend;
pub mod display;
pub mod logging;

pub use backend::BackendConfig;
pub use display::{CurrencyCode, DisplayConfig};
pub use logging::{LogFormat, LoggingConfig};

/// Till client configuration, read from CLI arguments with environment fallbacks.
#[derive(Debug, Args)]
pub struct Config {
    /// Backend connection settings.
    #[command(flatten)]
    pub backend: BackendConfig,

    /// Operator credentials.
    #[command(flatten)]
    pub credentials: CredentialsConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Display settings.
    #[command(flatten)]
    pub display: DisplayConfig,
}

/// Operator credentials used to open a session.
#[derive(Debug, Args)]
pub struct CredentialsConfig {
    /// Operator user name
    #[arg(short, long, env = "TILL_USERNAME", global = true)]
    pub username: Option<String>,

    /// Operator password
    #[arg(long, env = "TILL_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,
}

/// Load a `.env` file from the working directory, if there is one.
pub fn load_dotenv() {
    // Missing .env files are fine; values may come from the real environment.
    _ = dotenvy::dotenv();
}
