//! Backend Config

use clap::Args;

/// Where and how to reach the point-of-sale backend.
#[derive(Debug, Clone, Args)]
pub struct BackendConfig {
    /// Base URL of the backend JSON API
    #[arg(
        long,
        env = "TILL_API_URL",
        default_value = "http://127.0.0.1:5000/api",
        global = true
    )]
    pub api_url: String,

    /// Request timeout in seconds; transport default when unset
    #[arg(long, env = "TILL_TIMEOUT_SECONDS", global = true)]
    pub timeout_seconds: Option<u64>,
}
