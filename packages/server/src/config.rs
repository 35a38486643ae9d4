//! Server configuration (command line and environment).

use clap::Parser;

/// Studyhall chat server
#[derive(Debug, Clone, Parser)]
#[command(name = "studyhall-server", version, about)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "STUDYHALL_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "STUDYHALL_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Log level for this crate when RUST_LOG is unset
    #[arg(long, env = "STUDYHALL_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Seed rooms only, without the demo accounts
    #[arg(long, env = "STUDYHALL_NO_DEMO_ACCOUNTS")]
    pub no_demo_accounts: bool,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
