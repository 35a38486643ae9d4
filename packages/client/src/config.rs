//! Client configuration.

use clap::Parser;

/// Terminal chat client for Studyhall
#[derive(Debug, Clone, Parser)]
#[command(name = "studyhall-client", version, about)]
pub struct ClientConfig {
    /// Server base URL
    #[arg(
        short,
        long,
        env = "STUDYHALL_SERVER",
        default_value = "http://127.0.0.1:8080"
    )]
    pub server: String,

    /// Bearer access token issued by the server
    #[arg(short, long, env = "STUDYHALL_TOKEN")]
    pub token: String,

    /// Room to join on start-up
    #[arg(short, long)]
    pub room: Option<String>,

    /// Default log level for this binary (overridden by RUST_LOG)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl ClientConfig {
    /// Server base URL without a trailing slash
    pub fn server_url(&self) -> &str {
        self.server.trim_end_matches('/')
    }
}
