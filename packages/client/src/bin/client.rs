//! Studyhall terminal chat client.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin studyhall-client -- --token alice-token --room general
//! ```

use clap::Parser;

use studyhall_client::{ClientConfig, run_client};
use studyhall_shared::logger::setup_logger;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = ClientConfig::parse();
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    if let Err(e) = run_client(config).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
