//! Room-based WebSocket chat server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin parlor-server
//! cargo run --bin parlor-server -- --host 0.0.0.0 --port 3000 --admin root --room random
//! ```

use clap::Parser;
use parlor_server::{
    config::{Args, ServerConfig},
    ui::Server,
};
use parlor_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();
    let config = match ServerConfig::try_from(args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    let (host, port) = (config.host.clone(), config.port);

    let server = match Server::build(config).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Startup error: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = server.run(host, port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
