#![forbid(unsafe_code)]
//! TVM gateway server binary.
//!
//! Loads configuration, wires the connector, keystore and operation registry
//! into a dispatcher, and serves the REST API.

use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tvm_gateway::api::{run_api_server, GatewayNode};
use tvm_gateway::client::{HttpNodeConnector, NodeEndpoints};
use tvm_gateway::config::load_config;
use tvm_gateway::dispatch::GatewayDispatcher;
use tvm_gateway::keystore::KeyStore;
use tvm_gateway::operations::default_registry;

#[derive(Parser)]
#[command(name = "tvm-gateway", about = "Stateless HTTP gateway to a TVM blockchain node")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Override the API port from the configuration
    #[arg(long)]
    port: Option<u16>,

    /// Override the network preset (dev, test or main)
    #[arg(long)]
    network: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt::init();

    let config = load_config(&cli.config)?;
    let network = cli.network.unwrap_or(config.network.network);
    let port = cli.port.unwrap_or(config.api.port);

    let endpoints = if config.network.endpoints.is_empty() {
        NodeEndpoints::for_network(&network)?
    } else {
        NodeEndpoints::new(
            config.network.endpoints.clone(),
            config.network.access_key.clone(),
        )
    };
    info!(network = %network, endpoints = ?endpoints.base_urls, "resolved node endpoints");

    let keys = if config.keys.signing.is_empty() && config.keys.cipher.is_empty() {
        warn!("no key material configured, generating ephemeral default keys");
        KeyStore::ephemeral()
    } else {
        KeyStore::from_hex_maps(&config.keys.signing, &config.keys.cipher)?
    };

    let registry = Arc::new(default_registry(Arc::new(keys)));
    let connector = Arc::new(HttpNodeConnector::new(endpoints));
    let dispatcher = Arc::new(GatewayDispatcher::new(connector, registry));
    let node = Arc::new(GatewayNode::new(dispatcher));

    run_api_server(node, port).await
}
