//! `tidewater gateway`: start the HTTP API server.

use super::load_config;

pub async fn run(port_override: Option<u16>) -> anyhow::Result<()> {
    let mut config = load_config()?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🌊 Tidewater Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Dashboard origin: {}", config.gateway.allowed_origin);

    tidewater_gateway::start(config)
        .await
        .map_err(|e| anyhow::anyhow!("Gateway stopped: {e}"))?;

    Ok(())
}
