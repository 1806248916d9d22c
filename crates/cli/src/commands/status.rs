//! `tidewater status`: show the effective configuration.

use super::load_config;
use tidewater_config::AppConfig;

fn configured(set: bool) -> &'static str {
    if set { "set" } else { "missing" }
}

pub fn run() -> anyhow::Result<()> {
    let config = load_config()?;

    println!("🌊 Tidewater Status");
    println!("===================");
    println!("  Config dir:     {}", AppConfig::config_dir().display());
    println!("  Model:          {}", config.assistant.model);
    println!("  Temperature:    {}", config.assistant.temperature);
    println!("  Max tokens:     {}", config.assistant.max_tokens);
    println!("  Tool rounds:    {}", config.assistant.max_tool_iterations);
    println!("  Trading API:    {}", config.brokerage.trading_url);
    println!("  Market data:    {}", config.brokerage.data_url);
    println!("  Wallet API:     {}", config.wallet.base_url);
    println!("  Chain / token:  {}:{}", config.wallet.chain, config.wallet.token);
    println!("  Farmer wallet:  {}", config.wallet.farmer_wallet);
    println!("  Drought rule:   index > {} ({})", config.subsidy.drought_threshold, config.subsidy.default_region);
    println!("  Gateway:        {}:{}", config.gateway.host, config.gateway.port);
    println!();
    println!("  Anthropic key:  {}", configured(config.assistant.api_key.is_some()));
    println!(
        "  Alpaca keys:    {}",
        configured(config.brokerage.api_key.is_some() && config.brokerage.secret_key.is_some())
    );
    println!("  Crossmint key:  {}", configured(config.wallet.api_key.is_some()));

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file, defaults in use. Run `tidewater init` to write one.");
    }

    Ok(())
}
