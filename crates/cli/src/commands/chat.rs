//! `tidewater chat`: one message, one reply.

use super::load_config;
use anyhow::bail;
use tidewater_config::AppConfig;
use tidewater_gateway::GatewayState;

pub async fn run(message: &str, simple: bool, page: Option<&str>) -> anyhow::Result<()> {
    let config = load_config()?;

    // The keyword assistant can still place orders without a model.
    if !simple && config.assistant.api_key.is_none() {
        eprintln!();
        eprintln!("  ERROR: No Anthropic API key configured!");
        eprintln!();
        eprintln!("  Set ANTHROPIC_API_KEY, or add api_key under [assistant] in:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        eprintln!("  Or retry with --simple for keyword commands only.");
        eprintln!();
        bail!("No API key found. See above for setup instructions.");
    }

    let state = GatewayState::from_config(config);

    if simple {
        println!("{}", state.simple.respond(message).await);
        return Ok(());
    }

    let reply = state.assistant.respond(message, page).await?;
    println!("{}", reply.text);
    if reply.tools_used > 0 {
        eprintln!("\n  ({} tool call(s))", reply.tools_used);
    }

    Ok(())
}
