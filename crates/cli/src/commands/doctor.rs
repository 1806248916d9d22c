//! `tidewater doctor`: diagnose configuration and upstream services.

use tidewater_brokerage::{AlpacaClient, Brokerage};
use tidewater_config::AppConfig;
use tidewater_wallet::{CrossmintClient, Wallet};

pub async fn run() -> anyhow::Result<()> {
    println!("🩺 Tidewater Doctor");
    println!("===================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ⚠️  No config file, defaults in use. Run `tidewater init`.");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  Fix the config before running further checks.");
            return Ok(());
        }
    };

    let missing = config.missing_credentials();
    if missing.is_empty() {
        println!("  ✅ All credentials configured");
    }
    for name in &missing {
        println!("  ⚠️  No credentials for {name}");
        issues += 1;
    }

    let brokerage = AlpacaClient::new(&config.brokerage);
    if brokerage.is_configured() {
        match brokerage.account().await {
            Ok(account) => println!("  ✅ Brokerage reachable (account {}, {})", account.id, account.status),
            Err(e) => {
                println!("  ❌ Brokerage check failed: {e}");
                issues += 1;
            }
        }
    }

    let wallet = CrossmintClient::new(&config.wallet);
    if wallet.is_configured() {
        let balance = wallet.balance(wallet.farmer_wallet()).await;
        match balance.reason() {
            None => println!(
                "  ✅ Wallet reachable ({} USDC in {})",
                balance.data().usdc_balance,
                balance.data().wallet_id
            ),
            Some(reason) => {
                println!("  ❌ Wallet check failed: {reason}");
                issues += 1;
            }
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
