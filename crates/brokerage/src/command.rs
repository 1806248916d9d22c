//! Plain-language trade commands ("buy 2 shares of tesla").

use regex::Regex;
use std::sync::LazyLock;

static BUY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bbuy\s+(\d+)\s+(?:shares?\s+of\s+)?([a-z][a-z0-9.]*)").unwrap()
});

/// Company names users tend to type instead of tickers.
const KNOWN_NAMES: &[(&str, &str)] = &[
    ("TESLA", "TSLA"),
    ("AMAZON", "AMZN"),
    ("APPLE", "AAPL"),
    ("MICROSOFT", "MSFT"),
    ("GOOGLE", "GOOGL"),
    ("META", "META"),
    ("NETFLIX", "NFLX"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeCommand {
    pub symbol: String,
    pub quantity: u32,
}

/// Recognise a buy command, resolving well-known company names to tickers.
pub fn parse_trade_command(text: &str) -> Option<TradeCommand> {
    let caps = BUY_RE.captures(text)?;
    let quantity: u32 = caps[1].parse().ok().filter(|q| *q > 0)?;
    let word = caps[2].to_uppercase();

    let symbol = KNOWN_NAMES
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, ticker)| (*ticker).to_string())
        .unwrap_or(word);

    Some(TradeCommand { symbol, quantity })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_name_maps_to_ticker() {
        let cmd = parse_trade_command("Please buy 1 share of Tesla").unwrap();
        assert_eq!(cmd.symbol, "TSLA");
        assert_eq!(cmd.quantity, 1);
    }

    #[test]
    fn ticker_passes_through() {
        let cmd = parse_trade_command("buy 10 awk").unwrap();
        assert_eq!(cmd.symbol, "AWK");
        assert_eq!(cmd.quantity, 10);
    }

    #[test]
    fn plural_shares() {
        let cmd = parse_trade_command("BUY 3 SHARES OF google").unwrap();
        assert_eq!(cmd.symbol, "GOOGL");
    }

    #[test]
    fn non_commands_are_ignored() {
        assert!(parse_trade_command("what is my balance?").is_none());
        assert!(parse_trade_command("buy some tesla").is_none());
        assert!(parse_trade_command("buy 0 tesla").is_none());
    }
}
