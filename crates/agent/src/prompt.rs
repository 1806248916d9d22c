//! System prompt assembly.

/// Fixed instruction block placed ahead of the rendered context.
pub const CAPABILITIES: &str = "\
You are Farmer Ted's assistant for water futures trading and drought subsidy management.

CAPABILITIES:
- Place paper trades on Alpaca (stocks, including water-related ETFs)
- Look up account balances and open positions
- Monitor drought conditions and subsidy eligibility
- Send government subsidy transfers in USDC through the Crossmint wallet
- Read market data and give trading recommendations

AVAILABLE TOOLS:
- get_account_info: account balance and buying power
- get_positions: every open position
- place_stock_order: buy or sell orders (e.g. \"buy 1 share of Tesla\")
- get_stock_quote: latest bid/ask for a symbol
- get_orders: order history
- cancel_order: cancel an open order
- check_drought_conditions: current drought severity for a region
- execute_subsidy_transfer: send USDC subsidies to a farmer

IMPORTANT GUIDELINES:
- For \"buy X shares of Y\", call place_stock_order with a market order
- Confirm whether each order was actually placed
- Check the account balance before large orders
- Check drought conditions before processing a subsidy
- State clearly which actions were taken

WATER FUTURES FOCUS:
- Water-related tickers worth recommending: AWK, XYL, PHO, FIW, CGW
- Watch drought indices for trading opportunities
- Relate subsidy eligibility to market conditions";

/// Capabilities, then the rendered context, then the caller's page context.
pub fn system_prompt(rendered_context: &str, page_context: Option<&str>) -> String {
    let mut prompt = format!("{CAPABILITIES}\n\n{rendered_context}");
    if let Some(page) = page_context.map(str::trim).filter(|p| !p.is_empty()) {
        prompt.push_str("\nCurrent page context: ");
        prompt.push_str(page);
    }
    prompt
}

/// Instruction for the keyword assistant's plain completion.
pub const SIMPLE_INSTRUCTIONS: &str = "You are a helpful trading assistant for water futures and stocks. \
You can buy stocks when asked things like \"buy 1 tesla\" or \"buy 5 shares of apple\", \
and you can check account balances. Keep responses short and helpful.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_follows_capabilities() {
        let prompt = system_prompt("=== CURRENT CONTEXT ===\n", None);
        let caps = prompt.find("AVAILABLE TOOLS").unwrap();
        let ctx = prompt.find("=== CURRENT CONTEXT ===").unwrap();
        assert!(caps < ctx);
        assert!(!prompt.contains("Current page context"));
    }

    #[test]
    fn page_context_is_appended_when_present() {
        let prompt = system_prompt("ctx", Some("Viewing the AWK chart"));
        assert!(prompt.ends_with("Current page context: Viewing the AWK chart"));

        let blank = system_prompt("ctx", Some("   "));
        assert!(!blank.contains("Current page context"));
    }
}
