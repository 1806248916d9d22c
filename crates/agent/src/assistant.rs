//! Tool-calling assistant loop.

use crate::prompt;
use serde::Serialize;
use std::sync::Arc;
use tidewater_config::AssistantConfig;
use tidewater_core::tool::{ToolCall, ToolRegistry};
use tidewater_core::{ContextStore, Message, Provider, ProviderRequest};
use tracing::{debug, info, warn};

const MAX_ITERATIONS_REPLY: &str =
    "I've reached the maximum number of tool calls for one message. Please tell me how to continue.";

/// What the assistant said and how many tool calls it made getting there.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantReply {
    pub text: String,
    pub tools_used: usize,
}

/// Runs one chat message through the model, executing tool calls until
/// the model answers in plain text or the iteration cap is reached.
pub struct AssistantLoop {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    tools: Arc<ToolRegistry>,
    context: ContextStore,
    max_iterations: u32,
}

impl AssistantLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
        context: ContextStore,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            tools,
            context,
            max_iterations: 8,
        }
    }

    /// Model, temperature, token limit and iteration cap from configuration.
    pub fn from_config(
        config: &AssistantConfig,
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        context: ContextStore,
    ) -> Self {
        Self::new(provider, &config.model, config.temperature, tools, context)
            .with_max_tokens(config.max_tokens)
            .with_max_iterations(config.max_tool_iterations)
    }

    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Answer `message`, optionally describing what page the user is on.
    pub async fn respond(
        &self,
        message: &str,
        page_context: Option<&str>,
    ) -> Result<AssistantReply, tidewater_core::Error> {
        let system = prompt::system_prompt(&self.context.render_for_prompt(), page_context);
        let mut transcript = vec![Message::system(system), Message::user(message)];
        let tool_definitions = self.tools.definitions();
        let mut tools_used = 0;

        for iteration in 1..=self.max_iterations {
            debug!(iteration, messages = transcript.len(), "Assistant loop iteration");

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: transcript.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: tool_definitions.clone(),
            };
            let response = self.provider.complete(request).await?;

            if response.message.tool_calls.is_empty() {
                info!(tools_used, iterations = iteration, "Assistant reply generated");
                return Ok(AssistantReply {
                    text: response.message.content,
                    tools_used,
                });
            }

            let tool_calls = response.message.tool_calls.clone();
            transcript.push(response.message);

            for tc in &tool_calls {
                tools_used += 1;
                let arguments = match parse_arguments(&tc.arguments) {
                    Ok(arguments) => arguments,
                    Err(e) => {
                        warn!(tool = %tc.name, error = %e, "Malformed tool arguments");
                        transcript.push(Message::tool_result(
                            &tc.id,
                            format!("Error: arguments are not valid JSON: {e}"),
                        ));
                        continue;
                    }
                };
                let call = ToolCall {
                    id: tc.id.clone(),
                    name: tc.name.clone(),
                    arguments,
                };

                match self.tools.execute(&call).await {
                    Ok(result) => {
                        debug!(tool = %tc.name, "Tool executed");
                        transcript.push(Message::tool_result(&tc.id, result.output));
                    }
                    Err(e) => {
                        // The model sees the failure and can explain or retry.
                        warn!(tool = %tc.name, error = %e, "Tool execution failed");
                        transcript.push(Message::tool_result(&tc.id, format!("Error: {e}")));
                    }
                }
            }
        }

        warn!(
            max_iterations = self.max_iterations,
            tools_used, "Max tool iterations reached, stopping"
        );
        Ok(AssistantReply {
            text: MAX_ITERATIONS_REPLY.into(),
            tools_used,
        })
    }
}

/// Blank arguments mean "no arguments"; anything else must be JSON.
fn parse_arguments(raw: &str) -> Result<serde_json::Value, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(serde_json::Value::Object(Default::default()));
    }
    serde_json::from_str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedProvider, tool_call};
    use serde_json::json;
    use tidewater_config::SubsidyConfig;
    use tidewater_core::error::ProviderError;
    use tidewater_core::{BrokerageSection, Role};
    use tidewater_tools::mock::{MockBrokerage, MockWallet};
    use tidewater_wallet::{DroughtMonitor, FixedIndex};

    fn registry(brokerage: Arc<MockBrokerage>, context: &ContextStore) -> Arc<ToolRegistry> {
        let drought = DroughtMonitor::with_source(&SubsidyConfig::default(), Box::new(FixedIndex(75.0)));
        Arc::new(tidewater_tools::trading_registry(
            brokerage,
            Arc::new(MockWallet::default()),
            Arc::new(drought),
            context.clone(),
            10,
        ))
    }

    #[tokio::test]
    async fn plain_text_reply_uses_no_tools() {
        let context = ContextStore::new();
        context.update_brokerage(BrokerageSection {
            account_info: Some(json!({"equity": 100500, "buying_power": 200000})),
            ..Default::default()
        });
        let provider = Arc::new(ScriptedProvider::text("Water utilities look steady."));
        let assistant = AssistantLoop::new(
            provider.clone(),
            "claude-3-5-sonnet-20241022",
            0.7,
            registry(Arc::new(MockBrokerage::default()), &context),
            context,
        )
        .with_max_tokens(1500);

        let reply = assistant
            .respond("How are water stocks?", Some("Trading dashboard"))
            .await
            .unwrap();
        assert_eq!(reply.text, "Water utilities look steady.");
        assert_eq!(reply.tools_used, 0);

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].tools.len(), 8);
        assert_eq!(requests[0].max_tokens, Some(1500));
        let system = &requests[0].messages[0];
        assert_eq!(system.role, Role::System);
        assert!(system.content.contains("Account Equity: 100500"));
        assert!(system.content.contains("Current page context: Trading dashboard"));
        assert_eq!(requests[0].messages[1].content, "How are water stocks?");
    }

    #[tokio::test]
    async fn tool_call_places_order_and_feeds_result_back() {
        let context = ContextStore::new();
        let brokerage = Arc::new(MockBrokerage::default());
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(tool_call(
                "toolu_1",
                "place_stock_order",
                json!({"symbol": "tsla", "side": "buy", "quantity": 1}),
            )),
            Ok(Message::assistant("Bought 1 share of TSLA.")),
        ]));
        let assistant = AssistantLoop::new(
            provider.clone(),
            "m",
            0.7,
            registry(brokerage.clone(), &context),
            context.clone(),
        );

        let reply = assistant.respond("buy 1 tesla", None).await.unwrap();
        assert_eq!(reply.text, "Bought 1 share of TSLA.");
        assert_eq!(reply.tools_used, 1);

        let placed = brokerage.placed();
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].symbol, "TSLA");
        assert!(context.snapshot().brokerage.unwrap().orders.is_some());

        let requests = provider.requests();
        let second = &requests[1];
        let result = second.messages.last().unwrap();
        assert_eq!(result.role, Role::Tool);
        assert_eq!(result.tool_call_id.as_deref(), Some("toolu_1"));
        assert!(result.content.contains("order-1"));
    }

    #[tokio::test]
    async fn tool_errors_are_reported_to_the_model() {
        let context = ContextStore::new();
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(tool_call("toolu_1", "launch_rocket", json!({}))),
            Ok(Message::assistant("I can't do that.")),
        ]));
        let assistant = AssistantLoop::new(
            provider.clone(),
            "m",
            0.7,
            registry(Arc::new(MockBrokerage::default()), &context),
            context,
        );

        let reply = assistant.respond("launch", None).await.unwrap();
        assert_eq!(reply.text, "I can't do that.");
        assert_eq!(reply.tools_used, 1);

        let fed_back = provider.requests()[1].messages.last().unwrap().content.clone();
        assert!(fed_back.starts_with("Error: "));
        assert!(fed_back.contains("launch_rocket"));
    }

    #[tokio::test]
    async fn malformed_arguments_never_reach_tools() {
        let context = ContextStore::new();
        let brokerage = Arc::new(MockBrokerage::default());
        let mut order = tool_call("t1", "place_stock_order", json!({}));
        order.tool_calls[0].arguments = r#"{"symbol": "TSLA", "side": "buy""#.into();
        let mut positions = tool_call("t2", "get_positions", json!({}));
        positions.tool_calls[0].arguments = "not json".into();

        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(order),
            Ok(positions),
            Ok(Message::assistant("Something went wrong with that request.")),
        ]));
        let assistant = AssistantLoop::new(
            provider.clone(),
            "m",
            0.7,
            registry(brokerage.clone(), &context),
            context.clone(),
        );

        let reply = assistant.respond("buy tesla", None).await.unwrap();
        assert_eq!(reply.text, "Something went wrong with that request.");
        assert_eq!(reply.tools_used, 2);
        assert!(brokerage.placed().is_empty());
        assert!(context.snapshot().brokerage.is_none());

        let requests = provider.requests();
        for request in &requests[1..] {
            let fed_back = &request.messages.last().unwrap().content;
            assert!(fed_back.starts_with("Error: arguments are not valid JSON"));
        }
    }

    #[test]
    fn blank_arguments_mean_no_arguments() {
        assert_eq!(parse_arguments("  ").unwrap(), json!({}));
        assert_eq!(parse_arguments(r#"{"limit": 5}"#).unwrap(), json!({"limit": 5}));
        assert!(parse_arguments("{").is_err());
    }

    #[tokio::test]
    async fn stops_at_iteration_cap() {
        let context = ContextStore::new();
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(tool_call("t1", "get_account_info", json!({}))),
            Ok(tool_call("t2", "get_account_info", json!({}))),
            Ok(tool_call("t3", "get_account_info", json!({}))),
        ]));
        let assistant = AssistantLoop::new(
            provider.clone(),
            "m",
            0.7,
            registry(Arc::new(MockBrokerage::default()), &context),
            context,
        )
        .with_max_iterations(2);

        let reply = assistant.respond("loop forever", None).await.unwrap();
        assert_eq!(reply.text, MAX_ITERATIONS_REPLY);
        assert_eq!(reply.tools_used, 2);
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn provider_failure_is_an_error() {
        let context = ContextStore::new();
        let provider = Arc::new(ScriptedProvider::new(vec![Err(ProviderError::RateLimited {
            retry_after_secs: 5,
        })]));
        let assistant = AssistantLoop::new(
            provider,
            "m",
            0.7,
            registry(Arc::new(MockBrokerage::default()), &context),
            context,
        );

        let err = assistant.respond("hi", None).await.unwrap_err();
        assert!(matches!(err, tidewater_core::Error::Provider(_)));
    }

    #[test]
    fn from_config_applies_limits() {
        let config = AssistantConfig {
            max_tool_iterations: 3,
            max_tokens: 900,
            ..Default::default()
        };
        let assistant = AssistantLoop::from_config(
            &config,
            Arc::new(ScriptedProvider::text("")),
            Arc::new(ToolRegistry::new()),
            ContextStore::new(),
        );
        assert_eq!(assistant.max_iterations, 3);
        assert_eq!(assistant.max_tokens, Some(900));
        assert_eq!(assistant.model, config.model);
    }
}
