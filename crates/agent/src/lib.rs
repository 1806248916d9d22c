//! The Tidewater trading assistant.
//!
//! [`AssistantLoop`] runs the tool-calling cycle:
//!
//! 1. **Build the system prompt** (capabilities + rendered shared context)
//! 2. **Send to the model** with every registered tool definition
//! 3. **If tool calls**: execute them, append the results, loop back to step 2
//! 4. **If text**: return it along with how many tools ran
//!
//! [`SimpleAssistant`] is the keyword path used when tool calling is not
//! wanted: buy commands and balance questions go straight to the brokerage.

pub mod assistant;
pub mod prompt;
pub mod simple;

pub use assistant::{AssistantLoop, AssistantReply};
pub use simple::{HELP_TEXT, SimpleAssistant};

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tidewater_core::error::ProviderError;
    use tidewater_core::{Message, MessageToolCall, Provider, ProviderRequest, ProviderResponse};

    /// Provider that replays a fixed sequence of replies and records requests.
    pub struct ScriptedProvider {
        replies: Mutex<VecDeque<Result<Message, ProviderError>>>,
        pub seen: Mutex<Vec<ProviderRequest>>,
    }

    impl ScriptedProvider {
        pub fn new(replies: Vec<Result<Message, ProviderError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn text(reply: &str) -> Self {
            Self::new(vec![Ok(Message::assistant(reply))])
        }

        pub fn requests(&self) -> Vec<ProviderRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    pub fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> Message {
        let mut msg = Message::assistant("");
        msg.tool_calls.push(MessageToolCall {
            id: id.into(),
            name: name.into(),
            arguments: arguments.to_string(),
        });
        msg
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            self.seen.lock().unwrap().push(request);
            let next = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Message::assistant("(script exhausted)")));
            next.map(|message| ProviderResponse {
                message,
                usage: None,
                model: "scripted".into(),
            })
        }
    }
}
