//! # Tidewater Core
//!
//! Domain types, traits, and error definitions shared by every Tidewater
//! crate. The brokerage, wallet, LLM provider and tool layers all implement
//! traits defined here, and the [`ContextStore`] that feeds account, wallet
//! and market state into assistant prompts lives here too.
//!
//! ## Layout
//!
//! - [`context`]: the shared context aggregator (snapshot, fragments, render)
//! - [`provider`]: the LLM completion abstraction
//! - [`tool`]: assistant-invocable tools and their registry
//! - [`sourced`]: live-or-fallback results from external collaborators

pub mod context;
pub mod error;
pub mod message;
pub mod provider;
pub mod sourced;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use context::{
    BrokerageSection, ContextSnapshot, ContextStore, ForecastSection, WalletSection, PLACEHOLDER,
};
pub use error::{Error, Result};
pub use message::{Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition};
pub use sourced::Sourced;
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
