//! LLM provider implementations for Tidewater.
//!
//! All providers implement the `tidewater_core::Provider` trait.

pub mod anthropic;

pub use anthropic::AnthropicProvider;

use async_trait::async_trait;
use std::sync::Arc;
use tidewater_config::AssistantConfig;
use tidewater_core::error::ProviderError;
use tidewater_core::{Provider, ProviderRequest, ProviderResponse};
use tracing::warn;

/// Build the configured provider, or report why it cannot be built.
pub fn from_config(config: &AssistantConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config
        .api_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ProviderError::NotConfigured("ANTHROPIC_API_KEY is not set".into()))?;

    let mut provider = AnthropicProvider::new(api_key);
    if let Some(base_url) = &config.base_url {
        provider = provider.with_base_url(base_url);
    }
    Ok(Arc::new(provider))
}

/// Like [`from_config`], but an unusable configuration yields a provider
/// that fails every request, so callers with fallbacks keep working.
pub fn from_config_or_unavailable(config: &AssistantConfig) -> Arc<dyn Provider> {
    from_config(config).unwrap_or_else(|e| {
        warn!(error = %e, "No language model available; assistant replies will degrade");
        Arc::new(UnavailableProvider {
            reason: e.to_string(),
        })
    })
}

/// Provider that refuses every request with the reason it was not built.
pub struct UnavailableProvider {
    reason: String,
}

#[async_trait]
impl Provider for UnavailableProvider {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::NotConfigured(self.reason.clone()))
    }
}
