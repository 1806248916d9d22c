//! AI market analysis for water futures.
//!
//! The model writes the narrative; the structured figures around it come
//! from the current outlook so the dashboard always has numbers to plot.

use crate::outlook::{MarketOutlook, Sentiment, TradeAction};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tidewater_core::{Provider, ProviderRequest, Sourced};
use tracing::{info, warn};

const ANALYST_PROMPT: &str = "You are a water futures market analysis AI. Generate a comprehensive market analysis including:
- Current drought conditions and impact on water futures
- Price predictions for major water futures contracts (NQH25, NQM25, NQU25)
- Risk factors and market sentiment
- Trading recommendations with confidence levels

Return your analysis in a structured JSON format with specific data points and actionable insights.";

const ANALYSIS_REQUEST: &str = "Generate a comprehensive water futures market analysis for today.";

const ANALYSIS_MAX_TOKENS: u32 = 1000;

const FALLBACK_INSIGHTS: &str = "AI analysis is temporarily unavailable. Moderate drought \
conditions persist across key growing regions and continue to support water futures prices.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecommendation {
    pub contract: String,
    pub action: TradeAction,
    pub confidence: u8,
    pub target_price: f64,
    pub current_price: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub timestamp: String,
    pub market_sentiment: Sentiment,
    pub drought_index: f64,
    pub drought_level: String,
    /// Narrative written by the model
    pub key_insights: String,
    pub recommendations: Vec<AnalysisRecommendation>,
    pub risk_factors: Vec<String>,
}

pub struct MarketAnalyst {
    provider: Arc<dyn Provider>,
    model: String,
}

impl MarketAnalyst {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub async fn analyze(&self) -> Sourced<MarketAnalysis> {
        let request = ProviderRequest::single_turn(
            &self.model,
            ANALYST_PROMPT,
            ANALYSIS_REQUEST,
            ANALYSIS_MAX_TOKENS,
        );

        match self.provider.complete(request).await {
            Ok(response) => {
                info!(
                    provider = self.provider.name(),
                    chars = response.message.content.len(),
                    "Market analysis generated"
                );
                Sourced::live(structure(response.message.content))
            }
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Market analysis failed");
                Sourced::fallback(structure(FALLBACK_INSIGHTS.to_string()), e.to_string())
            }
        }
    }
}

/// Wrap the narrative with the outlook's headline figures.
fn structure(key_insights: String) -> MarketAnalysis {
    let outlook = MarketOutlook::current();
    let lead = outlook
        .recommendations
        .iter()
        .find(|r| r.action == TradeAction::Buy)
        .map(|r| AnalysisRecommendation {
            contract: r.contract.clone(),
            action: r.action,
            confidence: r.confidence,
            target_price: r.target_price,
            current_price: r.current_price,
            reasoning: "AI analysis suggests strong upward momentum due to drought conditions"
                .into(),
        });

    MarketAnalysis {
        timestamp: chrono::Utc::now().to_rfc3339(),
        market_sentiment: outlook.market_data.market_sentiment,
        drought_index: outlook.market_data.drought_index,
        drought_level: outlook.market_data.drought_level,
        key_insights,
        recommendations: lead.into_iter().collect(),
        risk_factors: vec![
            "Regulatory changes in water allocation".into(),
            "Unexpected precipitation events".into(),
            "Market volatility from speculation".into(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tidewater_core::error::ProviderError;
    use tidewater_core::{Message, ProviderResponse, Role};

    struct CannedProvider {
        reply: Result<String, ProviderError>,
        seen: Mutex<Vec<ProviderRequest>>,
    }

    #[async_trait]
    impl Provider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            self.seen.lock().unwrap().push(request);
            self.reply.clone().map(|text| ProviderResponse {
                message: Message::assistant(text),
                usage: None,
                model: "canned".into(),
            })
        }
    }

    #[tokio::test]
    async fn live_analysis_carries_model_narrative() {
        let provider = Arc::new(CannedProvider {
            reply: Ok("Drought deepening; NQH25 favoured.".into()),
            seen: Mutex::new(Vec::new()),
        });
        let analyst = MarketAnalyst::new(provider.clone(), "claude-3-5-sonnet-20241022");

        let analysis = analyst.analyze().await;
        assert!(analysis.is_live());
        let analysis = analysis.into_data();
        assert_eq!(analysis.key_insights, "Drought deepening; NQH25 favoured.");
        assert_eq!(analysis.market_sentiment, Sentiment::Bullish);
        assert_eq!(analysis.drought_index, 2.8);
        assert_eq!(analysis.recommendations.len(), 1);
        assert_eq!(analysis.recommendations[0].contract, "NQH25");
        assert_eq!(analysis.recommendations[0].confidence, 87);
        assert_eq!(analysis.risk_factors.len(), 3);

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen[0].max_tokens, Some(1000));
        assert_eq!(seen[0].messages[0].role, Role::System);
        assert!(seen[0].tools.is_empty());
    }

    #[tokio::test]
    async fn provider_failure_falls_back() {
        let provider = Arc::new(CannedProvider {
            reply: Err(ProviderError::NotConfigured("ANTHROPIC_API_KEY is not set".into())),
            seen: Mutex::new(Vec::new()),
        });
        let analysis = MarketAnalyst::new(provider, "m").analyze().await;

        assert!(!analysis.is_live());
        assert!(analysis.reason().unwrap().contains("ANTHROPIC_API_KEY"));
        assert_eq!(analysis.data().key_insights, FALLBACK_INSIGHTS);
    }
}
