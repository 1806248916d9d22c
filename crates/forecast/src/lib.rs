//! Water futures outlook and AI market analysis for Tidewater.

pub mod analyst;
pub mod outlook;

pub use analyst::{AnalysisRecommendation, MarketAnalysis, MarketAnalyst};
pub use outlook::{
    AlertKind, MarketData, MarketOutlook, Recommendation, RiskLevel, Sentiment, TradeAction,
    WeatherAlert,
};
