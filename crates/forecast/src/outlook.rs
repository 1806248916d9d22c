//! Water futures outlook: contract recommendations, market conditions and
//! weather alerts.
//!
//! No forecasting model is wired in yet, so [`MarketOutlook::current`]
//! serves a fixed demo outlook.

use serde::{Deserialize, Serialize};
use tidewater_core::ForecastSection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub contract: String,
    pub action: TradeAction,
    pub current_price: f64,
    pub target_price: f64,
    /// Percent, 0-100
    pub confidence: u8,
    pub strategy: String,
    pub reasoning: String,
    pub risk_level: RiskLevel,
    pub timeframe: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub drought_index: f64,
    pub drought_level: String,
    /// Degrees Fahrenheit
    pub temperature: f64,
    /// Inches
    pub precipitation: f64,
    /// Percent of capacity
    pub reservoir_levels: f64,
    pub market_sentiment: Sentiment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Drought,
    Flood,
    Temperature,
    Precipitation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: RiskLevel,
    pub title: String,
    pub description: String,
    pub impact: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOutlook {
    pub recommendations: Vec<Recommendation>,
    pub market_data: MarketData,
    pub weather_alerts: Vec<WeatherAlert>,
    pub updated_at: String,
}

impl MarketOutlook {
    pub fn current() -> Self {
        Self {
            recommendations: demo_recommendations(),
            market_data: demo_market_data(),
            weather_alerts: demo_weather_alerts(),
            updated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// The outlook as a forecast-section fragment for the shared context.
    pub fn to_fragment(&self) -> ForecastSection {
        ForecastSection {
            recommendations: Some(to_values(&self.recommendations)),
            market_data: serde_json::to_value(&self.market_data).ok(),
            weather_alerts: Some(to_values(&self.weather_alerts)),
        }
    }
}

fn to_values<T: Serialize>(items: &[T]) -> Vec<serde_json::Value> {
    items
        .iter()
        .filter_map(|item| serde_json::to_value(item).ok())
        .collect()
}

fn demo_recommendations() -> Vec<Recommendation> {
    vec![
        Recommendation {
            id: "1".into(),
            contract: "NQH25".into(),
            action: TradeAction::Buy,
            current_price: 498.5,
            target_price: 525.0,
            confidence: 87,
            strategy: "Drought Severity Hedging".into(),
            reasoning: "AI models predict 23% increase in drought severity over next 30 days \
                        based on NOAA data and satellite imagery analysis."
                .into(),
            risk_level: RiskLevel::Medium,
            timeframe: "2-4 weeks".into(),
        },
        Recommendation {
            id: "2".into(),
            contract: "NQM25".into(),
            action: TradeAction::Sell,
            current_price: 512.75,
            target_price: 485.0,
            confidence: 72,
            strategy: "Seasonal Correction".into(),
            reasoning: "Historical patterns show 15% price correction typically occurs in Q1. \
                        Current overbought conditions support this thesis."
                .into(),
            risk_level: RiskLevel::Low,
            timeframe: "1-2 weeks".into(),
        },
        Recommendation {
            id: "3".into(),
            contract: "NQU25".into(),
            action: TradeAction::Hold,
            current_price: 535.25,
            target_price: 540.0,
            confidence: 65,
            strategy: "Range Trading".into(),
            reasoning: "Price consolidating in $530-$545 range. \
                        Wait for clear breakout signal before taking position."
                .into(),
            risk_level: RiskLevel::Low,
            timeframe: "3-5 days".into(),
        },
    ]
}

fn demo_market_data() -> MarketData {
    MarketData {
        drought_index: 2.8,
        drought_level: "Moderate".into(),
        temperature: 78.5,
        precipitation: 0.12,
        reservoir_levels: 67.3,
        market_sentiment: Sentiment::Bullish,
    }
}

fn demo_weather_alerts() -> Vec<WeatherAlert> {
    vec![
        WeatherAlert {
            id: "1".into(),
            kind: AlertKind::Drought,
            severity: RiskLevel::Medium,
            title: "Drought Conditions Intensifying".into(),
            description: "Central Valley showing increased drought stress indicators".into(),
            impact: "Water futures likely to trend upward 8-12% over next month".into(),
            region: "California Central Valley".into(),
        },
        WeatherAlert {
            id: "2".into(),
            kind: AlertKind::Temperature,
            severity: RiskLevel::High,
            title: "Extreme Heat Wave Forecast".into(),
            description: "Temperatures expected to exceed 105°F for 7+ consecutive days".into(),
            impact: "Increased irrigation demand could drive prices up 15-20%".into(),
            region: "Southwest US".into(),
        },
        WeatherAlert {
            id: "3".into(),
            kind: AlertKind::Precipitation,
            severity: RiskLevel::Low,
            title: "Below Average Rainfall".into(),
            description: "Precipitation 35% below seasonal averages".into(),
            impact: "Moderate upward pressure on water futures pricing".into(),
            region: "Pacific Northwest".into(),
        },
    ]
}
