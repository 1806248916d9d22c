//! Drought severity and subsidy eligibility.
//!
//! There is no live drought feed yet; [`RandomIndex`] simulates one. The
//! index source is a trait so tests (and a future weather integration) can
//! plug in their own.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tidewater_config::SubsidyConfig;

/// Produces a drought index in `[0, 100)`.
pub trait DroughtIndexSource: Send + Sync {
    fn sample(&self) -> f64;
}

/// Uniformly random index.
pub struct RandomIndex;

impl DroughtIndexSource for RandomIndex {
    fn sample(&self) -> f64 {
        rand::rng().random_range(0.0..100.0)
    }
}

/// Always the same index.
pub struct FixedIndex(pub f64);

impl DroughtIndexSource for FixedIndex {
    fn sample(&self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Extreme,
    Severe,
    Moderate,
}

impl Severity {
    pub fn from_index(index: f64) -> Self {
        if index > 80.0 {
            Severity::Extreme
        } else if index > 70.0 {
            Severity::Severe
        } else {
            Severity::Moderate
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroughtAssessment {
    pub region: String,

    /// Rounded to two decimals
    pub drought_index: f64,

    pub severity: Severity,

    pub eligible: bool,

    pub timestamp: String,
}

pub struct DroughtMonitor {
    source: Box<dyn DroughtIndexSource>,
    threshold: f64,
    default_region: String,
}

impl DroughtMonitor {
    pub fn new(config: &SubsidyConfig) -> Self {
        Self::with_source(config, Box::new(RandomIndex))
    }

    pub fn with_source(config: &SubsidyConfig, source: Box<dyn DroughtIndexSource>) -> Self {
        Self {
            source,
            threshold: config.drought_threshold,
            default_region: config.default_region.clone(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Sample the index for `region` and decide subsidy eligibility.
    pub fn assess(&self, region: Option<&str>) -> DroughtAssessment {
        let index = self.source.sample();
        let region = region
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(&self.default_region);

        DroughtAssessment {
            region: region.to_string(),
            drought_index: (index * 100.0).round() / 100.0,
            severity: Severity::from_index(index),
            eligible: index > self.threshold,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
