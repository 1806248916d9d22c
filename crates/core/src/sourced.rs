//! Live-or-fallback results from external collaborators.
//!
//! Several integrations (wallet balance, subsidy transfers, market analysis)
//! substitute demo data when the remote API refuses. Returning that data as a
//! [`Sourced::Fallback`] lets callers tell real data from placeholder data
//! without inspecting sentinel values.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Sourced<T> {
    /// Data returned by the external service.
    Live { data: T },
    /// Substitute data, with the reason the live path was not used.
    Fallback { data: T, reason: String },
}

impl<T> Sourced<T> {
    pub fn live(data: T) -> Self {
        Sourced::Live { data }
    }

    pub fn fallback(data: T, reason: impl Into<String>) -> Self {
        Sourced::Fallback {
            data,
            reason: reason.into(),
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Sourced::Live { .. })
    }

    pub fn data(&self) -> &T {
        match self {
            Sourced::Live { data } | Sourced::Fallback { data, .. } => data,
        }
    }

    pub fn into_data(self) -> T {
        match self {
            Sourced::Live { data } | Sourced::Fallback { data, .. } => data,
        }
    }

    /// The fallback reason, if this is not live data.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Sourced::Live { .. } => None,
            Sourced::Fallback { reason, .. } => Some(reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sourced<U> {
        match self {
            Sourced::Live { data } => Sourced::Live { data: f(data) },
            Sourced::Fallback { data, reason } => Sourced::Fallback {
                data: f(data),
                reason,
            },
        }
    }
}
