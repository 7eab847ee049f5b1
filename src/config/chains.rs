use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Networks the engine can touch. `Base` is the home chain; everything else
/// only appears as a funding source or refuel destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Base,
    Arbitrum,
    Optimism,
    Polygon,
    Avalanche,
}

/// Refuel destination candidates, in draw order.
pub const REFUEL_CANDIDATES: &[Chain] = &[
    Chain::Arbitrum,
    Chain::Optimism,
    Chain::Polygon,
    Chain::Avalanche,
];

impl Chain {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Arbitrum => "arbitrum",
            Self::Optimism => "optimism",
            Self::Polygon => "polygon",
            Self::Avalanche => "avalanche",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "base" => Some(Self::Base),
            "arbitrum" => Some(Self::Arbitrum),
            "optimism" => Some(Self::Optimism),
            "polygon" => Some(Self::Polygon),
            "avalanche" => Some(Self::Avalanche),
            _ => None,
        }
    }

    /// How long bridged funds take to land on Base from this chain.
    /// Polygon checkpoints are an order of magnitude slower than the rest.
    pub fn bridge_settle_wait(self) -> Duration {
        match self {
            Self::Polygon => Duration::from_secs(25 * 60),
            _ => Duration::from_secs(3 * 60),
        }
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
