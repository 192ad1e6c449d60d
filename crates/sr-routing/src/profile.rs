//! Named safety profiles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use sr_core::CostWeights;

use crate::RouteError;

/// A named `(alpha, beta)` preset.  All presets sum to 1, so their costs are
/// on the same scale.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyProfile {
    /// α = 0.8, β = 0.2
    Fastest,
    /// α = 0.5, β = 0.5
    #[default]
    Balanced,
    /// α = 0.2, β = 0.8
    Safest,
}

impl SafetyProfile {
    pub const ALL: [SafetyProfile; 3] =
        [SafetyProfile::Fastest, SafetyProfile::Balanced, SafetyProfile::Safest];

    pub fn weights(self) -> CostWeights {
        let (alpha, beta) = match self {
            SafetyProfile::Fastest  => (0.8, 0.2),
            SafetyProfile::Balanced => (0.5, 0.5),
            SafetyProfile::Safest   => (0.2, 0.8),
        };
        CostWeights { alpha, beta }
    }

    /// The profile closest in spirit to arbitrary `weights`: α > 0.6 is
    /// fastest, α < 0.4 is safest, anything between is balanced.
    pub fn classify(weights: CostWeights) -> SafetyProfile {
        if weights.alpha > 0.6 {
            SafetyProfile::Fastest
        } else if weights.alpha < 0.4 {
            SafetyProfile::Safest
        } else {
            SafetyProfile::Balanced
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SafetyProfile::Fastest  => "fastest",
            SafetyProfile::Balanced => "balanced",
            SafetyProfile::Safest   => "safest",
        }
    }
}

impl fmt::Display for SafetyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SafetyProfile {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fastest"  => Ok(SafetyProfile::Fastest),
            "balanced" => Ok(SafetyProfile::Balanced),
            "safest"   => Ok(SafetyProfile::Safest),
            _ => Err(RouteError::UnknownProfile(s.to_owned())),
        }
    }
}
