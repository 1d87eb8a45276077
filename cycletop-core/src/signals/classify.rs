//! Score → alert level mapping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-level severity of the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertLevel {
    Alert,
    Caution,
    None,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Alert => "ALERT",
            Self::Caution => "CAUTION",
            Self::None => "NONE",
        };
        f.write_str(label)
    }
}

/// Lower bounds of the two raised levels, on the active scoring scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationThresholds {
    pub alert: f64,
    pub caution: f64,
}

impl ClassificationThresholds {
    /// Count-mode reference: ≥3 → ALERT, 2 → CAUTION.
    pub fn count_default() -> Self {
        Self {
            alert: 3.0,
            caution: 2.0,
        }
    }

    /// Percentage-mode reference: ≥80 % → ALERT, ≥50 % → CAUTION.
    pub fn percentage_default() -> Self {
        Self {
            alert: 80.0,
            caution: 50.0,
        }
    }
}

/// Pure mapping; an undefined score never raises the level.
pub fn classify(score: f64, thresholds: &ClassificationThresholds) -> AlertLevel {
    if score >= thresholds.alert {
        AlertLevel::Alert
    } else if score >= thresholds.caution {
        AlertLevel::Caution
    } else {
        AlertLevel::None
    }
}
