use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Urgency {
    Critical,
    High,
    Medium,
    Low,
}

impl Urgency {
    pub const CRITICAL_ABOVE: f64 = 70.0;
    pub const HIGH_ABOVE: f64 = 50.0;
    pub const MEDIUM_ABOVE: f64 = 30.0;

    /// Thresholds are exclusive: a score of exactly 70.0 is High.
    pub fn from_score(score: f64) -> Self {
        if score > Self::CRITICAL_ABOVE {
            Urgency::Critical
        } else if score > Self::HIGH_ABOVE {
            Urgency::High
        } else if score > Self::MEDIUM_ABOVE {
            Urgency::Medium
        } else {
            Urgency::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Urgency::Critical => "Critical",
            Urgency::High => "High",
            Urgency::Medium => "Medium",
            Urgency::Low => "Low",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Urgency::Critical => "critical",
            Urgency::High => "high",
            Urgency::Medium => "medium",
            Urgency::Low => "low",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
