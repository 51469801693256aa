//! Threshold-based decision rule shared by both classification paths

use modguard_core::{CategoryScore, Decision};
use serde::{Deserialize, Serialize};

/// Fixed thresholds turning category scores into a decision.
///
/// All comparisons are strict: a score equal to a threshold does not trigger it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionThresholds {
    /// Highest category score above this rejects
    pub reject_above: f32,

    /// Highest category score above this flags
    pub flag_above: f32,

    /// Sentiment negativity above this flags (ignored when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negativity_flag_above: Option<f32>,
}

impl DecisionThresholds {
    /// Thresholds applied to ML adapter scores
    pub const MODEL: Self = Self {
        reject_above: 0.7,
        flag_above: 0.5,
        negativity_flag_above: Some(0.7),
    };

    /// Thresholds applied to heuristic scores.
    ///
    /// With the heuristic's fixed scores this rejects exactly when a slur
    /// (0.95) or a threat (0.9) is present and flags on profanity (0.7) or
    /// hostility (0.75).
    pub const HEURISTIC: Self = Self {
        reject_above: 0.8,
        flag_above: 0.6,
        negativity_flag_above: None,
    };

    /// Decide from the highest category score and optional negativity
    pub fn decide(&self, highest: f32, negativity: Option<f32>) -> Decision {
        if highest > self.reject_above {
            return Decision::Rejected;
        }

        let negative = match (self.negativity_flag_above, negativity) {
            (Some(threshold), Some(value)) => value > threshold,
            _ => false,
        };

        if highest > self.flag_above || negative {
            Decision::Flagged
        } else {
            Decision::Approved
        }
    }

    /// Decide from a category list (any order)
    pub fn decide_categories(
        &self,
        categories: &[CategoryScore],
        negativity: Option<f32>,
    ) -> Decision {
        let highest = categories
            .iter()
            .map(|c| c.score)
            .fold(0.0f32, f32::max);
        self.decide(highest, negativity)
    }
}
