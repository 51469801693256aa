//! Built-in sample training set

use modguard_core::{Decision, TrainingExample};

const SAMPLES: [(&str, Decision, &[&str]); 10] = [
    ("I love this new feature, great work team!", Decision::Approved, &[]),
    ("Just finished reading an amazing book about space exploration", Decision::Approved, &[]),
    ("Congratulations on the launch, well deserved", Decision::Approved, &[]),
    ("Looking forward to the game this weekend", Decision::Approved, &[]),
    ("This service is terrible and the staff are idiots", Decision::Flagged, &["Harassment"]),
    ("What the hell is wrong with this company", Decision::Flagged, &["Profanity"]),
    ("Don't believe the news, it's all a hoax", Decision::Flagged, &["Misinformation"]),
    ("You are worthless and everyone hates you", Decision::Rejected, &["Harassment", "Hate Speech"]),
    ("I will hurt you if you show up tomorrow", Decision::Rejected, &["Threats"]),
    ("I'm going to destroy everyone who disagrees with me", Decision::Rejected, &["Threats"]),
];

/// The sample set, labeled and categorised, with manual source
pub fn sample_examples() -> Vec<TrainingExample> {
    SAMPLES
        .iter()
        .map(|(content, label, categories)| {
            let example = TrainingExample::new(*content, *label);
            if categories.is_empty() {
                example
            } else {
                example.with_categories(categories.iter().map(|c| c.to_string()).collect())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_EXAMPLES;

    #[test]
    fn test_samples_are_trainable() {
        let samples = sample_examples();
        assert!(samples.len() >= MIN_EXAMPLES);
        assert!(samples.iter().all(|e| !e.content.is_empty()));
        assert!(samples.iter().any(|e| e.label == Decision::Rejected));
        assert!(samples[0].categories.is_none());
    }
}
