//! Lexicon-backed inference backend
//!
//! An in-process stand-in for a hosted model, selected only with
//! `backend: lexicon`. Its term lists are much narrower than the heuristic
//! classifier's. Sentiment is the balance of positive and negative term
//! hits; zero-shot scores come from per-label term lists.

use crate::classifier::{InferenceBackend, LabelScore, SentimentLabel, SentimentOutput};
use crate::lexicon::Lexicon;
use async_trait::async_trait;
use modguard_core::Result;
use std::collections::HashMap;

/// Score for a label with no term hits
const NO_SIGNAL: f32 = 0.05;
/// Added per additional distinct term hit
const PER_EXTRA_HIT: f32 = 0.15;
const MAX_SCORE: f32 = 0.95;

const POSITIVE: &[&str] = &[
    "good", "great", "excellent", "love", "amazing", "wonderful", "happy", "fantastic",
    "awesome", "best", "thanks", "beautiful",
];

const NEGATIVE: &[&str] = &[
    "bad", "terrible", "awful", "hate", "horrible", "worst", "sad", "angry", "disappointed",
    "poor", "stupid", "disgusting", "worthless", "kill",
];

/// (label, base score on first hit, terms)
const LABEL_TERMS: &[(&str, f32, &[&str])] = &[
    ("threats", 0.75, &["kill", "hurt", "murder", "attack", "destroy", "shoot", "die"]),
    ("self-harm", 0.75, &["kill myself", "suicide", "self harm", "cut myself", "end it all"]),
    ("hate speech", 0.65, &["hate", "subhuman", "vermin", "go back to", "retard"]),
    ("harassment", 0.6, &["idiot", "stupid", "loser", "worthless", "pathetic", "shut up", "ugly"]),
    ("profanity", 0.55, &["damn", "shit", "fuck", "crap", "bitch", "asshole"]),
    ("misinformation", 0.55, &["hoax", "fake news", "cover up", "they don't want you to know", "miracle cure"]),
    ("privacy violation", 0.55, &["home address", "phone number", "social security", "doxx", "leaked"]),
    ("spam", 0.55, &["click here", "buy now", "free money", "limited offer", "follow back", "giveaway"]),
];

/// Keyword-driven [`InferenceBackend`]
pub struct LexiconBackend {
    positive: Lexicon,
    negative: Lexicon,
    labels: HashMap<String, (f32, Lexicon)>,
}

impl LexiconBackend {
    pub fn new() -> Result<Self> {
        let mut labels = HashMap::new();
        for (label, base, terms) in LABEL_TERMS {
            labels.insert(
                label.to_string(),
                (*base, Lexicon::word_inflected(*label, terms.iter().copied())?),
            );
        }

        Ok(Self {
            positive: Lexicon::word_inflected("positive", POSITIVE.iter().copied())?,
            negative: Lexicon::word_inflected("negative", NEGATIVE.iter().copied())?,
            labels,
        })
    }

    fn score_label(&self, text: &str, label: &str) -> f32 {
        let Some((base, lexicon)) = self.labels.get(&label.trim().to_lowercase()) else {
            return NO_SIGNAL;
        };

        match lexicon.find(text).len() {
            0 => NO_SIGNAL,
            hits => (base + PER_EXTRA_HIT * (hits - 1) as f32).min(MAX_SCORE),
        }
    }
}

#[async_trait]
impl InferenceBackend for LexiconBackend {
    async fn sentiment(&self, text: &str) -> Result<SentimentOutput> {
        let positive = self.positive.find(text).len() as f32;
        let negative = self.negative.find(text).len() as f32;
        let total = positive + negative;

        let positivity = if total == 0.0 { 0.5 } else { positive / total };
        let output = if positivity >= 0.5 {
            SentimentOutput::new(SentimentLabel::Positive, positivity)
        } else {
            SentimentOutput::new(SentimentLabel::Negative, 1.0 - positivity)
        };
        Ok(output)
    }

    async fn zero_shot(&self, text: &str, labels: &[String]) -> Result<Vec<LabelScore>> {
        Ok(labels
            .iter()
            .map(|label| LabelScore::new(label.clone(), self.score_label(text, label)))
            .collect())
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        crate::ml::DEFAULT_CATEGORIES
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_clean_text_scores_low() {
        let backend = LexiconBackend::new().unwrap();
        let scores = backend
            .zero_shot("What a lovely afternoon in the park", &labels())
            .await
            .unwrap();

        assert_eq!(scores.len(), 8);
        assert!(scores.iter().all(|s| s.score == NO_SIGNAL));
    }

    #[tokio::test]
    async fn test_threat_scores_above_reject_threshold() {
        let backend = LexiconBackend::new().unwrap();
        let scores = backend
            .zero_shot("I will kill you", &["threats".to_string()])
            .await
            .unwrap();
        assert_eq!(scores[0].score, 0.75);
    }

    #[tokio::test]
    async fn test_additional_hits_raise_score() {
        let backend = LexiconBackend::new().unwrap();
        let scores = backend
            .zero_shot("you idiot, you stupid loser", &["harassment".to_string()])
            .await
            .unwrap();
        assert!((scores[0].score - 0.9).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_unknown_label() {
        let backend = LexiconBackend::new().unwrap();
        let scores = backend
            .zero_shot("kill", &["gardening".to_string()])
            .await
            .unwrap();
        assert_eq!(scores[0].label, "gardening");
        assert_eq!(scores[0].score, NO_SIGNAL);
    }

    #[tokio::test]
    async fn test_sentiment() {
        let backend = LexiconBackend::new().unwrap();

        let positive = backend.sentiment("This is great, I love it").await.unwrap();
        assert_eq!(positive.label, SentimentLabel::Positive);
        assert_eq!(positive.negativity(), 0.0);

        let negative = backend.sentiment("terrible, awful day").await.unwrap();
        assert_eq!(negative.label, SentimentLabel::Negative);
        assert_eq!(negative.negativity(), 1.0);

        let neutral = backend.sentiment("the bus is at noon").await.unwrap();
        assert_eq!(neutral.negativity(), 0.5);
    }
}
