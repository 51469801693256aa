//! Keyword-bucket topic detection

/// Assigns zero or more topic tags to text.
///
/// Topics are reported in the order they were registered.
#[derive(Debug, Clone)]
pub struct TopicDetector {
    topics: Vec<(String, Vec<String>)>,
}

impl TopicDetector {
    /// Detector with a custom topic table
    pub fn with_topics(topics: Vec<(String, Vec<String>)>) -> Self {
        let topics = topics
            .into_iter()
            .map(|(name, keywords)| {
                let keywords = keywords
                    .into_iter()
                    .map(|k| k.to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect();
                (name, keywords)
            })
            .collect();
        Self { topics }
    }

    /// Topic names in detection order
    pub fn topic_names(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(|(name, _)| name.as_str())
    }

    /// Detect topics present in `text`
    pub fn detect(&self, text: &str) -> Vec<String> {
        let text_lower = text.to_lowercase();

        self.topics
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|k| text_lower.contains(k.as_str())))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl Default for TopicDetector {
    fn default() -> Self {
        let table: [(&str, &[&str]); 6] = [
            (
                "Politics",
                &["politic", "government", "election", "democrat", "republican", "congress", "senate"],
            ),
            (
                "Technology",
                &["tech", "computer", "software", "hardware", "programming", "ai", "algorithm"],
            ),
            (
                "Entertainment",
                &["movie", "film", "music", "celebrity", "actor", "actress", "hollywood"],
            ),
            (
                "Sports",
                &["sport", "game", "team", "player", "championship", "league", "score"],
            ),
            (
                "Health",
                &["health", "medical", "doctor", "disease", "patient", "hospital", "treatment"],
            ),
            (
                "Finance",
                &["finance", "money", "bank", "investment", "stock", "market", "economy"],
            ),
        ];

        Self::with_topics(
            table
                .iter()
                .map(|(name, keywords)| {
                    (
                        name.to_string(),
                        keywords.iter().map(|k| k.to_string()).collect(),
                    )
                })
                .collect(),
        )
    }
}
