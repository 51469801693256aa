//! Keyword-overlap policy retrieval
//!
//! Scores every policy in the knowledge base against an input text and
//! returns the most relevant ones. A policy earns a fixed amount of
//! relevance for each distinct keyword found in the text.

use crate::catalogue::KnowledgeBase;
use aho_corasick::AhoCorasick;
use modguard_core::{Error, PolicyMatch, Result};
use std::collections::HashMap;

/// Default number of policy matches attached to an analysis
pub const DEFAULT_LIMIT: usize = 3;

/// Relevance contributed by each matched keyword
pub const RELEVANCE_PER_KEYWORD: f32 = 0.2;

/// Ranks knowledge-base policies against input text
pub struct PolicyRetriever {
    knowledge_base: KnowledgeBase,
    matcher: AhoCorasick,
    /// Policy indices owning each (deduplicated) keyword pattern
    owners: Vec<Vec<usize>>,
}

impl PolicyRetriever {
    /// Build a retriever over the given knowledge base
    pub fn new(knowledge_base: KnowledgeBase) -> Result<Self> {
        let mut patterns: Vec<String> = Vec::new();
        let mut owners: Vec<Vec<usize>> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (policy_idx, policy) in knowledge_base.policies().iter().enumerate() {
            for keyword in &policy.keywords {
                let keyword = keyword.trim().to_lowercase();
                if keyword.is_empty() {
                    continue;
                }

                let pattern_idx = *index.entry(keyword.clone()).or_insert_with(|| {
                    patterns.push(keyword);
                    owners.push(Vec::new());
                    patterns.len() - 1
                });

                let policy_owners = &mut owners[pattern_idx];
                if !policy_owners.contains(&policy_idx) {
                    policy_owners.push(policy_idx);
                }
            }
        }

        let matcher = AhoCorasick::builder()
            .build(&patterns)
            .map_err(|e| Error::config(format!("Failed to build policy keyword matcher: {e}")))?;

        Ok(Self {
            knowledge_base,
            matcher,
            owners,
        })
    }

    /// Retriever over the built-in catalogue
    pub fn builtin() -> Result<Self> {
        Self::new(KnowledgeBase::builtin())
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge_base
    }

    /// Return up to `limit` policies with non-zero relevance, most relevant first.
    ///
    /// Ties keep catalogue order.
    pub fn retrieve(&self, text: &str, limit: usize) -> Vec<PolicyMatch> {
        // keywords are stored lowercased; the automaton only folds ASCII
        let lowered = text.to_lowercase();
        let mut seen = vec![false; self.owners.len()];
        for m in self.matcher.find_overlapping_iter(&lowered) {
            seen[m.pattern().as_usize()] = true;
        }

        let mut hits = vec![0usize; self.knowledge_base.len()];
        for (pattern_idx, _) in seen.iter().enumerate().filter(|(_, s)| **s) {
            for &policy_idx in &self.owners[pattern_idx] {
                hits[policy_idx] += 1;
            }
        }

        let mut matches: Vec<PolicyMatch> = self
            .knowledge_base
            .policies()
            .iter()
            .zip(hits)
            .filter(|(_, count)| *count > 0)
            .map(|(policy, count)| PolicyMatch {
                policy_name: policy.name.clone(),
                relevance: (RELEVANCE_PER_KEYWORD * count as f32).min(1.0),
                description: policy.description.clone(),
            })
            .collect();

        matches.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        matches.truncate(limit);

        tracing::debug!(matches = matches.len(), "Policy retrieval complete");
        matches
    }

    /// Retrieve with the default limit
    pub fn retrieve_top(&self, text: &str) -> Vec<PolicyMatch> {
        self.retrieve(text, DEFAULT_LIMIT)
    }
}

/// Render matches as a plain-text policy context block
pub fn render_context(matches: &[PolicyMatch]) -> String {
    if matches.is_empty() {
        return "No specific policy guidelines found for this content.".to_string();
    }

    matches
        .iter()
        .map(|m| {
            format!(
                "Policy: {}\nDescription: {}\nRelevance: {}%",
                m.policy_name,
                m.description,
                (m.relevance * 100.0).round() as u32
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
