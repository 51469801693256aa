//! Deterministic keyword classifier used when no ML capability is available
//!
//! Scores text across three categories (hate speech, profanity, threats)
//! from fixed lexicons and derives a decision with
//! [`DecisionThresholds::HEURISTIC`].

use crate::decision::DecisionThresholds;
use crate::lexicon::Lexicon;
use modguard_core::{sort_categories, CategoryScore, Decision, Result};
use serde::{Deserialize, Serialize};

pub const PROFANITY_PRESENT: f32 = 0.7;
pub const PROFANITY_ABSENT: f32 = 0.1;
pub const HOSTILITY_PRESENT: f32 = 0.75;
pub const HOSTILITY_ABSENT: f32 = 0.2;
pub const SLUR_PRESENT: f32 = 0.95;
pub const THREAT_PRESENT: f32 = 0.9;
pub const THREAT_ABSENT: f32 = 0.1;

pub const HATE_SPEECH: &str = "Hate Speech";
pub const PROFANITY: &str = "Profanity";
pub const THREATS: &str = "Threats";

const REJECTED_ACTIONS: [&str; 3] = [
    "Remove threatening or hateful language",
    "Rephrase to express disagreement respectfully",
    "Focus on constructive criticism rather than personal attacks",
];

const FLAGGED_ACTIONS: [&str; 3] = [
    "Consider using more respectful language",
    "Focus on the topic rather than individuals",
    "Express criticism constructively",
];

/// Term lists for the heuristic classifier.
///
/// Every list is matched case-insensitively by substring or whole word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicLexicons {
    pub profanity: Vec<String>,
    pub hostility: Vec<String>,
    pub slurs: Vec<String>,
    pub threats: Vec<String>,
}

impl HeuristicLexicons {
    /// Append extra terms to each list
    pub fn extend(&mut self, other: &HeuristicLexicons) {
        self.profanity.extend(other.profanity.iter().cloned());
        self.hostility.extend(other.hostility.iter().cloned());
        self.slurs.extend(other.slurs.iter().cloned());
        self.threats.extend(other.threats.iter().cloned());
    }
}

fn owned(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| t.to_string()).collect()
}

impl Default for HeuristicLexicons {
    fn default() -> Self {
        Self {
            profanity: owned(&[
                "damn", "hell", "shit", "fuck", "crap", "bitch", "bastard", "asshole", "piss",
                "wtf",
            ]),
            hostility: owned(&[
                "hate", "stupid", "idiot", "worthless", "loser", "pathetic", "disgusting",
                "moron", "dumb", "ugly", "get out", "shut up",
            ]),
            slurs: owned(&[
                "retard", "faggot", "tranny", "wetback", "raghead", "kike", "chink",
            ]),
            threats: owned(&["kill", "destroy", "hurt", "die", "murder", "attack"]),
        }
    }
}

/// Terms found by each lexicon
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeuristicMatches {
    pub profanity: Vec<String>,
    pub hostility: Vec<String>,
    pub slurs: Vec<String>,
    pub threats: Vec<String>,
}

impl HeuristicMatches {
    pub fn is_empty(&self) -> bool {
        self.profanity.is_empty()
            && self.hostility.is_empty()
            && self.slurs.is_empty()
            && self.threats.is_empty()
    }
}

/// Output of the heuristic classifier
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicOutcome {
    /// Hate Speech, Profanity and Threats, sorted descending
    pub categories: Vec<CategoryScore>,
    pub decision: Decision,
    pub reasoning: String,
    pub suggested_actions: Option<Vec<String>>,
    pub matches: HeuristicMatches,
}

/// Keyword/regex content classifier
#[derive(Debug)]
pub struct HeuristicClassifier {
    profanity: Lexicon,
    hostility: Lexicon,
    slurs: Lexicon,
    threats: Lexicon,
    thresholds: DecisionThresholds,
}

impl HeuristicClassifier {
    /// Create a classifier with the built-in lexicons
    pub fn new() -> Result<Self> {
        Self::with_lexicons(HeuristicLexicons::default(), DecisionThresholds::HEURISTIC)
    }

    pub fn with_lexicons(lexicons: HeuristicLexicons, thresholds: DecisionThresholds) -> Result<Self> {
        Ok(Self {
            profanity: Lexicon::new("profanity", lexicons.profanity)?,
            hostility: Lexicon::new("hostility", lexicons.hostility)?,
            slurs: Lexicon::new("slurs", lexicons.slurs)?,
            threats: Lexicon::new("threats", lexicons.threats)?,
            thresholds,
        })
    }

    pub fn thresholds(&self) -> DecisionThresholds {
        self.thresholds
    }

    /// Classify text. Pure and synchronous.
    pub fn classify(&self, text: &str) -> HeuristicOutcome {
        let matches = HeuristicMatches {
            profanity: to_owned(self.profanity.find(text)),
            hostility: to_owned(self.hostility.find(text)),
            slurs: to_owned(self.slurs.find(text)),
            threats: to_owned(self.threats.find(text)),
        };

        let has_profanity = !matches.profanity.is_empty();
        let has_hostility = !matches.hostility.is_empty();
        let has_slur = !matches.slurs.is_empty();
        let has_threat = !matches.threats.is_empty();

        let profanity_score = if has_profanity { PROFANITY_PRESENT } else { PROFANITY_ABSENT };
        let hostility_score = if has_hostility { HOSTILITY_PRESENT } else { HOSTILITY_ABSENT };
        let slur_score = if has_slur { SLUR_PRESENT } else { 0.0 };
        let hate_speech_score = hostility_score.max(slur_score);
        let threat_score = if has_threat { THREAT_PRESENT } else { THREAT_ABSENT };

        let hate_explanation = if has_slur {
            "The content contains slurs that target people based on protected characteristics."
        } else if has_hostility {
            "The content contains hostile or demeaning language directed at others."
        } else {
            "No significant hate speech detected in the content."
        };
        let profanity_explanation = if has_profanity {
            "The content contains words that may be considered profane or inappropriate."
        } else {
            "No significant profanity detected in the content."
        };
        let threat_explanation = if has_threat {
            "The content contains language that could be interpreted as threatening violence."
        } else {
            "No threatening language detected in the content."
        };

        let mut categories = vec![
            CategoryScore::new(HATE_SPEECH, hate_speech_score, hate_explanation),
            CategoryScore::new(PROFANITY, profanity_score, profanity_explanation),
            CategoryScore::new(THREATS, threat_score, threat_explanation),
        ];
        sort_categories(&mut categories);

        let decision = self.thresholds.decide_categories(&categories, None);

        let (reasoning, suggested_actions) = match decision {
            Decision::Rejected => {
                let reasoning = if has_slur {
                    "The content contains slurs, which violates our hate speech policy."
                        .to_string()
                } else if has_threat {
                    "The content contains language that may be interpreted as threatening, which violates our platform's safety policies."
                        .to_string()
                } else {
                    format!(
                        "The content exceeds the rejection threshold for {}.",
                        categories[0].name.to_lowercase()
                    )
                };
                (reasoning, Some(owned(&REJECTED_ACTIONS)))
            }
            Decision::Flagged => (
                "The content contains potentially harmful language that requires human review to determine if it violates platform policies."
                    .to_string(),
                Some(owned(&FLAGGED_ACTIONS)),
            ),
            Decision::Approved => (
                "The content appears to comply with our platform policies and has been approved."
                    .to_string(),
                None,
            ),
        };

        if !matches.is_empty() {
            tracing::debug!(
                profanity = ?matches.profanity,
                hostility = ?matches.hostility,
                slurs = matches.slurs.len(),
                threats = ?matches.threats,
                %decision,
                "Heuristic terms matched"
            );
        }

        HeuristicOutcome {
            categories,
            decision,
            reasoning,
            suggested_actions,
            matches,
        }
    }
}

fn to_owned(terms: Vec<&str>) -> Vec<String> {
    terms.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> HeuristicOutcome {
        HeuristicClassifier::new().unwrap().classify(text)
    }

    #[test]
    fn test_clean_text_is_approved() {
        let outcome = classify("I love this sunny day");

        assert_eq!(outcome.decision, Decision::Approved);
        assert!(outcome.suggested_actions.is_none());
        assert!(outcome.matches.is_empty());
        assert!(outcome.categories.iter().all(|c| c.score <= 0.2));
        assert_eq!(outcome.categories[0].name, HATE_SPEECH);
    }

    #[test]
    fn test_slur_is_rejected() {
        let outcome = classify("what a retard");

        assert_eq!(outcome.decision, Decision::Rejected);
        assert_eq!(outcome.categories[0].name, HATE_SPEECH);
        assert!(outcome.categories[0].score >= 0.95);
        assert_eq!(outcome.suggested_actions.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn test_slur_wins_over_hostility() {
        let outcome = classify("you stupid retard");
        assert_eq!(outcome.categories[0].score, SLUR_PRESENT);
        assert_eq!(outcome.decision, Decision::Rejected);
    }

    #[test]
    fn test_threat_alone_is_rejected() {
        let outcome = classify("I will hurt you");

        assert_eq!(outcome.decision, Decision::Rejected);
        assert_eq!(outcome.categories[0].name, THREATS);
        assert_eq!(outcome.categories[0].score, THREAT_PRESENT);
        assert!(outcome.reasoning.contains("threatening"));
    }

    #[test]
    fn test_kill_without_profanity_or_slur() {
        let outcome = classify("Going to kill them all");
        assert_eq!(outcome.matches.threats, ["kill"]);
        assert!(outcome.matches.profanity.is_empty());
        assert!(outcome.matches.slurs.is_empty());
        assert_eq!(outcome.decision, Decision::Rejected);
    }

    #[test]
    fn test_threat_terms_match_inside_words() {
        for text in ["that was so hurtful", "the murderous regime", "a killer app"] {
            let outcome = classify(text);
            assert_eq!(outcome.decision, Decision::Rejected, "{text}");
            assert_eq!(outcome.categories[0].name, THREATS);
        }
    }

    #[test]
    fn test_hostility_is_flagged() {
        let outcome = classify("You are worthless and I hate you, get out");

        assert_eq!(outcome.decision, Decision::Flagged);
        assert_eq!(outcome.categories[0].name, HATE_SPEECH);
        assert_eq!(outcome.categories[0].score, HOSTILITY_PRESENT);
        assert_eq!(outcome.suggested_actions.unwrap(), owned(&FLAGGED_ACTIONS));
        assert_eq!(outcome.matches.hostility, ["hate", "worthless", "get out"]);
    }

    #[test]
    fn test_profanity_is_flagged() {
        let outcome = classify("Damn, that was a long queue");

        assert_eq!(outcome.decision, Decision::Flagged);
        assert_eq!(outcome.categories[0].name, PROFANITY);
        assert_eq!(outcome.categories[0].score, PROFANITY_PRESENT);
    }

    #[test]
    fn test_categories_sorted_descending() {
        let outcome = classify("damn, I will destroy you");
        let scores: Vec<f32> = outcome.categories.iter().map(|c| c.score).collect();
        assert_eq!(scores, [THREAT_PRESENT, PROFANITY_PRESENT, HOSTILITY_ABSENT]);
    }

    #[test]
    fn test_custom_lexicons() {
        let mut lexicons = HeuristicLexicons::default();
        lexicons.extend(&HeuristicLexicons {
            profanity: vec!["frak".to_string()],
            hostility: vec![],
            slurs: vec![],
            threats: vec![],
        });

        let classifier =
            HeuristicClassifier::with_lexicons(lexicons, DecisionThresholds::HEURISTIC).unwrap();
        assert_eq!(classifier.classify("oh frak").decision, Decision::Flagged);
    }
}
