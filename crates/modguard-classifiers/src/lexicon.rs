//! Term lexicons matched by substring and by whole word

use aho_corasick::AhoCorasick;
use modguard_core::{Error, Result};
use regex::Regex;
use std::collections::HashMap;

/// Common English inflections accepted after a whole-word term
const INFLECTIONS: &str = "s|es|ed|d|ing|er|ers";

/// How a lexicon decides that a term is present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Case-insensitive substring OR whole word
    SubstringOrWord,
    /// Whole word, optionally followed by a common inflection
    WordInflected,
}

/// A named list of terms.
///
/// In [`MatchMode::SubstringOrWord`] a term is present when it occurs as a
/// case-insensitive substring or as a whole word; the two checks are unioned
/// so both exact words and embedded variants are caught.
pub struct Lexicon {
    name: String,
    terms: Vec<String>,
    substring: Option<AhoCorasick>,
    word: Option<Regex>,
    term_index: HashMap<String, usize>,
}

impl Lexicon {
    /// Build a substring-or-word lexicon; blank and duplicate terms are dropped
    pub fn new<I, S>(name: impl Into<String>, terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_mode(name, terms, MatchMode::SubstringOrWord)
    }

    /// Build a whole-word lexicon accepting inflected forms (`kill` matches `killing`)
    pub fn word_inflected<I, S>(name: impl Into<String>, terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_mode(name, terms, MatchMode::WordInflected)
    }

    pub fn with_mode<I, S>(name: impl Into<String>, terms: I, mode: MatchMode) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let mut unique: Vec<String> = Vec::new();
        let mut term_index = HashMap::new();
        for term in terms {
            let term = term.into().trim().to_lowercase();
            if term.is_empty() || term_index.contains_key(&term) {
                continue;
            }
            term_index.insert(term.clone(), unique.len());
            unique.push(term);
        }

        let substring = match mode {
            MatchMode::SubstringOrWord => Some(
                AhoCorasick::builder()
                    .build(&unique)
                    .map_err(|e| {
                        Error::classifier(format!("Failed to build '{name}' matcher: {e}"))
                    })?,
            ),
            MatchMode::WordInflected => None,
        };

        let word = if unique.is_empty() {
            None
        } else {
            let alternation = unique
                .iter()
                .map(|t| regex::escape(t))
                .collect::<Vec<_>>()
                .join("|");
            let suffix = match mode {
                MatchMode::SubstringOrWord => String::new(),
                MatchMode::WordInflected => format!("(?:{INFLECTIONS})?"),
            };
            let re = Regex::new(&format!(r"(?i)\b({alternation}){suffix}\b"))
                .map_err(|e| Error::classifier(format!("Failed to build '{name}' regex: {e}")))?;
            Some(re)
        };

        Ok(Self {
            name,
            terms: unique,
            substring,
            word,
            term_index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Terms present in `text`, in lexicon order
    pub fn find(&self, text: &str) -> Vec<&str> {
        let mut present = vec![false; self.terms.len()];

        if let Some(substring) = &self.substring {
            // terms are stored lowercased; the automaton only folds ASCII
            let lowered = text.to_lowercase();
            for m in substring.find_overlapping_iter(&lowered) {
                present[m.pattern().as_usize()] = true;
            }
        }

        if let Some(word) = &self.word {
            for caps in word.captures_iter(text) {
                let Some(term) = caps.get(1) else { continue };
                if let Some(&idx) = self.term_index.get(&term.as_str().to_lowercase()) {
                    present[idx] = true;
                }
            }
        }

        self.terms
            .iter()
            .zip(present)
            .filter(|(_, hit)| *hit)
            .map(|(term, _)| term.as_str())
            .collect()
    }

    /// Whether any term is present
    pub fn is_match(&self, text: &str) -> bool {
        !self.find(text).is_empty()
    }
}

impl std::fmt::Debug for Lexicon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexicon")
            .field("name", &self.name)
            .field("terms", &self.terms.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_and_word_matches() {
        let lexicon = Lexicon::new("profanity", ["damn", "hell", "damn"]).unwrap();
        assert_eq!(lexicon.terms().len(), 2);

        assert_eq!(lexicon.find("DAMN it"), ["damn"]);
        // substring variants count too
        assert_eq!(lexicon.find("hello there"), ["hell"]);
        assert!(lexicon.find("nothing to see").is_empty());
    }

    #[test]
    fn test_multi_word_terms() {
        let lexicon = Lexicon::new("hostility", ["get out", "loser"]).unwrap();
        assert_eq!(lexicon.find("Loser, GET OUT"), ["get out", "loser"]);
    }

    #[test]
    fn test_empty_lexicon_matches_nothing() {
        let lexicon = Lexicon::new("empty", Vec::<String>::new()).unwrap();
        assert!(!lexicon.is_match("anything at all"));
    }

    #[test]
    fn test_word_inflected_mode() {
        let lexicon = Lexicon::word_inflected("threats", ["kill", "die", "murder"]).unwrap();
        assert_eq!(lexicon.find("they were KILLING it"), ["kill"]);
        assert_eq!(lexicon.find("he died, the murderer ran"), ["die", "murder"]);
        // no substring matching in this mode
        assert!(lexicon.find("the audience studied the diesel engine").is_empty());
        assert!(!lexicon.is_match("skills"));
    }

    #[test]
    fn test_non_ascii_terms_ignore_case() {
        let lexicon = Lexicon::new("insults", ["Crétin", "dummkopf"]).unwrap();
        assert_eq!(lexicon.find("QUEL CRÉTIN"), ["crétin"]);
        assert_eq!(lexicon.find("SO EIN DUMMKOPFÄHNLICHES"), ["dummkopf"]);
    }

    #[test]
    fn test_terms_are_escaped() {
        let lexicon = Lexicon::new("symbols", ["f*ck", "a.b"]).unwrap();
        assert!(lexicon.is_match("what the f*ck"));
        assert!(!lexicon.is_match("axb"));
    }
}
