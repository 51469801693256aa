//! Policy knowledge base

use modguard_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// A moderation policy in the knowledge base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Stable identifier
    pub id: String,

    /// Display name, cited in analysis results
    pub name: String,

    /// What the policy prohibits
    pub description: String,

    /// Keywords used for retrieval, matched case-insensitively
    pub keywords: Vec<String>,

    /// Example violations
    #[serde(default, alias = "exampleViolations")]
    pub examples: Vec<String>,
}

impl Policy {
    fn builtin(
        id: &str,
        name: &str,
        description: &str,
        keywords: &[&str],
        examples: &[&str],
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            examples: examples.iter().map(|e| e.to_string()).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogueFile {
    policies: Vec<Policy>,
}

/// Immutable, ordered catalogue of policies
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    policies: Vec<Policy>,
}

impl KnowledgeBase {
    /// Build a knowledge base from policies, validating the catalogue
    pub fn new(policies: Vec<Policy>) -> Result<Self> {
        if policies.is_empty() {
            return Err(Error::config("policy catalogue is empty"));
        }

        let mut seen = HashSet::new();
        for policy in &policies {
            if !seen.insert(policy.id.as_str()) {
                return Err(Error::config(format!("duplicate policy id '{}'", policy.id)));
            }
            if policy.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(Error::config(format!(
                    "policy '{}' has no keywords",
                    policy.id
                )));
            }
        }

        Ok(Self { policies })
    }

    /// Load a catalogue from a YAML string with a top-level `policies` list
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let file: CatalogueFile = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("invalid policy catalogue: {e}")))?;
        Self::new(file.policies)
    }

    /// Load a catalogue from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let kb = Self::from_yaml(&content)?;
        tracing::info!(
            path = %path.as_ref().display(),
            policies = kb.len(),
            "Loaded policy catalogue"
        );
        Ok(kb)
    }

    /// The built-in moderation catalogue
    pub fn builtin() -> Self {
        Self {
            policies: builtin_policies(),
        }
    }

    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }

    pub fn get(&self, id: &str) -> Option<&Policy> {
        self.policies.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_policies() -> Vec<Policy> {
    vec![
        Policy::builtin(
            "policy-1",
            "Harassment Policy",
            "Content targeting individuals with intent to harm, bully, or belittle is not allowed. This includes repeated unwanted communications, threats, or content that creates a hostile environment for others.",
            &["harass", "bully", "attack", "insult", "hate", "target", "mock", "ridicule", "hostile"],
            &[
                "Repeated unwanted mentions or replies",
                "Name-calling or personal attacks",
                "Encouraging others to harass someone",
            ],
        ),
        Policy::builtin(
            "policy-2",
            "Hate Speech Policy",
            "Content promoting hatred, violence or discrimination against protected groups based on attributes such as race, ethnicity, gender, religion, sexual orientation, or disability is prohibited.",
            &["hate", "racist", "sexist", "bigot", "discriminate", "slur", "stereotype", "intolerant"],
            &[
                "Using derogatory terms for specific groups",
                "Promoting stereotypes that dehumanize groups",
                "Calling for violence against protected categories",
            ],
        ),
        Policy::builtin(
            "policy-3",
            "Profanity Policy",
            "Excessive or targeted profanity that creates a hostile environment is moderated. While occasional mild profanity is permitted, content that uses profanity excessively or specifically to attack others may be flagged.",
            &["damn", "hell", "profanity", "swear", "curse", "f-word", "obscene", "vulgar"],
            &[
                "Excessive use of profanity in a single post",
                "Using profanity specifically to insult others",
                "Bypassing filters with alternate spellings of profane words",
            ],
        ),
        Policy::builtin(
            "policy-4",
            "Threat Policy",
            "Direct or indirect threats of violence are strictly prohibited. This includes content that expresses a wish for harm to come to individuals or groups, or content that describes specific violent acts against others.",
            &["kill", "hurt", "destroy", "threat", "violence", "attack", "harm", "bomb", "shoot", "murder", "die"],
            &[
                "Threatening physical harm to individuals or groups",
                "Wishing death or injury on others",
                "Describing plans for violent acts",
            ],
        ),
        Policy::builtin(
            "policy-5",
            "Misinformation Policy",
            "Content that deliberately spreads false information that could cause harm is prohibited. This includes health misinformation, election misinformation, or false information during crises.",
            &["fake", "lie", "untrue", "conspiracy", "hoax", "false", "mislead", "disinformation", "propaganda"],
            &[
                "Spreading known medical falsehoods that could cause harm",
                "Deliberately misrepresenting election processes",
                "Sharing manipulated media presented as authentic",
            ],
        ),
        Policy::builtin(
            "policy-6",
            "Self-Harm & Suicide Policy",
            "Content that promotes, encourages, or glorifies self-harm or suicide is prohibited. This includes detailed descriptions, instructions, or encouragement of self-harming behaviors.",
            &["suicide", "self-harm", "kill myself", "cutting", "anorexia", "eating disorder", "end my life"],
            &[
                "Encouraging self-harming behaviors",
                "Providing instructions for suicidal actions",
                "Glorifying or romanticizing suicide",
            ],
        ),
        Policy::builtin(
            "policy-7",
            "Child Safety Policy",
            "Content that sexualizes minors, exploits children, or puts children at risk is strictly prohibited and will be reported to authorities. This includes sexualized comments about minors and content that endangers children.",
            &["child", "minor", "underage", "kid", "teen", "exploitation", "abuse", "pedophilia"],
            &[
                "Sexualized content involving minors",
                "Sharing personal information of minors",
                "Content that endangers the wellbeing of children",
            ],
        ),
        Policy::builtin(
            "policy-8",
            "Privacy Violation Policy",
            "Sharing someone's private information without consent is prohibited. This includes doxxing, unauthorized sharing of personal photos, or revealing private conversations without permission.",
            &["dox", "private", "personal", "address", "phone", "email", "leak", "expose", "privacy"],
            &[
                "Sharing someone's home address or phone number",
                "Posting screenshots of private conversations",
                "Sharing non-public personal information",
            ],
        ),
        Policy::builtin(
            "policy-9",
            "Graphic Content Policy",
            "Excessively graphic, gory, or disturbing content must be properly labeled. Extremely graphic content showing gratuitous violence, severe injuries, or death may be removed even with proper warnings.",
            &["graphic", "gore", "blood", "injury", "death", "disturbing", "violent", "gruesome"],
            &[
                "Extremely graphic injury or death images",
                "Gratuitous violence for shock value",
                "Unlabeled disturbing content",
            ],
        ),
        Policy::builtin(
            "policy-10",
            "Spam & Manipulation Policy",
            "Content that manipulates the platform through inauthentic interactions, excessive posting, or coordinated campaigns is prohibited. This includes artificially boosting engagement and spam.",
            &["spam", "bot", "fake account", "artificial", "engagement", "manipulation", "coordinated", "amplification"],
            &[
                "Posting the same content repeatedly",
                "Using bots to artificially boost engagement",
                "Coordinated harassment campaigns",
            ],
        ),
    ]
}
