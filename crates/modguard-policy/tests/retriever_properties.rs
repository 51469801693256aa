//! Property tests for policy retrieval ordering and bounds

use modguard_policy::{KnowledgeBase, Policy, PolicyRetriever};
use proptest::prelude::*;

const VOCABULARY: &[&str] = &[
    "hate", "kill", "spam", "fake", "damn", "phone", "child", "blood", "hello", "weather",
    "market", "bully", "conspiracy", "violence", "privacy", "the", "and", "you",
];

fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(VOCABULARY), 0..24).prop_map(|w| w.join(" "))
}

fn catalogue_strategy() -> impl Strategy<Value = KnowledgeBase> {
    prop::collection::vec(
        prop::collection::vec(prop::sample::select(VOCABULARY), 1..6),
        1..12,
    )
    .prop_map(|policies| {
        let policies = policies
            .into_iter()
            .enumerate()
            .map(|(i, keywords)| Policy {
                id: format!("p{i}"),
                name: format!("Policy {i}"),
                description: String::new(),
                keywords: keywords.into_iter().map(str::to_string).collect(),
                examples: vec![],
            })
            .collect();
        KnowledgeBase::new(policies).unwrap()
    })
}

proptest! {
    #[test]
    fn retrieval_is_bounded_and_sorted(kb in catalogue_strategy(), text in text_strategy()) {
        let retriever = PolicyRetriever::new(kb).unwrap();
        let matches = retriever.retrieve(&text, 3);

        prop_assert!(matches.len() <= 3);
        for m in &matches {
            prop_assert!(m.relevance > 0.0 && m.relevance <= 1.0);
        }
        for pair in matches.windows(2) {
            prop_assert!(pair[0].relevance >= pair[1].relevance);
        }
    }

    #[test]
    fn retrieval_is_idempotent(text in text_strategy()) {
        let retriever = PolicyRetriever::builtin().unwrap();
        prop_assert_eq!(retriever.retrieve_top(&text), retriever.retrieve_top(&text));
    }

    #[test]
    fn retrieval_ignores_case(text in text_strategy()) {
        let retriever = PolicyRetriever::builtin().unwrap();
        prop_assert_eq!(
            retriever.retrieve_top(&text),
            retriever.retrieve_top(&text.to_uppercase())
        );
    }
}
