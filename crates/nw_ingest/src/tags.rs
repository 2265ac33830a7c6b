use std::collections::BTreeSet;

// Presentation-layer enrichment only: retrieval never reads tags.
const TOPICS: &[(&str, &[&str])] = &[
    ("politics", &["election", "government", "senate", "parliament", "minister"]),
    ("tech", &["software", "startup", "chip", "silicon", "app", "cyber"]),
    ("ai", &["artificial intelligence", "machine learning", "llm", "neural"]),
    ("economy", &["inflation", "market", "stocks", "economy", "interest rate"]),
    ("science", &["researchers", "study finds", "scientists", "experiment"]),
    ("health", &["hospital", "vaccine", "outbreak", "public health"]),
    ("climate", &["climate", "emissions", "wildfire", "drought"]),
];

/// Naive keyword pass over the article text.
pub fn keyword_tags(text: &str) -> BTreeSet<String> {
    let haystack = text.to_lowercase();
    TOPICS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| haystack.contains(k)))
        .map(|(topic, _)| topic.to_string())
        .collect()
}
