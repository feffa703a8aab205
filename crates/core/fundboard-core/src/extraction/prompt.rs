//! Field extraction prompt and requester

use crate::types::{ProfileField, TextGenerator};
use crate::Result;
use std::sync::Arc;
use tracing::debug;

/// Maximum number of characters of document text embedded in a prompt
pub const PROMPT_TEXT_BUDGET: usize = 5000;

/// Industry categories the model may choose from
pub const INDUSTRY_CHOICES: [&str; 10] = [
    "AI",
    "FinTech",
    "HealthTech",
    "EdTech",
    "CleanTech",
    "E-commerce",
    "SaaS",
    "Biotech",
    "Cybersecurity",
    "Other",
];

/// Labels requested from the model, in prompt order, with their instructions
pub const TARGET_LABELS: [(ProfileField, &str); 9] = [
    (ProfileField::Name, "the company's name"),
    (
        ProfileField::Industries,
        "exactly one industry category from the allowed list",
    ),
    (
        ProfileField::FundingStage,
        "current funding stage, e.g. Pre-seed, Seed, Series A",
    ),
    (
        ProfileField::FundingAmount,
        "amount of funding being raised, with currency",
    ),
    (
        ProfileField::PreferredInvestmentFirm,
        "any investment firm the founders name as a preferred investor",
    ),
    (ProfileField::Location, "city and region of the headquarters"),
    (ProfileField::Revenue, "current revenue or ARR figures"),
    (
        ProfileField::GrowthMetrics,
        "key growth metrics such as user counts or month-over-month growth",
    ),
    (
        ProfileField::TechStack,
        "main technologies, frameworks and platforms",
    ),
];

/// Cut text to the prompt budget, counted in characters
pub fn truncate_to_budget(text: &str) -> &str {
    match text.char_indices().nth(PROMPT_TEXT_BUDGET) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Build the extraction prompt for a document's text
pub fn build_prompt(text: &str) -> String {
    let mut prompt = String::from(
        "You are analyzing the text of a startup pitch deck. \
         Extract the following information and answer with one line per item, \
         formatted exactly as \"Label: value\". Use the labels verbatim. \
         Leave out any item the text does not mention.\n\n",
    );

    for (field, description) in TARGET_LABELS {
        prompt.push_str(&format!("{}: {}", field.label(), description));
        if field == ProfileField::Industries {
            prompt.push_str(&format!(" (one of: {})", INDUSTRY_CHOICES.join(", ")));
        }
        prompt.push('\n');
    }

    prompt.push_str("\nPitch deck text:\n");
    prompt.push_str(truncate_to_budget(text));
    prompt
}

/// Sends extracted document text to the generative-text endpoint
#[derive(Clone)]
pub struct FieldExtractionRequester {
    generator: Arc<dyn TextGenerator>,
}

impl FieldExtractionRequester {
    /// Create a requester over a text generator
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Request field values for the given text; returns the raw model output
    pub async fn request(&self, text: &str) -> Result<String> {
        let prompt = build_prompt(text);
        debug!(
            generator = self.generator.name(),
            prompt_chars = prompt.chars().count(),
            "Requesting field extraction"
        );
        self.generator.generate(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGenerator;
    use crate::FundboardError;

    #[test]
    fn test_prompt_lists_every_label_in_order() {
        let prompt = build_prompt("deck");
        let mut last = 0;
        for (field, _) in TARGET_LABELS {
            let pos = prompt.find(&format!("{}:", field.label())).unwrap();
            assert!(pos >= last, "{} out of order", field.label());
            last = pos;
        }
        assert!(prompt.contains("one of: AI, FinTech"));
        assert!(prompt.ends_with("deck"));
    }

    #[test]
    fn test_short_text_is_embedded_whole() {
        assert_eq!(truncate_to_budget("short"), "short");
        assert!(build_prompt("short text").contains("short text"));
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let text = "é".repeat(PROMPT_TEXT_BUDGET + 10);
        let cut = truncate_to_budget(&text);
        assert_eq!(cut.chars().count(), PROMPT_TEXT_BUDGET);
    }

    #[tokio::test]
    async fn test_prompt_sent_upstream_carries_exactly_the_budget() {
        let text: String = (0..6000)
            .map(|i| char::from(b'a' + (i % 26) as u8))
            .collect();
        let generator = Arc::new(ScriptedGenerator::new(vec!["Startup Name: X".to_string()]));
        let requester = FieldExtractionRequester::new(generator.clone());

        let reply = requester.request(&text).await.unwrap();
        assert_eq!(reply, "Startup Name: X");

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains(&text[..PROMPT_TEXT_BUDGET]));
        assert!(!prompts[0].contains(&text[..PROMPT_TEXT_BUDGET + 1]));
    }

    #[tokio::test]
    async fn test_upstream_error_is_passed_through() {
        let generator = Arc::new(ScriptedGenerator::failing(FundboardError::upstream(
            429,
            "quota exceeded",
        )));
        let requester = FieldExtractionRequester::new(generator);

        let err = requester.request("text").await.unwrap_err();
        assert!(matches!(err, FundboardError::Upstream { status: 429, .. }));
    }
}
