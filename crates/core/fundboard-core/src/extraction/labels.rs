//! Label parser for model output
//!
//! Reads `Label: value` lines. Labels are matched exactly against
//! [`ProfileField::label`]; anything else is ignored.

use crate::types::{ProfilePatch, ProfileField, StartupProfile};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

static LABEL_TABLE: Lazy<HashMap<&'static str, ProfileField>> = Lazy::new(|| {
    ProfileField::ALL
        .into_iter()
        .map(|field| (field.label(), field))
        .collect()
});

/// Look up the field a label maps to (case-sensitive)
pub fn field_for_label(label: &str) -> Option<ProfileField> {
    LABEL_TABLE.get(label).copied()
}

/// Field values recognized in one model response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    values: BTreeMap<ProfileField, String>,
}

impl ExtractionResult {
    /// Parse raw generated text
    pub fn parse(raw: &str) -> Self {
        let mut values = BTreeMap::new();

        for line in raw.split('\n') {
            let line = line.trim();
            let Some((label, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match field_for_label(label.trim()) {
                Some(field) => {
                    values.insert(field, value.to_string());
                }
                None => trace!(label = label.trim(), "Ignoring unrecognized label"),
            }
        }

        Self { values }
    }

    /// Value recognized for a field
    pub fn get(&self, field: ProfileField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Fields that were recognized
    pub fn fields(&self) -> impl Iterator<Item = ProfileField> + '_ {
        self.values.keys().copied()
    }

    /// Number of recognized fields
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing was recognized
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merge into a profile. Unrecognized fields keep their value.
    pub fn apply_to(&self, profile: &mut StartupProfile) {
        for (field, value) in &self.values {
            profile.set(*field, Some(value.clone()));
        }
    }

    /// Convert into a store patch that sets only the recognized fields
    pub fn into_patch(self) -> ProfilePatch {
        ProfilePatch {
            fields: self
                .values
                .into_iter()
                .map(|(field, value)| (field, Some(value)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognized_labels_are_assigned() {
        let result = ExtractionResult::parse(
            "Startup Name: Acme Robotics\nIndustries: AI\nRandomNoise\nFunding Stage: Seed",
        );

        assert_eq!(result.len(), 3);
        assert_eq!(result.get(ProfileField::Name), Some("Acme Robotics"));
        assert_eq!(result.get(ProfileField::Industries), Some("AI"));
        assert_eq!(result.get(ProfileField::FundingStage), Some("Seed"));
        assert_eq!(result.get(ProfileField::Revenue), None);
    }

    #[test]
    fn test_label_match_is_case_sensitive() {
        let result = ExtractionResult::parse("industries: AI\nTECH STACK: Rust");
        assert!(result.is_empty());
    }

    #[test]
    fn test_value_split_on_first_colon_only() {
        let result = ExtractionResult::parse("Location: San Francisco, CA: USA");
        assert_eq!(result.get(ProfileField::Location), Some("San Francisco, CA: USA"));
    }

    #[test]
    fn test_lines_without_colon_or_value_are_ignored() {
        let result = ExtractionResult::parse("Revenue\nRevenue:   \nTech Stack:\n\n");
        assert!(result.is_empty());
    }

    #[test]
    fn test_whitespace_around_label_and_value_is_trimmed() {
        let result = ExtractionResult::parse("   Growth Metrics :  40% MoM  \r\n");
        assert_eq!(result.get(ProfileField::GrowthMetrics), Some("40% MoM"));
    }

    #[test]
    fn test_unrecognized_labels_are_ignored() {
        let result = ExtractionResult::parse("CEO: Jane\n**Startup Name**: Acme\nTech Stack: Rust");
        assert_eq!(result.fields().collect::<Vec<_>>(), vec![ProfileField::TechStack]);
    }

    #[test]
    fn test_last_repeated_label_wins() {
        let result = ExtractionResult::parse("Funding Stage: Seed\nFunding Stage: Series A");
        assert_eq!(result.get(ProfileField::FundingStage), Some("Series A"));
    }

    #[test]
    fn test_apply_leaves_unseen_fields_untouched() {
        let mut profile = StartupProfile::new_for("user-1");
        profile.name = Some("Old Name".to_string());
        profile.revenue = Some("$2M ARR".to_string());

        ExtractionResult::parse("Startup Name: Acme Robotics\nRevenue:")
            .apply_to(&mut profile);

        assert_eq!(profile.name.as_deref(), Some("Acme Robotics"));
        assert_eq!(profile.revenue.as_deref(), Some("$2M ARR"));
    }

    #[test]
    fn test_into_patch_sets_only_recognized_fields() {
        let patch = ExtractionResult::parse("Location: Austin, TX").into_patch();
        assert_eq!(patch.fields.len(), 1);
        assert_eq!(
            patch.fields.get(&ProfileField::Location),
            Some(&Some("Austin, TX".to_string()))
        );
    }
}
