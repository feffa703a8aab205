//! Startup profile types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One of the nine free-text attributes of a startup profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProfileField {
    /// Company name
    Name,
    /// Industry category
    Industries,
    /// Current funding stage (Seed, Series A, ...)
    FundingStage,
    /// Amount being raised
    FundingAmount,
    /// Investment firm the founders would prefer
    PreferredInvestmentFirm,
    /// Headquarters location
    Location,
    /// Revenue figures
    Revenue,
    /// Growth metrics (MoM growth, users, ...)
    GrowthMetrics,
    /// Technology stack
    TechStack,
}

impl ProfileField {
    /// Every field, in display order
    pub const ALL: [ProfileField; 9] = [
        ProfileField::Name,
        ProfileField::Industries,
        ProfileField::FundingStage,
        ProfileField::FundingAmount,
        ProfileField::PreferredInvestmentFirm,
        ProfileField::Location,
        ProfileField::Revenue,
        ProfileField::GrowthMetrics,
        ProfileField::TechStack,
    ];

    /// Label the language model is asked to emit for this field
    pub fn label(self) -> &'static str {
        match self {
            ProfileField::Name => "Startup Name",
            ProfileField::Industries => "Industries",
            ProfileField::FundingStage => "Funding Stage",
            ProfileField::FundingAmount => "Funding Amount",
            ProfileField::PreferredInvestmentFirm => "Preferred Investment Firm",
            ProfileField::Location => "Location",
            ProfileField::Revenue => "Revenue",
            ProfileField::GrowthMetrics => "Growth Metrics",
            ProfileField::TechStack => "Tech Stack",
        }
    }

    /// Document key used by the store and the JSON API
    pub fn key(self) -> &'static str {
        match self {
            ProfileField::Name => "name",
            ProfileField::Industries => "industries",
            ProfileField::FundingStage => "fundingStage",
            ProfileField::FundingAmount => "fundingAmount",
            ProfileField::PreferredInvestmentFirm => "preferredInvestmentFirm",
            ProfileField::Location => "location",
            ProfileField::Revenue => "revenue",
            ProfileField::GrowthMetrics => "growthMetrics",
            ProfileField::TechStack => "techStack",
        }
    }
}

impl std::fmt::Display for ProfileField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for ProfileField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProfileField::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| format!("Unknown profile field: {}", s))
    }
}

/// A startup's profile, owned by exactly one user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupProfile {
    /// Store-assigned record id; `None` until first saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Owning user identity
    pub user_id: String,

    /// Company name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Industry category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industries: Option<String>,
    /// Funding stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_stage: Option<String>,
    /// Amount being raised
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_amount: Option<String>,
    /// Preferred investor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_investment_firm: Option<String>,
    /// Headquarters location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Revenue figures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<String>,
    /// Growth metrics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth_metrics: Option<String>,
    /// Technology stack
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<String>,

    /// Set once at creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Refreshed on every mutation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StartupProfile {
    /// Create an empty, unsaved profile for a user
    pub fn new_for(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    /// Whether the profile has never been written to the store
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    fn slot(&self, field: ProfileField) -> &Option<String> {
        match field {
            ProfileField::Name => &self.name,
            ProfileField::Industries => &self.industries,
            ProfileField::FundingStage => &self.funding_stage,
            ProfileField::FundingAmount => &self.funding_amount,
            ProfileField::PreferredInvestmentFirm => &self.preferred_investment_firm,
            ProfileField::Location => &self.location,
            ProfileField::Revenue => &self.revenue,
            ProfileField::GrowthMetrics => &self.growth_metrics,
            ProfileField::TechStack => &self.tech_stack,
        }
    }

    fn slot_mut(&mut self, field: ProfileField) -> &mut Option<String> {
        match field {
            ProfileField::Name => &mut self.name,
            ProfileField::Industries => &mut self.industries,
            ProfileField::FundingStage => &mut self.funding_stage,
            ProfileField::FundingAmount => &mut self.funding_amount,
            ProfileField::PreferredInvestmentFirm => &mut self.preferred_investment_firm,
            ProfileField::Location => &mut self.location,
            ProfileField::Revenue => &mut self.revenue,
            ProfileField::GrowthMetrics => &mut self.growth_metrics,
            ProfileField::TechStack => &mut self.tech_stack,
        }
    }

    /// Read a field
    pub fn get(&self, field: ProfileField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Overwrite a field; `None` clears it
    pub fn set(&mut self, field: ProfileField, value: Option<String>) {
        *self.slot_mut(field) = value;
    }

    /// Fields that currently hold a value
    pub fn filled_fields(&self) -> Vec<ProfileField> {
        ProfileField::ALL
            .into_iter()
            .filter(|field| self.slot(*field).is_some())
            .collect()
    }
}

/// Partial update for a stored profile
///
/// `Some(value)` sets the field, `None` clears it. Fields absent from the
/// map are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    /// Field changes
    pub fields: BTreeMap<ProfileField, Option<String>>,
}

impl ProfilePatch {
    /// Empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch carrying every field of a profile, including cleared ones
    pub fn from_profile(profile: &StartupProfile) -> Self {
        let fields = ProfileField::ALL
            .into_iter()
            .map(|field| (field, profile.get(field).map(str::to_string)))
            .collect();
        Self { fields }
    }

    /// Set a field in the patch
    pub fn with(mut self, field: ProfileField, value: Option<String>) -> Self {
        self.fields.insert(field, value);
        self
    }

    /// Whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Apply the patch to a profile in memory
    pub fn apply_to(&self, profile: &mut StartupProfile) {
        for (field, value) in &self.fields {
            profile.set(*field, value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_keys_round_trip_through_from_str() {
        for field in ProfileField::ALL {
            assert_eq!(field.key().parse::<ProfileField>().unwrap(), field);
        }
        assert!("companyName".parse::<ProfileField>().is_err());
    }

    #[test]
    fn test_get_and_set() {
        let mut profile = StartupProfile::new_for("user-1");
        assert!(profile.is_new());
        assert!(profile.filled_fields().is_empty());

        profile.set(ProfileField::TechStack, Some("Rust".to_string()));
        assert_eq!(profile.get(ProfileField::TechStack), Some("Rust"));
        assert_eq!(profile.filled_fields(), vec![ProfileField::TechStack]);

        profile.set(ProfileField::TechStack, None);
        assert_eq!(profile.get(ProfileField::TechStack), None);
    }

    #[test]
    fn test_serializes_with_document_keys() {
        let mut profile = StartupProfile::new_for("user-1");
        profile.funding_stage = Some("Seed".to_string());
        let json = serde_json::to_value(&profile).unwrap();

        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["fundingStage"], "Seed");
        assert!(json.get("id").is_none());
        assert!(json.get("revenue").is_none());
    }

    #[test]
    fn test_patch_leaves_unlisted_fields_alone() {
        let mut profile = StartupProfile::new_for("user-1");
        profile.location = Some("Austin, TX".to_string());
        profile.revenue = Some("$1M ARR".to_string());

        ProfilePatch::new()
            .with(ProfileField::Revenue, None)
            .with(ProfileField::Name, Some("Acme".to_string()))
            .apply_to(&mut profile);

        assert_eq!(profile.location.as_deref(), Some("Austin, TX"));
        assert_eq!(profile.revenue, None);
        assert_eq!(profile.name.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_patch_from_profile_covers_every_field() {
        let profile = StartupProfile::new_for("user-1");
        let patch = ProfilePatch::from_profile(&profile);
        assert_eq!(patch.fields.len(), ProfileField::ALL.len());
        assert!(patch.fields.values().all(Option::is_none));
    }
}
