//! Funding opportunity catalog

use serde::Serialize;

/// A funding source shown on the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingOpportunity {
    /// Fund or program name
    pub name: &'static str,
    /// Kind of investor
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Smallest typical check
    pub min_investment: &'static str,
    /// Largest typical check
    pub max_investment: &'static str,
    /// Sector focus
    pub focus: &'static str,
    /// Stage the investor targets
    pub stage: &'static str,
    /// Where the investor is based
    pub location: &'static str,
    /// Fit with the caller's profile
    pub match_score: &'static str,
}

static CATALOG: [FundingOpportunity; 3] = [
    FundingOpportunity {
        name: "Tech Innovators Fund",
        kind: "Venture Capital",
        min_investment: "$500,000",
        max_investment: "$5,000,000",
        focus: "AI & Machine Learning",
        stage: "Series A",
        location: "San Francisco, CA",
        match_score: "95%",
    },
    FundingOpportunity {
        name: "Green Energy Accelerator",
        kind: "Accelerator",
        min_investment: "$50,000",
        max_investment: "$250,000",
        focus: "Clean Energy",
        stage: "Seed",
        location: "Austin, TX",
        match_score: "88%",
    },
    FundingOpportunity {
        name: "HealthTech Angels",
        kind: "Angel Network",
        min_investment: "$100,000",
        max_investment: "$1,000,000",
        focus: "Healthcare Technology",
        stage: "Early Stage",
        location: "Boston, MA",
        match_score: "82%",
    },
];

/// Every opportunity, or only those whose stage matches (case-insensitive)
pub fn list_opportunities(stage: Option<&str>) -> Vec<&'static FundingOpportunity> {
    let wanted = stage.map(str::trim).filter(|s| !s.is_empty());
    CATALOG
        .iter()
        .filter(|o| wanted.map_or(true, |s| o.stage.eq_ignore_ascii_case(s)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unfiltered_returns_all() {
        assert_eq!(list_opportunities(None).len(), 3);
        assert_eq!(list_opportunities(Some("  ")).len(), 3);
    }

    #[test]
    fn test_stage_filter_ignores_case() {
        let seed = list_opportunities(Some("seed"));
        assert_eq!(seed.len(), 1);
        assert_eq!(seed[0].name, "Green Energy Accelerator");
        assert!(list_opportunities(Some("Series C")).is_empty());
    }

    #[test]
    fn test_serializes_type_key() {
        let json = serde_json::to_value(list_opportunities(Some("Series A"))[0]).unwrap();
        assert_eq!(json["type"], "Venture Capital");
        assert_eq!(json["matchScore"], "95%");
    }
}
