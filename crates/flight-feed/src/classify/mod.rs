// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Callsign classification.
//!
//! Aircraft are sorted into a fixed set of [`Category`] values using an
//! ordered table of [`Rule`]s. The first rule whose tokens match the
//! uppercased callsign wins; callsigns matching nothing (including blank
//! ones) are General Aviation.
//!
//! Matching is plain substring containment, not anchored to the start of the
//! callsign, because feeds embed the operator code at different offsets. A
//! rule may additionally carry prefix-only tokens for codes that are too
//! short to match safely anywhere in the string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Derived semantic category of an aircraft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Military,
    Passenger,
    #[serde(rename = "Business Jet")]
    BusinessJet,
    Cargo,
    #[serde(rename = "General Aviation")]
    GeneralAviation,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Military,
        Category::Passenger,
        Category::BusinessJet,
        Category::Cargo,
        Category::GeneralAviation,
    ];

    /// Human-readable label, as shown in tables and used in config files.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Military => "Military",
            Category::Passenger => "Passenger",
            Category::BusinessJet => "Business Jet",
            Category::Cargo => "Cargo",
            Category::GeneralAviation => "General Aviation",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
#[error("unknown aircraft category: {0}")]
pub struct UnknownCategory(String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "military" => Ok(Category::Military),
            "passenger" => Ok(Category::Passenger),
            "businessjet" | "business" => Ok(Category::BusinessJet),
            "cargo" => Ok(Category::Cargo),
            "generalaviation" | "general" | "ga" => Ok(Category::GeneralAviation),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

/// One entry of the ordered classification table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub category: Category,
    /// Tokens matched anywhere in the callsign.
    #[serde(default)]
    pub contains: Vec<String>,
    /// Tokens matched only at the start of the callsign.
    #[serde(default)]
    pub prefixes: Vec<String>,
}

impl Rule {
    #[must_use]
    pub fn new(category: Category, contains: &[&str], prefixes: &[&str]) -> Self {
        Self {
            category,
            contains: contains.iter().map(|t| (*t).to_string()).collect(),
            prefixes: prefixes.iter().map(|t| (*t).to_string()).collect(),
        }
    }

    /// `callsign` must already be uppercased.
    fn matches(&self, callsign: &str) -> bool {
        self.contains.iter().any(|t| callsign.contains(t.as_str()))
            || self.prefixes.iter().any(|t| callsign.starts_with(t.as_str()))
    }

    fn normalized(&self) -> Self {
        let clean = |tokens: &[String]| -> Vec<String> {
            tokens
                .iter()
                .map(|t| t.trim().to_uppercase())
                .filter(|t| !t.is_empty())
                .collect()
        };
        Self {
            category: self.category,
            contains: clean(&self.contains),
            prefixes: clean(&self.prefixes),
        }
    }
}

/// The built-in rule table, in evaluation order.
#[must_use]
pub fn default_rules() -> Vec<Rule> {
    vec![
        // USAF Reach, tankers, branch callsigns, aeromedical
        Rule::new(
            Category::Military,
            &["RCH", "REACH", "SHELL", "NAVY", "ARMY", "EVAC", "CNV"],
            &["MC"],
        ),
        Rule::new(
            Category::Passenger,
            &[
                "AAL", "DAL", "UAL", "SWA", "JBU", "FFT", "ASA", "POE", "NKS", "ROU", "AAY",
                "SCX", "LPE", "VOI", "TAP", "GXA", "CFG", "PDT", "EIN", "BAW", "KAL", "AFR",
                "JSX", "MXY", "FLE", "ACA", "ENY", "WJA", "TAM", "TAI", "EDV", "BHS", "VXP",
                "AVA", "RPA", "TFL", "THY",
            ],
            &[],
        ),
        Rule::new(
            Category::BusinessJet,
            &[
                "EJA", "LXJ", "JTL", "ASP", "RNI", "SGX", "VJA", "EJM", "KOW", "RKJ", "NEW",
                "HPJ", "TCN",
            ],
            &[],
        ),
        Rule::new(Category::Cargo, &["FDX", "UPS", "GTI", "CKS", "CSB", "ABX"], &[]),
    ]
}

/// Ordered, first-match-wins callsign classifier.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<Rule>,
}

impl Classifier {
    /// Build a classifier from an ordered rule table. Tokens are uppercased.
    #[must_use]
    pub fn new(rules: &[Rule]) -> Self {
        Self {
            rules: rules.iter().map(Rule::normalized).collect(),
        }
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Classify a callsign. Total: anything unmatched is General Aviation.
    #[must_use]
    pub fn classify(&self, callsign: Option<&str>) -> Category {
        let cs = callsign.unwrap_or_default().trim().to_uppercase();
        if cs.is_empty() {
            return Category::GeneralAviation;
        }

        self.rules
            .iter()
            .find(|rule| rule.matches(&cs))
            .map_or(Category::GeneralAviation, |rule| rule.category)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&default_rules())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_callsigns() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify(Some("RCH405")), Category::Military);
        assert_eq!(classifier.classify(Some("AAL117")), Category::Passenger);
        assert_eq!(classifier.classify(Some("EJA22")), Category::BusinessJet);
        assert_eq!(classifier.classify(Some("FDX80")), Category::Cargo);
        assert_eq!(classifier.classify(Some("N482SP")), Category::GeneralAviation);
    }

    #[test]
    fn test_case_insensitive_and_padded() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify(Some("  ual9 ")), Category::Passenger);
        assert_eq!(classifier.classify(Some("shell71")), Category::Military);
    }

    #[test]
    fn test_blank_and_missing_callsigns() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify(None), Category::GeneralAviation);
        assert_eq!(classifier.classify(Some("")), Category::GeneralAviation);
        assert_eq!(classifier.classify(Some("   ")), Category::GeneralAviation);
    }

    #[test]
    fn test_military_beats_passenger() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify(Some("RCHAAL1")), Category::Military);
        assert_eq!(classifier.classify(Some("AALRCH")), Category::Military);
    }

    #[test]
    fn test_substring_not_anchored() {
        let classifier = Classifier::default();
        // Operator code embedded after a feed-specific prefix
        assert_eq!(classifier.classify(Some("XDAL204")), Category::Passenger);
        assert_eq!(classifier.classify(Some("1UPS22")), Category::Cargo);
    }

    #[test]
    fn test_prefix_tokens_are_anchored() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify(Some("MC1234")), Category::Military);
        assert_eq!(classifier.classify(Some("N1MC")), Category::GeneralAviation);
    }

    #[test]
    fn test_custom_rule_table() {
        let classifier = Classifier::new(&[
            Rule::new(Category::Cargo, &["dhl"], &[]),
            Rule::new(Category::Passenger, &["DHL", "KLM"], &[]),
        ]);
        assert_eq!(classifier.classify(Some("DHL12")), Category::Cargo);
        assert_eq!(classifier.classify(Some("KLM601")), Category::Passenger);
        assert_eq!(classifier.classify(Some("AAL117")), Category::GeneralAviation);
    }

    #[test]
    fn test_empty_tokens_ignored() {
        let classifier = Classifier::new(&[Rule::new(Category::Military, &["", "  "], &[""])]);
        assert_eq!(classifier.classify(Some("ANY1")), Category::GeneralAviation);
    }

    #[test]
    fn test_category_labels_parse() {
        for category in Category::ALL {
            assert_eq!(category.label().parse::<Category>().unwrap(), category);
        }
        assert_eq!("business-jet".parse::<Category>().unwrap(), Category::BusinessJet);
        assert_eq!("GA".parse::<Category>().unwrap(), Category::GeneralAviation);
        assert!("helicopter".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serde_label() {
        let json = serde_json::to_string(&Category::BusinessJet).unwrap();
        assert_eq!(json, "\"Business Jet\"");
        let parsed: Category = serde_json::from_str("\"General Aviation\"").unwrap();
        assert_eq!(parsed, Category::GeneralAviation);
    }
}
