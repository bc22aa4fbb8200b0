//! Hand-maintained description of the scoring inputs.
//!
//! Served by the model endpoints. Must be kept in step with
//! [`LoanApplication`] and the checks in `validation.rs`.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::validation::LoanApplication;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureSpec {
    #[serde(skip)]
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(rename = "enum", skip_serializing_if = "no_values")]
    pub allowed: &'static [&'static str],
}

fn no_values(values: &&'static [&'static str]) -> bool {
    values.is_empty()
}

const fn feature(name: &'static str, description: &'static str) -> FeatureSpec {
    FeatureSpec {
        name,
        kind: "number",
        description,
        exclusive_minimum: None,
        minimum: None,
        maximum: None,
        allowed: &[],
    }
}

pub const FEATURES: &[FeatureSpec] = &[
    FeatureSpec {
        exclusive_minimum: Some(0.0),
        ..feature("applicant_income", "Annual income in USD")
    },
    FeatureSpec {
        exclusive_minimum: Some(0.0),
        ..feature("loan_amount", "Requested loan amount")
    },
    FeatureSpec {
        kind: "integer",
        minimum: Some(12.0),
        maximum: Some(480.0),
        ..feature("loan_term_months", "Loan term in months")
    },
    FeatureSpec {
        kind: "integer",
        minimum: Some(0.0),
        ..feature("credit_history_months", "Length of credit history in months")
    },
    FeatureSpec {
        kind: "string",
        allowed: &["employed", "self_employed", "unemployed"],
        ..feature("employment_status", "Current employment status")
    },
    FeatureSpec {
        kind: "string",
        allowed: &["urban", "suburban", "rural"],
        ..feature("property_area", "Area of the property")
    },
    FeatureSpec {
        kind: "integer",
        minimum: Some(0.0),
        maximum: Some(10.0),
        ..feature("dependents", "Number of dependents")
    },
    FeatureSpec {
        kind: "string",
        allowed: &["graduate", "not_graduate"],
        ..feature("education", "Highest education level")
    },
    FeatureSpec {
        minimum: Some(0.0),
        ..feature("existing_debt", "Existing debt amount")
    },
];

pub fn feature_names() -> Vec<&'static str> {
    FEATURES.iter().map(|f| f.name).collect()
}

/// Serializes [`FEATURES`] as an object keyed by field name, in declaration order.
pub struct FeatureSchema;

impl Serialize for FeatureSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURES.len()))?;
        for feature in FEATURES {
            map.serialize_entry(feature.name, feature)?;
        }
        map.end()
    }
}

/// A representative application, shown to API clients.
pub fn example_application() -> LoanApplication {
    LoanApplication {
        applicant_income: Some(50_000.0),
        loan_amount: Some(150_000.0),
        loan_term_months: Some(360),
        credit_history_months: Some(84),
        employment_status: Some("employed".to_string()),
        property_area: Some("urban".to_string()),
        dependents: Some(2),
        education: Some("graduate".to_string()),
        existing_debt: Some(15_000.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::validate_application;

    #[test]
    fn test_feature_names_match_application_fields() {
        let json = serde_json::to_value(example_application()).unwrap();
        let mut fields: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        let mut names = feature_names();
        names.sort_unstable();
        fields.sort_unstable();
        assert_eq!(names, fields);
    }

    #[test]
    fn test_example_is_valid() {
        assert!(validate_application(&example_application()).is_ok());
    }

    #[test]
    fn test_schema_serializes_in_order_with_constraints() {
        let text = serde_json::to_string(&FeatureSchema).unwrap();
        let income = text.find("\"applicant_income\"").unwrap();
        let debt = text.find("\"existing_debt\"").unwrap();
        assert!(income < debt);

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["applicant_income"]["exclusive_minimum"], 0.0);
        assert_eq!(value["loan_term_months"]["type"], "integer");
        assert_eq!(value["loan_term_months"]["maximum"], 480.0);
        assert_eq!(value["education"]["enum"][1], "not_graduate");
        assert!(value["existing_debt"].get("enum").is_none());
        assert!(value["dependents"].get("name").is_none());
    }
}
