use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder used when no explanation rule fired for a factor list.
pub const NO_FACTORS: &str = "None identified";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    Employed,
    SelfEmployed,
    Unemployed,
}

impl EmploymentStatus {
    pub const ALL: [EmploymentStatus; 3] = [
        EmploymentStatus::Employed,
        EmploymentStatus::SelfEmployed,
        EmploymentStatus::Unemployed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentStatus::Employed => "employed",
            EmploymentStatus::SelfEmployed => "self_employed",
            EmploymentStatus::Unemployed => "unemployed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyArea {
    Urban,
    Suburban,
    Rural,
}

impl PropertyArea {
    pub const ALL: [PropertyArea; 3] = [PropertyArea::Urban, PropertyArea::Suburban, PropertyArea::Rural];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyArea::Urban => "urban",
            PropertyArea::Suburban => "suburban",
            PropertyArea::Rural => "rural",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Education {
    Graduate,
    NotGraduate,
}

impl Education {
    pub const ALL: [Education; 2] = [Education::Graduate, Education::NotGraduate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Education::Graduate => "graduate",
            Education::NotGraduate => "not_graduate",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

/// A validated loan application.
///
/// Values of this type are only built by the validator (or by the dataset
/// generator, which samples inside the same ranges), so the engine can rely on
/// `applicant_income > 0` and `loan_term_months >= 12`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub applicant_income: f64,
    pub loan_amount: f64,
    pub loan_term_months: u32,
    pub credit_history_months: u32,
    pub employment_status: EmploymentStatus,
    pub property_area: PropertyArea,
    pub dependents: u8,
    pub education: Education,
    pub existing_debt: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Low => "LOW",
            RiskCategory::Medium => "MEDIUM",
            RiskCategory::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Approve,
    Review,
    Decline,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approve => "APPROVE",
            Decision::Review => "REVIEW",
            Decision::Decline => "DECLINE",
        }
    }

    /// Past-tense label written to generated datasets.
    pub fn dataset_label(&self) -> &'static str {
        match self {
            Decision::Approve => "APPROVED",
            Decision::Review => "REVIEW",
            Decision::Decline => "DECLINED",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFactors {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

/// Result of scoring one application, as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub application_id: String,
    pub risk_score: u8,
    pub risk_category: RiskCategory,
    pub approval_recommendation: Decision,
    pub confidence: f64,
    pub key_factors: KeyFactors,
    pub debt_to_income_ratio: f64,
    pub loan_to_income_ratio: f64,
    pub processed_at: DateTime<Utc>,
}
