//! Human-readable justification for an assessment.
//!
//! These rules use their own thresholds, which do not line up with the
//! scoring bands in `factors.rs`. Both sets are kept as they are.

use super::engine::Ratios;
use super::types::{ApplicantRecord, EmploymentStatus, KeyFactors, NO_FACTORS};

struct Rule {
    message: &'static str,
    applies: fn(&ApplicantRecord, &Ratios) -> bool,
}

const POSITIVE_RULES: &[Rule] = &[
    Rule {
        message: "Strong income level",
        applies: |r, _| r.applicant_income > 60_000.0,
    },
    Rule {
        message: "Low debt-to-income ratio",
        applies: |_, ratios| ratios.debt_to_income < 30.0,
    },
    Rule {
        message: "Established credit history",
        applies: |r, _| r.credit_history_months > 48,
    },
    Rule {
        message: "Stable employment",
        applies: |r, _| r.employment_status == EmploymentStatus::Employed,
    },
    Rule {
        message: "Reasonable loan amount",
        applies: |_, ratios| ratios.loan_to_income < 3.0,
    },
];

const NEGATIVE_RULES: &[Rule] = &[
    Rule {
        message: "High existing debt burden",
        applies: |_, ratios| ratios.debt_to_income > 40.0,
    },
    Rule {
        message: "Large loan relative to income",
        applies: |_, ratios| ratios.loan_to_income > 4.0,
    },
    Rule {
        message: "Limited credit history",
        applies: |r, _| r.credit_history_months < 24,
    },
    Rule {
        message: "No stable income source",
        applies: |r, _| r.employment_status == EmploymentStatus::Unemployed,
    },
    Rule {
        message: "High monthly payment burden",
        applies: |_, ratios| ratios.payment_to_income > 40.0,
    },
];

fn collect(rules: &[Rule], record: &ApplicantRecord, ratios: &Ratios) -> Vec<String> {
    let fired: Vec<String> = rules
        .iter()
        .filter(|rule| (rule.applies)(record, ratios))
        .map(|rule| rule.message.to_string())
        .collect();

    if fired.is_empty() {
        vec![NO_FACTORS.to_string()]
    } else {
        fired
    }
}

pub fn key_factors(record: &ApplicantRecord, ratios: &Ratios) -> KeyFactors {
    KeyFactors {
        positive: collect(POSITIVE_RULES, record, ratios),
        negative: collect(NEGATIVE_RULES, record, ratios),
    }
}
