use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::engine::Ratios;
use super::types::{ApplicantRecord, Education, EmploymentStatus, PropertyArea};

pub const MIN_LOAN_TERM_MONTHS: i64 = 12;
pub const MAX_LOAN_TERM_MONTHS: i64 = 480;
pub const MAX_DEPENDENTS: i64 = 10;

/// A loan application as submitted, before any constraint checks.
///
/// Every field is optional here so that missing fields are reported together
/// with out-of-range ones instead of failing on the first.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct LoanApplication {
    pub applicant_income: Option<f64>,
    pub loan_amount: Option<f64>,
    pub loan_term_months: Option<i64>,
    pub credit_history_months: Option<i64>,
    pub employment_status: Option<String>,
    pub property_area: Option<String>,
    pub dependents: Option<i64>,
    pub education: Option<String>,
    pub existing_debt: Option<f64>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        ValidationError {
            field,
            message: message.into(),
        }
    }
}

struct Checker {
    errors: Vec<ValidationError>,
}

impl Checker {
    fn required<T: Clone>(&mut self, field: &'static str, value: &Option<T>) -> Option<T> {
        if value.is_none() {
            self.errors.push(ValidationError::new(field, "field required"));
        }
        value.clone()
    }

    fn positive(&mut self, field: &'static str, value: &Option<f64>) -> Option<f64> {
        let v = self.required(field, value)?;
        if v > 0.0 && v.is_finite() {
            Some(v)
        } else {
            self.errors.push(ValidationError::new(field, "must be greater than 0"));
            None
        }
    }

    fn non_negative(&mut self, field: &'static str, value: &Option<f64>) -> Option<f64> {
        let v = self.required(field, value)?;
        if v >= 0.0 && v.is_finite() {
            Some(v)
        } else {
            self.errors.push(ValidationError::new(field, "must be greater than or equal to 0"));
            None
        }
    }

    fn integer_in<T: TryFrom<i64>>(
        &mut self,
        field: &'static str,
        value: &Option<i64>,
        min: i64,
        max: Option<i64>,
    ) -> Option<T> {
        let v = self.required(field, value)?;
        if v < min {
            self.errors.push(ValidationError::new(
                field,
                format!("must be greater than or equal to {}", min),
            ));
            return None;
        }
        if let Some(max) = max {
            if v > max {
                self.errors.push(ValidationError::new(
                    field,
                    format!("must be less than or equal to {}", max),
                ));
                return None;
            }
        }
        match T::try_from(v) {
            Ok(converted) => Some(converted),
            Err(_) => {
                self.errors.push(ValidationError::new(field, "value is too large"));
                None
            }
        }
    }

    fn one_of<T: Copy>(
        &mut self,
        field: &'static str,
        value: &Option<String>,
        parse: fn(&str) -> Option<T>,
        allowed: &[&str],
    ) -> Option<T> {
        let raw = self.required(field, value)?;
        let parsed = parse(&raw);
        if parsed.is_none() {
            self.errors.push(ValidationError::new(
                field,
                format!("'{}' is not one of: {}", raw, allowed.join(", ")),
            ));
        }
        parsed
    }
}

/// Check a submitted application against the field constraints.
/// Returns all validation errors at once (not just the first).
pub fn validate_application(
    application: &LoanApplication,
) -> Result<ApplicantRecord, Vec<ValidationError>> {
    let mut check = Checker { errors: Vec::new() };

    let applicant_income = check.positive("applicant_income", &application.applicant_income);
    let loan_amount = check.positive("loan_amount", &application.loan_amount);
    let loan_term_months = check.integer_in(
        "loan_term_months",
        &application.loan_term_months,
        MIN_LOAN_TERM_MONTHS,
        Some(MAX_LOAN_TERM_MONTHS),
    );
    let credit_history_months = check.integer_in(
        "credit_history_months",
        &application.credit_history_months,
        0,
        None,
    );
    let employment_status = check.one_of(
        "employment_status",
        &application.employment_status,
        EmploymentStatus::parse,
        &["employed", "self_employed", "unemployed"],
    );
    let property_area = check.one_of(
        "property_area",
        &application.property_area,
        PropertyArea::parse,
        &["urban", "suburban", "rural"],
    );
    let dependents = check.integer_in(
        "dependents",
        &application.dependents,
        0,
        Some(MAX_DEPENDENTS),
    );
    let education = check.one_of(
        "education",
        &application.education,
        Education::parse,
        &["graduate", "not_graduate"],
    );
    let existing_debt = check.non_negative("existing_debt", &application.existing_debt);

    match (
        applicant_income,
        loan_amount,
        loan_term_months,
        credit_history_months,
        employment_status,
        property_area,
        dependents,
        education,
        existing_debt,
    ) {
        (
            Some(applicant_income),
            Some(loan_amount),
            Some(loan_term_months),
            Some(credit_history_months),
            Some(employment_status),
            Some(property_area),
            Some(dependents),
            Some(education),
            Some(existing_debt),
        ) if check.errors.is_empty() => {
            let record = ApplicantRecord {
                applicant_income,
                loan_amount,
                loan_term_months,
                credit_history_months,
                employment_status,
                property_area,
                dependents,
                education,
                existing_debt,
            };
            let ratios = Ratios::of(&record);
            if ratios.debt_to_income.is_finite()
                && ratios.loan_to_income.is_finite()
                && ratios.payment_to_income.is_finite()
            {
                Ok(record)
            } else {
                Err(vec![ValidationError::new(
                    "applicant_income",
                    "too small to compute financial ratios",
                )])
            }
        }
        _ => Err(check.errors),
    }
}
