use chrono::{DateTime, Utc};

use super::explain::key_factors;
use super::factors::{
    education_points, employment_points, first_match, property_area_points, Band,
    CREDIT_HISTORY_BANDS, DEBT_TO_INCOME_BANDS, DEPENDENTS_BANDS, INCOME_BANDS,
    LOAN_TERM_BANDS, LOAN_TO_INCOME_BANDS,
};
use super::types::{ApplicantRecord, Decision, KeyFactors, RiskAssessment, RiskCategory};

pub const BASE_SCORE: i32 = 50;
pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 100;

/// Lower bound (inclusive) of the LOW risk category.
pub const LOW_RISK_THRESHOLD: u8 = 70;
/// Lower bound (inclusive) of the MEDIUM risk category.
pub const MEDIUM_RISK_THRESHOLD: u8 = 50;

/// Financial ratios derived from an application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ratios {
    /// Existing debt as a percentage of annual income
    pub debt_to_income: f64,
    /// Loan amount as a multiple of annual income
    pub loan_to_income: f64,
    pub monthly_payment: f64,
    /// Annualised repayment as a percentage of income. Only used for explanations.
    pub payment_to_income: f64,
}

impl Ratios {
    pub fn of(record: &ApplicantRecord) -> Self {
        let income = record.applicant_income;
        let monthly_payment = record.loan_amount / f64::from(record.loan_term_months);
        Ratios {
            debt_to_income: record.existing_debt / income * 100.0,
            loan_to_income: record.loan_amount / income,
            monthly_payment,
            payment_to_income: monthly_payment * 12.0 / income * 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FactorContribution {
    pub label: &'static str,     // e.g. "Income", "Debt-to-income"
    pub description: String,     // e.g. "62000 matched '>50000'", "employed"
    pub points: i32,
    pub before: i32,             // Score before this factor
    pub after: i32,              // Score after this factor
}

/// Deterministic part of an assessment: everything except id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub score: u8,
    pub category: RiskCategory,
    pub decision: Decision,
    pub confidence: f64,
    pub ratios: Ratios,
    pub key_factors: KeyFactors,
    pub breakdown: Vec<FactorContribution>,
}

struct Tally {
    score: i32,
    factors: Vec<FactorContribution>,
}

impl Tally {
    fn add(&mut self, label: &'static str, description: String, points: i32) {
        let before = self.score;
        self.score += points;
        self.factors.push(FactorContribution {
            label,
            description,
            points,
            before,
            after: self.score,
        });
    }

    fn banded(&mut self, label: &'static str, value: f64, shown: String, bands: &[Band]) {
        match first_match(bands, value) {
            Some(band) => self.add(
                label,
                format!("{} matched '{}'", shown, band.threshold),
                band.points,
            ),
            None => self.add(label, format!("{} matched no band", shown), 0),
        }
    }
}

/// Score an application without stamping it.
///
/// Pure: identical records always produce identical results.
pub fn score_applicant(record: &ApplicantRecord) -> ScoreResult {
    let ratios = Ratios::of(record);
    let mut tally = Tally {
        score: BASE_SCORE,
        factors: Vec::with_capacity(9),
    };

    tally.banded(
        "Income",
        record.applicant_income,
        format!("{}", record.applicant_income),
        INCOME_BANDS,
    );
    tally.banded(
        "Debt-to-income",
        ratios.debt_to_income,
        format!("{:.2}%", ratios.debt_to_income),
        DEBT_TO_INCOME_BANDS,
    );
    tally.banded(
        "Loan-to-income",
        ratios.loan_to_income,
        format!("{:.2}x", ratios.loan_to_income),
        LOAN_TO_INCOME_BANDS,
    );
    tally.banded(
        "Credit history",
        f64::from(record.credit_history_months),
        format!("{} months", record.credit_history_months),
        CREDIT_HISTORY_BANDS,
    );
    tally.add(
        "Employment",
        record.employment_status.as_str().to_string(),
        employment_points(record.employment_status),
    );
    tally.add(
        "Education",
        record.education.as_str().to_string(),
        education_points(record.education),
    );
    tally.add(
        "Property area",
        record.property_area.as_str().to_string(),
        property_area_points(record.property_area),
    );
    tally.banded(
        "Dependents",
        f64::from(record.dependents),
        format!("{}", record.dependents),
        DEPENDENTS_BANDS,
    );
    tally.banded(
        "Loan term",
        f64::from(record.loan_term_months),
        format!("{} months", record.loan_term_months),
        LOAN_TERM_BANDS,
    );

    let score = clamp_score(tally.score);
    let (category, decision) = categorize(score);

    ScoreResult {
        score,
        category,
        decision,
        confidence: confidence(score),
        ratios,
        key_factors: key_factors(record, &ratios),
        breakdown: tally.factors,
    }
}

/// Score an application and stamp it with a fresh id and timestamp.
pub fn assess(record: &ApplicantRecord) -> RiskAssessment {
    let result = score_applicant(record);
    let processed_at = Utc::now();
    let application_id = application_id(processed_at);

    tracing::debug!(
        %application_id,
        score = result.score,
        category = %result.category,
        "application assessed"
    );

    RiskAssessment {
        application_id,
        risk_score: result.score,
        risk_category: result.category,
        approval_recommendation: result.decision,
        confidence: result.confidence,
        key_factors: result.key_factors,
        debt_to_income_ratio: round2(result.ratios.debt_to_income),
        loan_to_income_ratio: round2(result.ratios.loan_to_income),
        processed_at,
    }
}

pub fn clamp_score(raw: i32) -> u8 {
    // Clamped into 0..=100, so the cast cannot truncate
    raw.clamp(MIN_SCORE, MAX_SCORE) as u8
}

pub fn categorize(score: u8) -> (RiskCategory, Decision) {
    if score >= LOW_RISK_THRESHOLD {
        (RiskCategory::Low, Decision::Approve)
    } else if score >= MEDIUM_RISK_THRESHOLD {
        (RiskCategory::Medium, Decision::Review)
    } else {
        (RiskCategory::High, Decision::Decline)
    }
}

/// Confidence grows with distance from the midpoint score of 50.
pub fn confidence(score: u8) -> f64 {
    let distance = (i32::from(score) - BASE_SCORE).abs();
    round2(0.75 + f64::from(distance) / 100.0 * 0.2)
}

/// Round to 2 decimals, exact halves to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

fn application_id(at: DateTime<Utc>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("APP-{}-{}", at.format("%Y%m%d%H%M%S"), &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::types::{Education, EmploymentStatus, PropertyArea, NO_FACTORS};

    #[allow(clippy::too_many_arguments)]
    fn application(
        income: f64,
        loan: f64,
        term: u32,
        history: u32,
        employment: EmploymentStatus,
        area: PropertyArea,
        dependents: u8,
        education: Education,
        debt: f64,
    ) -> ApplicantRecord {
        ApplicantRecord {
            applicant_income: income,
            loan_amount: loan,
            loan_term_months: term,
            credit_history_months: history,
            employment_status: employment,
            property_area: area,
            dependents,
            education,
            existing_debt: debt,
        }
    }

    fn high_risk() -> ApplicantRecord {
        application(
            20_000.0,
            200_000.0,
            360,
            6,
            EmploymentStatus::Unemployed,
            PropertyArea::Rural,
            4,
            Education::NotGraduate,
            15_000.0,
        )
    }

    fn low_risk() -> ApplicantRecord {
        application(
            100_000.0,
            150_000.0,
            180,
            96,
            EmploymentStatus::Employed,
            PropertyArea::Urban,
            1,
            Education::Graduate,
            5_000.0,
        )
    }

    fn sample() -> ApplicantRecord {
        application(
            50_000.0,
            150_000.0,
            360,
            84,
            EmploymentStatus::Employed,
            PropertyArea::Urban,
            2,
            Education::Graduate,
            15_000.0,
        )
    }

    #[test]
    fn test_high_risk_application_is_declined() {
        let result = assess(&high_risk());
        assert_eq!(result.risk_category, RiskCategory::High);
        assert_eq!(result.approval_recommendation, Decision::Decline);
        // 50 - 15 - 15 - 15 - 10 - 20 - 3 - 5 = -33, clamped
        assert_eq!(result.risk_score, 0);
        assert_eq!(result.confidence, 0.85);
    }

    #[test]
    fn test_low_risk_application_is_approved() {
        let result = assess(&low_risk());
        assert_eq!(result.risk_category, RiskCategory::Low);
        assert_eq!(result.approval_recommendation, Decision::Approve);
        assert!(result.risk_score >= 70);
        // 50 + 15 + 15 + 15 + 10 + 10 + 5 + 5 + 5 = 130, clamped
        assert_eq!(result.risk_score, 100);
    }

    #[test]
    fn test_sample_ratios_rounded() {
        let result = assess(&sample());
        assert_eq!(result.debt_to_income_ratio, 30.0);
        assert_eq!(result.loan_to_income_ratio, 3.0);
        // 50 + 0 + 5 + 0 + 10 + 10 + 5 + 5 + 0 + 0
        assert_eq!(result.risk_score, 85);
        assert_eq!(
            result.key_factors.positive,
            vec!["Established credit history", "Stable employment"]
        );
        assert_eq!(result.key_factors.negative, vec![NO_FACTORS]);
    }

    #[test]
    fn test_breakdown_accounts_for_raw_score() {
        let result = score_applicant(&sample());
        assert_eq!(result.breakdown.len(), 9);
        assert_eq!(result.breakdown[0].before, BASE_SCORE);
        for pair in result.breakdown.windows(2) {
            assert_eq!(pair[0].after, pair[1].before);
        }
        let total: i32 = result.breakdown.iter().map(|f| f.points).sum();
        assert_eq!(BASE_SCORE + total, 85);
        assert_eq!(result.breakdown.last().unwrap().after, 85);
    }

    #[test]
    fn test_breakdown_describes_matched_band() {
        let result = score_applicant(&sample());
        let dti = &result.breakdown[1];
        assert_eq!(dti.label, "Debt-to-income");
        assert_eq!(dti.points, 5);
        assert!(dti.description.contains("'<35'"));

        let income = &result.breakdown[0];
        assert_eq!(income.points, 0);
        assert!(income.description.contains("no band"));
    }

    #[test]
    fn test_score_is_deterministic() {
        let a = score_applicant(&sample());
        let b = score_applicant(&sample());
        assert_eq!(a, b);
    }

    #[test]
    fn test_assessments_get_distinct_ids() {
        let a = assess(&sample());
        let b = assess(&sample());
        assert!(a.application_id.starts_with("APP-"));
        assert_eq!(a.application_id.len(), "APP-20260101120000-abcdef12".len());
        assert_ne!(a.application_id, b.application_id);
    }

    #[test]
    fn test_categorize_boundaries() {
        assert_eq!(categorize(100), (RiskCategory::Low, Decision::Approve));
        assert_eq!(categorize(70), (RiskCategory::Low, Decision::Approve));
        assert_eq!(categorize(69), (RiskCategory::Medium, Decision::Review));
        assert_eq!(categorize(50), (RiskCategory::Medium, Decision::Review));
        assert_eq!(categorize(49), (RiskCategory::High, Decision::Decline));
        assert_eq!(categorize(0), (RiskCategory::High, Decision::Decline));
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(-33), 0);
        assert_eq!(clamp_score(130), 100);
        assert_eq!(clamp_score(64), 64);
    }

    #[test]
    fn test_confidence_values() {
        assert_eq!(confidence(50), 0.75);
        assert_eq!(confidence(60), 0.77);
        assert_eq!(confidence(40), 0.77);
        assert_eq!(confidence(85), 0.82);
        assert_eq!(confidence(100), 0.85);
        assert_eq!(confidence(0), 0.85);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(30.000000000000004), 30.0);
        assert_eq!(round2(2.456), 2.46);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_round2_halves_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        // 2.675 is stored just below the half
        assert_eq!(round2(2.675), 2.67);
    }

    #[test]
    fn test_loan_to_income_half_rounds_to_even() {
        let mut record = low_risk();
        record.loan_amount = 12_500.0;
        assert_eq!(assess(&record).loan_to_income_ratio, 0.12);
    }

    #[test]
    fn test_self_employed_suburban_are_neutral() {
        let record = ApplicantRecord {
            employment_status: EmploymentStatus::SelfEmployed,
            property_area: PropertyArea::Suburban,
            ..sample()
        };
        // Drops the +10 employment and +5 area contributions
        assert_eq!(score_applicant(&record).score, 70);
    }

    #[test]
    fn test_long_term_penalty() {
        let record = ApplicantRecord {
            loan_term_months: 480,
            ..sample()
        };
        assert_eq!(score_applicant(&record).score, 82);
    }
}
