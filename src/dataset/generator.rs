use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::scoring::engine::round2;
use crate::scoring::{
    score_applicant, ApplicantRecord, Education, EmploymentStatus, PropertyArea, RiskCategory,
};

const LOAN_TERMS: [u32; 5] = [60, 120, 180, 240, 360];
const HISTORY_DAYS: i64 = 365;

/// One line of the generated dataset. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetRow {
    pub application_date: NaiveDate,
    pub applicant_income: u64,
    pub loan_amount: u64,
    pub loan_term_months: u32,
    pub credit_history_months: u32,
    pub employment_status: EmploymentStatus,
    pub property_area: PropertyArea,
    pub dependents: u8,
    pub education: Education,
    pub existing_debt: u64,
    pub debt_to_income_ratio: f64,
    pub loan_to_income_ratio: f64,
    pub risk_score: u8,
    pub risk_category: RiskCategory,
    pub decision: &'static str,
}

impl DatasetRow {
    /// Rebuild the applicant record this row was scored from.
    pub fn applicant(&self) -> ApplicantRecord {
        ApplicantRecord {
            applicant_income: self.applicant_income as f64,
            loan_amount: self.loan_amount as f64,
            loan_term_months: self.loan_term_months,
            credit_history_months: self.credit_history_months,
            employment_status: self.employment_status,
            property_area: self.property_area,
            dependents: self.dependents,
            education: self.education,
            existing_debt: self.existing_debt as f64,
        }
    }
}

/// Samples synthetic loan applications and scores them with the live engine.
pub struct DatasetGenerator<R: Rng> {
    rng: R,
    today: NaiveDate,
    employment: WeightedIndex<u32>,
    area: WeightedIndex<u32>,
    dependents: WeightedIndex<u32>,
    education: WeightedIndex<u32>,
}

impl DatasetGenerator<StdRng> {
    /// Seeded generators are reproducible; unseeded ones draw from OS entropy.
    pub fn with_seed(seed: Option<u64>, today: NaiveDate) -> Result<Self> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(rng, today)
    }
}

impl<R: Rng> DatasetGenerator<R> {
    pub fn new(rng: R, today: NaiveDate) -> Result<Self> {
        Ok(DatasetGenerator {
            rng,
            today,
            // employed : self_employed : unemployed
            employment: WeightedIndex::new([3, 1, 1]).context("employment weights")?,
            // urban : suburban : rural
            area: WeightedIndex::new([2, 1, 1]).context("property area weights")?,
            // 0, 1, 2, 3, 4 dependents
            dependents: WeightedIndex::new([30, 25, 25, 15, 5]).context("dependents weights")?,
            // graduate : not_graduate
            education: WeightedIndex::new([2, 1]).context("education weights")?,
        })
    }

    pub fn sample_row(&mut self) -> DatasetRow {
        let applicant_income: u64 = self.rng.gen_range(25_000..=150_000);
        let loan_amount: u64 = self.rng.gen_range(50_000..=500_000);
        let loan_term_months = LOAN_TERMS[self.rng.gen_range(0..LOAN_TERMS.len())];
        let credit_history_months: u32 = self.rng.gen_range(0..=120);
        let employment_status = EmploymentStatus::ALL[self.employment.sample(&mut self.rng)];
        let property_area = PropertyArea::ALL[self.area.sample(&mut self.rng)];
        let dependents = self.dependents.sample(&mut self.rng) as u8;
        let education = Education::ALL[self.education.sample(&mut self.rng)];
        let existing_debt: u64 = self.rng.gen_range(0..=applicant_income / 2);
        let days_ago = self.rng.gen_range(0..=HISTORY_DAYS);

        let mut row = DatasetRow {
            application_date: self.today - Duration::days(days_ago),
            applicant_income,
            loan_amount,
            loan_term_months,
            credit_history_months,
            employment_status,
            property_area,
            dependents,
            education,
            existing_debt,
            debt_to_income_ratio: 0.0,
            loan_to_income_ratio: 0.0,
            risk_score: 0,
            risk_category: RiskCategory::High,
            decision: "",
        };

        let result = score_applicant(&row.applicant());
        row.debt_to_income_ratio = round2(result.ratios.debt_to_income);
        row.loan_to_income_ratio = round2(result.ratios.loan_to_income);
        row.risk_score = result.score;
        row.risk_category = result.category;
        row.decision = result.decision.dataset_label();
        row
    }

    /// Generate `count` rows sorted by application date, oldest first.
    pub fn generate(&mut self, count: usize) -> Vec<DatasetRow> {
        let mut rows: Vec<DatasetRow> = (0..count).map(|_| self.sample_row()).collect();
        rows.sort_by_key(|row| row.application_date);
        rows
    }
}
