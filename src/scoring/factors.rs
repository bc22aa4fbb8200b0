use std::fmt;

use super::types::{Education, EmploymentStatus, PropertyArea};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    LessThan(f64),
    LessEqual(f64),
    GreaterThan(f64),
    Equal(f64),
}

impl Threshold {
    pub fn matches(&self, value: f64) -> bool {
        match self {
            Threshold::LessThan(n) => value < *n,
            Threshold::LessEqual(n) => value <= *n,
            Threshold::GreaterThan(n) => value > *n,
            Threshold::Equal(n) => value == *n,
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::LessThan(n) => write!(f, "<{}", n),
            Threshold::LessEqual(n) => write!(f, "<={}", n),
            Threshold::GreaterThan(n) => write!(f, ">{}", n),
            Threshold::Equal(n) => write!(f, "=={}", n),
        }
    }
}

/// A scoring band: when `threshold` matches, the score moves by `points`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub threshold: Threshold,
    pub points: i32,
}

impl Band {
    const fn new(threshold: Threshold, points: i32) -> Self {
        Band { threshold, points }
    }
}

// Band lists are ordered; only the first matching band applies.

pub const INCOME_BANDS: &[Band] = &[
    Band::new(Threshold::GreaterThan(80_000.0), 15),
    Band::new(Threshold::GreaterThan(50_000.0), 10),
    Band::new(Threshold::LessThan(25_000.0), -15),
];

pub const DEBT_TO_INCOME_BANDS: &[Band] = &[
    Band::new(Threshold::LessThan(20.0), 15),
    Band::new(Threshold::LessThan(35.0), 5),
    Band::new(Threshold::GreaterThan(50.0), -15),
    Band::new(Threshold::GreaterThan(40.0), -10),
];

pub const LOAN_TO_INCOME_BANDS: &[Band] = &[
    Band::new(Threshold::LessThan(2.0), 15),
    Band::new(Threshold::LessThan(3.0), 8),
    Band::new(Threshold::GreaterThan(5.0), -15),
    Band::new(Threshold::GreaterThan(4.0), -10),
];

pub const CREDIT_HISTORY_BANDS: &[Band] = &[
    Band::new(Threshold::GreaterThan(60.0), 10),
    Band::new(Threshold::GreaterThan(36.0), 5),
    Band::new(Threshold::LessThan(12.0), -10),
];

pub const DEPENDENTS_BANDS: &[Band] = &[
    Band::new(Threshold::Equal(0.0), 5),
    Band::new(Threshold::GreaterThan(3.0), -5),
];

pub const LOAN_TERM_BANDS: &[Band] = &[
    Band::new(Threshold::LessEqual(180.0), 5),
    Band::new(Threshold::GreaterThan(360.0), -3),
];

/// Return the first band whose threshold matches `value`.
pub fn first_match(bands: &[Band], value: f64) -> Option<&Band> {
    bands.iter().find(|band| band.threshold.matches(value))
}

pub fn employment_points(status: EmploymentStatus) -> i32 {
    match status {
        EmploymentStatus::Employed => 10,
        EmploymentStatus::SelfEmployed => 0,
        EmploymentStatus::Unemployed => -20,
    }
}

pub fn education_points(education: Education) -> i32 {
    match education {
        Education::Graduate => 5,
        Education::NotGraduate => 0,
    }
}

pub fn property_area_points(area: PropertyArea) -> i32 {
    match area {
        PropertyArea::Urban => 5,
        PropertyArea::Suburban => 0,
        PropertyArea::Rural => -3,
    }
}
