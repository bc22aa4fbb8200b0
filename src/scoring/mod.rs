pub mod types;
pub mod factors;
pub mod engine;
pub mod explain;
pub mod schema;
pub mod validation;

pub use types::*;
pub use engine::{assess, score_applicant, FactorContribution, Ratios, ScoreResult};
pub use schema::{example_application, FeatureSchema, FEATURES};
pub use validation::{validate_application, LoanApplication, ValidationError};
