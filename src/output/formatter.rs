use std::io::IsTerminal;
use owo_colors::OwoColorize;

use crate::scoring::{FactorContribution, RiskAssessment, RiskCategory};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

fn paint_category(category: RiskCategory, text: &str, use_colors: bool) -> String {
    if !use_colors {
        return text.to_string();
    }
    match category {
        RiskCategory::Low => text.green().bold().to_string(),
        RiskCategory::Medium => text.yellow().bold().to_string(),
        RiskCategory::High => text.red().bold().to_string(),
    }
}

/// Format an assessment as a multi-line report.
pub fn format_assessment(assessment: &RiskAssessment, use_colors: bool) -> String {
    let category = assessment.risk_category;
    let mut lines = vec![
        if use_colors {
            format!("Application {}", assessment.application_id.bold())
        } else {
            format!("Application {}", assessment.application_id)
        },
        format!("  Risk score:      {} / 100", assessment.risk_score),
        format!(
            "  Category:        {}",
            paint_category(category, category.as_str(), use_colors)
        ),
        format!(
            "  Recommendation:  {}",
            paint_category(category, assessment.approval_recommendation.as_str(), use_colors)
        ),
        format!("  Confidence:      {:.2}", assessment.confidence),
        format!("  Debt-to-income:  {:.2}%", assessment.debt_to_income_ratio),
        format!("  Loan-to-income:  {:.2}x", assessment.loan_to_income_ratio),
        "  Positive factors:".to_string(),
    ];
    for factor in &assessment.key_factors.positive {
        lines.push(format!("    + {}", factor));
    }
    lines.push("  Negative factors:".to_string());
    for factor in &assessment.key_factors.negative {
        lines.push(format!("    - {}", factor));
    }
    lines.join("\n")
}

/// Format the per-factor breakdown (for verbose mode)
/// Columns: label, description, signed points, running score
pub fn format_breakdown(factors: &[FactorContribution], use_colors: bool) -> String {
    factors
        .iter()
        .map(|f| {
            let points = format!("{:+4}", f.points);
            let points = if !use_colors || f.points == 0 {
                points
            } else if f.points > 0 {
                points.green().to_string()
            } else {
                points.red().to_string()
            };
            format!(
                "  {:<16}{:<32}{}  {:>3} -> {}",
                f.label, f.description, points, f.before, f.after
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
