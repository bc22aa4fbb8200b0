use chrono::NaiveDate;

use super::schema::Config;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.server.host.trim().is_empty() {
        errors.push("server.host: must not be empty".to_string());
    }

    if let Err(e) = humantime::parse_duration(&config.server.read_timeout) {
        errors.push(format!(
            "server.read_timeout: invalid duration '{}' - {}",
            config.server.read_timeout, e
        ));
    }

    for (i, origin) in config.server.cors.allowed_origins.iter().enumerate() {
        let scheme_ok = origin.starts_with("http://") || origin.starts_with("https://");
        if !scheme_ok || origin.ends_with('/') {
            errors.push(format!(
                "server.cors.allowed_origins[{}]: invalid origin '{}' - expected scheme://host[:port] without a trailing slash",
                i, origin
            ));
        }
    }

    if !(0.0..=1.0).contains(&config.model.accuracy) {
        errors.push("model.accuracy: must be between 0 and 1".to_string());
    }

    if let Err(e) = NaiveDate::parse_from_str(&config.model.trained_on, "%Y-%m-%d") {
        errors.push(format!(
            "model.trained_on: invalid date '{}' - {}",
            config.model.trained_on, e
        ));
    }

    if config.dataset.applications == 0 {
        errors.push("dataset.applications: must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
