// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as positive tier limits and a usable SLA window.

use crate::diagnostic::ConfigError;
use crate::model::LeadflowConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &LeadflowConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.engine.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "engine.log_level must be one of {LOG_LEVELS:?}, got `{}`",
                config.engine.log_level
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // A zero limit would make its tier unreachable and break the
    // External -> Internal -> OnCall progression.
    if config.routing.limit_external < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "routing.limit_external must be at least 1, got {}",
                config.routing.limit_external
            ),
        });
    }

    if config.routing.limit_internal < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "routing.limit_internal must be at least 1, got {}",
                config.routing.limit_internal
            ),
        });
    }

    if config.routing.sla_minutes < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "routing.sla_minutes must be at least 1, got {}",
                config.routing.sla_minutes
            ),
        });
    }

    if config.escalation.interval_secs < 1 {
        errors.push(ConfigError::Validation {
            message: "escalation.interval_secs must be at least 1".to_string(),
        });
    }

    if config.escalation.batch_limit < 1 {
        errors.push(ConfigError::Validation {
            message: "escalation.batch_limit must be at least 1".to_string(),
        });
    }

    if config.escalation.lease_secs < 1 {
        errors.push(ConfigError::Validation {
            message: "escalation.lease_secs must be at least 1".to_string(),
        });
    }

    if config.notify.smtp_host.is_some() && config.notify.from_address.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "notify.from_address must not be empty when notify.smtp_host is set"
                .to_string(),
        });
    }

    if config.notify.smtp_username.is_some() != config.notify.smtp_password.is_some() {
        errors.push(ConfigError::Validation {
            message: "notify.smtp_username and notify.smtp_password must be set together"
                .to_string(),
        });
    }

    if let Some(url) = &config.reputation.base_url
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        errors.push(ConfigError::Validation {
            message: format!("reputation.base_url must be an http(s) URL, got `{url}`"),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = LeadflowConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = LeadflowConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))));
    }

    #[test]
    fn zero_tier_limit_fails_validation() {
        let mut config = LeadflowConfig::default();
        config.routing.limit_external = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("limit_external"))));
    }

    #[test]
    fn zero_sla_fails_validation() {
        let mut config = LeadflowConfig::default();
        config.routing.sla_minutes = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("sla_minutes"))));
    }

    #[test]
    fn bad_log_level_fails_validation() {
        let mut config = LeadflowConfig::default();
        config.engine.log_level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("log_level"))));
    }

    #[test]
    fn lopsided_smtp_credentials_fail_validation() {
        let mut config = LeadflowConfig::default();
        config.notify.smtp_username = Some("mailer".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("smtp_username"))));
    }

    #[test]
    fn non_http_reputation_url_fails_validation() {
        let mut config = LeadflowConfig::default();
        config.reputation.base_url = Some("ftp://scores.internal".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("base_url"))));
    }

    #[test]
    fn multiple_errors_collected_in_one_pass() {
        let mut config = LeadflowConfig::default();
        config.routing.limit_external = 0;
        config.routing.limit_internal = 0;
        config.routing.sla_minutes = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3, "all violations should be reported");
    }
}
