//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile every regex once so a bad pattern never reaches a request
//! - Validate value ranges (status codes, validator counts)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RoutingConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::RoutingConfig;
use crate::routing::matcher::{anchored, compile_validator};

/// A single semantic problem in a routing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{table}[{key}]: invalid pattern `{pattern}`: {reason}")]
    InvalidPattern {
        table: &'static str,
        key: String,
        pattern: String,
        reason: String,
    },

    #[error("{table}[{key}]: status {status} is not a redirect or error status")]
    InvalidStatus {
        table: &'static str,
        key: String,
        status: u16,
    },

    #[error("prevalidate[{key}]: {validators} validators for at most {segments} segments")]
    TooManyValidators {
        key: String,
        validators: usize,
        segments: usize,
    },

    #[error("redirects[{key}]: key is not a status code")]
    InvalidRedirectKey { key: String },

    #[error("routes[{index}]: pattern has no capture group {segment}")]
    MissingCaptureGroup { index: usize, segment: usize },

    #[error("{field} must not be empty")]
    Empty { field: String },
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &RoutingConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.index_controller.is_empty() {
        errors.push(ValidationError::Empty {
            field: "index_controller".to_string(),
        });
    }

    for (i, rule) in config.host_rules.iter().enumerate() {
        check_pattern(&mut errors, "host_rules", i.to_string(), &rule.pattern);
        if rule.namespace.is_empty() {
            errors.push(ValidationError::Empty {
                field: format!("host_rules[{i}].namespace"),
            });
        }
    }

    for (i, route) in config.routes.iter().enumerate() {
        check_pattern(&mut errors, "routes", i.to_string(), &route.pattern);
        if let Ok(re) = regex::Regex::new(&anchored(&route.pattern)) {
            if route.segment >= re.captures_len() {
                errors.push(ValidationError::MissingCaptureGroup {
                    index: i,
                    segment: route.segment,
                });
            }
        }
        if route.controller.is_empty() {
            errors.push(ValidationError::Empty {
                field: format!("routes[{i}].controller"),
            });
        }
    }

    for (key, rule) in &config.redirects {
        if key.parse::<u16>().is_err() {
            errors.push(ValidationError::InvalidRedirectKey { key: key.clone() });
        }
        if !is_redirect(rule.status) {
            errors.push(ValidationError::InvalidStatus {
                table: "redirects",
                key: key.clone(),
                status: rule.status,
            });
        }
    }

    for (key, pre) in &config.prevalidate {
        if !is_redirect(pre.command) && !(400..600).contains(&pre.command) {
            errors.push(ValidationError::InvalidStatus {
                table: "prevalidate",
                key: key.clone(),
                status: pre.command,
            });
        }
        if pre.validate.len() > pre.segments {
            errors.push(ValidationError::TooManyValidators {
                key: key.clone(),
                validators: pre.validate.len(),
                segments: pre.segments,
            });
        }
        for (i, pattern) in pre.validate.iter().enumerate() {
            if let Err(e) = compile_validator(pattern) {
                errors.push(ValidationError::InvalidPattern {
                    table: "prevalidate",
                    key: format!("{key}.validate[{i}]"),
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_pattern(errors: &mut Vec<ValidationError>, table: &'static str, key: String, pattern: &str) {
    if let Err(e) = regex::Regex::new(pattern) {
        errors.push(ValidationError::InvalidPattern {
            table,
            key,
            pattern: pattern.to_string(),
            reason: e.to_string(),
        });
    }
}

fn is_redirect(status: u16) -> bool {
    (300..400).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{HostRuleConfig, LegacyRouteConfig, PrevalidateConfig, RedirectRuleConfig};

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&RoutingConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = RoutingConfig::default();
        config.host_rules.push(HostRuleConfig {
            pattern: "(unclosed".into(),
            module: String::new(),
            namespace: "app::x".into(),
            segments: Default::default(),
            template: Vec::new(),
        });
        config.redirects.insert(
            "404".into(),
            RedirectRuleConfig {
                status: 200,
                ..Default::default()
            },
        );
        config.prevalidate.insert(
            "mycontroller".into(),
            PrevalidateConfig {
                command: 404,
                segments: 1,
                validate: vec!["/^[0-9]+$/".into(), "/[/".into()],
            },
        );

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], ValidationError::InvalidPattern { table: "host_rules", .. }));
        assert!(matches!(errors[1], ValidationError::InvalidStatus { status: 200, .. }));
        assert!(matches!(errors[2], ValidationError::TooManyValidators { validators: 2, .. }));
        assert!(matches!(errors[3], ValidationError::InvalidPattern { table: "prevalidate", .. }));
    }

    #[test]
    fn redirect_keys_must_be_status_codes() {
        let mut config = RoutingConfig::default();
        config.redirects.insert("not-found".into(), RedirectRuleConfig::default());
        config.redirects.insert("404".into(), RedirectRuleConfig::default());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidRedirectKey {
                key: "not-found".into()
            }]
        );
    }

    #[test]
    fn route_segment_needs_a_capture_group() {
        let mut config = RoutingConfig::default();
        config.routes.push(LegacyRouteConfig {
            pattern: "p/([0-9]+)".into(),
            segment: 1,
            controller: "post".into(),
        });
        assert!(validate_config(&config).is_ok());

        config.routes.push(LegacyRouteConfig {
            pattern: "p/[0-9]+".into(),
            segment: 1,
            controller: "post".into(),
        });
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::MissingCaptureGroup { index: 1, segment: 1 }]
        );
    }
}
