//! Segment checks applied to a controller before it is dispatched.

use std::collections::BTreeMap;

use regex::Regex;

use crate::config::loader::ConfigError;
use crate::config::schema::PrevalidateConfig;
use crate::routing::matcher::compile_validator;

#[derive(Debug)]
struct Rule {
    command: u16,
    max_segments: usize,
    validators: Vec<Regex>,
}

/// Outcome of a failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Status to trigger (the rule's `command`).
    pub status: u16,
    /// Number of leading segments that passed.
    pub valid_prefix: usize,
}

/// Compiled prevalidation table keyed by controller name.
#[derive(Debug, Default)]
pub struct Prevalidator {
    rules: BTreeMap<String, Rule>,
}

impl Prevalidator {
    pub fn from_config(table: &BTreeMap<String, PrevalidateConfig>) -> Result<Self, ConfigError> {
        let mut rules = BTreeMap::new();
        for (controller, cfg) in table {
            let validators = cfg
                .validate
                .iter()
                .map(|p| {
                    compile_validator(p).map_err(|source| ConfigError::Malformed {
                        table: "prevalidate",
                        pattern: p.clone(),
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rules.insert(
                controller.clone(),
                Rule {
                    command: cfg.command,
                    max_segments: cfg.segments,
                    validators,
                },
            );
        }
        Ok(Self { rules })
    }

    /// Check the segments following `controller`.
    ///
    /// Controllers without a rule always pass.
    pub fn check(&self, controller: &str, segments: &[String]) -> Result<(), Rejection> {
        let Some(rule) = self.rules.get(controller) else {
            return Ok(());
        };

        let valid_prefix = segments
            .iter()
            .zip(rule.validators.iter().map(Some).chain(std::iter::repeat(None)))
            .take_while(|(segment, validator)| validator.map_or(true, |re| re.is_match(segment)))
            .count()
            .min(rule.max_segments);

        if valid_prefix == segments.len() {
            Ok(())
        } else {
            Err(Rejection {
                status: rule.command,
                valid_prefix,
            })
        }
    }
}
