// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Collects every problem before failing so a user sees the full list at once.

use crate::{ConfigError, ConfigResult, NeurokernelConfig};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    NotPositive { field: String, value: f64 },
    InvalidRange { lower_field: String, upper_field: String },
    OutOfUnitInterval { field: String, value: f64 },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotPositive { field, value } => {
                write!(f, "{} = {} must be a finite positive number", field, value)
            }
            Self::InvalidRange {
                lower_field,
                upper_field,
            } => write!(f, "{} must be less than {}", lower_field, upper_field),
            Self::OutOfUnitInterval { field, value } => {
                write!(f, "{} = {} is outside [0, 1]", field, value)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every failed check
pub fn validate_config(config: &NeurokernelConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_simulation(config, &mut errors);
    validate_topology(config, &mut errors);
    validate_winner_take_all(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_simulation(config: &NeurokernelConfig, errors: &mut Vec<ConfigValidationError>) {
    let step = config.simulation.time_step;
    if !(step.is_finite() && step > 0.0) {
        errors.push(ConfigValidationError::NotPositive {
            field: "simulation.time_step".to_string(),
            value: step,
        });
    }

    const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
    if !LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("'{}' is not one of {}", config.logging.level, LEVELS.join(", ")),
        });
    }
}

fn validate_topology(config: &NeurokernelConfig, errors: &mut Vec<ConfigValidationError>) {
    let topology = &config.topology;
    if topology.weight_lower >= topology.weight_upper {
        errors.push(ConfigValidationError::InvalidRange {
            lower_field: "topology.weight_lower".to_string(),
            upper_field: "topology.weight_upper".to_string(),
        });
    }
    if topology.layer_sizes.len() < 2 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "topology.layer_sizes".to_string(),
            reason: "at least two layers are required".to_string(),
        });
    }
    if topology.layer_sizes.contains(&0) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "topology.layer_sizes".to_string(),
            reason: "layers must contain at least one neuron".to_string(),
        });
    }
}

fn validate_winner_take_all(config: &NeurokernelConfig, errors: &mut Vec<ConfigValidationError>) {
    let prob = config.winner_take_all.random_prob;
    if !(0.0..=1.0).contains(&prob) {
        errors.push(ConfigValidationError::OutOfUnitInterval {
            field: "winner_take_all.random_prob".to_string(),
            value: prob,
        });
    }
}
