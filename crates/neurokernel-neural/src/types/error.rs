// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for rule construction and parameter validation
//!
//! Stepping never fails; only building or reconfiguring a rule does.

/// Neural computation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NeuralError {
    #[error("Invalid parameter '{name}' for {rule}: {reason}")]
    InvalidParameter {
        rule: &'static str,
        name: &'static str,
        reason: String,
    },

    #[error("Invalid bounds: lower {lower} must be below upper {upper}")]
    InvalidBounds { lower: f64, upper: f64 },

    #[error("Invalid distribution: {0}")]
    InvalidDistribution(String),

    #[error("Unknown update rule: {0}")]
    UnknownRule(String),
}

/// Result type for neural operations
pub type NeuralResult<T> = Result<T, NeuralError>;

/// Helper used by parameter validation
pub(crate) fn invalid(rule: &'static str, name: &'static str, reason: impl Into<String>) -> NeuralError {
    NeuralError::InvalidParameter {
        rule,
        name,
        reason: reason.into(),
    }
}

/// Check `lower < upper` with both finite
pub fn check_bounds(lower: f64, upper: f64) -> NeuralResult<()> {
    if lower.is_finite() && upper.is_finite() && lower < upper {
        Ok(())
    } else {
        Err(NeuralError::InvalidBounds { lower, upper })
    }
}
