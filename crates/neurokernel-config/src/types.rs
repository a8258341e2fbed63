// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to a section of `neurokernel.toml`. Every field has a
//! default so a partial file (or no file at all) yields a usable config.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NeurokernelConfig {
    pub simulation: SimulationConfig,
    pub logging: LoggingConfig,
    pub topology: TopologyConfig,
    pub winner_take_all: WinnerTakeAllConfig,
}

/// How neurons are scheduled within one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// Top-level groups in insertion order, each staged then committed
    #[default]
    Buffered,
    /// Neurons in ascending update-priority tiers
    Priority,
}

impl FromStr for UpdateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buffered" => Ok(UpdateMode::Buffered),
            "priority" => Ok(UpdateMode::Priority),
            other => Err(format!("unknown update mode '{}'", other)),
        }
    }
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateMode::Buffered => write!(f, "buffered"),
            UpdateMode::Priority => write!(f, "priority"),
        }
    }
}

/// Step scheduling and integration settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Integration step for continuous-time rules
    pub time_step: f64,
    pub update_mode: UpdateMode,
    /// Fixed RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
    /// Steps executed by the `simulate` tool
    pub steps: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_step: 0.1,
            update_mode: UpdateMode::Buffered,
            seed: None,
            steps: 100,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Defaults used by topology builders
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Lower bound of randomized initial weights
    pub weight_lower: f64,
    /// Upper bound of randomized initial weights
    pub weight_upper: f64,
    /// Initial activation of simple-recurrent context neurons
    pub context_initial_activation: f64,
    /// Layer sizes for the `simulate` tool's feed-forward network
    pub layer_sizes: Vec<usize>,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            weight_lower: -1.0,
            weight_upper: 1.0,
            context_initial_activation: 0.5,
            layer_sizes: vec![2, 3, 1],
        }
    }
}

/// Winner-take-all group settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WinnerTakeAllConfig {
    pub win_value: f64,
    pub lose_value: f64,
    /// Probability of picking a uniformly random winner
    pub random_prob: f64,
}

impl Default for WinnerTakeAllConfig {
    fn default() -> Self {
        Self {
            win_value: 1.0,
            lose_value: 0.0,
            random_prob: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: NeurokernelConfig = toml::from_str("[simulation]\ntime_step = 0.5\n").unwrap();
        assert_eq!(config.simulation.time_step, 0.5);
        assert_eq!(config.simulation.update_mode, UpdateMode::Buffered);
        assert_eq!(config.topology, TopologyConfig::default());
    }

    #[test]
    fn test_update_mode_parsing() {
        assert_eq!("priority".parse::<UpdateMode>(), Ok(UpdateMode::Priority));
        assert_eq!(" Buffered ".parse::<UpdateMode>(), Ok(UpdateMode::Buffered));
        assert!("layered".parse::<UpdateMode>().is_err());
    }

    #[test]
    fn test_update_mode_toml_lowercase() {
        let config: NeurokernelConfig =
            toml::from_str("[simulation]\nupdate_mode = \"priority\"\n").unwrap();
        assert_eq!(config.simulation.update_mode, UpdateMode::Priority);
    }

    #[test]
    fn test_serializes_to_json() {
        let json = serde_json::to_value(NeurokernelConfig::default()).unwrap();
        assert_eq!(json["winner_take_all"]["win_value"], 1.0);
    }
}
