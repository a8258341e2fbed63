// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Loading happens in three tiers, later tiers winning:
//! 1. TOML file (base values)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, NeurokernelConfig, UpdateMode};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// File name searched for when no explicit path is given
pub const CONFIG_FILE_NAME: &str = "neurokernel.toml";

/// Find the configuration file
///
/// Search order:
/// 1. `NEUROKERNEL_CONFIG_PATH` environment variable
/// 2. Current working directory: `./neurokernel.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("NEUROKERNEL_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by NEUROKERNEL_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet NEUROKERNEL_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from a TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, the file is searched for.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the file is not found or contains invalid TOML.
/// Validation is a separate step, see [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<NeurokernelConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: NeurokernelConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `NEUROKERNEL_TIME_STEP` -> `simulation.time_step`
/// - `NEUROKERNEL_UPDATE_MODE` -> `simulation.update_mode`
/// - `NEUROKERNEL_SEED` -> `simulation.seed`
/// - `NEUROKERNEL_STEPS` -> `simulation.steps`
/// - `NEUROKERNEL_LOG_LEVEL` -> `logging.level`
///
/// Unparseable values are ignored.
pub fn apply_environment_overrides(config: &mut NeurokernelConfig) {
    if let Ok(value) = env::var("NEUROKERNEL_TIME_STEP") {
        if let Ok(step) = value.parse::<f64>() {
            config.simulation.time_step = step;
        }
    }
    if let Ok(value) = env::var("NEUROKERNEL_UPDATE_MODE") {
        if let Ok(mode) = value.parse::<UpdateMode>() {
            config.simulation.update_mode = mode;
        }
    }
    if let Ok(value) = env::var("NEUROKERNEL_SEED") {
        if let Ok(seed) = value.parse::<u64>() {
            config.simulation.seed = Some(seed);
        }
    }
    if let Ok(value) = env::var("NEUROKERNEL_STEPS") {
        if let Ok(steps) = value.parse::<u64>() {
            config.simulation.steps = steps;
        }
    }
    if let Ok(value) = env::var("NEUROKERNEL_LOG_LEVEL") {
        config.logging.level = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Key/value map, e.g. `{"time_step": "0.05", "seed": "7"}`
pub fn apply_cli_overrides(config: &mut NeurokernelConfig, cli_args: &HashMap<String, String>) {
    // Simulation settings
    if let Some(value) = cli_args.get("time_step") {
        if let Ok(step) = value.parse::<f64>() {
            config.simulation.time_step = step;
        }
    }
    if let Some(value) = cli_args.get("update_mode") {
        if let Ok(mode) = value.parse::<UpdateMode>() {
            config.simulation.update_mode = mode;
        }
    }
    if let Some(value) = cli_args.get("seed") {
        if let Ok(seed) = value.parse::<u64>() {
            config.simulation.seed = Some(seed);
        }
    }
    if let Some(value) = cli_args.get("steps") {
        if let Ok(steps) = value.parse::<u64>() {
            config.simulation.steps = steps;
        }
    }

    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }

    // Topology settings
    if let Some(value) = cli_args.get("layers") {
        let sizes: Result<Vec<usize>, _> =
            value.split(',').map(|s| s.trim().parse::<usize>()).collect();
        if let Ok(sizes) = sizes {
            config.topology.layer_sizes = sizes;
        }
    }
    if let Some(value) = cli_args.get("random_prob") {
        if let Ok(prob) = value.parse::<f64>() {
            config.winner_take_all.random_prob = prob;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const OVERRIDE_VARS: &[&str] = &[
        "NEUROKERNEL_TIME_STEP",
        "NEUROKERNEL_UPDATE_MODE",
        "NEUROKERNEL_SEED",
        "NEUROKERNEL_STEPS",
        "NEUROKERNEL_LOG_LEVEL",
    ];

    fn clear_override_vars() {
        for var in OVERRIDE_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom.toml");
        File::create(&config_path).unwrap();

        env::set_var("NEUROKERNEL_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("NEUROKERNEL_CONFIG_PATH");

        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_find_config_file_env_var_missing() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        env::set_var("NEUROKERNEL_CONFIG_PATH", "/definitely/not/here.toml");
        let result = find_config_file();
        env::remove_var("NEUROKERNEL_CONFIG_PATH");

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_minimal_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_override_vars();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[simulation]").unwrap();
        writeln!(file, "time_step = 0.25").unwrap();
        writeln!(file, "seed = 42").unwrap();
        writeln!(file, "[winner_take_all]").unwrap();
        writeln!(file, "random_prob = 0.1").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();

        assert_eq!(config.simulation.time_step, 0.25);
        assert_eq!(config.simulation.seed, Some(42));
        assert_eq!(config.winner_take_all.random_prob, 0.1);
        assert_eq!(config.topology.context_initial_activation, 0.5);
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = NeurokernelConfig::default();

        env::set_var("NEUROKERNEL_TIME_STEP", "0.01");
        env::set_var("NEUROKERNEL_UPDATE_MODE", "priority");
        env::set_var("NEUROKERNEL_SEED", "not-a-number");

        apply_environment_overrides(&mut config);
        clear_override_vars();

        assert_eq!(config.simulation.time_step, 0.01);
        assert_eq!(config.simulation.update_mode, UpdateMode::Priority);
        assert_eq!(config.simulation.seed, None);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = NeurokernelConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("seed".to_string(), "7".to_string());
        cli_args.insert("layers".to_string(), "4, 8,2".to_string());

        apply_cli_overrides(&mut config, &cli_args);

        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.topology.layer_sizes, vec![4, 8, 2]);
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_override_vars();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[simulation]").unwrap();
        writeln!(file, "time_step = 1.0").unwrap();
        writeln!(file, "steps = 10").unwrap();

        env::set_var("NEUROKERNEL_TIME_STEP", "0.5");
        env::set_var("NEUROKERNEL_STEPS", "20");

        let mut cli_args = HashMap::new();
        cli_args.insert("time_step".to_string(), "0.2".to_string());

        let config = load_config(Some(&config_path), Some(&cli_args)).unwrap();
        clear_override_vars();

        // CLI wins for time_step, env wins for steps (no CLI override)
        assert_eq!(config.simulation.time_step, 0.2);
        assert_eq!(config.simulation.steps, 20);
    }
}
