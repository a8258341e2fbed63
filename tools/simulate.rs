// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Build a feed-forward network from configuration and step it.
//!
//! Usage: simulate [--config <path>] [--set key=value]... [--debug-<crate>]...
//!
//! `--set` accepts the configuration override keys (`time_step`,
//! `update_mode`, `seed`, `steps`, `log_level`, `layers`, `random_prob`).

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use neurokernel::config::{
    apply_cli_overrides, apply_environment_overrides, load_config, validate_config, ConfigError,
    NeurokernelConfig,
};
use neurokernel::network::{FeedForward, FeedForwardOptions, Network};
use neurokernel::observability::{debug_flags_help, init_logging, parse_debug_flags, LoggingOptions};

struct Args {
    config: Option<PathBuf>,
    overrides: HashMap<String, String>,
}

fn parse_args() -> Result<Option<Args>> {
    let mut config = None;
    let mut overrides = HashMap::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            "--set" => {
                let pair = args.next().context("--set needs key=value")?;
                let Some((key, value)) = pair.split_once('=') else {
                    bail!("--set expects key=value, got {pair}");
                };
                overrides.insert(key.trim().to_string(), value.trim().to_string());
            }
            "-h" | "--help" => {
                println!(
                    "Usage: simulate [--config <path>] [--set key=value]...\n\n{}",
                    debug_flags_help()
                );
                return Ok(None);
            }
            other if other.starts_with("--debug-") => {}
            other => bail!("Unknown argument: {other}"),
        }
    }

    Ok(Some(Args { config, overrides }))
}

/// Explicit path must exist; a missing discovered file falls back to defaults
fn resolve_config(args: &Args) -> Result<NeurokernelConfig> {
    match load_config(args.config.as_deref(), Some(&args.overrides)) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) if args.config.is_none() => {
            let mut config = NeurokernelConfig::default();
            apply_environment_overrides(&mut config);
            apply_cli_overrides(&mut config, &args.overrides);
            Ok(config)
        }
        Err(e) => Err(e).context("Failed to load configuration"),
    }
}

fn main() -> Result<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };
    let config = resolve_config(&args)?;
    validate_config(&config).context("Invalid configuration")?;

    let flags = parse_debug_flags();
    let options = LoggingOptions {
        default_level: config.logging.level.clone(),
        ..LoggingOptions::default()
    };
    let _guard = init_logging(&flags, &options)?;

    info!(
        steps = config.simulation.steps,
        update_mode = %config.simulation.update_mode,
        layers = ?config.topology.layer_sizes,
        "Starting simulation"
    );

    let mut net = Network::with_config(&config.simulation);
    let ff = FeedForward::build(&mut net, "Feed-forward", &FeedForwardOptions::from_config(&config.topology))
        .context("Failed to build network")?;

    let input_size = net.neuron_group(ff.input_layer())?.len();
    let input: Vec<f64> = (0..input_size)
        .map(|i| if i % 2 == 0 { 1.0 } else { 0.0 })
        .collect();

    for step in 0..config.simulation.steps {
        ff.apply_input(&mut net, &input)?;
        net.update();
        debug!(step, time = net.time(), output = ?ff.output(&net)?, "Step");
    }

    info!(
        time = net.time(),
        neurons = net.neuron_count(),
        synapses = net.synapse_count(),
        output = ?ff.output(&net)?,
        "Simulation complete"
    );
    Ok(())
}
