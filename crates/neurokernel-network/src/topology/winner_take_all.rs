// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Winner-take-all group
//!
//! Each step the member with the largest weighted input is set to the win
//! value and every other member to the lose value. Ties are broken
//! uniformly among all tied members. With probability `random_prob` the
//! winner is instead any member, chosen uniformly. Nothing happens while
//! the network's clamp-neurons flag is set.

use std::sync::Arc;

use neurokernel_config::WinnerTakeAllConfig;
use neurokernel_neural::{rules::LinearRule, GroupId, Neuron, UpdateRule};
use rand::{Rng, RngCore};

use super::NEURON_SPACING;
use crate::groups::{NeuronGroupKind, WinnerTakeAllParams};
use crate::network::Network;
use crate::types::{NetworkError, NetworkResult};

/// Index of the largest input, ties broken uniformly at random
///
/// NaN inputs never win unless every input is NaN, in which case any
/// member may. Returns `None` only for an empty slice.
pub fn select_winner(inputs: &[f64], rng: &mut dyn RngCore) -> Option<usize> {
    if inputs.is_empty() {
        return None;
    }
    let max = inputs
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(f64::NEG_INFINITY, f64::max);
    let tied: Vec<usize> = inputs
        .iter()
        .enumerate()
        .filter(|(_, v)| **v == max)
        .map(|(i, _)| i)
        .collect();
    if tied.is_empty() {
        return Some(rng.gen_range(0..inputs.len()));
    }
    Some(tied[rng.gen_range(0..tied.len())])
}

/// Handle to a built winner-take-all group
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WinnerTakeAll {
    group: GroupId,
}

impl WinnerTakeAll {
    pub fn build(
        net: &mut Network,
        size: usize,
        label: impl Into<String>,
        params: WinnerTakeAllParams,
    ) -> NetworkResult<Self> {
        if size == 0 {
            return Err(NetworkError::InvalidTopology(
                "winner-take-all group needs at least one neuron".to_string(),
            ));
        }
        let rule = Arc::new(UpdateRule::Linear(LinearRule::default()));
        let neurons = (0..size)
            .map(|i| Neuron::new(Arc::clone(&rule)).at(i as f64 * NEURON_SPACING, 0.0))
            .collect();
        let group =
            net.create_neuron_group_of_kind(neurons, label, NeuronGroupKind::WinnerTakeAll(params))?;
        Ok(Self { group })
    }

    pub fn from_config(
        net: &mut Network,
        size: usize,
        label: impl Into<String>,
        config: &WinnerTakeAllConfig,
    ) -> NetworkResult<Self> {
        Self::build(net, size, label, WinnerTakeAllParams::from(config))
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    /// Index of the member currently holding the win value
    pub fn winner(&self, net: &Network) -> NetworkResult<Option<usize>> {
        let params = match net.neuron_group(self.group)?.kind {
            NeuronGroupKind::WinnerTakeAll(p) => p,
            NeuronGroupKind::Plain => WinnerTakeAllParams::default(),
        };
        Ok(net
            .activations(self.group)?
            .iter()
            .position(|a| *a == params.win_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_select_winner_picks_max() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(select_winner(&[3.0, 1.0, 4.0, 1.0, 5.0], &mut rng), Some(4));
        assert_eq!(select_winner(&[], &mut rng), None);
    }

    #[test]
    fn test_select_winner_ignores_nan() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(select_winner(&[f64::NAN, 0.5, 0.1], &mut rng), Some(1));
        let all_nan = select_winner(&[f64::NAN, f64::NAN], &mut rng);
        assert!(matches!(all_nan, Some(0) | Some(1)));
    }

    #[test]
    fn test_tie_break_covers_all_members() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts = [0usize; 3];
        for _ in 0..3000 {
            if let Some(i) = select_winner(&[2.0, 2.0, 2.0], &mut rng) {
                counts[i] += 1;
            }
        }
        for c in counts {
            assert!((800..1200).contains(&c), "counts {counts:?}");
        }
    }

    #[test]
    fn test_empty_group_rejected() {
        let mut net = Network::seeded(1);
        assert!(WinnerTakeAll::build(&mut net, 0, "wta", WinnerTakeAllParams::default()).is_err());
    }
}
