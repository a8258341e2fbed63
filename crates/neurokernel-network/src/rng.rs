// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! RNG construction
//!
//! A fixed seed gives reproducible randomization, tie-breaking and noise.

use rand::rngs::StdRng;
use rand::SeedableRng;

pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
