// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Backprop network
//!
//! A feed-forward network with a seam for an external trainer. Only the
//! wiring is modelled here: which groups a trainer reads inputs from and
//! writes targets against, and the training data it would use.

use neurokernel_neural::GroupId;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{FeedForward, FeedForwardOptions};
use crate::groups::SubnetworkKind;
use crate::network::Network;
use crate::types::{NetworkError, NetworkResult};

/// Groups a trainer is connected to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainerWiring {
    pub input_group: GroupId,
    pub output_group: GroupId,
}

/// Paired input and target rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSet {
    inputs: Vec<Vec<f64>>,
    targets: Vec<Vec<f64>>,
}

impl TrainingSet {
    /// Rows must pair up and match the given widths
    pub fn new(
        inputs: Vec<Vec<f64>>,
        targets: Vec<Vec<f64>>,
        input_width: usize,
        target_width: usize,
    ) -> NetworkResult<Self> {
        if inputs.len() != targets.len() {
            return Err(NetworkError::DimensionMismatch {
                expected: inputs.len(),
                actual: targets.len(),
            });
        }
        for row in &inputs {
            check_width(row, input_width)?;
        }
        for row in &targets {
            check_width(row, target_width)?;
        }
        Ok(Self { inputs, targets })
    }

    pub fn inputs(&self) -> &[Vec<f64>] {
        &self.inputs
    }

    pub fn targets(&self) -> &[Vec<f64>] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn input_width(&self) -> Option<usize> {
        self.inputs.first().map(Vec::len)
    }

    pub fn target_width(&self) -> Option<usize> {
        self.targets.first().map(Vec::len)
    }
}

fn check_width(row: &[f64], width: usize) -> NetworkResult<()> {
    if row.len() != width {
        return Err(NetworkError::DimensionMismatch {
            expected: width,
            actual: row.len(),
        });
    }
    Ok(())
}

/// External learning algorithm attached to a trainable network
pub trait Trainer: std::fmt::Debug {
    fn name(&self) -> &str;

    /// Called once when the trainer is attached
    fn attach(&mut self, wiring: &TrainerWiring);
}

/// A network a [`Trainer`] can be wired to
pub trait Trainable {
    fn input_group(&self) -> GroupId;

    fn output_group(&self) -> GroupId;

    fn training_set(&self) -> Option<&TrainingSet>;

    fn wiring(&self) -> TrainerWiring {
        TrainerWiring {
            input_group: self.input_group(),
            output_group: self.output_group(),
        }
    }
}

#[derive(Debug)]
pub struct BackpropNetwork {
    feed_forward: FeedForward,
    training_set: Option<TrainingSet>,
    trainer: Option<Box<dyn Trainer>>,
}

impl BackpropNetwork {
    pub fn build(
        net: &mut Network,
        label: impl Into<String>,
        options: &FeedForwardOptions,
    ) -> NetworkResult<Self> {
        let feed_forward = FeedForward::build_as(net, label, options, SubnetworkKind::Backprop)?;
        Ok(Self {
            feed_forward,
            training_set: None,
            trainer: None,
        })
    }

    pub fn feed_forward(&self) -> &FeedForward {
        &self.feed_forward
    }

    pub fn subnet(&self) -> GroupId {
        self.feed_forward.subnet()
    }

    /// Install training data after checking it against the layer sizes
    pub fn set_training_set(&mut self, net: &Network, set: TrainingSet) -> NetworkResult<()> {
        let input_size = net.neuron_group(self.input_group())?.len();
        let output_size = net.neuron_group(self.output_group())?.len();
        for row in set.inputs() {
            check_width(row, input_size)?;
        }
        for row in set.targets() {
            check_width(row, output_size)?;
        }
        self.training_set = Some(set);
        Ok(())
    }

    pub fn attach_trainer(&mut self, mut trainer: Box<dyn Trainer>) {
        let wiring = self.wiring();
        trainer.attach(&wiring);
        info!(
            trainer = trainer.name(),
            input = %wiring.input_group,
            output = %wiring.output_group,
            "Attached trainer"
        );
        self.trainer = Some(trainer);
    }

    pub fn trainer(&self) -> Option<&dyn Trainer> {
        self.trainer.as_deref()
    }

    pub fn detach_trainer(&mut self) -> Option<Box<dyn Trainer>> {
        self.trainer.take()
    }

    pub fn apply_input(&self, net: &mut Network, values: &[f64]) -> NetworkResult<()> {
        self.feed_forward.apply_input(net, values)
    }

    /// Load training row `index` into the input layer
    pub fn apply_training_row(&self, net: &mut Network, index: usize) -> NetworkResult<()> {
        let inputs = self.training_set.as_ref().map(TrainingSet::inputs).unwrap_or(&[]);
        let row = inputs.get(index).ok_or(NetworkError::IndexOutOfRange {
            what: "training set",
            index,
            len: inputs.len(),
        })?;
        self.apply_input(net, row)
    }
}

impl Trainable for BackpropNetwork {
    fn input_group(&self) -> GroupId {
        self.feed_forward.input_layer()
    }

    fn output_group(&self) -> GroupId {
        self.feed_forward.output_layer()
    }

    fn training_set(&self) -> Option<&TrainingSet> {
        self.training_set.as_ref()
    }
}
