//! Structured prediction layer (SPL) in burn.
//!
//! One small MLP per joint, executed parent-before-child: each joint's
//! predictor sees the shared input features plus the already-predicted
//! outputs of its full ancestor chain, concatenated along the feature
//! axis. The final tensor stacks the per-joint outputs in ascending
//! joint-id order, independent of the execution order.

use burn::config::Config;
use burn::module::{Ignored, Module};
use burn::nn::{Linear, LinearConfig};
use burn::prelude::*;
use burn::tensor::activation::relu;

use crate::skeleton::IndexedSkeleton;

// ─── Configuration ────────────────────────────────────────────────

/// Structured prediction layer configuration.
#[derive(Config, Debug)]
pub struct SplConfig {
    /// Shared input feature width (e.g. the pose-encoder hidden size).
    pub input_size: usize,
    /// Hidden width of each per-joint MLP.
    #[config(default = 64)]
    pub hidden_size: usize,
    /// Output feature width per joint (e.g. 3 for an axis-angle rotation).
    #[config(default = 3)]
    pub output_size: usize,
}

// ─── Per-joint predictor ──────────────────────────────────────────

/// Predictor for a single joint: Linear → ReLU → Linear.
///
/// Input width depends on the joint's ancestor count; predictors are
/// never shared between joints.
#[derive(Module, Debug)]
struct JointPredictor<B: Backend> {
    fc1: Linear<B>,
    fc2: Linear<B>,
}

impl<B: Backend> JointPredictor<B> {
    /// - `input`: [batch, time, input_size + output_size * num_ancestors]
    ///
    /// Returns: [batch, time, output_size]
    fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 3> {
        self.fc2.forward(relu(self.fc1.forward(input)))
    }
}

// ─── SPL ──────────────────────────────────────────────────────────

/// Structured prediction layer over a kinematic tree.
///
/// Owns one [`JointPredictor`] per joint (index = joint id) and the
/// skeleton index that drives the forward pass.
#[derive(Module, Debug)]
pub struct Spl<B: Backend> {
    joints: Vec<JointPredictor<B>>,
    skeleton: Ignored<IndexedSkeleton>,
}

impl SplConfig {
    /// Initialize one predictor per joint, sized by ancestor count.
    ///
    /// The root's predictor sees exactly the shared input width; every
    /// other joint's input widens by `output_size` per ancestor.
    pub fn init<B: Backend>(&self, skeleton: IndexedSkeleton, device: &B::Device) -> Spl<B> {
        let mut joints = Vec::with_capacity(skeleton.num_joints());
        for entry in skeleton.joints() {
            let d_in = self.input_size + self.output_size * entry.ancestors.len();
            joints.push(JointPredictor {
                fc1: LinearConfig::new(d_in, self.hidden_size).init(device),
                fc2: LinearConfig::new(self.hidden_size, self.output_size).init(device),
            });
        }

        log::debug!(
            "spl: {} joint predictors, {} params",
            joints.len(),
            self.param_estimate(&skeleton)
        );

        Spl {
            joints,
            skeleton: Ignored(skeleton),
        }
    }

    /// Exact parameter count across all per-joint predictors.
    pub fn param_estimate(&self, skeleton: &IndexedSkeleton) -> usize {
        skeleton
            .joints()
            .iter()
            .map(|joint| {
                let d_in = self.input_size + self.output_size * joint.ancestors.len();
                d_in * self.hidden_size
                    + self.hidden_size
                    + self.hidden_size * self.output_size
                    + self.output_size
            })
            .sum()
    }
}

impl<B: Backend> Spl<B> {
    pub fn num_joints(&self) -> usize {
        self.joints.len()
    }

    pub fn skeleton(&self) -> &IndexedSkeleton {
        &self.skeleton
    }

    /// Run the tree-structured prediction pass.
    ///
    /// - `input`: [batch, time, input_size] — shared input, fed to every joint
    ///
    /// Returns: [batch, output_size * num_joints, time] — per-joint outputs
    /// concatenated in ascending joint-id order, then the time and feature
    /// axes swapped.
    ///
    /// Panics if the prediction order visits a joint before one of its
    /// ancestors; `IndexedSkeleton` construction makes that unreachable.
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 3> {
        // Per-call prediction slots, index = joint id, write-once.
        let mut predictions: Vec<Option<Tensor<B, 3>>> = vec![None; self.joints.len()];

        for &joint_id in self.skeleton.prediction_order() {
            let entry = self.skeleton.joint(joint_id);

            let mut parts = Vec::with_capacity(1 + entry.ancestors.len());
            parts.push(input.clone());
            for &ancestor in &entry.ancestors {
                match &predictions[ancestor] {
                    Some(prior) => parts.push(prior.clone()),
                    None => panic!(
                        "joint {} scheduled before its ancestor {}",
                        joint_id, ancestor
                    ),
                }
            }

            let features = Tensor::cat(parts, 2);
            predictions[joint_id] = Some(self.joints[joint_id].forward(features));
        }

        let by_id: Vec<Tensor<B, 3>> = predictions
            .into_iter()
            .enumerate()
            .map(|(joint_id, prediction)| match prediction {
                Some(tensor) => tensor,
                None => panic!("joint {} was never predicted", joint_id),
            })
            .collect();

        Tensor::cat(by_id, 2).swap_dims(1, 2)
    }
}

// ─── Tests ────────────────────────────────────────────────────────
