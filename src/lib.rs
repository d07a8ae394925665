//! Structured prediction layer (SPL) for 3D human motion models.
//!
//! Decomposes a whole-body pose prediction into per-joint predictions
//! conditioned on the kinematic chain: each joint's predictor sees the
//! shared pose features plus the already-predicted outputs of all its
//! ancestors, and the joints run in a validated parent-before-child
//! order. Output blocks are stacked in ascending joint-id order.
//!
//! # Public API
//!
//! ```ignore
//! use spl::skeleton::smpl::smpl_skeleton;
//! use spl::{IndexedSkeleton, SplConfig};
//!
//! let skeleton = IndexedSkeleton::build(&smpl_skeleton())?;
//! let model = SplConfig::new(128).init::<B>(skeleton, &device);
//! // [batch, time, 128] → [batch, 22 * 3, time]
//! let poses = model.forward(features);
//! ```

pub mod checkpoint;
pub mod model;
pub mod skeleton;

// Re-exports — the types most callers need
pub use model::{Spl, SplConfig};
pub use skeleton::{IndexedJoint, IndexedSkeleton, JointDef, SkeletonDef, SkeletonError};
