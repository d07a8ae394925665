//! The 22-joint SMPL body skeleton.
//!
//! Reference skeleton for whole-body motion models: a spine/neck/head
//! chain, two legs, and two arms hanging off the upper spine via collar
//! bones. Joint ids grow with tree depth, so the identity prediction
//! order is already parent-before-child.

use super::SkeletonDef;

pub const SMPL_NUM_JOINTS: usize = 22;

/// `(id, parent, name)` rows, grouped by kinematic chain.
pub const SMPL_SKELETON: [(usize, Option<usize>, &str); SMPL_NUM_JOINTS] = [
    (0, None, "root"),
    (3, Some(0), "spine1"),
    (6, Some(3), "spine2"),
    (9, Some(6), "spine3"),
    (12, Some(9), "neck"),
    (15, Some(12), "head"),
    (2, Some(0), "l_hip"),
    (5, Some(2), "l_knee"),
    (8, Some(5), "l_heel"),
    (11, Some(8), "l_foot"),
    (1, Some(0), "r_hip"),
    (4, Some(1), "r_knee"),
    (7, Some(4), "r_heel"),
    (10, Some(7), "r_foot"),
    (14, Some(9), "l_collar"),
    (17, Some(14), "l_shoulder"),
    (19, Some(17), "l_elbow"),
    (21, Some(19), "l_wrist"),
    (13, Some(9), "r_collar"),
    (16, Some(13), "r_shoulder"),
    (18, Some(16), "r_elbow"),
    (20, Some(18), "r_wrist"),
];

/// The SMPL skeleton as a definition ready for indexing.
pub fn smpl_skeleton() -> SkeletonDef {
    SkeletonDef::new(&SMPL_SKELETON)
}
