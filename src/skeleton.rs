//! Kinematic tree indexing for the structured prediction layer.
//!
//! Turns a flat skeleton definition (joint id → parent id + name) into an
//! immutable index carrying, for every joint, the full transitive ancestor
//! chain and a validated parent-before-child prediction order. Built once
//! at model construction; the forward pass only reads it.

use serde::{Deserialize, Serialize};

pub mod smpl;

// ─── Definition ───────────────────────────────────────────────────

/// One row of a skeleton definition: a joint, its immediate parent, its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointDef {
    /// Joint id. Ids of a skeleton must form the dense range `0..n`.
    pub id: usize,
    /// Immediate parent id; `None` marks the root.
    pub parent: Option<usize>,
    /// Human-readable joint name (e.g. `"l_knee"`).
    pub name: String,
}

/// A skeleton definition: one `JointDef` per joint, in any order.
///
/// Must describe a single rooted tree over dense ids — `IndexedSkeleton`
/// rejects anything else at build time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonDef {
    joints: Vec<JointDef>,
}

impl SkeletonDef {
    /// Build a definition from `(id, parent, name)` rows.
    pub fn new(entries: &[(usize, Option<usize>, &str)]) -> Self {
        let joints = entries
            .iter()
            .map(|&(id, parent, name)| JointDef {
                id,
                parent,
                name: name.to_string(),
            })
            .collect();
        Self { joints }
    }

    pub fn joints(&self) -> &[JointDef] {
        &self.joints
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }
}

// ─── Errors ───────────────────────────────────────────────────────

/// Rejected skeleton definition or prediction order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkeletonError {
    /// A joint id appears more than once.
    DuplicateJoint { id: usize },
    /// A joint id falls outside the dense range `0..num_joints`.
    JointIdOutOfRange { id: usize, num_joints: usize },
    /// A parent id that is not itself a defined joint.
    DanglingParent { joint: usize, parent: usize },
    /// More than one joint without a parent.
    MultipleRoots { first: usize, second: usize },
    /// No joint without a parent (includes the empty skeleton).
    NoRoot,
    /// The parent-link walk from `joint` revisited a joint.
    Cycle { joint: usize },
    /// A prediction order that is not a permutation of `0..num_joints`.
    OrderNotPermutation,
    /// A prediction order that schedules `joint` before its `ancestor`.
    NonTopologicalOrder { joint: usize, ancestor: usize },
}

impl std::fmt::Display for SkeletonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateJoint { id } => write!(f, "joint {} is defined twice", id),
            Self::JointIdOutOfRange { id, num_joints } => {
                write!(f, "joint id {} outside dense range 0..{}", id, num_joints)
            }
            Self::DanglingParent { joint, parent } => {
                write!(f, "joint {} names undefined parent {}", joint, parent)
            }
            Self::MultipleRoots { first, second } => {
                write!(f, "joints {} and {} are both roots", first, second)
            }
            Self::NoRoot => write!(f, "skeleton has no root joint"),
            Self::Cycle { joint } => {
                write!(f, "parent chain of joint {} loops back on itself", joint)
            }
            Self::OrderNotPermutation => {
                write!(f, "prediction order is not a permutation of the joint ids")
            }
            Self::NonTopologicalOrder { joint, ancestor } => write!(
                f,
                "prediction order schedules joint {} before its ancestor {}",
                joint, ancestor
            ),
        }
    }
}

impl std::error::Error for SkeletonError {}

// ─── Indexed skeleton ─────────────────────────────────────────────

/// A joint with its full ancestor chain resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedJoint {
    pub id: usize,
    pub name: String,
    /// Immediate parent; `None` for the root.
    pub parent: Option<usize>,
    /// All transitive ancestors, nearest-first, root-last. Empty for the
    /// root. Length equals the joint's depth in the tree.
    pub ancestors: Vec<usize>,
}

/// Immutable ancestor index over a skeleton, plus the prediction order.
///
/// Joints are stored in a dense array, index = joint id, so the forward
/// pass looks predictors and predictions up by plain indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedSkeleton {
    pub(crate) joints: Vec<IndexedJoint>,
    pub(crate) order: Vec<usize>,
}

impl IndexedSkeleton {
    /// Index a skeleton with the identity prediction order `0..n`.
    ///
    /// Fails when ids grow against the tree (a child with a smaller id than
    /// one of its ancestors); use [`IndexedSkeleton::with_order`] with an
    /// explicit topological order for such skeletons.
    pub fn build(def: &SkeletonDef) -> Result<Self, SkeletonError> {
        Self::with_order(def, (0..def.len()).collect())
    }

    /// Index a skeleton with an explicit prediction order.
    ///
    /// The order must be a permutation of `0..n` in which every joint
    /// appears after all of its ancestors.
    pub fn with_order(def: &SkeletonDef, order: Vec<usize>) -> Result<Self, SkeletonError> {
        let n = def.len();

        // Dense id → definition row
        let mut by_id: Vec<Option<&JointDef>> = vec![None; n];
        for joint in def.joints() {
            if joint.id >= n {
                return Err(SkeletonError::JointIdOutOfRange {
                    id: joint.id,
                    num_joints: n,
                });
            }
            if by_id[joint.id].is_some() {
                return Err(SkeletonError::DuplicateJoint { id: joint.id });
            }
            by_id[joint.id] = Some(joint);
        }
        // n rows, ids < n, no duplicates: every slot is filled
        let defs: Vec<&JointDef> = by_id.into_iter().flatten().collect();

        // Exactly one root; every parent id resolves
        let mut root: Option<usize> = None;
        for joint in &defs {
            match joint.parent {
                None => match root {
                    None => root = Some(joint.id),
                    Some(first) => {
                        return Err(SkeletonError::MultipleRoots {
                            first,
                            second: joint.id,
                        })
                    }
                },
                Some(parent) if parent >= n => {
                    return Err(SkeletonError::DanglingParent {
                        joint: joint.id,
                        parent,
                    })
                }
                Some(_) => {}
            }
        }
        let root = match root {
            Some(id) => id,
            None => return Err(SkeletonError::NoRoot),
        };

        // Ancestor chains: walk parent links iteratively, nearest-first.
        // A revisit means the definition is cyclic.
        let mut joints = Vec::with_capacity(n);
        for joint in &defs {
            let mut ancestors = Vec::new();
            let mut cursor = joint.parent;
            while let Some(parent) = cursor {
                if parent == joint.id || ancestors.contains(&parent) {
                    return Err(SkeletonError::Cycle { joint: joint.id });
                }
                ancestors.push(parent);
                cursor = defs[parent].parent;
            }
            joints.push(IndexedJoint {
                id: joint.id,
                name: joint.name.clone(),
                parent: joint.parent,
                ancestors,
            });
        }

        // The order must be a permutation placing every joint after all of
        // its ancestors, or the forward pass would read missing predictions.
        if order.len() != n {
            return Err(SkeletonError::OrderNotPermutation);
        }
        let mut position = vec![usize::MAX; n];
        for (pos, &id) in order.iter().enumerate() {
            if id >= n || position[id] != usize::MAX {
                return Err(SkeletonError::OrderNotPermutation);
            }
            position[id] = pos;
        }
        for &id in &order {
            for &ancestor in &joints[id].ancestors {
                if position[ancestor] > position[id] {
                    return Err(SkeletonError::NonTopologicalOrder {
                        joint: id,
                        ancestor,
                    });
                }
            }
        }

        log::debug!(
            "indexed skeleton: {} joints, root '{}' (id {})",
            n,
            joints[root].name,
            root
        );

        Ok(Self { joints, order })
    }

    pub fn num_joints(&self) -> usize {
        self.joints.len()
    }

    /// All joints, index = joint id.
    pub fn joints(&self) -> &[IndexedJoint] {
        &self.joints
    }

    /// Look a joint up by id. Panics on an unknown id.
    pub fn joint(&self, id: usize) -> &IndexedJoint {
        &self.joints[id]
    }

    /// The order in which joints are predicted.
    pub fn prediction_order(&self) -> &[usize] {
        &self.order
    }
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::smpl::smpl_skeleton;
    use super::*;

    fn two_joint_inverted() -> SkeletonDef {
        // Root carries the larger id, so the identity order is child-first.
        SkeletonDef::new(&[(0, Some(1), "child"), (1, None, "root")])
    }

    #[test]
    fn smpl_ancestor_chains() {
        let skeleton = IndexedSkeleton::build(&smpl_skeleton()).expect("valid skeleton");
        assert_eq!(skeleton.num_joints(), 22);

        assert!(skeleton.joint(0).ancestors.is_empty(), "root has ancestors");
        // head: neck → spine3 → spine2 → spine1 → root
        assert_eq!(skeleton.joint(15).ancestors, vec![12, 9, 6, 3, 0]);
        // l_wrist: elbow → shoulder → collar → spine3 → spine2 → spine1 → root
        assert_eq!(skeleton.joint(21).ancestors, vec![19, 17, 14, 9, 6, 3, 0]);
    }

    #[test]
    fn ancestors_nearest_first_with_parent_chain_as_tail() {
        let skeleton = IndexedSkeleton::build(&smpl_skeleton()).expect("valid skeleton");
        for joint in skeleton.joints() {
            match joint.parent {
                None => assert!(joint.ancestors.is_empty()),
                Some(parent) => {
                    assert_eq!(joint.ancestors[0], parent, "joint {}", joint.id);
                    assert_eq!(
                        &joint.ancestors[1..],
                        &skeleton.joint(parent).ancestors[..],
                        "joint {}",
                        joint.id
                    );
                    // depth grows by one per tree level
                    assert_eq!(
                        joint.ancestors.len(),
                        skeleton.joint(parent).ancestors.len() + 1
                    );
                }
            }
        }
    }

    #[test]
    fn dangling_parent_rejected() {
        let def = SkeletonDef::new(&[(0, None, "root"), (1, Some(7), "stray")]);
        let err = IndexedSkeleton::build(&def).unwrap_err();
        assert_eq!(err, SkeletonError::DanglingParent { joint: 1, parent: 7 });
    }

    #[test]
    fn cycle_rejected() {
        let def = SkeletonDef::new(&[(0, Some(1), "a"), (1, Some(0), "b"), (2, None, "root")]);
        let err = IndexedSkeleton::build(&def).unwrap_err();
        assert_eq!(err, SkeletonError::Cycle { joint: 0 });
    }

    #[test]
    fn duplicate_joint_rejected() {
        let def = SkeletonDef::new(&[(0, None, "a"), (0, None, "b"), (1, Some(0), "c")]);
        let err = IndexedSkeleton::build(&def).unwrap_err();
        assert_eq!(err, SkeletonError::DuplicateJoint { id: 0 });
    }

    #[test]
    fn sparse_ids_rejected() {
        let def = SkeletonDef::new(&[(0, None, "root"), (5, Some(0), "far")]);
        let err = IndexedSkeleton::build(&def).unwrap_err();
        assert_eq!(err, SkeletonError::JointIdOutOfRange { id: 5, num_joints: 2 });
    }

    #[test]
    fn multiple_roots_rejected() {
        let def = SkeletonDef::new(&[(0, None, "a"), (1, None, "b")]);
        let err = IndexedSkeleton::build(&def).unwrap_err();
        assert_eq!(err, SkeletonError::MultipleRoots { first: 0, second: 1 });
    }

    #[test]
    fn rootless_definition_rejected() {
        let def = SkeletonDef::new(&[(0, Some(1), "a"), (1, Some(0), "b")]);
        let err = IndexedSkeleton::build(&def).unwrap_err();
        assert_eq!(err, SkeletonError::NoRoot);
    }

    #[test]
    fn identity_order_rejected_when_ids_grow_against_the_tree() {
        let err = IndexedSkeleton::build(&two_joint_inverted()).unwrap_err();
        assert_eq!(
            err,
            SkeletonError::NonTopologicalOrder { joint: 0, ancestor: 1 }
        );
    }

    #[test]
    fn explicit_topological_order_accepted() {
        let skeleton =
            IndexedSkeleton::with_order(&two_joint_inverted(), vec![1, 0]).expect("topological");
        assert_eq!(skeleton.prediction_order(), &[1, 0]);
        assert_eq!(skeleton.joint(0).ancestors, vec![1]);
    }

    #[test]
    fn non_permutation_order_rejected() {
        let def = SkeletonDef::new(&[(0, None, "root"), (1, Some(0), "child")]);
        for order in [vec![0], vec![0, 0], vec![0, 1, 1]] {
            let err = IndexedSkeleton::with_order(&def, order).unwrap_err();
            assert_eq!(err, SkeletonError::OrderNotPermutation);
        }
    }

    #[test]
    fn definition_json_format() {
        let def = SkeletonDef::new(&[(0, None, "root"), (1, Some(0), "child")]);
        let json = serde_json::to_string(&def).expect("serialize");
        assert_eq!(
            json,
            r#"{"joints":[{"id":0,"parent":null,"name":"root"},{"id":1,"parent":0,"name":"child"}]}"#
        );
    }
}
