// THEORY:
// The `group_grower` is the engine that turns a seed into a connected group. It
// is a breadth-first region growing over a point cloud, with the friend-of-friend
// test standing in for pixel adjacency.
//
// The group doubles as the work queue. A cursor marks the next member whose
// neighbourhood has not been expanded yet:
// 1.  **Query**: find the samples still in the cloud within the radius of the
//     member under the cursor.
// 2.  **Test**: resolve that member's gradient threshold and test every
//     neighbour against it.
// 3.  **Absorb**: each friend is removed from the cloud and appended to the
//     group, so it will be expanded in turn.
// 4.  **Advance**: move the cursor only once every neighbour has been handled.
//
// Growth stops when the cursor catches up with the end of the group, or early
// when the cloud is down to a single sample, which cannot have a non-trivial
// neighbourhood. Members are only ever appended; a group never loses a point.

use crate::core_modules::error::{FofError, FofResult};
use crate::core_modules::membership::{GradientThreshold, MembershipTest};
use crate::core_modules::point::Sample;
use crate::core_modules::point_cloud::point_cloud::PointCloud;
use tracing::{debug, trace};

/// The friendship rule a stage grows groups with.
#[derive(Debug, Clone, Copy)]
pub struct FriendRule<'a> {
    pub test: MembershipTest,
    pub thresholds: &'a GradientThreshold,
}

/// How a call to [`expand`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthOutcome {
    /// Every member has been expanded.
    Complete,
    /// The cloud fell to one sample or fewer before the group was fully expanded.
    CloudExhausted,
}

impl GrowthOutcome {
    pub fn cloud_exhausted(self) -> bool {
        self == GrowthOutcome::CloudExhausted
    }
}

/// Whether a finished group is kept as a group or filed as an isolated cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Group,
    Isolated,
}

impl GroupKind {
    /// Groups smaller than `num_min` are isolated; exactly `num_min` is a group.
    pub fn classify(size: usize, num_min: usize) -> Self {
        if size < num_min {
            GroupKind::Isolated
        } else {
            GroupKind::Group
        }
    }
}

/// Grows `members` in place by absorbing friends out of `cloud`, expanding every
/// member from the first one, including members absorbed during this call.
pub fn expand(
    members: &mut Vec<Sample>,
    cloud: &mut PointCloud,
    rule: FriendRule<'_>,
) -> FofResult<GrowthOutcome> {
    let mut cursor = 0;
    while cursor < members.len() {
        let reference = members[cursor];
        let dv = rule.thresholds.resolve(reference.id)?;

        for id in cloud.within_radius(reference.point.planar(), rule.test.radius) {
            if id == reference.id {
                continue;
            }
            let candidate = cloud.get(id).copied().ok_or_else(|| {
                FofError::DataConsistency(format!(
                    "projection index returned {id}, which is not in the cloud"
                ))
            })?;
            if rule.test.is_friend(&reference.point, &candidate.point, dv) {
                members.push(cloud.remove(id)?);
                trace!(from = %reference.id, absorbed = %id, "absorbed friend");
            }
        }

        cursor += 1;
        if cloud.len() <= 1 {
            debug!(group_size = members.len(), "loop ended: cloud exhausted");
            return Ok(GrowthOutcome::CloudExhausted);
        }
    }
    Ok(GrowthOutcome::Complete)
}

/// Grows a fresh group from a single seed.
pub fn grow_from_seed(
    seed: Sample,
    cloud: &mut PointCloud,
    rule: FriendRule<'_>,
) -> FofResult<(Vec<Sample>, GrowthOutcome)> {
    let mut members = vec![seed];
    let outcome = expand(&mut members, cloud, rule)?;
    Ok((members, outcome))
}
