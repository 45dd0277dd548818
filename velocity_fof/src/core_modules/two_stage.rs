// THEORY:
// Clumps are found in two passes that share one notion of "already assigned":
// membership in a group is recorded by removing the sample from the working
// cloud, and identity is always the `SampleId`.
//
// **Stage 1** works on the seed candidates only (samples brighter than `I0`).
// It keeps popping the first remaining seed, grows it to completion and files
// the result as a provisional group or, when it is smaller than `num_min`, as a
// stage-0 isolated cluster.
//
// **Stage 2** works on the full-resolution cloud. Everything Stage 1 already
// filed is removed first. Each provisional group then reabsorbs faint friends
// out of the residual cloud; its own members, including the ones just absorbed,
// are the expansion sources. Before a group is expanded the first residual sample
// is set aside as a placeholder. That sample is not offered to any group and
// ends in the final isolated set.
//
// Both stages stop as soon as their cloud is down to a single sample.

use crate::core_modules::cube::SampleTable;
use crate::core_modules::error::FofResult;
use crate::core_modules::group_grower::{FriendRule, GroupKind, expand, grow_from_seed};
use crate::core_modules::point::Sample;
use crate::core_modules::point_cloud::point_cloud::PointCloud;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// The provisional result of Stage 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageOneOutput {
    pub groups: Vec<Vec<Sample>>,
    pub isolated: Vec<Vec<Sample>>,
    /// Seeds left over when the seed cloud ran down to a single sample.
    pub unclaimed_seeds: Vec<Sample>,
}

/// The final partition of every valid sample of the cube.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClumpCatalog {
    /// Groups after Stage-2 reabsorption.
    pub groups: Vec<Vec<Sample>>,
    /// Stage-0 isolated clusters, untouched by Stage 2.
    pub stage0_isolated: Vec<Vec<Sample>>,
    /// Samples no group absorbed, in scan order.
    pub isolated: Vec<Sample>,
}

impl ClumpCatalog {
    /// Total number of samples across all three categories.
    pub fn sample_count(&self) -> usize {
        self.groups.iter().map(Vec::len).sum::<usize>()
            + self.stage0_isolated.iter().map(Vec::len).sum::<usize>()
            + self.isolated.len()
    }
}

fn progress(remaining: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    100.0 * (1.0 - remaining as f64 / total as f64)
}

/// Stage 1: grows groups out of the seed candidates.
pub fn run_stage_one(
    seeds: Vec<Sample>,
    rule: FriendRule<'_>,
    num_min: usize,
) -> FofResult<StageOneOutput> {
    let mut cloud = PointCloud::new(seeds);
    let total = cloud.len();
    info!(seeds = total, "stage 1: growing groups from seed candidates");

    let mut output = StageOneOutput::default();
    while let Some(seed) = cloud.pop_front()? {
        let (members, outcome) = grow_from_seed(seed, &mut cloud, rule)?;

        match GroupKind::classify(members.len(), num_min) {
            GroupKind::Group => {
                debug!(seed = %seed.id, size = members.len(), "stage 1: group");
                output.groups.push(members);
            }
            GroupKind::Isolated => {
                debug!(seed = %seed.id, size = members.len(), "stage 1: isolated cluster");
                output.isolated.push(members);
            }
        }
        info!("Stage-1: {:.3}%", progress(cloud.len(), total));

        if outcome.cloud_exhausted() || cloud.len() <= 1 {
            debug!(remaining = cloud.len(), "stage 1: loop ended");
            break;
        }
    }

    output.unclaimed_seeds = cloud.into_samples();
    info!(
        groups = output.groups.len(),
        isolated_clusters = output.isolated.len(),
        unclaimed = output.unclaimed_seeds.len(),
        "stage 1 complete"
    );
    Ok(output)
}

/// Stage 2: reabsorbs the full-resolution samples into the Stage-1 groups.
pub fn run_stage_two(
    table: &SampleTable,
    stage_one: StageOneOutput,
    rule: FriendRule<'_>,
) -> FofResult<ClumpCatalog> {
    let StageOneOutput {
        mut groups,
        isolated: stage0_isolated,
        ..
    } = stage_one;

    let mut cloud = PointCloud::new(table.samples().to_vec());
    for sample in groups.iter().chain(&stage0_isolated).flatten() {
        cloud.remove(sample.id)?;
    }
    let total = cloud.len();
    info!(
        samples = table.len(),
        residual = total,
        "stage 2: reabsorbing full-resolution samples"
    );

    let mut isolated = Vec::new();
    for group in groups.iter_mut() {
        if let Some(placeholder) = cloud.pop_front()? {
            debug!(placeholder = %placeholder.id, "stage 2: set aside placeholder");
            isolated.push(placeholder);
        }

        let before = group.len();
        let outcome = expand(group, &mut cloud, rule)?;
        debug!(absorbed = group.len() - before, size = group.len(), "stage 2: group grown");
        info!("Stage-2: {:.3}%", progress(cloud.len(), total));

        if outcome.cloud_exhausted() || cloud.len() <= 1 {
            debug!(remaining = cloud.len(), "stage 2: loop ended");
            break;
        }
    }

    isolated.extend(cloud.into_samples());
    isolated.sort_by_key(|sample| sample.id);

    Ok(ClumpCatalog {
        groups,
        stage0_isolated,
        isolated,
    })
}
