// THEORY:
// Statistics are a pure summary of a finished `ClumpCatalog`. Nothing here is
// stored between runs; the numbers can be recomputed from the catalog at any
// time. Every count is also reported as a fraction of the total number of valid
// samples in the cube.

use crate::core_modules::two_stage::ClumpCatalog;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClumpStatistics {
    /// Number of points in each final group, in catalog order.
    pub group_sizes: Vec<usize>,
    pub points_in_groups: usize,
    /// Sizes of the stage-0 isolated clusters.
    pub stage0_cluster_sizes: Vec<usize>,
    pub stage0_isolated_points: usize,
    pub final_isolated_points: usize,
    /// Valid samples in the cube's velocity block.
    pub total_samples: usize,
}

impl ClumpStatistics {
    pub fn from_catalog(catalog: &ClumpCatalog, total_samples: usize) -> Self {
        let group_sizes: Vec<usize> = catalog.groups.iter().map(Vec::len).collect();
        let stage0_cluster_sizes: Vec<usize> =
            catalog.stage0_isolated.iter().map(Vec::len).collect();
        Self {
            points_in_groups: group_sizes.iter().sum(),
            stage0_isolated_points: stage0_cluster_sizes.iter().sum(),
            group_sizes,
            stage0_cluster_sizes,
            final_isolated_points: catalog.isolated.len(),
            total_samples,
        }
    }

    pub fn group_count(&self) -> usize {
        self.group_sizes.len()
    }

    fn fraction(&self, count: usize) -> f64 {
        if self.total_samples == 0 {
            return 0.0;
        }
        count as f64 / self.total_samples as f64
    }

    pub fn group_fraction(&self) -> f64 {
        self.fraction(self.points_in_groups)
    }

    pub fn stage0_isolated_fraction(&self) -> f64 {
        self.fraction(self.stage0_isolated_points)
    }

    pub fn final_isolated_fraction(&self) -> f64 {
        self.fraction(self.final_isolated_points)
    }
}

impl fmt::Display for ClumpStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--------------------------------------------------------------")?;
        writeln!(f, "-------------- statistic data points --------------")?;
        writeln!(f, "Find {} groups.", self.group_count())?;
        writeln!(
            f,
            "{} points in the groups, ratio = {}/{}={:.2}%",
            self.points_in_groups,
            self.points_in_groups,
            self.total_samples,
            self.group_fraction() * 100.0
        )?;
        writeln!(
            f,
            "Stage-0 isolated points = {}, ratio = {:.2}%",
            self.stage0_isolated_points,
            self.stage0_isolated_fraction() * 100.0
        )?;
        writeln!(
            f,
            "Stage-1 isolated points (total isolated points) = {}, ratio = {:.2}%",
            self.final_isolated_points,
            self.final_isolated_fraction() * 100.0
        )?;
        write!(f, "--------------------------------------------------------------")
    }
}
