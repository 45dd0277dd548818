// THEORY:
// The `pipeline` module is the top-level API of the clump finder. It wraps the
// whole stack (cube materialization, the two clustering stages and the final
// statistics) behind a single `FofPipeline::run` call.
//
// All configuration is checked up front. A run either finishes both stages and
// returns a `ClumpReport`, or fails with a `FofError` before or during growth;
// there is no partial result.

use crate::core_modules::cube::SampleTable;
use crate::core_modules::group_grower::FriendRule;
use crate::core_modules::membership::{GradientThreshold, MembershipTest};
use crate::core_modules::two_stage::{run_stage_one, run_stage_two};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::info;

// Re-export key data structures for the public API.
pub use crate::core_modules::cube::Cube;
pub use crate::core_modules::error::{FofError, FofResult};
pub use crate::core_modules::point::{Point, Sample, SampleId};
pub use crate::core_modules::statistics::ClumpStatistics;
pub use crate::core_modules::two_stage::ClumpCatalog;
pub use crate::core_modules::units::PhysicalScale;

/// How the velocity-gradient threshold is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum GradientMode {
    /// One threshold for every sample, in km/s per pixel.
    Fixed(f64),
    /// Per-sample thresholds read from the cube's third channel block.
    Adaptive,
}

/// Configuration for the FofPipeline. All lengths are in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FofConfig {
    /// Number of velocity components per pixel (`compt`).
    pub components: usize,
    /// Minimum intensity a sample must exceed to seed a group (`I0`).
    pub intensity_threshold: f64,
    /// Spatial linking length (`dr0`).
    pub radius_px: f64,
    pub gradient: GradientMode,
    /// Minimum number of points for a group, e.g. the pixels of one or two beams.
    pub num_min: usize,
}

impl Default for FofConfig {
    fn default() -> Self {
        Self {
            components: 3,
            intensity_threshold: 0.04,
            radius_px: 1.5,
            gradient: GradientMode::Fixed(1.0),
            num_min: 150,
        }
    }
}

impl FofConfig {
    /// Builds a config from physical linking lengths. `gradient_kms_pc` of `None`
    /// selects adaptive mode.
    pub fn from_physical(
        scale: &PhysicalScale,
        components: usize,
        intensity_threshold: f64,
        radius_pc: f64,
        gradient_kms_pc: Option<f64>,
        num_min: usize,
    ) -> FofResult<Self> {
        scale.validate()?;
        let gradient = match gradient_kms_pc {
            Some(dv) => GradientMode::Fixed(scale.gradient_to_pixels(dv)),
            None => GradientMode::Adaptive,
        };
        let config = Self {
            components,
            intensity_threshold,
            radius_px: scale.radius_to_pixels(radius_pc),
            gradient,
            num_min,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FofResult<()> {
        if self.components == 0 {
            return Err(FofError::Configuration(
                "component count must be at least 1".to_string(),
            ));
        }
        if !self.intensity_threshold.is_finite() {
            return Err(FofError::Configuration(format!(
                "intensity threshold must be finite, got {}",
                self.intensity_threshold
            )));
        }
        if !(self.radius_px.is_finite() && self.radius_px >= 0.0) {
            return Err(FofError::Configuration(format!(
                "radius must be a non-negative number of pixels, got {}",
                self.radius_px
            )));
        }
        if let GradientMode::Fixed(dv) = self.gradient {
            if !(dv.is_finite() && dv >= 0.0) {
                return Err(FofError::Configuration(format!(
                    "velocity gradient must be non-negative, got {dv}"
                )));
            }
        }
        if self.num_min == 0 {
            return Err(FofError::Configuration(
                "minimum group size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// The output of one clustering run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClumpReport {
    pub catalog: ClumpCatalog,
    pub statistics: ClumpStatistics,
    pub elapsed: Duration,
}

/// The main, top-level struct for the clump finder.
#[derive(Debug, Clone)]
pub struct FofPipeline {
    config: FofConfig,
}

impl FofPipeline {
    pub fn new(config: FofConfig) -> FofResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FofConfig {
        &self.config
    }

    /// Runs both clustering stages over `cube`.
    pub fn run(&self, cube: &Cube) -> FofResult<ClumpReport> {
        let start = Instant::now();
        let table = cube.sample_table(self.config.components)?;
        let thresholds = self.gradient_thresholds(cube, &table)?;
        let rule = FriendRule {
            test: MembershipTest::new(self.config.radius_px),
            thresholds: &thresholds,
        };

        let seeds = table.seeds(self.config.intensity_threshold);
        info!(samples = table.len(), seeds = seeds.len(), "Number of seed point={}", seeds.len());

        let stage_one = run_stage_one(seeds, rule, self.config.num_min)?;
        let catalog = run_stage_two(&table, stage_one, rule)?;
        debug_assert_eq!(catalog.sample_count(), table.len());

        let statistics = ClumpStatistics::from_catalog(&catalog, table.len());
        let elapsed = start.elapsed();
        info!(
            groups = statistics.group_count(),
            "Time: {:.4} mins = {:.6} hrs",
            elapsed.as_secs_f64() / 60.0,
            elapsed.as_secs_f64() / 3600.0
        );

        Ok(ClumpReport {
            catalog,
            statistics,
            elapsed,
        })
    }

    fn gradient_thresholds(
        &self,
        cube: &Cube,
        table: &SampleTable,
    ) -> FofResult<GradientThreshold> {
        match self.config.gradient {
            GradientMode::Fixed(dv) => Ok(GradientThreshold::Fixed(dv)),
            GradientMode::Adaptive => {
                let sigma = cube.sigma_table(table)?;
                Ok(GradientThreshold::Adaptive(sigma))
            }
        }
    }
}

/// Convenience wrapper: validates `config` and runs it over `cube`.
pub fn find_clumps(cube: &Cube, config: FofConfig) -> FofResult<ClumpReport> {
    FofPipeline::new(config)?.run(cube)
}
