// THEORY:
// Two samples are friends when they are close on the sky and their velocities
// change slowly between them. "Close" is the planar radius `r`; "slowly" is the
// velocity gradient `|v - v0| / d`, which must not exceed the threshold `dv`.
//
// The threshold is either one global value or a per-sample value supplied with
// the cube (adaptive mode). In adaptive mode the threshold of the *reference*
// sample, the one whose neighbourhood is being expanded, is the one that applies.
//
// Samples that share a pixel (`d == 0`) have no defined gradient. They are
// treated as friends: spatially coincident emission is always considered
// connected.

use crate::core_modules::error::{FofError, FofResult};
use crate::core_modules::point::{Point, SampleId};

/// Where the velocity-gradient threshold comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum GradientThreshold {
    /// One threshold for every sample, in velocity units per pixel.
    Fixed(f64),
    /// One threshold per sample, indexed by `SampleId`.
    Adaptive(Vec<f64>),
}

impl GradientThreshold {
    /// The threshold that applies when expanding around sample `id`.
    pub fn resolve(&self, id: SampleId) -> FofResult<f64> {
        match self {
            GradientThreshold::Fixed(dv) => Ok(*dv),
            GradientThreshold::Adaptive(table) => table.get(id.0).copied().ok_or_else(|| {
                FofError::DataConsistency(format!(
                    "no adaptive gradient for sample {id} (table holds {})",
                    table.len()
                ))
            }),
        }
    }
}

/// The friend-of-friend test for a fixed planar radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MembershipTest {
    pub radius: f64,
}

impl MembershipTest {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    /// Decides whether `candidate` is a friend of `reference` under gradient `dv`.
    pub fn is_friend(&self, reference: &Point, candidate: &Point, dv: f64) -> bool {
        // Squared comparison matches the inclusive radius query of the index.
        let distance_sq = reference.planar_distance_squared(candidate);
        if distance_sq > self.radius * self.radius {
            return false;
        }
        if distance_sq == 0.0 {
            return true;
        }
        velocity_gradient(reference, candidate, distance_sq.sqrt()) <= dv
    }
}

fn velocity_gradient(reference: &Point, candidate: &Point, distance: f64) -> f64 {
    (candidate.velocity - reference.velocity).abs() / distance
}
