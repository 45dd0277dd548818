// THEORY:
// A `Point` is one valid velocity measurement of the cube: the pixel it sits on
// and the velocity of one spectral component there. Points are plain values,
// materialized once per run and never mutated afterwards.
//
// Two components on the same pixel can produce identical `(row, col, velocity)`
// triples, so a point's value is not a usable identity. Every point is instead
// paired with the `SampleId` it received during materialization (its position in
// the full-resolution scan order) and all removals and table lookups go through
// that id.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a sample in the full-resolution scan order of the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleId(pub usize);

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single position-position-velocity measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub row: u32,
    pub col: u32,
    /// Line-of-sight velocity of one spectral component.
    pub velocity: f64,
}

impl Point {
    pub fn new(row: u32, col: u32, velocity: f64) -> Self {
        Self { row, col, velocity }
    }

    /// The `(row, col)` projection used by the spatial index.
    pub fn planar(&self) -> [f64; 2] {
        [self.row as f64, self.col as f64]
    }

    /// Squared Euclidean distance between the planar projections of two points.
    pub fn planar_distance_squared(&self, other: &Point) -> f64 {
        let dr = self.row as f64 - other.row as f64;
        let dc = self.col as f64 - other.col as f64;
        dr * dr + dc * dc
    }

    pub fn planar_distance(&self, other: &Point) -> f64 {
        self.planar_distance_squared(other).sqrt()
    }
}

/// A point tagged with its identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: SampleId,
    pub point: Point,
}

impl Sample {
    pub fn new(id: SampleId, point: Point) -> Self {
        Self { id, point }
    }
}
