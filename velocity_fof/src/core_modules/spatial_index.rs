// THEORY:
// Proximity is always judged in the two-dimensional `(row, col)` projection;
// velocity is handled separately by the gradient test. The `ProjectionIndex`
// answers "which samples lie within radius r of this location" over the
// projection of whatever is still left in a point cloud.
//
// The cloud loses a point every time a group absorbs one, so the index supports
// deletion directly instead of being rebuilt after every expansion step. Entries
// carry their `SampleId`, which keeps query results meaningful no matter how
// many removals happened in between.

use crate::core_modules::point::{Sample, SampleId};
use rstar::RTree;
use rstar::primitives::GeomWithData;
use std::fmt;

type IndexedProjection = GeomWithData<[f64; 2], SampleId>;

/// A dynamic 2-D index over the planar projection of a set of samples.
#[derive(Clone)]
pub struct ProjectionIndex {
    tree: RTree<IndexedProjection>,
}

impl Default for ProjectionIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProjectionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectionIndex")
            .field("len", &self.len())
            .finish()
    }
}

impl ProjectionIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk loads the projection of `samples`.
    pub fn build(samples: &[Sample]) -> Self {
        let entries = samples
            .iter()
            .map(|sample| GeomWithData::new(sample.point.planar(), sample.id))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    pub fn insert(&mut self, sample: &Sample) {
        self.tree.insert(GeomWithData::new(sample.point.planar(), sample.id));
    }

    /// Removes the entry for `sample`. Returns `false` if it was not indexed.
    pub fn remove(&mut self, sample: &Sample) -> bool {
        self.tree
            .remove(&GeomWithData::new(sample.point.planar(), sample.id))
            .is_some()
    }

    /// Ids of every indexed sample whose projection lies within `radius` of
    /// `center` (inclusive), sorted ascending.
    pub fn within_radius(&self, center: [f64; 2], radius: f64) -> Vec<SampleId> {
        let mut ids: Vec<SampleId> = self
            .tree
            .locate_within_distance(center, radius * radius)
            .map(|entry| entry.data)
            .collect();
        ids.sort_unstable();
        ids
    }
}
