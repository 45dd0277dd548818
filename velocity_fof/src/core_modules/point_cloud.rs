// THEORY:
// A `PointCloud` is the mutable working set of a clustering stage: the samples
// that have not yet been claimed by any group. It is consumed in place, one
// removal at a time, until the stage decides it is exhausted.
//
// The cloud owns two views of the same contents and keeps them in lockstep:
// 1.  **Ordered samples**: keyed by `SampleId`, which is also the scan order of
//     the cube, so "the first remaining point" is always well defined.
// 2.  **Planar projection**: a `ProjectionIndex` over the `(row, col)` of every
//     remaining sample, used for radius queries.
//
// Removal is the only mutation exposed, and it always touches both views. A
// radius query therefore only ever reports samples that are still members of
// the cloud.

pub mod point_cloud {
    use crate::core_modules::error::{FofError, FofResult};
    use crate::core_modules::point::{Sample, SampleId};
    use crate::core_modules::spatial_index::ProjectionIndex;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, Default)]
    pub struct PointCloud {
        samples: BTreeMap<SampleId, Sample>,
        projection: ProjectionIndex,
    }

    impl PointCloud {
        pub fn new(samples: Vec<Sample>) -> Self {
            let projection = ProjectionIndex::build(&samples);
            let samples = samples.into_iter().map(|s| (s.id, s)).collect();
            Self {
                samples,
                projection,
            }
        }

        pub fn len(&self) -> usize {
            self.samples.len()
        }

        pub fn is_empty(&self) -> bool {
            self.samples.is_empty()
        }

        pub fn contains(&self, id: SampleId) -> bool {
            self.samples.contains_key(&id)
        }

        pub fn get(&self, id: SampleId) -> Option<&Sample> {
            self.samples.get(&id)
        }

        /// Remaining samples in scan order.
        pub fn iter(&self) -> impl Iterator<Item = &Sample> {
            self.samples.values()
        }

        /// Removes and returns the first remaining sample in scan order.
        pub fn pop_front(&mut self) -> FofResult<Option<Sample>> {
            let Some((_, sample)) = self.samples.pop_first() else {
                return Ok(None);
            };
            self.unindex(&sample)?;
            Ok(Some(sample))
        }

        /// Removes the sample with the given id from both views.
        pub fn remove(&mut self, id: SampleId) -> FofResult<Sample> {
            let sample = self.samples.remove(&id).ok_or_else(|| {
                FofError::DataConsistency(format!("sample {id} is not in the point cloud"))
            })?;
            self.unindex(&sample)?;
            Ok(sample)
        }

        /// Ids of the remaining samples within `radius` of `center`, ascending.
        pub fn within_radius(&self, center: [f64; 2], radius: f64) -> Vec<SampleId> {
            self.projection.within_radius(center, radius)
        }

        pub fn into_samples(self) -> Vec<Sample> {
            self.samples.into_values().collect()
        }

        fn unindex(&mut self, sample: &Sample) -> FofResult<()> {
            if !self.projection.remove(sample) {
                return Err(FofError::DataConsistency(format!(
                    "sample {} has no entry in the projection index",
                    sample.id
                )));
            }
            debug_assert_eq!(self.samples.len(), self.projection.len());
            Ok(())
        }
    }

    impl FromIterator<Sample> for PointCloud {
        fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
            Self::new(iter.into_iter().collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::point_cloud::PointCloud;
    use crate::core_modules::error::FofError;
    use crate::core_modules::point::{Point, Sample, SampleId};

    fn line(n: usize) -> PointCloud {
        (0..n)
            .map(|k| Sample::new(SampleId(k), Point::new(0, k as u32, k as f64)))
            .collect()
    }

    #[test]
    fn pop_front_follows_scan_order() {
        let mut cloud = line(3);
        assert_eq!(cloud.pop_front().unwrap().map(|s| s.id), Some(SampleId(0)));
        assert_eq!(cloud.pop_front().unwrap().map(|s| s.id), Some(SampleId(1)));
        assert_eq!(cloud.len(), 1);
    }

    #[test]
    fn pop_front_on_empty_cloud_is_none() {
        let mut cloud = PointCloud::default();
        assert_eq!(cloud.pop_front().unwrap(), None);
    }

    #[test]
    fn removal_updates_the_projection() {
        let mut cloud = line(5);
        assert_eq!(
            cloud.within_radius([0.0, 2.0], 1.0),
            vec![SampleId(1), SampleId(2), SampleId(3)]
        );

        let removed = cloud.remove(SampleId(2)).unwrap();
        assert_eq!(removed.point.col, 2);
        assert!(!cloud.contains(SampleId(2)));
        assert_eq!(cloud.within_radius([0.0, 2.0], 1.0), vec![SampleId(1), SampleId(3)]);
    }

    #[test]
    fn removing_an_absent_sample_is_a_consistency_error() {
        let mut cloud = line(2);
        cloud.remove(SampleId(1)).unwrap();
        assert!(matches!(
            cloud.remove(SampleId(1)),
            Err(FofError::DataConsistency(_))
        ));
    }

    #[test]
    fn into_samples_keeps_scan_order() {
        let mut cloud = line(4);
        cloud.remove(SampleId(1)).unwrap();
        let ids: Vec<SampleId> = cloud.into_samples().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![SampleId(0), SampleId(2), SampleId(3)]);
    }
}
