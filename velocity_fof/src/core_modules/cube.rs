// THEORY:
// The `Cube` is the read-only origin of every point the clump finder touches. It
// holds a `[channel, row, col]` array whose channels come in consecutive blocks
// of `compt` components: intensity first, then velocity, then (optionally) the
// per-sample adaptive gradient threshold.
//
// Materialization walks the cube in a single fixed scan order (row, then col,
// then component) and skips NaN samples. The position of a velocity sample in
// that walk becomes its `SampleId`, so the seed subset and the full-resolution
// cloud agree on identity without ever comparing floating-point values. Each
// sample also remembers the component it came from, so the adaptive gradient
// table is read at the sample's own `(row, col, component)` rather than paired
// by position with an independently filtered sigma block.

use crate::core_modules::error::{FofError, FofResult};
use crate::core_modules::point::{Point, Sample, SampleId};

/// A position-position-velocity cube stored flat in `[channel, row, col]` order.
#[derive(Debug, Clone)]
pub struct Cube {
    channels: usize,
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Cube {
    /// Wraps a flat buffer. Missing samples are expected as `f64::NAN`.
    pub fn new(channels: usize, rows: usize, cols: usize, data: Vec<f64>) -> FofResult<Self> {
        let expected = channels * rows * cols;
        if data.len() != expected {
            return Err(FofError::Shape {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            channels,
            rows,
            cols,
            data,
        })
    }

    /// `(channels, rows, cols)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.channels, self.rows, self.cols)
    }

    /// The value at `(channel, row, col)`, or `None` outside the cube.
    pub fn get(&self, channel: usize, row: usize, col: usize) -> Option<f64> {
        if channel >= self.channels || row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.at(channel, row, col))
    }

    fn at(&self, channel: usize, row: usize, col: usize) -> f64 {
        self.data[(channel * self.rows + row) * self.cols + col]
    }

    fn require_channels(&self, needed: usize, block: &str) -> FofResult<()> {
        if self.channels < needed {
            return Err(FofError::Configuration(format!(
                "{block} block needs {needed} channels but the cube has {}",
                self.channels
            )));
        }
        Ok(())
    }

    /// Materializes every non-NaN velocity sample of the first `compt` components
    /// together with the intensity of the same component.
    pub fn sample_table(&self, compt: usize) -> FofResult<SampleTable> {
        if compt == 0 {
            return Err(FofError::Configuration(
                "component count must be at least 1".to_string(),
            ));
        }
        self.require_channels(2 * compt, "velocity")?;

        let mut samples = Vec::new();
        let mut intensities = Vec::new();
        let mut components = Vec::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                for component in 0..compt {
                    let velocity = self.at(compt + component, row, col);
                    if velocity.is_nan() {
                        continue;
                    }
                    let id = SampleId(samples.len());
                    samples.push(Sample::new(id, Point::new(row as u32, col as u32, velocity)));
                    intensities.push(self.at(component, row, col));
                    components.push(component);
                }
            }
        }

        Ok(SampleTable {
            compt,
            samples,
            intensities,
            components,
        })
    }

    /// Reads the adaptive gradient threshold of every sample in `table` from the
    /// sigma block, at the sample's own pixel and component. Entry `k` belongs to
    /// the sample with id `k`.
    ///
    /// A valid velocity without a sigma value is a configuration error.
    pub fn sigma_table(&self, table: &SampleTable) -> FofResult<Vec<f64>> {
        let compt = table.compt;
        self.require_channels(3 * compt, "adaptive gradient")?;

        table
            .samples
            .iter()
            .zip(&table.components)
            .map(|(sample, &component)| {
                let (row, col) = (sample.point.row as usize, sample.point.col as usize);
                let sigma = self
                    .get(2 * compt + component, row, col)
                    .filter(|value| !value.is_nan());
                sigma.ok_or_else(|| {
                    FofError::Configuration(format!(
                        "sample {} at ({row}, {col}) has no sigma for component {component}",
                        sample.id
                    ))
                })
            })
            .collect()
    }
}

/// The full-resolution materialization of a cube.
#[derive(Debug, Clone)]
pub struct SampleTable {
    /// Components per pixel the table was materialized with.
    compt: usize,
    /// Every valid velocity sample; `samples[k].id == SampleId(k)`.
    samples: Vec<Sample>,
    /// Intensity of the component each sample was taken from.
    intensities: Vec<f64>,
    /// Component each sample was taken from.
    components: Vec<usize>,
}

impl SampleTable {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn get(&self, id: SampleId) -> Option<&Sample> {
        self.samples.get(id.0)
    }

    /// Seed candidates: samples whose own-component intensity strictly exceeds
    /// `threshold`. NaN intensities never qualify.
    pub fn seeds(&self, threshold: f64) -> Vec<Sample> {
        self.samples
            .iter()
            .zip(&self.intensities)
            .filter(|(_, intensity)| **intensity > threshold)
            .map(|(sample, _)| *sample)
            .collect()
    }
}
