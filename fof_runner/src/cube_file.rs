// Loading a cube from disk. JSON has no NaN, so missing samples are stored as
// `null` and turned back into NaN here.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use velocity_fof::Cube;

/// On-disk layout of a cube: `[channel, row, col]` shape plus a flat buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CubeFile {
    pub shape: [usize; 3],
    /// Pixel size in degrees (the `CDELT2` header keyword), if known.
    #[serde(default)]
    pub cdelt2: Option<f64>,
    pub data: Vec<Option<f64>>,
}

impl CubeFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading cube file {}", path.display()))?;
        let file: CubeFile = serde_json::from_str(&text)
            .with_context(|| format!("parsing cube file {}", path.display()))?;
        Ok(file)
    }

    pub fn into_cube(self) -> Result<Cube> {
        let [channels, rows, cols] = self.shape;
        if channels == 0 || rows == 0 || cols == 0 {
            bail!("cube shape {:?} has an empty axis", self.shape);
        }
        let data = self
            .data
            .into_iter()
            .map(|sample| sample.unwrap_or(f64::NAN))
            .collect();
        Ok(Cube::new(channels, rows, cols, data)?)
    }
}
