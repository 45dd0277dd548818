mod cube_file;
mod label_map;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cube_file::CubeFile;
use std::path::PathBuf;
use tracing::info;
use velocity_fof::{FofConfig, FofPipeline, GradientMode, PhysicalScale};

/// Find velocity-coherent clumps in a position-position-velocity cube.
#[derive(Parser, Debug)]
#[command(name = "fof_runner", version)]
struct Cli {
    /// Cube file (JSON with `shape`, `data` and optionally `cdelt2`)
    cube: PathBuf,

    /// Number of velocity components per pixel
    #[arg(long, default_value_t = 3)]
    compt: usize,

    /// Minimum peak intensity of seed points
    #[arg(long = "i0", default_value_t = 0.04)]
    intensity_threshold: f64,

    /// Linear separation threshold [pc]
    #[arg(long, default_value_t = 0.023)]
    dr: f64,

    /// Velocity gradient threshold [km/s/pc]
    #[arg(long, default_value_t = 3.0)]
    dv: f64,

    /// Use the per-sample gradient thresholds stored in the cube instead of --dv
    #[arg(long)]
    adaptive: bool,

    /// Minimal number of points in a group, e.g. the pixels of one or two beams
    #[arg(long, default_value_t = 150)]
    num_min: usize,

    /// Distance to the source [pc]
    #[arg(long, default_value_t = 1300.0)]
    dist: f64,

    /// Pixel size [deg]; overrides the value stored in the cube file
    #[arg(long)]
    cdelt2: Option<f64>,

    /// Write the full report as JSON
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Write a PNG with one colour per group
    #[arg(long)]
    label_map: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    // --- 1. Cube Loading ---
    let cube_file = CubeFile::load(&cli.cube)?;
    let Some(pixel_deg) = cli.cdelt2.or(cube_file.cdelt2) else {
        bail!("no pixel scale: pass --cdelt2 or store `cdelt2` in the cube file");
    };
    let cube = cube_file.into_cube()?;
    let (_, rows, cols) = cube.shape();

    // --- 2. Unit Conversion ---
    let scale = PhysicalScale::new(cli.dist, pixel_deg)?;
    let gradient = if cli.adaptive { None } else { Some(cli.dv) };
    let config = FofConfig::from_physical(
        &scale,
        cli.compt,
        cli.intensity_threshold,
        cli.dr,
        gradient,
        cli.num_min,
    )?;
    info!("dr = {:.5} pc = {:.5} pix", cli.dr, config.radius_px);
    if let GradientMode::Fixed(dv) = config.gradient {
        info!("dv = {:.5} km/s/pc = {:.5} km/s/pix", cli.dv, dv);
    }

    // --- 3. Clustering ---
    let pipeline = FofPipeline::new(config)?;
    let report = pipeline.run(&cube)?;
    println!("{}", report.statistics);

    // --- 4. Output ---
    if let Some(path) = &cli.catalog {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing catalog to {}", path.display()))?;
        info!("catalog written to {}", path.display());
    }
    if let Some(path) = &cli.label_map {
        let buffer = label_map::render(&report.catalog, rows, cols);
        label_map::save(path, cols as u32, rows as u32, &buffer)
            .with_context(|| format!("writing label map to {}", path.display()))?;
        info!("label map written to {}", path.display());
    }

    Ok(())
}
