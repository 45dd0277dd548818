// Renders a catalog as a PNG: one colour per group, grey for isolated points.

use image::ImageEncoder;
use velocity_fof::{ClumpCatalog, Sample};

const ISOLATED: [u8; 4] = [128, 128, 128, 255];
const BACKGROUND: [u8; 4] = [0, 0, 0, 255];

/// Blue, white, red, cyan, fuchsia, lime, olive, darkviolet, peru, darkgreen, purple.
///
/// The plot palette this follows has black second; it is white here because
/// black is the background.
const PALETTE: [[u8; 4]; 11] = [
    [0, 0, 255, 255],
    [255, 255, 255, 255],
    [255, 0, 0, 255],
    [0, 255, 255, 255],
    [255, 0, 255, 255],
    [0, 255, 0, 255],
    [128, 128, 0, 255],
    [148, 0, 211, 255],
    [205, 133, 63, 255],
    [0, 100, 0, 255],
    [128, 0, 128, 255],
];

/// Builds an RGBA buffer of `rows * cols` pixels. Groups are painted last, so a
/// pixel with a grouped component shows the group colour.
pub fn render(catalog: &ClumpCatalog, rows: usize, cols: usize) -> Vec<u8> {
    let mut buffer: Vec<u8> = BACKGROUND.repeat(rows * cols);
    let mut paint = |sample: &Sample, colour: [u8; 4]| {
        let row = sample.point.row as usize;
        let col = sample.point.col as usize;
        if row < rows && col < cols {
            let offset = (row * cols + col) * 4;
            buffer[offset..offset + 4].copy_from_slice(&colour);
        }
    };

    for sample in catalog.stage0_isolated.iter().flatten().chain(&catalog.isolated) {
        paint(sample, ISOLATED);
    }
    for (index, group) in catalog.groups.iter().enumerate() {
        let colour = PALETTE[index % PALETTE.len()];
        for sample in group {
            paint(sample, colour);
        }
    }
    buffer
}

pub fn save(
    name: &std::path::Path,
    width: u32,
    height: u32,
    buffer: &[u8],
) -> Result<(), image::error::ImageError> {
    let output = std::fs::File::create(name)?;
    let encoder = image::codecs::png::PngEncoder::new(output);

    encoder.write_image(buffer, width, height, image::ExtendedColorType::Rgba8)?;

    Ok(())
}
