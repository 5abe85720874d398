use image::DynamicImage;

use super::loader::RasterImage;
use super::samples::SampleGrid;

/// BT.601 luma in 16.16 fixed point, rounded to nearest.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = 19595 * u32::from(r) + 38470 * u32::from(g) + 7471 * u32::from(b);
    ((weighted + 0x8000) >> 16) as u8
}

/// Collapses the image to single-channel intensity.
pub fn extract_luma(image: &RasterImage) -> SampleGrid {
    let width = image.width() as usize;
    let height = image.height() as usize;

    let data = match image.as_dynamic() {
        DynamicImage::ImageLuma8(gray) => gray.as_raw().clone(),
        DynamicImage::ImageRgb8(rgb) => rgb.pixels().map(|p| luma(p.0[0], p.0[1], p.0[2])).collect(),
        other => other.to_rgb8().pixels().map(|p| luma(p.0[0], p.0[1], p.0[2])).collect(),
    };

    SampleGrid::from_samples(width, height, data)
}

/// Applies contrast about the midpoint, then the brightness multiplier.
///
/// Each step clamps to `[0, 255]`; the result is truncated back to 8 bits.
pub fn apply_contrast_and_brightness(grid: &mut SampleGrid, contrast: f32, brightness: f32) {
    for value in grid.samples_mut() {
        let mut v = f32::from(*value);
        v = ((v - 128.0) * contrast + 128.0).clamp(0.0, 255.0);
        v = (v * brightness).clamp(0.0, 255.0);
        *value = v as u8;
    }
}
