pub mod adjust;
pub mod dither;
pub mod edges;
pub mod loader;
pub mod resize;
pub mod samples;

use crate::Result;
use loader::RasterImage;
use resize::LayoutPolicy;
use samples::SampleGrid;

/// Resizes for `columns` glyphs under `layout` and reduces to luma.
pub fn sample_gray(image: &RasterImage, columns: u32, layout: LayoutPolicy) -> Result<SampleGrid> {
    let (resized, _) = resize::resample(image, columns, layout)?;
    Ok(adjust::extract_luma(&resized))
}
