use image::imageops::FilterType;
use log::debug;

use super::loader::RasterImage;
use crate::{AsciiError, Result};

/// Vertical compression for one sample per glyph cell.
pub const CELL_ASPECT: f64 = 0.55;

/// Vertical compression for half-block rendering, before the even-row rounding.
pub const HALF_BLOCK_ASPECT: f64 = 1.1;

/// Vertical compression for Braille rendering, applied to the doubled sample width.
pub const BRAILLE_ASPECT: f64 = 0.5;

/// Sample grid dimensions a strategy resizes its source to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetGeometry {
    pub columns: u32,
    pub rows: u32,
}

/// How a strategy turns a glyph width into sample grid dimensions.
///
/// Every strategy picks exactly one policy; the aspect constant travels with it
/// so the resize rule lives in a single place.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayoutPolicy {
    /// One sample per glyph: `rows = round(columns * h / w * aspect)`.
    Cells { aspect: f64 },
    /// Two stacked samples per glyph: rounded rows bumped up to the next even count.
    HalfBlocks { aspect: f64 },
    /// 2x4 samples per glyph: `columns * 2` wide, rows truncated to a multiple of 4.
    BrailleCells { aspect: f64 },
}

impl LayoutPolicy {
    pub const fn cells() -> Self {
        LayoutPolicy::Cells { aspect: CELL_ASPECT }
    }

    pub const fn half_blocks() -> Self {
        LayoutPolicy::HalfBlocks { aspect: HALF_BLOCK_ASPECT }
    }

    pub const fn braille() -> Self {
        LayoutPolicy::BrailleCells { aspect: BRAILLE_ASPECT }
    }

    pub fn derive(
        &self,
        source_width: u32,
        source_height: u32,
        columns: u32,
    ) -> Option<TargetGeometry> {
        if source_width == 0 || source_height == 0 || columns == 0 {
            return None;
        }

        let image_ratio = f64::from(source_height) / f64::from(source_width);

        let geometry = match *self {
            LayoutPolicy::Cells { aspect } => {
                let rows = (image_ratio * f64::from(columns) * aspect).round() as u32;
                TargetGeometry { columns, rows: rows.max(1) }
            },
            LayoutPolicy::HalfBlocks { aspect } => {
                let mut rows = (image_ratio * f64::from(columns) * aspect).round() as u32;
                if rows % 2 != 0 {
                    rows += 1;
                }
                TargetGeometry { columns, rows: rows.max(2) }
            },
            LayoutPolicy::BrailleCells { aspect } => {
                let columns = columns.checked_mul(2)?;
                let rows = (image_ratio * f64::from(columns) * aspect) as u32;
                TargetGeometry { columns, rows: (rows / 4 * 4).max(4) }
            },
        };

        Some(geometry)
    }
}

/// Resizes `image` to the sample grid `layout` derives for `columns` glyphs.
pub fn resample(
    image: &RasterImage,
    columns: u32,
    layout: LayoutPolicy,
) -> Result<(RasterImage, TargetGeometry)> {
    let (width, height) = image.dimensions();
    let geometry =
        layout.derive(width, height, columns).ok_or(AsciiError::EmptyImage { width, height })?;

    debug!(
        "resampling {width}x{height} to {}x{} samples ({layout:?})",
        geometry.columns, geometry.rows
    );

    let resized =
        image.as_dynamic().resize_exact(geometry.columns, geometry.rows, FilterType::CatmullRom);
    Ok((RasterImage::from_dynamic(resized)?, geometry))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_round_with_aspect_correction() {
        let geometry = LayoutPolicy::cells().derive(200, 100, 100).unwrap();
        assert_eq!(geometry, TargetGeometry { columns: 100, rows: 28 });

        // 2 * 1.0 * 0.55 = 1.1 rounds down to a single row.
        let geometry = LayoutPolicy::cells().derive(2, 2, 2).unwrap();
        assert_eq!(geometry, TargetGeometry { columns: 2, rows: 1 });
    }

    #[test]
    fn cells_never_collapse_to_zero_rows() {
        let geometry = LayoutPolicy::cells().derive(1000, 1, 10).unwrap();
        assert_eq!(geometry.rows, 1);
    }

    #[test]
    fn half_blocks_use_even_rows() {
        // 10 * 0.5 * 1.1 = 5.5 rounds to 6.
        let geometry = LayoutPolicy::half_blocks().derive(20, 10, 10).unwrap();
        assert_eq!(geometry.rows, 6);

        // 10 * 0.8 * 1.1 = 8.8 rounds to 9, bumped to 10.
        let geometry = LayoutPolicy::half_blocks().derive(10, 8, 10).unwrap();
        assert_eq!(geometry.rows, 10);
    }

    #[test]
    fn braille_truncates_to_cell_multiples() {
        // 20 samples wide, 20 * 1.0 * 0.5 = 10 truncated to 8.
        let geometry = LayoutPolicy::braille().derive(50, 50, 10).unwrap();
        assert_eq!(geometry, TargetGeometry { columns: 20, rows: 8 });
    }

    #[test]
    fn braille_width_overflow_has_no_geometry() {
        assert!(LayoutPolicy::braille().derive(8, 8, u32::MAX).is_none());
        assert!(LayoutPolicy::braille().derive(8, 8, u32::MAX / 2).is_some());
    }

    #[test]
    fn degenerate_sources_have_no_geometry() {
        assert!(LayoutPolicy::cells().derive(0, 10, 10).is_none());
        assert!(LayoutPolicy::cells().derive(10, 0, 10).is_none());
        assert!(LayoutPolicy::cells().derive(10, 10, 0).is_none());
    }

    #[test]
    fn resample_produces_derived_dimensions() {
        let image = RasterImage::from_raw(40, 20, 1, vec![128; 800]).unwrap();
        let (resized, geometry) = resample(&image, 10, LayoutPolicy::cells()).unwrap();
        assert_eq!(geometry, TargetGeometry { columns: 10, rows: 3 });
        assert_eq!(resized.dimensions(), (10, 3));
    }
}
