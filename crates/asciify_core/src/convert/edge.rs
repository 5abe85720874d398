//! Canny contours drawn as glyphs.

use std::fmt;
use std::str::FromStr;

use log::warn;

use crate::ascii::grid::GlyphGrid;
use crate::ascii::mapping::{map_mask, map_with};
use crate::ascii::ramp::GlyphRamp;
use crate::image_pipeline::edges::{canny, detect_edges, gaussian_blur};
use crate::image_pipeline::loader::RasterImage;
use crate::image_pipeline::resize::LayoutPolicy;
use crate::image_pipeline::sample_gray;
use crate::options::{ensure_within, ConvertOptions, MAX_BLUR_KERNEL};
use crate::Result;

const EDGE_GLYPH: char = '#';
const INTENSITY_EDGE_GLYPH: char = '@';
const INTENSITY_BLUR: usize = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeStyle {
    /// Edge glyphs on a blank field.
    #[default]
    Outline,
    /// Edges drawn over a line-art shading of the whole image.
    Intensity,
}

impl EdgeStyle {
    pub fn name(self) -> &'static str {
        match self {
            EdgeStyle::Outline => "outline",
            EdgeStyle::Intensity => "intensity",
        }
    }

    fn default_thresholds(self) -> (f32, f32) {
        match self {
            EdgeStyle::Outline => (50.0, 150.0),
            EdgeStyle::Intensity => (30.0, 100.0),
        }
    }
}

impl fmt::Display for EdgeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EdgeStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "outline" | "edges" => Ok(EdgeStyle::Outline),
            "intensity" => Ok(EdgeStyle::Intensity),
            other => Err(format!("unknown edge mode `{other}`, expected outline or intensity")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeOptions {
    pub style: EdgeStyle,
    /// Edges as `#` on spaces when set, spaces on `#` otherwise. Outline only.
    pub invert: bool,
    pub low_threshold: f32,
    pub high_threshold: f32,
    /// Gaussian kernel size; even sizes are bumped to the next odd one.
    /// Outline only, intensity always blurs with 5.
    pub blur_kernel: usize,
}

impl Default for EdgeOptions {
    fn default() -> Self {
        let (low_threshold, high_threshold) = EdgeStyle::Outline.default_thresholds();
        Self { style: EdgeStyle::Outline, invert: true, low_threshold, high_threshold, blur_kernel: 5 }
    }
}

impl EdgeOptions {
    pub(crate) fn from_options(options: &ConvertOptions) -> Result<Self> {
        let style = ConvertOptions::choice("mode", options.mode.as_deref(), EdgeStyle::default())?;
        let (low_default, high_default) = style.default_thresholds();
        let mut low = ConvertOptions::clamped(
            "low_threshold",
            options.low_threshold,
            f64::from(low_default),
            0.0,
            255.0,
        )?;
        let mut high = ConvertOptions::clamped(
            "high_threshold",
            options.high_threshold,
            f64::from(high_default),
            0.0,
            255.0,
        )?;
        if low > high {
            warn!("low_threshold {low} exceeds high_threshold {high}, swapping");
            std::mem::swap(&mut low, &mut high);
        }

        let blur_kernel = options.blur_kernel(5)?;
        let blur_kernel = if blur_kernel % 2 == 0 { blur_kernel + 1 } else { blur_kernel };

        Ok(Self {
            style,
            invert: options.invert.unwrap_or(true),
            low_threshold: low as f32,
            high_threshold: high as f32,
            blur_kernel,
        })
    }

    pub fn validate(&self) -> Result<()> {
        ensure_within("low_threshold", f64::from(self.low_threshold), 0.0, 255.0)?;
        ensure_within("high_threshold", f64::from(self.high_threshold), 0.0, 255.0)?;
        ensure_within("blur_kernel", self.blur_kernel as f64, 1.0, f64::from(MAX_BLUR_KERNEL))
    }
}

pub fn render(image: &RasterImage, width: u32, options: &EdgeOptions) -> Result<GlyphGrid> {
    let gray = sample_gray(image, width, LayoutPolicy::cells())?;

    let grid = match options.style {
        EdgeStyle::Outline => {
            let edges = detect_edges(
                &gray,
                options.low_threshold,
                options.high_threshold,
                options.blur_kernel,
            );
            if options.invert {
                map_mask(&edges, EDGE_GLYPH, ' ')
            } else {
                map_mask(&edges, ' ', EDGE_GLYPH)
            }
        },
        EdgeStyle::Intensity => {
            let blurred = gaussian_blur(&gray, INTENSITY_BLUR);
            let edges = canny(&blurred, options.low_threshold, options.high_threshold);
            let ramp = GlyphRamp::line_art();
            map_with(&gray, |x, y| {
                if edges.get(x, y) > 128 {
                    INTENSITY_EDGE_GLYPH
                } else {
                    ramp.map(gray.get(x, y), true)
                }
            })
        },
    };

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_image() -> RasterImage {
        let samples = (0..32u32)
            .flat_map(|_| (0..32u32).map(|x| if x < 16 { 0 } else { 255 }))
            .collect();
        RasterImage::from_raw(32, 32, 1, samples).unwrap()
    }

    #[test]
    fn reversed_thresholds_are_swapped() {
        let options = ConvertOptions {
            low_threshold: Some(200.0),
            high_threshold: Some(20.0),
            ..Default::default()
        };
        let parsed = EdgeOptions::from_options(&options).unwrap();
        assert_eq!((parsed.low_threshold, parsed.high_threshold), (20.0, 200.0));
    }

    #[test]
    fn hand_built_options_are_range_checked() {
        assert!(EdgeOptions::default().validate().is_ok());
        let options = EdgeOptions { blur_kernel: 2_000_001, ..Default::default() };
        assert!(options.validate().is_err());
        let options = EdgeOptions { blur_kernel: 0, ..Default::default() };
        assert!(options.validate().is_err());
        let options = EdgeOptions { high_threshold: 300.0, ..Default::default() };
        assert!(options.validate().is_err());
    }

    #[test]
    fn even_blur_kernels_become_odd() {
        let options = ConvertOptions { blur_kernel: Some(4), ..Default::default() };
        assert_eq!(EdgeOptions::from_options(&options).unwrap().blur_kernel, 5);

        let options = ConvertOptions { blur_kernel: Some(0), ..Default::default() };
        assert!(EdgeOptions::from_options(&options).is_err());
    }

    #[test]
    fn intensity_mode_has_its_own_thresholds() {
        let options = ConvertOptions { mode: Some("intensity".into()), ..Default::default() };
        let parsed = EdgeOptions::from_options(&options).unwrap();
        assert_eq!(parsed.style, EdgeStyle::Intensity);
        assert_eq!((parsed.low_threshold, parsed.high_threshold), (30.0, 100.0));
    }

    #[test]
    fn flat_image_has_no_outline() {
        let image = RasterImage::from_raw(8, 8, 1, vec![90; 64]).unwrap();
        let grid = render(&image, 8, &EdgeOptions::default()).unwrap();
        assert!(grid.cells.iter().all(|&c| c == ' '));

        let options = EdgeOptions { invert: false, ..Default::default() };
        let grid = render(&image, 8, &options).unwrap();
        assert!(grid.cells.iter().all(|&c| c == '#'));
    }

    #[test]
    fn step_edge_is_outlined_in_the_middle() {
        let grid = render(&split_image(), 32, &EdgeOptions::default()).unwrap();
        for row in grid.rows() {
            let row: Vec<char> = row.chars().collect();
            assert_eq!(row[0], ' ');
            assert_eq!(row[31], ' ');
        }
        assert!(grid.cells.iter().any(|&c| c == '#'));
    }

    #[test]
    fn intensity_mode_shades_flat_areas() {
        let options = EdgeOptions::from_options(&ConvertOptions {
            mode: Some("intensity".into()),
            ..Default::default()
        })
        .unwrap();
        let grid = render(&split_image(), 32, &options).unwrap();
        let ramp = GlyphRamp::line_art();
        assert_eq!(grid.get(0, 0), ramp.last());
        assert_eq!(grid.get(31, 0), ramp.first());
        assert!(grid.cells.contains(&'@'));
    }
}
