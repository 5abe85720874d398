//! Sobel gradient directions drawn as line glyphs.

use std::fmt;
use std::str::FromStr;

use crate::ascii::grid::GlyphGrid;
use crate::ascii::mapping::{bold_glyph, map_with, orientation_glyph};
use crate::ascii::ramp::GlyphRamp;
use crate::image_pipeline::edges::{gaussian_blur, sobel_with_angle};
use crate::image_pipeline::loader::RasterImage;
use crate::image_pipeline::resize::LayoutPolicy;
use crate::image_pipeline::sample_gray;
use crate::options::{ensure_within, ConvertOptions};
use crate::Result;

const PRE_BLUR: usize = 3;

/// Ratio above which a direction glyph is drawn bold.
///
/// The ratio divides the 0-255 normalized magnitude by the raw image maximum,
/// so images with a raw maximum below about 364 can bold every edge and very
/// strong images bold none.
pub const BOLD_RATIO: f32 = 0.7;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GradientStyle {
    /// One direction glyph per strong gradient.
    #[default]
    Direction,
    /// Edge strength blended with inverted brightness, then ramp mapped.
    Combined,
}

impl GradientStyle {
    pub fn name(self) -> &'static str {
        match self {
            GradientStyle::Direction => "direction",
            GradientStyle::Combined => "combined",
        }
    }
}

impl fmt::Display for GradientStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GradientStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direction" | "directional" | "gradient" => Ok(GradientStyle::Direction),
            "combined" => Ok(GradientStyle::Combined),
            other => Err(format!("unknown gradient mode `{other}`, expected direction or combined")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientOptions {
    pub style: GradientStyle,
    /// Normalized (0-255) magnitude below which no direction is drawn.
    pub magnitude_threshold: f32,
    /// Shade weak-gradient samples from the ramp instead of leaving them blank.
    pub show_background: bool,
    /// Share of edge strength in the combined blend, `0..=1`.
    pub edge_weight: f32,
}

impl Default for GradientOptions {
    fn default() -> Self {
        Self {
            style: GradientStyle::Direction,
            magnitude_threshold: 30.0,
            show_background: true,
            edge_weight: 0.7,
        }
    }
}

impl GradientOptions {
    pub(crate) fn from_options(options: &ConvertOptions) -> Result<Self> {
        let defaults = Self::default();
        let style = ConvertOptions::choice("mode", options.mode.as_deref(), defaults.style)?;
        let magnitude_threshold = ConvertOptions::clamped(
            "magnitude_threshold",
            options.magnitude_threshold,
            f64::from(defaults.magnitude_threshold),
            0.0,
            255.0,
        )?;
        let edge_weight = ConvertOptions::clamped(
            "edge_weight",
            options.edge_weight,
            f64::from(defaults.edge_weight),
            0.0,
            1.0,
        )?;

        Ok(Self {
            style,
            magnitude_threshold: magnitude_threshold as f32,
            show_background: options.show_magnitude.unwrap_or(defaults.show_background),
            edge_weight: edge_weight as f32,
        })
    }

    pub fn validate(&self) -> Result<()> {
        ensure_within("magnitude_threshold", f64::from(self.magnitude_threshold), 0.0, 255.0)?;
        ensure_within("edge_weight", f64::from(self.edge_weight), 0.0, 1.0)
    }
}

pub fn render(
    image: &RasterImage,
    width: u32,
    ramp: &GlyphRamp,
    options: &GradientOptions,
) -> Result<GlyphGrid> {
    let gray = sample_gray(image, width, LayoutPolicy::cells())?;
    let blurred = gaussian_blur(&gray, PRE_BLUR);
    let field = sobel_with_angle(&blurred);

    let max_raw = field.max_magnitude();
    // A flat image has no gradient at all; scale against 1 instead of 0.
    let max = if max_raw > 0.0 { max_raw } else { 1.0 };
    let normalized = |x: usize, y: usize| field.magnitude.get(x, y) / max * 255.0;

    let grid = match options.style {
        GradientStyle::Direction => map_with(&blurred, |x, y| {
            let magnitude = normalized(x, y);
            if magnitude < options.magnitude_threshold {
                if options.show_background {
                    ramp.map(blurred.get(x, y), true)
                } else {
                    ' '
                }
            } else {
                let glyph = orientation_glyph(field.angle.get(x, y).to_degrees());
                if magnitude / max > BOLD_RATIO {
                    bold_glyph(glyph)
                } else {
                    glyph
                }
            }
        }),
        GradientStyle::Combined => {
            let weight = options.edge_weight;
            map_with(&gray, |x, y| {
                let edge = normalized(x, y) as u8;
                let brightness = 255 - gray.get(x, y);
                let blend = weight * f32::from(edge) + (1.0 - weight) * f32::from(brightness);
                ramp.map(blend as u8, false)
            })
        },
    };

    Ok(grid)
}
