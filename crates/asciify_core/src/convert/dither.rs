use crate::ascii::grid::GlyphGrid;
use crate::ascii::mapping::GlyphMapper;
use crate::ascii::ramp::GlyphRamp;
use crate::image_pipeline::dither::{dither, DitherAlgorithm};
use crate::image_pipeline::loader::RasterImage;
use crate::image_pipeline::resize::LayoutPolicy;
use crate::image_pipeline::sample_gray;
use crate::options::{invalid, ConvertOptions, MAX_LEVELS, MIN_LEVELS};
use crate::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DitherOptions {
    pub algorithm: DitherAlgorithm,
    /// Number of gray levels, `2..=256`.
    pub levels: u16,
    /// Inverts samples before dithering.
    pub invert: bool,
}

impl Default for DitherOptions {
    fn default() -> Self {
        Self { algorithm: DitherAlgorithm::FloydSteinberg, levels: 10, invert: false }
    }
}

impl DitherOptions {
    pub(crate) fn from_options(options: &ConvertOptions) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            algorithm: ConvertOptions::choice(
                "algorithm",
                options.algorithm.as_deref(),
                defaults.algorithm,
            )?,
            levels: options.levels(defaults.levels)?,
            invert: options.invert.unwrap_or(defaults.invert),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if (MIN_LEVELS..=MAX_LEVELS).contains(&self.levels) {
            Ok(())
        } else {
            Err(invalid(
                "levels",
                format!("must be within {MIN_LEVELS}..={MAX_LEVELS}, got {}", self.levels),
            ))
        }
    }
}

pub fn render(
    image: &RasterImage,
    width: u32,
    ramp: &GlyphRamp,
    options: &DitherOptions,
) -> Result<GlyphGrid> {
    let gray = sample_gray(image, width, LayoutPolicy::cells())?;
    let gray = if options.invert { gray.inverted() } else { gray };
    let tones = dither(&gray.to_field(), options.algorithm, options.levels);
    Ok(GlyphMapper::new(ramp).map_tones(&tones))
}
