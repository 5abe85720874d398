use crate::ascii::grid::GlyphGrid;
use crate::ascii::mapping::GlyphMapper;
use crate::ascii::ramp::GlyphRamp;
use crate::image_pipeline::adjust::apply_contrast_and_brightness;
use crate::image_pipeline::loader::RasterImage;
use crate::image_pipeline::resize::LayoutPolicy;
use crate::image_pipeline::sample_gray;
use crate::options::{ensure_within, ConvertOptions};
use crate::Result;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrightnessOptions {
    pub invert: bool,
    /// Multiplier applied about the 128 midpoint.
    pub contrast: f32,
    /// Multiplier applied after contrast.
    pub brightness: f32,
}

impl Default for BrightnessOptions {
    fn default() -> Self {
        Self { invert: false, contrast: 1.0, brightness: 1.0 }
    }
}

impl BrightnessOptions {
    pub(crate) fn from_options(options: &ConvertOptions) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            invert: options.invert.unwrap_or(defaults.invert),
            contrast: ConvertOptions::factor("contrast", options.contrast, defaults.contrast)?,
            brightness: ConvertOptions::factor(
                "brightness",
                options.brightness,
                defaults.brightness,
            )?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        ensure_within("contrast", f64::from(self.contrast), 0.0, f64::MAX)?;
        ensure_within("brightness", f64::from(self.brightness), 0.0, f64::MAX)
    }
}

pub fn render(
    image: &RasterImage,
    width: u32,
    ramp: &GlyphRamp,
    options: &BrightnessOptions,
) -> Result<GlyphGrid> {
    let mut gray = sample_gray(image, width, LayoutPolicy::cells())?;
    apply_contrast_and_brightness(&mut gray, options.contrast, options.brightness);
    Ok(GlyphMapper::new(ramp).map_intensity(&gray, options.invert))
}
