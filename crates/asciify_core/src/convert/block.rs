//! Unicode shading blocks, half blocks and Braille patterns.

use std::fmt;
use std::str::FromStr;

use crate::ascii::blocks::{braille, half_blocks, pack_braille, shade_blocks};
use crate::ascii::grid::GlyphGrid;
use crate::image_pipeline::dither::{diffuse, Quantizer, FLOYD_STEINBERG};
use crate::image_pipeline::loader::RasterImage;
use crate::image_pipeline::resize::LayoutPolicy;
use crate::image_pipeline::sample_gray;
use crate::options::ConvertOptions;
use crate::Result;

/// Binary cutoff of the pre-dithered Braille mode, independent of `threshold`.
const DITHER_CUTOFF: f64 = 128.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlockMode {
    /// One shading block per sample.
    #[default]
    Block,
    /// Two stacked samples per glyph.
    HalfBlock,
    /// 2x4 thresholded samples per glyph.
    Braille,
    /// Braille after a binary Floyd-Steinberg pass.
    BrailleDither,
}

impl BlockMode {
    pub const ALL: [BlockMode; 4] =
        [BlockMode::Block, BlockMode::HalfBlock, BlockMode::Braille, BlockMode::BrailleDither];

    pub fn name(self) -> &'static str {
        match self {
            BlockMode::Block => "block",
            BlockMode::HalfBlock => "halfblock",
            BlockMode::Braille => "braille",
            BlockMode::BrailleDither => "braille-dither",
        }
    }

    pub fn layout(self) -> LayoutPolicy {
        match self {
            BlockMode::Block => LayoutPolicy::cells(),
            BlockMode::HalfBlock => LayoutPolicy::half_blocks(),
            BlockMode::Braille | BlockMode::BrailleDither => LayoutPolicy::braille(),
        }
    }
}

impl fmt::Display for BlockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlockMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "block" | "blocks" => Ok(BlockMode::Block),
            "halfblock" | "half-block" => Ok(BlockMode::HalfBlock),
            "braille" => Ok(BlockMode::Braille),
            "braille-dither" | "grayscale-braille" => Ok(BlockMode::BrailleDither),
            other => Err(format!(
                "unknown block mode `{other}`, expected block, halfblock, braille or braille-dither"
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockOptions {
    pub mode: BlockMode,
    /// Plain Braille cutoff: samples below it raise a dot.
    pub threshold: u8,
}

impl Default for BlockOptions {
    fn default() -> Self {
        Self { mode: BlockMode::Block, threshold: 128 }
    }
}

impl BlockOptions {
    pub(crate) fn from_options(options: &ConvertOptions) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            mode: ConvertOptions::choice("mode", options.mode.as_deref(), defaults.mode)?,
            threshold: options.threshold(defaults.threshold)?,
        })
    }
}

pub fn render(image: &RasterImage, width: u32, options: &BlockOptions) -> Result<GlyphGrid> {
    let gray = sample_gray(image, width, options.mode.layout())?;

    let grid = match options.mode {
        BlockMode::Block => shade_blocks(&gray),
        BlockMode::HalfBlock => half_blocks(&gray),
        BlockMode::Braille => braille(&gray, options.threshold),
        BlockMode::BrailleDither => {
            let mut field = gray.to_field();
            diffuse(&mut field, &FLOYD_STEINBERG, Quantizer::Binary { threshold: DITHER_CUTOFF });
            pack_braille(&field.map(|v| v < DITHER_CUTOFF))
        },
    };

    Ok(grid)
}
