mod ascii;
mod convert;
mod image_pipeline;
mod options;

use std::path::Path;

use image::DynamicImage;
use log::debug;

pub use ascii::{
    blocks::{braille_glyph, pack_braille, BRAILLE_BASE, BRAILLE_DOTS},
    grid::GlyphGrid,
    mapping::{bold_glyph, orientation_glyph, GlyphMapper},
    ramp::{Charset, GlyphRamp},
};
pub use convert::{
    BlockMode, BlockOptions, BrightnessOptions, Conversion, DitherOptions, EdgeOptions, EdgeStyle,
    GradientOptions, GradientStyle, OptionSpec, Strategy, StrategyKind,
};
pub use image_pipeline::{
    adjust::{apply_contrast_and_brightness, luma},
    dither::{
        dither, quantize, DiffusionKernel, DitherAlgorithm, Quantizer, Tap, ATKINSON, BAYER_4X4,
        FLOYD_STEINBERG, JARVIS_JUDICE_NINKE, STUCKI,
    },
    edges::{canny, detect_edges, gaussian_blur},
    loader::RasterImage,
    resize::{LayoutPolicy, TargetGeometry, BRAILLE_ASPECT, CELL_ASPECT, HALF_BLOCK_ASPECT},
    samples::{Grid, SampleGrid, ToneField},
};
pub use options::{ConvertOptions, DEFAULT_WIDTH, MAX_WIDTH};

#[derive(Debug, thiserror::Error)]
pub enum AsciiError {
    #[error("failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("malformed sample buffer: {0}")]
    MalformedBuffer(String),
    #[error("invalid option `{name}`: {reason}")]
    InvalidOption { name: String, reason: String },
}

impl AsciiError {
    /// The source could not be turned into a usable raster.
    pub fn is_image_load(&self) -> bool {
        matches!(
            self,
            AsciiError::ImageLoad(_) | AsciiError::EmptyImage { .. } | AsciiError::MalformedBuffer(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AsciiError>;

#[derive(Clone, Debug)]
pub struct RenderOutput {
    pub grid: GlyphGrid,
    /// Sample grid the source was resized to before glyph mapping.
    pub geometry: TargetGeometry,
    pub strategy: StrategyKind,
}

#[derive(Default)]
pub struct AsciiRenderer;

impl AsciiRenderer {
    pub fn render_path<P: AsRef<Path>>(
        &self,
        path: P,
        conversion: &Conversion,
    ) -> Result<RenderOutput> {
        let image = RasterImage::open(path)?;
        self.render_image(&image, conversion)
    }

    pub fn render_bytes(&self, bytes: &[u8], conversion: &Conversion) -> Result<RenderOutput> {
        let image = RasterImage::from_bytes(bytes)?;
        self.render_image(&image, conversion)
    }

    pub fn render_dynamic(
        &self,
        image: DynamicImage,
        conversion: &Conversion,
    ) -> Result<RenderOutput> {
        self.render_image(&RasterImage::from_dynamic(image)?, conversion)
    }

    pub fn render_image(
        &self,
        image: &RasterImage,
        conversion: &Conversion,
    ) -> Result<RenderOutput> {
        conversion.validate()?;

        let (width, height) = image.dimensions();
        let geometry = conversion
            .layout()
            .derive(width, height, conversion.width)
            .ok_or(AsciiError::EmptyImage { width, height })?;

        let grid = conversion.run(image)?;
        debug!("{} rendered {} rows", conversion.kind(), grid.height);

        Ok(RenderOutput { grid, geometry, strategy: conversion.kind() })
    }
}

/// Converts `image` with the strategy named `strategy`, reading its settings
/// from `options`. Options are validated before any pixel is processed.
pub fn convert(image: &RasterImage, strategy: &str, options: &ConvertOptions) -> Result<GlyphGrid> {
    let kind: StrategyKind = strategy.parse()?;
    Conversion::from_options(kind, options)?.run(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_errors_are_grouped() {
        assert!(AsciiError::EmptyImage { width: 0, height: 0 }.is_image_load());
        assert!(AsciiError::MalformedBuffer("short".into()).is_image_load());
        let invalid = AsciiError::InvalidOption { name: "width".into(), reason: "0".into() };
        assert!(!invalid.is_image_load());
    }

    #[test]
    fn renderer_reports_sample_geometry() {
        let image = RasterImage::from_raw(40, 40, 1, vec![0; 1600]).unwrap();
        let conversion = Conversion::new(Strategy::Block(BlockOptions {
            mode: BlockMode::Braille,
            threshold: 128,
        }))
        .with_width(10);
        let output = AsciiRenderer.render_image(&image, &conversion).unwrap();
        assert_eq!(output.geometry, TargetGeometry { columns: 20, rows: 8 });
        assert_eq!((output.grid.width, output.grid.height), (10, 2));
        assert_eq!(output.strategy, StrategyKind::BlockChars);
    }

    #[test]
    fn renderer_rejects_zero_width_as_an_option_error() {
        let image = RasterImage::from_raw(8, 8, 1, vec![120; 64]).unwrap();
        let conversion =
            Conversion::new(Strategy::default_for(StrategyKind::Brightness)).with_width(0);
        let err = AsciiRenderer.render_image(&image, &conversion).unwrap_err();
        assert!(matches!(err, AsciiError::InvalidOption { ref name, .. } if name == "width"));
        assert!(!err.is_image_load());
    }

    #[test]
    fn renderer_rejects_huge_braille_widths_without_overflow() {
        let image = RasterImage::from_raw(8, 8, 1, vec![120; 64]).unwrap();
        let conversion = Conversion::new(Strategy::Block(BlockOptions {
            mode: BlockMode::Braille,
            threshold: 128,
        }))
        .with_width(u32::MAX);
        let err = AsciiRenderer.render_image(&image, &conversion).unwrap_err();
        assert!(matches!(err, AsciiError::InvalidOption { .. }));
    }

    #[test]
    fn convert_rejects_unknown_strategies() {
        let image = RasterImage::from_raw(2, 2, 1, vec![0; 4]).unwrap();
        let err = convert(&image, "watercolor", &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, AsciiError::InvalidOption { ref name, .. } if name == "strategy"));
    }
}
