//! Conversion strategies and the per-call configuration that selects one.

pub mod block;
pub mod brightness;
pub mod dither;
pub mod edge;
pub mod gradient;

use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::ascii::grid::GlyphGrid;
use crate::ascii::ramp::GlyphRamp;
use crate::image_pipeline::loader::RasterImage;
use crate::image_pipeline::resize::LayoutPolicy;
use crate::options::{ConvertOptions, DEFAULT_WIDTH, MAX_WIDTH};
use crate::{AsciiError, Result};

pub use block::{BlockMode, BlockOptions};
pub use brightness::BrightnessOptions;
pub use dither::DitherOptions;
pub use edge::{EdgeOptions, EdgeStyle};
pub use gradient::{GradientOptions, GradientStyle};

/// Identifies a strategy without its options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Brightness,
    EdgeDetection,
    SobelGradient,
    BlockChars,
    Dithering,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::Brightness,
        StrategyKind::EdgeDetection,
        StrategyKind::SobelGradient,
        StrategyKind::BlockChars,
        StrategyKind::Dithering,
    ];

    pub fn id(self) -> &'static str {
        match self {
            StrategyKind::Brightness => "brightness",
            StrategyKind::EdgeDetection => "edge_detection",
            StrategyKind::SobelGradient => "sobel_gradient",
            StrategyKind::BlockChars => "block_chars",
            StrategyKind::Dithering => "dithering",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::Brightness => "Classic Brightness",
            StrategyKind::EdgeDetection => "Edge Detection (Canny)",
            StrategyKind::SobelGradient => "Sobel Gradient",
            StrategyKind::BlockChars => "Block/Braille Characters",
            StrategyKind::Dithering => "Dithering",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StrategyKind::Brightness => {
                "Maps each sample's brightness onto a density ramp of glyphs."
            },
            StrategyKind::EdgeDetection => {
                "Outlines contours found by a Canny edge detector, rotoscope style."
            },
            StrategyKind::SobelGradient => {
                "Draws |, -, / and \\ along local Sobel gradient directions."
            },
            StrategyKind::BlockChars => {
                "Unicode shading blocks, half blocks or Braille patterns for denser output."
            },
            StrategyKind::Dithering => {
                "Error diffusion or ordered dithering before mapping onto the ramp."
            },
        }
    }

    /// Options the strategy reads, with their defaults and accepted ranges.
    pub fn options(self) -> &'static [OptionSpec] {
        match self {
            StrategyKind::Brightness => &BRIGHTNESS_OPTIONS,
            StrategyKind::EdgeDetection => &EDGE_OPTIONS,
            StrategyKind::SobelGradient => &GRADIENT_OPTIONS,
            StrategyKind::BlockChars => &BLOCK_OPTIONS,
            StrategyKind::Dithering => &DITHER_OPTIONS,
        }
    }
}

/// One named option as listed for users.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub default: &'static str,
    pub range: &'static str,
}

const fn spec(name: &'static str, default: &'static str, range: &'static str) -> OptionSpec {
    OptionSpec { name, default, range }
}

const WIDTH: OptionSpec = spec("width", "100", "1..=1000");
const CHARSET: OptionSpec = spec("charset", "detailed", "detailed, extended, simple");

const BRIGHTNESS_OPTIONS: [OptionSpec; 5] = [
    WIDTH,
    CHARSET,
    spec("invert", "false", "true, false"),
    spec("contrast", "1.0", ">= 0"),
    spec("brightness", "1.0", ">= 0"),
];

const EDGE_OPTIONS: [OptionSpec; 6] = [
    WIDTH,
    spec("mode", "outline", "outline, intensity"),
    spec("invert", "true", "true, false (outline only)"),
    spec("low_threshold", "50", "0..=255, clamped (intensity 30)"),
    spec("high_threshold", "150", "0..=255, clamped, swapped if below low (intensity 100)"),
    spec("blur_kernel", "5", "1..=31, even sizes bumped to odd (outline only)"),
];

const GRADIENT_OPTIONS: [OptionSpec; 6] = [
    WIDTH,
    CHARSET,
    spec("mode", "direction", "direction, combined"),
    spec("magnitude_threshold", "30", "0..=255, clamped"),
    spec("show_magnitude", "true", "true, false"),
    spec("edge_weight", "0.7", "0..=1, clamped (combined only)"),
];

const BLOCK_OPTIONS: [OptionSpec; 3] = [
    WIDTH,
    spec("mode", "block", "block, halfblock, braille, braille-dither"),
    spec("threshold", "128", "0..=255 (braille only)"),
];

const DITHER_OPTIONS: [OptionSpec; 5] = [
    WIDTH,
    CHARSET,
    spec(
        "algorithm",
        "floyd-steinberg",
        "floyd-steinberg, atkinson, jarvis-judice-ninke, stucki, ordered",
    ),
    spec("levels", "10", "2..=256"),
    spec("invert", "false", "true, false"),
];

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StrategyKind {
    type Err = AsciiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "brightness" => Ok(StrategyKind::Brightness),
            "edge_detection" | "edge" | "edges" | "canny" => Ok(StrategyKind::EdgeDetection),
            "sobel_gradient" | "sobel" | "gradient" => Ok(StrategyKind::SobelGradient),
            "block_chars" | "block" | "blocks" => Ok(StrategyKind::BlockChars),
            "dithering" | "dither" => Ok(StrategyKind::Dithering),
            _ => Err(AsciiError::InvalidOption {
                name: "strategy".to_owned(),
                reason: format!("unknown strategy `{s}`"),
            }),
        }
    }
}

/// One strategy together with its validated options.
#[derive(Clone, Debug, PartialEq)]
pub enum Strategy {
    Brightness(BrightnessOptions),
    Edge(EdgeOptions),
    Gradient(GradientOptions),
    Block(BlockOptions),
    Dither(DitherOptions),
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Brightness(_) => StrategyKind::Brightness,
            Strategy::Edge(_) => StrategyKind::EdgeDetection,
            Strategy::Gradient(_) => StrategyKind::SobelGradient,
            Strategy::Block(_) => StrategyKind::BlockChars,
            Strategy::Dither(_) => StrategyKind::Dithering,
        }
    }

    pub fn default_for(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::Brightness => Strategy::Brightness(BrightnessOptions::default()),
            StrategyKind::EdgeDetection => Strategy::Edge(EdgeOptions::default()),
            StrategyKind::SobelGradient => Strategy::Gradient(GradientOptions::default()),
            StrategyKind::BlockChars => Strategy::Block(BlockOptions::default()),
            StrategyKind::Dithering => Strategy::Dither(DitherOptions::default()),
        }
    }

    pub fn layout(&self) -> LayoutPolicy {
        match self {
            Strategy::Block(options) => options.mode.layout(),
            _ => LayoutPolicy::cells(),
        }
    }

    /// Range checks for options built by hand rather than through `from_options`.
    pub fn validate(&self) -> Result<()> {
        match self {
            Strategy::Brightness(options) => options.validate(),
            Strategy::Edge(options) => options.validate(),
            Strategy::Gradient(options) => options.validate(),
            // Modes are closed and every `u8` is a valid threshold.
            Strategy::Block(_) => Ok(()),
            Strategy::Dither(options) => options.validate(),
        }
    }
}

/// Immutable configuration for a single conversion call.
#[derive(Clone, Debug, PartialEq)]
pub struct Conversion {
    pub width: u32,
    pub ramp: GlyphRamp,
    pub strategy: Strategy,
}

impl Conversion {
    pub fn new(strategy: Strategy) -> Self {
        Self { width: DEFAULT_WIDTH, ramp: GlyphRamp::detailed(), strategy }
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Validates every option the strategy reads before any pixel is touched.
    pub fn from_options(kind: StrategyKind, options: &ConvertOptions) -> Result<Self> {
        let width = options.width()?;
        let ramp = options.charset()?.ramp();
        let strategy = match kind {
            StrategyKind::Brightness => {
                Strategy::Brightness(BrightnessOptions::from_options(options)?)
            },
            StrategyKind::EdgeDetection => Strategy::Edge(EdgeOptions::from_options(options)?),
            StrategyKind::SobelGradient => {
                Strategy::Gradient(GradientOptions::from_options(options)?)
            },
            StrategyKind::BlockChars => Strategy::Block(BlockOptions::from_options(options)?),
            StrategyKind::Dithering => Strategy::Dither(DitherOptions::from_options(options)?),
        };

        Ok(Self { width, ramp, strategy })
    }

    pub fn kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    pub fn layout(&self) -> LayoutPolicy {
        self.strategy.layout()
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.width > MAX_WIDTH {
            return Err(AsciiError::InvalidOption {
                name: "width".to_owned(),
                reason: format!("must be within 1..={MAX_WIDTH}, got {}", self.width),
            });
        }
        self.strategy.validate()
    }

    pub fn run(&self, image: &RasterImage) -> Result<GlyphGrid> {
        self.validate()?;

        debug!("running {} at width {}", self.kind(), self.width);

        let grid = match &self.strategy {
            Strategy::Brightness(options) => {
                brightness::render(image, self.width, &self.ramp, options)
            },
            Strategy::Edge(options) => edge::render(image, self.width, options),
            Strategy::Gradient(options) => {
                gradient::render(image, self.width, &self.ramp, options)
            },
            Strategy::Block(options) => block::render(image, self.width, options),
            Strategy::Dither(options) => dither::render(image, self.width, &self.ramp, options),
        }?;

        debug!("produced {}x{} glyphs", grid.width, grid.height);
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_parse_by_id_and_alias() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.id().parse::<StrategyKind>().unwrap(), kind);
        }
        assert_eq!("edge".parse::<StrategyKind>().unwrap(), StrategyKind::EdgeDetection);
        assert_eq!("Block-Chars".parse::<StrategyKind>().unwrap(), StrategyKind::BlockChars);
        assert!("watercolor".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn defaults_match_each_kind() {
        for kind in StrategyKind::ALL {
            assert_eq!(Strategy::default_for(kind).kind(), kind);
        }
    }

    #[test]
    fn from_options_rejects_bad_fields_up_front() {
        let options = ConvertOptions { levels: Some(1), ..Default::default() };
        assert!(Conversion::from_options(StrategyKind::Dithering, &options).is_err());

        let options = ConvertOptions { mode: Some("sixel".into()), ..Default::default() };
        assert!(Conversion::from_options(StrategyKind::BlockChars, &options).is_err());

        let options = ConvertOptions { charset: Some("runes".into()), ..Default::default() };
        assert!(Conversion::from_options(StrategyKind::Brightness, &options).is_err());
    }

    #[test]
    fn block_modes_choose_their_layout() {
        let options = ConvertOptions { mode: Some("halfblock".into()), ..Default::default() };
        let conversion = Conversion::from_options(StrategyKind::BlockChars, &options).unwrap();
        assert_eq!(conversion.layout(), LayoutPolicy::half_blocks());

        let conversion =
            Conversion::from_options(StrategyKind::Brightness, &ConvertOptions::default()).unwrap();
        assert_eq!(conversion.layout(), LayoutPolicy::cells());
        assert_eq!(conversion.width, DEFAULT_WIDTH);
    }

    #[test]
    fn hand_built_dither_levels_are_rejected_before_rendering() {
        let samples = (0..64).map(|i| (i * 4) as u8).collect();
        let image = RasterImage::from_raw(8, 8, 1, samples).unwrap();
        let options = DitherOptions { levels: 0, ..Default::default() };
        let conversion = Conversion::new(Strategy::Dither(options)).with_width(8);
        let err = conversion.run(&image).unwrap_err();
        assert!(matches!(err, AsciiError::InvalidOption { ref name, .. } if name == "levels"));
    }

    #[test]
    fn hand_built_blur_kernel_is_rejected() {
        let options = EdgeOptions { blur_kernel: 5_000_001, ..Default::default() };
        let conversion = Conversion::new(Strategy::Edge(options));
        assert!(matches!(conversion.validate(), Err(AsciiError::InvalidOption { .. })));
    }

    #[test]
    fn option_listing_defaults_match_the_parsed_defaults() {
        for kind in StrategyKind::ALL {
            let specs = kind.options();
            assert_eq!(specs[0].name, "width");
            let pairs = specs.iter().map(|spec| (spec.name, spec.default));
            let listed = ConvertOptions::from_pairs(pairs).unwrap();
            assert_eq!(
                Conversion::from_options(kind, &listed).unwrap(),
                Conversion::from_options(kind, &ConvertOptions::default()).unwrap(),
                "{kind}"
            );
        }
    }

    #[test]
    fn zero_width_is_rejected_at_run_time_too() {
        let image = RasterImage::from_raw(2, 2, 1, vec![0; 4]).unwrap();
        let conversion = Conversion::new(Strategy::default_for(StrategyKind::Brightness)).with_width(0);
        assert!(matches!(conversion.run(&image), Err(AsciiError::InvalidOption { .. })));
    }
}
