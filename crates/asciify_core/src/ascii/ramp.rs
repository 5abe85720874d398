use std::fmt;
use std::str::FromStr;

/// Ten glyphs, densest first.
pub const DETAILED: &str = "@%#*+=-:. ";

/// Paul Bourke's seventy-glyph ramp, densest first.
pub const EXTENDED: &str =
    "$@B%8&WM#*oahkbdpqwmZO0QLCJUYXzcvunxrjft/\\|()1{}[]?-_+~<>i!lI;:,\"^`'. ";

/// Eleven glyphs, densest first, no trailing blank.
pub const SIMPLE: &str = "@#S%?*+;:,.";

/// Shading blocks, lightest first.
pub const BLOCK_SHADES: &str = " ░▒▓█";

/// Seventy glyphs, lightest first; used for shading beside detected edges.
pub const LINE_ART: &str =
    " .'`^\",:;Il!i><~+_-?][}{1)(|\\/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$";

/// Ordered glyph sequence indexed by 8-bit intensity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphRamp {
    chars: Vec<char>,
}

impl GlyphRamp {
    pub fn new(chars: impl Into<String>) -> Self {
        let chars: Vec<char> = chars.into().chars().collect();
        assert!(chars.len() >= 2, "glyph ramp must contain at least two characters");
        Self { chars }
    }

    pub fn detailed() -> Self {
        Self::new(DETAILED)
    }

    pub fn extended() -> Self {
        Self::new(EXTENDED)
    }

    pub fn simple() -> Self {
        Self::new(SIMPLE)
    }

    pub fn block_shades() -> Self {
        Self::new(BLOCK_SHADES)
    }

    pub fn line_art() -> Self {
        Self::new(LINE_ART)
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn first(&self) -> char {
        self.chars[0]
    }

    pub fn last(&self) -> char {
        self.chars[self.chars.len() - 1]
    }

    /// `floor(value / 256 * len)`, clamped to the ramp.
    ///
    /// The 256 divisor leaves the last bucket narrower than the others; every
    /// strategy depends on this exact bucketing.
    #[inline]
    pub fn index_of(&self, value: f64) -> usize {
        let index = (value / 256.0 * self.chars.len() as f64).floor();
        if index <= 0.0 {
            0
        } else {
            (index as usize).min(self.chars.len() - 1)
        }
    }

    #[inline]
    pub fn glyph(&self, value: f64) -> char {
        self.chars[self.index_of(value)]
    }

    /// Glyph for an 8-bit sample, optionally inverted (`255 - value`) first.
    #[inline]
    pub fn map(&self, value: u8, invert: bool) -> char {
        let value = if invert { 255 - value } else { value };
        self.glyph(f64::from(value))
    }
}

/// Named ramp a conversion can select.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Charset {
    #[default]
    Detailed,
    Extended,
    Simple,
}

impl Charset {
    pub const ALL: [Charset; 3] = [Charset::Detailed, Charset::Extended, Charset::Simple];

    pub fn name(self) -> &'static str {
        match self {
            Charset::Detailed => "detailed",
            Charset::Extended => "extended",
            Charset::Simple => "simple",
        }
    }

    pub fn ramp(self) -> GlyphRamp {
        match self {
            Charset::Detailed => GlyphRamp::detailed(),
            Charset::Extended => GlyphRamp::extended(),
            Charset::Simple => GlyphRamp::simple(),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Charset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Charset::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown charset `{s}`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_lengths() {
        assert_eq!(GlyphRamp::detailed().len(), 10);
        assert_eq!(GlyphRamp::extended().len(), 70);
        assert_eq!(GlyphRamp::simple().len(), 11);
        assert_eq!(GlyphRamp::block_shades().len(), 5);
        assert_eq!(GlyphRamp::line_art().len(), 70);
    }

    #[test]
    fn extremes_map_to_ends() {
        for charset in Charset::ALL {
            let ramp = charset.ramp();
            assert_eq!(ramp.map(0, false), ramp.first(), "{charset}");
            assert_eq!(ramp.map(255, false), ramp.last(), "{charset}");
        }
    }

    #[test]
    fn inversion_mirrors_the_input() {
        let ramp = GlyphRamp::detailed();
        for v in 0..=255u8 {
            assert_eq!(ramp.map(v, true), ramp.map(255 - v, false));
        }
    }

    #[test]
    fn buckets_use_a_256_divisor() {
        let ramp = GlyphRamp::detailed();
        // 25.6 wide buckets: 25 is still in the first, 26 is in the second.
        assert_eq!(ramp.index_of(25.0), 0);
        assert_eq!(ramp.index_of(26.0), 1);
        assert_eq!(ramp.index_of(230.0), 8);
        assert_eq!(ramp.index_of(231.0), 9);
        assert_eq!(ramp.index_of(-4.0), 0);
        assert_eq!(ramp.index_of(400.0), 9);
    }

    #[test]
    fn charset_names_parse() {
        assert_eq!("Extended".parse::<Charset>().unwrap(), Charset::Extended);
        assert!("braille".parse::<Charset>().is_err());
    }

    #[test]
    #[should_panic]
    fn single_glyph_ramps_are_rejected() {
        let _ = GlyphRamp::new("#");
    }
}
