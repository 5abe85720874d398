//! Flat named options as they arrive from a form, a command line or a config file.

use std::str::FromStr;

use log::warn;
use serde::Deserialize;

use crate::ascii::ramp::Charset;
use crate::{AsciiError, Result};

pub const DEFAULT_WIDTH: u32 = 100;
pub const MAX_WIDTH: u32 = 1000;
pub const MAX_BLUR_KERNEL: u32 = 31;
pub const MIN_LEVELS: u16 = 2;
pub const MAX_LEVELS: u16 = 256;

/// Every option any strategy understands. Unset fields fall back to the
/// strategy's defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertOptions {
    pub width: Option<i64>,
    pub invert: Option<bool>,
    pub contrast: Option<f64>,
    #[serde(alias = "brightness_adj")]
    pub brightness: Option<f64>,
    pub low_threshold: Option<f64>,
    pub high_threshold: Option<f64>,
    pub blur_kernel: Option<i64>,
    pub magnitude_threshold: Option<f64>,
    pub show_magnitude: Option<bool>,
    pub mode: Option<String>,
    pub threshold: Option<i64>,
    pub algorithm: Option<String>,
    pub levels: Option<i64>,
    pub charset: Option<String>,
    pub edge_weight: Option<f64>,
}

pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> AsciiError {
    AsciiError::InvalidOption { name: name.to_owned(), reason: reason.into() }
}

/// Rejects values outside `[min, max]`, NaN included.
pub(crate) fn ensure_within(name: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(invalid(name, format!("must be within {min}..={max}, got {value}")))
    }
}

fn parse_value<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| invalid(name, format!("cannot parse `{raw}`")))
}

fn parse_flag(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(invalid(name, format!("expected a boolean, got `{raw}`"))),
    }
}

impl ConvertOptions {
    /// Parses string key/value pairs. Unknown keys and unparsable values are rejected.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Self::default();
        for (key, value) in pairs {
            options.set(key.as_ref(), value.as_ref())?;
        }
        Ok(options)
    }

    pub fn set(&mut self, key: &str, raw: &str) -> Result<()> {
        let key = key.trim();
        match key {
            "width" => self.width = Some(parse_value(key, raw)?),
            "invert" => self.invert = Some(parse_flag(key, raw)?),
            "contrast" => self.contrast = Some(parse_value(key, raw)?),
            "brightness" | "brightness_adj" => self.brightness = Some(parse_value(key, raw)?),
            "low_threshold" => self.low_threshold = Some(parse_value(key, raw)?),
            "high_threshold" => self.high_threshold = Some(parse_value(key, raw)?),
            "blur_kernel" => self.blur_kernel = Some(parse_value(key, raw)?),
            "magnitude_threshold" => self.magnitude_threshold = Some(parse_value(key, raw)?),
            "show_magnitude" => self.show_magnitude = Some(parse_flag(key, raw)?),
            "mode" => self.mode = Some(raw.trim().to_owned()),
            "threshold" => self.threshold = Some(parse_value(key, raw)?),
            "algorithm" => self.algorithm = Some(raw.trim().to_owned()),
            "levels" => self.levels = Some(parse_value(key, raw)?),
            "charset" => self.charset = Some(raw.trim().to_owned()),
            "edge_weight" => self.edge_weight = Some(parse_value(key, raw)?),
            _ => return Err(invalid(key, "unknown option")),
        }
        Ok(())
    }

    /// Fields set in `over` win; everything else is kept from `self`.
    pub fn merge(self, over: ConvertOptions) -> ConvertOptions {
        ConvertOptions {
            width: over.width.or(self.width),
            invert: over.invert.or(self.invert),
            contrast: over.contrast.or(self.contrast),
            brightness: over.brightness.or(self.brightness),
            low_threshold: over.low_threshold.or(self.low_threshold),
            high_threshold: over.high_threshold.or(self.high_threshold),
            blur_kernel: over.blur_kernel.or(self.blur_kernel),
            magnitude_threshold: over.magnitude_threshold.or(self.magnitude_threshold),
            show_magnitude: over.show_magnitude.or(self.show_magnitude),
            mode: over.mode.or(self.mode),
            threshold: over.threshold.or(self.threshold),
            algorithm: over.algorithm.or(self.algorithm),
            levels: over.levels.or(self.levels),
            charset: over.charset.or(self.charset),
            edge_weight: over.edge_weight.or(self.edge_weight),
        }
    }

    pub(crate) fn width(&self) -> Result<u32> {
        match self.width {
            None => Ok(DEFAULT_WIDTH),
            Some(w) if (1..=i64::from(MAX_WIDTH)).contains(&w) => Ok(w as u32),
            Some(w) => Err(invalid("width", format!("must be within 1..={MAX_WIDTH}, got {w}"))),
        }
    }

    pub(crate) fn charset(&self) -> Result<Charset> {
        self.charset
            .as_deref()
            .map_or(Ok(Charset::default()), |name| name.parse().map_err(|e| invalid("charset", e)))
    }

    /// Non-negative finite multiplier.
    pub(crate) fn factor(name: &str, value: Option<f64>, default: f32) -> Result<f32> {
        match value {
            None => Ok(default),
            Some(v) if v.is_finite() && v >= 0.0 => Ok(v as f32),
            Some(v) => Err(invalid(name, format!("must be a finite value >= 0, got {v}"))),
        }
    }

    /// Finite value clamped into `[min, max]`.
    pub(crate) fn clamped(name: &str, value: Option<f64>, default: f64, min: f64, max: f64) -> Result<f64> {
        let Some(v) = value else {
            return Ok(default);
        };
        if !v.is_finite() {
            return Err(invalid(name, format!("must be finite, got {v}")));
        }
        let clamped = v.clamp(min, max);
        if clamped != v {
            warn!("{name} {v} clamped to {clamped}");
        }
        Ok(clamped)
    }

    pub(crate) fn blur_kernel(&self, default: u32) -> Result<usize> {
        match self.blur_kernel {
            None => Ok(default as usize),
            Some(k) if (1..=i64::from(MAX_BLUR_KERNEL)).contains(&k) => Ok(k as usize),
            Some(k) => Err(invalid(
                "blur_kernel",
                format!("must be within 1..={MAX_BLUR_KERNEL}, got {k}"),
            )),
        }
    }

    pub(crate) fn threshold(&self, default: u8) -> Result<u8> {
        match self.threshold {
            None => Ok(default),
            Some(t) => u8::try_from(t)
                .map_err(|_| invalid("threshold", format!("must be within 0..=255, got {t}"))),
        }
    }

    pub(crate) fn levels(&self, default: u16) -> Result<u16> {
        match self.levels {
            None => Ok(default),
            Some(l) if (i64::from(MIN_LEVELS)..=i64::from(MAX_LEVELS)).contains(&l) => Ok(l as u16),
            Some(l) => Err(invalid(
                "levels",
                format!("must be within {MIN_LEVELS}..={MAX_LEVELS}, got {l}"),
            )),
        }
    }

    /// Parses a named choice such as `mode` or `algorithm`.
    pub(crate) fn choice<T>(name: &str, value: Option<&str>, default: T) -> Result<T>
    where
        T: FromStr<Err = String>,
    {
        value.map_or(Ok(default), |raw| raw.parse().map_err(|e: String| invalid(name, e)))
    }
}
