//! Quantization with error diffusion or ordered (Bayer) thresholds.
//!
//! Diffusion walks the field top-to-bottom, left-to-right and pushes each
//! sample's quantization residual onto neighbours that have not been visited
//! yet. That ordering is part of the result: the diffusion kernels cannot be
//! reordered or split across threads. The ordered kernel has no such
//! dependency and runs row-parallel.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;

use super::samples::ToneField;

/// One neighbour that receives `numerator / divisor` of the residual.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tap {
    pub dx: isize,
    pub dy: usize,
    pub numerator: u8,
}

/// Fixed error diffusion table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiffusionKernel {
    pub name: &'static str,
    pub divisor: u8,
    pub taps: &'static [Tap],
}

const fn tap(dx: isize, dy: usize, numerator: u8) -> Tap {
    Tap { dx, dy, numerator }
}

/// ```text
///       *  7
///    3  5  1     (/16)
/// ```
pub const FLOYD_STEINBERG: DiffusionKernel = DiffusionKernel {
    name: "floyd-steinberg",
    divisor: 16,
    taps: &[tap(1, 0, 7), tap(-1, 1, 3), tap(0, 1, 5), tap(1, 1, 1)],
};

/// Spreads only 6/8 of the residual; the lost 2/8 is what gives Atkinson its contrast.
pub const ATKINSON: DiffusionKernel = DiffusionKernel {
    name: "atkinson",
    divisor: 8,
    taps: &[tap(1, 0, 1), tap(2, 0, 1), tap(-1, 1, 1), tap(0, 1, 1), tap(1, 1, 1), tap(0, 2, 1)],
};

/// ```text
///          *  7  5
///    3  5  7  5  3
///    1  3  5  3  1   (/48)
/// ```
pub const JARVIS_JUDICE_NINKE: DiffusionKernel = DiffusionKernel {
    name: "jarvis-judice-ninke",
    divisor: 48,
    taps: &[
        tap(1, 0, 7),
        tap(2, 0, 5),
        tap(-2, 1, 3),
        tap(-1, 1, 5),
        tap(0, 1, 7),
        tap(1, 1, 5),
        tap(2, 1, 3),
        tap(-2, 2, 1),
        tap(-1, 2, 3),
        tap(0, 2, 5),
        tap(1, 2, 3),
        tap(2, 2, 1),
    ],
};

/// ```text
///          *  8  4
///    2  4  8  4  2
///    1  2  4  2  1   (/42)
/// ```
pub const STUCKI: DiffusionKernel = DiffusionKernel {
    name: "stucki",
    divisor: 42,
    taps: &[
        tap(1, 0, 8),
        tap(2, 0, 4),
        tap(-2, 1, 2),
        tap(-1, 1, 4),
        tap(0, 1, 8),
        tap(1, 1, 4),
        tap(2, 1, 2),
        tap(-2, 2, 1),
        tap(-1, 2, 2),
        tap(0, 2, 4),
        tap(1, 2, 2),
        tap(2, 2, 1),
    ],
};

impl DiffusionKernel {
    /// Fraction of the residual the kernel hands on.
    pub fn total_weight(&self) -> f64 {
        let sum: u32 = self.taps.iter().map(|t| u32::from(t.numerator)).sum();
        f64::from(sum) / f64::from(self.divisor)
    }
}

pub const BAYER_4X4: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DitherAlgorithm {
    #[default]
    FloydSteinberg,
    Atkinson,
    JarvisJudiceNinke,
    Stucki,
    Ordered,
}

impl DitherAlgorithm {
    pub const ALL: [DitherAlgorithm; 5] = [
        DitherAlgorithm::FloydSteinberg,
        DitherAlgorithm::Atkinson,
        DitherAlgorithm::JarvisJudiceNinke,
        DitherAlgorithm::Stucki,
        DitherAlgorithm::Ordered,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DitherAlgorithm::Ordered => "ordered",
            other => other.kernel().map_or("ordered", |k| k.name),
        }
    }

    /// Diffusion table, or `None` for the ordered kernel.
    pub fn kernel(self) -> Option<&'static DiffusionKernel> {
        match self {
            DitherAlgorithm::FloydSteinberg => Some(&FLOYD_STEINBERG),
            DitherAlgorithm::Atkinson => Some(&ATKINSON),
            DitherAlgorithm::JarvisJudiceNinke => Some(&JARVIS_JUDICE_NINKE),
            DitherAlgorithm::Stucki => Some(&STUCKI),
            DitherAlgorithm::Ordered => None,
        }
    }
}

impl fmt::Display for DitherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DitherAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "floyd-steinberg" | "floyd" => Ok(DitherAlgorithm::FloydSteinberg),
            "atkinson" => Ok(DitherAlgorithm::Atkinson),
            "jarvis-judice-ninke" | "jarvis" => Ok(DitherAlgorithm::JarvisJudiceNinke),
            "stucki" => Ok(DitherAlgorithm::Stucki),
            "ordered" | "bayer" => Ok(DitherAlgorithm::Ordered),
            other => Err(format!("unknown dithering algorithm `{other}`")),
        }
    }
}

/// Snaps to the centre of one of `levels` evenly spaced buckets over `[0, 256)`.
#[inline]
pub fn quantize(value: f64, levels: u16) -> f64 {
    let step = 256.0 / f64::from(levels);
    (value / step).floor() * step + step / 2.0
}

/// Target values a diffusion pass snaps samples to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Quantizer {
    /// Bucket centres of [`quantize`].
    Levels(u16),
    /// `255` above the threshold, `0` otherwise.
    Binary { threshold: f64 },
}

impl Quantizer {
    #[inline]
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Quantizer::Levels(levels) => quantize(value, levels),
            Quantizer::Binary { threshold } => {
                if value > threshold {
                    255.0
                } else {
                    0.0
                }
            },
        }
    }
}

/// Quantizes `field` in place, diffusing each residual through `kernel`.
///
/// Taps that fall outside the field are dropped. No clamping happens here.
pub fn diffuse(field: &mut ToneField, kernel: &DiffusionKernel, quantizer: Quantizer) {
    let width = field.width();
    let height = field.height();
    let divisor = f64::from(kernel.divisor);
    let samples = field.samples_mut();

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let old = samples[idx];
            let new = quantizer.apply(old);
            samples[idx] = new;
            let error = old - new;

            for tap in kernel.taps {
                let nx = x as isize + tap.dx;
                let ny = y + tap.dy;
                if nx < 0 || nx as usize >= width || ny >= height {
                    continue;
                }
                samples[ny * width + nx as usize] += error * f64::from(tap.numerator) / divisor;
            }
        }
    }
}

/// Offsets each sample by its Bayer threshold and quantizes it.
///
/// The matrix entry is scaled to `[0, 255)` and centred on 128, then stretched
/// by the bucket width before quantizing.
pub fn ordered(field: &mut ToneField, levels: u16) {
    let width = field.width().max(1);
    let spread = 256.0 / f64::from(levels);

    field.samples_mut().par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let matrix_row = &BAYER_4X4[y % 4];
        for (x, value) in row.iter_mut().enumerate() {
            let threshold = f64::from(matrix_row[x % 4]) / 16.0 * 255.0;
            let adjusted = *value + (threshold - 128.0) * spread;
            *value = quantize(adjusted, levels);
        }
    });
}

/// Dithers to `levels` gray levels and clamps the result to `[0, 255]`.
pub fn dither(field: &ToneField, algorithm: DitherAlgorithm, levels: u16) -> ToneField {
    let mut result = field.clone();
    match algorithm.kernel() {
        Some(kernel) => diffuse(&mut result, kernel, Quantizer::Levels(levels)),
        None => ordered(&mut result, levels),
    }
    result.clamp_in_place();
    result
}
