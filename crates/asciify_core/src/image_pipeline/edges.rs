use log::debug;

use super::samples::{Grid, SampleGrid};

/// tan(22.5°), splits horizontal, vertical and diagonal gradient sectors.
const TAN_22_5: f32 = 0.414_213_56;

/// How out-of-range taps are resolved when filtering near the border.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Border {
    /// `gfedcb|abcdefgh|gfedcba`
    Reflect101,
    /// `aaaaaa|abcdefgh|hhhhhhh`
    Replicate,
}

impl Border {
    #[inline]
    fn resolve(self, index: isize, len: usize) -> usize {
        let last = len as isize - 1;
        if last <= 0 {
            return 0;
        }
        match self {
            Border::Replicate => index.clamp(0, last) as usize,
            Border::Reflect101 => {
                let mut i = index;
                while i < 0 || i > last {
                    i = if i < 0 { -i } else { 2 * last - i };
                }
                i as usize
            },
        }
    }
}

/// Normalized 1-D Gaussian taps for an odd `size`.
///
/// Sizes up to 7 use the fixed binomial-style tables; larger sizes derive sigma
/// from the size as `0.3 * ((size - 1) / 2 - 1) + 0.8`.
pub fn gaussian_kernel(size: usize) -> Vec<f32> {
    match size {
        0 | 1 => vec![1.0],
        3 => vec![0.25, 0.5, 0.25],
        5 => vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
        7 => vec![0.031_25, 0.109_375, 0.218_75, 0.281_25, 0.218_75, 0.109_375, 0.031_25],
        _ => {
            let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
            let center = (size / 2) as f32;
            let mut taps: Vec<f32> = (0..size)
                .map(|i| {
                    let d = i as f32 - center;
                    (-(d * d) / (2.0 * sigma * sigma)).exp()
                })
                .collect();
            let sum: f32 = taps.iter().sum();
            for tap in &mut taps {
                *tap /= sum;
            }
            taps
        },
    }
}

fn convolve_separable(
    grid: &SampleGrid,
    horizontal: &[f32],
    vertical: &[f32],
    border: Border,
) -> Grid<f32> {
    let width = grid.width();
    let height = grid.height();
    let h_radius = (horizontal.len() / 2) as isize;
    let v_radius = (vertical.len() / 2) as isize;

    let mut pass = vec![0.0f32; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (k, weight) in horizontal.iter().enumerate() {
                let sx = border.resolve(x as isize + k as isize - h_radius, width);
                acc += weight * f32::from(grid.get(sx, y));
            }
            pass[y * width + x] = acc;
        }
    }

    let mut out = vec![0.0f32; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (k, weight) in vertical.iter().enumerate() {
                let sy = border.resolve(y as isize + k as isize - v_radius, height);
                acc += weight * pass[sy * width + x];
            }
            out[y * width + x] = acc;
        }
    }

    Grid::from_samples(width, height, out)
}

/// Gaussian blur with an odd square kernel; even sizes are bumped to the next odd one.
pub fn gaussian_blur(grid: &SampleGrid, size: usize) -> SampleGrid {
    let size = if size % 2 == 0 { size + 1 } else { size };
    if size <= 1 {
        return grid.clone();
    }
    let kernel = gaussian_kernel(size);
    convolve_separable(grid, &kernel, &kernel, Border::Reflect101)
        .map(|v| v.round().clamp(0.0, 255.0) as u8)
}

/// Horizontal and vertical 3x3 Sobel responses.
#[derive(Clone, Debug)]
pub struct Gradients {
    pub gx: Grid<f32>,
    pub gy: Grid<f32>,
}

pub fn sobel(grid: &SampleGrid, border: Border) -> Gradients {
    const DERIVATIVE: [f32; 3] = [-1.0, 0.0, 1.0];
    const SMOOTH: [f32; 3] = [1.0, 2.0, 1.0];

    Gradients {
        gx: convolve_separable(grid, &DERIVATIVE, &SMOOTH, border),
        gy: convolve_separable(grid, &SMOOTH, &DERIVATIVE, border),
    }
}

/// Per-sample gradient magnitude (`sqrt(gx² + gy²)`) and angle (`atan2(gy, gx)`, radians).
#[derive(Clone, Debug)]
pub struct GradientField {
    pub magnitude: Grid<f32>,
    pub angle: Grid<f32>,
}

impl GradientField {
    pub fn max_magnitude(&self) -> f32 {
        self.magnitude.samples().iter().copied().fold(0.0, f32::max)
    }
}

pub fn sobel_with_angle(grid: &SampleGrid) -> GradientField {
    let Gradients { gx, gy } = sobel(grid, Border::Reflect101);
    let width = grid.width();
    let height = grid.height();

    let mut magnitude = Vec::with_capacity(width * height);
    let mut angle = Vec::with_capacity(width * height);
    for (&x, &y) in gx.samples().iter().zip(gy.samples()) {
        magnitude.push((x * x + y * y).sqrt());
        angle.push(y.atan2(x));
    }

    GradientField {
        magnitude: Grid::from_samples(width, height, magnitude),
        angle: Grid::from_samples(width, height, angle),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EdgeClass {
    Suppressed,
    Weak,
    Strong,
}

/// Canny edge detector producing a 0/255 mask.
///
/// Uses L1 gradient magnitude, non-maximum suppression along the quantized
/// gradient direction, and 8-connected hysteresis between the two thresholds.
/// The thresholds are swapped when given in the wrong order.
pub fn canny(grid: &SampleGrid, low: f32, high: f32) -> SampleGrid {
    let (low, high) = if low > high { (high, low) } else { (low, high) };
    let width = grid.width();
    let height = grid.height();

    let Gradients { gx, gy } = sobel(grid, Border::Replicate);
    let magnitude: Grid<f32> = Grid::from_samples(
        width,
        height,
        gx.samples().iter().zip(gy.samples()).map(|(x, y)| x.abs() + y.abs()).collect(),
    );
    let mag = |x: isize, y: isize| magnitude.get_signed(x, y).unwrap_or(0.0);

    let mut classes = vec![EdgeClass::Suppressed; width * height];
    let mut stack = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let m = magnitude.get(x, y);
            if m <= low {
                continue;
            }

            let dx = gx.get(x, y);
            let dy = gy.get(x, y);
            let (ax, ay) = (dx.abs(), dy.abs());
            let tg22 = ax * TAN_22_5;
            let (xi, yi) = (x as isize, y as isize);

            let is_peak = if ay < tg22 {
                m > mag(xi - 1, yi) && m >= mag(xi + 1, yi)
            } else if ay > tg22 + 2.0 * ax {
                m > mag(xi, yi - 1) && m >= mag(xi, yi + 1)
            } else {
                let s = if (dx < 0.0) != (dy < 0.0) { -1 } else { 1 };
                m > mag(xi - s, yi - 1) && m > mag(xi + s, yi + 1)
            };

            if !is_peak {
                continue;
            }

            let idx = y * width + x;
            if m > high {
                classes[idx] = EdgeClass::Strong;
                stack.push((x, y));
            } else {
                classes[idx] = EdgeClass::Weak;
            }
        }
    }

    while let Some((x, y)) = stack.pop() {
        for ny in y.saturating_sub(1)..=(y + 1).min(height - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
                let idx = ny * width + nx;
                if classes[idx] == EdgeClass::Weak {
                    classes[idx] = EdgeClass::Strong;
                    stack.push((nx, ny));
                }
            }
        }
    }

    let mask = classes.iter().map(|c| if *c == EdgeClass::Strong { 255 } else { 0 }).collect();
    SampleGrid::from_samples(width, height, mask)
}

/// Dilation with a 2x2 structuring element anchored at its bottom-right tap.
pub fn dilate_2x2(mask: &SampleGrid) -> SampleGrid {
    let width = mask.width();
    let height = mask.height();
    let mut out = mask.clone();

    for y in 0..height {
        for x in 0..width {
            let mut peak = mask.get(x, y);
            if x > 0 {
                peak = peak.max(mask.get(x - 1, y));
            }
            if y > 0 {
                peak = peak.max(mask.get(x, y - 1));
                if x > 0 {
                    peak = peak.max(mask.get(x - 1, y - 1));
                }
            }
            out.set(x, y, peak);
        }
    }

    out
}

/// Blur, Canny and a single 2x2 dilation pass.
pub fn detect_edges(gray: &SampleGrid, low: f32, high: f32, blur_kernel: usize) -> SampleGrid {
    let blur_kernel = if blur_kernel % 2 == 0 { blur_kernel + 1 } else { blur_kernel };
    let blurred = gaussian_blur(gray, blur_kernel);
    let edges = canny(&blurred, low, high);
    debug!(
        "canny {low}/{high} (blur {blur_kernel}) marked {} of {} samples",
        edges.samples().iter().filter(|&&v| v == 255).count(),
        edges.samples().len()
    );
    dilate_2x2(&edges)
}
