//! Block shading, half blocks and Braille packing.
//!
//! Half-block and Braille modes treat dark samples as "on".

use super::{grid::GlyphGrid, ramp::GlyphRamp};
use crate::image_pipeline::samples::{Grid, SampleGrid};

/// Empty Braille pattern (U+2800).
pub const BRAILLE_BASE: u32 = 0x2800;

/// Dot bit for each sub-position, indexed `[x][y]` within the 2x4 cell.
///
/// ```text
/// 0x01  0x08
/// 0x02  0x10
/// 0x04  0x20
/// 0x40  0x80
/// ```
pub const BRAILLE_DOTS: [[u8; 4]; 2] = [[0x01, 0x02, 0x04, 0x40], [0x08, 0x10, 0x20, 0x80]];

/// Cutoff used by half blocks: samples below it are "on".
pub const HALF_BLOCK_THRESHOLD: u8 = 128;

const HALF_EMPTY: char = ' ';
const HALF_LOWER: char = '▄';
const HALF_UPPER: char = '▀';
const HALF_FULL: char = '█';

/// One shading block per sample, darker samples get denser blocks.
pub fn shade_blocks(samples: &SampleGrid) -> GlyphGrid {
    let ramp = GlyphRamp::block_shades();
    let cells = samples.samples().iter().map(|&v| ramp.map(v, true)).collect();
    GlyphGrid::new(samples.width(), samples.height(), cells)
}

/// Packs vertical sample pairs into half-block glyphs.
///
/// A trailing odd row is dropped; callers size the grid to an even height.
pub fn half_blocks(samples: &SampleGrid) -> GlyphGrid {
    let width = samples.width();
    let height = samples.height() / 2;
    let mut cells = Vec::with_capacity(width * height);

    for row in 0..height {
        for x in 0..width {
            let top = samples.get(x, row * 2) < HALF_BLOCK_THRESHOLD;
            let bottom = samples.get(x, row * 2 + 1) < HALF_BLOCK_THRESHOLD;
            cells.push(match (top, bottom) {
                (true, true) => HALF_FULL,
                (true, false) => HALF_UPPER,
                (false, true) => HALF_LOWER,
                (false, false) => HALF_EMPTY,
            });
        }
    }

    GlyphGrid::new(width, height, cells)
}

/// Braille character for a 2x4 dot cell, `dots[x][y]`.
pub fn braille_glyph(dots: [[bool; 4]; 2]) -> char {
    let mut code = 0u32;
    for (x, column) in dots.iter().enumerate() {
        for (y, &on) in column.iter().enumerate() {
            if on {
                code |= u32::from(BRAILLE_DOTS[x][y]);
            }
        }
    }
    char::from_u32(BRAILLE_BASE + code).unwrap_or('\u{2800}')
}

/// Packs a dot grid into Braille cells.
///
/// Partial cells at the right and bottom edges are kept; their missing dots
/// are off.
pub fn pack_braille(dots: &Grid<bool>) -> GlyphGrid {
    let columns = dots.width().div_ceil(2);
    let rows = dots.height().div_ceil(4);
    let mut cells = Vec::with_capacity(columns * rows);

    for cy in 0..rows {
        for cx in 0..columns {
            let mut cell = [[false; 4]; 2];
            for (dx, column) in cell.iter_mut().enumerate() {
                for (dy, dot) in column.iter_mut().enumerate() {
                    let x = (cx * 2 + dx) as isize;
                    let y = (cy * 4 + dy) as isize;
                    *dot = dots.get_signed(x, y).unwrap_or(false);
                }
            }
            cells.push(braille_glyph(cell));
        }
    }

    GlyphGrid::new(columns, rows, cells)
}

/// Thresholds samples (dark is on) and packs them into Braille.
pub fn braille(samples: &SampleGrid, threshold: u8) -> GlyphGrid {
    pack_braille(&samples.map(|v| v < threshold))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_and_empty_cells() {
        assert_eq!(braille_glyph([[true; 4]; 2]), '\u{28FF}');
        assert_eq!(braille_glyph([[false; 4]; 2]), '\u{2800}');
    }

    #[test]
    fn single_dot_positions() {
        let cases = [
            ((0, 0), 0x01),
            ((1, 0), 0x08),
            ((0, 1), 0x02),
            ((1, 1), 0x10),
            ((0, 2), 0x04),
            ((1, 2), 0x20),
            ((0, 3), 0x40),
            ((1, 3), 0x80),
        ];
        for ((x, y), bit) in cases {
            let mut dots = [[false; 4]; 2];
            dots[x][y] = true;
            assert_eq!(braille_glyph(dots) as u32, BRAILLE_BASE + bit, "dot ({x}, {y})");
        }
    }

    #[test]
    fn dark_samples_raise_dots() {
        let black = SampleGrid::filled(2, 4, 0);
        assert_eq!(braille(&black, 128).to_string(), "\u{28FF}");
        let white = SampleGrid::filled(2, 4, 255);
        assert_eq!(braille(&white, 128).to_string(), "\u{2800}");
    }

    #[test]
    fn partial_cells_pad_with_off_dots() {
        let dots = Grid::filled(3, 5, true);
        let grid = pack_braille(&dots);
        assert_eq!((grid.width, grid.height), (2, 2));
        assert_eq!(grid.get(0, 0), '\u{28FF}');
        // Left column only, all four rows.
        assert_eq!(grid.get(1, 0) as u32, BRAILLE_BASE + 0x47);
        // Top row only, both columns.
        assert_eq!(grid.get(0, 1) as u32, BRAILLE_BASE + 0x09);
        assert_eq!(grid.get(1, 1) as u32, BRAILLE_BASE + 0x01);
    }

    #[test]
    fn half_block_pairs() {
        let samples = SampleGrid::from_samples(4, 2, vec![0, 0, 255, 255, 0, 255, 0, 255]);
        assert_eq!(half_blocks(&samples).to_string(), "█▀▄ ");
    }

    #[test]
    fn shading_is_inverted() {
        let samples = SampleGrid::from_samples(3, 1, vec![0, 128, 255]);
        assert_eq!(shade_blocks(&samples).to_string(), "█▒ ");
    }
}
