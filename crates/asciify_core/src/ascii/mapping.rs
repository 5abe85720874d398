use super::{grid::GlyphGrid, ramp::GlyphRamp};
use crate::image_pipeline::samples::{Grid, SampleGrid, ToneField};

/// Turns intensity grids into glyph grids through one ramp.
pub struct GlyphMapper<'a> {
    ramp: &'a GlyphRamp,
}

impl<'a> GlyphMapper<'a> {
    pub fn new(ramp: &'a GlyphRamp) -> Self {
        Self { ramp }
    }

    pub fn map_intensity(&self, samples: &SampleGrid, invert: bool) -> GlyphGrid {
        let cells = samples.samples().iter().map(|&v| self.ramp.map(v, invert)).collect();
        GlyphGrid::new(samples.width(), samples.height(), cells)
    }

    /// Maps floating-point tones (already in `[0, 255]`) without rounding them first.
    pub fn map_tones(&self, tones: &ToneField) -> GlyphGrid {
        let cells = tones.samples().iter().map(|&v| self.ramp.glyph(v)).collect();
        GlyphGrid::new(tones.width(), tones.height(), cells)
    }
}

/// `on` wherever the mask is above 128, `off` elsewhere.
pub fn map_mask(mask: &SampleGrid, on: char, off: char) -> GlyphGrid {
    let cells = mask.samples().iter().map(|&v| if v > 128 { on } else { off }).collect();
    GlyphGrid::new(mask.width(), mask.height(), cells)
}

/// Picks a glyph per sample from `f(x, y)`.
pub fn map_with<T: Copy>(grid: &Grid<T>, mut f: impl FnMut(usize, usize) -> char) -> GlyphGrid {
    let mut cells = Vec::with_capacity(grid.width() * grid.height());
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            cells.push(f(x, y));
        }
    }
    GlyphGrid::new(grid.width(), grid.height(), cells)
}

/// Line glyph drawn across a gradient pointing at `angle` degrees.
///
/// Gradients are orientation symmetric, so the angle is folded into
/// `[0, 180)` first. Bucket boundaries belong to the upper bucket.
pub fn orientation_glyph(angle: f32) -> char {
    let angle = angle.rem_euclid(180.0);
    if angle < 22.5 || angle >= 157.5 {
        '|'
    } else if angle < 67.5 {
        '/'
    } else if angle < 112.5 {
        '-'
    } else {
        '\\'
    }
}

/// Heavier stand-in used for strong gradients.
pub fn bold_glyph(glyph: char) -> char {
    match glyph {
        '|' => '#',
        '-' => '=',
        '/' | '\\' => '%',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_buckets() {
        assert_eq!(orientation_glyph(0.0), '|');
        assert_eq!(orientation_glyph(45.0), '/');
        assert_eq!(orientation_glyph(90.0), '-');
        assert_eq!(orientation_glyph(135.0), '\\');
        assert_eq!(orientation_glyph(170.0), '|');
        assert_eq!(orientation_glyph(-90.0), '-');
        assert_eq!(orientation_glyph(180.0), '|');
    }

    #[test]
    fn boundaries_resolve_upward() {
        assert_eq!(orientation_glyph(22.5), '/');
        assert_eq!(orientation_glyph(67.5), '-');
        assert_eq!(orientation_glyph(112.5), '\\');
        assert_eq!(orientation_glyph(157.5), '|');
    }

    #[test]
    fn bold_table() {
        assert_eq!(bold_glyph('|'), '#');
        assert_eq!(bold_glyph('-'), '=');
        assert_eq!(bold_glyph('/'), '%');
        assert_eq!(bold_glyph('\\'), '%');
        assert_eq!(bold_glyph(' '), ' ');
    }

    #[test]
    fn mask_threshold_is_exclusive() {
        let mask = SampleGrid::from_samples(3, 1, vec![0, 128, 255]);
        assert_eq!(map_mask(&mask, '#', ' ').to_string(), "  #");
    }

    #[test]
    fn intensity_mapping_honours_invert() {
        let ramp = GlyphRamp::detailed();
        let mapper = GlyphMapper::new(&ramp);
        let samples = SampleGrid::from_samples(2, 1, vec![0, 255]);
        assert_eq!(mapper.map_intensity(&samples, false).to_string(), "@ ");
        assert_eq!(mapper.map_intensity(&samples, true).to_string(), " @");
    }
}
