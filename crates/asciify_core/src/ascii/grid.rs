use std::fmt;

/// Rendered glyphs, `height` rows of `width` characters each.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphGrid {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<char>,
}

impl GlyphGrid {
    pub fn new(width: usize, height: usize, cells: Vec<char>) -> Self {
        assert_eq!(width * height, cells.len());
        Self { width, height, cells }
    }

    pub fn from_rows<I, R>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = char>,
    {
        let mut cells = Vec::new();
        let mut width = 0;
        let mut height = 0;
        for row in rows {
            let before = cells.len();
            cells.extend(row);
            let row_width = cells.len() - before;
            if height == 0 {
                width = row_width;
            }
            assert_eq!(row_width, width, "glyph rows must share one width");
            height += 1;
        }
        Self { width, height, cells }
    }

    pub fn get(&self, x: usize, y: usize) -> char {
        self.cells[y * self.width + x]
    }

    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        let width = self.width.max(1);
        self.cells.chunks(width).map(|row| row.iter().collect::<String>())
    }
}

/// Rows joined by `\n`, without a trailing newline.
impl fmt::Display for GlyphGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, row) in self.rows().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            f.write_str(&row)?;
        }
        Ok(())
    }
}
