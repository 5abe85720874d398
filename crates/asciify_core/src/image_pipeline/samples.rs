/// Row-major 2-D buffer of single-channel samples.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    samples: Vec<T>,
}

/// 8-bit intensity grid produced by the sampler and luma extractor.
pub type SampleGrid = Grid<u8>;

/// Floating-point intensity grid used while dithering.
pub type ToneField = Grid<f64>;

impl<T: Copy> Grid<T> {
    pub fn from_samples(width: usize, height: usize, samples: Vec<T>) -> Self {
        assert_eq!(width * height, samples.len(), "sample count must match grid dimensions");
        Self { width, height, samples }
    }

    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self { width, height, samples: vec![value; width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[T] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [T] {
        &mut self.samples
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.samples[y * self.width + x]
    }

    /// Returns `None` for coordinates outside the grid, including negative ones.
    #[inline]
    pub fn get_signed(&self, x: isize, y: isize) -> Option<T> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        (x < self.width && y < self.height).then(|| self.get(x, y))
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        self.samples[y * self.width + x] = value;
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        self.samples.chunks(self.width.max(1))
    }

    pub fn map<U: Copy>(&self, f: impl FnMut(T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            samples: self.samples.iter().copied().map(f).collect(),
        }
    }
}

impl SampleGrid {
    pub fn to_field(&self) -> ToneField {
        self.map(f64::from)
    }

    /// Flips every sample (`255 - v`).
    pub fn inverted(&self) -> SampleGrid {
        self.map(|v| 255 - v)
    }
}

impl ToneField {
    pub fn clamp_in_place(&mut self) {
        for value in &mut self.samples {
            *value = value.clamp(0.0, 255.0);
        }
    }
}
