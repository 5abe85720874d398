use std::path::Path;

use image::{DynamicImage, GenericImageView, GrayImage, ImageBuffer, Luma, LumaA, Rgb, RgbImage, Rgba};
use log::debug;

use crate::{AsciiError, Result};

/// Decoded raster image with 8 bits per channel and either 1 or 3 channels.
///
/// Alpha is flattened over a white background when the image is loaded, and
/// deeper bit depths are narrowed to 8 bits.
#[derive(Clone, Debug)]
pub struct RasterImage {
    image: DynamicImage,
}

impl RasterImage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let image = image::open(path.as_ref())?;
        debug!("decoded {} ({:?})", path.as_ref().display(), image.color());
        Self::from_dynamic(image)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?;
        Self::from_dynamic(image)
    }

    /// Wraps an already decoded row-major sample buffer with 1, 3 or 4 channels.
    pub fn from_raw(width: u32, height: u32, channels: u8, samples: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * channels as usize;
        if samples.len() != expected {
            return Err(AsciiError::MalformedBuffer(format!(
                "expected {expected} samples for {width}x{height}x{channels}, got {}",
                samples.len()
            )));
        }

        let image = match channels {
            1 => GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8),
            3 => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
            4 => ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, samples)
                .map(DynamicImage::ImageRgba8),
            _ => {
                return Err(AsciiError::MalformedBuffer(format!(
                    "unsupported channel count {channels}"
                )))
            },
        };

        let image = image.ok_or_else(|| {
            AsciiError::MalformedBuffer(format!("buffer does not fit {width}x{height}"))
        })?;
        Self::from_dynamic(image)
    }

    pub fn from_dynamic(image: DynamicImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(AsciiError::EmptyImage { width, height });
        }

        let color = image.color();
        let image = match image {
            ready @ (DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_)) => ready,
            other if color.has_alpha() && color.has_color() => {
                DynamicImage::ImageRgb8(flatten_rgba(&other.to_rgba8()))
            },
            other if color.has_alpha() => {
                DynamicImage::ImageLuma8(flatten_luma_alpha(&other.to_luma_alpha8()))
            },
            other if color.has_color() => DynamicImage::ImageRgb8(other.to_rgb8()),
            other => DynamicImage::ImageLuma8(other.to_luma8()),
        };

        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn channels(&self) -> u8 {
        self.image.color().channel_count()
    }

    pub(crate) fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }
}

#[inline]
fn over_white(value: u8, alpha: u8) -> u8 {
    let value = u32::from(value);
    let alpha = u32::from(alpha);
    ((value * alpha + 255 * (255 - alpha) + 127) / 255) as u8
}

fn flatten_rgba(image: &ImageBuffer<Rgba<u8>, Vec<u8>>) -> RgbImage {
    let mut out = RgbImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        out.put_pixel(x, y, Rgb([over_white(r, a), over_white(g, a), over_white(b, a)]));
    }
    out
}

fn flatten_luma_alpha(image: &ImageBuffer<LumaA<u8>, Vec<u8>>) -> GrayImage {
    let mut out = GrayImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        let [l, a] = pixel.0;
        out.put_pixel(x, y, Luma([over_white(l, a)]));
    }
    out
}
