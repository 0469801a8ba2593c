use image::{DynamicImage, GenericImageView, ImageBuffer, Pixel, Rgb, RgbImage, Rgba, RgbaImage};

/// Pixel data handed over inline by a notification, as produced by upstream protocol decoding.
///
/// The layout follows the freedesktop notification `image-data` hint: RGB(A) rows of
/// `rowstride` bytes each, `bits_per_sample` bits per channel.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RawImage {
    pub width: i32,
    pub height: i32,
    /// Distance in bytes between the starts of two consecutive rows.
    pub rowstride: i32,
    pub bits_per_sample: i32,
    pub has_alpha: bool,
    /// At least `rowstride * height` bytes of pixel rows.
    pub data: Vec<u8>,
}

impl RawImage {
    /// Number of channels per pixel: 4 with alpha, 3 without.
    pub fn channels(&self) -> usize {
        if self.has_alpha { 4 } else { 3 }
    }
}

/// A decoded, uncompressed image with 8-bit RGB or RGBA pixels packed row by row.
///
/// Every `PixelBuffer` owns its pixels; transforming stages consume one buffer and produce another.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    // invariant: always `ImageRgb8` or `ImageRgba8`
    image: DynamicImage,
}

impl PixelBuffer {
    /// Wraps tightly packed RGBA8 pixels. Returns `None` if `data` is not `width * height * 4` bytes.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let buffer = ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, data)?;

        Some(Self {
            image: DynamicImage::ImageRgba8(buffer),
        })
    }

    /// Wraps tightly packed RGB8 pixels. Returns `None` if `data` is not `width * height * 3` bytes.
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let buffer = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, data)?;

        Some(Self {
            image: DynamicImage::ImageRgb8(buffer),
        })
    }

    /// Copies `data` into a new `width`x`height` buffer, zero-filling whatever `data` does not
    /// cover and ignoring any excess.
    pub(crate) fn from_packed(width: u32, height: u32, has_alpha: bool, data: &[u8]) -> Self {
        fn fill<P>(mut buffer: ImageBuffer<P, Vec<u8>>, data: &[u8]) -> ImageBuffer<P, Vec<u8>>
        where
            P: Pixel<Subpixel = u8>,
        {
            let len = buffer.len().min(data.len());
            (*buffer)[..len].copy_from_slice(&data[..len]);
            buffer
        }

        let image = if has_alpha {
            DynamicImage::ImageRgba8(fill(RgbaImage::new(width, height), data))
        } else {
            DynamicImage::ImageRgb8(fill(RgbImage::new(width, height), data))
        };

        Self { image }
    }

    /// Normalizes any decoded image to 8-bit RGB, or RGBA if the source carries alpha.
    pub(crate) fn from_dynamic(image: DynamicImage) -> Self {
        let image = match image {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => image,
            other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        };

        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// 3 for RGB, 4 for RGBA.
    pub fn channels(&self) -> u8 {
        self.image.color().channel_count()
    }

    pub fn has_alpha(&self) -> bool {
        self.image.color().has_alpha()
    }

    /// Bytes per row. Rows are tightly packed, so this is always `width * channels`.
    pub fn rowstride(&self) -> usize {
        self.width() as usize * self.channels() as usize
    }

    /// The packed pixel bytes.
    pub fn data(&self) -> &[u8] {
        self.image.as_bytes()
    }

    pub(crate) fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }
}
