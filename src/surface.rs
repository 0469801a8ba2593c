use crate::decode::DecodeError;
use crate::pixbuf::PixelBuffer;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use tiny_skia::{ColorU8, IntSize, Pixmap};

/// A renderable image: premultiplied RGBA8 pixels in a [tiny_skia::Pixmap], ready to be drawn
/// by a compositor.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSurface {
    pixmap: Pixmap,
}

impl RenderSurface {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Premultiplied RGBA8 pixel data.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }
}

/// Converts a pixel buffer into a [RenderSurface] by encoding it as PNG in memory and importing
/// that stream through tiny-skia's own PNG reader.
///
/// The round trip is lossless for 8-bit RGB and RGBA. It yields the same pixels as
/// [to_surface_direct].
pub fn to_surface(buffer: PixelBuffer) -> Result<RenderSurface, DecodeError> {
    let (width, height) = buffer.dimensions();

    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(
        buffer.data(),
        width,
        height,
        buffer.as_dynamic().color().into(),
    )?;
    drop(buffer);

    let pixmap = Pixmap::decode_png(&png).map_err(|e| DecodeError::Surface(e.to_string()))?;

    Ok(RenderSurface { pixmap })
}

/// Converts a pixel buffer into a [RenderSurface] by premultiplying its pixels in place of the
/// PNG round trip.
///
/// Returns `None` for zero-sized buffers, which no surface can hold.
pub fn to_surface_direct(buffer: &PixelBuffer) -> Option<RenderSurface> {
    let size = IntSize::from_wh(buffer.width(), buffer.height())?;
    let channels = buffer.channels() as usize;

    let data = buffer
        .data()
        .chunks_exact(channels)
        .flat_map(|px| {
            let alpha = px.get(3).copied().unwrap_or(u8::MAX);
            let color = ColorU8::from_rgba(px[0], px[1], px[2], alpha).premultiply();
            [color.red(), color.green(), color.blue(), color.alpha()]
        })
        .collect();

    let pixmap = Pixmap::from_vec(data, size)?;

    Some(RenderSurface { pixmap })
}
