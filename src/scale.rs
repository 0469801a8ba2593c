use crate::pixbuf::PixelBuffer;
use fast_image_resize as fr;
use image::imageops::FilterType;

/// Computes the size `width`x`height` shrinks to so that its larger side is at most
/// `max_dimension`, preserving the aspect ratio.
///
/// Returns `None` when no scaling is needed: `max_dimension` is 0 (unlimited), the image already
/// fits, or the image is degenerate (zero-sized). The smaller side never drops below one pixel.
pub fn scaled_size(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    if max_dimension == 0 || width == 0 || height == 0 || width.max(height) <= max_dimension {
        return None;
    }

    let max = u64::from(max_dimension);
    let (width, height) = (u64::from(width), u64::from(height));

    let (scaled_w, scaled_h) = if width >= height {
        (max, max * height / width)
    } else {
        (max * width / height, max)
    };

    // both are at most `max_dimension`, so they fit back into a u32
    Some((scaled_w.max(1) as u32, scaled_h.max(1) as u32))
}

/// Shrinks `buffer` so its larger side is at most `max_dimension`, using a bilinear filter.
///
/// The buffer is returned unchanged if it already fits or `max_dimension` is 0.
pub fn scale_to_limit(buffer: PixelBuffer, max_dimension: u32) -> PixelBuffer {
    let Some((width, height)) = scaled_size(buffer.width(), buffer.height(), max_dimension) else {
        return buffer;
    };

    #[cfg(feature = "log")]
    log::debug!(
        "scaling icon from {}x{} to {width}x{height}",
        buffer.width(),
        buffer.height()
    );

    match resize_with_fast_image_resize(&buffer, width, height) {
        Ok(scaled) => scaled,
        Err(_e) => {
            #[cfg(feature = "log")]
            log::debug!("fast_image_resize failed, falling back to image::resize_exact: {_e}");

            let scaled = buffer
                .as_dynamic()
                .resize_exact(width, height, FilterType::Triangle);
            PixelBuffer::from_dynamic(scaled)
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum ResizeError {
    #[error("invalid source buffer: {0}")]
    Buffer(#[from] fr::ImageBufferError),
    #[error("resize failed: {0}")]
    Resize(#[from] fr::ResizeError),
    #[error("resized buffer has an unexpected length")]
    Length,
}

fn resize_with_fast_image_resize(
    buffer: &PixelBuffer,
    width: u32,
    height: u32,
) -> Result<PixelBuffer, ResizeError> {
    let pixel_type = if buffer.has_alpha() {
        fr::PixelType::U8x4
    } else {
        fr::PixelType::U8x3
    };

    let src = fr::images::ImageRef::new(buffer.width(), buffer.height(), buffer.data(), pixel_type)?;
    let mut dst = fr::images::Image::new(width, height, pixel_type);

    let options = fr::ResizeOptions::new()
        .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Bilinear));

    fr::Resizer::new().resize(&src, &mut dst, Some(&options))?;

    let scaled = if buffer.has_alpha() {
        PixelBuffer::from_rgba(width, height, dst.into_vec())
    } else {
        PixelBuffer::from_rgb(width, height, dst.into_vec())
    };

    scaled.ok_or(ResizeError::Length)
}
