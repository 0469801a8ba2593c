use crate::path::expand_tilde;
use crate::pixbuf::{PixelBuffer, RawImage};
use crate::xpm::{XpmError, decode_xpm};
use resvg::tiny_skia;
use resvg::usvg;
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Errors produced while turning a file (or a produced buffer) into pixels.
///
/// The `Display` output is the diagnostic message of the underlying image library.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("could not read icon file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("could not parse SVG: {0}")]
    Svg(#[from] usvg::Error),
    #[error("could not parse XPM: {0}")]
    Xpm(#[from] XpmError),
    #[error("unrecognized image format")]
    UnknownFormat,
    #[error("image has no pixels")]
    EmptyImage,
    #[error("could not import surface: {0}")]
    Surface(String),
}

/// Image formats icons may be stored as.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FileType {
    Svg,
    Png,
    Xpm,
    /// Any other raster format the `image` crate decodes natively (JPEG, GIF, BMP, ICO, ...).
    Raster,
}

impl FileType {
    /// Get a `FileType` from the file extension of some path.
    pub fn from_path_ext(path: &Path) -> Option<Self> {
        let ext = path.extension()?;
        let ext = ext.to_str()?;

        if ext.eq_ignore_ascii_case("svg") || ext.eq_ignore_ascii_case("svgz") {
            Some(FileType::Svg)
        } else if ext.eq_ignore_ascii_case("png") {
            Some(FileType::Png)
        } else if ext.eq_ignore_ascii_case("xpm") {
            Some(FileType::Xpm)
        } else if image::ImageFormat::from_extension(ext).is_some() {
            Some(FileType::Raster)
        } else {
            None
        }
    }

    /// Guess a `FileType` from the first bytes of a file.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if let Ok(format) = image::guess_format(bytes) {
            return Some(match format {
                image::ImageFormat::Png => FileType::Png,
                _ => FileType::Raster,
            });
        }

        let head = &bytes[..bytes.len().min(1024)];
        let text = String::from_utf8_lossy(head);
        let text = text.trim_start_matches('\u{feff}').trim_start();

        if text.starts_with("/* XPM */") {
            Some(FileType::Xpm)
        } else if text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
        {
            Some(FileType::Svg)
        } else if head.starts_with(&[0x1f, 0x8b]) {
            // gzip: usvg transparently inflates svgz
            Some(FileType::Svg)
        } else {
            None
        }
    }

    /// The extension implies the format; files without a known extension are sniffed.
    pub fn detect(path: &Path, bytes: &[u8]) -> Option<Self> {
        Self::from_path_ext(path).or_else(|| Self::sniff(bytes))
    }

    /// Provides the canonical, lowercase file extension of this `FileType`.
    ///
    /// `Raster` has no single extension and maps to an empty string.
    pub fn ext(&self) -> &str {
        match self {
            FileType::Svg => "svg",
            FileType::Png => "png",
            FileType::Xpm => "xpm",
            FileType::Raster => "",
        }
    }

    /// File types tried, in order, when searching directories for a bare icon name.
    pub const fn search_order() -> [FileType; 3] {
        [FileType::Svg, FileType::Png, FileType::Xpm]
    }
}

impl Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ext())
    }
}

/// Loads and decodes the image at `path`.
///
/// A leading `~` is expanded to the home directory first. SVG, PNG and XPM are supported, along
/// with every other raster format the `image` crate decodes. The buffer has an alpha channel if
/// the source has one.
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<PixelBuffer, DecodeError> {
    let path = path.as_ref();
    let path = path
        .to_str()
        .map(expand_tilde)
        .unwrap_or_else(|| path.to_path_buf());

    let bytes = std::fs::read(&path)?;

    let buffer = match FileType::detect(&path, &bytes).ok_or(DecodeError::UnknownFormat)? {
        FileType::Svg => decode_svg(&bytes, &path)?,
        FileType::Xpm => decode_xpm(&bytes)?,
        FileType::Png | FileType::Raster => PixelBuffer::from_dynamic(image::load_from_memory(&bytes)?),
    };

    if buffer.width() == 0 || buffer.height() == 0 {
        return Err(DecodeError::EmptyImage);
    }

    Ok(buffer)
}

// Rasterizes at the document's natural size.
fn decode_svg(bytes: &[u8], path: &Path) -> Result<PixelBuffer, DecodeError> {
    let options = usvg::Options {
        resources_dir: path.parent().map(PathBuf::from),
        ..usvg::Options::default()
    };

    let tree = usvg::Tree::from_data(bytes, &options)?;
    let size = tree.size().to_int_size();

    let mut pixmap =
        tiny_skia::Pixmap::new(size.width(), size.height()).ok_or(DecodeError::EmptyImage)?;
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    // tiny-skia stores premultiplied RGBA, pixel buffers are straight
    let data = pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| {
            let color = pixel.demultiply();
            [color.red(), color.green(), color.blue(), color.alpha()]
        })
        .collect();

    PixelBuffer::from_rgba(pixmap.width(), pixmap.height(), data).ok_or(DecodeError::EmptyImage)
}

/// Builds a [PixelBuffer] from pixel data handed over inline, copying it so the result owns its
/// pixels independently of `raw`.
///
/// Rows are read `rowstride` bytes apart and packed tightly. 16-bit samples keep their most
/// significant byte. The caller guarantees `raw.data` holds `rowstride * height` bytes; if it
/// does not, the missing tail is zero-filled rather than read out of bounds.
pub fn decode_raw(raw: &RawImage) -> PixelBuffer {
    let width = raw.width.max(0) as usize;
    let height = raw.height.max(0) as usize;
    let channels = raw.channels();
    let bytes_per_sample = if raw.bits_per_sample == 16 { 2 } else { 1 };

    let row_len = width * channels * bytes_per_sample;
    let stride = (raw.rowstride.max(0) as usize).max(row_len);

    let mut packed = Vec::with_capacity(raw.data.len());

    for y in 0..height {
        let row = raw.data.get(y * stride..).unwrap_or(&[]);
        let row = &row[..row.len().min(row_len)];

        if bytes_per_sample == 2 {
            packed.extend(
                row.chunks_exact(2)
                    .map(|sample| (u16::from_ne_bytes([sample[0], sample[1]]) >> 8) as u8),
            );
        } else {
            packed.extend_from_slice(row);
        }
    }

    PixelBuffer::from_packed(width as u32, height as u32, raw.has_alpha, &packed)
}

#[cfg(test)]
mod test {
    use crate::decode::{DecodeError, FileType, decode_file, decode_raw};
    use crate::pixbuf::RawImage;
    use std::error::Error;
    use std::path::{Path, PathBuf};

    static PROJ_ROOT: &'static str = env!("CARGO_MANIFEST_DIR");

    fn resource(name: &str) -> PathBuf {
        PathBuf::from(PROJ_ROOT).join("resources/test_icons").join(name)
    }

    #[test]
    fn test_file_type_from_extension() {
        assert_eq!(FileType::from_path_ext(Path::new("a.SVG")), Some(FileType::Svg));
        assert_eq!(FileType::from_path_ext(Path::new("a.svgz")), Some(FileType::Svg));
        assert_eq!(FileType::from_path_ext(Path::new("a.png")), Some(FileType::Png));
        assert_eq!(FileType::from_path_ext(Path::new("a.xpm")), Some(FileType::Xpm));
        assert_eq!(FileType::from_path_ext(Path::new("a.jpg")), Some(FileType::Raster));
        assert_eq!(FileType::from_path_ext(Path::new("a.txt")), None);
        assert_eq!(FileType::from_path_ext(Path::new("bell")), None);
    }

    #[test]
    fn test_sniff() {
        assert_eq!(FileType::sniff(b"\x89PNG\r\n\x1a\n...."), Some(FileType::Png));
        assert_eq!(FileType::sniff(b"/* XPM */\nstatic"), Some(FileType::Xpm));
        assert_eq!(FileType::sniff(b"  <svg xmlns=\"\"/>"), Some(FileType::Svg));
        assert_eq!(
            FileType::sniff(b"<?xml version=\"1.0\"?>\n<svg/>"),
            Some(FileType::Svg)
        );
        assert_eq!(FileType::sniff(b"hello"), None);
    }

    #[test]
    fn test_decode_svg() -> Result<(), Box<dyn Error>> {
        let buffer = decode_file(resource("circle.svg"))?;

        assert_eq!(buffer.dimensions(), (24, 16), "rendered at natural size");
        assert!(buffer.has_alpha());

        // the circle's center is opaque blue, the corner is transparent
        let center = (8 * 24 + 12) * 4;
        assert_eq!(&buffer.data()[center..center + 4], &[0, 0, 255, 255]);
        assert_eq!(buffer.data()[3], 0);

        Ok(())
    }

    #[test]
    fn test_decode_xpm_file() -> Result<(), Box<dyn Error>> {
        let buffer = decode_file(resource("dot.xpm"))?;

        assert_eq!(buffer.dimensions(), (4, 4));
        assert!(buffer.has_alpha());

        Ok(())
    }

    #[test]
    fn test_decode_png_file() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("square.png");
        image::RgbImage::from_pixel(5, 3, image::Rgb([1, 2, 3])).save(&path)?;

        let buffer = decode_file(&path)?;

        assert_eq!(buffer.dimensions(), (5, 3));
        assert_eq!(buffer.channels(), 3);
        assert_eq!(&buffer.data()[..3], &[1, 2, 3]);

        Ok(())
    }

    #[test]
    fn test_decode_sniffs_missing_extension() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("no-extension");
        std::fs::copy(resource("dot.xpm"), &path)?;

        assert_eq!(decode_file(&path)?.dimensions(), (4, 4));

        Ok(())
    }

    #[test]
    fn test_decode_failures() {
        assert!(matches!(
            decode_file(resource("does-not-exist.png")),
            Err(DecodeError::Io(_))
        ));
        assert!(matches!(
            decode_file(resource("corrupt.png")),
            Err(DecodeError::Image(_))
        ));
        assert!(matches!(
            decode_file(resource("broken.svg")),
            Err(DecodeError::Svg(_))
        ));
    }

    #[test]
    fn test_decode_raw_rgb_with_padding() {
        // 2x2 RGB, rows padded to 8 bytes
        let raw = RawImage {
            width: 2,
            height: 2,
            rowstride: 8,
            bits_per_sample: 8,
            has_alpha: false,
            data: vec![
                1, 2, 3, 4, 5, 6, 0, 0, //
                7, 8, 9, 10, 11, 12, 0, 0,
            ],
        };

        let buffer = decode_raw(&raw);

        assert_eq!(buffer.dimensions(), (2, 2));
        assert_eq!(buffer.channels(), 3);
        assert_eq!(buffer.data(), &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn test_decode_raw_rgba() {
        let raw = RawImage {
            width: 1,
            height: 2,
            rowstride: 4,
            bits_per_sample: 8,
            has_alpha: true,
            data: vec![10, 20, 30, 40, 50, 60, 70, 80],
        };

        let buffer = decode_raw(&raw);

        assert_eq!(buffer.dimensions(), (1, 2));
        assert!(buffer.has_alpha());
        assert_eq!(buffer.data(), raw.data.as_slice());
    }

    #[test]
    fn test_decode_raw_dimensions_always_match() {
        for (width, height, has_alpha) in [(1, 1, false), (7, 3, true), (3, 7, false), (0, 4, true)]
        {
            let channels = if has_alpha { 4 } else { 3 };
            let rowstride = width * channels + 3;
            let raw = RawImage {
                width,
                height,
                rowstride,
                bits_per_sample: 8,
                has_alpha,
                data: vec![0x7f; (rowstride * height) as usize],
            };

            let buffer = decode_raw(&raw);
            assert_eq!(buffer.dimensions(), (width as u32, height as u32));
        }
    }

    #[test]
    fn test_decode_raw_sixteen_bit() {
        let sample = |v: u16| v.to_ne_bytes();
        let data = [sample(0xff00), sample(0x8000), sample(0x0100)].concat();

        let raw = RawImage {
            width: 1,
            height: 1,
            rowstride: 6,
            bits_per_sample: 16,
            has_alpha: false,
            data,
        };

        assert_eq!(decode_raw(&raw).data(), &[0xff, 0x80, 0x01]);
    }

    #[test]
    fn test_decode_raw_short_data_does_not_panic() {
        let raw = RawImage {
            width: 2,
            height: 2,
            rowstride: 6,
            bits_per_sample: 8,
            has_alpha: false,
            data: vec![9; 7],
        };

        let buffer = decode_raw(&raw);
        assert_eq!(buffer.data(), &[9, 9, 9, 9, 9, 9, 9, 0, 0, 0, 0, 0]);
    }
}
