//! Decoder for XPM3 pixmaps, the C-source image format still common among legacy icons.
//!
//! Only the parts relevant to icons are supported: the values line, the color table and the
//! pixel rows. Extensions and hotspots are ignored.

use crate::pixbuf::PixelBuffer;
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum XpmError {
    #[error("missing or malformed XPM values line")]
    MalformedHeader,
    #[error("malformed XPM color entry `{0}`")]
    MalformedColor(String),
    #[error("unsupported XPM color `{0}`")]
    UnknownColor(String),
    #[error("XPM pixel row {row} uses undefined color key")]
    UnknownPixel { row: usize },
    #[error("XPM data ends before all {expected} pixel rows")]
    Truncated { expected: usize },
    #[error("XPM pixel row {row} is shorter than its declared width")]
    ShortRow { row: usize },
}

type Color = [u8; 4];

const TRANSPARENT: Color = [0, 0, 0, 0];

/// Decodes an XPM document into a [PixelBuffer].
///
/// The result carries an alpha channel only if the color table contains a transparent (`None`)
/// entry.
pub(crate) fn decode_xpm(source: &[u8]) -> Result<PixelBuffer, XpmError> {
    let mut strings = quoted_strings(source).into_iter();

    let values = strings.next().ok_or(XpmError::MalformedHeader)?;
    let (width, height, num_colors, chars_per_pixel) = parse_values(values)?;
    let row_len = width
        .checked_mul(chars_per_pixel)
        .ok_or(XpmError::MalformedHeader)?;

    // header values are untrusted: collections grow with the entries actually present
    let mut palette: HashMap<&[u8], Color> = HashMap::new();
    for _ in 0..num_colors {
        let entry = strings.next().ok_or(XpmError::MalformedHeader)?;
        if entry.len() < chars_per_pixel {
            return Err(XpmError::MalformedColor(lossy(entry)));
        }

        let (key, spec) = entry.split_at(chars_per_pixel);
        palette.insert(key, parse_color_entry(spec)?);
    }

    let mut pixels = Vec::new();
    for row in 0..height {
        let line = strings
            .next()
            .ok_or(XpmError::Truncated { expected: height })?;
        if line.len() < row_len {
            return Err(XpmError::ShortRow { row });
        }

        for key in line.chunks_exact(chars_per_pixel).take(width) {
            let color = palette.get(key).ok_or(XpmError::UnknownPixel { row })?;
            pixels.push(*color);
        }
    }

    // parse_values checked both fit in a u32
    let (width, height) = (width as u32, height as u32);
    let buffer = if pixels.iter().any(|px| px[3] != u8::MAX) {
        PixelBuffer::from_rgba(width, height, pixels.concat())
    } else {
        let rgb = pixels.iter().flat_map(|px| [px[0], px[1], px[2]]).collect();
        PixelBuffer::from_rgb(width, height, rgb)
    };

    // lengths were built from the same width and height
    buffer.ok_or(XpmError::MalformedHeader)
}

fn parse_values(values: &[u8]) -> Result<(usize, usize, usize, usize), XpmError> {
    let values = std::str::from_utf8(values).map_err(|_| XpmError::MalformedHeader)?;
    let mut numbers = values.split_ascii_whitespace().map(str::parse::<usize>);

    let mut next = || -> Result<usize, XpmError> {
        numbers
            .next()
            .and_then(Result::ok)
            .ok_or(XpmError::MalformedHeader)
    };

    let (width, height, num_colors, chars_per_pixel) = (next()?, next()?, next()?, next()?);

    if chars_per_pixel == 0 || width == 0 || height == 0 {
        return Err(XpmError::MalformedHeader);
    }

    if u32::try_from(width).is_err()
        || u32::try_from(height).is_err()
        || width.checked_mul(height).and_then(|n| n.checked_mul(4)).is_none()
    {
        return Err(XpmError::MalformedHeader);
    }

    Ok((width, height, num_colors, chars_per_pixel))
}

// Picks the color visual (`c`), falling back to grayscale and then monochrome visuals.
fn parse_color_entry(spec: &[u8]) -> Result<Color, XpmError> {
    let text = std::str::from_utf8(spec).map_err(|_| XpmError::MalformedColor(lossy(spec)))?;

    let mut visuals: Vec<(&str, String)> = Vec::new();
    for token in text.split_ascii_whitespace() {
        match token {
            "c" | "m" | "g" | "g4" | "s" => visuals.push((token, String::new())),
            word => {
                let Some((_, value)) = visuals.last_mut() else {
                    return Err(XpmError::MalformedColor(text.to_owned()));
                };
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(word);
            }
        }
    }

    let value = ["c", "g", "g4", "m"]
        .iter()
        .find_map(|wanted| {
            visuals
                .iter()
                .find(|(key, value)| key == wanted && !value.is_empty())
        })
        .map(|(_, value)| value.as_str())
        .ok_or_else(|| XpmError::MalformedColor(text.to_owned()))?;

    parse_color(value)
}

fn parse_color(value: &str) -> Result<Color, XpmError> {
    if value.eq_ignore_ascii_case("none") {
        return Ok(TRANSPARENT);
    }

    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| XpmError::UnknownColor(value.to_owned()));
    }

    let name: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let [r, g, b] = match name.as_str() {
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "red" => [255, 0, 0],
        "green" => [0, 255, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "cyan" => [0, 255, 255],
        "magenta" => [255, 0, 255],
        "gray" | "grey" => [190, 190, 190],
        "darkgray" | "darkgrey" => [169, 169, 169],
        "lightgray" | "lightgrey" => [211, 211, 211],
        "orange" => [255, 165, 0],
        "brown" => [165, 42, 42],
        "navy" => [0, 0, 128],
        "gray50" | "grey50" => [127, 127, 127],
        _ => return Err(XpmError::UnknownColor(value.to_owned())),
    };

    Ok([r, g, b, u8::MAX])
}

// `#RGB`, `#RRGGBB`, `#RRRGGGBBB` and `#RRRRGGGGBBBB`: keep the most significant byte.
fn parse_hex(hex: &str) -> Option<Color> {
    if hex.is_empty() || hex.len() % 3 != 0 || hex.len() > 12 || !hex.is_ascii() {
        return None;
    }

    let digits = hex.len() / 3;
    let mut color = [0, 0, 0, u8::MAX];

    for (channel, component) in color.iter_mut().zip(hex.as_bytes().chunks(digits)) {
        let component = std::str::from_utf8(component).ok()?;
        let value = u32::from_str_radix(component, 16).ok()?;

        *channel = match digits {
            1 => (value * 0x11) as u8,
            _ => (value >> (4 * (digits - 2))) as u8,
        };
    }

    Some(color)
}

// Collects the contents of every C string literal, skipping comments.
fn quoted_strings(source: &[u8]) -> Vec<&[u8]> {
    let mut strings = Vec::new();
    let mut i = 0;

    while i < source.len() {
        match source[i] {
            b'/' if source.get(i + 1) == Some(&b'*') => {
                i = source[i + 2..]
                    .windows(2)
                    .position(|w| w == b"*/")
                    .map_or(source.len(), |end| i + 2 + end + 2);
            }
            b'"' => {
                let start = i + 1;
                let end = source[start..]
                    .iter()
                    .position(|&b| b == b'"')
                    .map_or(source.len(), |end| start + end);

                strings.push(&source[start..end]);
                i = end + 1;
            }
            _ => i += 1,
        }
    }

    strings
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
