//! Notifications specify their icons in a handful of ways, and all of them have to end up as
//! something a compositor can paint.
//!
//! This crate, `notify-icon`, takes whatever a notification carried (inline pixel data, a path, a
//! `file://` URI or a bare icon name) and turns it into a [RenderSurface] of bounded size.
//!
//! # Quick start
//!
//! ```
//! use notify_icon::{IconIdentifier, IconSettings, RawImage, resolve_notification_icon};
//!
//! let settings = IconSettings::new("/usr/share/pixmaps", 32);
//!
//! // a 64x64 opaque white square, sent inline
//! let raw = RawImage {
//!     width: 64,
//!     height: 64,
//!     rowstride: 64 * 3,
//!     bits_per_sample: 8,
//!     has_alpha: false,
//!     data: vec![0xff; 64 * 64 * 3],
//! };
//!
//! let surface = resolve_notification_icon(&IconIdentifier::Raw(&raw), &settings).unwrap();
//! assert_eq!(surface.dimensions(), (32, 32));
//!
//! // an icon name nobody has installed yields no icon, never an error
//! let missing = IconIdentifier::Text("surely-no-such-icon");
//! assert!(resolve_notification_icon(&missing, &settings).is_none());
//! ```
//!
//! # High level design
//!
//! Every resolution runs the same pipeline, synchronously, on the calling thread:
//!
//! 1.  *Classifying*: an [IconIdentifier] is classified once into an [IconQuery]: inline pixels,
//!     a path to decode directly, or a name to search for.
//!
//! 2.  *Locating and decoding*: names are looked up in each directory of the [SearchPath] with
//!     each of the [SUFFIXES] in turn; the first readable candidate that decodes wins.
//!     [decode_file] handles SVG, PNG, XPM and every raster format the `image` crate knows.
//!
//! 3.  *Scaling*: [scale_to_limit] shrinks the [PixelBuffer] so neither side exceeds
//!     [IconSettings::max_icon_size], keeping its aspect ratio.
//!
//! 4.  *Producing a surface*: [to_surface] converts the buffer into a premultiplied
//!     [tiny_skia::Pixmap] by way of an in-memory PNG.
//!
//! Any step that fails degrades to "no icon". Only a bare-name search that comes up empty is
//! logged as a warning, and only with the (default) `log` feature enabled.

mod decode;
mod icon;
mod path;
mod pixbuf;
mod resolver;
mod scale;
mod search;
mod settings;
mod surface;
mod xpm;

pub use decode::*;
pub use icon::*;
pub use path::*;
pub use pixbuf::*;
pub use resolver::*;
pub use scale::*;
pub use search::*;
pub use settings::*;
pub use surface::*;
pub use xpm::XpmError;
