use crate::pixbuf::RawImage;
use crate::search::LookupError;
use std::path::PathBuf;

/// The ways a notification may specify its icon.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IconIdentifier<'a> {
    /// Pixel data already available.
    Raw(&'a RawImage),
    /// An absolute path (`/...`), a home-relative path (`~...`), a `file://` URI, or a bare icon
    /// name to be searched for.
    Text(&'a str),
}

impl<'a> IconIdentifier<'a> {
    /// Picks the icon of a notification that may carry either inline pixels or a textual icon.
    ///
    /// Inline pixels take precedence. Returns `None` if neither is present.
    pub fn from_parts(raw: Option<&'a RawImage>, icon: Option<&'a str>) -> Option<Self> {
        raw.map(IconIdentifier::Raw)
            .or_else(|| icon.map(IconIdentifier::Text))
    }

    /// Classify this identifier once, so the rest of the pipeline never re-inspects the string.
    ///
    /// - Empty text is [LookupError::NotSpecified].
    /// - `file://` URIs become [IconQuery::Path] if they map to a local file path. If they don't,
    ///   the original text is treated as a bare name instead.
    /// - Text starting with `/` or `~` is a [IconQuery::Path].
    /// - Anything else is a bare [IconQuery::Name].
    pub fn classify(&self) -> Result<IconQuery<'a>, LookupError> {
        let text = match *self {
            IconIdentifier::Raw(raw) => return Ok(IconQuery::Raw(raw)),
            IconIdentifier::Text(text) => text,
        };

        if text.is_empty() {
            return Err(LookupError::NotSpecified);
        }

        if text.starts_with("file://") {
            match path_from_file_uri(text) {
                Ok(path) => return Ok(IconQuery::Path(path)),
                Err(_e) => {
                    #[cfg(feature = "log")]
                    log::debug!("treating {text:?} as an icon name because {_e}");
                }
            }
        }

        if text.starts_with('/') || text.starts_with('~') {
            Ok(IconQuery::Path(PathBuf::from(text)))
        } else {
            Ok(IconQuery::Name(text))
        }
    }
}

impl<'a> From<&'a RawImage> for IconIdentifier<'a> {
    fn from(value: &'a RawImage) -> Self {
        IconIdentifier::Raw(value)
    }
}

impl<'a> From<&'a str> for IconIdentifier<'a> {
    fn from(value: &'a str) -> Self {
        IconIdentifier::Text(value)
    }
}

/// A classified [IconIdentifier], telling the locator how to obtain pixels.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum IconQuery<'a> {
    /// Wrap the inline pixels directly.
    Raw(&'a RawImage),
    /// Decode this file. A leading `~` is still unexpanded at this point.
    Path(PathBuf),
    /// Search the configured directories for this name.
    Name(&'a str),
}

/// Maps a `file://` URI to a local path, percent-decoding it on the way.
///
/// URIs naming a remote host are rejected; only `localhost` or an empty host is local.
pub fn path_from_file_uri(uri: &str) -> Result<PathBuf, LookupError> {
    let failed = || LookupError::UriResolutionFailed(uri.to_owned());

    let url = url::Url::parse(uri).map_err(|_| failed())?;
    if url.scheme() != "file" {
        return Err(failed());
    }

    url.to_file_path().map_err(|_| failed())
}

#[cfg(test)]
mod test {
    use crate::icon::{IconIdentifier, IconQuery, path_from_file_uri};
    use crate::pixbuf::RawImage;
    use crate::search::LookupError;
    use std::path::PathBuf;

    fn raw() -> RawImage {
        RawImage {
            width: 1,
            height: 1,
            rowstride: 3,
            bits_per_sample: 8,
            has_alpha: false,
            data: vec![0, 0, 0],
        }
    }

    #[test]
    fn test_classify() {
        let classify = |text| IconIdentifier::Text(text).classify().unwrap();

        assert_eq!(
            classify("/usr/share/pixmaps/bell.png"),
            IconQuery::Path("/usr/share/pixmaps/bell.png".into())
        );
        assert_eq!(classify("~/bell.png"), IconQuery::Path("~/bell.png".into()));
        assert_eq!(classify("bell"), IconQuery::Name("bell"));
        assert_eq!(classify("dialog-information"), IconQuery::Name("dialog-information"));
        assert_eq!(classify("file:///tmp/bell.png"), IconQuery::Path("/tmp/bell.png".into()));
    }

    #[test]
    fn test_empty_text_is_not_specified() {
        assert!(matches!(
            IconIdentifier::Text("").classify(),
            Err(LookupError::NotSpecified)
        ));
    }

    #[test]
    fn test_unresolvable_uri_falls_back_to_name() {
        let uri = "file://remote.example.com/bell.png";

        assert_eq!(IconIdentifier::Text(uri).classify().unwrap(), IconQuery::Name(uri));
    }

    #[test]
    fn test_file_uri_percent_decoding() {
        assert_eq!(
            path_from_file_uri("file:///tmp/my%20icons/bell.png").unwrap(),
            PathBuf::from("/tmp/my icons/bell.png")
        );
        assert_eq!(
            path_from_file_uri("file://localhost/tmp/bell.png").unwrap(),
            PathBuf::from("/tmp/bell.png")
        );
        assert!(path_from_file_uri("https://example.com/bell.png").is_err());
    }

    #[test]
    fn test_raw_takes_precedence() {
        let raw = raw();

        assert_eq!(
            IconIdentifier::from_parts(Some(&raw), Some("bell")),
            Some(IconIdentifier::Raw(&raw))
        );
        assert_eq!(
            IconIdentifier::from_parts(None, Some("bell")),
            Some(IconIdentifier::Text("bell"))
        );
        assert_eq!(IconIdentifier::from_parts(None, None), None);

        assert_eq!(
            IconIdentifier::Raw(&raw).classify().unwrap(),
            IconQuery::Raw(&raw)
        );
    }
}
