use crate::decode::{DecodeError, decode_file, decode_raw};
use crate::icon::{IconIdentifier, IconQuery};
use crate::path::is_readable;
use crate::pixbuf::PixelBuffer;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::str::{FromStr, Split};

/// Suffixes appended to a bare icon name, in the order they are tried within each directory.
pub const SUFFIXES: [&str; 3] = [".svg", ".png", ".xpm"];

/// Search path used when none is configured.
pub const DEFAULT_ICON_PATH: &str =
    "/usr/share/icons/gnome/16x16/status/:/usr/share/icons/gnome/16x16/devices/";

/// Reasons an icon identifier did not produce pixels.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("no icon specified")]
    NotSpecified,
    #[error("No icon found in path: '{0}'")]
    NotFound(String),
    #[error("could not load icon {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
    #[error("`{0}` does not name a local file")]
    UriResolutionFailed(String),
}

/// An ordered, colon-delimited list of directories wherein bare icon names are looked up.
///
/// Directories are split off lazily and in order. Empty segments are kept: `"/a:"` names the
/// directories `/a` and `""`, the latter producing candidates such as `/bell.png`.
///
/// # Example
///
/// ```
/// use notify_icon::SearchPath;
///
/// let path = SearchPath::new("/usr/share/pixmaps")
///     .add_directories(["/opt/app/icons"]);
///
/// assert_eq!(path.as_str(), "/usr/share/pixmaps:/opt/app/icons");
/// assert_eq!(path.dirs().collect::<Vec<_>>(), ["/usr/share/pixmaps", "/opt/app/icons"]);
/// ```
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SearchPath {
    path: String,
}

impl SearchPath {
    /// Constructs a `SearchPath` from a colon-delimited list of directories.
    pub fn new<S: Into<String>>(path: S) -> Self {
        Self { path: path.into() }
    }

    /// Constructs a `SearchPath` from a list of directories.
    pub fn from_dirs<I, S>(dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(String::new()).add_directories(dirs)
    }

    /// Constructs a `SearchPath` from the XDG base directories, which are
    /// - `$HOME/.icons`
    /// - `$XDG_DATA_HOME/icons`
    /// - `$XDG_DATA_DIRS/icons`
    /// - `/usr/share/pixmaps`
    pub fn xdg() -> Self {
        let xdg = xdg::BaseDirectories::new();

        let mut directories = vec![];

        if let Some(home) = std::env::home_dir() {
            directories.push(home.join(".icons"));
        }

        xdg.data_home
            .into_iter()
            .chain(xdg.data_dirs)
            .map(|data_dir| data_dir.join("icons"))
            .for_each(|dir| directories.push(dir));

        directories.push("/usr/share/pixmaps".into());

        Self::from_dirs(directories.iter().map(|dir| dir.to_string_lossy()))
    }

    /// Appends directories to the end of this `SearchPath`.
    pub fn add_directories<I, S>(mut self, directories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for dir in directories {
            if !self.path.is_empty() {
                self.path.push(':');
            }
            self.path.push_str(dir.as_ref());
        }

        self
    }

    /// The colon-delimited form of this search path.
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// The directories of this search path, in search order.
    pub fn dirs(&self) -> Split<'_, char> {
        self.path.split(':')
    }

    /// Every file a search for `name` may try, in order: each directory in turn, and within each
    /// directory every suffix of [SUFFIXES].
    pub fn candidates<'a>(&'a self, name: &'a str) -> impl Iterator<Item = PathBuf> + 'a {
        self.dirs().flat_map(move |dir| {
            SUFFIXES
                .iter()
                .map(move |suffix| PathBuf::from(format!("{dir}/{name}{suffix}")))
        })
    }

    /// Walks the candidates for `name` in order, returning the first value `attempt` produces.
    ///
    /// No candidate after the first success is visited.
    pub fn find_by<T, F>(&self, name: &str, mut attempt: F) -> Option<T>
    where
        F: FnMut(&Path) -> Option<T>,
    {
        self.candidates(name).find_map(|candidate| attempt(&candidate))
    }

    /// Search for a bare icon name, decoding the first candidate that is readable and decodes.
    ///
    /// Candidates that exist but fail to decode are skipped as if they were absent.
    pub fn find(&self, name: &str) -> Result<PixelBuffer, LookupError> {
        self.find_by(name, |candidate| {
            if !is_readable(candidate) {
                return None;
            }

            match decode_file(candidate) {
                Ok(buffer) => Some(buffer),
                Err(_e) => {
                    #[cfg(feature = "log")]
                    log::debug!("skipping icon candidate {candidate:?} because {_e}");

                    None
                }
            }
        })
        .ok_or_else(|| LookupError::NotFound(name.to_owned()))
    }
}

impl Default for SearchPath {
    fn default() -> Self {
        Self::new(DEFAULT_ICON_PATH)
    }
}

impl From<&str> for SearchPath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SearchPath {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl FromStr for SearchPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl<S: AsRef<str>> FromIterator<S> for SearchPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_dirs(iter)
    }
}

/// Resolve an icon identifier to pixels, reporting why it failed if it did.
///
/// - Inline pixels always succeed.
/// - Paths (including resolved `file://` URIs) are decoded directly; a decode failure is final.
/// - Bare names are searched for in `search_path`.
pub fn try_resolve(
    identifier: &IconIdentifier<'_>,
    search_path: &SearchPath,
) -> Result<PixelBuffer, LookupError> {
    match identifier.classify()? {
        IconQuery::Raw(raw) => Ok(decode_raw(raw)),
        IconQuery::Path(path) => {
            decode_file(&path).map_err(|source| LookupError::Decode { path, source })
        }
        IconQuery::Name(name) => search_path.find(name),
    }
}

/// Resolve an icon identifier to pixels.
///
/// Returns `None` if no icon was specified, a direct path failed to decode, or a search came up
/// empty. Only the last case is logged as a warning.
pub fn resolve(identifier: &IconIdentifier<'_>, search_path: &SearchPath) -> Option<PixelBuffer> {
    match try_resolve(identifier, search_path) {
        Ok(buffer) => Some(buffer),
        Err(LookupError::NotSpecified) => None,
        Err(_e @ LookupError::NotFound(_)) => {
            #[cfg(feature = "log")]
            log::warn!("{_e}");

            None
        }
        Err(_e) => {
            #[cfg(feature = "log")]
            log::debug!("{_e}");

            None
        }
    }
}
