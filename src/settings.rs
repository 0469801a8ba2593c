use crate::search::SearchPath;

/// Process-wide icon settings, passed explicitly into every resolution.
///
/// # Example
///
/// ```
/// use notify_icon::IconSettings;
///
/// let settings = IconSettings::new("/usr/share/pixmaps:/opt/app/icons", 64);
///
/// assert_eq!(settings.icon_path.dirs().count(), 2);
/// assert_eq!(settings.max_icon_size, 64);
/// ```
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct IconSettings {
    /// Directories searched for bare icon names.
    pub icon_path: SearchPath,
    /// Largest width or height an icon is rendered at. 0 means unlimited.
    pub max_icon_size: u32,
}

impl IconSettings {
    pub fn new<P: Into<SearchPath>>(icon_path: P, max_icon_size: u32) -> Self {
        Self {
            icon_path: icon_path.into(),
            max_icon_size,
        }
    }

    /// Replaces the search path, keeping the size limit.
    pub fn with_icon_path<P: Into<SearchPath>>(mut self, icon_path: P) -> Self {
        self.icon_path = icon_path.into();
        self
    }

    /// Replaces the size limit, keeping the search path.
    pub fn with_max_icon_size(mut self, max_icon_size: u32) -> Self {
        self.max_icon_size = max_icon_size;
        self
    }
}

#[cfg(test)]
mod test {
    use crate::search::{DEFAULT_ICON_PATH, SearchPath};
    use crate::settings::IconSettings;

    #[test]
    fn test_defaults() {
        let settings = IconSettings::default();

        assert_eq!(settings.icon_path.as_str(), DEFAULT_ICON_PATH);
        assert_eq!(settings.max_icon_size, 0, "unlimited by default");
    }

    #[test]
    fn test_builders() {
        let settings = IconSettings::default()
            .with_icon_path("/a:/b")
            .with_max_icon_size(32);

        assert_eq!(settings, IconSettings::new(SearchPath::new("/a:/b"), 32));
    }
}
