use std::fs::File;
use std::path::{Path, PathBuf};

/// Checks whether `path` names a regular file (or a symlink to one) that this process can open
/// for reading right now.
///
/// This is inherently racy: the file may disappear or change permissions between this check and
/// a later open. Callers treat a failure after a positive check as an ordinary decode failure.
pub fn is_readable<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();

    let Ok(metadata) = path.metadata() else {
        return false;
    };

    metadata.is_file() && File::open(path).is_ok()
}

/// Returns the extension of the final component of `path`: everything after its last `.`.
///
/// Files without a `.` have no extension, and neither do hidden files whose only `.` is the
/// leading one (`.bashrc` yields `""`, `.bashrc.bak` yields `"bak"`).
pub fn extension_of(path: &str) -> &str {
    let file_name = path.rsplit('/').next().unwrap_or(path);

    match file_name.rfind('.') {
        Some(0) | None => "",
        Some(dot) => &file_name[dot + 1..],
    }
}

/// Expands a leading `~` (either alone or followed by `/`) to the current user's home directory.
///
/// `~user` forms are not expanded. If no home directory is known, the path is returned as-is.
pub fn expand_tilde(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };

    match std::env::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod test {
    use crate::path::{expand_tilde, extension_of, is_readable};
    use std::error::Error;
    use std::path::PathBuf;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("bell.png"), "png");
        assert_eq!(extension_of("/usr/share/icons/bell.svg"), "svg");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("bell"), "");
        assert_eq!(extension_of(""), "");
        assert_eq!(extension_of("trailing."), "");
    }

    #[test]
    fn test_hidden_files_have_no_extension() {
        assert_eq!(extension_of(".bashrc"), "", "a lone leading dot is not an extension");
        assert_eq!(extension_of("/home/me/.bashrc"), "");
        assert_eq!(extension_of("/home/me/.bashrc.bak"), "bak");
        // only the final component counts:
        assert_eq!(extension_of("/some.dir/file"), "");
    }

    #[test]
    fn test_is_readable() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("icon.png");
        std::fs::write(&file, b"not really a png")?;

        assert!(is_readable(&file));
        assert!(!is_readable(dir.path().join("missing.png")));
        assert!(!is_readable(dir.path()), "directories are not readable files");

        Ok(())
    }

    #[test]
    #[cfg(unix)]
    fn test_symlink_is_readable() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("target.svg");
        let link = dir.path().join("link.svg");
        std::fs::write(&file, b"<svg/>")?;
        std::os::unix::fs::symlink(&file, &link)?;

        assert!(is_readable(&link));

        std::fs::remove_file(&file)?;
        assert!(!is_readable(&link), "dangling symlinks cannot be opened");

        Ok(())
    }

    #[test]
    fn test_expand_tilde() {
        let Some(home) = std::env::home_dir() else {
            return;
        };

        assert_eq!(expand_tilde("~"), home);
        assert_eq!(expand_tilde("~/icons/bell.png"), home.join("icons/bell.png"));
        assert_eq!(expand_tilde("~someone/bell.png"), PathBuf::from("~someone/bell.png"));
        assert_eq!(expand_tilde("/abs/bell.png"), PathBuf::from("/abs/bell.png"));
    }
}
