//! Path helpers for user-supplied configuration values.

use std::path::{Path, PathBuf};

/// Returns the user's home directory from `HOME` (or `USERPROFILE`).
#[must_use]
pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
}

/// Expands a leading `~` to the home directory.
///
/// Paths without a leading `~`, or with no resolvable home, are returned
/// unchanged.
///
/// # Examples
///
/// ```
/// use probemap::infrastructure::expand_tilde;
/// use std::path::Path;
///
/// assert_eq!(expand_tilde(Path::new("/var/lib/probemap")), Path::new("/var/lib/probemap"));
/// ```
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    expand_with_home(path, home_dir().as_deref())
}

fn expand_with_home(path: &Path, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return path.to_path_buf();
    };
    match path.strip_prefix("~") {
        Ok(rest) if rest.as_os_str().is_empty() => home.to_path_buf(),
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilde_prefix_is_replaced() {
        let home = Path::new("/home/probe");
        assert_eq!(
            expand_with_home(Path::new("~/maps/prefs.json"), Some(home)),
            PathBuf::from("/home/probe/maps/prefs.json")
        );
        assert_eq!(expand_with_home(Path::new("~"), Some(home)), home);
    }

    #[test]
    fn other_paths_are_untouched() {
        let home = Path::new("/home/probe");
        assert_eq!(
            expand_with_home(Path::new("/etc/probemap.toml"), Some(home)),
            PathBuf::from("/etc/probemap.toml")
        );
        assert_eq!(
            expand_with_home(Path::new("~other/file"), Some(home)),
            PathBuf::from("~other/file")
        );
        assert_eq!(
            expand_with_home(Path::new("~/x"), None),
            PathBuf::from("~/x")
        );
    }
}
