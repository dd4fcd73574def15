use std::path::{Component, Path, PathBuf};

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
}

/// Replaces a leading `~` component with the user's home directory.
///
/// Paths that do not start with `~`, or `~user` forms, are returned unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => match home_dir() {
            Some(home) => home.join(components.as_path()),
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

/// Expands `~` and anchors a relative path at `base`.
///
/// `.` and `..` components are kept: only the file system knows what `..`
/// means after a symlink, so resolution is left to `fs::canonicalize`.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    base.join(expand_home(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolutize_anchors_relative_paths() {
        assert_eq!(
            absolutize(Path::new("file.txt"), Path::new("/work")),
            PathBuf::from("/work/file.txt")
        );
        assert_eq!(
            absolutize(Path::new("/abs/file.txt"), Path::new("/work")),
            PathBuf::from("/abs/file.txt")
        );
    }

    #[test]
    fn absolutize_keeps_parent_components() {
        assert_eq!(
            absolutize(Path::new("link/../main.txt"), Path::new("/work")),
            PathBuf::from("/work/link/../main.txt")
        );
    }

    #[test]
    fn expand_home_leaves_ordinary_paths_alone() {
        assert_eq!(expand_home(Path::new("data/x.txt")), PathBuf::from("data/x.txt"));
        assert_eq!(expand_home(Path::new("~user/x")), PathBuf::from("~user/x"));
        if let Some(home) = home_dir() {
            assert_eq!(expand_home(Path::new("~/x.txt")), home.join("x.txt"));
        }
    }
}
