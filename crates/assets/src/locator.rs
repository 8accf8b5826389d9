use std::path::{Path, PathBuf};

/// Media directories searched when none are configured, relative to the
/// working directory.
pub const DEFAULT_ROOTS: [&str; 2] = ["../media", "../media/images"];

/// Ordered set of directories searched for resource files.
#[derive(Debug, Clone, Default)]
pub struct ResourceLocator {
    roots: Vec<PathBuf>,
}

impl ResourceLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a locator from roots in search order.
    pub fn with_roots<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut locator = Self::new();
        for root in roots {
            locator.add_location(root);
        }
        locator
    }

    /// Append a directory to the end of the search order. Duplicates are ignored.
    pub fn add_location(&mut self, root: impl Into<PathBuf>) {
        let root = root.into();
        if self.roots.contains(&root) {
            return;
        }
        tracing::info!(root = %root.display(), "adding resource location");
        self.roots.push(root);
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Full path of the first root containing `file_name`.
    pub fn resolve(&self, file_name: impl AsRef<Path>) -> Option<PathBuf> {
        let file_name = file_name.as_ref();
        for root in &self.roots {
            let candidate = root.join(file_name);
            if candidate.is_file() {
                tracing::debug!(
                    file = %file_name.display(),
                    root = %root.display(),
                    "resource found"
                );
                return Some(candidate);
            }
        }
        tracing::warn!(
            file = %file_name.display(),
            "resource not found in any registered location"
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn first_match_wins() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        fs::write(a.path().join("stars.jpg"), b"a").unwrap();
        fs::write(b.path().join("stars.jpg"), b"b").unwrap();
        fs::write(b.path().join("clouds.jpg"), b"b").unwrap();

        let locator = ResourceLocator::with_roots([a.path(), b.path()]);
        assert_eq!(
            locator.resolve("stars.jpg"),
            Some(a.path().join("stars.jpg"))
        );
        assert_eq!(
            locator.resolve("clouds.jpg"),
            Some(b.path().join("clouds.jpg"))
        );
    }

    #[test]
    fn missing_file_is_absent() {
        let a = tempfile::tempdir().unwrap();
        let locator = ResourceLocator::with_roots([a.path()]);
        assert_eq!(locator.resolve("earthmap4k.jpg"), None);
        assert_eq!(ResourceLocator::new().resolve("earthmap4k.jpg"), None);
    }

    #[test]
    fn directories_do_not_match() {
        let a = tempfile::tempdir().unwrap();
        fs::create_dir(a.path().join("images")).unwrap();
        let locator = ResourceLocator::with_roots([a.path()]);
        assert_eq!(locator.resolve("images"), None);
    }

    #[test]
    fn duplicate_roots_ignored() {
        let mut locator = ResourceLocator::new();
        locator.add_location("media");
        locator.add_location("media/images");
        locator.add_location("media");
        assert_eq!(locator.roots().len(), 2);
    }
}
