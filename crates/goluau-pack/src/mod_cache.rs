//! Lookup of required modules in the Go module cache.

use std::path::{Path, PathBuf};

/// A Go module cache directory (`$GOMODCACHE`, usually `~/go/pkg/mod`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModCache {
    root: PathBuf,
}

impl ModCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Find the cache: `GOMODCACHE`, then the first `GOPATH` entry, then
    /// `~/go/pkg/mod`. Only existing directories count.
    pub fn locate() -> Option<Self> {
        let candidates = [
            std::env::var_os("GOMODCACHE").map(PathBuf::from),
            std::env::var_os("GOPATH")
                .and_then(|p| std::env::split_paths(&p).next())
                .map(|p| p.join("pkg").join("mod")),
            dirs::home_dir().map(|h| h.join("go").join("pkg").join("mod")),
        ];
        candidates
            .into_iter()
            .flatten()
            .find(|p| p.is_dir())
            .map(Self::new)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<cache>/<escaped path>@<escaped version>`, whether or not it exists.
    pub fn module_dir(&self, module: &str, version: &str) -> PathBuf {
        let mut dir = self.root.clone();
        let escaped = escape_path(module);
        let mut segments = escaped.split('/').peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_some() {
                dir.push(segment);
            } else {
                dir.push(format!("{segment}@{}", escape_path(version)));
            }
        }
        dir
    }

    pub fn resolve(&self, module: &str, version: &str) -> Option<PathBuf> {
        Some(self.module_dir(module, version)).filter(|d| d.is_dir())
    }
}

/// Case-encode a module path or version the way the module cache stores it:
/// every upper-case letter becomes `!` followed by its lower-case form.
pub fn escape_path(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii_uppercase() {
            out.push('!');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_case_is_escaped() {
        assert_eq!(escape_path("github.com/BurntSushi/toml"), "github.com/!burnt!sushi/toml");
        assert_eq!(escape_path("v1.0.0-RC1"), "v1.0.0-!r!c1");
    }

    #[test]
    fn module_dir_layout() {
        let cache = ModCache::new("/cache");
        assert_eq!(
            cache.module_dir("github.com/Me/lib", "v1.2.3"),
            PathBuf::from("/cache/github.com/!me/lib@v1.2.3")
        );
    }

    #[test]
    fn resolve_requires_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ModCache::new(tmp.path());
        assert_eq!(cache.resolve("example.com/a", "v0.1.0"), None);

        let dir = tmp.path().join("example.com").join("a@v0.1.0");
        std::fs::create_dir_all(&dir).unwrap();
        assert_eq!(cache.resolve("example.com/a", "v0.1.0"), Some(dir));
    }
}
