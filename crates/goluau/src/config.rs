//! Project configuration.
//!
//! Loaded from `goluau.toml` in the project root. Every section and key is
//! optional; command-line flags override file values.
//!
//! ```toml
//! [transform]
//! runtime = "GO"
//! escape_package = "transform"
//! indent = "\t"
//!
//! [build]
//! out = "out"
//! layout = "rojo"
//! include_dir = "go_include"
//! exclude = [".git", "out", "vendor"]
//! dependencies = true
//! ```

use goluau_luau::RenderOptions;
use goluau_pack::BuildOptions;
use goluau_transform::TransformOptions;
use serde::Deserialize;
use std::path::Path;

pub const CONFIG_FILE: &str = "goluau.toml";

/// The `[transform]` section: lowering and rendering options side by side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    #[serde(flatten)]
    pub lowering: TransformOptions,
    #[serde(flatten)]
    pub render: RenderOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GoluauConfig {
    pub transform: TransformConfig,
    pub build: BuildOptions,
}

impl GoluauConfig {
    /// Load `goluau.toml` from `root`. A missing file yields the defaults;
    /// an unreadable or malformed one is an error.
    pub fn load(root: &Path) -> Result<Self, String> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("{}: {e}", path.display())),
        };
        toml::from_str(&content).map_err(|e| format!("{}: {e}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goluau_pack::Layout;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        assert_eq!(GoluauConfig::load(dir.path()).unwrap(), GoluauConfig::default());
    }

    #[test]
    fn partial_sections() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
[transform]
runtime = "Go"
indent = "  "

[build]
layout = "rojo"
dependencies = false
"#,
        )
        .unwrap();

        let config = GoluauConfig::load(dir.path()).unwrap();
        assert_eq!(config.transform.lowering.runtime, "Go");
        assert_eq!(config.transform.lowering.escape_package, "transform");
        assert_eq!(config.transform.render.indent, "  ");
        assert_eq!(config.build.layout, Layout::Rojo);
        assert!(!config.build.dependencies);
        assert_eq!(config.build.out, PathBuf::from("out"));
        assert_eq!(config.build.include_dir, "go_include");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[build]\nlayout = \"tree\"\n").unwrap();
        let err = GoluauConfig::load(dir.path()).unwrap_err();
        assert!(err.contains(CONFIG_FILE), "{err}");
    }
}
