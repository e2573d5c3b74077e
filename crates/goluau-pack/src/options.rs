use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;

/// Shape of the output tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// One directory per package under the output root.
    #[default]
    Flat,
    /// `server/`, `client/` and `shared/` source roots, with shared code and
    /// dependencies under `shared/<include_dir>/<module path>`.
    Rojo,
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat" => Ok(Layout::Flat),
            "rojo" => Ok(Layout::Rojo),
            other => Err(format!("unknown layout `{other}` (expected flat or rojo)")),
        }
    }
}

/// The `[build]` table of `goluau.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    pub out: PathBuf,
    pub layout: Layout,
    /// Directory name that dependencies are emitted under.
    pub include_dir: String,
    /// Directory names never descended into.
    pub exclude: Vec<String>,
    /// Translate `go.mod` requirements found in the module cache.
    pub dependencies: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            out: PathBuf::from("out"),
            layout: Layout::Flat,
            include_dir: "go_include".to_string(),
            exclude: vec![".git".to_string(), "out".to_string(), "vendor".to_string()],
            dependencies: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_from_str() {
        assert_eq!("rojo".parse::<Layout>(), Ok(Layout::Rojo));
        assert!("tree".parse::<Layout>().is_err());
    }
}
