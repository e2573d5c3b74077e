use serde::Deserialize;

/// Lowering options, read from the `[transform]` table of `goluau.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Global table holding the runtime helpers (`import`, `slice`, `append`, ...).
    pub runtime: String,
    /// Package name whose `Mod` and `Require` calls are reserved.
    pub escape_package: String,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            runtime: "GO".to_string(),
            escape_package: "transform".to_string(),
        }
    }
}
