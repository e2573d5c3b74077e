use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// 1-based location in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Error from translating one source file.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The parser rejected the source. Nothing is emitted for the file.
    #[error("{position}: syntax error: {message}")]
    Parse { position: Position, message: String },

    /// A construct outside the supported lowering rules.
    #[error("{position}: unsupported {construct}: {detail}")]
    Unsupported {
        construct: String,
        detail: String,
        position: Position,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TranslateError {
    pub fn position(&self) -> Option<&Position> {
        match self {
            TranslateError::Parse { position, .. } | TranslateError::Unsupported { position, .. } => {
                Some(position)
            }
            TranslateError::Io { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_display_locates_construct() {
        let err = TranslateError::Unsupported {
            construct: "slice expression".into(),
            detail: "three-index slices".into(),
            position: Position {
                file: "main.go".into(),
                line: 4,
                column: 9,
            },
        };
        assert_eq!(
            err.to_string(),
            "main.go:4:9: unsupported slice expression: three-index slices"
        );
    }
}
