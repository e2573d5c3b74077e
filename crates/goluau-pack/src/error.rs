use goluau_transform::TranslateError;
use std::path::PathBuf;
use thiserror::Error;

use crate::go_mod::GoModError;

#[derive(Debug, Error)]
pub enum PackError {
    #[error(transparent)]
    Translate(#[from] TranslateError),
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}:{}: {}", path.display(), source.line, source.message)]
    GoMod {
        path: PathBuf,
        #[source]
        source: GoModError,
    },
    #[error("walking {}: {message}", path.display())]
    Walk { path: PathBuf, message: String },
    #[error("no Go module cache found (set GOMODCACHE) while resolving {module}")]
    NoModuleCache { module: String },
    #[error("dependency {module}@{version} is not in the module cache at {}", cache.display())]
    MissingDependency {
        module: String,
        version: String,
        cache: PathBuf,
    },
}

impl PackError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PackError::Io {
            path: path.into(),
            source,
        }
    }
}
