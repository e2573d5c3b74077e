//! Whole-project builds: package discovery, parallel lowering, module output
//! and `go.mod` dependency resolution through the Go module cache.

mod error;
pub mod go_mod;
mod mod_cache;
mod options;
mod pack;

pub use error::PackError;
pub use go_mod::{GoMod, GoModError, Require};
pub use mod_cache::{ModCache, escape_path};
pub use options::{BuildOptions, Layout};
pub use pack::{BuildReport, Package, Packer};
