pub mod build;
pub mod translate;

pub use build::{BuildFlags, cmd_build};
pub use translate::cmd_translate;
