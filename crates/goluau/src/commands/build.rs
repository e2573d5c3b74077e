//! `goluau build`: a whole project directory into a Luau tree.

use crate::config::GoluauConfig;
use goluau_pack::{Layout, Packer};
use std::path::{Path, PathBuf};

/// Flags that override `[build]` values from `goluau.toml`.
#[derive(Debug, Clone, Default)]
pub struct BuildFlags {
    pub out: Option<PathBuf>,
    pub layout: Option<Layout>,
    pub no_deps: bool,
}

pub fn cmd_build(root: &Path, flags: BuildFlags) -> i32 {
    let config = match GoluauConfig::load(root) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return 1;
        }
    };

    let mut build = config.build;
    // a configured output directory is relative to the project root
    build.out = match flags.out {
        Some(out) => out,
        None if build.out.is_relative() => root.join(&build.out),
        None => build.out,
    };
    if let Some(layout) = flags.layout {
        build.layout = layout;
    }
    if flags.no_deps {
        build.dependencies = false;
    }

    let packer = Packer::new(&build, &config.transform.lowering, &config.transform.render);
    match packer.build(root) {
        Ok(report) => {
            for module in &report.modules {
                println!("{}", module.display());
            }
            for dependency in &report.dependencies {
                eprintln!("translated dependency {dependency}");
            }
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}
