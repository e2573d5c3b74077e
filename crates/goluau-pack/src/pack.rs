//! Project assembly.
//!
//! Source files are grouped by directory; every directory is one package and
//! one output module. Packages are lowered in parallel, merged in sorted file
//! order, given an export table and written as `<out>/init.luau` next to
//! copies of the package's own `.luau`/`.lua` files. Requirements listed in
//! `go.mod` are looked up in the module cache and assembled the same way.

use crate::error::PackError;
use crate::go_mod::{GoMod, Require};
use crate::mod_cache::ModCache;
use crate::options::{BuildOptions, Layout};
use goluau_luau::{File, RenderOptions, render_module_with};
use goluau_transform::{TransformOptions, lower_source_with, synthesize_exports};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A source directory and the files it contributes to its output module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub dir: PathBuf,
    pub out: PathBuf,
    /// `.go` files, sorted; `_test.go` files are never included.
    pub sources: Vec<PathBuf>,
    /// `.luau`/`.lua` files copied unchanged, sorted.
    pub includes: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Every written `init.luau`, in build order.
    pub modules: Vec<PathBuf>,
    /// Translated dependencies as `path@version`, in resolution order.
    pub dependencies: Vec<String>,
}

pub struct Packer<'a> {
    build: &'a BuildOptions,
    transform: &'a TransformOptions,
    render: &'a RenderOptions,
    mod_cache: Option<ModCache>,
}

impl<'a> Packer<'a> {
    pub fn new(build: &'a BuildOptions, transform: &'a TransformOptions, render: &'a RenderOptions) -> Self {
        Self {
            build,
            transform,
            render,
            mod_cache: None,
        }
    }

    /// Use `cache` instead of locating the module cache from the environment.
    pub fn with_mod_cache(mut self, cache: ModCache) -> Self {
        self.mod_cache = Some(cache);
        self
    }

    /// Build the project rooted at `root` into the configured output
    /// directory.
    pub fn build(&self, root: &Path) -> Result<BuildReport, PackError> {
        let out = &self.build.out;
        let go_mod = GoMod::read(&root.join("go.mod"))?;
        let mut report = BuildReport::default();

        let include_root = match self.build.layout {
            Layout::Flat => out.join(&self.build.include_dir),
            Layout::Rojo => out.join("shared").join(&self.build.include_dir),
        };

        match self.build.layout {
            Layout::Flat => {
                let packages = self.discover(root, out)?;
                self.emit(&packages, root, &mut report)?;
            }
            Layout::Rojo => {
                let shared_out = match &go_mod {
                    Some(m) => include_root.join(&m.module),
                    None => out.join("shared"),
                };
                let roots = [
                    ("server", out.join("server")),
                    ("client", out.join("client")),
                    ("shared", shared_out),
                ];
                for (side, side_out) in roots {
                    let dir = root.join(side);
                    if !dir.is_dir() {
                        warn!(dir = %dir.display(), "no {side} directory, skipping");
                        continue;
                    }
                    let packages = self.discover(&dir, &side_out)?;
                    self.emit(&packages, root, &mut report)?;
                }
            }
        }

        match (&go_mod, self.build.dependencies) {
            (Some(project), true) => self.dependencies(project, &include_root, &mut report)?,
            (None, true) => debug!(root = %root.display(), "no go.mod, skipping dependencies"),
            _ => {}
        }
        Ok(report)
    }

    /// Packages of a project tree. Hidden, git-ignored and excluded
    /// directories are skipped, as is the output directory.
    pub fn discover(&self, root: &Path, out: &Path) -> Result<Vec<Package>, PackError> {
        let exclude = self.build.exclude.clone();
        let out_dir = self.build.out.clone();
        let walker = ignore::WalkBuilder::new(root)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .filter_entry(move |e| {
                e.depth() == 0 || !(is_excluded(e.file_name(), &exclude) || e.path() == out_dir)
            })
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| PackError::Walk {
                path: root.to_path_buf(),
                message: e.to_string(),
            })?;
            if entry.file_type().is_some_and(|t| t.is_file()) {
                files.push(entry.into_path());
            }
        }
        Ok(group(root, out, files))
    }

    /// Packages of a module in the module cache. Nested modules and
    /// `testdata` directories belong to no package.
    pub fn discover_module(&self, dir: &Path, out: &Path) -> Result<Vec<Package>, PackError> {
        let walker = WalkDir::new(dir).into_iter().filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name();
            !(name == "testdata" || is_excluded(name, &self.build.exclude) || e.path().join("go.mod").is_file())
        });

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| PackError::Walk {
                path: dir.to_path_buf(),
                message: e.to_string(),
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(group(dir, out, files))
    }

    /// Lower every source of `package` and merge the results into one
    /// module. Source positions are reported relative to `label_root`.
    pub fn assemble(&self, package: &Package, label_root: &Path) -> Result<File, PackError> {
        let lowered = package
            .sources
            .par_iter()
            .map(|path| -> Result<_, PackError> {
                let source = std::fs::read_to_string(path).map_err(|e| PackError::io(path, e))?;
                let label = path.strip_prefix(label_root).unwrap_or(path).display().to_string();
                Ok(lower_source_with(&label, &source, self.transform)?)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let name = package
            .dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut file = File::new(name, &package.out);
        file.includes = package.includes.clone();
        for decls in lowered {
            file.extend(decls);
        }
        if !package.sources.is_empty() {
            let exports = synthesize_exports(file.decls());
            file.push(exports);
        }
        Ok(file)
    }

    /// Write `init.luau` (when the module has Go sources) and copy includes.
    /// Returns the path of the written `init.luau`.
    pub fn write(&self, file: &File) -> Result<Option<PathBuf>, PackError> {
        std::fs::create_dir_all(&file.out).map_err(|e| PackError::io(&file.out, e))?;

        let mut written = None;
        if !file.is_empty() {
            debug!(module = %file.name, decls = file.decls().len(), "rendering module");
            let init = file.out.join("init.luau");
            std::fs::write(&init, render_module_with(file, self.render)).map_err(|e| PackError::io(&init, e))?;
            info!(module = %file.name, path = %init.display(), "wrote module");
            written = Some(init);
        }

        for include in &file.includes {
            let Some(name) = include.file_name() else {
                continue;
            };
            let target = file.out.join(name);
            std::fs::copy(include, &target).map_err(|e| PackError::io(include, e))?;
            debug!(from = %include.display(), to = %target.display(), "copied include");
        }
        Ok(written)
    }

    fn emit(&self, packages: &[Package], label_root: &Path, report: &mut BuildReport) -> Result<(), PackError> {
        let files = packages
            .par_iter()
            .map(|p| self.assemble(p, label_root))
            .collect::<Result<Vec<_>, _>>()?;
        for file in &files {
            report.modules.extend(self.write(file)?);
        }
        Ok(())
    }

    /// Translate every module `project` requires, directly or through other
    /// requirements. The first version seen of a module wins.
    fn dependencies(&self, project: &GoMod, include_root: &Path, report: &mut BuildReport) -> Result<(), PackError> {
        let Some(first) = project.requires.first() else {
            return Ok(());
        };
        let cache = match &self.mod_cache {
            Some(cache) => cache.clone(),
            None => ModCache::locate().ok_or_else(|| PackError::NoModuleCache {
                module: first.path.clone(),
            })?,
        };

        let mut visited = HashSet::from([project.module.clone()]);
        let mut queue: VecDeque<Require> = project.requires.iter().cloned().collect();
        while let Some(require) = queue.pop_front() {
            if require.path == project.module {
                warn!(module = %require.path, "skipping requirement on the project itself");
                continue;
            }
            if !visited.insert(require.path.clone()) {
                continue;
            }

            let dir = cache
                .resolve(&require.path, &require.version)
                .ok_or_else(|| PackError::MissingDependency {
                    module: require.path.clone(),
                    version: require.version.clone(),
                    cache: cache.root().to_path_buf(),
                })?;
            info!(module = %require.path, version = %require.version, "resolved dependency");

            let packages = self.discover_module(&dir, &include_root.join(&require.path))?;
            self.emit(&packages, cache.root(), report)?;
            report.dependencies.push(format!("{}@{}", require.path, require.version));

            if let Some(module) = GoMod::read(&dir.join("go.mod"))? {
                queue.extend(module.requires);
            }
        }
        Ok(())
    }
}

fn is_excluded(name: &OsStr, exclude: &[String]) -> bool {
    exclude.iter().any(|e| name == e.as_str())
}

enum Role {
    Source,
    Include,
}

fn role(path: &Path) -> Option<Role> {
    let name = path.file_name()?.to_str()?;
    if name.ends_with("_test.go") {
        None
    } else if name.ends_with(".go") {
        Some(Role::Source)
    } else if name.ends_with(".luau") || name.ends_with(".lua") {
        Some(Role::Include)
    } else {
        None
    }
}

/// Group files by directory. `root` itself maps to `out`; every other
/// directory maps to the same relative path under `out`.
fn group(root: &Path, out: &Path, files: Vec<PathBuf>) -> Vec<Package> {
    let mut packages: BTreeMap<PathBuf, Package> = BTreeMap::new();
    for path in files {
        let Some(role) = role(&path) else {
            continue;
        };
        let Some(dir) = path.parent() else {
            continue;
        };
        let package = packages.entry(dir.to_path_buf()).or_insert_with(|| {
            let rel = dir.strip_prefix(root).unwrap_or(Path::new(""));
            Package {
                dir: dir.to_path_buf(),
                out: if rel.as_os_str().is_empty() {
                    out.to_path_buf()
                } else {
                    out.join(rel)
                },
                sources: Vec::new(),
                includes: Vec::new(),
            }
        });
        match role {
            Role::Source => package.sources.push(path),
            Role::Include => package.includes.push(path),
        }
    }

    let mut packages: Vec<Package> = packages.into_values().collect();
    for package in &mut packages {
        package.sources.sort();
        package.includes.sort();
    }
    packages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouping_by_directory() {
        let root = Path::new("/p");
        let files = vec![
            PathBuf::from("/p/util/b.go"),
            PathBuf::from("/p/main.go"),
            PathBuf::from("/p/util/a.go"),
            PathBuf::from("/p/util/a_test.go"),
            PathBuf::from("/p/util/helper.luau"),
            PathBuf::from("/p/README.md"),
        ];
        let packages = group(root, Path::new("/o"), files);
        assert_eq!(
            packages,
            vec![
                Package {
                    dir: PathBuf::from("/p"),
                    out: PathBuf::from("/o"),
                    sources: vec![PathBuf::from("/p/main.go")],
                    includes: vec![],
                },
                Package {
                    dir: PathBuf::from("/p/util"),
                    out: PathBuf::from("/o/util"),
                    sources: vec![PathBuf::from("/p/util/a.go"), PathBuf::from("/p/util/b.go")],
                    includes: vec![PathBuf::from("/p/util/helper.luau")],
                },
            ]
        );
    }
}
