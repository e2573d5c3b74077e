//! `goluau translate`: one Go file to one Luau module.

use crate::config::GoluauConfig;
use goluau_transform::{lower_source_with, translate_with};
use std::path::Path;

/// Translate `file`, writing to `output` or stdout. With `ast`, print the
/// lowered declarations as JSON instead of Luau.
pub fn cmd_translate(file: &Path, output: Option<&Path>, ast: bool) -> i32 {
    let root = file.parent().unwrap_or(Path::new("."));
    let config = match GoluauConfig::load(root) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return 1;
        }
    };

    let source = match std::fs::read_to_string(file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: {}: {e}", file.display());
            return 1;
        }
    };

    let label = file.display().to_string();
    let rendered = if ast {
        lower_source_with(&label, &source, &config.transform.lowering)
            .map_err(|e| e.to_string())
            .and_then(|decls| serde_json::to_string_pretty(&decls).map_err(|e| e.to_string()))
            .map(|json| json + "\n")
    } else {
        translate_with(
            &label,
            &source,
            &config.transform.lowering,
            &config.transform.render,
        )
        .map_err(|e| e.to_string())
    };

    let text = match rendered {
        Ok(text) => text,
        Err(e) => {
            eprintln!("error: {e}");
            return 1;
        }
    };

    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, text) {
                eprintln!("error: {}: {e}", path.display());
                return 1;
            }
        }
        None => print!("{text}"),
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_module() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("hello.go");
        let out = dir.path().join("hello.luau");
        std::fs::write(&src, "package main\n\nfunc main() {\n\tprint(\"hello\")\n}\n").unwrap();

        assert_eq!(cmd_translate(&src, Some(&out), false), 0);
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "function main()\n\tprint(\"hello\")\nend\nreturn {\n\tmain = main\n}\n"
        );
    }

    #[test]
    fn honours_project_indent() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("hello.go");
        let out = dir.path().join("hello.luau");
        std::fs::write(dir.path().join("goluau.toml"), "[transform]\nindent = \"  \"\n").unwrap();
        std::fs::write(&src, "package main\n\nfunc main() {\n\tprint(1)\n}\n").unwrap();

        assert_eq!(cmd_translate(&src, Some(&out), false), 0);
        assert!(std::fs::read_to_string(&out).unwrap().starts_with("function main()\n  print(1)\nend\n"));
    }

    #[test]
    fn ast_dump_is_json() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("v.go");
        let out = dir.path().join("v.json");
        std::fs::write(&src, "package main\n\nvar X = 1\n").unwrap();

        assert_eq!(cmd_translate(&src, Some(&out), true), 0);
        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn unsupported_input_fails() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("bad.go");
        std::fs::write(&src, "package main\n\nfunc f() {\n\tgo f()\n}\n").unwrap();
        assert_eq!(cmd_translate(&src, Some(&dir.path().join("bad.luau")), false), 1);
        assert!(!dir.path().join("bad.luau").exists());
    }
}
