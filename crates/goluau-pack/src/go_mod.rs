//! Minimal `go.mod` reader: the module path, the `go` version and the
//! `require` directives. Everything else is skipped.

use crate::error::PackError;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GoMod {
    pub module: String,
    pub go: Option<String>,
    pub requires: Vec<Require>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Require {
    pub path: String,
    pub version: String,
    /// Marked `// indirect`.
    pub indirect: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct GoModError {
    pub line: usize,
    pub message: String,
}

impl GoMod {
    /// Read and parse `path`. A missing file is `Ok(None)`.
    pub fn read(path: &Path) -> Result<Option<GoMod>, PackError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PackError::io(path, e)),
        };
        parse(&content).map(Some).map_err(|source| PackError::GoMod {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Block {
    None,
    Require,
    Other,
}

pub fn parse(content: &str) -> Result<GoMod, GoModError> {
    let mut module = None;
    let mut go = None;
    let mut requires = Vec::new();
    let mut block = Block::None;

    for (index, raw) in content.lines().enumerate() {
        let line = index + 1;
        let err = |message: &str| GoModError {
            line,
            message: message.to_string(),
        };
        let (code, comment) = match raw.find("//") {
            Some(at) => (&raw[..at], Some(raw[at + 2..].trim())),
            None => (raw, None),
        };
        let code = code.trim();
        if code.is_empty() {
            continue;
        }

        if block != Block::None {
            if code == ")" {
                block = Block::None;
            } else if block == Block::Require {
                requires.push(require(code, comment).ok_or_else(|| err("malformed require"))?);
            }
            continue;
        }

        let (verb, rest) = code.split_once(char::is_whitespace).unwrap_or((code, ""));
        let rest = rest.trim();
        match verb {
            "module" => module = Some(unquote(rest).to_string()),
            "go" => go = Some(rest.to_string()),
            "require" if rest == "(" => block = Block::Require,
            "require" => requires.push(require(rest, comment).ok_or_else(|| err("malformed require"))?),
            _ if rest == "(" => block = Block::Other,
            "replace" | "exclude" | "retract" | "toolchain" | "godebug" => {}
            other => return Err(err(&format!("unknown directive `{other}`"))),
        }
    }

    if block != Block::None {
        return Err(GoModError {
            line: content.lines().count(),
            message: "unterminated block".to_string(),
        });
    }
    let module = module.filter(|m| !m.is_empty()).ok_or(GoModError {
        line: 1,
        message: "missing module directive".to_string(),
    })?;
    Ok(GoMod { module, go, requires })
}

fn require(spec: &str, comment: Option<&str>) -> Option<Require> {
    let mut parts = spec.split_whitespace();
    let path = unquote(parts.next()?);
    let version = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Require {
        path: path.to_string(),
        version: version.to_string(),
        indirect: comment.is_some_and(|c| c == "indirect" || c.starts_with("indirect;")),
    })
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_version_and_requires() {
        let m = parse(
            r#"module github.com/me/game

go 1.22

require github.com/x/single v1.0.0

require (
	github.com/x/logger v0.3.1
	golang.org/x/text v0.14.0 // indirect
)

replace github.com/x/logger => ../logger
"#,
        )
        .unwrap();
        assert_eq!(m.module, "github.com/me/game");
        assert_eq!(m.go.as_deref(), Some("1.22"));
        assert_eq!(
            m.requires,
            vec![
                Require {
                    path: "github.com/x/single".into(),
                    version: "v1.0.0".into(),
                    indirect: false,
                },
                Require {
                    path: "github.com/x/logger".into(),
                    version: "v0.3.1".into(),
                    indirect: false,
                },
                Require {
                    path: "golang.org/x/text".into(),
                    version: "v0.14.0".into(),
                    indirect: true,
                },
            ]
        );
    }

    #[test]
    fn other_blocks_are_skipped() {
        let m = parse("module a\n\nreplace (\n\tb => ../b\n)\nexclude (\n\tc v1.0.0\n)\n").unwrap();
        assert_eq!(m.module, "a");
        assert!(m.requires.is_empty());
    }

    #[test]
    fn quoted_module_path() {
        assert_eq!(parse("module \"example.com/q\"\n").unwrap().module, "example.com/q");
    }

    #[test]
    fn errors_carry_line() {
        let err = parse("module a\nrequire (\n\tbroken\n)\n").unwrap_err();
        assert_eq!(err.line, 3);

        let err = parse("go 1.22\n").unwrap_err();
        assert_eq!(err.message, "missing module directive");

        let err = parse("module a\nrequire (\n\tb v1\n").unwrap_err();
        assert_eq!(err.message, "unterminated block");

        let err = parse("module a\nfrobnicate x\n").unwrap_err();
        assert_eq!(err.line, 2);
    }
}
