//! Go parsing and literal decoding.

use crate::error::{Position, TranslateError};
use tree_sitter::{Node, Parser, Tree};

/// Parse Go source. Any error or missing node in the tree fails the file.
pub fn parse(file: &str, source: &str) -> Result<Tree, TranslateError> {
    let mut parser = Parser::new();
    parser
        .set_language(&arborium_go::language().into())
        .map_err(|err| TranslateError::Parse {
            position: position(file, None),
            message: err.to_string(),
        })?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| TranslateError::Parse {
            position: position(file, None),
            message: "failed to parse".into(),
        })?;

    let root = tree.root_node();
    if root.has_error() {
        let bad = first_error(root);
        let message = match bad {
            Some(node) if node.is_missing() => format!("missing {}", node.kind()),
            Some(node) => {
                let text = node.utf8_text(source.as_bytes()).unwrap_or("");
                format!("unexpected `{}`", text.lines().next().unwrap_or(""))
            }
            None => "syntax error in source".into(),
        };
        return Err(TranslateError::Parse {
            position: position(file, bad),
            message,
        });
    }
    Ok(tree)
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(first_error)
}

pub fn position(file: &str, node: Option<Node>) -> Position {
    let (line, column) = node
        .map(|n| {
            let p = n.start_position();
            (p.row + 1, p.column + 1)
        })
        .unwrap_or((1, 1));
    Position {
        file: file.to_string(),
        line,
        column,
    }
}

/// Decode a Go string literal, interpreted (`"..."`) or raw (`` `...` ``).
///
/// Byte escapes that do not form valid UTF-8 are replaced; use
/// [`decode_bytes`] where the exact bytes matter.
pub fn decode_string(literal: &str) -> Result<String, String> {
    decode_bytes(literal).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

/// Decode a Go string literal into its bytes. `\x` and octal escapes
/// produce single bytes.
pub fn decode_bytes(literal: &str) -> Result<Vec<u8>, String> {
    if let Some(raw) = literal.strip_prefix('`').and_then(|s| s.strip_suffix('`')) {
        // carriage returns are discarded from raw strings
        return Ok(raw.replace('\r', "").into_bytes());
    }
    let inner = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| format!("malformed string literal {literal}"))?;
    decode_escapes(inner, Unit::Byte)
}

/// Decode a rune literal (`'a'`, `'\n'`, `'é'`) into its text. `\x` and
/// octal escapes name a code point.
pub fn decode_rune(literal: &str) -> Result<String, String> {
    let inner = literal
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .ok_or_else(|| format!("malformed rune literal {literal}"))?;
    let bytes = decode_escapes(inner, Unit::CodePoint)?;
    String::from_utf8(bytes).map_err(|_| format!("invalid rune literal {literal}"))
}

/// What a `\x` or octal escape denotes.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Unit {
    Byte,
    CodePoint,
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

fn push_unit(out: &mut Vec<u8>, value: u8, unit: Unit) {
    match unit {
        Unit::Byte => out.push(value),
        Unit::CodePoint => push_char(out, char::from(value)),
    }
}

fn decode_escapes(inner: &str, unit: Unit) -> Result<Vec<u8>, String> {
    let mut out: Vec<u8> = Vec::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            push_char(&mut out, c);
            continue;
        }
        let esc = chars.next().ok_or("trailing backslash")?;
        match esc {
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0c),
            'n' => out.push(b'\n'),
            'r' => out.push(b'\r'),
            't' => out.push(b'\t'),
            'v' => out.push(0x0b),
            '\\' => out.push(b'\\'),
            '\'' => out.push(b'\''),
            '"' => out.push(b'"'),
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                let value = u8::from_str_radix(&hex, 16).map_err(|_| format!("bad escape \\x{hex}"))?;
                push_unit(&mut out, value, unit);
            }
            '0'..='7' => {
                let mut digits = String::from(esc);
                digits.extend(chars.by_ref().take(2));
                let value = u8::from_str_radix(&digits, 8).map_err(|_| format!("bad escape \\{digits}"))?;
                push_unit(&mut out, value, unit);
            }
            'u' | 'U' => {
                let len = if esc == 'u' { 4 } else { 8 };
                let hex: String = chars.by_ref().take(len).collect();
                let c = u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| format!("bad escape \\{esc}{hex}"))?;
                push_char(&mut out, c);
            }
            other => return Err(format!("unknown escape \\{other}")),
        }
    }
    Ok(out)
}

/// Normalise a Go integer literal to a form Luau reads the same way.
///
/// Underscores are dropped and octal literals (`0o17`, `017`) become decimal.
/// Hex and binary literals are kept.
pub fn int_literal(text: &str) -> Result<String, String> {
    let clean = text.replace('_', "");
    let lower = clean.to_ascii_lowercase();
    let octal = if let Some(digits) = lower.strip_prefix("0o") {
        Some(digits.to_string())
    } else if lower.len() > 1 && lower.starts_with('0') && lower.bytes().all(|b| b.is_ascii_digit()) {
        Some(lower[1..].to_string())
    } else {
        None
    };
    match octal {
        Some(digits) => u64::from_str_radix(&digits, 8)
            .map(|v| v.to_string())
            .map_err(|_| format!("invalid octal literal {text}")),
        None => Ok(clean),
    }
}

/// Normalise a Go float literal. Hexadecimal floats have no Luau spelling.
pub fn float_literal(text: &str) -> Result<String, String> {
    let clean = text.replace('_', "");
    if clean.starts_with("0x") || clean.starts_with("0X") {
        return Err(format!("hexadecimal float {text}"));
    }
    Ok(clean)
}

/// Reserved words of Luau that are valid Go identifiers.
const LUAU_KEYWORDS: &[&str] = &[
    "and", "do", "elseif", "end", "false", "function", "in", "local", "nil", "not", "or", "repeat",
    "then", "true", "until", "while",
];

pub fn is_luau_keyword(name: &str) -> bool {
    LUAU_KEYWORDS.contains(&name)
}

/// Spell a Go identifier as a Luau name.
pub fn luau_name(name: &str) -> String {
    if is_luau_keyword(name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
