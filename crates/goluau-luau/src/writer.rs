//! Indentation-aware text sink.

use serde::Deserialize;

/// Rendering options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// One level of indentation.
    pub indent: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent: "\t".to_string(),
        }
    }
}

/// Accumulates rendered text and tracks the current indentation depth.
///
/// This is the only mutable state of a render; one writer serves exactly one
/// module.
#[derive(Debug)]
pub struct Writer {
    output: String,
    indent: usize,
    unit: String,
}

impl Writer {
    pub fn new() -> Self {
        Self::with_options(&RenderOptions::default())
    }

    pub fn with_options(options: &RenderOptions) -> Self {
        Self {
            output: String::new(),
            indent: 0,
            unit: options.indent.clone(),
        }
    }

    /// Append text as-is.
    pub fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    /// Append the current indentation, then `s`.
    pub fn pre(&mut self, s: &str) {
        for _ in 0..self.indent {
            self.output.push_str(&self.unit);
        }
        self.output.push_str(s);
    }

    /// Append an indented line.
    pub fn line(&mut self, s: &str) {
        self.pre(s);
        self.newline();
    }

    pub fn newline(&mut self) {
        self.output.push('\n');
    }

    pub fn push_indent(&mut self) {
        self.indent += 1;
    }

    pub fn pop_indent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn depth(&self) -> usize {
        self.indent
    }

    pub fn as_str(&self) -> &str {
        &self.output
    }

    pub fn finish(self) -> String {
        self.output
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pre_uses_current_depth() {
        let mut w = Writer::with_options(&RenderOptions {
            indent: "  ".into(),
        });
        w.line("a");
        w.push_indent();
        w.line("b");
        w.push_indent();
        w.pre("c");
        w.write("d");
        w.newline();
        w.pop_indent();
        w.pop_indent();
        w.line("e");
        assert_eq!(w.finish(), "a\n  b\n    cd\ne\n");
    }

    #[test]
    fn pop_below_zero_is_clamped() {
        let mut w = Writer::new();
        w.pop_indent();
        assert_eq!(w.depth(), 0);
        w.line("x");
        assert_eq!(w.as_str(), "x\n");
    }
}
