//! Output modules and the fixed phase ordering applied before rendering.

use crate::ast::Stmt;
use crate::render::Render;
use crate::writer::{RenderOptions, Writer};
use std::path::PathBuf;

/// One output module: the merged declarations of every source file that maps
/// to the same output directory.
#[derive(Debug, Clone, Default)]
pub struct File {
    pub name: String,
    /// Directory the module is written to.
    pub out: PathBuf,
    /// Target-language files copied next to the module unchanged.
    pub includes: Vec<PathBuf>,
    decls: Vec<Stmt>,
}

impl File {
    pub fn new(name: impl Into<String>, out: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            out: out.into(),
            includes: Vec::new(),
            decls: Vec::new(),
        }
    }

    /// Append the declarations of another source file.
    pub fn extend(&mut self, decls: impl IntoIterator<Item = Stmt>) {
        self.decls.extend(decls);
    }

    pub fn push(&mut self, decl: Stmt) {
        self.decls.push(decl);
    }

    pub fn decls(&self) -> &[Stmt] {
        &self.decls
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

/// Render bucket of a top-level declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Raw,
    Decl,
    Func,
    Other,
}

impl Phase {
    pub fn of(stmt: &Stmt) -> Phase {
        match stmt {
            Stmt::Raw(_) => Phase::Raw,
            Stmt::Decl(_) => Phase::Decl,
            Stmt::Func(_) => Phase::Func,
            _ => Phase::Other,
        }
    }
}

fn flatten<'a>(decls: &'a [Stmt], out: &mut Vec<&'a Stmt>) {
    for decl in decls {
        match decl {
            Stmt::Block(block) => flatten(&block.body, out),
            other => out.push(other),
        }
    }
}

/// Stable partition of `decls` into raw text, declarations, functions and
/// everything else. Top-level blocks are flattened first so their members
/// land in their own phase. Every input statement appears exactly once.
pub fn phase_order(decls: &[Stmt]) -> Vec<&Stmt> {
    let mut flat = Vec::with_capacity(decls.len());
    flatten(decls, &mut flat);

    let mut buckets: [Vec<&Stmt>; 4] = Default::default();
    for stmt in flat {
        buckets[Phase::of(stmt) as usize].push(stmt);
    }
    buckets.into_iter().flatten().collect()
}

pub fn render_module(file: &File) -> String {
    render_module_with(file, &RenderOptions::default())
}

pub fn render_module_with(file: &File, options: &RenderOptions) -> String {
    let mut w = Writer::with_options(options);
    for stmt in phase_order(file.decls()) {
        stmt.render(&mut w);
    }
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Chunk, Expr, FuncStmt, Ident};
    use crate::token::Scope;

    fn func(name: &str) -> Stmt {
        Stmt::Func(FuncStmt {
            scope: Scope::Global,
            name: Ident::new(name),
            params: vec![],
            body: Chunk::default(),
        })
    }

    #[test]
    fn phases_are_stable() {
        let decls = vec![
            func("a"),
            Stmt::local("x", Expr::number("1")),
            Stmt::ret(vec![]),
            Stmt::raw("-- one"),
            func("b"),
            Stmt::local("y", Expr::number("2")),
            Stmt::raw("-- two"),
        ];
        let ordered = phase_order(&decls);
        let phases: Vec<Phase> = ordered.iter().map(|s| Phase::of(s)).collect();
        assert_eq!(
            phases,
            vec![
                Phase::Raw,
                Phase::Raw,
                Phase::Decl,
                Phase::Decl,
                Phase::Func,
                Phase::Func,
                Phase::Other
            ]
        );
        assert_eq!(ordered[0], &decls[3]);
        assert_eq!(ordered[1], &decls[6]);
        assert_eq!(ordered[4], &decls[0]);
        assert_eq!(ordered[5], &decls[4]);
    }

    #[test]
    fn blocks_are_flattened() {
        let decls = vec![
            func("f"),
            Stmt::block(vec![
                Stmt::local("T", Expr::table(vec![])),
                Stmt::assign(
                    vec![Expr::selector(Expr::ident("T"), "__index")],
                    crate::token::Operator::Assign,
                    vec![Expr::ident("T")],
                ),
            ]),
        ];
        let ordered = phase_order(&decls);
        assert_eq!(ordered.len(), 3);
        assert_eq!(Phase::of(ordered[0]), Phase::Decl);
        assert_eq!(Phase::of(ordered[1]), Phase::Func);
        assert_eq!(Phase::of(ordered[2]), Phase::Other);
    }

    #[test]
    fn render_module_orders_and_renders_once() {
        let mut file = File::new("demo", "out/demo");
        file.push(func("main"));
        file.extend([
            Stmt::local("x", Expr::number("1")),
            Stmt::raw("local json = require(\"json\")"),
        ]);
        let out = render_module(&file);
        assert_eq!(
            out,
            "local json = require(\"json\")\nlocal x = 1\nfunction main()\nend\n"
        );
    }

    #[test]
    fn custom_indent() {
        let mut file = File::new("demo", "out");
        file.push(Stmt::Func(FuncStmt {
            scope: Scope::Global,
            name: Ident::new("f"),
            params: vec![],
            body: Chunk::new(vec![Stmt::ret(vec![Expr::number("1")])]),
        }));
        let out = render_module_with(
            &file,
            &RenderOptions {
                indent: "    ".into(),
            },
        );
        assert_eq!(out, "function f()\n    return 1\nend\n");
    }
}
