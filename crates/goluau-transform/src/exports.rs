//! Module export table.

use crate::source::is_exported;
use goluau_luau::{Expr, Ident, KeyValueExpr, Stmt, TableField};

/// Build the `return { Name = Name, ... }` statement that ends a module.
///
/// Declarations contribute their upper-case names; functions contribute their
/// name unless it is receiver-qualified (`T.M`). Blocks are searched
/// recursively.
pub fn synthesize_exports(decls: &[Stmt]) -> Stmt {
    let mut names = Vec::new();
    collect(decls, &mut names);

    let fields = names
        .into_iter()
        .map(|name| {
            TableField::KeyValue(KeyValueExpr {
                key: Expr::Ident(name.clone()),
                value: Expr::Ident(name),
            })
        })
        .collect();
    Stmt::ret(vec![Expr::table(fields)])
}

fn collect(decls: &[Stmt], names: &mut Vec<Ident>) {
    for decl in decls {
        match decl {
            Stmt::Block(block) => collect(&block.body, names),
            Stmt::Decl(d) => names.extend(d.names().iter().filter(|n| is_exported(&n.name)).cloned()),
            Stmt::Func(f) if !f.name.is_qualified() => names.push(f.name.clone()),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goluau_luau::{Chunk, FuncStmt, Render, Scope};

    fn func(name: &str) -> Stmt {
        Stmt::Func(FuncStmt {
            scope: Scope::Global,
            name: Ident::new(name),
            params: vec![],
            body: Chunk::default(),
        })
    }

    fn global(name: &str) -> Stmt {
        Stmt::Decl(goluau_luau::DeclStmt::single(
            Scope::Global,
            Ident::new(name),
            Expr::number("1"),
        ))
    }

    #[test]
    fn methods_and_lower_case_values_are_excluded() {
        let decls = vec![func("Foo"), func("Entity.Bar"), global("baz"), global("Qux")];
        let out = synthesize_exports(&decls).to_luau();
        assert_eq!(out, "return {\n\tFoo = Foo,\n\tQux = Qux\n}\n");
    }

    #[test]
    fn blocks_are_searched() {
        let decls = vec![Stmt::block(vec![global("A"), Stmt::block(vec![global("B")])])];
        let out = synthesize_exports(&decls).to_luau();
        assert_eq!(out, "return {\n\tA = A,\n\tB = B\n}\n");
    }

    #[test]
    fn nothing_exported() {
        assert_eq!(synthesize_exports(&[]).to_luau(), "return {}\n");
    }
}
