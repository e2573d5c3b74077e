//! Calls to Go's predeclared functions.

use super::{Lowerer, Result};
use goluau_luau::{Expr, Operator};
use tree_sitter::Node;

const NUMERIC_TYPES: &[&str] = &[
    "int", "int8", "int16", "int32", "int64", "uint", "uint8", "uint16", "uint32", "uint64", "uintptr",
    "float32", "float64", "byte", "rune",
];

impl<'s> Lowerer<'s> {
    /// Lower a call to an unshadowed builtin. Returns `None` for names that
    /// are not builtins so the call is lowered as an ordinary one.
    pub(crate) fn lower_builtin(&mut self, name: &str, call: Node, args: &[Node]) -> Result<Option<Expr>> {
        let expr = match name {
            "len" | "cap" => Expr::unary(Operator::Len, self.single_arg(name, call, args)?),
            "print" | "println" => Expr::call(Expr::ident("print"), self.lower_args(args)?),
            "panic" => Expr::call(Expr::ident("error"), self.lower_args(args)?),
            "append" | "delete" | "copy" => Expr::call(self.runtime(name), self.lower_args(args)?),
            "min" | "max" => Expr::call(
                Expr::selector(Expr::ident("math"), name),
                self.lower_args(args)?,
            ),
            "string" => Expr::call(Expr::ident("tostring"), vec![self.single_arg(name, call, args)?]),
            n if NUMERIC_TYPES.contains(&n) => self.single_arg(name, call, args)?,
            "make" => {
                let ty = args
                    .first()
                    .ok_or_else(|| self.unsupported(call, "builtin", "make without a type"))?;
                if ty.kind() == "channel_type" {
                    return Err(self.unsupported(*ty, "builtin", "channels"));
                }
                Expr::table(vec![])
            }
            "new" => {
                let [ty] = args[..] else {
                    return Err(self.unsupported(call, "builtin", "new takes one type"));
                };
                if ty.kind() == "channel_type" {
                    return Err(self.unsupported(ty, "builtin", "channels"));
                }
                let table = Expr::table(vec![]);
                // predeclared types have no namespace table
                if ty.kind() == "type_identifier" && self.lookup(self.text(ty)).is_none() {
                    return Ok(Some(table));
                }
                match self.type_ref(ty)? {
                    Some(namespace) => Expr::call(Expr::ident("setmetatable"), vec![table, namespace]),
                    None => table,
                }
            }
            "close" => return Err(self.unsupported(call, "builtin", "channels")),
            "complex" | "real" | "imag" => return Err(self.unsupported(call, "builtin", "complex numbers")),
            _ => return Ok(None),
        };
        Ok(Some(expr))
    }

    fn single_arg(&mut self, name: &str, call: Node, args: &[Node]) -> Result<Expr> {
        match args {
            [arg] => self.lower_expression(*arg),
            _ => Err(self.unsupported(call, "builtin", format!("{name} takes one argument"))),
        }
    }
}
