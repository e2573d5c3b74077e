//! Luau syntax tree.
//!
//! Nodes are built once during lowering and consumed once by the renderer.
//! Nothing here mutates a node after construction; larger trees are made by
//! composing new nodes.

use crate::token::{Operator, Scope};
use serde::Serialize;

/// A name. Receiver-qualified function names keep their separator (`Entity.Bar`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Ident {
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The discard placeholder `_`.
    pub fn blank() -> Self {
        Self::new("_")
    }

    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }

    /// Whether the name designates an entry in a namespace table (`T.M`).
    pub fn is_qualified(&self) -> bool {
        self.name.contains('.')
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericLit {
    pub value: String,
}

/// A string literal. `value` holds the decoded bytes, which need not be
/// valid UTF-8; the renderer escapes them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringLit {
    #[serde(serialize_with = "serialize_lossy")]
    pub value: Vec<u8>,
}

fn serialize_lossy<S: serde::Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

/// Verbatim Luau text. Never re-parsed, quoted or escaped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Raw {
    pub content: String,
}

impl Raw {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyValueExpr {
    pub key: Expr,
    pub value: Expr,
}

/// One element of a table constructor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TableField {
    Value(Expr),
    /// `name = v` for an identifier key, `[key] = v` otherwise.
    KeyValue(KeyValueExpr),
    /// `[key] = v`, whatever the key.
    Computed(KeyValueExpr),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TableLit {
    pub fields: Vec<TableField>,
}

impl TableLit {
    pub fn new(fields: Vec<TableField>) -> Self {
        Self { fields }
    }

    /// Tables with at least one keyed field are laid out one field per line.
    pub fn is_multiline(&self) -> bool {
        self.fields
            .iter()
            .any(|f| matches!(f, TableField::KeyValue(_) | TableField::Computed(_)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexExpr {
    pub subject: Box<Expr>,
    pub index: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectorExpr {
    pub subject: Box<Expr>,
    pub field: Ident,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub op: Operator,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnaryExpr {
    pub op: Operator,
    pub operand: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParenExpr {
    pub inner: Box<Expr>,
}

/// Anonymous function expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuncLit {
    pub params: Vec<Ident>,
    pub body: Chunk,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Ident(Ident),
    Numeric(NumericLit),
    String(StringLit),
    Table(TableLit),
    Call(CallExpr),
    Index(IndexExpr),
    Selector(SelectorExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Paren(ParenExpr),
    Func(FuncLit),
    /// `nil`.
    Nil,
    Bool(bool),
    Raw(Raw),
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(Ident::new(name))
    }

    pub fn number(value: impl Into<String>) -> Self {
        Expr::Numeric(NumericLit {
            value: value.into(),
        })
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::bytes(value.into().into_bytes())
    }

    /// A string literal from raw bytes.
    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Expr::String(StringLit {
            value: value.into(),
        })
    }

    pub fn raw(content: impl Into<String>) -> Self {
        Expr::Raw(Raw::new(content))
    }

    pub fn nil() -> Self {
        Expr::Nil
    }

    pub fn bool(value: bool) -> Self {
        Expr::Bool(value)
    }

    pub fn table(fields: Vec<TableField>) -> Self {
        Expr::Table(TableLit::new(fields))
    }

    /// A table of bare values: `{a, b, c}`.
    pub fn list(items: Vec<Expr>) -> Self {
        Expr::Table(TableLit::new(
            items.into_iter().map(TableField::Value).collect(),
        ))
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call(CallExpr {
            callee: Box::new(callee),
            args,
        })
    }

    pub fn index(subject: Expr, index: Expr) -> Self {
        Expr::Index(IndexExpr {
            subject: Box::new(subject),
            index: Box::new(index),
        })
    }

    pub fn selector(subject: Expr, field: impl Into<String>) -> Self {
        Expr::Selector(SelectorExpr {
            subject: Box::new(subject),
            field: Ident::new(field),
        })
    }

    pub fn binary(left: Expr, op: Operator, right: Expr) -> Self {
        Expr::Binary(BinaryExpr {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    pub fn unary(op: Operator, operand: Expr) -> Self {
        Expr::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
        })
    }

    pub fn paren(inner: Expr) -> Self {
        Expr::Paren(ParenExpr {
            inner: Box::new(inner),
        })
    }

    pub fn func(params: Vec<Ident>, body: Chunk) -> Self {
        Expr::Func(FuncLit { params, body })
    }

    /// Whether the expression can be called or indexed without parentheses.
    pub fn is_prefix(&self) -> bool {
        matches!(
            self,
            Expr::Ident(_)
                | Expr::Call(_)
                | Expr::Index(_)
                | Expr::Selector(_)
                | Expr::Paren(_)
                | Expr::Raw(_)
        )
    }

    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            Expr::Ident(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_string_lit(&self) -> bool {
        matches!(self, Expr::String(_))
    }
}

/// Indented statement list: function, loop and branch bodies.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Chunk {
    pub body: Vec<Stmt>,
}

impl Chunk {
    pub fn new(body: Vec<Stmt>) -> Self {
        Self { body }
    }
}

/// Unindented statement list, used when one source construct expands into
/// several statements.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Block {
    pub body: Vec<Stmt>,
}

impl Block {
    pub fn new(body: Vec<Stmt>) -> Self {
        Self { body }
    }
}

/// Names and values of a declaration do not pair up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{names} name(s) bound from {values} value(s)")]
pub struct ArityMismatch {
    pub names: usize,
    pub values: usize,
}

/// `[local] a, b = x, y`.
///
/// `names[i]` is initialised from `values[i]`. The only accepted mismatch is
/// several names bound from a single call, which spreads its results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeclStmt {
    scope: Scope,
    names: Vec<Ident>,
    values: Vec<Expr>,
}

impl DeclStmt {
    pub fn new(scope: Scope, names: Vec<Ident>, values: Vec<Expr>) -> Result<Self, ArityMismatch> {
        let spreads = values.len() == 1 && matches!(values[0], Expr::Call(_) | Expr::Raw(_));
        if names.is_empty() || (names.len() != values.len() && !spreads) {
            return Err(ArityMismatch {
                names: names.len(),
                values: values.len(),
            });
        }
        Ok(Self {
            scope,
            names,
            values,
        })
    }

    /// Single binding: `[local] name = value`.
    pub fn single(scope: Scope, name: Ident, value: Expr) -> Self {
        Self {
            scope,
            names: vec![name],
            values: vec![value],
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn names(&self) -> &[Ident] {
        &self.names
    }

    pub fn values(&self) -> &[Expr] {
        &self.values
    }
}

/// Named function declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuncStmt {
    pub scope: Scope,
    pub name: Ident,
    pub params: Vec<Ident>,
    pub body: Chunk,
}

/// `a, b op x, y` where `op` is `=` or a compound assignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignStmt {
    pub left: Vec<Expr>,
    pub op: Operator,
    pub right: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExprStmt {
    pub expr: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnStmt {
    pub results: Vec<Expr>,
}

/// What follows the body of an `if`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ElseBranch {
    /// Rendered as `elseif`.
    If(IfStmt),
    Chunk(Chunk),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfStmt {
    pub cond: Expr,
    pub body: Chunk,
    pub else_branch: Option<Box<ElseBranch>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Chunk,
}

/// `for counter = start, bound[, step] do`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericForStmt {
    pub counter: Ident,
    pub start: Expr,
    pub bound: Expr,
    pub step: Option<Expr>,
    pub body: Chunk,
}

/// `for key, value in iter do`. Always binds exactly two names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericForStmt {
    pub bindings: [Ident; 2],
    pub iter: Expr,
    pub body: Chunk,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoStmt {
    pub body: Chunk,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    Block(Block),
    Decl(DeclStmt),
    Func(FuncStmt),
    Assign(AssignStmt),
    Expr(ExprStmt),
    Return(ReturnStmt),
    If(IfStmt),
    While(WhileStmt),
    NumericFor(NumericForStmt),
    GenericFor(GenericForStmt),
    Do(DoStmt),
    Break,
    Continue,
    Raw(Raw),
}

impl Stmt {
    pub fn expr(expr: Expr) -> Self {
        Stmt::Expr(ExprStmt { expr })
    }

    pub fn ret(results: Vec<Expr>) -> Self {
        Stmt::Return(ReturnStmt { results })
    }

    pub fn raw(content: impl Into<String>) -> Self {
        Stmt::Raw(Raw::new(content))
    }

    pub fn block(body: Vec<Stmt>) -> Self {
        Stmt::Block(Block::new(body))
    }

    pub fn do_block(body: Vec<Stmt>) -> Self {
        Stmt::Do(DoStmt {
            body: Chunk::new(body),
        })
    }

    pub fn assign(left: Vec<Expr>, op: Operator, right: Vec<Expr>) -> Self {
        Stmt::Assign(AssignStmt { left, op, right })
    }

    pub fn local(name: impl Into<String>, value: Expr) -> Self {
        Stmt::Decl(DeclStmt::single(Scope::Local, Ident::new(name), value))
    }

    pub fn if_stmt(cond: Expr, body: Chunk, else_branch: Option<ElseBranch>) -> Self {
        Stmt::If(IfStmt {
            cond,
            body,
            else_branch: else_branch.map(Box::new),
        })
    }

    pub fn while_loop(cond: Expr, body: Chunk) -> Self {
        Stmt::While(WhileStmt { cond, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decl_rejects_mismatched_lists() {
        let err = DeclStmt::new(
            Scope::Local,
            vec![Ident::new("a"), Ident::new("b")],
            vec![Expr::number("1")],
        )
        .unwrap_err();
        assert_eq!(err, ArityMismatch { names: 2, values: 1 });
    }

    #[test]
    fn decl_accepts_multi_value_call() {
        let decl = DeclStmt::new(
            Scope::Local,
            vec![Ident::new("v"), Ident::new("err")],
            vec![Expr::call(Expr::ident("load"), vec![])],
        )
        .unwrap();
        assert_eq!(decl.names().len(), 2);
        assert_eq!(decl.values().len(), 1);
    }

    #[test]
    fn decl_rejects_empty() {
        assert!(DeclStmt::new(Scope::Global, vec![], vec![]).is_err());
    }

    #[test]
    fn multiline_only_with_keyed_fields() {
        assert!(!TableLit::default().is_multiline());
        let list = TableLit::new(vec![TableField::Value(Expr::number("1"))]);
        assert!(!list.is_multiline());
        let keyed = TableLit::new(vec![TableField::KeyValue(KeyValueExpr {
            key: Expr::ident("a"),
            value: Expr::number("1"),
        })]);
        assert!(keyed.is_multiline());
    }
}
