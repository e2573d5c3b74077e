//! Rendering of the syntax tree into a [`Writer`].
//!
//! Statements emit their own indentation and trailing newline. Expressions
//! only append inline text, except the two structurally multi-line forms:
//! keyed tables and function literals.

use crate::ast::*;
use crate::token::Operator;
use crate::writer::Writer;

/// Every node renders itself into a writer. Rendering cannot fail.
pub trait Render {
    fn render(&self, w: &mut Writer);

    /// Render into a fresh writer at depth zero.
    fn to_luau(&self) -> String {
        let mut w = Writer::new();
        self.render(&mut w);
        w.finish()
    }
}

fn render_list<T: Render>(items: &[T], w: &mut Writer) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            w.write(", ");
        }
        item.render(w);
    }
}

fn render_params(params: &[Ident], w: &mut Writer) {
    w.write("(");
    render_list(params, w);
    w.write(")");
}

/// Render an expression that is about to be called or indexed.
fn render_prefix(expr: &Expr, w: &mut Writer) {
    if expr.is_prefix() {
        expr.render(w);
    } else {
        w.write("(");
        expr.render(w);
        w.write(")");
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

fn needs_parens(child: &Expr, parent: Operator, side: Side) -> bool {
    let Expr::Binary(inner) = child else {
        return false;
    };
    let (child_prec, parent_prec) = (inner.op.precedence(), parent.precedence());
    if child_prec != parent_prec {
        return child_prec < parent_prec;
    }
    match side {
        Side::Left => parent.is_right_assoc(),
        Side::Right => !parent.is_right_assoc(),
    }
}

fn render_operand(expr: &Expr, parent: Operator, side: Side, w: &mut Writer) {
    if needs_parens(expr, parent, side) {
        w.write("(");
        expr.render(w);
        w.write(")");
    } else {
        expr.render(w);
    }
}

impl Render for Ident {
    fn render(&self, w: &mut Writer) {
        w.write(&self.name);
    }
}

impl Render for NumericLit {
    fn render(&self, w: &mut Writer) {
        w.write(&self.value);
    }
}

impl Render for StringLit {
    fn render(&self, w: &mut Writer) {
        w.write(&quote_bytes(&self.value));
    }
}

/// Quote text as a double-quoted Luau string.
pub fn quote(value: &str) -> String {
    quote_bytes(value.as_bytes())
}

/// Quote bytes as a double-quoted Luau string. Bytes that are not part of
/// valid UTF-8 are written as `\xNN`.
pub fn quote_bytes(value: &[u8]) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for chunk in value.utf8_chunks() {
        for c in chunk.valid().chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                '\u{7}' => out.push_str("\\a"),
                '\u{8}' => out.push_str("\\b"),
                '\u{c}' => out.push_str("\\f"),
                '\u{b}' => out.push_str("\\v"),
                c if (c as u32) < 0x20 || c == '\u{7f}' => {
                    out.push_str(&format!("\\{:03}", c as u32));
                }
                c => out.push(c),
            }
        }
        for byte in chunk.invalid() {
            out.push_str(&format!("\\x{byte:02X}"));
        }
    }
    out.push('"');
    out
}

impl Render for Raw {
    fn render(&self, w: &mut Writer) {
        w.write(&self.content);
    }
}

impl Render for KeyValueExpr {
    fn render(&self, w: &mut Writer) {
        match &self.key {
            Expr::Ident(id) => id.render(w),
            key => {
                w.write("[");
                key.render(w);
                w.write("]");
            }
        }
        w.write(" = ");
        self.value.render(w);
    }
}

impl Render for TableField {
    fn render(&self, w: &mut Writer) {
        match self {
            TableField::Value(v) => v.render(w),
            TableField::KeyValue(kv) => kv.render(w),
            TableField::Computed(kv) => {
                w.write("[");
                kv.key.render(w);
                w.write("] = ");
                kv.value.render(w);
            }
        }
    }
}

impl Render for TableLit {
    fn render(&self, w: &mut Writer) {
        if !self.is_multiline() {
            w.write("{");
            render_list(&self.fields, w);
            w.write("}");
            return;
        }

        w.write("{");
        w.newline();
        w.push_indent();
        let last = self.fields.len() - 1;
        for (i, field) in self.fields.iter().enumerate() {
            w.pre("");
            field.render(w);
            if i != last {
                w.write(",");
            }
            w.newline();
        }
        w.pop_indent();
        w.pre("}");
    }
}

impl Render for CallExpr {
    fn render(&self, w: &mut Writer) {
        render_prefix(&self.callee, w);
        w.write("(");
        render_list(&self.args, w);
        w.write(")");
    }
}

impl Render for IndexExpr {
    fn render(&self, w: &mut Writer) {
        render_prefix(&self.subject, w);
        w.write("[");
        self.index.render(w);
        w.write("]");
    }
}

impl Render for SelectorExpr {
    fn render(&self, w: &mut Writer) {
        render_prefix(&self.subject, w);
        w.write(".");
        self.field.render(w);
    }
}

impl Render for BinaryExpr {
    fn render(&self, w: &mut Writer) {
        render_operand(&self.left, self.op, Side::Left, w);
        w.write(" ");
        w.write(self.op.as_str());
        w.write(" ");
        render_operand(&self.right, self.op, Side::Right, w);
    }
}

impl Render for UnaryExpr {
    fn render(&self, w: &mut Writer) {
        w.write(self.op.as_str());
        if self.op == Operator::Not {
            w.write(" ");
        }
        // `- -x` would otherwise read as a comment
        let wrap = match self.operand.as_ref() {
            Expr::Binary(_) => true,
            Expr::Unary(u) => self.op == Operator::Neg && u.op == Operator::Neg,
            Expr::Numeric(n) => n.value.starts_with('-'),
            _ => false,
        };
        if wrap {
            w.write("(");
            self.operand.render(w);
            w.write(")");
        } else {
            self.operand.render(w);
        }
    }
}

impl Render for ParenExpr {
    fn render(&self, w: &mut Writer) {
        w.write("(");
        self.inner.render(w);
        w.write(")");
    }
}

impl Render for FuncLit {
    fn render(&self, w: &mut Writer) {
        w.write("function");
        render_params(&self.params, w);
        w.newline();
        self.body.render(w);
        w.pre("end");
    }
}

impl Render for Expr {
    fn render(&self, w: &mut Writer) {
        match self {
            Expr::Ident(e) => e.render(w),
            Expr::Numeric(e) => e.render(w),
            Expr::String(e) => e.render(w),
            Expr::Table(e) => e.render(w),
            Expr::Call(e) => e.render(w),
            Expr::Index(e) => e.render(w),
            Expr::Selector(e) => e.render(w),
            Expr::Binary(e) => e.render(w),
            Expr::Unary(e) => e.render(w),
            Expr::Paren(e) => e.render(w),
            Expr::Func(e) => e.render(w),
            Expr::Nil => w.write("nil"),
            Expr::Bool(true) => w.write("true"),
            Expr::Bool(false) => w.write("false"),
            Expr::Raw(e) => e.render(w),
        }
    }
}

impl Render for Chunk {
    fn render(&self, w: &mut Writer) {
        w.push_indent();
        for stmt in &self.body {
            stmt.render(w);
        }
        w.pop_indent();
    }
}

impl Render for Block {
    fn render(&self, w: &mut Writer) {
        for stmt in &self.body {
            stmt.render(w);
        }
    }
}

impl Render for DeclStmt {
    fn render(&self, w: &mut Writer) {
        w.pre(self.scope().prefix());
        render_list(self.names(), w);
        w.write(" = ");
        render_list(self.values(), w);
        w.newline();
    }
}

impl Render for FuncStmt {
    fn render(&self, w: &mut Writer) {
        w.pre(self.scope.prefix());
        w.write("function ");
        self.name.render(w);
        render_params(&self.params, w);
        w.newline();
        self.body.render(w);
        w.line("end");
    }
}

impl Render for AssignStmt {
    fn render(&self, w: &mut Writer) {
        w.pre("");
        render_list(&self.left, w);
        w.write(" ");
        w.write(self.op.as_str());
        w.write(" ");
        render_list(&self.right, w);
        w.newline();
    }
}

impl Render for ExprStmt {
    fn render(&self, w: &mut Writer) {
        w.pre("");
        self.expr.render(w);
        w.newline();
    }
}

impl Render for ReturnStmt {
    fn render(&self, w: &mut Writer) {
        w.pre("return");
        if !self.results.is_empty() {
            w.write(" ");
            render_list(&self.results, w);
        }
        w.newline();
    }
}

impl Render for IfStmt {
    fn render(&self, w: &mut Writer) {
        w.pre("if ");
        self.cond.render(w);
        w.write(" then");
        w.newline();
        self.body.render(w);

        let mut next = self.else_branch.as_deref();
        while let Some(branch) = next {
            match branch {
                ElseBranch::If(elif) => {
                    w.pre("elseif ");
                    elif.cond.render(w);
                    w.write(" then");
                    w.newline();
                    elif.body.render(w);
                    next = elif.else_branch.as_deref();
                }
                ElseBranch::Chunk(chunk) => {
                    w.line("else");
                    chunk.render(w);
                    next = None;
                }
            }
        }
        w.line("end");
    }
}

impl Render for WhileStmt {
    fn render(&self, w: &mut Writer) {
        w.pre("while ");
        self.cond.render(w);
        w.write(" do");
        w.newline();
        self.body.render(w);
        w.line("end");
    }
}

impl Render for NumericForStmt {
    fn render(&self, w: &mut Writer) {
        w.pre("for ");
        self.counter.render(w);
        w.write(" = ");
        self.start.render(w);
        w.write(", ");
        self.bound.render(w);
        if let Some(step) = &self.step {
            w.write(", ");
            step.render(w);
        }
        w.write(" do");
        w.newline();
        self.body.render(w);
        w.line("end");
    }
}

impl Render for GenericForStmt {
    fn render(&self, w: &mut Writer) {
        w.pre("for ");
        render_list(&self.bindings, w);
        w.write(" in ");
        self.iter.render(w);
        w.write(" do");
        w.newline();
        self.body.render(w);
        w.line("end");
    }
}

impl Render for DoStmt {
    fn render(&self, w: &mut Writer) {
        w.line("do");
        self.body.render(w);
        w.line("end");
    }
}

impl Render for Stmt {
    fn render(&self, w: &mut Writer) {
        match self {
            Stmt::Block(s) => s.render(w),
            Stmt::Decl(s) => s.render(w),
            Stmt::Func(s) => s.render(w),
            Stmt::Assign(s) => s.render(w),
            Stmt::Expr(s) => s.render(w),
            Stmt::Return(s) => s.render(w),
            Stmt::If(s) => s.render(w),
            Stmt::While(s) => s.render(w),
            Stmt::NumericFor(s) => s.render(w),
            Stmt::GenericFor(s) => s.render(w),
            Stmt::Do(s) => s.render(w),
            Stmt::Break => w.line("break"),
            Stmt::Continue => w.line("continue"),
            Stmt::Raw(raw) => w.line(&raw.content),
        }
    }
}
