//! `for` statements.
//!
//! Three-clause loops over a simple counter become numeric `for` loops;
//! anything else falls back to `while` with the post statement run at the end
//! of each iteration and before every `continue`.

use super::stmt::wrap_prelude;
use super::{Binding, Frame, Lowerer, Result, children, list_items};
use crate::source::{int_literal, luau_name};
use goluau_luau::{Expr, GenericForStmt, Ident, NumericForStmt, Operator, Stmt};
use tree_sitter::Node;

/// A counter loop: `for i := start; i <op> bound; i += step`.
struct Counter<'t> {
    name: &'t str,
    start: Node<'t>,
    bound: Node<'t>,
    comparison: &'t str,
    step: i64,
}

impl<'s> Lowerer<'s> {
    pub(crate) fn lower_for(&mut self, node: Node) -> Result<Stmt> {
        let body = self.field(node, "body")?;
        let clause = children(node).into_iter().find(|c| c.id() != body.id());

        match clause {
            None => {
                let body = self.in_frame(Frame::Loop { post: None }, |this| this.lower_block(body))?;
                Ok(Stmt::while_loop(Expr::bool(true), body))
            }
            Some(c) if c.kind() == "for_clause" => self.lower_for_clause(c, body),
            Some(c) if c.kind() == "range_clause" => self.lower_range(c, body),
            Some(cond) => {
                let cond = self.lower_expression(cond)?;
                let body = self.in_frame(Frame::Loop { post: None }, |this| this.lower_block(body))?;
                Ok(Stmt::while_loop(cond, body))
            }
        }
    }

    fn lower_for_clause(&mut self, clause: Node, body: Node) -> Result<Stmt> {
        if let Some(counter) = self.counter(clause, body) {
            return self.lower_numeric_for(counter, body);
        }

        self.scoped(|this| {
            let mut prelude = Vec::new();
            if let Some(init) = clause.child_by_field_name("initializer") {
                prelude.extend(this.lower_statement(init)?);
            }
            let cond = match clause.child_by_field_name("condition") {
                Some(cond) => this.lower_expression(cond)?,
                None => Expr::bool(true),
            };
            let post = match clause.child_by_field_name("update") {
                Some(update) => this.lower_statement(update)?,
                None => None,
            };

            let mut chunk = this.in_frame(Frame::Loop { post: post.clone() }, |this| this.lower_block(body))?;
            if let Some(post) = post {
                if !ends_in_jump(&chunk.body) {
                    chunk.body.push(post);
                }
            }
            Ok(wrap_prelude(prelude, Stmt::while_loop(cond, chunk)))
        })
    }

    /// Recognise a counter loop whose body never reassigns the counter.
    fn counter<'t>(&self, clause: Node<'t>, body: Node<'t>) -> Option<Counter<'t>>
    where
        's: 't,
    {
        let init = clause.child_by_field_name("initializer")?;
        let cond = clause.child_by_field_name("condition")?;
        let update = clause.child_by_field_name("update")?;

        if init.kind() != "short_var_declaration" {
            return None;
        }
        let [name_node] = list_items(init.child_by_field_name("left"))[..] else {
            return None;
        };
        let [start] = list_items(init.child_by_field_name("right"))[..] else {
            return None;
        };
        if name_node.kind() != "identifier" {
            return None;
        }
        let name = self.text(name_node);

        if cond.kind() != "binary_expression" {
            return None;
        }
        let left = cond.child_by_field_name("left")?;
        let comparison = self.text(cond.child_by_field_name("operator")?);
        let bound = cond.child_by_field_name("right")?;
        if left.kind() != "identifier" || self.text(left) != name {
            return None;
        }

        let step = self.counter_step(update, name)?;
        let agrees = match comparison {
            "<" | "<=" => step > 0,
            ">" | ">=" => step < 0,
            _ => false,
        };
        if !agrees || self.assigns(body, name) || !self.stable_bound(bound, body) {
            return None;
        }

        Some(Counter {
            name,
            start,
            bound,
            comparison,
            step,
        })
    }

    fn counter_step(&self, update: Node, name: &str) -> Option<i64> {
        let target_is_counter = |n: Option<Node>| n.is_some_and(|n| n.kind() == "identifier" && self.text(n) == name);
        match update.kind() {
            "inc_statement" if target_is_counter(children(update).first().copied()) => Some(1),
            "dec_statement" if target_is_counter(children(update).first().copied()) => Some(-1),
            "assignment_statement" => {
                let [left] = list_items(update.child_by_field_name("left"))[..] else {
                    return None;
                };
                let [right] = list_items(update.child_by_field_name("right"))[..] else {
                    return None;
                };
                if !target_is_counter(Some(left)) || right.kind() != "int_literal" {
                    return None;
                }
                let amount: i64 = int_literal(self.text(right)).ok()?.parse().ok()?;
                let step = match self.text(update.child_by_field_name("operator")?) {
                    "+=" => amount,
                    "-=" => -amount,
                    _ => return None,
                };
                (step != 0).then_some(step)
            }
            _ => None,
        }
    }

    /// Whether `bound` evaluates to the same value on every iteration: a
    /// literal, or names (and `len` of names) the body never assigns.
    fn stable_bound(&self, bound: Node, body: Node) -> bool {
        match bound.kind() {
            "int_literal" | "float_literal" => true,
            "identifier" => !self.assigns(body, self.text(bound)),
            "parenthesized_expression" | "unary_expression" | "binary_expression" => {
                children(bound).into_iter().all(|n| self.stable_bound(n, body))
            }
            "call_expression" => {
                let is_len = bound
                    .child_by_field_name("function")
                    .is_some_and(|f| f.kind() == "identifier" && self.text(f) == "len" && self.lookup("len").is_none());
                is_len
                    && bound
                        .child_by_field_name("arguments")
                        .is_some_and(|args| children(args).into_iter().all(|n| self.stable_bound(n, body)))
            }
            _ => false,
        }
    }

    /// Whether anything under `node` assigns `name` or takes its address.
    fn assigns(&self, node: Node, name: &str) -> bool {
        let is_name = |n: Node| n.kind() == "identifier" && self.text(n) == name;
        let hit = match node.kind() {
            "assignment_statement" => list_items(node.child_by_field_name("left")).into_iter().any(is_name),
            "inc_statement" | "dec_statement" => children(node).into_iter().any(is_name),
            "unary_expression" => {
                node.child_by_field_name("operator").is_some_and(|op| self.text(op) == "&")
                    && node.child_by_field_name("operand").is_some_and(is_name)
            }
            "range_clause" => list_items(node.child_by_field_name("left")).into_iter().any(is_name),
            _ => false,
        };
        hit || children(node).into_iter().any(|child| self.assigns(child, name))
    }

    fn lower_numeric_for(&mut self, counter: Counter, body: Node) -> Result<Stmt> {
        let start = self.lower_expression(counter.start)?;
        let bound = self.lower_expression(counter.bound)?;
        let bound = match counter.comparison {
            "<" => offset(bound, -1),
            ">" => offset(bound, 1),
            _ => bound,
        };
        let step = (counter.step != 1).then(|| Expr::number(counter.step.to_string()));

        let name = luau_name(counter.name);
        let chunk = self.scoped(|this| {
            this.declare(&name, Binding::Value);
            this.in_frame(Frame::Loop { post: None }, |this| this.lower_block(body))
        })?;

        Ok(Stmt::NumericFor(NumericForStmt {
            counter: Ident::new(name),
            start,
            bound,
            step,
            body: chunk,
        }))
    }

    /// `for k, v := range x`. Both bindings are always present; omitted ones
    /// are `_`. Ranging over an integer literal counts from zero.
    fn lower_range(&mut self, clause: Node, body: Node) -> Result<Stmt> {
        let left = list_items(clause.child_by_field_name("left"));
        let right = self.field(clause, "right")?;

        let mut cursor = clause.walk();
        let defines = clause.children(&mut cursor).any(|c| c.kind() == ":=");
        if !left.is_empty() && !defines {
            return Err(self.unsupported(clause, "range", "assigning to existing variables"));
        }
        if left.len() > 2 {
            return Err(self.unsupported(clause, "range", "more than two bindings"));
        }

        let mut bindings = [Ident::blank(), Ident::blank()];
        for (slot, node) in bindings.iter_mut().zip(&left) {
            if !matches!(node.kind(), "identifier" | "blank_identifier") {
                return Err(self.unsupported(*node, "range", "expected identifier"));
            }
            *slot = Ident::new(luau_name(self.text(*node)));
        }

        let iter = self.lower_expression(right)?;
        let [key, value] = bindings;

        self.scoped(|this| {
            for ident in [&key, &value] {
                if !ident.is_blank() {
                    this.declare(&ident.name, Binding::Value);
                }
            }
            let chunk = this.in_frame(Frame::Loop { post: None }, |this| this.lower_block(body))?;

            if right.kind() == "int_literal" {
                return Ok(Stmt::NumericFor(NumericForStmt {
                    counter: key,
                    start: Expr::number("0"),
                    bound: offset(iter, -1),
                    step: None,
                    body: chunk,
                }));
            }

            Ok(Stmt::GenericFor(GenericForStmt {
                bindings: [key, value],
                iter,
                body: chunk,
            }))
        })
    }
}

/// Whether a lowered body already ends by leaving the iteration, possibly
/// through a trailing `continue` block.
fn ends_in_jump(body: &[Stmt]) -> bool {
    match body.last() {
        Some(Stmt::Return(_) | Stmt::Break | Stmt::Continue) => true,
        Some(Stmt::Block(block)) => ends_in_jump(&block.body),
        _ => false,
    }
}

/// `expr + delta`, folded when `expr` is a decimal integer literal.
fn offset(expr: Expr, delta: i64) -> Expr {
    if let Expr::Numeric(lit) = &expr {
        if let Ok(value) = lit.value.parse::<i64>() {
            return Expr::number((value + delta).to_string());
        }
    }
    let (op, amount) = if delta < 0 {
        (Operator::Sub, -delta)
    } else {
        (Operator::Add, delta)
    };
    Expr::binary(expr, op, Expr::number(amount.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_fold_literals() {
        assert_eq!(offset(Expr::number("10"), -1), Expr::number("9"));
        assert_eq!(
            offset(Expr::ident("n"), -1),
            Expr::binary(Expr::ident("n"), Operator::Sub, Expr::number("1"))
        );
        assert_eq!(
            offset(Expr::ident("n"), 1),
            Expr::binary(Expr::ident("n"), Operator::Add, Expr::number("1"))
        );
    }
}
