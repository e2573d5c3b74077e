use super::{Binding, Frame, Lowerer, Result, block_items, children, list_items};
use crate::source::luau_name;
use goluau_luau::{Chunk, DeclStmt, ElseBranch, Expr, Ident, IfStmt, Operator, Scope, Stmt};
use tree_sitter::Node;

impl<'s> Lowerer<'s> {
    pub(crate) fn lower_statements(&mut self, nodes: Vec<Node>) -> Result<Vec<Stmt>> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            if let Some(stmt) = self.lower_statement(node)? {
                out.push(stmt);
            }
        }
        Ok(out)
    }

    /// Lower a `block` in its own scope.
    pub(crate) fn lower_block(&mut self, node: Node) -> Result<Chunk> {
        self.scoped(|this| this.lower_statements(block_items(node)).map(Chunk::new))
    }

    /// Lower one statement. Comments and empty statements produce nothing.
    pub fn lower_statement(&mut self, node: Node) -> Result<Option<Stmt>> {
        let stmt = match node.kind() {
            "comment" | "empty_statement" => return Ok(None),
            "expression_statement" => self.lower_expression_statement(node)?,
            "short_var_declaration" => self.lower_short_var(node)?,
            "assignment_statement" => self.lower_assignment(node)?,
            "inc_statement" => self.lower_step(node, Operator::AddAssign)?,
            "dec_statement" => self.lower_step(node, Operator::SubAssign)?,
            "var_declaration" => self.lower_vars(node, Scope::Local)?,
            "const_declaration" => self.lower_consts(node, Scope::Local)?,
            "type_declaration" => self.lower_types(node)?,
            "return_statement" => self.lower_return(node)?,
            "if_statement" => {
                let (prelude, stmt) = self.lower_if(node)?;
                wrap_prelude(prelude, Stmt::If(stmt))
            }
            "expression_switch_statement" => self.lower_switch(node)?,
            "for_statement" => self.lower_for(node)?,
            "break_statement" => self.lower_break(node)?,
            "continue_statement" => self.lower_continue(node)?,
            "block" => {
                let body = self.lower_block(node)?;
                Stmt::Do(goluau_luau::DoStmt { body })
            }
            "go_statement" => return Err(self.unsupported(node, "statement", "goroutines")),
            "defer_statement" => return Err(self.unsupported(node, "statement", "defer")),
            "select_statement" | "send_statement" => {
                return Err(self.unsupported(node, "statement", "channels"));
            }
            "type_switch_statement" => return Err(self.unsupported(node, "statement", "type switches")),
            "labeled_statement" | "goto_statement" => {
                return Err(self.unsupported(node, "statement", "labels"));
            }
            "fallthrough_statement" => return Err(self.unsupported(node, "statement", "fallthrough")),
            kind => return Err(self.unsupported(node, "statement", kind)),
        };
        Ok(Some(stmt))
    }

    fn lower_expression_statement(&mut self, node: Node) -> Result<Stmt> {
        let inner = children(node)
            .into_iter()
            .next()
            .ok_or_else(|| self.unsupported(node, "statement", "empty expression statement"))?;
        match self.lower_expression(inner)? {
            Expr::Raw(raw) => Ok(Stmt::Raw(raw)),
            call @ Expr::Call(_) => Ok(Stmt::expr(call)),
            _ => Err(self.unsupported(node, "expression statement", "only calls can be used as statements")),
        }
    }

    fn lower_short_var(&mut self, node: Node) -> Result<Stmt> {
        let left = list_items(node.child_by_field_name("left"));
        let right = list_items(node.child_by_field_name("right"));
        let values = self.lower_exprs(&right)?;

        let mut names = Vec::with_capacity(left.len());
        for n in &left {
            if !matches!(n.kind(), "identifier" | "blank_identifier") {
                return Err(self.unsupported(*n, "declaration", "expected identifier"));
            }
            names.push(Ident::new(luau_name(self.text(*n))));
        }

        let decl = DeclStmt::new(Scope::Local, names, values)
            .map_err(|e| self.unsupported(node, "declaration", e.to_string()))?;
        for name in decl.names() {
            self.declare(&name.name, Binding::Value);
        }
        Ok(Stmt::Decl(decl))
    }

    fn lower_assignment(&mut self, node: Node) -> Result<Stmt> {
        let op_node = self.field(node, "operator")?;
        let left_nodes = list_items(node.child_by_field_name("left"));
        let right_nodes = list_items(node.child_by_field_name("right"));

        let op = match self.text(op_node) {
            "=" => Operator::Assign,
            "+=" => Operator::AddAssign,
            "-=" => Operator::SubAssign,
            "*=" => Operator::MulAssign,
            "/=" => Operator::DivAssign,
            "%=" => Operator::RemAssign,
            _ => Operator::Illegal,
        };
        if op.is_illegal() {
            let text = self.text(op_node);
            return Err(self.unsupported(op_node, "operator", format!("`{text}` has no Luau equivalent")));
        }

        let left = self.lower_exprs(&left_nodes)?;
        let right = self.lower_exprs(&right_nodes)?;

        if op == Operator::Assign {
            if left.iter().all(|e| e.as_ident().is_some_and(Ident::is_blank)) {
                if let ([_], [Expr::Raw(raw)]) = (left.as_slice(), right.as_slice()) {
                    return Ok(Stmt::Raw(raw.clone()));
                }
                let names = left.iter().map(|_| Ident::blank()).collect();
                let decl = DeclStmt::new(Scope::Local, names, right)
                    .map_err(|e| self.unsupported(node, "assignment", e.to_string()))?;
                return Ok(Stmt::Decl(decl));
            }
            if left.len() != right.len() && !(right.len() == 1 && matches!(right[0], Expr::Call(_))) {
                return Err(self.unsupported(
                    node,
                    "assignment",
                    format!("{} target(s) assigned from {} value(s)", left.len(), right.len()),
                ));
            }
            return Ok(Stmt::assign(left, op, right));
        }

        if left.len() != 1 || right.len() != 1 {
            return Err(self.unsupported(node, "assignment", "compound assignment of several values"));
        }
        // string concatenation, recognised from a literal right operand
        let op = if op == Operator::AddAssign && right[0].is_string_lit() {
            Operator::ConcatAssign
        } else {
            op
        };
        Ok(Stmt::assign(left, op, right))
    }

    /// `x++` / `x--`.
    fn lower_step(&mut self, node: Node, op: Operator) -> Result<Stmt> {
        let target = children(node)
            .into_iter()
            .next()
            .ok_or_else(|| self.unsupported(node, node.kind(), "missing operand"))?;
        let target = self.lower_expression(target)?;
        Ok(Stmt::assign(vec![target], op, vec![Expr::number("1")]))
    }

    fn lower_return(&mut self, node: Node) -> Result<Stmt> {
        let items = children(node)
            .into_iter()
            .flat_map(|n| list_items(Some(n)))
            .collect::<Vec<_>>();
        let mut results = self.lower_exprs(&items)?;
        if results.is_empty() {
            // bare return with named results
            if let Some(Frame::Function { results: named }) =
                self.frames.iter().rev().find(|f| matches!(f, Frame::Function { .. }))
            {
                results = named.iter().cloned().map(Expr::Ident).collect();
            }
        }
        Ok(Stmt::ret(results))
    }

    /// Lower an `if` chain. The returned prelude holds the lowered
    /// initializer, which must run before the condition.
    pub(crate) fn lower_if(&mut self, node: Node) -> Result<(Vec<Stmt>, IfStmt)> {
        self.scoped(|this| {
            let mut prelude = Vec::new();
            if let Some(init) = node.child_by_field_name("initializer") {
                prelude.extend(this.lower_statement(init)?);
            }
            let cond = this.lower_expression(this.field(node, "condition")?)?;
            let body = this.lower_block(this.field(node, "consequence")?)?;

            let else_branch = match node.child_by_field_name("alternative") {
                None => None,
                Some(alt) if alt.kind() == "if_statement" => {
                    let (inner_prelude, inner) = this.lower_if(alt)?;
                    if inner_prelude.is_empty() {
                        Some(ElseBranch::If(inner))
                    } else {
                        let mut body = inner_prelude;
                        body.push(Stmt::If(inner));
                        Some(ElseBranch::Chunk(Chunk::new(body)))
                    }
                }
                Some(alt) => Some(ElseBranch::Chunk(this.lower_block(alt)?)),
            };

            Ok((
                prelude,
                IfStmt {
                    cond,
                    body,
                    else_branch: else_branch.map(Box::new),
                },
            ))
        })
    }

    /// Expression switches become an `if`/`elseif` chain. A tag that is not
    /// a plain name or literal is evaluated once into a temporary.
    fn lower_switch(&mut self, node: Node) -> Result<Stmt> {
        self.scoped(|this| {
            let mut prelude = Vec::new();
            if let Some(init) = node.child_by_field_name("initializer") {
                prelude.extend(this.lower_statement(init)?);
            }

            let tag = match node.child_by_field_name("value") {
                None => None,
                Some(value) => {
                    let tag = this.lower_expression(value)?;
                    match tag {
                        Expr::Ident(_) | Expr::Numeric(_) | Expr::String(_) | Expr::Nil | Expr::Bool(_) => Some(tag),
                        other => {
                            let temp = this.temp("switch");
                            prelude.push(Stmt::local(temp.clone(), other));
                            Some(Expr::ident(temp))
                        }
                    }
                }
            };

            let mut cases = Vec::new();
            let mut default = None;
            for case in children(node) {
                match case.kind() {
                    "expression_case" => {
                        let value_node = this.field(case, "value")?;
                        let values = this.lower_exprs(&list_items(Some(value_node)))?;
                        let cond = values
                            .into_iter()
                            .map(|v| match &tag {
                                Some(tag) => Expr::binary(tag.clone(), Operator::Eql, v),
                                None => v,
                            })
                            .reduce(|acc, c| Expr::binary(acc, Operator::Or, c))
                            .ok_or_else(|| this.unsupported(case, "switch", "empty case"))?;
                        let body = this.lower_case_body(case, Some(value_node))?;
                        cases.push((cond, body));
                    }
                    "default_case" => default = Some(this.lower_case_body(case, None)?),
                    _ => {}
                }
            }

            let mut chain: Option<ElseBranch> = default.map(ElseBranch::Chunk);
            for (cond, body) in cases.into_iter().rev() {
                chain = Some(ElseBranch::If(IfStmt {
                    cond,
                    body,
                    else_branch: chain.map(Box::new),
                }));
            }

            let stmt = match chain {
                Some(ElseBranch::If(stmt)) => Stmt::If(stmt),
                Some(ElseBranch::Chunk(body)) => Stmt::Do(goluau_luau::DoStmt { body }),
                None if prelude.is_empty() => Stmt::block(vec![]),
                None => return Ok(Stmt::do_block(prelude)),
            };
            Ok(wrap_prelude(prelude, stmt))
        })
    }

    fn lower_case_body(&mut self, case: Node, value: Option<Node>) -> Result<Chunk> {
        let items: Vec<Node> = block_items(case)
            .into_iter()
            .filter(|n| Some(n.id()) != value.map(|v| v.id()))
            .collect();
        self.in_frame(Frame::Switch, |this| {
            this.scoped(|this| this.lower_statements(items).map(Chunk::new))
        })
    }

    fn lower_break(&mut self, node: Node) -> Result<Stmt> {
        if node.child_by_field_name("label").is_some() || !children(node).is_empty() {
            return Err(self.unsupported(node, "statement", "labels"));
        }
        match self.frames.last() {
            Some(Frame::Loop { .. }) => Ok(Stmt::Break),
            Some(Frame::Switch) => Err(self.unsupported(node, "break", "break inside a switch case")),
            _ => Err(self.unsupported(node, "break", "break outside a loop")),
        }
    }

    fn lower_continue(&mut self, node: Node) -> Result<Stmt> {
        if node.child_by_field_name("label").is_some() || !children(node).is_empty() {
            return Err(self.unsupported(node, "statement", "labels"));
        }
        for frame in self.frames.iter().rev() {
            match frame {
                Frame::Switch => continue,
                Frame::Loop { post: Some(post) } => {
                    return Ok(Stmt::block(vec![post.clone(), Stmt::Continue]));
                }
                Frame::Loop { post: None } => return Ok(Stmt::Continue),
                Frame::Function { .. } => break,
            }
        }
        Err(self.unsupported(node, "continue", "continue outside a loop"))
    }
}

/// Run `prelude` in its own `do` block ahead of `stmt`.
pub(crate) fn wrap_prelude(mut prelude: Vec<Stmt>, stmt: Stmt) -> Stmt {
    if prelude.is_empty() {
        return stmt;
    }
    prelude.push(stmt);
    Stmt::do_block(prelude)
}
