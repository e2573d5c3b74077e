use super::{Binding, Lowerer, Result, children};
use crate::source::{decode_bytes, decode_rune, decode_string, float_literal, int_literal, is_luau_keyword, luau_name};
use goluau_luau::{Expr, KeyValueExpr, Operator, TableField, TableLit};
use tree_sitter::Node;

/// How identifier keys inside a `{...}` literal are read.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Keys {
    /// Struct fields: `Name: v` keys a field called `Name`.
    Field,
    /// Maps and indexed arrays: `k: v` keys by the value of `k`.
    Value,
}

impl<'s> Lowerer<'s> {
    pub(crate) fn lower_exprs(&mut self, nodes: &[Node]) -> Result<Vec<Expr>> {
        nodes.iter().map(|n| self.lower_expression(*n)).collect()
    }

    /// Lower one expression.
    pub fn lower_expression(&mut self, node: Node) -> Result<Expr> {
        match node.kind() {
            "identifier" | "blank_identifier" | "field_identifier" | "type_identifier" | "package_identifier" => {
                Ok(Expr::ident(luau_name(self.text(node))))
            }
            "int_literal" => int_literal(self.text(node))
                .map(Expr::number)
                .map_err(|e| self.unsupported(node, "literal", e)),
            "float_literal" => float_literal(self.text(node))
                .map(Expr::number)
                .map_err(|e| self.unsupported(node, "literal", e)),
            "imaginary_literal" => Err(self.unsupported(node, "literal", "complex numbers")),
            "rune_literal" => decode_rune(self.text(node))
                .map(Expr::string)
                .map_err(|e| self.unsupported(node, "literal", e)),
            "interpreted_string_literal" | "raw_string_literal" => decode_bytes(self.text(node))
                .map(Expr::bytes)
                .map_err(|e| self.unsupported(node, "literal", e)),
            "true" => Ok(Expr::bool(true)),
            "false" => Ok(Expr::bool(false)),
            "nil" => Ok(Expr::nil()),
            "iota" => match self.iota {
                Some(value) => Ok(Expr::number(value.to_string())),
                None => Err(self.unsupported(node, "expression", "iota outside a constant declaration")),
            },
            "parenthesized_expression" => {
                let inner = self.only_child(node)?;
                Ok(Expr::paren(self.lower_expression(inner)?))
            }
            "unary_expression" => self.lower_unary(node),
            "binary_expression" => self.lower_binary(node),
            "call_expression" => self.lower_call(node),
            "selector_expression" => {
                let operand = self.lower_expression(self.field(node, "operand")?)?;
                let field = self.text(self.field(node, "field")?);
                Ok(select(operand, field))
            }
            "index_expression" => {
                let operand = self.lower_expression(self.field(node, "operand")?)?;
                let index = self.lower_expression(self.field(node, "index")?)?;
                Ok(Expr::index(operand, index))
            }
            "slice_expression" => self.lower_slice(node),
            "composite_literal" => self.lower_composite(node, false),
            "func_literal" => {
                let params = self.field(node, "parameters")?;
                let result = node.child_by_field_name("result");
                let body = node.child_by_field_name("body");
                let (params, body) = self.lower_function_body(None, params, result, body)?;
                Ok(Expr::func(params, body))
            }
            "type_conversion_expression" => {
                let ty = self.field(node, "type")?;
                let operand = self.field(node, "operand")?;
                if let Some(escape) = self.lower_escape(ty, node, &[operand])? {
                    return Ok(escape);
                }
                self.lower_expression(operand)
            }
            "type_assertion_expression" => self.lower_expression(self.field(node, "operand")?),
            "type_instantiation_expression" | "generic_type" => {
                self.lower_expression(self.field(node, "type")?)
            }
            "qualified_type" => {
                let package = self.text(self.field(node, "package")?);
                let name = self.text(self.field(node, "name")?);
                Ok(select(Expr::ident(luau_name(package)), name))
            }
            "channel_type" => Err(self.unsupported(node, "expression", "channels")),
            kind => Err(self.unsupported(node, "expression", kind)),
        }
    }

    fn only_child<'t>(&self, node: Node<'t>) -> Result<Node<'t>> {
        children(node)
            .into_iter()
            .next()
            .ok_or_else(|| self.unsupported(node, node.kind(), "empty"))
    }

    fn lower_unary(&mut self, node: Node) -> Result<Expr> {
        let op_node = self.field(node, "operator")?;
        let operand = self.field(node, "operand")?;
        match self.text(op_node) {
            "-" => Ok(Expr::unary(Operator::Neg, self.lower_expression(operand)?)),
            "!" => Ok(Expr::unary(Operator::Not, self.lower_expression(operand)?)),
            // unary plus and dereference have no runtime effect on a table model
            "+" | "*" => self.lower_expression(operand),
            "&" if operand.kind() == "composite_literal" => self.lower_composite(operand, true),
            "&" => self.lower_expression(operand),
            "<-" => Err(self.unsupported(node, "expression", "channels")),
            op => Err(self.unsupported(op_node, "operator", format!("`{op}` has no Luau equivalent"))),
        }
    }

    /// Binary expressions. `+` becomes `..` when an operand is a string
    /// literal or the left side is already a concatenation.
    fn lower_binary(&mut self, node: Node) -> Result<Expr> {
        let op_node = self.field(node, "operator")?;
        let op = match self.text(op_node) {
            "+" => Operator::Add,
            "-" => Operator::Sub,
            "*" => Operator::Mul,
            "/" => Operator::Div,
            "%" => Operator::Rem,
            "==" => Operator::Eql,
            "!=" => Operator::Neq,
            "<" => Operator::Lss,
            ">" => Operator::Gtr,
            "<=" => Operator::Leq,
            ">=" => Operator::Geq,
            "&&" => Operator::And,
            "||" => Operator::Or,
            _ => Operator::Illegal,
        };
        if op.is_illegal() {
            let text = self.text(op_node);
            return Err(self.unsupported(op_node, "operator", format!("`{text}` has no Luau equivalent")));
        }

        let left = self.lower_expression(self.field(node, "left")?)?;
        let right = self.lower_expression(self.field(node, "right")?)?;

        let concat = right.is_string_lit()
            || left.is_string_lit()
            || matches!(&left, Expr::Binary(b) if b.op == Operator::Concat);
        let op = if op == Operator::Add && concat {
            Operator::Concat
        } else {
            op
        };
        Ok(Expr::binary(left, op, right))
    }

    /// `x[lo:hi]` calls the runtime slice helper; absent bounds pass `nil`.
    fn lower_slice(&mut self, node: Node) -> Result<Expr> {
        if node.child_by_field_name("capacity").is_some() {
            return Err(self.unsupported(node, "slice expression", "three-index slices"));
        }
        let operand = self.lower_expression(self.field(node, "operand")?)?;
        let mut bound = |name: &str| -> Result<Expr> {
            match node.child_by_field_name(name) {
                Some(n) => self.lower_expression(n),
                None => Ok(Expr::nil()),
            }
        };
        let low = bound("start")?;
        let high = bound("end")?;
        Ok(Expr::call(self.runtime("slice"), vec![operand, low, high]))
    }

    /// Composite literals. Taking the address of a named-type literal
    /// attaches the type's namespace table as its metatable.
    pub(crate) fn lower_composite(&mut self, node: Node, addressed: bool) -> Result<Expr> {
        let ty = self.field(node, "type")?;
        let body = self.field(node, "body")?;

        let keys = match ty.kind() {
            "slice_type" | "array_type" | "implicit_length_array_type" | "map_type" => Keys::Value,
            "type_identifier" => match self.lookup(self.text(ty)) {
                Some(Binding::Type { is_struct: false }) => Keys::Value,
                _ => Keys::Field,
            },
            "qualified_type" | "generic_type" => Keys::Field,
            "struct_type" => {
                return Err(self.unsupported(ty, "composite literal", "struct types without a name"));
            }
            "channel_type" => return Err(self.unsupported(ty, "composite literal", "channels")),
            kind => return Err(self.unsupported(ty, "composite literal", kind)),
        };

        let table = Expr::Table(self.lower_literal_value(body, keys)?);
        if !addressed {
            return Ok(table);
        }
        match self.type_ref(ty)? {
            Some(namespace) => Ok(Expr::call(Expr::ident("setmetatable"), vec![table, namespace])),
            None => Ok(table),
        }
    }

    /// A reference to a named type's namespace table, if `ty` names one.
    pub(crate) fn type_ref(&mut self, ty: Node) -> Result<Option<Expr>> {
        match ty.kind() {
            "type_identifier" | "identifier" => Ok(Some(Expr::ident(luau_name(self.text(ty))))),
            "qualified_type" | "selector_expression" => self.lower_expression(ty).map(Some),
            "generic_type" => self.type_ref(self.field(ty, "type")?),
            "parenthesized_type" => self.type_ref(self.only_child(ty)?),
            _ => Ok(None),
        }
    }

    fn lower_literal_value(&mut self, node: Node, keys: Keys) -> Result<TableLit> {
        let mut fields = Vec::new();
        for child in children(node) {
            let field = match child.kind() {
                "keyed_element" => {
                    let (key, value) = match (child.child_by_field_name("key"), child.child_by_field_name("value")) {
                        (Some(k), Some(v)) => (k, v),
                        _ => {
                            let parts = children(child);
                            match parts.as_slice() {
                                [k, v] => (*k, *v),
                                _ => return Err(self.unsupported(child, "composite literal", "malformed element")),
                            }
                        }
                    };
                    let entry = KeyValueExpr {
                        key: self.lower_key(key, keys)?,
                        value: self.lower_element(value)?,
                    };
                    match keys {
                        Keys::Field => TableField::KeyValue(entry),
                        Keys::Value => TableField::Computed(entry),
                    }
                }
                _ => TableField::Value(self.lower_element(child)?),
            };
            fields.push(field);
        }
        Ok(TableLit::new(fields))
    }

    fn lower_element(&mut self, node: Node) -> Result<Expr> {
        let inner = if node.kind() == "literal_element" {
            self.only_child(node)?
        } else {
            node
        };
        if inner.kind() == "literal_value" {
            // elided element type
            return self.lower_literal_value(inner, Keys::Field).map(Expr::Table);
        }
        self.lower_expression(inner)
    }

    fn lower_key(&mut self, node: Node, keys: Keys) -> Result<Expr> {
        let inner = if node.kind() == "literal_element" {
            self.only_child(node)?
        } else {
            node
        };
        if keys == Keys::Field && matches!(inner.kind(), "identifier" | "field_identifier") {
            let name = self.text(inner);
            return Ok(if is_luau_keyword(name) {
                Expr::string(name)
            } else {
                Expr::ident(name)
            });
        }
        self.lower_element(inner)
    }

    fn lower_call(&mut self, node: Node) -> Result<Expr> {
        let func = self.field(node, "function")?;
        let args_node = self.field(node, "arguments")?;
        let args = children(args_node);

        if let Some(escape) = self.lower_escape(func, node, &args)? {
            return Ok(escape);
        }

        if func.kind() == "identifier" {
            let name = self.text(func);
            match self.lookup(name) {
                None => {
                    if let Some(builtin) = self.lower_builtin(name, node, &args)? {
                        return Ok(builtin);
                    }
                }
                // conversion to a named type
                Some(Binding::Type { .. }) => {
                    let [arg] = args[..] else {
                        return Err(self.unsupported(node, "conversion", "expected one argument"));
                    };
                    return self.lower_expression(arg);
                }
                _ => {}
            }
        }
        // `(*T)(x)` and `(T)(x)`
        if func.kind() == "parenthesized_type" || (func.kind() == "parenthesized_expression" && self.names_type(func)) {
            let [arg] = args[..] else {
                return Err(self.unsupported(node, "conversion", "expected one argument"));
            };
            return self.lower_expression(arg);
        }

        let callee = self.lower_expression(func)?;
        let mut lowered = Vec::with_capacity(args.len() + 1);
        if let Some(receiver) = self.receiver(func)? {
            lowered.push(receiver);
        }
        lowered.extend(self.lower_args(&args)?);
        Ok(Expr::call(callee, lowered))
    }

    /// Arguments, with `xs...` spread through `table.unpack`.
    pub(crate) fn lower_args(&mut self, args: &[Node]) -> Result<Vec<Expr>> {
        let mut out = Vec::with_capacity(args.len());
        for arg in args {
            if arg.kind() == "variadic_argument" {
                let inner = self.lower_expression(self.only_child(*arg)?)?;
                out.push(Expr::call(
                    Expr::selector(Expr::ident("table"), "unpack"),
                    vec![inner],
                ));
            } else {
                out.push(self.lower_expression(*arg)?);
            }
        }
        Ok(out)
    }

    /// `<escape>.Mod("text")` and `<escape>.Require("path")`, with or
    /// without type arguments. `callee` is the call's function or the
    /// conversion's type; `args` are the call arguments or the conversion
    /// operand.
    fn lower_escape(&mut self, callee: Node, call: Node, args: &[Node]) -> Result<Option<Expr>> {
        let Some(name) = self.escape_member(callee) else {
            return Ok(None);
        };
        let text = match args {
            [arg] if matches!(arg.kind(), "interpreted_string_literal" | "raw_string_literal") => {
                decode_string(self.text(*arg)).map_err(|e| self.unsupported(*arg, "raw escape", e))?
            }
            _ => {
                let package = &self.options.escape_package;
                return Err(self.unsupported(
                    call,
                    "raw escape",
                    format!("{package}.{name} takes exactly one string literal"),
                ));
            }
        };
        if name == "Mod" {
            Ok(Some(Expr::raw(text)))
        } else {
            Ok(Some(self.runtime_import(text)))
        }
    }

    /// The escape function `callee` names, looking through type arguments.
    ///
    /// `transform.Mod[T](x)` parses either as a call through an instantiated
    /// selector or as a conversion to the generic type `transform.Mod[T]`.
    fn escape_member(&self, callee: Node) -> Option<&'s str> {
        let (package, member) = match callee.kind() {
            "index_expression" => return self.escape_member(callee.child_by_field_name("operand")?),
            "type_instantiation_expression" | "generic_type" => {
                return self.escape_member(callee.child_by_field_name("type")?);
            }
            "selector_expression" => (callee.child_by_field_name("operand")?, callee.child_by_field_name("field")?),
            "qualified_type" => (callee.child_by_field_name("package")?, callee.child_by_field_name("name")?),
            _ => return None,
        };
        let package = self.text(package);
        if package != self.options.escape_package || self.lookup(package) == Some(Binding::Value) {
            return None;
        }
        let member = self.text(member);
        matches!(member, "Mod" | "Require").then_some(member)
    }

    /// The receiver to pass as argument 0 when calling through a selector
    /// rooted in a local value.
    fn receiver(&mut self, func: Node) -> Result<Option<Expr>> {
        if func.kind() != "selector_expression" {
            return Ok(None);
        }
        let operand = self.field(func, "operand")?;
        if !self.rooted_in_value(operand) {
            return Ok(None);
        }
        self.lower_expression(operand).map(Some)
    }

    /// Whether an expression-position node spells a type, as the callee of
    /// a conversion does.
    fn names_type(&self, node: Node) -> bool {
        match node.kind() {
            "pointer_type" | "qualified_type" | "parenthesized_type" => true,
            "identifier" | "type_identifier" => matches!(self.lookup(self.text(node)), Some(Binding::Type { .. })),
            "parenthesized_expression" => children(node).first().is_some_and(|n| self.names_type(*n)),
            "unary_expression" => {
                node.child_by_field_name("operator").is_some_and(|op| self.text(op) == "*")
                    && node.child_by_field_name("operand").is_some_and(|n| self.names_type(n))
            }
            _ => false,
        }
    }

    fn rooted_in_value(&self, node: Node) -> bool {
        match node.kind() {
            "identifier" => self.lookup(self.text(node)) == Some(Binding::Value),
            "selector_expression" | "index_expression" => node
                .child_by_field_name("operand")
                .is_some_and(|n| self.rooted_in_value(n)),
            "parenthesized_expression" => children(node).first().is_some_and(|n| self.rooted_in_value(*n)),
            "unary_expression" => {
                node.child_by_field_name("operator").is_some_and(|op| self.text(op) == "*")
                    && node
                        .child_by_field_name("operand")
                        .is_some_and(|n| self.rooted_in_value(n))
            }
            _ => false,
        }
    }
}

/// `subject.field`, or `subject["field"]` when the field is a Luau keyword.
fn select(subject: Expr, field: &str) -> Expr {
    if is_luau_keyword(field) {
        Expr::index(subject, Expr::string(field))
    } else {
        Expr::selector(subject, field)
    }
}
