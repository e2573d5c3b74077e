//! Lowering of Go syntax into the Luau tree.
//!
//! A [`Lowerer`] walks one parsed file. It keeps the lexical scopes it needs
//! to tell values from types and packages (receiver insertion, builtin
//! shadowing) and a stack of enclosing loops, switches and functions for
//! `break`/`continue`/`return`. Nothing survives between files.

mod builtins;
mod expr;
mod loops;
mod stmt;

use crate::error::TranslateError;
use crate::options::TransformOptions;
use crate::source::{self, decode_string, is_luau_keyword, luau_name};
use goluau_luau::{DeclStmt, Expr, FuncStmt, Ident, Operator, Scope, Stmt};
use std::collections::HashMap;
use tracing::debug;
use tree_sitter::Node;

pub(crate) type Result<T> = std::result::Result<T, TranslateError>;

/// What a name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Binding {
    Value,
    Type { is_struct: bool },
    Package,
}

/// Enclosing construct that `break`, `continue` and `return` resolve against.
#[derive(Debug, Clone)]
pub(crate) enum Frame {
    /// `post` runs before every `continue` when the loop was lowered to `while`.
    Loop { post: Option<Stmt> },
    Switch,
    /// `results` are the named results returned by a bare `return`.
    Function { results: Vec<Ident> },
}

/// Lower a whole Go file with default options.
pub fn lower_source(file_name: &str, source: &str) -> Result<Vec<Stmt>> {
    lower_source_with(file_name, source, &TransformOptions::default())
}

pub fn lower_source_with(
    file_name: &str,
    source: &str,
    options: &TransformOptions,
) -> Result<Vec<Stmt>> {
    let tree = source::parse(file_name, source)?;
    let mut lowerer = Lowerer::new(file_name, source, options);
    let decls = lowerer.lower_file(tree.root_node())?;
    debug!(file = file_name, decls = decls.len(), "lowered");
    Ok(decls)
}

pub struct Lowerer<'s> {
    file: &'s str,
    source: &'s str,
    options: &'s TransformOptions,
    scopes: Vec<HashMap<String, Binding>>,
    frames: Vec<Frame>,
    iota: Option<u64>,
    temps: usize,
}

impl<'s> Lowerer<'s> {
    pub fn new(file: &'s str, source: &'s str, options: &'s TransformOptions) -> Self {
        Self {
            file,
            source,
            options,
            scopes: vec![HashMap::new()],
            frames: Vec::new(),
            iota: None,
            temps: 0,
        }
    }

    /// Lower every top-level declaration of a `source_file` node.
    pub fn lower_file(&mut self, root: Node) -> Result<Vec<Stmt>> {
        self.declare_package(root);

        let mut decls = Vec::new();
        for child in children(root) {
            if let Some(decl) = self.lower_declaration(child)? {
                decls.push(decl);
            }
        }
        Ok(decls)
    }

    /// Lower one top-level declaration. Package clauses and dropped imports
    /// produce nothing; declarations with several specs produce a `Block`.
    pub fn lower_declaration(&mut self, node: Node) -> Result<Option<Stmt>> {
        match node.kind() {
            "package_clause" | "comment" => Ok(None),
            "import_declaration" => self.lower_imports(node),
            "function_declaration" => self.lower_function(node).map(Some),
            "method_declaration" => self.lower_method(node).map(Some),
            "type_declaration" => self.lower_types(node).map(Some),
            "var_declaration" => self.lower_vars(node, Scope::Global).map(Some),
            "const_declaration" => self.lower_consts(node, Scope::Global).map(Some),
            kind => Err(self.unsupported(node, "declaration", kind)),
        }
    }

    // Package-level names are visible before their declaration.
    fn declare_package(&mut self, root: Node) {
        for child in children(root) {
            match child.kind() {
                "function_declaration" => {
                    if let Some(name) = child.child_by_field_name("name") {
                        self.declare(self.text(name), Binding::Value);
                    }
                }
                "var_declaration" | "const_declaration" => {
                    for spec in specs(child, &["var_spec", "const_spec"]) {
                        for name in field_nodes(spec, "name") {
                            self.declare(self.text(name), Binding::Value);
                        }
                    }
                }
                "type_declaration" => {
                    for spec in specs(child, &["type_spec", "type_alias"]) {
                        self.declare_type(spec);
                    }
                }
                "import_declaration" => {
                    for spec in specs(child, &["import_spec"]) {
                        if let Ok(Some(name)) = self.import_name(spec) {
                            self.declare(&name, Binding::Package);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn lower_imports(&mut self, node: Node) -> Result<Option<Stmt>> {
        let mut stmts = Vec::new();
        for spec in specs(node, &["import_spec"]) {
            let Some(name) = self.import_name(spec)? else {
                continue;
            };
            if name == self.options.escape_package {
                debug!(file = self.file, "dropping import of escape package");
                continue;
            }
            let path = self.import_path(spec)?;
            stmts.push(Stmt::local(luau_name(&name), self.runtime_import(path)));
        }
        Ok(match stmts.len() {
            0 => None,
            1 => stmts.pop(),
            _ => Some(Stmt::block(stmts)),
        })
    }

    fn import_path(&self, spec: Node) -> Result<String> {
        let path = self.field(spec, "path")?;
        decode_string(self.text(path)).map_err(|e| self.unsupported(path, "import path", e))
    }

    /// The name an import binds. Dot imports have none and are rejected.
    fn import_name(&self, spec: Node) -> Result<Option<String>> {
        if let Some(name) = spec.child_by_field_name("name") {
            return match name.kind() {
                "dot" => Err(self.unsupported(name, "import", "dot imports")),
                "blank_identifier" => Ok(Some("_".into())),
                _ => Ok(Some(self.text(name).to_string())),
            };
        }
        let path = self.import_path(spec)?;
        Ok(Some(package_name(&path)))
    }

    pub(crate) fn runtime_import(&self, path: String) -> Expr {
        Expr::call(self.runtime("import"), vec![Expr::string(path)])
    }

    /// `GO.<helper>`.
    pub(crate) fn runtime(&self, helper: &str) -> Expr {
        Expr::selector(Expr::ident(self.options.runtime.as_str()), helper)
    }

    fn lower_function(&mut self, node: Node) -> Result<Stmt> {
        let name_node = self.field(node, "name")?;
        let name = self.text(name_node);
        let params = self.field(node, "parameters")?;
        let result = node.child_by_field_name("result");
        let body = node.child_by_field_name("body");

        let (params, body) = self.lower_function_body(None, params, result, body)?;

        if name == "init" && params.is_empty() {
            // several init functions may coexist; each runs once after the
            // declarations are in place
            let init = Stmt::Func(FuncStmt {
                scope: Scope::Local,
                name: Ident::new("init"),
                params,
                body,
            });
            let call = Stmt::expr(Expr::call(Expr::ident("init"), vec![]));
            return Ok(Stmt::do_block(vec![init, call]));
        }

        Ok(Stmt::Func(FuncStmt {
            scope: Scope::Global,
            name: Ident::new(luau_name(name)),
            params,
            body,
        }))
    }

    fn lower_method(&mut self, node: Node) -> Result<Stmt> {
        let receivers = self.field(node, "receiver")?;
        let receiver = children(receivers)
            .into_iter()
            .next()
            .ok_or_else(|| self.unsupported(receivers, "method", "missing receiver"))?;
        let recv_type = self.field(receiver, "type")?;
        if recv_type.kind() != "pointer_type" {
            return Err(self.unsupported(recv_type, "method", "function receivers must be pointers"));
        }
        let type_name = self.receiver_type_name(recv_type)?;

        let method_node = self.field(node, "name")?;
        let method = self.text(method_node);
        if is_luau_keyword(method) {
            return Err(self.unsupported(method_node, "method", format!("`{method}` is a Luau keyword")));
        }

        let recv_name = field_nodes(receiver, "name")
            .first()
            .map(|n| luau_name(self.text(*n)))
            .unwrap_or_else(|| "_".to_string());

        let params = self.field(node, "parameters")?;
        let result = node.child_by_field_name("result");
        let body = node.child_by_field_name("body");
        let (params, body) = self.lower_function_body(Some(recv_name), params, result, body)?;

        Ok(Stmt::Func(FuncStmt {
            scope: Scope::Global,
            name: Ident::new(format!("{type_name}.{method}")),
            params,
            body,
        }))
    }

    fn receiver_type_name(&self, pointer: Node) -> Result<String> {
        let target = children(pointer)
            .into_iter()
            .next()
            .ok_or_else(|| self.unsupported(pointer, "method", "receiver type must be identifier"))?;
        let ident = match target.kind() {
            "type_identifier" => target,
            "generic_type" => self.field(target, "type")?,
            _ => return Err(self.unsupported(target, "method", "receiver type must be identifier")),
        };
        Ok(luau_name(self.text(ident)))
    }

    /// Lower parameters, named results and body of any function form.
    ///
    /// A receiver name becomes parameter 0. Variadic parameters become `...`
    /// and are collected into a table at the top of the body; named results
    /// are declared there with their zero values.
    pub(crate) fn lower_function_body(
        &mut self,
        receiver: Option<String>,
        params: Node,
        result: Option<Node>,
        body: Option<Node>,
    ) -> Result<(Vec<Ident>, goluau_luau::Chunk)> {
        self.scoped(|this| {
            let mut idents = Vec::new();
            let mut prelude = Vec::new();

            if let Some(recv) = receiver {
                this.declare(&recv, Binding::Value);
                idents.push(Ident::new(recv));
            }

            for param in children(params) {
                let names = field_nodes(param, "name");
                match param.kind() {
                    "variadic_parameter_declaration" => {
                        idents.push(Ident::new("..."));
                        if let Some(name) = names.first() {
                            let name = luau_name(this.text(*name));
                            this.declare(&name, Binding::Value);
                            prelude.push(Stmt::local(name, Expr::list(vec![Expr::ident("...")])));
                        }
                    }
                    _ if names.is_empty() => idents.push(Ident::blank()),
                    _ => {
                        for name in names {
                            let name = luau_name(this.text(name));
                            this.declare(&name, Binding::Value);
                            idents.push(Ident::new(name));
                        }
                    }
                }
            }

            let mut results = Vec::new();
            if let Some(result) = result.filter(|r| r.kind() == "parameter_list") {
                let mut values = Vec::new();
                for decl in children(result) {
                    let ty = decl.child_by_field_name("type");
                    for name in field_nodes(decl, "name") {
                        let name = luau_name(this.text(name));
                        this.declare(&name, Binding::Value);
                        results.push(Ident::new(name));
                        values.push(this.zero_value(ty));
                    }
                }
                if !results.is_empty() {
                    let decl = DeclStmt::new(Scope::Local, results.clone(), values)
                        .map_err(|e| this.unsupported(result, "result list", e.to_string()))?;
                    prelude.push(Stmt::Decl(decl));
                }
            }

            let stmts = match body {
                Some(body) => this.in_frame(Frame::Function { results }, |this| {
                    this.lower_statements(block_items(body))
                })?,
                None => Vec::new(),
            };
            prelude.extend(stmts);
            Ok((idents, goluau_luau::Chunk::new(prelude)))
        })
    }

    /// `type` declarations: each named type becomes a namespace table whose
    /// `__index` points at itself; aliases bind the aliased type.
    fn lower_types(&mut self, node: Node) -> Result<Stmt> {
        let mut stmts = Vec::new();
        for spec in specs(node, &["type_spec", "type_alias"]) {
            let name = luau_name(self.text(self.field(spec, "name")?));
            if spec.kind() == "type_alias" {
                let target = self.field(spec, "type")?;
                let value = self.type_ref(target)?.unwrap_or_else(|| Expr::table(vec![]));
                stmts.push(Stmt::local(name.clone(), value));
            } else {
                stmts.push(Stmt::block(vec![
                    Stmt::local(name.clone(), Expr::table(vec![])),
                    Stmt::assign(
                        vec![Expr::selector(Expr::ident(name.as_str()), "__index")],
                        Operator::Assign,
                        vec![Expr::ident(name.as_str())],
                    ),
                ]));
            }
            self.declare_type(spec);
        }
        Ok(single_or_block(stmts))
    }

    fn declare_type(&mut self, spec: Node) {
        if let Some(name) = spec.child_by_field_name("name") {
            let is_struct = spec.kind() == "type_spec"
                && spec
                    .child_by_field_name("type")
                    .is_some_and(|t| t.kind() == "struct_type");
            self.declare(self.text(name), Binding::Type { is_struct });
        }
    }

    pub(crate) fn lower_vars(&mut self, node: Node, scope: Scope) -> Result<Stmt> {
        let mut stmts = Vec::new();
        for spec in specs(node, &["var_spec"]) {
            let ty = spec.child_by_field_name("type");
            let value_nodes = list_items(spec.child_by_field_name("value"));
            let names = field_nodes(spec, "name");
            let values = if value_nodes.is_empty() {
                names.iter().map(|_| self.zero_value(ty)).collect()
            } else {
                self.lower_exprs(&value_nodes)?
            };
            stmts.push(self.bind(spec, scope, &names, values)?);
        }
        Ok(single_or_block(stmts))
    }

    /// `const` declarations, with `iota` and implicit repetition of the
    /// previous spec's expressions.
    pub(crate) fn lower_consts(&mut self, node: Node, scope: Scope) -> Result<Stmt> {
        let mut stmts = Vec::new();
        let mut previous: Vec<Node> = Vec::new();
        for (index, spec) in specs(node, &["const_spec"]).into_iter().enumerate() {
            let mut value_nodes = list_items(spec.child_by_field_name("value"));
            if value_nodes.is_empty() {
                value_nodes = previous.clone();
            }
            if value_nodes.is_empty() {
                return Err(self.unsupported(spec, "constant", "missing value"));
            }

            self.iota = Some(index as u64);
            let values = self.lower_exprs(&value_nodes);
            self.iota = None;

            let names = field_nodes(spec, "name");
            stmts.push(self.bind(spec, scope, &names, values?)?);
            previous = value_nodes;
        }
        Ok(single_or_block(stmts))
    }

    /// Bind `names` to `values` after the values are lowered.
    ///
    /// A single blank name bound to raw text emits the text itself.
    fn bind(&mut self, spec: Node, scope: Scope, names: &[Node], values: Vec<Expr>) -> Result<Stmt> {
        let idents: Vec<Ident> = names.iter().map(|n| Ident::new(luau_name(self.text(*n)))).collect();

        if idents.len() == 1 && idents[0].is_blank() {
            if let [Expr::Raw(raw)] = values.as_slice() {
                return Ok(Stmt::Raw(raw.clone()));
            }
        }

        // blank-only bindings never leak a global `_`
        let scope = if idents.iter().all(Ident::is_blank) {
            Scope::Local
        } else {
            scope
        };

        let decl = DeclStmt::new(scope, idents, values)
            .map_err(|e| self.unsupported(spec, "declaration", e.to_string()))?;
        for name in decl.names() {
            self.declare(&name.name, Binding::Value);
        }
        Ok(Stmt::Decl(decl))
    }

    /// Zero value for a declared type: numbers, strings, booleans, structs
    /// declared in this package, and `nil` for everything else.
    pub(crate) fn zero_value(&self, ty: Option<Node>) -> Expr {
        let Some(ty) = ty else {
            return Expr::nil();
        };
        if ty.kind() != "type_identifier" {
            return Expr::nil();
        }
        let name = self.text(ty);
        match name {
            "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16" | "uint32"
            | "uint64" | "uintptr" | "float32" | "float64" | "byte" | "rune" => Expr::number("0"),
            "string" => Expr::string(""),
            "bool" => Expr::bool(false),
            _ => match self.lookup(name) {
                Some(Binding::Type { is_struct: true }) => Expr::call(
                    Expr::ident("setmetatable"),
                    vec![Expr::table(vec![]), Expr::ident(luau_name(name))],
                ),
                _ => Expr::nil(),
            },
        }
    }

    pub(crate) fn text(&self, node: Node) -> &'s str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    pub(crate) fn field<'t>(&self, node: Node<'t>, name: &str) -> Result<Node<'t>> {
        node.child_by_field_name(name)
            .ok_or_else(|| self.unsupported(node, node.kind(), format!("missing {name}")))
    }

    pub(crate) fn unsupported(&self, node: Node, construct: &str, detail: impl Into<String>) -> TranslateError {
        TranslateError::Unsupported {
            construct: construct.to_string(),
            detail: detail.into(),
            position: source::position(self.file, Some(node)),
        }
    }

    pub(crate) fn declare(&mut self, name: &str, binding: Binding) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), binding);
        }
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<Binding> {
        self.scopes.iter().rev().find_map(|s| s.get(name).copied())
    }

    pub(crate) fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.scopes.push(HashMap::new());
        let out = f(self);
        self.scopes.pop();
        out
    }

    pub(crate) fn in_frame<T>(&mut self, frame: Frame, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.frames.push(frame);
        let out = f(self);
        self.frames.pop();
        out
    }

    pub(crate) fn temp(&mut self, prefix: &str) -> String {
        self.temps += 1;
        format!("__{prefix}{}", self.temps)
    }
}

/// Named children, comments excluded.
pub(crate) fn children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect()
}

pub(crate) fn field_nodes<'t>(node: Node<'t>, name: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(name, &mut cursor).collect()
}

/// Items of an `expression_list`, or the node itself.
pub(crate) fn list_items(node: Option<Node>) -> Vec<Node> {
    match node {
        None => Vec::new(),
        Some(n) if n.kind() == "expression_list" => children(n),
        Some(n) => vec![n],
    }
}

/// Statements of a block, looking through `statement_list` wrappers.
pub(crate) fn block_items(node: Node) -> Vec<Node> {
    let mut items = Vec::new();
    for child in children(node) {
        if child.kind() == "statement_list" {
            items.extend(children(child));
        } else {
            items.push(child);
        }
    }
    items
}

/// Specs of a grouped declaration, looking through `*_list` wrappers.
fn specs<'t>(node: Node<'t>, kinds: &[&str]) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    for child in children(node) {
        if kinds.contains(&child.kind()) {
            out.push(child);
        } else if child.kind().ends_with("_list") {
            out.extend(specs(child, kinds));
        }
    }
    out
}

fn single_or_block(mut stmts: Vec<Stmt>) -> Stmt {
    if stmts.len() == 1 {
        if let Some(stmt) = stmts.pop() {
            return stmt;
        }
    }
    Stmt::block(stmts)
}

/// Package name implied by an import path: the last element, skipping a
/// major-version suffix (`/v2`, `.v3`).
pub(crate) fn package_name(path: &str) -> String {
    let mut parts = path.rsplit('/');
    let mut last = parts.next().unwrap_or(path);
    let is_version = |s: &str| s.len() > 1 && s.starts_with('v') && s[1..].bytes().all(|b| b.is_ascii_digit());
    if is_version(last) {
        if let Some(prev) = parts.next() {
            last = prev;
        }
    }
    if let Some((stem, suffix)) = last.rsplit_once('.') {
        if is_version(suffix) {
            last = stem;
        }
    }
    last.replace(['-', '.'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_names() {
        assert_eq!(package_name("fmt"), "fmt");
        assert_eq!(package_name("github.com/a/logger"), "logger");
        assert_eq!(package_name("github.com/a/b/v2"), "b");
        assert_eq!(package_name("gopkg.in/yaml.v3"), "yaml");
        assert_eq!(package_name("github.com/a/go-json"), "go_json");
    }
}
