//! Snapshot tests for module rendering.
//!
//! Run `cargo insta review` to update snapshots after intentional changes.

use goluau_luau::{
    Chunk, DeclStmt, ElseBranch, Expr, File, FuncStmt, Ident, KeyValueExpr, Operator, Scope, Stmt, TableField,
    render_module,
};

fn namespace(name: &str) -> Stmt {
    Stmt::block(vec![
        Stmt::local(name, Expr::table(vec![])),
        Stmt::assign(
            vec![Expr::selector(Expr::ident(name), "__index")],
            Operator::Assign,
            vec![Expr::ident(name)],
        ),
    ])
}

fn method(name: &str, params: &[&str], body: Vec<Stmt>) -> Stmt {
    Stmt::Func(FuncStmt {
        scope: Scope::Global,
        name: Ident::new(name),
        params: params.iter().map(|p| Ident::new(*p)).collect(),
        body: Chunk::new(body),
    })
}

#[test]
fn module_with_every_phase() {
    let mut file = File::new("entity", "out/entity");
    file.push(method(
        "Entity.Greet",
        &["e", "msg"],
        vec![Stmt::expr(Expr::call(
            Expr::ident("print"),
            vec![Expr::binary(Expr::selector(Expr::ident("e"), "Name"), Operator::Concat, Expr::ident("msg"))],
        ))],
    ));
    file.push(namespace("Entity"));
    file.push(Stmt::raw("local HttpService = game:GetService(\"HttpService\")"));
    file.push(Stmt::Decl(DeclStmt::single(
        Scope::Global,
        Ident::new("Default"),
        Expr::call(
            Expr::ident("setmetatable"),
            vec![
                Expr::table(vec![TableField::KeyValue(KeyValueExpr {
                    key: Expr::ident("Name"),
                    value: Expr::string("anon"),
                })]),
                Expr::ident("Entity"),
            ],
        ),
    )));
    file.push(Stmt::ret(vec![Expr::table(vec![
        TableField::KeyValue(KeyValueExpr {
            key: Expr::ident("Entity"),
            value: Expr::ident("Entity"),
        }),
        TableField::KeyValue(KeyValueExpr {
            key: Expr::ident("Default"),
            value: Expr::ident("Default"),
        }),
    ])]));

    insta::assert_snapshot!(render_module(&file), @r#"
    local HttpService = game:GetService("HttpService")
    local Entity = {}
    Default = setmetatable({
    	Name = "anon"
    }, Entity)
    function Entity.Greet(e, msg)
    	print(e.Name .. msg)
    end
    Entity.__index = Entity
    return {
    	Entity = Entity,
    	Default = Default
    }
    "#);
}

#[test]
fn nested_control_flow() {
    let inner = Stmt::if_stmt(
        Expr::binary(
            Expr::binary(Expr::ident("i"), Operator::Rem, Expr::number("2")),
            Operator::Eql,
            Expr::number("0"),
        ),
        Chunk::new(vec![Stmt::Continue]),
        None,
    );
    let body = vec![
        Stmt::NumericFor(goluau_luau::NumericForStmt {
            counter: Ident::new("i"),
            start: Expr::number("1"),
            bound: Expr::number("10"),
            step: None,
            body: Chunk::new(vec![inner, Stmt::expr(Expr::call(Expr::ident("print"), vec![Expr::ident("i")]))]),
        }),
        Stmt::if_stmt(
            Expr::ident("done"),
            Chunk::new(vec![Stmt::ret(vec![])]),
            Some(ElseBranch::Chunk(Chunk::new(vec![Stmt::ret(vec![Expr::nil()])]))),
        ),
    ];
    let mut file = File::new("loop", "out");
    file.push(method("run", &["done"], body));

    insta::assert_snapshot!(render_module(&file), @r"
    function run(done)
    	for i = 1, 10 do
    		if i % 2 == 0 then
    			continue
    		end
    		print(i)
    	end
    	if done then
    		return
    	else
    		return nil
    	end
    end
    ");
}

#[test]
fn tree_serializes_for_inspection() {
    insta::assert_json_snapshot!(
        Expr::binary(Expr::ident("a"), Operator::Concat, Expr::string("!")),
        @r#"
    {
      "Binary": {
        "left": {
          "Ident": {
            "name": "a"
          }
        },
        "op": "Concat",
        "right": {
          "String": {
            "value": "!"
          }
        }
      }
    }
    "#
    );
}
