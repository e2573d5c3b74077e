//! End-to-end lowering tests: Go source in, rendered Luau out.

use goluau_luau::{Chunk, Render, Stmt};
use goluau_transform::{TranslateError, lower_source, synthesize_exports, translate};

fn lua(src: &str) -> String {
    translate("main.go", src).expect("translation failed")
}

/// Render the lowered declarations without the export table.
fn body(src: &str) -> String {
    lower_source("main.go", src)
        .expect("lowering failed")
        .iter()
        .map(|s| s.to_luau())
        .collect()
}

fn unsupported(src: &str) -> (String, String) {
    match lower_source("main.go", src) {
        Err(TranslateError::Unsupported { construct, detail, .. }) => (construct, detail),
        other => panic!("expected unsupported construct, got {other:?}"),
    }
}

mod declarations {
    use super::*;

    #[test]
    fn hello_world() {
        let out = lua("package main\n\nfunc main() {\n\tprint(\"hello\")\n}\n");
        insta::assert_snapshot!(out, @r#"
        function main()
        	print("hello")
        end
        return {
        	main = main
        }
        "#);
    }

    #[test]
    fn pointer_receiver_method() {
        let out = body("package main\n\nfunc (e *Entity) Bar(msg string) {\n\tprint(msg)\n}\n");
        assert_eq!(out, "function Entity.Bar(e, msg)\n\tprint(msg)\nend\n");
    }

    #[test]
    fn value_receiver_is_rejected() {
        let (construct, detail) = unsupported("package main\n\nfunc (e Entity) Bar() {}\n");
        assert_eq!(construct, "method");
        assert_eq!(detail, "function receivers must be pointers");
    }

    #[test]
    fn type_declaration_builds_namespace() {
        let out = lua("package main\n\ntype Entity struct {\n\tName string\n}\n\nfunc (e *Entity) Hello() {\n\tprint(e.Name)\n}\n");
        insta::assert_snapshot!(out, @r#"
        local Entity = {}
        function Entity.Hello(e)
        	print(e.Name)
        end
        Entity.__index = Entity
        return {
        	Entity = Entity
        }
        "#);
    }

    #[test]
    fn exports_skip_methods_and_private_values() {
        let src = "package main\n\nfunc Foo() {}\nfunc (e *Entity) Bar() {}\nvar baz = 1\nvar Qux = 2\n";
        let decls = lower_source("main.go", src).unwrap();
        assert_eq!(
            synthesize_exports(&decls).to_luau(),
            "return {\n\tFoo = Foo,\n\tQux = Qux\n}\n"
        );
    }

    #[test]
    fn imports_bind_package_names() {
        let src = r#"package main

import (
	"fmt"
	log "github.com/x/logger"
	_ "github.com/x/sideeffect"
	"github.com/intervinn/abq/transform"
)
"#;
        assert_eq!(
            body(src),
            "local fmt = GO.import(\"fmt\")\nlocal log = GO.import(\"github.com/x/logger\")\nlocal _ = GO.import(\"github.com/x/sideeffect\")\n"
        );
    }

    #[test]
    fn dot_imports_are_rejected() {
        let (construct, detail) = unsupported("package main\n\nimport . \"fmt\"\n");
        assert_eq!(construct, "import");
        assert_eq!(detail, "dot imports");
    }

    #[test]
    fn const_iota_repeats() {
        let src = "package main\n\nconst (\n\tA = iota\n\tB\n\tC\n)\n";
        assert_eq!(body(src), "A = 0\nB = 1\nC = 2\n");
    }

    #[test]
    fn var_zero_values() {
        let src = "package main\n\nvar count int\nvar name string\nvar ok bool\nvar p *int\n";
        assert_eq!(body(src), "count = 0\nname = \"\"\nok = false\np = nil\n");
    }

    #[test]
    fn struct_zero_value_gets_metatable() {
        let src = "package main\n\ntype Buffer struct{}\n\nfunc f() {\n\tvar b Buffer\n\tb.Reset()\n}\n";
        let out = lua(src);
        assert!(out.contains("\tlocal b = setmetatable({}, Buffer)\n"), "{out}");
        assert!(out.contains("\tb.Reset(b)\n"), "{out}");
    }

    #[test]
    fn multi_value_call_declaration() {
        let src = "package main\n\nfunc f() {\n\tv, err := load()\n\tprint(v, err)\n}\n";
        assert!(body(src).contains("\tlocal v, err = load()\n"));
    }

    #[test]
    fn comma_ok_is_rejected() {
        let (construct, _) = unsupported("package main\n\nfunc f(m map[string]int) {\n\tv, ok := m[\"a\"]\n}\n");
        assert_eq!(construct, "declaration");
    }

    #[test]
    fn init_runs_in_place() {
        let src = "package main\n\nfunc init() {\n\tprint(\"ready\")\n}\n";
        assert_eq!(
            body(src),
            "do\n\tlocal function init()\n\t\tprint(\"ready\")\n\tend\n\tinit()\nend\n"
        );
    }

    #[test]
    fn variadic_parameters_and_spread() {
        let src = "package main\n\nfunc sum(xs ...int) int {\n\ttotal := 0\n\tfor _, x := range xs {\n\t\ttotal += x\n\t}\n\treturn total\n}\n\nfunc main() {\n\tnums := []int{1, 2, 3}\n\tprint(sum(nums...))\n}\n";
        let out = body(src);
        assert!(
            out.starts_with("function sum(...)\n\tlocal xs = {...}\n\tlocal total = 0\n\tfor _, x in xs do\n\t\ttotal += x\n\tend\n\treturn total\nend\n"),
            "{out}"
        );
        assert!(out.contains("\tlocal nums = {1, 2, 3}\n"), "{out}");
        assert!(out.contains("\tprint(sum(table.unpack(nums)))\n"), "{out}");
    }

    #[test]
    fn named_results_on_bare_return() {
        let src = "package main\n\nfunc div(a, b int) (q int, err error) {\n\tq = a / b\n\treturn\n}\n";
        assert_eq!(
            body(src),
            "function div(a, b)\n\tlocal q, err = 0, nil\n\tq = a / b\n\treturn q, err\nend\n"
        );
    }

    #[test]
    fn keyword_identifiers_are_renamed() {
        let src = "package main\n\nfunc f() {\n\tend := 1\n\tprint(end)\n}\n";
        assert_eq!(body(src), "function f()\n\tlocal end_ = 1\n\tprint(end_)\nend\n");
    }

    #[test]
    fn blank_vars_with_zero_values_are_locals() {
        let src = "package main\n\nvar _ bool\nvar _ int\n";
        assert_eq!(body(src), "local _ = false\nlocal _ = 0\n");
    }

    #[test]
    fn pointer_conversion_passes_operand_through() {
        let src = "package main\n\ntype T struct{}\n\nvar _ fmt.Stringer = (*T)(nil)\nvar _ = (T)(x)\n";
        let out = body(src);
        assert!(out.contains("local _ = nil\n"), "{out}");
        assert!(out.contains("local _ = x\n"), "{out}");
        assert!(!out.contains("(T)"), "{out}");
    }
}

mod expressions {
    use super::*;

    #[test]
    fn string_literal_plus_is_concatenation() {
        let src = "package main\n\nfunc greet(name string) string {\n\ts := name + \"!\"\n\ts += \"?\"\n\treturn s\n}\n";
        let out = body(src);
        assert!(out.contains("local s = name .. \"!\""), "{out}");
        assert!(out.contains("s ..= \"?\""), "{out}");
        assert!(!out.contains(" + "), "{out}");
    }

    #[test]
    fn numeric_plus_is_kept() {
        let src = "package main\n\nfunc f(a, b int) int {\n\treturn a + b\n}\n";
        assert!(body(src).contains("return a + b"));
    }

    #[test]
    fn address_of_struct_literal_attaches_metatable() {
        let src = "package main\n\ntype Entity struct {\n\tX int\n}\n\nfunc f() *Entity {\n\te := &Entity{X: 1}\n\treturn e\n}\n";
        let out = lua(src);
        assert!(
            out.contains("\tlocal e = setmetatable({\n\t\tX = 1\n\t}, Entity)\n"),
            "{out}"
        );
    }

    #[test]
    fn map_literal_keys_are_bracketed() {
        let src = "package main\n\nfunc f(k string) {\n\tm := map[string]int{\"a\": 1, k: 2}\n\tprint(m)\n}\n";
        let out = body(src);
        assert!(
            out.contains("\tlocal m = {\n\t\t[\"a\"] = 1,\n\t\t[k] = 2\n\t}\n"),
            "{out}"
        );
    }

    #[test]
    fn bare_struct_literal_is_rejected() {
        let (construct, _) = unsupported("package main\n\nvar p = struct{ X int }{X: 1}\n");
        assert_eq!(construct, "composite literal");
    }

    #[test]
    fn two_index_slice_uses_runtime() {
        let src = "package main\n\nfunc f(xs []int) {\n\tys := xs[1:3]\n\tzs := xs[:2]\n\tprint(ys, zs)\n}\n";
        let out = body(src);
        assert!(out.contains("\tlocal ys = GO.slice(xs, 1, 3)\n"), "{out}");
        assert!(out.contains("\tlocal zs = GO.slice(xs, nil, 2)\n"), "{out}");
    }

    #[test]
    fn three_index_slice_is_rejected() {
        let (construct, detail) = unsupported("package main\n\nfunc f(xs []int) {\n\tys := xs[1:2:3]\n}\n");
        assert_eq!(construct, "slice expression");
        assert_eq!(detail, "three-index slices");
    }

    #[test]
    fn instance_calls_pass_receiver() {
        let src = "package main\n\nimport \"fmt\"\n\nfunc use(e *Entity) {\n\te.Bar(\"x\")\n\tfmt.Println(\"y\")\n}\n";
        let out = body(src);
        assert!(out.contains("\te.Bar(e, \"x\")\n"), "{out}");
        assert!(out.contains("\tfmt.Println(\"y\")\n"), "{out}");
    }

    #[test]
    fn builtins() {
        let src = "package main\n\nfunc f(xs []int, m map[string]int) {\n\tn := len(xs)\n\txs = append(xs, n)\n\tdelete(m, \"a\")\n\tt := make(map[string]int)\n\ts := string(n)\n\tprint(t, s)\n\tpanic(\"boom\")\n}\n";
        let out = body(src);
        assert!(out.contains("\tlocal n = #xs\n"), "{out}");
        assert!(out.contains("\txs = GO.append(xs, n)\n"), "{out}");
        assert!(out.contains("\tGO.delete(m, \"a\")\n"), "{out}");
        assert!(out.contains("\tlocal t = {}\n"), "{out}");
        assert!(out.contains("\tlocal s = tostring(n)\n"), "{out}");
        assert!(out.contains("\terror(\"boom\")\n"), "{out}");
    }

    #[test]
    fn shadowed_builtin_is_an_ordinary_call() {
        let src = "package main\n\nfunc f(len func(int) int) {\n\tprint(len(3))\n}\n";
        assert!(body(src).contains("\tprint(len(3))\n"));
    }

    #[test]
    fn channels_are_rejected() {
        let (_, detail) = unsupported("package main\n\nfunc f() {\n\tc := make(chan int)\n}\n");
        assert_eq!(detail, "channels");
    }

    #[test]
    fn bitwise_operators_are_rejected() {
        let (construct, _) = unsupported("package main\n\nvar x = 1 << 3\n");
        assert_eq!(construct, "operator");
    }

    #[test]
    fn func_literal() {
        let src = "package main\n\nfunc f() {\n\tdouble := func(x int) int {\n\t\treturn x * 2\n\t}\n\tprint(double(2))\n}\n";
        assert!(body(src).contains("\tlocal double = function(x)\n\t\treturn x * 2\n\tend\n"));
    }

    #[test]
    fn literals() {
        let src = "package main\n\nvar a = 0o17\nvar b = 'x'\nvar c = `raw\\n`\nvar d = \"tab\\there\"\nvar e = 1_000\n";
        assert_eq!(
            body(src),
            "a = 15\nb = \"x\"\nc = \"raw\\\\n\"\nd = \"tab\\there\"\ne = 1000\n"
        );
    }

    #[test]
    fn keyword_fields_use_brackets() {
        let src = "package main\n\nfunc f(r Range) {\n\tprint(r.end)\n}\n";
        assert!(body(src).contains("\tprint(r[\"end\"])\n"));
    }

    #[test]
    fn string_literal_on_the_left_concatenates() {
        let out = body("package main\n\nfunc f(b string) string {\n\treturn \"a\" + b\n}\n");
        assert!(out.contains("\treturn \"a\" .. b\n"), "{out}");

        let out = body("package main\n\nfunc f(b, c string) string {\n\treturn b + \"-\" + c\n}\n");
        assert!(!out.contains(" + "), "{out}");
        assert!(out.contains(".. c\n"), "{out}");
    }

    #[test]
    fn invalid_utf8_escapes_stay_bytes() {
        let src = "package main\n\nvar s = \"\\xff\\xfe\"\nvar r = '\\xff'\n";
        assert_eq!(body(src), "s = \"\\xFF\\xFE\"\nr = \"\u{ff}\"\n");
    }
}

mod raw_escape {
    use super::*;

    #[test]
    fn top_level_blank_var_is_raw() {
        let src = "package main\n\nvar _ = transform.Mod[any](\"local json = require(script.json)\")\n";
        assert_eq!(body(src), "local json = require(script.json)\n");
    }

    #[test]
    fn statement_and_expression_positions() {
        let src = "package main\n\nfunc f() {\n\ttransform.Mod[any](\"print(1)\")\n\tx := transform.Mod[int](\"game.Workspace\")\n\tprint(x)\n}\n";
        assert_eq!(
            body(src),
            "function f()\n\tprint(1)\n\tlocal x = game.Workspace\n\tprint(x)\nend\n"
        );
    }

    #[test]
    fn named_binding_keeps_name() {
        let src = "package main\n\nvar Players = transform.Mod[any](\"game:GetService(\\\"Players\\\")\")\n";
        assert_eq!(body(src), "Players = game:GetService(\"Players\")\n");
    }

    #[test]
    fn require_imports_package() {
        let src = "package main\n\nvar _ = transform.Require(\"github.com/x/y\")\n";
        assert_eq!(body(src), "local _ = GO.import(\"github.com/x/y\")\n");
    }

    #[test]
    fn wrong_arguments_are_rejected() {
        for call in [
            "transform.Mod[any]()",
            "transform.Mod[any](\"a\", \"b\")",
            "transform.Mod[any](name)",
        ] {
            let src = format!("package main\n\nfunc f(name string) {{\n\t{call}\n}}\n");
            match lower_source("main.go", &src) {
                Err(TranslateError::Unsupported { construct, .. }) => assert_eq!(construct, "raw escape", "{call}"),
                other => panic!("{call}: expected unsupported, got {other:?}"),
            }
        }
    }

    #[test]
    fn logger_package() {
        let src = r#"package logger

import "github.com/intervinn/abq/transform"

var _ = transform.Mod[any]("local logger = require(\"logger\")")

type Logger struct{}

func NewLogger() *Logger {
	return transform.Mod[*Logger]("logger.new()")
}

func (l *Logger) Log(msg string) {
	_ = transform.Mod[any]("logger.msg(l, msg)")
}
"#;
        insta::assert_snapshot!(translate("logger.go", src).unwrap(), @r#"
        local logger = require("logger")
        local Logger = {}
        function NewLogger()
        	return logger.new()
        end
        function Logger.Log(l, msg)
        	logger.msg(l, msg)
        end
        Logger.__index = Logger
        return {
        	Logger = Logger,
        	NewLogger = NewLogger
        }
        "#);
    }

    #[test]
    fn call_argument_and_return_positions() {
        let src = "package main\n\nfunc f() any {\n\tprint(transform.Mod[any](\"game.Players\"))\n\treturn transform.Mod[any](\"workspace\")\n}\n";
        assert_eq!(
            body(src),
            "function f()\n\tprint(game.Players)\n\treturn workspace\nend\n"
        );
    }

    #[test]
    fn blank_assignment_in_body_is_raw() {
        let src = "package main\n\nfunc f() {\n\t_ = transform.Mod[any](\"warn(1)\")\n\t_ = g()\n}\n";
        assert_eq!(body(src), "function f()\n\twarn(1)\n\tlocal _ = g()\nend\n");
    }

    #[test]
    fn shadowed_escape_package_is_ordinary() {
        let src = "package main\n\nfunc f(transform T) {\n\ttransform.Mod(\"x\")\n}\n";
        assert_eq!(body(src), "function f(transform)\n\ttransform.Mod(transform, \"x\")\nend\n");
    }
}

mod control_flow {
    use super::*;

    fn func_body(src: &str) -> Vec<Stmt> {
        let decls = lower_source("main.go", src).unwrap();
        match decls.into_iter().find(|d| matches!(d, Stmt::Func(_))) {
            Some(Stmt::Func(f)) => f.body.body,
            _ => panic!("no function"),
        }
    }

    #[test]
    fn else_if_chain_renders_flat() {
        let src = "package main\n\nfunc grade(x int) string {\n\tif x > 90 {\n\t\treturn \"A\"\n\t} else if x > 80 {\n\t\treturn \"B\"\n\t} else if x > 70 {\n\t\treturn \"C\"\n\t} else if x > 60 {\n\t\treturn \"D\"\n\t} else {\n\t\treturn \"F\"\n\t}\n}\n";
        let out = body(src);
        assert_eq!(out.matches("elseif").count(), 3);
        assert_eq!(out.lines().filter(|l| *l == "\tend").count(), 1);
        assert_eq!(out.lines().filter(|l| l.trim() == "else").count(), 1);
    }

    #[test]
    fn range_bindings() {
        let stmts = func_body("package main\n\nfunc f(xs []int) {\n\tfor k, v := range xs {\n\t\tprint(k, v)\n\t}\n}\n");
        let Stmt::GenericFor(loop_) = &stmts[0] else {
            panic!("expected generic for, got {:?}", stmts[0]);
        };
        assert_eq!(loop_.bindings[0].name, "k");
        assert_eq!(loop_.bindings[1].name, "v");

        let stmts = func_body("package main\n\nfunc f(xs []int) {\n\tfor _, v := range xs {\n\t\tprint(v)\n\t}\n}\n");
        let Stmt::GenericFor(loop_) = &stmts[0] else {
            panic!("expected generic for");
        };
        assert_eq!(loop_.bindings[0].name, "_");
        assert_eq!(loop_.bindings[1].name, "v");

        let stmts = func_body("package main\n\nfunc f(xs []int) {\n\tfor i := range xs {\n\t\tprint(i)\n\t}\n}\n");
        let Stmt::GenericFor(loop_) = &stmts[0] else {
            panic!("expected generic for");
        };
        assert_eq!(loop_.bindings[0].name, "i");
        assert!(loop_.bindings[1].is_blank());
    }

    #[test]
    fn infinite_loop() {
        let src = "package main\n\nfunc f() {\n\tfor {\n\t\tbreak\n\t}\n}\n";
        assert_eq!(body(src), "function f()\n\twhile true do\n\t\tbreak\n\tend\nend\n");
    }

    #[test]
    fn condition_loop() {
        let src = "package main\n\nfunc f(x int) {\n\tfor x < 10 {\n\t\tx++\n\t}\n}\n";
        assert_eq!(body(src), "function f(x)\n\twhile x < 10 do\n\t\tx += 1\n\tend\nend\n");
    }

    #[test]
    fn counter_loop_is_numeric() {
        let src = "package main\n\nfunc f() {\n\tfor i := 0; i < 10; i++ {\n\t\tprint(i)\n\t}\n}\n";
        assert_eq!(body(src), "function f()\n\tfor i = 0, 9 do\n\t\tprint(i)\n\tend\nend\n");
    }

    #[test]
    fn descending_counter_with_step() {
        let src = "package main\n\nfunc f(n int) {\n\tfor i := n; i >= 0; i -= 2 {\n\t\tprint(i)\n\t}\n}\n";
        assert_eq!(body(src), "function f(n)\n\tfor i = n, 0, -2 do\n\t\tprint(i)\n\tend\nend\n");
    }

    #[test]
    fn symbolic_bound_is_adjusted() {
        let src = "package main\n\nfunc f(xs []int) {\n\tfor i := 0; i < len(xs); i++ {\n\t\tprint(xs[i])\n\t}\n}\n";
        assert!(body(src).contains("\tfor i = 0, #xs - 1 do\n"));
    }

    #[test]
    fn irregular_loop_falls_back_to_while() {
        let src = "package main\n\nfunc f(n int) {\n\tfor i := 1; i < n; i *= 2 {\n\t\tif i == 4 {\n\t\t\tcontinue\n\t\t}\n\t\tprint(i)\n\t}\n}\n";
        insta::assert_snapshot!(body(src), @r#"
        function f(n)
        	do
        		local i = 1
        		while i < n do
        			if i == 4 then
        				i *= 2
        				continue
        			end
        			print(i)
        			i *= 2
        		end
        	end
        end
        "#);
    }

    #[test]
    fn counter_assigned_in_body_falls_back() {
        let src = "package main\n\nfunc f() {\n\tfor i := 0; i < 10; i++ {\n\t\ti = 5\n\t}\n}\n";
        let out = body(src);
        assert!(out.contains("while i < 10 do"), "{out}");
    }

    #[test]
    fn if_with_initializer() {
        let src = "package main\n\nfunc f() {\n\tif v := get(); v > 0 {\n\t\tprint(v)\n\t}\n}\n";
        assert_eq!(
            body(src),
            "function f()\n\tdo\n\t\tlocal v = get()\n\t\tif v > 0 then\n\t\t\tprint(v)\n\t\tend\n\tend\nend\n"
        );
    }

    #[test]
    fn switch_becomes_if_chain() {
        let src = "package main\n\nfunc f(x int) {\n\tswitch x {\n\tcase 1, 2:\n\t\tprint(\"small\")\n\tcase 3:\n\t\tprint(\"three\")\n\tdefault:\n\t\tprint(\"other\")\n\t}\n}\n";
        insta::assert_snapshot!(body(src), @r#"
        function f(x)
        	if x == 1 or x == 2 then
        		print("small")
        	elseif x == 3 then
        		print("three")
        	else
        		print("other")
        	end
        end
        "#);
    }

    #[test]
    fn switch_tag_is_evaluated_once() {
        let src = "package main\n\nfunc f() {\n\tswitch next() {\n\tcase 1:\n\t\tprint(1)\n\t}\n}\n";
        assert_eq!(
            body(src),
            "function f()\n\tdo\n\t\tlocal __switch1 = next()\n\t\tif __switch1 == 1 then\n\t\t\tprint(1)\n\t\tend\n\tend\nend\n"
        );
    }

    #[test]
    fn break_in_switch_is_rejected() {
        let (construct, _) = unsupported("package main\n\nfunc f(x int) {\n\tswitch x {\n\tcase 1:\n\t\tbreak\n\t}\n}\n");
        assert_eq!(construct, "break");
    }

    #[test]
    fn unsupported_statements() {
        for (stmt, detail) in [
            ("go work()", "goroutines"),
            ("defer work()", "defer"),
        ] {
            let src = format!("package main\n\nfunc f() {{\n\t{stmt}\n}}\n");
            match lower_source("main.go", &src) {
                Err(TranslateError::Unsupported { detail: d, position, .. }) => {
                    assert_eq!(d, detail);
                    assert_eq!(position.line, 4);
                    assert_eq!(position.column, 2);
                }
                other => panic!("{stmt}: expected unsupported, got {other:?}"),
            }
        }
    }

    #[test]
    fn nested_block_is_do() {
        let src = "package main\n\nfunc f() {\n\t{\n\t\tx := 1\n\t\tprint(x)\n\t}\n}\n";
        assert_eq!(
            body(src),
            "function f()\n\tdo\n\t\tlocal x = 1\n\t\tprint(x)\n\tend\nend\n"
        );
    }

    #[test]
    fn empty_body_chunk() {
        let stmts = func_body("package main\n\nfunc f() {}\n");
        assert_eq!(stmts, Chunk::default().body);
    }

    #[test]
    fn bound_mutated_in_body_falls_back() {
        let src = "package main\n\nfunc drain(q []int) {\n\tfor i := 0; i < len(q); i++ {\n\t\tq = append(q, i)\n\t}\n}\n";
        let out = body(src);
        assert!(out.contains("\t\twhile i < #q do\n"), "{out}");
        assert!(!out.contains("for i ="), "{out}");
    }

    #[test]
    fn call_in_bound_falls_back() {
        let src = "package main\n\nfunc f() {\n\tfor i := 0; i < next(); i++ {\n\t\tprint(i)\n\t}\n}\n";
        assert!(body(src).contains("while i < next() do"));
    }

    #[test]
    fn trailing_continue_runs_post_once() {
        let src = "package main\n\nfunc f(n int) {\n\tfor i := 1; i < n; i *= 2 {\n\t\tprint(i)\n\t\tcontinue\n\t}\n}\n";
        insta::assert_snapshot!(body(src), @r"
        function f(n)
        	do
        		local i = 1
        		while i < n do
        			print(i)
        			i *= 2
        			continue
        		end
        	end
        end
        ");
    }
}

#[test]
fn parse_errors_are_fatal() {
    match lower_source("bad.go", "package main\n\nfunc {\n") {
        Err(TranslateError::Parse { position, .. }) => assert_eq!(position.file, "bad.go"),
        other => panic!("expected parse error, got {other:?}"),
    }
}
