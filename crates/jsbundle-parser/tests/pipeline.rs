//! End-to-end tests for the compiler core.
//!
//! These tests verify:
//! - Module rewriting of every import/export form
//! - Parser/printer round trips and the print fixed point
//! - Lexeme offsets covering the source exactly
//! - Error rendering through `load_file`

use jsbundle_parser::{lex, load_file, parse, print, rewrite, BinaryOp, ExprKind, StmtKind};

const WRAP_PREFIX: &str = "moduleFns.a_js=function(){var module={exports:{},es6:{},hasES6Exports:";

fn compile(source: &str) -> (String, Vec<String>) {
    let module = load_file(source.as_bytes(), "a.js").expect("source should compile");
    (String::from_utf8(module.code).unwrap(), module.imports)
}

fn wrapped(has_exports: bool, body: &str) -> String {
    format!("{WRAP_PREFIX}{has_exports}}};{body}return module;}};")
}

fn roundtrip(source: &str) -> String {
    let program = parse(&lex(source)).expect("source should parse");
    print(&program)
}

// =============================================================================
// Module rewriting
// =============================================================================

#[test]
fn test_scenario_default_import() {
    let (code, imports) = compile("import foo from './bar';");
    assert_eq!(
        code,
        wrapped(false, "var foo=requireES6(modules.bar_js,'default');")
    );
    assert_eq!(imports, vec!["bar.js"]);
}

#[test]
fn test_scenario_default_and_named_import() {
    let (code, _) = compile("import foo, {bar as baz} from './bar';");
    assert_eq!(
        code,
        wrapped(
            false,
            "var foo=requireES6(modules.bar_js,'default'),baz=requireES6(modules.bar_js,'bar');"
        )
    );
}

#[test]
fn test_scenario_namespace_import() {
    let (code, _) = compile("import * as b from './foo';");
    assert_eq!(code, wrapped(false, "var b=requireES6(modules.foo_js,'*');"));
}

#[test]
fn test_scenario_side_effect_import() {
    let (code, imports) = compile("import './foo';");
    assert_eq!(code, wrapped(false, ""));
    assert_eq!(imports, vec!["foo.js"]);
}

#[test]
fn test_scenario_export_default() {
    let (code, _) = compile("export default foo;");
    assert_eq!(code, wrapped(true, "module.es6.default=foo;"));
}

#[test]
fn test_scenario_export_var() {
    let (code, _) = compile("export var foo=3, bar;");
    assert_eq!(
        code,
        wrapped(true, "var foo=3,bar;module.es6.foo=foo,module.es6.bar=bar;")
    );
}

#[test]
fn test_scenario_export_all() {
    let (code, imports) = compile("export * from './bar';");
    assert_eq!(
        code,
        wrapped(
            true,
            "Object.assign(module.es6,requireES6(modules.bar_js,'*'));"
        )
    );
    assert_eq!(imports, vec!["bar.js"]);
}

#[test]
fn test_scenario_require() {
    let (code, imports) = compile("var a = require('./foo');");
    assert_eq!(code, wrapped(false, "var a=require(modules.foo_js);"));
    assert_eq!(imports, vec!["foo.js"]);
}

#[test]
fn test_scenario_regexp_at_operand_position() {
    let (code, _) = compile("a + b / /[A-Z]/g;");
    assert_eq!(code, wrapped(false, "a+b//[A-Z]/g;"));
}

#[test]
fn test_scenario_for_in_const() {
    let (code, _) = compile("for(const foo in bar){foo=3;}");
    assert_eq!(code, wrapped(false, "for(const foo in bar){foo=3;}"));
}

#[test]
fn test_has_exports_only_with_export() {
    for (source, expected) in [
        ("var x = 1;", false),
        ("module.exports = 1;", false),
        ("import x from './y';", false),
        ("export {};", true),
        ("export function f(){}", true),
        ("if (a) { b(); }\nexport const c = 1;", true),
    ] {
        let (code, _) = compile(source);
        let flag = format!("hasES6Exports:{expected}}}");
        assert!(code.contains(&flag), "{source}: {code}");
    }
}

#[test]
fn test_every_import_is_referenced() {
    let source = "import a from './a1';\nimport * as b from 'pkg';\nexport { c } from '../c';\n\
                  const d = require('./d/e.json');\nexport * from './f';";
    let module = load_file(source.as_bytes(), "src/main.js").unwrap();
    let code = String::from_utf8(module.code).unwrap();
    assert_eq!(
        module.imports,
        vec![
            "src/a1.js",
            "node_modules/pkg/index.js",
            "c.js",
            "src/d/e.json",
            "src/f.js",
        ]
    );
    for import in &module.imports {
        let id = jsbundle_parser::create_var_name_from_path(import);
        assert!(
            code.contains(&format!("requireES6(modules.{id},"))
                || code.contains(&format!("require(modules.{id})")),
            "{import} not referenced in {code}"
        );
    }
}

#[test]
fn test_rewrite_preserves_commonjs_exports() {
    let (code, _) = compile("exports.x = 1; module.exports = { y: 2 };");
    assert_eq!(code, wrapped(false, "exports.x=1;module.exports={y:2};"));
}

#[test]
fn test_rewrite_is_deterministic() {
    let source = "import a from './x';\nexport default function main(){ return a; }";
    assert_eq!(compile(source), compile(source));

    let program = parse(&lex(source)).unwrap();
    let (first, _) = rewrite(program.clone(), "a.js");
    let (second, _) = rewrite(program, "a.js");
    assert_eq!(first, second);
}

// =============================================================================
// Parser and printer
// =============================================================================

#[test]
fn test_parser_only_round_trips() {
    for source in [
        "function* f(){yield bar;}",
        "async function f(){await bar;}",
        "foo`bar`;",
        "class C{get [k](){}}",
        "var {a:b={c:f=5,d:e}=3}=foo;",
        "foo?bar:baz;",
        "try{}catch(e){}finally{}",
    ] {
        assert_eq!(roundtrip(source), source);
    }
}

#[test]
fn test_minified_round_trips() {
    for source in [
        "a>>>=b;",
        "0o12345;",
        "of=foo;",
        "a=0e321;",
        "typeof foo;delete foo.bar;void foo;",
        "a={a,...foo,...{bar}=3};",
        "a={32:foo,'bar':bar};",
        "a={get:function(){},set(){}};",
        "new a.b().c;",
        "foo[a].b().c;",
        "function foo(...{}){}",
        "{foo;bar=321;;}",
        "for(;;);",
        "for(i;i<23;){}",
        "for(foo of bar())foo=3;",
        "'foo \\' + fsbds';",
        "while(foo,bar+=3)bar();",
        "var {foo,...bar}=doo;",
        "[{foo:bar=23}=23,foo]=a;",
        "({}=foo);",
        "switch(foo){default:buz;break;case bar:baz;}",
        "foo:bar;",
        "(a+foo())`bar`;",
        "throw foo,bar;",
        "a=class{};",
        "break foo;",
        "debugger;",
        "a=`x${b+`y${c}`}z`;",
        "x=/[/]\\//g.test(y);",
    ] {
        assert_eq!(roundtrip(source), source);
    }
}

#[test]
fn test_export_default_declaration_is_not_called() {
    let (code, _) = compile("export default function f(){}\n(g)();");
    assert_eq!(
        code,
        wrapped(true, "function f(){}module.es6.default=f;(g)();")
    );

    let (code, _) = compile("export default class{}\n[a].map(g);");
    assert_eq!(
        code,
        wrapped(true, "module.es6.default=class{};[a].map(g);")
    );
}

#[test]
fn test_async_package_import() {
    let (code, imports) = compile("import async from 'async';\nasync.map(xs, f);");
    assert_eq!(
        code,
        wrapped(
            false,
            "var async=requireES6(modules.node_modules_async_index_js,'default');async.map(xs,f);"
        )
    );
    assert_eq!(imports, vec!["node_modules/async/index.js"]);
}

#[test]
fn test_template_substitutions_round_trip() {
    for source in [
        "var s=`line\\n${`inner`}`;",
        "var s=`\\${literal} ${a}`;",
        "var s=`a\\$${b}`;",
        "z=`${/'/.test(q)}`;",
        "z=`${'}'+\"`\"}`;",
    ] {
        assert_eq!(roundtrip(source), source);
    }
}

#[test]
fn test_print_is_fixed_point() {
    let sources = [
        "const { a, b: [c, , d = 1] } = require('./x');\nlet y = a ? b : c, z = (1, 2);",
        "class A extends B { static x = 1; constructor(...args) { super(...args); } *gen() { yield* this.items; } }",
        "label: for (let i = 0, n = xs.length; i < n; i++) { if (!xs[i]) continue label; else break; }",
        "const f = async (a, {b}) => ({ a, [b]: await g(a) });",
        "do x++; while (x < 10)\nvar t = typeof x === 'undefined' ? void 0 : -(-x);",
        "a = b ? function(){} : () => {};\nnew Foo;\nnew (foo())();\n1..toString();",
        "try { throw new Error(`bad ${x}`); } catch { } finally { done(); }",
        "import React, { useState } from 'react';\nexport default class App extends React.Component {}",
    ];
    for source in sources {
        let once = roundtrip(source);
        let twice = roundtrip(&once);
        assert_eq!(once, twice, "not a fixed point for {source}");
    }
}

#[test]
fn test_precedence_shape() {
    let program = parse(&lex("a + b * c - d;")).unwrap();
    let StmtKind::Expr(expr) = &program.stmts[0].kind else {
        panic!("expected expression statement");
    };
    let ExprKind::Binary { op, left, .. } = &expr.kind else {
        panic!("expected binary expression");
    };
    assert_eq!(*op, BinaryOp::Sub);
    assert!(matches!(
        left.kind,
        ExprKind::Binary {
            op: BinaryOp::Add,
            ..
        }
    ));
}

#[test]
fn test_comments_and_whitespace_are_dropped() {
    assert_eq!(roundtrip("//foo"), "");
    assert_eq!(
        roundtrip("/** doc */\nfunction f ( a ) {\r\n  // body\r\n  return a ; }\n"),
        "function f(a){return a;}"
    );
}

// =============================================================================
// Lexer
// =============================================================================

#[test]
fn test_lexemes_cover_source() {
    let source = "import x from 'y';\nconst s = `a${b}`; // c\r\n/* d */ let é = 1e3 >>> 2;";
    let tokens = lex(source);
    let mut joined = String::new();
    for token in &tokens {
        let start = token.span.start as usize;
        assert_eq!(&source[start..start + token.text.len()], token.text);
        joined.push_str(token.text);
    }
    assert_eq!(joined, source);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_error_rendering() {
    let err = load_file(b"var a = 1;\nconsole.log(ReactDOM", "src/app.js").unwrap_err();
    let message = err.to_string();
    let lines: Vec<_> = message.lines().collect();
    assert_eq!(lines[0], "Error loading file src/app.js:");
    assert!(lines[1].starts_with("Unexpected token '' at 2:21"), "{message}");
    assert_eq!(lines[2], "   2 console.log(ReactDOM");
    assert_eq!(lines[3], format!("{}^", " ".repeat(25)));
}

#[test]
fn test_rejected_inputs() {
    for source in [
        "var = 2;",
        "with (a) {}",
        "123n;",
        "a +;",
        "return\n;(",
        "import { a from './x';",
    ] {
        assert!(
            load_file(source.as_bytes(), "a.js").is_err(),
            "{source} should be rejected"
        );
    }
}
