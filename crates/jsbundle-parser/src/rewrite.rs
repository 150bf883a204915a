//! ES module and CommonJS rewriting.
//!
//! Turns a parsed module into a factory registered on the bundle's
//! `moduleFns` table:
//!
//! ```js
//! moduleFns.src_a_js=function(){
//!     var module={exports:{},es6:{},hasES6Exports:true};
//!     ...
//!     return module;
//! };
//! ```
//!
//! `import` declarations become `requireES6(modules.<id>, '<name>')`
//! lookups, `export` declarations write to `module.es6`, and
//! `require('<path>')` calls are pointed at `modules.<id>`. Every module
//! path seen along the way is resolved and reported in source order.

use crate::ast::*;
use crate::span::Span;
use std::mem;

/// Rewrite `program`, loaded from `path`, into a module factory.
///
/// Returns the new program and the resolved path of every import and
/// `require` call, duplicates included.
pub fn rewrite(program: Program, path: &str) -> (Program, Vec<String>) {
    let mut rewriter = Rewriter::new(path);
    let body = rewriter.rewrite_stmts(program.stmts);
    let wrapped = wrap_module(path, body, rewriter.has_exports);
    (Program::new(vec![wrapped]), rewriter.imports)
}

/// Module id for a resolved path: `/`, `.` and `-` all become `_`.
///
/// Distinct paths can collide (`a.b/c` and `a_b/c`); callers that mix
/// many modules must check for duplicates.
pub fn create_var_name_from_path(path: &str) -> String {
    path.chars()
        .map(|c| match c {
            '/' | '.' | '-' => '_',
            c => c,
        })
        .collect()
}

/// Resolve an import specifier relative to the importing file.
///
/// Relative specifiers (`./x`, `../x`) are folded against the directory
/// of `from_path`. Anything else lives under `node_modules`, and a bare
/// package name resolves to its `index.js`. A final segment without a
/// `.` gets a `.js` extension. Purely lexical; the filesystem is never
/// consulted, and `..` past the root is dropped.
pub fn resolve_import_path(specifier: &str, from_path: &str) -> String {
    let specifier = specifier.trim_matches(|c| c == '\'' || c == '"');
    let mut segments: Vec<&str> = specifier.split('/').collect();

    let relative = matches!(segments.first(), Some(&".") | Some(&".."));
    let mut resolved: Vec<&str> = if relative {
        let mut dir: Vec<&str> = from_path.split('/').collect();
        dir.pop();
        dir
    } else {
        if segments.len() == 1 {
            segments.push("index.js");
        }
        vec!["node_modules"]
    };

    for segment in segments {
        match segment {
            ".." => {
                resolved.pop();
            }
            "." => {}
            segment => resolved.push(segment),
        }
    }

    let mut joined = resolved.join("/");
    if !resolved.last().is_some_and(|last| last.contains('.')) {
        joined.push_str(".js");
    }
    joined
}

// =============================================================================
// Traversal
// =============================================================================

struct Rewriter<'p> {
    /// Path of the module being rewritten.
    path: &'p str,
    imports: Vec<String>,
    has_exports: bool,
}

impl<'p> Rewriter<'p> {
    fn new(path: &'p str) -> Self {
        Self {
            path,
            imports: Vec::new(),
            has_exports: false,
        }
    }

    /// Resolve and record a module path literal, returning its module id.
    fn record_import(&mut self, raw: &str) -> String {
        let resolved = resolve_import_path(unquote(raw), self.path);
        let id = create_var_name_from_path(&resolved);
        self.imports.push(resolved);
        id
    }

    fn rewrite_stmts(&mut self, stmts: Vec<Stmt>) -> Vec<Stmt> {
        let mut out = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            self.rewrite_stmt(stmt, &mut out);
        }
        out
    }

    /// Rewrite one statement, pushing its replacement(s) onto `out`.
    fn rewrite_stmt(&mut self, mut stmt: Stmt, out: &mut Vec<Stmt>) {
        match stmt.kind {
            StmtKind::Import(decl) => self.rewrite_import(*decl, out),
            StmtKind::Export(decl) => {
                self.has_exports = true;
                self.rewrite_export(*decl, out);
            }
            _ => {
                self.visit_stmt(&mut stmt);
                out.push(stmt);
            }
        }
    }

    /// Rewrite a statement in a position that holds exactly one.
    fn rewrite_single(&mut self, stmt: &mut Stmt) {
        let span = stmt.span;
        let taken = mem::replace(stmt, Stmt::synthetic(StmtKind::Empty));
        let mut out = Vec::new();
        self.rewrite_stmt(taken, &mut out);
        *stmt = match out.len() {
            0 => Stmt::new(StmtKind::Empty, span),
            1 => out.remove(0),
            _ => Stmt::new(StmtKind::Block(out), span),
        };
    }

    fn visit_block(&mut self, stmts: &mut Vec<Stmt>) {
        *stmts = self.rewrite_stmts(mem::take(stmts));
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Var { decls, .. } => self.visit_declarators(decls),
            StmtKind::Function(func) => self.visit_function(func),
            StmtKind::Class(class) => self.visit_class(class),
            StmtKind::Block(stmts) => self.visit_block(stmts),
            StmtKind::If {
                test,
                consequent,
                alternate,
            } => {
                self.visit_expr(test);
                self.rewrite_single(consequent);
                if let Some(alt) = alternate {
                    self.rewrite_single(alt);
                }
            }
            StmtKind::Switch {
                discriminant,
                cases,
            } => {
                self.visit_expr(discriminant);
                for case in cases {
                    if let Some(test) = &mut case.test {
                        self.visit_expr(test);
                    }
                    self.visit_block(&mut case.consequent);
                }
            }
            StmtKind::For {
                init,
                test,
                update,
                body,
            } => {
                if let Some(init) = init {
                    self.visit_for_init(init);
                }
                if let Some(test) = test {
                    self.visit_expr(test);
                }
                if let Some(update) = update {
                    self.visit_expr(update);
                }
                self.rewrite_single(body);
            }
            StmtKind::ForIn { left, right, body } | StmtKind::ForOf { left, right, body } => {
                self.visit_for_init(left);
                self.visit_expr(right);
                self.rewrite_single(body);
            }
            StmtKind::While { test, body } | StmtKind::DoWhile { body, test } => {
                self.visit_expr(test);
                self.rewrite_single(body);
            }
            StmtKind::Return { arg } => {
                if let Some(arg) = arg {
                    self.visit_expr(arg);
                }
            }
            StmtKind::Throw { arg } | StmtKind::Expr(arg) => self.visit_expr(arg),
            StmtKind::Try {
                block,
                handler,
                finalizer,
            } => {
                self.visit_block(block);
                if let Some(handler) = handler {
                    if let Some(param) = &mut handler.param {
                        self.visit_binding(param);
                    }
                    self.visit_block(&mut handler.body);
                }
                if let Some(finalizer) = finalizer {
                    self.visit_block(finalizer);
                }
            }
            StmtKind::Labeled { body, .. } => self.rewrite_single(body),
            // Only reachable through rewrite_single, which handles them
            StmtKind::Import(_) | StmtKind::Export(_) => {}
            StmtKind::Break { .. }
            | StmtKind::Continue { .. }
            | StmtKind::Empty
            | StmtKind::Debugger => {}
        }
    }

    fn visit_declarators(&mut self, decls: &mut [VarDeclarator]) {
        for decl in decls {
            self.visit_binding(&mut decl.binding);
            if let Some(init) = &mut decl.init {
                self.visit_expr(init);
            }
        }
    }

    fn visit_for_init(&mut self, init: &mut ForInit) {
        match init {
            ForInit::Var { decls, .. } => self.visit_declarators(decls),
            ForInit::Expr(expr) => self.visit_expr(expr),
            ForInit::Pattern(binding) => self.visit_binding(binding),
        }
    }

    fn visit_binding(&mut self, binding: &mut Binding) {
        match &mut binding.kind {
            BindingKind::Ident { .. } => {}
            BindingKind::Array { elements } => {
                for elem in elements.iter_mut().flatten() {
                    self.visit_binding(&mut elem.binding);
                    if let Some(default) = &mut elem.default {
                        self.visit_expr(default);
                    }
                }
            }
            BindingKind::Object { properties } => {
                for prop in properties {
                    self.visit_property_key(&mut prop.key);
                    self.visit_binding(&mut prop.value);
                    if let Some(default) = &mut prop.default {
                        self.visit_expr(default);
                    }
                }
            }
        }
    }

    fn visit_params(&mut self, params: &mut [Param]) {
        for param in params {
            self.visit_binding(&mut param.binding);
            if let Some(default) = &mut param.default {
                self.visit_expr(default);
            }
        }
    }

    fn visit_function(&mut self, func: &mut Function) {
        self.visit_params(&mut func.params);
        self.visit_block(&mut func.body);
    }

    fn visit_class(&mut self, class: &mut Class) {
        if let Some(super_class) = &mut class.super_class {
            self.visit_expr(super_class);
        }
        for member in &mut class.body {
            match &mut member.kind {
                ClassMemberKind::Method { key, value, .. } => {
                    self.visit_property_key(key);
                    self.visit_function(value);
                }
                ClassMemberKind::Property { key, value, .. } => {
                    self.visit_property_key(key);
                    if let Some(value) = value {
                        self.visit_expr(value);
                    }
                }
            }
        }
    }

    fn visit_property_key(&mut self, key: &mut PropertyKey) {
        if let PropertyKey::Computed(expr) = key {
            self.visit_expr(expr);
        }
    }

    fn visit_expr(&mut self, expr: &mut Expr) {
        match &mut expr.kind {
            ExprKind::Null
            | ExprKind::Bool(_)
            | ExprKind::Number(_)
            | ExprKind::String(_)
            | ExprKind::Regex { .. }
            | ExprKind::Template(_)
            | ExprKind::Ident(_)
            | ExprKind::This
            | ExprKind::Super => {}
            ExprKind::Array(elements) => {
                for elem in elements.iter_mut().flatten() {
                    self.visit_expr(elem);
                }
            }
            ExprKind::Object(props) => {
                for prop in props {
                    match prop {
                        Property::KeyValue { key, value } => {
                            self.visit_property_key(key);
                            self.visit_expr(value);
                        }
                        Property::Shorthand(_) => {}
                        Property::Method { key, value, .. } => {
                            self.visit_property_key(key);
                            self.visit_function(value);
                        }
                        Property::Spread(expr) => self.visit_expr(expr),
                    }
                }
            }
            ExprKind::Function(func) => self.visit_function(func),
            ExprKind::Arrow(arrow) => {
                self.visit_params(&mut arrow.params);
                match &mut arrow.body {
                    ArrowBody::Expr(body) => self.visit_expr(body),
                    ArrowBody::Block(stmts) => self.visit_block(stmts),
                }
            }
            ExprKind::Class(class) => self.visit_class(class),
            ExprKind::Unary { arg, .. }
            | ExprKind::Update { arg, .. }
            | ExprKind::Paren(arg)
            | ExprKind::Spread(arg)
            | ExprKind::Await(arg) => self.visit_expr(arg),
            ExprKind::Binary { left, right, .. } => {
                self.visit_expr(left);
                self.visit_expr(right);
            }
            ExprKind::Assign { left, right, .. } => {
                match left.as_mut() {
                    AssignTarget::Pattern(binding) => self.visit_binding(binding),
                    AssignTarget::Expr(target) => self.visit_expr(target),
                }
                self.visit_expr(right);
            }
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.visit_expr(test);
                self.visit_expr(consequent);
                self.visit_expr(alternate);
            }
            ExprKind::Sequence(exprs) => {
                for e in exprs {
                    self.visit_expr(e);
                }
            }
            ExprKind::Member {
                object,
                property,
                computed,
            } => {
                self.visit_expr(object);
                if *computed {
                    self.visit_expr(property);
                }
            }
            ExprKind::Call { callee, args } => {
                let is_require = matches!(&callee.kind, ExprKind::Ident(name) if name == "require");
                if is_require {
                    if let Some(first) = args.first_mut() {
                        if let ExprKind::String(raw) = &first.kind {
                            let id = self.record_import(raw);
                            *first = modules_member(&id);
                        }
                    }
                }
                self.visit_expr(callee);
                for arg in args {
                    self.visit_expr(arg);
                }
            }
            ExprKind::New { callee, args } => {
                self.visit_expr(callee);
                for arg in args.iter_mut().flatten() {
                    self.visit_expr(arg);
                }
            }
            ExprKind::TaggedTemplate { tag, .. } => self.visit_expr(tag),
            ExprKind::Yield { arg, .. } => {
                if let Some(arg) = arg {
                    self.visit_expr(arg);
                }
            }
        }
    }

    // =========================================================================
    // Imports and Exports
    // =========================================================================

    fn rewrite_import(&mut self, decl: ImportDecl, out: &mut Vec<Stmt>) {
        let id = self.record_import(&decl.source);

        let mut namespace = Vec::new();
        let mut named = Vec::new();
        for spec in decl.specifiers {
            match spec {
                ImportSpecifier::Namespace { local, span } => {
                    namespace.push(declarator(local, require_es6(&id, "*"), span));
                }
                ImportSpecifier::Default { local, span } => {
                    named.push(declarator(local, require_es6(&id, "default"), span));
                }
                ImportSpecifier::Named {
                    imported,
                    local,
                    span,
                } => {
                    named.push(declarator(local, require_es6(&id, &imported), span));
                }
            }
        }
        namespace.append(&mut named);

        if !namespace.is_empty() {
            out.push(Stmt::new(
                StmtKind::Var {
                    kind: VarKind::Var,
                    decls: namespace,
                },
                decl.span,
            ));
        }
    }

    fn rewrite_export(&mut self, decl: ExportDecl, out: &mut Vec<Stmt>) {
        match decl {
            ExportDecl::Named {
                specifiers,
                source,
                span,
            } => {
                let id = source.map(|source| self.record_import(&source));
                let assigns = specifiers
                    .into_iter()
                    .map(|spec| {
                        let value = match &id {
                            Some(id) => require_es6(id, &spec.local),
                            None => ident(&spec.local),
                        };
                        assign(es6_member(&spec.exported), value)
                    })
                    .collect();
                if let Some(stmt) = sequence_stmt(assigns, span) {
                    out.push(stmt);
                }
            }
            ExportDecl::All { source, span } => {
                let id = self.record_import(&source);
                let call = call(
                    member(ident("Object"), "assign"),
                    vec![module_es6(), require_es6(&id, "*")],
                );
                out.push(Stmt::new(StmtKind::Expr(call), span));
            }
            ExportDecl::Decl { mut decl, span } => {
                self.visit_stmt(&mut decl);
                let mut names = Vec::new();
                match &decl.kind {
                    StmtKind::Var { decls, .. } => {
                        for d in decls {
                            d.binding.bound_names(&mut names);
                        }
                    }
                    StmtKind::Function(func) => names.extend(func.name.clone()),
                    StmtKind::Class(class) => names.extend(class.name.clone()),
                    _ => {}
                }
                out.push(decl);
                let assigns = names
                    .iter()
                    .map(|name| assign(es6_member(name), ident(name)))
                    .collect();
                if let Some(stmt) = sequence_stmt(assigns, span) {
                    out.push(stmt);
                }
            }
            ExportDecl::Default { mut expr, span } => {
                self.visit_expr(&mut expr);
                let value = match expr.kind {
                    ExprKind::Function(func) if func.name.is_some() => {
                        let name = func.name.clone().unwrap_or_default();
                        out.push(Stmt::new(StmtKind::Function(func), expr.span));
                        ident(&name)
                    }
                    ExprKind::Class(class) if class.name.is_some() => {
                        let name = class.name.clone().unwrap_or_default();
                        out.push(Stmt::new(StmtKind::Class(class), expr.span));
                        ident(&name)
                    }
                    kind => Expr::new(kind, expr.span),
                };
                out.push(Stmt::new(
                    StmtKind::Expr(assign(es6_member("default"), value)),
                    span,
                ));
            }
        }
    }
}

// =============================================================================
// Node Builders
// =============================================================================

fn ident(name: &str) -> Expr {
    Expr::synthetic(ExprKind::Ident(name.to_string()))
}

fn member(object: Expr, property: &str) -> Expr {
    Expr::synthetic(ExprKind::Member {
        object: Box::new(object),
        property: Box::new(ident(property)),
        computed: false,
    })
}

fn call(callee: Expr, args: Vec<Expr>) -> Expr {
    Expr::synthetic(ExprKind::Call {
        callee: Box::new(callee),
        args,
    })
}

fn assign(target: Expr, value: Expr) -> Expr {
    Expr::synthetic(ExprKind::Assign {
        op: AssignOp::Assign,
        left: Box::new(AssignTarget::Expr(target)),
        right: Box::new(value),
    })
}

fn string_literal(value: &str) -> Expr {
    Expr::synthetic(ExprKind::String(format!("'{value}'")))
}

/// `modules.<id>`
fn modules_member(id: &str) -> Expr {
    member(ident("modules"), id)
}

/// `module.es6`
fn module_es6() -> Expr {
    member(ident("module"), "es6")
}

/// `module.es6.<name>`
fn es6_member(name: &str) -> Expr {
    member(module_es6(), name)
}

/// `requireES6(modules.<id>,'<name>')`
fn require_es6(id: &str, name: &str) -> Expr {
    call(
        ident("requireES6"),
        vec![modules_member(id), string_literal(name)],
    )
}

fn declarator(name: String, init: Expr, span: Span) -> VarDeclarator {
    VarDeclarator {
        binding: Binding::new(BindingKind::Ident { name }, span),
        init: Some(init),
        span,
    }
}

/// One expression statement, or a comma sequence when there are several.
fn sequence_stmt(mut exprs: Vec<Expr>, span: Span) -> Option<Stmt> {
    let expr = match exprs.len() {
        0 => return None,
        1 => exprs.remove(0),
        _ => Expr::synthetic(ExprKind::Sequence(exprs)),
    };
    Some(Stmt::new(StmtKind::Expr(expr), span))
}

/// `moduleFns.<id>=function(){var module={...};<body>return module;};`
fn wrap_module(path: &str, body: Vec<Stmt>, has_exports: bool) -> Stmt {
    let empty_object = || Expr::synthetic(ExprKind::Object(Vec::new()));
    let record = Expr::synthetic(ExprKind::Object(vec![
        Property::KeyValue {
            key: PropertyKey::Ident("exports".into()),
            value: empty_object(),
        },
        Property::KeyValue {
            key: PropertyKey::Ident("es6".into()),
            value: empty_object(),
        },
        Property::KeyValue {
            key: PropertyKey::Ident("hasES6Exports".into()),
            value: Expr::synthetic(ExprKind::Bool(has_exports)),
        },
    ]));

    let mut stmts = Vec::with_capacity(body.len() + 2);
    stmts.push(Stmt::synthetic(StmtKind::Var {
        kind: VarKind::Var,
        decls: vec![declarator("module".into(), record, Span::default())],
    }));
    stmts.extend(body);
    stmts.push(Stmt::synthetic(StmtKind::Return {
        arg: Some(ident("module")),
    }));

    let factory = Expr::synthetic(ExprKind::Function(Box::new(Function {
        name: None,
        params: Vec::new(),
        body: stmts,
        is_async: false,
        is_generator: false,
        span: Span::default(),
    })));
    let target = member(ident("moduleFns"), &create_var_name_from_path(path));
    Stmt::synthetic(StmtKind::Expr(assign(target, factory)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::print;
    use crate::lexer::lex;
    use crate::parser::parse;

    const PREFIX: &str = "moduleFns.a_js=function(){var module={exports:{},es6:{},hasES6Exports:";
    const SUFFIX: &str = "return module;};";

    /// Rewrite `source` as `a.js`, returning the body between the module
    /// record and `return module;`.
    fn rewrite_body(source: &str) -> (bool, String, Vec<String>) {
        let program = parse(&lex(source)).unwrap();
        let (program, imports) = rewrite(program, "a.js");
        let out = print(&program);
        let rest = out.strip_prefix(PREFIX).unwrap();
        let (flag, rest) = rest.split_once("};").unwrap();
        let body = rest.strip_suffix(SUFFIX).unwrap();
        (flag == "true", body.to_string(), imports)
    }

    #[test]
    fn test_create_var_name_from_path() {
        assert_eq!(create_var_name_from_path("src/a-b.c.js"), "src_a_b_c_js");
        assert_eq!(create_var_name_from_path("a.js"), "a_js");
        // Known collision
        assert_eq!(
            create_var_name_from_path("a.b/c"),
            create_var_name_from_path("a_b/c")
        );
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(resolve_import_path("./bar", "a.js"), "bar.js");
        assert_eq!(resolve_import_path("'./bar'", "a.js"), "bar.js");
        assert_eq!(resolve_import_path("./b", "src/lib/a.js"), "src/lib/b.js");
        assert_eq!(resolve_import_path("../b.css", "src/lib/a.js"), "src/b.css");
        assert_eq!(resolve_import_path("../../x/y", "src/lib/a.js"), "x/y.js");
    }

    #[test]
    fn test_resolve_node_modules() {
        assert_eq!(
            resolve_import_path("react", "src/a.js"),
            "node_modules/react/index.js"
        );
        assert_eq!(
            resolve_import_path("lodash/fp", "src/a.js"),
            "node_modules/lodash/fp.js"
        );
    }

    #[test]
    fn test_resolve_past_root() {
        assert_eq!(resolve_import_path("../../x", "a.js"), "x.js");
    }

    #[test]
    fn test_default_import() {
        let (exports, body, imports) = rewrite_body("import foo from './bar';");
        assert!(!exports);
        assert_eq!(body, "var foo=requireES6(modules.bar_js,'default');");
        assert_eq!(imports, vec!["bar.js"]);
    }

    #[test]
    fn test_default_and_named_import() {
        let (_, body, _) = rewrite_body("import foo, {bar as baz} from './bar';");
        assert_eq!(
            body,
            "var foo=requireES6(modules.bar_js,'default'),baz=requireES6(modules.bar_js,'bar');"
        );
    }

    #[test]
    fn test_namespace_import_first() {
        let (_, body, _) = rewrite_body("import d, * as b from './foo';");
        assert_eq!(
            body,
            "var b=requireES6(modules.foo_js,'*'),d=requireES6(modules.foo_js,'default');"
        );
    }

    #[test]
    fn test_side_effect_import() {
        let (exports, body, imports) = rewrite_body("import './foo';");
        assert!(!exports);
        assert_eq!(body, "");
        assert_eq!(imports, vec!["foo.js"]);
    }

    #[test]
    fn test_export_default_expression() {
        let (exports, body, _) = rewrite_body("export default foo;");
        assert!(exports);
        assert_eq!(body, "module.es6.default=foo;");
    }

    #[test]
    fn test_export_default_named_function() {
        let (_, body, _) = rewrite_body("export default function foo(){}");
        assert_eq!(body, "function foo(){}module.es6.default=foo;");

        let (_, body, _) = rewrite_body("export default class{}");
        assert_eq!(body, "module.es6.default=class{};");
    }

    #[test]
    fn test_export_declarations() {
        let (_, body, _) = rewrite_body("export var foo=3, bar;");
        assert_eq!(body, "var foo=3,bar;module.es6.foo=foo,module.es6.bar=bar;");

        let (_, body, _) = rewrite_body("export const {a, b: [c]} = x;");
        assert_eq!(body, "const {a,b:[c]}=x;module.es6.a=a,module.es6.c=c;");

        let (_, body, _) = rewrite_body("export function f(){}");
        assert_eq!(body, "function f(){}module.es6.f=f;");
    }

    #[test]
    fn test_export_named() {
        let (exports, body, _) = rewrite_body("var a, b; export { a, b as c };");
        assert!(exports);
        assert_eq!(body, "var a,b;module.es6.a=a,module.es6.c=b;");

        let (exports, body, _) = rewrite_body("export {};");
        assert!(exports);
        assert_eq!(body, "");
    }

    #[test]
    fn test_reexports() {
        let (_, body, imports) = rewrite_body("export { a } from './p';");
        assert_eq!(body, "module.es6.a=requireES6(modules.p_js,'a');");
        assert_eq!(imports, vec!["p.js"]);

        let (_, body, _) = rewrite_body("export * from './bar';");
        assert_eq!(
            body,
            "Object.assign(module.es6,requireES6(modules.bar_js,'*'));"
        );
    }

    #[test]
    fn test_require_calls() {
        let (exports, body, imports) =
            rewrite_body("var a = require('./foo'); function f(){ return require('lib'); }");
        assert!(!exports);
        assert_eq!(
            body,
            "var a=require(modules.foo_js);function f(){return require(modules.node_modules_lib_index_js);}"
        );
        assert_eq!(imports, vec!["foo.js", "node_modules/lib/index.js"]);
    }

    #[test]
    fn test_require_with_non_literal_untouched() {
        let (_, body, imports) = rewrite_body("require(name);");
        assert_eq!(body, "require(name);");
        assert!(imports.is_empty());
    }

    #[test]
    fn test_duplicate_imports_reported_in_order() {
        let (_, _, imports) =
            rewrite_body("import a from './x'; import b from './y'; import c from './x';");
        assert_eq!(imports, vec!["x.js", "y.js", "x.js"]);
    }
}
