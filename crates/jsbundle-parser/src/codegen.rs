//! JavaScript code generator.
//!
//! Prints an AST as minified JavaScript: no indentation or line breaks,
//! and a space only where two tokens would otherwise merge (`var a`,
//! `a- -b`). Literals are printed exactly as they were written.

use crate::ast::*;

/// Print a program as minified JavaScript.
pub fn print(program: &Program) -> String {
    Codegen::new(program).generate()
}

// Precedence levels used to decide where parentheses are required.
const PREC_SEQUENCE: u8 = 1;
const PREC_ASSIGN: u8 = 3;
const PREC_CONDITIONAL: u8 = 4;
const PREC_UNARY: u8 = 16;
const PREC_POSTFIX: u8 = 17;
const PREC_CALL: u8 = 18;

/// The code generator.
pub struct Codegen<'a> {
    /// The AST to generate code from.
    program: &'a Program,
    /// Output buffer.
    output: String,
}

impl<'a> Codegen<'a> {
    /// Create a new code generator.
    pub fn new(program: &'a Program) -> Self {
        Self {
            program,
            output: String::new(),
        }
    }

    /// Generate JavaScript source code.
    pub fn generate(mut self) -> String {
        for stmt in &self.program.stmts {
            self.emit_stmt(stmt);
        }
        self.output
    }

    // =========================================================================
    // Output Helpers
    // =========================================================================

    /// Append `s`, separating it from the previous output when the two
    /// would otherwise lex as a single token.
    ///
    /// A `/` is never separated from a following regexp: `a+b/ /x/g` prints
    /// as `a+b//x/g`, the required minified form. That output reads back as
    /// a line comment, so printing is not a fixed point for this one shape.
    fn emit(&mut self, s: &str) {
        if let (Some(last), Some(first)) = (self.output.chars().last(), s.chars().next()) {
            let merges = (is_word_char(last) && is_word_char(first))
                || (last == '+' && first == '+')
                || (last == '-' && first == '-');
            if merges {
                self.output.push(' ');
            }
        }
        self.output.push_str(s);
    }

    fn emit_semicolon(&mut self) {
        self.output.push(';');
    }

    fn emit_list<T>(&mut self, items: &[T], mut f: impl FnMut(&mut Self, &T)) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.emit(",");
            }
            f(self, item);
        }
    }

    // =========================================================================
    // Statement Emission
    // =========================================================================

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Var { kind, decls } => {
                self.emit_var_decl(*kind, decls);
                self.emit_semicolon();
            }
            StmtKind::Function(func) => self.emit_function(func),
            StmtKind::Class(class) => self.emit_class(class),
            StmtKind::Block(stmts) => self.emit_block(stmts),
            StmtKind::If {
                test,
                consequent,
                alternate,
            } => {
                self.emit("if(");
                self.emit_expr(test);
                self.emit(")");
                self.emit_stmt(consequent);
                if let Some(alt) = alternate {
                    self.emit("else");
                    self.emit_stmt(alt);
                }
            }
            StmtKind::Switch {
                discriminant,
                cases,
            } => {
                self.emit("switch(");
                self.emit_expr(discriminant);
                self.emit("){");
                for case in cases {
                    match &case.test {
                        Some(test) => {
                            self.emit("case");
                            self.emit_expr(test);
                        }
                        None => self.emit("default"),
                    }
                    self.emit(":");
                    for stmt in &case.consequent {
                        self.emit_stmt(stmt);
                    }
                }
                self.emit("}");
            }
            StmtKind::For {
                init,
                test,
                update,
                body,
            } => {
                self.emit("for(");
                if let Some(init) = init {
                    self.emit_for_init(init);
                }
                self.emit(";");
                if let Some(test) = test {
                    self.emit_expr(test);
                }
                self.emit(";");
                if let Some(update) = update {
                    self.emit_expr(update);
                }
                self.emit(")");
                self.emit_stmt(body);
            }
            StmtKind::ForIn { left, right, body } => {
                self.emit("for(");
                self.emit_for_init(left);
                self.emit("in");
                self.emit_expr(right);
                self.emit(")");
                self.emit_stmt(body);
            }
            StmtKind::ForOf { left, right, body } => {
                self.emit("for(");
                self.emit_for_init(left);
                self.emit("of");
                self.emit_expr_prec(right, PREC_ASSIGN);
                self.emit(")");
                self.emit_stmt(body);
            }
            StmtKind::While { test, body } => {
                self.emit("while(");
                self.emit_expr(test);
                self.emit(")");
                self.emit_stmt(body);
            }
            StmtKind::DoWhile { body, test } => {
                self.emit("do");
                self.emit_stmt(body);
                self.emit("while(");
                self.emit_expr(test);
                self.emit(");");
            }
            StmtKind::Break { label } => {
                self.emit("break");
                if let Some(label) = label {
                    self.emit(label);
                }
                self.emit_semicolon();
            }
            StmtKind::Continue { label } => {
                self.emit("continue");
                if let Some(label) = label {
                    self.emit(label);
                }
                self.emit_semicolon();
            }
            StmtKind::Return { arg } => {
                self.emit("return");
                if let Some(arg) = arg {
                    self.emit_expr(arg);
                }
                self.emit_semicolon();
            }
            StmtKind::Throw { arg } => {
                self.emit("throw");
                self.emit_expr(arg);
                self.emit_semicolon();
            }
            StmtKind::Try {
                block,
                handler,
                finalizer,
            } => {
                self.emit("try");
                self.emit_block(block);
                if let Some(handler) = handler {
                    self.emit("catch");
                    if let Some(param) = &handler.param {
                        self.emit("(");
                        self.emit_binding(param);
                        self.emit(")");
                    }
                    self.emit_block(&handler.body);
                }
                if let Some(finalizer) = finalizer {
                    self.emit("finally");
                    self.emit_block(finalizer);
                }
            }
            StmtKind::Labeled { label, body } => {
                self.emit(label);
                self.emit(":");
                self.emit_stmt(body);
            }
            StmtKind::Expr(expr) => {
                self.emit_expr(expr);
                self.emit_semicolon();
            }
            StmtKind::Empty => self.emit_semicolon(),
            StmtKind::Debugger => {
                self.emit("debugger");
                self.emit_semicolon();
            }
            StmtKind::Import(decl) => self.emit_import(decl),
            StmtKind::Export(decl) => self.emit_export(decl),
        }
    }

    fn emit_block(&mut self, stmts: &[Stmt]) {
        self.emit("{");
        for stmt in stmts {
            self.emit_stmt(stmt);
        }
        self.emit("}");
    }

    fn emit_var_decl(&mut self, kind: VarKind, decls: &[VarDeclarator]) {
        self.emit(kind.as_str());
        self.output.push(' ');
        self.emit_list(decls, |this, decl| {
            this.emit_binding(&decl.binding);
            if let Some(init) = &decl.init {
                this.emit("=");
                this.emit_expr_prec(init, PREC_ASSIGN);
            }
        });
    }

    fn emit_for_init(&mut self, init: &ForInit) {
        match init {
            ForInit::Var { kind, decls } => self.emit_var_decl(*kind, decls),
            ForInit::Expr(expr) => self.emit_expr(expr),
            ForInit::Pattern(binding) => self.emit_binding(binding),
        }
    }

    // =========================================================================
    // Bindings
    // =========================================================================

    fn emit_binding(&mut self, binding: &Binding) {
        match &binding.kind {
            BindingKind::Ident { name } => self.emit(name),
            BindingKind::Array { elements } => {
                self.emit("[");
                self.emit_list(elements, |this, elem| {
                    if let Some(elem) = elem {
                        if elem.rest {
                            this.emit("...");
                        }
                        this.emit_binding(&elem.binding);
                        this.emit_default(elem.default.as_ref());
                    }
                });
                // A trailing hole needs its own comma
                if matches!(elements.last(), Some(None)) {
                    self.emit(",");
                }
                self.emit("]");
            }
            BindingKind::Object { properties } => {
                self.emit("{");
                self.emit_list(properties, |this, prop| {
                    if prop.rest {
                        this.emit("...");
                        this.emit_binding(&prop.value);
                    } else if prop.shorthand {
                        this.emit_binding(&prop.value);
                        this.emit_default(prop.default.as_ref());
                    } else {
                        this.emit_property_key(&prop.key);
                        this.emit(":");
                        this.emit_binding(&prop.value);
                        this.emit_default(prop.default.as_ref());
                    }
                });
                self.emit("}");
            }
        }
    }

    fn emit_default(&mut self, default: Option<&Expr>) {
        if let Some(default) = default {
            self.emit("=");
            self.emit_expr_prec(default, PREC_ASSIGN);
        }
    }

    // =========================================================================
    // Functions and Classes
    // =========================================================================

    fn emit_function(&mut self, func: &Function) {
        if func.is_async {
            self.emit("async");
        }
        self.emit("function");
        if func.is_generator {
            self.emit("*");
        }
        if let Some(name) = &func.name {
            if func.is_generator {
                self.output.push(' ');
            }
            self.emit(name);
        }
        self.emit_params(&func.params);
        self.emit_block(&func.body);
    }

    fn emit_arrow(&mut self, arrow: &ArrowFunction) {
        if arrow.is_async {
            self.emit("async");
        }
        self.emit_params(&arrow.params);
        self.emit("=>");
        match &arrow.body {
            ArrowBody::Expr(expr) => self.emit_expr_prec(expr, PREC_ASSIGN),
            ArrowBody::Block(stmts) => self.emit_block(stmts),
        }
    }

    fn emit_params(&mut self, params: &[Param]) {
        self.emit("(");
        self.emit_list(params, |this, param| {
            if param.rest {
                this.emit("...");
            }
            this.emit_binding(&param.binding);
            this.emit_default(param.default.as_ref());
        });
        self.emit(")");
    }

    /// Method modifiers, name, parameters and body.
    fn emit_method(&mut self, kind: MethodKind, key: &PropertyKey, value: &Function) {
        match kind {
            MethodKind::Get => self.emit("get "),
            MethodKind::Set => self.emit("set "),
            MethodKind::Method => {}
        }
        if value.is_async {
            self.emit("async ");
        }
        if value.is_generator {
            self.emit("*");
        }
        self.emit_property_key(key);
        self.emit_params(&value.params);
        self.emit_block(&value.body);
    }

    fn emit_class(&mut self, class: &Class) {
        self.emit("class");
        if let Some(name) = &class.name {
            self.emit(name);
        }
        if let Some(super_class) = &class.super_class {
            self.emit("extends");
            self.emit_expr_prec(super_class, PREC_CALL);
        }
        self.emit("{");
        for member in &class.body {
            self.emit_class_member(member);
        }
        self.emit("}");
    }

    fn emit_class_member(&mut self, member: &ClassMember) {
        match &member.kind {
            ClassMemberKind::Method {
                key,
                value,
                kind,
                is_static,
            } => {
                if *is_static {
                    self.emit("static ");
                }
                self.emit_method(*kind, key, value);
            }
            ClassMemberKind::Property {
                key,
                value,
                is_static,
            } => {
                if *is_static {
                    self.emit("static ");
                }
                self.emit_property_key(key);
                if let Some(value) = value {
                    self.emit("=");
                    self.emit_expr_prec(value, PREC_ASSIGN);
                }
                self.emit_semicolon();
            }
        }
    }

    // =========================================================================
    // Modules
    // =========================================================================

    fn emit_import(&mut self, decl: &ImportDecl) {
        self.emit("import ");
        if !decl.specifiers.is_empty() {
            let mut named = Vec::new();
            let mut first = true;
            for spec in &decl.specifiers {
                match spec {
                    ImportSpecifier::Default { local, .. } => {
                        if !first {
                            self.emit(",");
                        }
                        self.emit(local);
                        first = false;
                    }
                    ImportSpecifier::Namespace { local, .. } => {
                        if !first {
                            self.emit(",");
                        }
                        self.emit("* as ");
                        self.emit(local);
                        first = false;
                    }
                    ImportSpecifier::Named {
                        imported, local, ..
                    } => named.push((imported, local)),
                }
            }
            if !named.is_empty() {
                if !first {
                    self.emit(",");
                }
                self.emit("{");
                self.emit_list(&named, |this, (imported, local)| {
                    this.emit(imported);
                    if imported != local {
                        this.emit(" as ");
                        this.emit(local);
                    }
                });
                self.emit("}");
            }
            self.emit(" from ");
        }
        self.emit(&decl.source);
        self.emit_semicolon();
    }

    fn emit_export(&mut self, decl: &ExportDecl) {
        match decl {
            ExportDecl::Named {
                specifiers, source, ..
            } => {
                self.emit("export{");
                self.emit_list(specifiers, |this, spec| {
                    this.emit(&spec.local);
                    if spec.local != spec.exported {
                        this.emit(" as ");
                        this.emit(&spec.exported);
                    }
                });
                self.emit("}");
                if let Some(source) = source {
                    self.emit(" from ");
                    self.emit(source);
                }
                self.emit_semicolon();
            }
            ExportDecl::Default { expr, .. } => {
                self.emit("export default ");
                self.emit_expr_prec(expr, PREC_ASSIGN);
                if !matches!(expr.kind, ExprKind::Function(_) | ExprKind::Class(_)) {
                    self.emit_semicolon();
                }
            }
            ExportDecl::Decl { decl, .. } => {
                self.emit("export ");
                self.emit_stmt(decl);
            }
            ExportDecl::All { source, .. } => {
                self.emit("export * from ");
                self.emit(source);
                self.emit_semicolon();
            }
        }
    }

    // =========================================================================
    // Expression Emission
    // =========================================================================

    fn emit_expr(&mut self, expr: &Expr) {
        self.emit_expr_prec(expr, 0);
    }

    /// Emit `expr` in a position that binds at least as tightly as
    /// `min_prec`, adding parentheses when it does not.
    fn emit_expr_prec(&mut self, expr: &Expr, min_prec: u8) {
        let wrap = expr_prec(expr) < min_prec;
        if wrap {
            self.emit("(");
        }

        match &expr.kind {
            ExprKind::Null => self.emit("null"),
            ExprKind::Bool(b) => self.emit(if *b { "true" } else { "false" }),
            ExprKind::Number(raw) => self.emit(raw),
            ExprKind::String(raw) => self.emit(raw),
            ExprKind::Regex { pattern, flags } => {
                self.emit("/");
                self.output.push_str(pattern);
                self.output.push('/');
                self.output.push_str(flags);
            }
            ExprKind::Template(raw) => self.emit(raw),
            ExprKind::Ident(name) => self.emit(name),
            ExprKind::This => self.emit("this"),
            ExprKind::Super => self.emit("super"),
            ExprKind::Array(elements) => {
                self.emit("[");
                self.emit_list(elements, |this, elem| {
                    if let Some(elem) = elem {
                        this.emit_expr_prec(elem, PREC_ASSIGN);
                    }
                });
                if matches!(elements.last(), Some(None)) {
                    self.emit(",");
                }
                self.emit("]");
            }
            ExprKind::Object(props) => {
                self.emit("{");
                self.emit_list(props, |this, prop| this.emit_object_property(prop));
                self.emit("}");
            }
            ExprKind::Function(func) => self.emit_function(func),
            ExprKind::Arrow(arrow) => self.emit_arrow(arrow),
            ExprKind::Class(class) => self.emit_class(class),
            ExprKind::Unary { op, arg } => {
                self.emit(unary_op_str(*op));
                self.emit_expr_prec(arg, PREC_UNARY);
            }
            ExprKind::Binary { op, left, right } => {
                let (prec, op_str) = binary_op_info(*op);
                let right_assoc = *op == BinaryOp::Pow;
                let (left_prec, right_prec) = if right_assoc {
                    (prec + 1, prec)
                } else {
                    (prec, prec + 1)
                };
                self.emit_expr_prec(left, left_prec);
                self.emit(op_str);
                self.emit_expr_prec(right, right_prec);
            }
            ExprKind::Assign { op, left, right } => {
                match left.as_ref() {
                    AssignTarget::Pattern(binding) => self.emit_binding(binding),
                    AssignTarget::Expr(target) => self.emit_expr_prec(target, PREC_POSTFIX),
                }
                self.emit(assign_op_str(*op));
                self.emit_expr_prec(right, PREC_ASSIGN);
            }
            ExprKind::Update { op, prefix, arg } => {
                let op_str = match op {
                    UpdateOp::Increment => "++",
                    UpdateOp::Decrement => "--",
                };
                if *prefix {
                    self.emit(op_str);
                    self.emit_expr_prec(arg, PREC_UNARY);
                } else {
                    self.emit_expr_prec(arg, PREC_POSTFIX);
                    self.emit(op_str);
                }
            }
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.emit_expr_prec(test, PREC_CONDITIONAL + 1);
                self.emit("?");
                self.emit_expr_prec(consequent, PREC_ASSIGN);
                self.emit(":");
                self.emit_expr_prec(alternate, PREC_ASSIGN);
            }
            ExprKind::Sequence(exprs) => {
                self.emit_list(exprs, |this, e| this.emit_expr_prec(e, PREC_ASSIGN));
            }
            ExprKind::Paren(inner) => {
                self.emit("(");
                self.emit_expr(inner);
                self.emit(")");
            }
            ExprKind::Member {
                object,
                property,
                computed,
            } => {
                self.emit_expr_prec(object, PREC_CALL);
                if *computed {
                    self.emit("[");
                    self.emit_expr(property);
                    self.emit("]");
                } else {
                    // `1.toString` would lex the dot into the number
                    if let ExprKind::Number(raw) = &object.kind {
                        if raw.bytes().all(|b| b.is_ascii_digit()) {
                            self.output.push(' ');
                        }
                    }
                    self.emit(".");
                    self.emit_expr(property);
                }
            }
            ExprKind::Call { callee, args } => {
                self.emit_expr_prec(callee, PREC_CALL);
                self.emit_args(args);
            }
            ExprKind::New { callee, args } => {
                self.emit("new");
                self.emit_expr_prec(callee, PREC_CALL);
                if let Some(args) = args {
                    self.emit_args(args);
                }
            }
            ExprKind::TaggedTemplate { tag, quasi } => {
                self.emit_expr_prec(tag, PREC_CALL);
                self.emit(quasi);
            }
            ExprKind::Spread(arg) => {
                self.emit("...");
                self.emit_expr_prec(arg, PREC_ASSIGN);
            }
            ExprKind::Yield { arg, delegate } => {
                self.emit("yield");
                if *delegate {
                    self.emit("*");
                }
                if let Some(arg) = arg {
                    self.emit_expr_prec(arg, PREC_ASSIGN);
                }
            }
            ExprKind::Await(arg) => {
                self.emit("await");
                self.emit_expr_prec(arg, PREC_UNARY);
            }
        }

        if wrap {
            self.emit(")");
        }
    }

    fn emit_args(&mut self, args: &[Expr]) {
        self.emit("(");
        self.emit_list(args, |this, arg| this.emit_expr_prec(arg, PREC_ASSIGN));
        self.emit(")");
    }

    fn emit_object_property(&mut self, prop: &Property) {
        match prop {
            Property::KeyValue { key, value } => {
                self.emit_property_key(key);
                self.emit(":");
                self.emit_expr_prec(value, PREC_ASSIGN);
            }
            Property::Shorthand(name) => self.emit(name),
            Property::Method { kind, key, value } => self.emit_method(*kind, key, value),
            Property::Spread(expr) => {
                self.emit("...");
                self.emit_expr_prec(expr, PREC_ASSIGN);
            }
        }
    }

    fn emit_property_key(&mut self, key: &PropertyKey) {
        match key {
            PropertyKey::Ident(name) => self.emit(name),
            PropertyKey::String(raw) | PropertyKey::Number(raw) => self.emit(raw),
            PropertyKey::Computed(expr) => {
                self.emit("[");
                self.emit_expr_prec(expr, PREC_ASSIGN);
                self.emit("]");
            }
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// How tightly an expression binds, for parenthesization.
fn expr_prec(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Sequence(_) => PREC_SEQUENCE,
        ExprKind::Assign { .. } | ExprKind::Arrow(_) | ExprKind::Yield { .. } => PREC_ASSIGN,
        ExprKind::Conditional { .. } => PREC_CONDITIONAL,
        ExprKind::Binary { op, .. } => binary_op_info(*op).0,
        ExprKind::Unary { .. } | ExprKind::Await(_) => PREC_UNARY,
        ExprKind::Update { prefix: true, .. } => PREC_UNARY,
        ExprKind::Update { prefix: false, .. } => PREC_POSTFIX,
        ExprKind::Spread(_) => PREC_ASSIGN,
        _ => u8::MAX,
    }
}

fn unary_op_str(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Minus => "-",
        UnaryOp::Plus => "+",
        UnaryOp::Not => "!",
        UnaryOp::BitNot => "~",
        UnaryOp::Typeof => "typeof",
        UnaryOp::Void => "void",
        UnaryOp::Delete => "delete",
    }
}

fn binary_op_info(op: BinaryOp) -> (u8, &'static str) {
    match op {
        BinaryOp::Or => (5, "||"),
        BinaryOp::And => (6, "&&"),
        BinaryOp::BitOr => (7, "|"),
        BinaryOp::BitXor => (8, "^"),
        BinaryOp::BitAnd => (9, "&"),
        BinaryOp::Eq => (10, "=="),
        BinaryOp::NotEq => (10, "!="),
        BinaryOp::StrictEq => (10, "==="),
        BinaryOp::StrictNotEq => (10, "!=="),
        BinaryOp::Lt => (11, "<"),
        BinaryOp::LtEq => (11, "<="),
        BinaryOp::Gt => (11, ">"),
        BinaryOp::GtEq => (11, ">="),
        BinaryOp::In => (11, "in"),
        BinaryOp::Instanceof => (11, "instanceof"),
        BinaryOp::Shl => (12, "<<"),
        BinaryOp::Shr => (12, ">>"),
        BinaryOp::UShr => (12, ">>>"),
        BinaryOp::Add => (13, "+"),
        BinaryOp::Sub => (13, "-"),
        BinaryOp::Mul => (14, "*"),
        BinaryOp::Div => (14, "/"),
        BinaryOp::Mod => (14, "%"),
        BinaryOp::Pow => (15, "**"),
    }
}

fn assign_op_str(op: AssignOp) -> &'static str {
    match op {
        AssignOp::Assign => "=",
        AssignOp::AddAssign => "+=",
        AssignOp::SubAssign => "-=",
        AssignOp::MulAssign => "*=",
        AssignOp::DivAssign => "/=",
        AssignOp::ModAssign => "%=",
        AssignOp::PowAssign => "**=",
        AssignOp::ShlAssign => "<<=",
        AssignOp::ShrAssign => ">>=",
        AssignOp::UShrAssign => ">>>=",
        AssignOp::BitOrAssign => "|=",
        AssignOp::BitXorAssign => "^=",
        AssignOp::BitAndAssign => "&=",
    }
}
