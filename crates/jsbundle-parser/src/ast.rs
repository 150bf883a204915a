//! AST node types.
//!
//! Literals keep their raw source text (quotes, escapes and number
//! spelling included) so the printer can reproduce them verbatim.

use crate::span::Span;

/// The root AST for a parsed module.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    /// All top-level statements.
    pub stmts: Vec<Stmt>,
}

impl Program {
    /// Create a new program.
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }
}

// =============================================================================
// Expressions
// =============================================================================

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// An expression without a source location.
    pub fn synthetic(kind: ExprKind) -> Self {
        Self {
            kind,
            span: Span::default(),
        }
    }

    /// Whether this expression may appear on the left of `=`.
    pub fn is_assignable(&self) -> bool {
        match &self.kind {
            ExprKind::Ident(_) | ExprKind::Member { .. } => true,
            ExprKind::Paren(inner) => inner.is_assignable(),
            _ => false,
        }
    }
}

/// Expression kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // === Literals ===
    /// Null literal
    Null,
    /// Boolean literal
    Bool(bool),
    /// Number literal, as written
    Number(String),
    /// String literal, as written including quotes
    String(String),
    /// Regular expression
    Regex { pattern: String, flags: String },
    /// Template literal, as written including backticks
    Template(String),

    // === Identifiers ===
    /// Identifier reference
    Ident(String),
    /// `this` keyword
    This,
    /// `super` keyword
    Super,

    // === Compound Expressions ===
    /// Array literal: `[a, , ...c]`
    Array(Vec<Option<Expr>>),
    /// Object literal: `{a: 1, b}`
    Object(Vec<Property>),
    /// Function expression: `function() {}`
    Function(Box<Function>),
    /// Arrow function: `() => {}`
    Arrow(Box<ArrowFunction>),
    /// Class expression: `class {}`
    Class(Box<Class>),

    // === Operations ===
    /// Unary operation: `!x`, `-x`, `typeof x`
    Unary { op: UnaryOp, arg: Box<Expr> },
    /// Binary operation: `a + b`, `a && b`
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Assignment: `a = b`, `[a, b] = c`
    Assign {
        op: AssignOp,
        left: Box<AssignTarget>,
        right: Box<Expr>,
    },
    /// Update expression: `++a`, `a++`
    Update {
        op: UpdateOp,
        prefix: bool,
        arg: Box<Expr>,
    },
    /// Conditional: `a ? b : c`
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    /// Sequence: `a, b, c`
    Sequence(Vec<Expr>),
    /// Parenthesized expression, kept so output matches the source grouping
    Paren(Box<Expr>),

    // === Member Access ===
    /// Member expression: `a.b` or `a[b]`
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
        computed: bool,
    },

    // === Calls ===
    /// Function call: `f(a, b)`
    Call { callee: Box<Expr>, args: Vec<Expr> },
    /// New expression: `new Foo(a)`, or `new Foo` when `args` is None
    New {
        callee: Box<Expr>,
        args: Option<Vec<Expr>>,
    },
    /// Tagged template: `` tag`template` ``, quasi kept raw
    TaggedTemplate { tag: Box<Expr>, quasi: String },

    // === Special ===
    /// Spread element: `...arr`
    Spread(Box<Expr>),
    /// Yield expression: `yield x`
    Yield {
        arg: Option<Box<Expr>>,
        delegate: bool,
    },
    /// Await expression: `await x`
    Await(Box<Expr>),
}

/// Left-hand side of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    /// Destructuring pattern: `[a, b] = c`
    Pattern(Binding),
    /// Identifier or member expression
    Expr(Expr),
}

// =============================================================================
// Statements
// =============================================================================

/// A statement node.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// A statement without a source location.
    pub fn synthetic(kind: StmtKind) -> Self {
        Self {
            kind,
            span: Span::default(),
        }
    }
}

/// Statement kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    // === Declarations ===
    /// Variable declaration: `let x = 1`
    Var {
        kind: VarKind,
        decls: Vec<VarDeclarator>,
    },
    /// Function declaration: `function foo() {}`
    Function(Box<Function>),
    /// Class declaration: `class Foo {}`
    Class(Box<Class>),

    // === Control Flow ===
    /// Block statement: `{ ... }`
    Block(Vec<Stmt>),
    /// If statement: `if (x) { } else { }`
    If {
        test: Expr,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
    },
    /// Switch statement
    Switch {
        discriminant: Expr,
        cases: Vec<SwitchCase>,
    },
    /// For statement: `for (;;) {}`
    For {
        init: Option<ForInit>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    /// For-in statement: `for (x in obj) {}`
    ForIn {
        left: ForInit,
        right: Expr,
        body: Box<Stmt>,
    },
    /// For-of statement: `for (x of arr) {}`
    ForOf {
        left: ForInit,
        right: Expr,
        body: Box<Stmt>,
    },
    /// While statement
    While { test: Expr, body: Box<Stmt> },
    /// Do-while statement
    DoWhile { body: Box<Stmt>, test: Expr },
    /// Break statement
    Break { label: Option<String> },
    /// Continue statement
    Continue { label: Option<String> },
    /// Return statement
    Return { arg: Option<Expr> },
    /// Throw statement
    Throw { arg: Expr },
    /// Try statement
    Try {
        block: Vec<Stmt>,
        handler: Option<CatchClause>,
        finalizer: Option<Vec<Stmt>>,
    },
    /// Labeled statement
    Labeled { label: String, body: Box<Stmt> },

    // === Expressions ===
    /// Expression statement
    Expr(Expr),
    /// Empty statement: `;`
    Empty,
    /// Debugger statement
    Debugger,

    // === Modules ===
    /// Import declaration
    Import(Box<ImportDecl>),
    /// Export declaration
    Export(Box<ExportDecl>),
}

// =============================================================================
// Bindings (Patterns)
// =============================================================================

/// A binding pattern (used in variable declarations, parameters, etc.)
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub kind: BindingKind,
    pub span: Span,
}

impl Binding {
    pub fn new(kind: BindingKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Every identifier this pattern binds, in source order.
    pub fn bound_names(&self, out: &mut Vec<String>) {
        match &self.kind {
            BindingKind::Ident { name } => out.push(name.clone()),
            BindingKind::Array { elements } => {
                for elem in elements.iter().flatten() {
                    elem.binding.bound_names(out);
                }
            }
            BindingKind::Object { properties } => {
                for prop in properties {
                    prop.value.bound_names(out);
                }
            }
        }
    }
}

/// Binding pattern kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingKind {
    /// Simple identifier: `x`
    Ident { name: String },
    /// Array pattern: `[a, , ...rest]`
    Array {
        elements: Vec<Option<ArrayPatternElement>>,
    },
    /// Object pattern: `{a, b: c, ...rest}`
    Object {
        properties: Vec<ObjectPatternProperty>,
    },
}

/// Element in an array pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayPatternElement {
    pub binding: Binding,
    pub default: Option<Expr>,
    pub rest: bool,
}

/// Property in an object pattern.
///
/// For `...rest` the key mirrors the bound name and is not printed.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPatternProperty {
    pub key: PropertyKey,
    pub value: Binding,
    pub default: Option<Expr>,
    pub shorthand: bool,
    pub rest: bool,
}

// =============================================================================
// Supporting Types
// =============================================================================

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,  // -
    Plus,   // +
    Not,    // !
    BitNot, // ~
    Typeof, // typeof
    Void,   // void
    Delete, // delete
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    Mod, // %
    Pow, // **

    // Comparison
    Eq,          // ==
    NotEq,       // !=
    StrictEq,    // ===
    StrictNotEq, // !==
    Lt,          // <
    LtEq,        // <=
    Gt,          // >
    GtEq,        // >=

    // Bitwise
    BitOr,  // |
    BitXor, // ^
    BitAnd, // &
    Shl,    // <<
    Shr,    // >>
    UShr,   // >>>

    // Logical
    And, // &&
    Or,  // ||

    // Other
    In,         // in
    Instanceof, // instanceof
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,       // =
    AddAssign,    // +=
    SubAssign,    // -=
    MulAssign,    // *=
    DivAssign,    // /=
    ModAssign,    // %=
    PowAssign,    // **=
    ShlAssign,    // <<=
    ShrAssign,    // >>=
    UShrAssign,   // >>>=
    BitOrAssign,  // |=
    BitXorAssign, // ^=
    BitAndAssign, // &=
}

/// Update operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment, // ++
    Decrement, // --
}

/// Variable declaration kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

impl VarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VarKind::Var => "var",
            VarKind::Let => "let",
            VarKind::Const => "const",
        }
    }
}

/// Variable declarator.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclarator {
    pub binding: Binding,
    pub init: Option<Expr>,
    pub span: Span,
}

/// Object literal member.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    /// `key: value`
    KeyValue { key: PropertyKey, value: Expr },
    /// `{a}`
    Shorthand(String),
    /// `foo() {}`, `get foo() {}`, `set foo(v) {}`
    Method {
        kind: MethodKind,
        key: PropertyKey,
        value: Function,
    },
    /// `...expr`
    Spread(Expr),
}

/// Property key.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    /// Identifier or keyword used as a name
    Ident(String),
    /// String key, as written including quotes
    String(String),
    /// Number key, as written
    Number(String),
    /// `[expr]`
    Computed(Box<Expr>),
}

/// Switch case.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub test: Option<Expr>, // None for default
    pub consequent: Vec<Stmt>,
    pub span: Span,
}

/// Catch clause.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub param: Option<Binding>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Head of a `for` statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Var {
        kind: VarKind,
        decls: Vec<VarDeclarator>,
    },
    Expr(Expr),
    /// Assignment target of `for (x in y)` or `for ([a, b] of c)`
    Pattern(Binding),
}

// =============================================================================
// Functions and Classes
// =============================================================================

/// Function node (used for declarations, expressions, methods).
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub is_async: bool,
    pub is_generator: bool,
    pub span: Span,
}

/// Arrow function node.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowFunction {
    pub params: Vec<Param>,
    pub body: ArrowBody,
    pub is_async: bool,
    pub span: Span,
}

/// Arrow function body.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    Expr(Box<Expr>),
    Block(Vec<Stmt>),
}

/// Function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub binding: Binding,
    pub default: Option<Expr>,
    pub rest: bool,
    pub span: Span,
}

/// Class node.
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub name: Option<String>,
    pub super_class: Option<Box<Expr>>,
    pub body: Vec<ClassMember>,
    pub span: Span,
}

/// Class member.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMember {
    pub kind: ClassMemberKind,
    pub span: Span,
}

/// Class member kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMemberKind {
    /// Method: `foo() {}`
    Method {
        key: PropertyKey,
        value: Function,
        kind: MethodKind,
        is_static: bool,
    },
    /// Property: `foo = 1`
    Property {
        key: PropertyKey,
        value: Option<Expr>,
        is_static: bool,
    },
}

/// Method kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Method,
    Get,
    Set,
}

// =============================================================================
// Modules
// =============================================================================

/// Import declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub specifiers: Vec<ImportSpecifier>,
    /// Module path literal, as written including quotes
    pub source: String,
    pub span: Span,
}

/// Import specifier.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportSpecifier {
    /// Default import: `import foo from "mod"`
    Default { local: String, span: Span },
    /// Namespace import: `import * as foo from "mod"`
    Namespace { local: String, span: Span },
    /// Named import: `import { foo, bar as baz } from "mod"`
    Named {
        imported: String,
        local: String,
        span: Span,
    },
}

/// Export declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportDecl {
    /// Named export: `export { foo, bar as baz } [from "mod"]`
    Named {
        specifiers: Vec<ExportSpecifier>,
        source: Option<String>,
        span: Span,
    },
    /// Default export: `export default expr`
    Default { expr: Expr, span: Span },
    /// Declaration export: `export function foo() {}`
    Decl { decl: Stmt, span: Span },
    /// All export: `export * from "mod"`
    All { source: String, span: Span },
}

/// Export specifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    pub local: String,
    pub exported: String,
    pub span: Span,
}

/// Strip the quotes from a raw string literal.
pub fn unquote(raw: &str) -> &str {
    if raw.len() >= 2 {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Binding {
        Binding::new(
            BindingKind::Ident {
                name: name.to_string(),
            },
            Span::default(),
        )
    }

    #[test]
    fn test_bound_names() {
        let pattern = Binding::new(
            BindingKind::Array {
                elements: vec![
                    Some(ArrayPatternElement {
                        binding: ident("a"),
                        default: None,
                        rest: false,
                    }),
                    None,
                    Some(ArrayPatternElement {
                        binding: Binding::new(
                            BindingKind::Object {
                                properties: vec![ObjectPatternProperty {
                                    key: PropertyKey::Ident("k".into()),
                                    value: ident("b"),
                                    default: None,
                                    shorthand: false,
                                    rest: false,
                                }],
                            },
                            Span::default(),
                        ),
                        default: None,
                        rest: true,
                    }),
                ],
            },
            Span::default(),
        );

        let mut names = Vec::new();
        pattern.bound_names(&mut names);
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'./bar'"), "./bar");
        assert_eq!(unquote("\"x\""), "x");
    }
}
