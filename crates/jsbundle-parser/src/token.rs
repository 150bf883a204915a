//! Token types.
//!
//! Tokens carry no payload. Their text is a slice of the source, so the
//! concatenation of every token's text reproduces the input exactly.
//! Strings, template literals, regular expressions and comments are not
//! tokens of their own: the parser gathers them from the raw token stream.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;

use crate::span::Span;

/// A token with its kind, text and source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Exact source text of the token.
    pub text: &'a str,
    pub span: Span,
    /// 1-based line.
    pub line: u32,
    /// 1-based column, counted in characters.
    pub column: u32,
}

impl<'a> Token<'a> {
    /// Create a new token.
    #[inline]
    pub const fn new(kind: TokenKind, text: &'a str, span: Span, line: u32, column: u32) -> Self {
        Self {
            kind,
            text,
            span,
            line,
            column,
        }
    }
}

/// The kind of token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // === Literals ===
    /// Number literal: `42`, `3.14`, `.5`, `1e-3`, `0xff`
    Number,
    /// Identifier: `foo`, `_bar`, `$baz`
    Identifier,

    // === Keywords ===
    // Declarations
    Var,
    Let,
    Const,
    Function,
    Class,
    Extends,
    Static,

    // Control flow
    If,
    Else,
    Switch,
    Case,
    Default,
    For,
    While,
    Do,
    Break,
    Continue,
    Return,
    With,
    Debugger,

    // Exception handling
    Try,
    Catch,
    Finally,
    Throw,

    // Operators as keywords
    New,
    Delete,
    Typeof,
    Void,
    In,
    Instanceof,

    // Values
    This,
    Super,
    Null,
    True,
    False,

    // Modules
    Import,
    Export,

    // Async and generators
    Async,
    Await,
    Yield,

    // Reserved, never valid as identifiers
    Enum,

    // === Punctuation ===
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `...`
    Spread,
    /// `?`
    Question,
    /// `:`
    Colon,
    /// `=>`
    Arrow,
    /// `\`
    Escape,

    // === Operators ===
    // Comparison
    /// `==`
    EqEq,
    /// `===`
    EqEqEq,
    /// `!=`
    BangEq,
    /// `!==`
    BangEqEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,

    // Arithmetic
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `**`
    StarStar,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,

    // Bitwise
    /// `&`
    Amp,
    /// `|`
    Pipe,
    /// `^`
    Caret,
    /// `~`
    Tilde,
    /// `<<`
    LtLt,
    /// `>>`
    GtGt,
    /// `>>>`
    GtGtGt,

    // Logical
    /// `!`
    Bang,
    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,

    // Assignment
    /// `=`
    Eq,
    /// `+=`
    PlusEq,
    /// `-=`
    MinusEq,
    /// `*=`
    StarEq,
    /// `/=`
    SlashEq,
    /// `%=`
    PercentEq,
    /// `**=`
    StarStarEq,
    /// `&=`
    AmpEq,
    /// `|=`
    PipeEq,
    /// `^=`
    CaretEq,
    /// `<<=`
    LtLtEq,
    /// `>>=`
    GtGtEq,
    /// `>>>=`
    GtGtGtEq,

    // === Raw ===
    /// `'` or `"`
    StringQuote,
    /// `` ` ``
    TemplateLiteralQuote,
    /// Run of spaces, tabs and carriage returns
    Space,
    /// `\n`, vertical tab or form feed
    Newline,
    /// Any other single character
    Any,
    /// End of input
    EndOfInput,
}

/// Precedence and associativity of an infix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpInfo {
    /// Higher binds tighter.
    pub precedence: u8,
    pub right_assoc: bool,
}

impl OpInfo {
    const fn left(precedence: u8) -> Self {
        Self {
            precedence,
            right_assoc: false,
        }
    }

    const fn right(precedence: u8) -> Self {
        Self {
            precedence,
            right_assoc: true,
        }
    }
}

impl TokenKind {
    /// Check if this is a keyword.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Var
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Function
                | TokenKind::Class
                | TokenKind::Extends
                | TokenKind::Static
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::Switch
                | TokenKind::Case
                | TokenKind::Default
                | TokenKind::For
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Return
                | TokenKind::With
                | TokenKind::Debugger
                | TokenKind::Try
                | TokenKind::Catch
                | TokenKind::Finally
                | TokenKind::Throw
                | TokenKind::New
                | TokenKind::Delete
                | TokenKind::Typeof
                | TokenKind::Void
                | TokenKind::In
                | TokenKind::Instanceof
                | TokenKind::This
                | TokenKind::Super
                | TokenKind::Null
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Import
                | TokenKind::Export
                | TokenKind::Async
                | TokenKind::Await
                | TokenKind::Yield
                | TokenKind::Enum
        )
    }

    /// Identifiers and keywords, both usable as property names.
    pub fn is_identifier_name(&self) -> bool {
        *self == TokenKind::Identifier || self.is_keyword()
    }

    /// Whitespace tokens. Comments are recognized by the parser.
    pub fn is_space(&self) -> bool {
        matches!(self, TokenKind::Space | TokenKind::Newline)
    }

    /// Check if this is an assignment operator.
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::PlusEq
                | TokenKind::MinusEq
                | TokenKind::StarEq
                | TokenKind::SlashEq
                | TokenKind::PercentEq
                | TokenKind::StarStarEq
                | TokenKind::AmpEq
                | TokenKind::PipeEq
                | TokenKind::CaretEq
                | TokenKind::LtLtEq
                | TokenKind::GtGtEq
                | TokenKind::GtGtGtEq
        )
    }

    /// Precedence table for infix operators. Returns None for anything else.
    pub fn op_info(&self) -> Option<OpInfo> {
        let info = match self {
            kind if kind.is_assignment() => OpInfo::right(3),
            TokenKind::PipePipe => OpInfo::left(5),
            TokenKind::AmpAmp => OpInfo::left(6),
            TokenKind::Pipe => OpInfo::left(7),
            TokenKind::Caret => OpInfo::left(8),
            TokenKind::Amp => OpInfo::left(9),
            TokenKind::EqEq | TokenKind::EqEqEq | TokenKind::BangEq | TokenKind::BangEqEq => {
                OpInfo::left(10)
            }
            TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq
            | TokenKind::In
            | TokenKind::Instanceof => OpInfo::left(11),
            TokenKind::LtLt | TokenKind::GtGt | TokenKind::GtGtGt => OpInfo::left(12),
            TokenKind::Plus | TokenKind::Minus => OpInfo::left(13),
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => OpInfo::left(14),
            TokenKind::StarStar => OpInfo::right(15),
            _ => return None,
        };
        Some(info)
    }

    /// Precedence of a binary (non-assignment) operator.
    pub fn binary_precedence(&self) -> Option<u8> {
        if self.is_assignment() {
            return None;
        }
        self.op_info().map(|info| info.precedence)
    }
}

/// Look up a keyword from an identifier string.
///
/// `of`, `get`, `set`, `as` and `from` stay identifiers; the parser
/// matches them by text where the grammar needs them.
pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
    match s {
        "var" => Some(TokenKind::Var),
        "let" => Some(TokenKind::Let),
        "const" => Some(TokenKind::Const),
        "function" => Some(TokenKind::Function),
        "class" => Some(TokenKind::Class),
        "extends" => Some(TokenKind::Extends),
        "static" => Some(TokenKind::Static),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "switch" => Some(TokenKind::Switch),
        "case" => Some(TokenKind::Case),
        "default" => Some(TokenKind::Default),
        "for" => Some(TokenKind::For),
        "while" => Some(TokenKind::While),
        "do" => Some(TokenKind::Do),
        "break" => Some(TokenKind::Break),
        "continue" => Some(TokenKind::Continue),
        "return" => Some(TokenKind::Return),
        "with" => Some(TokenKind::With),
        "debugger" => Some(TokenKind::Debugger),
        "try" => Some(TokenKind::Try),
        "catch" => Some(TokenKind::Catch),
        "finally" => Some(TokenKind::Finally),
        "throw" => Some(TokenKind::Throw),
        "new" => Some(TokenKind::New),
        "delete" => Some(TokenKind::Delete),
        "typeof" => Some(TokenKind::Typeof),
        "void" => Some(TokenKind::Void),
        "in" => Some(TokenKind::In),
        "instanceof" => Some(TokenKind::Instanceof),
        "this" => Some(TokenKind::This),
        "super" => Some(TokenKind::Super),
        "null" => Some(TokenKind::Null),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "import" => Some(TokenKind::Import),
        "export" => Some(TokenKind::Export),
        "async" => Some(TokenKind::Async),
        "await" => Some(TokenKind::Await),
        "yield" => Some(TokenKind::Yield),
        "enum" => Some(TokenKind::Enum),
        _ => None,
    }
}

/// Operator and punctuation spellings. The lexer takes the longest match.
const OPERATORS: &[(&str, TokenKind)] = &[
    (">>>=", TokenKind::GtGtGtEq),
    ("===", TokenKind::EqEqEq),
    ("!==", TokenKind::BangEqEq),
    ("**=", TokenKind::StarStarEq),
    ("<<=", TokenKind::LtLtEq),
    (">>=", TokenKind::GtGtEq),
    (">>>", TokenKind::GtGtGt),
    ("...", TokenKind::Spread),
    ("=>", TokenKind::Arrow),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::BangEq),
    ("<=", TokenKind::LtEq),
    (">=", TokenKind::GtEq),
    ("&&", TokenKind::AmpAmp),
    ("||", TokenKind::PipePipe),
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::MinusMinus),
    ("+=", TokenKind::PlusEq),
    ("-=", TokenKind::MinusEq),
    ("*=", TokenKind::StarEq),
    ("/=", TokenKind::SlashEq),
    ("%=", TokenKind::PercentEq),
    ("&=", TokenKind::AmpEq),
    ("|=", TokenKind::PipeEq),
    ("^=", TokenKind::CaretEq),
    ("<<", TokenKind::LtLt),
    (">>", TokenKind::GtGt),
    ("**", TokenKind::StarStar),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    (";", TokenKind::Semicolon),
    (",", TokenKind::Comma),
    (".", TokenKind::Dot),
    ("?", TokenKind::Question),
    (":", TokenKind::Colon),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("&", TokenKind::Amp),
    ("|", TokenKind::Pipe),
    ("^", TokenKind::Caret),
    ("!", TokenKind::Bang),
    ("~", TokenKind::Tilde),
    ("=", TokenKind::Eq),
    ("\\", TokenKind::Escape),
];

/// Longest operator spelling in the table.
pub const MAX_OPERATOR_LEN: usize = 4;

fn operator_table() -> &'static FxHashMap<&'static str, TokenKind> {
    static TABLE: OnceLock<FxHashMap<&'static str, TokenKind>> = OnceLock::new();
    TABLE.get_or_init(|| OPERATORS.iter().copied().collect())
}

/// Look up an operator or punctuation spelling.
pub fn operator_from_str(s: &str) -> Option<TokenKind> {
    operator_table().get(s).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        assert_eq!(keyword_from_str("function"), Some(TokenKind::Function));
        assert_eq!(keyword_from_str("instanceof"), Some(TokenKind::Instanceof));
        assert_eq!(keyword_from_str("of"), None);
        assert_eq!(keyword_from_str("from"), None);
        assert_eq!(keyword_from_str("get"), None);
    }

    #[test]
    fn test_operator_table() {
        assert_eq!(operator_from_str(">>>="), Some(TokenKind::GtGtGtEq));
        assert_eq!(operator_from_str("**="), Some(TokenKind::StarStarEq));
        assert_eq!(operator_from_str("=>"), Some(TokenKind::Arrow));
        assert_eq!(operator_from_str("\\"), Some(TokenKind::Escape));
        assert_eq!(operator_from_str("??"), None);
        assert!(OPERATORS.iter().all(|(s, _)| s.len() <= MAX_OPERATOR_LEN));
    }

    #[test]
    fn test_precedence() {
        assert_eq!(TokenKind::PipePipe.binary_precedence(), Some(5));
        assert_eq!(TokenKind::Instanceof.binary_precedence(), Some(11));
        assert_eq!(TokenKind::StarStar.op_info(), Some(OpInfo::right(15)));
        assert_eq!(TokenKind::GtGtGtEq.op_info(), Some(OpInfo::right(3)));
        assert_eq!(TokenKind::GtGtGtEq.binary_precedence(), None);
        assert_eq!(TokenKind::Dot.op_info(), None);
    }
}
