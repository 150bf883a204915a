//! JavaScript parser.
//!
//! Recursive descent over the raw token stream from the lexer, with
//! operator-precedence parsing for binary expressions. Whitespace and
//! comments are skipped between tokens here rather than in the lexer, so
//! string, template and regexp bodies can be gathered verbatim.
//!
//! Ambiguous constructs (arrow functions, destructuring assignment,
//! `for-in` heads) are tried speculatively: [`Parser::attempt`] rewinds
//! on failure and remembers the furthest failing token, which becomes the
//! reported error when no alternative succeeds.

use crate::ast::*;
use crate::span::{LineIndex, Span};
use crate::token::{Token, TokenKind};
use rustc_hash::FxHashSet as HashSet;

/// Parse a token stream produced by [`crate::lex`].
pub fn parse(tokens: &[Token<'_>]) -> Result<Program, ParseError> {
    Parser::new(tokens).parse()
}

/// Parse error, pointing at the furthest token the parser could not accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: TokenKind,
    pub lexeme: String,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
    pub span: Span,
}

impl ParseError {
    pub fn unexpected(token: &Token<'_>) -> Self {
        Self {
            kind: token.kind,
            lexeme: token.text.to_string(),
            line: token.line,
            column: token.column,
            span: token.span,
        }
    }

    /// The message followed by the offending source line and a caret
    /// under the token.
    pub fn render(&self, source: &str) -> String {
        let index = LineIndex::new(source);
        let padding = " ".repeat(5 + self.column.saturating_sub(1) as usize);
        format!(
            "{self}\n{:4} {}\n{padding}^",
            self.line,
            index.line_text(self.line)
        )
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Unexpected token '{}' at {}:{}",
            self.lexeme, self.line, self.column
        )
    }
}

impl std::error::Error for ParseError {}

type PResult<T> = Result<T, ParseError>;

const END_OF_INPUT: Token<'static> =
    Token::new(TokenKind::EndOfInput, "", Span::new(0, 0), 1, 1);

/// Grammar flags that flow down into nested productions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
struct Context {
    /// `await` is an operator.
    in_async: bool,
    /// `yield` is an operator.
    in_generator: bool,
    /// `in` is not a binary operator (for-loop heads).
    no_in: bool,
}

impl Context {
    fn function(is_async: bool, is_generator: bool) -> Self {
        Self {
            in_async: is_async,
            in_generator: is_generator,
            no_in: false,
        }
    }

    fn with_no_in(self, no_in: bool) -> Self {
        Self { no_in, ..self }
    }
}

/// A speculative production that may be retried at the same token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Speculation {
    Arrow,
    PatternAssign,
}

/// The parser.
pub struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    /// Index of the next unconsumed token, possibly trivia.
    pos: usize,
    /// End offset of the last consumed significant token.
    last_end: u32,
    /// Error from the furthest failed alternative.
    furthest: Option<ParseError>,
    /// Speculations already known to fail, keyed by token index.
    failed: HashSet<(usize, Speculation, Context)>,
}

impl<'t, 'a> Parser<'t, 'a> {
    /// Create a new parser. `tokens` should end with `EndOfInput`.
    pub fn new(tokens: &'t [Token<'a>]) -> Self {
        Self {
            tokens,
            pos: 0,
            last_end: 0,
            furthest: None,
            failed: HashSet::default(),
        }
    }

    /// Parse the whole token stream into a program.
    pub fn parse(mut self) -> Result<Program, ParseError> {
        match self.parse_program() {
            Ok(program) => Ok(program),
            Err(err) => {
                self.record(err);
                let token = self.peek();
                Err(self
                    .furthest
                    .take()
                    .unwrap_or_else(|| ParseError::unexpected(&token)))
            }
        }
    }

    // =========================================================================
    // Token Handling
    // =========================================================================

    fn token(&self, index: usize) -> Token<'a> {
        self.tokens
            .get(index)
            .or(self.tokens.last())
            .copied()
            .unwrap_or(END_OF_INPUT)
    }

    /// Index of the first significant token at or after `from`, and whether
    /// a line break was skipped on the way. Comments count as trivia; a
    /// block comment spanning lines counts as a line break.
    fn scan_trivia(&self, from: usize) -> (usize, bool) {
        let mut i = from;
        let mut newline = false;
        loop {
            let tok = self.token(i);
            match tok.kind {
                TokenKind::Space => i += 1,
                TokenKind::Newline => {
                    newline = true;
                    i += 1;
                }
                TokenKind::Slash => {
                    let next = self.token(i + 1);
                    if matches!(next.kind, TokenKind::Slash | TokenKind::SlashEq) {
                        // Line comment; the line break stays significant
                        i += 2;
                        while !matches!(
                            self.token(i).kind,
                            TokenKind::Newline | TokenKind::EndOfInput
                        ) {
                            i += 1;
                        }
                    } else if next.text.starts_with('*') {
                        let (end, crossed) = self.block_comment_end(i + 1);
                        newline |= crossed;
                        i = end;
                    } else {
                        return (i, newline);
                    }
                }
                _ => return (i, newline),
            }
            if i >= self.tokens.len() {
                return (self.tokens.len().saturating_sub(1), newline);
            }
        }
    }

    /// `open` indexes the star token right after the opening slash.
    fn block_comment_end(&self, open: usize) -> (usize, bool) {
        let open_text = self.token(open).text;
        // `/**/` closes on the second star of the opening `**`
        let mut after_star = open_text.len() > 1 && open_text.ends_with('*');
        let mut newline = false;
        let mut i = open + 1;
        loop {
            let tok = self.token(i);
            match tok.kind {
                TokenKind::EndOfInput => return (i, newline),
                TokenKind::Slash if after_star => return (i + 1, newline),
                TokenKind::Newline => newline = true,
                _ => {}
            }
            after_star = tok.text.ends_with('*');
            i += 1;
        }
    }

    /// Next significant token.
    fn peek(&self) -> Token<'a> {
        self.token(self.scan_trivia(self.pos).0)
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    /// The `n`th significant token after the next one.
    fn peek_at(&self, n: usize) -> Token<'a> {
        let (mut i, _) = self.scan_trivia(self.pos);
        for _ in 0..n {
            i = self.scan_trivia(i + 1).0;
        }
        self.token(i)
    }

    /// Whether a line break separates the last consumed token from the next.
    fn has_newline_before(&self) -> bool {
        self.scan_trivia(self.pos).1
    }

    fn advance(&mut self) -> Token<'a> {
        let (i, _) = self.scan_trivia(self.pos);
        let tok = self.token(i);
        if tok.kind == TokenKind::EndOfInput {
            self.pos = i;
        } else {
            self.pos = i + 1;
            self.last_end = tok.span.end;
        }
        tok
    }

    /// Current token without skipping trivia, for gathering literal bodies.
    fn raw_peek(&self) -> Token<'a> {
        self.token(self.pos)
    }

    fn raw_advance(&mut self) -> Token<'a> {
        let tok = self.raw_peek();
        if tok.kind != TokenKind::EndOfInput {
            self.pos += 1;
            self.last_end = tok.span.end;
        }
        tok
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn check_contextual(&self, word: &str) -> bool {
        let tok = self.peek();
        tok.kind == TokenKind::Identifier && tok.text == word
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token<'a>> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            self.unexpected()
        }
    }

    fn expect_contextual(&mut self, word: &str) -> PResult<()> {
        if self.check_contextual(word) {
            self.advance();
            Ok(())
        } else {
            self.unexpected()
        }
    }

    fn expect_identifier(&mut self) -> PResult<String> {
        Ok(self.expect(TokenKind::Identifier)?.text.to_string())
    }

    /// A declared name. `async` is only a keyword in front of a function
    /// or arrow, so it is accepted here.
    fn expect_binding_identifier(&mut self) -> PResult<String> {
        if matches!(self.peek_kind(), TokenKind::Identifier | TokenKind::Async) {
            Ok(self.advance().text.to_string())
        } else {
            self.unexpected()
        }
    }

    /// Identifier or keyword, as allowed after `.` and in import lists.
    fn expect_identifier_name(&mut self) -> PResult<String> {
        if self.peek_kind().is_identifier_name() {
            Ok(self.advance().text.to_string())
        } else {
            self.unexpected()
        }
    }

    fn unexpected<T>(&self) -> PResult<T> {
        Err(ParseError::unexpected(&self.peek()))
    }

    /// Consume a semicolon, or accept its absence before a line break,
    /// a closing brace or the end of input.
    fn expect_semicolon(&mut self) -> PResult<()> {
        if self.eat(TokenKind::Semicolon) {
            return Ok(());
        }
        if matches!(self.peek_kind(), TokenKind::RBrace | TokenKind::EndOfInput)
            || self.has_newline_before()
        {
            return Ok(());
        }
        self.unexpected()
    }

    fn start(&self) -> u32 {
        self.peek().span.start
    }

    fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.last_end.max(start))
    }

    fn record(&mut self, err: ParseError) {
        let further = self
            .furthest
            .as_ref()
            .map_or(true, |best| err.span.start > best.span.start);
        if further {
            self.furthest = Some(err);
        }
    }

    /// Run `f`, rewinding to the current position if it fails.
    fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> Option<T> {
        let saved = (self.pos, self.last_end);
        match f(self) {
            Ok(value) => Some(value),
            Err(err) => {
                self.record(err);
                (self.pos, self.last_end) = saved;
                None
            }
        }
    }

    /// [`Parser::attempt`], skipped when `kind` already failed at this
    /// token under the same context.
    fn speculate<T>(
        &mut self,
        kind: Speculation,
        cx: Context,
        f: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> Option<T> {
        let key = (self.scan_trivia(self.pos).0, kind, cx);
        if self.failed.contains(&key) {
            return None;
        }
        let result = self.attempt(f);
        if result.is_none() {
            self.failed.insert(key);
        }
        result
    }

    fn text_from(&self, first: usize) -> String {
        self.tokens[first.min(self.pos)..self.pos]
            .iter()
            .map(|t| t.text)
            .collect()
    }

    // =========================================================================
    // Program Parsing
    // =========================================================================

    fn parse_program(&mut self) -> PResult<Program> {
        let stmts = self.parse_stmts_until(Context::default(), &[TokenKind::EndOfInput])?;
        self.expect(TokenKind::EndOfInput)?;
        Ok(Program::new(stmts))
    }

    fn parse_stmts_until(&mut self, cx: Context, end: &[TokenKind]) -> PResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !end.contains(&self.peek_kind()) && !self.check(TokenKind::EndOfInput) {
            stmts.push(self.parse_stmt(cx)?);
        }
        Ok(stmts)
    }

    // =========================================================================
    // Statement Parsing
    // =========================================================================

    fn parse_stmt(&mut self, cx: Context) -> PResult<Stmt> {
        let tok = self.peek();
        let start = tok.span.start;

        let kind = match tok.kind {
            TokenKind::Identifier if self.peek_at(1).kind == TokenKind::Colon => {
                let label = self.expect_identifier()?;
                self.expect(TokenKind::Colon)?;
                let body = self.parse_stmt(cx)?;
                StmtKind::Labeled {
                    label,
                    body: Box::new(body),
                }
            }
            TokenKind::Throw => {
                self.advance();
                if self.has_newline_before() {
                    return self.unexpected();
                }
                let arg = self.parse_expr(cx)?;
                self.expect_semicolon()?;
                StmtKind::Throw { arg }
            }
            TokenKind::Switch => self.parse_switch_stmt(cx)?,
            TokenKind::Try => self.parse_try_stmt(cx)?,
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                let (kind, decls) = self.parse_var_decl(cx)?;
                self.expect_semicolon()?;
                StmtKind::Var { kind, decls }
            }
            TokenKind::Class => StmtKind::Class(Box::new(self.parse_class(cx, true)?)),
            TokenKind::LBrace => StmtKind::Block(self.parse_block(cx)?),
            TokenKind::Do => {
                self.advance();
                let body = self.parse_stmt(cx)?;
                self.expect(TokenKind::While)?;
                let test = self.parse_paren_test(cx)?;
                self.eat(TokenKind::Semicolon);
                StmtKind::DoWhile {
                    body: Box::new(body),
                    test,
                }
            }
            TokenKind::While => {
                self.advance();
                let test = self.parse_paren_test(cx)?;
                let body = self.parse_stmt(cx)?;
                StmtKind::While {
                    test,
                    body: Box::new(body),
                }
            }
            TokenKind::If => {
                self.advance();
                let test = self.parse_paren_test(cx)?;
                let consequent = Box::new(self.parse_stmt(cx)?);
                let alternate = if self.eat(TokenKind::Else) {
                    Some(Box::new(self.parse_stmt(cx)?))
                } else {
                    None
                };
                StmtKind::If {
                    test,
                    consequent,
                    alternate,
                }
            }
            TokenKind::For => match self.attempt(|p| p.parse_for_in_of(cx)) {
                Some(kind) => kind,
                None => self.parse_for_stmt(cx)?,
            },
            TokenKind::Export => self.parse_export_decl(cx)?,
            TokenKind::Import => self.parse_import_decl()?,
            TokenKind::Function => {
                StmtKind::Function(Box::new(self.parse_function(false, true)?))
            }
            TokenKind::Async if self.peek_at(1).kind == TokenKind::Function => {
                self.advance();
                let mut func = self.parse_function(true, true)?;
                func.span = self.span_from(start);
                StmtKind::Function(Box::new(func))
            }
            TokenKind::Return => {
                self.advance();
                let arg = if self.at_statement_end() {
                    None
                } else {
                    Some(self.parse_expr(cx)?)
                };
                self.expect_semicolon()?;
                StmtKind::Return { arg }
            }
            TokenKind::Break | TokenKind::Continue => {
                self.advance();
                let label = if !self.has_newline_before() && self.check(TokenKind::Identifier) {
                    Some(self.expect_identifier()?)
                } else {
                    None
                };
                self.expect_semicolon()?;
                if tok.kind == TokenKind::Break {
                    StmtKind::Break { label }
                } else {
                    StmtKind::Continue { label }
                }
            }
            TokenKind::Debugger => {
                self.advance();
                self.expect_semicolon()?;
                StmtKind::Debugger
            }
            TokenKind::Semicolon => {
                self.advance();
                StmtKind::Empty
            }
            // `with` is not supported
            TokenKind::With => return self.unexpected(),
            _ => {
                let expr = self.parse_expr(cx)?;
                self.expect_semicolon()?;
                StmtKind::Expr(expr)
            }
        };

        Ok(Stmt::new(kind, self.span_from(start)))
    }

    /// A `return` argument must start on the same line.
    fn at_statement_end(&self) -> bool {
        self.has_newline_before()
            || matches!(
                self.peek_kind(),
                TokenKind::Semicolon | TokenKind::RBrace | TokenKind::EndOfInput
            )
    }

    fn parse_block(&mut self, cx: Context) -> PResult<Vec<Stmt>> {
        self.expect(TokenKind::LBrace)?;
        let stmts = self.parse_stmts_until(cx, &[TokenKind::RBrace])?;
        self.expect(TokenKind::RBrace)?;
        Ok(stmts)
    }

    fn parse_paren_test(&mut self, cx: Context) -> PResult<Expr> {
        self.expect(TokenKind::LParen)?;
        let test = self.parse_expr(cx.with_no_in(false))?;
        self.expect(TokenKind::RParen)?;
        Ok(test)
    }

    fn parse_var_decl(&mut self, cx: Context) -> PResult<(VarKind, Vec<VarDeclarator>)> {
        let kind = match self.advance().kind {
            TokenKind::Var => VarKind::Var,
            TokenKind::Let => VarKind::Let,
            TokenKind::Const => VarKind::Const,
            _ => return self.unexpected(),
        };

        let mut decls = Vec::new();
        loop {
            let start = self.start();
            let binding = self.parse_binding(cx)?;
            let init = if self.eat(TokenKind::Eq) {
                Some(self.parse_assign(cx)?)
            } else {
                None
            };
            decls.push(VarDeclarator {
                binding,
                init,
                span: self.span_from(start),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok((kind, decls))
    }

    fn parse_switch_stmt(&mut self, cx: Context) -> PResult<StmtKind> {
        self.expect(TokenKind::Switch)?;
        let discriminant = self.parse_paren_test(cx)?;
        self.expect(TokenKind::LBrace)?;

        let mut cases = Vec::new();
        while !self.eat(TokenKind::RBrace) {
            let start = self.start();
            let test = if self.eat(TokenKind::Case) {
                Some(self.parse_expr(cx)?)
            } else {
                self.expect(TokenKind::Default)?;
                None
            };
            self.expect(TokenKind::Colon)?;
            let consequent = self.parse_stmts_until(
                cx,
                &[TokenKind::Case, TokenKind::Default, TokenKind::RBrace],
            )?;
            cases.push(SwitchCase {
                test,
                consequent,
                span: self.span_from(start),
            });
        }

        Ok(StmtKind::Switch {
            discriminant,
            cases,
        })
    }

    fn parse_try_stmt(&mut self, cx: Context) -> PResult<StmtKind> {
        self.expect(TokenKind::Try)?;
        let block = self.parse_block(cx)?;

        let handler = if self.check(TokenKind::Catch) {
            let start = self.start();
            self.advance();
            let param = if self.eat(TokenKind::LParen) {
                let param = self.parse_binding(cx)?;
                self.expect(TokenKind::RParen)?;
                Some(param)
            } else {
                None
            };
            let body = self.parse_block(cx)?;
            Some(CatchClause {
                param,
                body,
                span: self.span_from(start),
            })
        } else {
            None
        };

        let finalizer = if self.eat(TokenKind::Finally) {
            Some(self.parse_block(cx)?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return self.unexpected();
        }

        Ok(StmtKind::Try {
            block,
            handler,
            finalizer,
        })
    }

    fn parse_for_in_of(&mut self, cx: Context) -> PResult<StmtKind> {
        self.expect(TokenKind::For)?;
        self.expect(TokenKind::LParen)?;

        let left = if matches!(
            self.peek_kind(),
            TokenKind::Var | TokenKind::Let | TokenKind::Const
        ) {
            let kind = match self.advance().kind {
                TokenKind::Let => VarKind::Let,
                TokenKind::Const => VarKind::Const,
                _ => VarKind::Var,
            };
            let start = self.start();
            let binding = self.parse_binding(cx)?;
            ForInit::Var {
                kind,
                decls: vec![VarDeclarator {
                    binding,
                    init: None,
                    span: self.span_from(start),
                }],
            }
        } else {
            ForInit::Pattern(self.parse_binding(cx)?)
        };

        let is_of = if self.eat(TokenKind::In) {
            false
        } else {
            self.expect_contextual("of")?;
            true
        };

        let right = if is_of {
            self.parse_assign(cx.with_no_in(false))?
        } else {
            self.parse_expr(cx.with_no_in(false))?
        };
        self.expect(TokenKind::RParen)?;
        let body = Box::new(self.parse_stmt(cx)?);

        Ok(if is_of {
            StmtKind::ForOf { left, right, body }
        } else {
            StmtKind::ForIn { left, right, body }
        })
    }

    fn parse_for_stmt(&mut self, cx: Context) -> PResult<StmtKind> {
        self.expect(TokenKind::For)?;
        self.expect(TokenKind::LParen)?;

        let init = if self.check(TokenKind::Semicolon) {
            None
        } else if matches!(
            self.peek_kind(),
            TokenKind::Var | TokenKind::Let | TokenKind::Const
        ) {
            let (kind, decls) = self.parse_var_decl(cx.with_no_in(true))?;
            Some(ForInit::Var { kind, decls })
        } else {
            Some(ForInit::Expr(self.parse_expr(cx.with_no_in(true))?))
        };
        self.expect(TokenKind::Semicolon)?;

        let test = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr(cx.with_no_in(false))?)
        };
        self.expect(TokenKind::Semicolon)?;

        let update = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expr(cx.with_no_in(false))?)
        };
        self.expect(TokenKind::RParen)?;

        let body = Box::new(self.parse_stmt(cx)?);
        Ok(StmtKind::For {
            init,
            test,
            update,
            body,
        })
    }

    // =========================================================================
    // Bindings
    // =========================================================================

    fn parse_binding(&mut self, cx: Context) -> PResult<Binding> {
        let start = self.start();
        let kind = match self.peek_kind() {
            TokenKind::Identifier | TokenKind::Async => BindingKind::Ident {
                name: self.expect_binding_identifier()?,
            },
            TokenKind::LBracket => self.parse_array_binding(cx)?,
            TokenKind::LBrace => self.parse_object_binding(cx)?,
            _ => return self.unexpected(),
        };
        Ok(Binding::new(kind, self.span_from(start)))
    }

    fn parse_binding_default(&mut self, cx: Context) -> PResult<Option<Expr>> {
        if self.eat(TokenKind::Eq) {
            Ok(Some(self.parse_assign(cx.with_no_in(false))?))
        } else {
            Ok(None)
        }
    }

    fn parse_array_binding(&mut self, cx: Context) -> PResult<BindingKind> {
        self.expect(TokenKind::LBracket)?;
        let mut elements = Vec::new();
        loop {
            if self.eat(TokenKind::RBracket) {
                break;
            }
            if self.eat(TokenKind::Comma) {
                elements.push(None);
                continue;
            }
            let rest = self.eat(TokenKind::Spread);
            let binding = self.parse_binding(cx)?;
            let default = if rest {
                None
            } else {
                self.parse_binding_default(cx)?
            };
            elements.push(Some(ArrayPatternElement {
                binding,
                default,
                rest,
            }));
            if !self.eat(TokenKind::Comma) {
                self.expect(TokenKind::RBracket)?;
                break;
            }
        }
        Ok(BindingKind::Array { elements })
    }

    fn parse_object_binding(&mut self, cx: Context) -> PResult<BindingKind> {
        self.expect(TokenKind::LBrace)?;
        let mut properties = Vec::new();
        loop {
            if self.eat(TokenKind::RBrace) {
                break;
            }

            let prop = if self.eat(TokenKind::Spread) {
                let start = self.start();
                let name = self.expect_identifier()?;
                ObjectPatternProperty {
                    key: PropertyKey::Ident(name.clone()),
                    value: Binding::new(BindingKind::Ident { name }, self.span_from(start)),
                    default: None,
                    shorthand: false,
                    rest: true,
                }
            } else {
                let shorthand_ok = self.check(TokenKind::Identifier);
                let start = self.start();
                let key = self.parse_property_key(cx)?;
                if self.eat(TokenKind::Colon) {
                    let value = self.parse_binding(cx)?;
                    let default = self.parse_binding_default(cx)?;
                    ObjectPatternProperty {
                        key,
                        value,
                        default,
                        shorthand: false,
                        rest: false,
                    }
                } else {
                    let PropertyKey::Ident(name) = &key else {
                        return self.unexpected();
                    };
                    if !shorthand_ok {
                        return self.unexpected();
                    }
                    let value = Binding::new(
                        BindingKind::Ident { name: name.clone() },
                        self.span_from(start),
                    );
                    let default = self.parse_binding_default(cx)?;
                    ObjectPatternProperty {
                        key,
                        value,
                        default,
                        shorthand: true,
                        rest: false,
                    }
                }
            };
            properties.push(prop);

            if !self.eat(TokenKind::Comma) {
                self.expect(TokenKind::RBrace)?;
                break;
            }
        }
        Ok(BindingKind::Object { properties })
    }

    fn parse_property_key(&mut self, cx: Context) -> PResult<PropertyKey> {
        let tok = self.peek();
        match tok.kind {
            kind if kind.is_identifier_name() => {
                self.advance();
                Ok(PropertyKey::Ident(tok.text.to_string()))
            }
            TokenKind::StringQuote => Ok(PropertyKey::String(self.parse_string_raw()?)),
            TokenKind::Number => {
                self.advance();
                Ok(PropertyKey::Number(tok.text.to_string()))
            }
            TokenKind::LBracket => {
                self.advance();
                let expr = self.parse_assign(cx.with_no_in(false))?;
                self.expect(TokenKind::RBracket)?;
                Ok(PropertyKey::Computed(Box::new(expr)))
            }
            _ => self.unexpected(),
        }
    }

    // =========================================================================
    // Functions and Classes
    // =========================================================================

    /// Parse from the `function` keyword; any `async` is already consumed.
    fn parse_function(&mut self, is_async: bool, name_required: bool) -> PResult<Function> {
        let start = self.start();
        self.expect(TokenKind::Function)?;
        let is_generator = self.eat(TokenKind::Star);

        let name = if self.check(TokenKind::Identifier) {
            Some(self.expect_identifier()?)
        } else if name_required {
            return self.unexpected();
        } else {
            None
        };

        let fcx = Context::function(is_async, is_generator);
        let params = self.parse_params(fcx)?;
        let body = self.parse_block(fcx)?;

        Ok(Function {
            name,
            params,
            body,
            is_async,
            is_generator,
            span: self.span_from(start),
        })
    }

    fn parse_params(&mut self, cx: Context) -> PResult<Vec<Param>> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        loop {
            if self.eat(TokenKind::RParen) {
                break;
            }
            let start = self.start();
            let rest = self.eat(TokenKind::Spread);
            let binding = self.parse_binding(cx)?;
            let default = if rest {
                None
            } else {
                self.parse_binding_default(cx)?
            };
            params.push(Param {
                binding,
                default,
                rest,
                span: self.span_from(start),
            });
            if !self.eat(TokenKind::Comma) {
                self.expect(TokenKind::RParen)?;
                break;
            }
        }
        Ok(params)
    }

    /// Modifiers in front of a method name: `get`, `set`, `async`, `*`.
    /// A modifier word directly followed by `(`, `:`, `=`, `,`, `;` or `}`
    /// is itself the name.
    fn parse_method_prefix(&mut self) -> (MethodKind, bool, bool) {
        let is_name = matches!(
            self.peek_at(1).kind,
            TokenKind::LParen
                | TokenKind::Colon
                | TokenKind::Eq
                | TokenKind::Comma
                | TokenKind::Semicolon
                | TokenKind::RBrace
        );
        if !is_name {
            if self.check_contextual("get") {
                self.advance();
                return (MethodKind::Get, false, false);
            }
            if self.check_contextual("set") {
                self.advance();
                return (MethodKind::Set, false, false);
            }
            if self.check(TokenKind::Async) {
                self.advance();
                let is_generator = self.eat(TokenKind::Star);
                return (MethodKind::Method, true, is_generator);
            }
        }
        let is_generator = self.eat(TokenKind::Star);
        (MethodKind::Method, false, is_generator)
    }

    /// Parameters and body of a method whose name was just parsed.
    fn parse_method_function(
        &mut self,
        start: u32,
        is_async: bool,
        is_generator: bool,
    ) -> PResult<Function> {
        let fcx = Context::function(is_async, is_generator);
        let params = self.parse_params(fcx)?;
        let body = self.parse_block(fcx)?;
        Ok(Function {
            name: None,
            params,
            body,
            is_async,
            is_generator,
            span: self.span_from(start),
        })
    }

    fn parse_class(&mut self, cx: Context, name_required: bool) -> PResult<Class> {
        let start = self.start();
        self.expect(TokenKind::Class)?;

        let name = if self.check(TokenKind::Identifier) {
            Some(self.expect_identifier()?)
        } else if name_required {
            return self.unexpected();
        } else {
            None
        };

        let super_class = if self.eat(TokenKind::Extends) {
            Some(Box::new(self.parse_call_member(cx)?))
        } else {
            None
        };

        self.expect(TokenKind::LBrace)?;
        let mut body = Vec::new();
        loop {
            if self.eat(TokenKind::RBrace) {
                break;
            }
            if self.eat(TokenKind::Semicolon) {
                continue;
            }
            body.push(self.parse_class_member(cx)?);
        }

        Ok(Class {
            name,
            super_class,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_class_member(&mut self, cx: Context) -> PResult<ClassMember> {
        let start = self.start();

        let is_static = self.check(TokenKind::Static)
            && !matches!(
                self.peek_at(1).kind,
                TokenKind::LParen | TokenKind::Eq | TokenKind::Semicolon | TokenKind::RBrace
            );
        if is_static {
            self.advance();
        }

        let (kind, is_async, is_generator) = self.parse_method_prefix();
        let key = self.parse_property_key(cx)?;

        let member = if self.check(TokenKind::LParen) {
            let value = self.parse_method_function(start, is_async, is_generator)?;
            ClassMemberKind::Method {
                key,
                value,
                kind,
                is_static,
            }
        } else {
            if kind != MethodKind::Method || is_async || is_generator {
                return self.unexpected();
            }
            let value = if self.eat(TokenKind::Eq) {
                Some(self.parse_assign(cx.with_no_in(false))?)
            } else {
                None
            };
            self.expect_semicolon()?;
            ClassMemberKind::Property {
                key,
                value,
                is_static,
            }
        };

        Ok(ClassMember {
            kind: member,
            span: self.span_from(start),
        })
    }

    // =========================================================================
    // Modules
    // =========================================================================

    fn parse_import_decl(&mut self) -> PResult<StmtKind> {
        let start = self.start();
        self.expect(TokenKind::Import)?;

        let mut specifiers = Vec::new();
        if !self.check(TokenKind::StringQuote) {
            let mut need_more = true;

            if matches!(self.peek_kind(), TokenKind::Identifier | TokenKind::Async) {
                let spec_start = self.start();
                let local = self.expect_binding_identifier()?;
                specifiers.push(ImportSpecifier::Default {
                    local,
                    span: self.span_from(spec_start),
                });
                need_more = self.eat(TokenKind::Comma);
            }

            if need_more {
                let spec_start = self.start();
                if self.eat(TokenKind::Star) {
                    self.expect_contextual("as")?;
                    let local = self.expect_binding_identifier()?;
                    specifiers.push(ImportSpecifier::Namespace {
                        local,
                        span: self.span_from(spec_start),
                    });
                } else {
                    self.expect(TokenKind::LBrace)?;
                    loop {
                        if self.eat(TokenKind::RBrace) {
                            break;
                        }
                        let spec_start = self.start();
                        let imported = self.expect_identifier_name()?;
                        let local = if self.check_contextual("as") {
                            self.advance();
                            self.expect_binding_identifier()?
                        } else {
                            imported.clone()
                        };
                        specifiers.push(ImportSpecifier::Named {
                            imported,
                            local,
                            span: self.span_from(spec_start),
                        });
                        if !self.eat(TokenKind::Comma) {
                            self.expect(TokenKind::RBrace)?;
                            break;
                        }
                    }
                }
            }

            self.expect_contextual("from")?;
        }

        let source = self.expect_string()?;
        self.expect_semicolon()?;

        Ok(StmtKind::Import(Box::new(ImportDecl {
            specifiers,
            source,
            span: self.span_from(start),
        })))
    }

    fn parse_export_decl(&mut self, cx: Context) -> PResult<StmtKind> {
        let start = self.start();
        self.expect(TokenKind::Export)?;

        let decl = match self.peek_kind() {
            TokenKind::Default => {
                self.advance();
                // A function or class here is a declaration: no call or
                // member tail, and no semicolon.
                let decl_start = self.start();
                let expr = match self.peek_kind() {
                    TokenKind::Function => {
                        let func = self.parse_function(false, false)?;
                        Expr::new(ExprKind::Function(Box::new(func)), self.span_from(decl_start))
                    }
                    TokenKind::Async if self.peek_at(1).kind == TokenKind::Function => {
                        self.advance();
                        let func = self.parse_function(true, false)?;
                        Expr::new(ExprKind::Function(Box::new(func)), self.span_from(decl_start))
                    }
                    TokenKind::Class => {
                        let class = self.parse_class(cx, false)?;
                        Expr::new(ExprKind::Class(Box::new(class)), self.span_from(decl_start))
                    }
                    _ => {
                        let expr = self.parse_assign(cx)?;
                        self.expect_semicolon()?;
                        expr
                    }
                };
                ExportDecl::Default {
                    expr,
                    span: self.span_from(start),
                }
            }
            TokenKind::Star => {
                self.advance();
                self.expect_contextual("from")?;
                let source = self.expect_string()?;
                self.expect_semicolon()?;
                ExportDecl::All {
                    source,
                    span: self.span_from(start),
                }
            }
            TokenKind::LBrace => {
                self.advance();
                let mut specifiers = Vec::new();
                loop {
                    if self.eat(TokenKind::RBrace) {
                        break;
                    }
                    let spec_start = self.start();
                    let local = self.expect_identifier_name()?;
                    let exported = if self.check_contextual("as") {
                        self.advance();
                        self.expect_identifier_name()?
                    } else {
                        local.clone()
                    };
                    specifiers.push(ExportSpecifier {
                        local,
                        exported,
                        span: self.span_from(spec_start),
                    });
                    if !self.eat(TokenKind::Comma) {
                        self.expect(TokenKind::RBrace)?;
                        break;
                    }
                }
                let source = if self.check_contextual("from") {
                    self.advance();
                    Some(self.expect_string()?)
                } else {
                    None
                };
                self.expect_semicolon()?;
                ExportDecl::Named {
                    specifiers,
                    source,
                    span: self.span_from(start),
                }
            }
            TokenKind::Var
            | TokenKind::Let
            | TokenKind::Const
            | TokenKind::Function
            | TokenKind::Class
            | TokenKind::Async => {
                let decl = self.parse_stmt(cx)?;
                if !matches!(
                    decl.kind,
                    StmtKind::Var { .. } | StmtKind::Function(_) | StmtKind::Class(_)
                ) {
                    return Err(ParseError::unexpected(&self.token(self.pos)));
                }
                ExportDecl::Decl {
                    decl,
                    span: self.span_from(start),
                }
            }
            _ => return self.unexpected(),
        };

        Ok(StmtKind::Export(Box::new(decl)))
    }

    fn expect_string(&mut self) -> PResult<String> {
        if self.check(TokenKind::StringQuote) {
            self.parse_string_raw()
        } else {
            self.unexpected()
        }
    }

    // =========================================================================
    // Expression Parsing
    // =========================================================================

    /// Comma-separated sequence of assignment expressions.
    fn parse_expr(&mut self, cx: Context) -> PResult<Expr> {
        let start = self.start();
        let first = self.parse_assign(cx)?;
        if !self.check(TokenKind::Comma) {
            return Ok(first);
        }
        let mut exprs = vec![first];
        while self.eat(TokenKind::Comma) {
            exprs.push(self.parse_assign(cx)?);
        }
        Ok(Expr::new(ExprKind::Sequence(exprs), self.span_from(start)))
    }

    fn parse_assign(&mut self, cx: Context) -> PResult<Expr> {
        let tok = self.peek();

        if tok.kind == TokenKind::Yield && cx.in_generator {
            return self.parse_yield(cx);
        }

        if self.arrow_possible() {
            if let Some(arrow) = self.speculate(Speculation::Arrow, cx, |p| p.parse_arrow(cx)) {
                return Ok(arrow);
            }
        }

        if matches!(tok.kind, TokenKind::LBrace | TokenKind::LBracket) {
            if let Some(assign) =
                self.speculate(Speculation::PatternAssign, cx, |p| p.parse_pattern_assign(cx))
            {
                return Ok(assign);
            }
        }

        let left = self.parse_conditional(cx)?;
        let Some(op) = assign_op(self.peek_kind()) else {
            return Ok(left);
        };
        if !left.is_assignable() {
            return self.unexpected();
        }
        self.advance();
        let right = self.parse_assign(cx)?;
        Ok(Expr::new(
            ExprKind::Assign {
                op,
                left: Box::new(AssignTarget::Expr(left)),
                right: Box::new(right),
            },
            self.span_from(tok.span.start),
        ))
    }

    fn arrow_possible(&self) -> bool {
        match self.peek_kind() {
            TokenKind::LParen => true,
            TokenKind::Identifier => self.peek_at(1).kind == TokenKind::Arrow,
            TokenKind::Async => matches!(
                self.peek_at(1).kind,
                TokenKind::LParen | TokenKind::Identifier
            ),
            _ => false,
        }
    }

    fn parse_arrow(&mut self, cx: Context) -> PResult<Expr> {
        let start = self.start();
        let is_async = self.eat(TokenKind::Async);
        let fcx = Context::function(is_async, false);

        let params = if self.check(TokenKind::Identifier) {
            let param_start = self.start();
            let name = self.expect_identifier()?;
            let span = self.span_from(param_start);
            vec![Param {
                binding: Binding::new(BindingKind::Ident { name }, span),
                default: None,
                rest: false,
                span,
            }]
        } else {
            self.parse_params(fcx)?
        };

        if self.has_newline_before() {
            return self.unexpected();
        }
        self.expect(TokenKind::Arrow)?;

        let body = if self.check(TokenKind::LBrace) {
            ArrowBody::Block(self.parse_block(fcx)?)
        } else {
            ArrowBody::Expr(Box::new(self.parse_assign(fcx.with_no_in(cx.no_in))?))
        };

        let span = self.span_from(start);
        Ok(Expr::new(
            ExprKind::Arrow(Box::new(ArrowFunction {
                params,
                body,
                is_async,
                span,
            })),
            span,
        ))
    }

    /// `[a, b] = value` or `{a, b} = value`.
    fn parse_pattern_assign(&mut self, cx: Context) -> PResult<Expr> {
        let start = self.start();
        let pattern = self.parse_binding(cx)?;
        self.expect(TokenKind::Eq)?;
        let right = self.parse_assign(cx)?;
        Ok(Expr::new(
            ExprKind::Assign {
                op: AssignOp::Assign,
                left: Box::new(AssignTarget::Pattern(pattern)),
                right: Box::new(right),
            },
            self.span_from(start),
        ))
    }

    fn parse_yield(&mut self, cx: Context) -> PResult<Expr> {
        let start = self.start();
        self.expect(TokenKind::Yield)?;
        let delegate = !self.has_newline_before() && self.eat(TokenKind::Star);
        let has_arg = delegate
            || !(self.has_newline_before()
                || matches!(
                    self.peek_kind(),
                    TokenKind::RParen
                        | TokenKind::RBracket
                        | TokenKind::RBrace
                        | TokenKind::Comma
                        | TokenKind::Semicolon
                        | TokenKind::Colon
                        | TokenKind::EndOfInput
                ));
        let arg = if has_arg {
            Some(Box::new(self.parse_assign(cx)?))
        } else {
            None
        };
        Ok(Expr::new(
            ExprKind::Yield { arg, delegate },
            self.span_from(start),
        ))
    }

    fn parse_conditional(&mut self, cx: Context) -> PResult<Expr> {
        let start = self.start();
        let test = self.parse_binary(cx)?;
        if !self.eat(TokenKind::Question) {
            return Ok(test);
        }
        let consequent = self.parse_assign(cx.with_no_in(false))?;
        self.expect(TokenKind::Colon)?;
        let alternate = self.parse_assign(cx)?;
        Ok(Expr::new(
            ExprKind::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
            self.span_from(start),
        ))
    }

    /// Binary operators, reduced with an operator stack by precedence.
    fn parse_binary(&mut self, cx: Context) -> PResult<Expr> {
        let mut operands = vec![self.parse_unary(cx)?];
        let mut operators: Vec<(BinaryOp, u8)> = Vec::new();

        while let Some((op, prec, right_assoc)) = self.peek_binary_op(cx) {
            self.advance();
            while let Some(&(top, top_prec)) = operators.last() {
                if top_prec > prec || (top_prec == prec && !right_assoc) {
                    operators.pop();
                    reduce(&mut operands, top);
                } else {
                    break;
                }
            }
            operators.push((op, prec));
            operands.push(self.parse_unary(cx)?);
        }

        while let Some((op, _)) = operators.pop() {
            reduce(&mut operands, op);
        }

        match operands.pop() {
            Some(expr) => Ok(expr),
            None => self.unexpected(),
        }
    }

    fn peek_binary_op(&self, cx: Context) -> Option<(BinaryOp, u8, bool)> {
        let kind = self.peek_kind();
        if kind == TokenKind::In && cx.no_in {
            return None;
        }
        let op = binary_op(kind)?;
        let info = kind.op_info()?;
        Some((op, info.precedence, info.right_assoc))
    }

    fn parse_unary(&mut self, cx: Context) -> PResult<Expr> {
        let start = self.start();
        let op = match self.peek_kind() {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::Delete => Some(UnaryOp::Delete),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let arg = self.parse_unary(cx)?;
            return Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    arg: Box::new(arg),
                },
                self.span_from(start),
            ));
        }

        match self.peek_kind() {
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let op = if self.advance().kind == TokenKind::PlusPlus {
                    UpdateOp::Increment
                } else {
                    UpdateOp::Decrement
                };
                let arg = self.parse_unary(cx)?;
                Ok(Expr::new(
                    ExprKind::Update {
                        op,
                        prefix: true,
                        arg: Box::new(arg),
                    },
                    self.span_from(start),
                ))
            }
            TokenKind::Await if cx.in_async => {
                self.advance();
                let arg = self.parse_unary(cx)?;
                Ok(Expr::new(
                    ExprKind::Await(Box::new(arg)),
                    self.span_from(start),
                ))
            }
            _ => self.parse_postfix(cx),
        }
    }

    fn parse_postfix(&mut self, cx: Context) -> PResult<Expr> {
        let start = self.start();
        let expr = self.parse_call_member(cx)?;
        let op = match self.peek_kind() {
            TokenKind::PlusPlus => UpdateOp::Increment,
            TokenKind::MinusMinus => UpdateOp::Decrement,
            _ => return Ok(expr),
        };
        // `a\n++b` is two statements
        if self.has_newline_before() {
            return Ok(expr);
        }
        self.advance();
        Ok(Expr::new(
            ExprKind::Update {
                op,
                prefix: false,
                arg: Box::new(expr),
            },
            self.span_from(start),
        ))
    }

    fn parse_call_member(&mut self, cx: Context) -> PResult<Expr> {
        let callee = if self.check(TokenKind::New) {
            self.parse_new(cx)?
        } else {
            self.parse_primary(cx)?
        };
        self.parse_call_tail(callee, cx, true)
    }

    /// `new` consumes the first argument list itself, so `new a()()`
    /// calls the constructed object.
    fn parse_new(&mut self, cx: Context) -> PResult<Expr> {
        let start = self.start();
        self.expect(TokenKind::New)?;
        let callee = if self.check(TokenKind::New) {
            self.parse_new(cx)?
        } else {
            self.parse_primary(cx)?
        };
        let callee = self.parse_call_tail(callee, cx, false)?;
        let args = if self.check(TokenKind::LParen) {
            Some(self.parse_arguments(cx)?)
        } else {
            None
        };
        Ok(Expr::new(
            ExprKind::New {
                callee: Box::new(callee),
                args,
            },
            self.span_from(start),
        ))
    }

    fn parse_call_tail(&mut self, mut expr: Expr, cx: Context, allow_call: bool) -> PResult<Expr> {
        let start = expr.span.start;
        loop {
            let kind = match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let prop_start = self.start();
                    let name = self.expect_identifier_name()?;
                    ExprKind::Member {
                        object: Box::new(expr),
                        property: Box::new(Expr::new(
                            ExprKind::Ident(name),
                            self.span_from(prop_start),
                        )),
                        computed: false,
                    }
                }
                TokenKind::LBracket => {
                    self.advance();
                    let property = self.parse_expr(cx.with_no_in(false))?;
                    self.expect(TokenKind::RBracket)?;
                    ExprKind::Member {
                        object: Box::new(expr),
                        property: Box::new(property),
                        computed: true,
                    }
                }
                TokenKind::LParen if allow_call => {
                    let args = self.parse_arguments(cx)?;
                    ExprKind::Call {
                        callee: Box::new(expr),
                        args,
                    }
                }
                TokenKind::TemplateLiteralQuote => {
                    let quasi = self.parse_template_raw(cx)?;
                    ExprKind::TaggedTemplate {
                        tag: Box::new(expr),
                        quasi,
                    }
                }
                _ => return Ok(expr),
            };
            expr = Expr::new(kind, self.span_from(start));
        }
    }

    fn parse_arguments(&mut self, cx: Context) -> PResult<Vec<Expr>> {
        self.expect(TokenKind::LParen)?;
        let cx = cx.with_no_in(false);
        let mut args = Vec::new();
        loop {
            if self.eat(TokenKind::RParen) {
                break;
            }
            args.push(self.parse_spread_or_assign(cx)?);
            if !self.eat(TokenKind::Comma) {
                self.expect(TokenKind::RParen)?;
                break;
            }
        }
        Ok(args)
    }

    fn parse_spread_or_assign(&mut self, cx: Context) -> PResult<Expr> {
        let start = self.start();
        if self.eat(TokenKind::Spread) {
            let arg = self.parse_assign(cx)?;
            Ok(Expr::new(
                ExprKind::Spread(Box::new(arg)),
                self.span_from(start),
            ))
        } else {
            self.parse_assign(cx)
        }
    }

    fn parse_primary(&mut self, cx: Context) -> PResult<Expr> {
        let tok = self.peek();
        let start = tok.span.start;

        let kind = match tok.kind {
            TokenKind::Class => ExprKind::Class(Box::new(self.parse_class(cx, false)?)),
            TokenKind::LBrace => self.parse_object_literal(cx)?,
            TokenKind::StringQuote => ExprKind::String(self.parse_string_raw()?),
            TokenKind::Number => {
                self.advance();
                // `123n` and `1e` are not numbers
                let next = self.raw_peek();
                if matches!(next.kind, TokenKind::Identifier | TokenKind::Number) {
                    return Err(ParseError::unexpected(&next));
                }
                ExprKind::Number(tok.text.to_string())
            }
            TokenKind::True | TokenKind::False => {
                self.advance();
                ExprKind::Bool(tok.kind == TokenKind::True)
            }
            TokenKind::Null => {
                self.advance();
                ExprKind::Null
            }
            TokenKind::TemplateLiteralQuote => ExprKind::Template(self.parse_template_raw(cx)?),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr(cx.with_no_in(false))?;
                self.expect(TokenKind::RParen)?;
                ExprKind::Paren(Box::new(inner))
            }
            TokenKind::Slash | TokenKind::SlashEq => self.parse_regex()?,
            TokenKind::LBracket => self.parse_array_literal(cx)?,
            TokenKind::Identifier => {
                self.advance();
                ExprKind::Ident(tok.text.to_string())
            }
            TokenKind::Function => ExprKind::Function(Box::new(self.parse_function(false, false)?)),
            TokenKind::Async if self.peek_at(1).kind == TokenKind::Function => {
                self.advance();
                let mut func = self.parse_function(true, false)?;
                func.span = self.span_from(start);
                ExprKind::Function(Box::new(func))
            }
            TokenKind::Async => {
                self.advance();
                ExprKind::Ident(tok.text.to_string())
            }
            TokenKind::This => {
                self.advance();
                ExprKind::This
            }
            TokenKind::Super => {
                self.advance();
                ExprKind::Super
            }
            _ => return self.unexpected(),
        };

        Ok(Expr::new(kind, self.span_from(start)))
    }

    fn parse_array_literal(&mut self, cx: Context) -> PResult<ExprKind> {
        self.expect(TokenKind::LBracket)?;
        let cx = cx.with_no_in(false);
        let mut elements = Vec::new();
        loop {
            if self.eat(TokenKind::RBracket) {
                break;
            }
            if self.eat(TokenKind::Comma) {
                elements.push(None);
                continue;
            }
            elements.push(Some(self.parse_spread_or_assign(cx)?));
            if !self.eat(TokenKind::Comma) {
                self.expect(TokenKind::RBracket)?;
                break;
            }
        }
        Ok(ExprKind::Array(elements))
    }

    fn parse_object_literal(&mut self, cx: Context) -> PResult<ExprKind> {
        self.expect(TokenKind::LBrace)?;
        let cx = cx.with_no_in(false);
        let mut props = Vec::new();
        loop {
            if self.eat(TokenKind::RBrace) {
                break;
            }

            let start = self.start();
            let prop = if self.eat(TokenKind::Spread) {
                Property::Spread(self.parse_assign(cx)?)
            } else {
                let shorthand_ok = self.check(TokenKind::Identifier);
                let (kind, is_async, is_generator) = self.parse_method_prefix();
                let key = self.parse_property_key(cx)?;
                let plain = kind == MethodKind::Method && !is_async && !is_generator;

                if !plain || self.check(TokenKind::LParen) {
                    let value = self.parse_method_function(start, is_async, is_generator)?;
                    Property::Method { kind, key, value }
                } else if self.eat(TokenKind::Colon) {
                    let value = self.parse_assign(cx)?;
                    Property::KeyValue { key, value }
                } else {
                    match key {
                        PropertyKey::Ident(name) if shorthand_ok => Property::Shorthand(name),
                        _ => return self.unexpected(),
                    }
                }
            };
            props.push(prop);

            if !self.eat(TokenKind::Comma) {
                self.expect(TokenKind::RBrace)?;
                break;
            }
        }
        Ok(ExprKind::Object(props))
    }

    // =========================================================================
    // Gathered literals
    // =========================================================================

    /// A quoted string, returned exactly as written.
    fn parse_string_raw(&mut self) -> PResult<String> {
        let (first, _) = self.scan_trivia(self.pos);
        let open = self.advance();
        self.gather_string_body(&open)?;
        Ok(self.text_from(first))
    }

    /// Consume up to and including the quote matching `open`.
    fn gather_string_body(&mut self, open: &Token<'a>) -> PResult<()> {
        loop {
            let tok = self.raw_peek();
            match tok.kind {
                TokenKind::EndOfInput | TokenKind::Newline => {
                    return Err(ParseError::unexpected(open));
                }
                TokenKind::Escape => {
                    self.raw_advance();
                    if self.raw_peek().kind == TokenKind::EndOfInput {
                        return Err(ParseError::unexpected(open));
                    }
                    self.raw_advance();
                }
                TokenKind::StringQuote if tok.text == open.text => {
                    self.raw_advance();
                    return Ok(());
                }
                _ => {
                    self.raw_advance();
                }
            }
        }
    }

    /// A template literal, returned exactly as written including backticks.
    fn parse_template_raw(&mut self, cx: Context) -> PResult<String> {
        let (first, _) = self.scan_trivia(self.pos);
        let open = self.advance();
        self.gather_template_body(&open, cx)?;
        Ok(self.text_from(first))
    }

    fn gather_template_body(&mut self, open: &Token<'a>, cx: Context) -> PResult<()> {
        loop {
            let tok = self.raw_peek();
            match tok.kind {
                TokenKind::EndOfInput => return Err(ParseError::unexpected(open)),
                TokenKind::Escape => {
                    self.raw_advance();
                    let escaped = self.raw_advance();
                    if escaped.kind == TokenKind::EndOfInput {
                        return Err(ParseError::unexpected(open));
                    }
                    // Only the first character is escaped: `\n${` lexes
                    // as `\`, `n$`, `{` and still opens a substitution.
                    if escaped.kind == TokenKind::Identifier
                        && escaped.text.len() > 1
                        && escaped.text.ends_with('$')
                        && self.raw_peek().kind == TokenKind::LBrace
                    {
                        self.raw_advance();
                        self.gather_substitution(cx)?;
                    }
                }
                TokenKind::TemplateLiteralQuote => {
                    self.raw_advance();
                    return Ok(());
                }
                // `$` lexes as part of an identifier, so `a${` ends in `$`
                TokenKind::Identifier
                    if tok.text.ends_with('$')
                        && self.token(self.pos + 1).kind == TokenKind::LBrace =>
                {
                    self.raw_advance();
                    self.raw_advance();
                    self.gather_substitution(cx)?;
                }
                _ => {
                    self.raw_advance();
                }
            }
        }
    }

    /// Consume a `${ ... }` body. It is parsed as an expression so that
    /// regexps, strings and nested templates inside it are skipped whole.
    fn gather_substitution(&mut self, cx: Context) -> PResult<()> {
        self.parse_expr(cx.with_no_in(false))?;
        self.expect(TokenKind::RBrace)?;
        Ok(())
    }

    /// A regular expression literal at an operand position.
    fn parse_regex(&mut self) -> PResult<ExprKind> {
        let open = self.advance();
        let body_start = self.pos;
        let mut in_class = false;
        loop {
            let tok = self.raw_peek();
            match tok.kind {
                TokenKind::EndOfInput | TokenKind::Newline => {
                    return Err(ParseError::unexpected(&open));
                }
                TokenKind::Escape => {
                    self.raw_advance();
                    if matches!(
                        self.raw_peek().kind,
                        TokenKind::EndOfInput | TokenKind::Newline
                    ) {
                        return Err(ParseError::unexpected(&open));
                    }
                }
                TokenKind::LBracket => in_class = true,
                TokenKind::RBracket => in_class = false,
                TokenKind::Slash if !in_class => break,
                _ => {}
            }
            self.raw_advance();
        }

        let body = self.text_from(body_start);
        self.raw_advance();

        // `/=` opens a pattern starting with `=`
        let pattern = if open.kind == TokenKind::SlashEq {
            format!("={body}")
        } else {
            body
        };

        let flags = if self.raw_peek().kind == TokenKind::Identifier {
            self.raw_advance().text.to_string()
        } else {
            String::new()
        };

        Ok(ExprKind::Regex { pattern, flags })
    }
}

/// Pop two operands and push their combination.
fn reduce(operands: &mut Vec<Expr>, op: BinaryOp) {
    let (Some(right), Some(left)) = (operands.pop(), operands.pop()) else {
        return;
    };
    let span = left.span.merge(right.span);
    operands.push(Expr::new(
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    ));
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::StarStar => BinaryOp::Pow,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::BangEq => BinaryOp::NotEq,
        TokenKind::EqEqEq => BinaryOp::StrictEq,
        TokenKind::BangEqEq => BinaryOp::StrictNotEq,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::LtEq,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::GtEq => BinaryOp::GtEq,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::Amp => BinaryOp::BitAnd,
        TokenKind::LtLt => BinaryOp::Shl,
        TokenKind::GtGt => BinaryOp::Shr,
        TokenKind::GtGtGt => BinaryOp::UShr,
        TokenKind::AmpAmp => BinaryOp::And,
        TokenKind::PipePipe => BinaryOp::Or,
        TokenKind::In => BinaryOp::In,
        TokenKind::Instanceof => BinaryOp::Instanceof,
        _ => return None,
    })
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    Some(match kind {
        TokenKind::Eq => AssignOp::Assign,
        TokenKind::PlusEq => AssignOp::AddAssign,
        TokenKind::MinusEq => AssignOp::SubAssign,
        TokenKind::StarEq => AssignOp::MulAssign,
        TokenKind::SlashEq => AssignOp::DivAssign,
        TokenKind::PercentEq => AssignOp::ModAssign,
        TokenKind::StarStarEq => AssignOp::PowAssign,
        TokenKind::LtLtEq => AssignOp::ShlAssign,
        TokenKind::GtGtEq => AssignOp::ShrAssign,
        TokenKind::GtGtGtEq => AssignOp::UShrAssign,
        TokenKind::PipeEq => AssignOp::BitOrAssign,
        TokenKind::CaretEq => AssignOp::BitXorAssign,
        TokenKind::AmpEq => AssignOp::BitAndAssign,
        _ => return None,
    })
}
