//! jsbundle-parser: JavaScript module compiler core
//!
//! Turns one ES module or CommonJS source file into a minified module
//! factory a bundle can register and invoke.
//!
//! # Pipeline
//!
//! 1. **Lex** ([`lex`]): raw tokens, one per operator, word, quote,
//!    whitespace run or unknown character. Total; never fails.
//! 2. **Parse** ([`parse`]): recursive descent into a typed AST. String,
//!    template and regexp bodies are gathered back from raw tokens here.
//! 3. **Rewrite** ([`rewrite`]): `import`/`export`/`require` become
//!    lookups against the bundle's `modules` table.
//! 4. **Print** ([`print`]): minified JavaScript.
//!
//! Each phase is a pure function, so files can be processed in parallel.
//!
//! # Example
//!
//! ```
//! use jsbundle_parser::load_file;
//!
//! let module = load_file(b"import foo from './bar';", "a.js").unwrap();
//! assert_eq!(module.imports, vec!["bar.js"]);
//! ```

mod ast;
mod codegen;
mod lexer;
mod loader;
mod parser;
mod rewrite;
mod span;
mod token;

// Re-exports
pub use ast::*;
pub use codegen::{print, Codegen};
pub use lexer::{lex, Lexer};
pub use loader::{load_file, LoadError, LoadedModule};
pub use parser::{parse, ParseError, Parser};
pub use rewrite::{create_var_name_from_path, resolve_import_path, rewrite};
pub use span::{LineIndex, Span};
pub use token::{OpInfo, Token, TokenKind};
