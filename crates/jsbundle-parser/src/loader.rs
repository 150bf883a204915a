//! Whole-file pipeline: lex, parse, rewrite and print one module.

use crate::codegen::print;
use crate::lexer::lex;
use crate::parser::{parse, ParseError};
use crate::rewrite::rewrite;
use std::fmt;

/// A module rewritten into bundle form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    /// Minified module factory.
    pub code: Vec<u8>,
    /// Resolved paths of everything the module imports, in source order.
    pub imports: Vec<String>,
}

/// A module that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub path: String,
    pub error: ParseError,
    /// The rendered error with the offending source line and a caret.
    pub rendered: String,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error loading file {}:\n{}", self.path, self.rendered)
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Run the full pipeline over one source file.
///
/// Invalid UTF-8 is replaced rather than rejected; the lexer treats the
/// replacement characters as ordinary unknown characters.
pub fn load_file(source: &[u8], path: &str) -> Result<LoadedModule, LoadError> {
    let text = String::from_utf8_lossy(source);
    let tokens = lex(&text);
    let program = parse(&tokens).map_err(|error| LoadError {
        path: path.to_string(),
        rendered: error.render(&text),
        error,
    })?;
    let (program, imports) = rewrite(program, path);
    Ok(LoadedModule {
        code: print(&program).into_bytes(),
        imports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_file() {
        let module = load_file(b"import foo from './bar';\nfoo();", "src/a.js").unwrap();
        assert_eq!(
            String::from_utf8(module.code).unwrap(),
            "moduleFns.src_a_js=function(){var module={exports:{},es6:{},hasES6Exports:false};\
             var foo=requireES6(modules.src_bar_js,'default');foo();return module;};"
        );
        assert_eq!(module.imports, vec!["src/bar.js"]);
    }

    #[test]
    fn test_load_error_names_the_file() {
        let err = load_file(b"let x = 1;\nfoo(;\n", "src/a.js").unwrap_err();
        assert_eq!((err.error.line, err.error.column), (2, 5));
        assert_eq!(
            err.to_string(),
            "Error loading file src/a.js:\nUnexpected token ';' at 2:5\n   2 foo(;\n         ^"
        );
    }

    #[test]
    fn test_invalid_utf8_is_tolerated() {
        let module = load_file(b"var s = '\xff';", "a.js").unwrap();
        let code = String::from_utf8(module.code).unwrap();
        assert!(code.contains("var s='\u{fffd}';"));
    }
}
