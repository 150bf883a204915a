//! `jsbundle check` command implementation.
//!
//! Runs single files through the compiler without bundling.

use jsbundle_parser::{load_file, LoadedModule};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct CheckResultJson {
    ok: bool,
    files: Vec<FileResultJson>,
}

#[derive(Serialize)]
struct FileResultJson {
    path: String,
    ok: bool,
    imports: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Run the check command.
pub fn run(cwd: &Path, files: &[String], print: bool, json: bool) -> Result<()> {
    let results: Vec<FileResultJson> = files.iter().map(|file| check_file(cwd, file, print)).collect();
    let ok = results.iter().all(|r| r.ok);

    if json {
        let result = CheckResultJson { ok, files: results };
        println!("{}", serde_json::to_string(&result).into_diagnostic()?);
    } else {
        for result in &results {
            if let Some(error) = &result.error {
                eprintln!("{error}");
                continue;
            }
            println!("{} ({} imports)", result.path, result.imports.len());
            for import in &result.imports {
                println!("  -> {import}");
            }
            if let Some(code) = &result.code {
                println!("{code}");
            }
        }
    }

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn check_file(cwd: &Path, file: &str, print: bool) -> FileResultJson {
    let normalized = file.replace('\\', "/");
    let path = normalized.strip_prefix("./").unwrap_or(&normalized).to_string();

    let loaded = match std::fs::read(cwd.join(&path)) {
        Ok(source) => load_file(&source, &path).map_err(|e| e.to_string()),
        Err(_) => Err(format!("Error loading file {path}:\nCannot find file")),
    };

    match loaded {
        Ok(LoadedModule { code, imports }) => FileResultJson {
            path,
            ok: true,
            imports,
            code: print.then(|| String::from_utf8_lossy(&code).into_owned()),
            error: None,
        },
        Err(error) => {
            tracing::debug!(path = %path, "check failed");
            FileResultJson {
                path,
                ok: false,
                imports: Vec::new(),
                code: None,
                error: Some(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_check_reports_imports() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(
            dir.path().join("src/app.js"),
            "import x from './x';\nexport default x;",
        )
        .unwrap();

        let result = check_file(dir.path(), "./src/app.js", true);
        assert!(result.ok);
        assert_eq!(result.path, "src/app.js");
        assert_eq!(result.imports, vec!["src/x.js"]);
        assert!(result
            .code
            .unwrap()
            .starts_with("moduleFns.src_app_js=function(){"));
    }

    #[test]
    fn test_check_renders_parse_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("bad.js"), "foo(;").unwrap();

        let result = check_file(dir.path(), "bad.js", false);
        assert!(!result.ok);
        assert!(result
            .error
            .unwrap()
            .starts_with("Error loading file bad.js:\nUnexpected token ';' at 1:5"));
    }

    #[test]
    fn test_check_missing_file() {
        let dir = tempdir().unwrap();
        let result = check_file(dir.path(), "nope.js", false);
        assert_eq!(
            result.error.as_deref(),
            Some("Error loading file nope.js:\nCannot find file")
        );
    }
}
