//! HTML template injection.

use crate::error::Error;
use std::path::{Path, PathBuf};

/// Insert a `<script>` tag for `script_name` on its own line before the
/// first line that starts with `</body`. Returns `None` when there is no
/// such line.
#[must_use]
pub fn inject_script(template: &str, script_name: &str) -> Option<String> {
    let index = template.find("\n</body")?;
    Some(format!(
        "{}\n  <script src=\"{script_name}\"></script>\n{}",
        &template[..index],
        &template[index + 1..]
    ))
}

/// Render `template_path` with the bundle script and write it to
/// `out_dir/index.html`.
pub fn write_index_html(template_path: &Path, out_dir: &Path, script_name: &str) -> Result<PathBuf, Error> {
    let template = std::fs::read_to_string(template_path).map_err(|e| Error::Template {
        path: template_path.to_path_buf(),
        message: e.to_string(),
    })?;
    let html = inject_script(&template, script_name).ok_or_else(|| Error::Template {
        path: template_path.to_path_buf(),
        message: "can't find the end of <body>".to_string(),
    })?;

    std::fs::create_dir_all(out_dir)?;
    let out = out_dir.join("index.html");
    std::fs::write(&out, html)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_inject_before_body_end() {
        let template = "<html>\n<body>\n  <div id=\"app\"></div>\n</body>\n</html>\n";
        assert_eq!(
            inject_script(template, "bundle.js").unwrap(),
            "<html>\n<body>\n  <div id=\"app\"></div>\n  <script src=\"bundle.js\"></script>\n</body>\n</html>\n"
        );
    }

    #[test]
    fn test_inline_body_end_is_not_found() {
        assert!(inject_script("<html><body></body></html>", "bundle.js").is_none());
    }

    #[test]
    fn test_write_index_html() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("index.html");
        std::fs::write(&template, "<body>\n</body>").unwrap();

        let out = write_index_html(&template, &dir.path().join("build"), "bundle.js").unwrap();
        assert_eq!(
            std::fs::read_to_string(out).unwrap(),
            "<body>\n  <script src=\"bundle.js\"></script>\n</body>"
        );
    }

    #[test]
    fn test_missing_template_is_template_error() {
        let dir = tempdir().unwrap();
        let err = write_index_html(&dir.path().join("nope.html"), dir.path(), "bundle.js").unwrap_err();
        assert!(matches!(err, Error::Template { .. }));
    }
}
