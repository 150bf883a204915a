//! Integration tests for the bundler over a temporary project.

use jsbundle_core::bundler::{Bundler, CACHE_FILE_NAME};
use jsbundle_core::{BundleConfig, Error};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use tempfile::{tempdir, TempDir};

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempdir().unwrap();
    for (path, contents) in files {
        let full = dir.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, contents).unwrap();
    }
    dir
}

fn config(entry: &str) -> BundleConfig {
    BundleConfig {
        entry: entry.to_string(),
        ..BundleConfig::default()
    }
}

#[test]
fn test_bundle_links_modules_in_dependency_order() {
    let dir = project(&[
        (
            "src/index.js",
            "import { greet } from './greet';\nconst util = require('./util/index.js');\ngreet(util.name);",
        ),
        ("src/greet.js", "export function greet(n) { return 'hi ' + n; }"),
        ("src/util/index.js", "exports.name = 'world';"),
    ]);

    let mut bundler = Bundler::new(dir.path(), config("src/index.js"));
    let output = bundler.build().unwrap();

    assert_eq!(
        output.modules,
        vec!["src/index.js", "src/greet.js", "src/util/index.js"]
    );
    assert!(output.warnings.is_empty());
    assert_eq!(output.outfile, dir.path().join("build").join("bundle.js"));
    assert_eq!(std::fs::read_to_string(&output.outfile).unwrap(), output.code);

    assert!(output.code.starts_with("(function(){var moduleFns={},modules={},process={env:{\"NODE_ENV\":\"development\"}};"));
    assert!(output
        .code
        .contains("var greet=requireES6(modules.src_greet_js,'greet');"));
    assert!(output
        .code
        .contains("const util=require(modules.src_util_index_js);"));
    assert!(output.code.ends_with(
        "modules.src_greet_js=moduleFns.src_greet_js();\
         modules.src_util_index_js=moduleFns.src_util_index_js();\
         modules.src_index_js=moduleFns.src_index_js();\n})();\n"
    ));
}

#[test]
fn test_assets_are_copied() {
    let dir = project(&[
        ("index.js", "import logo from './img/logo.png';\nshow(logo);"),
        ("img/logo.png", "PNG"),
    ]);

    let mut bundler = Bundler::new(dir.path(), BundleConfig::default());
    let output = bundler.build().unwrap();

    assert_eq!(output.assets, vec!["img_logo_png.png"]);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("build/img_logo_png.png")).unwrap(),
        "PNG"
    );
    assert!(output.code.contains(
        "moduleFns.img_logo_png=function(){return {exports:'img_logo_png.png',es6:{default:'img_logo_png.png'},hasES6Exports:true};};"
    ));
}

#[test]
fn test_all_failures_are_reported() {
    let dir = project(&[
        ("index.js", "import a from './a';\nimport b from './b';\nimport c from './missing';"),
        ("a.js", "export default 1;"),
        ("b.js", "let = ;"),
    ]);

    let mut bundler = Bundler::new(dir.path(), BundleConfig::default());
    let errors = bundler.build().unwrap_err();

    assert_eq!(errors.len(), 2);
    let message = errors.to_string();
    assert!(message.contains("Error loading file b.js:\nUnexpected token"), "{message}");
    assert!(message.contains("Error loading file missing.js:\nCannot find file"), "{message}");
    assert!(!dir.path().join("build/bundle.js").exists());
}

#[test]
fn test_module_id_collision_is_an_error() {
    let dir = project(&[
        ("index.js", "import './a.b/c';\nimport './a_b/c';"),
        ("a.b/c.js", ""),
        ("a_b/c.js", ""),
    ]);

    let mut bundler = Bundler::new(dir.path(), BundleConfig::default());
    let errors = bundler.build().unwrap_err();
    assert!(matches!(
        errors.errors.as_slice(),
        [Error::ModuleIdCollision { id, .. }] if id == "a_b_c_js"
    ));
}

#[test]
fn test_cycles_are_bundled_with_warning() {
    let dir = project(&[
        ("index.js", "import './a';"),
        ("a.js", "import './b';"),
        ("b.js", "import './a';"),
    ]);

    let mut bundler = Bundler::new(dir.path(), BundleConfig::default());
    let output = bundler.build().unwrap();
    assert_eq!(output.modules.len(), 3);
    assert_eq!(output.warnings.len(), 1);
    assert!(output.warnings[0].contains("a.js"));
}

#[test]
fn test_html_template_injection() {
    let dir = project(&[
        ("index.js", "start();"),
        ("public/index.html", "<html>\n<body>\n</body>\n</html>"),
    ]);

    let mut config = BundleConfig::default();
    config.template_html = "public/index.html".to_string();
    let mut bundler = Bundler::new(dir.path(), config);
    let output = bundler.build().unwrap();

    let html = output.html.unwrap();
    assert_eq!(html, dir.path().join("build/index.html"));
    assert_eq!(
        std::fs::read_to_string(html).unwrap(),
        "<html>\n<body>\n  <script src=\"bundle.js\"></script>\n</body>\n</html>"
    );
}

#[test]
fn test_permanent_cache_is_written_and_reused() {
    let dir = project(&[("index.js", "import x from './x';"), ("x.js", "export default 2;")]);

    let mut config = BundleConfig::default();
    config.permanent_cache.enable = true;

    let first = Bundler::new(dir.path(), config.clone()).build().unwrap();
    let cache_file = dir.path().join(".jsbundle-cache").join(CACHE_FILE_NAME);
    assert!(cache_file.exists());

    let cache: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&cache_file).unwrap()).unwrap();
    assert!(cache["files"]["x.js"]["code"].is_string());

    let second = Bundler::new(dir.path(), config).build().unwrap();
    assert_eq!(first.code, second.code);
}

#[test]
fn test_watch_stops_when_requested() {
    let dir = project(&[("index.js", "a();")]);
    let stop = AtomicBool::new(true);
    let mut builds = 0;

    let mut bundler = Bundler::new(dir.path(), BundleConfig::default());
    bundler.watch(&stop, |result| {
        assert!(result.is_ok());
        builds += 1;
    })
    .unwrap();
    assert_eq!(builds, 1);
    assert_eq!(bundler.reachable(), ["index.js"]);
}

#[test]
fn test_watch_rebuilds_after_reachable_file_changes() {
    let dir = project(&[
        ("index.js", "require('./a');"),
        ("a.js", "first();"),
        ("notes.txt", "draft"),
    ]);
    let root = dir.path().to_path_buf();
    let stop = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel();

    let handle = {
        let stop = Arc::clone(&stop);
        std::thread::spawn(move || {
            let mut bundler = Bundler::new(root, BundleConfig::default());
            bundler.watch(&stop, |result| {
                let code = result.as_ref().map(|output| output.code.clone());
                tx.send(code.map_err(ToString::to_string)).unwrap();
            })
        })
    };

    let first = rx.recv_timeout(Duration::from_secs(10)).unwrap().unwrap();
    assert!(first.contains("first()"));

    // Neither the written bundle nor an unreachable file triggers a build.
    std::fs::write(dir.path().join("notes.txt"), "final").unwrap();
    assert!(rx.recv_timeout(Duration::from_millis(500)).is_err());

    std::fs::write(dir.path().join("a.js"), "second();").unwrap();
    let second = rx.recv_timeout(Duration::from_secs(10)).unwrap().unwrap();
    assert!(second.contains("second()"));

    stop.store(true, Ordering::Relaxed);
    handle.join().unwrap().unwrap();
}

#[test]
fn test_missing_entry() {
    let dir = tempdir().unwrap();
    let mut bundler = Bundler::new(dir.path(), config("./src/main.js"));
    let errors = bundler.build().unwrap_err();
    assert_eq!(
        errors.to_string(),
        "Error loading file src/main.js:\nCannot find file"
    );
    assert!(Path::new(&dir.path().join("build")).is_dir());
}
