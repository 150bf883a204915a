//! `jsbundle version` command implementation.

use jsbundle_core::version::version_string;
use jsbundle_core::VERSION;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

#[derive(Serialize)]
struct VersionJson {
    name: &'static str,
    version: &'static str,
}

pub fn run(json: bool) -> Result<()> {
    if json {
        let out = VersionJson {
            name: "jsbundle",
            version: VERSION,
        };
        println!("{}", serde_json::to_string(&out).into_diagnostic()?);
    } else {
        println!("{}", version_string());
    }
    Ok(())
}
