//! Bundle output.
//!
//! A bundle is one IIFE holding:
//!
//! 1. The runtime: `moduleFns`, `modules`, `process.env`, `require` and
//!    `requireES6`.
//! 2. Every module factory, in discovery order.
//! 3. Instantiation of each module in dependency order, entry last.

use super::graph::{ModuleGraph, ModuleId};
use rustc_hash::FxHashMap as HashMap;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Module runtime. `requireES6` falls back to the CommonJS `exports`
/// bag for modules without ES exports.
const RUNTIME: &str = "function require(m){return m.exports;}\
function requireES6(m,name){\
if(m.hasES6Exports)return name==='*'?m.es6:m.es6[name];\
return name==='*'||name==='default'?m.exports:m.exports[name];}";

/// Bundle head: opens the IIFE and defines the runtime.
#[must_use]
pub fn prelude(env: &HashMap<String, String>) -> String {
    let env: BTreeMap<&str, &str> = env.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    let env_json = serde_json::to_string(&env).unwrap_or_else(|_| "{}".to_string());
    format!("(function(){{var moduleFns={{}},modules={{}},process={{env:{env_json}}};{RUNTIME}\n")
}

/// Bundle tail: instantiates modules in `order`, then the entry, and
/// closes the IIFE.
#[must_use]
pub fn epilogue(graph: &ModuleGraph, order: &[ModuleId], entry: ModuleId) -> String {
    let mut out = String::new();
    for &id in order.iter().filter(|&&id| id != entry) {
        if let Some(module) = graph.get(id) {
            let _ = write!(out, "modules.{0}=moduleFns.{0}();", module.var_name);
        }
    }
    if let Some(module) = graph.get(entry) {
        let _ = write!(out, "modules.{0}=moduleFns.{0}();", module.var_name);
    }
    out.push_str("\n})();\n");
    out
}

/// Assemble the full bundle.
#[must_use]
pub fn emit_bundle(
    graph: &ModuleGraph,
    order: &[ModuleId],
    entry: ModuleId,
    env: &HashMap<String, String>,
) -> String {
    let mut out = prelude(env);
    for (_, module) in graph.iter() {
        out.push_str(&module.code);
        out.push('\n');
    }
    out.push_str(&epilogue(graph, order, entry));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::graph::{Module, ModuleKind};

    fn env() -> HashMap<String, String> {
        let mut env = HashMap::default();
        env.insert("NODE_ENV".to_string(), "production".to_string());
        env.insert("API".to_string(), "x\"y".to_string());
        env
    }

    #[test]
    fn test_prelude_defines_runtime() {
        let head = prelude(&env());
        assert!(head.starts_with(
            "(function(){var moduleFns={},modules={},process={env:{\"API\":\"x\\\"y\",\"NODE_ENV\":\"production\"}};"
        ));
        assert!(head.contains("function require(m){return m.exports;}"));
        assert!(head.contains("function requireES6(m,name){"));
    }

    #[test]
    fn test_emit_bundle_orders_instantiation() {
        let mut graph = ModuleGraph::new();
        let entry = graph
            .add(Module::new(
                "index.js",
                "moduleFns.index_js=function(){};".into(),
                vec!["lib.js".into()],
                ModuleKind::Script,
            ))
            .unwrap();
        graph
            .add(Module::new(
                "lib.js",
                "moduleFns.lib_js=function(){};".into(),
                Vec::new(),
                ModuleKind::Script,
            ))
            .unwrap();
        graph.link();
        let topo = graph.toposort();

        let bundle = emit_bundle(&graph, &topo.order, entry, &HashMap::default());
        let lines: Vec<_> = bundle.lines().collect();
        assert_eq!(lines[1], "moduleFns.index_js=function(){};");
        assert_eq!(lines[2], "moduleFns.lib_js=function(){};");
        assert_eq!(
            lines[3],
            "modules.lib_js=moduleFns.lib_js();modules.index_js=moduleFns.index_js();"
        );
        assert_eq!(lines[4], "})();");
    }
}
