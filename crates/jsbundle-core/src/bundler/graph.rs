//! Module dependency graph.
//!
//! Tracks loaded modules, their import edges, and the module ids they
//! are registered under in the bundle.

use crate::error::Error;
use jsbundle_parser::create_var_name_from_path;
use rustc_hash::FxHashMap as HashMap;
use std::collections::VecDeque;

/// Index of a module in the graph.
pub type ModuleId = usize;

/// How a module was loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    /// JavaScript, compiled through the parser pipeline.
    Script,
    /// Any other file, copied to the output directory.
    Asset,
}

/// A module in the dependency graph.
#[derive(Debug, Clone)]
pub struct Module {
    /// Slash-separated path relative to the project root.
    pub path: String,
    /// Identifier the module is registered under (`moduleFns.<var_name>`).
    pub var_name: String,
    /// Emitted module factory.
    pub code: String,
    /// Resolved import paths, in source order.
    pub imports: Vec<String>,
    pub kind: ModuleKind,
    /// Modules this one imports, filled in by [`ModuleGraph::link`].
    pub dependencies: Vec<ModuleId>,
}

impl Module {
    pub fn new(path: impl Into<String>, code: String, imports: Vec<String>, kind: ModuleKind) -> Self {
        let path = path.into();
        Self {
            var_name: create_var_name_from_path(&path),
            path,
            code,
            imports,
            kind,
            dependencies: Vec::new(),
        }
    }
}

/// Result of ordering the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopoOrder {
    /// Every module, dependencies before dependents where possible.
    pub order: Vec<ModuleId>,
    /// Modules on or behind an import cycle, appended in discovery order.
    pub cyclic: Vec<ModuleId>,
}

/// The module dependency graph.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    /// All modules, in discovery order.
    modules: Vec<Module>,
    /// Path to ID mapping for deduplication.
    path_to_id: HashMap<String, ModuleId>,
    /// Module id to the first path registered under it.
    var_names: HashMap<String, ModuleId>,
}

impl ModuleGraph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module, returning its ID.
    ///
    /// A path that was already added returns the existing ID. A different
    /// path that maps to an existing module id is rejected.
    pub fn add(&mut self, module: Module) -> Result<ModuleId, Error> {
        if let Some(&id) = self.path_to_id.get(&module.path) {
            return Ok(id);
        }
        if let Some(&other) = self.var_names.get(&module.var_name) {
            return Err(Error::ModuleIdCollision {
                id: module.var_name,
                first: self.modules[other].path.clone(),
                second: module.path,
            });
        }

        let id = self.modules.len();
        self.path_to_id.insert(module.path.clone(), id);
        self.var_names.insert(module.var_name.clone(), id);
        self.modules.push(module);
        Ok(id)
    }

    /// Get a module by ID.
    #[must_use]
    pub fn get(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(id)
    }

    /// Get module ID by path.
    #[must_use]
    pub fn id_by_path(&self, path: &str) -> Option<ModuleId> {
        self.path_to_id.get(path).copied()
    }

    /// Number of modules in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if graph is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Resolve every module's imports to dependency edges.
    ///
    /// Imports that were never added are skipped; duplicates collapse.
    pub fn link(&mut self) {
        for i in 0..self.modules.len() {
            let mut deps: Vec<ModuleId> = Vec::new();
            for import in &self.modules[i].imports {
                if let Some(&dep) = self.path_to_id.get(import) {
                    if !deps.contains(&dep) {
                        deps.push(dep);
                    }
                }
            }
            self.modules[i].dependencies = deps;
        }
    }

    /// Order modules so dependencies come before dependents.
    #[must_use]
    pub fn toposort(&self) -> TopoOrder {
        let n = self.modules.len();

        // Build adjacency list and in-degree count
        let mut in_degree = vec![0usize; n];
        let mut adj: Vec<Vec<ModuleId>> = vec![Vec::new(); n];

        for (id, module) in self.modules.iter().enumerate() {
            for &dep_id in &module.dependencies {
                adj[dep_id].push(id);
                in_degree[id] += 1;
            }
        }

        // Kahn's algorithm
        let mut queue: VecDeque<ModuleId> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &deg)| deg == 0)
            .map(|(id, _)| id)
            .collect();

        let mut order = Vec::with_capacity(n);
        let mut placed = vec![false; n];
        while let Some(id) = queue.pop_front() {
            order.push(id);
            placed[id] = true;
            for &next in &adj[id] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    queue.push_back(next);
                }
            }
        }

        // Whatever is left sits on a cycle
        let cyclic: Vec<ModuleId> = (0..n).filter(|&id| !placed[id]).collect();
        order.extend(&cyclic);

        TopoOrder { order, cyclic }
    }

    /// Iterate over all modules in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (ModuleId, &Module)> {
        self.modules.iter().enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(path: &str, imports: &[&str]) -> Module {
        Module::new(
            path,
            String::new(),
            imports.iter().map(|s| (*s).to_string()).collect(),
            ModuleKind::Script,
        )
    }

    #[test]
    fn test_empty_graph() {
        let graph = ModuleGraph::new();
        assert!(graph.is_empty());
        assert_eq!(graph.toposort().order, Vec::<ModuleId>::new());
    }

    #[test]
    fn test_add_deduplicates_paths() {
        let mut graph = ModuleGraph::new();
        let a = graph.add(script("src/a.js", &[])).unwrap();
        let again = graph.add(script("src/a.js", &[])).unwrap();
        assert_eq!(a, again);
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.get(a).unwrap().var_name, "src_a_js");
    }

    #[test]
    fn test_module_id_collision() {
        let mut graph = ModuleGraph::new();
        graph.add(script("a.b/c.js", &[])).unwrap();
        let err = graph.add(script("a_b/c.js", &[])).unwrap_err();
        assert!(matches!(
            err,
            Error::ModuleIdCollision { ref id, ref first, ref second }
                if id == "a_b_c_js" && first == "a.b/c.js" && second == "a_b/c.js"
        ));
    }

    #[test]
    fn test_toposort_linear() {
        let mut graph = ModuleGraph::new();

        // index imports b imports c
        graph.add(script("index.js", &["b.js"])).unwrap();
        graph.add(script("b.js", &["c.js", "c.js"])).unwrap();
        graph.add(script("c.js", &[])).unwrap();
        graph.link();

        let topo = graph.toposort();
        assert_eq!(topo.order, vec![2, 1, 0]);
        assert!(topo.cyclic.is_empty());
    }

    #[test]
    fn test_toposort_cycle_appended() {
        let mut graph = ModuleGraph::new();
        graph.add(script("index.js", &["a.js", "leaf.js"])).unwrap();
        graph.add(script("a.js", &["b.js"])).unwrap();
        graph.add(script("b.js", &["a.js"])).unwrap();
        graph.add(script("leaf.js", &[])).unwrap();
        graph.link();

        let topo = graph.toposort();
        assert_eq!(topo.order, vec![3, 0, 1, 2]);
        assert_eq!(topo.cyclic, vec![0, 1, 2]);
    }

    #[test]
    fn test_link_skips_unknown_imports() {
        let mut graph = ModuleGraph::new();
        graph.add(script("index.js", &["missing.js"])).unwrap();
        graph.link();
        assert!(graph.get(0).unwrap().dependencies.is_empty());
    }
}
