//! Route aggregation.
//!
//! Every plugin contributes [`RouteConfig`]s. [`load_routes`] merges them into
//! one deterministic tree and derives the lookup tables the client runtime
//! needs:
//!
//! ```text
//! RouteConfig tree ──▶ sort siblings ──▶ pre-order walk
//!                                          │
//!                      ┌───────────────────┼───────────────────────┐
//!                      ▼                   ▼                       ▼
//!                routes_paths      registry (chunk → module)   routes_chunk_names
//! ```
//!
//! Turning the tree into source text is a separate pure step
//! ([`routes_code`], [`registry_code`]) so the tree can be inspected and
//! tested without any string matching.
//!
//! ## Sibling order
//!
//! Siblings sort by path, byte-wise, except that a path which is a prefix of
//! another sorts after it. More specific routes therefore always come first:
//!
//! ```text
//! /docs/next/foo  /docs/next  /docs/foo  /docs  /
//! ```

use crate::url::{chunk_name, docu_hash, encode_component};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("Route '{path}' has no component")]
    MissingComponent { path: String },
}

/// A lazily loaded module reference, or a tree of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Module {
    Path(String),
    Query {
        path: String,
        query: BTreeMap<String, String>,
    },
    List(Vec<Module>),
    Map(BTreeMap<String, Module>),
}

impl Module {
    pub fn path(path: impl Into<String>) -> Self {
        Module::Path(path.into())
    }

    pub fn with_query(path: impl Into<String>, query: &[(&str, &str)]) -> Self {
        Module::Query {
            path: path.into(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Import specifier of a leaf module: the path plus its encoded query.
fn import_path(path: &str, query: &BTreeMap<String, String>) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let query: Vec<String> = query
        .iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect();
    format!("{path}?{}", query.join("&"))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteConfig {
    pub path: String,
    pub component: String,
    /// Leaf routes match exactly; parents match their whole subtree.
    pub exact: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub modules: BTreeMap<String, Module>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<RouteConfig>,
    /// Inline metadata, written to its own artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl RouteConfig {
    /// A leaf route with an exact match.
    pub fn leaf(path: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            component: component.into(),
            exact: true,
            ..Self::default()
        }
    }

    pub fn module(mut self, key: &str, module: Module) -> Self {
        self.modules.insert(key.to_string(), module);
        self
    }
}

/// An entry of the chunk registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    /// Dynamic import expression for the chunk.
    pub loader: String,
    pub module_path: String,
}

/// Output of [`load_routes`]. All maps iterate in key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedRoutes {
    pub tree: Vec<RouteConfig>,
    /// Every route path, pre-order over the sorted tree.
    pub routes_paths: Vec<String>,
    /// Route path → `@generated/metadata/<hash>.json`, for routes with inline metadata.
    pub routes_metadata_path: BTreeMap<String, String>,
    pub routes_metadata: BTreeMap<String, serde_json::Value>,
    pub registry: BTreeMap<String, RegistryEntry>,
    /// Route path → chunk names of its component, modules and metadata.
    pub routes_chunk_names: BTreeMap<String, serde_json::Value>,
}

/// Byte-wise order in which end-of-string sorts after every byte.
fn route_order(a: &str, b: &str) -> Ordering {
    let key = |s: &str| -> Vec<u16> {
        s.bytes()
            .map(u16::from)
            .chain(std::iter::once(u16::MAX))
            .collect()
    };
    key(a).cmp(&key(b))
}

fn sort_routes(routes: &mut [RouteConfig]) {
    routes.sort_by(|a, b| route_order(&a.path, &b.path));
    for route in routes.iter_mut() {
        sort_routes(&mut route.routes);
    }
}

/// Path of the metadata artifact of a route.
pub fn metadata_path(route_path: &str) -> String {
    format!("@generated/metadata/{}.json", docu_hash(route_path))
}

fn loader(chunk: &str, module_path: &str) -> String {
    let specifier = js_string(module_path);
    format!("() => import(/* webpackChunkName: '{chunk}' */ {specifier})")
}

struct Collector {
    loaded: LoadedRoutes,
    seen: HashSet<String>,
}

impl Collector {
    fn register(&mut self, module_path: String, prefix: &str, name: Option<&str>) -> String {
        let chunk = chunk_name(&module_path, prefix, name);
        self.loaded.registry.insert(
            chunk.clone(),
            RegistryEntry {
                loader: loader(&chunk, &module_path),
                module_path,
            },
        );
        chunk
    }

    fn chunk_tree(&mut self, module: &Module, route_path: &str) -> serde_json::Value {
        match module {
            Module::List(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|item| self.chunk_tree(item, route_path))
                    .collect(),
            ),
            Module::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(key, item)| (key.clone(), self.chunk_tree(item, route_path)))
                    .collect(),
            ),
            Module::Path(path) => {
                serde_json::Value::String(self.register(path.clone(), "module", Some(route_path)))
            }
            Module::Query { path, query } => serde_json::Value::String(self.register(
                import_path(path, query),
                "module",
                Some(route_path),
            )),
        }
    }

    fn visit(&mut self, route: &RouteConfig) -> Result<(), RouteError> {
        let path = &route.path;
        if route.component.is_empty() {
            return Err(RouteError::MissingComponent { path: path.clone() });
        }
        if !self.seen.insert(path.clone()) {
            tracing::warn!(path = %path, "Duplicate route path");
        }
        self.loaded.routes_paths.push(path.clone());

        let mut chunks = serde_json::Map::new();
        let component = self.register(route.component.clone(), "component", None);
        chunks.insert("component".into(), component.into());
        for (key, module) in &route.modules {
            let tree = self.chunk_tree(module, path);
            chunks.insert(key.clone(), tree);
        }
        if let Some(metadata) = &route.metadata {
            let artifact = metadata_path(path);
            let chunk = self.register(artifact.clone(), "metadata", Some(path));
            chunks.insert("metadata".into(), chunk.into());
            self.loaded
                .routes_metadata_path
                .insert(path.clone(), artifact);
            self.loaded
                .routes_metadata
                .insert(path.clone(), metadata.clone());
        }
        self.loaded
            .routes_chunk_names
            .insert(path.clone(), serde_json::Value::Object(chunks));

        for child in &route.routes {
            self.visit(child)?;
        }
        Ok(())
    }
}

/// Merge plugin routes into one sorted tree and derive its lookup tables.
pub fn load_routes(mut routes: Vec<RouteConfig>) -> Result<LoadedRoutes, RouteError> {
    sort_routes(&mut routes);
    let mut collector = Collector {
        loaded: LoadedRoutes::default(),
        seen: HashSet::new(),
    };
    for route in &routes {
        collector.visit(route)?;
    }
    collector.loaded.tree = routes;
    tracing::debug!(
        routes = collector.loaded.routes_paths.len(),
        chunks = collector.loaded.registry.len(),
        "Loaded routes"
    );
    Ok(collector.loaded)
}

/// A JSON string literal is a valid JS string literal.
fn js_string(value: &str) -> String {
    serde_json::to_string(value).expect("a str always serializes to JSON")
}

fn route_code(route: &RouteConfig, depth: usize, out: &mut String) {
    let pad = "  ".repeat(depth);
    let path = js_string(&route.path);
    out.push_str(&format!("{pad}{{\n"));
    out.push_str(&format!("{pad}  path: {path},\n"));
    if route.routes.is_empty() {
        out.push_str(&format!("{pad}  exact: {},\n", route.exact));
        out.push_str(&format!("{pad}  component: ComponentCreator({path}),\n"));
    } else {
        out.push_str(&format!("{pad}  component: ComponentCreator({path}),\n"));
        out.push_str(&format!("{pad}  routes: [\n"));
        for child in &route.routes {
            route_code(child, depth + 2, out);
        }
        out.push_str(&format!("{pad}  ],\n"));
    }
    out.push_str(&format!("{pad}}},\n"));
}

/// Source of `routes.js`: the route tree followed by the catch-all route.
pub fn routes_code(tree: &[RouteConfig]) -> String {
    let mut out = String::from(
        "import React from 'react';\n\
         import NotFound from '@theme/NotFound';\n\
         import ComponentCreator from '@docweave/ComponentCreator';\n\
         \n\
         export default [\n",
    );
    for route in tree {
        route_code(route, 1, &mut out);
    }
    out.push_str("  {\n    path: '*',\n    component: NotFound,\n  },\n];\n");
    out
}

/// Source of `registry.js`: chunk name → loader, module path, weak resolve.
pub fn registry_code(registry: &BTreeMap<String, RegistryEntry>) -> String {
    let mut out = String::from("export default {\n");
    for (chunk, entry) in registry {
        let module = js_string(&entry.module_path);
        out.push_str(&format!(
            "  '{chunk}': [{}, {module}, require.resolveWeak({module})],\n",
            entry.loader
        ));
    }
    out.push_str("};\n");
    out
}
