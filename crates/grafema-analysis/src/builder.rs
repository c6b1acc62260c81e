//! Turns one file's [`Collections`] into graph nodes/edges and commits
//! them atomically.
//!
//! Buffering happens per file: nothing in [`FileBatch`] reaches the
//! shared [`Graph`] until [`FileBatch::commit`] is called, so a file
//! that fails partway through never leaves half-written state behind.

use crate::collections::{CallKind, Collections, MutationMethod, ValueKind};
use crate::walker::KNOWN_CALLBACK_INVOKERS;
use grafema_core::identity::singletons;
use grafema_core::{file_class::Language, EdgeType, GraphEdge, GraphNode, NodeId, NodeType, SymbolTable};
use std::collections::HashSet;

/// Buffered nodes/edges for one file, not yet visible to queries.
#[derive(Default)]
pub struct FileBatch {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl FileBatch {
    pub fn begin() -> Self {
        FileBatch::default()
    }

    pub fn add_node(&mut self, node: GraphNode) {
        self.nodes.push(node);
    }

    pub fn add_edge(&mut self, edge: GraphEdge) {
        self.edges.push(edge);
    }

    /// Apply everything buffered to `graph`. Dangling edges (endpoint not
    /// yet inserted, e.g. a call to a function in a file not yet indexed)
    /// are dropped by `Graph::add_edge` itself and surfaced by the caller
    /// as a diagnostic, not a hard failure.
    pub fn commit(self, graph: &mut grafema_core::Graph) -> usize {
        for node in self.nodes {
            graph.add_node(node);
        }
        let mut dropped = 0;
        for edge in self.edges {
            if graph.add_edge(edge).is_none() {
                dropped += 1;
            }
        }
        dropped
    }

    /// Discard everything buffered for this file without touching the
    /// graph: a file whose walk failed contributes nothing.
    pub fn abort(self) {}
}

/// Cross-file import resolution plus the per-file translation from
/// collected records to graph nodes/edges.
pub struct GraphBuilder<'a> {
    symbols: &'a SymbolTable,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        GraphBuilder { symbols }
    }

    /// Build one file's batch. `language` picks the `MODULE` node type;
    /// non-JS/TS files still get a bare module node with an empty
    /// `Collections`.
    pub fn build_file(&self, file: &str, language: Language, collections: &Collections) -> FileBatch {
        let mut batch = FileBatch::begin();
        let module_id = self.module_node(&mut batch, file, language);

        for class in &collections.classes {
            batch.add_node(
                GraphNode::new(class.id.clone(), NodeType::class_decl(), &class.name, file)
                    .at(class.pos.line, class.pos.column)
                    .exported(class.exported),
            );
            batch.add_edge(GraphEdge::new(module_id.clone(), class.id.clone(), EdgeType::contains()));
        }

        for func in &collections.functions {
            let node_type = if func.is_method { NodeType::method() } else { NodeType::function() };
            batch.add_node(
                GraphNode::new(func.id.clone(), node_type, &func.name, file)
                    .at(func.pos.line, func.pos.column)
                    .exported(func.exported),
            );
            let container = if let Some(class_name) = &func.class_name {
                collections
                    .classes
                    .iter()
                    .find(|c| &c.name == class_name)
                    .map(|c| c.id.clone())
                    .unwrap_or_else(|| module_id.clone())
            } else {
                module_id.clone()
            };
            batch.add_edge(GraphEdge::new(container, func.id.clone(), EdgeType::contains()));
            self.symbols.insert(func.name.clone(), func.id.clone(), file.to_string());
        }

        for scope in &collections.scopes {
            batch.add_node(GraphNode::new(scope.id.clone(), NodeType::scope(), "scope", file).at(scope.pos.line, scope.pos.column));
            batch.add_edge(GraphEdge::new(scope.captures_from.clone(), scope.id.clone(), EdgeType::has_scope()));
        }

        for literal in &collections.literals {
            batch.add_node(GraphNode::new(literal.id.clone(), NodeType::literal(), &literal.text, file).at(literal.pos.line, literal.pos.column));
            batch.add_edge(GraphEdge::new(literal.scope_id.clone(), literal.id.clone(), EdgeType::contains()));
        }

        for object in &collections.object_literals {
            batch.add_node(GraphNode::new(object.id.clone(), NodeType::object_literal(), "object", file).at(object.pos.line, object.pos.column));
            batch.add_edge(GraphEdge::new(object.scope_id.clone(), object.id.clone(), EdgeType::contains()));
            for (key, value) in &object.properties {
                if let Some(value_id) = self.value_node_id(value, None, collections) {
                    let edge = GraphEdge::new(object.id.clone(), value_id, EdgeType::has_property())
                        .with_meta("property", key.as_str());
                    batch.add_edge(edge);
                }
            }
        }

        for array in &collections.array_literals {
            batch.add_node(GraphNode::new(array.id.clone(), NodeType::array_literal(), "array", file).at(array.pos.line, array.pos.column));
            batch.add_edge(GraphEdge::new(array.scope_id.clone(), array.id.clone(), EdgeType::contains()));
            for (idx, value) in array.elements.iter().enumerate() {
                if let Some(value_id) = self.value_node_id(value, None, collections) {
                    // `HAS_ELEMENT`, not `HAS_PROPERTY` — every `HAS_PROPERTY`
                    // edge's src is an OBJECT_LITERAL, never an ARRAY_LITERAL.
                    let edge = GraphEdge::new(array.id.clone(), value_id, EdgeType::has_element())
                        .with_meta("index", idx.to_string());
                    batch.add_edge(edge);
                }
            }
        }

        for decl in &collections.variable_declarations {
            for leaf in &decl.leaves {
                let mut node = GraphNode::new(leaf.id.clone(), NodeType::variable(), &leaf.name, file).at(leaf.pos.line, leaf.pos.column);
                if !leaf.property_path.is_empty() {
                    node = node.with_attr("propertyPath", serde_json::json!(leaf.property_path));
                }
                if let Some(idx) = leaf.array_index {
                    node = node.with_attr("arrayIndex", serde_json::json!(idx));
                }
                if leaf.is_rest {
                    node = node.with_attr("isRest", serde_json::json!(true));
                }
                if leaf.has_default {
                    node = node.with_attr("hasDefault", serde_json::json!(true));
                }
                batch.add_node(node);
                batch.add_edge(GraphEdge::new(decl.scope_id.clone(), leaf.id.clone(), EdgeType::contains()));
                self.symbols.insert(leaf.name.clone(), leaf.id.clone(), file.to_string());
            }
        }

        for call in &collections.calls {
            let node_type = match call.kind {
                CallKind::CallSite => NodeType::call_site(),
                CallKind::MethodCall => NodeType::method_call(),
            };
            batch.add_node(GraphNode::new(call.id.clone(), node_type, &call.callee_name, file).at(call.pos.line, call.pos.column));
            batch.add_edge(GraphEdge::new(call.scope_id.clone(), call.id.clone(), EdgeType::contains()));

            if call.suppressed_codes.iter().any(|c| c == "CALLS" || c == "*") {
                continue;
            }

            if let Some(target) = self.resolve_callee(&mut batch, call, file) {
                let edge = GraphEdge::new(call.id.clone(), target, EdgeType::calls()).with_meta("callType", "direct");
                batch.add_edge(edge);
            }
        }

        // Argument-to-callback resolution (§4.4): a `PASSES_ARGUMENT` edge
        // always links the call to whatever its argument resolves to; an
        // additional `CALLS{callType:callback}` edge is only added when the
        // argument is itself a function reference AND the enclosing call's
        // callee is in the fixed whitelist — this is what keeps
        // `registry.set("k", handler)` from looking like an invocation.
        for arg in &collections.call_arguments {
            let Some(call) = collections.calls.iter().find(|c| c.id == arg.call_id) else { continue };
            let Some(value_id) = self.value_node_id(&arg.value, arg.this_class.as_deref(), collections) else { continue };

            if let ValueKind::Variable { name } = &arg.value {
                if self.symbols.lookup(name).is_none() {
                    if let Some(import) = collections.imports.iter().find(|i| &i.local_name == name) {
                        batch.add_node(GraphNode::new(value_id.clone(), NodeType::import(), &import.local_name, file).at(import.pos.line, import.pos.column));
                    }
                }
            }

            let edge = GraphEdge::new(arg.call_id.clone(), value_id.clone(), EdgeType::passes_argument())
                .with_meta("index", arg.index.to_string());
            batch.add_edge(edge);

            let is_function_valued = self.is_function_valued(&arg.value, value_id.as_str(), collections);
            if is_function_valued && KNOWN_CALLBACK_INVOKERS.contains(&call.callee_name.as_str()) {
                let callback_edge = GraphEdge::new(arg.call_id.clone(), value_id, EdgeType::calls())
                    .with_meta("callType", grafema_core::CALL_TYPE_CALLBACK);
                batch.add_edge(callback_edge);
            }
        }

        for mutation in &collections.mutations {
            batch.add_node(
                GraphNode::new(mutation.id.clone(), NodeType::new("MUTATION"), &mutation.base_object_name, file)
                    .at(mutation.pos.line, mutation.pos.column),
            );
            batch.add_edge(GraphEdge::new(mutation.scope_id.clone(), mutation.id.clone(), EdgeType::contains()));

            let base = self.symbols.lookup(&mutation.base_object_name);
            let is_array_op = matches!(mutation.method, MutationMethod::Push | MutationMethod::Unshift | MutationMethod::Splice);

            if let Some(base_id) = &base {
                // Read-before-write: a genuine self-loop on the mutated
                // object, not an edge into the mutation node.
                batch.add_edge(GraphEdge::new(base_id.clone(), base_id.clone(), EdgeType::reads_from()));
                if !is_array_op {
                    batch.add_edge(GraphEdge::new(mutation.id.clone(), base_id.clone(), EdgeType::modifies()));
                }
            }

            for (idx, value) in mutation.values.iter().enumerate() {
                if let Some(value_id) = self.value_node_id(value, None, collections) {
                    let edge = if is_array_op {
                        // Flows directly onto the array at the push/unshift
                        // position, not onto the mutation record.
                        match &base {
                            Some(base_id) => {
                                GraphEdge::new(value_id, base_id.clone(), EdgeType::flows_into()).with_meta("index", idx.to_string())
                            }
                            None => GraphEdge::new(value_id, mutation.id.clone(), EdgeType::flows_into()),
                        }
                    } else {
                        GraphEdge::new(value_id, mutation.id.clone(), EdgeType::flows_into())
                    };
                    batch.add_edge(edge);
                }
            }
        }

        for update in &collections.update_expressions {
            let id = update.id.clone();
            batch.add_node(GraphNode::new(id.clone(), NodeType::update_expression(), &update.target_name, file).at(update.pos.line, update.pos.column));
            batch.add_edge(GraphEdge::new(update.scope_id.clone(), id.clone(), EdgeType::contains()));

            // `this.prop++` resolves to the enclosing class declaration
            // rather than a bare-variable symbol lookup.
            let target = match &update.this_class {
                Some(class_name) => collections.classes.iter().find(|c| &c.name == class_name).map(|c| c.id.clone()),
                None => self.symbols.lookup(&update.target_name),
            };
            if let Some(target) = target {
                batch.add_edge(GraphEdge::new(target.clone(), target.clone(), EdgeType::reads_from()));
                batch.add_edge(GraphEdge::new(id, target, EdgeType::modifies()));
            }
        }

        for import in &collections.imports {
            let id = self.import_target(&mut batch, import);
            let edge = GraphEdge::new(module_id.clone(), id, EdgeType::imports()).with_meta("localName", import.local_name.as_str());
            batch.add_edge(edge);
        }

        for export in &collections.exports {
            if let Some(target) = self.symbols.lookup(&export.local_name) {
                batch.add_edge(GraphEdge::new(module_id.clone(), target, EdgeType::exports()));
            }
        }

        batch
    }

    fn module_node(&self, batch: &mut FileBatch, file: &str, language: Language) -> NodeId {
        let node_type = if language.is_semantically_walked() { NodeType::module() } else { NodeType::rust_module() };
        let id = NodeId::new(format!("MODULE|{file}"));
        batch.add_node(GraphNode::new(id.clone(), node_type, file, file));
        id
    }

    /// Known globals resolve to a singleton `EXTERNAL_MODULE`; anything
    /// else that can't be found in the symbol table becomes an
    /// `external_function` stand-in rather than a dangling edge. Both
    /// singleton kinds are idempotent: re-inserting the same id is a
    /// harmless UPSERT.
    fn resolve_callee(&self, batch: &mut FileBatch, call: &crate::collections::CallRecord, file: &str) -> Option<NodeId> {
        if let Some(id) = self.symbols.lookup(&call.callee_name) {
            return Some(id);
        }
        // For a method call (`console.log(...)`), the global namespace is
        // the object (`console`), not the bare property name (`log`) —
        // matching on the property alone would treat any method sharing a
        // name with a global (`registry.log(...)`) as the global itself.
        let global_name = call.object.as_deref().unwrap_or(call.callee_name.as_str());
        if crate::walker::js_globals().contains(global_name) {
            let id = NodeId::new(singletons::external_module(global_name));
            batch.add_node(GraphNode::new(id.clone(), NodeType::external_module(), global_name, file));
            return Some(id);
        }
        // Unresolved calls still get a stable per-file external node so
        // the edge isn't silently dropped.
        let id = NodeId::new(format!("EXTERNAL_FUNCTION|{file}|{}", call.callee_name));
        batch.add_node(GraphNode::new(id.clone(), NodeType::external_function(), &call.callee_name, file));
        Some(id)
    }

    fn import_target(&self, batch: &mut FileBatch, import: &crate::collections::ImportRecord) -> NodeId {
        if import.source.starts_with('.') {
            NodeId::new(format!("MODULE|{}", import.source))
        } else {
            let id = NodeId::new(singletons::external_module(&import.source));
            batch.add_node(GraphNode::new(id.clone(), NodeType::external_module(), &import.source, "<external>"));
            id
        }
    }

    /// Resolves a [`ValueKind`] to the node id it should flow to/from.
    /// `this_class` narrows a `Member { object: "this", .. }` to the
    /// enclosing class's methods (§4.4 method-callback rule); unresolved
    /// variables fall back to the file's imports (§4.4 import fallback)
    /// before giving up.
    fn value_node_id(&self, value: &ValueKind, this_class: Option<&str>, collections: &Collections) -> Option<NodeId> {
        match value {
            ValueKind::Literal { literal_id } => Some(literal_id.clone()),
            ValueKind::Function { function_id } => Some(function_id.clone()),
            ValueKind::Call { call_id } => Some(call_id.clone()),
            ValueKind::ObjectLiteral { object_id } => Some(object_id.clone()),
            ValueKind::ArrayLiteral { array_id } => Some(array_id.clone()),
            ValueKind::Member { object, property } if object == "this" => {
                let class_name = this_class?;
                collections
                    .functions
                    .iter()
                    .find(|f| f.is_method && f.class_name.as_deref() == Some(class_name) && f.name == *property)
                    .map(|f| f.id.clone())
            }
            ValueKind::Member { .. } => None,
            ValueKind::Variable { name } => {
                self.symbols.lookup(name).or_else(|| self.imported_symbol_id(name, collections))
            }
            ValueKind::Expression { .. } => None,
        }
    }

    /// True when `value` denotes something callable, so the call site can
    /// be a candidate for a `CALLS{callType:callback}` edge (§4.4).
    fn is_function_valued(&self, value: &ValueKind, resolved_id: &str, collections: &Collections) -> bool {
        match value {
            ValueKind::Function { .. } => true,
            ValueKind::Member { object, property } if object == "this" => {
                collections.functions.iter().any(|f| f.is_method && f.name == *property)
            }
            ValueKind::Variable { name } => {
                collections.functions.iter().any(|f| &f.name == name) || resolved_id.contains("->FUNCTION->") || resolved_id.contains("->METHOD->")
            }
            _ => false,
        }
    }

    /// Unresolved-variable fallback: if `name` matches an import's local
    /// name, the argument target is the import itself rather than a
    /// dropped edge (§4.4).
    fn imported_symbol_id(&self, name: &str, collections: &Collections) -> Option<NodeId> {
        let import = collections.imports.iter().find(|i| i.local_name == name)?;
        Some(NodeId::new(format!("file:IMPORT:{}:{}", import.source, import.local_name)))
    }
}

/// Known node-builtin module names whose `require`/`import` target
/// resolves to the same external-module singleton regardless of the
/// `node:` prefix convention.
pub fn builtin_modules() -> HashSet<&'static str> {
    ["fs", "path", "http", "https", "net", "crypto", "events", "stream", "util", "os", "child_process"]
        .into_iter()
        .collect()
}
