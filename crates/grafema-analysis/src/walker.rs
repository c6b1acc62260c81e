//! Single-pass visitor over a parsed JS/TS tree, emitting a
//! [`Collections`] bundle.

use crate::collections::*;
use grafema_core::identity::{compute_semantic_id, singletons};
use grafema_core::{NodeId, ScopeContext, ScopeKind, ScopeTracker};
use std::collections::HashSet;
use tree_sitter::Node;

/// Callee names known to always invoke the function argument passed to
/// them. Kept here because the walker is what records which calls are
/// candidates; the builder applies the whitelist when it decides
/// whether to emit `CALLS{callType:callback}`.
pub const KNOWN_CALLBACK_INVOKERS: &[&str] = &[
    "forEach", "map", "filter", "reduce", "reduceRight", "some", "every", "find", "findIndex",
    "sort", "flatMap",
    "setTimeout", "setInterval", "setImmediate",
    "then", "catch", "finally",
    "on", "once", "addEventListener", "addListener",
    "requestAnimationFrame",
];

const LITERAL_DEDUP_WINDOW: usize = 50;

#[derive(Debug, thiserror::Error)]
#[error("failed to walk {file}: {message}")]
pub struct AnalysisError {
    pub file: String,
    pub message: String,
}

pub struct Walker<'a> {
    source: &'a str,
    file: String,
    tracker: ScopeTracker,
    collections: Collections,
    literal_window: Vec<(u32, u32)>,
    current_class: Vec<String>,
}

impl<'a> Walker<'a> {
    pub fn new(file: impl Into<String>, source: &'a str) -> Self {
        let file = file.into();
        Walker {
            source,
            tracker: ScopeTracker::new(file.clone()),
            file,
            collections: Collections::default(),
            literal_window: Vec::new(),
            current_class: Vec::new(),
        }
    }

    pub fn walk(mut self, root: Node) -> Collections {
        let module_scope = self.module_scope_id();
        self.walk_node(root, module_scope);
        self.collections
    }

    fn module_scope_id(&self) -> NodeId {
        let ctx = ScopeContext { file: self.file.clone(), scope_path: "module".to_string() };
        NodeId::new(compute_semantic_id("SCOPE", "module", &ctx, None))
    }

    fn text(&self, node: Node) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn pos(&self, node: Node) -> Position {
        let p = node.start_position();
        Position { line: p.row as u32 + 1, column: p.column as u32 + 1 }
    }

    fn next_id(&mut self, node_type: &str, name: &str) -> NodeId {
        let ctx = self.tracker.get_context();
        let key = format!("{node_type}:{name}");
        let disc = self.tracker.get_item_counter(&key);
        let disc = if disc == 0 { None } else { Some(disc) };
        NodeId::new(compute_semantic_id(node_type, name, &ctx, disc))
    }

    fn current_scope_id(&self) -> NodeId {
        let ctx = self.tracker.get_context();
        NodeId::new(compute_semantic_id("SCOPE", ctx.scope_path.split('.').next_back().unwrap_or("module"), &ctx, None))
    }

    /// Suppression comments: a line comment `// grafema-ignore CODE[- reason]`
    /// immediately preceding `node` (as a previous sibling).
    fn suppressed_codes_for(&self, node: Node) -> Vec<String> {
        let mut codes = Vec::new();
        let mut sibling = node.prev_sibling();
        while let Some(s) = sibling {
            if s.kind() != "comment" {
                break;
            }
            let text = self.text(s);
            if let Some(rest) = text.trim_start_matches("//").trim().strip_prefix("grafema-ignore") {
                if let Some(code) = rest.trim().split(['-', ' ']).next() {
                    if !code.is_empty() {
                        codes.push(code.to_string());
                    }
                }
            }
            sibling = s.prev_sibling();
        }
        codes
    }

    fn walk_node(&mut self, node: Node, scope_id: NodeId) {
        match node.kind() {
            "function_declaration" | "generator_function_declaration" => {
                self.handle_function(node, scope_id, false, false);
                return;
            }
            "function_expression" | "function" | "generator_function" => {
                self.handle_function(node, scope_id, false, false);
                return;
            }
            "arrow_function" => {
                self.handle_function(node, scope_id, false, true);
                return;
            }
            "method_definition" => {
                self.handle_function(node, scope_id, true, false);
                return;
            }
            "class_declaration" => {
                self.handle_class(node, scope_id);
                return;
            }
            "call_expression" => {
                self.handle_call(node, scope_id);
                return;
            }
            "variable_declarator" => {
                self.handle_variable_declarator(node, scope_id);
            }
            "assignment_expression" => {
                self.handle_assignment(node, scope_id);
            }
            "update_expression" => {
                self.handle_update_expression(node, scope_id);
            }
            "return_statement" => {
                self.handle_return(node, scope_id);
            }
            "import_statement" => {
                self.handle_import(node);
            }
            "export_statement" => {
                self.handle_export(node);
            }
            "string" | "template_string" | "number" | "true" | "false" | "null" | "regex" => {
                self.record_literal(node, scope_id);
            }
            "object" => {
                self.handle_object_literal(node, scope_id);
                return;
            }
            "array" => {
                self.handle_array_literal(node, scope_id);
                return;
            }
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_node(child, scope_id);
        }
    }

    fn handle_function(&mut self, node: Node, enclosing_scope: NodeId, is_method: bool, is_arrow: bool) {
        let name = self.function_name(node, is_method);
        let is_anonymous = name.is_empty();
        let display_name = if is_anonymous {
            let idx = self.tracker.get_sibling_index(ScopeKind::Closure);
            format!("anonymous[{idx}]")
        } else {
            name.clone()
        };

        let func_id = self.next_id(if is_method { "METHOD" } else { "FUNCTION" }, &display_name);
        let class_name = self.current_class.last().cloned();
        let exit_name = display_name.clone();

        self.tracker.enter_scope(&display_name, if is_arrow { ScopeKind::Arrow } else { ScopeKind::Function });
        let scope_kind = if is_arrow { ScopeBodyKind::ArrowBody } else { ScopeBodyKind::Closure };
        let scope_id = self.current_scope_id();

        self.collections.functions.push(FunctionRecord {
            id: func_id.clone(),
            name: display_name,
            is_method,
            is_anonymous,
            class_name,
            scope_id: scope_id.clone(),
            enclosing_scope_id: enclosing_scope,
            exported: false,
            pos: self.pos(node),
        });
        self.collections.scopes.push(ScopeRecord {
            id: scope_id.clone(),
            kind: scope_kind,
            captures_from: enclosing_scope,
            pos: self.pos(node),
        });

        if let Some(params) = node.child_by_field_name("parameters").or_else(|| node.child_by_field_name("parameter")) {
            self.walk_node(params, scope_id.clone());
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.walk_node(body, scope_id.clone());
        } else {
            // Arrow functions with an expression body (no braces).
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if child.kind() != "formal_parameters" && child.kind() != "identifier" {
                    self.walk_node(child, scope_id.clone());
                }
            }
        }

        if let Err(e) = self.tracker.exit_scope(&exit_name) {
            tracing::debug!(error = %e, "scope mismatch exiting function");
        }
    }

    fn function_name(&self, node: Node, is_method: bool) -> String {
        if is_method {
            return node
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string())
                .unwrap_or_default();
        }
        node.child_by_field_name("name").map(|n| self.text(n).to_string()).unwrap_or_default()
    }

    fn handle_class(&mut self, node: Node, scope_id: NodeId) {
        let name = node.child_by_field_name("name").map(|n| self.text(n).to_string()).unwrap_or_default();
        let class_id = self.next_id("CLASS", &name);
        self.collections.classes.push(ClassRecord {
            id: class_id,
            name: name.clone(),
            exported: false,
            scope_id: scope_id.clone(),
            pos: self.pos(node),
        });

        self.current_class.push(name);
        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for child in body.children(&mut cursor) {
                self.walk_node(child, scope_id.clone());
            }
        }
        self.current_class.pop();
    }

    fn handle_call(&mut self, node: Node, scope_id: NodeId) {
        let Some(func) = node.child_by_field_name("function") else { return };
        let (kind, callee_name, object) = if func.kind() == "member_expression" {
            let prop = func.child_by_field_name("property").map(|n| self.text(n).to_string()).unwrap_or_default();
            let obj = func.child_by_field_name("object").map(|n| self.text(n).to_string());
            (CallKind::MethodCall, prop, obj)
        } else {
            (CallKind::CallSite, self.text(func).to_string(), None)
        };

        let statement = self.enclosing_statement(node);
        let suppressed = statement.map(|s| self.suppressed_codes_for(s)).unwrap_or_default();

        let call_id = self.next_id(
            match kind {
                CallKind::CallSite => "CALL_SITE",
                CallKind::MethodCall => "METHOD_CALL",
            },
            &callee_name,
        );

        self.collections.calls.push(CallRecord {
            id: call_id.clone(),
            kind,
            callee_name: callee_name.clone(),
            object: object.clone(),
            scope_id: scope_id.clone(),
            pos: self.pos(node),
            suppressed_codes: suppressed,
        });

        if let Some(args) = node.child_by_field_name("arguments") {
            let mut index = 0u32;
            let named: Vec<Node> = {
                let mut cursor = args.walk();
                args.named_children(&mut cursor).collect()
            };
            for arg in named {
                let is_spread = arg.kind() == "spread_element";
                let value_node = if is_spread { arg.named_child(0).unwrap_or(arg) } else { arg };
                let value = self.classify_value(value_node, scope_id.clone());
                self.collections.call_arguments.push(CallArgument {
                    call_id: call_id.clone(),
                    index,
                    value,
                    is_spread,
                    this_class: self.current_class.last().cloned(),
                });
                // An argument can itself contain calls, literals, or
                // nested functions worth their own records.
                self.walk_node(value_node, scope_id.clone());
                index += 1;
            }
        }

        self.detect_mutation(&kind, &callee_name, &object, node, scope_id.clone());

        // Recurse into the callee chain so nested calls (`a().b()`) and
        // member objects keep being visited.
        self.walk_node(func, scope_id);
    }

    fn detect_mutation(
        &mut self,
        kind: &CallKind,
        callee_name: &str,
        object: &Option<String>,
        node: Node,
        scope_id: NodeId,
    ) {
        if *kind != CallKind::MethodCall {
            return;
        }

        // `Object.assign(target, ...sources)`.
        if callee_name == "assign" && object.as_deref() == Some("Object") {
            if let Some(args) = node.child_by_field_name("arguments") {
                let named: Vec<Node> = {
                    let mut cursor = args.walk();
                    args.named_children(&mut cursor).collect()
                };
                if named.len() < 2 {
                    return; // fewer than two arguments -> no mutation record
                }
                let target = self.text(named[0]).to_string();
                let values = named[1..]
                    .iter()
                    .map(|n| self.classify_value(*n, scope_id.clone()))
                    .collect();
                let id = self.next_id("MUTATION", &target);
                self.collections.mutations.push(MutationRecord {
                    id,
                    method: MutationMethod::ObjectAssign,
                    base_object_name: target,
                    property_name: None,
                    values,
                    scope_id,
                    pos: self.pos(node),
                });
            }
            return;
        }

        let method = match callee_name {
            "push" => Some(MutationMethod::Push),
            "unshift" => Some(MutationMethod::Unshift),
            "splice" => Some(MutationMethod::Splice),
            _ => None,
        };
        if let (Some(method), Some(base)) = (method, object.clone()) {
            let values = self.collect_mutation_values(node, method);
            // A distinct id from the call site: the call and the
            // mutation it causes are separate graph nodes.
            let id = self.next_id("MUTATION", &base);
            self.collections.mutations.push(MutationRecord {
                id,
                method,
                base_object_name: base,
                property_name: None,
                values,
                scope_id,
                pos: self.pos(node),
            });
        }
    }

    fn collect_mutation_values(&mut self, call_node: Node, method: MutationMethod) -> Vec<ValueKind> {
        let Some(args) = call_node.child_by_field_name("arguments") else { return Vec::new() };
        let named: Vec<Node> = {
            let mut cursor = args.walk();
            args.named_children(&mut cursor).collect()
        };
        let relevant: Vec<Node> = match method {
            // splice's first two args are start/deleteCount, not values.
            MutationMethod::Splice => named.into_iter().skip(2).collect(),
            _ => named,
        };
        let scope_id = self.current_scope_id();
        relevant.into_iter().map(|n| self.classify_value(n, scope_id.clone())).collect()
    }

    fn classify_value(&mut self, node: Node, scope_id: NodeId) -> ValueKind {
        match node.kind() {
            "string" | "template_string" | "number" | "true" | "false" | "null" | "regex" => {
                let id = self.record_literal(node, scope_id);
                ValueKind::Literal { literal_id: id }
            }
            "identifier" | "this" => ValueKind::Variable { name: self.text(node).to_string() },
            "member_expression" => {
                let object = node.child_by_field_name("object").map(|n| self.text(n).to_string()).unwrap_or_default();
                let property = node.child_by_field_name("property").map(|n| self.text(n).to_string()).unwrap_or_default();
                ValueKind::Member { object, property }
            }
            "arrow_function" | "function_expression" | "function" => {
                let text = self.text(node).to_string();
                let id = self.next_id("FUNCTION", &text);
                ValueKind::Function { function_id: id }
            }
            "call_expression" => {
                let callee = node
                    .child_by_field_name("function")
                    .map(|f| self.text(f).to_string())
                    .unwrap_or_default();
                let id = self.next_id("CALL_SITE", &callee);
                ValueKind::Call { call_id: id }
            }
            "object" => {
                let id = self.handle_object_literal(node, scope_id);
                ValueKind::ObjectLiteral { object_id: id }
            }
            "array" => {
                let id = self.handle_array_literal(node, scope_id);
                ValueKind::ArrayLiteral { array_id: id }
            }
            _ => ValueKind::Expression { text: self.text(node).to_string() },
        }
    }

    fn handle_object_literal(&mut self, node: Node, scope_id: NodeId) -> NodeId {
        let id = self.next_id("OBJECT_LITERAL", "object");
        let named: Vec<Node> = {
            let mut cursor = node.walk();
            node.named_children(&mut cursor).collect()
        };
        let mut properties = Vec::new();
        for prop in named {
            match prop.kind() {
                "pair" => {
                    let key = prop.child_by_field_name("key").map(|n| self.text(n).to_string()).unwrap_or_default();
                    if let Some(value_node) = prop.child_by_field_name("value") {
                        let value = self.classify_value(value_node, scope_id.clone());
                        properties.push((key, value));
                    }
                }
                "shorthand_property_identifier" => {
                    let name = self.text(prop).to_string();
                    properties.push((name.clone(), ValueKind::Variable { name }));
                }
                "spread_element" => {
                    if let Some(inner) = prop.named_child(0) {
                        let value = self.classify_value(inner, scope_id.clone());
                        properties.push(("...".to_string(), value));
                    }
                }
                _ => {}
            }
        }
        self.collections.object_literals.push(ObjectLiteralRecord {
            id: id.clone(),
            scope_id,
            properties,
            pos: self.pos(node),
        });
        id
    }

    fn handle_array_literal(&mut self, node: Node, scope_id: NodeId) -> NodeId {
        let id = self.next_id("ARRAY_LITERAL", "array");
        let named: Vec<Node> = {
            let mut cursor = node.walk();
            node.named_children(&mut cursor).collect()
        };
        let elements = named.into_iter().map(|n| self.classify_value(n, scope_id.clone())).collect();
        self.collections.array_literals.push(ArrayLiteralRecord {
            id: id.clone(),
            scope_id,
            elements,
            pos: self.pos(node),
        });
        id
    }

    fn record_literal(&mut self, node: Node, scope_id: NodeId) -> NodeId {
        let text = self.text(node).to_string();
        let pos = node.start_position();
        let key = (pos.row as u32, pos.column as u32);
        if self.literal_window.contains(&key) {
            return self.next_id("LITERAL", &text);
        }
        self.literal_window.push(key);
        if self.literal_window.len() > LITERAL_DEDUP_WINDOW {
            self.literal_window.remove(0);
        }

        let id = self.next_id("LITERAL", &text);
        self.collections.literals.push(LiteralRecord {
            id: id.clone(),
            text,
            scope_id,
            pos: self.pos(node),
        });
        id
    }

    fn handle_variable_declarator(&mut self, node: Node, scope_id: NodeId) {
        let Some(name_node) = node.child_by_field_name("name") else { return };
        let mut leaves = Vec::new();
        self.extract_destructured(name_node, scope_id.clone(), Vec::new(), false, &mut leaves);
        if !leaves.is_empty() {
            self.collections.variable_declarations.push(VariableDeclaration {
                scope_id,
                leaves,
                pos: self.pos(node),
            });
        }
    }

    fn extract_destructured(
        &mut self,
        node: Node,
        scope_id: NodeId,
        property_path: Vec<String>,
        is_rest: bool,
        out: &mut Vec<ExtractedVariable>,
    ) {
        match node.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => {
                let name = self.text(node).to_string();
                let id = self.next_id("VARIABLE", &name);
                out.push(ExtractedVariable {
                    id,
                    name,
                    scope_id,
                    property_path,
                    array_index: None,
                    is_rest,
                    has_default: false,
                    pos: self.pos(node),
                });
            }
            "assignment_pattern" => {
                if let Some(left) = node.child_by_field_name("left") {
                    let mut leaves = Vec::new();
                    self.extract_destructured(left, scope_id.clone(), property_path, is_rest, &mut leaves);
                    for mut l in leaves {
                        l.has_default = true;
                        out.push(l);
                    }
                }
            }
            "rest_pattern" => {
                if let Some(inner) = node.named_child(0) {
                    self.extract_destructured(inner, scope_id, property_path, true, out);
                }
            }
            "object_pattern" => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    match child.kind() {
                        "pair_pattern" => {
                            let key = child.child_by_field_name("key").map(|n| self.text(n).to_string()).unwrap_or_default();
                            if let Some(value) = child.child_by_field_name("value") {
                                let mut path = property_path.clone();
                                path.push(key);
                                self.extract_destructured(value, scope_id.clone(), path, false, out);
                            }
                        }
                        "shorthand_property_identifier_pattern" => {
                            let name = self.text(child).to_string();
                            let id = self.next_id("VARIABLE", &name);
                            let mut path = property_path.clone();
                            path.push(name.clone());
                            out.push(ExtractedVariable {
                                id,
                                name,
                                scope_id: scope_id.clone(),
                                property_path: path,
                                array_index: None,
                                is_rest: false,
                                has_default: false,
                                pos: self.pos(child),
                            });
                        }
                        // `{ b = 1 }` — shorthand with a default value.
                        "object_assignment_pattern" => {
                            if let Some(left) = child.child_by_field_name("left") {
                                let mut path = property_path.clone();
                                path.push(self.text(left).to_string());
                                let mut leaves = Vec::new();
                                self.extract_destructured(left, scope_id.clone(), path, false, &mut leaves);
                                for mut l in leaves {
                                    l.has_default = true;
                                    out.push(l);
                                }
                            }
                        }
                        "rest_pattern" => self.extract_destructured(child, scope_id.clone(), property_path.clone(), true, out),
                        _ => {}
                    }
                }
            }
            "array_pattern" => {
                let mut cursor = node.walk();
                for (idx, child) in node.named_children(&mut cursor).enumerate() {
                    let is_rest_elem = child.kind() == "rest_pattern";
                    let mut leaves = Vec::new();
                    self.extract_destructured(child, scope_id.clone(), property_path.clone(), is_rest_elem, &mut leaves);
                    for mut l in leaves {
                        if !is_rest_elem {
                            l.array_index = Some(idx as u32);
                        }
                        out.push(l);
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_assignment(&mut self, node: Node, scope_id: NodeId) {
        let Some(left) = node.child_by_field_name("left") else { return };
        if left.kind() != "member_expression" && left.kind() != "subscript_expression" {
            return;
        }
        let base = left.child_by_field_name("object").map(|n| self.text(n).to_string()).unwrap_or_default();
        let prop = left
            .child_by_field_name("property")
            .or_else(|| left.child_by_field_name("index"))
            .map(|n| self.text(n).to_string());

        let Some(right) = node.child_by_field_name("right") else { return };
        let value = self.classify_value(right, scope_id.clone());
        let id = self.next_id("OBJECT_MUTATION", &base);
        self.collections.mutations.push(MutationRecord {
            id,
            method: MutationMethod::ObjectAssign,
            base_object_name: base,
            property_name: prop,
            values: vec![value],
            scope_id,
            pos: self.pos(node),
        });
    }

    fn handle_update_expression(&mut self, node: Node, scope_id: NodeId) {
        let Some(arg) = node.child_by_field_name("argument") else { return };
        let (target_name, this_class) = if arg.kind() == "member_expression" {
            let obj = arg.child_by_field_name("object").map(|n| self.text(n).to_string()).unwrap_or_default();
            let prop = arg.child_by_field_name("property").map(|n| self.text(n).to_string()).unwrap_or_default();
            let class = if obj == "this" { self.current_class.last().cloned() } else { None };
            (prop, class)
        } else {
            (self.text(arg).to_string(), None)
        };

        let op_text = node
            .children(&mut node.walk())
            .find(|c| c.kind() == "++" || c.kind() == "--")
            .map(|c| self.text(c).to_string())
            .unwrap_or_default();
        let operator = if op_text == "++" { UpdateOperator::Increment } else { UpdateOperator::Decrement };
        let prefix = node.start_byte() < arg.start_byte();

        let id = self.next_id("UPDATE_EXPRESSION", &target_name);
        self.collections.update_expressions.push(UpdateExpressionRecord {
            id,
            target_name,
            this_class,
            operator,
            prefix,
            scope_id,
            pos: self.pos(node),
        });
    }

    fn handle_return(&mut self, node: Node, scope_id: NodeId) {
        let value = node.named_child(0).map(|n| self.classify_value(n, scope_id.clone()));
        self.collections.returns.push(ReturnRecord { scope_id, value, pos: self.pos(node) });
    }

    fn handle_import(&mut self, node: Node) {
        let source = node
            .children(&mut node.walk())
            .find(|c| c.kind() == "string")
            .map(|n| self.text(n).trim_matches(['"', '\'']).to_string())
            .unwrap_or_default();

        let Some(clause) = node.child_by_field_name("import_clause") else { return };
        let mut cursor = clause.walk();
        for child in clause.children(&mut cursor) {
            match child.kind() {
                "identifier" => {
                    self.collections.imports.push(ImportRecord {
                        source: source.clone(),
                        local_name: self.text(child).to_string(),
                        imported_name: None,
                        is_default: true,
                        pos: self.pos(child),
                    });
                }
                "namespace_import" => {
                    if let Some(id) = child.named_child(0) {
                        self.collections.imports.push(ImportRecord {
                            source: source.clone(),
                            local_name: self.text(id).to_string(),
                            imported_name: Some("*".to_string()),
                            is_default: false,
                            pos: self.pos(child),
                        });
                    }
                }
                "named_imports" => {
                    let mut inner = child.walk();
                    for spec in child.named_children(&mut inner) {
                        if spec.kind() != "import_specifier" {
                            continue;
                        }
                        let name = spec.child_by_field_name("name").map(|n| self.text(n).to_string()).unwrap_or_default();
                        let alias = spec.child_by_field_name("alias").map(|n| self.text(n).to_string());
                        self.collections.imports.push(ImportRecord {
                            source: source.clone(),
                            local_name: alias.clone().unwrap_or_else(|| name.clone()),
                            imported_name: Some(name),
                            is_default: false,
                            pos: self.pos(spec),
                        });
                    }
                }
                _ => {}
            }
        }
    }

    fn handle_export(&mut self, node: Node) {
        let is_default = node.children(&mut node.walk()).any(|c| c.kind() == "default");
        if let Some(decl) = node.child_by_field_name("declaration") {
            let name = decl
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string())
                .unwrap_or_else(|| self.text(decl).to_string());
            self.collections.exports.push(ExportRecord { local_name: name, is_default, pos: self.pos(node) });
            return;
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "export_clause" {
                let mut inner = child.walk();
                for spec in child.named_children(&mut inner) {
                    if spec.kind() != "export_specifier" {
                        continue;
                    }
                    let name = spec.child_by_field_name("name").map(|n| self.text(n).to_string()).unwrap_or_default();
                    self.collections.exports.push(ExportRecord { local_name: name, is_default: false, pos: self.pos(spec) });
                }
            }
        }
    }

    fn enclosing_statement<'n>(&self, mut node: Node<'n>) -> Option<Node<'n>> {
        loop {
            if node.kind().ends_with("_statement") {
                return Some(node);
            }
            node = node.parent()?;
        }
    }
}

/// Entry point: parse `source` for `file` and produce its
/// [`Collections`]. A fatal tree-sitter parse error becomes an
/// [`AnalysisError`]; the caller discards this file's records and
/// continues with the next one.
pub fn walk_file(file: &str, source: &str, tree: &tree_sitter::Tree) -> Result<Collections, AnalysisError> {
    let root = tree.root_node();
    if root.has_error() && root.child_count() == 0 {
        return Err(AnalysisError { file: file.to_string(), message: "empty or unparsable tree".to_string() });
    }
    let walker = Walker::new(file, source);
    Ok(walker.walk(root))
}

/// Known JS/TS global identifiers — calls to these are classified
/// `builtin` rather than `unresolved`.
pub fn js_globals() -> HashSet<&'static str> {
    [
        "console",
        "parseInt", "parseFloat", "isNaN", "isFinite",
        "setTimeout", "setInterval", "clearTimeout", "clearInterval",
        "JSON", "Object", "Array", "Promise", "Math", "Date", "Map", "Set", "Symbol",
        "require", "process", "Buffer", "global", "globalThis",
    ]
    .into_iter()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse(source: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_javascript::LANGUAGE.into()).unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn single_function_single_call() {
        let source = r#"function greet(){ console.log("hi"); }"#;
        let tree = parse(source);
        let collections = walk_file("a.js", source, &tree).unwrap();

        assert_eq!(collections.functions.len(), 1);
        assert_eq!(collections.functions[0].name, "greet");
        assert_eq!(collections.scopes.len(), 1);
        assert_eq!(collections.calls.len(), 1);
        assert_eq!(collections.calls[0].callee_name, "log");
        assert_eq!(collections.literals.len(), 1);
        assert_eq!(collections.literals[0].text, "\"hi\"");
    }

    #[test]
    fn for_each_callback_is_a_variable_argument() {
        let source = "function cb(x) {} items.forEach(cb);";
        let tree = parse(source);
        let collections = walk_file("a.js", source, &tree).unwrap();
        let call = collections.calls.iter().find(|c| c.callee_name == "forEach").unwrap();
        let arg = collections.call_arguments.iter().find(|a| a.call_id == call.id).unwrap();
        assert!(matches!(arg.value, ValueKind::Variable { ref name } if name == "cb"));
    }

    #[test]
    fn register_pattern_is_not_flagged_as_mutation() {
        let source = "registry.set(\"k\", handler);";
        let tree = parse(source);
        let collections = walk_file("a.js", source, &tree).unwrap();
        assert!(collections.mutations.is_empty());
    }

    #[test]
    fn array_push_is_recorded_as_mutation() {
        let source = "arr.push(x);";
        let tree = parse(source);
        let collections = walk_file("a.js", source, &tree).unwrap();
        assert_eq!(collections.mutations.len(), 1);
        assert_eq!(collections.mutations[0].base_object_name, "arr");
        assert_eq!(collections.mutations[0].method, MutationMethod::Push);
    }

    #[test]
    fn splice_skips_first_two_arguments() {
        let source = "arr.splice(1, 2, x, y);";
        let tree = parse(source);
        let collections = walk_file("a.js", source, &tree).unwrap();
        assert_eq!(collections.mutations[0].values.len(), 2);
    }

    #[test]
    fn object_assign_with_one_argument_yields_no_mutation() {
        let source = "Object.assign(target);";
        let tree = parse(source);
        let collections = walk_file("a.js", source, &tree).unwrap();
        assert!(collections.mutations.is_empty());
    }

    #[test]
    fn object_assign_with_sources_is_recorded_as_mutation() {
        let source = "Object.assign(target, src);";
        let tree = parse(source);
        let collections = walk_file("a.js", source, &tree).unwrap();
        assert_eq!(collections.mutations.len(), 1);
        assert_eq!(collections.mutations[0].base_object_name, "target");
        assert_eq!(collections.mutations[0].method, MutationMethod::ObjectAssign);
    }

    #[test]
    fn destructuring_extracts_property_path_and_defaults() {
        let source = "const { a: { b = 1 } } = obj;";
        let tree = parse(source);
        let collections = walk_file("a.js", source, &tree).unwrap();
        let decl = &collections.variable_declarations[0];
        let leaf = &decl.leaves[0];
        assert_eq!(leaf.name, "b");
        assert_eq!(leaf.property_path, vec!["a".to_string(), "b".to_string()]);
        assert!(leaf.has_default);
    }

    #[test]
    fn update_expression_records_prefix_and_operator() {
        let source = "count++; --other;";
        let tree = parse(source);
        let collections = walk_file("a.js", source, &tree).unwrap();
        assert_eq!(collections.update_expressions.len(), 2);
        assert!(!collections.update_expressions[0].prefix);
        assert_eq!(collections.update_expressions[0].operator, UpdateOperator::Increment);
        assert!(collections.update_expressions[1].prefix);
        assert_eq!(collections.update_expressions[1].operator, UpdateOperator::Decrement);
    }

    #[test]
    fn literal_dedup_window_reuses_the_same_id() {
        let source = r#"function f(x = "a") { return "a"; }"#;
        let tree = parse(source);
        let collections = walk_file("a.js", source, &tree).unwrap();
        // Both "a" literals share the same source position only if identical;
        // here they're different positions so both are recorded once each.
        assert_eq!(collections.literals.len(), 2);
    }

    #[test]
    fn module_with_no_constructs_still_parses() {
        let source = "";
        let tree = parse(source);
        let collections = walk_file("a.js", source, &tree).unwrap();
        assert!(collections.is_empty());
    }

    #[test]
    fn singleton_stdio_id_is_stable() {
        assert_eq!(singletons::STDIO, "net:stdio#__stdio__");
    }
}
