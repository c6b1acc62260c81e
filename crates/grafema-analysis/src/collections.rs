//! The `Collections` bundle emitted by the walker for one file.
//!
//! Every record carries enough of its own identity material (`id`,
//! `scope_id` where relevant) that the builder can turn it into a
//! [`grafema_core::GraphNode`]/edge pair without re-walking the tree.

use grafema_core::NodeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

/// How a call argument, mutation value, return, or yield expression is
/// typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueKind {
    Literal { literal_id: NodeId },
    Variable { name: String },
    Function { function_id: NodeId },
    Call { call_id: NodeId },
    ObjectLiteral { object_id: NodeId },
    ArrayLiteral { array_id: NodeId },
    /// A member expression (`this.method`, `obj.prop`) captured as an
    /// argument/value so the builder can resolve `this.method` callbacks
    /// against the enclosing class (§4.3, §4.4 method-callback rule).
    Member { object: String, property: String },
    Expression { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub id: NodeId,
    pub name: String,
    pub is_method: bool,
    pub is_anonymous: bool,
    pub class_name: Option<String>,
    pub scope_id: NodeId,
    pub enclosing_scope_id: NodeId,
    pub exported: bool,
    pub pos: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeBodyKind {
    Closure,
    ArrowBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeRecord {
    pub id: NodeId,
    pub kind: ScopeBodyKind,
    pub captures_from: NodeId,
    pub pos: Position,
}

/// One leaf binding from a (possibly destructured) declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedVariable {
    pub id: NodeId,
    pub name: String,
    pub scope_id: NodeId,
    pub property_path: Vec<String>,
    pub array_index: Option<u32>,
    pub is_rest: bool,
    pub has_default: bool,
    pub pos: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallKind {
    CallSite,
    MethodCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    pub id: NodeId,
    pub kind: CallKind,
    pub callee_name: String,
    /// Present for method calls: the receiver expression text (`this`,
    /// a variable name, …).
    pub object: Option<String>,
    pub scope_id: NodeId,
    pub pos: Position,
    /// Set by a `grafema-ignore <CODE>` comment covering this call or
    /// its enclosing statement.
    pub suppressed_codes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallArgument {
    pub call_id: NodeId,
    pub index: u32,
    pub value: ValueKind,
    pub is_spread: bool,
    /// The class enclosing the call site, if any — carried so the
    /// builder can resolve a `this.method` argument value against the
    /// right class's methods (§4.4 method-callback rule).
    pub this_class: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralRecord {
    pub id: NodeId,
    pub text: String,
    pub scope_id: NodeId,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectLiteralRecord {
    pub id: NodeId,
    pub scope_id: NodeId,
    pub properties: Vec<(String, ValueKind)>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayLiteralRecord {
    pub id: NodeId,
    pub scope_id: NodeId,
    pub elements: Vec<ValueKind>,
    pub pos: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationMethod {
    Push,
    Unshift,
    Splice,
    ObjectAssign,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRecord {
    pub id: NodeId,
    pub method: MutationMethod,
    pub base_object_name: String,
    pub property_name: Option<String>,
    pub values: Vec<ValueKind>,
    pub scope_id: NodeId,
    pub pos: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOperator {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateExpressionRecord {
    pub id: NodeId,
    pub target_name: String,
    /// `Some(class_name)` when the target is `this.prop` inside a
    /// method — resolves to the enclosing class declaration.
    pub this_class: Option<String>,
    pub operator: UpdateOperator,
    pub prefix: bool,
    pub scope_id: NodeId,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnRecord {
    pub scope_id: NodeId,
    pub value: Option<ValueKind>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub id: NodeId,
    pub name: String,
    pub exported: bool,
    pub scope_id: NodeId,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub source: String,
    pub local_name: String,
    pub imported_name: Option<String>,
    pub is_default: bool,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub local_name: String,
    pub is_default: bool,
    pub pos: Position,
}

/// A destructured-declaration site producing zero or more
/// [`ExtractedVariable`]s (kept separately from the flat list so the
/// builder can still see which declaration a leaf came from).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub scope_id: NodeId,
    pub leaves: Vec<ExtractedVariable>,
    pub pos: Position,
}

/// Everything the walker produced for one file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collections {
    pub functions: Vec<FunctionRecord>,
    pub scopes: Vec<ScopeRecord>,
    pub variable_declarations: Vec<VariableDeclaration>,
    pub calls: Vec<CallRecord>,
    pub call_arguments: Vec<CallArgument>,
    pub literals: Vec<LiteralRecord>,
    pub object_literals: Vec<ObjectLiteralRecord>,
    pub array_literals: Vec<ArrayLiteralRecord>,
    pub mutations: Vec<MutationRecord>,
    pub update_expressions: Vec<UpdateExpressionRecord>,
    pub returns: Vec<ReturnRecord>,
    pub classes: Vec<ClassRecord>,
    pub imports: Vec<ImportRecord>,
    pub exports: Vec<ExportRecord>,
}

impl Collections {
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
            && self.scopes.is_empty()
            && self.variable_declarations.is_empty()
            && self.calls.is_empty()
            && self.literals.is_empty()
            && self.object_literals.is_empty()
            && self.array_literals.is_empty()
            && self.mutations.is_empty()
            && self.update_expressions.is_empty()
            && self.returns.is_empty()
            && self.classes.is_empty()
            && self.imports.is_empty()
            && self.exports.is_empty()
    }
}
