//! Scope graph arena
//!
//! The graph tracks:
//! - Scope hierarchy (parent/child relationships, by id)
//! - Declared variables and method calls owned by each scope
//! - Namespace, type and method definitions with their signatures
//! - Every source location a scope was seen at
//!
//! Scopes live in an arena addressed by [`ScopeId`]. Merging or removing a
//! scope leaves a tombstone behind, so ids held elsewhere never alias a
//! different scope.

use super::declaration::{ParameterDeclaration, VariableDeclaration};
use super::merge::MergeConflict;
use super::uses::{MethodCall, NamedScopeUse, TypeUse};
use crate::language::Language;
use crate::location::SourceLocation;
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

/// Unique identifier for a scope within one graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Declared accessibility of a named scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessModifier {
    #[default]
    None,
    Public,
    Private,
    Protected,
    Internal,
}

impl AccessModifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessModifier::None => "none",
            AccessModifier::Public => "public",
            AccessModifier::Private => "private",
            AccessModifier::Protected => "protected",
            AccessModifier::Internal => "internal",
        }
    }
}

impl FromStr for AccessModifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "" | "none" => Ok(AccessModifier::None),
            "public" => Ok(AccessModifier::Public),
            "private" => Ok(AccessModifier::Private),
            "protected" => Ok(AccessModifier::Protected),
            "internal" => Ok(AccessModifier::Internal),
            _ => Err(Error::InvalidInput(format!("Unknown access modifier: {}", s))),
        }
    }
}

impl fmt::Display for AccessModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of a type definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Struct,
    Union,
    Interface,
    Enum,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Union => "union",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
        }
    }

    /// Kind for a srcML type tag, including the forward-declaration forms
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "class" | "class_decl" => Some(TypeKind::Class),
            "struct" | "struct_decl" => Some(TypeKind::Struct),
            "union" | "union_decl" => Some(TypeKind::Union),
            "interface" | "interface_decl" => Some(TypeKind::Interface),
            "enum" | "enum_decl" => Some(TypeKind::Enum),
            _ => None,
        }
    }
}

impl FromStr for TypeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TypeKind::from_tag(&s.to_lowercase())
            .ok_or_else(|| Error::InvalidInput(format!("Unknown type kind: {}", s)))
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The four kinds of scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeCategory {
    Block,
    Namespace,
    Type,
    Method,
}

impl ScopeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeCategory::Block => "block",
            ScopeCategory::Namespace => "namespace",
            ScopeCategory::Type => "type",
            ScopeCategory::Method => "method",
        }
    }
}

impl FromStr for ScopeCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "block" | "scope" => Ok(ScopeCategory::Block),
            "namespace" | "ns" | "package" => Ok(ScopeCategory::Namespace),
            "type" | "class" | "struct" => Ok(ScopeCategory::Type),
            "method" | "function" => Ok(ScopeCategory::Method),
            _ => Err(Error::InvalidInput(format!("Unknown scope category: {}", s))),
        }
    }
}

impl fmt::Display for ScopeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamespaceDefinition {
    /// True only for the unnamed root of a graph
    pub is_global: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    pub kind: TypeKind,
    /// Parent types in written order; the first listed wins lookup ties
    pub parent_types: Vec<TypeUse>,
    /// Every place each parent type is written, by position in `parent_types`
    parent_type_locations: Vec<Vec<SourceLocation>>,
    pub is_generic: bool,
    pub type_parameters: Vec<String>,
}

impl TypeDefinition {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            parent_types: Vec::new(),
            parent_type_locations: Vec::new(),
            is_generic: false,
            type_parameters: Vec::new(),
        }
    }

    /// Add a parent type. One with the same qualified name is kept once,
    /// with the locations of both.
    pub fn add_parent_type(&mut self, parent: TypeUse) {
        self.parent_type_locations.resize_with(self.parent_types.len(), Vec::new);
        let location = parent.location.clone();
        let position = match self.parent_types.iter().position(|p| p.same_qualified_name(&parent)) {
            Some(position) => position,
            None => {
                self.parent_types.push(parent);
                self.parent_type_locations.push(Vec::new());
                self.parent_types.len() - 1
            }
        };
        let locations = &mut self.parent_type_locations[position];
        if let Some(location) = location {
            if !locations.iter().any(|l| l.same_node(&location)) {
                locations.push(location);
            }
        }
    }

    /// Take over the parent types of another definition of this type
    pub(crate) fn merge_parent_types(&mut self, other: &TypeDefinition) {
        for (position, parent) in other.parent_types.iter().enumerate() {
            for location in other.parent_type_locations(position) {
                let mut written = parent.clone();
                written.location = Some(location.clone());
                self.add_parent_type(written);
            }
            if other.parent_type_locations(position).is_empty() {
                self.add_parent_type(parent.clone());
            }
        }
    }

    /// Locations a parent type is written at
    pub fn parent_type_locations(&self, position: usize) -> Vec<&SourceLocation> {
        match self.parent_type_locations.get(position) {
            Some(locations) if !locations.is_empty() => locations.iter().collect(),
            _ => self.parent_types.get(position).and_then(|p| p.location.as_ref()).into_iter().collect(),
        }
    }

    /// Forget the parent types written in `file`. A parent stays while another
    /// file still writes it, or when it has no location at all.
    pub(crate) fn remove_parent_types_in(&mut self, file: &str) {
        let locations: Vec<Vec<SourceLocation>> = (0..self.parent_types.len())
            .map(|position| self.parent_type_locations(position).into_iter().cloned().collect())
            .collect();
        let parents = std::mem::take(&mut self.parent_types);
        let mut kept = Vec::with_capacity(parents.len());
        let mut kept_locations = Vec::with_capacity(parents.len());
        for (mut parent, mut written) in parents.into_iter().zip(locations) {
            if written.is_empty() {
                kept.push(parent);
                kept_locations.push(written);
                continue;
            }
            written.retain(|l| !l.is_in(file));
            if written.is_empty() {
                continue;
            }
            if parent.location.as_ref().is_some_and(|l| l.is_in(file)) {
                parent.location = written.first().cloned();
            }
            kept.push(parent);
            kept_locations.push(written);
        }
        self.parent_types = kept;
        self.parent_type_locations = kept_locations;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodDefinition {
    pub is_constructor: bool,
    pub is_destructor: bool,
    /// Absent for constructors, destructors and `void` methods
    pub return_type: Option<TypeUse>,
    /// Ordered by position; the position is the merge key
    pub parameters: Vec<ParameterDeclaration>,
    /// Qualification written on the method name (`B` in `void B::Foo()`)
    pub name_prefix: Vec<NamedScopeUse>,
}

impl MethodDefinition {
    /// Type names of the parameters, in position order
    pub fn parameter_type_names(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .map(|p| p.parameter_type.name.as_str())
            .collect()
    }
}

/// What a scope is, with the data specific to that kind
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeVariant {
    Block,
    Namespace(NamespaceDefinition),
    Type(TypeDefinition),
    Method(MethodDefinition),
}

impl ScopeVariant {
    pub fn category(&self) -> ScopeCategory {
        match self {
            ScopeVariant::Block => ScopeCategory::Block,
            ScopeVariant::Namespace(_) => ScopeCategory::Namespace,
            ScopeVariant::Type(_) => ScopeCategory::Type,
            ScopeVariant::Method(_) => ScopeCategory::Method,
        }
    }
}

/// A node in the program's static structure.
///
/// A scope owns its children and the declarations and calls written
/// directly in it; nested containers own their own.
#[derive(Debug, Clone)]
pub struct Scope {
    /// Empty for blocks, the global namespace and anonymous constructs
    pub name: String,
    pub accessibility: AccessModifier,
    pub variant: ScopeVariant,
    pub language: Option<Language>,
    pub(crate) parent: Option<ScopeId>,
    pub(crate) children: Vec<ScopeId>,
    /// Declarations by name, in insertion order
    pub declared_variables: IndexMap<String, Vec<VariableDeclaration>>,
    pub method_calls: Vec<MethodCall>,
    pub locations: Vec<SourceLocation>,
}

impl Scope {
    fn with_variant(name: impl Into<String>, variant: ScopeVariant) -> Self {
        Self {
            name: name.into(),
            accessibility: AccessModifier::None,
            variant,
            language: None,
            parent: None,
            children: Vec::new(),
            declared_variables: IndexMap::new(),
            method_calls: Vec::new(),
            locations: Vec::new(),
        }
    }

    /// An unnamed block scope
    pub fn block() -> Self {
        Self::with_variant(String::new(), ScopeVariant::Block)
    }

    /// The unnamed global namespace
    pub fn global() -> Self {
        Self::with_variant(
            String::new(),
            ScopeVariant::Namespace(NamespaceDefinition { is_global: true }),
        )
    }

    pub fn namespace(name: impl Into<String>) -> Self {
        Self::with_variant(name, ScopeVariant::Namespace(NamespaceDefinition::default()))
    }

    pub fn type_definition(name: impl Into<String>, kind: TypeKind) -> Self {
        Self::with_variant(name, ScopeVariant::Type(TypeDefinition::new(kind)))
    }

    pub fn method(name: impl Into<String>, definition: MethodDefinition) -> Self {
        Self::with_variant(name, ScopeVariant::Method(definition))
    }

    pub fn category(&self) -> ScopeCategory {
        self.variant.category()
    }

    /// Namespaces, types and methods carry a name; blocks do not
    pub fn is_named(&self) -> bool {
        !matches!(self.variant, ScopeVariant::Block)
    }

    pub fn is_global(&self) -> bool {
        matches!(&self.variant, ScopeVariant::Namespace(ns) if ns.is_global)
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn children(&self) -> &[ScopeId] {
        &self.children
    }

    pub fn as_namespace(&self) -> Option<&NamespaceDefinition> {
        match &self.variant {
            ScopeVariant::Namespace(ns) => Some(ns),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&TypeDefinition> {
        match &self.variant {
            ScopeVariant::Type(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodDefinition> {
        match &self.variant {
            ScopeVariant::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn as_method_mut(&mut self) -> Option<&mut MethodDefinition> {
        match &mut self.variant {
            ScopeVariant::Method(method) => Some(method),
            _ => None,
        }
    }

    /// The first definition location, or the first reference if there is none
    pub fn primary_location(&self) -> Option<&SourceLocation> {
        self.locations
            .iter()
            .find(|l| !l.is_reference)
            .or_else(|| self.locations.first())
    }

    /// Record a location unless the same node is already recorded
    pub fn add_location(&mut self, location: SourceLocation) {
        match self.locations.iter_mut().find(|l| l.same_node(&location)) {
            // a definition supersedes a reference to the same node
            Some(existing) => existing.is_reference &= location.is_reference,
            None => self.locations.push(location),
        }
    }

    /// Register a declaration under its name
    pub fn add_declared_variable(&mut self, declaration: VariableDeclaration) {
        self.declared_variables
            .entry(declaration.name.clone())
            .or_default()
            .push(declaration);
    }

    /// All declarations, in insertion order
    pub fn declarations(&self) -> impl Iterator<Item = &VariableDeclaration> {
        self.declared_variables.values().flatten()
    }

    /// True when every location of this scope lies in `file`
    pub fn is_only_in(&self, file: &str) -> bool {
        !self.locations.is_empty() && self.locations.iter().all(|l| l.is_in(file))
    }

    /// True when at least one location of this scope lies in `file`
    pub fn is_in(&self, file: &str) -> bool {
        self.locations.iter().any(|l| l.is_in(file))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            ScopeVariant::Block => write!(f, "Block"),
            ScopeVariant::Namespace(ns) if ns.is_global => write!(f, "Namespace: <global>"),
            ScopeVariant::Namespace(_) => write!(f, "Namespace: {}", self.name),
            ScopeVariant::Type(ty) => write!(f, "{}: {}", capitalized(ty.kind.as_str()), self.name),
            ScopeVariant::Method(method) => {
                if method.is_constructor {
                    write!(f, "Constructor: ")?;
                } else if method.is_destructor {
                    write!(f, "Destructor: ")?;
                } else {
                    write!(f, "Method: ")?;
                }
                if self.accessibility != AccessModifier::None {
                    write!(f, "{} ", self.accessibility)?;
                }
                match &method.return_type {
                    Some(return_type) => write!(f, "{} ", return_type)?,
                    None if !(method.is_constructor || method.is_destructor) => write!(f, "void ")?,
                    None => {}
                }
                let parameters: Vec<String> = method.parameters.iter().map(|p| p.to_string()).collect();
                write!(f, "{}({})", self.name, parameters.join(", "))
            }
        }
    }
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Remaps the scope ids held inside uses and declarations
pub(crate) trait Rebind {
    fn rebind(&mut self, map: &dyn Fn(ScopeId) -> ScopeId);
}

impl Rebind for Scope {
    fn rebind(&mut self, map: &dyn Fn(ScopeId) -> ScopeId) {
        self.parent = self.parent.map(map);
        for child in &mut self.children {
            *child = map(*child);
        }
        for declaration in self.declared_variables.values_mut().flatten() {
            declaration.rebind(map);
        }
        for call in &mut self.method_calls {
            call.rebind(map);
        }
        match &mut self.variant {
            ScopeVariant::Block | ScopeVariant::Namespace(_) => {}
            ScopeVariant::Type(ty) => {
                for parent in &mut ty.parent_types {
                    parent.rebind(map);
                }
            }
            ScopeVariant::Method(method) => {
                if let Some(return_type) = &mut method.return_type {
                    return_type.rebind(map);
                }
                for parameter in &mut method.parameters {
                    parameter.rebind(map);
                }
                for segment in &mut method.name_prefix {
                    segment.rebind(map);
                }
            }
        }
    }
}

/// Arena of scopes rooted at one global namespace
#[derive(Debug, Clone)]
pub struct ScopeGraph {
    pub(crate) scopes: Vec<Option<Scope>>,
    pub(crate) root: ScopeId,
    pub(crate) conflicts: Vec<MergeConflict>,
}

impl Default for ScopeGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeGraph {
    /// Create a graph holding only the global namespace
    pub fn new() -> Self {
        Self {
            scopes: vec![Some(Scope::global())],
            root: ScopeId(0),
            conflicts: Vec::new(),
        }
    }

    /// The global namespace
    pub fn root(&self) -> ScopeId {
        self.root
    }

    /// Look up a live scope
    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: ScopeId) -> Option<&mut Scope> {
        self.scopes.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// True when `id` names a scope that was neither merged away nor removed
    pub fn contains(&self, id: ScopeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live scopes
    pub fn len(&self) -> usize {
        self.scopes.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All live scopes, in arena order
    pub fn scopes(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|s| (ScopeId(i as u32), s)))
    }

    /// Merge conflicts recorded while this graph was assembled
    pub fn conflicts(&self) -> &[MergeConflict] {
        &self.conflicts
    }

    /// Add a detached scope to the arena
    pub fn insert(&mut self, scope: Scope) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Some(scope));
        id
    }

    /// Append `child` to `parent` without looking for a merge partner
    pub(crate) fn attach(&mut self, parent: ScopeId, child: ScopeId) {
        self[child].parent = Some(parent);
        self[parent].children.push(child);
    }

    /// Unlink a scope from its parent; the subtree stays in the arena
    pub fn detach(&mut self, id: ScopeId) {
        if let Some(parent) = self.get(id).and_then(|s| s.parent) {
            if let Some(scope) = self.get_mut(parent) {
                scope.children.retain(|c| *c != id);
            }
        }
        if let Some(scope) = self.get_mut(id) {
            scope.parent = None;
        }
    }

    /// Drop a scope and all its descendants from the arena
    pub(crate) fn discard(&mut self, id: ScopeId) {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(scope) = self.scopes.get_mut(current.index()).and_then(Option::take) {
                pending.extend(scope.children);
            }
        }
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.get(id).and_then(|s| s.parent)
    }

    pub fn children(&self, id: ScopeId) -> &[ScopeId] {
        self.get(id).map(|s| s.children.as_slice()).unwrap_or(&[])
    }

    /// `id` followed by each of its ancestors up to the root
    pub fn ancestors_and_self(&self, id: ScopeId) -> Vec<ScopeId> {
        let mut chain = Vec::new();
        let mut current = self.get(id).map(|_| id);
        while let Some(scope) = current {
            chain.push(scope);
            current = self.parent(scope);
        }
        chain
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: ScopeId) -> Vec<ScopeId> {
        let mut chain = self.ancestors_and_self(id);
        if !chain.is_empty() {
            chain.remove(0);
        }
        chain
    }

    /// Nearest strict ancestor of the given category
    pub fn nearest_ancestor(&self, id: ScopeId, category: ScopeCategory) -> Option<ScopeId> {
        self.ancestors(id)
            .into_iter()
            .find(|a| self[*a].category() == category)
    }

    /// Dotted name built from the names of all named ancestors.
    ///
    /// Blocks and the global namespace contribute nothing, so a type inside
    /// a function `main` is `main.A`.
    pub fn full_name(&self, id: ScopeId) -> String {
        self.name_path(id).join(".")
    }

    /// The segments of [`full_name`](Self::full_name), outermost first
    pub fn name_path(&self, id: ScopeId) -> Vec<&str> {
        let mut names = self.qualifier_names(id);
        if let Some(scope) = self.get(id).filter(|s| s.is_named() && !s.name.is_empty()) {
            names.push(scope.name.as_str());
        }
        names
    }

    /// Names of the named ancestors of `id`, outermost first, excluding `id`
    pub(crate) fn qualifier_names(&self, id: ScopeId) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .ancestors(id)
            .into_iter()
            .map(|a| &self[a])
            .filter(|s| s.is_named() && !s.name.is_empty())
            .map(|s| s.name.as_str())
            .collect();
        names.reverse();
        names
    }

    /// Direct children called `name`
    pub fn children_named(&self, id: ScopeId, name: &str) -> Vec<ScopeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self[*c].name == name)
            .collect()
    }

    /// Direct children called `name` of one category
    pub fn children_named_of(&self, id: ScopeId, name: &str, category: ScopeCategory) -> Vec<ScopeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self[*c].name == name && self[*c].category() == category)
            .collect()
    }

    /// All descendants of `id` in pre-order, excluding `id`
    pub fn descendants(&self, id: ScopeId) -> Vec<ScopeId> {
        let mut found = Vec::new();
        let mut stack: Vec<ScopeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            found.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        found
    }

    /// All descendants of `id` of one category
    pub fn descendants_of(&self, id: ScopeId, category: ScopeCategory) -> Vec<ScopeId> {
        self.descendants(id)
            .into_iter()
            .filter(|d| self[*d].category() == category)
            .collect()
    }

    /// Namespaces reached from the root by following `path` one name at a time
    pub fn find_namespaces<S: AsRef<str>>(&self, path: &[S]) -> Vec<ScopeId> {
        let mut current = vec![self.root];
        for segment in path {
            current = current
                .into_iter()
                .flat_map(|ns| self.children_named_of(ns, segment.as_ref(), ScopeCategory::Namespace))
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }

    /// Find scopes by full dotted name
    pub fn find_by_full_name(&self, full_name: &str) -> Vec<ScopeId> {
        self.scopes()
            .filter(|(id, scope)| scope.is_named() && self.full_name(*id) == full_name)
            .map(|(id, _)| id)
            .collect()
    }

    /// Every method call written in `id` or any of its descendants
    pub fn calls_within(&self, id: ScopeId) -> Vec<&MethodCall> {
        std::iter::once(id)
            .chain(self.descendants(id))
            .flat_map(|s| self[s].method_calls.iter())
            .collect()
    }
}

impl Index<ScopeId> for ScopeGraph {
    type Output = Scope;

    fn index(&self, id: ScopeId) -> &Scope {
        match self.get(id) {
            Some(scope) => scope,
            None => panic!("scope {} is not live in this graph", id),
        }
    }
}

impl IndexMut<ScopeId> for ScopeGraph {
    fn index_mut(&mut self, id: ScopeId) -> &mut Scope {
        match self.get_mut(id) {
            Some(scope) => scope,
            None => panic!("scope {} is not live in this graph", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (ScopeGraph, ScopeId, ScopeId, ScopeId) {
        let mut graph = ScopeGraph::new();
        let root = graph.root();
        let ns = graph.insert(Scope::namespace("N"));
        graph.attach(root, ns);
        let class = graph.insert(Scope::type_definition("A", TypeKind::Class));
        graph.attach(ns, class);
        let method = graph.insert(Scope::method("Foo", MethodDefinition::default()));
        graph.attach(class, method);
        (graph, ns, class, method)
    }

    #[test]
    fn test_scope_hierarchy() {
        let (graph, ns, class, method) = sample();
        assert_eq!(graph.parent(method), Some(class));
        assert_eq!(graph.parent(class), Some(ns));
        assert_eq!(graph.parent(graph.root()), None);
        assert!(graph[graph.root()].is_global());
        assert_eq!(graph.ancestors_and_self(method), vec![method, class, ns, graph.root()]);
    }

    #[test]
    fn test_full_name_skips_global_and_blocks() {
        let (mut graph, _, class, method) = sample();
        let block = graph.insert(Scope::block());
        graph.attach(method, block);
        let local = graph.insert(Scope::type_definition("Local", TypeKind::Struct));
        graph.attach(block, local);

        assert_eq!(graph.full_name(class), "N.A");
        assert_eq!(graph.full_name(local), "N.A.Foo.Local");
        assert_eq!(graph.full_name(graph.root()), "");
        assert_eq!(graph.nearest_ancestor(local, ScopeCategory::Method), Some(method));
    }

    #[test]
    fn test_descendants_and_queries() {
        let (graph, ns, class, method) = sample();
        assert_eq!(graph.descendants(graph.root()), vec![ns, class, method]);
        assert_eq!(graph.descendants_of(graph.root(), ScopeCategory::Type), vec![class]);
        assert_eq!(graph.find_namespaces(&["N"]), vec![ns]);
        assert!(graph.find_namespaces(&["M"]).is_empty());
        assert_eq!(graph.find_by_full_name("N.A.Foo"), vec![method]);
    }

    #[test]
    fn test_detach_and_discard() {
        let (mut graph, ns, class, method) = sample();
        graph.detach(class);
        assert!(graph.children(ns).is_empty());
        assert!(graph.contains(method));

        graph.discard(class);
        assert!(!graph.contains(class));
        assert!(!graph.contains(method));
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_add_location_prefers_definition() {
        let mut scope = Scope::type_definition("A", TypeKind::Class);
        let location = SourceLocation::new("A.h", "/unit/class_decl[1]", 1);
        scope.add_location(location.clone().as_reference());
        scope.add_location(location);
        assert_eq!(scope.locations.len(), 1);
        assert!(!scope.locations[0].is_reference);
    }

    #[test]
    fn test_method_display() {
        let method = Scope::method("Foo", MethodDefinition::default());
        assert_eq!(method.to_string(), "Method: void Foo()");

        let constructor = Scope::method(
            "A",
            MethodDefinition {
                is_constructor: true,
                ..Default::default()
            },
        );
        assert_eq!(constructor.to_string(), "Constructor: A()");
    }
}
