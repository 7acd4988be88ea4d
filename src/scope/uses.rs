//! Resolvable uses: references to names that resolution binds to declarations
//!
//! Every use remembers the scope it was written in. Qualification is kept as
//! an ordered prefix (`A::B::C` is prefix `[A, B]` and name `C`) and a
//! receiver expression as a calling-object chain (`a->b.Foo()` has calling
//! object `b`, whose calling object is `a`).

use super::graph::{Rebind, ScopeId};
use crate::language::{Language, LiteralKind};
use crate::location::SourceLocation;
use std::fmt;
use std::sync::Arc;

/// A reference to a namespace or type used as a qualifier
#[derive(Debug, Clone, PartialEq)]
pub struct NamedScopeUse {
    pub name: String,
    pub location: Option<SourceLocation>,
    pub language: Option<Language>,
    pub parent_scope: Option<ScopeId>,
    /// Set for segments that can only name a namespace (import paths)
    pub namespace_only: bool,
}

impl NamedScopeUse {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: None,
            language: None,
            parent_scope: None,
            namespace_only: false,
        }
    }

    /// A segment that names a namespace
    pub fn namespace(name: impl Into<String>) -> Self {
        Self {
            namespace_only: true,
            ..Self::new(name)
        }
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

impl Rebind for NamedScopeUse {
    fn rebind(&mut self, map: &dyn Fn(ScopeId) -> ScopeId) {
        self.parent_scope = self.parent_scope.map(map);
    }
}

/// An import or using directive
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    /// Namespace path, outermost first
    pub imported_namespace: Vec<NamedScopeUse>,
    /// The specific symbol imported, absent for whole-namespace imports
    pub imported_named_scope: Option<NamedScopeUse>,
    pub location: Option<SourceLocation>,
    pub language: Option<Language>,
}

impl Alias {
    pub fn is_namespace_import(&self) -> bool {
        self.imported_named_scope.is_none()
    }

    pub fn namespace_path(&self) -> Vec<&str> {
        self.imported_namespace.iter().map(|n| n.name.as_str()).collect()
    }

    /// Name of the imported symbol, if this imports one
    pub fn imported_name(&self) -> Option<&str> {
        self.imported_named_scope.as_ref().map(|n| n.name.as_str())
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut path = self.namespace_path().join(".");
        match self.imported_name() {
            Some(name) if path.is_empty() => path = name.to_string(),
            Some(name) => {
                path.push('.');
                path.push_str(name);
            }
            None => path.push_str(".*"),
        }
        write!(f, "import {}", path)
    }
}

/// A written reference to a type
#[derive(Debug, Clone, PartialEq)]
pub struct TypeUse {
    pub name: String,
    /// Qualifier segments, outermost first
    pub prefix: Vec<NamedScopeUse>,
    pub type_arguments: Vec<TypeUse>,
    /// Imports visible where the use was written
    pub aliases: Arc<[Alias]>,
    pub parent_scope: ScopeId,
    pub location: Option<SourceLocation>,
    pub language: Option<Language>,
}

impl TypeUse {
    pub fn new(name: impl Into<String>, parent_scope: ScopeId) -> Self {
        Self {
            name: name.into(),
            prefix: Vec::new(),
            type_arguments: Vec::new(),
            aliases: Arc::from(Vec::new()),
            parent_scope,
            location: None,
            language: None,
        }
    }

    pub fn is_generic(&self) -> bool {
        !self.type_arguments.is_empty()
    }

    pub fn prefix_names(&self) -> Vec<&str> {
        self.prefix.iter().map(|p| p.name.as_str()).collect()
    }

    /// Same name and same qualifier names
    pub fn same_qualified_name(&self, other: &TypeUse) -> bool {
        self.name == other.name && self.prefix_names() == other.prefix_names()
    }
}

impl Rebind for TypeUse {
    fn rebind(&mut self, map: &dyn Fn(ScopeId) -> ScopeId) {
        self.parent_scope = map(self.parent_scope);
        for segment in &mut self.prefix {
            segment.rebind(map);
        }
        for argument in &mut self.type_arguments {
            argument.rebind(map);
        }
    }
}

impl fmt::Display for TypeUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.prefix {
            write!(f, "{}.", segment.name)?;
        }
        write!(f, "{}", self.name)?;
        if self.is_generic() {
            let arguments: Vec<String> = self.type_arguments.iter().map(|a| a.to_string()).collect();
            write!(f, "<{}>", arguments.join(", "))?;
        }
        Ok(())
    }
}

/// A reference to a variable, field or parameter
#[derive(Debug, Clone, PartialEq)]
pub struct VariableUse {
    /// Empty for expressions that are not a plain name
    pub name: String,
    /// Receiver expression this name was accessed through
    pub calling_object: Option<Box<VariableUse>>,
    pub(crate) parent_scope: ScopeId,
    pub location: Option<SourceLocation>,
    pub language: Option<Language>,
}

impl VariableUse {
    pub fn new(name: impl Into<String>, parent_scope: ScopeId) -> Self {
        Self {
            name: name.into(),
            calling_object: None,
            parent_scope,
            location: None,
            language: None,
        }
    }

    pub fn with_calling_object(mut self, mut calling_object: VariableUse) -> Self {
        calling_object.set_parent_scope(self.parent_scope);
        self.calling_object = Some(Box::new(calling_object));
        self
    }

    pub fn parent_scope(&self) -> ScopeId {
        self.parent_scope
    }

    /// Move this use, and its whole calling-object chain, to another scope
    pub fn set_parent_scope(&mut self, scope: ScopeId) {
        self.parent_scope = scope;
        if let Some(calling_object) = &mut self.calling_object {
            calling_object.set_parent_scope(scope);
        }
    }

    /// The innermost end of the calling-object chain comes last
    pub fn calling_object_chain(&self) -> Vec<&VariableUse> {
        let mut chain = Vec::new();
        let mut current = self.calling_object.as_deref();
        while let Some(object) = current {
            chain.push(object);
            current = object.calling_object.as_deref();
        }
        chain
    }
}

impl Rebind for VariableUse {
    fn rebind(&mut self, map: &dyn Fn(ScopeId) -> ScopeId) {
        self.parent_scope = map(self.parent_scope);
        if let Some(calling_object) = &mut self.calling_object {
            calling_object.rebind(map);
        }
    }
}

/// A literal expression typed by the language's literal hooks
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralUse {
    pub kind: LiteralKind,
    /// Type name given by the language, absent for `null`
    pub type_name: Option<String>,
    pub value: String,
    pub parent_scope: ScopeId,
    pub location: Option<SourceLocation>,
}

impl Rebind for LiteralUse {
    fn rebind(&mut self, map: &dyn Fn(ScopeId) -> ScopeId) {
        self.parent_scope = map(self.parent_scope);
    }
}

/// A call argument
#[derive(Debug, Clone, PartialEq)]
pub enum UseExpression {
    Variable(VariableUse),
    Literal(LiteralUse),
}

impl UseExpression {
    pub fn parent_scope(&self) -> ScopeId {
        match self {
            UseExpression::Variable(v) => v.parent_scope,
            UseExpression::Literal(l) => l.parent_scope,
        }
    }

    fn set_parent_scope(&mut self, scope: ScopeId) {
        match self {
            UseExpression::Variable(v) => v.set_parent_scope(scope),
            UseExpression::Literal(l) => l.parent_scope = scope,
        }
    }
}

impl Rebind for UseExpression {
    fn rebind(&mut self, map: &dyn Fn(ScopeId) -> ScopeId) {
        match self {
            UseExpression::Variable(v) => v.rebind(map),
            UseExpression::Literal(l) => l.rebind(map),
        }
    }
}

/// A call written in a scope
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub name: String,
    pub is_constructor: bool,
    pub is_destructor: bool,
    pub arguments: Vec<UseExpression>,
    pub calling_object: Option<VariableUse>,
    /// Imports visible at the call, only kept when there is no calling object
    pub aliases: Arc<[Alias]>,
    pub(crate) parent_scope: ScopeId,
    pub location: SourceLocation,
    pub language: Option<Language>,
}

impl MethodCall {
    pub fn new(name: impl Into<String>, parent_scope: ScopeId, location: SourceLocation) -> Self {
        Self {
            name: name.into(),
            is_constructor: false,
            is_destructor: false,
            arguments: Vec::new(),
            calling_object: None,
            aliases: Arc::from(Vec::new()),
            parent_scope,
            location,
            language: None,
        }
    }

    pub fn parent_scope(&self) -> ScopeId {
        self.parent_scope
    }

    /// Move this call, its receiver chain and its arguments to another scope
    pub fn set_parent_scope(&mut self, scope: ScopeId) {
        self.parent_scope = scope;
        if let Some(calling_object) = &mut self.calling_object {
            calling_object.set_parent_scope(scope);
        }
        for argument in &mut self.arguments {
            argument.set_parent_scope(scope);
        }
    }
}

impl Rebind for MethodCall {
    fn rebind(&mut self, map: &dyn Fn(ScopeId) -> ScopeId) {
        self.parent_scope = map(self.parent_scope);
        if let Some(calling_object) = &mut self.calling_object {
            calling_object.rebind(map);
        }
        for argument in &mut self.arguments {
            argument.rebind(map);
        }
    }
}

impl fmt::Display for MethodCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut receivers: Vec<&str> = self
            .calling_object
            .iter()
            .flat_map(|c| std::iter::once(c).chain(c.calling_object_chain()))
            .map(|c| c.name.as_str())
            .collect();
        receivers.reverse();
        for receiver in receivers {
            write!(f, "{}.", receiver)?;
        }
        if self.is_constructor {
            write!(f, "new ")?;
        } else if self.is_destructor {
            write!(f, "~")?;
        }
        write!(f, "{}({})", self.name, self.arguments.len())
    }
}
