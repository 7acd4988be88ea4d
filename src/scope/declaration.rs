//! Variable and parameter declarations

use super::graph::{Rebind, ScopeId};
use super::uses::TypeUse;
use crate::location::SourceLocation;
use std::fmt;

/// A named variable declared directly in a scope
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub name: String,
    /// Absent when the declaration was written without a readable type
    pub variable_type: Option<TypeUse>,
    pub locations: Vec<SourceLocation>,
    /// The scope that owns this declaration
    pub scope: ScopeId,
}

impl VariableDeclaration {
    pub fn new(name: impl Into<String>, variable_type: Option<TypeUse>, location: SourceLocation, scope: ScopeId) -> Self {
        Self {
            name: name.into(),
            variable_type,
            locations: vec![location],
            scope,
        }
    }

    /// True when both declarations were seen at a common node
    pub fn shares_location(&self, other: &VariableDeclaration) -> bool {
        self.locations
            .iter()
            .any(|l| other.locations.iter().any(|o| l.same_node(o)))
    }
}

impl Rebind for VariableDeclaration {
    fn rebind(&mut self, map: &dyn Fn(ScopeId) -> ScopeId) {
        self.scope = map(self.scope);
        if let Some(variable_type) = &mut self.variable_type {
            variable_type.rebind(map);
        }
    }
}

/// A method parameter, bound to its method and position
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDeclaration {
    /// Empty for unnamed parameters
    pub name: String,
    pub parameter_type: TypeUse,
    pub locations: Vec<SourceLocation>,
    pub method: ScopeId,
    pub position: usize,
}

impl Rebind for ParameterDeclaration {
    fn rebind(&mut self, map: &dyn Fn(ScopeId) -> ScopeId) {
        self.method = map(self.method);
        self.parameter_type.rebind(map);
    }
}

impl fmt::Display for ParameterDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.parameter_type)
        } else {
            write!(f, "{} {}", self.parameter_type, self.name)
        }
    }
}

/// Either kind of declaration a variable use can resolve to
#[derive(Debug, Clone, Copy)]
pub enum DeclarationRef<'g> {
    Variable(&'g VariableDeclaration),
    Parameter(&'g ParameterDeclaration),
}

impl<'g> DeclarationRef<'g> {
    pub fn name(&self) -> &'g str {
        match self {
            DeclarationRef::Variable(v) => &v.name,
            DeclarationRef::Parameter(p) => &p.name,
        }
    }

    pub fn variable_type(&self) -> Option<&'g TypeUse> {
        match self {
            DeclarationRef::Variable(v) => v.variable_type.as_ref(),
            DeclarationRef::Parameter(p) => Some(&p.parameter_type),
        }
    }

    pub fn locations(&self) -> &'g [SourceLocation] {
        match self {
            DeclarationRef::Variable(v) => &v.locations,
            DeclarationRef::Parameter(p) => &p.locations,
        }
    }

    /// The owning scope, or the method for a parameter
    pub fn scope(&self) -> ScopeId {
        match self {
            DeclarationRef::Variable(v) => v.scope,
            DeclarationRef::Parameter(p) => p.method,
        }
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self, DeclarationRef::Parameter(_))
    }

    /// Identity comparison
    pub fn same_as(&self, other: &DeclarationRef<'_>) -> bool {
        match (self, other) {
            (DeclarationRef::Variable(a), DeclarationRef::Variable(b)) => std::ptr::eq(*a, *b),
            (DeclarationRef::Parameter(a), DeclarationRef::Parameter(b)) => std::ptr::eq(*a, *b),
            _ => false,
        }
    }
}
