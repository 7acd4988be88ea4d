//! Scope Graph - language-independent model of a program's static structure
//!
//! srcscope compiles each file into its own graph, then merges graphs into
//! one program graph. Uses recorded in the graph are resolved on demand.

pub mod graph;
pub mod declaration;
pub mod uses;
pub mod resolver;
pub mod merge;
pub mod snapshot;

pub use graph::{
    AccessModifier, MethodDefinition, NamespaceDefinition, Scope, ScopeCategory, ScopeGraph, ScopeId,
    ScopeVariant, TypeDefinition, TypeKind,
};
pub use declaration::{DeclarationRef, ParameterDeclaration, VariableDeclaration};
pub use uses::{Alias, LiteralUse, MethodCall, NamedScopeUse, TypeUse, UseExpression, VariableUse};
pub use resolver::{ResolvableUse, ResolvesToType};
pub use merge::MergeConflict;
pub use snapshot::ScopeSnapshot;
