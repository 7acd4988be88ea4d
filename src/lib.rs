//! # srcscope - Cross-file scope graphs from srcML
//!
//! Builds a language-independent semantic model of a program from srcML
//! tagged syntax trees.
//!
//! srcscope provides:
//! - A tree-to-scope compiler parameterized by per-language descriptors
//! - An arena-backed scope graph of namespaces, types, methods and blocks
//! - Name and type resolution for variable uses, type uses and method calls
//! - Order-independent merging of per-file graphs and incremental file removal
//! - Call graph and impact queries over the resolved program

pub mod location;
pub mod srcml;
pub mod language;
pub mod scope;
pub mod parser;
pub mod edge;
pub mod callgraph;
pub mod program;
pub mod config;

// Re-exports for convenient access
pub use location::{LocationFactory, SourceLocation};
pub use srcml::Node;
pub use language::{Language, LanguageDescriptor, LanguageRegistry};
pub use scope::{
    AccessModifier, Alias, MethodCall, ResolvableUse, ResolvesToType, Scope, ScopeCategory,
    ScopeGraph, ScopeId, TypeKind, TypeUse, VariableUse,
};
pub use parser::{ParserContext, ScopeCompiler};
pub use callgraph::CallGraph;
pub use program::Program;

/// Result type alias for srcscope operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for srcscope operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A handler was given a node it cannot process. This is a caller bug.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Compile one srcML file unit into its own scope graph.
///
/// The returned graph has exactly one global namespace root.
pub fn compile(unit: &Node, descriptor: &LanguageDescriptor) -> Result<ScopeGraph> {
    ScopeCompiler::new(descriptor).compile_unit(unit)
}

/// Merge two scope graphs into one program graph.
pub fn merge(left: ScopeGraph, right: ScopeGraph) -> ScopeGraph {
    left.merge(right)
}

/// Retract everything `file_name` contributed to `graph`.
///
/// Orphaned scopes reported by the removal are re-homed under the global
/// namespace; use [`ScopeGraph::remove_file`] directly to handle them yourself.
pub fn remove_file(mut graph: ScopeGraph, file_name: &str) -> ScopeGraph {
    if let Some(orphans) = graph.remove_file(file_name) {
        let root = graph.root();
        for orphan in orphans {
            graph.add_child(root, orphan);
        }
    }
    graph
}
