//! Parser - compiles srcML file units into scope graphs
//!
//! [`ScopeCompiler`] walks a unit under the rules of one language
//! descriptor; [`ParserContext`] carries the per-file state of that walk.

pub mod context;
pub mod compiler;

pub use context::ParserContext;
pub use compiler::ScopeCompiler;
