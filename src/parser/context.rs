//! Per-file compilation state
//!
//! One context per file unit. It owns the graph being built, the stack of
//! scopes currently open, the imports visible at the current point and a
//! location factory bound to the file.

use crate::language::Language;
use crate::location::{LocationFactory, SourceLocation};
use crate::scope::{Alias, Scope, ScopeGraph, ScopeId};
use crate::srcml::Node;
use std::sync::Arc;

pub struct ParserContext {
    graph: ScopeGraph,
    stack: Vec<ScopeId>,
    aliases: Arc<[Alias]>,
    locations: LocationFactory,
    language: Language,
    /// Access region (`public`, `private`, ...) the walk is currently inside
    pub(crate) region: Option<String>,
    /// Template parameters waiting for the type they were written on
    pub(crate) type_parameters: Vec<String>,
}

impl ParserContext {
    /// Start a context for `unit`; the file name comes from its `filename` attribute
    pub fn new(unit: &Node, language: Language) -> Self {
        let graph = ScopeGraph::new();
        let root = graph.root();
        Self {
            graph,
            stack: vec![root],
            aliases: Arc::from(Vec::new()),
            locations: LocationFactory::new(unit.attribute("filename").unwrap_or_default()),
            language,
            region: None,
            type_parameters: Vec::new(),
        }
    }

    pub fn file(&self) -> &str {
        self.locations.file()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// The innermost open scope
    pub fn current_scope(&self) -> ScopeId {
        self.stack.last().copied().unwrap_or(self.graph.root())
    }

    pub fn current_mut(&mut self) -> &mut Scope {
        let id = self.current_scope();
        &mut self.graph[id]
    }

    pub fn graph(&self) -> &ScopeGraph {
        &self.graph
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.graph[id]
    }

    /// Imports visible at the current point
    pub fn aliases(&self) -> Arc<[Alias]> {
        Arc::clone(&self.aliases)
    }

    /// Make `aliases` visible in addition to the current ones; returns the
    /// previous set for [`restore_aliases`](Self::restore_aliases)
    pub fn push_aliases(&mut self, aliases: Vec<Alias>) -> Arc<[Alias]> {
        let previous = Arc::clone(&self.aliases);
        if !aliases.is_empty() {
            self.aliases = previous.iter().cloned().chain(aliases).collect();
        }
        previous
    }

    pub fn restore_aliases(&mut self, aliases: Arc<[Alias]>) {
        self.aliases = aliases;
    }

    /// Location of `node` in this file
    pub fn location(&self, node: &Node, is_reference: bool) -> SourceLocation {
        self.locations.create(node, is_reference)
    }

    /// Open `scope` for `node`, run `body` inside it, then close it.
    ///
    /// The scope is stamped with the node's location and the file's language
    /// and, once `body` returns, added to the scope that was current before.
    /// It may merge into a compatible sibling there; the returned id is the
    /// one it ends up living on.
    pub fn with_scope<T>(
        &mut self,
        mut scope: Scope,
        node: &Node,
        is_reference: bool,
        body: impl FnOnce(&mut Self) -> T,
    ) -> (ScopeId, T) {
        scope.add_location(self.location(node, is_reference));
        scope.language = Some(self.language);
        let parent = self.current_scope();
        let id = self.graph.insert(scope);

        self.stack.push(id);
        let result = body(self);
        self.stack.pop();

        (self.graph.add_child(parent, id), result)
    }

    /// Finish the file and hand over its graph
    pub fn into_graph(self) -> ScopeGraph {
        self.graph
    }
}
