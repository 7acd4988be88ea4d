//! Call Graph - caller/callee and inheritance queries
//!
//! Built once from a resolved scope graph. Calls written in a method's
//! nested blocks belong to that method; calls written outside any method
//! (global initializers, field initializers) have no caller and are skipped.

use crate::edge::{Edge, EdgeKind};
use crate::scope::{ResolvableUse, ScopeCategory, ScopeGraph, ScopeId};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Derived call and inheritance edges of one program graph.
///
/// Ids refer to the graph the call graph was built from; rebuild it after
/// the graph changes.
#[derive(Debug, Default)]
pub struct CallGraph {
    /// Outgoing edges per scope
    edges_from: HashMap<ScopeId, Vec<Edge>>,
    /// Incoming edges per scope
    edges_to: HashMap<ScopeId, Vec<Edge>>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every call and parent type of `graph` into edges
    pub fn build(graph: &ScopeGraph) -> Self {
        let mut call_graph = Self::new();

        for (id, scope) in graph.scopes() {
            match scope.category() {
                ScopeCategory::Method => {
                    for call in graph.calls_within(id) {
                        // a call inside a nested method or local type belongs to that one
                        if owning_method(graph, call.parent_scope()) != Some(id) {
                            continue;
                        }
                        for callee in call.find_matches(graph) {
                            call_graph.add_edge(Edge::new(id, callee, EdgeKind::Calls));
                        }
                    }
                }
                ScopeCategory::Type => {
                    for parent in graph.parent_types(id) {
                        call_graph.add_edge(Edge::new(id, parent, EdgeKind::Inherits));
                    }
                }
                _ => {}
            }
        }

        debug!(edges = call_graph.edge_count(), "built call graph");
        call_graph
    }

    /// Add an edge, folding it into an existing one with the same link
    pub fn add_edge(&mut self, edge: Edge) {
        let outgoing = self.edges_from.entry(edge.from).or_default();
        if let Some(existing) = outgoing.iter_mut().find(|e| e.same_link(&edge)) {
            existing.count += edge.count;
            if let Some(incoming) = self
                .edges_to
                .get_mut(&edge.to)
                .and_then(|edges| edges.iter_mut().find(|e| e.same_link(&edge)))
            {
                incoming.count += edge.count;
            }
            return;
        }
        outgoing.push(edge.clone());
        self.edges_to.entry(edge.to).or_default().push(edge);
    }

    /// Get outgoing edges from a scope
    pub fn edges_from(&self, id: ScopeId) -> &[Edge] {
        self.edges_from.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Get incoming edges to a scope
    pub fn edges_to(&self, id: ScopeId) -> &[Edge] {
        self.edges_to.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    fn targets(&self, id: ScopeId, kind: EdgeKind) -> Vec<ScopeId> {
        self.edges_from(id).iter().filter(|e| e.kind == kind).map(|e| e.to).collect()
    }

    fn sources(&self, id: ScopeId, kind: EdgeKind) -> Vec<ScopeId> {
        self.edges_to(id).iter().filter(|e| e.kind == kind).map(|e| e.from).collect()
    }

    /// Methods with a call that may reach `method`
    pub fn callers(&self, method: ScopeId) -> Vec<ScopeId> {
        self.sources(method, EdgeKind::Calls)
    }

    /// Methods `method` may call
    pub fn callees(&self, method: ScopeId) -> Vec<ScopeId> {
        self.targets(method, EdgeKind::Calls)
    }

    /// Types that list `type_id` as a parent
    pub fn subtypes(&self, type_id: ScopeId) -> Vec<ScopeId> {
        self.sources(type_id, EdgeKind::Inherits)
    }

    /// Direct parents of `type_id`
    pub fn supertypes(&self, type_id: ScopeId) -> Vec<ScopeId> {
        self.targets(type_id, EdgeKind::Inherits)
    }

    /// Perform impact analysis - find all scopes affected by changes to this one
    ///
    /// Uses BFS over incoming edges up to `depth` levels. Callers of a method
    /// and subtypes of a type are affected; the start scope is not reported.
    pub fn impact_analysis(&self, id: ScopeId, depth: usize) -> Vec<ScopeId> {
        let mut visited = HashSet::from([id]);
        let mut frontier = vec![id];
        let mut affected = Vec::new();

        for _ in 0..depth {
            let mut next = Vec::new();
            for current in frontier {
                for edge in self.edges_to(current) {
                    if visited.insert(edge.from) {
                        affected.push(edge.from);
                        next.push(edge.from);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        affected
    }

    pub fn edge_count(&self) -> usize {
        self.edges_from.values().map(|v| v.len()).sum()
    }

    /// Get statistics about the call graph
    pub fn stats(&self) -> CallGraphStats {
        let count = |kind| {
            self.edges_from
                .values()
                .flat_map(|v| v.iter())
                .filter(|e| e.kind == kind)
                .count()
        };
        CallGraphStats {
            call_edges: count(EdgeKind::Calls),
            inherits_edges: count(EdgeKind::Inherits),
            callers: self
                .edges_from
                .values()
                .filter(|v| v.iter().any(|e| e.kind == EdgeKind::Calls))
                .count(),
        }
    }

    /// Get all edges
    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges_from.values().flat_map(|v| v.iter())
    }
}

/// The method a scope belongs to: itself, or its nearest method ancestor,
/// unless a type sits in between
fn owning_method(graph: &ScopeGraph, scope: ScopeId) -> Option<ScopeId> {
    for id in graph.ancestors_and_self(scope) {
        match graph[id].category() {
            ScopeCategory::Method => return Some(id),
            ScopeCategory::Type | ScopeCategory::Namespace => return None,
            ScopeCategory::Block => {}
        }
    }
    None
}

/// Statistics about a call graph
#[derive(Debug, Clone)]
pub struct CallGraphStats {
    pub call_edges: usize,
    pub inherits_edges: usize,
    /// Methods with at least one resolved call
    pub callers: usize,
}

impl std::fmt::Display for CallGraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Call Graph Statistics:")?;
        writeln!(f, "  Calling methods: {}", self.callers)?;
        writeln!(f, "  Edges: {} calls, {} inherits", self.call_edges, self.inherits_edges)
    }
}
