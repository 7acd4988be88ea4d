//! Order-independent view of a scope graph
//!
//! Merging the same graphs in a different order yields the same program
//! but not the same arena layout or child order. A snapshot drops ids and
//! sorts everything that has no meaningful order, so two snapshots compare
//! equal exactly when the graphs describe the same program.

use super::graph::{ScopeGraph, ScopeId, ScopeVariant};
use crate::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeSnapshot {
    /// Display form, e.g. `Method: int Foo(int a)`
    pub signature: String,
    pub full_name: String,
    pub accessibility: String,
    pub locations: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub parent_types: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub declarations: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub calls: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<ScopeSnapshot>,
}

impl ScopeSnapshot {
    /// Snapshot of `id` and its subtree
    pub fn of(graph: &ScopeGraph, id: ScopeId) -> Self {
        let scope = &graph[id];

        let mut locations: Vec<String> = scope.locations.iter().map(|l| l.to_location_string()).collect();
        locations.sort();

        let mut parent_types: Vec<String> = match &scope.variant {
            ScopeVariant::Type(ty) => ty.parent_types.iter().map(|p| p.to_string()).collect(),
            _ => Vec::new(),
        };
        parent_types.sort();

        let mut declarations: Vec<String> = scope
            .declarations()
            .map(|d| {
                let mut at: Vec<String> = d.locations.iter().map(|l| l.to_location_string()).collect();
                at.sort();
                match &d.variable_type {
                    Some(t) => format!("{} {} [{}]", t, d.name, at.join(", ")),
                    None => format!("{} [{}]", d.name, at.join(", ")),
                }
            })
            .collect();
        declarations.sort();

        let mut calls: Vec<String> = scope
            .method_calls
            .iter()
            .map(|c| format!("{} @ {}", c, c.location.to_location_string()))
            .collect();
        calls.sort();

        let mut children: Vec<ScopeSnapshot> = graph
            .children(id)
            .iter()
            .map(|child| ScopeSnapshot::of(graph, *child))
            .collect();
        children.sort();

        Self {
            signature: scope.to_string(),
            full_name: graph.full_name(id),
            accessibility: scope.accessibility.to_string(),
            locations,
            parent_types,
            declarations,
            calls,
            children,
        }
    }

    /// Number of scopes in this snapshot, itself included
    pub fn scope_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.scope_count()).sum::<usize>()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl ScopeGraph {
    /// Snapshot of the whole graph from its root
    pub fn snapshot(&self) -> ScopeSnapshot {
        ScopeSnapshot::of(self, self.root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::SourceLocation;
    use crate::scope::graph::{Scope, TypeKind};

    fn graph_with(names: &[&str]) -> ScopeGraph {
        let mut graph = ScopeGraph::new();
        for name in names {
            let mut scope = Scope::type_definition(*name, TypeKind::Class);
            scope.add_location(SourceLocation::new("A.h", format!("/unit/class[{}]", name), 1));
            let id = graph.insert(scope);
            graph.add_child(graph.root(), id);
        }
        graph
    }

    #[test]
    fn test_snapshot_ignores_child_order() {
        let first = graph_with(&["A", "B"]);
        let second = graph_with(&["B", "A"]);
        assert_eq!(first.snapshot(), second.snapshot());
        assert_eq!(first.snapshot().scope_count(), 3);
    }

    #[test]
    fn test_snapshot_json() {
        let json = graph_with(&["A"]).snapshot().to_json().unwrap();
        assert!(json.contains("\"signature\": \"Class: A\""));
        assert!(json.contains("\"full_name\": \"A\""));
    }
}
