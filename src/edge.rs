//! Edge types - relationships derived from a resolved scope graph
//!
//! Two relationships are derived:
//! - `Calls`: method → method, one per resolved call target
//! - `Inherits`: type → parent type

use crate::scope::ScopeId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kinds of derived relationships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Method contains a call that resolves to another method
    Calls,
    /// Type lists another type as a parent
    Inherits,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Calls => "calls",
            EdgeKind::Inherits => "inherits",
        }
    }

    pub fn all() -> &'static [EdgeKind] {
        &[EdgeKind::Calls, EdgeKind::Inherits]
    }
}

impl FromStr for EdgeKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "calls" | "call" => Ok(EdgeKind::Calls),
            "inherits" | "inherit" | "extends" => Ok(EdgeKind::Inherits),
            _ => Err(crate::Error::InvalidInput(format!("Unknown edge kind: {}", s))),
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A directed relationship between two scopes of one graph.
///
/// `count` is how many distinct uses produced the edge: several calls from
/// one method to the same callee fold into a single edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: ScopeId,
    pub to: ScopeId,
    pub kind: EdgeKind,
    pub count: usize,
}

impl Edge {
    pub fn new(from: ScopeId, to: ScopeId, kind: EdgeKind) -> Self {
        Self { from, to, kind, count: 1 }
    }

    /// True when both edges link the same scopes with the same kind
    pub fn same_link(&self, other: &Edge) -> bool {
        self.from == other.from && self.to == other.to && self.kind == other.kind
    }

    /// Create a reversed edge (swap from/to)
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            kind: self.kind,
            count: self.count,
        }
    }
}
