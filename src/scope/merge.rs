//! Merge and remove engine
//!
//! `merge` folds one graph into another. The other arena is absorbed with
//! shifted ids, then its root is merged into ours recursively: each incoming
//! child either merges into a compatible sibling or is appended. Ids of
//! scopes merged away are forwarded to their survivors in every use and
//! declaration of the graph.
//!
//! `remove_file` is the inverse for one file: scopes seen only in that file
//! are dropped whole, the rest are trimmed of what the file contributed.

use super::declaration::VariableDeclaration;
use super::graph::{AccessModifier, Rebind, ScopeGraph, ScopeId, ScopeVariant};
use crate::location::SourceLocation;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Two definitions of one method disagree on a parameter type.
///
/// The merge keeps going; the first side's type is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeConflict {
    /// Full name of the method
    pub method: String,
    pub position: usize,
    pub kept_type: String,
    pub discarded_type: String,
    pub kept_location: Option<SourceLocation>,
    pub discarded_location: Option<SourceLocation>,
}

type Forwarding = HashMap<ScopeId, ScopeId>;

impl ScopeGraph {
    /// Merge `other` into this graph and return the program graph.
    ///
    /// Both roots are global namespaces, so they always merge.
    pub fn merge(mut self, other: ScopeGraph) -> ScopeGraph {
        let other_root = self.absorb(other);
        let mut forward = Forwarding::new();
        let root = self.root;
        self.merge_into(root, other_root, &mut forward);
        self.apply_forwarding(&forward);
        self
    }

    /// Add `child` under `parent`, merging it into a compatible sibling if
    /// one exists. Returns the id the child lives on as.
    ///
    /// # Panics
    ///
    /// Panics if `parent` or `child` is not live in this graph, for example
    /// an id that was merged away or removed. Check with [`ScopeGraph::contains`].
    pub fn add_child(&mut self, parent: ScopeId, child: ScopeId) -> ScopeId {
        self.detach(child);
        let mut forward = Forwarding::new();
        let id = self.add_child_with(parent, child, &mut forward);
        self.apply_forwarding(&forward);
        id
    }

    /// Merge `from` into `into` even when their signatures differ.
    ///
    /// Both must be live, of the same kind and name. Parameter type
    /// disagreements are recorded as [`MergeConflict`]s.
    pub fn unify(&mut self, into: ScopeId, from: ScopeId) -> Result<ScopeId> {
        let (Some(a), Some(b)) = (self.get(into), self.get(from)) else {
            return Err(Error::InvalidInput(format!("cannot unify {} and {}: not live", into, from)));
        };
        if into == from || a.category() != b.category() || a.name != b.name {
            return Err(Error::InvalidInput(format!(
                "cannot unify {} ({}) with {} ({})",
                into, a, from, b
            )));
        }
        if self.ancestors(into).contains(&from) {
            return Err(Error::InvalidInput(format!("cannot unify {} into its descendant {}", from, into)));
        }
        self.detach(from);
        let mut forward = Forwarding::new();
        self.merge_into(into, from, &mut forward);
        self.apply_forwarding(&forward);
        Ok(into)
    }

    /// Move every scope of `other` into this arena; returns its root's new id
    fn absorb(&mut self, other: ScopeGraph) -> ScopeId {
        let offset = self.scopes.len() as u32;
        let shift = move |id: ScopeId| ScopeId(id.0 + offset);
        for mut scope in other.scopes {
            if let Some(scope) = &mut scope {
                scope.rebind(&shift);
            }
            self.scopes.push(scope);
        }
        self.conflicts.extend(other.conflicts);
        shift(other.root)
    }

    /// True when `from` describes the same entity as `into`.
    ///
    /// Same kind and name; methods also need the same constructor/destructor
    /// flags and parameter type names position by position. Blocks have no
    /// name, so they only match when seen at a common node.
    pub fn can_be_merged(&self, into: ScopeId, from: ScopeId) -> bool {
        let (Some(a), Some(b)) = (self.get(into), self.get(from)) else {
            return false;
        };
        if a.category() != b.category() || a.name != b.name {
            return false;
        }
        match (&a.variant, &b.variant) {
            (ScopeVariant::Block, ScopeVariant::Block) => a
                .locations
                .iter()
                .any(|l| b.locations.iter().any(|o| l.same_node(o))),
            (ScopeVariant::Namespace(x), ScopeVariant::Namespace(y)) => x.is_global == y.is_global,
            (ScopeVariant::Type(_), ScopeVariant::Type(_)) => true,
            (ScopeVariant::Method(x), ScopeVariant::Method(y)) => {
                x.is_constructor == y.is_constructor
                    && x.is_destructor == y.is_destructor
                    && x.parameter_type_names() == y.parameter_type_names()
            }
            _ => false,
        }
    }

    fn add_child_with(&mut self, parent: ScopeId, child: ScopeId, forward: &mut Forwarding) -> ScopeId {
        let partner = self
            .children(parent)
            .iter()
            .copied()
            .find(|sibling| *sibling != child && self.can_be_merged(*sibling, child));
        match partner {
            Some(partner) => {
                self.merge_into(partner, child, forward);
                partner
            }
            None => {
                self.attach(parent, child);
                child
            }
        }
    }

    /// Fold the contents of `from` into `into` and retire `from`
    fn merge_into(&mut self, into: ScopeId, from: ScopeId, forward: &mut Forwarding) {
        let method_name = self.full_name(into);
        let Some(source) = self.scopes.get_mut(from.index()).and_then(Option::take) else {
            return;
        };
        forward.insert(from, into);
        let source_wins = definition_rank(&source.locations) < definition_rank(&self[into].locations);

        let mut conflicts = Vec::new();
        let target = &mut self[into];
        for location in source.locations {
            target.add_location(location);
        }
        if source.accessibility != AccessModifier::None
            && (source_wins || target.accessibility == AccessModifier::None)
        {
            target.accessibility = source.accessibility;
        }
        if source.language.is_some() && (source_wins || target.language.is_none()) {
            target.language = source.language;
        }
        for declaration in source.declared_variables.into_values().flatten() {
            merge_declaration(&mut target.declared_variables, declaration);
        }
        for call in source.method_calls {
            if !target.method_calls.iter().any(|c| c.location.same_node(&call.location)) {
                target.method_calls.push(call);
            }
        }

        match (&mut target.variant, source.variant) {
            (ScopeVariant::Namespace(mine), ScopeVariant::Namespace(theirs)) => {
                mine.is_global |= theirs.is_global;
            }
            (ScopeVariant::Type(mine), ScopeVariant::Type(theirs)) => {
                if mine.kind != theirs.kind {
                    let (kept, discarded) = if source_wins { (theirs.kind, mine.kind) } else { (mine.kind, theirs.kind) };
                    debug!(kept = %kept, discarded = %discarded, "type kind disagreement while merging");
                    mine.kind = kept;
                }
                mine.merge_parent_types(&theirs);
                if !mine.is_generic && theirs.is_generic {
                    mine.is_generic = true;
                    mine.type_parameters = theirs.type_parameters;
                }
            }
            (ScopeVariant::Method(mine), ScopeVariant::Method(theirs)) => {
                if theirs.return_type.is_some() && (source_wins || mine.return_type.is_none()) {
                    mine.return_type = theirs.return_type;
                }
                if !theirs.name_prefix.is_empty() && (source_wins || mine.name_prefix.is_empty()) {
                    mine.name_prefix = theirs.name_prefix;
                }
                if mine.parameters.len() != theirs.parameters.len() {
                    warn!(method = %method_name, "merging methods with different parameter counts");
                }
                for (position, (kept, other)) in mine.parameters.iter_mut().zip(theirs.parameters).enumerate() {
                    if kept.parameter_type.name == other.parameter_type.name {
                        for location in other.locations {
                            if !kept.locations.iter().any(|l| l.same_node(&location)) {
                                kept.locations.push(location);
                            }
                        }
                        if kept.name.trim().is_empty() {
                            kept.name = other.name;
                        }
                    } else {
                        conflicts.push(MergeConflict {
                            method: method_name.clone(),
                            position,
                            kept_type: kept.parameter_type.to_string(),
                            discarded_type: other.parameter_type.to_string(),
                            kept_location: kept.locations.first().cloned(),
                            discarded_location: other.locations.first().cloned(),
                        });
                    }
                }
            }
            _ => {}
        }

        for conflict in conflicts {
            warn!(
                method = %conflict.method,
                position = conflict.position,
                kept = %conflict.kept_type,
                discarded = %conflict.discarded_type,
                "conflicting parameter types while merging"
            );
            self.conflicts.push(conflict);
        }

        for child in source.children {
            if let Some(scope) = self.get_mut(child) {
                scope.parent = None;
                self.add_child_with(into, child, forward);
            }
        }
    }

    /// Point every id merged away at its survivor
    fn apply_forwarding(&mut self, forward: &Forwarding) {
        if forward.is_empty() {
            return;
        }
        let resolve = |id: ScopeId| {
            let mut current = id;
            for _ in 0..=forward.len() {
                match forward.get(&current) {
                    Some(next) => current = *next,
                    None => break,
                }
            }
            current
        };
        for scope in self.scopes.iter_mut().flatten() {
            scope.rebind(&resolve);
        }
    }

    /// Retract everything `file` contributed.
    ///
    /// Scopes seen only in `file` are dropped with their subtrees. Returns
    /// the detached scopes that still hold content from other files and
    /// need a new parent, or `None` when there are none. Unknown files are
    /// a no-op.
    pub fn remove_file(&mut self, file: &str) -> Option<Vec<ScopeId>> {
        let root = self.root;
        if !self[root].is_only_in(file) {
            return self.remove_file_from(root, file);
        }

        let survivors = self.detach_survivors(root, file);
        let children = std::mem::take(&mut self[root].children);
        for child in children {
            self.discard(child);
        }
        let scope = &mut self[root];
        scope.declared_variables.clear();
        scope.method_calls.clear();
        scope.locations.clear();
        debug!(file, "removed the only file of the program");

        if survivors.is_empty() {
            None
        } else {
            warn!(file, count = survivors.len(), "scopes left without a parent");
            Some(survivors)
        }
    }

    /// Detach and trim the children of `id` that other files also contributed to
    fn detach_survivors(&mut self, id: ScopeId, file: &str) -> Vec<ScopeId> {
        let survivors: Vec<ScopeId> = self
            .children(id)
            .iter()
            .copied()
            .filter(|c| self[*c].locations.iter().any(|l| !l.is_in(file)))
            .collect();
        for survivor in &survivors {
            self.detach(*survivor);
            if let Some(orphans) = self.remove_file_from(*survivor, file) {
                for orphan in orphans {
                    self.add_child(*survivor, orphan);
                }
            }
        }
        survivors
    }

    fn remove_file_from(&mut self, id: ScopeId, file: &str) -> Option<Vec<ScopeId>> {
        let scope = self.get(id)?;
        if !scope.is_in(file) {
            return None;
        }

        if scope.is_only_in(file) {
            let survivors = self.detach_survivors(id, file);
            self.detach(id);
            self.discard(id);
            return if survivors.is_empty() { None } else { Some(survivors) };
        }

        let mut orphans = Vec::new();
        for child in self.children(id).to_vec() {
            if let Some(found) = self.remove_file_from(child, file) {
                orphans.extend(found);
            }
        }
        for orphan in orphans {
            self.add_child(id, orphan);
        }

        let scope = &mut self[id];
        scope.method_calls.retain(|call| !call.location.is_in(file));
        for declarations in scope.declared_variables.values_mut() {
            for declaration in declarations.iter_mut() {
                declaration.locations.retain(|l| !l.is_in(file));
            }
            declarations.retain(|d| !d.locations.is_empty());
        }
        scope.declared_variables.retain(|_, declarations| !declarations.is_empty());
        match &mut scope.variant {
            ScopeVariant::Type(ty) => ty.remove_parent_types_in(file),
            ScopeVariant::Method(method) => {
                for parameter in &mut method.parameters {
                    parameter.locations.retain(|l| !l.is_in(file));
                    if parameter.locations.is_empty() {
                        debug!(parameter = %parameter, "parameter has fewer locations than its method");
                    }
                }
            }
            ScopeVariant::Block | ScopeVariant::Namespace(_) => {}
        }
        scope.locations.retain(|l| !l.is_in(file));
        None
    }
}

/// Which side of a merge decides kind, accessibility and return type: one
/// with a definition beats a reference-only one, then the smallest location
/// wins. Lower ranks win, so the choice does not depend on argument order.
fn definition_rank(locations: &[SourceLocation]) -> (bool, bool, Option<&SourceLocation>) {
    let definitions = locations.iter().filter(|l| !l.is_reference).min();
    match definitions {
        Some(first) => (false, false, Some(first)),
        None => (true, locations.is_empty(), locations.iter().min()),
    }
}

/// Add a declaration unless one seen at a common node exists; then the
/// locations are unioned instead
fn merge_declaration(
    declarations: &mut indexmap::IndexMap<String, Vec<VariableDeclaration>>,
    declaration: VariableDeclaration,
) {
    let entry = declarations.entry(declaration.name.clone()).or_default();
    match entry.iter_mut().find(|d| d.shares_location(&declaration)) {
        Some(existing) => {
            for location in declaration.locations {
                if !existing.locations.iter().any(|l| l.same_node(&location)) {
                    existing.locations.push(location);
                }
            }
            if existing.variable_type.is_none() {
                existing.variable_type = declaration.variable_type;
            }
        }
        None => entry.push(declaration),
    }
}
