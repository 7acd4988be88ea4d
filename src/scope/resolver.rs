//! Name Resolver - binds uses to declarations and types
//!
//! Resolution algorithm:
//! 1. Walk outward through the scopes enclosing the use
//! 2. Walk the inheritance chains of enclosing types
//! 3. Follow the imports visible at the use
//! 4. Match by exact name
//!
//! Every candidate found is returned; callers pick among them. An empty
//! result is a normal outcome, the graph is never assumed complete.

use super::declaration::DeclarationRef;
use super::graph::{ScopeCategory, ScopeGraph, ScopeId};
use super::uses::{Alias, LiteralUse, MethodCall, NamedScopeUse, TypeUse, UseExpression, VariableUse};
use std::collections::HashSet;

/// A reference to a name that can be matched against the graph
pub trait ResolvableUse {
    /// What a match points at
    type Target<'g>;

    fn name(&self) -> &str;

    /// The scope the use was written in
    fn parent_scope(&self) -> Option<ScopeId>;

    /// Every declaration in scope that this use's name could denote
    fn find_matches<'g>(&self, graph: &'g ScopeGraph) -> Vec<Self::Target<'g>>;

    fn has_matches(&self, graph: &ScopeGraph) -> bool {
        !self.find_matches(graph).is_empty()
    }
}

/// A use whose value has a type
pub trait ResolvesToType {
    /// Type definitions the use may evaluate to
    fn find_matching_types(&self, graph: &ScopeGraph) -> Vec<ScopeId>;

    fn find_first_matching_type(&self, graph: &ScopeGraph) -> Option<ScopeId> {
        self.find_matching_types(graph).into_iter().next()
    }
}

fn push_unique(found: &mut Vec<ScopeId>, candidates: impl IntoIterator<Item = ScopeId>) {
    for candidate in candidates {
        if !found.contains(&candidate) {
            found.push(candidate);
        }
    }
}

impl ScopeGraph {
    /// Direct parent types of a type, resolved, in written order
    pub fn parent_types(&self, type_id: ScopeId) -> Vec<ScopeId> {
        let Some(definition) = self.get(type_id).and_then(|s| s.as_type()) else {
            return Vec::new();
        };
        let mut found = Vec::new();
        for parent in &definition.parent_types {
            push_unique(&mut found, parent.find_matches(self));
        }
        found.retain(|p| *p != type_id);
        found
    }

    /// A type followed by all of its transitive parent types.
    ///
    /// Depth first in written order, so the first listed parent wins ties.
    /// Each type appears once even if the inheritance graph has cycles.
    pub fn parent_types_and_self(&self, type_id: ScopeId) -> Vec<ScopeId> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![type_id];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            order.push(current);
            let mut parents = self.parent_types(current);
            parents.reverse();
            stack.extend(parents);
        }
        order
    }

    /// Calls written in `method` or its nested scopes that may call `callee`
    pub fn method_calls_to(&self, method: ScopeId, callee: ScopeId) -> Vec<&MethodCall> {
        self.calls_within(method)
            .into_iter()
            .filter(|call| call.find_matches(self).contains(&callee))
            .collect()
    }

    pub fn contains_call_to(&self, method: ScopeId, callee: ScopeId) -> bool {
        !self.method_calls_to(method, callee).is_empty()
    }

    /// Nearest type enclosing `scope`, counting `scope` itself
    pub(crate) fn enclosing_type(&self, scope: ScopeId) -> Option<ScopeId> {
        self.ancestors_and_self(scope)
            .into_iter()
            .find(|s| self[*s].category() == ScopeCategory::Type)
    }

    /// Children of `scope` and of every inherited type of it, when it is a type
    fn members_named(&self, scope: ScopeId, name: &str, category: ScopeCategory) -> Vec<ScopeId> {
        let mut found = self.children_named_of(scope, name, category);
        if self[scope].category() == ScopeCategory::Type {
            for parent in self.parent_types_and_self(scope).into_iter().skip(1) {
                push_unique(&mut found, self.children_named_of(parent, name, category));
            }
        }
        found
    }

    /// Scopes a calling object stands for: the types of its value or, when it
    /// names no variable, the namespaces and types it names (`A` in `A::Foo()`)
    fn receiver_scopes(&self, object: &VariableUse) -> Vec<ScopeId> {
        let types = object.find_matching_types(self);
        if !types.is_empty() || object.name.is_empty() || !object.find_matches(self).is_empty() {
            return types;
        }
        let named_scope = |s: &ScopeId| matches!(self[*s].category(), ScopeCategory::Namespace | ScopeCategory::Type);
        match &object.calling_object {
            None => {
                let mut found = self.lookup_unqualified(object.parent_scope, &object.name, ScopeCategory::Namespace, &[]);
                push_unique(
                    &mut found,
                    self.lookup_unqualified(object.parent_scope, &object.name, ScopeCategory::Type, &[]),
                );
                found
            }
            Some(outer) => {
                let mut found = Vec::new();
                for scope in self.receiver_scopes(outer) {
                    push_unique(&mut found, self.children_named(scope, &object.name).into_iter().filter(named_scope));
                }
                found
            }
        }
    }

    /// Scopes reached by following `path` from the root through namespaces and types
    fn scopes_at_path(&self, path: &[&str]) -> Vec<ScopeId> {
        let mut current = vec![self.root];
        for segment in path {
            current = current
                .into_iter()
                .flat_map(|scope| self.children_named(scope, segment))
                .filter(|s| matches!(self[*s].category(), ScopeCategory::Namespace | ScopeCategory::Type))
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }

    /// Scopes an alias makes `name` visible from
    fn alias_scopes(&self, alias: &Alias, name: &str) -> Vec<ScopeId> {
        match alias.imported_name() {
            Some(imported) if imported != name => Vec::new(),
            _ => self.scopes_at_path(&alias.namespace_path()),
        }
    }

    /// Unqualified lookup of `name` among child scopes of one category,
    /// outward from `scope`, then through the aliases
    fn lookup_unqualified(&self, scope: ScopeId, name: &str, category: ScopeCategory, aliases: &[Alias]) -> Vec<ScopeId> {
        let mut found = Vec::new();
        for enclosing in self.ancestors_and_self(scope) {
            push_unique(&mut found, self.members_named(enclosing, name, category));
        }
        for alias in aliases {
            for target in self.alias_scopes(alias, name) {
                push_unique(&mut found, self.children_named_of(target, name, category));
            }
        }
        found
    }
}

impl ResolvableUse for TypeUse {
    type Target<'g> = ScopeId;

    fn name(&self) -> &str {
        &self.name
    }

    fn parent_scope(&self) -> Option<ScopeId> {
        Some(self.parent_scope)
    }

    /// Unqualified names are looked up outward. Qualified names accept every
    /// type whose enclosing names are the prefix, read relative to an
    /// enclosing scope of the use or to an imported namespace.
    fn find_matches<'g>(&self, graph: &'g ScopeGraph) -> Vec<ScopeId> {
        if self.name.is_empty() || !graph.contains(self.parent_scope) {
            return Vec::new();
        }
        if self.prefix.is_empty() {
            return graph.lookup_unqualified(self.parent_scope, &self.name, ScopeCategory::Type, &self.aliases);
        }

        let prefix = self.prefix_names();
        let mut contexts: Vec<Vec<&str>> = graph
            .ancestors_and_self(self.parent_scope)
            .into_iter()
            .map(|scope| graph.name_path(scope))
            .collect();
        for alias in self.aliases.iter() {
            // an imported symbol can only stand in for the first prefix segment
            match alias.imported_name() {
                Some(imported) if imported != prefix[0] => {}
                _ => contexts.push(alias.namespace_path()),
            }
        }

        graph
            .scopes()
            .filter(|(_, scope)| scope.category() == ScopeCategory::Type && scope.name == self.name)
            .map(|(id, _)| id)
            .filter(|candidate| {
                let qualifiers = graph.qualifier_names(*candidate);
                contexts.iter().any(|context| {
                    qualifiers.len() == context.len() + prefix.len()
                        && qualifiers.starts_with(context)
                        && qualifiers.ends_with(&prefix)
                })
            })
            .collect()
    }
}

impl ResolvesToType for TypeUse {
    fn find_matching_types(&self, graph: &ScopeGraph) -> Vec<ScopeId> {
        self.find_matches(graph)
    }
}

impl ResolvableUse for NamedScopeUse {
    type Target<'g> = ScopeId;

    fn name(&self) -> &str {
        &self.name
    }

    fn parent_scope(&self) -> Option<ScopeId> {
        self.parent_scope
    }

    /// Namespaces (and, unless namespace-only, types) with this name visible
    /// from the use; a use without a scope searches from the root
    fn find_matches<'g>(&self, graph: &'g ScopeGraph) -> Vec<ScopeId> {
        let start = self.parent_scope.filter(|s| graph.contains(*s)).unwrap_or(graph.root());
        let mut found = graph.lookup_unqualified(start, &self.name, ScopeCategory::Namespace, &[]);
        if !self.namespace_only {
            push_unique(&mut found, graph.lookup_unqualified(start, &self.name, ScopeCategory::Type, &[]));
        }
        found
    }
}

impl ResolvableUse for VariableUse {
    type Target<'g> = DeclarationRef<'g>;

    fn name(&self) -> &str {
        &self.name
    }

    fn parent_scope(&self) -> Option<ScopeId> {
        Some(self.parent_scope)
    }

    /// Without a calling object: declared variables of every enclosing scope,
    /// then parameters of every enclosing method, then variables inherited by
    /// every enclosing type. With one: members of the calling object's types.
    fn find_matches<'g>(&self, graph: &'g ScopeGraph) -> Vec<DeclarationRef<'g>> {
        let mut found: Vec<DeclarationRef<'g>> = Vec::new();
        if self.name.is_empty() || !graph.contains(self.parent_scope) {
            return found;
        }
        let mut add = |candidate: DeclarationRef<'g>| {
            if !found.iter().any(|f| f.same_as(&candidate)) {
                found.push(candidate);
            }
        };

        if let Some(calling_object) = &self.calling_object {
            for object_scope in graph.receiver_scopes(calling_object) {
                for member_type in graph.parent_types_and_self(object_scope) {
                    for declaration in graph[member_type].declared_variables.get(&self.name).into_iter().flatten() {
                        add(DeclarationRef::Variable(declaration));
                    }
                }
            }
            return found;
        }

        let enclosing = graph.ancestors_and_self(self.parent_scope);
        for scope in &enclosing {
            for declaration in graph[*scope].declared_variables.get(&self.name).into_iter().flatten() {
                add(DeclarationRef::Variable(declaration));
            }
        }
        for scope in &enclosing {
            if let Some(method) = graph[*scope].as_method() {
                for parameter in method.parameters.iter().filter(|p| p.name == self.name) {
                    add(DeclarationRef::Parameter(parameter));
                }
            }
        }
        for scope in &enclosing {
            if graph[*scope].category() != ScopeCategory::Type {
                continue;
            }
            for parent in graph.parent_types_and_self(*scope).into_iter().skip(1) {
                for declaration in graph[parent].declared_variables.get(&self.name).into_iter().flatten() {
                    add(DeclarationRef::Variable(declaration));
                }
            }
        }
        found
    }
}

impl ResolvesToType for VariableUse {
    /// `this` is the nearest enclosing type; `base` and `super` its parents
    fn find_matching_types(&self, graph: &ScopeGraph) -> Vec<ScopeId> {
        if !graph.contains(self.parent_scope) {
            return Vec::new();
        }
        match self.name.as_str() {
            "this" if self.calling_object.is_none() => {
                return graph.enclosing_type(self.parent_scope).into_iter().collect();
            }
            "base" | "super" if self.calling_object.is_none() => {
                return graph
                    .enclosing_type(self.parent_scope)
                    .map(|t| graph.parent_types(t))
                    .unwrap_or_default();
            }
            _ => {}
        }

        let mut found = Vec::new();
        for declaration in self.find_matches(graph) {
            if let Some(variable_type) = declaration.variable_type() {
                push_unique(&mut found, variable_type.find_matching_types(graph));
            }
        }
        found
    }
}

impl ResolvesToType for LiteralUse {
    fn find_matching_types(&self, graph: &ScopeGraph) -> Vec<ScopeId> {
        match &self.type_name {
            Some(type_name) if graph.contains(self.parent_scope) => {
                graph.lookup_unqualified(self.parent_scope, type_name, ScopeCategory::Type, &[])
            }
            _ => Vec::new(),
        }
    }
}

impl ResolvesToType for UseExpression {
    fn find_matching_types(&self, graph: &ScopeGraph) -> Vec<ScopeId> {
        match self {
            UseExpression::Variable(v) => v.find_matching_types(graph),
            UseExpression::Literal(l) => l.find_matching_types(graph),
        }
    }
}

impl MethodCall {
    /// Types named by a constructor or destructor call
    fn constructed_types(&self, graph: &ScopeGraph) -> Vec<ScopeId> {
        graph.lookup_unqualified(self.parent_scope, &self.name, ScopeCategory::Type, &self.aliases)
    }
}

impl ResolvableUse for MethodCall {
    type Target<'g> = ScopeId;

    fn name(&self) -> &str {
        &self.name
    }

    fn parent_scope(&self) -> Option<ScopeId> {
        Some(self.parent_scope)
    }

    /// Methods matched by name only; arity and argument types are not
    /// considered, so overloads all match
    fn find_matches<'g>(&self, graph: &'g ScopeGraph) -> Vec<ScopeId> {
        if self.name.is_empty() || !graph.contains(self.parent_scope) {
            return Vec::new();
        }

        if self.is_constructor || self.is_destructor {
            let mut found = Vec::new();
            for type_id in self.constructed_types(graph) {
                push_unique(
                    &mut found,
                    graph.children(type_id).iter().copied().filter(|child| {
                        graph[*child].as_method().is_some_and(|m| {
                            (self.is_constructor && m.is_constructor) || (self.is_destructor && m.is_destructor)
                        })
                    }),
                );
            }
            return found;
        }

        if let Some(calling_object) = &self.calling_object {
            let mut found = Vec::new();
            for object_scope in graph.receiver_scopes(calling_object) {
                push_unique(&mut found, graph.members_named(object_scope, &self.name, ScopeCategory::Method));
            }
            return found;
        }

        graph.lookup_unqualified(self.parent_scope, &self.name, ScopeCategory::Method, &self.aliases)
    }
}

impl ResolvesToType for MethodCall {
    /// Return types of the matched methods; constructors give their own type
    fn find_matching_types(&self, graph: &ScopeGraph) -> Vec<ScopeId> {
        let mut found = Vec::new();
        let matches = self.find_matches(graph);
        if self.is_constructor && matches.is_empty() {
            return self.constructed_types(graph);
        }
        for method_id in matches {
            let Some(method) = graph[method_id].as_method() else {
                continue;
            };
            if method.is_constructor {
                push_unique(&mut found, graph.enclosing_type(method_id));
            } else if let Some(return_type) = &method.return_type {
                push_unique(&mut found, return_type.find_matching_types(graph));
            }
        }
        found
    }
}
