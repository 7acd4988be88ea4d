//! Tree-to-scope compiler
//!
//! Walks one srcML file unit and builds its scope graph. Which tags open
//! which kind of scope comes from the [`LanguageDescriptor`]; the walk itself
//! is the same for every language.
//!
//! Dispatch, first match wins:
//! 1. access regions and templates are walked through
//! 2. type tags open a type scope
//! 3. namespace tags open one namespace scope per name segment
//! 4. method tags open a method scope
//! 5. any other container tag opens a block scope
//!
//! A container's own `<block>` is its body, not a nested scope. Missing
//! names and types degrade to empty names and absent types.

use super::context::ParserContext;
use crate::language::{LanguageDescriptor, LiteralKind};
use crate::scope::{
    Alias, LiteralUse, MethodCall, MethodDefinition, NamedScopeUse, ParameterDeclaration, Scope,
    ScopeGraph, ScopeId, ScopeVariant, TypeKind, TypeUse, UseExpression, VariableDeclaration, VariableUse,
};
use crate::srcml::{names, tags, Node};
use crate::{Error, Result};
use tracing::debug;

/// Qualifier operators that link a receiver to the member after it
const MEMBER_OPERATORS: &[&str] = &[".", "->"];

/// Compiles file units of one language
pub struct ScopeCompiler<'d> {
    descriptor: &'d LanguageDescriptor,
}

impl<'d> ScopeCompiler<'d> {
    pub fn new(descriptor: &'d LanguageDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn descriptor(&self) -> &LanguageDescriptor {
        self.descriptor
    }

    /// Compile one file unit into a graph rooted at a global namespace
    pub fn compile_unit(&self, unit: &Node) -> Result<ScopeGraph> {
        if !unit.is(tags::UNIT) {
            return Err(Error::InvalidInput(format!("expected <unit>, found <{}>", unit.tag())));
        }
        let mut context = ParserContext::new(unit, self.descriptor.language);
        let location = context.location(unit, false);
        let language = context.language();
        let root = context.current_mut();
        root.add_location(location);
        root.language = Some(language);

        let children: Vec<&Node> = unit.elements().collect();
        let mut package = None;
        let mut aliases = Vec::new();
        let mut consumed = 0;
        for child in &children {
            if child.is(tags::COMMENT) {
            } else if self.descriptor.is_package(child.tag()) && package.is_none() && aliases.is_empty() {
                package = Some(*child);
            } else if self.descriptor.is_alias(child.tag()) {
                aliases.push(self.compile_alias(child, &context)?);
            } else {
                break;
            }
            consumed += 1;
        }
        context.push_aliases(aliases);

        let rest = &children[consumed..];
        match package {
            Some(package) => {
                let path = package.element(tags::NAME).map(names::segment_names).unwrap_or_default();
                if path.is_empty() {
                    debug!(file = context.file(), "package statement without a name");
                }
                self.open_namespaces(&path, package, &mut context, &mut |context: &mut ParserContext| {
                    self.compile_statements(unit, rest, context)
                })?;
            }
            None => self.compile_statements(unit, rest, &mut context)?,
        }

        let graph = context.into_graph();
        debug!(file = unit.attribute("filename").unwrap_or_default(), scopes = graph.len(), "compiled unit");
        Ok(graph)
    }

    /// Compile an import or using statement
    pub fn compile_alias(&self, node: &Node, context: &ParserContext) -> Result<Alias> {
        if !self.descriptor.is_alias(node.tag()) {
            return Err(Error::InvalidInput(format!(
                "expected <{}>, found <{}>",
                self.descriptor.alias,
                node.tag()
            )));
        }
        // newer srcML wraps the name of `using namespace` in a <namespace>
        let name = node
            .element(tags::NAME)
            .or_else(|| node.element(tags::NAMESPACE).and_then(|ns| ns.element(tags::NAME)))
            .ok_or_else(|| Error::InvalidInput(format!("<{}> without a name", node.tag())))?;

        let mut path: Vec<NamedScopeUse> = names::segments(name)
            .into_iter()
            .map(|segment| {
                let mut use_ = NamedScopeUse::namespace(names::segment_name(segment))
                    .with_location(context.location(segment, true));
                use_.language = Some(context.language());
                use_
            })
            .collect();

        let imported_named_scope = if (self.descriptor.hooks.alias_is_namespace_import)(node) {
            None
        } else {
            path.pop().map(|mut symbol| {
                symbol.namespace_only = false;
                symbol
            })
        };

        Ok(Alias {
            imported_namespace: path,
            imported_named_scope,
            location: Some(context.location(node, false)),
            language: Some(context.language()),
        })
    }

    /// Compile a type definition or forward declaration
    pub fn compile_type(&self, node: &Node, context: &mut ParserContext) -> Result<ScopeId> {
        if !self.descriptor.is_type(node.tag()) {
            return Err(Error::InvalidInput(format!("<{}> is not a type", node.tag())));
        }
        let kind = TypeKind::from_tag(node.tag()).unwrap_or(TypeKind::Class);
        let enclosing = context.current_scope();

        let (name, mut type_parameters) = match node.element(tags::NAME) {
            Some(name) => {
                let last = names::last_segment(name);
                let parameters = names::type_arguments(last).into_iter().map(names::segment_name).collect();
                (names::segment_name(last), parameters)
            }
            None => {
                debug!(file = context.file(), xpath = node.xpath(), "type without a name");
                (String::new(), Vec::new())
            }
        };
        let template_parameters = std::mem::take(&mut context.type_parameters);
        if type_parameters.is_empty() {
            type_parameters = template_parameters;
        }

        let parent_types: Vec<TypeUse> = (self.descriptor.hooks.parent_type_names)(node)
            .into_iter()
            .map(|parent| self.type_use(parent, enclosing, context))
            .collect();

        let mut scope = Scope::type_definition(name, kind);
        scope.accessibility = (self.descriptor.hooks.type_accessibility)(node, context.region.as_deref());
        if let ScopeVariant::Type(definition) = &mut scope.variant {
            for parent in parent_types {
                definition.add_parent_type(parent);
            }
            definition.is_generic = !type_parameters.is_empty();
            definition.type_parameters = type_parameters;
        }

        let is_reference = self.descriptor.is_reference(node.tag());
        let (id, result) = context.with_scope(scope, node, is_reference, |context| {
            // members without an access region get the language default
            let region = context.region.take();
            let result = self.compile_body(node, context);
            context.region = region;
            result
        });
        result?;
        Ok(id)
    }

    /// Compile a namespace, one scope per segment of its name
    pub fn compile_namespace(&self, node: &Node, context: &mut ParserContext) -> Result<ScopeId> {
        if !self.descriptor.is_namespace(node.tag()) {
            return Err(Error::InvalidInput(format!("<{}> is not a namespace", node.tag())));
        }
        let mut path = node.element(tags::NAME).map(names::segment_names).unwrap_or_default();
        if path.is_empty() {
            // anonymous namespace
            path.push(String::new());
        }
        self.open_namespaces(&path, node, context, &mut |context: &mut ParserContext| {
            for child in node.elements() {
                if child.is(tags::BLOCK) {
                    let statements: Vec<&Node> = child.elements().collect();
                    self.compile_statements(child, &statements, context)?;
                } else if !child.is(tags::NAME) {
                    self.visit(child, node, context)?;
                }
            }
            Ok(())
        })
    }

    /// Open a chain of nested namespaces and run `body` in the innermost.
    /// Returns the outermost; an empty chain runs `body` in place.
    fn open_namespaces<F>(&self, path: &[String], node: &Node, context: &mut ParserContext, body: &mut F) -> Result<ScopeId>
    where
        F: FnMut(&mut ParserContext) -> Result<()>,
    {
        let Some((first, rest)) = path.split_first() else {
            body(context)?;
            return Ok(context.current_scope());
        };
        let (id, result) = context.with_scope(Scope::namespace(first.clone()), node, false, |context| {
            if rest.is_empty() {
                body(context)
            } else {
                self.open_namespaces(rest, node, context, body).map(|_| ())
            }
        });
        result?;
        Ok(id)
    }

    /// Compile a function, constructor or destructor, or a declaration of one
    pub fn compile_method(&self, node: &Node, context: &mut ParserContext) -> Result<ScopeId> {
        let tag = node.tag();
        if !self.descriptor.is_method(tag) {
            return Err(Error::InvalidInput(format!("<{}> is not a method", tag)));
        }
        let is_constructor = tag.starts_with(tags::CONSTRUCTOR);
        let is_destructor = tag.starts_with(tags::DESTRUCTOR);

        let name = match node.element(tags::NAME) {
            Some(name) => names::segment_name(names::last_segment(name)),
            None => {
                debug!(file = context.file(), xpath = node.xpath(), "method without a name");
                String::new()
            }
        };
        // template parameters of a function template are not tracked
        context.type_parameters.clear();

        let mut scope = Scope::method(
            name,
            MethodDefinition {
                is_constructor,
                is_destructor,
                ..Default::default()
            },
        );
        scope.accessibility = (self.descriptor.hooks.method_accessibility)(node, context.region.as_deref());

        let is_reference = self.descriptor.is_reference(tag);
        let (id, result) = context.with_scope(scope, node, is_reference, |context| {
            let method = context.current_scope();
            let name_prefix: Vec<NamedScopeUse> = node
                .element(tags::NAME)
                .map(names::prefix_segments)
                .unwrap_or_default()
                .into_iter()
                .map(|segment| self.named_scope_use(segment, method, context))
                .collect();
            let return_type = if is_constructor || is_destructor {
                None
            } else {
                node.element(tags::TYPE)
                    .and_then(|ty| self.declared_type(ty, method, context))
                    .filter(|ty| !is_void(ty, node.element(tags::TYPE)))
            };
            let parameters = self.compile_parameters(node, method, is_reference, context);

            if let Some(definition) = context.current_mut().as_method_mut() {
                definition.name_prefix = name_prefix;
                definition.return_type = return_type;
                definition.parameters = parameters;
            }
            self.compile_body(node, context)
        });
        result?;
        Ok(id)
    }

    /// Parameters in position order; a lone unnamed `void` means none
    fn compile_parameters(
        &self,
        node: &Node,
        method: ScopeId,
        is_reference: bool,
        context: &ParserContext,
    ) -> Vec<ParameterDeclaration> {
        let params: Vec<&Node> = node
            .element(tags::PARAMETER_LIST)
            .map(|list| list.elements_named(tags::PARAMETER).collect())
            .unwrap_or_default();

        let mut parameters = Vec::new();
        for (position, param) in params.iter().enumerate() {
            let declaration = param.element(tags::DECLARATION).unwrap_or(param);
            let type_node = declaration.element(tags::TYPE);
            let name = declaration.element(tags::NAME).map(names::segment_name).unwrap_or_default();
            let parameter_type = type_node.and_then(|ty| self.declared_type(ty, method, context));

            if params.len() == 1 && name.is_empty() {
                if let Some(ty) = &parameter_type {
                    if is_void(ty, type_node) {
                        break;
                    }
                }
            }

            let parameter_type = parameter_type.unwrap_or_else(|| {
                debug!(file = context.file(), xpath = param.xpath(), "parameter without a type");
                TypeUse::new(String::new(), method)
            });
            parameters.push(ParameterDeclaration {
                name,
                parameter_type,
                locations: vec![context.location(param, is_reference)],
                method,
                position,
            });
        }
        parameters
    }

    /// Compile any other container into a block scope
    pub fn compile_block(&self, node: &Node, context: &mut ParserContext) -> Result<ScopeId> {
        if !self.descriptor.is_container(node.tag()) {
            return Err(Error::InvalidInput(format!("<{}> is not a container", node.tag())));
        }
        let (id, result) = context.with_scope(Scope::block(), node, false, |context| self.compile_body(node, context));
        result?;
        Ok(id)
    }

    /// Walk the children of a container inside its already open scope
    fn compile_body(&self, node: &Node, context: &mut ParserContext) -> Result<()> {
        let named = self.descriptor.is_type(node.tag()) || self.descriptor.is_method(node.tag());
        for child in node.elements() {
            match child.tag() {
                tags::BLOCK if !node.is(tags::BLOCK) => self.visit_children(child, context)?,
                tags::NAME | tags::TYPE | tags::SUPER | tags::SPECIFIER => {}
                tags::PARAMETER_LIST if named => {}
                tags::PARAMETER_LIST => {
                    // catch (Exception e)
                    for param in child.elements_named(tags::PARAMETER) {
                        for declaration in param.elements_named(tags::DECLARATION) {
                            self.compile_declaration(declaration, None, context)?;
                        }
                    }
                }
                _ => self.visit(child, node, context)?,
            }
        }
        Ok(())
    }

    /// Statements of a file or namespace body: leading imports first
    fn compile_statements(&self, parent: &Node, statements: &[&Node], context: &mut ParserContext) -> Result<()> {
        let mut aliases = Vec::new();
        let mut consumed = 0;
        for statement in statements {
            if statement.is(tags::COMMENT) {
            } else if self.descriptor.is_alias(statement.tag()) {
                aliases.push(self.compile_alias(statement, context)?);
            } else {
                break;
            }
            consumed += 1;
        }

        let outer = context.push_aliases(aliases);
        let result = statements[consumed..]
            .iter()
            .try_for_each(|statement| self.visit(statement, parent, context));
        context.restore_aliases(outer);
        result
    }

    fn visit_children(&self, node: &Node, context: &mut ParserContext) -> Result<()> {
        for child in node.elements() {
            self.visit(child, node, context)?;
        }
        Ok(())
    }

    /// Dispatch one element; `parent` is the element it sits in
    fn visit(&self, node: &Node, parent: &Node, context: &mut ParserContext) -> Result<()> {
        let tag = node.tag();
        if self.descriptor.is_transparent(tag) {
            return self.visit_region(node, context);
        }
        if self.descriptor.is_type(tag) {
            return self.compile_type(node, context).map(|_| ());
        }
        if self.descriptor.is_namespace(tag) {
            return self.compile_namespace(node, context).map(|_| ());
        }
        if self.descriptor.is_method(tag) {
            return self.compile_method(node, context).map(|_| ());
        }
        if self.descriptor.is_container(tag) {
            return self.compile_block(node, context).map(|_| ());
        }
        if self.descriptor.is_declaration(tag) {
            let mut previous = None;
            for declaration in node.elements_named(tags::DECLARATION) {
                previous = self.compile_declaration(declaration, previous, context)?;
            }
            return Ok(());
        }
        if self.descriptor.is_alias(tag) || self.descriptor.is_package(tag) {
            debug!(file = context.file(), xpath = node.xpath(), "import after the leading imports, ignored");
            return Ok(());
        }
        match tag {
            tags::CALL => self.compile_call(node, parent, context),
            // for-loop initializers and conditions
            tags::DECLARATION => self.compile_declaration(node, None, context).map(|_| ()),
            tags::COMMENT => Ok(()),
            _ => self.visit_children(node, context),
        }
    }

    /// Walk through an access region or a template wrapper
    fn visit_region(&self, node: &Node, context: &mut ParserContext) -> Result<()> {
        if node.is(tags::TEMPLATE) {
            context.type_parameters = template_parameters(node);
            let result = node
                .elements()
                .filter(|child| !child.is(tags::PARAMETER_LIST))
                .try_for_each(|child| self.visit(child, node, context));
            context.type_parameters.clear();
            return result;
        }

        let outer = context.region.replace(node.tag().to_string());
        let result = self.visit_children(node, context);
        context.region = outer;
        result
    }

    /// Register the variables of one `<decl>` in the current scope.
    ///
    /// Returns the declared type so that a following `<decl>` written with
    /// `<type ref="prev"/>` can share it.
    fn compile_declaration(
        &self,
        declaration: &Node,
        previous: Option<TypeUse>,
        context: &mut ParserContext,
    ) -> Result<Option<TypeUse>> {
        let scope = context.current_scope();
        let variable_type = match declaration.element(tags::TYPE) {
            Some(ty) if ty.attribute("ref") == Some("prev") => previous,
            Some(ty) => self.declared_type(ty, scope, context),
            None => previous,
        };

        let declared: Vec<&Node> = declaration.elements_named(tags::NAME).collect();
        if declared.is_empty() {
            debug!(file = context.file(), xpath = declaration.xpath(), "declaration without a name");
        }
        for name in declared {
            let variable = VariableDeclaration::new(
                names::segment_name(name),
                variable_type.clone(),
                context.location(name, false),
                scope,
            );
            context.current_mut().add_declared_variable(variable);
        }

        // initializers and constructor arguments may hold calls
        for child in declaration.elements().filter(|c| !c.is(tags::TYPE) && !c.is(tags::NAME)) {
            self.visit(child, declaration, context)?;
        }
        Ok(variable_type)
    }

    /// Record a call in the current scope, then look for calls in its arguments
    fn compile_call(&self, call: &Node, parent: &Node, context: &mut ParserContext) -> Result<()> {
        let scope = context.current_scope();
        let segments = call.element(tags::NAME).map(names::segments).unwrap_or_default();
        let Some((last, qualifiers)) = segments.split_last() else {
            debug!(file = context.file(), xpath = call.xpath(), "call without a name");
            return self.visit_children(call, context);
        };

        let before = parent.elements_before(call);
        let mut receivers = receiver_names(&before);
        receivers.extend(qualifiers.iter().map(|q| names::segment_name(q)));

        let mut name = names::segment_name(last);
        let mut method_call = MethodCall::new(String::new(), scope, context.location(call, false));
        match before.last() {
            Some(op) if op.is(tags::OPERATOR) && op.value().trim() == "new" => method_call.is_constructor = true,
            Some(op) if op.is(tags::OPERATOR) && op.value().trim() == "~" => method_call.is_destructor = true,
            _ => {}
        }
        if let Some(stripped) = name.strip_prefix('~') {
            name = stripped.trim().to_string();
            method_call.is_destructor = true;
        }
        method_call.name = name;
        method_call.language = Some(context.language());
        method_call.calling_object = self.receiver_chain(receivers, scope, context);
        if method_call.calling_object.is_none() {
            method_call.aliases = context.aliases();
        }
        if let Some(arguments) = call.element(tags::ARGUMENT_LIST) {
            method_call.arguments = arguments
                .elements_named(tags::ARGUMENT)
                .map(|argument| self.argument_use(argument, scope, context))
                .collect();
        }
        context.current_mut().method_calls.push(method_call);

        match call.element(tags::ARGUMENT_LIST) {
            Some(arguments) => self.visit_children(arguments, context),
            None => Ok(()),
        }
    }

    /// Build a calling-object chain from receiver names, outermost first
    fn receiver_chain(&self, receivers: Vec<String>, scope: ScopeId, context: &ParserContext) -> Option<VariableUse> {
        receivers.into_iter().fold(None, |inner, receiver| {
            let mut object = VariableUse::new(receiver, scope);
            object.language = Some(context.language());
            Some(match inner {
                Some(inner) => object.with_calling_object(inner),
                None => object,
            })
        })
    }

    /// A literal argument, or the variable an expression ends with
    fn argument_use(&self, argument: &Node, scope: ScopeId, context: &ParserContext) -> UseExpression {
        let expression = argument.element(tags::EXPRESSION).unwrap_or(argument);
        let elements: Vec<&Node> = expression.elements().collect();

        if let [literal] = elements.as_slice() {
            if literal.is(tags::LITERAL) {
                let value = literal.value();
                match LiteralKind::from_attribute(literal.attribute("type").unwrap_or_default()) {
                    Some(kind) => {
                        return UseExpression::Literal(LiteralUse {
                            kind,
                            type_name: self.descriptor.literal_type(kind, &value),
                            value,
                            parent_scope: scope,
                            location: Some(context.location(literal, false)),
                        });
                    }
                    None => debug!(file = context.file(), xpath = literal.xpath(), "literal of unknown kind"),
                }
            }
        }

        let mut variable = match elements.split_last() {
            Some((last, before)) if last.is(tags::NAME) => {
                let mut variable = VariableUse::new(names::segment_name(names::last_segment(last)), scope);
                variable.location = Some(context.location(last, false));
                let receivers = receiver_names(before);
                match self.receiver_chain(receivers, scope, context) {
                    Some(object) => variable.with_calling_object(object),
                    None => variable,
                }
            }
            _ => VariableUse::new(String::new(), scope),
        };
        variable.language = Some(context.language());
        UseExpression::Variable(variable)
    }

    /// The type named by a `<type>` element: its last name, so specifiers
    /// written as names (`static int`) are skipped
    fn declared_type(&self, ty: &Node, scope: ScopeId, context: &ParserContext) -> Option<TypeUse> {
        let name = ty.elements_named(tags::NAME).last()?;
        Some(self.type_use(name, scope, context))
    }

    /// A type use for a possibly-qualified, possibly-generic name
    pub fn type_use(&self, name: &Node, scope: ScopeId, context: &ParserContext) -> TypeUse {
        let segments = names::segments(name);
        let (last, prefix) = match segments.split_last() {
            Some((last, prefix)) => (*last, prefix),
            None => (name, &[][..]),
        };

        let mut type_use = TypeUse::new(names::segment_name(last), scope);
        type_use.prefix = prefix
            .iter()
            .map(|segment| self.named_scope_use(segment, scope, context))
            .collect();
        type_use.type_arguments = names::type_arguments(last)
            .into_iter()
            .map(|argument| self.type_use(argument, scope, context))
            .collect();
        type_use.aliases = context.aliases();
        type_use.location = Some(context.location(name, true));
        type_use.language = Some(context.language());
        type_use
    }

    fn named_scope_use(&self, segment: &Node, scope: ScopeId, context: &ParserContext) -> NamedScopeUse {
        let mut use_ = NamedScopeUse::new(names::segment_name(segment)).with_location(context.location(segment, true));
        use_.parent_scope = Some(scope);
        use_.language = Some(context.language());
        use_
    }
}

/// `void` with no pointer or reference modifier
fn is_void(ty: &TypeUse, type_node: Option<&Node>) -> bool {
    ty.name == "void"
        && ty.prefix.is_empty()
        && !type_node.is_some_and(|node| node.element(tags::MODIFIER).is_some())
}

/// Receiver names written before a member access, outermost first.
///
/// Walks back over `name` / `.` or `->` pairs and stops at anything else.
fn receiver_names(before: &[&Node]) -> Vec<String> {
    let mut receivers = Vec::new();
    let mut end = before.len();
    while end >= 2 {
        let operator = before[end - 1];
        let receiver = before[end - 2];
        let is_member_access =
            operator.is(tags::OPERATOR) && MEMBER_OPERATORS.contains(&operator.value().trim());
        if !is_member_access || !receiver.is(tags::NAME) {
            break;
        }
        receivers.push(names::segment_name(names::last_segment(receiver)));
        end -= 2;
    }
    receivers.reverse();
    receivers
}

/// Names declared by a template's parameter list
fn template_parameters(template: &Node) -> Vec<String> {
    let Some(list) = template.element(tags::PARAMETER_LIST) else {
        return Vec::new();
    };
    list.elements_named(tags::PARAMETER)
        .filter_map(|param| {
            param
                .element(tags::NAME)
                .or_else(|| param.element(tags::DECLARATION).and_then(|d| d.element(tags::NAME)))
                .or_else(|| param.element(tags::TYPE).and_then(|t| t.elements_named(tags::NAME).last()))
        })
        .map(names::segment_name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::scope::{ResolvableUse, ResolvesToType, ScopeCategory};
    use crate::srcml::reader::unit_for_snippet;

    fn compile(snippet: &str, file: &str) -> ScopeGraph {
        compile_as(snippet, file, Language::CPlusPlus)
    }

    fn compile_as(snippet: &str, file: &str, language: Language) -> ScopeGraph {
        let unit = unit_for_snippet(snippet, file, language).unwrap();
        let descriptor = LanguageDescriptor::builtin(language);
        ScopeCompiler::new(&descriptor).compile_unit(&unit).unwrap()
    }

    fn first_child(graph: &ScopeGraph, id: ScopeId) -> ScopeId {
        graph.children(id)[0]
    }

    #[test]
    fn test_class() {
        let xml = r#"<class>class <name>A</name> <block>{<private type="default">
</private>}</block>;</class>"#;
        let graph = compile(xml, "A.h");
        let root = graph.root();
        let class = first_child(&graph, root);

        assert!(graph[root].is_global());
        assert_eq!(graph.parent(root), None);
        assert_eq!(graph[class].name, "A");
        assert_eq!(graph[class].as_type().unwrap().kind, TypeKind::Class);
        assert_eq!(graph.parent(class), Some(root));
    }

    #[test]
    fn test_class_with_parents() {
        let xml = r#"<class>class <name>A</name> <super>: <name>B</name>,<name>C</name>,<name>D</name></super> <block>{<private type="default">
</private>}</block>;</class>"#;
        let graph = compile(xml, "A.h");
        let class = first_child(&graph, graph.root());
        let parents: Vec<&str> = graph[class]
            .as_type()
            .unwrap()
            .parent_types
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(parents, vec!["B", "C", "D"]);
    }

    #[test]
    fn test_class_with_qualified_parent() {
        let xml = r#"<class>class <name>D</name> <super>: <name><name>A</name><op:operator>::</op:operator><name>B</name><op:operator>::</op:operator><name>C</name></name></super> <block>{<private type="default">
</private>}</block>;</class>"#;
        let graph = compile(xml, "D.h");
        let class = first_child(&graph, graph.root());
        let parents = &graph[class].as_type().unwrap().parent_types;

        assert_eq!(parents.len(), 1);
        assert_eq!(parents[0].name, "C");
        assert_eq!(parents[0].prefix_names(), vec!["A", "B"]);
    }

    #[test]
    fn test_class_in_namespace() {
        let xml = r#"<namespace>namespace <name>A</name> <block>{
    <class>class <name>B</name> <block>{<private type="default">
    </private>}</block>;</class>
}</block></namespace>"#;
        let graph = compile(xml, "B.h");
        let namespace = first_child(&graph, graph.root());
        let class = first_child(&graph, namespace);

        assert_eq!(graph[namespace].name, "A");
        assert!(!graph[namespace].is_global());
        assert_eq!(graph[class].name, "B");
        assert_eq!(graph.full_name(class), "A.B");
    }

    #[test]
    fn test_class_in_function() {
        let xml = r#"<function><type><name>int</name></type> <name>main</name><parameter_list>()</parameter_list> <block>{
	<class>class <name>A</name> <block>{<private type="default">
	</private>}</block>;</class>
}</block></function>"#;
        let graph = compile(xml, "main.cpp");
        let main = first_child(&graph, graph.root());
        let class = first_child(&graph, main);

        assert_eq!(graph[main].name, "main");
        assert_eq!(graph.full_name(class), "main.A");
        let namespace = graph.nearest_ancestor(class, ScopeCategory::Namespace).unwrap();
        assert_eq!(graph.full_name(namespace), "");
    }

    #[test]
    fn test_struct_and_union() {
        let xml = r#"<struct>struct <name>A</name> <block>{<public type="default">
</public>}</block>;</struct>
<union>union <name>U</name> <block>{<public type="default">
	<decl_stmt><decl><type><name>int</name></type> <name>a</name></decl>;</decl_stmt>
	<decl_stmt><decl><type><name>char</name></type> <name>b</name></decl>;</decl_stmt>
</public>}</block>;</union>"#;
        let graph = compile(xml, "A.h");
        let children = graph.children(graph.root());

        assert_eq!(graph[children[0]].as_type().unwrap().kind, TypeKind::Struct);
        assert_eq!(graph[children[1]].as_type().unwrap().kind, TypeKind::Union);
        assert_eq!(graph[children[1]].declarations().count(), 2);
    }

    #[test]
    fn test_inner_class_with_namespace() {
        let xml = r#"<namespace>namespace <name>A</name> <block>{
	<class>class <name>B</name> <block>{<private type="default">
		<class>class <name>C</name> <block>{<private type="default">
		</private>}</block>;</class>
	</private>}</block>;</class>
}</block></namespace>"#;
        let graph = compile(xml, "A.h");
        assert_eq!(graph.len(), 4);

        let types = graph.descendants_of(graph.root(), ScopeCategory::Type);
        let (outer, inner) = (types[0], types[1]);
        assert_eq!(graph.full_name(outer), "A.B");
        assert_eq!(graph.full_name(inner), "A.B.C");
        let namespace = graph.nearest_ancestor(inner, ScopeCategory::Namespace).unwrap();
        assert_eq!(graph.full_name(namespace), "A");
    }

    #[test]
    fn test_class_with_method_declaration() {
        let xml = r#"<class>class <name>A</name> <block>{<private type="default">
</private><public>public:
    <function_decl><type><name>int</name></type> <name>foo</name><parameter_list>(<param><decl><type><name>int</name></type> <name>a</name></decl></param>)</parameter_list>;</function_decl>
</public>}</block>;</class>"#;
        let graph = compile(xml, "A.h");
        let class = first_child(&graph, graph.root());
        let method = first_child(&graph, class);

        assert_eq!(graph.len(), 3);
        assert_eq!(graph[method].name, "foo");
        assert_eq!(graph[method].accessibility, crate::scope::AccessModifier::Public);
        assert!(graph[method].locations[0].is_reference);
        assert_eq!(graph[method].as_method().unwrap().parameters.len(), 1);
        assert_eq!(graph[method].to_string(), "Method: public int foo(int a)");
    }

    #[test]
    fn test_qualified_method_name() {
        let xml = r#"<class>class <name>Example</name> <block>{<private type="default">
</private><public>public:
    <function><type><name>static</name> <name>int</name></type> <name><name>Example</name><op:operator>::</op:operator><name>Foo</name></name><parameter_list>(<param><decl><type><name>int</name></type> <name>bar</name></decl></param>)</parameter_list> <block>{ <return>return <expr><name>bar</name><op:operator>+</op:operator><lit:literal type="number">1</lit:literal></expr>;</return> }</block></function>
</public>}</block>;</class>"#;
        let graph = compile(xml, "static_method.h");
        let example = first_child(&graph, graph.root());
        assert_eq!(graph.children(example).len(), 1);

        let foo = first_child(&graph, example);
        let method = graph[foo].as_method().unwrap();
        assert_eq!(graph[foo].name, "Foo");
        assert_eq!(method.name_prefix.len(), 1);
        assert_eq!(method.name_prefix[0].name, "Example");
    }

    #[test]
    fn test_alias_imports_symbol() {
        let unit = unit_for_snippet(
            r#"<using>using <name><name>A</name><op:operator>::</op:operator><name>Foo</name></name>;</using>"#,
            "A.cpp",
            Language::CPlusPlus,
        )
        .unwrap();
        let descriptor = LanguageDescriptor::builtin(Language::CPlusPlus);
        let compiler = ScopeCompiler::new(&descriptor);
        let context = ParserContext::new(&unit, Language::CPlusPlus);

        let alias = compiler.compile_alias(unit.element(tags::USING).unwrap(), &context).unwrap();
        assert_eq!(alias.imported_name(), Some("Foo"));
        assert_eq!(alias.namespace_path(), vec!["A"]);
        assert!(!alias.is_namespace_import());
    }

    #[test]
    fn test_alias_imports_namespace() {
        let unit = unit_for_snippet(
            r#"<using>using namespace <name><name>x</name><op:operator>::</op:operator><name>y</name><op:operator>::</op:operator><name>z</name></name>;</using>"#,
            "A.cpp",
            Language::CPlusPlus,
        )
        .unwrap();
        let descriptor = LanguageDescriptor::builtin(Language::CPlusPlus);
        let compiler = ScopeCompiler::new(&descriptor);
        let context = ParserContext::new(&unit, Language::CPlusPlus);

        let alias = compiler.compile_alias(unit.element(tags::USING).unwrap(), &context).unwrap();
        assert!(alias.is_namespace_import());
        assert_eq!(alias.imported_name(), None);
        assert_eq!(alias.namespace_path(), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_alias_with_wrapped_namespace_name() {
        let xml = r#"<using>using <namespace>namespace <name><name>x</name><op:operator>::</op:operator><name>y</name></name></namespace>;</using>
<class>class <name>A</name> <block>{<private type="default"></private>}</block>;</class>"#;
        let unit = unit_for_snippet(xml, "A.cpp", Language::CPlusPlus).unwrap();
        let descriptor = LanguageDescriptor::builtin(Language::CPlusPlus);
        let compiler = ScopeCompiler::new(&descriptor);
        let context = ParserContext::new(&unit, Language::CPlusPlus);

        let alias = compiler.compile_alias(unit.element(tags::USING).unwrap(), &context).unwrap();
        assert!(alias.is_namespace_import());
        assert_eq!(alias.namespace_path(), vec!["x", "y"]);

        let graph = compiler.compile_unit(&unit).unwrap();
        assert_eq!(graph.find_by_full_name("A").len(), 1);
        assert!(graph.find_namespaces(&["x", "y"]).is_empty());
    }

    #[test]
    fn test_wrong_tag_is_invalid_input() {
        let unit = unit_for_snippet("<class>class <name>A</name><block>{}</block>;</class>", "A.h", Language::CPlusPlus).unwrap();
        let descriptor = LanguageDescriptor::builtin(Language::CPlusPlus);
        let compiler = ScopeCompiler::new(&descriptor);
        let mut context = ParserContext::new(&unit, Language::CPlusPlus);
        let class = unit.element(tags::CLASS).unwrap();

        assert!(matches!(compiler.compile_method(class, &mut context), Err(Error::InvalidInput(_))));
        assert!(matches!(compiler.compile_alias(class, &context), Err(Error::InvalidInput(_))));
        assert!(matches!(compiler.compile_unit(class), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_call_through_this() {
        let xml = r#"<class>class <name>A</name> <block>{<private type="default">
    <function><type><name>void</name></type> <name>Bar</name><parameter_list>()</parameter_list> <block>{ }</block></function>
    <class>class <name>B</name> <block>{<private type="default">
        <decl_stmt><decl><type><name>int</name></type> <name>a</name></decl>;</decl_stmt>
        <function><type><name>void</name></type> <name>Foo</name><parameter_list>()</parameter_list> <block>{ <return>return <expr><name>this</name><op:operator>-&gt;</op:operator><call><name>Bar</name><argument_list>()</argument_list></call></expr>;</return> }</block></function>
        <function><type><name>void</name></type> <name>Bar</name><parameter_list>()</parameter_list> <block>{ <return>return <expr><name>this</name><op:operator>-&gt;</op:operator><name>a</name></expr>;</return> }</block></function>
    </private>}</block>;</class>
</private>}</block>;</class>"#;
        let graph = compile(xml, "A.cpp");
        let a = first_child(&graph, graph.root());
        let a_bar = graph.children(a)[0];
        let b = graph.children(a)[1];
        let b_foo = graph.children(b)[0];
        let b_bar = graph.children(b)[1];

        assert_eq!(graph.full_name(a_bar), "A.Bar");
        assert_eq!(graph.full_name(b_foo), "A.B.Foo");
        assert_eq!(graph.full_name(b_bar), "A.B.Bar");

        let call = &graph[b_foo].method_calls[0];
        assert_eq!(call.find_matches(&graph), vec![b_bar]);
        assert!(graph.contains_call_to(b_foo, b_bar));
        assert!(!graph.contains_call_to(b_foo, a_bar));
    }

    #[test]
    fn test_class_with_declared_variable() {
        let xml = r#"<class>class <name>A</name> <block>{<private type="default">
    <decl_stmt><decl><type><name>int</name></type> <name>a</name></decl>;</decl_stmt>
</private>}</block>;</class>"#;
        let graph = compile(xml, "A.h");
        let class = first_child(&graph, graph.root());
        assert_eq!(graph[class].declarations().count(), 1);
    }

    #[test]
    fn test_multi_variable_declaration() {
        let xml = r#"<decl_stmt><decl><type><name>int</name></type> <name>a</name>,<name>b</name>,<name>c</name></decl>;</decl_stmt>"#;
        let graph = compile(xml, "test.cpp");
        let declarations: Vec<_> = graph[graph.root()].declarations().collect();

        let names: Vec<&str> = declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        for declaration in &declarations {
            assert_eq!(declaration.variable_type.as_ref().unwrap().name, "int");
        }
        assert_ne!(declarations[0].locations, declarations[1].locations);
    }

    #[test]
    fn test_variables_with_specifiers() {
        let xml = r#"<decl_stmt><decl><type><name>const</name> <name>int</name></type> <name>A</name></decl>;</decl_stmt>
<decl_stmt><decl><type><name>static</name> <name>int</name></type> <name>B</name></decl>;</decl_stmt>
<decl_stmt><decl><type><name>static</name> <name>const</name> <name>Foo</name></type> <name>C</name></decl>;</decl_stmt>
<decl_stmt><decl><type><name>extern</name> <name>Foo</name></type> <name>D</name></decl>;</decl_stmt>"#;
        let graph = compile(xml, "test.cpp");
        let types: Vec<String> = graph[graph.root()]
            .declarations()
            .map(|d| d.variable_type.as_ref().unwrap().name.clone())
            .collect();
        assert_eq!(types, vec!["int", "int", "Foo", "Foo"]);
    }

    #[test]
    fn test_lengthy_calling_object_chain() {
        let xml = r#"<expr_stmt><expr><name>a</name><op:operator>-&gt;</op:operator><name>b</name><op:operator>.</op:operator><call><name>Foo</name><argument_list>()</argument_list></call></expr>;</expr_stmt>"#;
        let graph = compile(xml, "test.cpp");
        let call = &graph[graph.root()].method_calls[0];

        assert_eq!(call.name, "Foo");
        let object = call.calling_object.as_ref().unwrap();
        assert_eq!(object.name, "b");
        let outer = object.calling_object.as_ref().unwrap();
        assert_eq!(outer.name, "a");
        assert!(outer.calling_object.is_none());
        assert!(call.aliases.is_empty());
    }

    #[test]
    fn test_generic_variable_declaration() {
        let xml = r#"<decl_stmt><decl><type><name><name>vector</name><argument_list>&lt;<argument><name>int</name></argument>&gt;</argument_list></name></type> <name>a</name></decl>;</decl_stmt>"#;
        let graph = compile(xml, "test.cpp");
        let declaration = graph[graph.root()].declarations().next().unwrap();
        let ty = declaration.variable_type.as_ref().unwrap();

        assert_eq!(declaration.name, "a");
        assert_eq!(ty.name, "vector");
        assert!(ty.is_generic());
        assert_eq!(ty.type_arguments[0].name, "int");
    }

    #[test]
    fn test_generic_variable_declaration_with_prefix() {
        let xml = r#"<decl_stmt><decl><type><name><name>std</name><op:operator>::</op:operator><name><name>vector</name><argument_list>&lt;<argument><name>int</name></argument>&gt;</argument_list></name></name></type> <name>a</name></decl>;</decl_stmt>"#;
        let graph = compile(xml, "test.cpp");
        let declaration = graph[graph.root()].declarations().next().unwrap();
        let ty = declaration.variable_type.as_ref().unwrap();

        assert_eq!(ty.name, "vector");
        assert_eq!(ty.prefix_names(), vec!["std"]);
        assert_eq!(ty.type_arguments.len(), 1);
        assert_eq!(ty.type_arguments[0].name, "int");
        assert_eq!(ty.to_string(), "std.vector<int>");
    }

    #[test]
    fn test_return_types() {
        let graph = compile(
            r#"<function><type><name>int</name></type> <name>Foo</name><parameter_list>()</parameter_list> <block>{ }</block></function>"#,
            "test.cpp",
        );
        let foo = graph.children_named(graph.root(), "Foo")[0];
        assert_eq!(graph[foo].as_method().unwrap().return_type.as_ref().unwrap().name, "int");
        assert_eq!(graph[foo].to_string(), "Method: int Foo()");

        let graph = compile(
            r#"<function><type><name>void</name></type> <name>Foo</name><parameter_list>()</parameter_list> <block>{ }</block></function>"#,
            "test.cpp",
        );
        let foo = graph.children_named(graph.root(), "Foo")[0];
        assert!(graph[foo].as_method().unwrap().return_type.is_none());
        assert_eq!(graph[foo].to_string(), "Method: void Foo()");

        let graph = compile(
            r#"<function><type><name>static</name> <name>int</name></type> <name>Foo</name><parameter_list>()</parameter_list> <block>{ }</block></function>"#,
            "test.cpp",
        );
        let foo = graph.children_named(graph.root(), "Foo")[0];
        assert_eq!(graph[foo].as_method().unwrap().return_type.as_ref().unwrap().name, "int");
    }

    #[test]
    fn test_void_parameter_means_none() {
        let graph = compile(
            r#"<function><type><name>void</name></type> <name>Foo</name><parameter_list>(<param><decl><type><name>void</name></type></decl></param>)</parameter_list> <block>{ }</block></function>"#,
            "test.cpp",
        );
        let foo = graph.children_named(graph.root(), "Foo")[0];
        assert!(graph[foo].as_method().unwrap().parameters.is_empty());
    }

    #[test]
    fn test_blocks_and_loop_declarations() {
        let xml = r#"<function><type><name>void</name></type> <name>Foo</name><parameter_list>()</parameter_list> <block>{
    <for>for(<init><decl><type><name>int</name></type> <name>i</name><init>= <expr><lit:literal type="number">0</lit:literal></expr></init></decl>;</init> <condition><expr><name>i</name> <op:operator>&lt;</op:operator> <lit:literal type="number">10</lit:literal></expr>;</condition> <incr><expr><name>i</name><op:operator>++</op:operator></expr></incr>) <block>{
        <expr_stmt><expr><call><name>Bar</name><argument_list>(<argument><expr><name>i</name></expr></argument>)</argument_list></call></expr>;</expr_stmt>
    }</block></for>
}</block></function>"#;
        let graph = compile(xml, "loop.cpp");
        let foo = first_child(&graph, graph.root());
        let for_scope = first_child(&graph, foo);

        assert_eq!(graph[for_scope].category(), ScopeCategory::Block);
        assert_eq!(graph.children(for_scope).len(), 0);
        assert_eq!(graph[for_scope].declarations().next().unwrap().name, "i");

        let call = &graph[for_scope].method_calls[0];
        assert_eq!(call.name, "Bar");
        match &call.arguments[0] {
            UseExpression::Variable(variable) => {
                assert_eq!(variable.name, "i");
                assert_eq!(variable.find_matches(&graph).len(), 1);
            }
            other => panic!("unexpected argument {:?}", other),
        }
        assert!(graph[foo].method_calls.is_empty());
    }

    #[test]
    fn test_constructor_call_and_literal_arguments() {
        let xml = r#"<class>class <name>A</name> <block>{<public type="default">
    <constructor><name>A</name><parameter_list>(<param><decl><type><name>int</name></type> <name>x</name></decl></param>)</parameter_list> <block>{ }</block></constructor>
</public>}</block>;</class>
<decl_stmt><decl><type><name>A</name><modifier>*</modifier></type> <name>a</name> <init>= <expr><op:operator>new</op:operator> <call><name>A</name><argument_list>(<argument><expr><lit:literal type="number">5</lit:literal></expr></argument>)</argument_list></call></expr></init></decl>;</decl_stmt>"#;
        let graph = compile(xml, "A.cpp");
        let class = graph.children(graph.root())[0];
        let constructor = graph.children(class)[0];
        assert_eq!(graph[constructor].to_string(), "Constructor: public A(int x)");

        let call = &graph[graph.root()].method_calls[0];
        assert!(call.is_constructor);
        assert_eq!(call.find_matches(&graph), vec![constructor]);
        assert_eq!(call.find_matching_types(&graph), vec![class]);
        match &call.arguments[0] {
            UseExpression::Literal(literal) => {
                assert_eq!(literal.kind, LiteralKind::Number);
                assert_eq!(literal.type_name.as_deref(), Some("int"));
            }
            other => panic!("unexpected argument {:?}", other),
        }
    }

    #[test]
    fn test_forward_declaration_merges_with_definition() {
        let xml = r#"<class_decl>class <name>A</name>;</class_decl>
<class>class <name>A</name> <block>{<private type="default">
</private>}</block>;</class>"#;
        let graph = compile(xml, "A.h");
        let children = graph.children(graph.root());
        assert_eq!(children.len(), 1);
        let class = &graph[children[0]];
        assert_eq!(class.locations.len(), 2);
        assert!(!class.primary_location().unwrap().is_reference);
    }

    #[test]
    fn test_template_class_is_generic() {
        let xml = r#"<template>template <parameter_list>&lt;<param><type><name>typename</name></type> <name>T</name></param>&gt;</parameter_list>
<class>class <name>Box</name> <block>{<private type="default">
    <decl_stmt><decl><type><name>T</name></type> <name>value</name></decl>;</decl_stmt>
</private>}</block>;</class></template>"#;
        let graph = compile(xml, "box.h");
        let class = first_child(&graph, graph.root());
        let definition = graph[class].as_type().unwrap();
        assert!(definition.is_generic);
        assert_eq!(definition.type_parameters, vec!["T"]);
        assert!(graph[graph.root()].declarations().next().is_none());
    }

    #[test]
    fn test_java_package_and_imports() {
        let xml = r#"<package>package <name><name>com</name><op:operator>.</op:operator><name>example</name></name>;</package>
<import>import <name><name>java</name><op:operator>.</op:operator><name>util</name></name>.*;</import>
<import>import <name><name>com</name><op:operator>.</op:operator><name>other</name><op:operator>.</op:operator><name>Helper</name></name>;</import>
<class><specifier>public</specifier> class <name>Foo</name> <super><extends>extends <name>Bar</name></extends> <implements>implements <name>Baz</name></implements></super> <block>{
    <function><type><specifier>public</specifier> <name>int</name></type> <name>size</name><parameter_list>()</parameter_list> <block>{ <return>return <expr><call><name>compute</name><argument_list>()</argument_list></call></expr>;</return> }</block></function>
}</block></class>"#;
        let graph = compile_as(xml, "Foo.java", Language::Java);
        let foo = graph.find_by_full_name("com.example.Foo");
        assert_eq!(foo.len(), 1);
        let foo = foo[0];

        assert_eq!(graph[foo].accessibility, crate::scope::AccessModifier::Public);
        let parents: Vec<&str> = graph[foo]
            .as_type()
            .unwrap()
            .parent_types
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(parents, vec!["Bar", "Baz"]);

        let size = first_child(&graph, foo);
        let call = &graph[size].method_calls[0];
        assert_eq!(call.aliases.len(), 2);
        assert!(call.aliases[0].is_namespace_import());
        assert_eq!(call.aliases[1].imported_name(), Some("Helper"));
    }

    #[test]
    fn test_csharp_nested_namespace_names() {
        let xml = r#"<using>using <name>System</name>;</using>
<namespace>namespace <name><name>A</name><op:operator>.</op:operator><name>B</name></name> <block>{
    <class><specifier>internal</specifier> class <name>C</name> <block>{ }</block></class>
}</block></namespace>"#;
        let graph = compile_as(xml, "C.cs", Language::CSharp);
        let c = graph.find_by_full_name("A.B.C");
        assert_eq!(c.len(), 1);
        assert_eq!(graph[c[0]].accessibility, crate::scope::AccessModifier::Internal);
        assert_eq!(graph.find_namespaces(&["A", "B"]).len(), 1);
    }
}
