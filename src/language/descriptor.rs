//! Language descriptor and registry
//!
//! A descriptor is data: tag sets saying which srcML elements open which kind
//! of scope, plus a handful of hook functions for the few decisions that need
//! to look at a node. Built-in languages construct one in their own module.

use super::Language;
use super::literal::LiteralKind;
use crate::scope::AccessModifier;
use crate::srcml::{tags, Node};
use crate::{Error, Result};
use std::collections::HashSet;
use std::path::Path;

/// Per-language decision functions
#[derive(Debug, Clone, Copy)]
pub struct LanguageHooks {
    pub boolean_literal: fn(&str) -> String,
    pub character_literal: fn(&str) -> String,
    pub number_literal: fn(&str) -> String,
    pub string_literal: fn(&str) -> String,
    /// Accessibility of a method node; the second argument is the tag of the
    /// access region (`public`, `private`, ...) the node sits in, if any
    pub method_accessibility: fn(&Node, Option<&str>) -> AccessModifier,
    /// Accessibility of a type node, with the same region argument
    pub type_accessibility: fn(&Node, Option<&str>) -> AccessModifier,
    /// True when an alias node imports a whole namespace
    pub alias_is_namespace_import: fn(&Node) -> bool,
    /// Name elements of the parent types written on a type node
    pub parent_type_names: fn(&Node) -> Vec<&Node>,
}

/// Everything the compiler needs to know about one language
#[derive(Debug, Clone)]
pub struct LanguageDescriptor {
    pub language: Language,
    /// Tags that open a scope of any kind
    pub containers: HashSet<String>,
    /// Tags that open a method scope
    pub methods: HashSet<String>,
    /// Tags that open a namespace scope
    pub namespaces: HashSet<String>,
    /// Tags that open a type scope
    pub types: HashSet<String>,
    /// Statement tags holding variable declarations
    pub declarations: HashSet<String>,
    /// Container tags that only declare (forward declarations, prototypes)
    pub references: HashSet<String>,
    /// Access-region wrappers that are searched through as if absent
    pub transparent: HashSet<String>,
    /// The alias/import statement tag
    pub alias: String,
    /// File-level package statement tag, for languages that have one
    pub package: Option<String>,
    pub hooks: LanguageHooks,
}

impl LanguageDescriptor {
    /// Descriptor for a built-in language
    pub fn builtin(language: Language) -> Self {
        match language {
            Language::C => super::cpp::c(),
            Language::CPlusPlus => super::cpp::cplusplus(),
            Language::Java => super::java::java(),
            Language::CSharp => super::csharp::csharp(),
        }
    }

    pub fn is_container(&self, tag: &str) -> bool {
        self.containers.contains(tag)
            || self.types.contains(tag)
            || self.methods.contains(tag)
            || self.namespaces.contains(tag)
    }

    pub fn is_type(&self, tag: &str) -> bool {
        self.types.contains(tag)
    }

    pub fn is_method(&self, tag: &str) -> bool {
        self.methods.contains(tag)
    }

    pub fn is_namespace(&self, tag: &str) -> bool {
        self.namespaces.contains(tag)
    }

    pub fn is_declaration(&self, tag: &str) -> bool {
        self.declarations.contains(tag)
    }

    pub fn is_reference(&self, tag: &str) -> bool {
        self.references.contains(tag)
    }

    pub fn is_transparent(&self, tag: &str) -> bool {
        self.transparent.contains(tag)
    }

    pub fn is_alias(&self, tag: &str) -> bool {
        self.alias == tag
    }

    pub fn is_package(&self, tag: &str) -> bool {
        self.package.as_deref() == Some(tag)
    }

    /// Type name of a literal, or `None` for kinds without one (`null`)
    pub fn literal_type(&self, kind: LiteralKind, value: &str) -> Option<String> {
        let hook = match kind {
            LiteralKind::Boolean => self.hooks.boolean_literal,
            LiteralKind::Character => self.hooks.character_literal,
            LiteralKind::Number => self.hooks.number_literal,
            LiteralKind::String => self.hooks.string_literal,
            LiteralKind::Null => return None,
        };
        Some(hook(value.trim()))
    }
}

pub(crate) fn tag_set(tags: &[&str]) -> HashSet<String> {
    tags.iter().map(|tag| tag.to_string()).collect()
}

/// Map an access keyword to its modifier
pub(crate) fn access_keyword(keyword: &str) -> Option<AccessModifier> {
    match keyword.trim() {
        "public" => Some(AccessModifier::Public),
        "private" => Some(AccessModifier::Private),
        "protected" => Some(AccessModifier::Protected),
        "internal" => Some(AccessModifier::Internal),
        _ => None,
    }
}

/// First access keyword among the specifiers of a node or of its `<type>`
pub(crate) fn access_from_specifiers(node: &Node) -> AccessModifier {
    let container = node.element(tags::TYPE).unwrap_or(node);
    container
        .elements_named(tags::SPECIFIER)
        .chain(node.elements_named(tags::SPECIFIER))
        .find_map(|specifier| access_keyword(&specifier.value()))
        .unwrap_or(AccessModifier::None)
}

/// Registry of language descriptors
#[derive(Debug, Default)]
pub struct LanguageRegistry {
    descriptors: Vec<LanguageDescriptor>,
}

impl LanguageRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, replacing any previous one for its language
    pub fn register(&mut self, descriptor: LanguageDescriptor) {
        self.descriptors.retain(|d| d.language != descriptor.language);
        self.descriptors.push(descriptor);
    }

    pub fn get(&self, language: Language) -> Option<&LanguageDescriptor> {
        self.descriptors.iter().find(|d| d.language == language)
    }

    pub fn get_mut(&mut self, language: Language) -> Option<&mut LanguageDescriptor> {
        self.descriptors.iter_mut().find(|d| d.language == language)
    }

    /// Get all registered descriptors
    pub fn descriptors(&self) -> &[LanguageDescriptor] {
        &self.descriptors
    }

    /// Find a descriptor for a file path by extension
    pub fn for_path(&self, path: &Path) -> Option<&LanguageDescriptor> {
        Language::from_path(path).and_then(|language| self.get(language))
    }

    /// Find the descriptor for a file unit.
    ///
    /// The unit's `language` attribute wins; the `filename` extension is the
    /// fallback.
    pub fn for_unit(&self, unit: &Node) -> Result<&LanguageDescriptor> {
        if let Some(name) = unit.attribute("language") {
            let language: Language = name.parse()?;
            return self
                .get(language)
                .ok_or_else(|| Error::UnknownLanguage(name.to_string()));
        }
        let file = unit.attribute("filename").unwrap_or_default();
        self.for_path(Path::new(file))
            .ok_or_else(|| Error::UnknownLanguage(format!("no language for unit {:?}", file)))
    }
}

/// Create a registry with all built-in descriptors
pub fn default_registry() -> LanguageRegistry {
    let mut registry = LanguageRegistry::new();
    for language in Language::all() {
        registry.register(LanguageDescriptor::builtin(*language));
    }
    registry
}
