//! Java descriptor

use super::descriptor::{access_from_specifiers, tag_set, LanguageDescriptor, LanguageHooks};
use super::literal::NumberShape;
use super::Language;
use crate::scope::AccessModifier;
use crate::srcml::{tags, Node};

const CONTAINERS: &[&str] = &[
    "block", "catch", "do", "else", "finally", "for", "if", "switch", "synchronized", "then",
    "try", "while",
];

pub fn java() -> LanguageDescriptor {
    LanguageDescriptor {
        language: Language::Java,
        containers: tag_set(CONTAINERS),
        methods: tag_set(&[tags::FUNCTION, tags::FUNCTION_DECL, tags::CONSTRUCTOR]),
        namespaces: Default::default(),
        types: tag_set(&[tags::CLASS, tags::INTERFACE, tags::ENUM]),
        declarations: tag_set(&[tags::DECLARATION_STATEMENT]),
        references: tag_set(&[tags::FUNCTION_DECL]),
        transparent: Default::default(),
        alias: tags::IMPORT.to_string(),
        package: Some(tags::PACKAGE.to_string()),
        hooks: LanguageHooks {
            boolean_literal: |_| "boolean".to_string(),
            character_literal: |_| "char".to_string(),
            number_literal: number_type,
            string_literal: |_| "String".to_string(),
            method_accessibility: specifier_accessibility,
            type_accessibility: specifier_accessibility,
            alias_is_namespace_import,
            parent_type_names,
        },
    }
}

fn number_type(text: &str) -> String {
    let shape = NumberShape::parse(text);
    match (shape.is_floating, shape.suffix.as_str()) {
        (true, "f") => "float",
        (true, _) => "double",
        (false, "l") => "long",
        (false, _) => "int",
    }
    .to_string()
}

fn specifier_accessibility(node: &Node, _region: Option<&str>) -> AccessModifier {
    access_from_specifiers(node)
}

/// `import java.util.*;` imports a package
fn alias_is_namespace_import(alias: &Node) -> bool {
    alias.value().trim().trim_end_matches(';').trim_end().ends_with('*')
}

/// Names under `extends` and `implements`, whether or not srcML wrapped
/// them in a `<super>` element
fn parent_type_names(type_node: &Node) -> Vec<&Node> {
    let clauses = type_node
        .elements_named(tags::SUPER)
        .flat_map(|sup| sup.elements())
        .chain(type_node.elements());
    clauses
        .filter(|clause| clause.is(tags::EXTENDS) || clause.is(tags::IMPLEMENTS))
        .flat_map(|clause| clause.elements_named(tags::NAME))
        .collect()
}
