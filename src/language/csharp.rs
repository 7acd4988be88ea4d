//! C# descriptor

use super::descriptor::{access_from_specifiers, tag_set, LanguageDescriptor, LanguageHooks};
use super::literal::NumberShape;
use super::Language;
use crate::scope::AccessModifier;
use crate::srcml::{tags, Node};

const CONTAINERS: &[&str] = &[
    "block", "catch", "do", "else", "finally", "fixed", "for", "foreach", "if", "lock", "switch",
    "then", "try", "unsafe", "using_stmt", "while",
];

pub fn csharp() -> LanguageDescriptor {
    LanguageDescriptor {
        language: Language::CSharp,
        containers: tag_set(CONTAINERS),
        methods: tag_set(&[
            tags::FUNCTION,
            tags::FUNCTION_DECL,
            tags::CONSTRUCTOR,
            tags::DESTRUCTOR,
        ]),
        namespaces: tag_set(&[tags::NAMESPACE]),
        types: tag_set(&[tags::CLASS, tags::STRUCT, tags::INTERFACE, tags::ENUM]),
        declarations: tag_set(&[tags::DECLARATION_STATEMENT]),
        references: tag_set(&[tags::FUNCTION_DECL]),
        transparent: Default::default(),
        alias: tags::USING.to_string(),
        package: None,
        hooks: LanguageHooks {
            boolean_literal: |_| "bool".to_string(),
            character_literal: |_| "char".to_string(),
            number_literal: number_type,
            string_literal: |_| "string".to_string(),
            method_accessibility: specifier_accessibility,
            type_accessibility: specifier_accessibility,
            alias_is_namespace_import,
            parent_type_names,
        },
    }
}

fn number_type(text: &str) -> String {
    let shape = NumberShape::parse(text);
    match shape.suffix.as_str() {
        "f" => "float",
        "d" => "double",
        "m" => "decimal",
        "u" => "uint",
        "l" => "long",
        "ul" | "lu" => "ulong",
        _ if shape.is_floating => "double",
        _ => "int",
    }
    .to_string()
}

fn specifier_accessibility(node: &Node, _region: Option<&str>) -> AccessModifier {
    access_from_specifiers(node)
}

/// `using System.Text;` imports a namespace; `using Text = System.Text;` does not
fn alias_is_namespace_import(alias: &Node) -> bool {
    !alias.value().contains('=')
}

fn parent_type_names(type_node: &Node) -> Vec<&Node> {
    type_node
        .elements_named(tags::SUPER)
        .flat_map(|sup| sup.elements_named(tags::NAME))
        .collect()
}
