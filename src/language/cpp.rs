//! C and C++ descriptors
//!
//! Both languages share one srcML vocabulary. C simply never produces
//! namespaces, access regions or `using` statements.

use super::descriptor::{access_from_specifiers, access_keyword, tag_set, LanguageDescriptor, LanguageHooks};
use super::literal::NumberShape;
use super::Language;
use crate::scope::AccessModifier;
use crate::srcml::{tags, Node};

const CONTAINERS: &[&str] = &[
    "block", "catch", "do", "else", "extern", "for", "if", "switch", "then", "try", "while",
];

const TYPES: &[&str] = &[
    tags::CLASS,
    tags::CLASS_DECL,
    tags::STRUCT,
    tags::STRUCT_DECL,
    tags::UNION,
    tags::UNION_DECL,
    tags::ENUM,
];

const METHODS: &[&str] = &[
    tags::FUNCTION,
    tags::FUNCTION_DECL,
    tags::CONSTRUCTOR,
    tags::CONSTRUCTOR_DECL,
    tags::DESTRUCTOR,
    tags::DESTRUCTOR_DECL,
];

const REFERENCES: &[&str] = &[
    tags::FUNCTION_DECL,
    tags::CONSTRUCTOR_DECL,
    tags::DESTRUCTOR_DECL,
    tags::CLASS_DECL,
    tags::STRUCT_DECL,
    tags::UNION_DECL,
];

pub fn cplusplus() -> LanguageDescriptor {
    LanguageDescriptor {
        language: Language::CPlusPlus,
        containers: tag_set(CONTAINERS),
        methods: tag_set(METHODS),
        namespaces: tag_set(&[tags::NAMESPACE]),
        types: tag_set(TYPES),
        declarations: tag_set(&[tags::DECLARATION_STATEMENT]),
        references: tag_set(REFERENCES),
        transparent: tag_set(&[tags::PUBLIC, tags::PRIVATE, tags::PROTECTED, tags::TEMPLATE]),
        alias: tags::USING.to_string(),
        package: None,
        hooks: hooks(),
    }
}

pub fn c() -> LanguageDescriptor {
    LanguageDescriptor {
        language: Language::C,
        namespaces: Default::default(),
        transparent: Default::default(),
        ..cplusplus()
    }
}

fn hooks() -> LanguageHooks {
    LanguageHooks {
        boolean_literal: |_| "bool".to_string(),
        character_literal: |_| "char".to_string(),
        number_literal: number_type,
        string_literal: |_| "char*".to_string(),
        method_accessibility: region_accessibility,
        type_accessibility: region_accessibility,
        alias_is_namespace_import,
        parent_type_names,
    }
}

fn number_type(text: &str) -> String {
    let shape = NumberShape::parse(text);
    if shape.is_floating {
        return match shape.suffix.as_str() {
            "f" => "float",
            "l" => "long double",
            _ => "double",
        }
        .to_string();
    }
    let unsigned = shape.suffix.contains('u');
    let longs = shape.suffix.matches('l').count();
    let base = match longs {
        0 => "int",
        1 => "long",
        _ => "long long",
    };
    if unsigned {
        format!("unsigned {}", base)
    } else {
        base.to_string()
    }
}

/// The enclosing access region decides; explicit specifiers are the fallback
fn region_accessibility(node: &Node, region: Option<&str>) -> AccessModifier {
    region
        .and_then(access_keyword)
        .unwrap_or_else(|| access_from_specifiers(node))
}

/// `using namespace x::y;` imports a namespace, `using x::Foo;` a symbol
fn alias_is_namespace_import(alias: &Node) -> bool {
    alias.element(tags::NAMESPACE).is_some()
        || alias.direct_text().split_whitespace().any(|word| word == "namespace")
}

/// `class D : public A, B` writes its parents as names inside `<super>`
fn parent_type_names(type_node: &Node) -> Vec<&Node> {
    type_node
        .elements_named(tags::SUPER)
        .flat_map(|sup| sup.elements_named(tags::NAME))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LiteralKind;

    #[test]
    fn test_number_literals() {
        let cpp = cplusplus();
        let ty = |text| cpp.literal_type(LiteralKind::Number, text).unwrap();
        assert_eq!(ty("7"), "int");
        assert_eq!(ty("7u"), "unsigned int");
        assert_eq!(ty("7UL"), "unsigned long");
        assert_eq!(ty("7ll"), "long long");
        assert_eq!(ty("1.5"), "double");
        assert_eq!(ty("1.5f"), "float");
        assert_eq!(cpp.literal_type(LiteralKind::String, "\"a\"").unwrap(), "char*");
        assert_eq!(cpp.literal_type(LiteralKind::Null, "nullptr"), None);
    }

    #[test]
    fn test_alias_kinds() {
        let namespace_import = Node::new("using")
            .with_text("using namespace ")
            .with_child(Node::new("name").with_text("std"))
            .with_text(";");
        let symbol_import = Node::new("using")
            .with_text("using ")
            .with_child(Node::new("name").with_text("std::string"))
            .with_text(";");
        assert!(alias_is_namespace_import(&namespace_import));
        assert!(!alias_is_namespace_import(&symbol_import));
    }

    #[test]
    fn test_region_accessibility() {
        let method = Node::new("function");
        assert_eq!(region_accessibility(&method, Some("private")), AccessModifier::Private);
        assert_eq!(region_accessibility(&method, None), AccessModifier::None);
    }

    #[test]
    fn test_c_has_no_namespaces() {
        let c = c();
        assert_eq!(c.language, Language::C);
        assert!(!c.is_namespace("namespace"));
        assert!(c.is_type("struct"));
    }
}
