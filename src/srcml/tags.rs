//! Element names of the srcML vocabulary used by the built-in languages.
//!
//! Namespace prefixes are stripped by the reader, so `op:operator` is
//! [`OPERATOR`] and `lit:literal` is [`LITERAL`].

pub const UNIT: &str = "unit";
pub const BLOCK: &str = "block";
pub const NAME: &str = "name";
pub const TYPE: &str = "type";
pub const SPECIFIER: &str = "specifier";
pub const OPERATOR: &str = "operator";
pub const LITERAL: &str = "literal";
pub const MODIFIER: &str = "modifier";

pub const NAMESPACE: &str = "namespace";
pub const CLASS: &str = "class";
pub const CLASS_DECL: &str = "class_decl";
pub const STRUCT: &str = "struct";
pub const STRUCT_DECL: &str = "struct_decl";
pub const UNION: &str = "union";
pub const UNION_DECL: &str = "union_decl";
pub const ENUM: &str = "enum";
pub const INTERFACE: &str = "interface";
pub const SUPER: &str = "super";
pub const EXTENDS: &str = "extends";
pub const IMPLEMENTS: &str = "implements";

pub const FUNCTION: &str = "function";
pub const FUNCTION_DECL: &str = "function_decl";
pub const CONSTRUCTOR: &str = "constructor";
pub const CONSTRUCTOR_DECL: &str = "constructor_decl";
pub const DESTRUCTOR: &str = "destructor";
pub const DESTRUCTOR_DECL: &str = "destructor_decl";
pub const PARAMETER_LIST: &str = "parameter_list";
pub const PARAMETER: &str = "param";

pub const DECLARATION_STATEMENT: &str = "decl_stmt";
pub const DECLARATION: &str = "decl";
pub const INIT: &str = "init";

pub const CALL: &str = "call";
pub const ARGUMENT_LIST: &str = "argument_list";
pub const ARGUMENT: &str = "argument";
pub const EXPRESSION: &str = "expr";
pub const EXPRESSION_STATEMENT: &str = "expr_stmt";

pub const USING: &str = "using";
pub const IMPORT: &str = "import";
pub const PACKAGE: &str = "package";
pub const COMMENT: &str = "comment";

pub const CATCH: &str = "catch";
pub const FOR: &str = "for";
pub const TEMPLATE: &str = "template";

pub const PUBLIC: &str = "public";
pub const PRIVATE: &str = "private";
pub const PROTECTED: &str = "protected";
