//! Language descriptors
//!
//! The compiler never branches on a language. Everything it needs to know
//! about one (which tags open scopes, how imports are written, how literals
//! are typed) comes from a [`LanguageDescriptor`].

pub mod descriptor;
pub mod literal;
pub mod cpp;
pub mod java;
pub mod csharp;

pub use descriptor::{default_registry, LanguageDescriptor, LanguageHooks, LanguageRegistry};
pub use literal::LiteralKind;

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Source languages with a built-in descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    C,
    CPlusPlus,
    Java,
    CSharp,
}

impl Language {
    /// Name used by the srcML `language` attribute
    pub fn srcml_name(&self) -> &'static str {
        match self {
            Language::C => "C",
            Language::CPlusPlus => "C++",
            Language::Java => "Java",
            Language::CSharp => "C#",
        }
    }

    /// File extensions translated as this language
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::C => &["c", "h"],
            Language::CPlusPlus => &["cpp", "cc", "cxx", "c++", "hpp", "hh", "hxx"],
            Language::Java => &["java"],
            Language::CSharp => &["cs"],
        }
    }

    /// Get all languages
    pub fn all() -> &'static [Language] {
        &[Language::C, Language::CPlusPlus, Language::Java, Language::CSharp]
    }

    /// Guess the language of a file from its extension
    pub fn from_path(path: &Path) -> Option<Language> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        Language::all()
            .iter()
            .copied()
            .find(|language| language.extensions().contains(&ext.as_str()))
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "c" => Ok(Language::C),
            "c++" | "cpp" | "cplusplus" | "cxx" => Ok(Language::CPlusPlus),
            "java" => Ok(Language::Java),
            "c#" | "csharp" | "cs" => Ok(Language::CSharp),
            _ => Err(Error::UnknownLanguage(s.to_string())),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.srcml_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_names() {
        for language in Language::all() {
            let parsed: Language = language.srcml_name().parse().unwrap();
            assert_eq!(parsed, *language);
        }
        assert_eq!("cpp".parse::<Language>().unwrap(), Language::CPlusPlus);
        assert!(matches!("cobol".parse::<Language>(), Err(Error::UnknownLanguage(_))));
    }

    #[test]
    fn test_language_from_path() {
        assert_eq!(Language::from_path(Path::new("src/A.hpp")), Some(Language::CPlusPlus));
        assert_eq!(Language::from_path(Path::new("a.h")), Some(Language::C));
        assert_eq!(Language::from_path(Path::new("Foo.java")), Some(Language::Java));
        assert_eq!(Language::from_path(Path::new("README")), None);
    }
}
