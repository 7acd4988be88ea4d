//! Literal kinds and the numeric literal shape shared by the literal hooks

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// What srcML says a literal is, from its `type` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralKind {
    Boolean,
    Character,
    Number,
    String,
    Null,
}

impl LiteralKind {
    /// Map a srcML literal `type` attribute; unknown kinds are `None`
    pub fn from_attribute(value: &str) -> Option<Self> {
        match value {
            "boolean" => Some(LiteralKind::Boolean),
            "char" => Some(LiteralKind::Character),
            "number" => Some(LiteralKind::Number),
            "string" => Some(LiteralKind::String),
            "null" => Some(LiteralKind::Null),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LiteralKind::Boolean => "boolean",
            LiteralKind::Character => "char",
            LiteralKind::Number => "number",
            LiteralKind::String => "string",
            LiteralKind::Null => "null",
        }
    }
}

static HEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^0[xX][0-9a-fA-F_']+(?P<suffix>[uUlL]*)$").expect("hex literal pattern")
});

static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<digits>[0-9_']*\.?[0-9_']*(?:[eE][+-]?[0-9]+)?)(?P<suffix>[a-zA-Z]*)$")
        .expect("decimal literal pattern")
});

/// Shape of a numeric literal: whether it is floating point and its suffix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberShape {
    pub is_floating: bool,
    /// Suffix letters, lowercased (`ul`, `f`, `m`, ...)
    pub suffix: String,
}

impl NumberShape {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(caps) = HEX.captures(text) {
            return Self {
                is_floating: false,
                suffix: caps["suffix"].to_lowercase(),
            };
        }
        if let Some(caps) = DECIMAL.captures(text) {
            let digits = &caps["digits"];
            let suffix = caps["suffix"].to_lowercase();
            let is_floating = digits.contains('.')
                || digits.contains(['e', 'E'])
                || suffix == "f"
                || suffix == "d"
                || suffix == "m";
            return Self { is_floating, suffix };
        }
        Self {
            is_floating: false,
            suffix: String::new(),
        }
    }
}
