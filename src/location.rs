//! Source locations - where a scope, declaration or use came from
//!
//! Format: `srcml://<file>#<xpath>@<line>` for definitions and
//! `srcml-ref://<file>#<xpath>@<line>` for reference-only locations
//! (forward declarations, alias names, prefix segments).
//!
//! Examples:
//! - `srcml://src/A.h#/unit/class[1]@3`
//! - `srcml-ref://src/A.cpp#/unit/function_decl[2]@10`

use crate::srcml::Node;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DEFINITION_SCHEME: &str = "srcml://";
const REFERENCE_SCHEME: &str = "srcml-ref://";

/// A position in one source file.
///
/// Two locations denote the same construct when their file and tree
/// position agree; the line is informational.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceLocation {
    /// File path as recorded on the unit
    pub file: String,
    /// Tree position of the originating node, relative to its file unit
    pub xpath: String,
    /// Line number of the originating node (1-indexed)
    pub line: u32,
    /// True for reference-only locations such as forward declarations
    pub is_reference: bool,
}

impl SourceLocation {
    /// Create a new definition location
    pub fn new(file: impl Into<String>, xpath: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            xpath: xpath.into(),
            line,
            is_reference: false,
        }
    }

    /// Mark this location as reference-only
    pub fn as_reference(mut self) -> Self {
        self.is_reference = true;
        self
    }

    /// True when both locations denote the same node of the same file
    pub fn same_node(&self, other: &SourceLocation) -> bool {
        self.file == other.file && self.xpath == other.xpath
    }

    /// True when this location lies in `file`
    pub fn is_in(&self, file: &str) -> bool {
        self.file == file
    }

    /// Parse a location string
    ///
    /// Expected format: `srcml://<file>#<xpath>@<line>`
    pub fn parse(location: &str) -> Result<Self> {
        let (rest, is_reference) = if let Some(rest) = location.strip_prefix(REFERENCE_SCHEME) {
            (rest, true)
        } else if let Some(rest) = location.strip_prefix(DEFINITION_SCHEME) {
            (rest, false)
        } else {
            return Err(Error::InvalidInput(format!(
                "location must start with {DEFINITION_SCHEME} or {REFERENCE_SCHEME}: {location}"
            )));
        };

        let (file, fragment) = rest
            .rsplit_once('#')
            .ok_or_else(|| Error::InvalidInput("location must contain # fragment".to_string()))?;

        let (xpath, line_str) = fragment
            .rsplit_once('@')
            .ok_or_else(|| Error::InvalidInput("fragment must contain @line".to_string()))?;

        let line: u32 = line_str
            .parse()
            .map_err(|_| Error::InvalidInput(format!("Invalid line number: {}", line_str)))?;

        Ok(Self {
            file: file.to_string(),
            xpath: xpath.to_string(),
            line,
            is_reference,
        })
    }

    /// Convert to a location string
    pub fn to_location_string(&self) -> String {
        let scheme = if self.is_reference { REFERENCE_SCHEME } else { DEFINITION_SCHEME };
        format!("{}{}#{}@{}", scheme, self.file, self.xpath, self.line)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_location_string())
    }
}

impl FromStr for SourceLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Stamps nodes of one file with their source location
#[derive(Debug, Clone, Default)]
pub struct LocationFactory {
    file: String,
}

impl LocationFactory {
    pub fn new(file: impl Into<String>) -> Self {
        Self { file: file.into() }
    }

    /// The file every location from this factory points into
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Create a location for `node`
    pub fn create(&self, node: &Node, is_reference: bool) -> SourceLocation {
        SourceLocation {
            file: self.file.clone(),
            xpath: node.xpath().to_string(),
            line: node.line(),
            is_reference,
        }
    }
}
