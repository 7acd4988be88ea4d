//! srcML input boundary
//!
//! An external translator turns source text into srcML: an XML encoding in
//! which every construct is an element named from a fixed per-language
//! vocabulary. This module reads that XML into an owned [`Node`] tree and
//! offers the name helpers the compiler needs.

pub mod tags;
pub mod node;
pub mod names;
pub mod reader;

pub use node::{Content, Node};
pub use reader::{parse_archive, parse_unit, read_archive};
