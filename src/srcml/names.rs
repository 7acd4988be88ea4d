//! Helpers for possibly-qualified `<name>` elements
//!
//! srcML writes `A::B::C` as a `<name>` wrapping the segment names and the
//! `::` operators between them. A generic segment such as `vector<int>` is a
//! `<name>` holding the plain name and an `<argument_list>`.

use super::node::Node;
use super::tags;

/// Split a name element into its qualification segments, outermost first.
///
/// A plain or generic name is its own single segment.
pub fn segments(name: &Node) -> Vec<&Node> {
    let inner: Vec<&Node> = name.elements_named(tags::NAME).collect();
    let qualified = name.element(tags::OPERATOR).is_some() || inner.len() > 1;
    if qualified {
        inner.into_iter().flat_map(segments).collect()
    } else {
        vec![name]
    }
}

/// Identifier text of one segment, without type arguments
pub fn segment_name(segment: &Node) -> String {
    match segment.element(tags::NAME) {
        Some(inner) => segment_name(inner),
        None => segment.value().trim().to_string(),
    }
}

/// The terminal segment of a name (`C` in `A::B::C`)
pub fn last_segment(name: &Node) -> &Node {
    segments(name).pop().unwrap_or(name)
}

/// Every segment but the last (`A`, `B` in `A::B::C`)
pub fn prefix_segments(name: &Node) -> Vec<&Node> {
    let mut all = segments(name);
    all.pop();
    all
}

/// The identifier texts of all segments
pub fn segment_names(name: &Node) -> Vec<String> {
    segments(name).into_iter().map(segment_name).collect()
}

/// Names of the type arguments written on a generic segment.
///
/// Each argument contributes the name element of its type, whether written
/// directly or wrapped in an `<expr>`.
pub fn type_arguments(segment: &Node) -> Vec<&Node> {
    let Some(arguments) = segment.element(tags::ARGUMENT_LIST) else {
        return Vec::new();
    };
    arguments
        .elements_named(tags::ARGUMENT)
        .filter_map(|argument| {
            argument.element(tags::NAME).or_else(|| {
                argument
                    .element(tags::EXPRESSION)
                    .and_then(|expr| expr.element(tags::NAME))
            })
        })
        .collect()
}
