use std::collections::{HashMap, HashSet};

use crate::model::span::SpanEntry;

/// Parent/child hierarchy reconstructed from a flat set of spans.
///
/// A derived, read-only view: built fresh per render call, never cached. A
/// span is a root when its parent id is empty or does not resolve to another
/// span in the same set, so dangling references degrade to roots instead of
/// errors. Roots and child lists are ordered ascending by start timestamp,
/// ties keeping arrival order.
pub struct SpanTree<'a> {
    pub roots: Vec<&'a SpanEntry>,
    children: HashMap<&'a str, Vec<&'a SpanEntry>>,
}

pub fn build_span_tree(spans: &[SpanEntry]) -> SpanTree<'_> {
    let ids: HashSet<&str> = spans
        .iter()
        .map(|s| s.attributes.span_id.as_str())
        .collect();

    let mut roots = Vec::new();
    let mut children: HashMap<&str, Vec<&SpanEntry>> = HashMap::new();
    for span in spans {
        let parent = span.attributes.parent_id.as_str();
        if parent.is_empty() || !ids.contains(parent) {
            roots.push(span);
        } else {
            children.entry(parent).or_default().push(span);
        }
    }

    // sort_by_key is stable, so equal timestamps keep arrival order.
    roots.sort_by_key(|s| s.attributes.start_timestamp);
    for list in children.values_mut() {
        list.sort_by_key(|s| s.attributes.start_timestamp);
    }

    SpanTree { roots, children }
}

impl<'a> SpanTree<'a> {
    pub fn children_of(&self, span_id: &str) -> &[&'a SpanEntry] {
        self.children.get(span_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Depth-first pre-order walk over every root. Each span id is visited at
    /// most once, which bounds traversal even if the backend ever returns a
    /// cycle among present spans.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&'a SpanEntry, usize),
    {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut stack: Vec<(&'a SpanEntry, usize)> =
            self.roots.iter().rev().map(|s| (*s, 0)).collect();

        while let Some((span, depth)) = stack.pop() {
            if !seen.insert(span.attributes.span_id.as_str()) {
                continue;
            }
            visit(span, depth);
            for child in self.children_of(&span.attributes.span_id).iter().rev() {
                stack.push((child, depth + 1));
            }
        }
    }
}
