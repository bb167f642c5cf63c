//! Tree passes that run before rewriting: whitespace normalization and
//! computing the rewrite order.

use std::collections::VecDeque;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::node::{Dom, NodeId, NodeType};
use crate::utilities::{is_blank, is_preformatted};

/// Leading newline/tab/form-feed runs at line starts, and trailing
/// whitespace at line ends.
static EDGE_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[\n\r\t\x0C]+\s*|\s+$").unwrap());

/// Drop whitespace-only text nodes and trim the rest, depth first.
///
/// Text whose parent is `pre` or `code` is left exactly as parsed.
pub fn remove_blank_nodes(dom: &mut Dom, id: NodeId) {
    match dom.node_type(id) {
        NodeType::Text => {
            let Some(parent) = dom.parent(id) else {
                return;
            };
            if dom.tag_name(parent).is_some_and(is_preformatted) {
                return;
            }

            let value = dom.text(id).unwrap_or_default();
            if is_blank(value) {
                dom.remove_child(parent, id);
            } else {
                let trimmed = EDGE_WHITESPACE.replace_all(value, "").into_owned();
                dom.set_text(id, trimmed);
            }
        }
        NodeType::Element => {
            // Children may be removed while we walk, so iterate over a snapshot.
            let children = dom.children(id).to_vec();
            for child in children {
                remove_blank_nodes(dom, child);
            }
        }
    }
}

/// Breadth-first list of every element below the root.
///
/// A node always comes before its descendants, so walking the result
/// backwards visits children before their ancestors.
pub fn bfs_order(dom: &Dom) -> Vec<NodeId> {
    let mut queue = VecDeque::from([dom.root()]);
    let mut order = Vec::new();

    while let Some(id) = queue.pop_front() {
        order.push(id);
        queue.extend(dom.element_children(id));
    }

    order.remove(0);
    order
}
