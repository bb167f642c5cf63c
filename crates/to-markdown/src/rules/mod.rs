//! Rule system for HTML to Markdown conversion.
//!
//! Rules form one ordered table: the standard rules followed by user rules in
//! the order they were added. Lookup walks the table from the end, so when
//! several filters accept a tag the rule declared last wins.

mod rule;
mod standard;

pub use rule::{Filter, Replacement, ReplacementFn, Rule};
pub use standard::standard_rules;

use indexmap::IndexMap;

use crate::node::NodeRef;
use crate::service::Options;

/// Collection of rules for conversion
pub struct Rules {
    /// Built-in rules, in declaration order
    standard_rules: Vec<Rule>,
    /// Custom rules added by the user (override the standard ones)
    custom_rules: IndexMap<String, Rule>,
    /// Keep rules (preserve as HTML)
    keep_rules: Vec<Filter>,
    /// Remove rules (remove entirely)
    remove_rules: Vec<Filter>,
}

impl Rules {
    /// Create a new Rules instance with the standard rules
    pub fn new() -> Self {
        Self {
            standard_rules: standard_rules(),
            custom_rules: IndexMap::new(),
            keep_rules: Vec::new(),
            remove_rules: Vec::new(),
        }
    }

    /// Add a custom rule.
    ///
    /// Re-using a key replaces the earlier rule without changing its position.
    pub fn add(&mut self, key: &str, rule: Rule) {
        self.custom_rules.insert(key.to_string(), rule);
    }

    /// Add a keep filter
    pub fn keep(&mut self, filter: Filter) {
        self.keep_rules.push(filter);
    }

    /// Add a remove filter
    pub fn remove(&mut self, filter: Filter) {
        self.remove_rules.push(filter);
    }

    /// Find the rule for a node: the last one in the table that matches
    pub fn for_node<'a>(&'a self, node: &NodeRef, options: &Options) -> Option<&'a Rule> {
        let tag = node.tag_name();

        self.standard_rules
            .iter()
            .chain(self.custom_rules.values())
            .rev()
            .find(|rule| rule.filter.matches(tag, node, options))
    }

    /// Check if a node should be kept as HTML
    pub fn should_keep(&self, node: &NodeRef, options: &Options) -> bool {
        // Don't keep if a conversion rule matches
        self.for_node(node, options).is_none() && self.keep_matches(node, options)
    }

    /// Check if a node should be removed
    pub fn should_remove(&self, node: &NodeRef, options: &Options) -> bool {
        // Conversion rules and keep filters take precedence
        self.for_node(node, options).is_none()
            && !self.keep_matches(node, options)
            && self.remove_matches(node, options)
    }

    /// Check the keep filters only, for callers that already know no rule matches
    pub(crate) fn keep_matches(&self, node: &NodeRef, options: &Options) -> bool {
        let tag = node.tag_name();
        self.keep_rules
            .iter()
            .any(|filter| filter.matches(tag, node, options))
    }

    /// Check the remove filters only, for callers that already know no rule matches
    pub(crate) fn remove_matches(&self, node: &NodeRef, options: &Options) -> bool {
        let tag = node.tag_name();
        self.remove_rules
            .iter()
            .any(|filter| filter.matches(tag, node, options))
    }

    /// Get the keep replacement for a node
    pub fn keep_replacement(&self, node: &NodeRef) -> String {
        node.outer_html()
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Dom;

    fn apply(rules: &Rules, dom: &Dom, tag_node: crate::node::NodeId) -> Option<String> {
        let options = Options::default();
        let node = dom.node(tag_node);
        rules
            .for_node(&node, &options)
            .map(|rule| rule.replace(&node, || "x".to_string(), &options))
    }

    #[test]
    fn test_standard_lookup() {
        let rules = Rules::new();
        let mut dom = Dom::fragment();
        let em = dom.append_element(dom.root(), "em");
        let div = dom.append_element(dom.root(), "div");

        assert_eq!(apply(&rules, &dom, em).as_deref(), Some("_x_"));
        assert_eq!(apply(&rules, &dom, div), None);
    }

    #[test]
    fn test_last_match_wins() {
        let mut rules = Rules::new();
        rules.add("loud", Rule::for_tags(&["em", "i"], |c, _, _| c.to_uppercase()));
        rules.add("louder", Rule::for_tag("i", |c, _, _| format!("{}!", c.to_uppercase())));

        let mut dom = Dom::fragment();
        let em = dom.append_element(dom.root(), "em");
        let i = dom.append_element(dom.root(), "i");

        assert_eq!(apply(&rules, &dom, em).as_deref(), Some("X"));
        assert_eq!(apply(&rules, &dom, i).as_deref(), Some("X!"));
    }

    #[test]
    fn test_readding_key_keeps_position() {
        let mut rules = Rules::new();
        rules.add("first", Rule::for_tag("span", |_, _, _| "first".to_string()));
        rules.add("second", Rule::for_tag("span", |_, _, _| "second".to_string()));
        rules.add("first", Rule::for_tag("span", |_, _, _| "first again".to_string()));

        let mut dom = Dom::fragment();
        let span = dom.append_element(dom.root(), "span");

        assert_eq!(apply(&rules, &dom, span).as_deref(), Some("second"));
        assert_eq!(rules.custom_rules.len(), 2);
    }

    #[test]
    fn test_keep_and_remove() {
        let mut rules = Rules::new();
        rules.keep(Filter::tags(&["del", "em"]));
        rules.remove(Filter::tags(&["script", "del"]));

        let options = Options::default();
        let mut dom = Dom::fragment();
        let del = dom.append_element(dom.root(), "del");
        let em = dom.append_element(dom.root(), "em");
        let script = dom.append_element(dom.root(), "script");

        assert!(rules.should_keep(&dom.node(del), &options));
        assert!(!rules.should_remove(&dom.node(del), &options));
        // a conversion rule beats keep
        assert!(!rules.should_keep(&dom.node(em), &options));
        assert!(rules.should_remove(&dom.node(script), &options));
        // the filter-level checks ignore precedence
        assert!(rules.keep_matches(&dom.node(del), &options));
        assert!(rules.remove_matches(&dom.node(del), &options));
    }
}
