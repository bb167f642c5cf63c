//! Rule and Filter types for HTML conversion.

use regex::{Regex, RegexBuilder};

use crate::node::NodeRef;
use crate::service::Options;
use crate::{Result, ToMarkdownError};

/// Type alias for replacement functions.
///
/// Called with the element's already-converted, entity-decoded content.
pub type ReplacementFn = Box<dyn Fn(&str, &NodeRef, &Options) -> String + Send + Sync>;

/// A filter determines which elements a rule applies to
pub enum Filter {
    /// Match a single tag name
    TagName(String),
    /// Match any of multiple tag names
    TagNames(Vec<String>),
    /// Match tag names against an anchored, case-insensitive regex
    Pattern(Regex),
    /// Match using a predicate function
    Predicate(Box<dyn Fn(&str, &NodeRef, &Options) -> bool + Send + Sync>),
}

impl Filter {
    /// Create a filter for a single tag
    pub fn tag(name: &str) -> Self {
        Filter::TagName(name.to_lowercase())
    }

    /// Create a filter for multiple tags
    pub fn tags(names: &[&str]) -> Self {
        Filter::TagNames(names.iter().map(|s| s.to_lowercase()).collect())
    }

    /// Create a filter from a tag-name pattern such as `h[1-6]`.
    ///
    /// The pattern must match the whole tag name.
    pub fn pattern(pattern: &str) -> Result<Self> {
        RegexBuilder::new(&format!("^(?:{})$", pattern))
            .case_insensitive(true)
            .build()
            .map(Filter::Pattern)
            .map_err(|e| ToMarkdownError::InvalidRule(format!("bad tag pattern {:?}: {}", pattern, e)))
    }

    /// Create a filter with a predicate
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str, &NodeRef, &Options) -> bool + Send + Sync + 'static,
    {
        Filter::Predicate(Box::new(f))
    }

    /// Check if this filter matches a node
    pub fn matches(&self, tag: &str, node: &NodeRef, options: &Options) -> bool {
        let tag_lower = tag.to_lowercase();
        match self {
            Filter::TagName(t) => tag_lower == *t,
            Filter::TagNames(tags) => tags.contains(&tag_lower),
            Filter::Pattern(re) => re.is_match(&tag_lower),
            Filter::Predicate(f) => f(&tag_lower, node, options),
        }
    }
}

/// What a matched element is replaced with
pub enum Replacement {
    /// Fixed markdown, independent of the element
    Constant(String),
    /// Markdown computed from the element's content and the element itself
    Compute(ReplacementFn),
}

/// A rule defines how to convert a matched HTML element to Markdown
pub struct Rule {
    /// Filter to determine which elements this rule applies to
    pub filter: Filter,
    /// Replacement that generates Markdown
    pub replacement: Replacement,
}

impl Rule {
    /// Create a new rule
    pub fn new<F>(filter: Filter, replacement: F) -> Self
    where
        F: Fn(&str, &NodeRef, &Options) -> String + Send + Sync + 'static,
    {
        Self {
            filter,
            replacement: Replacement::Compute(Box::new(replacement)),
        }
    }

    /// Create a rule that always emits the same markdown
    pub fn constant(filter: Filter, markdown: &str) -> Self {
        Self {
            filter,
            replacement: Replacement::Constant(markdown.to_string()),
        }
    }

    /// Create a rule that matches a single tag
    pub fn for_tag<F>(tag: &str, replacement: F) -> Self
    where
        F: Fn(&str, &NodeRef, &Options) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tag(tag), replacement)
    }

    /// Create a rule that matches multiple tags
    pub fn for_tags<F>(tags: &[&str], replacement: F) -> Self
    where
        F: Fn(&str, &NodeRef, &Options) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tags(tags), replacement)
    }

    /// Create a rule whose tags are given as a pattern, see [`Filter::pattern`]
    pub fn for_pattern<F>(pattern: &str, replacement: F) -> Result<Self>
    where
        F: Fn(&str, &NodeRef, &Options) -> String + Send + Sync + 'static,
    {
        Ok(Self::new(Filter::pattern(pattern)?, replacement))
    }

    /// Apply this rule's replacement.
    ///
    /// `content` is only computed for [`Replacement::Compute`] rules.
    pub fn replace<C>(&self, node: &NodeRef, content: C, options: &Options) -> String
    where
        C: FnOnce() -> String,
    {
        match &self.replacement {
            Replacement::Constant(markdown) => markdown.clone(),
            Replacement::Compute(f) => f(&content(), node, options),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Dom;

    #[test]
    fn test_filters() {
        let mut dom = Dom::fragment();
        let h3 = dom.append_element(dom.root(), "H3");
        let node = dom.node(h3);
        let options = Options::default();

        assert!(Filter::tag("h3").matches("H3", &node, &options));
        assert!(Filter::tags(&["h1", "h3"]).matches("h3", &node, &options));
        assert!(!Filter::tag("h1").matches("h3", &node, &options));
        assert!(Filter::predicate(|tag, _, _| tag.starts_with('h')).matches("h3", &node, &options));
    }

    #[test]
    fn test_pattern_filter_is_anchored() {
        let mut dom = Dom::fragment();
        let hr = dom.append_element(dom.root(), "hr");
        let node = dom.node(hr);
        let options = Options::default();

        let filter = Filter::pattern("h[1-6]").unwrap();
        assert!(filter.matches("h1", &node, &options));
        assert!(filter.matches("H6", &node, &options));
        assert!(!filter.matches("hr", &node, &options));
        assert!(!filter.matches("th1", &node, &options));

        let filter = Filter::pattern("em|i").unwrap();
        assert!(filter.matches("i", &node, &options));
        assert!(!filter.matches("img", &node, &options));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = Filter::pattern("h[1-").err().unwrap();
        assert!(matches!(err, ToMarkdownError::InvalidRule(_)));

        let err = Rule::for_pattern("(", |c, _, _| c.to_string()).err().unwrap();
        assert!(err.to_string().contains("invalid rule"));
    }

    #[test]
    fn test_replace_constant_skips_content() {
        let mut dom = Dom::fragment();
        let br = dom.append_element(dom.root(), "br");
        let rule = Rule::constant(Filter::tag("br"), "  \n");

        let result = rule.replace(&dom.node(br), || unreachable!(), &Options::default());
        assert_eq!(result, "  \n");
    }

    #[test]
    fn test_replace_compute() {
        let mut dom = Dom::fragment();
        let span = dom.append_element(dom.root(), "span");
        let rule = Rule::for_tag("span", |content, node, _| format!("{}:{}", node.tag_name(), content));

        let result = rule.replace(&dom.node(span), || "x".to_string(), &Options::default());
        assert_eq!(result, "span:x");
    }
}
