//! ToMarkdownService - the main entry point for HTML to Markdown conversion.
//!
//! Conversion runs in fixed passes over a freshly parsed tree:
//!
//! 1. escape `1. `-style text so it cannot turn into an ordered list
//! 2. parse into a [`Dom`] through the injected [`HtmlParser`]
//! 3. drop whitespace-only text nodes outside `pre`/`code`
//! 4. rewrite every element into a text node, deepest elements first
//! 5. serialize, decode entities and tidy up blank lines

use std::borrow::Cow;

use tracing::{debug, trace};

#[cfg(feature = "html")]
use crate::html::ScraperParser;
use crate::html::HtmlParser;
use crate::node::{Dom, NodeId};
use crate::rules::{Filter, Rule, Rules};
use crate::tree::{bfs_order, remove_blank_nodes};
use crate::utilities::{escape_list_markers, is_blank, is_void, tidy_output};
use crate::{Result, ToMarkdownError};

/// Options for ToMarkdownService
#[derive(Debug, Clone)]
pub struct Options {
    /// Emphasis delimiter
    pub em_delimiter: String,

    /// Strong delimiter
    pub strong_delimiter: String,

    /// Bullet list marker
    pub bullet_list_marker: char,

    /// Escape `1. `-style text before parsing
    pub escape_list_markers: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            em_delimiter: "_".to_string(),
            strong_delimiter: "**".to_string(),
            bullet_list_marker: '*',
            escape_list_markers: true,
        }
    }
}

/// The main service for converting HTML to Markdown
pub struct ToMarkdownService {
    options: Options,
    rules: Rules,
}

impl ToMarkdownService {
    /// Create a new ToMarkdownService with default options
    pub fn new() -> Self {
        Self {
            options: Options::default(),
            rules: Rules::new(),
        }
    }

    /// Create a ToMarkdownService with custom options
    pub fn with_options(options: Options) -> Self {
        Self {
            options,
            rules: Rules::new(),
        }
    }

    /// Convert HTML to Markdown with the bundled scraper parser
    #[cfg(feature = "html")]
    pub fn convert(&self, html: &str) -> Result<String> {
        self.convert_with(&ScraperParser, html)
    }

    /// Convert raw bytes, which must be UTF-8 encoded HTML
    #[cfg(feature = "html")]
    pub fn convert_bytes(&self, input: &[u8]) -> Result<String> {
        self.convert_bytes_with(&ScraperParser, input)
    }

    /// Convert raw bytes with the given parser.
    ///
    /// Fails with [`ToMarkdownError::InvalidInputType`] before parsing if the
    /// bytes are not a UTF-8 string.
    pub fn convert_bytes_with(&self, parser: &dyn HtmlParser, input: &[u8]) -> Result<String> {
        let html = std::str::from_utf8(input).map_err(|e| {
            ToMarkdownError::InvalidInputType(format!("input needs to be an HTML string: {}", e))
        })?;
        self.convert_with(parser, html)
    }

    /// Convert HTML to Markdown with the given parser
    pub fn convert_with(&self, parser: &dyn HtmlParser, html: &str) -> Result<String> {
        debug!("Converting {} bytes of HTML", html.len());

        let html = if self.options.escape_list_markers {
            escape_list_markers(html)
        } else {
            Cow::Borrowed(html)
        };

        let dom = parser.parse_fragment(&html);
        self.convert_dom(dom, parser)
    }

    /// Convert an already parsed tree.
    ///
    /// The tree is consumed: it is normalized and rewritten in place. The
    /// parser is only used for entity decoding.
    pub fn convert_dom(&self, mut dom: Dom, parser: &dyn HtmlParser) -> Result<String> {
        let root = dom.root();
        remove_blank_nodes(&mut dom, root);

        let order = bfs_order(&dom);
        debug!("Rewriting {} elements", order.len());

        // Reverse breadth-first order: descendants are replaced before their ancestors.
        for &id in order.iter().rev() {
            let markdown = self.replacement_for_node(&dom, id, parser);
            let text = dom.create_text(&markdown);
            dom.replace_child(id, text);
        }

        let serialized = dom.inner_html(root);
        let output = tidy_output(&parser.decode_entities(&serialized));
        debug!("Produced {} bytes of Markdown", output.len());

        Ok(output)
    }

    /// Compute the markdown that replaces one element
    fn replacement_for_node(&self, dom: &Dom, id: NodeId, parser: &dyn HtmlParser) -> String {
        let node = dom.node(id);
        let tag = node.tag_name();

        if !is_void(tag) && is_blank(&node.inner_html()) {
            trace!("<{}> is blank, removing", tag);
            return String::new();
        }

        let content = || parser.decode_entities(&node.inner_html()).into_owned();

        if let Some(rule) = self.rules.for_node(&node, &self.options) {
            trace!("<{}> converted by rule", tag);
            return rule.replace(&node, content, &self.options);
        }

        // No rule matched, so only the filters are left to check
        if self.rules.keep_matches(&node, &self.options) {
            trace!("<{}> kept as HTML", tag);
            return self.rules.keep_replacement(&node);
        }

        if self.rules.remove_matches(&node, &self.options) {
            trace!("<{}> removed", tag);
            return String::new();
        }

        // No rule: keep the converted content, drop the element's own tags
        trace!("<{}> has no rule, passing content through", tag);
        content()
    }

    /// Add a custom rule. Custom rules take precedence over the standard
    /// ones, and later rules over earlier ones.
    pub fn add_rule(&mut self, key: &str, rule: Rule) -> &mut Self {
        self.rules.add(key, rule);
        self
    }

    /// Keep elements matching the filter as HTML
    pub fn keep(&mut self, filter: Filter) -> &mut Self {
        self.rules.keep(filter);
        self
    }

    /// Remove elements matching the filter
    pub fn remove(&mut self, filter: Filter) -> &mut Self {
        self.rules.remove(filter);
        self
    }

    /// Apply a plugin
    pub fn use_plugin<F>(&mut self, plugin: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        plugin(self);
        self
    }

    /// Get the current options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Get mutable access to options
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }
}

impl Default for ToMarkdownService {
    fn default() -> Self {
        Self::new()
    }
}
