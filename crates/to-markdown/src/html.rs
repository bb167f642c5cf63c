//! HTML parsing support.
//!
//! The converter never parses HTML itself. It asks an [`HtmlParser`] for a
//! [`Dom`] and for entity decoding, so the whole core can run against any
//! parser, or against a hand-built tree in tests.

use std::borrow::Cow;

#[cfg(feature = "html")]
use scraper::{ElementRef, Html, Node as ScraperNode};

use crate::node::Dom;
#[cfg(feature = "html")]
use crate::node::NodeId;

/// The parser/DOM provider the converter depends on.
pub trait HtmlParser {
    /// Parse an HTML fragment into a tree rooted at a container element.
    ///
    /// The tree must only contain element and text nodes.
    fn parse_fragment(&self, html: &str) -> Dom;

    /// Decode HTML character references (`&amp;`, `&nbsp;`, `&#9829;`, ...).
    fn decode_entities<'a>(&self, text: &'a str) -> Cow<'a, str> {
        htmlize::unescape(text)
    }
}

/// [`HtmlParser`] backed by scraper/html5ever.
#[cfg(feature = "html")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ScraperParser;

#[cfg(feature = "html")]
impl HtmlParser for ScraperParser {
    fn parse_fragment(&self, html: &str) -> Dom {
        parse_html(html)
    }
}

/// Parse an HTML string into a [`Dom`] rooted at a `div`.
///
/// This is useful when you need to manipulate the tree before converting it
/// to Markdown.
///
/// # Example
///
/// ```rust
/// use to_markdown::{parse_html, ScraperParser, ToMarkdownService};
///
/// let dom = parse_html("<h1><em>Hello</em> World</h1>");
///
/// let service = ToMarkdownService::new();
/// let markdown = service.convert_dom(dom, &ScraperParser).unwrap();
/// assert_eq!(markdown, "# _Hello_ World");
/// ```
#[cfg(feature = "html")]
pub fn parse_html(html: &str) -> Dom {
    let document = Html::parse_fragment(html);
    let mut dom = Dom::fragment();
    let root = dom.root();
    copy_children(&mut dom, root, document.root_element());
    dom
}

/// Copy the element and text children of a scraper element into `dom`.
/// Comments, doctypes and processing instructions are dropped.
#[cfg(feature = "html")]
fn copy_children(dom: &mut Dom, parent: NodeId, element: ElementRef) {
    for child in element.children() {
        match child.value() {
            ScraperNode::Text(text) => {
                dom.append_text(parent, &text.text);
            }
            ScraperNode::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    let value = child_element.value();
                    let id = dom.create_element_with_attrs(value.name(), value.attrs());
                    dom.append_child(parent, id);
                    copy_children(dom, id, child_element);
                }
            }
            _ => {}
        }
    }
}
