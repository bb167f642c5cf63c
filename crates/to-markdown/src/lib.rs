//! # to-markdown
//!
//! Convert HTML fragments to Markdown.
//!
//! ## Design
//!
//! The HTML is parsed into a small mutable tree, then every element is
//! replaced by a text node holding its Markdown. Elements are visited in
//! reverse breadth-first order, so by the time an element is converted all of
//! its descendants already are, and its content is plain Markdown. Block
//! structure (nested lists, quoted paragraphs, code blocks) is composed
//! bottom-up this way.
//!
//! - **Parser agnostic**: parsing and entity decoding go through the
//!   [`HtmlParser`] trait; the `html` feature bundles a scraper/html5ever one
//! - **Extensible**: rules are an ordered table where later rules override
//!   earlier ones, so custom rules can replace the built-in conversions
//!
//! ## Example (HTML string)
//!
//! ```rust
//! use to_markdown::ToMarkdownService;
//!
//! let service = ToMarkdownService::new();
//! let markdown = service.convert("<h1>Hello World</h1>").unwrap();
//! assert_eq!(markdown, "# Hello World");
//! ```
//!
//! ## Example (hand-built tree)
//!
//! ```rust
//! use to_markdown::{Dom, ScraperParser, ToMarkdownService};
//!
//! let mut dom = Dom::fragment();
//! let ul = dom.append_element(dom.root(), "ul");
//! for item in ["one", "two"] {
//!     let li = dom.append_element(ul, "li");
//!     dom.append_text(li, item);
//! }
//!
//! let service = ToMarkdownService::new();
//! let markdown = service.convert_dom(dom, &ScraperParser).unwrap();
//! assert_eq!(markdown, "*   one\n*   two");
//! ```

pub mod html;
pub mod node;
mod rules;
mod service;
mod tree;
mod utilities;

pub use html::HtmlParser;
#[cfg(feature = "html")]
pub use html::{parse_html, ScraperParser};
pub use node::{Dom, Element, NodeData, NodeId, NodeRef, NodeType};
pub use rules::{Filter, Replacement, ReplacementFn, Rule, Rules};
pub use service::{Options, ToMarkdownService};
pub use tree::{bfs_order, remove_blank_nodes};
pub use utilities::*;

/// Error type for conversion
#[derive(Debug, thiserror::Error)]
pub enum ToMarkdownError {
    /// The input was not an HTML string
    #[error("invalid input type: {0}")]
    InvalidInputType(String),

    /// A rule could not be built
    #[error("invalid rule: {0}")]
    InvalidRule(String),
}

pub type Result<T> = std::result::Result<T, ToMarkdownError>;

/// Convert an HTML fragment to Markdown with default options.
///
/// ```rust
/// assert_eq!(to_markdown::to_markdown("<p><b>Hello</b> you</p>").unwrap(), "**Hello** you");
/// ```
#[cfg(feature = "html")]
pub fn to_markdown(html: &str) -> Result<String> {
    ToMarkdownService::new().convert(html)
}
