//! Utility functions and constants for HTML processing.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

/// Void (self-closing) HTML elements
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose text is kept byte-for-byte by the tree normalizer
pub const PREFORMATTED_ELEMENTS: &[&str] = &["pre", "code"];

static ORDERED_LIST_TRIGGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]+)\. ").unwrap());
static LEADING_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\t\r\n]+").unwrap());
static TRAILING_BLANK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\t\r\n\s]+$").unwrap());
static WHITESPACE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s+\n").unwrap());
static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Check if a tag is a void element
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Check if text inside this tag must keep its whitespace
pub fn is_preformatted(tag: &str) -> bool {
    PREFORMATTED_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// True when the string is empty or only whitespace
pub fn is_blank(s: &str) -> bool {
    s.chars().all(char::is_whitespace)
}

/// Repeat a string n times
pub fn repeat(s: &str, n: usize) -> String {
    s.repeat(n)
}

/// Escape `1. `-style text so it is not read back as an ordered list item.
///
/// ```
/// use to_markdown::escape_list_markers;
///
/// assert_eq!(escape_list_markers("1986. A great year"), "1986\\. A great year");
/// ```
pub fn escape_list_markers(input: &str) -> Cow<'_, str> {
    ORDERED_LIST_TRIGGER.replace_all(input, r"${1}\. ")
}

/// Collapse `\n{3,}` runs to a single blank line
pub fn collapse_newlines(input: &str) -> Cow<'_, str> {
    EXCESS_NEWLINES.replace_all(input, "\n\n")
}

/// Final cleanup of the serialized markdown.
///
/// Strips leading tab/CR/LF runs and all trailing whitespace, turns
/// whitespace-only lines into empty ones and keeps at most one blank line
/// between blocks.
pub fn tidy_output(output: &str) -> String {
    let output = LEADING_BLANK_LINES.replace(output, "");
    let output = TRAILING_BLANK.replace(&output, "");
    let output = WHITESPACE_LINE.replace_all(&output, "\n\n");
    collapse_newlines(&output).into_owned()
}

/// Clean an attribute value (treat missing as empty)
pub fn clean_attribute(value: Option<&str>) -> &str {
    value.unwrap_or_default()
}
