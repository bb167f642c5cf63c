//! Built-in rules for HTML to Markdown conversion.
//!
//! Every replacement receives content that has already been converted, since
//! elements are rewritten children first.

use super::{Filter, Rule};
use crate::utilities::{clean_attribute, collapse_newlines, repeat};

/// Create all standard rules, in lookup order
pub fn standard_rules() -> Vec<Rule> {
    vec![
        paragraph_rule(),
        line_break_rule(),
        heading_rule(),
        horizontal_rule(),
        emphasis_rule(),
        strong_rule(),
        code_rule(),
        link_rule(),
        image_rule(),
        code_block_rule(),
        blockquote_rule(),
        list_item_rule(),
        list_rule(),
    ]
}

fn paragraph_rule() -> Rule {
    Rule::for_tag("p", |content, _, _| format!("\n{}\n\n", content))
}

fn line_break_rule() -> Rule {
    Rule::constant(Filter::tag("br"), "  \n")
}

fn heading_rule() -> Rule {
    Rule::for_tags(&["h1", "h2", "h3", "h4", "h5", "h6"], |content, node, _| {
        let level: usize = node.tag_name()[1..].parse().unwrap_or(1);
        format!("\n{} {}\n\n", repeat("#", level), content)
    })
}

fn horizontal_rule() -> Rule {
    Rule::constant(Filter::tag("hr"), "\n* * *\n\n")
}

fn emphasis_rule() -> Rule {
    Rule::for_tags(&["em", "i"], |content, _, options| {
        let delimiter = &options.em_delimiter;
        format!("{}{}{}", delimiter, content, delimiter)
    })
}

fn strong_rule() -> Rule {
    Rule::for_tags(&["strong", "b"], |content, _, options| {
        let delimiter = &options.strong_delimiter;
        format!("{}{}{}", delimiter, content, delimiter)
    })
}

fn code_rule() -> Rule {
    Rule::for_tag("code", |content, _, _| format!("`{}`", content))
}

fn link_rule() -> Rule {
    Rule::for_tag("a", |content, node, _| {
        let href = node.attr("href").filter(|href| !href.is_empty());
        let Some(href) = href else {
            // No destination: leave the anchor as markup
            return node.outer_html();
        };

        let title = clean_attribute(node.attr("title"));
        if title.is_empty() {
            format!("[{}]({})", content, href)
        } else {
            format!("[{}]({} \"{}\")", content, href, title)
        }
    })
}

fn image_rule() -> Rule {
    Rule::for_tag("img", |_, node, _| {
        let src = clean_attribute(node.attr("src"));
        if src.is_empty() {
            return node.outer_html();
        }

        let alt = clean_attribute(node.attr("alt"));
        let title = clean_attribute(node.attr("title"));
        if title.is_empty() {
            format!("![{}]({})", alt, src)
        } else {
            format!("![{}]({} \"{}\")", alt, src, title)
        }
    })
}

fn code_block_rule() -> Rule {
    Rule::for_tag("pre", |content, _, _| {
        // Only blocks whose content was converted from <code> look like code.
        if !content.trim_start().starts_with('`') {
            return String::new();
        }
        let code = content.replace('`', "");
        format!("    {}", code.replace('\n', "\n    "))
    })
}

fn blockquote_rule() -> Rule {
    Rule::for_tag("blockquote", |content, _, _| {
        let content = collapse_newlines(content.trim());
        format!("\n{}\n\n", quote_lines(&content))
    })
}

/// Prefix every line with `> `. CR, LS and PS start a new line as well as LF.
fn quote_lines(content: &str) -> String {
    let mut quoted = String::with_capacity(content.len() + 8);
    quoted.push_str("> ");
    for c in content.chars() {
        quoted.push(c);
        if matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}') {
            quoted.push_str("> ");
        }
    }
    quoted
}

fn list_item_rule() -> Rule {
    Rule::for_tag("li", |content, node, options| {
        let content = content.trim_start().replace('\n', "\n    ");

        let prefix = if node.parent_tag() == Some("ol") {
            let position = node.index_in_parent().unwrap_or_default() + 1;
            format!("{}.  ", position)
        } else {
            format!("{}   ", options.bullet_list_marker)
        };

        format!("{}{}", prefix, content)
    })
}

fn list_rule() -> Rule {
    Rule::for_tags(&["ul", "ol"], |_, node, _| {
        // By now every <li> child has been replaced by a text node.
        let items: Vec<&str> = node.children().filter_map(|child| child.text()).collect();
        let block = items.join("\n");

        if node.parent_tag() == Some("li") {
            format!("\n{}", block)
        } else {
            format!("\n{}\n\n", block)
        }
    })
}
