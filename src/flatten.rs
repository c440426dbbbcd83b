//! Flattening – reduces parsed description markup to an ordered list of
//! plain-text blocks for fixed-width layout.
//!
//! Lossy on purpose: only the text of the recognized tag set survives, and
//! the sole thing remembered about a block is whether it was a paragraph or
//! a list item, which decides the spacing after it. Flattening is total –
//! empty or unusable input gives an empty sequence, never an error.

use crate::markup::{parse_markup, ElementNode, MarkupNode, Tag};

/// Whether a text block came from a paragraph or a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    ListItem,
}

/// One plain-text block extracted from the description markup.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub kind: BlockKind,
    pub text: String,
}

/// Flatten description markup into ordered text blocks.
///
/// `<p>` and `<li>` each emit one block holding the concatenated visible
/// text of their whole subtree, trimmed; nested markup inside an emitting
/// block contributes text but never a second block. `<ul>`/`<ol>` are
/// walked into, `<b>`/`<i>` count only as text, and unrecognized elements
/// are dropped with everything under them.
pub fn flatten(markup: &str) -> Vec<TextBlock> {
    let nodes = parse_markup(markup);
    let mut blocks = Vec::new();
    collect_blocks(&nodes, &mut blocks);
    blocks
}

fn collect_blocks(nodes: &[MarkupNode], out: &mut Vec<TextBlock>) {
    for node in nodes {
        let MarkupNode::Element(elem) = node else {
            // Bare text outside any block has no home in the layout.
            continue;
        };
        match &elem.tag {
            Tag::P => out.push(block_of(BlockKind::Paragraph, elem)),
            Tag::Li => out.push(block_of(BlockKind::ListItem, elem)),
            Tag::Ul | Tag::Ol => collect_blocks(&elem.children, out),
            // Inline tags emit no block of their own; unknown subtrees
            // vanish wholesale.
            Tag::B | Tag::I | Tag::Unknown(_) => {}
        }
    }
}

fn block_of(kind: BlockKind, elem: &ElementNode) -> TextBlock {
    let mut text = String::new();
    push_visible_text(&elem.children, &mut text);
    TextBlock {
        kind,
        text: text.trim().to_string(),
    }
}

/// Concatenated visible text of a subtree. Unrecognized elements contribute
/// nothing, including their descendants.
fn push_visible_text(nodes: &[MarkupNode], out: &mut String) {
    for node in nodes {
        match node {
            MarkupNode::Text(t) => out.push_str(t),
            MarkupNode::Element(e) => {
                if !matches!(e.tag, Tag::Unknown(_)) {
                    push_visible_text(&e.children, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_blocks() {
        assert!(flatten("").is_empty());
    }

    #[test]
    fn unsupported_markup_yields_no_blocks() {
        assert!(flatten("<div>unsupported</div>").is_empty());
    }

    #[test]
    fn paragraph_then_list_item_in_order() {
        let blocks = flatten("<p>A</p><ul><li>B</li></ul>");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], TextBlock {
            kind: BlockKind::Paragraph,
            text: "A".to_string(),
        });
        assert_eq!(blocks[1], TextBlock {
            kind: BlockKind::ListItem,
            text: "B".to_string(),
        });
    }

    #[test]
    fn inline_formatting_keeps_text_only() {
        let blocks = flatten("<p>A <b>bold</b> and <i>italic</i> mix</p>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "A bold and italic mix");
    }

    #[test]
    fn item_consumes_nested_markup_without_double_emission() {
        let blocks = flatten("<ul><li>Top <ul><li>Nested</li></ul></li></ul>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::ListItem);
        assert_eq!(blocks[0].text, "Top Nested");
    }

    #[test]
    fn unknown_subtree_inside_block_is_dropped() {
        let blocks = flatten("<p>Keep <span>lose</span> this</p>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "Keep  this");
    }

    #[test]
    fn bare_inline_tags_emit_nothing() {
        assert!(flatten("<b>bold</b><i>italic</i>").is_empty());
    }

    #[test]
    fn ordered_and_unordered_items_both_emit() {
        let blocks = flatten("<ol><li>One</li></ol><ul><li>Two</li></ul>");
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.kind == BlockKind::ListItem));
    }

    #[test]
    fn empty_paragraph_still_emits_a_blank_block() {
        let blocks = flatten("<p></p>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "");
    }

    #[test]
    fn stray_text_between_blocks_is_ignored() {
        let blocks = flatten("loose<p>kept</p>loose");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "kept");
    }
}
