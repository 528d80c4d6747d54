//! Post-render clean-up of summary bullets and stray bullet glyphs.

use super::Heuristics;
use crate::model::{Dom, NodeId};

/// Counts from one clean-up run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryReport {
    /// Executive-summary paragraphs turned into list items
    pub converted_paragraphs: usize,

    /// Paragraphs marked `bullet-text-item`
    pub bullet_paragraphs: usize,

    /// Leading glyphs and glyph spans removed from list items
    pub removed_glyphs: usize,
}

/// Run the executive summary pass, the paragraph classes and bullet clean-up.
pub fn clean_document(dom: &mut Dom, heuristics: &Heuristics) -> SummaryReport {
    let converted_paragraphs = format_executive_summary(dom, heuristics);
    let bullet_paragraphs = mark_bullet_paragraphs(dom, heuristics);
    let removed_glyphs = cleanup_bullets(dom, heuristics);
    SummaryReport {
        converted_paragraphs,
        bullet_paragraphs,
        removed_glyphs,
    }
}

/// Turn keyword paragraphs under the executive summary `h2` into list items.
pub fn format_executive_summary(dom: &mut Dom, heuristics: &Heuristics) -> usize {
    let phrase = heuristics.summary_heading.to_lowercase();
    let root = dom.root();
    let Some(heading) = dom
        .find_all(root, "h2")
        .into_iter()
        .find(|&h| dom.text_content(h).to_lowercase().contains(&phrase))
    else {
        return 0;
    };

    let mut converted = 0;
    let mut sibling = dom.next_element_sibling(heading);
    while let Some(current) = sibling {
        if dom.is_tag(current, "h2") {
            break;
        }
        let next = dom.next_element_sibling(current);

        if dom.is_tag(current, "ul") {
            style_list(dom, current);
            for li in dom.find_all(current, "li") {
                strip_first_text_glyphs(dom, li, heuristics);
            }
        } else if dom.is_tag(current, "p") {
            let text = dom.text_content(current);
            if starts_with_keyword(strip_glyphs(&text, heuristics).trim_start(), heuristics) {
                paragraph_to_item(dom, current, heuristics);
                converted += 1;
            }
        }
        sibling = next;
    }
    if converted > 0 {
        log::debug!("Converted {} executive summary paragraphs to bullets", converted);
    }
    converted
}

fn paragraph_to_item(dom: &mut Dom, paragraph: NodeId, heuristics: &Heuristics) {
    strip_first_text_glyphs(dom, paragraph, heuristics);
    let item = dom.create_element("li");
    dom.move_children(paragraph, item);

    let list = match dom.previous_element_sibling(paragraph) {
        Some(previous) if dom.is_tag(previous, "ul") => previous,
        _ => {
            let list = dom.create_element("ul");
            style_list(dom, list);
            dom.insert_before(paragraph, list);
            list
        }
    };
    dom.append(list, item);
    dom.detach(paragraph);
}

fn style_list(dom: &mut Dom, list: NodeId) {
    dom.set_style(list, "list-style-type", "disc");
    dom.set_style(list, "padding-left", "1.5em");
    dom.set_style(list, "margin-top", "1em");
}

/// Mark keyword paragraphs and the paragraph right before them, and tag
/// table cells holding lists.
pub fn mark_bullet_paragraphs(dom: &mut Dom, heuristics: &Heuristics) -> usize {
    let root = dom.root();
    let paragraphs = dom.find_all(root, "p");
    let mut marked = 0;
    for (index, &paragraph) in paragraphs.iter().enumerate() {
        let text = dom.text_content(paragraph);
        let text = text.trim();
        let bare = match text.chars().next() {
            Some(c) if heuristics.is_bullet(c) => text[c.len_utf8()..].strip_prefix(' '),
            _ => Some(text),
        };
        if !bare.is_some_and(|t| starts_with_keyword(t, heuristics)) {
            continue;
        }
        dom.add_class(paragraph, "bullet-text-item");
        if index > 0 {
            dom.add_class(paragraphs[index - 1], "bullet-text-parent");
        }
        marked += 1;
    }

    for cell in dom.find_all(root, "td") {
        if dom.has_descendant_tag(cell, "ul") || dom.has_descendant_tag(cell, "ol") {
            dom.add_class(cell, "list-cell");
        }
    }
    marked
}

/// Remove doubled bullet glyphs from list items. Running it twice changes
/// nothing the second time.
pub fn cleanup_bullets(dom: &mut Dom, heuristics: &Heuristics) -> usize {
    let root = dom.root();
    let mut removed = 0;
    for li in dom.find_all(root, "li") {
        if strip_first_text_glyphs(dom, li, heuristics) {
            removed += 1;
        }
        for span in dom.find_all(li, "span") {
            let text = dom.text_content(span);
            let text = text.trim();
            if !text.is_empty() && text.chars().all(|c| heuristics.is_bullet(c)) {
                dom.detach(span);
                removed += 1;
            }
        }
    }

    for node in dom.find_by_class(root, "bullet-text-item") {
        let in_list = dom.is_tag(node, "li") || dom.parent(node).is_some_and(|p| dom.is_tag(p, "li"));
        if in_list {
            dom.remove_class(node, "bullet-text-item");
            dom.remove_class(node, "bullet-text-parent");
        }
    }
    removed
}

fn starts_with_keyword(text: &str, heuristics: &Heuristics) -> bool {
    heuristics
        .summary_keywords
        .iter()
        .any(|k| !k.is_empty() && text.starts_with(k.as_str()))
}

/// Strip leading `glyph + whitespace` runs, keeping the leading whitespace.
fn strip_glyphs<'a>(text: &'a str, heuristics: &Heuristics) -> std::borrow::Cow<'a, str> {
    let indent_len = text.len() - text.trim_start().len();
    let (indent, mut rest) = text.split_at(indent_len);
    let mut stripped = false;
    loop {
        let mut chars = rest.chars();
        let Some(glyph) = chars.next() else {
            break;
        };
        let after = chars.as_str();
        if !heuristics.is_bullet(glyph) || !after.starts_with(char::is_whitespace) {
            break;
        }
        rest = after.trim_start();
        stripped = true;
    }
    if stripped {
        format!("{}{}", indent, rest).into()
    } else {
        text.into()
    }
}

fn strip_first_text_glyphs(dom: &mut Dom, scope: NodeId, heuristics: &Heuristics) -> bool {
    let Some(node) = dom.first_text_descendant(scope) else {
        return false;
    };
    let Some(text) = dom.text(node) else {
        return false;
    };
    let cleaned = strip_glyphs(text, heuristics).into_owned();
    if cleaned == text {
        return false;
    }
    if let Some(slot) = dom.text_mut(node) {
        *slot = cleaned;
    }
    true
}
