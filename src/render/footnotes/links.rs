//! Post-render repair of footnote links inside the owned DOM.

use crate::model::{Dom, NodeId};
use crate::render::urls::{
    display_url, is_google_search, is_wikipedia, looks_like_url, wikipedia_canonical,
    wikipedia_display,
};
use crate::render::Heuristics;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

const SECTION_CLASSES: [&str; 3] = ["footnotes", "report-content-footnotes", "works-cited"];

const TEXT_FRAGMENT: &str = "#:~:text=";

static RE_GOOGLE_FRAGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(https?://(?:www\.)?google\.com/search\?[^)]*\)").unwrap()
});

static RE_MARKDOWN_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(((?:https?://|www\.)[^)\s]+)\)").unwrap());

/// What the link fixer found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// Reference or back links whose target id does not exist
    pub broken_links: usize,

    /// Google search links and fragments removed from footnote content
    pub removed_search_links: usize,

    /// Anchors whose href or text was rewritten
    pub rewritten_links: usize,
}

/// Check footnote link targets, normalize the footnote section classes and
/// tidy up the links inside each footnote.
pub fn fix_footnote_links(dom: &mut Dom, heuristics: &Heuristics) -> LinkReport {
    let mut report = LinkReport {
        broken_links: verify_targets(dom),
        ..LinkReport::default()
    };
    normalize_section_classes(dom);

    let root = dom.root();
    for content in dom.find_by_class(root, "footnote-content") {
        report.removed_search_links += strip_search_fragments(dom, content);
        convert_markdown_links(dom, content, heuristics);
        report.removed_search_links += remove_search_anchors(dom, content);
        report.rewritten_links += rewrite_wikipedia_anchors(dom, content);
        report.rewritten_links += shorten_url_anchors(dom, content, heuristics);
    }

    if report.broken_links > 0 {
        log::warn!("{} footnote links point at missing targets", report.broken_links);
    }
    report
}

fn verify_targets(dom: &Dom) -> usize {
    let root = dom.root();
    let ids: HashSet<&str> = dom
        .descendants(root)
        .into_iter()
        .filter_map(|n| dom.attr(n, "id"))
        .collect();

    let mut links: Vec<NodeId> = Vec::new();
    for reference in dom.find_by_class(root, "footnote-ref") {
        links.extend(
            dom.find_all(reference, "a")
                .into_iter()
                .filter(|&a| dom.attr(a, "href").is_some_and(|h| h.starts_with("#fn-"))),
        );
    }
    links.extend(dom.find_by_class(root, "footnote-backref"));

    let mut broken = 0;
    for link in links {
        let Some(target) = dom.attr(link, "href").and_then(|h| h.strip_prefix('#')) else {
            continue;
        };
        if !ids.contains(target) {
            log::warn!("Footnote link #{} has no target", target);
            broken += 1;
        }
    }
    broken
}

fn normalize_section_classes(dom: &mut Dom) {
    let root = dom.root();
    let section = dom
        .descendants(root)
        .into_iter()
        .find(|&n| SECTION_CLASSES.iter().any(|c| dom.has_class(n, c)))
        .or_else(|| {
            dom.find_all(root, "ol")
                .into_iter()
                .filter(|&ol| {
                    dom.element_children(ol).iter().any(|&li| {
                        dom.is_tag(li, "li")
                            && dom.attr(li, "id").is_some_and(|id| id.starts_with("fn-"))
                    })
                })
                .find_map(|ol| dom.parent(ol).filter(|&p| dom.is_tag(p, "div")))
        });

    if let Some(section) = section {
        for class in SECTION_CLASSES {
            dom.add_class(section, class);
        }
    }
}

fn strip_search_fragments(dom: &mut Dom, content: NodeId) -> usize {
    let mut removed = 0;
    for node in dom.descendants(content) {
        let Some(text) = dom.text_mut(node) else {
            continue;
        };
        let count = RE_GOOGLE_FRAGMENT.find_iter(text).count();
        if count > 0 {
            *text = RE_GOOGLE_FRAGMENT.replace_all(text, "").into_owned();
            removed += count;
        }
    }
    removed
}

/// Turn literal `[text](url)` in text nodes into anchors.
fn convert_markdown_links(dom: &mut Dom, content: NodeId, heuristics: &Heuristics) {
    let text_nodes: Vec<NodeId> = dom
        .descendants(content)
        .into_iter()
        .filter(|&n| dom.text(n).is_some_and(|t| RE_MARKDOWN_LINK.is_match(t)))
        .collect();

    for node in text_nodes {
        let Some(text) = dom.text(node).map(str::to_string) else {
            continue;
        };
        let mut last = 0;
        for caps in RE_MARKDOWN_LINK.captures_iter(&text) {
            let (Some(whole), Some(label), Some(url)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            if whole.start() > last {
                let before = dom.create_text(&text[last..whole.start()]);
                dom.insert_before(node, before);
            }

            let href = if url.as_str().starts_with("www.") {
                format!("https://{}", url.as_str())
            } else {
                url.as_str().to_string()
            };
            let anchor = dom.create_element("a");
            dom.set_attr(anchor, "href", href);
            dom.set_attr(anchor, "target", "_blank");
            let label = label.as_str();
            if label == url.as_str() {
                dom.add_class(anchor, "url-only-link");
                let shown = dom.create_text(display_url(label, heuristics));
                dom.append(anchor, shown);
            } else {
                let shown = dom.create_text(label);
                dom.append(anchor, shown);
            }
            dom.insert_before(node, anchor);
            last = whole.end();
        }
        if let Some(slot) = dom.text_mut(node) {
            *slot = text[last..].to_string();
        }
    }
}

fn remove_search_anchors(dom: &mut Dom, content: NodeId) -> usize {
    let anchors: Vec<NodeId> = dom
        .find_all(content, "a")
        .into_iter()
        .filter(|&a| dom.attr(a, "href").is_some_and(is_google_search))
        .collect();
    for &anchor in &anchors {
        strip_wrapping_parens(dom, anchor);
        dom.detach(anchor);
    }
    anchors.len()
}

/// Drop the `(` and `)` text directly around an anchor about to be removed.
fn strip_wrapping_parens(dom: &mut Dom, anchor: NodeId) {
    let Some(parent) = dom.parent(anchor) else {
        return;
    };
    let siblings = dom.children(parent);
    let Some(index) = siblings.iter().position(|&c| c == anchor) else {
        return;
    };
    let before = index.checked_sub(1).and_then(|i| siblings.get(i)).copied();
    let after = siblings.get(index + 1).copied();
    let (Some(before), Some(after)) = (before, after) else {
        return;
    };

    let opens = dom.text(before).is_some_and(|t| t.trim_end().ends_with('('));
    let closes = dom.text(after).is_some_and(|t| t.trim_start().starts_with(')'));
    if !(opens && closes) {
        return;
    }
    if let Some(text) = dom.text_mut(before) {
        let kept = text.trim_end();
        *text = kept[..kept.len() - 1].trim_end().to_string();
    }
    if let Some(text) = dom.text_mut(after) {
        let kept = text.trim_start();
        *text = kept[1..].to_string();
    }
}

fn rewrite_wikipedia_anchors(dom: &mut Dom, content: NodeId) -> usize {
    let mut rewritten = 0;
    for anchor in dom.find_all(content, "a") {
        let Some(href) = dom.attr(anchor, "href").map(str::to_string) else {
            continue;
        };
        if !is_wikipedia(&href) {
            continue;
        }
        let canonical =
            wikipedia_canonical(&href).unwrap_or_else(|| "https://en.wikipedia.org".to_string());
        dom.set_attr(anchor, "href", canonical);
        dom.set_text_content(anchor, wikipedia_display(&href));
        dom.add_class(anchor, "url-only-link");
        rewritten += 1;
    }
    rewritten
}

fn shorten_url_anchors(dom: &mut Dom, content: NodeId, heuristics: &Heuristics) -> usize {
    let mut rewritten = 0;
    for anchor in dom.find_all(content, "a") {
        let href = dom.attr(anchor, "href").unwrap_or_default().to_string();
        let text = dom.text_content(anchor);

        let source = if href.contains(TEXT_FRAGMENT) {
            href.as_str()
        } else if looks_like_url(&text) {
            text.trim()
        } else {
            continue;
        };
        let url = source.split(TEXT_FRAGMENT).next().unwrap_or(source);
        let shown = display_url(url, heuristics);
        if shown != text {
            dom.set_text_content(anchor, shown);
            rewritten += 1;
        }
        dom.add_class(anchor, "url-only-link");
    }
    rewritten
}
