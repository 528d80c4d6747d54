//! Allow-list HTML sanitizer.
//!
//! The rendered HTML is parsed into the owned [`Dom`], walked once, and
//! serialized again. Three things happen during the walk:
//!
//! 1. **Element removal**: elements named by the policy (`script`, `iframe`, ...)
//!    are dropped together with their subtree, as are comments.
//! 2. **Attribute filtering**: only allow-listed attributes survive, and `on*`
//!    event handlers never do.
//! 3. **URL filtering**: `href`/`src` values using a blocked scheme are removed.
//!
//! html5ever never resolves external entities, so entity-based attacks are not
//! a concern here.

use super::html::parse_html;
use super::{panic_message, HtmlSanitizer, SanitizePolicy};
use crate::error::{Error, Result};
use crate::model::{Dom, NodeData, NodeId};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// What happens to one element during sanitizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeAction {
    /// Keep the element as-is
    Allow,
    /// Remove the element and all its children
    Remove,
    /// Keep the element but drop some attributes
    StripAttributes,
}

/// Counters of one sanitizing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeSummary {
    /// Elements and comments removed with their subtree
    pub removed_nodes: usize,
    /// Attributes dropped
    pub removed_attributes: usize,
}

/// [`HtmlSanitizer`] driven by a [`SanitizePolicy`] allow-list.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowListSanitizer;

impl AllowListSanitizer {
    /// Create a new sanitizer.
    pub fn new() -> Self {
        Self
    }

    /// Decide what to do with an element.
    pub fn action(&self, dom: &Dom, id: NodeId, policy: &SanitizePolicy) -> SanitizeAction {
        let Some(element) = dom.element(id) else {
            return SanitizeAction::Allow;
        };
        if policy.removes_element(&element.tag) {
            return SanitizeAction::Remove;
        }
        let strip = element
            .attrs
            .iter()
            .any(|(name, value)| !keeps_attribute(name, value, policy));
        if strip {
            SanitizeAction::StripAttributes
        } else {
            SanitizeAction::Allow
        }
    }

    /// Sanitize a tree in place.
    pub fn sanitize_dom(&self, dom: &mut Dom, policy: &SanitizePolicy) -> SanitizeSummary {
        let mut summary = SanitizeSummary::default();
        let mut stack: Vec<_> = dom.children(dom.root()).iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            if matches!(dom.data(id), NodeData::Comment(_)) {
                dom.detach(id);
                summary.removed_nodes += 1;
                continue;
            }
            match self.action(dom, id, policy) {
                SanitizeAction::Remove => {
                    log::debug!("Sanitizer removed <{}>", dom.tag(id).unwrap_or_default());
                    dom.detach(id);
                    summary.removed_nodes += 1;
                    continue;
                }
                SanitizeAction::StripAttributes => {
                    if let Some(element) = dom.element_mut(id) {
                        let before = element.attrs.len();
                        element
                            .attrs
                            .retain(|(name, value)| keeps_attribute(name, value, policy));
                        summary.removed_attributes += before - element.attrs.len();
                    }
                }
                SanitizeAction::Allow => {}
            }
            stack.extend(dom.children(id).iter().rev().copied());
        }
        summary
    }
}

impl HtmlSanitizer for AllowListSanitizer {
    fn name(&self) -> &str {
        "allow-list"
    }

    fn sanitize(&self, html: &str, policy: &SanitizePolicy) -> Result<String> {
        catch_unwind(AssertUnwindSafe(|| {
            let mut dom = parse_html(html);
            let summary = self.sanitize_dom(&mut dom, policy);
            if summary != SanitizeSummary::default() {
                log::debug!(
                    "Sanitizer dropped {} nodes and {} attributes",
                    summary.removed_nodes,
                    summary.removed_attributes
                );
            }
            dom.to_html()
        }))
        .map_err(|payload| Error::Sanitize(panic_message(payload.as_ref())))
    }
}

fn keeps_attribute(name: &str, value: &str, policy: &SanitizePolicy) -> bool {
    let name = name.to_ascii_lowercase();
    if name.starts_with("on") || !policy.allows_attribute(&name) {
        return false;
    }
    if matches!(name.as_str(), "href" | "src") && policy.is_blocked_url(value) {
        return false;
    }
    true
}
