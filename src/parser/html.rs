//! HTML fragment parsing into the owned [`Dom`].

use crate::model::{Dom, Element, NodeData as DomData, NodeId};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Parse an HTML fragment with html5ever and copy the `<body>` content into
/// a [`Dom`].
///
/// Content the HTML parser moves into `<head>` (leading `<script>`, `<style>`,
/// `<meta>` and the like) is not part of the fragment and is dropped.
pub fn parse_html(html: &str) -> Dom {
    let rc = parse_document(RcDom::default(), Default::default()).one(html);

    let mut dom = Dom::new();
    if let Some(body) = find_element(&rc.document, "body") {
        copy_children(&body, &mut dom);
    }
    dom
}

fn find_element(root: &Handle, tag: &str) -> Option<Handle> {
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        if let NodeData::Element { ref name, .. } = node.data {
            if name.local.as_ref() == tag {
                return Some(node.clone());
            }
        }
        stack.extend(node.children.borrow().iter().rev().cloned());
    }
    None
}

fn copy_children(body: &Handle, dom: &mut Dom) {
    let root = dom.root();
    let mut stack: Vec<(Handle, NodeId)> = body
        .children
        .borrow()
        .iter()
        .rev()
        .map(|child| (child.clone(), root))
        .collect();

    while let Some((handle, parent)) = stack.pop() {
        let data = match handle.data {
            NodeData::Element {
                ref name,
                ref attrs,
                ..
            } => {
                let mut element = Element::new(name.local.as_ref());
                for attr in attrs.borrow().iter() {
                    element.set_attr(attr.name.local.as_ref(), attr.value.to_string());
                }
                DomData::Element(element)
            }
            NodeData::Text { ref contents } => DomData::Text(contents.borrow().to_string()),
            NodeData::Comment { ref contents } => DomData::Comment(contents.to_string()),
            _ => continue,
        };

        let is_element = matches!(data, DomData::Element(_));
        let id = dom.create(data);
        dom.append(parent, id);

        if is_element {
            let children = handle.children.borrow();
            stack.extend(children.iter().rev().map(|child| (child.clone(), id)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fragment() {
        let dom = parse_html("<p class=\"lead\">Hello <b>world</b></p><p>Two</p>");
        let paragraphs = dom.find_all(dom.root(), "p");
        assert_eq!(paragraphs.len(), 2);
        assert!(dom.has_class(paragraphs[0], "lead"));
        assert_eq!(dom.text_content(paragraphs[0]), "Hello world");
        assert_eq!(
            dom.to_html(),
            "<p class=\"lead\">Hello <b>world</b></p><p>Two</p>"
        );
    }

    #[test]
    fn test_table_gets_tbody() {
        let dom = parse_html("<table><tr><td>1</td></tr></table>");
        assert!(dom.find_first(dom.root(), "tbody").is_some());
    }

    #[test]
    fn test_entities_decoded() {
        let dom = parse_html("<p>a &amp; b</p>");
        let p = dom.find_first(dom.root(), "p").unwrap();
        assert_eq!(dom.text_content(p), "a & b");
    }

    #[test]
    fn test_empty_input() {
        let dom = parse_html("");
        assert!(dom.children(dom.root()).is_empty());
    }
}
