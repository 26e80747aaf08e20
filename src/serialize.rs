//! Text extraction and markup output, shared by both document flavors.

use crate::tree::{Children, NodeKind, TreeNode};

/// Elements that never have content in HTML.
const VOID_ELEMENTS: [&str; 7] = ["area", "hr", "img", "meta", "source", "br", "input"];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// The concatenated data of every text node under `node`, in document order.
///
/// Comments are skipped. A text or comment node returns its own data as is.
/// Whether the aggregate is trimmed depends on the flavor, see
/// [`TreeNode::TRIM_INNER_TEXT`].
pub fn inner_text<N: TreeNode>(node: &N) -> String {
    match node.kind() {
        NodeKind::Text | NodeKind::Comment => node.data().to_string(),
        _ => {
            let mut out = String::new();
            collect_text(node, &mut out);
            if N::TRIM_INNER_TEXT {
                out.trim().to_string()
            } else {
                out
            }
        }
    }
}

fn collect_text<N: TreeNode>(node: &N, out: &mut String) {
    for child in Children::new(node) {
        match child.kind() {
            NodeKind::Text => out.push_str(child.data()),
            NodeKind::Comment => {}
            _ => collect_text(&child, out),
        }
    }
}

/// Serializes `node` and its subtree back to markup.
///
/// Text and comments are written as trimmed raw data, without comment
/// delimiters. A document writes its children.
pub fn output_markup<N: TreeNode>(node: &N) -> String {
    let mut out = String::new();
    write_markup(node, &mut out);
    out
}

fn write_markup<N: TreeNode>(node: &N, out: &mut String) {
    match node.kind() {
        NodeKind::Text | NodeKind::Comment => out.push_str(node.data().trim()),
        NodeKind::Document => {
            for child in Children::new(node) {
                write_markup(&child, out);
            }
        }
        NodeKind::Declaration => {
            out.push_str("<?xml");
            write_attributes(node, out);
            out.push_str("?>");
        }
        NodeKind::Doctype => {
            out.push_str("<!DOCTYPE ");
            out.push_str(node.data());
            out.push('>');
        }
        NodeKind::Element => {
            let name = qualified_name(node);
            out.push('<');
            out.push_str(&name);
            write_attributes(node, out);
            if N::SELF_CLOSE_VOID_ELEMENTS && is_void_element(node.data()) {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for child in Children::new(node) {
                write_markup(&child, out);
            }
            out.push_str("</");
            out.push_str(&name);
            out.push('>');
        }
    }
}

fn qualified_name<N: TreeNode>(node: &N) -> String {
    if node.prefix().is_empty() {
        node.data().to_string()
    } else {
        format!("{}:{}", node.prefix(), node.data())
    }
}

fn write_attributes<N: TreeNode>(node: &N, out: &mut String) {
    for attr in node.attributes() {
        out.push(' ');
        out.push_str(&attr.qualified_name());
        out.push_str("=\"");
        out.push_str(&attr.value.replace('"', "&quot;"));
        out.push('"');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::HtmlDocument;
    use crate::xml::XmlDocument;

    #[test]
    fn test_void_elements() {
        assert!(is_void_element("br"));
        assert!(is_void_element("img"));
        assert!(!is_void_element("div"));
        assert!(!is_void_element("link"));
    }

    #[test]
    fn test_img_serializes_per_flavor() {
        let html = HtmlDocument::parse(r#"<img src="a.jpg">"#).unwrap();
        let img = html.root().select_element("//img").unwrap().unwrap();
        assert_eq!(output_markup(&img), r#"<img src="a.jpg"/>"#);

        let xml = XmlDocument::parse(r#"<?xml version="1.0"?><img src="a.jpg"/>"#).unwrap();
        let img = xml.root().select_element("//img").unwrap().unwrap();
        assert_eq!(output_markup(&img), r#"<img src="a.jpg"></img>"#);
    }

    #[test]
    fn test_inner_text_skips_comments() {
        let xml = XmlDocument::parse(r#"<?xml version="1.0"?><a> one <!-- no --><b>two</b> </a>"#)
            .unwrap();
        let a = xml.document_element().unwrap();
        assert_eq!(inner_text(&a), " one two ");

        let html = HtmlDocument::parse("<p> one <!-- no --><b>two</b> </p>").unwrap();
        let p = html.root().select_element("//p").unwrap().unwrap();
        assert_eq!(inner_text(&p), "one two");
    }

    #[test]
    fn test_html_trims_only_the_final_concatenation() {
        let html = HtmlDocument::parse("<div> <p>a </p><p> b</p> </div>").unwrap();
        let div = html.root().select_element("//div").unwrap().unwrap();
        assert_eq!(inner_text(&div), "a  b");
    }

    #[test]
    fn test_text_and_comment_nodes_are_verbatim() {
        let xml = XmlDocument::parse(r#"<?xml version="1.0"?><a>  padded  <!-- note --></a>"#)
            .unwrap();
        let a = xml.document_element().unwrap();
        let text = a.first_child().unwrap();
        let comment = a.last_child().unwrap();
        assert_eq!(inner_text(&text), "  padded  ");
        assert_eq!(inner_text(&comment), " note ");
        // Markup output trims both and drops the comment delimiters.
        assert_eq!(output_markup(&text), "padded");
        assert_eq!(output_markup(&a), "<a>paddednote</a>");
    }

    #[test]
    fn test_document_and_declaration_output() {
        let xml = XmlDocument::parse(r#"<?xml version="1.0" encoding="UTF-8"?><r a="1">x</r>"#)
            .unwrap();
        assert_eq!(
            output_markup(&xml.root()),
            r#"<?xml version="1.0" encoding="UTF-8"?><r a="1">x</r>"#
        );
    }

    #[test]
    fn test_attribute_quotes_are_escaped() {
        let xml = XmlDocument::parse(r#"<?xml version="1.0"?><r title='say "hi"'/>"#).unwrap();
        let r = xml.document_element().unwrap();
        assert_eq!(output_markup(&r), r#"<r title="say &quot;hi&quot;"></r>"#);
    }
}
