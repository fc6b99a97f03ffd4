//! XML utility functions for parsing documents and reading element data.

use indexmap::IndexMap;
use roxmltree::{Document, Node};

use crate::error::Result;

/// Parse XML text into a document.
///
/// # Errors
/// Returns `DecodeError::Parse` if the text is not well-formed XML.
///
/// # Examples
/// ```
/// use treeschema::xml::parse_document;
///
/// assert!(parse_document("<root/>").is_ok());
/// assert!(parse_document("<root>").is_err());
/// ```
pub fn parse_document(text: &str) -> Result<Document<'_>> {
    Ok(Document::parse(text)?)
}

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use treeschema::xml::get_tag_name;
///
/// let xml = r#"<root><CD>text</CD></root>"#;
/// let doc = Document::parse(xml).unwrap();
/// let cd = doc.root_element().first_element_child().unwrap();
/// assert_eq!(get_tag_name(cd), "CD");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Check if a node is an element with a specific tag name.
pub fn has_tag(node: Node<'_, '_>, tag: &str) -> bool {
    node.is_element() && get_tag_name(node) == tag
}

/// Get the leading text of an element.
///
/// This is the text before the first child element, untrimmed, or `None`
/// if the element starts with a child element or is empty.
pub fn get_text<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.text()
}

/// Get an attribute value from a node.
pub fn get_attribute<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute(name)
}

/// Get all attributes of a node in document order.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use treeschema::xml::attributes;
///
/// let doc = Document::parse(r#"<CD id="7" lang="en"/>"#).unwrap();
/// let attrs = attributes(doc.root_element());
/// assert_eq!(attrs.get("id"), Some(&"7"));
/// assert_eq!(attrs.keys().copied().collect::<Vec<_>>(), ["id", "lang"]);
/// ```
pub fn attributes<'a>(node: Node<'a, '_>) -> IndexMap<&'a str, &'a str> {
    node.attributes()
        .map(|attr| (attr.name(), attr.value()))
        .collect()
}

/// Get all element children of a node.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_error() {
        let err = parse_document("<a><b></a>").unwrap_err();
        assert!(matches!(err, crate::DecodeError::Parse(_)));
    }

    #[test]
    fn test_get_tag_name_with_namespace() {
        let xml = r#"<ns:root xmlns:ns="http://example.com"><ns:child/></ns:root>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_tag_name(doc.root_element()), "root");
    }

    #[test]
    fn test_has_tag() {
        let doc = Document::parse("<CD/>").unwrap();
        assert!(has_tag(doc.root_element(), "CD"));
        assert!(!has_tag(doc.root_element(), "DVD"));
        assert!(!has_tag(doc.root(), "CD"));
    }

    #[test]
    fn test_get_text_is_leading_text() {
        let doc = Document::parse("<a> lead <b/>tail</a>").unwrap();
        assert_eq!(get_text(doc.root_element()), Some(" lead "));

        let doc = Document::parse("<a><b/>tail</a>").unwrap();
        assert_eq!(get_text(doc.root_element()), None);

        let doc = Document::parse("<a/>").unwrap();
        assert_eq!(get_text(doc.root_element()), None);
    }

    #[test]
    fn test_get_attribute() {
        let doc = Document::parse(r#"<root attr="value"/>"#).unwrap();
        let root = doc.root_element();

        assert_eq!(get_attribute(root, "attr"), Some("value"));
        assert_eq!(get_attribute(root, "missing"), None);
    }

    #[test]
    fn test_element_children() {
        let doc = Document::parse("<root>text<child1/>more<child2/></root>").unwrap();
        let children: Vec<_> = element_children(doc.root_element()).collect();
        assert_eq!(children.len(), 2);
    }
}
