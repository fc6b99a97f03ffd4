//! Namespace stripping for raw XML text.
//!
//! Removing namespaces before parsing lets schemas use plain element names
//! in their path expressions. Schemas never call this themselves; apply it
//! to the text before handing it to [`crate::Schema::load`].

use regex::Regex;
use std::sync::LazyLock;

// Static regexes for namespace removal - all patterns are guaranteed to be valid
#[allow(clippy::expect_used)]
/// Namespace declarations: ` xmlns="..."` and ` xmlns:prefix='...'`.
static NS_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+xmlns(?::[\w.-]*)?\s*=\s*(?:"[^"]*"|'[^']*')"#).expect("valid regex")
});

#[allow(clippy::expect_used)]
/// Prefixes in opening tags: `<soap:Envelope`.
static NS_OPEN_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(?:[A-Za-z_][\w.-]*:)+").expect("valid regex"));

#[allow(clippy::expect_used)]
/// Prefixes in closing tags: `</soap:Envelope`.
static NS_CLOSE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</(?:[A-Za-z_][\w.-]*:)+").expect("valid regex"));

#[allow(clippy::expect_used)]
/// Prefixes on attribute names: ` xsi:type="..."`.
static NS_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\s)[A-Za-z_][\w.-]*:([A-Za-z_][\w.-]*\s*=)").expect("valid regex")
});

/// Remove namespace declarations and prefixes from XML text.
///
/// Prefixes are dropped from element names and attribute names, so the
/// result parses without any namespace declarations.
///
/// The transform is idempotent and leaves text content and ordinary
/// attributes untouched.
///
/// # Examples
/// ```
/// use treeschema::normalize::remove_namespaces;
///
/// let xml = r#"<ns:root xmlns:ns="urn:x"><ns:item>1</ns:item></ns:root>"#;
/// assert_eq!(remove_namespaces(xml), "<root><item>1</item></root>");
/// ```
pub fn remove_namespaces(xml: &str) -> String {
    let stripped = NS_DECLARATION.replace_all(xml, "");
    let stripped = NS_CLOSE_TAG.replace_all(&stripped, "</");
    let stripped = NS_OPEN_TAG.replace_all(&stripped, "<");
    NS_ATTRIBUTE.replace_all(&stripped, "$1$2").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_removes_default_namespace() {
        let xml = r#"<root xmlns="http://example.com"><a>1</a></root>"#;
        assert_eq!(remove_namespaces(xml), "<root><a>1</a></root>");
    }

    #[test]
    fn test_removes_prefixed_tags() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body><m:Result xmlns:m='urn:m'>ok</m:Result></soap:Body>
</soap:Envelope>"#;
        let expected = "<Envelope>
  <Body><Result>ok</Result></Body>
</Envelope>";
        assert_eq!(remove_namespaces(xml), expected);
    }

    #[test]
    fn test_keeps_other_content() {
        let xml = r#"<a href="http://host:80/x">see http://host:80/y</a>"#;
        assert_eq!(remove_namespaces(xml), xml);
    }

    #[test]
    fn test_declaration_is_case_insensitive() {
        let xml = r#"<a XMLNS:b="urn:b" id="1"/>"#;
        assert_eq!(remove_namespaces(xml), r#"<a id="1"/>"#);
    }

    #[test]
    fn test_idempotent() {
        let xml = r#"<x:a xmlns:x="urn:x"><x:y:b/></x:a>"#;
        let once = remove_namespaces(xml);
        assert_eq!(remove_namespaces(&once), once);
        assert_eq!(once, "<a><b/></a>");
    }

    #[test]
    fn test_removes_attribute_prefixes() {
        let xml = r#"<root xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><v xsi:type="int" id="1">1</v></root>"#;
        let once = remove_namespaces(xml);
        assert_eq!(once, r#"<root><v type="int" id="1">1</v></root>"#);
        assert_eq!(remove_namespaces(&once), once);

        let doc = roxmltree::Document::parse(&once).unwrap();
        let v = doc.root_element().first_element_child().unwrap();
        assert_eq!(v.attribute("type"), Some("int"));
    }

    #[test]
    fn test_normalized_text_parses() {
        let xml = r#"<r:root xmlns:r="urn:r"><r:v>3</r:v></r:root>"#;
        let normalized = remove_namespaces(xml);
        let doc = roxmltree::Document::parse(&normalized).unwrap();
        assert_eq!(doc.root_element().tag_name().name(), "root");
    }
}
