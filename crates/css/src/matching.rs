use crate::syntax::{AttributeSelector, Selector, TypeSelector};
use html::Node;
use html::traverse::for_each_element;

// Attributes whose enumerated values HTML compares case-insensitively.
const CASE_INSENSITIVE_VALUES: &[&str] = &["type", "rel"];

fn get_attribute<'a>(attributes: &'a [(String, Option<String>)], key: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.as_deref().unwrap_or(""))
}

fn matches_type(name: &str, selector: &TypeSelector) -> bool {
    match selector {
        TypeSelector::Universal => true,
        TypeSelector::Type(t) => name.eq_ignore_ascii_case(t),
    }
}

fn matches_attribute(attributes: &[(String, Option<String>)], selector: &AttributeSelector) -> bool {
    let Some(actual) = get_attribute(attributes, &selector.name) else {
        return false;
    };
    match &selector.value {
        None => true,
        Some(want) if CASE_INSENSITIVE_VALUES.contains(&selector.name.as_str()) => {
            actual.eq_ignore_ascii_case(want)
        }
        Some(want) => actual == want,
    }
}

/// Check if an element matches a compound selector. Non-element nodes never match.
pub fn matches_selector(node: &Node, selector: &Selector) -> bool {
    let Node::Element {
        name, attributes, ..
    } = node
    else {
        return false;
    };
    matches_type(name, &selector.element)
        && selector.negations.iter().all(|neg| !matches_type(name, neg))
        && selector
            .attributes
            .iter()
            .all(|attr| matches_attribute(attributes, attr))
}

/// Number of elements under `root` matching `selector`, like `querySelectorAll(..).length`.
pub fn query_count(root: &Node, selector: &Selector) -> usize {
    let mut n = 0;
    for_each_element(root, |el| {
        if matches_selector(el, selector) {
            n += 1;
        }
    });
    n
}

/// All matching elements in document order.
pub fn query_all<'a>(root: &'a Node, selector: &Selector) -> Vec<&'a Node> {
    let mut out = Vec::new();
    for_each_element(root, |el| {
        if matches_selector(el, selector) {
            out.push(el);
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_selector;
    use html::parse_document;

    fn count(doc: &str, sel: &str) -> usize {
        let dom = parse_document(doc);
        query_count(&dom, &parse_selector(sel).expect("valid selector"))
    }

    #[test]
    fn type_and_universal() {
        let doc = "<canvas></canvas><div><canvas></canvas></div><p hidden></p>";
        assert_eq!(count(doc, "canvas"), 2);
        assert_eq!(count(doc, "*"), 4);
        assert_eq!(count(doc, "*[hidden]"), 1);
    }

    #[test]
    fn attribute_value_equality() {
        let doc = r#"<input type="EMAIL"><input type="email"><input type="text"><link rel="shortcut icon">"#;
        assert_eq!(count(doc, "input[type=email]"), 2);
        assert_eq!(count(doc, "link[rel=icon]"), 0);
        assert_eq!(count(doc, "input[type]"), 3);
    }

    #[test]
    fn bare_attribute_matches_presence() {
        assert_eq!(count("<script async src=x></script>", "script[async]"), 1);
    }

    #[test]
    fn negations_exclude_listed_types() {
        let doc = r#"<body onscroll="f()"><div onscroll="g()"></div><frameset onscroll=""></frameset></body>"#;
        assert_eq!(count(doc, ":not(body):not(frameset)[onscroll]"), 1);
        assert_eq!(count(doc, "body[onscroll]"), 1);
    }

    #[test]
    fn query_all_keeps_document_order() {
        let dom = parse_document("<video id=a></video><p><video id=b></video></p>");
        let sel = parse_selector("video").expect("valid selector");
        let ids: Vec<_> = query_all(&dom, &sel)
            .into_iter()
            .filter_map(|n| n.attr("id"))
            .collect();
        assert_eq!(ids, ["a", "b"]);
    }
}
