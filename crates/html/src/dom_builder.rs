use crate::traverse::assign_node_ids;
use crate::types::{Id, Node, Token};

/// Builds a document tree from a token stream and assigns node ids in
/// document order (the document itself is `Id(1)`).
///
/// End tags close the nearest open element with the same name; an end tag
/// with no matching open element is ignored. Elements still open at the end
/// of input are closed implicitly.
pub fn build_dom(tokens: &[Token]) -> Node {
    // open[0] is always the document; deeper entries are open elements.
    let mut open: Vec<Node> = vec![Node::Document {
        id: Id(0),
        doctype: None,
        children: Vec::new(),
    }];

    for token in tokens {
        match token {
            Token::Doctype(d) => {
                if let Some(Node::Document { doctype, .. }) = open.first_mut() {
                    doctype.get_or_insert_with(|| d.clone());
                }
            }
            Token::Comment(text) => append(
                &mut open,
                Node::Comment {
                    id: Id(0),
                    text: text.clone(),
                },
            ),
            Token::Text(text) => append(
                &mut open,
                Node::Text {
                    id: Id(0),
                    text: text.clone(),
                },
            ),
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let element = Node::Element {
                    id: Id(0),
                    name: name.clone(),
                    attributes: attributes.clone(),
                    children: Vec::new(),
                };
                if *self_closing {
                    append(&mut open, element);
                } else {
                    open.push(element);
                }
            }
            Token::EndTag(name) => {
                let Some(depth) = open
                    .iter()
                    .rposition(|n| n.local_name() == Some(name.as_str()))
                else {
                    continue;
                };
                while open.len() > depth {
                    close_top(&mut open);
                }
            }
        }
    }

    while open.len() > 1 {
        close_top(&mut open);
    }
    let mut root = open.pop().unwrap_or(Node::Document {
        id: Id(0),
        doctype: None,
        children: Vec::new(),
    });
    assign_node_ids(&mut root);
    root
}

fn append(open: &mut [Node], node: Node) {
    if let Some(children) = open.last_mut().and_then(Node::children_mut) {
        children.push(node);
    }
}

fn close_top(open: &mut Vec<Node>) {
    if open.len() <= 1 {
        return;
    }
    if let Some(node) = open.pop() {
        append(open, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize;

    #[test]
    fn build_dom_nests_and_closes_implicitly() {
        let dom = build_dom(&tokenize("<!DOCTYPE html><div><p>a<span>b</div><p>c"));
        let Node::Document {
            doctype, children, ..
        } = &dom
        else {
            panic!("root must be a document");
        };
        assert_eq!(doctype.as_ref().map(|d| d.name.as_str()), Some("html"));
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].local_name(), Some("div"));
        assert_eq!(children[0].children()[0].local_name(), Some("p"));
        assert_eq!(children[1].local_name(), Some("p"));
    }

    #[test]
    fn stray_end_tags_are_ignored() {
        let dom = build_dom(&tokenize("<div></span>x</div>"));
        let div = &dom.children()[0];
        assert!(matches!(&div.children()[0], Node::Text { text, .. } if text == "x"));
    }

    #[test]
    fn build_dom_stress_deep_nesting() {
        let depth = 10_000;
        let input = "<div>".repeat(depth) + &"</div>".repeat(depth);
        let dom = build_dom(&tokenize(&input));
        let mut current = &dom.children()[0];
        let mut seen = 1;
        while let Some(next) = current.children().first() {
            assert_eq!(next.local_name(), Some("div"));
            current = next;
            seen += 1;
        }
        assert_eq!(seen, depth);
    }

    #[test]
    fn deeply_nested_document_drops_without_recursion() {
        let depth = 200_000;
        let dom = build_dom(&tokenize(&"<div>".repeat(depth)));
        let mut current = &dom;
        let mut seen = 0;
        while let Some(next) = current.children().first() {
            current = next;
            seen += 1;
        }
        assert_eq!(seen, depth);
        drop(dom);
    }

    #[test]
    fn ids_follow_document_order() {
        let dom = build_dom(&tokenize("<a></a><b></b>"));
        assert_eq!(dom.id(), Id(1));
        assert_eq!(dom.children()[0].id(), Id(2));
        assert_eq!(dom.children()[1].id(), Id(3));
    }
}
