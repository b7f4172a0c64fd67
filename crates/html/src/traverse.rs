use crate::{Id, Node};

/// Assigns ids in document order to every node still carrying `Id(0)`.
pub fn assign_node_ids(root: &mut Node) {
    let mut next = max_node_id(root).0.wrapping_add(1).max(1);
    let mut stack: Vec<&mut Node> = vec![root];
    while let Some(node) = stack.pop() {
        if node.id() == Id(0) {
            node.set_id(Id(next));
            next = next.wrapping_add(1);
        }
        if let Some(children) = node.children_mut() {
            // reversed so siblings are numbered left to right
            stack.extend(children.iter_mut().rev());
        }
    }
}

fn max_node_id(root: &Node) -> Id {
    let mut max = Id(0);
    for_each_node(root, |n| max = max.max(n.id()));
    max
}

/// Pre-order walk over every node, document included.
pub fn for_each_node<'a>(root: &'a Node, mut f: impl FnMut(&'a Node)) {
    let mut stack: Vec<&'a Node> = vec![root];
    while let Some(node) = stack.pop() {
        f(node);
        stack.extend(node.children().iter().rev());
    }
}

/// Pre-order walk over element nodes only.
pub fn for_each_element<'a>(root: &'a Node, mut f: impl FnMut(&'a Node)) {
    for_each_node(root, |n| {
        if matches!(n, Node::Element { .. }) {
            f(n);
        }
    });
}

#[cfg(test)]
fn find_node_by_id(root: &Node, id: Id) -> Option<&Node> {
    let mut stack: Vec<&Node> = vec![root];
    while let Some(node) = stack.pop() {
        if node.id() == id {
            return Some(node);
        }
        stack.extend(node.children().iter().rev());
    }
    None
}

/// Detaches the node with `id` (and its subtree) from the tree.
///
/// The root itself can't be removed.
pub fn remove_node(root: &mut Node, id: Id) -> Option<Node> {
    let mut stack: Vec<&mut Node> = vec![root];
    while let Some(node) = stack.pop() {
        let Some(children) = node.children_mut() else {
            continue;
        };
        if let Some(pos) = children.iter().position(|c| c.id() == id) {
            return Some(children.remove(pos));
        }
        stack.extend(children.iter_mut());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_dom, tokenize};

    #[test]
    fn for_each_element_visits_in_document_order() {
        let dom = build_dom(&tokenize("<a><b></b></a><c></c>text"));
        let mut names = Vec::new();
        for_each_element(&dom, |n| names.push(n.local_name().unwrap_or_default()));
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn remove_node_detaches_subtree() {
        let mut dom = build_dom(&tokenize("<div><canvas></canvas></div><canvas></canvas>"));
        let inner = dom.children()[0].children()[0].id();
        let removed = remove_node(&mut dom, inner).expect("node exists");
        assert_eq!(removed.local_name(), Some("canvas"));
        assert!(find_node_by_id(&dom, inner).is_none());
        let root_id = dom.id();
        assert!(remove_node(&mut dom, root_id).is_none());
    }
}
