//! Minimal HTML front end for the audit engine: a byte-scanning tokenizer,
//! a tree builder and traversal helpers over the resulting [`Node`] tree.

pub mod traverse;

mod dom_builder;
mod entities;
mod tokenizer;
mod types;

pub use crate::dom_builder::build_dom;
pub use crate::tokenizer::tokenize;
pub use crate::types::{Doctype, Id, Node, NodeId, Token};

/// Tokenizes and builds in one step.
pub fn parse_document(input: &str) -> Node {
    build_dom(&tokenize(input))
}
