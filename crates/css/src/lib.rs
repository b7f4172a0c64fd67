pub mod matching;
pub mod syntax;

// Re-exports so other crates can just use `css::...` nicely.
pub use matching::{matches_selector, query_all, query_count};
pub use syntax::{AttributeSelector, Selector, SelectorError, TypeSelector, parse_selector};
