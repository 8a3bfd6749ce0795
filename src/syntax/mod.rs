//! Syntax: the node arena, document snapshots and a sample brace language.
//!
//! Parsing proper is a collaborator of the analysis pass. This module only
//! defines the tree shape the pass reads and the conversions into it:
//! - [`SyntaxTree`] / [`NodeId`] - index arena with parent links
//! - [`TreeBuilder`] - validated construction
//! - [`SyntaxTree::from_rowan`] - lowering of any rowan tree
//! - [`brace`] - lexer and parser used by tests and examples

pub mod brace;
mod document;
mod lower;
mod tree;


pub use document::Document;
pub use tree::{NodeId, NodeRef, SyntaxTree, TreeBuilder, TreeError};
