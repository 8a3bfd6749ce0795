//! Lowering of rowan trees into the node arena.

use rowan::{NodeOrToken, WalkEvent};

use super::tree::{SyntaxTree, TreeBuilder, TreeError};

impl SyntaxTree {
    /// Lower a rowan red tree into an arena.
    ///
    /// Both nodes and tokens become arena nodes; tokens are leaves. The walk
    /// uses rowan's pre-order event iterator, so deeply nested input does not
    /// grow the call stack. `is_error` marks the kinds that represent parse
    /// errors.
    pub fn from_rowan<L: rowan::Language>(
        root: &rowan::SyntaxNode<L>,
        is_error: impl Fn(L::Kind) -> bool,
    ) -> Result<SyntaxTree, TreeError> {
        let mut builder = TreeBuilder::new();

        for event in root.preorder_with_tokens() {
            match event {
                WalkEvent::Enter(NodeOrToken::Node(node)) => {
                    let kind = L::kind_to_raw(node.kind());
                    if is_error(node.kind()) {
                        builder.start_error_node(kind, node.text_range());
                    } else {
                        builder.start_node(kind, node.text_range());
                    }
                }
                WalkEvent::Leave(NodeOrToken::Node(_)) => builder.finish_node(),
                WalkEvent::Enter(NodeOrToken::Token(token)) => {
                    let kind = L::kind_to_raw(token.kind());
                    if is_error(token.kind()) {
                        builder.error_leaf(kind, token.text_range());
                    } else {
                        builder.leaf(kind, token.text_range());
                    }
                }
                WalkEvent::Leave(NodeOrToken::Token(_)) => {}
            }
        }

        builder.finish()
    }
}
