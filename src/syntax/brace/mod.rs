//! A small brace-structured language.
//!
//! ```text
//! server {
//!     port = 8080;
//!     query = "select { x; }";   # TODO: parameterize
//! }
//! ```
//!
//! Items are `name [= value] ;` or `name [= value] { items }`. The parser is
//! lossless and never fails: unexpected tokens are wrapped in `ERROR` nodes
//! and a missing `;` or `}` produces an empty `ERROR` node. It gives the
//! analysis pass realistic trees with error elements and string literals
//! that can host injected documents.

mod kind;
mod lexer;


pub use kind::{BraceKind, BraceLanguage, BraceNode};
pub use lexer::{Token, tokenize};

use rowan::GreenNodeBuilder;

use super::tree::{SyntaxTree, TreeError};

/// Parse source into a rowan CST.
pub fn parse(source: &str) -> BraceNode {
    let tokens = tokenize(source);
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        builder: GreenNodeBuilder::new(),
    };
    parser.source_file();
    BraceNode::new_root(parser.builder.finish())
}

/// Parse source and lower it into the node arena.
pub fn parse_tree(source: &str) -> Result<SyntaxTree, TreeError> {
    SyntaxTree::from_rowan(&parse(source), BraceKind::is_error)
}

struct Parser<'t, 's> {
    tokens: &'t [Token<'s>],
    pos: usize,
    builder: GreenNodeBuilder<'static>,
}

impl Parser<'_, '_> {
    fn source_file(&mut self) {
        self.builder.start_node(BraceKind::SOURCE_FILE.into());
        while self.pos < self.tokens.len() {
            self.trivia();
            match self.current() {
                Some(BraceKind::IDENT) => self.item(),
                Some(_) => self.error_token(),
                None => break,
            }
        }
        self.builder.finish_node();
    }

    /// Parse `name [= value] (; | block)`
    fn item(&mut self) {
        self.builder.start_node(BraceKind::ITEM.into());
        self.bump();
        self.trivia();

        if self.current() == Some(BraceKind::EQ) {
            self.bump();
            self.trivia();
            match self.current() {
                Some(BraceKind::STRING | BraceKind::NUMBER | BraceKind::IDENT) => {
                    self.builder.start_node(BraceKind::VALUE.into());
                    self.bump();
                    self.builder.finish_node();
                }
                _ => self.missing(),
            }
            self.trivia();
        }

        match self.current() {
            Some(BraceKind::SEMICOLON) => self.bump(),
            Some(BraceKind::L_BRACE) => self.block(),
            _ => self.missing(),
        }
        self.builder.finish_node();
    }

    /// Parse `{ items }`
    fn block(&mut self) {
        self.builder.start_node(BraceKind::BLOCK.into());
        self.bump();
        loop {
            self.trivia();
            match self.current() {
                Some(BraceKind::R_BRACE) => {
                    self.bump();
                    break;
                }
                Some(BraceKind::IDENT) => self.item(),
                Some(_) => self.error_token(),
                None => {
                    self.missing();
                    break;
                }
            }
        }
        self.builder.finish_node();
    }

    /// Wrap the current token in an ERROR node
    fn error_token(&mut self) {
        self.builder.start_node(BraceKind::ERROR.into());
        self.bump();
        self.builder.finish_node();
    }

    /// Empty ERROR node for a missing token
    fn missing(&mut self) {
        self.builder.start_node(BraceKind::ERROR.into());
        self.builder.finish_node();
    }

    fn trivia(&mut self) {
        while self.current().is_some_and(BraceKind::is_trivia) {
            self.bump();
        }
    }

    fn current(&self) -> Option<BraceKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn bump(&mut self) {
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }
}
