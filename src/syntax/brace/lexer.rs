//! Lexer for the brace language using Logos
//!
//! Tokenizes source code into tokens including whitespace and comments.

use super::kind::BraceKind;
use logos::Logos;

/// Token with text and kind
pub struct Token<'a> {
    pub kind: BraceKind,
    pub text: &'a str,
}

/// Logos-based token types
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum LogosToken {
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"#[^\n]*")]
    Comment,

    #[regex(r"[A-Za-z_][A-Za-z0-9_\-]*")]
    Ident,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("=")]
    Eq,

    #[token(";")]
    Semicolon,
}

fn to_brace_kind(token: LogosToken) -> BraceKind {
    match token {
        LogosToken::Whitespace => BraceKind::WHITESPACE,
        LogosToken::Comment => BraceKind::COMMENT,
        LogosToken::Ident => BraceKind::IDENT,
        LogosToken::Number => BraceKind::NUMBER,
        LogosToken::String => BraceKind::STRING,
        LogosToken::LBrace => BraceKind::L_BRACE,
        LogosToken::RBrace => BraceKind::R_BRACE,
        LogosToken::Eq => BraceKind::EQ,
        LogosToken::Semicolon => BraceKind::SEMICOLON,
    }
}

/// Tokenize source code into a vector of tokens
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut lexer = LogosToken::lexer(source);

    while let Some(result) = lexer.next() {
        let text = lexer.slice();
        let kind = match result {
            Ok(token) => to_brace_kind(token),
            Err(()) => BraceKind::ERROR_TOKEN,
        };
        tokens.push(Token { kind, text });
    }

    tokens
}
