//! Syntax kinds for the brace language CST

/// All syntax kinds (tokens and nodes) of the brace language.
///
/// Tokens are leaves (identifiers, literals, punctuation, trivia).
/// Nodes are composite (file, items, blocks, error recovery).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum BraceKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    WHITESPACE = 0,
    COMMENT,

    // =========================================================================
    // TOKENS
    // =========================================================================
    IDENT,
    NUMBER,
    STRING,
    L_BRACE,
    R_BRACE,
    EQ,
    SEMICOLON,
    /// Input the lexer could not classify
    ERROR_TOKEN,

    // =========================================================================
    // NODES
    // =========================================================================
    SOURCE_FILE,
    ITEM,
    VALUE,
    BLOCK,
    /// Error recovery node
    ERROR,

    #[doc(hidden)]
    __LAST,
}

impl BraceKind {
    const ALL: [BraceKind; BraceKind::__LAST as usize] = [
        BraceKind::WHITESPACE,
        BraceKind::COMMENT,
        BraceKind::IDENT,
        BraceKind::NUMBER,
        BraceKind::STRING,
        BraceKind::L_BRACE,
        BraceKind::R_BRACE,
        BraceKind::EQ,
        BraceKind::SEMICOLON,
        BraceKind::ERROR_TOKEN,
        BraceKind::SOURCE_FILE,
        BraceKind::ITEM,
        BraceKind::VALUE,
        BraceKind::BLOCK,
        BraceKind::ERROR,
    ];

    /// Check if this is a trivia token (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::COMMENT)
    }

    /// Kinds that mark a parse error.
    pub fn is_error(self) -> bool {
        matches!(self, Self::ERROR | Self::ERROR_TOKEN)
    }

    /// Map a raw arena kind back to a brace kind.
    pub fn from_raw(raw: rowan::SyntaxKind) -> Option<Self> {
        Self::ALL.get(raw.0 as usize).copied()
    }
}

impl From<BraceKind> for rowan::SyntaxKind {
    fn from(kind: BraceKind) -> Self {
        Self(kind as u16)
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BraceLanguage {}

impl rowan::Language for BraceLanguage {
    type Kind = BraceKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        BraceKind::from_raw(raw).unwrap_or(BraceKind::ERROR)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type BraceNode = rowan::SyntaxNode<BraceLanguage>;
