use std::convert::Infallible;
use std::str::FromStr;

use crate::models::{Cell, CellType};

/// One whitespace-separated token of a kind expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `all`: every cell.
    All,
    /// A bare native type: `markdown`, `code` or `raw`.
    Type(CellType),
    /// `md:<kind>`: markdown cells whose derived kind has this name.
    Kind(String),
    /// Anything else. Kept so callers can inspect it, but matches nothing.
    Invalid(String),
}

impl Token {
    pub const ALL: &'static str = "all";
    pub const MD_PREFIX: &'static str = "md:";

    pub fn parse(token: &str) -> Self {
        if token == Self::ALL {
            return Token::All;
        }
        if let Some(kind) = token.strip_prefix(Self::MD_PREFIX) {
            return if kind.is_empty() {
                Token::Invalid(token.to_string())
            } else {
                Token::Kind(kind.to_string())
            };
        }
        match token.parse::<CellType>() {
            Ok(cell_type) => Token::Type(cell_type),
            Err(_) => Token::Invalid(token.to_string()),
        }
    }

    pub fn matches(&self, cell: &Cell) -> bool {
        match self {
            Token::All => true,
            Token::Type(cell_type) => cell.cell_type == *cell_type,
            Token::Kind(name) => cell.is_markdown() && cell.kind_name() == Some(name.as_str()),
            Token::Invalid(_) => false,
        }
    }
}

/// A parsed kind expression such as `"md:text md:note code"`.
///
/// Parsing never fails: malformed tokens are kept as [`Token::Invalid`] and
/// simply select nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindExpr {
    tokens: Vec<Token>,
}

impl KindExpr {
    pub fn parse(expr: &str) -> Self {
        Self {
            tokens: expr.split_whitespace().map(Token::parse).collect(),
        }
    }

    pub fn all() -> Self {
        Self {
            tokens: vec![Token::All],
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn invalid_tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match t {
            Token::Invalid(raw) => Some(raw.as_str()),
            _ => None,
        })
    }

    pub fn matches(&self, cell: &Cell) -> bool {
        self.tokens.iter().any(|t| t.matches(cell))
    }
}

impl FromStr for KindExpr {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for KindExpr {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}
