//! SQL tokens, the atomic units of generated DDL.
//!
//! Statements are assembled as a [`TokenStream`] and serialized in one pass.
//! Identifiers are always rendered through [`quote_identifier`], so a name can
//! only reach SQL text as a quoted identifier.

use super::ident::quote_identifier;

/// Every element a generated statement can contain.
///
/// Adding a variant forces every match on `Token` to handle it.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === DDL Keywords ===
    Create,
    Alter,
    Table,
    Add,
    Column,
    If,
    Not,
    Exists,
    Null,
    Primary,
    Key,
    Unique,
    Default,
    References,
    On,
    Delete,

    // === Referential actions ===
    Cascade,
    Restrict,
    NoAction,
    SetNull,
    SetDefault,

    // === Punctuation ===
    Comma,
    LParen,
    RParen,
    Space,

    // === Dynamic Content ===
    /// Table or column name, double-quoted on output.
    Ident(String),

    // === Escape Hatch ===
    /// Passed through unchanged.
    ///
    /// Only for SQL type names from [`FieldType`](crate::model::FieldType)
    /// and default expressions that passed
    /// [`validate_default_expr`](super::ident::validate_default_expr).
    Raw(String),
}

impl Token {
    /// Serialize this token to SQL text.
    pub fn serialize(&self) -> String {
        match self {
            Token::Create => "CREATE".into(),
            Token::Alter => "ALTER".into(),
            Token::Table => "TABLE".into(),
            Token::Add => "ADD".into(),
            Token::Column => "COLUMN".into(),
            Token::If => "IF".into(),
            Token::Not => "NOT".into(),
            Token::Exists => "EXISTS".into(),
            Token::Null => "NULL".into(),
            Token::Primary => "PRIMARY".into(),
            Token::Key => "KEY".into(),
            Token::Unique => "UNIQUE".into(),
            Token::Default => "DEFAULT".into(),
            Token::References => "REFERENCES".into(),
            Token::On => "ON".into(),
            Token::Delete => "DELETE".into(),

            Token::Cascade => "CASCADE".into(),
            Token::Restrict => "RESTRICT".into(),
            Token::NoAction => "NO ACTION".into(),
            Token::SetNull => "SET NULL".into(),
            Token::SetDefault => "SET DEFAULT".into(),

            Token::Comma => ",".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
            Token::Space => " ".into(),

            Token::Ident(name) => quote_identifier(name),

            Token::Raw(s) => s.clone(),
        }
    }
}

/// A stream of tokens that can be serialized to SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty token stream.
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    /// Push a single token.
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Extend with multiple tokens.
    pub fn extend(&mut self, tokens: impl IntoIterator<Item = Token>) -> &mut Self {
        self.tokens.extend(tokens);
        self
    }

    /// Append another token stream.
    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens.iter().cloned());
        self
    }

    /// Push a comma-separated, parenthesised list of identifiers.
    pub fn ident_list<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> &mut Self {
        self.lparen();
        for (i, name) in names.into_iter().enumerate() {
            if i > 0 {
                self.comma().space();
            }
            self.push(Token::Ident(name.to_string()));
        }
        self.rparen()
    }

    /// Whether the stream contains no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Serialize all tokens to a SQL string.
    pub fn serialize(&self) -> String {
        self.tokens.iter().map(Token::serialize).collect()
    }

    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }
    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }
    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
}
