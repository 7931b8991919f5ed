use std::fmt::Display;

use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Digits
    Zero,
    One,

    // Line structure
    LineNumber,
    Code,
    Goto,
    IfTheJumpRegisterIs,

    // Expressions
    TheJumpRegister,
    Variable,
    TheValueAt,
    TheValueBeyond,
    TheAddressOf,
    Nand,
    OpenParenthesis,
    CloseParenthesis,

    // Commands
    Equals,
    Print,
    Read,
}

const KEYWORDS: [(&str, TokenType); 17] = [
    ("ZERO", TokenType::Zero),
    ("ONE", TokenType::One),
    ("LINENUMBER", TokenType::LineNumber),
    ("CODE", TokenType::Code),
    ("GOTO", TokenType::Goto),
    ("IFTHEJUMPREGISTERIS", TokenType::IfTheJumpRegisterIs),
    ("THEJUMPREGISTER", TokenType::TheJumpRegister),
    ("VARIABLE", TokenType::Variable),
    ("THEVALUEAT", TokenType::TheValueAt),
    ("THEVALUEBEYOND", TokenType::TheValueBeyond),
    ("THEADDRESSOF", TokenType::TheAddressOf),
    ("NAND", TokenType::Nand),
    ("EQUALS", TokenType::Equals),
    ("OPENPARENTHESIS", TokenType::OpenParenthesis),
    ("CLOSEPARENTHESIS", TokenType::CloseParenthesis),
    ("PRINT", TokenType::Print),
    ("READ", TokenType::Read),
];

impl TokenType {
    pub fn from_word(word: &str) -> Option<TokenType> {
        KEYWORDS
            .iter()
            .find(|(spelling, _)| *spelling == word)
            .map(|(_, token_type)| *token_type)
    }

    pub fn spelling(&self) -> &'static str {
        KEYWORDS
            .iter()
            .find(|(_, token_type)| token_type == self)
            .map(|(spelling, _)| *spelling)
            .unwrap_or_default()
    }

    /// The digit value of `ZERO`/`ONE`, `None` for every other keyword.
    pub fn digit(&self) -> Option<bool> {
        match self {
            TokenType::Zero => Some(false),
            TokenType::One => Some(true),
            _ => None,
        }
    }
}

impl Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.spelling())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token_type: TokenType,
    pub span: Span,
}

impl Token {
    pub fn token_type(&self) -> &TokenType {
        &self.token_type
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.token_type, self.span)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Encountered a non-uppercase-alphabetical, non-whitespace character {0:?} at {1}")]
    InvalidCharacter(char, Span),
    #[error("Encountered an invalid token \"{0}\" at {1}")]
    InvalidToken(String, Span),
}

/// Splits `source` into keywords. Whitespace may appear anywhere, even inside a
/// keyword, and a keyword is emitted as soon as the accumulated letters spell
/// it. The keyword set is prefix-free so the first match is the only match.
pub fn tokens(source: &str) -> Result<Vec<Token>, TokenError> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut word_start = Span::default();
    let mut line = 1;
    let mut column = 0;

    for c in source.chars() {
        if c == '\n' {
            line += 1;
            column = 0;
            continue;
        }
        column += 1;

        if c.is_whitespace() {
            continue;
        }
        if !c.is_ascii_uppercase() {
            return Err(TokenError::InvalidCharacter(c, Span::at(line, column)));
        }

        if word.is_empty() {
            word_start = Span::at(line, column);
        }
        word.push(c);

        if let Some(token_type) = TokenType::from_word(&word) {
            tokens.push(Token {
                token_type,
                span: word_start + Span::at(line, column),
            });
            word.clear();
        }
    }

    if word.is_empty() {
        Ok(tokens)
    } else {
        Err(TokenError::InvalidToken(word, word_start))
    }
}
