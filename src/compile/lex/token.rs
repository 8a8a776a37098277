use crate::compile::Keyword;
use std::fmt::{Display, Formatter, Result};

/// Lexed tokens recognized by the compiler.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Token {
    /// Raw text, anything not within an expression or block.
    Raw,
    /// A string literal delimited by double quotes.
    String,
    /// A number literal, which may be negative and contain a decimal point.
    Number,
    /// An identifier, used to look up data or name a helper.
    Identifier,
    /// A recognized keyword such as "define".
    Keyword(Keyword),
    /// Whitespace between tokens, discarded by the lexer.
    Whitespace,
    /// Beginning of an expression.
    BeginExpression,
    /// End of an expression.
    EndExpression,
    /// Beginning of a block.
    BeginBlock,
    /// End of a block.
    EndBlock,
    /// The `.` character, separates keys within a variable path.
    Period,
    /// The `|` character, chains the output of one expression into a helper.
    Pipe,
    /// The `true` literal.
    True,
    /// The `false` literal.
    False,
}

impl Token {
    /// Convert a marker identifier reported by the `Finder` into a [`Token`].
    ///
    /// The boolean is true when the marker is a whitespace trimming variant.
    pub fn from_usize_trim(id: usize) -> (Self, bool) {
        match id {
            0 => (Self::BeginExpression, false),
            1 => (Self::EndExpression, false),
            2 => (Self::BeginExpression, true),
            3 => (Self::EndExpression, true),
            4 => (Self::BeginBlock, false),
            5 => (Self::EndBlock, false),
            6 => (Self::BeginBlock, true),
            7 => (Self::EndBlock, true),
            _ => unreachable!("marker identifier out of range"),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Token::Raw => write!(f, "raw text"),
            Token::String => write!(f, "string"),
            Token::Number => write!(f, "number"),
            Token::Identifier => write!(f, "identifier"),
            Token::Keyword(keyword) => write!(f, "keyword `{keyword}`"),
            Token::Whitespace => write!(f, "whitespace"),
            Token::BeginExpression => write!(f, "beginning of expression"),
            Token::EndExpression => write!(f, "end of expression"),
            Token::BeginBlock => write!(f, "beginning of block"),
            Token::EndBlock => write!(f, "end of block"),
            Token::Period => write!(f, "period"),
            Token::Pipe => write!(f, "pipe"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
        }
    }
}
