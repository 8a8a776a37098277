mod lex;
mod parse;
mod syntax;
mod template;

pub use syntax::{Builder, Marker};
pub use template::Template;

pub(crate) use parse::{scope::Scope, tree, Parser};

use crate::{log::Error, region::Region};
use lex::token::Token;
use morel::Finder;
use std::fmt::{Display, Formatter};

/// Recognized block keywords.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Keyword {
    /// Begin a named definition.
    Define,
    /// Close the open block.
    End,
}

impl Display for Keyword {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Keyword::Define => write!(f, "define"),
            Keyword::End => write!(f, "end"),
        }
    }
}

/// Result type returned by the Lexer, where the token may not exist.
pub(crate) type TokenResult = Result<Option<(Token, Region)>, Error>;

/// Result type returned by the Parser when a token must exist.
pub(crate) type TokenResultMust = Result<(Token, Region), Error>;

/// Compile the given text into a [`Template`].
///
/// The [`Finder`] determines which markers delimit expressions and
/// blocks within the text.
///
/// # Errors
///
/// Returns an [`Error`] when the text is not a valid template.
pub fn compile(finder: &Finder, name: Option<&str>, text: &str) -> Result<Template, Error> {
    Parser::new(text, finder).compile(name)
}

#[cfg(test)]
mod tests {
    use super::{compile, Builder};
    use morel::Finder;

    #[test]
    fn test_compile_empty() {
        let finder = Finder::new(Builder::new().to_syntax());
        let template = compile(&finder, Some("empty"), "").unwrap();

        assert_eq!(template.get_name(), Some("empty"));
        assert!(template.scope.data.is_empty());
        assert!(template.definitions.is_empty());
    }

    #[test]
    fn test_compile_owns_source() {
        let finder = Finder::new(Builder::new().to_syntax());
        let template = {
            let text = String::from("(( name ))");
            compile(&finder, None, &text).unwrap()
        };

        assert_eq!(template.source, "(( name ))");
    }
}
