//! Template parser.
//!
//! Utilizes a Lexer to receive instances of Region, which it uses to construct
//! a new Template containing the Abstract Syntax Tree.
//!
//! The template can be combined with data to produce output.
pub mod scope;
pub mod tree;

use crate::{
    compile::{
        lex::{token::Token, Lexer},
        parse::{
            scope::Scope,
            tree::{Base, Call, Expression, Identifier, Literal, Output, Tree, Variable},
        },
        Keyword, Template, TokenResultMust,
    },
    log::{error_eof, Error, INVALID_SYNTAX, UNEXPECTED_BLOCK, UNEXPECTED_TOKEN},
    region::Region,
};
use morel::Finder;
use serde_json::{Number, Value};
use std::collections::HashMap;

pub struct Parser<'source> {
    /// Lexer used to pull from source as tokens instead of raw text.
    lexer: Lexer<'source>,
    /// Store peeked tokens.
    ///
    /// Double option is used to remember when the next token is None.
    buffer: Option<Option<(Token, Region)>>,
}

impl<'source> Parser<'source> {
    /// Create a new Parser from the given string and [`Finder`].
    #[inline]
    pub fn new(source: &'source str, finder: &'source Finder) -> Self {
        Self {
            lexer: Lexer::new(source, finder),
            buffer: None,
        }
    }

    /// Compile the template.
    ///
    /// Returns a new Template, which can be executed with some data
    /// to receive output.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the source text is not a valid template.
    pub fn compile(mut self, name: Option<&str>) -> Result<Template, Error> {
        // Contains the Tree instances for the body, with one extra scope on
        // top while a "define" block is open.
        let mut scopes: Vec<Scope> = vec![Scope::new()];

        // Name and location of the open "define" block, if any.
        let mut open_define: Option<(String, Region)> = None;

        // Completed definitions, hoisted out of the body.
        let mut definitions: HashMap<String, Scope> = HashMap::new();

        while let Some(next) = self.next()? {
            match next {
                (Token::Raw, region) => {
                    self.last_scope(&mut scopes).data.push(Tree::Raw(region));
                }
                (Token::BeginExpression, region) => {
                    let expression = self.parse_expression()?;
                    let (_, end_region) = self.next_must(Token::EndExpression)?;
                    let merge = region.combine(end_region);

                    self.last_scope(&mut scopes)
                        .data
                        .push(Tree::Output(Output::from((expression, merge))));
                }
                (Token::BeginBlock, region) => match self.next_any_must()? {
                    (Token::Keyword(Keyword::Define), _) => {
                        if open_define.is_some() {
                            return Err(Error::build(INVALID_SYNTAX)
                                .with_pointer(self.lexer.source, region)
                                .with_help("`define` blocks cannot be nested"));
                        }

                        let (_, name_region) = self.next_must(Token::String)?;
                        let name = self.parse_string(name_region)?;
                        self.next_must(Token::EndBlock)?;

                        open_define = Some((name, region));
                        scopes.push(Scope::new());
                    }
                    (Token::Keyword(Keyword::End), _) => {
                        self.next_must(Token::EndBlock)?;

                        match open_define.take() {
                            Some((name, _)) => {
                                let scope = scopes
                                    .pop()
                                    .expect("scope stack should contain the define scope");
                                definitions.insert(name, scope);
                            }
                            None => {
                                return Err(Error::build(UNEXPECTED_BLOCK)
                                    .with_pointer(self.lexer.source, region)
                                    .with_help("there is no open `define` block to close"))
                            }
                        }
                    }
                    (token, block_region) => {
                        return Err(Error::build(UNEXPECTED_BLOCK)
                            .with_pointer(self.lexer.source, block_region)
                            .with_help(format!("expected `define` or `end`, found {token}")))
                    }
                },
                (token, region) => {
                    return Err(Error::build(UNEXPECTED_TOKEN)
                        .with_pointer(self.lexer.source, region)
                        .with_help(format!("unexpected {token} outside of an expression")))
                }
            }
        }

        if let Some((name, region)) = open_define {
            return Err(Error::build(INVALID_SYNTAX)
                .with_pointer(self.lexer.source, region)
                .with_help(format!(
                    "did you close the `define` block for `{name}` with an `end` block?"
                )));
        }

        assert!(
            scopes.len() == 1,
            "parser should never have >1 scope after compilation"
        );

        Ok(Template {
            name: name.map(|name| name.to_owned()),
            scope: scopes.remove(0),
            definitions,
            source: self.lexer.source.to_owned(),
        })
    }

    /// Return a mutable reference to the innermost Scope.
    fn last_scope<'scopes>(&self, scopes: &'scopes mut Vec<Scope>) -> &'scopes mut Scope {
        scopes.last_mut().expect("scope stack should not be empty")
    }

    /// Parse an expression.
    ///
    /// An expression is a call to render some kind of data, and may contain
    /// one or more helpers which are used to modify the output.
    fn parse_expression(&mut self) -> Result<Expression, Error> {
        // (( name | replace "a" "b" | uppercase ))
        // |                                       |
        // from                                    to
        let first = self.next_any_must()?;
        let mut expression = if first.0 == Token::Identifier && self.next_is_base_start()? {
            // An identifier followed by a value is a helper invocation
            // with leading arguments.
            let name = Identifier { region: first.1 };
            let mut arguments = Vec::new();
            while self.next_is_base_start()? {
                arguments.push(self.parse_base()?);
            }

            let end = arguments
                .last()
                .expect("call arguments should not be empty")
                .get_region();

            Expression::Call(Call {
                name,
                arguments,
                receiver: None,
                region: first.1.combine(end),
            })
        } else {
            Expression::Base(self.parse_base_from(first)?)
        };

        while self.next_is(Token::Pipe)? {
            self.next_must(Token::Pipe)?;
            let name = self.parse_ident()?;
            let mut arguments = Vec::new();
            while self.next_is_base_start()? {
                arguments.push(self.parse_base()?);
            }

            let end = arguments
                .last()
                .map(|base| base.get_region())
                .unwrap_or(name.region);
            let region = expression.get_region().combine(end);

            expression = Expression::Call(Call {
                name,
                arguments,
                receiver: Some(Box::new(expression)),
                region,
            })
        }

        Ok(expression)
    }

    /// Parse a Base.
    fn parse_base(&mut self) -> Result<Base, Error> {
        let next = self.next_any_must()?;

        self.parse_base_from(next)
    }

    /// Parse a Base from the given token.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the token does not begin a valid Base.
    fn parse_base_from(&mut self, next: (Token, Region)) -> Result<Base, Error> {
        match next {
            (Token::Identifier, region) => {
                let mut path = vec![Identifier { region }];
                while self.next_is(Token::Period)? {
                    self.next_must(Token::Period)?;
                    path.push(self.parse_ident()?);
                }

                Ok(Base::Variable(Variable { path }))
            }
            (Token::String, region) => Ok(Base::Literal(Literal {
                value: Value::String(self.parse_string(region)?),
                region,
            })),
            (Token::Number, region) => Ok(Base::Literal(self.parse_number(region)?)),
            (Token::True, region) => Ok(Base::Literal(Literal {
                value: Value::Bool(true),
                region,
            })),
            (Token::False, region) => Ok(Base::Literal(Literal {
                value: Value::Bool(false),
                region,
            })),
            (token, region) => Err(Error::build(UNEXPECTED_TOKEN)
                .with_pointer(self.lexer.source, region)
                .with_help(format!(
                    "expected an identifier or literal, found {token}"
                ))),
        }
    }

    /// Parse an Identifier.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the next token is not an identifier.
    fn parse_ident(&mut self) -> Result<Identifier, Error> {
        let (_, region) = self.next_must(Token::Identifier)?;

        Ok(Identifier { region })
    }

    /// Parse a string literal, resolving any escape sequences.
    ///
    /// The Region is expected to include the surrounding double quotes.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an unrecognized escape sequence is found.
    fn parse_string(&self, region: Region) -> Result<String, Error> {
        let window = region.literal(self.lexer.source);
        let inner = &window[1..window.len() - 1];

        if !inner.contains('\\') {
            return Ok(inner.to_owned());
        }

        let mut string = String::with_capacity(inner.len());
        let mut characters = inner.char_indices();
        while let Some((index, character)) = characters.next() {
            if character != '\\' {
                string.push(character);
                continue;
            }

            match characters.next() {
                Some((_, 'n')) => string.push('\n'),
                Some((_, 't')) => string.push('\t'),
                Some((_, 'r')) => string.push('\r'),
                Some((_, '"')) => string.push('"'),
                Some((_, '\\')) => string.push('\\'),
                _ => {
                    let position = region.begin + 1 + index;
                    return Err(Error::build(INVALID_SYNTAX)
                        .with_pointer(self.lexer.source, position..position + 1)
                        .with_help(
                            "unrecognized escape sequence, expected one of \
                            `\\n`, `\\t`, `\\r`, `\\\"`, `\\\\`",
                        ));
                }
            }
        }

        Ok(string)
    }

    /// Parse a number literal.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the text does not represent a valid number.
    fn parse_number(&self, region: Region) -> Result<Literal, Error> {
        let window = region.literal(self.lexer.source);
        let value = window.parse::<Number>().map_err(|_| {
            Error::build(INVALID_SYNTAX)
                .with_pointer(self.lexer.source, region)
                .with_help(format!("unrecognizable number `{window}`"))
        })?;

        Ok(Literal {
            value: Value::Number(value),
            region,
        })
    }

    /// Return true if the next token begins a Base.
    fn next_is_base_start(&mut self) -> Result<bool, Error> {
        Ok(matches!(
            self.peek()?,
            Some((
                Token::String | Token::Number | Token::Identifier | Token::True | Token::False,
                _
            ))
        ))
    }

    /// Return true if the next token matches the given token.
    fn next_is(&mut self, token: Token) -> Result<bool, Error> {
        Ok(self
            .peek()?
            .map(|(next, _)| next == token)
            .unwrap_or(false))
    }

    /// Peek the next token without consuming it.
    fn peek(&mut self) -> Result<Option<(Token, Region)>, Error> {
        if self.buffer.is_none() {
            self.buffer = Some(self.lexer.next()?);
        }

        Ok(*self
            .buffer
            .as_ref()
            .expect("buffer should be populated after peek"))
    }

    /// Return the next token, preferring the peek buffer.
    fn next(&mut self) -> Result<Option<(Token, Region)>, Error> {
        match self.buffer.take() {
            Some(next) => Ok(next),
            None => self.lexer.next(),
        }
    }

    /// Return the next token, which must match the given token.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the next token does not match, or the
    /// source has no more tokens.
    fn next_must(&mut self, expected: Token) -> TokenResultMust {
        match self.next()? {
            Some((token, region)) if token == expected => Ok((token, region)),
            Some((token, region)) => Err(Error::build(UNEXPECTED_TOKEN)
                .with_pointer(self.lexer.source, region)
                .with_help(format!("expected {expected}, found {token}"))),
            None => Err(error_eof(self.lexer.source)),
        }
    }

    /// Return the next token, which may be anything but must exist.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the source has no more tokens.
    fn next_any_must(&mut self) -> TokenResultMust {
        match self.next()? {
            Some(next) => Ok(next),
            None => Err(error_eof(self.lexer.source)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Base, Expression, Parser, Tree};
    use crate::Builder;
    use morel::Finder;
    use serde_json::json;

    #[test]
    fn test_parse_output_variable() {
        let finder = new_finder();
        let template = Parser::new("(( name ))", &finder).compile(None).unwrap();

        assert_eq!(template.scope.data.len(), 1);
        match &template.scope.data[0] {
            Tree::Output(output) => match &output.expression {
                Expression::Base(Base::Variable(variable)) => {
                    assert_eq!(variable.path.len(), 1);
                    assert_eq!(variable.path[0].region.literal(&template.source), "name");
                }
                other => panic!("expected variable, found {other:?}"),
            },
            other => panic!("expected output, found {other:?}"),
        }
    }

    #[test]
    fn test_parse_dotted_variable() {
        let finder = new_finder();
        let template = Parser::new("(( person.name ))", &finder)
            .compile(None)
            .unwrap();

        match &template.scope.data[0] {
            Tree::Output(output) => match &output.expression {
                Expression::Base(Base::Variable(variable)) => {
                    assert_eq!(variable.path.len(), 2);
                    assert_eq!(variable.path[1].region.literal(&template.source), "name");
                }
                other => panic!("expected variable, found {other:?}"),
            },
            other => panic!("expected output, found {other:?}"),
        }
    }

    #[test]
    fn test_parse_pipe_chain() {
        let finder = new_finder();
        let template = Parser::new(r#"(( name | replace "a" "b" | uppercase ))"#, &finder)
            .compile(None)
            .unwrap();

        match &template.scope.data[0] {
            Tree::Output(output) => match &output.expression {
                Expression::Call(call) => {
                    assert_eq!(call.name.region.literal(&template.source), "uppercase");
                    assert!(call.arguments.is_empty());
                    match call.receiver.as_deref() {
                        Some(Expression::Call(inner)) => {
                            assert_eq!(inner.name.region.literal(&template.source), "replace");
                            assert_eq!(inner.arguments.len(), 2);
                            assert!(inner.receiver.is_some());
                        }
                        other => panic!("expected call receiver, found {other:?}"),
                    }
                }
                other => panic!("expected call, found {other:?}"),
            },
            other => panic!("expected output, found {other:?}"),
        }
    }

    #[test]
    fn test_parse_leading_call() {
        let finder = new_finder();
        let template = Parser::new(r#"(( default name "fallback" ))"#, &finder)
            .compile(None)
            .unwrap();

        match &template.scope.data[0] {
            Tree::Output(output) => match &output.expression {
                Expression::Call(call) => {
                    assert_eq!(call.name.region.literal(&template.source), "default");
                    assert_eq!(call.arguments.len(), 2);
                    assert!(call.receiver.is_none());
                    assert_eq!(
                        call.arguments[1],
                        Base::Literal(super::Literal {
                            value: json!("fallback"),
                            region: (16..26).into()
                        })
                    );
                }
                other => panic!("expected call, found {other:?}"),
            },
            other => panic!("expected output, found {other:?}"),
        }
    }

    #[test]
    fn test_parse_negative_number() {
        let finder = new_finder();
        let template = Parser::new("(( -5 ))", &finder).compile(None).unwrap();

        match &template.scope.data[0] {
            Tree::Output(output) => match &output.expression {
                Expression::Base(Base::Literal(literal)) => {
                    assert_eq!(literal.value, json!(-5));
                }
                other => panic!("expected literal, found {other:?}"),
            },
            other => panic!("expected output, found {other:?}"),
        }
    }

    #[test]
    fn test_parse_string_escape() {
        let finder = new_finder();
        let template = Parser::new(r#"(( "say \"hi\"" ))"#, &finder)
            .compile(None)
            .unwrap();

        match &template.scope.data[0] {
            Tree::Output(output) => match &output.expression {
                Expression::Base(Base::Literal(literal)) => {
                    assert_eq!(literal.value, json!(r#"say "hi""#));
                }
                other => panic!("expected literal, found {other:?}"),
            },
            other => panic!("expected output, found {other:?}"),
        }
    }

    #[test]
    fn test_parse_define_hoisted() {
        let finder = new_finder();
        let template = Parser::new(r#"(* define "x" *)hi(* end *)body"#, &finder)
            .compile(None)
            .unwrap();

        assert_eq!(template.definitions.len(), 1);
        let definition = template.definitions.get("x").unwrap();
        assert_eq!(definition.data.len(), 1);
        assert_eq!(template.scope.data.len(), 1);
        match &template.scope.data[0] {
            Tree::Raw(region) => assert_eq!(region.literal(&template.source), "body"),
            other => panic!("expected raw, found {other:?}"),
        }
    }

    #[test]
    fn test_parse_unclosed_define() {
        let finder = new_finder();
        let result = Parser::new(r#"(* define "x" *)hi"#, &finder).compile(None);

        assert!(result.is_err());
    }

    #[test]
    fn test_parse_stray_end() {
        let finder = new_finder();
        let result = Parser::new("(* end *)", &finder).compile(None);

        assert!(result.is_err());
    }

    #[test]
    fn test_parse_nested_define() {
        let finder = new_finder();
        let result = Parser::new(
            r#"(* define "x" *)(* define "y" *)(* end *)(* end *)"#,
            &finder,
        )
        .compile(None);

        assert!(result.is_err());
    }

    #[test]
    fn test_parse_unexpected_token() {
        let finder = new_finder();
        let result = Parser::new("(( | uppercase ))", &finder).compile(None);

        assert!(result.is_err());
    }

    fn new_finder() -> Finder {
        Finder::new(Builder::new().to_syntax())
    }
}
