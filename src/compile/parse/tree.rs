use crate::region::Region;
use serde_json::Value;

/// The Abstract Syntax Tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Tree {
    /// Raw text.
    Raw(Region),
    /// Render the result of an expression.
    Output(Output),
}

/// Represents data within expression tags, "(( ))" by default, and may be a Base
/// or Call variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A simple call to render the named value from the data.
    Base(Base),
    /// A helper invocation, which may receive the output of another
    /// expression through a pipe.
    Call(Call),
}

impl Expression {
    /// Get the Region from the underlying Expression kind.
    pub fn get_region(&self) -> Region {
        match self {
            Expression::Base(base) => base.get_region(),
            Expression::Call(call) => call.region,
        }
    }
}

/// Represents a call to render some kind of Expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub expression: Expression,
    pub region: Region,
}

impl From<(Expression, Region)> for Output {
    /// Create an Output from the given (Expression, Region).
    fn from(value: (Expression, Region)) -> Self {
        Self {
            expression: value.0,
            region: value.1,
        }
    }
}

/// Variable types.
///
/// ## Literal
///
/// A literal value is some literal data, such as a string or number.
///
/// ## Variable
///
/// A variable is an identifier such as "person.name" which indicates
/// the location of the true value within the data.
#[derive(Debug, Clone, PartialEq)]
pub enum Base {
    /// A value located in the data.
    Variable(Variable),
    /// A literal value located directly in the template source.
    Literal(Literal),
}

impl Base {
    /// Get a Region from the underlying Base kind.
    pub fn get_region(&self) -> Region {
        match self {
            Base::Variable(variable) => variable.get_region(),
            Base::Literal(literal) => literal.region,
        }
    }
}

/// Set of Identifier instances that can be used to locate data.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// The keys that make up the path, in order of appearance.
    pub path: Vec<Identifier>,
}

impl Variable {
    /// Get a Region spanning the area from the first and last keys.
    ///
    /// # Panics
    ///
    /// Panics if the path is empty, which should never happen for a
    /// Variable produced by the parser.
    pub fn get_region(&self) -> Region {
        self.path
            .first()
            .expect("variable path should not be empty")
            .region
            .combine(
                self.path
                    .last()
                    .expect("variable path should not be empty")
                    .region,
            )
    }
}

/// Area that contains an identifying value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Identifier {
    /// Location of the identifier within the source.
    pub region: Region,
}

/// Literal data that does not need to be evaluated any further.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    /// The value itself.
    pub value: Value,
    /// Location of the literal within the source.
    pub region: Region,
}

/// A helper invocation.
///
/// The receiver, when present, is an upstream expression whose output
/// becomes the first argument of the helper.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// Name of the helper being invoked.
    pub name: Identifier,
    /// Arguments that appear directly after the helper name.
    pub arguments: Vec<Base>,
    /// An upstream expression piped into this helper.
    pub receiver: Option<Box<Expression>>,
    /// Location of the entire call.
    pub region: Region,
}
