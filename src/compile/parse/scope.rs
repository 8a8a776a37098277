use super::tree::Tree;

/// A distinct area of the Abstract Syntax Tree.
///
/// The body of a template is one Scope, and every named definition
/// hoisted out of the body is another.
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    pub data: Vec<Tree>,
}

impl Scope {
    /// Create a new, empty Scope.
    #[inline]
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}
