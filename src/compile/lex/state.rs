use super::Token;

/// Marks the position of the cursor relative to expression and block markers,
/// and determines the action taken on the next call to `.next`.
#[derive(Debug, PartialEq)]
pub enum CursorState {
    /// Cursor is outside of any markers, the lexer reads raw text.
    Default,
    /// Cursor is inside of an expression or block, the lexer reads granular
    /// tokens until it finds `end_token`.
    Inside {
        /// The token that will close this expression or block.
        end_token: Token,
    },
}
