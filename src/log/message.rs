use super::Error;

pub const UNEXPECTED_TOKEN: &str = "unexpected token";
pub const UNEXPECTED_BLOCK: &str = "unexpected block";
pub const UNEXPECTED_EOF: &str = "unexpected eof";
pub const INVALID_SYNTAX: &str = "invalid syntax";
pub const INVALID_HELPER: &str = "invalid helper";
pub const INVALID_ARGUMENTS: &str = "invalid arguments";
pub const INVALID_PATH: &str = "invalid path";
pub const INVALID_SOURCE: &str = "invalid source";
pub const EXCEEDED_DEPTH: &str = "exceeded maximum depth";
pub const UNKNOWN_DIALECT: &str = "unknown dialect";

/// Return an [`Error`] explaining that the end of source was not expected.
pub fn error_eof(source: &str) -> Error {
    let source_len = source.len();
    Error::build(UNEXPECTED_EOF)
        .with_pointer(source, source_len..source_len)
        .with_help("expected additional tokens, did you close all blocks and expressions?")
}

/// Return an [`Error`] explaining that the write operation failed.
///
/// This is likely caused by a failure during a `write!` macro operation.
pub fn error_write() -> Error {
    Error::build("write failure")
        .with_help("failed to write result of render, are you low on memory?")
}

/// Return an [`Error`] describing a missing named template.
pub fn error_missing_template(name: &str) -> Error {
    Error::build("missing template").with_help(format!(
        "template `{name}` not found, add it with `.load_definition`"
    ))
}
