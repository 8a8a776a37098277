mod pointer;

pub use pointer::Pointer;

use std::fmt::{Debug, Formatter, Result};

const BLANK: &str = "";
const PIPE: &str = "|";
const EQUAL: &str = "=";
const HIGHLIGHT: &str = "^";

/// Describes a type that can illustrate the cause of an error by
/// writing a visualization to a Formatter.
pub trait Visual: Debug {
    /// Write the visualization, weaving in the template name and help
    /// text when they are available.
    fn display(
        &self,
        formatter: &mut Formatter<'_>,
        template: Option<&str>,
        help: Option<&str>,
    ) -> Result;
}

/// Translate a byte offset into a zero indexed line and column over
/// the given lines.
///
/// An offset past the end of the text maps to the end of the last line.
fn get_line_and_column(lines: &[&str], offset: usize) -> (usize, usize) {
    let mut n = 0;

    for (i, line) in lines.iter().enumerate() {
        let len = get_width(line) + 1;
        if n + len > offset {
            return (i, offset - n);
        }
        n += len;
    }

    let length = lines.len();
    let last = lines.last().map(|line| get_width(line)).unwrap_or(0);

    (length, last)
}

/// Return the display width of the given text.
fn get_width(s: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(s)
}
