#[cfg(not(feature = "std"))]
use alloc::string::String;
use core::fmt;

/// Lexer error, carrying the location of the offending character and a
/// short context snippet inside the message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexerError {
    /// The error message, including a one-line context snippet.
    pub message: String,
    /// The line of the offending character (1-based).
    pub line: u64,
    /// The column of the offending character (1-based).
    pub col: u64,
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at Line: {}, Column {}",
            self.message, self.line, self.col
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LexerError {}

/// The location scanned by the lexer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Location {
    /// Line number (1-based).
    pub line: u64,
    /// Column number (1-based).
    pub column: u64,
}

impl Default for Location {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl Location {
    /// Advances the location over the given character.
    pub fn advance(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    /// Creates a lexer error at this location.
    pub fn into_error(self, message: impl Into<String>) -> LexerError {
        LexerError {
            message: message.into(),
            line: self.line,
            col: self.column,
        }
    }
}
