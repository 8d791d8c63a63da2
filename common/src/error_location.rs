use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FormatResult};
use std::panic::Location as PanicLocation;

/// Source location captured where an error was constructed.
///
/// Stored inside every structured error variant in the workspace so that log
/// lines and serialized errors point at the line that failed, not at the
/// bottom of a `From` chain.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ErrorLocation {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl ErrorLocation {
    /// Capture the caller's location.
    ///
    /// Meant to be used directly in error constructors:
    /// `location: ErrorLocation::here()`.
    #[track_caller]
    pub fn here() -> Self {
        Self::from(PanicLocation::caller())
    }

    pub const fn from(location: &'static PanicLocation<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl Display for ErrorLocation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "[{}:{}:{}]", self.file, self.line, self.column)
    }
}
