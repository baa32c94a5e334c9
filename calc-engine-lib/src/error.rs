use std::fmt;
use std::fmt::Formatter;

/// Classifies every failure the engine can report.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidSyntax,
    UnexpectedToken,
    DivisionByZero,
    InvalidFunction,
    DomainError,
    NumericOverflow,
    NumericUnderflow,
    InvalidBase,
    ParseError,
    EvaluationError,
    UnknownError,
}

impl ErrorCode {
    /// Whether the code is produced before evaluation starts (tokenizing or parsing).
    pub fn is_syntax_stage(&self) -> bool {
        matches!(
            self,
            ErrorCode::InvalidSyntax | ErrorCode::UnexpectedToken | ErrorCode::ParseError
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::InvalidSyntax => "Invalid Syntax",
            ErrorCode::UnexpectedToken => "Unexpected Token",
            ErrorCode::DivisionByZero => "Division by Zero",
            ErrorCode::InvalidFunction => "Invalid Function",
            ErrorCode::DomainError => "Domain Error",
            ErrorCode::NumericOverflow => "Overflow",
            ErrorCode::NumericUnderflow => "Underflow",
            ErrorCode::InvalidBase => "Invalid Base",
            ErrorCode::ParseError => "Parse Error",
            ErrorCode::EvaluationError => "Evaluation Error",
            ErrorCode::UnknownError => "Unknown Error",
        };
        f.write_str(name)
    }
}

/// A failure somewhere in the pipeline, carrying the byte offset it originated from.
///
/// A `position` of 0 means the error is not tied to a meaningful location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalcError {
    pub code: ErrorCode,
    pub message: String,
    pub position: usize,
}

pub type Result<T> = std::result::Result<T, CalcError>;

impl CalcError {
    pub fn new(code: ErrorCode, message: impl Into<String>, position: usize) -> CalcError {
        CalcError {
            code,
            message: message.into(),
            position,
        }
    }

    pub fn syntax(message: impl Into<String>, position: usize) -> CalcError {
        Self::new(ErrorCode::InvalidSyntax, message, position)
    }

    pub fn unexpected_token(message: impl Into<String>, position: usize) -> CalcError {
        Self::new(ErrorCode::UnexpectedToken, message, position)
    }

    pub fn parse(message: impl Into<String>, position: usize) -> CalcError {
        Self::new(ErrorCode::ParseError, message, position)
    }

    pub fn division_by_zero(position: usize) -> CalcError {
        Self::new(ErrorCode::DivisionByZero, "Division by zero", position)
    }

    pub fn domain(message: impl Into<String>, position: usize) -> CalcError {
        Self::new(ErrorCode::DomainError, message, position)
    }

    pub fn overflow(position: usize) -> CalcError {
        Self::new(ErrorCode::NumericOverflow, "Numeric overflow", position)
    }

    pub fn underflow(position: usize) -> CalcError {
        Self::new(ErrorCode::NumericUnderflow, "Numeric underflow", position)
    }

    pub fn invalid_function(message: impl Into<String>, position: usize) -> CalcError {
        Self::new(ErrorCode::InvalidFunction, message, position)
    }

    pub fn invalid_base(message: impl Into<String>) -> CalcError {
        Self::new(ErrorCode::InvalidBase, message, 0)
    }

    pub fn evaluation(message: impl Into<String>, position: usize) -> CalcError {
        Self::new(ErrorCode::EvaluationError, message, position)
    }

    /// Fills in `position` if the error does not carry one yet.
    pub fn at(mut self, position: usize) -> CalcError {
        if self.position == 0 {
            self.position = position;
        }
        self
    }
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if self.position > 0 {
            write!(f, " (position {})", self.position)?;
        }
        Ok(())
    }
}

impl std::error::Error for CalcError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position_only_when_meaningful() {
        let located = CalcError::division_by_zero(3);
        let unlocated = CalcError::parse("Empty expression", 0);

        assert_eq!(located.to_string(), "[Division by Zero] Division by zero (position 3)");
        assert_eq!(unlocated.to_string(), "[Parse Error] Empty expression");
    }

    #[test]
    fn at_does_not_overwrite_existing_position() {
        let error = CalcError::domain("sqrt argument must be non-negative", 5).at(9);
        assert_eq!(error.position, 5);

        let error = CalcError::domain("sqrt argument must be non-negative", 0).at(9);
        assert_eq!(error.position, 9);
    }

    #[test]
    fn syntax_stage_codes_are_classified() {
        assert!(ErrorCode::InvalidSyntax.is_syntax_stage());
        assert!(ErrorCode::ParseError.is_syntax_stage());
        assert!(!ErrorCode::DivisionByZero.is_syntax_stage());
        assert!(!ErrorCode::InvalidBase.is_syntax_stage());
    }
}
