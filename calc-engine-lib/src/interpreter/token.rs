use crate::converter;
use crate::converter::NumberBase;
use crate::error::{CalcError, ErrorCode, Result};
use std::fmt;
use std::fmt::Formatter;

/// The lexical category of a token.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Number,
    Operator,
    /// An identifier; function names and constants share this kind.
    Function,
    LeftParentheses,
    RightParentheses,
    Comma,
    Eof,
    Unknown,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Number => "NUMBER",
            TokenKind::Operator => "OPERATOR",
            TokenKind::Function => "FUNCTION",
            TokenKind::LeftParentheses => "LPAREN",
            TokenKind::RightParentheses => "RPAREN",
            TokenKind::Comma => "COMMA",
            TokenKind::Eof => "EOF",
            TokenKind::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// A discrete part of an expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    /// Byte offset of the first character of the token in the source.
    pub position: usize,
    /// Number of arguments of a function call. Filled in by the parser.
    pub arg_count: usize,
    pub base: NumberBase,
}

pub static OPERATOR_SYMBOLS: [char; 11] = ['+', '-', '*', '/', '^', '%', '&', '|', '~', '<', '>'];

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, position: usize) -> Token {
        Token {
            kind,
            value: value.into(),
            position,
            arg_count: 0,
            base: NumberBase::Decimal,
        }
    }

    pub fn number(value: impl Into<String>, position: usize, base: NumberBase) -> Token {
        Token {
            base,
            ..Token::new(TokenKind::Number, value, position)
        }
    }

    pub fn operator(symbol: impl Into<String>, position: usize) -> Token {
        Token::new(TokenKind::Operator, symbol, position)
    }

    pub fn function(name: impl Into<String>, position: usize) -> Token {
        Token::new(TokenKind::Function, name, position)
    }

    pub fn eof(position: usize) -> Token {
        Token::new(TokenKind::Eof, "", position)
    }

    pub fn is_operator(&self) -> bool {
        self.kind == TokenKind::Operator
    }

    pub fn is_number(&self) -> bool {
        self.kind == TokenKind::Number
    }

    pub fn is_function(&self) -> bool {
        self.kind == TokenKind::Function
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.is_operator() && self.value == symbol
    }

    /// A 'value' is a token that either represents or produces a numerical value
    /// without consuming an operand, e.g. a literal, an identifier or a closing parenthesis.
    pub fn ends_operand(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Number | TokenKind::Function | TokenKind::RightParentheses
        )
    }

    /// Converts a number token, in whichever base it was written, to its value.
    pub fn numeric_value(&self) -> Result<f64> {
        if !self.is_number() {
            return Err(CalcError::unexpected_token(
                format!("Expected a number, found {} '{}'", self.kind, self.value),
                self.position,
            ));
        }

        match self.base {
            NumberBase::Decimal => self.value.parse::<f64>().map_err(|_| {
                CalcError::syntax(format!("Invalid number: {}", self.value), self.position)
            }),
            base => {
                let digits = self.value.get(2..).unwrap_or_default();
                converter::from_base(digits, base.radix())
                    .map(|value| value as f64)
                    .map_err(|error| {
                        let code = match error.code {
                            ErrorCode::NumericOverflow => ErrorCode::NumericOverflow,
                            _ => ErrorCode::InvalidSyntax,
                        };
                        CalcError::new(
                            code,
                            format!("Invalid number {}: {}", self.value, error.message),
                            self.position,
                        )
                    })
            }
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of input"),
            _ => write!(f, "{}", self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_number_converts_to_value() {
        let token = Token::number("2.5e2", 0, NumberBase::Decimal);
        assert_eq!(token.numeric_value().unwrap(), 250.0);
    }

    #[test]
    fn prefixed_number_converts_through_its_base() {
        assert_eq!(
            Token::number("0xFF", 0, NumberBase::Hexadecimal)
                .numeric_value()
                .unwrap(),
            255.0
        );
        assert_eq!(
            Token::number("0B1010", 0, NumberBase::Binary)
                .numeric_value()
                .unwrap(),
            10.0
        );
        assert_eq!(
            Token::number("0o17", 0, NumberBase::Octal)
                .numeric_value()
                .unwrap(),
            15.0
        );
    }

    #[test]
    fn oversized_hex_literal_is_overflow() {
        let token = Token::number("0x1FFFFFFFFFFFFFFFF", 4, NumberBase::Hexadecimal);
        let error = token.numeric_value().unwrap_err();
        assert_eq!(error.code, ErrorCode::NumericOverflow);
        assert_eq!(error.position, 4);
    }

    #[test]
    fn tokens_compare_by_value() {
        assert_eq!(Token::operator("+", 1), Token::operator("+", 1));
        assert_ne!(Token::operator("+", 1), Token::operator("+", 2));
        assert_ne!(Token::operator("+", 1), Token::operator("-", 1));
    }

    #[test]
    fn kind_displays_upper_case_name() {
        assert_eq!(TokenKind::LeftParentheses.to_string(), "LPAREN");
        assert_eq!(TokenKind::Eof.to_string(), "EOF");
    }
}
