use crate::converter::NumberBase;
use crate::error::{CalcError, Result};
use crate::interpreter::token::{Token, TokenKind, OPERATOR_SYMBOLS};

/// Converts an expression into an ordered sequence of tokens, terminated by an EOF token.
///
/// Whitespace is skipped. Characters that cannot start any token become
/// [`TokenKind::Unknown`] tokens, which the parsers reject.
///
/// # Arguments
///
/// * `expression`: The text of the expression, in infix format.
///
/// returns: The tokens of the expression, or a syntax error for a malformed number.
///
/// # Examples
///
/// ```
/// use calc_engine::interpreter::lexer::tokenize;
/// use calc_engine::interpreter::token::TokenKind;
///
/// let tokens = tokenize("0xFF & 15").unwrap();
/// assert_eq!(tokens.len(), 4);
/// assert_eq!(tokens[3].kind, TokenKind::Eof);
/// ```
pub fn tokenize(expression: &str) -> Result<Vec<Token>> {
    Lexer::new(expression).tokenize()
}

struct Lexer {
    characters: Vec<(usize, char)>,
    current: usize,
    length: usize,
}

impl Lexer {
    fn new(expression: &str) -> Lexer {
        Lexer {
            characters: expression.char_indices().collect(),
            current: 0,
            length: expression.len(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek(0) {
            let position = self.position();
            if c.is_whitespace() {
                self.advance();
            } else if c.is_ascii_digit() || (c == '.' && self.peek_is_digit(1)) {
                tokens.push(self.read_number()?);
            } else if c.is_alphabetic() {
                tokens.push(self.read_identifier());
            } else if OPERATOR_SYMBOLS.contains(&c) {
                tokens.push(self.read_operator());
            } else {
                self.advance();
                let kind = match c {
                    '(' => TokenKind::LeftParentheses,
                    ')' => TokenKind::RightParentheses,
                    ',' => TokenKind::Comma,
                    _ => TokenKind::Unknown,
                };
                tokens.push(Token::new(kind, c.to_string(), position));
            }
        }

        tokens.push(Token::eof(self.length));
        Ok(tokens)
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.characters.get(self.current + offset).map(|(_, c)| *c)
    }

    fn peek_is_digit(&self, offset: usize) -> bool {
        self.peek(offset).map_or(false, |c| c.is_ascii_digit())
    }

    fn position(&self) -> usize {
        self.characters
            .get(self.current)
            .map_or(self.length, |(position, _)| *position)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek(0);
        if c.is_some() {
            self.current += 1;
        }
        c
    }

    fn take_while(&mut self, text: &mut String, predicate: impl Fn(char) -> bool) -> usize {
        let mut taken = 0;
        while let Some(c) = self.peek(0).filter(|c| predicate(*c)) {
            text.push(c);
            self.advance();
            taken += 1;
        }
        taken
    }

    fn read_number(&mut self) -> Result<Token> {
        let start = self.position();

        if self.peek(0) == Some('0') {
            if let Some(base) = self.peek(1).and_then(NumberBase::from_prefix_char) {
                return self.read_prefixed_number(start, base);
            }
        }

        let mut number = String::new();
        self.take_while(&mut number, |c| c.is_ascii_digit());

        if self.peek(0) == Some('.') {
            number.push('.');
            self.advance();
            if self.take_while(&mut number, |c| c.is_ascii_digit()) == 0 {
                return Err(CalcError::syntax(
                    "Invalid number format: decimal point without digits",
                    start,
                ));
            }
            if self.peek(0) == Some('.') {
                return Err(CalcError::syntax(
                    "Invalid number format: multiple decimal points",
                    self.position(),
                ));
            }
        }

        if let Some(marker) = self.peek(0).filter(|c| *c == 'e' || *c == 'E') {
            let exponent_start = self.position();
            number.push(marker);
            self.advance();
            if let Some(sign) = self.peek(0).filter(|c| *c == '+' || *c == '-') {
                number.push(sign);
                self.advance();
            }
            if self.take_while(&mut number, |c| c.is_ascii_digit()) == 0 {
                return Err(CalcError::syntax(
                    "Invalid number format: exponent without digits",
                    exponent_start,
                ));
            }
        }

        Ok(Token::number(number, start, NumberBase::Decimal))
    }

    fn read_prefixed_number(&mut self, start: usize, base: NumberBase) -> Result<Token> {
        let mut number = String::new();
        // The `0` and the base character.
        for _ in 0..2 {
            if let Some(c) = self.advance() {
                number.push(c);
            }
        }

        if self.take_while(&mut number, |c| base.is_digit(c)) == 0 {
            return Err(CalcError::syntax(
                format!("Invalid number format: '{}' prefix without digits", number),
                start,
            ));
        }

        Ok(Token::number(number, start, base))
    }

    fn read_identifier(&mut self) -> Token {
        let start = self.position();
        let mut identifier = String::new();
        self.take_while(&mut identifier, |c| c.is_alphanumeric() || c == '_');
        Token::function(identifier, start)
    }

    fn read_operator(&mut self) -> Token {
        let start = self.position();
        let mut symbol = String::new();
        if let Some(c) = self.advance() {
            symbol.push(c);
            if (c == '<' || c == '>') && self.peek(0) == Some(c) {
                symbol.push(c);
                self.advance();
            }
        }
        Token::operator(symbol, start)
    }
}
