use crate::error::{CalcError, Result};
use crate::interpreter::operator::{BinaryOperator, OperatorTable, UNARY_PRECEDENCE};
use crate::interpreter::parser::{validate_nesting, validate_operators, Parser, ParserKind};
use crate::interpreter::syntax::expression_tree::Node;
use crate::interpreter::token::{Token, TokenKind};

/// Parses in a single pass with one token of lookahead, one function per precedence level.
#[derive(Debug, Default, Copy, Clone)]
pub struct RecursiveDescentParser;

impl Parser for RecursiveDescentParser {
    fn parse(&self, tokens: &[Token], operators: &OperatorTable) -> Result<Node> {
        validate_nesting(tokens, operators)?;
        validate_operators(tokens, operators)?;

        let mut cursor = Cursor::new(tokens, operators);
        if cursor.peek().is_eof() {
            return Err(CalcError::syntax("Empty expression", 0));
        }

        let tree = cursor.parse_expression()?;

        let trailing = cursor.peek();
        if !trailing.is_eof() {
            return Err(CalcError::syntax(
                format!("Unexpected token at end of expression: {}", trailing.value),
                trailing.position,
            ));
        }
        Ok(tree)
    }

    fn kind(&self) -> ParserKind {
        ParserKind::RecursiveDescent
    }
}

// Precedence levels of the binary operators, loosest first.
const BITWISE_OR: u8 = 1;
const BITWISE_XOR: u8 = 2;
const BITWISE_AND: u8 = 3;
const SHIFT: u8 = 4;
const ADDITIVE: u8 = 5;
const MULTIPLICATIVE: u8 = 6;
const POWER: u8 = UNARY_PRECEDENCE;

type ParseLevel<'a> = fn(&mut Cursor<'a>) -> Result<Node>;

struct Cursor<'a> {
    tokens: &'a [Token],
    operators: &'a OperatorTable,
    current: usize,
    eof: Token,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token], operators: &'a OperatorTable) -> Cursor<'a> {
        let end = tokens.last().map_or(0, |token| token.position + token.value.len());
        Cursor {
            tokens,
            operators,
            current: 0,
            eof: Token::eof(end),
        }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.current).unwrap_or(&self.eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !token.is_eof() {
            self.current += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token> {
        if !self.check(kind) {
            let found = self.peek();
            return Err(CalcError::syntax(
                format!("{}, found: {} ({})", message, found, found.kind),
                found.position,
            ));
        }
        Ok(self.advance())
    }

    /// The binary meaning of the current token, if it is an operator of the given level.
    fn binary_at(&self, precedence: u8) -> Option<BinaryOperator> {
        let token = self.peek();
        if !token.is_operator() {
            return None;
        }
        self.operators
            .binary(&token.value)
            .filter(|operator| operator.precedence() == precedence)
    }

    /// Parses `operand (operator operand)*` for one left-associative precedence level.
    fn parse_left_associative(&mut self, precedence: u8, operand: ParseLevel<'a>) -> Result<Node> {
        let mut left = operand(self)?;
        while let Some(operator) = self.binary_at(precedence) {
            let token = self.advance();
            let right = operand(self)?;
            left = Node::new_binary(operator, token, left, right);
        }
        Ok(left)
    }

    fn parse_expression(&mut self) -> Result<Node> {
        self.parse_bitwise_or()
    }

    fn parse_bitwise_or(&mut self) -> Result<Node> {
        self.parse_left_associative(BITWISE_OR, Cursor::parse_bitwise_xor)
    }

    fn parse_bitwise_xor(&mut self) -> Result<Node> {
        self.parse_left_associative(BITWISE_XOR, Cursor::parse_bitwise_and)
    }

    fn parse_bitwise_and(&mut self) -> Result<Node> {
        self.parse_left_associative(BITWISE_AND, Cursor::parse_shift)
    }

    fn parse_shift(&mut self) -> Result<Node> {
        self.parse_left_associative(SHIFT, Cursor::parse_additive)
    }

    // additive ::= term (('+' | '-') term)*
    fn parse_additive(&mut self) -> Result<Node> {
        self.parse_left_associative(ADDITIVE, Cursor::parse_term)
    }

    // term ::= unary (('*' | '/' | '%') unary)*
    fn parse_term(&mut self) -> Result<Node> {
        self.parse_left_associative(MULTIPLICATIVE, Cursor::parse_unary)
    }

    // unary ::= prefix-operator unary | power
    fn parse_unary(&mut self) -> Result<Node> {
        let prefix = self.peek();
        let operator = if prefix.is_operator() {
            self.operators.unary(&prefix.value)
        } else {
            None
        };

        match operator {
            Some(operator) => {
                let token = self.advance();
                let operand = self.parse_unary()?;
                Ok(Node::new_unary(operator, token, operand))
            }
            None => self.parse_power(),
        }
    }

    // power ::= postfix ('^' power-right-side)?
    fn parse_power(&mut self) -> Result<Node> {
        let base = self.parse_postfix()?;
        self.parse_exponent(base)
    }

    fn parse_exponent(&mut self, base: Node) -> Result<Node> {
        match self.binary_at(POWER) {
            Some(operator) => {
                let token = self.advance();
                let exponent = self.parse_power_right_side()?;
                Ok(Node::new_binary(operator, token, base, exponent))
            }
            None => Ok(base),
        }
    }

    /// The right side of `^` may start with a prefix operator, so `2^-3` parses.
    fn parse_power_right_side(&mut self) -> Result<Node> {
        self.parse_unary()
    }

    // postfix ::= primary ('(' arguments? ')')?
    fn parse_postfix(&mut self) -> Result<Node> {
        if !self.check(TokenKind::Function) {
            return self.parse_primary();
        }

        let name = self.advance();
        if !self.check(TokenKind::LeftParentheses) {
            return Ok(Node::new_function_call(name.value, name.position, vec![]));
        }
        self.advance();
        let arguments = self.parse_arguments()?;
        self.expect(
            TokenKind::RightParentheses,
            "Expected ')' after function arguments",
        )?;
        Ok(Node::new_function_call(name.value, name.position, arguments))
    }

    // arguments ::= expression (',' expression)*
    fn parse_arguments(&mut self) -> Result<Vec<Node>> {
        let mut arguments = vec![];
        if self.check(TokenKind::RightParentheses) {
            return Ok(arguments);
        }

        arguments.push(self.parse_expression()?);
        while self.check(TokenKind::Comma) {
            self.advance();
            arguments.push(self.parse_expression()?);
        }
        Ok(arguments)
    }

    // primary ::= NUMBER | '(' expression ')'
    fn parse_primary(&mut self) -> Result<Node> {
        let token = self.peek();
        match token.kind {
            TokenKind::Number => {
                let value = token.numeric_value()?;
                self.advance();
                Ok(Node::new_literal(value))
            }
            TokenKind::LeftParentheses => {
                let open = self.advance();
                if self.check(TokenKind::RightParentheses) {
                    return Err(CalcError::syntax("Empty parentheses", self.peek().position));
                }
                let expression = self.parse_expression()?;
                self.expect(TokenKind::RightParentheses, "Expected ')' after expression")
                    .map_err(|error| error.at(open.position))?;
                Ok(expression)
            }
            _ => Err(CalcError::syntax(
                format!("Expected number, '(', or function, found: {}", token),
                token.position,
            )),
        }
    }
}
