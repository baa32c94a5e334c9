use crate::error::{CalcError, Result};
use crate::interpreter::operator::{Associativity, BinaryOperator, OperatorTable, UnaryOperator};
use crate::interpreter::parser::{is_unary_position, unsupported_operator};
use crate::interpreter::token::{Token, TokenKind};
use std::collections::VecDeque;

/// A token of the postfix (reverse polish) output, with operator meanings already resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum PostfixToken {
    Number(Token),
    /// An identifier that is not followed by an argument list.
    Constant(Token),
    Binary(BinaryOperator, Token),
    Unary(UnaryOperator, Token),
    /// A function call; `arg_count` of the token holds the number of arguments.
    Function(Token),
}

#[derive(Debug, Clone, PartialEq)]
enum StackEntry {
    Binary(BinaryOperator, Token),
    Unary(UnaryOperator, Token),
    Function(Token),
    Parenthesis {
        token: Token,
        function_call: bool,
        commas: usize,
    },
}

impl StackEntry {
    fn precedence(&self) -> Option<u8> {
        match self {
            StackEntry::Binary(operator, _) => Some(operator.precedence()),
            StackEntry::Unary(operator, _) => Some(operator.precedence()),
            _ => None,
        }
    }

    fn into_postfix(self) -> Result<PostfixToken> {
        match self {
            StackEntry::Binary(operator, token) => Ok(PostfixToken::Binary(operator, token)),
            StackEntry::Unary(operator, token) => Ok(PostfixToken::Unary(operator, token)),
            StackEntry::Function(token) => Ok(PostfixToken::Function(token)),
            StackEntry::Parenthesis { token, .. } => Err(CalcError::syntax(
                "Unbalanced parentheses: missing closing ')'",
                token.position,
            )),
        }
    }
}

/// Reorders infix tokens into postfix order using the shunting-yard algorithm.
///
/// # Arguments
///
/// * `infix_tokens`: The tokens of the expression, in infix order. A trailing EOF token is optional.
/// * `operators`: Gives each operator symbol its meaning.
///
/// returns: The same operands and operators, ordered in postfix notation.
pub fn infix_to_postfix(
    infix_tokens: &[Token],
    operators: &OperatorTable,
) -> Result<Vec<PostfixToken>> {
    let mut stack: VecDeque<StackEntry> = VecDeque::new();
    let mut output: Vec<PostfixToken> = vec![];

    for (index, token) in infix_tokens.iter().enumerate() {
        let previous = index.checked_sub(1).map(|i| &infix_tokens[i]);
        let next = infix_tokens.get(index + 1);

        match token.kind {
            TokenKind::Number => output.push(PostfixToken::Number(token.clone())),
            TokenKind::Function => {
                if next.map_or(false, |next| next.kind == TokenKind::LeftParentheses) {
                    stack.push_front(StackEntry::Function(token.clone()));
                } else {
                    output.push(PostfixToken::Constant(token.clone()));
                }
            }
            TokenKind::Operator => {
                if is_unary_position(previous) {
                    let operator = operators
                        .unary(&token.value)
                        .ok_or_else(|| unsupported_operator(token))?;
                    stack.push_front(StackEntry::Unary(operator, token.clone()));
                } else {
                    let operator = operators
                        .binary(&token.value)
                        .ok_or_else(|| unsupported_operator(token))?;
                    parse_operator_token(&mut stack, &mut output, operator, token)?;
                }
            }
            TokenKind::LeftParentheses => {
                let function_call =
                    previous.map_or(false, |previous| previous.kind == TokenKind::Function);
                stack.push_front(StackEntry::Parenthesis {
                    token: token.clone(),
                    function_call,
                    commas: 0,
                });
            }
            TokenKind::Comma => parse_comma_token(&mut stack, &mut output, token, previous, next)?,
            TokenKind::RightParentheses => {
                parse_closing_parenthesis_token(&mut stack, &mut output, token, previous)?
            }
            TokenKind::Eof => break,
            TokenKind::Unknown => {
                return Err(CalcError::syntax(
                    format!("Unexpected character '{}'", token.value),
                    token.position,
                ))
            }
        }
    }

    transfer_leftover_operators(&mut stack, &mut output)?;

    Ok(output)
}

fn parse_operator_token(
    stack: &mut VecDeque<StackEntry>,
    output: &mut Vec<PostfixToken>,
    operator: BinaryOperator,
    token: &Token,
) -> Result<()> {
    while let Some(top_precedence) = stack.front().and_then(StackEntry::precedence) {
        let current = operator.precedence();
        let pops = top_precedence > current
            || (top_precedence == current && operator.associativity() == Associativity::Left);
        if !pops {
            break;
        }
        if let Some(entry) = stack.pop_front() {
            output.push(entry.into_postfix()?);
        }
    }

    stack.push_front(StackEntry::Binary(operator, token.clone()));
    Ok(())
}

/// Pops operators onto the output until the nearest open parenthesis, which is left on the stack.
fn pop_until_parenthesis(
    stack: &mut VecDeque<StackEntry>,
    output: &mut Vec<PostfixToken>,
) -> Result<()> {
    while let Some(top) = stack.front() {
        if matches!(top, StackEntry::Parenthesis { .. }) {
            break;
        }
        if let Some(entry) = stack.pop_front() {
            output.push(entry.into_postfix()?);
        }
    }
    Ok(())
}

fn parse_comma_token(
    stack: &mut VecDeque<StackEntry>,
    output: &mut Vec<PostfixToken>,
    token: &Token,
    previous: Option<&Token>,
    next: Option<&Token>,
) -> Result<()> {
    let missing_before = previous.map_or(true, |previous| {
        matches!(
            previous.kind,
            TokenKind::Comma | TokenKind::LeftParentheses | TokenKind::Operator
        )
    });
    let missing_after = next.map_or(true, |next| {
        matches!(
            next.kind,
            TokenKind::Comma | TokenKind::RightParentheses | TokenKind::Eof
        )
    });
    if missing_before || missing_after {
        return Err(CalcError::syntax(
            "Missing function argument",
            token.position,
        ));
    }

    pop_until_parenthesis(stack, output)?;
    match stack.front_mut() {
        Some(StackEntry::Parenthesis {
            function_call: true,
            commas,
            ..
        }) => {
            *commas += 1;
            Ok(())
        }
        _ => Err(CalcError::syntax(
            "Misplaced comma in function arguments",
            token.position,
        )),
    }
}

fn parse_closing_parenthesis_token(
    stack: &mut VecDeque<StackEntry>,
    output: &mut Vec<PostfixToken>,
    token: &Token,
    previous: Option<&Token>,
) -> Result<()> {
    pop_until_parenthesis(stack, output)?;

    let (function_call, commas) = match stack.pop_front() {
        Some(StackEntry::Parenthesis {
            function_call,
            commas,
            ..
        }) => (function_call, commas),
        _ => {
            return Err(CalcError::syntax(
                "Unbalanced parentheses: missing opening '('",
                token.position,
            ))
        }
    };

    let empty = previous.map_or(false, |previous| previous.kind == TokenKind::LeftParentheses);
    if !function_call {
        if empty {
            return Err(CalcError::syntax("Empty parentheses", token.position));
        }
        return Ok(());
    }

    match stack.pop_front() {
        Some(StackEntry::Function(mut function)) => {
            function.arg_count = if empty { 0 } else { commas + 1 };
            output.push(PostfixToken::Function(function));
            Ok(())
        }
        _ => Err(CalcError::syntax(
            "Argument list without a function",
            token.position,
        )),
    }
}

fn transfer_leftover_operators(
    stack: &mut VecDeque<StackEntry>,
    output: &mut Vec<PostfixToken>,
) -> Result<()> {
    while let Some(entry) = stack.pop_front() {
        output.push(entry.into_postfix()?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::NumberBase;
    use crate::interpreter::lexer::tokenize;
    use pretty_assertions::assert_eq;

    /// Renders postfix output compactly, e.g. `1 2 + max/2`.
    fn postfix(expression: &str, operators: &OperatorTable) -> String {
        let tokens = tokenize(expression).unwrap();
        infix_to_postfix(&tokens, operators)
            .unwrap()
            .iter()
            .map(|token| match token {
                PostfixToken::Number(token) | PostfixToken::Constant(token) => token.value.clone(),
                PostfixToken::Binary(operator, _) => format!("{:?}", operator),
                PostfixToken::Unary(operator, _) => format!("u{}", operator),
                PostfixToken::Function(token) => format!("{}/{}", token.value, token.arg_count),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn infix_to_postfix_simple_expression() {
        // x + y
        let infix = vec![
            Token::function("x", 0),
            Token::operator("+", 2),
            Token::function("y", 4),
        ];
        let expected = vec![
            PostfixToken::Constant(Token::function("x", 0)),
            PostfixToken::Constant(Token::function("y", 4)),
            PostfixToken::Binary(BinaryOperator::Add, Token::operator("+", 2)),
        ];

        let actual = infix_to_postfix(&infix, &OperatorTable::default()).unwrap();

        assert_eq!(actual, expected)
    }

    #[test]
    fn infix_to_postfix_simple_parenthesised_expression() {
        // 1 - (2 + 3)
        let infix = vec![
            Token::number("1", 0, NumberBase::Decimal),
            Token::operator("-", 2),
            Token::new(TokenKind::LeftParentheses, "(", 4),
            Token::number("2", 5, NumberBase::Decimal),
            Token::operator("+", 7),
            Token::number("3", 9, NumberBase::Decimal),
            Token::new(TokenKind::RightParentheses, ")", 10),
        ];
        let expected = vec![
            PostfixToken::Number(Token::number("1", 0, NumberBase::Decimal)),
            PostfixToken::Number(Token::number("2", 5, NumberBase::Decimal)),
            PostfixToken::Number(Token::number("3", 9, NumberBase::Decimal)),
            PostfixToken::Binary(BinaryOperator::Add, Token::operator("+", 7)),
            PostfixToken::Binary(BinaryOperator::Subtract, Token::operator("-", 2)),
        ];

        let actual = infix_to_postfix(&infix, &OperatorTable::default()).unwrap();

        assert_eq!(actual, expected)
    }

    #[test]
    fn infix_to_postfix_complex_expression() {
        let actual = postfix("a + b * c / (d - e)^f^g", &OperatorTable::default());

        assert_eq!(
            actual,
            "a b c Multiply d e Subtract f g Exponentiate Exponentiate Divide Add"
        )
    }

    #[test]
    fn unary_minus_binds_looser_than_exponentiation() {
        let actual = postfix("-2^2", &OperatorTable::default());

        assert_eq!(actual, "2 2 Exponentiate u-")
    }

    #[test]
    fn unary_minus_on_exponent_applies_to_the_whole_right_side() {
        let actual = postfix("2^-3^2", &OperatorTable::default());

        assert_eq!(actual, "2 3 2 Exponentiate u- Exponentiate")
    }

    #[test]
    fn function_arguments_are_counted() {
        let operators = OperatorTable::default();

        assert_eq!(postfix("max(1, 2 + 3)", &operators), "1 2 3 Add max/2");
        assert_eq!(postfix("hypot(max(1,2,3), 4)", &operators), "1 2 3 max/3 4 hypot/2");
        assert_eq!(postfix("f()", &operators), "f/0");
    }

    #[test]
    fn bitwise_operators_use_their_own_precedence() {
        let actual = postfix("1 | 2 ^ 3 & 4 << 5 + 6", &OperatorTable::bitwise());

        assert_eq!(
            actual,
            "1 2 3 4 5 6 Add ShiftLeft BitwiseAnd BitwiseXor BitwiseOr"
        )
    }

    #[test]
    fn unsupported_operator_is_unexpected_token() {
        let tokens = tokenize("1 & 2").unwrap();

        let error = infix_to_postfix(&tokens, &OperatorTable::arithmetic()).unwrap_err();

        assert_eq!(error.code, crate::error::ErrorCode::UnexpectedToken);
        assert_eq!(error.position, 2);
    }

    #[test]
    fn comma_outside_of_call_is_rejected() {
        let tokens = tokenize("(1, 2)").unwrap();

        let error = infix_to_postfix(&tokens, &OperatorTable::default()).unwrap_err();

        assert_eq!(error.message, "Misplaced comma in function arguments");
        assert_eq!(error.position, 2);
    }

    #[test]
    fn trailing_comma_is_rejected() {
        let tokens = tokenize("max(1,)").unwrap();

        let error = infix_to_postfix(&tokens, &OperatorTable::default()).unwrap_err();

        assert_eq!(error.message, "Missing function argument");
    }

    #[test]
    fn unclosed_parenthesis_is_reported_at_the_parenthesis() {
        let tokens = tokenize("2 * (1 + 2").unwrap();

        let error = infix_to_postfix(&tokens, &OperatorTable::default()).unwrap_err();

        assert_eq!(error.position, 4);
    }

    fn operator_token(symbol: &str, position: usize) -> Token {
        Token::new(TokenKind::Operator, symbol, position)
    }

    #[test]
    fn popping_stops_at_the_nearest_parenthesis() {
        let mut stack = VecDeque::from(vec![
            StackEntry::Binary(BinaryOperator::Add, operator_token("+", 4)),
            StackEntry::Unary(UnaryOperator::Negate, operator_token("-", 2)),
            StackEntry::Parenthesis {
                token: Token::new(TokenKind::LeftParentheses, "(", 1),
                function_call: false,
                commas: 0,
            },
            StackEntry::Binary(BinaryOperator::Multiply, operator_token("*", 0)),
        ]);
        let mut output = vec![];

        pop_until_parenthesis(&mut stack, &mut output).unwrap();

        assert_eq!(output.len(), 2);
        assert!(matches!(output[0], PostfixToken::Binary(BinaryOperator::Add, _)));
        assert!(matches!(output[1], PostfixToken::Unary(UnaryOperator::Negate, _)));
        assert_eq!(stack.len(), 2);
        assert!(matches!(stack.front(), Some(StackEntry::Parenthesis { .. })));
    }

    #[test]
    fn binary_operator_pops_tighter_operators_up_to_the_parenthesis() {
        let mut stack = VecDeque::from(vec![
            StackEntry::Binary(BinaryOperator::Multiply, operator_token("*", 3)),
            StackEntry::Parenthesis {
                token: Token::new(TokenKind::LeftParentheses, "(", 0),
                function_call: false,
                commas: 0,
            },
        ]);
        let mut output = vec![];

        parse_operator_token(&mut stack, &mut output, BinaryOperator::Add, &operator_token("+", 5))
            .unwrap();

        assert_eq!(output.len(), 1);
        assert!(matches!(output[0], PostfixToken::Binary(BinaryOperator::Multiply, _)));
        assert!(matches!(stack.front(), Some(StackEntry::Binary(BinaryOperator::Add, _))));
        assert_eq!(stack.len(), 2);
    }
}
