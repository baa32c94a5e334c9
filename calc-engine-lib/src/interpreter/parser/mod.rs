pub mod infix_converter;
mod recursive_descent;
mod shunting_yard;

pub use recursive_descent::RecursiveDescentParser;
pub use shunting_yard::ShuntingYardParser;

use crate::error::{CalcError, Result};
use crate::interpreter::operator::{Associativity, OperatorTable};
use crate::interpreter::syntax::expression_tree::Node;
use crate::interpreter::token::{Token, TokenKind};
use std::fmt;
use std::fmt::Formatter;
use std::str::FromStr;

/// Deepest nesting either parser accepts, counting parentheses, prefix operators
/// and the right sides of `^`.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Turns a token sequence into an expression tree.
///
/// Implementations are stateless, so one instance can parse any number of expressions.
pub trait Parser {
    /// Parses the given tokens into an equivalent expression tree.
    ///
    /// # Arguments
    ///
    /// * `tokens`: The tokens to parse, in infix format, usually ending with an EOF token.
    /// * `operators`: Gives each operator symbol its meaning in the current mode.
    ///
    /// returns: The root of the expression tree.
    fn parse(&self, tokens: &[Token], operators: &OperatorTable) -> Result<Node>;

    fn kind(&self) -> ParserKind;
}

/// The available parsing strategies.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum ParserKind {
    #[default]
    ShuntingYard,
    RecursiveDescent,
}

impl ParserKind {
    pub fn all() -> [ParserKind; 2] {
        [ParserKind::ShuntingYard, ParserKind::RecursiveDescent]
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParserKind::ShuntingYard => f.write_str("shunting-yard"),
            ParserKind::RecursiveDescent => f.write_str("recursive-descent"),
        }
    }
}

impl FromStr for ParserKind {
    type Err = CalcError;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "shunting-yard" | "shunting_yard" | "sy" => Ok(ParserKind::ShuntingYard),
            "recursive-descent" | "recursive_descent" | "rd" => Ok(ParserKind::RecursiveDescent),
            _ => Err(CalcError::parse(format!("Unknown parser: {}", name), 0)),
        }
    }
}

pub fn create_parser(kind: ParserKind) -> Box<dyn Parser> {
    match kind {
        ParserKind::ShuntingYard => Box::new(ShuntingYardParser),
        ParserKind::RecursiveDescent => Box::new(RecursiveDescentParser),
    }
}

/// Parses the given tokens with the chosen strategy.
///
/// # Arguments
///
/// * `tokens`: The tokens to parse, in infix format.
/// * `kind`: Which parser to use.
/// * `operators`: The meaning of each operator symbol.
///
/// returns: The equivalent expression tree.
///
/// # Examples
///
/// ```
/// use calc_engine::interpreter::lexer::tokenize;
/// use calc_engine::interpreter::operator::OperatorTable;
/// use calc_engine::interpreter::parser::{parse, ParserKind};
///
/// let tokens = tokenize("2^3^2").unwrap();
/// let tree = parse(&tokens, ParserKind::RecursiveDescent, &OperatorTable::default()).unwrap();
/// assert_eq!(tree.to_string(), "(2 ^ (3 ^ 2))");
/// ```
pub fn parse(tokens: &[Token], kind: ParserKind, operators: &OperatorTable) -> Result<Node> {
    create_parser(kind).parse(tokens, operators)
}

/// An operator is a prefix operator when nothing that yields a value precedes it.
pub(crate) fn is_unary_position(previous: Option<&Token>) -> bool {
    previous.map_or(true, |previous| !previous.ends_operand())
}

pub(crate) fn unsupported_operator(token: &Token) -> CalcError {
    CalcError::unexpected_token(
        format!("Operator '{}' is not supported in this mode", token.value),
        token.position,
    )
}

/// Rejects unknown characters and operator sequences that neither parser may accept.
///
/// Two operators in a row are only valid when the second one has a prefix meaning,
/// e.g. `5+-3` or `--5`. `1++2` is rejected even though `1+(+2)` is well formed.
pub(crate) fn validate_operators(tokens: &[Token], operators: &OperatorTable) -> Result<()> {
    for (index, token) in tokens.iter().enumerate() {
        if token.kind == TokenKind::Unknown {
            return Err(CalcError::syntax(
                format!("Unexpected character '{}'", token.value),
                token.position,
            ));
        }
        if !token.is_operator() {
            continue;
        }

        let previous = index.checked_sub(1).map(|i| &tokens[i]);
        let follows_operator = previous.map_or(false, Token::is_operator);

        if is_unary_position(previous) {
            if operators.unary(&token.value).is_none() {
                return Err(if follows_operator {
                    CalcError::syntax("Consecutive operators are not allowed", token.position)
                } else if operators.binary(&token.value).is_some() {
                    CalcError::syntax(
                        format!("Missing operand before operator '{}'", token.value),
                        token.position,
                    )
                } else {
                    unsupported_operator(token)
                });
            }
            let after_binary = index
                .checked_sub(2)
                .map_or(false, |i| follows_operator && tokens[i].ends_operand());
            if token.value == "+" && after_binary {
                return Err(CalcError::syntax(
                    "Consecutive operators are not allowed",
                    token.position,
                ));
            }
        } else if operators.binary(&token.value).is_none() {
            return Err(if operators.knows(&token.value) {
                CalcError::syntax(
                    format!("Operator '{}' cannot follow an operand", token.value),
                    token.position,
                )
            } else {
                unsupported_operator(token)
            });
        }

        let operand_follows = tokens.get(index + 1).map_or(false, |next| {
            matches!(
                next.kind,
                TokenKind::Number
                    | TokenKind::Function
                    | TokenKind::LeftParentheses
                    | TokenKind::Operator
            )
        });
        if !operand_follows {
            return Err(CalcError::syntax(
                format!("Missing operand after operator '{}'", token.value),
                token.position,
            ));
        }
    }
    Ok(())
}

/// Rejects input nested deeper than [`MAX_NESTING_DEPTH`].
///
/// Each open parenthesis counts one level. So does every prefix operator and every
/// right-associative operator until an operator of another kind ends the chain,
/// e.g. `--2^-2` is four levels deep. Flat chains such as `1+1+1` do not nest.
pub(crate) fn validate_nesting(tokens: &[Token], operators: &OperatorTable) -> Result<()> {
    // Open prefix and power chain length, one entry per open parenthesis.
    let mut chains: Vec<usize> = vec![0];
    let mut depth: usize = 0;

    for (index, token) in tokens.iter().enumerate() {
        let previous = index.checked_sub(1).map(|i| &tokens[i]);
        match token.kind {
            TokenKind::LeftParentheses => {
                chains.push(0);
                depth += 1;
            }
            TokenKind::RightParentheses if chains.len() > 1 => {
                let chain = chains.pop().unwrap_or_default();
                depth -= chain + 1;
            }
            TokenKind::Comma => {
                if let Some(chain) = chains.last_mut() {
                    depth -= *chain;
                    *chain = 0;
                }
            }
            TokenKind::Operator => {
                let nests = is_unary_position(previous)
                    || operators
                        .binary(&token.value)
                        .map_or(false, |operator| operator.associativity() == Associativity::Right);
                if let Some(chain) = chains.last_mut() {
                    if nests {
                        *chain += 1;
                        depth += 1;
                    } else {
                        depth -= *chain;
                        *chain = 0;
                    }
                }
            }
            _ => {}
        }

        if depth > MAX_NESTING_DEPTH {
            return Err(CalcError::syntax(
                "Expression is nested too deeply",
                token.position,
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::interpreter::lexer::tokenize;
    use parameterized_macro::parameterized;

    fn parse_with(kind: ParserKind, expression: &str, operators: &OperatorTable) -> Result<Node> {
        parse(&tokenize(expression)?, kind, operators)
    }

    #[parameterized(
        expression = {
            "1 + 2 * 3",
            "(2 + 3) * 4 - 6 / 2",
            "10 - 6 / 2",
            "2^3^2",
            "-2^2",
            "2^-3^2",
            "--5",
            "5+-3",
            "-(1 + 2) * 3",
            "max(1, 2 + 3, -4) % 3",
            "sin(PI / 6)",
            "2 * pi",
            "f()",
            "((((1))))",
        }
    )]
    fn both_parsers_build_the_same_tree(expression: &str) {
        let operators = OperatorTable::default();

        let shunting_yard = parse_with(ParserKind::ShuntingYard, expression, &operators).unwrap();
        let recursive_descent =
            parse_with(ParserKind::RecursiveDescent, expression, &operators).unwrap();

        assert_eq!(shunting_yard, recursive_descent);
    }

    #[parameterized(
        expression = {
            "0xFF & 0x0F",
            "1 | 2 ^ 3 & 4 << 5 + 6",
            "~5 & 3",
            "1 << 2 >> 1",
            "-8 >> 1 ^ 2",
        }
    )]
    fn both_parsers_agree_on_bitwise_precedence(expression: &str) {
        let operators = OperatorTable::bitwise();

        let shunting_yard = parse_with(ParserKind::ShuntingYard, expression, &operators).unwrap();
        let recursive_descent =
            parse_with(ParserKind::RecursiveDescent, expression, &operators).unwrap();

        assert_eq!(shunting_yard, recursive_descent);
    }

    #[parameterized(
        expression = {
            "1 ++ 2",
            "1 */ 2",
            "1 +",
            "* 2",
            "(1 + 2",
            "1 + 2)",
            "2 $ 3",
            "max(1,)",
            "1 & 2",
            "",
        },
        code = {
            ErrorCode::InvalidSyntax,
            ErrorCode::InvalidSyntax,
            ErrorCode::InvalidSyntax,
            ErrorCode::InvalidSyntax,
            ErrorCode::InvalidSyntax,
            ErrorCode::InvalidSyntax,
            ErrorCode::InvalidSyntax,
            ErrorCode::InvalidSyntax,
            ErrorCode::UnexpectedToken,
            ErrorCode::InvalidSyntax
        }
    )]
    fn both_parsers_reject_malformed_input(expression: &str, code: ErrorCode) {
        let operators = OperatorTable::default();

        for kind in ParserKind::all() {
            let error = parse_with(kind, expression, &operators).unwrap_err();
            assert_eq!(error.code, code, "{} on {:?}", kind, expression);
        }
    }

    #[test]
    fn disabled_unary_operators_reject_prefix_signs() {
        let mut operators = OperatorTable::default();
        operators.set_unary_enabled(false);

        for kind in ParserKind::all() {
            parse_with(kind, "1 + + 2", &operators).expect_err("Should return Err");
            parse_with(kind, "-1", &operators).expect_err("Should return Err");
            parse_with(kind, "1 - 2", &operators).unwrap();
        }
    }

    #[test]
    fn nesting_beyond_the_limit_is_rejected() {
        let expression = format!(
            "{}1{}",
            "(".repeat(MAX_NESTING_DEPTH + 1),
            ")".repeat(MAX_NESTING_DEPTH + 1)
        );
        let operators = OperatorTable::default();

        for kind in ParserKind::all() {
            let error = parse_with(kind, &expression, &operators).unwrap_err();
            assert_eq!(error.code, ErrorCode::InvalidSyntax);
        }
    }

    #[test]
    fn prefix_and_power_chains_count_as_nesting() {
        let operators = OperatorTable::default();
        let at_limit = format!("{}1", "-".repeat(MAX_NESTING_DEPTH));
        let over_limit = format!("{}1", "-".repeat(MAX_NESTING_DEPTH + 1));
        let mixed = format!("{}({}1)", "-".repeat(64), "2^".repeat(65));
        let power_tower = format!("2{}", "^2".repeat(130));
        let long_negation = format!("{}1", "-".repeat(200));

        for kind in ParserKind::all() {
            parse_with(kind, &at_limit, &operators).unwrap();
            let error = parse_with(kind, &over_limit, &operators).unwrap_err();
            assert_eq!(error.message, "Expression is nested too deeply");
            assert_eq!(error.position, MAX_NESTING_DEPTH);
            for expression in [&mixed, &power_tower, &long_negation] {
                let error = parse_with(kind, expression, &operators).unwrap_err();
                assert_eq!(error.code, ErrorCode::InvalidSyntax);
            }
        }
    }

    #[test]
    fn flat_chains_do_not_nest() {
        let operators = OperatorTable::default();
        let sum = vec!["1"; 5000].join(" + ");
        let alternating = vec!["-1"; 5000].join(" * ");

        for kind in ParserKind::all() {
            parse_with(kind, &sum, &operators).unwrap();
            parse_with(kind, &alternating, &operators).unwrap();
        }
    }

    #[test]
    fn long_prefix_runs_fail_without_overflowing() {
        let expression = format!("{}1", "-".repeat(100_000));
        let operators = OperatorTable::default();

        for kind in ParserKind::all() {
            let error = parse_with(kind, &expression, &operators).unwrap_err();
            assert_eq!(error.code, ErrorCode::InvalidSyntax);
        }
    }

    #[test]
    fn nesting_within_the_limit_is_accepted() {
        let depth = MAX_NESTING_DEPTH / 2;
        let expression = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        let operators = OperatorTable::default();

        for kind in ParserKind::all() {
            assert!(parse_with(kind, &expression, &operators).unwrap().is_literal(1.0));
        }
    }

    #[parameterized(
        name = { "shunting-yard", "RECURSIVE-DESCENT", "rd" },
        expected = { ParserKind::ShuntingYard, ParserKind::RecursiveDescent, ParserKind::RecursiveDescent }
    )]
    fn parser_kind_parses_from_name(name: &str, expected: ParserKind) {
        assert_eq!(name.parse::<ParserKind>().unwrap(), expected);
    }

    #[test]
    fn parser_kind_name_round_trips() {
        for kind in ParserKind::all() {
            assert_eq!(kind.to_string().parse::<ParserKind>().unwrap(), kind);
            assert_eq!(create_parser(kind).kind(), kind);
        }
    }
}
