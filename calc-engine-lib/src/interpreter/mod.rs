pub mod context;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod operator;
pub mod parser;
pub mod syntax;
pub mod token;

use crate::error::{CalcError, ErrorCode, Result};
use crate::interpreter::context::EvaluationContext;
use crate::interpreter::evaluator::{evaluate, EvaluationResult};
use crate::interpreter::operator::OperatorTable;
use crate::interpreter::parser::{is_unary_position, ParserKind};
use crate::interpreter::token::{Token, TokenKind};
use log::{debug, log_enabled, Level};
use string_builder::Builder;
use syntax::expression_tree::Node;

/// Evaluates the given expression against a context.
///
/// # Arguments
///
/// * `expression`: A text expression in infix format.
/// * `context`: The functions, constants and operators available to the expression.
/// * `kind`: Which parser to use.
///
/// returns: The value of the expression, or the error that prevented it.
///
/// # Examples
///
/// ```
/// use calc_engine::interpreter::calculate;
/// use calc_engine::interpreter::context::EvaluationContext;
/// use calc_engine::interpreter::parser::ParserKind;
///
/// let context = EvaluationContext::default();
/// let result = calculate("10 - 6 / 2", &context, ParserKind::RecursiveDescent);
/// assert_eq!(result.value(), 7.0);
/// ```
pub fn calculate(expression: &str, context: &EvaluationContext, kind: ParserKind) -> EvaluationResult {
    match convert(expression, context.operators(), kind) {
        Ok(tree) => evaluate(&tree, context),
        Err(error) => error.into(),
    }
}

/// Converts the given input string into an equivalent expression tree.
///
/// # Arguments
///
/// * `expression`: The text-representation of the infix expression.
/// * `operators`: The meaning of each operator symbol.
/// * `kind`: Which parser to use.
///
/// returns: The equivalent expression tree.
///
/// # Examples
///
/// ```
/// use calc_engine::interpreter::convert;
/// use calc_engine::interpreter::operator::OperatorTable;
/// use calc_engine::interpreter::parser::ParserKind;
///
/// let tree = convert("1 + 2 * 3", &OperatorTable::default(), ParserKind::ShuntingYard).unwrap();
/// assert_eq!(tree.to_string(), "(1 + (2 * 3))");
/// ```
pub fn convert(expression: &str, operators: &OperatorTable, kind: ParserKind) -> Result<Node> {
    let tokens = lexer::tokenize(expression)?;
    if tokens.iter().all(Token::is_eof) {
        return Err(CalcError::parse("Empty expression", 0));
    }
    debug!("tokens: {}", tokens_to_string(&tokens).unwrap_or_default());

    let expression_tree = parser::parse(&tokens, kind, operators)?;
    if log_enabled!(Level::Debug) {
        let (nodes, depth) = expression_tree.shape();
        debug!(
            "parsed with {} ({} nodes, depth {}): {}",
            kind, nodes, depth, expression_tree
        );
    }
    Ok(expression_tree)
}

/// Pretty-prints the given tokens with normalized whitespace.
///
/// Binary operators are surrounded by spaces, prefix operators are attached to
/// their operand and commas are followed by a space.
///
/// # Arguments
///
/// * `tokens`: The tokens to print.
///
/// returns: A pretty-printed text-version of the given tokens.
///
/// # Examples
///
/// ```
/// use calc_engine::interpreter::lexer::tokenize;
/// use calc_engine::interpreter::tokens_to_string;
///
/// let tokens = tokenize("max(1,-2)*3").unwrap();
/// assert_eq!(tokens_to_string(&tokens).unwrap(), "max(1, -2) * 3");
/// ```
pub fn tokens_to_string(tokens: &[Token]) -> Result<String> {
    let mut builder = Builder::new(tokens.len() * 2);

    for (index, token) in tokens.iter().enumerate() {
        let previous = index.checked_sub(1).map(|i| &tokens[i]);
        match token.kind {
            TokenKind::Operator if !is_unary_position(previous) => {
                builder.append(" ");
                builder.append(token.value.as_str());
                builder.append(" ");
            }
            TokenKind::Comma => builder.append(", "),
            TokenKind::Eof => {}
            _ => builder.append(token.value.as_str()),
        }
    }

    builder
        .string()
        .map_err(|error| CalcError::new(ErrorCode::UnknownError, error.to_string(), 0))
}
