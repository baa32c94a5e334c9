use crate::error::{CalcError, Result};
use crate::interpreter::operator::OperatorTable;
use crate::interpreter::parser::infix_converter::infix_to_postfix;
use crate::interpreter::parser::{validate_nesting, validate_operators, Parser, ParserKind};
use crate::interpreter::syntax::expression_tree;
use crate::interpreter::syntax::expression_tree::Node;
use crate::interpreter::token::{Token, TokenKind};
use log::trace;

/// Parses in two passes: infix to postfix, then postfix to tree.
#[derive(Debug, Default, Copy, Clone)]
pub struct ShuntingYardParser;

impl Parser for ShuntingYardParser {
    fn parse(&self, tokens: &[Token], operators: &OperatorTable) -> Result<Node> {
        validate_nesting(tokens, operators)?;
        validate_parentheses(tokens)?;
        validate_operators(tokens, operators)?;

        let postfix_tokens = infix_to_postfix(tokens, operators)?;
        trace!("postfix: {:?}", postfix_tokens);

        expression_tree::new_tree(postfix_tokens)
    }

    fn kind(&self) -> ParserKind {
        ParserKind::ShuntingYard
    }
}

fn validate_parentheses(tokens: &[Token]) -> Result<()> {
    let mut depth: usize = 0;
    for token in tokens {
        match token.kind {
            TokenKind::LeftParentheses => depth += 1,
            TokenKind::RightParentheses => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    CalcError::syntax(
                        "Unbalanced parentheses: too many closing ')'",
                        token.position,
                    )
                })?;
            }
            _ => {}
        }
    }

    if depth > 0 {
        let position = tokens.last().map_or(0, |token| token.position);
        return Err(CalcError::syntax(
            "Unbalanced parentheses: missing closing ')'",
            position,
        ));
    }
    Ok(())
}
