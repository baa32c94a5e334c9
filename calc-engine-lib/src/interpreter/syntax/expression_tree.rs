use crate::error::{CalcError, Result};
use crate::interpreter::operator::{BinaryOperator, UnaryOperator};
use crate::interpreter::parser::infix_converter::PostfixToken;
use crate::interpreter::syntax::syntax_visitor::{
    walk_binary_operation, walk_function_call, walk_unary_operation, SyntaxVisitor,
};
use crate::interpreter::token::Token;
use itertools::Itertools;
use ptree::{write_tree, TreeBuilder};
use std::fmt::{Display, Formatter};
use std::{fmt, mem};

/// Trees deeper than this are printed in infix form by [`Node::to_tree_string`].
const MAX_TREE_STRING_DEPTH: usize = 256;

/// A node of a parsed expression. Every node exclusively owns its children.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    // Terminal symbols (leaves)
    Literal(f64),
    // Non-terminal symbols (non-leaves)
    BinaryOperation {
        operator: BinaryOperator,
        token: Token,
        left_operand: Box<Node>,
        right_operand: Box<Node>,
    },
    UnaryOperation {
        operator: UnaryOperator,
        token: Token,
        operand: Box<Node>,
    },
    /// A call of a builtin function. Constants are calls without arguments.
    FunctionCall {
        name: String,
        position: usize,
        arguments: Vec<Node>,
    },
}

impl Node {
    pub fn new_literal(value: f64) -> Node {
        Node::Literal(value)
    }

    pub fn new_binary(
        operator: BinaryOperator,
        token: Token,
        left_operand: Node,
        right_operand: Node,
    ) -> Node {
        Node::BinaryOperation {
            operator,
            token,
            left_operand: Box::new(left_operand),
            right_operand: Box::new(right_operand),
        }
    }

    pub fn new_unary(operator: UnaryOperator, token: Token, operand: Node) -> Node {
        Node::UnaryOperation {
            operator,
            token,
            operand: Box::new(operand),
        }
    }

    pub fn new_function_call(name: impl Into<String>, position: usize, arguments: Vec<Node>) -> Node {
        Node::FunctionCall {
            name: name.into(),
            position,
            arguments,
        }
    }

    pub fn is_literal(&self, compare_to: f64) -> bool {
        match self {
            Node::Literal(value) => *value == compare_to,
            _ => false,
        }
    }

    pub fn as_binary_operator(&self) -> Option<BinaryOperator> {
        match self {
            Node::BinaryOperation { operator, .. } => Some(*operator),
            _ => None,
        }
    }

    /// The source position the node originates from, 0 for literals.
    pub fn position(&self) -> usize {
        match self {
            Node::Literal(_) => 0,
            Node::BinaryOperation { token, .. } | Node::UnaryOperation { token, .. } => {
                token.position
            }
            Node::FunctionCall { position, .. } => *position,
        }
    }

    /// Splits a chain of binary operations along the left operands, e.g. `1 - 2 + 3`
    /// into `1` and the steps `- 2`, `+ 3`, in evaluation order.
    pub(crate) fn left_spine(&self) -> (&Node, Vec<(BinaryOperator, &Token, &Node)>) {
        let mut steps = Vec::new();
        let mut node = self;
        while let Node::BinaryOperation {
            operator,
            token,
            left_operand,
            right_operand,
        } = node
        {
            steps.push((*operator, token, &**right_operand));
            node = &**left_operand;
        }
        steps.reverse();
        (node, steps)
    }

    /// The number of nodes in the tree and the length of its longest path.
    pub fn shape(&self) -> (usize, usize) {
        let mut nodes = 0;
        let mut deepest = 0;
        let mut pending: Vec<(&Node, usize)> = vec![(self, 1)];
        while let Some((node, depth)) = pending.pop() {
            nodes += 1;
            deepest = deepest.max(depth);
            match node {
                Node::Literal(_) => {}
                Node::BinaryOperation {
                    left_operand,
                    right_operand,
                    ..
                } => {
                    pending.push((&**left_operand, depth + 1));
                    pending.push((&**right_operand, depth + 1));
                }
                Node::UnaryOperation { operand, .. } => pending.push((&**operand, depth + 1)),
                Node::FunctionCall { arguments, .. } => {
                    pending.extend(arguments.iter().map(|argument| (argument, depth + 1)))
                }
            }
        }
        (nodes, deepest)
    }

    /// Calls the correct visitor method for the node variant on the given visitor.
    pub(crate) fn accept(&self, visitor: &mut impl SyntaxVisitor) {
        match self {
            Node::Literal(value) => visitor.visit_literal(*value),
            Node::BinaryOperation {
                operator,
                left_operand,
                right_operand,
                ..
            } => visitor.visit_binary_operation(operator, left_operand, right_operand),
            Node::UnaryOperation {
                operator, operand, ..
            } => visitor.visit_unary_operation(operator, operand),
            Node::FunctionCall {
                name, arguments, ..
            } => visitor.visit_function_call(name, arguments),
        }
    }

    /// Renders the tree as indented text, one node per line.
    ///
    /// Very deep trees, such as long sums, fall back to the infix form of [`Display`].
    pub fn to_tree_string(&self) -> String {
        if self.shape().1 > MAX_TREE_STRING_DEPTH {
            return self.to_string();
        }
        let mut visitor = TreeBuilderVisitor {
            builder: TreeBuilder::new("expression".into()),
        };
        self.accept(&mut visitor);

        let mut buffer: Vec<u8> = Vec::new();
        if write_tree(&visitor.builder.build(), &mut buffer).is_err() {
            return self.to_string();
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

/// Fully parenthesized infix form, e.g. `(2 + (3 * 4))`.
impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Node::Literal(value) => write!(f, "{}", value),
            Node::BinaryOperation { .. } => {
                let (leftmost, steps) = self.left_spine();
                for _ in &steps {
                    f.write_str("(")?;
                }
                write!(f, "{}", leftmost)?;
                for (operator, _, right_operand) in steps {
                    write!(f, " {} {})", operator, right_operand)?;
                }
                Ok(())
            }
            Node::UnaryOperation {
                operator, operand, ..
            } => write!(f, "({}{})", operator, operand),
            Node::FunctionCall {
                name, arguments, ..
            } => write!(f, "{}({})", name, arguments.iter().join(", ")),
        }
    }
}

/// Children are moved onto a heap stack first, so dropping a long chain cannot
/// exhaust the call stack.
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(self, &mut pending);
        while let Some(mut node) = pending.pop() {
            detach_children(&mut node, &mut pending);
        }
    }
}

fn detach_children(node: &mut Node, pending: &mut Vec<Node>) {
    match node {
        Node::Literal(_) => {}
        Node::BinaryOperation {
            left_operand,
            right_operand,
            ..
        } => {
            detach(left_operand, pending);
            detach(right_operand, pending);
        }
        Node::UnaryOperation { operand, .. } => detach(operand, pending),
        Node::FunctionCall { arguments, .. } => pending.append(arguments),
    }
}

fn detach(child: &mut Node, pending: &mut Vec<Node>) {
    if !matches!(child, Node::Literal(_)) {
        pending.push(mem::replace(child, Node::Literal(0.0)));
    }
}

struct TreeBuilderVisitor {
    builder: TreeBuilder,
}

impl SyntaxVisitor for TreeBuilderVisitor {
    fn visit_literal(&mut self, value: f64) {
        self.builder.add_empty_child(format!("{}", value));
    }
    fn visit_binary_operation(
        &mut self,
        operator: &BinaryOperator,
        left_operand: &Node,
        right_operand: &Node,
    ) {
        self.builder.begin_child(format!("{} ({:?})", operator, operator));
        walk_binary_operation(self, left_operand, right_operand);
        self.builder.end_child();
    }
    fn visit_unary_operation(&mut self, operator: &UnaryOperator, operand: &Node) {
        self.builder.begin_child(format!("{} ({:?})", operator, operator));
        walk_unary_operation(self, operand);
        self.builder.end_child();
    }
    fn visit_function_call(&mut self, name: &str, arguments: &[Node]) {
        if arguments.is_empty() {
            self.builder.add_empty_child(name.to_string());
            return;
        }
        self.builder.begin_child(format!("{}()", name));
        walk_function_call(self, arguments);
        self.builder.end_child();
    }
}

/// Generates an expression tree based off of the given tokens.
///
/// # Arguments
///
/// * `postfix_tokens`: Tokens, ordered in postfix notation, to convert to an expression tree.
///
/// returns: The root of the generated expression tree.
pub fn new_tree(postfix_tokens: Vec<PostfixToken>) -> Result<Node> {
    let mut operands: Vec<Node> = Vec::new();

    for token in postfix_tokens {
        match token {
            PostfixToken::Number(token) => operands.push(Node::new_literal(token.numeric_value()?)),
            PostfixToken::Constant(token) => {
                operands.push(Node::new_function_call(token.value, token.position, vec![]))
            }
            PostfixToken::Unary(operator, token) => {
                let operand = operands.pop().ok_or_else(|| {
                    CalcError::unexpected_token(
                        format!("Missing operand for unary operator '{}'", token.value),
                        token.position,
                    )
                })?;
                operands.push(Node::new_unary(operator, token, operand));
            }
            PostfixToken::Binary(operator, token) => {
                let missing_operand = || {
                    CalcError::unexpected_token(
                        format!("Not enough operands for operator '{}'", token.value),
                        token.position,
                    )
                };
                let right_operand = operands.pop().ok_or_else(missing_operand)?;
                let left_operand = operands.pop().ok_or_else(missing_operand)?;
                operands.push(Node::new_binary(operator, token, left_operand, right_operand));
            }
            PostfixToken::Function(token) => {
                if operands.len() < token.arg_count {
                    return Err(CalcError::unexpected_token(
                        format!("Not enough arguments for function: {}", token.value),
                        token.position,
                    ));
                }
                let arguments = operands.split_off(operands.len() - token.arg_count);
                operands.push(Node::new_function_call(token.value, token.position, arguments));
            }
        }
    }

    let root = operands
        .pop()
        .ok_or_else(|| CalcError::syntax("Empty expression", 0))?;
    if !operands.is_empty() {
        return Err(CalcError::unexpected_token(
            "Too many operands in expression",
            0,
        ));
    }
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::NumberBase;
    use pretty_assertions::assert_eq;

    fn number(value: &str) -> PostfixToken {
        PostfixToken::Number(Token::number(value, 0, NumberBase::Decimal))
    }

    fn binary(operator: BinaryOperator) -> PostfixToken {
        PostfixToken::Binary(operator, Token::operator(operator.symbol(), 0))
    }

    #[test]
    fn simple_expression_returns_correct_tree() {
        // 1 + 2 (but in postfix notation)
        let tokens = vec![number("1"), number("2"), binary(BinaryOperator::Add)];
        let expected_tree = create_simple_tree();

        let actual_tree = new_tree(tokens).unwrap();

        assert_eq!(actual_tree, expected_tree);
    }

    #[test]
    fn complex_expression_returns_correct_tree() {
        // 1 + ((2 + 3) * 4) (but in postfix notation)
        let tokens = vec![
            number("1"),
            number("2"),
            number("3"),
            binary(BinaryOperator::Add),
            number("4"),
            binary(BinaryOperator::Multiply),
            binary(BinaryOperator::Add),
        ];
        let expected_tree = create_complex_tree();

        let actual_tree = new_tree(tokens).unwrap();

        assert_eq!(actual_tree, expected_tree);
    }

    #[test]
    fn function_takes_its_argument_count_in_order() {
        let mut max = Token::function("max", 0);
        max.arg_count = 2;
        let tokens = vec![number("1"), number("2"), PostfixToken::Function(max)];

        let tree = new_tree(tokens).unwrap();

        assert_eq!(
            tree,
            Node::new_function_call("max", 0, vec![Node::new_literal(1.0), Node::new_literal(2.0)])
        );
    }

    #[test]
    fn missing_operand_is_unexpected_token() {
        let tokens = vec![number("1"), binary(BinaryOperator::Add)];

        let error = new_tree(tokens).unwrap_err();

        assert_eq!(error.code, crate::error::ErrorCode::UnexpectedToken);
        assert_eq!(error.message, "Not enough operands for operator '+'");
    }

    #[test]
    fn operator_without_any_operand_is_unexpected_token() {
        let tokens = vec![binary(BinaryOperator::Multiply)];

        let error = new_tree(tokens).unwrap_err();

        assert_eq!(error.message, "Not enough operands for operator '*'");
    }

    #[test]
    fn shape_counts_nodes_and_depth() {
        // 1 + (2 + 3) * max(4, -5)
        let negated = Node::new_unary(
            UnaryOperator::Negate,
            Token::operator("-", 0),
            Node::new_literal(5.0),
        );
        let max = Node::new_function_call("max", 0, vec![Node::new_literal(4.0), negated]);
        let inner_sum = Node::new_binary(
            BinaryOperator::Add,
            Token::operator("+", 0),
            Node::new_literal(2.0),
            Node::new_literal(3.0),
        );
        let product = Node::new_binary(
            BinaryOperator::Multiply,
            Token::operator("*", 0),
            inner_sum,
            max,
        );
        let tree = Node::new_binary(
            BinaryOperator::Add,
            Token::operator("+", 0),
            Node::new_literal(1.0),
            product,
        );

        assert_eq!(tree.shape(), (10, 5));
    }

    #[test]
    fn left_spine_lists_steps_in_evaluation_order() {
        // (1 - 2) + 3
        let difference = Node::new_binary(
            BinaryOperator::Subtract,
            Token::operator("-", 2),
            Node::new_literal(1.0),
            Node::new_literal(2.0),
        );
        let tree = Node::new_binary(
            BinaryOperator::Add,
            Token::operator("+", 6),
            difference,
            Node::new_literal(3.0),
        );

        let (leftmost, steps) = tree.left_spine();

        assert!(leftmost.is_literal(1.0));
        let operators: Vec<BinaryOperator> = steps.iter().map(|(operator, ..)| *operator).collect();
        assert_eq!(operators, vec![BinaryOperator::Subtract, BinaryOperator::Add]);
        assert_eq!(steps[1].1.position, 6);
        assert!(steps[1].2.is_literal(3.0));
    }

    fn long_sum(terms: usize) -> Node {
        (1..terms).fold(Node::new_literal(1.0), |sum, _| {
            Node::new_binary(
                BinaryOperator::Add,
                Token::operator("+", 0),
                sum,
                Node::new_literal(1.0),
            )
        })
    }

    #[test]
    fn long_chains_are_displayed_and_dropped_without_recursing() {
        let tree = long_sum(100_000);

        let printed = tree.to_string();

        assert_eq!(tree.shape(), (199_999, 100_000));
        assert_eq!(printed.matches('(').count(), 99_999);
        assert!(printed.trim_start_matches('(').starts_with("1 + 1) + 1) + 1)"));
        assert!(printed.ends_with(" + 1) + 1)"));
        drop(tree);
    }

    #[test]
    fn deep_trees_are_printed_in_infix_form() {
        let tree = long_sum(1000);

        assert_eq!(tree.to_tree_string(), tree.to_string());
    }

    #[test]
    fn leftover_operands_are_rejected() {
        let tokens = vec![number("1"), number("2")];

        new_tree(tokens).expect_err("Should return Err");
    }

    #[test]
    fn display_is_fully_parenthesized() {
        let tree = create_complex_tree();

        assert_eq!(tree.to_string(), "(1 + ((2 + 3) * 4))");
    }

    #[test]
    fn display_renders_unary_and_calls() {
        let tree = Node::new_unary(
            UnaryOperator::Negate,
            Token::operator("-", 0),
            Node::new_function_call("max", 1, vec![Node::new_literal(1.0), Node::new_literal(2.5)]),
        );

        assert_eq!(tree.to_string(), "(-max(1, 2.5))");
    }

    #[test]
    fn tree_string_lists_every_node() {
        let tree = create_complex_tree();

        let printed = tree.to_tree_string();

        assert!(printed.starts_with("expression"));
        for label in ["Add", "Multiply", "1", "2", "3", "4"] {
            assert!(printed.contains(label), "missing {} in {}", label, printed);
        }
    }

    #[test]
    fn cloned_tree_is_equal_and_independent() {
        let tree = create_complex_tree();
        let clone = tree.clone();

        assert_eq!(tree, clone);
        drop(tree);
        assert_eq!(clone.to_string(), "(1 + ((2 + 3) * 4))");
    }

    fn create_simple_tree() -> Node {
        Node::new_binary(
            BinaryOperator::Add,
            Token::operator("+", 0),
            Node::new_literal(1.0),
            Node::new_literal(2.0),
        )
    }

    fn create_complex_tree() -> Node {
        let inner_sum = Node::new_binary(
            BinaryOperator::Add,
            Token::operator("+", 0),
            Node::new_literal(2.0),
            Node::new_literal(3.0),
        );
        let product = Node::new_binary(
            BinaryOperator::Multiply,
            Token::operator("*", 0),
            inner_sum,
            Node::new_literal(4.0),
        );
        Node::new_binary(
            BinaryOperator::Add,
            Token::operator("+", 0),
            Node::new_literal(1.0),
            product,
        )
    }
}
