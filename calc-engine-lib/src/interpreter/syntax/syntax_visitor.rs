use crate::interpreter::operator::{BinaryOperator, UnaryOperator};
use crate::interpreter::syntax::expression_tree::Node;

/// If a method is not implemented, the default implementation will continue in a pre-order
/// traversal of the tree.
pub(crate) trait SyntaxVisitor: Sized {
    fn visit_literal(&mut self, _value: f64) {}
    fn visit_binary_operation(
        &mut self,
        _operator: &BinaryOperator,
        left_operand: &Node,
        right_operand: &Node,
    ) {
        walk_binary_operation(self, left_operand, right_operand)
    }
    fn visit_unary_operation(&mut self, _operator: &UnaryOperator, operand: &Node) {
        walk_unary_operation(self, operand)
    }
    fn visit_function_call(&mut self, _name: &str, arguments: &[Node]) {
        walk_function_call(self, arguments)
    }
}

pub(crate) fn walk_binary_operation(
    visitor: &mut impl SyntaxVisitor,
    left_operand: &Node,
    right_operand: &Node,
) {
    left_operand.accept(visitor);
    right_operand.accept(visitor);
}

pub(crate) fn walk_unary_operation(visitor: &mut impl SyntaxVisitor, operand: &Node) {
    operand.accept(visitor);
}

pub(crate) fn walk_function_call(visitor: &mut impl SyntaxVisitor, arguments: &[Node]) {
    arguments.iter().for_each(|argument| argument.accept(visitor));
}
