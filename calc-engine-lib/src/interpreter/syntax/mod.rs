pub mod expression_tree;
pub(crate) mod syntax_visitor;
