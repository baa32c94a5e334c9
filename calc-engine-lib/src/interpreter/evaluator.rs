use crate::error::{CalcError, ErrorCode, Result};
use crate::interpreter::context::EvaluationContext;
use crate::interpreter::operator::{BinaryOperator, UnaryOperator};
use crate::interpreter::syntax::expression_tree::Node;
use std::fmt;
use std::fmt::Formatter;

/// Deepest nesting the evaluator walks before giving up. Chains of binary operations
/// along their left operands, such as long sums, are walked in a loop and do not count.
pub const MAX_EVALUATION_DEPTH: usize = 1024;

/// The outcome of evaluating one expression: a value or an error, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationResult {
    Success {
        value: f64,
    },
    Error {
        code: ErrorCode,
        message: String,
        position: usize,
    },
}

impl EvaluationResult {
    pub fn success(value: f64) -> EvaluationResult {
        EvaluationResult::Success { value }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>, position: usize) -> EvaluationResult {
        EvaluationResult::Error {
            code,
            message: message.into(),
            position,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, EvaluationResult::Success { .. })
    }

    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    /// The computed value.
    ///
    /// # Panics
    ///
    /// If the result is an error.
    pub fn value(&self) -> f64 {
        match self {
            EvaluationResult::Success { value } => *value,
            EvaluationResult::Error { .. } => {
                panic!("value() called on an error result: {}", self)
            }
        }
    }

    /// # Panics
    ///
    /// If the result is a success.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            EvaluationResult::Error { code, .. } => *code,
            EvaluationResult::Success { value } => {
                panic!("error_code() called on a successful result: {}", value)
            }
        }
    }

    /// # Panics
    ///
    /// If the result is a success.
    pub fn error_message(&self) -> &str {
        match self {
            EvaluationResult::Error { message, .. } => message,
            EvaluationResult::Success { value } => {
                panic!("error_message() called on a successful result: {}", value)
            }
        }
    }

    /// # Panics
    ///
    /// If the result is a success.
    pub fn error_position(&self) -> usize {
        match self {
            EvaluationResult::Error { position, .. } => *position,
            EvaluationResult::Success { value } => {
                panic!("error_position() called on a successful result: {}", value)
            }
        }
    }

    pub fn into_result(self) -> Result<f64> {
        match self {
            EvaluationResult::Success { value } => Ok(value),
            EvaluationResult::Error {
                code,
                message,
                position,
            } => Err(CalcError::new(code, message, position)),
        }
    }
}

impl From<Result<f64>> for EvaluationResult {
    fn from(result: Result<f64>) -> Self {
        match result {
            Ok(value) => EvaluationResult::success(value),
            Err(error) => error.into(),
        }
    }
}

impl From<CalcError> for EvaluationResult {
    fn from(error: CalcError) -> Self {
        EvaluationResult::Error {
            code: error.code,
            message: error.message,
            position: error.position,
        }
    }
}

impl fmt::Display for EvaluationResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationResult::Success { value } => write!(f, "{}", value),
            EvaluationResult::Error {
                code,
                message,
                position,
            } => write!(f, "{}", CalcError::new(*code, message.clone(), *position)),
        }
    }
}

/// Evaluates an expression tree without modifying it.
///
/// # Arguments
///
/// * `tree`: The root of the expression tree.
/// * `context`: The functions and constants the expression may refer to.
///
/// returns: The value of the expression, or the first error encountered.
///
/// # Examples
///
/// ```
/// use calc_engine::interpreter::context::EvaluationContext;
/// use calc_engine::interpreter::evaluator::evaluate;
/// use calc_engine::interpreter::convert;
///
/// let context = EvaluationContext::default();
/// let tree = convert("(2 + 3) * 4", context.operators(), Default::default()).unwrap();
/// assert_eq!(evaluate(&tree, &context).value(), 20.0);
/// ```
pub fn evaluate(tree: &Node, context: &EvaluationContext) -> EvaluationResult {
    evaluate_node(tree, context, 0).into()
}

fn evaluate_node(node: &Node, context: &EvaluationContext, depth: usize) -> Result<f64> {
    if depth > MAX_EVALUATION_DEPTH {
        return Err(CalcError::evaluation(
            "Expression is nested too deeply to evaluate",
            node.position(),
        ));
    }

    match node {
        Node::Literal(value) => Ok(*value),
        Node::UnaryOperation {
            operator,
            token,
            operand,
        } => {
            let operand = evaluate_node(operand, context, depth + 1)?;
            apply_unary(*operator, operand, token.position)
        }
        Node::BinaryOperation { .. } => {
            let (leftmost, steps) = node.left_spine();
            let mut value = evaluate_node(leftmost, context, depth + 1)?;
            for (operator, token, right_operand) in steps {
                let right = evaluate_node(right_operand, context, depth + 1)?;
                value = apply_binary(operator, value, right, token.position)?;
            }
            Ok(value)
        }
        Node::FunctionCall {
            name,
            position,
            arguments,
        } => {
            let values = arguments
                .iter()
                .map(|argument| evaluate_node(argument, context, depth + 1))
                .collect::<Result<Vec<f64>>>()?;
            call_function(name, &values, *position, context)
        }
    }
}

fn call_function(
    name: &str,
    arguments: &[f64],
    position: usize,
    context: &EvaluationContext,
) -> Result<f64> {
    if arguments.is_empty() {
        if let Some(value) = context.constant(name) {
            return Ok(value);
        }
    }

    match context.function(name) {
        Some(function) => function.call(arguments, position),
        None if arguments.is_empty() => Err(CalcError::invalid_function(
            format!("Unknown function or constant: {}", name),
            position,
        )),
        None => Err(CalcError::invalid_function(
            format!("Unknown function: {}", name),
            position,
        )),
    }
}

fn apply_unary(operator: UnaryOperator, operand: f64, position: usize) -> Result<f64> {
    match operator {
        UnaryOperator::Plus => Ok(operand),
        UnaryOperator::Negate => Ok(-operand),
        UnaryOperator::BitwiseNot => Ok(!to_integer(operand, position)? as f64),
    }
}

fn apply_binary(operator: BinaryOperator, left: f64, right: f64, position: usize) -> Result<f64> {
    if operator.is_bitwise() {
        return apply_bitwise(operator, left, right, position);
    }

    let result = match operator {
        BinaryOperator::Add => left + right,
        BinaryOperator::Subtract => left - right,
        BinaryOperator::Multiply => left * right,
        BinaryOperator::Divide | BinaryOperator::Modulo if right == 0.0 => {
            return Err(CalcError::division_by_zero(position))
        }
        BinaryOperator::Divide => left / right,
        BinaryOperator::Modulo => left % right,
        BinaryOperator::Exponentiate => {
            if left < 0.0 && right.is_finite() && right.fract() != 0.0 {
                return Err(CalcError::domain(
                    "Fractional power of a negative number",
                    position,
                ));
            }
            left.powf(right)
        }
        _ => {
            return Err(CalcError::evaluation(
                format!("Unknown binary operator: {}", operator),
                position,
            ))
        }
    };

    check_result(operator, left, right, result, position)
}

fn check_result(
    operator: BinaryOperator,
    left: f64,
    right: f64,
    result: f64,
    position: usize,
) -> Result<f64> {
    let finite_operands = left.is_finite() && right.is_finite();

    if result.is_nan() {
        return Err(CalcError::domain("Result is not a number", position));
    }
    if result.is_infinite() && finite_operands {
        return Err(CalcError::overflow(position));
    }

    let scales = matches!(
        operator,
        BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Exponentiate
    );
    if scales && result == 0.0 && left != 0.0 && right != 0.0 && finite_operands {
        return Err(CalcError::underflow(position));
    }
    Ok(result)
}

fn apply_bitwise(operator: BinaryOperator, left: f64, right: f64, position: usize) -> Result<f64> {
    let left = to_integer(left, position)?;
    let right = to_integer(right, position)?;

    let result = match operator {
        BinaryOperator::BitwiseAnd => left & right,
        BinaryOperator::BitwiseOr => left | right,
        BinaryOperator::BitwiseXor => left ^ right,
        BinaryOperator::ShiftLeft => left.wrapping_shl(shift_amount(right, position)?),
        BinaryOperator::ShiftRight => left.wrapping_shr(shift_amount(right, position)?),
        _ => {
            return Err(CalcError::evaluation(
                format!("Unknown bitwise operator: {}", operator),
                position,
            ))
        }
    };
    Ok(result as f64)
}

/// Truncates toward zero. Values that do not fit in an `i64` are an overflow.
fn to_integer(value: f64, position: usize) -> Result<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63

    let truncated = value.trunc();
    if !(-LIMIT..LIMIT).contains(&truncated) {
        return Err(CalcError::overflow(position));
    }
    Ok(truncated as i64)
}

fn shift_amount(amount: i64, position: usize) -> Result<u32> {
    u32::try_from(amount)
        .ok()
        .filter(|amount| *amount < i64::BITS)
        .ok_or_else(|| {
            CalcError::domain(
                format!("Shift amount must be between 0 and 63, got {}", amount),
                position,
            )
        })
}
