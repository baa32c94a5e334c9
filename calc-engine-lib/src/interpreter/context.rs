use crate::error::{CalcError, Result};
use crate::interpreter::operator::{BinaryOperator, OperatorTable, UnaryOperator};
use itertools::Itertools;
use std::collections::HashMap;
use std::fmt;
use std::fmt::Formatter;
use std::sync::Arc;

/// Default number of decimal digits shown for a result.
pub const DEFAULT_PRECISION: usize = 6;

/// The number of arguments a function accepts.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Exact(expected) => count == *expected,
            Arity::AtLeast(minimum) => count >= *minimum,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (qualifier, count) = match self {
            Arity::Exact(count) => ("exactly", *count),
            Arity::AtLeast(count) => ("at least", *count),
        };
        let noun = if count == 1 { "argument" } else { "arguments" };
        write!(f, "{} {} {}", qualifier, count, noun)
    }
}

type Callback = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// Given the function name and its arguments, describes the violated domain, if any.
pub type DomainCheck = fn(&str, &[f64]) -> Option<String>;

/// A named function that can be called from an expression.
#[derive(Clone)]
pub struct Function {
    name: String,
    arity: Arity,
    callback: Callback,
    domain: Option<DomainCheck>,
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("checks_domain", &self.domain.is_some())
            .finish()
    }
}

impl Function {
    pub fn new(
        name: impl Into<String>,
        arity: Arity,
        callback: impl Fn(&[f64]) -> f64 + Send + Sync + 'static,
    ) -> Function {
        Function {
            name: name.into(),
            arity,
            callback: Arc::new(callback),
            domain: None,
        }
    }

    /// Runs `check` on the arguments before every call.
    pub fn with_domain(mut self, check: DomainCheck) -> Function {
        self.domain = Some(check);
        self
    }

    /// The same function under another name, e.g. `ln` for `log`.
    pub fn renamed(mut self, name: impl Into<String>) -> Function {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Calls the function after checking its arity and domain.
    ///
    /// # Arguments
    ///
    /// * `arguments`: The evaluated arguments, in call order.
    /// * `position`: Source position of the call, used in errors.
    ///
    /// returns: The result, or an error instead of a NaN or infinite value.
    pub fn call(&self, arguments: &[f64], position: usize) -> Result<f64> {
        if !self.arity.accepts(arguments.len()) {
            return Err(CalcError::evaluation(
                format!("{} requires {}", self.name, self.arity),
                position,
            ));
        }
        if let Some(violation) = self.domain.and_then(|check| check(&self.name, arguments)) {
            return Err(CalcError::domain(violation, position));
        }

        let result = (self.callback)(arguments);

        if result.is_nan() {
            return Err(CalcError::domain(
                format!("{} is undefined for {}", self.name, arguments.iter().join(", ")),
                position,
            ));
        }
        if result.is_infinite() && arguments.iter().all(|argument| argument.is_finite()) {
            return Err(CalcError::overflow(position));
        }
        Ok(result)
    }
}

/// Everything an expression is evaluated against: functions, constants and
/// the meaning of each operator symbol.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    precision: usize,
    functions: HashMap<String, Function>,
    constants: HashMap<String, f64>,
    operators: OperatorTable,
}

impl Default for EvaluationContext {
    fn default() -> Self {
        EvaluationContext::new(OperatorTable::default())
    }
}

impl EvaluationContext {
    pub fn new(operators: OperatorTable) -> EvaluationContext {
        EvaluationContext {
            precision: DEFAULT_PRECISION,
            functions: HashMap::new(),
            constants: HashMap::new(),
            operators,
        }
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Sets how many decimal digits are shown. Does not affect arithmetic.
    pub fn set_precision(&mut self, precision: usize) {
        self.precision = precision;
    }

    /// Registers a function, replacing any earlier function with the same name.
    pub fn add_function(&mut self, function: Function) {
        self.functions.insert(function.name.clone(), function);
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn function_names(&self) -> Vec<String> {
        self.functions.keys().sorted().cloned().collect()
    }

    pub fn add_constant(&mut self, name: impl Into<String>, value: f64) {
        self.constants.insert(name.into(), value);
    }

    pub fn constant(&self, name: &str) -> Option<f64> {
        self.constants.get(name).copied()
    }

    pub fn constant_names(&self) -> Vec<String> {
        self.constants.keys().sorted().cloned().collect()
    }

    pub fn operators(&self) -> &OperatorTable {
        &self.operators
    }

    pub fn operators_mut(&mut self) -> &mut OperatorTable {
        &mut self.operators
    }

    /// Gives `symbol` a new binary meaning, e.g. `^` as bitwise XOR.
    pub fn set_operator_semantics(&mut self, symbol: &str, operator: BinaryOperator) {
        self.operators.set_binary(symbol, operator);
    }

    pub fn operator_semantics(&self, symbol: &str) -> Option<BinaryOperator> {
        self.operators.binary(symbol)
    }

    pub fn set_unary_semantics(&mut self, symbol: &str, operator: UnaryOperator) {
        self.operators.set_unary(symbol, operator);
    }
}
