//! The builtin math functions and constants.

use crate::interpreter::context::{Arity, DomainCheck, EvaluationContext, Function};

type MathFn = fn(&[f64]) -> f64;

/// Defines the builtin table, one entry per function.
macro_rules! builtin_functions {
    (
        $(
            $name:literal => {
                arity: $arity:expr,
                func: $func:expr
                $(, domain: $domain:expr)? $(,)?
            }
        ),* $(,)?
    ) => {
        struct BuiltinDef {
            name: &'static str,
            arity: Arity,
            func: MathFn,
            domain: Option<DomainCheck>,
        }

        static BUILTIN_TABLE: &[BuiltinDef] = &[
            $(
                BuiltinDef {
                    name: $name,
                    arity: $arity,
                    func: $func,
                    domain: builtin_functions!(@domain $($domain)?),
                },
            )*
        ];

        /// Names of every builtin function.
        pub const BUILTIN_FUNCTIONS: &[&str] = &[$($name,)*];
    };
    (@domain $domain:expr) => { Some($domain) };
    (@domain) => { None };
}

builtin_functions! {
    "sin"       => { arity: Arity::Exact(1), func: |a| a[0].sin() },
    "cos"       => { arity: Arity::Exact(1), func: |a| a[0].cos() },
    "tan"       => { arity: Arity::Exact(1), func: |a| a[0].tan() },
    "asin"      => { arity: Arity::Exact(1), func: |a| a[0].asin(), domain: unit_interval },
    "acos"      => { arity: Arity::Exact(1), func: |a| a[0].acos(), domain: unit_interval },
    "atan"      => { arity: Arity::Exact(1), func: |a| a[0].atan() },
    "sinh"      => { arity: Arity::Exact(1), func: |a| a[0].sinh() },
    "cosh"      => { arity: Arity::Exact(1), func: |a| a[0].cosh() },
    "tanh"      => { arity: Arity::Exact(1), func: |a| a[0].tanh() },
    "log"       => { arity: Arity::Exact(1), func: |a| a[0].ln(), domain: positive },
    "log10"     => { arity: Arity::Exact(1), func: |a| a[0].log10(), domain: positive },
    "exp"       => { arity: Arity::Exact(1), func: |a| a[0].exp() },
    "sqrt"      => { arity: Arity::Exact(1), func: |a| a[0].sqrt(), domain: non_negative },
    "cbrt"      => { arity: Arity::Exact(1), func: |a| a[0].cbrt() },
    "pow"       => { arity: Arity::Exact(2), func: |a| a[0].powf(a[1]), domain: real_power },
    "abs"       => { arity: Arity::Exact(1), func: |a| a[0].abs() },
    "floor"     => { arity: Arity::Exact(1), func: |a| a[0].floor() },
    "ceil"      => { arity: Arity::Exact(1), func: |a| a[0].ceil() },
    "round"     => { arity: Arity::Exact(1), func: |a| a[0].round() },
    "trunc"     => { arity: Arity::Exact(1), func: |a| a[0].trunc() },
    "fmod"      => { arity: Arity::Exact(2), func: |a| a[0] % a[1], domain: non_zero_divisor },
    "remainder" => { arity: Arity::Exact(2), func: |a| ieee_remainder(a[0], a[1]), domain: non_zero_divisor },
    "max"       => { arity: Arity::AtLeast(1), func: |a| a.iter().copied().fold(f64::NEG_INFINITY, f64::max) },
    "min"       => { arity: Arity::AtLeast(1), func: |a| a.iter().copied().fold(f64::INFINITY, f64::min) },
    "hypot"     => { arity: Arity::Exact(2), func: |a| a[0].hypot(a[1]) },
}

fn unit_interval(name: &str, a: &[f64]) -> Option<String> {
    (!(-1.0..=1.0).contains(&a[0])).then(|| format!("{} argument must be in [-1, 1]", name))
}

fn positive(name: &str, a: &[f64]) -> Option<String> {
    (a[0] <= 0.0).then(|| format!("{} argument must be positive", name))
}

fn non_negative(name: &str, a: &[f64]) -> Option<String> {
    (a[0] < 0.0).then(|| format!("{} argument must be non-negative", name))
}

fn non_zero_divisor(name: &str, a: &[f64]) -> Option<String> {
    (a[1] == 0.0).then(|| format!("{} divisor cannot be zero", name))
}

fn real_power(name: &str, a: &[f64]) -> Option<String> {
    (a[0] < 0.0 && a[1].fract() != 0.0)
        .then(|| format!("{} of a negative base requires an integer exponent", name))
}

/// IEEE remainder: `x - n * y` where `n` is `x / y` rounded to the nearest even integer.
fn ieee_remainder(x: f64, y: f64) -> f64 {
    let quotient = x / y;
    let mut nearest = quotient.round();
    if (quotient - quotient.trunc()).abs() == 0.5 && nearest % 2.0 != 0.0 {
        nearest -= quotient.signum();
    }
    x - nearest * y
}

/// Registers every builtin function into the context.
///
/// # Examples
///
/// ```
/// use calc_engine::interpreter::context::EvaluationContext;
/// use calc_engine::interpreter::functions::register_builtins;
///
/// let mut context = EvaluationContext::default();
/// register_builtins(&mut context);
/// assert_eq!(context.function("hypot").unwrap().call(&[3.0, 4.0], 0), Ok(5.0));
/// ```
pub fn register_builtins(context: &mut EvaluationContext) {
    for builtin in BUILTIN_TABLE {
        let func = builtin.func;
        let mut function = Function::new(builtin.name, builtin.arity, func);
        if let Some(domain) = builtin.domain {
            function = function.with_domain(domain);
        }
        context.add_function(function);
    }
}

/// Registers `PI` and `E`, with lower case aliases.
pub fn register_constants(context: &mut EvaluationContext) {
    for (name, value) in [
        ("PI", std::f64::consts::PI),
        ("pi", std::f64::consts::PI),
        ("E", std::f64::consts::E),
        ("e", std::f64::consts::E),
    ] {
        context.add_constant(name, value);
    }
}

/// Makes `alias` call the same function as `name`.
pub fn register_alias(context: &mut EvaluationContext, alias: &str, name: &str) -> bool {
    let function = context.function(name).cloned();
    match function {
        Some(function) => {
            context.add_function(function.renamed(alias));
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use parameterized_macro::parameterized;

    fn context() -> EvaluationContext {
        let mut context = EvaluationContext::default();
        register_builtins(&mut context);
        context
    }

    fn call(name: &str, arguments: &[f64]) -> crate::error::Result<f64> {
        context().function(name).unwrap().call(arguments, 0)
    }

    #[test]
    fn every_builtin_is_registered() {
        let context = context();

        for name in BUILTIN_FUNCTIONS {
            assert!(context.has_function(name), "{} missing", name);
        }
        assert_eq!(context.function_names().len(), BUILTIN_FUNCTIONS.len());
    }

    #[parameterized(
        name = { "sqrt", "cbrt", "abs", "floor", "ceil", "round", "trunc", "pow", "hypot", "max", "min", "fmod" },
        arguments = { &[16.0], &[8.0], &[-2.5], &[-2.5], &[2.1], &[2.5], &[-2.7], &[2.0, 10.0], &[3.0, 4.0], &[1.0, 7.0, 3.0], &[4.0, -1.0], &[7.5, 2.0] },
        expected = { 4.0, 2.0, 2.5, -3.0, 3.0, 3.0, -2.0, 1024.0, 5.0, 7.0, -1.0, 1.5 }
    )]
    fn builtins_compute_expected_values(name: &str, arguments: &[f64], expected: f64) {
        assert_eq!(call(name, arguments).unwrap(), expected);
    }

    #[parameterized(
        name = { "sqrt", "log", "log", "log10", "asin", "acos", "fmod", "remainder", "pow" },
        arguments = { &[-1.0], &[0.0], &[-3.0], &[0.0], &[1.5], &[-1.01], &[1.0, 0.0], &[1.0, 0.0], &[-8.0, 0.5] }
    )]
    fn domain_violations_are_domain_errors(name: &str, arguments: &[f64]) {
        let error = call(name, arguments).unwrap_err();

        assert_eq!(error.code, ErrorCode::DomainError, "{}", error);
    }

    #[test]
    fn domain_error_message_names_the_function() {
        assert_eq!(
            call("sqrt", &[-1.0]).unwrap_err().message,
            "sqrt argument must be non-negative"
        );
        assert_eq!(
            call("log", &[0.0]).unwrap_err().message,
            "log argument must be positive"
        );
    }

    #[test]
    fn remainder_rounds_quotient_to_nearest_even() {
        assert_eq!(call("remainder", &[5.0, 2.0]).unwrap(), 1.0);
        assert_eq!(call("remainder", &[7.0, 2.0]).unwrap(), -1.0);
        assert_eq!(call("remainder", &[10.0, 3.0]).unwrap(), 1.0);
    }

    #[test]
    fn pow_accepts_negative_base_with_integer_exponent() {
        assert_eq!(call("pow", &[-2.0, 3.0]).unwrap(), -8.0);
    }

    #[test]
    fn max_without_arguments_is_evaluation_error() {
        assert_eq!(
            call("max", &[]).unwrap_err().code,
            ErrorCode::EvaluationError
        );
    }

    #[test]
    fn alias_calls_the_original_function() {
        let mut context = context();

        assert!(register_alias(&mut context, "ln", "log"));
        assert!(!register_alias(&mut context, "lg", "missing"));

        let ln = context.function("ln").unwrap();
        assert_eq!(ln.name(), "ln");
        assert_eq!(ln.call(&[1.0], 0), Ok(0.0));
        assert_eq!(ln.call(&[0.0], 0).unwrap_err().code, ErrorCode::DomainError);
    }

    #[test]
    fn constants_have_upper_and_lower_case_names() {
        let mut context = EvaluationContext::default();
        register_constants(&mut context);

        assert_eq!(context.constant("pi"), context.constant("PI"));
        assert_eq!(context.constant("e"), Some(std::f64::consts::E));
    }
}
