//! Calculator modes. A mode bundles a parser choice with a preconfigured
//! [`EvaluationContext`] behind a single [`Mode::evaluate`] call.

pub mod manager;
pub mod programmer;
pub mod scientific;
pub mod standard;

pub use manager::ModeManager;
pub use programmer::ProgrammerMode;
pub use scientific::ScientificMode;
pub use standard::StandardMode;

use crate::converter::NumberBase;
use crate::error::{CalcError, Result};
use crate::format;
use crate::interpreter::calculate;
use crate::interpreter::context::EvaluationContext;
use crate::interpreter::evaluator::EvaluationResult;
use crate::interpreter::parser::ParserKind;
use log::debug;

/// One calculator flavor, e.g. standard arithmetic or programmer bitwise math.
pub trait Mode: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn context(&self) -> &EvaluationContext;

    fn context_mut(&mut self) -> &mut EvaluationContext;

    fn parser_kind(&self) -> ParserKind;

    fn set_parser_kind(&mut self, kind: ParserKind);

    fn precision(&self) -> usize {
        self.context().precision()
    }

    fn set_precision(&mut self, precision: usize) {
        self.context_mut().set_precision(precision);
    }

    /// Evaluates an expression with this mode's parser and context.
    ///
    /// Never fails: tokenizer, parser and evaluator errors all come back as an
    /// error result.
    ///
    /// # Arguments
    ///
    /// * `expression`: A text expression in infix format.
    ///
    /// returns: The value of the expression, or the error that prevented it.
    ///
    /// # Examples
    ///
    /// ```
    /// use calc_engine::modes::{Mode, StandardMode};
    ///
    /// let mode = StandardMode::new();
    /// assert_eq!(mode.evaluate("(2 + 3) * 4 - 6 / 2").value(), 17.0);
    /// assert!(mode.evaluate("10 / 0").is_error());
    /// ```
    fn evaluate(&self, expression: &str) -> EvaluationResult {
        let result = calculate(expression, self.context(), self.parser_kind())
            .into_result()
            .and_then(|value| self.check_value(value));
        let result = EvaluationResult::from(result);
        debug!("{} mode: {:?} => {}", self.name(), expression, result);
        result
    }

    /// Rejects values this mode cannot represent. Accepts everything by default.
    fn check_value(&self, value: f64) -> Result<f64> {
        Ok(value)
    }

    /// Renders a value the way this mode displays results.
    fn format_value(&self, value: f64) -> Result<String> {
        Ok(format::format_value(value, self.precision()))
    }

    fn display_base(&self) -> NumberBase {
        NumberBase::Decimal
    }

    /// Selects the base results are displayed in. Only decimal unless overridden.
    fn set_display_base(&mut self, radix: u32) -> Result<()> {
        if radix == NumberBase::Decimal.radix() {
            return Ok(());
        }
        Err(CalcError::invalid_base(format!(
            "The {} mode only displays decimal results",
            self.name()
        )))
    }
}
