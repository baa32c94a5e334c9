use crate::converter::{self, NumberBase};
use crate::error::{CalcError, Result};
use crate::format;
use crate::interpreter::context::EvaluationContext;
use crate::interpreter::functions::register_builtins;
use crate::interpreter::operator::OperatorTable;
use crate::interpreter::parser::ParserKind;
use crate::modes::Mode;

/// Bases a programmer mode result can be displayed in.
pub const SUPPORTED_BASES: [u32; 4] = [2, 8, 10, 16];

/// Integer-oriented mode: `^` is bitwise XOR, `& | << >> ~` are available and
/// results can be displayed in binary, octal, decimal or hexadecimal.
#[derive(Debug, Clone)]
pub struct ProgrammerMode {
    context: EvaluationContext,
    parser_kind: ParserKind,
    display_base: NumberBase,
}

impl Default for ProgrammerMode {
    fn default() -> Self {
        ProgrammerMode::new()
    }
}

impl ProgrammerMode {
    pub fn new() -> ProgrammerMode {
        let mut context = EvaluationContext::new(OperatorTable::bitwise());
        register_builtins(&mut context);
        ProgrammerMode {
            context,
            parser_kind: ParserKind::ShuntingYard,
            display_base: NumberBase::Decimal,
        }
    }

    pub fn supported_bases(&self) -> &'static [u32] {
        &SUPPORTED_BASES
    }

    /// Renders an integer in the display base, e.g. `0xFF` or `-0b101`.
    ///
    /// # Examples
    ///
    /// ```
    /// use calc_engine::modes::{Mode, ProgrammerMode};
    ///
    /// let mut mode = ProgrammerMode::new();
    /// mode.set_display_base(16).unwrap();
    /// assert_eq!(mode.format_result(255), "0xFF");
    /// ```
    pub fn format_result(&self, value: i64) -> String {
        converter::format(value, self.display_base)
    }

    fn to_integer(&self, value: f64) -> Result<i64> {
        let value = self.check_value(value)?;
        if value < i64::MIN as f64 || value >= i64::MAX as f64 {
            return Err(CalcError::overflow(0));
        }
        Ok(value as i64)
    }
}

impl Mode for ProgrammerMode {
    fn name(&self) -> &str {
        "programmer"
    }

    fn description(&self) -> &str {
        "Programmer mode with base conversions and bitwise operations"
    }

    fn context(&self) -> &EvaluationContext {
        &self.context
    }

    fn context_mut(&mut self) -> &mut EvaluationContext {
        &mut self.context
    }

    fn parser_kind(&self) -> ParserKind {
        self.parser_kind
    }

    fn set_parser_kind(&mut self, kind: ParserKind) {
        self.parser_kind = kind;
    }

    /// Fractional values only exist in decimal display.
    fn check_value(&self, value: f64) -> Result<f64> {
        if self.display_base != NumberBase::Decimal && value.fract() != 0.0 {
            return Err(CalcError::domain(
                format!(
                    "Result {} cannot be displayed in base {}",
                    value,
                    self.display_base.radix()
                ),
                0,
            ));
        }
        Ok(value)
    }

    fn format_value(&self, value: f64) -> Result<String> {
        if self.display_base == NumberBase::Decimal {
            return Ok(format::format_value(value, self.precision()));
        }
        Ok(self.format_result(self.to_integer(value)?))
    }

    fn display_base(&self) -> NumberBase {
        self.display_base
    }

    fn set_display_base(&mut self, radix: u32) -> Result<()> {
        self.display_base = NumberBase::from_radix(radix)?;
        Ok(())
    }
}
