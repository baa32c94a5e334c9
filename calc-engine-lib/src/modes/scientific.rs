use crate::interpreter::context::EvaluationContext;
use crate::interpreter::functions::{register_alias, register_constants};
use crate::interpreter::parser::ParserKind;
use crate::modes::{Mode, StandardMode};

/// Standard mode plus the constants `PI` and `E` and the `ln` alias of `log`.
#[derive(Debug, Clone)]
pub struct ScientificMode {
    standard: StandardMode,
}

impl Default for ScientificMode {
    fn default() -> Self {
        ScientificMode::new()
    }
}

impl ScientificMode {
    pub fn new() -> ScientificMode {
        let mut standard = StandardMode::new();
        let context = standard.context_mut();
        register_constants(context);
        register_alias(context, "ln", "log");
        ScientificMode { standard }
    }

    pub fn with_parser(kind: ParserKind) -> ScientificMode {
        let mut mode = ScientificMode::new();
        mode.set_parser_kind(kind);
        mode
    }

    /// Names of every callable function, sorted.
    pub fn available_functions(&self) -> Vec<String> {
        self.context().function_names()
    }

    /// Names of every constant, sorted.
    pub fn available_constants(&self) -> Vec<String> {
        self.context().constant_names()
    }
}

impl Mode for ScientificMode {
    fn name(&self) -> &str {
        "scientific"
    }

    fn description(&self) -> &str {
        "Scientific mode: all arithmetic operations + math functions (sin/cos/tan, log/exp/sqrt, etc.)"
    }

    fn context(&self) -> &EvaluationContext {
        self.standard.context()
    }

    fn context_mut(&mut self) -> &mut EvaluationContext {
        self.standard.context_mut()
    }

    fn parser_kind(&self) -> ParserKind {
        self.standard.parser_kind()
    }

    fn set_parser_kind(&mut self, kind: ParserKind) {
        self.standard.set_parser_kind(kind);
    }
}
