use crate::interpreter::context::EvaluationContext;
use crate::interpreter::functions::register_builtins;
use crate::interpreter::operator::OperatorTable;
use crate::interpreter::parser::ParserKind;
use crate::modes::Mode;

/// Arithmetic with `+ - * / % ^`, parentheses, unary signs and the builtin functions.
#[derive(Debug, Clone)]
pub struct StandardMode {
    context: EvaluationContext,
    parser_kind: ParserKind,
}

impl Default for StandardMode {
    fn default() -> Self {
        StandardMode::new()
    }
}

impl StandardMode {
    pub fn new() -> StandardMode {
        let mut context = EvaluationContext::new(OperatorTable::arithmetic());
        register_builtins(&mut context);
        StandardMode {
            context,
            parser_kind: ParserKind::default(),
        }
    }

    pub fn with_parser(kind: ParserKind) -> StandardMode {
        StandardMode {
            parser_kind: kind,
            ..StandardMode::new()
        }
    }
}

impl Mode for StandardMode {
    fn name(&self) -> &str {
        "standard"
    }

    fn description(&self) -> &str {
        "Standard calculator mode: +, -, *, /, ^ with parentheses"
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
}
