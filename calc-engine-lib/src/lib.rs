//! A calculator expression engine: text is tokenized, parsed into an expression
//! tree by one of two interchangeable parsers and evaluated against the context
//! of a calculator [`Mode`](modes::Mode).
//!
//! ```
//! use calc_engine::{Mode, ModeManager};
//!
//! let manager = ModeManager::new();
//! let scientific = manager.get_mode("scientific").unwrap();
//! let result = scientific.evaluate("sin(PI / 6)");
//! assert!((result.value() - 0.5).abs() < 1e-9);
//! ```

pub mod converter;
pub mod error;
pub mod format;
pub mod interpreter;
pub mod modes;

pub use error::{CalcError, ErrorCode, Result};
pub use interpreter::evaluator::EvaluationResult;
pub use interpreter::parser::ParserKind;
pub use modes::{Mode, ModeManager};
