use std::collections::HashMap;
use std::fmt;
use std::fmt::Formatter;

/// A binary mathematical operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Exponentiate,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    ShiftLeft,
    ShiftRight,
}

/// An unary (prefix) mathematical operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Plus,
    Negate,
    BitwiseNot,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

/// Prefix operators bind as tightly as exponentiation, so `-2^2` is `-(2^2)`.
pub(crate) const UNARY_PRECEDENCE: u8 = 7;

impl UnaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOperator::Plus => "+",
            UnaryOperator::Negate => "-",
            UnaryOperator::BitwiseNot => "~",
        }
    }

    pub fn precedence(&self) -> u8 {
        UNARY_PRECEDENCE
    }
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Exponentiate | BinaryOperator::BitwiseXor => "^",
            BinaryOperator::BitwiseAnd => "&",
            BinaryOperator::BitwiseOr => "|",
            BinaryOperator::ShiftLeft => "<<",
            BinaryOperator::ShiftRight => ">>",
        }
    }

    pub fn associativity(&self) -> Associativity {
        match self {
            BinaryOperator::Exponentiate => Associativity::Right,
            _ => Associativity::Left,
        }
    }

    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::BitwiseOr => 1,
            BinaryOperator::BitwiseXor => 2,
            BinaryOperator::BitwiseAnd => 3,
            BinaryOperator::ShiftLeft | BinaryOperator::ShiftRight => 4,
            BinaryOperator::Add | BinaryOperator::Subtract => 5,
            BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Modulo => 6,
            BinaryOperator::Exponentiate => 7,
        }
    }

    pub fn precedence_gt(&self, other: &Self) -> bool {
        self.precedence().gt(&other.precedence())
    }

    pub fn precedence_eq(&self, other: &Self) -> bool {
        self.precedence().eq(&other.precedence())
    }

    pub fn is_bitwise(&self) -> bool {
        matches!(
            self,
            BinaryOperator::BitwiseAnd
                | BinaryOperator::BitwiseOr
                | BinaryOperator::BitwiseXor
                | BinaryOperator::ShiftLeft
                | BinaryOperator::ShiftRight
        )
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Maps operator symbols to their meaning in one calculator mode.
///
/// Both parsers read the table, so the same symbol (`^`) can be exponentiation in
/// one mode and bitwise XOR in another, and a symbol missing from the table is a
/// syntax error in that mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorTable {
    binary: HashMap<String, BinaryOperator>,
    unary: HashMap<String, UnaryOperator>,
    unary_enabled: bool,
}

impl Default for OperatorTable {
    fn default() -> Self {
        Self::arithmetic()
    }
}

impl OperatorTable {
    /// `+ - * / % ^` with `^` as exponentiation, and prefix `+`/`-`.
    pub fn arithmetic() -> OperatorTable {
        let binary = [
            BinaryOperator::Add,
            BinaryOperator::Subtract,
            BinaryOperator::Multiply,
            BinaryOperator::Divide,
            BinaryOperator::Modulo,
            BinaryOperator::Exponentiate,
        ]
        .into_iter()
        .map(|operator| (operator.symbol().to_string(), operator))
        .collect();
        let unary = [UnaryOperator::Plus, UnaryOperator::Negate]
            .into_iter()
            .map(|operator| (operator.symbol().to_string(), operator))
            .collect();

        OperatorTable {
            binary,
            unary,
            unary_enabled: true,
        }
    }

    /// Arithmetic plus the bitwise operators, with `^` as XOR.
    pub fn bitwise() -> OperatorTable {
        let mut table = Self::arithmetic();
        for operator in [
            BinaryOperator::BitwiseAnd,
            BinaryOperator::BitwiseOr,
            BinaryOperator::BitwiseXor,
            BinaryOperator::ShiftLeft,
            BinaryOperator::ShiftRight,
        ] {
            table.set_binary(operator.symbol(), operator);
        }
        table.set_unary(UnaryOperator::BitwiseNot.symbol(), UnaryOperator::BitwiseNot);
        table
    }

    pub fn set_binary(&mut self, symbol: &str, operator: BinaryOperator) {
        self.binary.insert(symbol.to_string(), operator);
    }

    pub fn set_unary(&mut self, symbol: &str, operator: UnaryOperator) {
        self.unary.insert(symbol.to_string(), operator);
    }

    pub fn remove(&mut self, symbol: &str) {
        self.binary.remove(symbol);
        self.unary.remove(symbol);
    }

    pub fn binary(&self, symbol: &str) -> Option<BinaryOperator> {
        self.binary.get(symbol).copied()
    }

    /// The prefix meaning of `symbol`, or `None` when prefix operators are disabled.
    pub fn unary(&self, symbol: &str) -> Option<UnaryOperator> {
        if !self.unary_enabled {
            return None;
        }
        self.unary.get(symbol).copied()
    }

    pub fn unary_enabled(&self) -> bool {
        self.unary_enabled
    }

    pub fn set_unary_enabled(&mut self, enabled: bool) {
        self.unary_enabled = enabled;
    }

    pub fn knows(&self, symbol: &str) -> bool {
        self.binary.contains_key(symbol) || self.unary.contains_key(symbol)
    }
}
