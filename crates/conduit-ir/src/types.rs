//! Type vocabulary shared by every IR node.
//!
//! The display names produced here are used verbatim in diagnostics and in
//! generated target code. Downstream passes match on them, so they must not
//! change.

use std::fmt;

/// Scalar data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DataType {
    Int,
    Float,
    String,
    Bool,
    Unknown,
}

impl DataType {
    /// Returns the stable display name.
    pub fn name(self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::String => "string",
            DataType::Bool => "bool",
            DataType::Unknown => "unknown",
        }
    }

    /// Check if arithmetic is defined on this type.
    pub fn is_numeric(self) -> bool {
        matches!(self, DataType::Int | DataType::Float)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Storage container strategies a table instance can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ContainerType {
    Vec,
    Hash,
    OrderedMap,
    File,
    Streaming,
}

impl ContainerType {
    pub fn name(self) -> &'static str {
        match self {
            ContainerType::Vec => "vec",
            ContainerType::Hash => "hash",
            ContainerType::OrderedMap => "ordered_map",
            ContainerType::File => "file",
            ContainerType::Streaming => "streaming",
        }
    }
}

impl fmt::Display for ContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithmeticOp {
    pub fn name(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "ADD",
            ArithmeticOp::Sub => "SUB",
            ArithmeticOp::Mul => "MUL",
            ArithmeticOp::Div => "DIV",
        }
    }

    /// Infix symbol used by textual printers.
    pub fn symbol(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CompareOp {
    Eq,
    Gt,
    Lt,
    Ge,
    Le,
    Neq,
}

impl CompareOp {
    pub fn name(self) -> &'static str {
        match self {
            CompareOp::Eq => "EQ",
            CompareOp::Gt => "GT",
            CompareOp::Lt => "LT",
            CompareOp::Ge => "GE",
            CompareOp::Le => "LE",
            CompareOp::Neq => "NEQ",
        }
    }

    /// Infix symbol used by textual printers.
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
            CompareOp::Neq => "!=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Logical combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

impl LogicalOp {
    pub fn name(self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
            LogicalOp::Not => "NOT",
        }
    }

    /// Check if the operator takes a single operand.
    pub fn is_unary(self) -> bool {
        matches!(self, LogicalOp::Not)
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reduction operators used by `Reduce`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Reducer {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl Reducer {
    pub fn name(self) -> &'static str {
        match self {
            Reducer::Count => "COUNT",
            Reducer::Sum => "SUM",
            Reducer::Avg => "AVG",
            Reducer::Min => "MIN",
            Reducer::Max => "MAX",
        }
    }
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
