//! Condition algebra.

use std::fmt;

use crate::error::IrError;
use crate::types::{CompareOp, LogicalOp};
use crate::value::{Column, SingleValue};

/// `lhs <op> rhs` over two scalar values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AlgebraCondition {
    lhs: SingleValue,
    rhs: SingleValue,
    op: CompareOp,
}

impl AlgebraCondition {
    pub fn new(lhs: impl Into<SingleValue>, rhs: impl Into<SingleValue>, op: CompareOp) -> Self {
        Self {
            lhs: lhs.into(),
            rhs: rhs.into(),
            op,
        }
    }

    pub fn lhs(&self) -> &SingleValue {
        &self.lhs
    }

    pub fn rhs(&self) -> &SingleValue {
        &self.rhs
    }

    pub fn op(&self) -> CompareOp {
        self.op
    }
}

impl fmt::Display for AlgebraCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AlgebraCondition:({} {} {})", self.lhs, self.op, self.rhs)
    }
}

/// AND/OR of two conditions, or NOT of one.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LogicalCondition {
    lhs: Box<Condition>,
    rhs: Option<Box<Condition>>,
    op: LogicalOp,
}

impl LogicalCondition {
    /// Create a logical condition.
    ///
    /// NOT must have no `rhs`; AND and OR must have one.
    pub fn new(
        lhs: impl Into<Condition>,
        rhs: Option<Condition>,
        op: LogicalOp,
    ) -> Result<Self, IrError> {
        match (op.is_unary(), rhs.is_some()) {
            (true, true) => return Err(IrError::NotWithRhs),
            (false, false) => return Err(IrError::MissingRhs { op: op.name() }),
            _ => {}
        }
        Ok(Self {
            lhs: Box::new(lhs.into()),
            rhs: rhs.map(Box::new),
            op,
        })
    }

    pub fn and(lhs: impl Into<Condition>, rhs: impl Into<Condition>) -> Self {
        Self {
            lhs: Box::new(lhs.into()),
            rhs: Some(Box::new(rhs.into())),
            op: LogicalOp::And,
        }
    }

    pub fn or(lhs: impl Into<Condition>, rhs: impl Into<Condition>) -> Self {
        Self {
            lhs: Box::new(lhs.into()),
            rhs: Some(Box::new(rhs.into())),
            op: LogicalOp::Or,
        }
    }

    pub fn not(inner: impl Into<Condition>) -> Self {
        Self {
            lhs: Box::new(inner.into()),
            rhs: None,
            op: LogicalOp::Not,
        }
    }

    pub fn lhs(&self) -> &Condition {
        &self.lhs
    }

    pub fn rhs(&self) -> Option<&Condition> {
        self.rhs.as_deref()
    }

    pub fn op(&self) -> LogicalOp {
        self.op
    }
}

impl fmt::Display for LogicalCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.rhs {
            Some(rhs) => write!(f, "LogicalCondition:({} {} {})", self.lhs, self.op, rhs),
            None => write!(f, "LogicalCondition:({} {})", self.op, self.lhs),
        }
    }
}

/// Equality join against the named table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct JoinCondition {
    table: String,
    lhs: Column,
    rhs: Column,
}

impl JoinCondition {
    pub fn new(table: impl Into<String>, lhs: Column, rhs: Column) -> Self {
        Self {
            table: table.into(),
            lhs,
            rhs,
        }
    }

    /// The table being joined against.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn lhs(&self) -> &Column {
        &self.lhs
    }

    pub fn rhs(&self) -> &Column {
        &self.rhs
    }
}

impl fmt::Display for JoinCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JoinCondition:{} ({} = {})", self.table, self.lhs, self.rhs)
    }
}

/// Any condition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Condition {
    Algebra(AlgebraCondition),
    Logical(LogicalCondition),
    Join(JoinCondition),
}

impl From<AlgebraCondition> for Condition {
    fn from(cond: AlgebraCondition) -> Self {
        Condition::Algebra(cond)
    }
}

impl From<LogicalCondition> for Condition {
    fn from(cond: LogicalCondition) -> Self {
        Condition::Logical(cond)
    }
}

impl From<JoinCondition> for Condition {
    fn from(cond: JoinCondition) -> Self {
        Condition::Join(cond)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Algebra(cond) => cond.fmt(f),
            Condition::Logical(cond) => cond.fmt(f),
            Condition::Join(cond) => cond.fmt(f),
        }
    }
}
