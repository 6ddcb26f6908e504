//! Operation nodes.
//!
//! Each operation is a unit of work against one named table. Table names are
//! plain identifiers; nothing here checks that the table exists.

use std::fmt;

use crate::condition::{Condition, JoinCondition};
use crate::error::IrError;
use crate::schema::{StructType, StructValue};
use crate::types::Reducer;
use crate::value::{write_joined, Assignment, SingleValue};

/// Projection of a table, with optional join, filter and row limit.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Copy {
    table: String,
    columns: StructType,
    join: Option<JoinCondition>,
    filter: Option<Condition>,
    limit: Option<SingleValue>,
}

impl Copy {
    pub fn new(
        table: impl Into<String>,
        columns: StructType,
        join: Option<JoinCondition>,
        filter: Option<Condition>,
        limit: Option<SingleValue>,
    ) -> Self {
        Self {
            table: table.into(),
            columns,
            join,
            filter,
            limit,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// The projected schema.
    pub fn columns(&self) -> &StructType {
        &self.columns
    }

    pub fn join(&self) -> Option<&JoinCondition> {
        self.join.as_ref()
    }

    pub fn filter(&self) -> Option<&Condition> {
        self.filter.as_ref()
    }

    pub fn limit(&self) -> Option<&SingleValue> {
        self.limit.as_ref()
    }
}

impl fmt::Display for Copy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Copy:{} Cols:{}", self.table, self.columns)?;
        fmt_read_clauses(f, self.join.as_ref(), self.filter.as_ref(), self.limit.as_ref())
    }
}

/// Where the rows of an `Insert` come from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum InsertSource {
    Values(Vec<StructValue>),
    Select(Box<Copy>),
}

/// Insert literal rows, or the result of a sub-query, into a table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Insert {
    table: String,
    source: InsertSource,
}

impl Insert {
    /// Create an insert. Exactly one of `vals` and `select` must be given.
    pub fn new(
        table: impl Into<String>,
        vals: Option<Vec<StructValue>>,
        select: Option<Copy>,
    ) -> Result<Self, IrError> {
        let table = table.into();
        let source = match (vals, select) {
            (Some(vals), None) => InsertSource::Values(vals),
            (None, Some(select)) => InsertSource::Select(Box::new(select)),
            (Some(_), Some(_)) => return Err(IrError::InsertSourceConflict { table }),
            (None, None) => return Err(IrError::InsertSourceMissing { table }),
        };
        Ok(Self { table, source })
    }

    pub fn values(table: impl Into<String>, vals: Vec<StructValue>) -> Self {
        Self {
            table: table.into(),
            source: InsertSource::Values(vals),
        }
    }

    pub fn select(table: impl Into<String>, select: Copy) -> Self {
        Self {
            table: table.into(),
            source: InsertSource::Select(Box::new(select)),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn source(&self) -> &InsertSource {
        &self.source
    }
}

impl fmt::Display for Insert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Insert:{} ", self.table)?;
        match &self.source {
            InsertSource::Values(vals) => {
                f.write_str("[")?;
                write_joined(f, vals)?;
                f.write_str("]")
            }
            InsertSource::Select(select) => write!(f, "({})", select),
        }
    }
}

/// Apply assignments, in order, to every row matching the filter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Update {
    table: String,
    assigns: Vec<Assignment>,
    filter: Option<Condition>,
}

impl Update {
    pub fn new(table: impl Into<String>, assigns: Vec<Assignment>, filter: Option<Condition>) -> Self {
        Self {
            table: table.into(),
            assigns,
            filter,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn assigns(&self) -> &[Assignment] {
        &self.assigns
    }

    pub fn filter(&self) -> Option<&Condition> {
        self.filter.as_ref()
    }
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Update:{} [", self.table)?;
        write_joined(f, &self.assigns)?;
        f.write_str("]")?;
        fmt_read_clauses(f, None, self.filter.as_ref(), None)
    }
}

/// Relocate the rows matching the filter out of a table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Move {
    table: String,
    filter: Option<Condition>,
}

impl Move {
    pub fn new(table: impl Into<String>, filter: Option<Condition>) -> Self {
        Self {
            table: table.into(),
            filter,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn filter(&self) -> Option<&Condition> {
        self.filter.as_ref()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move:{}", self.table)?;
        fmt_read_clauses(f, None, self.filter.as_ref(), None)
    }
}

/// Reduce the matching rows of a table to one scalar.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Reduce {
    table: String,
    reducer: Reducer,
    columns: StructType,
    join: Option<JoinCondition>,
    filter: Option<Condition>,
    limit: Option<SingleValue>,
}

impl Reduce {
    pub fn new(
        table: impl Into<String>,
        reducer: Reducer,
        columns: StructType,
        join: Option<JoinCondition>,
        filter: Option<Condition>,
        limit: Option<SingleValue>,
    ) -> Self {
        Self {
            table: table.into(),
            reducer,
            columns,
            join,
            filter,
            limit,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn reducer(&self) -> Reducer {
        self.reducer
    }

    pub fn columns(&self) -> &StructType {
        &self.columns
    }

    pub fn join(&self) -> Option<&JoinCondition> {
        self.join.as_ref()
    }

    pub fn filter(&self) -> Option<&Condition> {
        self.filter.as_ref()
    }

    pub fn limit(&self) -> Option<&SingleValue> {
        self.limit.as_ref()
    }
}

impl fmt::Display for Reduce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reduce:{} {} Cols:{}", self.table, self.reducer, self.columns)?;
        fmt_read_clauses(f, self.join.as_ref(), self.filter.as_ref(), self.limit.as_ref())
    }
}

fn fmt_read_clauses(
    f: &mut fmt::Formatter<'_>,
    join: Option<&JoinCondition>,
    filter: Option<&Condition>,
    limit: Option<&SingleValue>,
) -> fmt::Result {
    if let Some(join) = join {
        write!(f, " join={}", join)?;
    }
    if let Some(filter) = filter {
        write!(f, " where={}", filter)?;
    }
    if let Some(limit) = limit {
        write!(f, " limit={}", limit)?;
    }
    Ok(())
}

/// Any operation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Operation {
    Copy(Copy),
    Insert(Insert),
    Update(Update),
    Move(Move),
    Reduce(Reduce),
}

impl Operation {
    /// The table this operation is scoped to.
    pub fn table(&self) -> &str {
        match self {
            Operation::Copy(op) => op.table(),
            Operation::Insert(op) => op.table(),
            Operation::Update(op) => op.table(),
            Operation::Move(op) => op.table(),
            Operation::Reduce(op) => op.table(),
        }
    }
}

impl From<Copy> for Operation {
    fn from(op: Copy) -> Self {
        Operation::Copy(op)
    }
}

impl From<Insert> for Operation {
    fn from(op: Insert) -> Self {
        Operation::Insert(op)
    }
}

impl From<Update> for Operation {
    fn from(op: Update) -> Self {
        Operation::Update(op)
    }
}

impl From<Move> for Operation {
    fn from(op: Move) -> Self {
        Operation::Move(op)
    }
}

impl From<Reduce> for Operation {
    fn from(op: Reduce) -> Self {
        Operation::Reduce(op)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Copy(op) => op.fmt(f),
            Operation::Insert(op) => op.fmt(f),
            Operation::Update(op) => op.fmt(f),
            Operation::Move(op) => op.fmt(f),
            Operation::Reduce(op) => op.fmt(f),
        }
    }
}
