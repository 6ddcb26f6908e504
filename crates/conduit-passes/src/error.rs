//! Validation error definitions.

use conduit_ir::{DataType, DispatchError, NodeKind, Reducer};
use thiserror::Error;

/// A validation error found by the checker.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckError {
    #[error("undefined table: {table}")]
    UndefinedTable { table: String },

    #[error("undefined column '{column}' in table {table}")]
    UndefinedColumn { table: String, column: String },

    #[error("column {table}.{column} is declared {expected} but referenced as {found}")]
    ColumnTypeMismatch {
        table: String,
        column: String,
        expected: String,
        found: DataType,
    },

    #[error("row for table {table} has {found} fields, schema has {expected}")]
    RowShapeMismatch {
        table: String,
        expected: usize,
        found: usize,
    },

    #[error("{operation} is not allowed on reserved table '{table}'")]
    ReservedTableMisuse { table: String, operation: NodeKind },

    #[error("type mismatch in {context}: expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: DataType,
        found: DataType,
    },

    #[error("cannot apply operator {op} to types {left} and {right}")]
    InvalidOperator {
        op: &'static str,
        left: DataType,
        right: DataType,
    },

    #[error("wrong number of arguments to {function}: expected {expected}, found {found}")]
    WrongArity {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("limit must be an int, found {found}")]
    InvalidLimit { found: DataType },

    #[error("invalid {reducer} reduction: {reason}")]
    InvalidReduction {
        reducer: Reducer,
        reason: &'static str,
    },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
