//! IR error definitions.

use thiserror::Error;

use crate::node::NodeKind;
use crate::types::DataType;

/// A construction-invariant violation. No node is built when one is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrError {
    #[error("logical NOT takes a single operand, found a right-hand side")]
    NotWithRhs,

    #[error("logical {op} requires a right-hand side")]
    MissingRhs { op: &'static str },

    #[error("insert into '{table}' has both literal rows and a sub-query")]
    InsertSourceConflict { table: String },

    #[error("insert into '{table}' has neither literal rows nor a sub-query")]
    InsertSourceMissing { table: String },

    #[error("literal declared as {expected} holds a {found} value")]
    LiteralTypeMismatch { expected: DataType, found: DataType },
}

/// A pass has no handler for a node or any of its ancestor kinds.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    #[error("no handler for {kind} node")]
    Unhandled { kind: NodeKind },
}

impl DispatchError {
    /// The concrete kind of the node that could not be handled.
    pub fn kind(&self) -> NodeKind {
        match self {
            DispatchError::Unhandled { kind } => *kind,
        }
    }
}
