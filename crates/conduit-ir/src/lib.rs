//! Conduit Intermediate Representation
//!
//! Typed operation trees over named, schema-bound tables, and the dispatch
//! protocol passes use to traverse them.
//!
//! This crate provides:
//! - Type vocabulary (`types`)
//! - Value, schema, condition, and operation nodes
//! - Node classification and borrowed views (`node`)
//! - Ancestor-chain dispatch for passes (`visit`)
//! - The reserved `input`/`output` tables (`reserved`)
//! - The `Evaluator` capability for execution backends (`eval`)

pub mod types;
pub mod error;
pub mod value;
pub mod schema;
pub mod condition;
pub mod operation;
pub mod root;
pub mod node;
pub mod visit;
pub mod reserved;
pub mod eval;

pub use condition::{AlgebraCondition, Condition, JoinCondition, LogicalCondition};
pub use error::{DispatchError, IrError};
pub use eval::Evaluator;
pub use node::{ConditionRef, IrNode, MultipleValueRef, NodeKind, NodeRef, OperationRef, SingleValueRef};
pub use operation::{Copy, Insert, InsertSource, Move, Operation, Reduce, Update};
pub use reserved::{is_reserved, reserved, reserved_table, ReservedTables, INPUT_TABLE, OUTPUT_TABLE};
pub use root::Root;
pub use schema::{FieldType, StructElement, StructType, StructValue, TableDefinition, TableInstance};
pub use types::{ArithmeticOp, CompareOp, ContainerType, DataType, LogicalOp, Reducer};
pub use value::{
    AssignTarget, Assignment, Column, Expression, FunctionCall, FunctionDefinition, Literal,
    LiteralValue, SingleValue, Var,
};
pub use visit::{dispatch, walk, Handled, Visitor};
