//! Scalar value nodes.

use std::fmt;

use crate::error::IrError;
use crate::operation::Reduce;
use crate::types::{ArithmeticOp, DataType};

/// The payload of a literal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum LiteralValue {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
}

impl LiteralValue {
    /// The data type the payload naturally carries.
    pub fn data_type(&self) -> DataType {
        match self {
            LiteralValue::Int(_) => DataType::Int,
            LiteralValue::Float(_) => DataType::Float,
            LiteralValue::String(_) => DataType::String,
            LiteralValue::Bool(_) => DataType::Bool,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Int(n) => write!(f, "{}", n),
            LiteralValue::Float(n) => write!(f, "{:?}", n),
            LiteralValue::String(s) => write!(f, "{:?}", s),
            LiteralValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A reference to a field of some table's schema.
///
/// The table is named, not owned; resolution happens in a validation pass.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Column {
    table: String,
    name: String,
    dtype: DataType,
}

impl Column {
    pub fn new(table: impl Into<String>, name: impl Into<String>, dtype: DataType) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            dtype,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> DataType {
        self.dtype
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Column:{}.{} {}", self.table, self.name, self.dtype)
    }
}

/// A typed constant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Literal {
    dtype: DataType,
    value: LiteralValue,
}

impl Literal {
    /// Create a literal, checking the payload against the declared type.
    ///
    /// A literal declared `unknown` accepts any payload.
    pub fn new(dtype: DataType, value: LiteralValue) -> Result<Self, IrError> {
        let found = value.data_type();
        if dtype != DataType::Unknown && dtype != found {
            return Err(IrError::LiteralTypeMismatch {
                expected: dtype,
                found,
            });
        }
        Ok(Self { dtype, value })
    }

    pub fn int(value: i64) -> Self {
        Self::from(LiteralValue::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Self::from(LiteralValue::Float(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::from(LiteralValue::String(value.into()))
    }

    pub fn bool(value: bool) -> Self {
        Self::from(LiteralValue::Bool(value))
    }

    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    pub fn value(&self) -> &LiteralValue {
        &self.value
    }
}

impl From<LiteralValue> for Literal {
    fn from(value: LiteralValue) -> Self {
        Self {
            dtype: value.data_type(),
            value,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Literal:{} {}", self.value, self.dtype)
    }
}

/// A named scalar binding.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Var {
    name: String,
    dtype: DataType,
}

impl Var {
    pub fn new(name: impl Into<String>, dtype: DataType) -> Self {
        Self {
            name: name.into(),
            dtype,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> DataType {
        self.dtype
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Var:{} {}", self.name, self.dtype)
    }
}

/// Signature of a callable function. Its body lives in the execution backend.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FunctionDefinition {
    name: String,
    params: Vec<DataType>,
    ret: DataType,
}

impl FunctionDefinition {
    pub fn new(name: impl Into<String>, params: Vec<DataType>, ret: DataType) -> Self {
        Self {
            name: name.into(),
            params,
            ret,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[DataType] {
        &self.params
    }

    pub fn ret(&self) -> DataType {
        self.ret
    }
}

impl fmt::Display for FunctionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionDefinition:{} [", self.name)?;
        write_joined(f, &self.params)?;
        write!(f, "] -> {}", self.ret)
    }
}

/// Invocation of a function with ordered arguments.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FunctionCall {
    func: FunctionDefinition,
    args: Vec<SingleValue>,
}

impl FunctionCall {
    pub fn new(func: FunctionDefinition, args: Vec<SingleValue>) -> Self {
        Self { func, args }
    }

    pub fn func(&self) -> &FunctionDefinition {
        &self.func
    }

    pub fn args(&self) -> &[SingleValue] {
        &self.args
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionCall:{} [", self.func.name)?;
        write_joined(f, &self.args)?;
        f.write_str("]")
    }
}

/// Binary arithmetic expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Expression {
    lhs: Box<SingleValue>,
    rhs: Box<SingleValue>,
    op: ArithmeticOp,
}

impl Expression {
    pub fn new(lhs: impl Into<SingleValue>, rhs: impl Into<SingleValue>, op: ArithmeticOp) -> Self {
        Self {
            lhs: Box::new(lhs.into()),
            rhs: Box::new(rhs.into()),
            op,
        }
    }

    pub fn lhs(&self) -> &SingleValue {
        &self.lhs
    }

    pub fn rhs(&self) -> &SingleValue {
        &self.rhs
    }

    pub fn op(&self) -> ArithmeticOp {
        self.op
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expression:({} {} {})", self.lhs, self.op, self.rhs)
    }
}

/// The left-hand side of an assignment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AssignTarget {
    Var(Var),
    Column(Column),
}

impl AssignTarget {
    pub fn dtype(&self) -> DataType {
        match self {
            AssignTarget::Var(var) => var.dtype(),
            AssignTarget::Column(col) => col.dtype(),
        }
    }
}

impl From<Var> for AssignTarget {
    fn from(var: Var) -> Self {
        AssignTarget::Var(var)
    }
}

impl From<Column> for AssignTarget {
    fn from(col: Column) -> Self {
        AssignTarget::Column(col)
    }
}

impl fmt::Display for AssignTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignTarget::Var(var) => var.fmt(f),
            AssignTarget::Column(col) => col.fmt(f),
        }
    }
}

/// `target := value`, used inside `Update`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Assignment {
    target: AssignTarget,
    value: SingleValue,
}

impl Assignment {
    pub fn new(target: impl Into<AssignTarget>, value: impl Into<SingleValue>) -> Self {
        Self {
            target: target.into(),
            value: value.into(),
        }
    }

    pub fn target(&self) -> &AssignTarget {
        &self.target
    }

    pub fn value(&self) -> &SingleValue {
        &self.value
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Assignment:{} := {}", self.target, self.value)
    }
}

/// Any node producing a single scalar value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SingleValue {
    Column(Column),
    Literal(Literal),
    Var(Var),
    FunctionCall(FunctionCall),
    Expression(Expression),
    Reduce(Box<Reduce>),
}

impl From<Column> for SingleValue {
    fn from(node: Column) -> Self {
        SingleValue::Column(node)
    }
}

impl From<Literal> for SingleValue {
    fn from(node: Literal) -> Self {
        SingleValue::Literal(node)
    }
}

impl From<Var> for SingleValue {
    fn from(node: Var) -> Self {
        SingleValue::Var(node)
    }
}

impl From<FunctionCall> for SingleValue {
    fn from(node: FunctionCall) -> Self {
        SingleValue::FunctionCall(node)
    }
}

impl From<Expression> for SingleValue {
    fn from(node: Expression) -> Self {
        SingleValue::Expression(node)
    }
}

impl From<Reduce> for SingleValue {
    fn from(node: Reduce) -> Self {
        SingleValue::Reduce(Box::new(node))
    }
}

impl fmt::Display for SingleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SingleValue::Column(node) => node.fmt(f),
            SingleValue::Literal(node) => node.fmt(f),
            SingleValue::Var(node) => node.fmt(f),
            SingleValue::FunctionCall(node) => node.fmt(f),
            SingleValue::Expression(node) => node.fmt(f),
            SingleValue::Reduce(node) => node.fmt(f),
        }
    }
}

/// Write `items` separated by `", "`.
pub(crate) fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
