//! Node classification and borrowed node views.
//!
//! Every node has a concrete [`NodeKind`]. Kinds form a hierarchy rooted at
//! [`NodeKind::Node`]; a few kinds have more than one parent (`Copy` is both an
//! operation and a multi-value producer, `Reduce` both an operation and a
//! single value). Dispatch walks [`NodeKind::ancestors`] to pick a handler.
//!
//! Nodes are stored in owned family enums ([`SingleValue`], [`Condition`],
//! [`Operation`]) or directly as fields. The `*Ref` views give every node a
//! uniform borrowed shape regardless of where it is stored.

use std::fmt;

use crate::condition::{AlgebraCondition, Condition, JoinCondition, LogicalCondition};
use crate::operation::{Copy, Insert, InsertSource, Move, Operation, Reduce, Update};
use crate::root::Root;
use crate::schema::{StructElement, StructType, StructValue, TableDefinition, TableInstance};
use crate::value::{
    AssignTarget, Assignment, Column, Expression, FunctionCall, FunctionDefinition, Literal,
    SingleValue, Var,
};
use crate::visit::{dispatch, Visitor};

/// Every kind of node, abstract and concrete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum NodeKind {
    // Abstract
    Node,
    SingleValue,
    MultipleValue,
    Condition,
    Operation,
    // Values
    Column,
    Literal,
    Var,
    FunctionDefinition,
    FunctionCall,
    Expression,
    Assignment,
    // Schema
    StructType,
    StructValue,
    TableDefinition,
    TableInstance,
    // Conditions
    AlgebraCondition,
    LogicalCondition,
    JoinCondition,
    // Operations
    Copy,
    Insert,
    Update,
    Move,
    Reduce,
    Root,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Node => "Node",
            NodeKind::SingleValue => "SingleValue",
            NodeKind::MultipleValue => "MultipleValue",
            NodeKind::Condition => "Condition",
            NodeKind::Operation => "Operation",
            NodeKind::Column => "Column",
            NodeKind::Literal => "Literal",
            NodeKind::Var => "Var",
            NodeKind::FunctionDefinition => "FunctionDefinition",
            NodeKind::FunctionCall => "FunctionCall",
            NodeKind::Expression => "Expression",
            NodeKind::Assignment => "Assignment",
            NodeKind::StructType => "StructType",
            NodeKind::StructValue => "StructValue",
            NodeKind::TableDefinition => "TableDefinition",
            NodeKind::TableInstance => "TableInstance",
            NodeKind::AlgebraCondition => "AlgebraCondition",
            NodeKind::LogicalCondition => "LogicalCondition",
            NodeKind::JoinCondition => "JoinCondition",
            NodeKind::Copy => "Copy",
            NodeKind::Insert => "Insert",
            NodeKind::Update => "Update",
            NodeKind::Move => "Move",
            NodeKind::Reduce => "Reduce",
            NodeKind::Root => "Root",
        }
    }

    /// Immediate parents, in declaration order.
    pub fn parents(self) -> &'static [NodeKind] {
        match self {
            NodeKind::Node => &[],
            NodeKind::SingleValue
            | NodeKind::MultipleValue
            | NodeKind::Condition
            | NodeKind::Operation => &[NodeKind::Node],
            NodeKind::Column
            | NodeKind::Literal
            | NodeKind::Var
            | NodeKind::FunctionCall
            | NodeKind::Expression => &[NodeKind::SingleValue],
            NodeKind::FunctionDefinition
            | NodeKind::Assignment
            | NodeKind::StructType
            | NodeKind::TableDefinition
            | NodeKind::Root => &[NodeKind::Node],
            NodeKind::StructValue | NodeKind::TableInstance => &[NodeKind::MultipleValue],
            NodeKind::AlgebraCondition | NodeKind::LogicalCondition | NodeKind::JoinCondition => {
                &[NodeKind::Condition]
            }
            NodeKind::Copy => &[NodeKind::Operation, NodeKind::MultipleValue],
            NodeKind::Reduce => &[NodeKind::Operation, NodeKind::SingleValue],
            NodeKind::Insert | NodeKind::Update | NodeKind::Move => &[NodeKind::Operation],
        }
    }

    /// Check if no node can have this as its concrete kind.
    pub fn is_abstract(self) -> bool {
        matches!(
            self,
            NodeKind::Node
                | NodeKind::SingleValue
                | NodeKind::MultipleValue
                | NodeKind::Condition
                | NodeKind::Operation
        )
    }

    /// The handler lookup chain, most specific first.
    ///
    /// Starts at `self`, then visits each declared parent's chain depth-first
    /// in declaration order, skipping kinds already seen. The universal
    /// [`NodeKind::Node`] is always last.
    pub fn ancestors(self) -> Vec<NodeKind> {
        let mut chain = vec![self];
        if self != NodeKind::Node {
            self.collect_parents(&mut chain);
            chain.push(NodeKind::Node);
        }
        chain
    }

    fn collect_parents(self, chain: &mut Vec<NodeKind>) {
        for &parent in self.parents() {
            if parent == NodeKind::Node || chain.contains(&parent) {
                continue;
            }
            chain.push(parent);
            parent.collect_parents(chain);
        }
    }

    /// Check if `self` is `other` or derives from it.
    pub fn is_a(self, other: NodeKind) -> bool {
        self.ancestors().contains(&other)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A borrowed view of any concrete node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'a> {
    Column(&'a Column),
    Literal(&'a Literal),
    Var(&'a Var),
    FunctionDefinition(&'a FunctionDefinition),
    FunctionCall(&'a FunctionCall),
    Expression(&'a Expression),
    Assignment(&'a Assignment),
    StructType(&'a StructType),
    StructValue(&'a StructValue),
    TableDefinition(&'a TableDefinition),
    TableInstance(&'a TableInstance),
    AlgebraCondition(&'a AlgebraCondition),
    LogicalCondition(&'a LogicalCondition),
    JoinCondition(&'a JoinCondition),
    Copy(&'a Copy),
    Insert(&'a Insert),
    Update(&'a Update),
    Move(&'a Move),
    Reduce(&'a Reduce),
    Root(&'a Root),
}

impl<'a> NodeRef<'a> {
    /// The concrete kind of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRef::Column(_) => NodeKind::Column,
            NodeRef::Literal(_) => NodeKind::Literal,
            NodeRef::Var(_) => NodeKind::Var,
            NodeRef::FunctionDefinition(_) => NodeKind::FunctionDefinition,
            NodeRef::FunctionCall(_) => NodeKind::FunctionCall,
            NodeRef::Expression(_) => NodeKind::Expression,
            NodeRef::Assignment(_) => NodeKind::Assignment,
            NodeRef::StructType(_) => NodeKind::StructType,
            NodeRef::StructValue(_) => NodeKind::StructValue,
            NodeRef::TableDefinition(_) => NodeKind::TableDefinition,
            NodeRef::TableInstance(_) => NodeKind::TableInstance,
            NodeRef::AlgebraCondition(_) => NodeKind::AlgebraCondition,
            NodeRef::LogicalCondition(_) => NodeKind::LogicalCondition,
            NodeRef::JoinCondition(_) => NodeKind::JoinCondition,
            NodeRef::Copy(_) => NodeKind::Copy,
            NodeRef::Insert(_) => NodeKind::Insert,
            NodeRef::Update(_) => NodeKind::Update,
            NodeRef::Move(_) => NodeKind::Move,
            NodeRef::Reduce(_) => NodeKind::Reduce,
            NodeRef::Root(_) => NodeKind::Root,
        }
    }

    /// Owned children, in declaration order.
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        let mut out = Vec::new();
        match *self {
            NodeRef::Column(_)
            | NodeRef::Literal(_)
            | NodeRef::Var(_)
            | NodeRef::FunctionDefinition(_) => {}
            NodeRef::FunctionCall(node) => {
                out.push(NodeRef::FunctionDefinition(node.func()));
                out.extend(node.args().iter().map(NodeRef::from));
            }
            NodeRef::Expression(node) => {
                out.push(node.lhs().into());
                out.push(node.rhs().into());
            }
            NodeRef::Assignment(node) => {
                out.push(node.target().into());
                out.push(node.value().into());
            }
            NodeRef::StructType(node) => out.extend(node.nested().map(NodeRef::StructType)),
            NodeRef::StructValue(node) => out.extend(node.vals().iter().map(NodeRef::from)),
            NodeRef::TableDefinition(node) => out.push(NodeRef::StructType(node.schema())),
            NodeRef::TableInstance(node) => {
                out.push(NodeRef::TableDefinition(node.definition()));
                out.extend(node.rows().iter().map(NodeRef::StructValue));
            }
            NodeRef::AlgebraCondition(node) => {
                out.push(node.lhs().into());
                out.push(node.rhs().into());
            }
            NodeRef::LogicalCondition(node) => {
                out.push(node.lhs().into());
                out.extend(node.rhs().map(NodeRef::from));
            }
            NodeRef::JoinCondition(node) => {
                out.push(NodeRef::Column(node.lhs()));
                out.push(NodeRef::Column(node.rhs()));
            }
            NodeRef::Copy(node) => {
                push_read_children(&mut out, node.columns(), node.join(), node.filter(), node.limit())
            }
            NodeRef::Insert(node) => match node.source() {
                InsertSource::Values(rows) => out.extend(rows.iter().map(NodeRef::StructValue)),
                InsertSource::Select(select) => out.push(NodeRef::Copy(select)),
            },
            NodeRef::Update(node) => {
                out.extend(node.assigns().iter().map(NodeRef::Assignment));
                out.extend(node.filter().map(NodeRef::from));
            }
            NodeRef::Move(node) => out.extend(node.filter().map(NodeRef::from)),
            NodeRef::Reduce(node) => {
                push_read_children(&mut out, node.columns(), node.join(), node.filter(), node.limit())
            }
            NodeRef::Root(node) => out.extend(node.iter().map(NodeRef::from)),
        }
        out
    }

    /// View this node as a single value, if it is one.
    pub fn as_single_value(&self) -> Option<SingleValueRef<'a>> {
        match *self {
            NodeRef::Column(node) => Some(SingleValueRef::Column(node)),
            NodeRef::Literal(node) => Some(SingleValueRef::Literal(node)),
            NodeRef::Var(node) => Some(SingleValueRef::Var(node)),
            NodeRef::FunctionCall(node) => Some(SingleValueRef::FunctionCall(node)),
            NodeRef::Expression(node) => Some(SingleValueRef::Expression(node)),
            NodeRef::Reduce(node) => Some(SingleValueRef::Reduce(node)),
            _ => None,
        }
    }

    /// View this node as a multi-value producer, if it is one.
    pub fn as_multiple_value(&self) -> Option<MultipleValueRef<'a>> {
        match *self {
            NodeRef::StructValue(node) => Some(MultipleValueRef::StructValue(node)),
            NodeRef::TableInstance(node) => Some(MultipleValueRef::TableInstance(node)),
            NodeRef::Copy(node) => Some(MultipleValueRef::Copy(node)),
            _ => None,
        }
    }

    /// View this node as a condition, if it is one.
    pub fn as_condition(&self) -> Option<ConditionRef<'a>> {
        match *self {
            NodeRef::AlgebraCondition(node) => Some(ConditionRef::Algebra(node)),
            NodeRef::LogicalCondition(node) => Some(ConditionRef::Logical(node)),
            NodeRef::JoinCondition(node) => Some(ConditionRef::Join(node)),
            _ => None,
        }
    }

    /// View this node as an operation, if it is one.
    pub fn as_operation(&self) -> Option<OperationRef<'a>> {
        match *self {
            NodeRef::Copy(node) => Some(OperationRef::Copy(node)),
            NodeRef::Insert(node) => Some(OperationRef::Insert(node)),
            NodeRef::Update(node) => Some(OperationRef::Update(node)),
            NodeRef::Move(node) => Some(OperationRef::Move(node)),
            NodeRef::Reduce(node) => Some(OperationRef::Reduce(node)),
            _ => None,
        }
    }
}

fn push_read_children<'a>(
    out: &mut Vec<NodeRef<'a>>,
    columns: &'a StructType,
    join: Option<&'a JoinCondition>,
    filter: Option<&'a Condition>,
    limit: Option<&'a SingleValue>,
) {
    out.push(NodeRef::StructType(columns));
    out.extend(join.map(NodeRef::JoinCondition));
    out.extend(filter.map(NodeRef::from));
    out.extend(limit.map(NodeRef::from));
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Column(node) => node.fmt(f),
            NodeRef::Literal(node) => node.fmt(f),
            NodeRef::Var(node) => node.fmt(f),
            NodeRef::FunctionDefinition(node) => node.fmt(f),
            NodeRef::FunctionCall(node) => node.fmt(f),
            NodeRef::Expression(node) => node.fmt(f),
            NodeRef::Assignment(node) => node.fmt(f),
            NodeRef::StructType(node) => node.fmt(f),
            NodeRef::StructValue(node) => node.fmt(f),
            NodeRef::TableDefinition(node) => node.fmt(f),
            NodeRef::TableInstance(node) => node.fmt(f),
            NodeRef::AlgebraCondition(node) => node.fmt(f),
            NodeRef::LogicalCondition(node) => node.fmt(f),
            NodeRef::JoinCondition(node) => node.fmt(f),
            NodeRef::Copy(node) => node.fmt(f),
            NodeRef::Insert(node) => node.fmt(f),
            NodeRef::Update(node) => node.fmt(f),
            NodeRef::Move(node) => node.fmt(f),
            NodeRef::Reduce(node) => node.fmt(f),
            NodeRef::Root(node) => node.fmt(f),
        }
    }
}

impl<'a> From<&'a SingleValue> for NodeRef<'a> {
    fn from(value: &'a SingleValue) -> Self {
        SingleValueRef::from(value).as_node()
    }
}

impl<'a> From<&'a Condition> for NodeRef<'a> {
    fn from(cond: &'a Condition) -> Self {
        ConditionRef::from(cond).as_node()
    }
}

impl<'a> From<&'a Operation> for NodeRef<'a> {
    fn from(op: &'a Operation) -> Self {
        OperationRef::from(op).as_node()
    }
}

impl<'a> From<&'a StructElement> for NodeRef<'a> {
    fn from(elem: &'a StructElement) -> Self {
        match elem {
            StructElement::Struct(value) => NodeRef::StructValue(value),
            StructElement::Single(value) => value.into(),
        }
    }
}

impl<'a> From<&'a AssignTarget> for NodeRef<'a> {
    fn from(target: &'a AssignTarget) -> Self {
        match target {
            AssignTarget::Var(var) => NodeRef::Var(var),
            AssignTarget::Column(col) => NodeRef::Column(col),
        }
    }
}

/// A borrowed view of any single-value node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SingleValueRef<'a> {
    Column(&'a Column),
    Literal(&'a Literal),
    Var(&'a Var),
    FunctionCall(&'a FunctionCall),
    Expression(&'a Expression),
    Reduce(&'a Reduce),
}

impl<'a> SingleValueRef<'a> {
    pub fn as_node(self) -> NodeRef<'a> {
        match self {
            SingleValueRef::Column(node) => NodeRef::Column(node),
            SingleValueRef::Literal(node) => NodeRef::Literal(node),
            SingleValueRef::Var(node) => NodeRef::Var(node),
            SingleValueRef::FunctionCall(node) => NodeRef::FunctionCall(node),
            SingleValueRef::Expression(node) => NodeRef::Expression(node),
            SingleValueRef::Reduce(node) => NodeRef::Reduce(node),
        }
    }
}

impl<'a> From<&'a SingleValue> for SingleValueRef<'a> {
    fn from(value: &'a SingleValue) -> Self {
        match value {
            SingleValue::Column(node) => SingleValueRef::Column(node),
            SingleValue::Literal(node) => SingleValueRef::Literal(node),
            SingleValue::Var(node) => SingleValueRef::Var(node),
            SingleValue::FunctionCall(node) => SingleValueRef::FunctionCall(node),
            SingleValue::Expression(node) => SingleValueRef::Expression(node),
            SingleValue::Reduce(node) => SingleValueRef::Reduce(node),
        }
    }
}

/// A borrowed view of any multi-value node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MultipleValueRef<'a> {
    StructValue(&'a StructValue),
    TableInstance(&'a TableInstance),
    Copy(&'a Copy),
}

impl<'a> MultipleValueRef<'a> {
    pub fn as_node(self) -> NodeRef<'a> {
        match self {
            MultipleValueRef::StructValue(node) => NodeRef::StructValue(node),
            MultipleValueRef::TableInstance(node) => NodeRef::TableInstance(node),
            MultipleValueRef::Copy(node) => NodeRef::Copy(node),
        }
    }
}

/// A borrowed view of any condition node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConditionRef<'a> {
    Algebra(&'a AlgebraCondition),
    Logical(&'a LogicalCondition),
    Join(&'a JoinCondition),
}

impl<'a> ConditionRef<'a> {
    pub fn as_node(self) -> NodeRef<'a> {
        match self {
            ConditionRef::Algebra(node) => NodeRef::AlgebraCondition(node),
            ConditionRef::Logical(node) => NodeRef::LogicalCondition(node),
            ConditionRef::Join(node) => NodeRef::JoinCondition(node),
        }
    }
}

impl<'a> From<&'a Condition> for ConditionRef<'a> {
    fn from(cond: &'a Condition) -> Self {
        match cond {
            Condition::Algebra(node) => ConditionRef::Algebra(node),
            Condition::Logical(node) => ConditionRef::Logical(node),
            Condition::Join(node) => ConditionRef::Join(node),
        }
    }
}

/// A borrowed view of any operation node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OperationRef<'a> {
    Copy(&'a Copy),
    Insert(&'a Insert),
    Update(&'a Update),
    Move(&'a Move),
    Reduce(&'a Reduce),
}

impl<'a> OperationRef<'a> {
    pub fn as_node(self) -> NodeRef<'a> {
        match self {
            OperationRef::Copy(node) => NodeRef::Copy(node),
            OperationRef::Insert(node) => NodeRef::Insert(node),
            OperationRef::Update(node) => NodeRef::Update(node),
            OperationRef::Move(node) => NodeRef::Move(node),
            OperationRef::Reduce(node) => NodeRef::Reduce(node),
        }
    }

    /// The table this operation is scoped to.
    pub fn table(self) -> &'a str {
        match self {
            OperationRef::Copy(node) => node.table(),
            OperationRef::Insert(node) => node.table(),
            OperationRef::Update(node) => node.table(),
            OperationRef::Move(node) => node.table(),
            OperationRef::Reduce(node) => node.table(),
        }
    }
}

impl<'a> From<&'a Operation> for OperationRef<'a> {
    fn from(op: &'a Operation) -> Self {
        match op {
            Operation::Copy(node) => OperationRef::Copy(node),
            Operation::Insert(node) => OperationRef::Insert(node),
            Operation::Update(node) => OperationRef::Update(node),
            Operation::Move(node) => OperationRef::Move(node),
            Operation::Reduce(node) => OperationRef::Reduce(node),
        }
    }
}

/// Implemented by every node and node view.
pub trait IrNode {
    fn as_node(&self) -> NodeRef<'_>;

    /// The concrete kind of this node.
    fn kind(&self) -> NodeKind {
        self.as_node().kind()
    }

    /// Dispatch this node to the most specific handler `visitor` implements.
    fn accept<V: Visitor>(&self, visitor: &mut V, ctx: &mut V::Context) -> Result<V::Output, V::Error> {
        dispatch(self.as_node(), visitor, ctx)
    }
}

impl IrNode for NodeRef<'_> {
    fn as_node(&self) -> NodeRef<'_> {
        *self
    }
}

impl IrNode for SingleValueRef<'_> {
    fn as_node(&self) -> NodeRef<'_> {
        SingleValueRef::as_node(*self)
    }
}

impl IrNode for MultipleValueRef<'_> {
    fn as_node(&self) -> NodeRef<'_> {
        MultipleValueRef::as_node(*self)
    }
}

impl IrNode for ConditionRef<'_> {
    fn as_node(&self) -> NodeRef<'_> {
        ConditionRef::as_node(*self)
    }
}

impl IrNode for OperationRef<'_> {
    fn as_node(&self) -> NodeRef<'_> {
        OperationRef::as_node(*self)
    }
}

impl IrNode for SingleValue {
    fn as_node(&self) -> NodeRef<'_> {
        self.into()
    }
}

impl IrNode for Condition {
    fn as_node(&self) -> NodeRef<'_> {
        self.into()
    }
}

impl IrNode for Operation {
    fn as_node(&self) -> NodeRef<'_> {
        self.into()
    }
}

impl IrNode for StructElement {
    fn as_node(&self) -> NodeRef<'_> {
        self.into()
    }
}

impl IrNode for AssignTarget {
    fn as_node(&self) -> NodeRef<'_> {
        self.into()
    }
}

impl IrNode for Column {
    fn as_node(&self) -> NodeRef<'_> {
        NodeRef::Column(self)
    }
}

impl IrNode for Literal {
    fn as_node(&self) -> NodeRef<'_> {
        NodeRef::Literal(self)
    }
}

impl IrNode for Var {
    fn as_node(&self) -> NodeRef<'_> {
        NodeRef::Var(self)
    }
}

impl IrNode for FunctionDefinition {
    fn as_node(&self) -> NodeRef<'_> {
        NodeRef::FunctionDefinition(self)
    }
}

impl IrNode for FunctionCall {
    fn as_node(&self) -> NodeRef<'_> {
        NodeRef::FunctionCall(self)
    }
}

impl IrNode for Expression {
    fn as_node(&self) -> NodeRef<'_> {
        NodeRef::Expression(self)
    }
}

impl IrNode for Assignment {
    fn as_node(&self) -> NodeRef<'_> {
        NodeRef::Assignment(self)
    }
}

impl IrNode for StructType {
    fn as_node(&self) -> NodeRef<'_> {
        NodeRef::StructType(self)
    }
}

impl IrNode for StructValue {
    fn as_node(&self) -> NodeRef<'_> {
        NodeRef::StructValue(self)
    }
}

impl IrNode for TableDefinition {
    fn as_node(&self) -> NodeRef<'_> {
        NodeRef::TableDefinition(self)
    }
}

impl IrNode for TableInstance {
    fn as_node(&self) -> NodeRef<'_> {
        NodeRef::TableInstance(self)
    }
}

impl IrNode for AlgebraCondition {
    fn as_node(&self) -> NodeRef<'_> {
        NodeRef::AlgebraCondition(self)
    }
}

impl IrNode for LogicalCondition {
    fn as_node(&self) -> NodeRef<'_> {
        NodeRef::LogicalCondition(self)
    }
}

impl IrNode for JoinCondition {
    fn as_node(&self) -> NodeRef<'_> {
        NodeRef::JoinCondition(self)
    }
}

impl IrNode for Copy {
    fn as_node(&self) -> NodeRef<'_> {
        NodeRef::Copy(self)
    }
}

impl IrNode for Insert {
    fn as_node(&self) -> NodeRef<'_> {
        NodeRef::Insert(self)
    }
}

impl IrNode for Update {
    fn as_node(&self) -> NodeRef<'_> {
        NodeRef::Update(self)
    }
}

impl IrNode for Move {
    fn as_node(&self) -> NodeRef<'_> {
        NodeRef::Move(self)
    }
}

impl IrNode for Reduce {
    fn as_node(&self) -> NodeRef<'_> {
        NodeRef::Reduce(self)
    }
}

impl IrNode for Root {
    fn as_node(&self) -> NodeRef<'_> {
        NodeRef::Root(self)
    }
}
