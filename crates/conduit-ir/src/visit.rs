//! Pass dispatch.
//!
//! A pass implements [`Visitor`], overriding only the handlers it cares about.
//! [`dispatch`] walks a node's ancestor chain ([`NodeKind::ancestors`]) and
//! invokes the first handler the pass implements. A handler on an abstract
//! kind (`visit_operation`, `visit_node`, ...) catches every node of that
//! family that has no more specific handler.

use tracing::{instrument, trace};

use crate::condition::{AlgebraCondition, JoinCondition, LogicalCondition};
use crate::error::DispatchError;
use crate::node::{ConditionRef, MultipleValueRef, NodeKind, NodeRef, OperationRef, SingleValueRef};
use crate::operation::{Copy, Insert, Move, Reduce, Update};
use crate::root::Root;
use crate::schema::{StructType, StructValue, TableDefinition, TableInstance};
use crate::value::{Assignment, Column, Expression, FunctionCall, FunctionDefinition, Literal, Var};

/// What a handler returns. `None` means "not handled here".
pub type Handled<V> = Option<Result<<V as Visitor>::Output, <V as Visitor>::Error>>;

/// A pass over the IR.
///
/// Every handler defaults to `None`. An overridden handler normally returns
/// `Some`, which ends resolution.
///
/// An overridden handler may also return `None` for a particular node to
/// defer it: dispatch then continues with the next kind in the ancestor
/// chain, exactly as if the handler were not implemented. Deferral is the
/// pass's own decision, made per call; a pass that never returns `None` from
/// an override gets plain first-implemented-handler-wins resolution.
pub trait Visitor: Sized {
    /// Caller-supplied state threaded through dispatch. Use `()` for none.
    type Context;
    type Output;
    type Error: From<DispatchError>;

    fn visit_node(&mut self, _node: NodeRef<'_>, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_single_value(&mut self, _node: SingleValueRef<'_>, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_multiple_value(&mut self, _node: MultipleValueRef<'_>, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_condition(&mut self, _node: ConditionRef<'_>, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_operation(&mut self, _node: OperationRef<'_>, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_column(&mut self, _node: &Column, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_literal(&mut self, _node: &Literal, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_var(&mut self, _node: &Var, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_function_definition(&mut self, _node: &FunctionDefinition, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_function_call(&mut self, _node: &FunctionCall, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_expression(&mut self, _node: &Expression, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_assignment(&mut self, _node: &Assignment, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_struct_type(&mut self, _node: &StructType, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_struct_value(&mut self, _node: &StructValue, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_table_definition(&mut self, _node: &TableDefinition, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_table_instance(&mut self, _node: &TableInstance, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_algebra_condition(&mut self, _node: &AlgebraCondition, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_logical_condition(&mut self, _node: &LogicalCondition, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_join_condition(&mut self, _node: &JoinCondition, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_copy(&mut self, _node: &Copy, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_insert(&mut self, _node: &Insert, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_update(&mut self, _node: &Update, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_move(&mut self, _node: &Move, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_reduce(&mut self, _node: &Reduce, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }

    fn visit_root(&mut self, _node: &Root, _ctx: &mut Self::Context) -> Handled<Self> {
        None
    }
}

/// Invoke the handler registered for `kind`, viewing `node` as that kind.
fn invoke<V: Visitor>(node: NodeRef<'_>, kind: NodeKind, visitor: &mut V, ctx: &mut V::Context) -> Handled<V> {
    match (kind, node) {
        (NodeKind::Node, node) => visitor.visit_node(node, ctx),
        (NodeKind::SingleValue, node) => node
            .as_single_value()
            .and_then(|view| visitor.visit_single_value(view, ctx)),
        (NodeKind::MultipleValue, node) => node
            .as_multiple_value()
            .and_then(|view| visitor.visit_multiple_value(view, ctx)),
        (NodeKind::Condition, node) => node
            .as_condition()
            .and_then(|view| visitor.visit_condition(view, ctx)),
        (NodeKind::Operation, node) => node
            .as_operation()
            .and_then(|view| visitor.visit_operation(view, ctx)),
        (NodeKind::Column, NodeRef::Column(n)) => visitor.visit_column(n, ctx),
        (NodeKind::Literal, NodeRef::Literal(n)) => visitor.visit_literal(n, ctx),
        (NodeKind::Var, NodeRef::Var(n)) => visitor.visit_var(n, ctx),
        (NodeKind::FunctionDefinition, NodeRef::FunctionDefinition(n)) => {
            visitor.visit_function_definition(n, ctx)
        }
        (NodeKind::FunctionCall, NodeRef::FunctionCall(n)) => visitor.visit_function_call(n, ctx),
        (NodeKind::Expression, NodeRef::Expression(n)) => visitor.visit_expression(n, ctx),
        (NodeKind::Assignment, NodeRef::Assignment(n)) => visitor.visit_assignment(n, ctx),
        (NodeKind::StructType, NodeRef::StructType(n)) => visitor.visit_struct_type(n, ctx),
        (NodeKind::StructValue, NodeRef::StructValue(n)) => visitor.visit_struct_value(n, ctx),
        (NodeKind::TableDefinition, NodeRef::TableDefinition(n)) => visitor.visit_table_definition(n, ctx),
        (NodeKind::TableInstance, NodeRef::TableInstance(n)) => visitor.visit_table_instance(n, ctx),
        (NodeKind::AlgebraCondition, NodeRef::AlgebraCondition(n)) => visitor.visit_algebra_condition(n, ctx),
        (NodeKind::LogicalCondition, NodeRef::LogicalCondition(n)) => visitor.visit_logical_condition(n, ctx),
        (NodeKind::JoinCondition, NodeRef::JoinCondition(n)) => visitor.visit_join_condition(n, ctx),
        (NodeKind::Copy, NodeRef::Copy(n)) => visitor.visit_copy(n, ctx),
        (NodeKind::Insert, NodeRef::Insert(n)) => visitor.visit_insert(n, ctx),
        (NodeKind::Update, NodeRef::Update(n)) => visitor.visit_update(n, ctx),
        (NodeKind::Move, NodeRef::Move(n)) => visitor.visit_move(n, ctx),
        (NodeKind::Reduce, NodeRef::Reduce(n)) => visitor.visit_reduce(n, ctx),
        (NodeKind::Root, NodeRef::Root(n)) => visitor.visit_root(n, ctx),
        _ => None,
    }
}

/// Dispatch `node` to the most specific handler `visitor` implements.
///
/// Fails with [`DispatchError::Unhandled`] naming the node's concrete kind
/// when no kind in its ancestor chain has a handler.
pub fn dispatch<V: Visitor>(node: NodeRef<'_>, visitor: &mut V, ctx: &mut V::Context) -> Result<V::Output, V::Error> {
    let kind = node.kind();
    for ancestor in kind.ancestors() {
        if let Some(result) = invoke(node, ancestor, visitor, ctx) {
            trace!(node = %kind, handler = %ancestor, "dispatch resolved");
            return result;
        }
    }
    trace!(node = %kind, "dispatch found no handler");
    Err(DispatchError::Unhandled { kind }.into())
}

/// Dispatch every node of the subtree rooted at `node`, parents before
/// children, children in declaration order.
///
/// Each node is dispatched exactly once. Outputs are returned in visit order;
/// the first error stops the walk.
#[instrument(level = "debug", skip_all, fields(root = %node.kind()))]
pub fn walk<V: Visitor>(node: NodeRef<'_>, visitor: &mut V, ctx: &mut V::Context) -> Result<Vec<V::Output>, V::Error> {
    let mut outputs = Vec::new();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        outputs.push(dispatch(current, visitor, ctx)?);
        stack.extend(current.children().into_iter().rev());
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{Condition, LogicalCondition};
    use crate::node::IrNode;
    use crate::operation::Operation;
    use crate::reserved::reserved;
    use crate::types::{ArithmeticOp, CompareOp, DataType, Reducer};
    use crate::value::SingleValue;

    /// Handles only the universal base kind.
    struct KindCollector;

    impl Visitor for KindCollector {
        type Context = ();
        type Output = NodeKind;
        type Error = DispatchError;

        fn visit_node(&mut self, node: NodeRef<'_>, _ctx: &mut ()) -> Handled<Self> {
            Some(Ok(node.kind()))
        }
    }

    /// Records which handler answered. `visit_copy` defers unless enabled.
    #[derive(Default)]
    struct Tagger {
        with_copy: bool,
    }

    impl Visitor for Tagger {
        type Context = Vec<&'static str>;
        type Output = &'static str;
        type Error = DispatchError;

        fn visit_multiple_value(&mut self, _node: MultipleValueRef<'_>, ctx: &mut Self::Context) -> Handled<Self> {
            ctx.push("multiple");
            Some(Ok("multiple"))
        }

        fn visit_copy(&mut self, _node: &Copy, ctx: &mut Self::Context) -> Handled<Self> {
            if !self.with_copy {
                return None;
            }
            ctx.push("copy");
            Some(Ok("copy"))
        }

        fn visit_node(&mut self, _node: NodeRef<'_>, ctx: &mut Self::Context) -> Handled<Self> {
            ctx.push("node");
            Some(Ok("node"))
        }
    }

    /// Handles every operation uniformly.
    struct OperationCounter {
        seen: usize,
    }

    impl Visitor for OperationCounter {
        type Context = ();
        type Output = String;
        type Error = DispatchError;

        fn visit_operation(&mut self, node: OperationRef<'_>, _ctx: &mut ()) -> Handled<Self> {
            self.seen += 1;
            Some(Ok(node.table().to_string()))
        }
    }

    fn users() -> StructType {
        StructType::new("users", [("id", DataType::Int), ("name", DataType::String)])
    }

    fn adults() -> Copy {
        Copy::new(
            "users",
            users(),
            Some(JoinCondition::new(
                "orders",
                Column::new("users", "id", DataType::Int),
                Column::new("orders", "user_id", DataType::Int),
            )),
            Some(Condition::from(LogicalCondition::not(AlgebraCondition::new(
                Column::new("users", "age", DataType::Int),
                Literal::int(18),
                CompareOp::Lt,
            )))),
            Some(SingleValue::from(Expression::new(
                Literal::int(5),
                Literal::int(5),
                ArithmeticOp::Mul,
            ))),
        )
    }

    fn unit() -> Root {
        let call = FunctionCall::new(
            FunctionDefinition::new("upper", vec![DataType::String], DataType::String),
            vec![Column::new("users", "name", DataType::String).into()],
        );
        Root::new(vec![
            adults().into(),
            Insert::values(
                "users",
                vec![StructValue::new([Literal::int(1), Literal::string("Alice")])],
            )
            .into(),
            Update::new(
                "users",
                vec![
                    Assignment::new(Var::new("n", DataType::String), call),
                    Assignment::new(
                        Column::new("users", "name", DataType::String),
                        Var::new("n", DataType::String),
                    ),
                ],
                None,
            )
            .into(),
            Move::new("users", None).into(),
            Reduce::new("users", Reducer::Count, users(), None, None, None).into(),
        ])
    }

    #[test]
    fn base_handler_sees_every_node_once() {
        let root = unit();
        let kinds = walk(root.as_node(), &mut KindCollector, &mut ()).unwrap();

        let count = |k: NodeKind| kinds.iter().filter(|&&seen| seen == k).count();
        assert_eq!(kinds[0], NodeKind::Root);
        assert_eq!(count(NodeKind::Root), 1);
        assert_eq!(count(NodeKind::Copy), 1);
        assert_eq!(count(NodeKind::Insert), 1);
        assert_eq!(count(NodeKind::Update), 1);
        assert_eq!(count(NodeKind::Move), 1);
        assert_eq!(count(NodeKind::Reduce), 1);
        assert_eq!(count(NodeKind::Assignment), 2);
        assert_eq!(count(NodeKind::FunctionDefinition), 1);
        assert_eq!(count(NodeKind::JoinCondition), 1);
        assert_eq!(count(NodeKind::LogicalCondition), 1);
        assert_eq!(count(NodeKind::Expression), 1);
        // users.id, orders.user_id, users.age, upper's arg, assignment target
        assert_eq!(count(NodeKind::Column), 5);
        assert_eq!(count(NodeKind::StructType), 2);
        assert_eq!(kinds.len(), 29);
    }

    #[test]
    fn base_handler_reaches_table_nodes() {
        let kinds = walk(reserved().input().as_node(), &mut KindCollector, &mut ()).unwrap();
        assert_eq!(
            kinds,
            vec![
                NodeKind::TableInstance,
                NodeKind::TableDefinition,
                NodeKind::StructType,
                NodeKind::StructType,
                NodeKind::StructType,
            ]
        );
    }

    #[test]
    fn walk_is_preorder_in_declaration_order() {
        let cond = AlgebraCondition::new(
            Expression::new(Literal::int(1), Literal::int(2), ArithmeticOp::Add),
            Literal::int(3),
            CompareOp::Eq,
        );
        let kinds = walk(cond.as_node(), &mut KindCollector, &mut ()).unwrap();
        assert_eq!(
            kinds,
            vec![
                NodeKind::AlgebraCondition,
                NodeKind::Expression,
                NodeKind::Literal,
                NodeKind::Literal,
                NodeKind::Literal,
            ]
        );
    }

    #[test]
    fn family_handler_applies_to_multi_value_nodes_only() {
        let mut tags = Vec::new();
        let mut pass = Tagger::default();

        assert_eq!(adults().accept(&mut pass, &mut tags).unwrap(), "multiple");
        let row = StructValue::new([Literal::int(1)]);
        assert_eq!(row.accept(&mut pass, &mut tags).unwrap(), "multiple");
        assert_eq!(Literal::int(1).accept(&mut pass, &mut tags).unwrap(), "node");
        assert_eq!(
            Column::new("t", "c", DataType::Int).accept(&mut pass, &mut tags).unwrap(),
            "node"
        );
        assert_eq!(tags, vec!["multiple", "multiple", "node", "node"]);
    }

    #[test]
    fn specific_handler_shadows_family_handler() {
        let mut tags = Vec::new();
        let mut pass = Tagger { with_copy: true };

        assert_eq!(adults().accept(&mut pass, &mut tags).unwrap(), "copy");
        let row = StructValue::new([Literal::int(1)]);
        assert_eq!(row.accept(&mut pass, &mut tags).unwrap(), "multiple");
        assert_eq!(tags, vec!["copy", "multiple"]);
    }

    #[test]
    fn operation_handler_catches_every_operation() {
        let root = unit();
        let mut pass = OperationCounter { seen: 0 };
        for op in &root {
            assert_eq!(op.accept(&mut pass, &mut ()).unwrap(), "users");
        }
        assert_eq!(pass.seen, root.len());
    }

    #[test]
    fn insert_reaches_operation_handler() {
        let insert = Insert::values(
            "users",
            vec![StructValue::new([Literal::int(1), Literal::string("Alice")])],
        );
        let mut pass = OperationCounter { seen: 0 };
        let table = Operation::from(insert).accept(&mut pass, &mut ()).unwrap();
        assert_eq!(table, "users");
        assert_eq!(pass.seen, 1);
    }

    #[test]
    fn unhandled_node_names_its_concrete_kind() {
        let mut pass = OperationCounter { seen: 0 };
        let err = Column::new("users", "age", DataType::Int)
            .accept(&mut pass, &mut ())
            .unwrap_err();
        assert_eq!(err, DispatchError::Unhandled { kind: NodeKind::Column });
        assert_eq!(err.kind(), NodeKind::Column);
        assert_eq!(err.to_string(), "no handler for Column node");

        let err = walk(unit().as_node(), &mut pass, &mut ()).unwrap_err();
        assert_eq!(err.kind(), NodeKind::Root);
    }

    #[test]
    fn reduce_resolves_operation_before_single_value() {
        struct Both;

        impl Visitor for Both {
            type Context = ();
            type Output = &'static str;
            type Error = DispatchError;

            fn visit_single_value(&mut self, _node: SingleValueRef<'_>, _ctx: &mut ()) -> Handled<Self> {
                Some(Ok("single"))
            }

            fn visit_operation(&mut self, _node: OperationRef<'_>, _ctx: &mut ()) -> Handled<Self> {
                Some(Ok("operation"))
            }
        }

        let reduce = Reduce::new("t", Reducer::Max, users(), None, None, None);
        assert_eq!(reduce.accept(&mut Both, &mut ()).unwrap(), "operation");
        assert_eq!(Literal::int(1).accept(&mut Both, &mut ()).unwrap(), "single");
        // Reduce nested as a value still resolves through its own chain
        let nested = SingleValue::from(reduce);
        assert_eq!(nested.accept(&mut Both, &mut ()).unwrap(), "operation");
    }
}
