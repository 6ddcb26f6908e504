//! Execution capability.
//!
//! IR nodes never compute their own values. An execution backend implements
//! [`Evaluator`] and gives values, rows, and effects to the nodes it supports.

use crate::node::{MultipleValueRef, OperationRef, SingleValueRef};
use crate::root::Root;

/// Implemented by execution backends.
pub trait Evaluator {
    /// Backend state the nodes are evaluated against.
    type Runtime;
    /// A scalar result.
    type Value;
    /// One row of a multi-value result.
    type Row;
    type Error;

    /// Evaluate a single-value node to a scalar.
    fn evaluate(&mut self, node: SingleValueRef<'_>, rt: &mut Self::Runtime) -> Result<Self::Value, Self::Error>;

    /// Evaluate a multi-value node to its rows.
    fn evaluate_rows(&mut self, node: MultipleValueRef<'_>, rt: &mut Self::Runtime) -> Result<Vec<Self::Row>, Self::Error>;

    /// Run an operation for its effect.
    fn execute(&mut self, op: OperationRef<'_>, rt: &mut Self::Runtime) -> Result<(), Self::Error>;

    /// Run a compilation unit in declaration order, stopping at the first error.
    fn execute_root(&mut self, root: &Root, rt: &mut Self::Runtime) -> Result<(), Self::Error> {
        for op in root {
            self.execute(op.into(), rt)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{Insert, Move, Operation};
    use crate::schema::{StructElement, StructValue};
    use crate::types::ArithmeticOp;
    use crate::value::{Expression, Literal, LiteralValue, SingleValue};

    #[derive(Debug, PartialEq)]
    enum ToyError {
        Unsupported,
        DivisionByZero,
    }

    /// Integer-only evaluator that logs the tables it touches.
    struct Toy;

    impl Evaluator for Toy {
        type Runtime = Vec<String>;
        type Value = i64;
        type Row = Vec<i64>;
        type Error = ToyError;

        fn evaluate(&mut self, node: SingleValueRef<'_>, rt: &mut Self::Runtime) -> Result<i64, ToyError> {
            match node {
                SingleValueRef::Literal(lit) => match lit.value() {
                    LiteralValue::Int(n) => Ok(*n),
                    _ => Err(ToyError::Unsupported),
                },
                SingleValueRef::Expression(expr) => {
                    let lhs = self.evaluate(expr.lhs().into(), rt)?;
                    let rhs = self.evaluate(expr.rhs().into(), rt)?;
                    match expr.op() {
                        ArithmeticOp::Add => Ok(lhs + rhs),
                        ArithmeticOp::Sub => Ok(lhs - rhs),
                        ArithmeticOp::Mul => Ok(lhs * rhs),
                        ArithmeticOp::Div if rhs == 0 => Err(ToyError::DivisionByZero),
                        ArithmeticOp::Div => Ok(lhs / rhs),
                    }
                }
                _ => Err(ToyError::Unsupported),
            }
        }

        fn evaluate_rows(&mut self, node: MultipleValueRef<'_>, rt: &mut Self::Runtime) -> Result<Vec<Vec<i64>>, ToyError> {
            match node {
                MultipleValueRef::StructValue(row) => {
                    let mut out = Vec::new();
                    for elem in row.vals() {
                        match elem {
                            StructElement::Single(value) => {
                                out.push(self.evaluate(value.into(), rt)?)
                            }
                            StructElement::Struct(_) => return Err(ToyError::Unsupported),
                        }
                    }
                    Ok(vec![out])
                }
                _ => Err(ToyError::Unsupported),
            }
        }

        fn execute(&mut self, op: OperationRef<'_>, rt: &mut Self::Runtime) -> Result<(), ToyError> {
            match op {
                OperationRef::Move(_) => {
                    rt.push(op.table().to_string());
                    Ok(())
                }
                _ => Err(ToyError::Unsupported),
            }
        }
    }

    #[test]
    fn test_evaluate_expression() {
        let expr = SingleValue::from(Expression::new(
            Expression::new(Literal::int(2), Literal::int(3), ArithmeticOp::Add),
            Literal::int(4),
            ArithmeticOp::Mul,
        ));
        assert_eq!(Toy.evaluate((&expr).into(), &mut Vec::new()), Ok(20));

        let div = SingleValue::from(Expression::new(Literal::int(1), Literal::int(0), ArithmeticOp::Div));
        assert_eq!(Toy.evaluate((&div).into(), &mut Vec::new()), Err(ToyError::DivisionByZero));
    }

    #[test]
    fn test_evaluate_rows() {
        let row = StructValue::new([Literal::int(1), Literal::int(2)]);
        let rows = Toy
            .evaluate_rows(MultipleValueRef::StructValue(&row), &mut Vec::new())
            .unwrap();
        assert_eq!(rows, vec![vec![1, 2]]);
    }

    #[test]
    fn test_execute_root_in_order_and_stops_on_error() {
        let root = Root::new(vec![
            Move::new("a", None).into(),
            Move::new("b", None).into(),
            Operation::from(Insert::values("c", vec![])),
            Move::new("d", None).into(),
        ]);
        let mut log = Vec::new();
        assert_eq!(Toy.execute_root(&root, &mut log), Err(ToyError::Unsupported));
        assert_eq!(log, vec!["a".to_string(), "b".to_string()]);
    }
}
