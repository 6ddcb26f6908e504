//! Validation pass for Conduit IR.
//!
//! Resolves tables and columns against a [`Catalog`], infers value types
//! bottom-up, and reports every problem it finds rather than stopping at the
//! first one.

use std::collections::{HashMap, HashSet};

use conduit_ir::{
    AlgebraCondition, ArithmeticOp, AssignTarget, Assignment, Column, Condition, Copy, DataType,
    Expression, FieldType, FunctionCall, Handled, Insert, InsertSource, IrNode, JoinCondition,
    Literal, LogicalCondition, Move, NodeKind, NodeRef, Reduce, Reducer, Root, SingleValue,
    StructElement, StructType, StructValue, Update, Var, Visitor, INPUT_TABLE, OUTPUT_TABLE,
};
use tracing::{debug, instrument};

use crate::catalog::Catalog;
use crate::error::CheckError;

/// Check a compilation unit against a catalog.
///
/// Each operation is checked in its own variable scope.
#[instrument(level = "debug", skip_all, fields(operations = root.len()))]
pub fn check_root(root: &Root, catalog: &Catalog) -> Result<(), Vec<CheckError>> {
    let mut checker = Checker::new(catalog);
    if let Err(e) = root.accept(&mut checker, &mut Scope::default()) {
        checker.report(e);
    }
    checker.finish(())
}

/// Infer the type of a single value, checking it on the way.
pub fn infer_type(value: &SingleValue, catalog: &Catalog) -> Result<DataType, Vec<CheckError>> {
    let mut checker = Checker::new(catalog);
    let ty = match value.accept(&mut checker, &mut Scope::default()) {
        Ok(ty) => ty,
        Err(e) => {
            checker.report(e);
            DataType::Unknown
        }
    };
    checker.finish(ty)
}

/// Variables bound so far within one operation.
#[derive(Debug, Default)]
struct Scope {
    vars: HashMap<String, DataType>,
}

impl Scope {
    fn lookup(&self, name: &str) -> Option<DataType> {
        self.vars.get(name).copied()
    }

    fn bind(&mut self, name: &str, ty: DataType) -> Option<DataType> {
        self.vars.insert(name.to_string(), ty)
    }
}

/// The checker state.
struct Checker<'c> {
    catalog: &'c Catalog,
    errors: Vec<CheckError>,
    missing_tables: HashSet<String>,
}

impl<'c> Checker<'c> {
    fn new(catalog: &'c Catalog) -> Self {
        Self {
            catalog,
            errors: Vec::new(),
            missing_tables: HashSet::new(),
        }
    }

    fn finish<T>(self, value: T) -> Result<T, Vec<CheckError>> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            debug!(errors = self.errors.len(), "check failed");
            Err(self.errors)
        }
    }

    fn report(&mut self, error: CheckError) {
        // An unresolved table is reported at its first reference only
        if let CheckError::UndefinedTable { table } = &error {
            if !self.missing_tables.insert(table.clone()) {
                return;
            }
        }
        self.errors.push(error);
    }

    fn infer(&mut self, value: &SingleValue, scope: &mut Scope) -> Result<DataType, CheckError> {
        value.accept(self, scope)
    }

    /// Resolve an operation's target table.
    fn require_table(&mut self, table: &str) -> Option<&'c StructType> {
        match self.catalog.get_table(table) {
            Some(def) => Some(def.schema()),
            None => {
                self.report(CheckError::UndefinedTable {
                    table: table.to_string(),
                });
                None
            }
        }
    }

    /// `input` is read-only, `output` is write-only.
    fn check_access(&mut self, table: &str, operation: NodeKind) {
        let misuse = match operation {
            NodeKind::Insert | NodeKind::Update => table == INPUT_TABLE,
            NodeKind::Copy | NodeKind::Reduce | NodeKind::Move | NodeKind::JoinCondition => {
                table == OUTPUT_TABLE
            }
            _ => false,
        };
        if misuse {
            self.report(CheckError::ReservedTableMisuse {
                table: table.to_string(),
                operation,
            });
        }
    }

    /// Every projected field must exist in the table with the same shape.
    /// Nested structs are checked field by field under a dotted prefix.
    fn check_projection(&mut self, table: &str, prefix: &str, schema: &StructType, columns: &StructType) {
        for (name, field) in columns.fields() {
            let column = format!("{}{}", prefix, name);
            match (schema.field(name), field) {
                (None, _) => self.report(CheckError::UndefinedColumn {
                    table: table.to_string(),
                    column,
                }),
                (Some(FieldType::Scalar(declared)), FieldType::Scalar(found)) => {
                    if !compatible(*declared, *found) {
                        self.report(CheckError::ColumnTypeMismatch {
                            table: table.to_string(),
                            column,
                            expected: declared.to_string(),
                            found: *found,
                        });
                    }
                }
                (Some(FieldType::Struct(declared)), FieldType::Struct(projected)) => {
                    self.check_projection(table, &format!("{}.", column), declared, projected);
                }
                (Some(declared), _) => self.report(CheckError::ColumnTypeMismatch {
                    table: table.to_string(),
                    column,
                    expected: declared.to_string(),
                    found: DataType::Unknown,
                }),
            }
        }
    }

    fn check_limit(&mut self, limit: Option<&SingleValue>, scope: &mut Scope) -> Result<(), CheckError> {
        if let Some(limit) = limit {
            let found = self.infer(limit, scope)?;
            if !compatible(DataType::Int, found) {
                self.report(CheckError::InvalidLimit { found });
            }
        }
        Ok(())
    }

    /// Check the join and filter clauses shared by the query operations.
    fn check_clauses(
        &mut self,
        join: Option<&JoinCondition>,
        filter: Option<&Condition>,
        scope: &mut Scope,
    ) -> Result<(), CheckError> {
        if let Some(join) = join {
            join.accept(self, scope)?;
        }
        if let Some(filter) = filter {
            filter.accept(self, scope)?;
        }
        Ok(())
    }

    /// Check a literal row against a (possibly nested) schema.
    fn check_row(
        &mut self,
        table: &str,
        prefix: &str,
        schema: &StructType,
        row: &StructValue,
        scope: &mut Scope,
    ) -> Result<(), CheckError> {
        if row.width() != schema.width() {
            self.report(CheckError::RowShapeMismatch {
                table: table.to_string(),
                expected: schema.width(),
                found: row.width(),
            });
            return Ok(());
        }
        for ((name, field), elem) in schema.fields().iter().zip(row.vals()) {
            let column = format!("{}{}", prefix, name);
            match (field, elem) {
                (FieldType::Scalar(declared), StructElement::Single(value)) => {
                    let found = self.infer(value, scope)?;
                    if !compatible(*declared, found) {
                        self.report(CheckError::ColumnTypeMismatch {
                            table: table.to_string(),
                            column,
                            expected: declared.to_string(),
                            found,
                        });
                    }
                }
                (FieldType::Struct(inner), StructElement::Struct(nested)) => {
                    self.check_row(table, &format!("{}.", column), inner, nested, scope)?;
                }
                (declared, _) => self.report(CheckError::ColumnTypeMismatch {
                    table: table.to_string(),
                    column,
                    expected: declared.to_string(),
                    found: DataType::Unknown,
                }),
            }
        }
        Ok(())
    }

    fn check_copy(&mut self, copy: &Copy, scope: &mut Scope) -> Result<DataType, CheckError> {
        self.check_access(copy.table(), NodeKind::Copy);
        if let Some(schema) = self.require_table(copy.table()) {
            self.check_projection(copy.table(), "", schema, copy.columns());
        }
        self.check_clauses(copy.join(), copy.filter(), scope)?;
        self.check_limit(copy.limit(), scope)?;
        Ok(DataType::Unknown)
    }

    fn check_insert(&mut self, insert: &Insert, scope: &mut Scope) -> Result<DataType, CheckError> {
        let table = insert.table();
        self.check_access(table, NodeKind::Insert);
        let schema = self.require_table(table);
        match insert.source() {
            InsertSource::Values(rows) => {
                for row in rows {
                    match schema {
                        Some(schema) => self.check_row(table, "", schema, row, scope)?,
                        None => {
                            row.accept(self, scope)?;
                        }
                    }
                }
            }
            InsertSource::Select(select) => {
                self.check_copy(select, scope)?;
                if let Some(schema) = schema {
                    if select.columns().width() != schema.width() {
                        self.report(CheckError::RowShapeMismatch {
                            table: table.to_string(),
                            expected: schema.width(),
                            found: select.columns().width(),
                        });
                    }
                }
            }
        }
        Ok(DataType::Unknown)
    }

    fn check_update(&mut self, update: &Update, scope: &mut Scope) -> Result<DataType, CheckError> {
        self.check_access(update.table(), NodeKind::Update);
        self.require_table(update.table());
        for assign in update.assigns() {
            assign.accept(self, scope)?;
        }
        self.check_clauses(None, update.filter(), scope)?;
        Ok(DataType::Unknown)
    }

    fn check_move(&mut self, mv: &Move, scope: &mut Scope) -> Result<DataType, CheckError> {
        self.check_access(mv.table(), NodeKind::Move);
        self.require_table(mv.table());
        self.check_clauses(None, mv.filter(), scope)?;
        Ok(DataType::Unknown)
    }

    fn check_reduce(&mut self, reduce: &Reduce, scope: &mut Scope) -> Result<DataType, CheckError> {
        self.check_access(reduce.table(), NodeKind::Reduce);
        if let Some(schema) = self.require_table(reduce.table()) {
            self.check_projection(reduce.table(), "", schema, reduce.columns());
        }
        self.check_clauses(reduce.join(), reduce.filter(), scope)?;
        self.check_limit(reduce.limit(), scope)?;

        let reducer = reduce.reducer();
        let field = match reduce.columns().fields() {
            [(_, FieldType::Scalar(ty))] => Some(*ty),
            _ => None,
        };
        let ty = match (reducer, field) {
            (Reducer::Count, _) => DataType::Int,
            (Reducer::Sum | Reducer::Avg, Some(ty)) if ty.is_numeric() || ty == DataType::Unknown => {
                if reducer == Reducer::Avg {
                    DataType::Float
                } else {
                    ty
                }
            }
            (Reducer::Sum | Reducer::Avg, _) => {
                self.report(CheckError::InvalidReduction {
                    reducer,
                    reason: "expects exactly one numeric field",
                });
                DataType::Unknown
            }
            (Reducer::Min | Reducer::Max, Some(ty)) => ty,
            (Reducer::Min | Reducer::Max, None) => {
                self.report(CheckError::InvalidReduction {
                    reducer,
                    reason: "expects exactly one scalar field",
                });
                DataType::Unknown
            }
        };
        Ok(ty)
    }

    fn check_column(&mut self, column: &Column) -> DataType {
        if self.catalog.get_table(column.table()).is_none() {
            self.report(CheckError::UndefinedTable {
                table: column.table().to_string(),
            });
            return column.dtype();
        }
        match self.catalog.column_type(column.table(), column.name()) {
            None => self.report(CheckError::UndefinedColumn {
                table: column.table().to_string(),
                column: column.name().to_string(),
            }),
            Some(FieldType::Scalar(declared)) if compatible(*declared, column.dtype()) => {}
            Some(declared) => self.report(CheckError::ColumnTypeMismatch {
                table: column.table().to_string(),
                column: column.name().to_string(),
                expected: declared.to_string(),
                found: column.dtype(),
            }),
        }
        column.dtype()
    }

    fn check_call(&mut self, call: &FunctionCall, scope: &mut Scope) -> Result<DataType, CheckError> {
        let func = call.func();
        if call.args().len() != func.params().len() {
            self.report(CheckError::WrongArity {
                function: func.name().to_string(),
                expected: func.params().len(),
                found: call.args().len(),
            });
        }
        for (i, arg) in call.args().iter().enumerate() {
            let found = self.infer(arg, scope)?;
            if let Some(&expected) = func.params().get(i) {
                if !compatible(expected, found) {
                    self.report(CheckError::TypeMismatch {
                        context: format!("argument {} of {}", i + 1, func.name()),
                        expected,
                        found,
                    });
                }
            }
        }
        Ok(func.ret())
    }

    fn check_expression(&mut self, expr: &Expression, scope: &mut Scope) -> Result<DataType, CheckError> {
        let left = self.infer(expr.lhs(), scope)?;
        let right = self.infer(expr.rhs(), scope)?;
        let ty = match (left, right) {
            (DataType::Unknown, _) | (_, DataType::Unknown) => DataType::Unknown,
            (DataType::Int, DataType::Int) => DataType::Int,
            (l, r) if l.is_numeric() && r.is_numeric() => DataType::Float,
            (DataType::String, DataType::String) if expr.op() == ArithmeticOp::Add => DataType::String,
            _ => {
                self.report(CheckError::InvalidOperator {
                    op: expr.op().name(),
                    left,
                    right,
                });
                DataType::Unknown
            }
        };
        Ok(ty)
    }

    fn check_comparison(&mut self, cond: &AlgebraCondition, scope: &mut Scope) -> Result<DataType, CheckError> {
        let left = self.infer(cond.lhs(), scope)?;
        let right = self.infer(cond.rhs(), scope)?;
        let numeric = left.is_numeric() && right.is_numeric();
        if !numeric && !compatible(left, right) {
            self.report(CheckError::TypeMismatch {
                context: format!("comparison {}", cond.op().symbol()),
                expected: left,
                found: right,
            });
        }
        Ok(DataType::Bool)
    }

    fn check_logical(&mut self, cond: &LogicalCondition, scope: &mut Scope) -> Result<DataType, CheckError> {
        cond.lhs().accept(self, scope)?;
        if let Some(rhs) = cond.rhs() {
            rhs.accept(self, scope)?;
        }
        Ok(DataType::Bool)
    }

    fn check_join(&mut self, join: &JoinCondition) -> DataType {
        self.check_access(join.table(), NodeKind::JoinCondition);
        self.require_table(join.table());
        let left = self.check_column(join.lhs());
        let right = self.check_column(join.rhs());
        if !compatible(left, right) {
            self.report(CheckError::TypeMismatch {
                context: format!("join on {}", join.table()),
                expected: left,
                found: right,
            });
        }
        DataType::Bool
    }

    fn check_assignment(&mut self, assign: &Assignment, scope: &mut Scope) -> Result<DataType, CheckError> {
        let found = self.infer(assign.value(), scope)?;
        let target = match assign.target() {
            AssignTarget::Var(var) => {
                if let Some(bound) = scope.bind(var.name(), var.dtype()) {
                    if bound != var.dtype() {
                        self.report(CheckError::TypeMismatch {
                            context: format!("rebinding of {}", var.name()),
                            expected: bound,
                            found: var.dtype(),
                        });
                    }
                }
                var.dtype()
            }
            AssignTarget::Column(column) => self.check_column(column),
        };
        if !compatible(target, found) {
            self.report(CheckError::TypeMismatch {
                context: format!("assignment to {}", assign.target()),
                expected: target,
                found,
            });
        }
        Ok(target)
    }

    /// A read of a bound variable must agree with the type it was bound to.
    fn check_var(&mut self, var: &Var, scope: &Scope) -> DataType {
        match scope.lookup(var.name()) {
            Some(bound) => {
                if !compatible(bound, var.dtype()) {
                    self.report(CheckError::TypeMismatch {
                        context: format!("use of {}", var.name()),
                        expected: bound,
                        found: var.dtype(),
                    });
                }
                bound
            }
            None => var.dtype(),
        }
    }

    fn check_operations(&mut self, root: &Root) -> Result<DataType, CheckError> {
        for op in root {
            op.accept(self, &mut Scope::default())?;
        }
        Ok(DataType::Unknown)
    }
}

/// Two types agree when they are equal or either is not yet known.
fn compatible(expected: DataType, found: DataType) -> bool {
    expected == found || expected == DataType::Unknown || found == DataType::Unknown
}

impl Visitor for Checker<'_> {
    type Context = Scope;
    type Output = DataType;
    type Error = CheckError;

    fn visit_root(&mut self, node: &Root, _ctx: &mut Scope) -> Handled<Self> {
        Some(self.check_operations(node))
    }

    fn visit_copy(&mut self, node: &Copy, ctx: &mut Scope) -> Handled<Self> {
        Some(self.check_copy(node, ctx))
    }

    fn visit_insert(&mut self, node: &Insert, ctx: &mut Scope) -> Handled<Self> {
        Some(self.check_insert(node, ctx))
    }

    fn visit_update(&mut self, node: &Update, ctx: &mut Scope) -> Handled<Self> {
        Some(self.check_update(node, ctx))
    }

    fn visit_move(&mut self, node: &Move, ctx: &mut Scope) -> Handled<Self> {
        Some(self.check_move(node, ctx))
    }

    fn visit_reduce(&mut self, node: &Reduce, ctx: &mut Scope) -> Handled<Self> {
        Some(self.check_reduce(node, ctx))
    }

    fn visit_assignment(&mut self, node: &Assignment, ctx: &mut Scope) -> Handled<Self> {
        Some(self.check_assignment(node, ctx))
    }

    fn visit_column(&mut self, node: &Column, _ctx: &mut Scope) -> Handled<Self> {
        Some(Ok(self.check_column(node)))
    }

    fn visit_literal(&mut self, node: &Literal, _ctx: &mut Scope) -> Handled<Self> {
        Some(Ok(node.dtype()))
    }

    fn visit_var(&mut self, node: &Var, ctx: &mut Scope) -> Handled<Self> {
        Some(Ok(self.check_var(node, ctx)))
    }

    fn visit_function_call(&mut self, node: &FunctionCall, ctx: &mut Scope) -> Handled<Self> {
        Some(self.check_call(node, ctx))
    }

    fn visit_expression(&mut self, node: &Expression, ctx: &mut Scope) -> Handled<Self> {
        Some(self.check_expression(node, ctx))
    }

    fn visit_algebra_condition(&mut self, node: &AlgebraCondition, ctx: &mut Scope) -> Handled<Self> {
        Some(self.check_comparison(node, ctx))
    }

    fn visit_logical_condition(&mut self, node: &LogicalCondition, ctx: &mut Scope) -> Handled<Self> {
        Some(self.check_logical(node, ctx))
    }

    fn visit_join_condition(&mut self, node: &JoinCondition, _ctx: &mut Scope) -> Handled<Self> {
        Some(Ok(self.check_join(node)))
    }

    fn visit_struct_value(&mut self, node: &StructValue, ctx: &mut Scope) -> Handled<Self> {
        for elem in node.vals() {
            if let Err(e) = elem.accept(self, ctx) {
                return Some(Err(e));
            }
        }
        Some(Ok(DataType::Unknown))
    }

    // Schemas and definitions carry no references to resolve.
    fn visit_node(&mut self, _node: NodeRef<'_>, _ctx: &mut Scope) -> Handled<Self> {
        Some(Ok(DataType::Unknown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_ir::{reserved, CompareOp, FunctionDefinition, TableDefinition};

    fn catalog() -> Catalog {
        let mut catalog = Catalog::with_reserved();
        catalog.define_table(TableDefinition::new(
            "users",
            StructType::new(
                "users",
                [("id", DataType::Int), ("name", DataType::String), ("age", DataType::Int)],
            ),
            "btree",
        ));
        catalog.define_table(TableDefinition::new(
            "orders",
            StructType::new(
                "orders",
                [("user_id", DataType::Int), ("amount", DataType::Float)],
            ),
            "",
        ));
        catalog
    }

    fn check(ops: Vec<conduit_ir::Operation>) -> Result<(), Vec<CheckError>> {
        check_root(&Root::new(ops), &catalog())
    }

    fn col(table: &str, name: &str, ty: DataType) -> Column {
        Column::new(table, name, ty)
    }

    fn users_cols() -> StructType {
        StructType::new("users", [("id", DataType::Int), ("name", DataType::String)])
    }

    fn adults() -> Copy {
        Copy::new(
            "users",
            users_cols(),
            None,
            Some(AlgebraCondition::new(col("users", "age", DataType::Int), Literal::int(18), CompareOp::Ge).into()),
            None,
        )
    }

    #[test]
    fn test_valid_unit() {
        let result = check(vec![
            adults().into(),
            Insert::values(
                "users",
                vec![StructValue::new(vec![
                    StructElement::from(Literal::int(1)),
                    Literal::string("Alice").into(),
                    Literal::int(30).into(),
                ])],
            )
            .into(),
            Move::new("input", None).into(),
        ]);
        assert!(result.is_ok(), "unexpected errors: {:?}", result);
    }

    #[test]
    fn test_undefined_table_reported_once() {
        let copy = Copy::new(
            "ghosts",
            StructType::new("ghosts", [("id", DataType::Int)]),
            None,
            Some(AlgebraCondition::new(col("ghosts", "id", DataType::Int), Literal::int(1), CompareOp::Eq).into()),
            None,
        );
        let errors = check(vec![copy.into()]).unwrap_err();
        assert_eq!(
            errors,
            vec![CheckError::UndefinedTable {
                table: "ghosts".to_string()
            }]
        );
    }

    #[test]
    fn test_undefined_and_mistyped_columns() {
        let copy = Copy::new(
            "users",
            StructType::new("users", [("email", DataType::String)]),
            None,
            Some(AlgebraCondition::new(col("users", "age", DataType::String), Literal::string("x"), CompareOp::Eq).into()),
            None,
        );
        let errors = check(vec![copy.into()]).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(&errors[0], CheckError::UndefinedColumn { column, .. } if column == "email"));
        assert!(matches!(
            &errors[1],
            CheckError::ColumnTypeMismatch { column, expected, found: DataType::String, .. }
                if column == "age" && expected == "int"
        ));
    }

    #[test]
    fn test_row_shape() {
        let short = Insert::values("users", vec![StructValue::new([Literal::int(1)])]);
        let errors = check(vec![short.into()]).unwrap_err();
        assert_eq!(
            errors,
            vec![CheckError::RowShapeMismatch {
                table: "users".to_string(),
                expected: 3,
                found: 1
            }]
        );

        let mistyped = Insert::values(
            "users",
            vec![StructValue::new([Literal::int(1), Literal::int(2), Literal::int(3)])],
        );
        let errors = check(vec![mistyped.into()]).unwrap_err();
        assert!(matches!(&errors[..], [CheckError::ColumnTypeMismatch { column, .. }] if column == "name"));
    }

    #[test]
    fn test_insert_select_width() {
        let archive = Insert::select("orders", adults());
        assert!(check(vec![archive.into()]).is_ok());

        let narrow = Copy::new("users", StructType::new("users", [("id", DataType::Int)]), None, None, None);
        let errors = check(vec![Insert::select("users", narrow).into()]).unwrap_err();
        assert!(matches!(&errors[..], [CheckError::RowShapeMismatch { expected: 3, found: 1, .. }]));
    }

    #[test]
    fn test_nested_reserved_row() {
        let row = StructValue::new(vec![
            StructElement::from(StructValue::new([
                Literal::string("a"),
                Literal::string("b"),
                Literal::string("call"),
            ])),
            StructValue::new([Literal::int(7)]).into(),
        ]);
        let errors = check(vec![Insert::values("output", vec![row]).into()]).unwrap_err();
        assert!(matches!(
            &errors[..],
            [CheckError::ColumnTypeMismatch { table, column, found: DataType::Int, .. }]
                if table == "output" && column == "payload.data"
        ));
    }

    #[test]
    fn test_reserved_table_direction() {
        let read_output = Copy::new("output", reserved().rpc_schema().clone(), None, None, None);
        let write_input = Update::new("input", vec![], None);
        let errors = check(vec![read_output.into(), write_input.into()]).unwrap_err();
        assert_eq!(
            errors,
            vec![
                CheckError::ReservedTableMisuse {
                    table: "output".to_string(),
                    operation: NodeKind::Copy
                },
                CheckError::ReservedTableMisuse {
                    table: "input".to_string(),
                    operation: NodeKind::Update
                },
            ]
        );
        assert_eq!(errors[0].to_string(), "Copy is not allowed on reserved table 'output'");
    }

    #[test]
    fn test_expression_types() {
        let catalog = catalog();
        let int = Expression::new(Literal::int(1), Literal::int(2), ArithmeticOp::Add);
        assert_eq!(infer_type(&int.into(), &catalog), Ok(DataType::Int));

        let mixed = Expression::new(col("orders", "amount", DataType::Float), Literal::int(2), ArithmeticOp::Mul);
        assert_eq!(infer_type(&mixed.into(), &catalog), Ok(DataType::Float));

        let concat = Expression::new(Literal::string("a"), Literal::string("b"), ArithmeticOp::Add);
        assert_eq!(infer_type(&concat.into(), &catalog), Ok(DataType::String));

        let bad = Expression::new(Literal::string("a"), Literal::int(1), ArithmeticOp::Sub);
        assert_eq!(
            infer_type(&bad.into(), &catalog),
            Err(vec![CheckError::InvalidOperator {
                op: "SUB",
                left: DataType::String,
                right: DataType::Int
            }])
        );
    }

    #[test]
    fn test_comparison_types() {
        let ok = AlgebraCondition::new(col("orders", "amount", DataType::Float), Literal::int(10), CompareOp::Gt);
        let bad = AlgebraCondition::new(col("users", "name", DataType::String), Literal::int(10), CompareOp::Eq);
        let copy = Copy::new(
            "users",
            users_cols(),
            None,
            Some(LogicalCondition::and(ok, bad).into()),
            None,
        );
        let errors = check(vec![copy.into()]).unwrap_err();
        assert!(matches!(
            &errors[..],
            [CheckError::TypeMismatch { expected: DataType::String, found: DataType::Int, .. }]
        ));
    }

    #[test]
    fn test_function_calls() {
        let upper = FunctionDefinition::new("upper", vec![DataType::String], DataType::String);
        let call = FunctionCall::new(upper.clone(), vec![col("users", "name", DataType::String).into()]);
        assert_eq!(infer_type(&call.into(), &catalog()), Ok(DataType::String));

        let wrong = FunctionCall::new(upper, vec![Literal::int(1).into(), Literal::int(2).into()]);
        let errors = infer_type(&wrong.into(), &catalog()).unwrap_err();
        assert_eq!(
            errors,
            vec![
                CheckError::WrongArity {
                    function: "upper".to_string(),
                    expected: 1,
                    found: 2
                },
                CheckError::TypeMismatch {
                    context: "argument 1 of upper".to_string(),
                    expected: DataType::String,
                    found: DataType::Int
                },
            ]
        );
    }

    #[test]
    fn test_limit_must_be_int() {
        let limited = Copy::new("users", users_cols(), None, None, Some(Literal::string("ten").into()));
        let errors = check(vec![limited.into()]).unwrap_err();
        assert_eq!(errors, vec![CheckError::InvalidLimit { found: DataType::String }]);

        let computed = Copy::new(
            "users",
            users_cols(),
            None,
            None,
            Some(Expression::new(Literal::int(2), Literal::int(5), ArithmeticOp::Mul).into()),
        );
        assert!(check(vec![computed.into()]).is_ok());
    }

    #[test]
    fn test_reduce_types() {
        let catalog = catalog();
        let amount = || StructType::new("orders", [("amount", DataType::Float)]);
        let reduce = |reducer: Reducer, cols: StructType| SingleValue::from(Reduce::new("orders", reducer, cols, None, None, None));

        assert_eq!(infer_type(&reduce(Reducer::Count, amount()), &catalog), Ok(DataType::Int));
        assert_eq!(infer_type(&reduce(Reducer::Sum, amount()), &catalog), Ok(DataType::Float));
        assert_eq!(infer_type(&reduce(Reducer::Avg, amount()), &catalog), Ok(DataType::Float));
        assert_eq!(infer_type(&reduce(Reducer::Max, amount()), &catalog), Ok(DataType::Float));

        let names = StructType::new("users", [("name", DataType::String)]);
        let sum_names = SingleValue::from(Reduce::new("users", Reducer::Sum, names.clone(), None, None, None));
        assert!(matches!(
            &infer_type(&sum_names, &catalog).unwrap_err()[..],
            [CheckError::InvalidReduction { reducer: Reducer::Sum, .. }]
        ));
        let min_names = SingleValue::from(Reduce::new("users", Reducer::Min, names, None, None, None));
        assert_eq!(infer_type(&min_names, &catalog), Ok(DataType::String));

        let wide = SingleValue::from(Reduce::new("users", Reducer::Max, users_cols(), None, None, None));
        assert!(matches!(
            &infer_type(&wide, &catalog).unwrap_err()[..],
            [CheckError::InvalidReduction { reducer: Reducer::Max, .. }]
        ));
    }

    #[test]
    fn test_update_assignments_and_rebinding() {
        let upper = FunctionDefinition::new("upper", vec![DataType::String], DataType::String);
        let update = Update::new(
            "users",
            vec![
                Assignment::new(
                    Var::new("n", DataType::String),
                    FunctionCall::new(upper, vec![col("users", "name", DataType::String).into()]),
                ),
                Assignment::new(col("users", "name", DataType::String), Var::new("n", DataType::String)),
            ],
            Some(AlgebraCondition::new(col("users", "id", DataType::Int), Literal::int(1), CompareOp::Eq).into()),
        );
        assert!(check(vec![update.into()]).is_ok());

        let rebind = Update::new(
            "users",
            vec![
                Assignment::new(Var::new("n", DataType::String), Literal::string("a")),
                Assignment::new(Var::new("n", DataType::Int), Literal::int(1)),
                Assignment::new(col("users", "age", DataType::Int), Literal::string("old")),
            ],
            None,
        );
        let errors = check(vec![rebind.into()]).unwrap_err();
        assert_eq!(
            errors,
            vec![
                CheckError::TypeMismatch {
                    context: "rebinding of n".to_string(),
                    expected: DataType::String,
                    found: DataType::Int
                },
                CheckError::TypeMismatch {
                    context: "assignment to Column:users.age int".to_string(),
                    expected: DataType::Int,
                    found: DataType::String
                },
            ]
        );
    }

    #[test]
    fn test_scopes_are_per_operation() {
        let bind = |ty, value: Literal| {
            conduit_ir::Operation::from(Update::new(
                "users",
                vec![Assignment::new(Var::new("n", ty), value)],
                None,
            ))
        };
        let result = check(vec![
            bind(DataType::String, Literal::string("a")),
            bind(DataType::Int, Literal::int(1)),
        ]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_join_checks() {
        let join = JoinCondition::new(
            "orders",
            col("users", "id", DataType::Int),
            col("orders", "amount", DataType::Float),
        );
        let copy = Copy::new("users", users_cols(), Some(join), None, None);
        let errors = check(vec![copy.into()]).unwrap_err();
        assert!(matches!(&errors[..], [CheckError::TypeMismatch { context, .. }] if context == "join on orders"));
    }

    #[test]
    fn test_nested_projection_fields() {
        let bogus = Copy::new(
            "input",
            StructType::new(
                "msg",
                [("meta", FieldType::from(StructType::new("meta", [("bogus", DataType::Int)])))],
            ),
            None,
            None,
            None,
        );
        let errors = check(vec![bogus.into()]).unwrap_err();
        assert_eq!(
            errors,
            vec![CheckError::UndefinedColumn {
                table: "input".to_string(),
                column: "meta.bogus".to_string()
            }]
        );

        let mistyped = Copy::new(
            "input",
            StructType::new(
                "msg",
                [
                    ("meta", FieldType::from(StructType::new("meta", [("src", DataType::String)]))),
                    ("payload", FieldType::from(StructType::new("payload", [("data", DataType::Int)]))),
                ],
            ),
            None,
            None,
            None,
        );
        let errors = check(vec![mistyped.into()]).unwrap_err();
        assert_eq!(
            errors,
            vec![CheckError::ColumnTypeMismatch {
                table: "input".to_string(),
                column: "payload.data".to_string(),
                expected: "string".to_string(),
                found: DataType::Int
            }]
        );
    }

    #[test]
    fn test_var_read_must_match_binding() {
        let update = Update::new(
            "users",
            vec![
                Assignment::new(Var::new("m", DataType::Int), Literal::int(1)),
                Assignment::new(col("users", "age", DataType::Int), Var::new("m", DataType::String)),
            ],
            None,
        );
        let errors = check(vec![update.into()]).unwrap_err();
        assert_eq!(
            errors,
            vec![CheckError::TypeMismatch {
                context: "use of m".to_string(),
                expected: DataType::Int,
                found: DataType::String
            }]
        );
    }

    #[test]
    fn test_each_bad_row_is_reported() {
        let bad = || StructValue::new([Literal::int(1), Literal::int(2), Literal::int(3)]);
        let insert = Insert::values("users", vec![bad(), bad()]);
        let errors = check(vec![insert.into()]).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| matches!(e, CheckError::ColumnTypeMismatch { column, .. } if column == "name")));
    }
}
