//! Pretty printer for Conduit IR.
//!
//! Renders a compilation unit as indented pseudo-query text, one operation
//! per paragraph. Output is deterministic for a given tree.

use conduit_ir::{
    AlgebraCondition, AssignTarget, Assignment, Column, Condition, Copy, DispatchError, Expression,
    FieldType, FunctionCall, FunctionDefinition, Handled, Insert, InsertSource, IrNode,
    JoinCondition, Literal, LogicalCondition, Move, Reduce, Root, SingleValue, StructType,
    StructValue, TableDefinition, TableInstance, Update, Var, Visitor,
};
use tracing::instrument;

/// Printing pass. The context is the current nesting depth.
#[derive(Debug, Clone)]
pub struct Printer {
    indent: usize,
}

impl Default for Printer {
    fn default() -> Self {
        Self { indent: 4 }
    }
}

impl Printer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `indent` spaces per nesting level.
    pub fn with_indent(indent: usize) -> Self {
        Self { indent }
    }

    /// Print any node.
    pub fn print<N: IrNode>(&mut self, node: &N) -> Result<String, DispatchError> {
        node.accept(self, &mut 0)
    }

    fn pad(&self, depth: usize) -> String {
        " ".repeat(self.indent * depth)
    }

    fn clauses(
        &mut self,
        out: &mut String,
        join: Option<&JoinCondition>,
        filter: Option<&Condition>,
        limit: Option<&SingleValue>,
        depth: &mut usize,
    ) -> Result<(), DispatchError> {
        let pad = self.pad(*depth + 1);
        if let Some(join) = join {
            out.push_str(&format!("\n{}{}", pad, join.accept(self, depth)?));
        }
        if let Some(filter) = filter {
            out.push_str(&format!("\n{}where {}", pad, filter.accept(self, depth)?));
        }
        if let Some(limit) = limit {
            out.push_str(&format!("\n{}limit {}", pad, limit.accept(self, depth)?));
        }
        Ok(())
    }

    fn print_root(&mut self, root: &Root, depth: &mut usize) -> Result<String, DispatchError> {
        let ops = root
            .iter()
            .map(|op| op.accept(self, depth))
            .collect::<Result<Vec<_>, _>>()?;
        let mut out = ops.join("\n\n");
        if !out.is_empty() {
            out.push('\n');
        }
        Ok(out)
    }

    fn print_copy(&mut self, copy: &Copy, depth: &mut usize) -> Result<String, DispatchError> {
        let mut out = format!("copy {} {}", copy.table(), copy.columns().accept(self, depth)?);
        self.clauses(&mut out, copy.join(), copy.filter(), copy.limit(), depth)?;
        Ok(out)
    }

    fn print_insert(&mut self, insert: &Insert, depth: &mut usize) -> Result<String, DispatchError> {
        match insert.source() {
            InsertSource::Values(rows) => {
                let rows = rows
                    .iter()
                    .map(|row| row.accept(self, depth))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("insert into {} values {}", insert.table(), rows.join(", ")))
            }
            InsertSource::Select(select) => {
                *depth += 1;
                let inner = select.accept(self, depth);
                *depth -= 1;
                Ok(format!("insert into {}\n{}{}", insert.table(), self.pad(*depth + 1), inner?))
            }
        }
    }

    fn print_update(&mut self, update: &Update, depth: &mut usize) -> Result<String, DispatchError> {
        let mut out = format!("update {}", update.table());
        let pad = self.pad(*depth + 1);
        for assign in update.assigns() {
            out.push_str(&format!("\n{}set {}", pad, assign.accept(self, depth)?));
        }
        self.clauses(&mut out, None, update.filter(), None, depth)?;
        Ok(out)
    }

    fn print_move(&mut self, mv: &Move, depth: &mut usize) -> Result<String, DispatchError> {
        let mut out = format!("move {}", mv.table());
        self.clauses(&mut out, None, mv.filter(), None, depth)?;
        Ok(out)
    }

    fn print_reduce(&mut self, reduce: &Reduce, depth: &mut usize) -> Result<String, DispatchError> {
        let mut out = format!(
            "reduce {} {} {}",
            reduce.reducer().name().to_lowercase(),
            reduce.table(),
            reduce.columns().accept(self, depth)?
        );
        self.clauses(&mut out, reduce.join(), reduce.filter(), reduce.limit(), depth)?;
        Ok(out)
    }

    fn print_assignment(&mut self, assign: &Assignment, depth: &mut usize) -> Result<String, DispatchError> {
        let target = match assign.target() {
            AssignTarget::Var(var) => var.accept(self, depth)?,
            AssignTarget::Column(col) => col.accept(self, depth)?,
        };
        Ok(format!("{} := {}", target, assign.value().accept(self, depth)?))
    }

    fn print_call(&mut self, call: &FunctionCall, depth: &mut usize) -> Result<String, DispatchError> {
        let args = call
            .args()
            .iter()
            .map(|arg| arg.accept(self, depth))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(format!("{}({})", call.func().name(), args.join(", ")))
    }

    fn print_struct_value(&mut self, value: &StructValue, depth: &mut usize) -> Result<String, DispatchError> {
        let vals = value
            .vals()
            .iter()
            .map(|elem| elem.accept(self, depth))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(format!("({})", vals.join(", ")))
    }

    fn print_logical(&mut self, cond: &LogicalCondition, depth: &mut usize) -> Result<String, DispatchError> {
        let lhs = cond.lhs().accept(self, depth)?;
        let op = cond.op().name().to_lowercase();
        match cond.rhs() {
            Some(rhs) => Ok(format!("({} {} {})", lhs, op, rhs.accept(self, depth)?)),
            None => Ok(format!("{} ({})", op, lhs)),
        }
    }

    fn print_table(&mut self, table: &TableInstance, depth: &mut usize) -> Result<String, DispatchError> {
        let mut out = format!(
            "{} as {}",
            table.definition().accept(self, depth)?,
            table.container()
        );
        if !table.rows().is_empty() {
            let rows = table
                .rows()
                .iter()
                .map(|row| row.accept(self, depth))
                .collect::<Result<Vec<_>, _>>()?;
            out.push_str(&format!("\n{}values {}", self.pad(*depth + 1), rows.join(", ")));
        }
        Ok(out)
    }
}

fn format_struct_type(ty: &StructType) -> String {
    let fields: Vec<String> = ty
        .fields()
        .iter()
        .map(|(name, field)| match field {
            FieldType::Scalar(dtype) => format!("{}: {}", name, dtype),
            FieldType::Struct(inner) => format!("{}: {}", name, format_struct_type(inner)),
        })
        .collect();
    format!("{{ {} }}", fields.join(", "))
}

impl Visitor for Printer {
    type Context = usize;
    type Output = String;
    type Error = DispatchError;

    fn visit_root(&mut self, node: &Root, ctx: &mut usize) -> Handled<Self> {
        Some(self.print_root(node, ctx))
    }

    fn visit_copy(&mut self, node: &Copy, ctx: &mut usize) -> Handled<Self> {
        Some(self.print_copy(node, ctx))
    }

    fn visit_insert(&mut self, node: &Insert, ctx: &mut usize) -> Handled<Self> {
        Some(self.print_insert(node, ctx))
    }

    fn visit_update(&mut self, node: &Update, ctx: &mut usize) -> Handled<Self> {
        Some(self.print_update(node, ctx))
    }

    fn visit_move(&mut self, node: &Move, ctx: &mut usize) -> Handled<Self> {
        Some(self.print_move(node, ctx))
    }

    fn visit_reduce(&mut self, node: &Reduce, ctx: &mut usize) -> Handled<Self> {
        Some(self.print_reduce(node, ctx))
    }

    fn visit_assignment(&mut self, node: &Assignment, ctx: &mut usize) -> Handled<Self> {
        Some(self.print_assignment(node, ctx))
    }

    fn visit_column(&mut self, node: &Column, _ctx: &mut usize) -> Handled<Self> {
        Some(Ok(format!("{}.{}", node.table(), node.name())))
    }

    fn visit_literal(&mut self, node: &Literal, _ctx: &mut usize) -> Handled<Self> {
        Some(Ok(node.value().to_string()))
    }

    fn visit_var(&mut self, node: &Var, _ctx: &mut usize) -> Handled<Self> {
        Some(Ok(node.name().to_string()))
    }

    fn visit_function_definition(&mut self, node: &FunctionDefinition, _ctx: &mut usize) -> Handled<Self> {
        let params: Vec<String> = node.params().iter().map(ToString::to_string).collect();
        Some(Ok(format!("fn {}({}) -> {}", node.name(), params.join(", "), node.ret())))
    }

    fn visit_function_call(&mut self, node: &FunctionCall, ctx: &mut usize) -> Handled<Self> {
        Some(self.print_call(node, ctx))
    }

    fn visit_expression(&mut self, node: &Expression, ctx: &mut usize) -> Handled<Self> {
        let lhs = match node.lhs().accept(self, ctx) {
            Ok(lhs) => lhs,
            Err(e) => return Some(Err(e)),
        };
        Some(
            node.rhs()
                .accept(self, ctx)
                .map(|rhs| format!("({} {} {})", lhs, node.op().symbol(), rhs)),
        )
    }

    fn visit_struct_type(&mut self, node: &StructType, _ctx: &mut usize) -> Handled<Self> {
        Some(Ok(format_struct_type(node)))
    }

    fn visit_struct_value(&mut self, node: &StructValue, ctx: &mut usize) -> Handled<Self> {
        Some(self.print_struct_value(node, ctx))
    }

    fn visit_table_definition(&mut self, node: &TableDefinition, _ctx: &mut usize) -> Handled<Self> {
        Some(Ok(format!(
            "table {} {} hint {:?}",
            node.name(),
            format_struct_type(node.schema()),
            node.hint()
        )))
    }

    fn visit_table_instance(&mut self, node: &TableInstance, ctx: &mut usize) -> Handled<Self> {
        Some(self.print_table(node, ctx))
    }

    fn visit_algebra_condition(&mut self, node: &AlgebraCondition, ctx: &mut usize) -> Handled<Self> {
        let lhs = match node.lhs().accept(self, ctx) {
            Ok(lhs) => lhs,
            Err(e) => return Some(Err(e)),
        };
        Some(
            node.rhs()
                .accept(self, ctx)
                .map(|rhs| format!("{} {} {}", lhs, node.op().symbol(), rhs)),
        )
    }

    fn visit_logical_condition(&mut self, node: &LogicalCondition, ctx: &mut usize) -> Handled<Self> {
        Some(self.print_logical(node, ctx))
    }

    fn visit_join_condition(&mut self, node: &JoinCondition, _ctx: &mut usize) -> Handled<Self> {
        Some(Ok(format!(
            "join {} on {}.{} == {}.{}",
            node.table(),
            node.lhs().table(),
            node.lhs().name(),
            node.rhs().table(),
            node.rhs().name()
        )))
    }
}

/// Print a compilation unit.
#[instrument(level = "debug", skip_all, fields(operations = root.len()))]
pub fn print_root(root: &Root) -> Result<String, DispatchError> {
    Printer::new().print(root)
}
