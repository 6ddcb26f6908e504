//! Schema and table model.

use std::fmt;

use crate::types::{ContainerType, DataType};
use crate::value::{write_joined, Column, Expression, FunctionCall, Literal, SingleValue, Var};

/// The type of a struct field: a scalar or a nested struct.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FieldType {
    Scalar(DataType),
    Struct(StructType),
}

impl From<DataType> for FieldType {
    fn from(ty: DataType) -> Self {
        FieldType::Scalar(ty)
    }
}

impl From<StructType> for FieldType {
    fn from(ty: StructType) -> Self {
        FieldType::Struct(ty)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(ty) => ty.fmt(f),
            FieldType::Struct(ty) => ty.fmt_body(f),
        }
    }
}

/// A named, ordered, possibly nested record type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StructType {
    name: String,
    fields: Vec<(String, FieldType)>,
}

impl StructType {
    pub fn new<N, F>(name: impl Into<String>, fields: impl IntoIterator<Item = (N, F)>) -> Self
    where
        N: Into<String>,
        F: Into<FieldType>,
    {
        Self {
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|(n, ty)| (n.into(), ty.into()))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[(String, FieldType)] {
        &self.fields
    }

    /// Look up a top-level field by name.
    pub fn field(&self, name: &str) -> Option<&FieldType> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, ty)| ty)
    }

    /// Number of top-level fields.
    pub fn width(&self) -> usize {
        self.fields.len()
    }

    /// Nested struct types, in field order.
    pub fn nested(&self) -> impl Iterator<Item = &StructType> {
        self.fields.iter().filter_map(|(_, ty)| match ty {
            FieldType::Struct(inner) => Some(inner),
            FieldType::Scalar(_) => None,
        })
    }

    fn fmt_body(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.name)?;
        for (i, (name, ty)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", name, ty)?;
        }
        f.write_str("}")
    }
}

impl fmt::Display for StructType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StructType:")?;
        self.fmt_body(f)
    }
}

/// One element of a struct value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum StructElement {
    Struct(StructValue),
    Single(SingleValue),
}

impl From<SingleValue> for StructElement {
    fn from(value: SingleValue) -> Self {
        StructElement::Single(value)
    }
}

impl From<Literal> for StructElement {
    fn from(value: Literal) -> Self {
        StructElement::Single(value.into())
    }
}

impl From<Column> for StructElement {
    fn from(value: Column) -> Self {
        StructElement::Single(value.into())
    }
}

impl From<Var> for StructElement {
    fn from(value: Var) -> Self {
        StructElement::Single(value.into())
    }
}

impl From<FunctionCall> for StructElement {
    fn from(value: FunctionCall) -> Self {
        StructElement::Single(value.into())
    }
}

impl From<Expression> for StructElement {
    fn from(value: Expression) -> Self {
        StructElement::Single(value.into())
    }
}

impl From<StructValue> for StructElement {
    fn from(value: StructValue) -> Self {
        StructElement::Struct(value)
    }
}

impl fmt::Display for StructElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructElement::Struct(value) => value.fmt(f),
            StructElement::Single(value) => value.fmt(f),
        }
    }
}

/// A row or nested record literal.
///
/// The shape is not checked against any `StructType` here.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StructValue {
    vals: Vec<StructElement>,
}

impl StructValue {
    pub fn new<E: Into<StructElement>>(vals: impl IntoIterator<Item = E>) -> Self {
        Self {
            vals: vals.into_iter().map(Into::into).collect(),
        }
    }

    pub fn vals(&self) -> &[StructElement] {
        &self.vals
    }

    pub fn width(&self) -> usize {
        self.vals.len()
    }
}

impl fmt::Display for StructValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StructValue:[")?;
        write_joined(f, &self.vals)?;
        f.write_str("]")
    }
}

/// Declares a table's name, shape, and an opaque backend hint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TableDefinition {
    name: String,
    schema: StructType,
    hint: String,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>, schema: StructType, hint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema,
            hint: hint.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &StructType {
        &self.schema
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }
}

impl fmt::Display for TableDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TableDefinition:{} {} hint={:?}",
            self.name, self.schema, self.hint
        )
    }
}

/// A table definition bound to a container strategy and optional seed rows.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TableInstance {
    definition: TableDefinition,
    container: ContainerType,
    rows: Vec<StructValue>,
}

impl TableInstance {
    pub fn new(definition: TableDefinition, container: ContainerType, rows: Vec<StructValue>) -> Self {
        Self {
            definition,
            container,
            rows,
        }
    }

    pub fn definition(&self) -> &TableDefinition {
        &self.definition
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn container(&self) -> ContainerType {
        self.container
    }

    pub fn rows(&self) -> &[StructValue] {
        &self.rows
    }
}

impl fmt::Display for TableInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableInstance:{} {} [", self.definition, self.container)?;
        write_joined(f, &self.rows)?;
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> StructType {
        StructType::new("users", [("id", DataType::Int), ("name", DataType::String)])
    }

    #[test]
    fn test_struct_type_lookup() {
        let schema = users();
        assert_eq!(schema.width(), 2);
        assert_eq!(schema.field("name"), Some(&FieldType::Scalar(DataType::String)));
        assert_eq!(schema.field("missing"), None);
        assert_eq!(schema.nested().count(), 0);
    }

    #[test]
    fn test_nested_struct_render() {
        let inner = StructType::new("meta", [("src", DataType::String)]);
        let outer = StructType::new(
            "msg",
            vec![
                ("meta", FieldType::from(inner)),
                ("size", FieldType::from(DataType::Int)),
            ],
        );
        assert_eq!(outer.nested().count(), 1);
        assert_eq!(
            outer.to_string(),
            "StructType:msg {meta: meta {src: string}, size: int}"
        );
    }

    #[test]
    fn test_struct_value_mixes_scalars_and_records() {
        let row = StructValue::new(vec![
            StructElement::from(Literal::int(1)),
            StructElement::from(StructValue::new([Literal::string("a")])),
        ]);
        assert_eq!(row.width(), 2);
        assert_eq!(
            row.to_string(),
            "StructValue:[Literal:1 int, StructValue:[Literal:\"a\" string]]"
        );
    }

    #[test]
    fn test_table_instance_render() {
        let table = TableInstance::new(
            TableDefinition::new("users", users(), "btree"),
            ContainerType::OrderedMap,
            vec![StructValue::new([Literal::int(1)])],
        );
        assert_eq!(table.name(), "users");
        assert_eq!(
            table.to_string(),
            "TableInstance:TableDefinition:users StructType:users {id: int, name: string} \
             hint=\"btree\" ordered_map [StructValue:[Literal:1 int]]"
        );
    }
}
