//! Table catalog for name resolution.

use std::collections::HashMap;

use conduit_ir::{reserved, FieldType, StructType, TableDefinition};

/// Table definitions known to a compilation unit, by name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: HashMap<String, TableDefinition>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog that already knows the reserved `input` and `output` tables.
    pub fn with_reserved() -> Self {
        let mut catalog = Self::new();
        for table in reserved().tables() {
            catalog.define_table(table.definition().clone());
        }
        catalog
    }

    /// Register a table, returning any definition it replaces.
    pub fn define_table(&mut self, definition: TableDefinition) -> Option<TableDefinition> {
        self.tables.insert(definition.name().to_string(), definition)
    }

    /// Look up a table by name.
    pub fn get_table(&self, name: &str) -> Option<&TableDefinition> {
        self.tables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Registered table names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve a column of a table. Dotted names reach into nested structs.
    pub fn column_type(&self, table: &str, column: &str) -> Option<&FieldType> {
        let schema = self.get_table(table)?.schema();
        resolve_path(schema, column)
    }
}

/// Resolve a dotted field path (`meta.src`) inside a struct type.
pub fn resolve_path<'a>(schema: &'a StructType, path: &str) -> Option<&'a FieldType> {
    let mut parts = path.split('.');
    let mut current = schema.field(parts.next()?)?;
    for part in parts {
        match current {
            FieldType::Struct(inner) => current = inner.field(part)?,
            FieldType::Scalar(_) => return None,
        }
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_ir::DataType;

    fn users() -> TableDefinition {
        TableDefinition::new(
            "users",
            StructType::new("users", [("id", DataType::Int), ("name", DataType::String)]),
            "",
        )
    }

    #[test]
    fn test_define_and_get_table() {
        let mut catalog = Catalog::new();
        assert!(catalog.define_table(users()).is_none());
        assert!(catalog.define_table(users()).is_some());

        let table = catalog.get_table("users").unwrap();
        assert_eq!(table.schema().width(), 2);
        assert!(catalog.get_table("orders").is_none());
    }

    #[test]
    fn test_with_reserved() {
        let catalog = Catalog::with_reserved();
        assert_eq!(catalog.names(), vec!["input", "output"]);
    }

    #[test]
    fn test_column_type() {
        let mut catalog = Catalog::new();
        catalog.define_table(users());
        assert_eq!(
            catalog.column_type("users", "id"),
            Some(&FieldType::Scalar(DataType::Int))
        );
        assert_eq!(catalog.column_type("users", "age"), None);
        assert_eq!(catalog.column_type("orders", "id"), None);
    }

    #[test]
    fn test_nested_column_path() {
        let catalog = Catalog::with_reserved();
        assert_eq!(
            catalog.column_type("input", "meta.src"),
            Some(&FieldType::Scalar(DataType::String))
        );
        assert!(matches!(
            catalog.column_type("input", "payload"),
            Some(FieldType::Struct(_))
        ));
        assert_eq!(catalog.column_type("input", "payload.data.x"), None);
        assert_eq!(catalog.column_type("input", "meta.missing"), None);
    }
}
