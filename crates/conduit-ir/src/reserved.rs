//! Reserved `input` and `output` tables.
//!
//! These bind the surrounding message stream. Both use the same two-part RPC
//! schema over a streaming container and are built once per process.

use once_cell::sync::Lazy;

use crate::schema::{FieldType, StructType, TableDefinition, TableInstance};
use crate::types::{ContainerType, DataType};

pub const INPUT_TABLE: &str = "input";
pub const OUTPUT_TABLE: &str = "output";
pub const RESERVED_HINT: &str = "reserved";

/// The process-wide reserved tables.
#[derive(Debug)]
pub struct ReservedTables {
    rpc_schema: StructType,
    input: TableInstance,
    output: TableInstance,
}

impl ReservedTables {
    fn build() -> Self {
        let rpc_schema = rpc_schema();
        let bind = |name: &str| {
            TableInstance::new(
                TableDefinition::new(name, rpc_schema.clone(), RESERVED_HINT),
                ContainerType::Streaming,
                Vec::new(),
            )
        };
        Self {
            input: bind(INPUT_TABLE),
            output: bind(OUTPUT_TABLE),
            rpc_schema,
        }
    }

    /// `{meta: {src, dst, type}, payload: {data}}`, all strings.
    pub fn rpc_schema(&self) -> &StructType {
        &self.rpc_schema
    }

    pub fn input(&self) -> &TableInstance {
        &self.input
    }

    pub fn output(&self) -> &TableInstance {
        &self.output
    }

    /// Both tables, `input` first.
    pub fn tables(&self) -> [&TableInstance; 2] {
        [&self.input, &self.output]
    }
}

fn rpc_schema() -> StructType {
    let meta = StructType::new(
        "meta",
        [
            ("src", DataType::String),
            ("dst", DataType::String),
            ("type", DataType::String),
        ],
    );
    let payload = StructType::new("payload", [("data", DataType::String)]);
    StructType::new(
        "RPC",
        [
            ("meta", FieldType::from(meta)),
            ("payload", FieldType::from(payload)),
        ],
    )
}

static RESERVED: Lazy<ReservedTables> = Lazy::new(ReservedTables::build);

/// The reserved tables, built on first use.
pub fn reserved() -> &'static ReservedTables {
    &RESERVED
}

/// Look up a reserved table by name.
pub fn reserved_table(name: &str) -> Option<&'static TableInstance> {
    match name {
        INPUT_TABLE => Some(reserved().input()),
        OUTPUT_TABLE => Some(reserved().output()),
        _ => None,
    }
}

/// Check if `name` refers to a reserved table.
pub fn is_reserved(name: &str) -> bool {
    reserved_table(name).is_some()
}
