use crate::schema::{table_id, ColumnInfo, TableNode};

/// Create a ColumnInfo with sensible defaults for testing.
/// Returns a non-nullable integer column with no default.
pub fn test_column(name: &str, position: i32) -> ColumnInfo {
    ColumnInfo {
        name: name.to_string(),
        data_type: "integer".to_string(),
        udt: "int4".to_string(),
        nullable: false,
        default: None,
        position,
    }
}

/// Create a base-table node with the given integer columns and no primary key.
pub fn test_node(schema: &str, name: &str, columns: &[&str]) -> TableNode {
    TableNode {
        id: table_id(schema, name),
        schema: schema.to_string(),
        name: name.to_string(),
        table_type: "BASE TABLE".to_string(),
        primary_key: Vec::new(),
        columns: columns
            .iter()
            .enumerate()
            .map(|(i, c)| test_column(c, i as i32 + 1))
            .collect(),
    }
}
