use serde::Serialize;

use crate::error::BackplaneError;

/// The assembled introspection result: schemas, table nodes and foreign-key
/// edges, ready to serialize for a graph renderer.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaGraph {
    pub schemas: Vec<String>,
    pub nodes: Vec<TableNode>,
    pub edges: Vec<ForeignKeyEdge>,
}

/// A single table or view, keyed by `schema.table`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableNode {
    /// `"{schema}.{name}"`, unique across the graph.
    pub id: String,
    pub schema: String,
    pub name: String,
    /// `BASE TABLE` or `VIEW`, as reported by `information_schema.tables`.
    #[serde(rename = "type")]
    pub table_type: String,
    /// Primary-key column names in key order; empty when the table has none.
    pub primary_key: Vec<String>,
    /// Columns ordered by ordinal position.
    pub columns: Vec<ColumnInfo>,
}

/// Metadata for a single column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Human-readable SQL standard type (`data_type`).
    #[serde(rename = "type")]
    pub data_type: String,
    /// Engine-native type name (`udt_name`), e.g. `int4`, `uuid`.
    pub udt: String,
    pub nullable: bool,
    /// Raw SQL default expression, if any.
    pub default: Option<String>,
    /// 1-based ordinal position, unique within the table.
    pub position: i32,
}

/// A foreign-key relationship between two table nodes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyEdge {
    /// Constraint name, unique within its schema.
    pub id: String,
    /// Referencing table id (`schema.table`).
    pub source: String,
    pub source_column: String,
    /// Referenced table id (`schema.table`).
    pub target: String,
    pub target_column: String,
    /// Display label, `"{source_column} → {target_column}"`.
    pub label: String,
}

/// Metadata for one index on a table, queried on demand.
#[derive(Debug, Clone, Serialize)]
pub struct IndexInfo {
    pub name: String,
    /// Column names in index order; may repeat across multi-column indexes.
    pub columns: Vec<String>,
    pub unique: bool,
    pub primary: bool,
    /// Access method, e.g. `btree`, `gin`.
    pub method: String,
}

pub fn table_id(schema: &str, name: &str) -> String {
    format!("{schema}.{name}")
}

impl SchemaGraph {
    /// Check that every edge endpoint resolves to an existing node and a
    /// real column on it. Catalog data is assumed consistent, so assembly
    /// skips this; renderers should call it before trusting the edges.
    pub fn validate(&self) -> Result<(), BackplaneError> {
        for edge in &self.edges {
            self.check_endpoint(&edge.id, &edge.source, &edge.source_column)?;
            self.check_endpoint(&edge.id, &edge.target, &edge.target_column)?;
        }
        Ok(())
    }

    fn check_endpoint(
        &self,
        edge_id: &str,
        table: &str,
        column: &str,
    ) -> Result<(), BackplaneError> {
        let node = self
            .nodes
            .iter()
            .find(|n| n.id == table)
            .ok_or_else(|| {
                BackplaneError::database(format!(
                    "foreign key {edge_id} references unknown table {table}"
                ))
            })?;
        if !node.columns.iter().any(|c| c.name == column) {
            return Err(BackplaneError::database(format!(
                "foreign key {edge_id} references unknown column {table}.{column}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::testutil::{test_column, test_node};

    fn edge(id: &str, source: &str, source_column: &str, target: &str, target_column: &str) -> ForeignKeyEdge {
        ForeignKeyEdge {
            id: id.to_string(),
            source: source.to_string(),
            source_column: source_column.to_string(),
            target: target.to_string(),
            target_column: target_column.to_string(),
            label: format!("{source_column} → {target_column}"),
        }
    }

    #[test]
    fn test_validate_accepts_consistent_graph() {
        let graph = SchemaGraph {
            schemas: vec!["public".to_string()],
            nodes: vec![
                test_node("public", "users", &["id"]),
                test_node("public", "posts", &["id", "author_id"]),
            ],
            edges: vec![edge(
                "posts_author_id_fkey",
                "public.posts",
                "author_id",
                "public.users",
                "id",
            )],
        };
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_dangling_table() {
        let graph = SchemaGraph {
            schemas: vec!["public".to_string()],
            nodes: vec![test_node("public", "posts", &["id", "author_id"])],
            edges: vec![edge(
                "posts_author_id_fkey",
                "public.posts",
                "author_id",
                "public.users",
                "id",
            )],
        };
        let err = graph.validate().unwrap_err();
        assert!(err.to_string().contains("unknown table public.users"));
    }

    #[test]
    fn test_validate_rejects_dangling_column() {
        let mut node = test_node("public", "users", &["id"]);
        node.columns = vec![test_column("id", 1)];
        let graph = SchemaGraph {
            schemas: vec!["public".to_string()],
            nodes: vec![node, test_node("public", "posts", &["id", "author_id"])],
            edges: vec![edge(
                "posts_author_id_fkey",
                "public.posts",
                "author_id",
                "public.users",
                "email",
            )],
        };
        let err = graph.validate().unwrap_err();
        assert!(err.to_string().contains("public.users.email"));
    }

    #[test]
    fn test_index_info_json_shape() {
        let index = IndexInfo {
            name: "users_pkey".to_string(),
            columns: vec!["id".to_string()],
            unique: true,
            primary: true,
            method: "btree".to_string(),
        };
        assert_eq!(
            serde_json::to_string_pretty(&index).unwrap(),
            indoc! {r#"
                {
                  "name": "users_pkey",
                  "columns": [
                    "id"
                  ],
                  "unique": true,
                  "primary": true,
                  "method": "btree"
                }"#}
        );
    }

    #[test]
    fn test_column_serializes_with_renamed_type_fields() {
        let col = test_column("id", 1);
        let json = serde_json::to_value(&col).unwrap();
        assert_eq!(json["type"], "integer");
        assert_eq!(json["udt"], "int4");
        assert_eq!(json["position"], 1);
    }
}
