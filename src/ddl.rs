//! Schema mutation applier.
//!
//! Only one mutation is wired through: adding a column. Table creation and
//! column edits are staged client-side by the graph editor and have no
//! server-side counterpart yet.

use serde::Deserialize;
use sqlx::PgPool;

use crate::classify::classify_sqlx;
use crate::error::BackplaneError;
use crate::ident::{qualify, quote_ident};

/// Descriptor for a new column.
///
/// `data_type` and `default_value` are spliced into the DDL as-is: they are
/// trusted fragments, reachable only by a caller that already proved control
/// of the connection string. Identifiers are still quoted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    #[serde(default)]
    pub default_value: Option<String>,
}

/// Add a column to a live table.
pub async fn add_column(
    pool: &PgPool,
    schema: &str,
    table: &str,
    spec: &ColumnSpec,
) -> Result<(), BackplaneError> {
    let statement = build_add_column(schema, table, spec)?;
    tracing::info!(schema, table, column = %spec.name, "applying ADD COLUMN");
    sqlx::query(&statement)
        .execute(pool)
        .await
        .map_err(|e| classify_sqlx(&e))?;
    Ok(())
}

fn build_add_column(
    schema: &str,
    table: &str,
    spec: &ColumnSpec,
) -> Result<String, BackplaneError> {
    if spec.name.trim().is_empty() {
        return Err(BackplaneError::Validation(
            "column name must not be empty".to_string(),
        ));
    }
    if spec.data_type.trim().is_empty() {
        return Err(BackplaneError::Validation(
            "column type must not be empty".to_string(),
        ));
    }

    let mut statement = format!(
        "ALTER TABLE {} ADD COLUMN {} {}",
        qualify(schema, table),
        quote_ident(&spec.name),
        spec.data_type
    );
    if !spec.nullable {
        statement.push_str(" NOT NULL");
    }
    if let Some(ref default) = spec.default_value {
        statement.push_str(" DEFAULT ");
        statement.push_str(default);
    }
    Ok(statement)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, data_type: &str, nullable: bool, default: Option<&str>) -> ColumnSpec {
        ColumnSpec {
            name: name.to_string(),
            data_type: data_type.to_string(),
            nullable,
            default_value: default.map(str::to_string),
        }
    }

    #[test]
    fn test_nullable_column_without_default() {
        let sql = build_add_column("public", "users", &spec("bio", "text", true, None)).unwrap();
        assert_eq!(sql, "ALTER TABLE \"public\".\"users\" ADD COLUMN \"bio\" text");
    }

    #[test]
    fn test_not_null_with_default() {
        let sql = build_add_column(
            "public",
            "users",
            &spec("created_at", "timestamptz", false, Some("now()")),
        )
        .unwrap();
        assert_eq!(
            sql,
            "ALTER TABLE \"public\".\"users\" ADD COLUMN \"created_at\" timestamptz NOT NULL DEFAULT now()"
        );
    }

    #[test]
    fn test_rejects_empty_name_and_type() {
        assert!(build_add_column("public", "users", &spec("", "text", true, None)).is_err());
        assert!(build_add_column("public", "users", &spec("bio", "  ", true, None)).is_err());
    }

    #[test]
    fn test_spec_deserializes_camel_case_payload() {
        let spec: ColumnSpec = serde_json::from_str(
            r#"{"name": "age", "type": "integer", "nullable": false, "defaultValue": "0"}"#,
        )
        .unwrap();
        assert_eq!(spec.data_type, "integer");
        assert_eq!(spec.default_value.as_deref(), Some("0"));
    }
}
