use sqlx::PgPool;

use crate::classify::classify_sqlx;
use crate::error::BackplaneError;

/// One row per column across every table in the given schemas, carrying both
/// the SQL standard type name and the engine-native udt name.
pub async fn query_columns(
    pool: &PgPool,
    schemas: &[String],
) -> Result<Vec<ColumnRow>, BackplaneError> {
    sqlx::query_as::<_, ColumnRow>(
        r#"
        SELECT c.table_schema, c.table_name, c.column_name,
               c.data_type, c.udt_name,
               c.is_nullable = 'YES' AS is_nullable,
               c.column_default, c.ordinal_position::int4
        FROM information_schema.columns c
        WHERE c.table_schema = ANY($1)
        ORDER BY c.table_schema, c.table_name, c.ordinal_position
        "#,
    )
    .bind(schemas)
    .fetch_all(pool)
    .await
    .map_err(|e| classify_sqlx(&e))
}

#[derive(Debug, sqlx::FromRow)]
pub struct ColumnRow {
    pub table_schema: String,
    pub table_name: String,
    pub column_name: String,
    pub data_type: String,
    pub udt_name: String,
    pub is_nullable: bool,
    pub column_default: Option<String>,
    pub ordinal_position: i32,
}
