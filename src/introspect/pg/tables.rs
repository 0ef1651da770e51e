use sqlx::PgPool;

use crate::classify::classify_sqlx;
use crate::error::BackplaneError;

pub async fn query_tables(
    pool: &PgPool,
    schemas: &[String],
) -> Result<Vec<TableRow>, BackplaneError> {
    sqlx::query_as::<_, TableRow>(
        r#"
        SELECT t.table_schema, t.table_name, t.table_type
        FROM information_schema.tables t
        WHERE t.table_schema = ANY($1)
          AND t.table_type IN ('BASE TABLE', 'VIEW')
        ORDER BY t.table_schema, t.table_name
        "#,
    )
    .bind(schemas)
    .fetch_all(pool)
    .await
    .map_err(|e| classify_sqlx(&e))
}

#[derive(Debug, sqlx::FromRow)]
pub struct TableRow {
    pub table_schema: String,
    pub table_name: String,
    pub table_type: String,
}
