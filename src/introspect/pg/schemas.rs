use sqlx::PgPool;

use crate::classify::classify_sqlx;
use crate::error::BackplaneError;

/// List user-visible schema names, alphabetically.
pub async fn query_schemas(pool: &PgPool) -> Result<Vec<String>, BackplaneError> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT schema_name
        FROM information_schema.schemata
        WHERE schema_name NOT IN ('pg_catalog', 'information_schema')
        ORDER BY schema_name
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| classify_sqlx(&e))
}
