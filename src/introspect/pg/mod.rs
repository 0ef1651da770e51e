mod columns;
mod indexes;
mod keys;
mod schemas;
mod tables;

pub use indexes::query_indexes;

use std::collections::HashMap;

use sqlx::PgPool;

use crate::connect::CONNECT_TIMEOUT;
use crate::error::BackplaneError;
use crate::schema::{table_id, ColumnInfo, ForeignKeyEdge, SchemaGraph, TableNode};

use columns::ColumnRow;
use keys::{ForeignKeyRow, PrimaryKeyRow};
use tables::TableRow;

/// Introspect a live database and assemble the schema graph.
///
/// `schema_filter` restricts the discovered schema set when non-empty. The
/// four row queries fan out concurrently once the schema list is known,
/// bounded by a deadline so a hung server cannot hang the caller.
pub async fn introspect(
    pool: &PgPool,
    schema_filter: &[String],
) -> Result<SchemaGraph, BackplaneError> {
    let mut schemas = schemas::query_schemas(pool).await?;
    if !schema_filter.is_empty() {
        schemas.retain(|s| schema_filter.contains(s));
    }
    let schemas = require_schemas(schemas)?;

    tracing::debug!(schemas = schemas.len(), "introspecting catalog");

    let (tables, columns, primary_keys, foreign_keys) =
        tokio::time::timeout(CONNECT_TIMEOUT, async {
            tokio::try_join!(
                tables::query_tables(pool, &schemas),
                columns::query_columns(pool, &schemas),
                keys::query_primary_keys(pool, &schemas),
                keys::query_foreign_keys(pool, &schemas),
            )
        })
        .await
        .map_err(|_| {
            BackplaneError::connection("timed out introspecting the database catalog")
        })??;

    tracing::debug!(
        tables = tables.len(),
        columns = columns.len(),
        foreign_keys = foreign_keys.len(),
        "catalog rows fetched"
    );

    Ok(assemble(schemas, tables, columns, primary_keys, foreign_keys))
}

/// An empty database is treated as a misconfiguration, never an empty graph.
fn require_schemas(schemas: Vec<String>) -> Result<Vec<String>, BackplaneError> {
    if schemas.is_empty() {
        return Err(BackplaneError::database(
            "no schemas found; the database is empty or the connecting role cannot see any",
        ));
    }
    Ok(schemas)
}

/// Join the ordered catalog row sets into a graph. Row order is produced by
/// the queries (schemas alphabetical, tables by name, columns by ordinal,
/// key columns by key sequence) and preserved by the grouping here.
fn assemble(
    schemas: Vec<String>,
    tables: Vec<TableRow>,
    columns: Vec<ColumnRow>,
    primary_keys: Vec<PrimaryKeyRow>,
    foreign_keys: Vec<ForeignKeyRow>,
) -> SchemaGraph {
    let mut columns_by_table: HashMap<String, Vec<ColumnInfo>> = HashMap::new();
    for col in columns {
        columns_by_table
            .entry(table_id(&col.table_schema, &col.table_name))
            .or_default()
            .push(ColumnInfo {
                name: col.column_name,
                data_type: col.data_type,
                udt: col.udt_name,
                nullable: col.is_nullable,
                default: col.column_default,
                position: col.ordinal_position,
            });
    }

    let mut pk_by_table: HashMap<String, Vec<String>> = HashMap::new();
    for pk in primary_keys {
        pk_by_table
            .entry(table_id(&pk.table_schema, &pk.table_name))
            .or_default()
            .push(pk.column_name);
    }

    let nodes = tables
        .into_iter()
        .map(|table| {
            let id = table_id(&table.table_schema, &table.table_name);
            TableNode {
                columns: columns_by_table.remove(&id).unwrap_or_default(),
                primary_key: pk_by_table.remove(&id).unwrap_or_default(),
                id,
                schema: table.table_schema,
                name: table.table_name,
                table_type: table.table_type,
            }
        })
        .collect();

    let edges = foreign_keys
        .into_iter()
        .map(|fk| ForeignKeyEdge {
            label: format!("{} → {}", fk.column_name, fk.ref_column),
            id: fk.constraint_name,
            source: table_id(&fk.table_schema, &fk.table_name),
            source_column: fk.column_name,
            target: table_id(&fk.ref_schema, &fk.ref_table),
            target_column: fk.ref_column,
        })
        .collect();

    SchemaGraph {
        schemas,
        nodes,
        edges,
    }
}
