//! SQL text builders for the generic CRUD service.
//!
//! These are pure functions over the column whitelist so the whitelist
//! invariants can be tested without a database. Identifiers are quoted;
//! values are returned as text bind parameters cast to the column's native
//! type (`$1::uuid`), which lets the server coerce JSON scalars without the
//! driver knowing the column types. Row output is shaped server-side with
//! `row_to_json`, so every statement returns a single text column.

use serde_json::Value;

use crate::error::BackplaneError;
use crate::ident::{qualify, quote_ident};

use super::{ColumnMeta, Record};

pub fn build_select_all(schema: &str, table: &str) -> String {
    format!(
        "SELECT row_to_json(t)::text FROM {} t",
        qualify(schema, table)
    )
}

pub fn build_select_by_id(schema: &str, table: &str, pk: &str) -> String {
    format!(
        "SELECT row_to_json(t)::text FROM {} t WHERE {}::text = $1",
        qualify(schema, table),
        quote_ident(pk)
    )
}

pub fn build_insert(
    schema: &str,
    table: &str,
    columns: &[ColumnMeta],
    record: &Record,
) -> Result<(String, Vec<Option<String>>), BackplaneError> {
    reject_unknown_keys(schema, table, columns, record)?;
    if record.is_empty() {
        return Err(BackplaneError::Validation(
            "record must contain at least one column".to_string(),
        ));
    }

    let mut names = Vec::new();
    let mut placeholders = Vec::new();
    let mut binds = Vec::new();
    for column in columns {
        let Some(value) = record.get(&column.name) else {
            continue;
        };
        names.push(quote_ident(&column.name));
        placeholders.push(format!("${}::{}", binds.len() + 1, quote_ident(&column.udt)));
        binds.push(bind_text(value));
    }

    let sql = format!(
        "INSERT INTO {} AS t ({}) VALUES ({}) RETURNING row_to_json(t)::text",
        qualify(schema, table),
        names.join(", "),
        placeholders.join(", ")
    );
    Ok((sql, binds))
}

pub fn build_update(
    schema: &str,
    table: &str,
    columns: &[ColumnMeta],
    pk: &str,
    record: &Record,
) -> Result<(String, Vec<Option<String>>), BackplaneError> {
    reject_unknown_keys(schema, table, columns, record)?;

    let mut assignments = Vec::new();
    let mut binds = Vec::new();
    for column in columns {
        let Some(value) = record.get(&column.name) else {
            continue;
        };
        assignments.push(format!(
            "{} = ${}::{}",
            quote_ident(&column.name),
            binds.len() + 1,
            quote_ident(&column.udt)
        ));
        binds.push(bind_text(value));
    }
    if assignments.is_empty() {
        return Err(BackplaneError::Validation(
            "update contains no recognized columns".to_string(),
        ));
    }

    let sql = format!(
        "UPDATE {} AS t SET {} WHERE {}::text = ${} RETURNING row_to_json(t)::text",
        qualify(schema, table),
        assignments.join(", "),
        quote_ident(pk),
        binds.len() + 1
    );
    Ok((sql, binds))
}

pub fn build_delete(schema: &str, table: &str, pk: &str) -> String {
    format!(
        "DELETE FROM {} t WHERE {}::text = $1 RETURNING row_to_json(t)::text",
        qualify(schema, table),
        quote_ident(pk)
    )
}

/// Column-whitelist guard: every key in the record must name a declared
/// column, otherwise the whole operation is rejected before any SQL runs.
fn reject_unknown_keys(
    schema: &str,
    table: &str,
    columns: &[ColumnMeta],
    record: &Record,
) -> Result<(), BackplaneError> {
    let unknown: Vec<&str> = record
        .keys()
        .filter(|key| !columns.iter().any(|c| &c.name == *key))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        return Err(BackplaneError::Validation(format!(
            "unknown columns for {schema}.{table}: {}",
            unknown.join(", ")
        )));
    }
    Ok(())
}

/// Render a JSON value as a text bind parameter. Objects and arrays are
/// serialized so they can cast to json/jsonb columns.
fn bind_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
