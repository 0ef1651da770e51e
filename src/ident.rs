//! SQL identifier quoting for dynamically-supplied names.
//!
//! Table, schema and column names reach this crate as runtime strings, so
//! every one of them is double-quoted before being spliced into SQL text.
//! Values never go through here; they are always bound as parameters.

/// Quote an identifier for PostgreSQL, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a `schema.table` pair.
pub fn qualify(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}
