//! Driver-error classification.
//!
//! Postgres drivers surface failures in several shapes: a server error with
//! SQLSTATE code/detail/hint, a bare IO error from a refused socket, or a
//! wrapper whose useful message lives somewhere down the source chain. This
//! module first flattens whatever arrived into a [`DriverErrorInfo`], then
//! buckets it into one of the [`BackplaneError`] kinds by code and keyword
//! matching. The matching is heuristic by nature; the precedence order
//! (connection, authentication, schema-not-found, generic) is load-bearing
//! and covered by tests.

use std::error::Error as StdError;

use sqlx::error::DatabaseError;
use sqlx::postgres::PgDatabaseError;

use crate::error::BackplaneError;

/// Flattened view of a driver error, independent of its original shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverErrorInfo {
    pub message: String,
    pub code: Option<String>,
    pub detail: Option<String>,
    pub hint: Option<String>,
}

impl DriverErrorInfo {
    /// Extract message/code/detail/hint from a sqlx error.
    ///
    /// Strategies in order: server-reported database error fields, then the
    /// deepest message found walking the source chain, then the error's
    /// `Display` output.
    pub fn from_sqlx(err: &sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            return Self::from_database_error(db_err);
        }

        // Io/Tls/protocol errors: the innermost source usually carries the
        // OS-level message ("Connection refused").
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(inner) = source {
            message = inner.to_string();
            source = inner.source();
        }
        if message.is_empty() {
            message = err.to_string();
        }

        DriverErrorInfo {
            message,
            code: io_error_code(err),
            detail: None,
            hint: None,
        }
    }

    fn from_database_error(db_err: &(dyn DatabaseError + 'static)) -> Self {
        let (detail, hint) = match db_err.try_downcast_ref::<PgDatabaseError>() {
            Some(pg) => (
                pg.detail().map(str::to_string),
                pg.hint().map(str::to_string),
            ),
            None => (None, None),
        };
        DriverErrorInfo {
            message: db_err.message().to_string(),
            code: db_err.code().map(|c| c.into_owned()),
            detail,
            hint,
        }
    }

    /// A diagnostics string for the error envelope's `details` payload.
    fn details_payload(&self) -> String {
        let mut parts = vec![self.message.clone()];
        if let Some(ref code) = self.code {
            parts.push(format!("code={code}"));
        }
        if let Some(ref detail) = self.detail {
            parts.push(detail.clone());
        }
        if let Some(ref hint) = self.hint {
            parts.push(format!("hint: {hint}"));
        }
        parts.join("; ")
    }
}

/// Map OS-level error kinds onto the conventional errno-style codes the
/// keyword matcher understands.
fn io_error_code(err: &sqlx::Error) -> Option<String> {
    if let sqlx::Error::Io(io_err) = err {
        return match io_err.kind() {
            std::io::ErrorKind::ConnectionRefused => Some("ECONNREFUSED".to_string()),
            std::io::ErrorKind::TimedOut => Some("ETIMEDOUT".to_string()),
            _ => None,
        };
    }
    None
}

/// Classify a flattened driver error into a [`BackplaneError`].
///
/// Precedence, checked in order:
/// 1. connection/timeout/refused keywords or `ECONNREFUSED`/`ETIMEDOUT`
/// 2. authentication/password/permission keywords or `28P01`/`28000`
///    (reported as a connection failure with a distinct message)
/// 3. database/schema does-not-exist keywords or `3D000`/`42P01`
/// 4. generic database failure preserving the original message
pub fn classify(info: &DriverErrorInfo) -> BackplaneError {
    let message = info.message.to_lowercase();
    let code = info.code.as_deref().unwrap_or("");
    let details = Some(info.details_payload());

    if code == "ECONNREFUSED"
        || code == "ETIMEDOUT"
        || message.contains("connection")
        || message.contains("timeout")
        || message.contains("timed out")
        || message.contains("refused")
    {
        return BackplaneError::Connection {
            message: "could not connect to the database; check the host, port and that \
                      the server is accepting connections"
                .to_string(),
            details,
        };
    }

    if code == "28P01"
        || code == "28000"
        || message.contains("authentication")
        || message.contains("password")
        || message.contains("permission")
    {
        return BackplaneError::Connection {
            message: "authentication failed; check the database user and password".to_string(),
            details,
        };
    }

    if code == "3D000"
        || code == "42P01"
        || message.contains("does not exist")
        || message.contains("database")
        || message.contains("schema")
    {
        return BackplaneError::Database {
            message: "database or schema not found; check the database name".to_string(),
            details,
        };
    }

    BackplaneError::Database {
        message: info.message.clone(),
        details,
    }
}

/// Convenience wrapper: extract and classify in one step.
pub fn classify_sqlx(err: &sqlx::Error) -> BackplaneError {
    match err {
        sqlx::Error::RowNotFound => BackplaneError::NotFound("row not found".to_string()),
        _ => classify(&DriverErrorInfo::from_sqlx(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(message: &str, code: Option<&str>) -> DriverErrorInfo {
        DriverErrorInfo {
            message: message.to_string(),
            code: code.map(str::to_string),
            detail: None,
            hint: None,
        }
    }

    #[test]
    fn test_refused_socket_is_connection_error() {
        let err = classify(&info("Connection refused (os error 111)", None));
        assert!(matches!(err, BackplaneError::Connection { .. }));
        assert!(err.to_string().contains("could not connect"));
    }

    #[test]
    fn test_econnrefused_code_is_connection_error() {
        let err = classify(&info("socket error", Some("ECONNREFUSED")));
        assert!(matches!(err, BackplaneError::Connection { .. }));
    }

    #[test]
    fn test_password_failure_is_authentication_message() {
        // No connection keyword in the message, so the auth bucket wins.
        let err = classify(&info("password authentication failed for user \"app\"", None));
        assert!(matches!(err, BackplaneError::Connection { .. }));
        assert!(err.to_string().contains("authentication failed"));
    }

    #[test]
    fn test_sqlstate_28p01_is_authentication() {
        let err = classify(&info("login rejected", Some("28P01")));
        assert!(err.to_string().contains("authentication failed"));
    }

    #[test]
    fn test_connection_keyword_outranks_permission_keyword() {
        // Both keywords present: the connection check runs first, so this is
        // reported as a plain connection failure, not an auth failure.
        let err = classify(&info("permission denied while opening connection", None));
        assert!(matches!(err, BackplaneError::Connection { .. }));
        assert!(err.to_string().contains("could not connect"));
    }

    #[test]
    fn test_missing_database_is_schema_error() {
        let err = classify(&info("database \"nope\" does not exist", Some("3D000")));
        assert!(matches!(err, BackplaneError::Database { .. }));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_undefined_table_code_is_schema_error() {
        let err = classify(&info("relation \"public.ghost\" does not exist", Some("42P01")));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_unrecognized_error_stays_generic() {
        let err = classify(&info("division by zero", Some("22012")));
        match err {
            BackplaneError::Database { message, details } => {
                assert_eq!(message, "division by zero");
                assert!(details.unwrap().contains("22012"));
            }
            other => panic!("expected generic database error, got {other:?}"),
        }
    }

    #[test]
    fn test_details_payload_preserves_all_fields() {
        let info = DriverErrorInfo {
            message: "boom".to_string(),
            code: Some("XX000".to_string()),
            detail: Some("internal detail".to_string()),
            hint: Some("try again".to_string()),
        };
        assert_eq!(
            info.details_payload(),
            "boom; code=XX000; internal detail; hint: try again"
        );
    }

    #[test]
    fn test_from_sqlx_walks_io_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Connection refused");
        let info = DriverErrorInfo::from_sqlx(&sqlx::Error::from(io));
        assert_eq!(info.code.as_deref(), Some("ECONNREFUSED"));
        assert!(info.message.contains("Connection refused"));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = classify_sqlx(&sqlx::Error::RowNotFound);
        assert!(matches!(err, BackplaneError::NotFound(_)));
    }
}
