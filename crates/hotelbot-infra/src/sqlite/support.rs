//! Shared helpers for the SQLite repositories: timestamp encoding, id
//! parsing and classification of driver errors.

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use hotelbot_types::error::RepositoryError;
use hotelbot_types::session::SessionId;
use sqlx::error::ErrorKind;

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width UTC form so that text ordering matches time ordering.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time at the precision the store keeps.
pub(crate) fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, RepositoryError> {
    s.parse::<NaiveDate>()
        .map_err(|e| RepositoryError::Query(format!("invalid date '{s}': {e}")))
}

pub(crate) fn parse_session_id(s: &str) -> Result<SessionId, RepositoryError> {
    s.parse::<SessionId>()
        .map_err(|e| RepositoryError::Query(format!("invalid session id: {e}")))
}

/// Classify a driver error into the repository taxonomy.
///
/// `what` names the record being written and prefixes the message.
pub(crate) fn map_sqlx_error(err: sqlx::Error, what: &str) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => match db_err.kind() {
            ErrorKind::UniqueViolation => {
                RepositoryError::ConstraintViolation(format!("{what}: {}", db_err.message()))
            }
            ErrorKind::ForeignKeyViolation => {
                RepositoryError::Reference(format!("{what}: referenced row does not exist"))
            }
            ErrorKind::NotNullViolation | ErrorKind::CheckViolation => RepositoryError::Validation {
                field: what.to_string(),
                reason: db_err.message().to_string(),
            },
            _ => RepositoryError::Query(db_err.to_string()),
        },
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Connection
        }
        other => RepositoryError::Query(other.to_string()),
    }
}

/// Shorthand for errors outside of writes (reads, row decoding, commits).
pub(crate) fn query_error(err: sqlx::Error) -> RepositoryError {
    map_sqlx_error(err, "query")
}

pub(crate) fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datetime_roundtrip_is_fixed_width() {
        let a = parse_datetime("2026-03-01T10:00:00Z").unwrap();
        let b = parse_datetime("2026-03-01T10:00:00.5Z").unwrap();
        let (fa, fb) = (format_datetime(&a), format_datetime(&b));
        assert_eq!(fa.len(), fb.len());
        assert!(fa < fb);
        assert_eq!(parse_datetime(&fb).unwrap(), b);
    }

    #[test]
    fn test_now_micros_survives_storage() {
        let now = now_micros();
        assert_eq!(parse_datetime(&format_datetime(&now)).unwrap(), now);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2026-07-14").unwrap().to_string(), "2026-07-14");
        assert!(parse_date("14/07/2026").is_err());
    }

    #[test]
    fn test_pool_errors_map_to_connection() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut, "message"),
            RepositoryError::Connection
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound, "message"),
            RepositoryError::Query(_)
        ));
    }
}
