//! Conversion helpers shared by the database adapters.

use parking_types::{RepoError, TicketStatus};

// ─────────────────────────────────────────────────────────────────────────────
// Error mapping
// ─────────────────────────────────────────────────────────────────────────────

/// Maps a driver error to a repository error.
///
/// Unique-index violations become [`RepoError::Conflict`]: they mean another
/// open ticket already holds the vehicle or the slot, or the plate is taken.
pub fn db_error(err: sqlx::Error) -> RepoError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::Conflict(db.message().to_string())
        }
        _ => RepoError::Database(err.to_string()),
    }
}

pub fn tx_error(err: sqlx::Error) -> RepoError {
    RepoError::Transaction(err.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

pub fn parse_status(s: &str) -> Result<TicketStatus, RepoError> {
    s.parse()
        .map_err(|_| RepoError::Database(format!("Unknown ticket status: {}", s)))
}

#[cfg(feature = "sqlite")]
pub fn parse_uuid(s: &str) -> Result<uuid::Uuid, RepoError> {
    uuid::Uuid::parse_str(s).map_err(|e| RepoError::Database(e.to_string()))
}

#[cfg(feature = "sqlite")]
pub fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>, RepoError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| RepoError::Database(e.to_string()))
}

/// Fixed-width RFC 3339 so that text columns sort chronologically.
#[cfg(feature = "sqlite")]
pub fn format_timestamp(dt: &chrono::DateTime<chrono::Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)
}

#[cfg(feature = "sqlite")]
pub fn parse_decimal(s: &str) -> Result<rust_decimal::Decimal, RepoError> {
    s.parse()
        .map_err(|e: rust_decimal::Error| RepoError::Database(e.to_string()))
}
