//! Repository implementations using SQLite.

mod booking_repository;
mod credential_repository;
mod property_repository;
mod user_repository;

pub use booking_repository::SqliteBookingRepository;
pub use credential_repository::SqliteCredentialRepository;
pub use property_repository::SqlitePropertyRepository;
pub use user_repository::SqliteUserRepository;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Type;
use stayhub_core::EmailTaken;

/// Stay dates are stored as `YYYY-MM-DD`, so text comparison is date comparison.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a datetime string to DateTime<Utc>.
/// Handles both RFC3339 format and SQLite's `datetime('now')` format.
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }

    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return dt.and_utc();
    }

    tracing::warn!("Unparseable timestamp '{}', using current time", s);
    Utc::now()
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Read a `YYYY-MM-DD` column.
pub(crate) fn date_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read a column holding a value with a `FromStr` impl (roles, statuses).
pub(crate) fn parsed_column<T>(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = anyhow::Error>,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

/// Turn a unique violation on `users.email` into [`EmailTaken`]; anything else
/// passes through as a store error.
pub(crate) fn map_email_conflict(err: rusqlite::Error) -> anyhow::Error {
    if let rusqlite::Error::SqliteFailure(failure, Some(message)) = &err {
        if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            && message.contains("users.email")
        {
            return EmailTaken.into();
        }
    }
    err.into()
}
