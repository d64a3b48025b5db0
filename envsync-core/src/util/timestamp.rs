//! Textual form of `content_modified_at`.
//!
//! Records are written as `YYYY-MM-DD HH:MM:SS` in UTC. Rows written by other
//! clients may carry RFC 3339 instead, so parsing falls back to it.

use std::fs::Metadata;

use filetime::FileTime;
use time::format_description::FormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::error::StoreError;

const STORED: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

pub fn format_stored(t: OffsetDateTime) -> Result<String, StoreError> {
    t.to_offset(UtcOffset::UTC)
        .format(STORED)
        .map_err(|_| StoreError::Timestamp {
            value: t.to_string(),
        })
}

pub fn parse_stored(value: &str) -> Result<OffsetDateTime, StoreError> {
    let trimmed = value.trim();
    PrimitiveDateTime::parse(trimmed, STORED)
        .map(PrimitiveDateTime::assume_utc)
        .or_else(|_| OffsetDateTime::parse(trimmed, &Rfc3339))
        .map_err(|_| StoreError::Timestamp {
            value: value.to_string(),
        })
}

pub fn modified_at(meta: &Metadata) -> std::io::Result<OffsetDateTime> {
    Ok(OffsetDateTime::from(meta.modified()?))
}

pub fn to_file_time(t: OffsetDateTime) -> FileTime {
    FileTime::from_unix_time(t.unix_timestamp(), t.nanosecond())
}

pub fn now_stored() -> Result<String, StoreError> {
    format_stored(OffsetDateTime::now_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn formats_in_utc_without_fraction() {
        let t = datetime!(2024-03-05 23:30:07.900 -02:00);
        assert_eq!(format_stored(t).unwrap(), "2024-03-06 01:30:07");
    }

    #[test]
    fn now_reads_back() {
        let now = now_stored().unwrap();
        assert_eq!(now.len(), "2024-03-06 01:30:07".len());
        assert!(parse_stored(&now).is_ok());
    }

    #[test]
    fn parses_primary_format() {
        assert_eq!(
            parse_stored("2024-03-06 01:30:07").unwrap(),
            datetime!(2024-03-06 01:30:07 UTC)
        );
    }

    #[test]
    fn falls_back_to_rfc3339() {
        assert_eq!(
            parse_stored("2024-03-06T01:30:07Z").unwrap(),
            datetime!(2024-03-06 01:30:07 UTC)
        );
        assert_eq!(
            parse_stored("2024-03-06T03:30:07+02:00").unwrap(),
            datetime!(2024-03-06 01:30:07 UTC)
        );
    }

    #[test]
    fn rejects_unknown_formats() {
        let err = parse_stored("06/03/2024").unwrap_err();
        assert!(matches!(err, StoreError::Timestamp { .. }));
    }

    #[test]
    fn file_time_keeps_seconds() {
        let t = datetime!(2023-01-01 00:00:10 UTC);
        assert_eq!(to_file_time(t).unix_seconds(), t.unix_timestamp());
    }
}
