use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A point in time accepted by the date descriptor, normalized to UTC.
///
/// Accepted inputs:
/// - RFC 3339 with any offset (`2026-01-15T17:00:00+05:00`).
/// - Naive date-times without offset, read as UTC (`2026-01-15T12:00:00`).
/// - Bare calendar dates, read as midnight UTC (`2026-01-15`).
///
/// Rendering always uses the `Z` suffix and keeps only as many fractional
/// digits as needed, so whole-second inputs round-trip exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
	/// Parse one of the accepted textual forms.
	pub fn parse(text: &str) -> Option<Self> {
		let text = text.trim();
		if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
			return Some(Self(dt.with_timezone(&Utc)));
		}
		for format in NAIVE_FORMATS {
			if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
				return Some(Self(naive.and_utc()));
			}
		}
		let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
		Some(Self(date.and_hms_opt(0, 0, 0)?.and_utc()))
	}

	/// Access the inner `DateTime<Utc>`.
	pub fn as_datetime(&self) -> &DateTime<Utc> {
		&self.0
	}

	/// Render as RFC 3339 with `Z` suffix.
	pub fn to_rfc3339(&self) -> String {
		self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
	}
}

impl From<DateTime<Utc>> for Timestamp {
	fn from(dt: DateTime<Utc>) -> Self {
		Self(dt)
	}
}

impl fmt::Display for Timestamp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_rfc3339())
	}
}
