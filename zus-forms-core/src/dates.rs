//! Date formats used by the forms
//!
//! Input dates are ISO (`YYYY-MM-DD`). The notification template has
//! eight-character date boxes and takes `DD-MM-YY`; the explanation form and
//! the accident card use the long Polish form `DD.MM.YYYY`.

use chrono::NaiveDate;

/// Input format accepted everywhere
pub const ISO_FORMAT: &str = "%Y-%m-%d";

/// Output style for a date widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateStyle {
    /// `DD-MM-YY`
    Compact,
    /// `DD.MM.YYYY`
    Long,
}

impl DateStyle {
    pub fn pattern(self) -> &'static str {
        match self {
            DateStyle::Compact => "%d-%m-%y",
            DateStyle::Long => "%d.%m.%Y",
        }
    }

    pub fn format(self, date: NaiveDate) -> String {
        date.format(self.pattern()).to_string()
    }

    /// Reformat an ISO date string. Returns `None` when the input does not
    /// parse, leaving the fallback decision to the caller.
    pub fn reformat(self, raw: &str) -> Option<String> {
        parse_iso(raw).map(|date| self.format(date))
    }
}

/// Parse a calendar-valid ISO date
pub fn parse_iso(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    // chrono accepts unpadded fields; the forms do not
    if raw.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(raw, ISO_FORMAT).ok()
}
