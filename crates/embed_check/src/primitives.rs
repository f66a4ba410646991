//! Stateless checks shared by the embed rules.
//!
//! Values are taken as `Option<&Value>`, where `None` is a missing key. A JSON `null`
//! is treated the same as a missing key everywhere.

use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::{limits, message::Message};

lazy_static::lazy_static! {
    static ref ISO_DATE_REGEX: Regex = Regex::new(r#"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(?:\.[0-9]{3})?Z$"#).unwrap();
}

/// Only spaces and newlines count as blank, tabs and other whitespace do not.
#[inline]
fn is_blank(s: &str) -> bool {
    s.chars().all(|c| c == ' ' || c == '\n')
}

/// Checks that `value` is a plain absolute `http` or `https` URL.
///
/// Missing, `null` and empty values are accepted, as every URL in an embed is optional.
pub fn is_valid_url(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(url)) => url.is_empty() || is_valid_url_str(url),
        Some(_) => false,
    }
}

pub fn is_valid_url_str(url: &str) -> bool {
    let Ok(url) = Url::parse(url) else {
        return false;
    };

    matches!(url.scheme(), "http" | "https") && matches!(url.host_str(), Some(host) if !host.is_empty())
}

/// `YYYY-MM-DDTHH:MM:SS[.mmm]Z`, nothing else
pub fn is_iso_date(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(ts)) => ISO_DATE_REGEX.is_match(ts),
        _ => false,
    }
}

/// Integer within the 24-bit RGB range
pub fn is_valid_color(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Number(n)) => matches!(n.as_u64(), Some(c) if c <= limits::MAX_COLOR),
        _ => false,
    }
}

/// English ordinal for a 1-based position, e.g. `21` -> `"21st"`
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };

    format!("{n}{suffix}")
}

/// True for missing values, non-strings, and strings made only of spaces and newlines
pub fn is_string_empty(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => is_blank(s),
        _ => true,
    }
}

/// Checks an embed string, returning the first problem found.
///
/// Length is counted in characters, not bytes.
pub fn string_errors(value: Option<&Value>, label: &str, allow_empty: bool, max_length: usize) -> Option<Message> {
    match value {
        None | Some(Value::Null) if allow_empty => None,
        None | Some(Value::Null) => Some(Message::Empty { label: label.into() }),
        Some(Value::String(s)) if !allow_empty && is_blank(s) => Some(Message::Empty { label: label.into() }),
        Some(Value::String(s)) if s.chars().count() > max_length => Some(Message::TooLong {
            label: label.into(),
            max: max_length,
        }),
        Some(Value::String(_)) => None,
        Some(_) => Some(Message::NotAString { label: label.into() }),
    }
}
