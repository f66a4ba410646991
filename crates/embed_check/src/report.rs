use std::fmt;

use crate::message::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The embed is malformed and would be rejected
    Error,
    /// The embed is accepted, but part of it will not render as written
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub message: Message,
}

impl Issue {
    #[inline]
    pub const fn severity(&self) -> Severity {
        self.severity
    }
}

impl From<Message> for Issue {
    #[inline]
    fn from(message: Message) -> Self {
        Issue {
            severity: message.severity(),
            message,
        }
    }
}

impl fmt::Display for Issue {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.message.fmt(f)
    }
}

/// Result of checking one embed. Both lists are in rule-evaluation order.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Report {
    /// The report for text that is not JSON at all
    pub fn invalid_json() -> Report {
        Report {
            errors: vec![Message::JsonInvalid.to_string()],
            warnings: Vec::new(),
        }
    }

    pub fn push(&mut self, issue: impl Into<Issue>) {
        let issue = issue.into();

        let list = match issue.severity {
            Severity::Error => &mut self.errors,
            Severity::Warning => &mut self.warnings,
        };

        list.push(issue.message.to_string());
    }

    /// Pushes the issue if there is one
    #[inline]
    pub fn add(&mut self, issue: Option<impl Into<Issue>>) {
        if let Some(issue) = issue {
            self.push(issue);
        }
    }

    /// An embed is valid when it has no errors, regardless of warnings
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_sorts_by_severity() {
        let mut report = Report::default();

        report.push(Message::ColorInvalid);
        report.push(Message::UrlWithoutTitle);
        report.add(None::<Message>);
        report.add(Some(Message::TimestampInvalid));

        assert_eq!(report.errors, ["Color is invalid", "Timestamp is invalid"]);
        assert_eq!(report.warnings, ["URL will not be shown if there is no title"]);
        assert!(!report.is_valid());
    }

    #[test]
    fn test_serialize() {
        let report = Report::invalid_json();

        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"errors":["JSON is invalid"],"warnings":[]}"#
        );
    }
}
