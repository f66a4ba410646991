use std::fmt;

use smol_str::SmolStr;

use crate::limits;
use crate::report::Severity;

/// Every message the checker can produce, one variant per rule.
///
/// The wording produced by the [`Display`](fmt::Display) implementation is relied upon by
/// consumers of the report, so it must not change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    JsonInvalid,
    JsonNotObject,
    JsonTooLong,
    NoContent,
    InvalidKey { key: SmolStr },

    Empty { label: SmolStr },
    NotAString { label: SmolStr },
    TooLong { label: SmolStr, max: usize },
    NotAnObject { label: SmolStr },

    UrlInvalid,
    UrlWithoutTitle,
    TimestampInvalid,
    ColorInvalid,
    FooterIconWithoutText,
    AuthorUrlInvalid,
    AuthorWithoutName,

    FieldsNotArray,
    TooManyFields,
    FieldEmpty { nth: SmolStr },
    FieldNotObject { nth: SmolStr },
    FieldInlineNotBoolean { nth: SmolStr },

    ImageNotAValidUrl { label: SmolStr },
    ImageNotFetched { label: SmolStr },
    ImageBadResponse { label: SmolStr, status: u16, reason: SmolStr },
    NotAnImage { label: SmolStr },
    UnsupportedImageType { label: SmolStr },
}

impl Message {
    pub const fn severity(&self) -> Severity {
        match self {
            Message::InvalidKey { .. }
            | Message::UrlWithoutTitle
            | Message::FooterIconWithoutText
            | Message::AuthorWithoutName
            | Message::ImageNotFetched { .. }
            | Message::ImageBadResponse { .. }
            | Message::NotAnImage { .. }
            | Message::UnsupportedImageType { .. } => Severity::Warning,

            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::JsonInvalid => f.write_str("JSON is invalid"),
            Message::JsonNotObject => f.write_str("JSON is not an object"),
            Message::JsonTooLong => write!(f, "JSON is too long (>{} characters)", limits::TOTAL),
            Message::NoContent => f.write_str("No content (title, description, author, footer, or fields)."),
            Message::InvalidKey { key } => write!(f, "\"{key}\" is not a valid key"),

            Message::Empty { label } => write!(f, "{label} is empty"),
            Message::NotAString { label } => write!(f, "{label} is not a string"),
            Message::TooLong { label, max } => write!(f, "{label} is too long (>{max} characters)"),
            Message::NotAnObject { label } => write!(f, "{label} is not an object"),

            Message::UrlInvalid => f.write_str("URL is invalid"),
            Message::UrlWithoutTitle => f.write_str("URL will not be shown if there is no title"),
            Message::TimestampInvalid => f.write_str("Timestamp is invalid"),
            Message::ColorInvalid => f.write_str("Color is invalid"),
            Message::FooterIconWithoutText => f.write_str("Footer icon will not be shown without text"),
            Message::AuthorUrlInvalid => f.write_str("Author has an invalid URL"),
            Message::AuthorWithoutName => f.write_str("Author URL and icon will not be shown without a name"),

            Message::FieldsNotArray => f.write_str("Fields is not an array"),
            Message::TooManyFields => write!(f, "Too many fields (>{})", limits::MAX_FIELDS),
            Message::FieldEmpty { nth } => write!(f, "{nth} field is empty"),
            Message::FieldNotObject { nth } => write!(f, "{nth} field is not an object"),
            Message::FieldInlineNotBoolean { nth } => write!(f, "{nth} field inline is not a boolean"),

            Message::ImageNotAValidUrl { label } => write!(f, "{label} is not a valid URL"),
            Message::ImageNotFetched { label } => write!(f, "{label} could not be checked"),
            Message::ImageBadResponse { label, status, reason } => match reason.is_empty() {
                true => write!(f, "{label} gave bad response ({status})"),
                false => write!(f, "{label} gave bad response ({status} {reason})"),
            },
            Message::NotAnImage { label } => write!(f, "{label} is not an image"),
            Message::UnsupportedImageType { label } => {
                write!(f, "{label} is an unsupported image type (should be png, jpeg, gif, or webp)")
            }
        }
    }
}
