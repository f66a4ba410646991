use serde_json::{Map, Value};

use crate::{
    cache::ProbeCache,
    limits,
    message::Message,
    primitives::{is_iso_date, is_string_empty, is_valid_color, is_valid_url, ordinal, string_errors},
    probe::{Fetch, ImageProber},
    report::{Issue, Report},
};

/// Top-level keys understood by the checker, anything else is warned about
pub const KNOWN_KEYS: &[&str] = &[
    "title",
    "description",
    "url",
    "timestamp",
    "color",
    "footer",
    "image",
    "thumbnail",
    "author",
    "fields",
];

type Object = Map<String, Value>;

/// Looks up `key`, treating `null` as missing
#[inline]
fn get<'a>(obj: &'a Object, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|value| !value.is_null())
}

/// `Err` if the value is there but is not an object
fn object(value: Option<&Value>) -> Result<Option<&Object>, ()> {
    match value {
        None => Ok(None),
        Some(Value::Object(obj)) => Ok(Some(obj)),
        Some(_) => Err(()),
    }
}

/// Present and not an empty string
#[inline]
fn is_set(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Probe results, one slot per image link an embed can carry
struct Probes {
    footer_icon: Option<Issue>,
    image: Option<Issue>,
    thumbnail: Option<Issue>,
    author_icon: Option<Issue>,
}

struct Embed<'a> {
    doc: &'a Object,
    footer: Result<Option<&'a Object>, ()>,
    image: Result<Option<&'a Object>, ()>,
    thumbnail: Result<Option<&'a Object>, ()>,
    author: Result<Option<&'a Object>, ()>,
}

impl<'a> Embed<'a> {
    fn new(doc: &'a Object) -> Self {
        Embed {
            doc,
            footer: object(get(doc, "footer")),
            image: object(get(doc, "image")),
            thumbnail: object(get(doc, "thumbnail")),
            author: object(get(doc, "author")),
        }
    }

    #[inline]
    fn get(&self, key: &str) -> Option<&'a Value> {
        get(self.doc, key)
    }

    /// Subfield of an object-valued field, `None` if the field is missing or malformed
    #[inline]
    fn sub(parent: &Result<Option<&'a Object>, ()>, key: &str) -> Option<&'a Value> {
        match parent {
            Ok(Some(obj)) => get(obj, key),
            _ => None,
        }
    }

    /// Runs every image probe the embed needs at once
    async fn probe<F: Fetch>(&self, prober: &ImageProber<F>, cache: &ProbeCache) -> Probes {
        let (footer_icon, image, thumbnail, author_icon) = futures::join!(
            prober.check_image(cache, Self::sub(&self.footer, "icon_url"), "Footer icon"),
            prober.check_image(cache, Self::sub(&self.image, "url"), "Image"),
            prober.check_image(cache, Self::sub(&self.thumbnail, "url"), "Thumbnail"),
            prober.check_image(cache, Self::sub(&self.author, "icon_url"), "Author icon"),
        );

        Probes {
            footer_icon,
            image,
            thumbnail,
            author_icon,
        }
    }

    fn check(&self, raw: &str, probes: Probes, report: &mut Report) {
        let title = self.get("title");
        let description = self.get("description");
        let url = self.get("url");

        report.add(string_errors(title, "Title", true, limits::TITLE));
        report.add(string_errors(description, "Description", true, limits::DESCRIPTION));

        if !is_valid_url(url) {
            report.push(Message::UrlInvalid);
        }

        if is_set(url) && is_string_empty(title) {
            report.push(Message::UrlWithoutTitle);
        }

        if let Some(timestamp) = self.get("timestamp") {
            if !is_iso_date(Some(timestamp)) {
                report.push(Message::TimestampInvalid);
            }
        }

        if let Some(color) = self.get("color") {
            if !is_valid_color(Some(color)) {
                report.push(Message::ColorInvalid);
            }
        }

        self.check_footer(probes.footer_icon, report);
        self.check_media(&self.image, "Image", probes.image, report);
        self.check_media(&self.thumbnail, "Thumbnail", probes.thumbnail, report);
        self.check_author(probes.author_icon, report);
        self.check_fields(report);

        if self.is_empty() {
            report.push(Message::NoContent);
        }

        if raw.chars().count() > limits::TOTAL {
            report.push(Message::JsonTooLong);
        }

        for key in self.doc.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                report.push(Message::InvalidKey { key: key.as_str().into() });
            }
        }
    }

    fn check_footer(&self, icon: Option<Issue>, report: &mut Report) {
        let footer = match self.footer {
            Ok(Some(footer)) => footer,
            Ok(None) => return,
            Err(()) => return report.push(Message::NotAnObject { label: "Footer".into() }),
        };

        let text = get(footer, "text");

        report.add(string_errors(text, "Footer text", true, limits::FOOTER_TEXT));
        report.add(icon);

        if is_string_empty(text) && is_set(get(footer, "icon_url")) {
            report.push(Message::FooterIconWithoutText);
        }
    }

    fn check_media(&self, media: &Result<Option<&Object>, ()>, label: &str, probe: Option<Issue>, report: &mut Report) {
        match media {
            Ok(Some(_)) => report.add(probe),
            Ok(None) => {}
            Err(()) => report.push(Message::NotAnObject { label: label.into() }),
        }
    }

    fn check_author(&self, icon: Option<Issue>, report: &mut Report) {
        let author = match self.author {
            Ok(Some(author)) => author,
            Ok(None) => return,
            Err(()) => return report.push(Message::NotAnObject { label: "Author".into() }),
        };

        let name = get(author, "name");
        let url = get(author, "url");

        report.add(string_errors(name, "Author name", true, limits::AUTHOR_NAME));

        if !is_valid_url(url) {
            report.push(Message::AuthorUrlInvalid);
        }

        report.add(icon);

        if is_string_empty(name) && (is_set(url) || is_set(get(author, "icon_url"))) {
            report.push(Message::AuthorWithoutName);
        }
    }

    fn check_fields(&self, report: &mut Report) {
        let fields = match self.get("fields") {
            None => return,
            Some(Value::Array(fields)) => fields,
            Some(_) => return report.push(Message::FieldsNotArray),
        };

        if fields.len() > limits::MAX_FIELDS {
            return report.push(Message::TooManyFields);
        }

        for (idx, field) in fields.iter().enumerate() {
            let nth = ordinal(idx + 1);

            let field = match field {
                _ if is_falsy(field) => {
                    report.push(Message::FieldEmpty { nth: nth.into() });
                    continue;
                }
                Value::Object(field) => field,
                _ => {
                    report.push(Message::FieldNotObject { nth: nth.into() });
                    continue;
                }
            };

            report.add(string_errors(
                get(field, "name"),
                &format!("{nth} field's name"),
                false,
                limits::FIELD_NAME,
            ));

            report.add(string_errors(
                get(field, "value"),
                &format!("{nth} field's value"),
                false,
                limits::FIELD_VALUE,
            ));

            if let Some(inline) = get(field, "inline") {
                if !inline.is_boolean() {
                    report.push(Message::FieldInlineNotBoolean { nth: nth.into() });
                }
            }
        }
    }

    /// Nothing that would be displayed.
    ///
    /// A link alone is not reported here, it gets the more specific missing-title warning.
    fn is_empty(&self) -> bool {
        let no_fields = match self.get("fields") {
            None => true,
            Some(Value::Array(fields)) => fields.is_empty(),
            Some(_) => false,
        };

        no_fields
            && !is_set(self.get("url"))
            && is_string_empty(self.get("title"))
            && is_string_empty(self.get("description"))
            && is_string_empty(Self::sub(&self.author, "name"))
            && is_string_empty(Self::sub(&self.footer, "text"))
    }
}

/// Checks the raw JSON text of an embed.
///
/// Never fails: text that is not JSON yields a report holding only "JSON is invalid",
/// and every other problem is listed in the report. Image links are probed concurrently,
/// but the report is always ordered by rule, not by which probe finished first.
pub async fn check_json<F: Fetch>(raw: &str, prober: &ImageProber<F>, cache: &ProbeCache) -> Report {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            log::trace!("Embed is not JSON: {e}");
            return Report::invalid_json();
        }
    };

    let mut report = Report::default();

    let empty = Object::new();
    let doc = match value {
        Value::Object(ref doc) => doc,
        _ => {
            report.push(Message::JsonNotObject);
            &empty
        }
    };

    let embed = Embed::new(doc);
    let probes = embed.probe(prober, cache).await;

    embed.check(raw, probes, &mut report);

    log::debug!(
        "Checked embed: {} errors, {} warnings",
        report.errors.len(),
        report.warnings.len()
    );

    report
}
