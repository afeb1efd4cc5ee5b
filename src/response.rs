//! Response validation for SharedBook API calls.
//!
//! The service answers with small XML documents. Only a handful of shapes
//! matter:
//!
//! ```text
//! <auth.getSessionToken status="ok"><sessionToken>ID</sessionToken></auth.getSessionToken>
//! <bmscreate.init status="ok"><bms id="11235" /></bmscreate.init>
//! <bms.publish status="ok" />
//! <book.preview status="ok"><url>URL</url></book.preview>
//! ```
//!
//! Bodies are read with a tolerant pull parser: end tags are not checked
//! against start tags and parsing stops quietly at the first syntax error.
//! A body that does not contain the expected element yields a
//! [`ResponseError`] carrying the raw body.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::ResponseError;

/// Marker attribute of successful responses.
const STATUS_ATTR: &[u8] = b"status";
const STATUS_OK: &[u8] = b"ok";

/// Fragment of the login redirect page preceding the auth token.
const AUTH_TOKEN_MARKER: &str = "?authToken=";

/// Accepted form of an id attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdShape {
    /// ASCII digits only
    Numeric,
    /// Any non-empty value
    Opaque,
}

impl IdShape {
    fn accepts(self, id: &str) -> bool {
        match self {
            IdShape::Numeric => !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()),
            IdShape::Opaque => !id.is_empty(),
        }
    }
}

fn reader(body: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(body);
    reader.check_end_names(false);
    reader
}

/// Raw value of attribute `name` on `element`.
fn attribute(element: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    element
        .attributes()
        .with_checks(false)
        .filter_map(Result::ok)
        .find(|attr| attr.key.as_ref() == name)
        .and_then(|attr| std::str::from_utf8(&attr.value).ok().map(str::to_string))
}

/// Run `visit` on every start or empty element until it returns a value.
fn find_element<F>(body: &str, mut visit: F) -> Option<String>
where
    F: FnMut(&BytesStart<'_>) -> Option<String>,
{
    let mut reader = reader(body);
    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) | Ok(Event::Empty(element)) => {
                if let Some(found) = visit(&element) {
                    return Some(found);
                }
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

/// Raw text content of the first `<tag>...</tag>` element.
fn element_text(body: &str, tag: &[u8]) -> Option<String> {
    let mut reader = reader(body);
    let mut text: Option<String> = None;
    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) if element.name().as_ref() == tag => {
                text = Some(String::new());
            }
            Ok(Event::Text(content)) => {
                if let Some(text) = text.as_mut() {
                    text.push_str(std::str::from_utf8(&content).ok()?);
                }
            }
            Ok(Event::End(element)) if element.name().as_ref() == tag => {
                return text;
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

/// Succeed when any element carries `status="ok"`.
pub fn expect_ok(operation: &'static str, body: &str) -> Result<(), ResponseError> {
    let found = find_element(body, |element| {
        attribute(element, STATUS_ATTR)
            .filter(|status| status.as_bytes() == STATUS_OK)
    });

    match found {
        Some(_) => Ok(()),
        None => Err(ResponseError::new(operation, body)),
    }
}

/// Extract the `id` attribute of the first `<tag id="...">` element.
pub fn extract_id(
    operation: &'static str,
    body: &str,
    tag: &str,
    shape: IdShape,
) -> Result<String, ResponseError> {
    find_element(body, |element| {
        if element.name().as_ref() != tag.as_bytes() {
            return None;
        }
        attribute(element, b"id").filter(|id| shape.accepts(id))
    })
    .ok_or_else(|| ResponseError::new(operation, body))
}

/// Extract the non-empty text of the first `<tag>...</tag>` element.
pub fn extract_text(
    operation: &'static str,
    body: &str,
    tag: &str,
) -> Result<String, ResponseError> {
    element_text(body, tag.as_bytes())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ResponseError::new(operation, body))
}

/// Session token from an `auth/getSessionToken` response.
pub fn parse_session_token(body: &str) -> Result<String, ResponseError> {
    extract_text("auth/getSessionToken", body, "sessionToken")
}

/// Preview URL from a `book/preview` response.
///
/// Only `&amp;` is unescaped; any other entity is left as sent.
pub fn parse_preview_url(body: &str) -> Result<String, ResponseError> {
    extract_text("book/preview", body, "url").map(|url| url.replace("&amp;", "&"))
}

/// Auth token from the redirect page returned by `auth/login`.
///
/// The page links to `...?authToken=ID">`; the token runs up to the closing
/// quote.
pub fn parse_auth_token(body: &str) -> Result<String, ResponseError> {
    body.find(AUTH_TOKEN_MARKER)
        .map(|start| &body[start + AUTH_TOKEN_MARKER.len()..])
        .and_then(|rest| rest.find('"').map(|end| &rest[..end]))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ResponseError::new("auth/login", body))
}
