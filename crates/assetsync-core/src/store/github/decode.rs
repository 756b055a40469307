//! Turn a raw-content response into an [`ItemValue`] based on its media type.

use crate::value::ItemValue;

/// Lowercased media type without parameters: `Text/Plain; charset=x` → `text/plain`.
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

fn is_json(media: &str) -> bool {
    media == "application/json" || media.ends_with("+json")
}

fn is_text(media: &str) -> bool {
    media.starts_with("text/")
        || media.ends_with("+xml")
        || matches!(
            media,
            "application/xml" | "application/javascript" | "application/ecmascript"
        )
}

/// Whether a text body should be tried as JSON: an object or array, a
/// `true`/`false`/`null` literal, or a number.
fn looks_like_json(text: &str) -> bool {
    let t = text.trim();
    t.starts_with('{')
        || t.starts_with('[')
        || matches!(t, "true" | "false" | "null")
        || (!t.is_empty() && t.parse::<f64>().is_ok())
}

/// UTF-8 text becomes JSON when it parses as such, a primitive otherwise.
/// Anything else stays bytes.
fn text_value(body: Vec<u8>) -> Option<ItemValue> {
    match String::from_utf8(body) {
        Ok(text) => {
            if looks_like_json(&text) {
                if let Ok(value) = serde_json::from_str(&text) {
                    return ItemValue::from_json(value);
                }
            }
            Some(ItemValue::Primitive(text))
        }
        Err(e) => Some(ItemValue::Blob(e.into_bytes())),
    }
}

/// Decode a response body. Returns `None` only for a JSON `null` body.
///
/// JSON is parsed (mapping/sequence → structured, scalar → primitive) and
/// falls back to text if it does not parse. The raw host serves `.json`
/// files as `text/plain`, so text bodies that look like JSON are parsed the
/// same way; other text becomes a primitive when valid UTF-8. Everything
/// else, including no content type, is a blob.
pub fn decode_body(content_type: Option<&str>, body: Vec<u8>) -> Option<ItemValue> {
    let media = content_type.map(essence).unwrap_or_default();
    if is_json(&media) {
        return match serde_json::from_slice(&body) {
            Ok(value) => ItemValue::from_json(value),
            Err(_) => text_value(body),
        };
    }
    if is_text(&media) {
        return text_value(body);
    }
    Some(ItemValue::Blob(body))
}
