//! Image file to data URI encoding.

use crate::model::entry::ValidationError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;

static DATA_URI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:([a-zA-Z]+/[a-zA-Z0-9.+-]+)(;[^,]*)?,").expect("valid data uri regex")
});

/// Encodes `bytes` as a base64 data URI, typed from `file_name`.
///
/// Only `image/*` types are accepted.
pub fn encode_image_data_uri(file_name: &str, bytes: &[u8]) -> Result<String, ValidationError> {
    let mime = mime_guess::from_path(file_name).first();
    let mime = match mime {
        Some(mime) if mime.type_() == mime_guess::mime::IMAGE => mime,
        Some(other) => {
            return Err(ValidationError::NotAnImage {
                mime: other.essence_str().to_string(),
            })
        }
        None => {
            return Err(ValidationError::NotAnImage {
                mime: "unknown".to_string(),
            })
        }
    };
    if bytes.is_empty() {
        return Err(ValidationError::EmptyFile);
    }

    Ok(format!(
        "data:{};base64,{}",
        mime.essence_str(),
        STANDARD.encode(bytes)
    ))
}

/// Media type of a data URI, or `None` for plain URLs.
pub fn data_uri_media_type(value: &str) -> Option<&str> {
    DATA_URI_RE
        .captures(value)
        .and_then(|captures| captures.get(1))
        .map(|media| media.as_str())
}
