//! Recognizing "item not found in list" rejections of a list patch

use once_cell::sync::Lazy;
use regex::Regex;

use super::errors::ApiError;
use super::types::Envelope;

const NOT_FOUND_MARKER: &str = "not found in list";

static ITEM_MESSAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:item to be removed, )?([^,]+?)(?:, not found in list)?$")
        .expect("ITEM_MESSAGE should compile - this is a bug")
});

static RAW_MESSAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""message"\s*:\s*"(?:item to be removed, )?([^,"]+?)(?:, not found in list)?""#)
        .expect("RAW_MESSAGE should compile - this is a bug")
});

/// The value a rejected patch tried to remove but the list no longer holds.
///
/// Only client errors whose payload mentions "not found in list" qualify. The
/// value is returned as the gateway wrote it; it need not be a valid domain.
pub fn stale_removal(err: &ApiError) -> Option<String> {
    let ApiError::Client { message, .. } = err else {
        return None;
    };
    if !message.contains(NOT_FOUND_MARKER) {
        return None;
    }

    if let Ok(envelope) = serde_json::from_str::<Envelope<serde_json::Value>>(message) {
        let parsed = envelope
            .errors
            .iter()
            .filter(|e| e.message.contains(NOT_FOUND_MARKER))
            .find_map(|e| ITEM_MESSAGE.captures(e.message.trim()))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_owned())
            .filter(|value| !value.is_empty());
        if parsed.is_some() {
            return parsed;
        }
    }

    RAW_MESSAGE
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_owned())
        .filter(|value| !value.is_empty())
}
