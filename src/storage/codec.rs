//! Versioned collection encoding
//!
//! Format (JSON):
//! ```text
//! {
//!   "format":   "mindtrack",
//!   "version":  1,
//!   "kind":     "mood" | "journal" | ...,
//!   "checksum": CRC32 of the compact JSON text of `entries`,
//!   "entries":  [ ... ]
//! }
//! ```
//!
//! A bare JSON array is the browser build's layout and decodes as version 0.
//! Anything newer than `FORMAT_VERSION` is refused rather than guessed at.

use crate::storage::collection::Record;
use crate::storage::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope `format` marker
pub const FORMAT_NAME: &str = "mindtrack";

/// Newest envelope version this build reads and the one it writes
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    format: String,
    version: u32,
    kind: String,
    checksum: u32,
    entries: Value,
}

/// A decoded collection and the format version it was stored in
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub entries: Vec<T>,
    pub version: u32,
}

fn checksum(entries: &Value) -> u32 {
    crc32fast::hash(entries.to_string().as_bytes())
}

fn corruption(key: &str, reason: impl ToString) -> StoreError {
    StoreError::Corruption {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Encode a collection into the current envelope format
pub fn encode<T: Record>(entries: &[T]) -> StoreResult<String> {
    let entries = serde_json::to_value(entries)?;
    let envelope = Envelope {
        format: FORMAT_NAME.to_string(),
        version: FORMAT_VERSION,
        kind: T::KIND.to_string(),
        checksum: checksum(&entries),
        entries,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Decode a stored collection, accepting the legacy bare-array layout
pub fn decode<T: Record>(raw: &str) -> StoreResult<Decoded<T>> {
    let value: Value = serde_json::from_str(raw).map_err(|e| corruption(T::KEY, e))?;

    match value {
        Value::Array(_) => {
            let entries: Vec<T> =
                serde_json::from_value(value).map_err(|e| corruption(T::KEY, e))?;
            Ok(Decoded {
                entries,
                version: 0,
            })
        }
        Value::Object(ref map) => {
            let version = map
                .get("version")
                .and_then(Value::as_u64)
                .ok_or_else(|| corruption(T::KEY, "envelope has no version"))?;
            if version > FORMAT_VERSION as u64 {
                return Err(StoreError::UnsupportedVersion {
                    key: T::KEY.to_string(),
                    found: u32::try_from(version).unwrap_or(u32::MAX),
                    supported: FORMAT_VERSION,
                });
            }

            let envelope: Envelope =
                serde_json::from_value(value).map_err(|e| corruption(T::KEY, e))?;
            if envelope.format != FORMAT_NAME {
                return Err(corruption(
                    T::KEY,
                    format!("unknown format marker {:?}", envelope.format),
                ));
            }
            if envelope.kind != T::KIND {
                return Err(StoreError::KindMismatch {
                    key: T::KEY.to_string(),
                    expected: T::KIND.to_string(),
                    found: envelope.kind,
                });
            }
            let actual = checksum(&envelope.entries);
            if actual != envelope.checksum {
                return Err(corruption(
                    T::KEY,
                    format!(
                        "checksum mismatch (stored {:08x}, computed {:08x})",
                        envelope.checksum, actual
                    ),
                ));
            }

            let entries: Vec<T> =
                serde_json::from_value(envelope.entries).map_err(|e| corruption(T::KEY, e))?;
            Ok(Decoded {
                entries,
                version: envelope.version,
            })
        }
        _ => Err(corruption(T::KEY, "expected an array or an envelope object")),
    }
}
