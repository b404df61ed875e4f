//! One-key-per-collection persistence
//!
//! Every record kind lives under its own substrate key and is always read and
//! written as a whole. There are no partial updates.

use crate::storage::codec;
use crate::storage::error::{StoreError, StoreResult};
use crate::storage::substrate::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;

/// A record kind persisted as its own collection
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Substrate key holding the collection
    const KEY: &'static str;
    /// Envelope `kind` tag
    const KIND: &'static str;

    fn id(&self) -> &str;

    /// Creation instant in Unix milliseconds
    fn timestamp(&self) -> i64;

    /// Whether a decoded record may enter memory; invalid ones are dropped on load
    fn is_valid(&self) -> bool {
        true
    }
}

/// What happened when a collection was loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Key was never written
    Missing,
    /// Decoded successfully
    Loaded { count: usize, version: u32 },
    /// Stored value could not be decoded; an empty collection was substituted
    Recovered { error: String },
    /// Written by a newer format version; read as empty and never overwritten
    Unsupported { found: u32, supported: u32 },
}

impl LoadOutcome {
    /// True if the stored value was unreadable and an empty collection stands in
    pub fn is_recovered(&self) -> bool {
        matches!(
            self,
            LoadOutcome::Recovered { .. } | LoadOutcome::Unsupported { .. }
        )
    }

    /// Refuse to replace a collection this build cannot read
    pub fn check_writable(&self, key: &str) -> StoreResult<()> {
        match *self {
            LoadOutcome::Unsupported { found, supported } => Err(StoreError::UnsupportedVersion {
                key: key.to_string(),
                found,
                supported,
            }),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for LoadOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadOutcome::Missing => write!(f, "empty (not yet written)"),
            LoadOutcome::Loaded { count, version } => {
                write!(f, "{} entries (format v{})", count, version)
            }
            LoadOutcome::Recovered { error } => write!(f, "unreadable, started empty: {}", error),
            LoadOutcome::Unsupported { found, supported } => write!(
                f,
                "written by format v{} (this build reads up to v{}), left untouched",
                found, supported
            ),
        }
    }
}

/// Decode a stored value, dropping duplicate ids and invalid records
fn decode_collection<T: Record>(raw: &str) -> StoreResult<(Vec<T>, u32)> {
    let decoded = codec::decode::<T>(raw)?;

    let mut seen = HashSet::new();
    let total = decoded.entries.len();
    let mut invalid = 0;
    let entries: Vec<T> = decoded
        .entries
        .into_iter()
        .filter(|e| {
            if e.is_valid() {
                true
            } else {
                invalid += 1;
                false
            }
        })
        .filter(|e| seen.insert(e.id().to_string()))
        .collect();

    if invalid > 0 {
        tracing::warn!(key = T::KEY, dropped = invalid, "Dropped invalid entries");
    }
    let duplicates = total - invalid - entries.len();
    if duplicates > 0 {
        tracing::warn!(
            key = T::KEY,
            dropped = duplicates,
            "Dropped entries with duplicate ids"
        );
    }
    Ok((entries, decoded.version))
}

/// Load a collection, substituting an empty one when the stored value is unreadable
///
/// Substrate read failures are still returned as errors.
pub fn load_records<T, S>(substrate: &S) -> StoreResult<(Vec<T>, LoadOutcome)>
where
    T: Record,
    S: KeyValueStore + ?Sized,
{
    let raw = match substrate.get(T::KEY)? {
        Some(raw) => raw,
        None => return Ok((Vec::new(), LoadOutcome::Missing)),
    };

    match decode_collection::<T>(&raw) {
        Ok((entries, version)) => {
            tracing::debug!(
                key = T::KEY,
                count = entries.len(),
                version,
                "Loaded collection"
            );
            let outcome = LoadOutcome::Loaded {
                count: entries.len(),
                version,
            };
            Ok((entries, outcome))
        }
        Err(StoreError::UnsupportedVersion {
            found, supported, ..
        }) => {
            tracing::warn!(
                key = T::KEY,
                found,
                supported,
                "Stored collection uses a newer format, starting empty"
            );
            Ok((Vec::new(), LoadOutcome::Unsupported { found, supported }))
        }
        Err(e) => {
            tracing::warn!(
                key = T::KEY,
                error = %e,
                "Failed to parse stored collection, starting empty"
            );
            Ok((
                Vec::new(),
                LoadOutcome::Recovered {
                    error: e.to_string(),
                },
            ))
        }
    }
}

/// Load a collection that is about to be rewritten
///
/// Unlike [`load_records`] an unreadable value is an error, so it is never
/// replaced by a collection missing its old records.
pub fn read_records<T, S>(substrate: &S) -> StoreResult<Vec<T>>
where
    T: Record,
    S: KeyValueStore + ?Sized,
{
    match substrate.get(T::KEY)? {
        Some(raw) => Ok(decode_collection::<T>(&raw)?.0),
        None => Ok(Vec::new()),
    }
}

/// Rewrite a whole collection
pub fn store_records<T, S>(substrate: &mut S, entries: &[T]) -> StoreResult<()>
where
    T: Record,
    S: KeyValueStore + ?Sized,
{
    let encoded = codec::encode(entries)?;
    substrate.set(T::KEY, &encoded)?;
    tracing::debug!(
        key = T::KEY,
        count = entries.len(),
        bytes = encoded.len(),
        "Persisted collection"
    );
    Ok(())
}
