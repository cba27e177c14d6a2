//! Conversion between Cloud Storage object metadata and [`Metadata`].
//!
//! Cloud Storage only stores string values. Reading never fails; writing
//! rejects any non-string value.

use std::collections::HashMap;

use stowage_core::{Error, Metadata, MetadataValue, Result};

/// Lifts backend metadata into the abstraction's value model.
pub fn decode(native: &HashMap<String, String>) -> Metadata {
    native
        .iter()
        .map(|(key, value)| (key.clone(), MetadataValue::String(value.clone())))
        .collect()
}

/// Lowers metadata into the string map Cloud Storage accepts.
///
/// # Errors
///
/// Returns [`Validation`](stowage_core::ErrorKind::Validation) naming the
/// first offending key (in key order) when a value is not a string.
pub fn encode(metadata: &Metadata) -> Result<HashMap<String, String>> {
    let mut keys: Vec<&String> = metadata.keys().collect();
    keys.sort_unstable();

    let mut native = HashMap::with_capacity(metadata.len());
    for key in keys {
        let value = match &metadata[key] {
            MetadataValue::String(s) => s.clone(),
            other @ (MetadataValue::Integer(_)
            | MetadataValue::Float(_)
            | MetadataValue::Boolean(_)) => {
                return Err(Error::validation().with_message(format!(
                    "value of key '{key}' in metadata must be of type string, got {}",
                    other.type_name()
                )));
            }
        };
        native.insert(key.clone(), value);
    }

    Ok(native)
}
