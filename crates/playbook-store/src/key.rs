//! Flow key canonicalization
//!
//! Every operation that accepts a user supplied filename goes through this
//! module, so traversal stripping and suffix handling behave the same for
//! load, save, rename, copy and delete.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::{FlowStoreError, FlowStoreResult};

/// Suffix carried by every stored flow
pub const FLOW_EXTENSION: &str = ".json";

/// A traversal-safe filename addressing one stored flow
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct FlowKey(String);

impl FlowKey {
    /// Canonical key used when writing: base name with the `.json` suffix
    /// appended if missing.
    pub fn new(raw: &str) -> FlowStoreResult<Self> {
        let base = base_name(raw)?;
        Ok(Self(with_extension(base)))
    }

    /// Keys to probe, in order, when resolving an existing flow.
    ///
    /// A name without the suffix is tried as-is first, then with `.json`.
    pub fn candidates(raw: &str) -> FlowStoreResult<Vec<Self>> {
        let base = base_name(raw)?;
        if base.ends_with(FLOW_EXTENSION) {
            Ok(vec![Self(base.to_string())])
        } else {
            Ok(vec![Self(base.to_string()), Self(with_extension(base))])
        }
    }

    /// Build a key from a name found in storage. Only `.json` names are flows.
    pub fn from_stored_name(name: &str) -> Option<Self> {
        let base = base_name(name).ok()?;
        if base == name && base.ends_with(FLOW_EXTENSION) {
            Some(Self(base.to_string()))
        } else {
            None
        }
    }

    /// Get the string representation of the key
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for FlowKey {
    type Error = FlowStoreError;

    fn try_from(raw: String) -> FlowStoreResult<Self> {
        Self::new(&raw)
    }
}

impl Display for FlowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for FlowKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Discard every directory component of `raw`, on either separator.
fn base_name(raw: &str) -> FlowStoreResult<&str> {
    let base = raw
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    match base {
        "" | "." | ".." => Err(FlowStoreError::InvalidKey(raw.to_string())),
        _ if base.contains('\0') => Err(FlowStoreError::InvalidKey(raw.to_string())),
        _ => Ok(base),
    }
}

fn with_extension(base: &str) -> String {
    if base.ends_with(FLOW_EXTENSION) {
        base.to_string()
    } else {
        format!("{}{}", base, FLOW_EXTENSION)
    }
}
