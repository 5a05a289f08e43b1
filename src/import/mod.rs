//! Best-effort bulk importers.
//!
//! Both importers make as much progress as they can: a bad record lands in
//! `errors` (or `warnings`) and the loop moves on. Only a document whose top
//! level does not decode is rejected outright, and that happens before any
//! write.

mod brands;
mod toplists;

#[cfg(test)]
mod test_support;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use brands::{BrandDescriptor, BrandImport, import_brands};
pub use toplists::{ItemDescriptor, ToplistDefinition, ToplistImport, import_toplists};

/// A record that could not be imported, keyed by display name or slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub error: String,
}

impl RecordError {
    fn named(name: &str, error: impl ToString) -> Self {
        Self {
            name: Some(name.to_string()),
            slug: None,
            error: error.to_string(),
        }
    }

    fn slugged(slug: &str, error: impl ToString) -> Self {
        Self {
            name: None,
            slug: Some(slug.to_string()),
            error: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<RecordError>,
    pub warnings: Vec<String>,
    pub total: usize,
}

/// Decodes one record of a loosely typed document.
fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, String> {
    serde_json::from_value(value).map_err(|e| format!("malformed record: {e}"))
}
