use serde::Serialize;

use crate::error::{Error, Result};

/// Serialize any page model as pretty JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::Parse(format!("JSON serialize: {}", e)))
}
