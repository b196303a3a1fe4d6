//! Serialization layer. Defaults to JSON via serde_json.
//!
//! Implement [`Serializer`] if you need a different snapshot format.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Converts snapshots to/from bytes for persistence.
pub trait Serializer: Send + Sync {
    /// Encode a snapshot to bytes.
    fn serialize<T>(&self, data: &T) -> Result<Vec<u8>>
    where
        T: Serialize + ?Sized;

    /// Decode bytes back into a snapshot.
    fn deserialize<T>(&self, bytes: &[u8]) -> Result<T>
    where
        T: DeserializeOwned;
}

/// JSON serializer with optional pretty-printing.
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    pretty: bool,
}

impl JsonSerializer {
    /// Compact JSON (single line, no extra whitespace).
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretty-printed JSON, two-space indent.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// `true` when this serializer indents its output.
    pub fn is_pretty(&self) -> bool {
        self.pretty
    }
}

impl Serializer for JsonSerializer {
    fn serialize<T>(&self, data: &T) -> Result<Vec<u8>>
    where
        T: Serialize + ?Sized,
    {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(data)
        } else {
            serde_json::to_vec(data)
        };
        bytes.map_err(Error::from)
    }

    fn deserialize<T>(&self, bytes: &[u8]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_slice(bytes).map_err(Error::from)
    }
}
