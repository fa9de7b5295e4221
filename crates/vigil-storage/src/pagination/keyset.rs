//! Keyset cursor pagination: no OFFSET, constant cost per page.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Composite cursor: (sort_value, id) of the last row on the previous page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationCursor {
    pub last_sort_value: String,
    pub last_id: String,
}

impl PaginationCursor {
    pub fn new(last_sort_value: impl Into<String>, last_id: impl Into<String>) -> Self {
        Self {
            last_sort_value: last_sort_value.into(),
            last_id: last_id.into(),
        }
    }

    /// Encode as URL-safe base64 JSON.
    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// `None` for anything that is not a cursor produced by [`encode`](Self::encode).
    pub fn decode(encoded: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(encoded.trim()).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}
