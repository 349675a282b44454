//! Qase API response envelopes.
//!
//! Every Qase response is wrapped as `{ "status": bool, "result": ... }`. Both fields
//! are optional here so a malformed envelope can be told apart from a transport error.

use serde::Deserialize;

/// Paginated list payload.
#[derive(Debug, Clone, Deserialize)]
pub struct QaseList<T> {
    #[serde(default = "Vec::new")]
    pub entities: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub filtered: u64,
}

/// Response envelope around a single `result`.
#[derive(Debug, Clone, Deserialize)]
pub struct QaseEnvelope<T> {
    #[serde(default)]
    pub status: bool,
    pub result: Option<T>,
}

impl<T> QaseEnvelope<T> {
    /// The result when Qase reported success, `None` otherwise.
    pub fn into_result(self) -> Option<T> {
        if self.status { self.result } else { None }
    }
}

/// Envelope around a page of entities.
pub type QaseListResponse<T> = QaseEnvelope<QaseList<T>>;
