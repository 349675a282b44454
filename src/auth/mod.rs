//! Session authentication for dashboard endpoints.

mod extractor;

pub use extractor::SessionAuth;

/// Shortened session id safe for logs (first 8 chars).
pub fn session_id_prefix(raw: &str) -> String {
    if raw.len() >= 8 && raw.is_char_boundary(8) {
        format!("{}...", &raw[..8])
    } else {
        "invalid".to_string()
    }
}
