//! Photo search extension point.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use bintrack_core::InventoryItem;

/// Decides which candidate items a photo depicts.
#[async_trait]
pub trait PhotoMatcher: Send + Sync {
    /// Return the candidates that match `image`. Order is not significant.
    async fn matches(&self, image: &[u8], candidates: Vec<InventoryItem>) -> Vec<InventoryItem>;
}

/// Matches every candidate.
///
/// Stands in until real image comparison exists; the search endpoint then
/// degrades to "show the items I asked about, newest first".
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughMatcher;

#[async_trait]
impl PhotoMatcher for PassThroughMatcher {
    async fn matches(&self, _image: &[u8], candidates: Vec<InventoryItem>) -> Vec<InventoryItem> {
        candidates
    }
}

/// Decode a base64 image, accepting an optional `data:<mime>;base64,` prefix.
///
/// Returns `None` if the payload is not valid base64.
#[must_use]
pub fn decode_image(encoded: &str) -> Option<Vec<u8>> {
    let payload = encoded
        .split_once(";base64,")
        .map_or(encoded, |(_, data)| data)
        .trim();
    STANDARD.decode(payload).ok()
}
