//! Content hash normalization.

use cid::{Cid, Version};
use tracing::warn;

/// Convert a content hash to its CIDv0 (`Qm...`) form.
///
/// A v0 hash is returned unchanged. A v1 hash is reduced to the base58
/// encoding of its multihash. Returns `None` when `hash` is not a CID.
pub fn convert_to_hash_v0(hash: &str) -> Option<String> {
    let cid = match Cid::try_from(hash) {
        Ok(cid) => cid,
        Err(e) => {
            warn!(hash, error = %e, "cannot convert hash to v0");
            return None;
        }
    };

    match cid.version() {
        Version::V0 => Some(hash.to_string()),
        Version::V1 => Some(bs58::encode(cid.hash().to_bytes()).into_string()),
    }
}
