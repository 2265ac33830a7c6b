use sha2::{Digest, Sha256};

const ID_LEN: usize = 16;

/// Derive a content-addressed article id from the first non-empty natural
/// key. Candidates are tried in order (canonical link, feed guid, title),
/// so an unchanged source article always hashes to the same id and
/// re-ingestion becomes an idempotent upsert.
pub fn derive_id(candidates: &[Option<&str>]) -> Option<String> {
    let key = candidates
        .iter()
        .flatten()
        .map(|k| k.trim())
        .find(|k| !k.is_empty())?;

    let digest = Sha256::digest(key.as_bytes());
    let mut hex = format!("{:x}", digest);
    hex.truncate(ID_LEN);
    Some(hex)
}
