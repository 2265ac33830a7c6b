use sha2::{Digest, Sha256};

use nw_core::{ChatTurn, Role};

/// Cache key for a query: a hash over the query text and the trailing
/// `turns` conversation turns. Identical query + identical recent context
/// hits the cache; any change in either produces a fresh key.
pub fn query_fingerprint(query: &str, history: &[ChatTurn], turns: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.as_bytes());

    let start = history.len().saturating_sub(turns);
    for turn in &history[start..] {
        // Zero-byte framing keeps ("ab","c") distinct from ("a","bc").
        hasher.update([0u8]);
        hasher.update(role_tag(turn.role));
        hasher.update([0u8]);
        hasher.update(turn.content.as_bytes());
    }

    format!("{:x}", hasher.finalize())
}

fn role_tag(role: Role) -> &'static [u8] {
    match role {
        Role::User => b"user",
        Role::Assistant => b"assistant",
    }
}
