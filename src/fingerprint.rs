use std::collections::BTreeSet;

use sha2::{
    Digest,
    Sha256,
};

/// Hex length of a content fingerprint.
pub const HASH_LEN: usize = 16;

/// Digest over field values (order sensitive) and tag membership (order
/// insensitive). Remote id, deck, model, and anchor never feed the hash, so
/// identical content compares equal wherever it lives.
///
/// Not a security boundary; this is a cheap equality check and doubles as an
/// intra-batch delimiter in the render adapter.
pub fn fingerprint(fields: &[(String, String)], tags: &BTreeSet<String>) -> String {
    let mut hasher = Sha256::new();
    for (name, value) in fields {
        feed(&mut hasher, name);
        feed(&mut hasher, value);
    }
    // BTreeSet iterates in sorted order, so insertion order cannot leak in.
    for tag in tags {
        feed(&mut hasher, tag);
    }
    hex_prefix(hasher, HASH_LEN)
}

/// Short digest of the resolved deck/model pair, persisted next to the
/// content hash so a deck or note-type move counts as a dirty condition even
/// though it never enters the content fingerprint.
pub fn target_digest(deck: &str, model: &str) -> String {
    let mut hasher = Sha256::new();
    feed(&mut hasher, deck);
    feed(&mut hasher, model);
    hex_prefix(hasher, 8)
}

// Length-prefixed so ("ab", "c") and ("a", "bc") cannot collide.
fn feed(hasher: &mut Sha256, part: &str) {
    hasher.update((part.len() as u64).to_le_bytes());
    hasher.update(part.as_bytes());
}

fn hex_prefix(hasher: Sha256, len: usize) -> String {
    let digest = hasher.finalize();
    let mut out = String::with_capacity(len);
    for byte in digest.iter().take(len / 2) {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}
