//! Identity and join-code generation.
//!
//! Record identity is an opaque, client-generated string everywhere in the
//! system; the stores never mint ids. UUIDv7 keeps generated ids
//! time-ordered, which makes remote rows cluster by creation time for
//! free.

use rand::Rng;

use crate::defaults::{JOIN_CODE_ALPHABET, JOIN_CODE_LENGTH};

/// Mint a new record identity.
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// Generate a short human-shareable join code.
///
/// Collision probability across a handful of households is operationally
/// negligible; uniqueness is additionally backed by the unique index on
/// the remote `households.code` column.
pub fn new_join_code() -> String {
    let mut rng = rand::thread_rng();
    (0..JOIN_CODE_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..JOIN_CODE_ALPHABET.len());
            JOIN_CODE_ALPHABET[idx] as char
        })
        .collect()
}
