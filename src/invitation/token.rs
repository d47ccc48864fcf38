//! Magic-link tokens
//!
//! The raw token is handed out once inside the link; only its SHA-256
//! digest is persisted.

use rand::{distr::Alphanumeric, Rng};
use sha2::{Digest, Sha256};

pub const TOKEN_LEN: usize = 32;

/// A freshly generated token and the digest to store for it
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub hash: String,
}

pub fn generate() -> IssuedToken {
    let token = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect::<String>();
    let hash = hash(&token);
    IssuedToken { token, hash }
}

pub fn hash(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Build the link a recipient follows to redeem `token`
pub fn magic_link(public_base_url: &str, token: &str) -> String {
    format!("{}/invite/{}", public_base_url.trim_end_matches('/'), token)
}
