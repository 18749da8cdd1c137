//! PKCE verifier/challenge 및 CSRF state 생성.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use sha2::{Digest, Sha256};

/// RFC 7636 unreserved 문자 집합.
pub const UNRESERVED_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-._~";
pub const PKCE_VERIFIER_LENGTH: usize = 64;
pub const STATE_LENGTH: usize = 24;

#[derive(Debug, Clone)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

/// unreserved 문자 집합에서 균등하게 뽑은 임의 문자열을 만든다.
///
/// `rand::rng()`는 OS 시드를 쓰는 CSPRNG다.
pub fn random_string(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..UNRESERVED_ALPHABET.len());
            char::from(UNRESERVED_ALPHABET[idx])
        })
        .collect()
}

pub fn generate_pkce() -> PkcePair {
    let verifier = random_string(PKCE_VERIFIER_LENGTH);
    let challenge = code_challenge_s256(&verifier);
    PkcePair {
        verifier,
        challenge,
    }
}

pub fn generate_state() -> String {
    random_string(STATE_LENGTH)
}

/// `base64url_nopad(sha256(verifier))`
pub fn code_challenge_s256(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}
