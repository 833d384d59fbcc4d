//! Authentication header derivation
//!
//! The GNTP key is `H(password || salt)` and the value sent on the wire is
//! `H(key)` together with the hex-encoded salt:
//! ```text
//! <ALGO>:<HEX(H(H(password || salt)))>.<HEX(salt)>
//! ```
//! A fresh salt is drawn for every request.

use md5::Md5;
use rand::Rng;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

use super::types::HashAlgorithm;

/// Smallest salt value drawn; keeps salts at a stable width of 8-10 digits
const SALT_MIN: u64 = 39_543_312;
const SALT_MAX: u64 = i32::MAX as u64;

/// Derive the auth hash for `password` using the configured method name
///
/// Returns an empty string, meaning "send unauthenticated", when the
/// password is empty or the method is not a supported digest.
pub fn derive(password: &str, method: &str) -> String {
    if password.is_empty() {
        return String::new();
    }

    match method.parse::<HashAlgorithm>() {
        Ok(algorithm) => derive_with_salt(password, algorithm, &generate_salt()),
        Err(e) => {
            tracing::warn!("{}; sending request without authentication", e);
            String::new()
        }
    }
}

/// Derive the auth hash with a caller-provided salt
pub fn derive_with_salt(password: &str, algorithm: HashAlgorithm, salt: &str) -> String {
    let key_hash = match algorithm {
        HashAlgorithm::Md5 => digest_twice::<Md5>(password, salt),
        HashAlgorithm::Sha1 => digest_twice::<Sha1>(password, salt),
        HashAlgorithm::Sha256 => digest_twice::<Sha256>(password, salt),
        HashAlgorithm::Sha512 => digest_twice::<Sha512>(password, salt),
    };

    format!(
        "{}:{}.{}",
        algorithm.as_str(),
        hex::encode_upper(key_hash),
        hex::encode_upper(salt.as_bytes())
    )
}

/// Random decimal salt from the thread-local CSPRNG
pub fn generate_salt() -> String {
    rand::thread_rng().gen_range(SALT_MIN..=SALT_MAX).to_string()
}

fn digest_twice<D: Digest>(password: &str, salt: &str) -> Vec<u8> {
    let mut hasher = D::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    let key = hasher.finalize();

    D::digest(&key).to_vec()
}
