//! Password hashing and verification.
//!
//! New passwords are hashed with Argon2id and stored as PHC strings
//! (`$argon2id$v=19$...`). Accounts imported from fixtures may carry the
//! legacy salted digest format `sha256$<salt>$<hex digest>`, which is
//! still accepted on login.
//!
//! A stored value that is empty or starts with `!` is an unusable password:
//! it never matches anything.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::ApiError;

const LEGACY_SHA256_PREFIX: &str = "sha256$";

/// Returns an Argon2 instance.
///
/// Unit tests use minimal cost parameters so hashing stays fast.
fn argon2_instance() -> Argon2<'static> {
    #[cfg(test)]
    {
        use argon2::{Algorithm, Params, Version};

        let params = Params::new(1024, 1, 1, None).unwrap_or_default();
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }

    #[cfg(not(test))]
    {
        Argon2::default()
    }
}

/// Hash a plaintext password into an Argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2_instance().hash_password(password.as_bytes(), &salt)?;

    Ok(hash.to_string())
}

/// Whether a stored password value can ever match.
pub fn is_usable(stored: &str) -> bool {
    !stored.is_empty() && !stored.starts_with('!')
}

/// Check a plaintext password against a stored value.
///
/// Unknown or malformed stored formats never match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    if !is_usable(stored) {
        return false;
    }

    if let Some(rest) = stored.strip_prefix(LEGACY_SHA256_PREFIX) {
        return verify_legacy_sha256(password, rest);
    }

    match PasswordHash::new(stored) {
        Ok(parsed) => argon2_instance()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => {
            tracing::warn!("Stored password hash has an unrecognized format");
            false
        }
    }
}

/// Verify `<salt>$<hex>` where hex = SHA-256(salt + password).
fn verify_legacy_sha256(password: &str, salt_and_digest: &str) -> bool {
    let Some((salt, expected)) = salt_and_digest.split_once('$') else {
        return false;
    };

    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let actual = hex::encode(hasher.finalize());

    actual
        .as_bytes()
        .ct_eq(expected.to_ascii_lowercase().as_bytes())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_hash(salt: &str, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        format!("sha256${}${}", salt, hex::encode(hasher.finalize()))
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3cret!").unwrap();
        assert!(hash.starts_with("$argon2"));

        assert!(verify_password("s3cret!", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let hash1 = hash_password("s3cret!").unwrap();
        let hash2 = hash_password("s3cret!").unwrap();

        // Random salt
        assert_ne!(hash1, hash2);
        assert!(verify_password("s3cret!", &hash1));
        assert!(verify_password("s3cret!", &hash2));
    }

    #[test]
    fn test_legacy_sha256_digest() {
        let stored = legacy_hash("a1b2", "grumpy");

        assert!(verify_password("grumpy", &stored));
        assert!(!verify_password("Grumpy", &stored));
        assert!(!verify_password("grumpy", "sha256$a1b2"));
    }

    #[test]
    fn test_legacy_digest_length_and_case() {
        let stored = legacy_hash("a1b2", "grumpy");

        let digest = stored.rsplit('$').next().unwrap_or_default();
        let upper = format!("sha256$a1b2${}", digest.to_ascii_uppercase());

        assert!(verify_password("grumpy", &upper));
        assert!(!verify_password("grumpy", &stored[..stored.len() - 1]));
        assert!(!verify_password("grumpy", &format!("{}0", stored)));
    }

    #[test]
    fn test_unusable_passwords_never_match() {
        assert!(!verify_password("", ""));
        assert!(!verify_password("anything", "!"));
        assert!(!verify_password("anything", "!unusable-marker"));
        assert!(!is_usable("!"));
        assert!(is_usable("sha256$x$y"));
    }

    #[test]
    fn test_unknown_format_never_matches() {
        assert!(!verify_password("plain", "plain"));
        assert!(!verify_password("pw", "md5$abc$def"));
    }
}
