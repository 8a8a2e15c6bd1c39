//! Credential Hashing
//! Mission: Keep raw passwords out of the system past this boundary

use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};

/// Hash a plaintext password with bcrypt at the default cost factor.
pub fn hash_password(plain: &str) -> Result<String> {
    hash(plain, DEFAULT_COST).context("Failed to hash password")
}

/// Check a plaintext password against a stored bcrypt hash.
///
/// Never errors: a malformed hash counts as a mismatch.
pub fn verify_password(plain: &str, hashed: &str) -> bool {
    verify(plain, hashed).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hashed = hash_password("Correct1Horse").unwrap();
        assert_ne!(hashed, "Correct1Horse");
        assert!(verify_password("Correct1Horse", &hashed));
        assert!(!verify_password("wrong-password", &hashed));
    }

    #[test]
    fn test_malformed_hash_is_mismatch() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("SamePassword1").unwrap();
        let b = hash_password("SamePassword1").unwrap();
        assert_ne!(a, b);
    }
}
