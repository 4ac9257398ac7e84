//! Salted password hashing.
//!
//! `hash = hex(sha256(salt || password))` with a random per-account salt.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// A stored password: hex digest plus the salt it was computed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub hash: String,
    pub salt: String,
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> PasswordHash {
    let salt = uuid::Uuid::new_v4().simple().to_string();
    PasswordHash {
        hash: hash_with_salt(password, &salt),
        salt,
    }
}

/// Hash a password with a known salt.
pub fn hash_with_salt(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a password against a stored hash.
pub fn verify_password(password: &str, stored_hash: &str, salt: &str) -> bool {
    let computed = hash_with_salt(password, salt);
    computed.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let stored = hash_password("secret1");
        assert_eq!(stored.hash.len(), 64);
        assert!(verify_password("secret1", &stored.hash, &stored.salt));
        assert!(!verify_password("secret2", &stored.hash, &stored.salt));
    }

    #[test]
    fn test_verify_rejects_truncated_or_tampered_hash() {
        let stored = hash_password("secret1");
        assert!(!verify_password("secret1", &stored.hash[..63], &stored.salt));
        assert!(!verify_password("secret1", "", &stored.salt));

        let mut tampered = stored.hash.clone();
        let last = if tampered.ends_with('0') { "1" } else { "0" };
        tampered.replace_range(63.., last);
        assert!(!verify_password("secret1", &tampered, &stored.salt));
    }

    #[test]
    fn test_salts_differ() {
        let a = hash_password("same-password");
        let b = hash_password("same-password");
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_hash_with_salt_deterministic() {
        assert_eq!(hash_with_salt("pw", "salt"), hash_with_salt("pw", "salt"));
        assert_ne!(hash_with_salt("pw", "salt"), hash_with_salt("pw", "pepper"));
    }
}
