use rand::RngCore;
use sha2::{Digest, Sha256};

/// Separator between the hex-encoded salt and digest in stored hashes
const SALT_SEPARATOR: char = ':';

/// Room password hasher service.
///
/// Stored format is `hex(salt):hex(sha256(salt ++ password))` with a random
/// 16-byte salt. Rooms created before salting store a bare
/// `hex(sha256(password))`; those records must keep verifying forever, so
/// verification dispatches on the separator rather than rewriting old hashes.
pub struct PasswordService;

impl PasswordService {
    /// Hash a password with a fresh random salt
    pub fn hash(password: &str) -> String {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);

        let digest = Self::salted_digest(&salt, password);
        format!("{}{}{}", hex::encode(salt), SALT_SEPARATOR, digest)
    }

    /// Verify a candidate password against a stored hash.
    /// An absent or empty stored hash means the room has no password.
    pub fn verify(stored: Option<&str>, candidate: &str) -> bool {
        let stored = match stored {
            Some(s) if !s.is_empty() => s,
            _ => return true,
        };

        match stored.split_once(SALT_SEPARATOR) {
            Some((salt_hex, digest_hex)) => {
                let Ok(salt) = hex::decode(salt_hex) else {
                    return false;
                };
                Self::salted_digest(&salt, candidate) == digest_hex
            }
            // Legacy records: unsalted digest of the password alone
            None => Self::bare_digest(candidate) == stored,
        }
    }

    fn salted_digest(salt: &[u8], password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn bare_digest(password: &str) -> String {
        hex::encode(Sha256::digest(password.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = PasswordService::hash("abcd");

        let (salt, digest) = hash.split_once(':').expect("salted format");
        assert_eq!(salt.len(), 32); // 16 bytes hex-encoded
        assert_eq!(digest.len(), 64);

        assert!(PasswordService::verify(Some(&hash), "abcd"));
        assert!(!PasswordService::verify(Some(&hash), "wrong"));
    }

    #[test]
    fn test_salts_are_random() {
        assert_ne!(PasswordService::hash("abcd"), PasswordService::hash("abcd"));
    }

    #[test]
    fn test_legacy_unsalted_hash_still_verifies() {
        // sha256("abcd"), the pre-salting stored format
        let legacy = hex::encode(Sha256::digest(b"abcd"));

        assert!(PasswordService::verify(Some(&legacy), "abcd"));
        assert!(!PasswordService::verify(Some(&legacy), "abce"));
    }

    #[test]
    fn test_no_password_always_verifies() {
        assert!(PasswordService::verify(None, "anything"));
        assert!(PasswordService::verify(Some(""), "anything"));
    }

    #[test]
    fn test_malformed_salt_rejects() {
        assert!(!PasswordService::verify(Some("zz:abc"), "abcd"));
    }
}
