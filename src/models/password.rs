//! Salted SHA-512 password credential.
//!
//! The stored digest is `SHA-512(utf8(password) ++ salt)` with a fresh
//! 64-byte salt drawn every time a password is set.

use std::fmt;

use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha512};
use thiserror::Error;

pub const SALT_LEN: usize = 64;
pub const DIGEST_LEN: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("stored credential is malformed: salt is {salt} bytes, hash is {digest} bytes")]
pub struct InvalidCredential {
    pub salt: usize,
    pub digest: usize,
}

/// Salt and digest of a password. Both always change together.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    salt: [u8; SALT_LEN],
    digest: [u8; DIGEST_LEN],
}

impl Credential {
    /// Hashes `password` against a freshly generated salt.
    pub fn generate<R: CryptoRng + RngCore + ?Sized>(password: &str, rng: &mut R) -> Self {
        let mut salt = [0u8; SALT_LEN];
        rng.fill_bytes(&mut salt);
        Self::with_salt(password, salt)
    }

    #[must_use]
    pub fn with_salt(password: &str, salt: [u8; SALT_LEN]) -> Self {
        let digest = hash(password, &salt);
        Self { salt, digest }
    }

    /// Rebuilds a credential from stored column values.
    pub fn from_parts(salt: &[u8], digest: &[u8]) -> Result<Self, InvalidCredential> {
        let invalid = || InvalidCredential {
            salt: salt.len(),
            digest: digest.len(),
        };

        Ok(Self {
            salt: salt.try_into().map_err(|_| invalid())?,
            digest: digest.try_into().map_err(|_| invalid())?,
        })
    }

    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        constant_time_eq(&hash(candidate, &self.salt), &self.digest)
    }

    #[must_use]
    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    #[must_use]
    pub fn digest(&self) -> &[u8] {
        &self.digest
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("salt", &format_args!("<{SALT_LEN} bytes>"))
            .field("digest", &format_args!("<redacted>"))
            .finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<sha512 hashed password+salt>")
    }
}

fn hash(password: &str, salt: &[u8]) -> [u8; DIGEST_LEN] {
    let mut hasher = Sha512::new();
    hasher.update(password.as_bytes());
    hasher.update(salt);

    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Compares without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    std::hint::black_box(diff) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_salt() -> [u8; SALT_LEN] {
        let mut salt = [0u8; SALT_LEN];
        for (i, b) in salt.iter_mut().enumerate() {
            *b = i as u8;
        }
        salt
    }

    #[test]
    fn digest_matches_known_vector() {
        let credential = Credential::with_salt("correct", counting_salt());
        assert_eq!(
            hex::encode(credential.digest()),
            "8e552d9a53c8c73201051fc9c56744a925cf2521333471722529e5f15eff74fe\
             88508cdc81ef66c17b58d2e09890fd4095657c66b4408b4e105fae35b516d6e6"
        );
    }

    #[test]
    fn digest_of_empty_password() {
        let credential = Credential::with_salt("", counting_salt());
        assert_eq!(
            hex::encode(credential.digest()),
            "ee4320ebaf3fdb4f2c832b137200c08e235e0fa7bbd0eb1740c7063ba8a0d151\
             da77e003398e1714a955d475b05e3e950b639503b452ec185de4229bc4873949"
        );
        assert!(credential.matches(""));
        assert!(!credential.matches(" "));
    }

    #[test]
    fn salt_changes_digest() {
        let zero = Credential::with_salt("correct", [0u8; SALT_LEN]);
        let counting = Credential::with_salt("correct", counting_salt());
        assert_ne!(zero.digest(), counting.digest());
        assert_eq!(
            hex::encode(zero.digest()),
            "de22a2a6731b8f3cdcb003475fe782e964f6df3801103dba7bbdd061e7bc5e53\
             6bfea0b5d72992dc1b2ab7aaf2b8a30b6d88b8f997b9fc071736bec56e264a94"
        );
    }

    #[test]
    fn generate_draws_fresh_salts() {
        let mut rng = rand::rng();
        let first = Credential::generate("correct", &mut rng);
        let second = Credential::generate("correct", &mut rng);
        assert_eq!(first.salt().len(), SALT_LEN);
        assert_eq!(first.digest().len(), DIGEST_LEN);
        assert_ne!(first.salt(), second.salt());
        assert_ne!(first.digest(), second.digest());
        assert!(first.matches("correct"));
        assert!(second.matches("correct"));
    }

    #[test]
    fn matches_is_exact() {
        let credential = Credential::generate("s3cr3t", &mut rand::rng());
        assert!(credential.matches("s3cr3t"));
        assert!(!credential.matches("S3cr3t"));
        assert!(!credential.matches("s3cr3t "));
        assert!(!credential.matches(""));
    }

    #[test]
    fn non_ascii_passwords_hash_as_utf8() {
        let credential = Credential::with_salt("pässwörd", counting_salt());
        let mut hasher = Sha512::new();
        hasher.update("pässwörd".as_bytes());
        hasher.update(counting_salt());
        assert_eq!(credential.digest(), hasher.finalize().as_slice());
    }

    #[test]
    fn from_parts_checks_lengths() {
        let original = Credential::with_salt("x", counting_salt());
        let rebuilt = Credential::from_parts(original.salt(), original.digest()).unwrap();
        assert_eq!(rebuilt, original);

        assert_eq!(
            Credential::from_parts(&[0u8; 8], original.digest()),
            Err(InvalidCredential { salt: 8, digest: 64 })
        );
        assert_eq!(
            Credential::from_parts(original.salt(), &[]),
            Err(InvalidCredential { salt: 64, digest: 0 })
        );
    }

    #[test]
    fn formatting_redacts_digest() {
        let credential = Credential::with_salt("hunter2", counting_salt());
        let debug = format!("{credential:?}");
        let display = credential.to_string();
        let digest_hex = hex::encode(credential.digest());

        for text in [&debug, &display] {
            assert!(!text.contains("hunter2"));
            assert!(!text.contains(&digest_hex));
        }
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn constant_time_eq_works() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"short", b"longer"));
        assert!(constant_time_eq(b"", b""));
    }
}
