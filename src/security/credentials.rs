//! Dashboard account verification.
//!
//! Accounts come from configuration as Argon2 PHC strings. Parameters and
//! salt travel inside each hash, so verification needs nothing else. Unknown
//! emails still run one verification so response time does not reveal which
//! accounts exist.

use std::collections::HashMap;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::AccountConfig;
use crate::security::login_guard::normalize_email;

pub use argon2::password_hash::Error as HashError;

pub struct AccountDirectory {
    hashes: HashMap<String, String>,
}

impl AccountDirectory {
    pub fn from_config(accounts: &[AccountConfig]) -> Self {
        let mut hashes = HashMap::new();
        for account in accounts {
            match PasswordHash::new(account.password_hash.trim()) {
                Ok(_) => {
                    hashes.insert(
                        normalize_email(&account.email),
                        account.password_hash.trim().to_string(),
                    );
                }
                Err(e) => tracing::warn!(
                    email = %account.email,
                    error = %e,
                    "Skipping account with malformed password hash"
                ),
            }
        }
        Self { hashes }
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn verify(&self, email: &str, password: &str) -> bool {
        match self.hashes.get(&normalize_email(email)) {
            Some(stored) => verify_password(password, stored),
            None => {
                if let Some(any) = self.hashes.values().next() {
                    let _ = verify_password(password, any);
                }
                false
            }
        }
    }
}

/// Hash a password with Argon2id defaults and a fresh random salt.
///
/// The result is the PHC string the `[[accounts]]` config table expects.
pub fn hash_password(password: &str) -> Result<String, HashError> {
    hash_password_with(&Argon2::default(), password)
}

/// Hash with explicit Argon2 parameters.
pub fn hash_password_with(argon2: &Argon2<'_>, password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

/// Check a password against a PHC string. Malformed hashes never verify.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
