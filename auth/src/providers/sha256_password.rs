//! Salted, iterated SHA-256 password hasher.
//!
//! Hashes are stored as `$sha256$<work factor>$<salt>$<digest>` with salt and
//! digest in unpadded base64, so the cost travels with each hash and can be
//! raised without invalidating existing accounts.

use super::password::PasswordHasher;
use crate::config::PasswordConfig;
use crate::error::{AuthError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use sha2::{Digest, Sha256};

const SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;

/// Default [`PasswordHasher`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256PasswordHasher {
    config: PasswordConfig,
}

impl Sha256PasswordHasher {
    /// Create a hasher with the given cost.
    #[must_use]
    pub const fn new(config: PasswordConfig) -> Self {
        Self { config }
    }
}

fn digest(password: &str, salt: &[u8], rounds: u32) -> [u8; 32] {
    let mut state: [u8; 32] = Sha256::new()
        .chain_update(salt)
        .chain_update(password.as_bytes())
        .finalize()
        .into();

    for _ in 1..rounds {
        state = Sha256::new()
            .chain_update(state)
            .chain_update(salt)
            .chain_update(password.as_bytes())
            .finalize()
            .into();
    }
    state
}

impl PasswordHasher for Sha256PasswordHasher {
    fn hash(&self, password: &str) -> Result<String> {
        let salt: [u8; SALT_LEN] = rand::random();
        let work_factor = self.config.work_factor;
        let digest = digest(password, &salt, self.config.rounds());

        Ok(format!(
            "${SCHEME}${work_factor}${}${}",
            STANDARD_NO_PAD.encode(salt),
            STANDARD_NO_PAD.encode(digest)
        ))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let mut parts = hash.split('$');
        let (Some(""), Some(SCHEME), Some(work_factor), Some(salt), Some(expected), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(AuthError::MalformedHash);
        };

        let work_factor: u32 = work_factor.parse().map_err(|_| AuthError::MalformedHash)?;
        if work_factor > PasswordConfig::MAX_WORK_FACTOR {
            return Err(AuthError::MalformedHash);
        }
        let salt = STANDARD_NO_PAD
            .decode(salt)
            .map_err(|_| AuthError::MalformedHash)?;
        let expected = STANDARD_NO_PAD
            .decode(expected)
            .map_err(|_| AuthError::MalformedHash)?;

        let rounds = PasswordConfig::new().with_work_factor(work_factor).rounds();
        let actual = digest(password, &salt, rounds);

        Ok(constant_time_eq::constant_time_eq(&actual, &expected))
    }
}
