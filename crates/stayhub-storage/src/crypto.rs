//! Password hashing and secret generation for the local identity provider.
//!
//! Passwords are hashed with PBKDF2-HMAC-SHA256 and a random per-user salt.
//! The encoded form is `iterations$salt_hex$hash_hex`, so the work factor
//! can change without invalidating stored hashes.

use std::num::NonZeroU32;

use anyhow::{Context, Result};
use ring::digest::SHA256_OUTPUT_LEN;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// Size of the token signing secret (32 bytes = 256 bits).
pub const TOKEN_SECRET_SIZE: usize = 32;

/// Size of the per-password salt.
const SALT_SIZE: usize = 16;

/// Default PBKDF2 work factor.
const DEFAULT_ITERATIONS: u32 = 100_000;

static ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;

/// PBKDF2 password hasher.
#[derive(Clone)]
pub struct PasswordHasher {
    iterations: NonZeroU32,
    rng: SystemRandom,
}

impl PasswordHasher {
    /// Create a hasher with a custom work factor (tests use a low one).
    pub fn new(iterations: u32) -> Result<Self> {
        let iterations =
            NonZeroU32::new(iterations).context("PBKDF2 iterations must be non-zero")?;
        Ok(Self {
            iterations,
            rng: SystemRandom::new(),
        })
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String> {
        let mut salt = [0u8; SALT_SIZE];
        self.rng
            .fill(&mut salt)
            .map_err(|_| anyhow::anyhow!("Failed to generate salt"))?;

        let mut hash = [0u8; SHA256_OUTPUT_LEN];
        pbkdf2::derive(
            ALGORITHM,
            self.iterations,
            &salt,
            password.as_bytes(),
            &mut hash,
        );

        Ok(format!(
            "{}${}${}",
            self.iterations,
            hex::encode(salt),
            hex::encode(hash)
        ))
    }

    /// Check a password against an encoded hash.
    ///
    /// Returns `Ok(false)` on mismatch and `Err` if the stored hash is malformed.
    pub fn verify(&self, password: &str, encoded: &str) -> Result<bool> {
        let mut parts = encoded.split('$');
        let (Some(iterations), Some(salt), Some(hash), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            anyhow::bail!("Malformed password hash");
        };

        let iterations: u32 = iterations.parse().context("Invalid iteration count")?;
        let iterations =
            NonZeroU32::new(iterations).context("PBKDF2 iterations must be non-zero")?;
        let salt = hex::decode(salt).context("Invalid salt encoding")?;
        let hash = hex::decode(hash).context("Invalid hash encoding")?;

        Ok(pbkdf2::verify(ALGORITHM, iterations, &salt, password.as_bytes(), &hash).is_ok())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            iterations: NonZeroU32::new(DEFAULT_ITERATIONS).unwrap_or(NonZeroU32::MIN),
            rng: SystemRandom::new(),
        }
    }
}

/// Generate a random token signing secret.
pub fn generate_token_secret() -> Result<Zeroizing<[u8; TOKEN_SECRET_SIZE]>> {
    let rng = SystemRandom::new();
    let mut secret = Zeroizing::new([0u8; TOKEN_SECRET_SIZE]);
    rng.fill(&mut secret[..])
        .map_err(|_| anyhow::anyhow!("Failed to generate random token secret"))?;
    Ok(secret)
}
