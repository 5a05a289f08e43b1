//! API keys.
//!
//! A key reads `tlcms_<lookup>_<secret>`. The lookup part is stored in clear
//! and indexed so validation is a single row fetch; the whole key is stored
//! only as an Argon2id PHC string.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use rand::Rng;

use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::Token;

const KEY_PREFIX: &str = "tlcms";
const LOOKUP_LEN: usize = 8;
const SECRET_LEN: usize = 24;
const ISSUE_ATTEMPTS: u32 = 3;

// Keys carry 96 bits of randomness, so a light Argon2 profile is enough.
const HASH_MEMORY_KIB: u32 = 64 * 1024;
const HASH_PASSES: u32 = 1;
const HASH_LANES: u32 = 4;
const HASH_LEN: usize = 32;

/// A freshly generated key. `raw` is shown to the caller once and never stored.
#[derive(Debug, Clone)]
pub struct MintedKey {
    pub raw: String,
    pub lookup: String,
    pub hash: String,
}

/// The two variable parts of a well-formed key, borrowed from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyParts<'a> {
    pub lookup: &'a str,
    pub secret: &'a str,
}

/// Mints, hashes and verifies API keys.
pub struct TokenGenerator {
    argon2: Argon2<'static>,
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenGenerator {
    #[must_use]
    pub fn new() -> Self {
        let params = Params::new(HASH_MEMORY_KIB, HASH_PASSES, HASH_LANES, Some(HASH_LEN))
            .expect("invalid argon2 params");

        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    pub fn generate(&self) -> Result<MintedKey> {
        let lookup = random_hex(LOOKUP_LEN);
        let raw = format!("{KEY_PREFIX}_{lookup}_{}", random_hex(SECRET_LEN));
        let hash = self.hash(&raw)?;
        Ok(MintedKey { raw, lookup, hash })
    }

    pub fn hash(&self, raw: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(raw.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| Error::Config(format!("failed to hash key: {e}")))
    }

    /// `Ok(false)` means the key does not match; `Err` means `hash` is unusable.
    pub fn verify(&self, raw: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| Error::Config(format!("stored key hash is malformed: {e}")))?;

        match self.argon2.verify_password(raw.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(Error::Config(format!("failed to verify key: {e}"))),
        }
    }
}

/// `len` lowercase hex characters from the thread RNG.
fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len.div_ceil(2)];
    rand::thread_rng().fill(bytes.as_mut_slice());
    let mut out = hex::encode(bytes);
    out.truncate(len);
    out
}

/// Splits a key into its parts, rejecting anything not shaped like one.
pub fn parse_token(raw: &str) -> Result<KeyParts<'_>> {
    let rest = raw
        .strip_prefix(KEY_PREFIX)
        .and_then(|r| r.strip_prefix('_'))
        .ok_or(Error::InvalidTokenFormat)?;
    let (lookup, secret) = rest.split_once('_').ok_or(Error::InvalidTokenFormat)?;

    let well_formed = |part: &str, len: usize| {
        part.len() == len && part.bytes().all(|b| b.is_ascii_alphanumeric())
    };
    if !well_formed(lookup, LOOKUP_LEN) || !well_formed(secret, SECRET_LEN) {
        return Err(Error::InvalidTokenFormat);
    }

    Ok(KeyParts { lookup, secret })
}

/// Parameters for a new API key.
#[derive(Debug, Default)]
pub struct NewToken {
    pub is_admin: bool,
    pub user_id: Option<String>,
    pub description: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Mints a key, stores its hash and returns `(raw_key, metadata)`.
/// The raw key is never persisted and cannot be recovered later.
pub fn issue_token(store: &dyn Store, generator: &TokenGenerator, new: NewToken) -> Result<(String, Token)> {
    for _ in 0..ISSUE_ATTEMPTS {
        let minted = generator.generate()?;

        let token = Token {
            id: uuid::Uuid::new_v4().to_string(),
            token_hash: minted.hash,
            token_lookup: minted.lookup,
            is_admin: new.is_admin,
            user_id: new.user_id.clone(),
            description: new.description.clone(),
            created_at: Utc::now(),
            expires_at: new.expires_at,
            last_used_at: None,
        };

        match store.create_token(&token) {
            Ok(()) => return Ok((minted.raw, token)),
            Err(Error::TokenLookupCollision) => {
                tracing::debug!("API key lookup collided, retrying");
            }
            Err(e) => return Err(e),
        }
    }

    Err(Error::TokenLookupCollision)
}
