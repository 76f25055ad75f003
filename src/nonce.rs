//! Action nonces protecting admin form submissions.
//!
//! A nonce is an HMAC-SHA256 over the action name, the acting user and a
//! time tick. A tick lasts half the configured lifetime and a nonce verifies
//! during its own tick and the following one, so a freshly issued nonce stays
//! valid for between half and the full lifetime.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Default nonce lifetime: one day.
pub const DEFAULT_LIFETIME_SECS: u64 = 86_400;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum NonceError {
    #[error("nonce is empty")]
    Missing,
    #[error("nonce is not a hex digest")]
    Malformed,
    #[error("nonce does not match the action or has expired")]
    Invalid,
}

/// How old a verified nonce is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceAge {
    /// Issued during the current tick.
    Fresh,
    /// Issued during the previous tick; still accepted.
    Aging,
}

/// Issues and verifies action nonces with one secret key.
#[derive(Clone)]
pub struct Nonces {
    key: Arc<[u8]>,
    lifetime_secs: u64,
}

impl std::fmt::Debug for Nonces {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Nonces")
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}

impl Nonces {
    pub fn new(key: &[u8], lifetime_secs: u64) -> Self {
        Self {
            key: Arc::from(key),
            lifetime_secs: lifetime_secs.max(2),
        }
    }

    /// Nonces signed with a key generated for this process only.
    pub fn random(lifetime_secs: u64) -> Self {
        let mut key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);
        Self::new(&key, lifetime_secs)
    }

    pub fn lifetime_secs(&self) -> u64 {
        self.lifetime_secs
    }

    /// Issue a nonce for `action` on behalf of `user_id`.
    pub fn create(&self, action: &str, user_id: i64) -> String {
        self.create_at(action, user_id, now_secs())
    }

    /// Verify a submitted nonce for `action` and `user_id`.
    pub fn verify(&self, nonce: &str, action: &str, user_id: i64) -> Result<NonceAge, NonceError> {
        self.verify_at(nonce, action, user_id, now_secs())
    }

    fn create_at(&self, action: &str, user_id: i64, now: u64) -> String {
        let mac = self.mac(self.tick(now), action, user_id);
        hex::encode(mac.finalize().into_bytes())
    }

    fn verify_at(
        &self,
        nonce: &str,
        action: &str,
        user_id: i64,
        now: u64,
    ) -> Result<NonceAge, NonceError> {
        if nonce.is_empty() {
            return Err(NonceError::Missing);
        }
        let provided = hex::decode(nonce).map_err(|_| NonceError::Malformed)?;

        let tick = self.tick(now);
        if self.mac(tick, action, user_id).verify_slice(&provided).is_ok() {
            return Ok(NonceAge::Fresh);
        }
        if tick > 0
            && self
                .mac(tick - 1, action, user_id)
                .verify_slice(&provided)
                .is_ok()
        {
            return Ok(NonceAge::Aging);
        }
        Err(NonceError::Invalid)
    }

    fn tick(&self, now: u64) -> u64 {
        now.div_ceil(self.lifetime_secs / 2)
    }

    fn mac(&self, tick: u64, action: &str, user_id: i64) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(format!("{}|{}|{}", tick, action, user_id).as_bytes());
        mac
    }
}

fn now_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}
