//! One-time 4-digit verification codes
//!
//! A code is issued when the last registration question has been answered and
//! is consumed by the first matching check. Mismatches leave it in place, so a
//! user can retry as many times as needed. Codes do not expire.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::types::UserId;

/// Smallest issued code
pub const CODE_MIN: u16 = 1000;
/// Largest issued code
pub const CODE_MAX: u16 = 9999;

pub struct VerificationCodes {
    pending: HashMap<UserId, String>,
    rng: StdRng,
}

impl VerificationCodes {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Uses a caller-provided generator (seeded in tests)
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            pending: HashMap::new(),
            rng,
        }
    }

    /// Generates a fresh code for `user`, replacing any pending one.
    ///
    /// Codes are not unique across users.
    pub fn issue(&mut self, user: UserId) -> String {
        let code = self.rng.gen_range(CODE_MIN..=CODE_MAX).to_string();
        self.pending.insert(user, code.clone());
        code
    }

    /// Compares `candidate` with the pending code; a match consumes it.
    pub fn check(&mut self, user: UserId, candidate: &str) -> bool {
        let matched = self
            .pending
            .get(&user)
            .is_some_and(|code| code.as_str() == candidate.trim());
        if matched {
            self.pending.remove(&user);
        }
        matched
    }

    /// Drops the pending code, if any (abandoned session)
    pub fn discard(&mut self, user: UserId) {
        self.pending.remove(&user);
    }

    pub fn pending(&self, user: UserId) -> Option<&str> {
        self.pending.get(&user).map(String::as_str)
    }
}

impl Default for VerificationCodes {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VerificationCodes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationCodes")
            .field("pending", &self.pending.len())
            .finish()
    }
}
