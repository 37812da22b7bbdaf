//! Credential triple and freshness rules.

use std::fmt;
use std::time::{Duration, Instant};

use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{RefreshPolicy, SecretString};

/// Body of a successful token endpoint reply.
///
/// All three fields are required, a reply missing one of them is rejected.
#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
pub(crate) struct TokenGrant {
    pub(crate) access_token: String,
    pub(crate) refresh_token: String,
    #[zeroize(skip)]
    #[serde(deserialize_with = "whole_seconds")]
    pub(crate) expires_in: u64,
}

/// Reads `expires_in` from any JSON number, dropping the fractional part.
fn whole_seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds = f64::deserialize(deserializer)?;
    if seconds.is_nan() || seconds < 0.0 {
        return Err(de::Error::invalid_value(
            Unexpected::Float(seconds),
            &"a non-negative number of seconds",
        ));
    }

    // saturates on overflow
    Ok(Duration::try_from_secs_f64(seconds).map_or(u64::MAX, |duration| duration.as_secs()))
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// What [`TokenSupplier::ensure_fresh`](super::TokenSupplier::ensure_fresh) has to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Freshness {
    /// Nothing usable, run the password grant.
    Uninitialized,
    /// Usable, but the policy asks for a refresh grant.
    Stale,
    /// Usable as is.
    Fresh,
}

/// Current admin access token, refresh token and expiry instant.
///
/// An empty access token means the state was never initialized.
/// The three fields are always replaced together.
#[derive(Default, Zeroize, ZeroizeOnDrop)]
pub struct CredentialState {
    access_token: String,
    refresh_token: String,
    #[zeroize(skip)]
    expires_at: Option<Instant>,
}

impl CredentialState {
    /// Returns `true` once a grant has been applied.
    pub fn is_initialized(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// Current access token (empty when uninitialized).
    pub fn access_token(&self) -> SecretString {
        SecretString::new(self.access_token.as_str())
    }

    /// Current refresh token (empty when uninitialized).
    pub(crate) fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// Instant the access token becomes invalid.
    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    /// Returns `true` if the access token is invalid at `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|exp| now >= exp)
    }

    /// Remaining validity at `now`, `None` once expired.
    pub fn time_until_expiry(&self, now: Instant) -> Option<Duration> {
        self.expires_at
            .and_then(|exp| exp.checked_duration_since(now))
            .filter(|remaining| !remaining.is_zero())
    }

    /// Replaces the three fields from a grant received at `now`.
    pub(crate) fn apply(&mut self, grant: &TokenGrant, now: Instant) {
        self.access_token.zeroize();
        self.refresh_token.zeroize();

        self.access_token = grant.access_token.clone();
        self.refresh_token = grant.refresh_token.clone();
        self.expires_at = now.checked_add(Duration::from_secs(grant.expires_in));
    }

    pub(crate) fn freshness(
        &self,
        policy: RefreshPolicy,
        window: Duration,
        now: Instant,
    ) -> Freshness {
        if !self.is_initialized() || self.is_expired(now) {
            return Freshness::Uninitialized;
        }

        // `is_expired` is false, so `expires_at` is set
        let near_expiry = match (self.expires_at, now.checked_add(window)) {
            (Some(exp), Some(horizon)) => horizon >= exp,
            _ => true,
        };

        let refresh = match policy {
            RefreshPolicy::NearExpiry => near_expiry,
            RefreshPolicy::Legacy => !near_expiry,
        };

        if refresh {
            Freshness::Stale
        } else {
            Freshness::Fresh
        }
    }
}

impl fmt::Debug for CredentialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialState")
            .field("initialized", &self.is_initialized())
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
