//! Transfer target selection

use crate::state::SharedState;
use bankload_config::Variant;
use bankload_http::AccountId;
use rand::Rng;
use serde::Serialize;
use std::fmt;

/// Why a transfer was skipped without a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The user never obtained an account
    NoOwnAccount,
    /// Global setup did not create the shared account
    NoSharedAccount,
    /// Fewer than two accounts are known
    PoolTooSmall,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoOwnAccount => write!(f, "user has no account"),
            SkipReason::NoSharedAccount => write!(f, "shared account was not created"),
            SkipReason::PoolTooSmall => write!(f, "account pool holds fewer than two accounts"),
        }
    }
}

/// Where a user's transfers go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPolicy {
    /// Always into the account created by global setup
    SharedAccount,
    /// Into a random other account from the pool
    PeerToPeer,
}

impl From<Variant> for TransferPolicy {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::SharedAccount => TransferPolicy::SharedAccount,
            Variant::PeerToPeer => TransferPolicy::PeerToPeer,
        }
    }
}

impl TransferPolicy {
    /// Pick the destination for a transfer from `own`
    pub fn target<R: Rng + ?Sized>(
        &self,
        state: &SharedState,
        own: AccountId,
        rng: &mut R,
    ) -> Result<AccountId, SkipReason> {
        match self {
            TransferPolicy::SharedAccount => {
                state.shared_account().ok_or(SkipReason::NoSharedAccount)
            }
            TransferPolicy::PeerToPeer => state
                .pool()
                .pick_peer(own, rng)
                .ok_or(SkipReason::PoolTooSmall),
        }
    }
}
