//! Session store — the single authenticated identity slot.
//!
//! DESIGN
//! ======
//! Exactly two accounts exist and both are compiled in. `login` waits a
//! fixed simulated latency, then swaps the whole identity in one step; there
//! is no partial update and no distinction between "unknown email" and
//! "wrong password".
//!
//! The slot lives in a `watch` channel so consumers can either read the
//! current value or await changes. Derived flags (`is_authenticated`,
//! `is_admin`) are recomputed from the slot on every call and never cached.
//!
//! TRADE-OFFS
//! ==========
//! Overlapping `login` calls are not serialized: whichever resolves last
//! owns the slot.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::Date;
use time::macros::date;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::StoreConfig;

// =============================================================================
// IDENTITY
// =============================================================================

/// Profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: u64,
    pub display_name: String,
    pub email: String,
    pub avatar_url: String,
    pub is_admin: bool,
    pub subscribers: u64,
    pub verified: bool,
    #[serde(with = "crate::day")]
    pub join_date: Date,
    pub total_views: u64,
    pub total_videos: u64,
    pub is_premium: bool,
}

// =============================================================================
// ACCOUNTS
// =============================================================================

struct Account {
    email: &'static str,
    password: &'static str,
    id: u64,
    display_name: &'static str,
    avatar_url: &'static str,
    is_admin: bool,
    subscribers: u64,
    verified: bool,
    join_date: Date,
    total_views: u64,
    total_videos: u64,
    is_premium: bool,
}

impl Account {
    fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            display_name: self.display_name.into(),
            email: self.email.into(),
            avatar_url: self.avatar_url.into(),
            is_admin: self.is_admin,
            subscribers: self.subscribers,
            verified: self.verified,
            join_date: self.join_date,
            total_views: self.total_views,
            total_videos: self.total_videos,
            is_premium: self.is_premium,
        }
    }
}

static ACCOUNTS: [Account; 2] = [
    Account {
        email: "admin@vitimo.com",
        password: "admin",
        id: 1,
        display_name: "مدیر ویتیمو",
        avatar_url: "https://images.pexels.com/photos/220453/pexels-photo-220453.jpeg?auto=compress&cs=tinysrgb&w=100",
        is_admin: true,
        subscribers: 0,
        verified: true,
        join_date: date!(2023 - 01 - 01),
        total_views: 0,
        total_videos: 0,
        is_premium: true,
    },
    Account {
        email: "user@vitimo.com",
        password: "user",
        id: 2,
        display_name: "کاربر ویتیمو",
        avatar_url: "https://images.pexels.com/photos/614810/pexels-photo-614810.jpeg?auto=compress&cs=tinysrgb&w=100",
        is_admin: false,
        subscribers: 1250,
        verified: false,
        join_date: date!(2023 - 06 - 15),
        total_views: 125_000,
        total_videos: 12,
        is_premium: false,
    },
];

/// Exact, case-sensitive match against the compiled-in credential table.
fn find_account(email: &str, password: &str) -> Option<&'static Account> {
    ACCOUNTS
        .iter()
        .find(|a| a.email == email && a.password == password)
}

// =============================================================================
// SESSION STORE
// =============================================================================

/// Handle to the identity slot. Clones share the same slot.
#[derive(Clone)]
pub struct SessionStore {
    slot: Arc<watch::Sender<Option<Identity>>>,
    login_delay: Duration,
}

impl SessionStore {
    /// Create a signed-out store whose `login` waits `login_delay`.
    #[must_use]
    pub fn new(login_delay: Duration) -> Self {
        let (slot, _rx) = watch::channel(None);
        Self { slot: Arc::new(slot), login_delay }
    }

    #[must_use]
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.login_delay)
    }

    /// Attempt to sign in. Resolves after the simulated latency.
    ///
    /// Returns `true` and replaces the identity when the pair matches a
    /// known account; otherwise returns `false` and leaves the slot as is.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        tokio::time::sleep(self.login_delay).await;

        let Some(account) = find_account(email, password) else {
            warn!(%email, "login rejected");
            return false;
        };

        let identity = account.identity();
        info!(user_id = identity.id, admin = identity.is_admin, "login succeeded");
        self.slot.send_replace(Some(identity));
        true
    }

    /// Clear the identity. Safe to call when already signed out.
    pub fn logout(&self) {
        if let Some(previous) = self.slot.send_replace(None) {
            info!(user_id = previous.id, "logged out");
        }
    }

    /// Snapshot of the current identity.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.slot.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.slot.borrow().is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.slot.borrow().as_ref().is_some_and(|i| i.is_admin)
    }

    /// Receiver that observes every identity change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.slot.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::from_config(&StoreConfig::default())
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
