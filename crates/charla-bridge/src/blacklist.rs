// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-contact bot suppression set ("dynamic blacklist").
//!
//! An identity in the set means a human agent has taken over and the bot
//! must not auto-respond. The webhook router is the sole mutator; the
//! hosting bot consults it before generating replies.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::Mutex;

use charla_core::types::ChatIdentity;

/// Storage seam for the suppression set. The default in-memory store covers
/// a single process; hosts with durable storage supply their own.
#[async_trait]
pub trait BlacklistStore: Send + Sync + 'static {
    async fn list(&self) -> Vec<ChatIdentity>;
    /// Adds the identity. Adding one already present is a no-op.
    async fn add(&self, identity: &ChatIdentity);
    /// Removes the identity. Removing one not present is a no-op.
    async fn remove(&self, identity: &ChatIdentity);
    async fn contains(&self, identity: &ChatIdentity) -> bool;
}

/// In-process suppression set.
#[derive(Debug, Default)]
pub struct MemoryBlacklist {
    set: Mutex<HashSet<ChatIdentity>>,
}

impl MemoryBlacklist {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlacklistStore for MemoryBlacklist {
    async fn list(&self) -> Vec<ChatIdentity> {
        self.set.lock().await.iter().cloned().collect()
    }

    async fn add(&self, identity: &ChatIdentity) {
        self.set.lock().await.insert(identity.clone());
    }

    async fn remove(&self, identity: &ChatIdentity) {
        self.set.lock().await.remove(identity);
    }

    async fn contains(&self, identity: &ChatIdentity) -> bool {
        self.set.lock().await.contains(identity)
    }
}
