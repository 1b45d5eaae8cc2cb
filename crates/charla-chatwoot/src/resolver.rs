// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lazy contact and conversation resolution.
//!
//! Nothing is provisioned up front. The first message from an identity
//! creates the contact and conversation on demand; later messages find the
//! existing ones. Creation is guarded by a per-identity async lock so a
//! burst of first messages yields exactly one conversation.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use charla_core::error::CharlaError;
use charla_core::types::{BOT_ATTRIBUTE_KEY, ChatIdentity};

use crate::client::ChatwootClient;

const SETTLE_DELAY: Duration = Duration::from_millis(100);
const LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves chat identities to Chatwoot conversation ids, creating the
/// contact and conversation when missing.
#[derive(Debug)]
pub struct ConversationResolver {
    client: ChatwootClient,
    locks: DashMap<ChatIdentity, Arc<Mutex<()>>>,
    settle_delay: Duration,
    lock_timeout: Duration,
}

impl ConversationResolver {
    pub fn new(client: ChatwootClient) -> Self {
        Self::with_timings(client, SETTLE_DELAY, LOCK_TIMEOUT)
    }

    /// Overrides the indexing settle delay and lock timeout, for tests.
    pub fn with_timings(
        client: ChatwootClient,
        settle_delay: Duration,
        lock_timeout: Duration,
    ) -> Self {
        Self {
            client,
            locks: DashMap::new(),
            settle_delay,
            lock_timeout,
        }
    }

    pub fn client(&self) -> &ChatwootClient {
        &self.client
    }

    /// Returns the conversation id for this identity, provisioning the
    /// contact and conversation on first contact.
    pub async fn resolve(
        &self,
        identity: &ChatIdentity,
        display_name: &str,
    ) -> Result<i64, CharlaError> {
        let contact_id = match self.client.find_contact_id(identity).await? {
            Some(id) => id,
            None => {
                info!(%identity, "creating contact");
                let id = self.client.create_contact(display_name, identity).await?;
                // Search indexing lags behind creation; give it a moment
                // before reading the fresh contact back.
                tokio::time::sleep(self.settle_delay).await;
                if !self
                    .client
                    .has_custom_attribute(identity, BOT_ATTRIBUTE_KEY)
                    .await?
                {
                    self.client
                        .set_custom_attribute(identity, BOT_ATTRIBUTE_KEY, "ON")
                        .await?;
                }
                id
            }
        };

        if let Some(conversation_id) = self.client.find_conversation_id(contact_id).await? {
            return Ok(conversation_id);
        }

        self.create_conversation_locked(identity, contact_id).await
    }

    /// Creates the conversation under the identity's lock, re-checking for a
    /// conversation a concurrent caller may have created meanwhile.
    async fn create_conversation_locked(
        &self,
        identity: &ChatIdentity,
        contact_id: i64,
    ) -> Result<i64, CharlaError> {
        let lock = {
            let entry = self.locks.entry(identity.clone()).or_default();
            Arc::clone(entry.value())
        };
        let guard = tokio::time::timeout(self.lock_timeout, lock.lock())
            .await
            .map_err(|_| CharlaError::Timeout {
                duration: self.lock_timeout,
            })?;

        let result = match self.client.find_conversation_id(contact_id).await? {
            Some(conversation_id) => {
                debug!(%identity, conversation_id, "conversation created by concurrent resolver");
                Ok(conversation_id)
            }
            None => {
                info!(%identity, contact_id, "creating conversation");
                let source_id = format!("ChatBot {identity}");
                self.client.create_conversation(&source_id, contact_id).await
            }
        };

        drop(guard);
        drop(lock);
        // Only drop the entry once no other caller still holds this mutex.
        // Removing it while a waiter is queued would let a new arrival
        // create a second mutex and race the waiter's retry.
        self.locks
            .remove_if(identity, |_, lock| Arc::strong_count(lock) == 1);
        result
    }
}
