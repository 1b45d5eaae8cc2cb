// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Console chat provider for local development.
//!
//! Stands in for a real chat-network provider: outbound sends are printed,
//! and stdin lines of the form `593111111111: hola` become inbound message
//! events. `/qr` simulates a pairing request.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

use charla_core::error::CharlaError;
use charla_core::traits::{ChatProvider, ProviderEvent};
use charla_core::types::{ChatIdentity, InboundChatMessage, InlineMedia};

pub struct ConsoleProvider;

impl ConsoleProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatProvider for ConsoleProvider {
    fn name(&self) -> &str {
        "console"
    }

    async fn send_text(&self, to: &ChatIdentity, text: &str) -> Result<(), CharlaError> {
        println!("[console] -> {to}: {text}");
        Ok(())
    }

    async fn send_media(
        &self,
        to: &ChatIdentity,
        media_url_or_path: &str,
        caption: Option<&str>,
    ) -> Result<(), CharlaError> {
        println!(
            "[console] -> {to}: media {media_url_or_path} ({})",
            caption.unwrap_or("no caption")
        );
        Ok(())
    }

    async fn save_media(&self, media: &InlineMedia) -> Result<PathBuf, CharlaError> {
        // The console has no real media payloads; persist a placeholder so
        // the relay path stays exercisable in development.
        let file_name = media
            .file_name
            .clone()
            .unwrap_or_else(|| "console-media.bin".to_string());
        let path = std::env::temp_dir().join(file_name);
        tokio::fs::write(&path, b"console placeholder")
            .await
            .map_err(|e| CharlaError::media(format!("writing {}", path.display()), e))?;
        Ok(path)
    }
}

/// Parses one stdin line into a provider event.
fn parse_line(line: &str) -> Option<ProviderEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if line == "/qr" {
        return Some(ProviderEvent::PairingRequired);
    }
    let (number, text) = line.split_once(':')?;
    let from = ChatIdentity::normalize(number);
    if from.is_empty() {
        return None;
    }
    Some(ProviderEvent::Message(InboundChatMessage {
        from,
        body: text.trim().to_string(),
        sender_name: None,
        media: None,
    }))
}

/// Reads stdin lines and feeds parsed events into the bridge loop.
pub fn spawn_stdin_loop(events: mpsc::UnboundedSender<ProviderEvent>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if let Some(event) = parse_line(&line) {
                        if events.send(event).is_err() {
                            break;
                        }
                    } else if !line.trim().is_empty() {
                        eprintln!("unrecognized input, expected `<number>: <text>` or `/qr`");
                    }
                }
                Ok(None) => break,
                Err(error) => {
                    warn!(%error, "stdin read failed, console input stopped");
                    break;
                }
            }
        }
    });
}
