// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat provider for deterministic testing.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use charla_core::error::CharlaError;
use charla_core::traits::ChatProvider;
use charla_core::types::{ChatIdentity, InlineMedia};

/// A text message captured by [`MockChatProvider::send_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentText {
    pub to: ChatIdentity,
    pub text: String,
}

/// A media send captured by [`MockChatProvider::send_media`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMedia {
    pub to: ChatIdentity,
    pub media: String,
    pub caption: Option<String>,
}

/// A mock chat provider for testing.
///
/// Outbound calls are captured and retrievable; `save_media` writes a real
/// file into a temporary directory so callers can read it back.
pub struct MockChatProvider {
    texts: Mutex<Vec<SentText>>,
    media: Mutex<Vec<SentMedia>>,
    saved: Mutex<Vec<InlineMedia>>,
    media_dir: TempDir,
    fail_sends: Mutex<bool>,
}

impl MockChatProvider {
    pub fn new() -> Self {
        Self {
            texts: Mutex::new(Vec::new()),
            media: Mutex::new(Vec::new()),
            saved: Mutex::new(Vec::new()),
            media_dir: TempDir::new().expect("create temp media dir"),
            fail_sends: Mutex::new(false),
        }
    }

    /// All texts captured by `send_text`, in call order.
    pub fn sent_texts(&self) -> Vec<SentText> {
        self.texts.lock().unwrap().clone()
    }

    /// All media sends captured by `send_media`, in call order.
    pub fn sent_media(&self) -> Vec<SentMedia> {
        self.media.lock().unwrap().clone()
    }

    /// All media persisted through `save_media`.
    pub fn saved_media(&self) -> Vec<InlineMedia> {
        self.saved.lock().unwrap().clone()
    }

    pub fn clear_sent(&self) {
        self.texts.lock().unwrap().clear();
        self.media.lock().unwrap().clear();
    }

    /// Makes subsequent send calls fail with a channel error.
    pub fn fail_sends(&self, fail: bool) {
        *self.fail_sends.lock().unwrap() = fail;
    }

    fn check_failure(&self) -> Result<(), CharlaError> {
        if *self.fail_sends.lock().unwrap() {
            return Err(CharlaError::Channel {
                message: "mock send failure".to_string(),
                source: None,
            });
        }
        Ok(())
    }
}

impl Default for MockChatProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    async fn send_text(&self, to: &ChatIdentity, text: &str) -> Result<(), CharlaError> {
        self.check_failure()?;
        self.texts.lock().unwrap().push(SentText {
            to: to.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_media(
        &self,
        to: &ChatIdentity,
        media_url_or_path: &str,
        caption: Option<&str>,
    ) -> Result<(), CharlaError> {
        self.check_failure()?;
        self.media.lock().unwrap().push(SentMedia {
            to: to.clone(),
            media: media_url_or_path.to_string(),
            caption: caption.map(str::to_string),
        });
        Ok(())
    }

    async fn save_media(&self, media: &InlineMedia) -> Result<PathBuf, CharlaError> {
        let index = self.saved.lock().unwrap().len();
        let file_name = media
            .file_name
            .clone()
            .unwrap_or_else(|| format!("media-{index}.bin"));
        let path = self.media_dir.path().join(file_name);
        tokio::fs::write(&path, b"mock-media-bytes")
            .await
            .map_err(|e| CharlaError::media(format!("writing {}", path.display()), e))?;
        self.saved.lock().unwrap().push(media.clone());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_text_is_captured_in_order() {
        let provider = MockChatProvider::new();
        let to = ChatIdentity::normalize("593111111111");
        provider.send_text(&to, "hola").await.unwrap();
        provider.send_text(&to, "que tal").await.unwrap();

        let sent = provider.sent_texts();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].text, "hola");
        assert_eq!(sent[1].text, "que tal");
    }

    #[tokio::test]
    async fn send_media_captures_caption() {
        let provider = MockChatProvider::new();
        let to = ChatIdentity::normalize("593111111111");
        provider
            .send_media(&to, "https://cdn.example.com/a.png", Some("mira"))
            .await
            .unwrap();

        let sent = provider.sent_media();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].media, "https://cdn.example.com/a.png");
        assert_eq!(sent[0].caption.as_deref(), Some("mira"));
    }

    #[tokio::test]
    async fn save_media_writes_a_readable_file() {
        let provider = MockChatProvider::new();
        let media = InlineMedia {
            mime_type: "image/png".into(),
            file_name: Some("shot.png".into()),
            caption: None,
        };

        let path = provider.save_media(&media).await.unwrap();
        assert!(path.ends_with("shot.png"));
        assert!(tokio::fs::try_exists(&path).await.unwrap());
        assert_eq!(provider.saved_media().len(), 1);
    }

    #[tokio::test]
    async fn failure_mode_rejects_sends() {
        let provider = MockChatProvider::new();
        provider.fail_sends(true);
        let to = ChatIdentity::normalize("593111111111");
        assert!(provider.send_text(&to, "hola").await.is_err());
        assert!(provider.sent_texts().is_empty());
    }
}
