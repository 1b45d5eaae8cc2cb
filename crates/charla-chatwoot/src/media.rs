// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns a [`MediaReference`] into bytes ready for a multipart upload.

use std::path::Path;

use tracing::debug;

use charla_core::error::CharlaError;
use charla_core::traits::ChatProvider;
use charla_core::types::{InlineMedia, MediaReference};

/// One file ready to attach to a Chatwoot message.
#[derive(Debug, Clone)]
pub struct AttachmentPart {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// An attachment plus the caption travelling with it, if any.
#[derive(Debug, Clone)]
pub struct ResolvedMedia {
    pub part: AttachmentPart,
    pub caption: Option<String>,
}

/// Materializes a media reference into attachment bytes.
///
/// Remote URLs are downloaded, local paths read from disk, and inline media
/// persisted through the provider first so both sides observe the same file.
pub async fn resolve_reference(
    http: &reqwest::Client,
    provider: &dyn ChatProvider,
    reference: &MediaReference,
) -> Result<ResolvedMedia, CharlaError> {
    match reference {
        MediaReference::RemoteUrl(url) => {
            debug!(%url, "downloading remote media");
            let response = http
                .get(url)
                .send()
                .await
                .map_err(|e| CharlaError::media(format!("downloading {url}"), e))?;
            if !response.status().is_success() {
                return Err(CharlaError::Media {
                    message: format!("downloading {url} returned {}", response.status()),
                    source: None,
                });
            }
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            let bytes = response
                .bytes()
                .await
                .map_err(|e| CharlaError::media(format!("reading body of {url}"), e))?;
            Ok(ResolvedMedia {
                part: AttachmentPart {
                    file_name: filename_from_url(url, content_type.as_deref()),
                    mime_type: content_type,
                    bytes: bytes.to_vec(),
                },
                caption: None,
            })
        }
        MediaReference::LocalPath(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| CharlaError::media(format!("reading {}", path.display()), e))?;
            Ok(ResolvedMedia {
                part: AttachmentPart {
                    file_name: basename(path),
                    mime_type: None,
                    bytes,
                },
                caption: None,
            })
        }
        MediaReference::Inline(media) => {
            let path = provider.save_media(media).await?;
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| CharlaError::media(format!("reading {}", path.display()), e))?;
            Ok(ResolvedMedia {
                part: AttachmentPart {
                    file_name: inline_filename(media),
                    mime_type: Some(media.mime_type.clone()),
                    bytes,
                },
                caption: media.caption.clone(),
            })
        }
    }
}

/// Picks a filename for a downloaded URL.
///
/// Uses the last path segment when it looks like a filename; otherwise
/// synthesizes one from the content type so Chatwoot can classify the upload.
pub fn filename_from_url(url: &str, content_type: Option<&str>) -> String {
    let tail = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let tail = tail.split(['?', '#']).next().unwrap_or_default();
    if !tail.is_empty() && tail.contains('.') {
        tail.to_string()
    } else {
        synthesized_filename(content_type)
    }
}

/// `file.<subtype>` from a mime type, or `file.bin` when unknown.
pub fn synthesized_filename(content_type: Option<&str>) -> String {
    let subtype = content_type
        .and_then(|value| value.split(';').next())
        .and_then(|mime| mime.split('/').nth(1))
        .filter(|subtype| !subtype.is_empty())
        .unwrap_or("bin");
    format!("file.{subtype}")
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file.bin".to_string())
}

fn inline_filename(media: &InlineMedia) -> String {
    // The provider's save path carries no usable name, so synthesize one
    // from the mime type when the sender did not supply a filename.
    media
        .file_name
        .clone()
        .unwrap_or_else(|| synthesized_filename(Some(&media.mime_type)))
}
