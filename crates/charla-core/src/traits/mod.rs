// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the bridge and its external collaborators.

pub mod channel;

pub use channel::{ChatProvider, ProviderEvent};
