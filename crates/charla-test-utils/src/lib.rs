// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared test fixtures.
//!
//! `MockChatProvider` implements `ChatProvider` with captured outbound calls
//! for assertion in tests.

pub mod mock_provider;

pub use mock_provider::{MockChatProvider, SentMedia, SentText};
