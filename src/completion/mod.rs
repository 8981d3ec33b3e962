// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-tikzdraw-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tikzdraw and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Chat-completion clients.
//!
//! [`CompletionClient`] is object safe so the HTTP layer can hold any implementation behind an
//! `Arc<dyn CompletionClient>`; tests plug in canned replies the same way.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::prompt::{build_prompt, DiagramRequest, SYSTEM_INSTRUCTION};

pub mod openai;

pub use openai::{OpenAiClient, OpenAiSettings};

pub const DEFAULT_MAX_TOKENS: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Builds the system + user message pair for a diagram description.
    pub fn for_diagram(request: &DiagramRequest, max_tokens: u32) -> Self {
        Self {
            system: SYSTEM_INSTRUCTION.to_owned(),
            prompt: build_prompt(request),
            max_tokens,
        }
    }
}

/// Text of the first returned choice, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    text: String,
}

impl Completion {
    pub fn new(text: impl AsRef<str>) -> Self {
        Self {
            text: text.as_ref().trim().to_owned(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("no API key configured (set API_KEY)")]
    MissingApiKey,
    #[error("completion request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("completion service rejected the API key (HTTP {status})")]
    Unauthorized { status: u16 },
    #[error("completion service rate limit or quota exceeded")]
    RateLimited,
    #[error("completion service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("cannot decode completion response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("completion response contained no text")]
    EmptyResponse,
}

pub type CompletionFuture<'a> = BoxFuture<'a, Result<Completion, CompletionError>>;

pub trait CompletionClient: Send + Sync {
    fn complete<'a>(&'a self, request: &'a CompletionRequest) -> CompletionFuture<'a>;
}
