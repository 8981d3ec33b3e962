// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-tikzdraw-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tikzdraw and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Client for OpenAI-compatible `/chat/completions` endpoints.

use std::time::Duration;

use futures::FutureExt;
use serde::{Deserialize, Serialize};

use super::{Completion, CompletionClient, CompletionError, CompletionFuture, CompletionRequest};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

const MAX_ERROR_BODY_CHARS: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiSettings {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    settings: OpenAiSettings,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl OpenAiClient {
    pub fn new(settings: OpenAiSettings) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(CompletionError::Transport)?;
        Ok(Self { http, settings })
    }

    pub fn settings(&self) -> &OpenAiSettings {
        &self.settings
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.api_base.trim_end_matches('/'))
    }

    async fn send(&self, request: &CompletionRequest) -> Result<Completion, CompletionError> {
        let api_key = self.settings.api_key.as_deref().ok_or(CompletionError::MissingApiKey)?;

        let body = ChatRequest {
            model: &self.settings.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            max_tokens: request.max_tokens,
        };

        tracing::debug!(
            model = %self.settings.model,
            max_tokens = request.max_tokens,
            "requesting completion"
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(CompletionError::Transport)?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(CompletionError::Transport)?;

        if !(200..300).contains(&status) {
            return Err(classify_failure(status, &bytes));
        }

        parse_completion(&bytes)
    }
}

impl CompletionClient for OpenAiClient {
    fn complete<'a>(&'a self, request: &'a CompletionRequest) -> CompletionFuture<'a> {
        self.send(request).boxed()
    }
}

fn classify_failure(status: u16, body: &[u8]) -> CompletionError {
    match status {
        401 | 403 => CompletionError::Unauthorized { status },
        429 => CompletionError::RateLimited,
        _ => {
            let message = match serde_json::from_slice::<ApiErrorBody>(body) {
                Ok(parsed) => parsed.error.message,
                Err(_) => {
                    String::from_utf8_lossy(body).chars().take(MAX_ERROR_BODY_CHARS).collect()
                }
            };
            CompletionError::Api { status, message }
        }
    }
}

fn parse_completion(body: &[u8]) -> Result<Completion, CompletionError> {
    let parsed: ChatResponse = serde_json::from_slice(body).map_err(CompletionError::Decode)?;
    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(CompletionError::EmptyResponse)?;
    Ok(Completion::new(content))
}
