// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-tikzdraw-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tikzdraw and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! One submission end to end: prompt, completion, normalization, rendering.

use std::sync::Arc;

use tracing::Instrument;

use crate::completion::{CompletionClient, CompletionError, CompletionRequest};
use crate::latex::{normalize, NormalizedDocument};
use crate::prompt::DiagramRequest;
use crate::render::{ArtifactId, RenderOutcome, RenderPipeline};

#[derive(Debug)]
pub enum GenerationOutcome {
    CompletionFailed(CompletionError),
    Rendered(RenderOutcome),
}

#[derive(Debug)]
pub struct GenerationReport {
    pub artifact_id: ArtifactId,
    pub description: String,
    /// Model reply as received (trimmed), before normalization.
    pub raw_text: Option<String>,
    pub document: Option<NormalizedDocument>,
    pub outcome: GenerationOutcome,
}

impl GenerationReport {
    pub fn svg_file_name(&self) -> Option<&str> {
        match &self.outcome {
            GenerationOutcome::Rendered(outcome) => outcome.svg_file_name(),
            GenerationOutcome::CompletionFailed(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct DiagramGenerator {
    client: Arc<dyn CompletionClient>,
    pipeline: RenderPipeline,
    max_tokens: u32,
}

impl DiagramGenerator {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        pipeline: RenderPipeline,
        max_tokens: u32,
    ) -> Self {
        Self {
            client,
            pipeline,
            max_tokens,
        }
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    pub async fn generate(&self, request: DiagramRequest) -> GenerationReport {
        let artifact_id = ArtifactId::generate();
        let span = tracing::info_span!("generate", artifact = %artifact_id);
        self.generate_as(artifact_id, request).instrument(span).await
    }

    async fn generate_as(
        &self,
        artifact_id: ArtifactId,
        request: DiagramRequest,
    ) -> GenerationReport {
        tracing::info!(description_len = request.description().len(), "diagram requested");

        let completion_request = CompletionRequest::for_diagram(&request, self.max_tokens);
        let description = request.description().to_owned();

        let completion = match self.client.complete(&completion_request).await {
            Ok(completion) => completion,
            Err(err) => {
                tracing::error!(error = %err, "completion failed");
                return GenerationReport {
                    artifact_id,
                    description,
                    raw_text: None,
                    document: None,
                    outcome: GenerationOutcome::CompletionFailed(err),
                };
            }
        };

        let raw_text = completion.into_text();
        let document = normalize(&raw_text);
        for marker in document.inserted() {
            tracing::debug!(marker = %marker, "added missing LaTeX marker");
        }

        let outcome = self.pipeline.render(&artifact_id, &document).await;

        GenerationReport {
            artifact_id,
            description,
            raw_text: Some(raw_text),
            document: Some(document),
            outcome: GenerationOutcome::Rendered(outcome),
        }
    }
}
