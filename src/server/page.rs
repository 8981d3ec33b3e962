// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-tikzdraw-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tikzdraw and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use minijinja::Environment;
use serde::Serialize;

use crate::generate::{GenerationOutcome, GenerationReport};
use crate::render::{RenderFailure, RenderOutcome};

const INDEX_TEMPLATE: &str = "index.html";

/// The single HTML page. Interpolated values are HTML-escaped.
pub struct Page {
    env: Environment<'static>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub description: Option<String>,
    pub response: Option<String>,
    /// Artifact file name under `/uploads/`.
    pub svg_file: Option<String>,
    pub notice: Option<String>,
    pub detail: Option<String>,
    pub error: Option<String>,
}

impl PageView {
    pub fn from_report(report: &GenerationReport) -> Self {
        let mut view = Self {
            description: Some(report.description.clone()),
            response: report.raw_text.clone(),
            ..Self::default()
        };

        match &report.outcome {
            GenerationOutcome::CompletionFailed(err) => {
                view.error = Some(format!("The completion service failed: {err}"));
            }
            GenerationOutcome::Rendered(RenderOutcome::Rendered { svg_file_name }) => {
                view.svg_file = Some(svg_file_name.clone());
            }
            GenerationOutcome::Rendered(RenderOutcome::NotRendered { reason }) => {
                view.notice = Some(match reason {
                    RenderFailure::MissingArtifact => "No diagram rendered.".to_owned(),
                    other => format!("No diagram rendered: {other}."),
                });
                view.detail = reason.detail().map(str::to_owned);
            }
        }

        view
    }
}

impl Page {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(INDEX_TEMPLATE, include_str!("templates/index.html"))?;
        Ok(Self { env })
    }

    pub fn render(&self, view: &PageView) -> Result<String, minijinja::Error> {
        self.env.get_template(INDEX_TEMPLATE)?.render(view)
    }
}
