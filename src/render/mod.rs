// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-tikzdraw-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tikzdraw and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! LaTeX → PDF → SVG rendering.
//!
//! Every submission writes its own `<artifact-id>.tex`, compiles it next to itself and converts
//! the resulting PDF. Each step is best effort: a failing tool is logged and remembered, later
//! steps still run, and the caller gets a [`RenderOutcome`] saying whether an SVG exists.

use std::ffi::OsStr;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::latex::NormalizedDocument;

pub mod retention;
pub mod tool;

pub use retention::{spawn_sweeper, sweep_expired};
pub use tool::{ToolCommand, ToolError};

pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_LATEX_PROGRAM: &str = "pdflatex";
pub const DEFAULT_SVG_PROGRAM: &str = "pdf2svg";
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(60);

/// Per-request token naming the artifact files. Lowercase hex only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactId(String);

impl ArtifactId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub tex: PathBuf,
    pub pdf: PathBuf,
    pub svg: PathBuf,
}

impl ArtifactPaths {
    pub fn new(upload_dir: &Path, id: &ArtifactId) -> Self {
        Self {
            tex: upload_dir.join(format!("{id}.tex")),
            pdf: upload_dir.join(format!("{id}.pdf")),
            svg: upload_dir.join(format!("{id}.svg")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    pub upload_dir: PathBuf,
    pub latex: ToolCommand,
    pub converter: ToolCommand,
    pub tool_timeout: Duration,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            latex: ToolCommand::new(DEFAULT_LATEX_PROGRAM),
            converter: ToolCommand::new(DEFAULT_SVG_PROGRAM),
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderFailure {
    #[error("cannot write {path:?}: {source}")]
    WriteSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("LaTeX compilation failed: {0}")]
    Compile(#[source] ToolError),
    #[error("PDF to SVG conversion failed: {0}")]
    Convert(#[source] ToolError),
    #[error("no diagram rendered")]
    MissingArtifact,
}

impl RenderFailure {
    /// Tool output worth showing next to the failure message.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Compile(err) | Self::Convert(err) => err.output_tail(),
            Self::WriteSource { .. } | Self::MissingArtifact => None,
        }
    }
}

#[derive(Debug)]
pub enum RenderOutcome {
    Rendered { svg_file_name: String },
    NotRendered { reason: RenderFailure },
}

impl RenderOutcome {
    pub fn svg_file_name(&self) -> Option<&str> {
        match self {
            Self::Rendered { svg_file_name } => Some(svg_file_name),
            Self::NotRendered { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<&RenderFailure> {
        match self {
            Self::Rendered { .. } => None,
            Self::NotRendered { reason } => Some(reason),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderPipeline {
    settings: RenderSettings,
}

impl RenderPipeline {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn upload_dir(&self) -> &Path {
        &self.settings.upload_dir
    }

    pub async fn render(&self, id: &ArtifactId, document: &NormalizedDocument) -> RenderOutcome {
        let upload_dir = self.upload_dir();
        let paths = ArtifactPaths::new(upload_dir, id);

        if let Err(reason) = write_source(upload_dir, &paths.tex, document.source()).await {
            tracing::warn!(%reason, "skipping render");
            return RenderOutcome::NotRendered { reason };
        }

        let mut first_failure = None;

        let compile_args = [
            OsStr::new("-interaction=nonstopmode"),
            OsStr::new("-halt-on-error"),
            OsStr::new("-output-directory"),
            upload_dir.as_os_str(),
            paths.tex.as_os_str(),
        ];
        if let Err(err) = self.settings.latex.run(&compile_args, self.settings.tool_timeout).await {
            tracing::warn!(error = %err, "error compiling LaTeX");
            if let Some(tail) = err.output_tail() {
                tracing::debug!("{}", tail);
            }
            first_failure = Some(RenderFailure::Compile(err));
        }

        let convert_args = [paths.pdf.as_os_str(), paths.svg.as_os_str()];
        if let Err(err) = self.settings.converter.run(&convert_args, self.settings.tool_timeout).await
        {
            tracing::warn!(error = %err, "error converting PDF to SVG");
            if first_failure.is_none() {
                first_failure = Some(RenderFailure::Convert(err));
            }
        }

        match tokio::fs::try_exists(&paths.svg).await {
            Ok(true) => {
                let svg_file_name = format!("{id}.svg");
                tracing::info!(svg = %svg_file_name, "diagram rendered");
                RenderOutcome::Rendered { svg_file_name }
            }
            _ => {
                tracing::warn!(path = ?paths.svg, "SVG file was not created");
                RenderOutcome::NotRendered {
                    reason: first_failure.unwrap_or(RenderFailure::MissingArtifact),
                }
            }
        }
    }
}

async fn write_source(upload_dir: &Path, tex: &Path, source: &str) -> Result<(), RenderFailure> {
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|source| RenderFailure::WriteSource {
            path: upload_dir.to_path_buf(),
            source,
        })?;
    tokio::fs::write(tex, source)
        .await
        .map_err(|source| RenderFailure::WriteSource {
            path: tex.to_path_buf(),
            source,
        })
}

#[cfg(all(test, unix))]
pub(crate) mod test_utils;
