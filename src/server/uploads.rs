// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-tikzdraw-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tikzdraw and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Serving of rendered artifacts.
//!
//! Request paths are untrusted: only a single, non-hidden path segment naming a regular file
//! directly inside the upload directory is ever opened.

use std::io;
use std::path::{Component, Path, PathBuf};

use axum::extract::{Path as UrlPath, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::AppState;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("invalid upload file name {0:?}")]
    InvalidName(String),
    #[error("no such upload {0:?}")]
    NotFound(PathBuf),
    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Maps a requested file name to a path inside `upload_dir`.
pub fn resolve_upload_path(upload_dir: &Path, filename: &str) -> Result<PathBuf, UploadError> {
    let invalid = || UploadError::InvalidName(filename.to_owned());

    if filename.is_empty()
        || filename.starts_with('.')
        || filename.contains(&['/', '\\', '\0'][..])
    {
        return Err(invalid());
    }

    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => {}
        _ => return Err(invalid()),
    }

    Ok(upload_dir.join(filename))
}

async fn read_upload(upload_dir: &Path, filename: &str) -> Result<Vec<u8>, UploadError> {
    let path = resolve_upload_path(upload_dir, filename)?;

    match tokio::fs::symlink_metadata(&path).await {
        Ok(metadata) if metadata.file_type().is_file() => {}
        Ok(_) => return Err(UploadError::NotFound(path)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(UploadError::NotFound(path)),
        Err(source) => return Err(UploadError::Io { path, source }),
    }

    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(bytes),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(UploadError::NotFound(path)),
        Err(source) => Err(UploadError::Io { path, source }),
    }
}

fn content_type(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("tex") | Some("log") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

pub(super) async fn serve(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> Response {
    let upload_dir = state.generator.pipeline().upload_dir();

    match read_upload(upload_dir, &filename).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, content_type(&filename)),
                (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            ],
            bytes,
        )
            .into_response(),
        Err(err @ UploadError::InvalidName(_)) => {
            tracing::warn!(error = %err, "rejected upload request");
            (StatusCode::BAD_REQUEST, "invalid file name").into_response()
        }
        Err(UploadError::NotFound(_)) => (StatusCode::NOT_FOUND, "not found").into_response(),
        Err(err @ UploadError::Io { .. }) => {
            tracing::error!(error = %err, "cannot serve upload");
            (StatusCode::INTERNAL_SERVER_ERROR, "cannot read file").into_response()
        }
    }
}
