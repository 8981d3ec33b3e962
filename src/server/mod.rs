// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-tikzdraw-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tikzdraw and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! HTTP front end.
//!
//! - `GET /` renders the empty form.
//! - `POST /` (form field `user_input`) generates a diagram and renders the result page.
//! - `GET /uploads/{filename}` serves artifacts, confined to the upload directory.

use std::sync::Arc;

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::generate::DiagramGenerator;
use crate::prompt::DiagramRequest;

mod page;
mod uploads;

pub use page::{Page, PageView};
pub use uploads::{resolve_upload_path, UploadError};

#[derive(Clone)]
pub struct AppState {
    generator: DiagramGenerator,
    page: Arc<Page>,
}

impl AppState {
    pub fn new(generator: DiagramGenerator) -> Result<Self, minijinja::Error> {
        Ok(Self {
            generator,
            page: Arc::new(Page::new()?),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .route("/uploads/{filename}", get(uploads::serve))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct DiagramForm {
    user_input: String,
}

async fn index(State(state): State<AppState>) -> Response {
    render_page(&state, &PageView::default())
}

async fn submit(State(state): State<AppState>, Form(form): Form<DiagramForm>) -> Response {
    let report = state.generator.generate(DiagramRequest::new(form.user_input)).await;
    render_page(&state, &PageView::from_report(&report))
}

fn render_page(state: &AppState, view: &PageView) -> Response {
    match state.page.render(view) {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "cannot render page");
            (StatusCode::INTERNAL_SERVER_ERROR, "page rendering failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests;
