// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-tikzdraw-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tikzdraw and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::path::Path;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use super::{router, AppState};
use crate::completion::{CompletionClient, DEFAULT_MAX_TOKENS};
use crate::generate::testing::CannedClient;
use crate::generate::DiagramGenerator;
use crate::render::{RenderPipeline, RenderSettings, ToolCommand};

const TRIANGLE_REPLY: &str = "```latex\n\\begin{document}\nTRIANGLE\n```";

fn app(client: Arc<dyn CompletionClient>, settings: RenderSettings) -> Router {
    let generator =
        DiagramGenerator::new(client, RenderPipeline::new(settings), DEFAULT_MAX_TOKENS);
    router(AppState::new(generator).expect("app state"))
}

fn missing_tools(upload_dir: &Path) -> RenderSettings {
    RenderSettings {
        upload_dir: upload_dir.to_path_buf(),
        latex: ToolCommand::new("tikzdraw-missing-latex"),
        converter: ToolCommand::new("tikzdraw-missing-pdf2svg"),
        ..RenderSettings::default()
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).expect("request")
}

fn post_form(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_owned()))
        .expect("request")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, String) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("collect body");
    (status, content_type, String::from_utf8_lossy(&bytes).into_owned())
}

fn img_src(html: &str) -> Option<&str> {
    let start = html.find("<img src=\"")? + "<img src=\"".len();
    let end = html[start..].find('"')? + start;
    Some(&html[start..end])
}

#[tokio::test]
async fn get_renders_empty_form() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let app = app(Arc::new(CannedClient::replying("")), missing_tools(tmp.path()));

    let (status, content_type, html) = send(&app, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.is_some_and(|value| value.starts_with("text/html")));
    assert!(html.contains("name=\"user_input\""));
    assert!(!html.contains("Model output"));
}

#[tokio::test]
async fn failing_tools_still_answer_with_model_output() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let app = app(Arc::new(CannedClient::replying(TRIANGLE_REPLY)), missing_tools(tmp.path()));

    let (status, _, html) = send(&app, post_form("user_input=a+red+triangle")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("a red triangle"));
    assert!(html.contains("Model output"));
    assert!(html.contains("TRIANGLE"));
    assert!(html.contains("No diagram rendered: LaTeX compilation failed"));
    assert!(img_src(&html).is_none());
}

#[tokio::test]
async fn completion_failure_is_shown_on_the_page() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let app = app(Arc::new(CannedClient::rate_limited()), missing_tools(tmp.path()));

    let (status, _, html) = send(&app, post_form("user_input=a+circle")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("The completion service failed"));
    assert!(html.contains("rate limit"));
    assert!(!html.contains("Model output"));
}

#[tokio::test]
async fn missing_form_field_is_a_client_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let app = app(Arc::new(CannedClient::replying("")), missing_tools(tmp.path()));

    let (status, _, _) = send(&app, post_form("other=1")).await;
    assert!(status.is_client_error(), "{status}");
}

#[tokio::test]
async fn uploads_reject_traversal_and_hidden_names() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let upload_dir = tmp.path().join("uploads");
    std::fs::create_dir_all(&upload_dir).expect("mkdir");
    std::fs::write(tmp.path().join("secret.txt"), "secret").expect("write secret");
    std::fs::write(upload_dir.join(".hidden"), "hidden").expect("write hidden");
    let app = app(Arc::new(CannedClient::replying("")), missing_tools(&upload_dir));

    for uri in ["/uploads/..%2Fsecret.txt", "/uploads/.hidden", "/uploads/..%5Csecret.txt"] {
        let (status, _, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(!body.contains("secret") && !body.contains("hidden"), "{uri}");
    }

    let (status, _, _) = send(&app, get("/uploads/missing.svg")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[cfg(unix)]
mod stubbed_tools {
    use super::*;
    use crate::render::test_utils::{stub_settings, COMPILER_OK, CONVERTER_OK};

    #[tokio::test]
    async fn rendered_svg_is_linked_and_served() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let settings = stub_settings(tmp.path(), COMPILER_OK, CONVERTER_OK);
        let app = app(Arc::new(CannedClient::replying(TRIANGLE_REPLY)), settings);

        let (status, _, html) = send(&app, post_form("user_input=a+red+triangle")).await;
        assert_eq!(status, StatusCode::OK);

        let src = img_src(&html).expect("img tag").to_owned();
        assert!(src.starts_with("/uploads/") && src.ends_with(".svg"), "{src}");

        let (status, content_type, body) = send(&app, get(&src)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("image/svg+xml"));
        assert!(body.starts_with("<svg"));

        let tex_uri = src.replace(".svg", ".tex");
        let (status, _, tex) = send(&app, get(&tex_uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(tex.contains("\\usepackage{tikz}"));
        assert!(tex.contains("TRIANGLE"));
    }

    #[tokio::test]
    async fn concurrent_submissions_get_their_own_artifacts() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let settings = stub_settings(tmp.path(), COMPILER_OK, CONVERTER_OK);
        let app = app(Arc::new(CannedClient::replying(TRIANGLE_REPLY)), settings);

        let (first, second) = tokio::join!(
            send(&app, post_form("user_input=first")),
            send(&app, post_form("user_input=second")),
        );

        assert_eq!(first.0, StatusCode::OK);
        assert_eq!(second.0, StatusCode::OK);
        let first_src = img_src(&first.2).expect("first img");
        let second_src = img_src(&second.2).expect("second img");
        assert_ne!(first_src, second_src);
    }

    #[tokio::test]
    async fn symlinks_in_upload_dir_are_not_followed() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let upload_dir = tmp.path().join("uploads");
        std::fs::create_dir_all(&upload_dir).expect("mkdir");
        std::fs::write(tmp.path().join("secret.txt"), "secret").expect("write secret");
        std::os::unix::fs::symlink(tmp.path().join("secret.txt"), upload_dir.join("link.svg"))
            .expect("symlink");
        let app = app(Arc::new(CannedClient::replying("")), missing_tools(&upload_dir));

        let (status, _, body) = send(&app, get("/uploads/link.svg")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!body.contains("secret"));
    }
}
