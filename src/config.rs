// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-tikzdraw-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tikzdraw and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Command-line and environment configuration.

use std::io;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

use crate::completion::openai::{DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::completion::{OpenAiSettings, DEFAULT_MAX_TOKENS};
use crate::render::{
    RenderSettings, ToolCommand, DEFAULT_LATEX_PROGRAM, DEFAULT_SVG_PROGRAM, DEFAULT_UPLOAD_DIR,
};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Loads `KEY=value` lines from `path` into the process environment before the flags are
/// parsed, so the `env` fallbacks below see them. Variables already set are left alone.
///
/// Returns `Ok(false)` when the file does not exist.
pub fn load_env_file(path: &Path) -> Result<bool, dotenvy::Error> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(dotenvy::Error::Io(err)) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "tikzdraw")]
#[command(about = "Describe a diagram in plain words, get TikZ and an SVG back")]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory receiving the .tex/.pdf/.svg artifacts
    #[arg(long, env = "UPLOAD_DIR", default_value = DEFAULT_UPLOAD_DIR)]
    pub upload_dir: PathBuf,

    /// API key for the completion service
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Chat model name
    #[arg(long, env = "MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Token ceiling for a completion
    #[arg(long, env = "MAX_TOKENS", default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,

    /// LaTeX compiler invoked on the generated .tex file
    #[arg(long, env = "LATEX_PROGRAM", default_value = DEFAULT_LATEX_PROGRAM)]
    pub latex_program: String,

    /// PDF to SVG converter
    #[arg(long, env = "SVG_PROGRAM", default_value = DEFAULT_SVG_PROGRAM)]
    pub svg_program: String,

    /// Seconds an external tool may run before it is killed
    #[arg(long, env = "TOOL_TIMEOUT_SECS", default_value_t = 60)]
    pub tool_timeout_secs: u64,

    /// Seconds to wait for the completion service
    #[arg(long, env = "API_TIMEOUT_SECS", default_value_t = 120)]
    pub api_timeout_secs: u64,

    /// Seconds artifacts are kept before being swept (0 keeps them forever)
    #[arg(long, env = "RETENTION_SECS", default_value_t = 600)]
    pub retention_secs: u64,
}

impl ServerConfig {
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            upload_dir: self.upload_dir.clone(),
            latex: ToolCommand::new(&self.latex_program),
            converter: ToolCommand::new(&self.svg_program),
            tool_timeout: Duration::from_secs(self.tool_timeout_secs),
        }
    }

    pub fn openai_settings(&self) -> OpenAiSettings {
        OpenAiSettings {
            api_key: self.api_key.clone().filter(|key| !key.trim().is_empty()),
            api_base: self.api_base.clone(),
            model: self.model.clone(),
            timeout: Duration::from_secs(self.api_timeout_secs),
        }
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::time::Duration;

    use clap::Parser;

    use super::{load_env_file, ServerConfig};

    // Environment variables can leak in from the shell running the tests, so only flags that
    // are passed explicitly are asserted on.
    fn parse(args: &[&str]) -> ServerConfig {
        let argv = std::iter::once("tikzdraw").chain(args.iter().copied());
        ServerConfig::try_parse_from(argv).expect("parse config")
    }

    #[test]
    fn parses_port_and_upload_dir() {
        let config = parse(&["--port", "8080", "--upload-dir", "/tmp/tikz"]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.upload_dir, Path::new("/tmp/tikz"));
    }

    #[test]
    fn parses_short_port_flag() {
        assert_eq!(parse(&["-p", "1234"]).port, 1234);
    }

    #[test]
    fn builds_render_settings() {
        let config = parse(&[
            "--latex-program",
            "lualatex",
            "--svg-program",
            "dvisvgm",
            "--tool-timeout-secs",
            "5",
        ]);
        let settings = config.render_settings();
        assert_eq!(settings.latex.program(), "lualatex");
        assert_eq!(settings.converter.program(), "dvisvgm");
        assert_eq!(settings.tool_timeout, Duration::from_secs(5));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = parse(&["--api-key", "  "]);
        assert_eq!(config.openai_settings().api_key, None);

        let config = parse(&["--api-key", "sk-test", "--model", "gpt-4o-mini"]);
        let settings = config.openai_settings();
        assert_eq!(settings.api_key.as_deref(), Some("sk-test"));
        assert_eq!(settings.model, "gpt-4o-mini");
    }

    #[test]
    fn rejects_invalid_port() {
        ServerConfig::try_parse_from(["tikzdraw", "--port", "70000"]).unwrap_err();
        ServerConfig::try_parse_from(["tikzdraw", "--port", "http"]).unwrap_err();
    }

    #[test]
    fn rejects_unknown_args() {
        ServerConfig::try_parse_from(["tikzdraw", "--nope"]).unwrap_err();
    }

    #[test]
    fn env_file_fills_unset_variables_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "# local settings\nTIKZDRAW_TEST_ENV_FILE_KEY=sk-from-file\nTIKZDRAW_TEST_ENV_FILE_KEPT=from-file\n",
        )
        .expect("write env file");
        std::env::set_var("TIKZDRAW_TEST_ENV_FILE_KEPT", "from-shell");

        assert!(load_env_file(&path).expect("load env file"));
        assert_eq!(
            std::env::var("TIKZDRAW_TEST_ENV_FILE_KEY").as_deref(),
            Ok("sk-from-file")
        );
        assert_eq!(
            std::env::var("TIKZDRAW_TEST_ENV_FILE_KEPT").as_deref(),
            Ok("from-shell")
        );
    }

    #[test]
    fn missing_env_file_is_not_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(!load_env_file(&dir.path().join(".env")).expect("missing file"));
    }
}
