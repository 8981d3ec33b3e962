// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-tikzdraw-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tikzdraw and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Bounded invocation of external command-line tools.

use std::ffi::{OsStr, OsString};
use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

const OUTPUT_TAIL_LINES: usize = 20;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("cannot start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("lost track of `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("`{program}` did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },
    #[error("`{program}` exited with {status}")]
    Failed {
        program: String,
        status: ExitStatus,
        output_tail: String,
    },
}

impl ToolError {
    /// Last lines of the tool's combined output, when it ran to completion.
    pub fn output_tail(&self) -> Option<&str> {
        match self {
            Self::Failed { output_tail, .. } if !output_tail.is_empty() => Some(output_tail),
            _ => None,
        }
    }
}

/// A program plus any arguments that precede the per-invocation ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    leading_args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.leading_args.push(arg.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, args: &[&OsStr]) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(windows)]
        {
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        command
    }

    /// Runs the tool to completion, killing it once `timeout` elapses.
    pub async fn run(&self, args: &[&OsStr], timeout: Duration) -> Result<(), ToolError> {
        let child = self.command(args).spawn().map_err(|source| ToolError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        // Dropping the wait future drops the child, and `kill_on_drop` takes it down with it.
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| ToolError::Wait {
                program: self.program.clone(),
                source,
            })?,
            Err(_) => {
                return Err(ToolError::Timeout {
                    program: self.program.clone(),
                    timeout,
                })
            }
        };

        if output.status.success() {
            return Ok(());
        }

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Err(ToolError::Failed {
            program: self.program.clone(),
            status: output.status,
            output_tail: tail_lines(&combined, OUTPUT_TAIL_LINES),
        })
    }
}

fn tail_lines(text: &str, max_lines: usize) -> String {
    let lines = text.trim_end().lines().collect::<Vec<_>>();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}
