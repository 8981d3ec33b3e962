// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-tikzdraw-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tikzdraw and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Prompt construction for diagram requests.
//!
//! The user's description is embedded verbatim; no escaping is applied.

/// System message sent with every completion request.
pub const SYSTEM_INSTRUCTION: &str = "You are an expert at writing LaTeX code using the tikz library. Only reply with the requested code, with no commentary.";

const PROMPT_PREFIX: &str = "Write me a LaTeX file that uses the tikz library, and create code that would precisely and accurately create the mathematical diagram described here: ";

/// Sentence appended to every prompt naming the document markers the model must emit.
pub const MARKER_REQUIREMENT: &str = "The document must include \\documentclass, \\usepackage{tikz}, \\begin{document} and \\end{document}.";

/// A single form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagramRequest {
    description: String,
}

impl DiagramRequest {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

pub fn build_prompt(request: &DiagramRequest) -> String {
    let capacity =
        PROMPT_PREFIX.len() + request.description.len() + 2 + MARKER_REQUIREMENT.len();
    let mut prompt = String::with_capacity(capacity);
    prompt.push_str(PROMPT_PREFIX);
    prompt.push_str(&request.description);
    prompt.push_str("\n\n");
    prompt.push_str(MARKER_REQUIREMENT);
    prompt
}
