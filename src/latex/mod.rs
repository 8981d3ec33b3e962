// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-tikzdraw-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tikzdraw and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Post-processing of model output into a compilable LaTeX document.
//!
//! Model replies are usually close to a complete document but tend to arrive wrapped in
//! markdown fences or with parts of the preamble missing. [`normalize`] strips the fences and
//! makes sure the four structural markers are present without ever failing.

use std::borrow::Cow;
use std::fmt;

mod patterns;

pub use patterns::strip_code_fences;

/// One of the structural elements every generated document must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    DocumentClass,
    TikzPackage,
    BeginDocument,
    EndDocument,
}

impl Marker {
    pub const ALL: [Marker; 4] = [
        Marker::DocumentClass,
        Marker::TikzPackage,
        Marker::BeginDocument,
        Marker::EndDocument,
    ];

    /// Line inserted when the marker is missing.
    pub fn default_line(self) -> &'static str {
        match self {
            Self::DocumentClass => "\\documentclass[border=2pt]{standalone}",
            Self::TikzPackage => "\\usepackage{tikz}",
            Self::BeginDocument => "\\begin{document}",
            Self::EndDocument => "\\end{document}",
        }
    }

    pub fn is_present_in(self, source: &str) -> bool {
        match self {
            Self::DocumentClass => source.contains("\\documentclass"),
            Self::TikzPackage => patterns::tikz_package_regex().is_match(source),
            Self::BeginDocument => source.contains("\\begin{document}"),
            Self::EndDocument => source.contains("\\end{document}"),
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_line())
    }
}

/// LaTeX source guaranteed to contain every [`Marker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDocument {
    source: String,
    inserted: Vec<Marker>,
}

impl NormalizedDocument {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Markers that were absent from the model output and had to be added.
    pub fn inserted(&self) -> &[Marker] {
        &self.inserted
    }

    pub fn into_source(self) -> String {
        self.source
    }
}

/// Turns raw model text into a document carrying all four markers.
///
/// A missing class declaration is prepended. A missing tikz package goes directly before the
/// original content, or right after the existing `\documentclass` declaration when the model
/// supplied one. Missing `\begin{document}` and `\end{document}` are appended, in that order,
/// so content that lacked a begin marker ends up in front of it. That last placement matches
/// what earlier releases produced and is kept as is.
///
/// Running this on its own output returns it unchanged.
pub fn normalize(raw: &str) -> NormalizedDocument {
    let stripped = strip_code_fences(raw);
    let content = stripped.trim();

    let has_class = Marker::DocumentClass.is_present_in(content);
    let has_package = Marker::TikzPackage.is_present_in(content);

    let mut inserted = Vec::new();
    let mut parts: Vec<Cow<'_, str>> = Vec::with_capacity(3);

    if !has_class {
        inserted.push(Marker::DocumentClass);
        parts.push(Marker::DocumentClass.default_line().into());
    }

    match (has_package, has_class) {
        (true, _) => parts.push(content.into()),
        (false, false) => {
            inserted.push(Marker::TikzPackage);
            parts.push(Marker::TikzPackage.default_line().into());
            parts.push(content.into());
        }
        (false, true) => {
            inserted.push(Marker::TikzPackage);
            let line = Marker::TikzPackage.default_line();
            parts.push(insert_after_document_class(content, line).into());
        }
    }

    let mut source = parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    for marker in [Marker::BeginDocument, Marker::EndDocument] {
        if !marker.is_present_in(&source) {
            inserted.push(marker);
            if !source.is_empty() {
                source.push('\n');
            }
            source.push_str(marker.default_line());
        }
    }

    NormalizedDocument { source, inserted }
}

fn insert_after_document_class(content: &str, line: &str) -> String {
    let at = patterns::document_class_end(content).unwrap_or(content.len());

    let mut out = String::with_capacity(content.len() + line.len() + 1);
    out.push_str(&content[..at]);
    out.push('\n');
    out.push_str(line);
    if at < content.len() && !content[at..].starts_with('\n') {
        out.push('\n');
    }
    out.push_str(&content[at..]);
    out
}
