// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-tikzdraw-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tikzdraw and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

fn compile(pattern: &str) -> Regex {
    // Patterns are literals in this file; a failure here is a programming error.
    Regex::new(pattern).expect("valid built-in regex")
}

fn code_fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"```[A-Za-z0-9_+-]*"))
}

pub(super) fn tikz_package_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Matches `\usepackage{tikz}`, `\usepackage[opts]{tikz}` and package lists such as
    // `{amsmath, tikz}`, but not `tikz-cd` on its own.
    RE.get_or_init(|| {
        compile(r"\\usepackage\s*(?:\[[^\]]*\])?\s*\{(?:[^}]*[\s,])?tikz(?:[\s,][^}]*)?\}")
    })
}

fn document_class_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"\\documentclass\s*(?:\[[^\]]*\])?\s*\{[^}]*\}"))
}

/// Removes markdown code fences from model output, together with any info string such as
/// `latex`, `tex` or `tikz` following the opening backticks.
pub fn strip_code_fences(raw: &str) -> Cow<'_, str> {
    code_fence_regex().replace_all(raw, "")
}

/// Byte offset just past the `\documentclass[...]{...}` declaration.
///
/// Falls back to the end of the line carrying `\documentclass` when the declaration is
/// malformed.
pub(super) fn document_class_end(content: &str) -> Option<usize> {
    if let Some(found) = document_class_regex().find(content) {
        return Some(found.end());
    }

    let start = content.find("\\documentclass")?;
    let end = content[start..]
        .find('\n')
        .map(|offset| start + offset)
        .unwrap_or(content.len());
    Some(end)
}
