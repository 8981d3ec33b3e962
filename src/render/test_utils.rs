// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-tikzdraw-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tikzdraw and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Shell stand-ins for pdflatex and pdf2svg.

use std::path::Path;
use std::time::Duration;

use super::{RenderSettings, ToolCommand};

/// Writes `<output-dir>/<stem>.pdf` the way pdflatex does with `-output-directory`.
pub(crate) const COMPILER_OK: &str = r#"
for last; do :; done
out_dir=.
while [ $# -gt 0 ]; do
  if [ "$1" = "-output-directory" ]; then out_dir="$2"; fi
  shift
done
stem=$(basename "$last" .tex)
printf 'stub pdf' > "$out_dir/$stem.pdf"
"#;

pub(crate) const COMPILER_FAIL: &str =
    "printf '%s\\n' '! LaTeX Error: Missing \\begin{document}.'; exit 1";

pub(crate) const CONVERTER_OK: &str = r#"
[ -f "$1" ] || { echo "no pdf at $1" >&2; exit 1; }
printf '<svg xmlns="http://www.w3.org/2000/svg"/>' > "$2"
"#;

pub(crate) const CONVERTER_SILENT: &str = "exit 0";

pub(crate) fn sh(script: &str) -> ToolCommand {
    ToolCommand::new("sh").arg("-c").arg(script).arg("stub")
}

pub(crate) fn stub_settings(
    upload_dir: &Path,
    compiler: &str,
    converter: &str,
) -> RenderSettings {
    RenderSettings {
        upload_dir: upload_dir.to_path_buf(),
        latex: sh(compiler),
        converter: sh(converter),
        tool_timeout: Duration::from_secs(10),
    }
}
