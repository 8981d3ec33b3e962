// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-tikzdraw-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tikzdraw and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! tikzdraw: describe a diagram in plain words, get TikZ and an SVG back.
//!
//! A submission flows through [`prompt`] → [`completion`] → [`latex`] → [`render`], tied
//! together by [`generate`] and exposed over HTTP by [`server`].

pub mod completion;
pub mod config;
pub mod generate;
pub mod latex;
pub mod prompt;
pub mod render;
pub mod server;
