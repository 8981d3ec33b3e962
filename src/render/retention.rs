// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-tikzdraw-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tikzdraw and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Time-based cleanup of rendered artifacts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;

const MIN_SWEEP_PERIOD: Duration = Duration::from_secs(1);

/// Deletes regular files in `dir` last modified at least `retention` before `now`.
///
/// Subdirectories and symlinks are left alone. A missing directory counts as empty.
pub fn sweep_expired(dir: &Path, retention: Duration, now: SystemTime) -> io::Result<usize> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err),
    };

    let mut removed = 0;
    for entry in entries {
        let entry = entry?;
        let metadata = match fs::symlink_metadata(entry.path()) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => return Err(err),
        };
        if !metadata.file_type().is_file() {
            continue;
        }

        let age = now.duration_since(metadata.modified()?).unwrap_or_default();
        if age < retention {
            continue;
        }

        match fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }
    }

    Ok(removed)
}

/// Starts a background task sweeping `dir` periodically. A zero `retention` disables it.
pub fn spawn_sweeper(dir: PathBuf, retention: Duration) -> Option<JoinHandle<()>> {
    if retention.is_zero() {
        return None;
    }

    let period = (retention / 4).max(MIN_SWEEP_PERIOD);
    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;

            let sweep_dir = dir.clone();
            let swept = tokio::task::spawn_blocking(move || {
                sweep_expired(&sweep_dir, retention, SystemTime::now())
            })
            .await;

            match swept {
                Ok(Ok(0)) => {}
                Ok(Ok(removed)) => tracing::debug!(removed, dir = ?dir, "swept expired artifacts"),
                Ok(Err(err)) => tracing::warn!(error = %err, dir = ?dir, "artifact sweep failed"),
                Err(err) => tracing::warn!(error = %err, "artifact sweep task panicked"),
            }
        }
    }))
}
