//! Bounded log of recently finalized recordings with FIFO eviction.

use std::{collections::VecDeque, fs, path::PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, instrument, warn};

/// How many finalized recordings are kept on disk.
pub const HISTORY_CAPACITY: usize = 3;

/// A finalized recording on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingFile {
    /// Absolute path of the WAV file.
    pub path: PathBuf,
    /// When the recording was finalized.
    pub created_at: DateTime<Local>,
}

/// Write-append, capacity-bounded log of recording files.
///
/// Strictly FIFO: one eviction per insertion, oldest first, and the
/// exposed length never exceeds the capacity — the oldest entry is
/// evicted (and its file deleted) before the new one is appended.
pub struct RecordingHistory {
    entries: VecDeque<RecordingFile>,
    capacity: usize,
}

impl RecordingHistory {
    /// Create an empty history bounded at `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a finalized recording, evicting the oldest if at capacity.
    ///
    /// Deletion failures are logged and do not block the eviction: the
    /// entry leaves the history either way, so the log stays bounded even
    /// when the filesystem misbehaves.
    #[instrument(skip(self, file))]
    pub fn record(&mut self, file: RecordingFile) {
        if self.entries.len() >= self.capacity
            && let Some(oldest) = self.entries.pop_front()
        {
            match fs::remove_file(&oldest.path) {
                Ok(()) => debug!(path = ?oldest.path, "Evicted oldest recording"),
                Err(e) => warn!(path = ?oldest.path, error = %e, "Failed to delete evicted recording"),
            }
        }

        debug!(path = ?file.path, "Recording registered");
        self.entries.push_back(file);
    }

    /// Number of recordings currently tracked.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history holds no recordings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent recording, if any.
    pub fn latest(&self) -> Option<&RecordingFile> {
        self.entries.back()
    }
}
