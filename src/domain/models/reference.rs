use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default name of the reference corpus file.
pub const DEFAULT_REFERENCE_FILE: &str = "reason_final.txt";

/// Immutable reference corpus together with the path it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceText {
    path: PathBuf,
    content: String,
}

impl ReferenceText {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Outcome of reading the reference corpus. Loading never fails outright;
/// an unreadable file is reported here and the caller decides what to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceLoad {
    Loaded(ReferenceText),
    Unavailable { path: PathBuf, reason: String },
}

impl ReferenceLoad {
    /// The loaded content, or the empty string when unavailable.
    pub fn text(&self) -> &str {
        match self {
            ReferenceLoad::Loaded(reference) => reference.content(),
            ReferenceLoad::Unavailable { .. } => "",
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ReferenceLoad::Loaded(_))
    }

    /// True when the model will see no usable reference at all.
    pub fn is_degraded(&self) -> bool {
        match self {
            ReferenceLoad::Loaded(reference) => reference.is_empty(),
            ReferenceLoad::Unavailable { .. } => true,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ReferenceLoad::Loaded(_) => None,
            ReferenceLoad::Unavailable { reason, .. } => Some(reason),
        }
    }
}

/// When the reference file is (re)read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferencePolicy {
    /// Re-read on every turn, so edits apply without a restart.
    #[default]
    PerRequest,
    /// Read once when the source is created.
    Startup,
}

impl ReferencePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferencePolicy::PerRequest => "per-request",
            ReferencePolicy::Startup => "startup",
        }
    }
}

impl std::fmt::Display for ReferencePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
