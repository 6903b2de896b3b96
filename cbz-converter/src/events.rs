use std::fmt::Display;

use camino::Utf8PathBuf;

use crate::{format::SUPPORTED_EXTENSIONS, ErrorKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub succeeded: usize,
    pub failed: usize,
}

impl Summary {
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} succeeded, {} failed", self.succeeded, self.failed)
    }
}

/// Progress of a run, each event renders as one human readable line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Scanned {
        count: usize,
    },
    NothingToDo,
    FileStarted {
        index: usize,
        total: usize,
        name: String,
    },
    Staged {
        name: String,
        dir: Utf8PathBuf,
    },
    Extracted {
        name: String,
        count: usize,
    },
    Packed {
        name: String,
        output: Utf8PathBuf,
    },
    FileFailed {
        name: String,
        kind: ErrorKind,
        reason: String,
    },
    Finished(Summary),
    RunFailed(String),
}

impl Event {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::FileFailed { .. } | Self::RunFailed(_))
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scanned { count } => write!(f, "found {count} file(s) to convert"),
            Self::NothingToDo => write!(
                f,
                "no supported file found, supported formats: {}",
                SUPPORTED_EXTENSIONS.join(", ")
            ),
            Self::FileStarted { index, total, name } => {
                write!(f, "[{index}/{total}] processing {name}")
            }
            Self::Staged { name, dir } => write!(f, "{name} moved to {dir}"),
            Self::Extracted { name, count } => {
                write!(f, "{count} image(s) extracted from {name}")
            }
            Self::Packed { name, output } => write!(f, "{name} converted to {output}"),
            Self::FileFailed { name, kind, reason } => {
                write!(f, "failed to convert {name} ({kind}): {reason}")
            }
            Self::Finished(summary) => write!(
                f,
                "conversion finished: {} file(s), {summary}",
                summary.total()
            ),
            Self::RunFailed(reason) => write!(f, "run failed: {reason}"),
        }
    }
}
