//! Core data types shared across the pipeline.
//!
//! - On-disk units of work (`ChapterDir`, `Batch`)
//! - Downloader scoping (`ChapterRange`)
//! - Stage tracking and outcomes (`PipelineStage`, `ConversionOutcome`, `PipelineOutcome`)
//! - The end-of-run summary (`RunReport`)

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::chapter::chapter_key;
use crate::path_utils::get_file_name_lossy;

/// One downloaded chapter directory.
///
/// Not `Clone`: a `ChapterDir` stands for the directory at
/// `path`, and handing it to the [`Batcher`](crate::batcher::Batcher) moves
/// the directory away. Nothing may refer to the old path afterwards.
#[derive(Debug, PartialEq, Eq)]
pub struct ChapterDir {
    pub name: String,
    pub key: u64,
    pub path: PathBuf,
}

impl ChapterDir {
    pub fn from_path(path: PathBuf) -> Self {
        let name = get_file_name_lossy(&path);
        Self {
            key: chapter_key(&name),
            name,
            path,
        }
    }
}

/// A folder holding a contiguous run of chapters, ready for conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Batch {
    pub name: String,
    pub path: PathBuf,
    /// Literal numeral of the first chapter, fraction included ("12.5").
    pub first_number: String,
    /// Literal numeral of the last chapter.
    pub last_number: String,
    /// Member chapter directory names, in order.
    pub chapters: Vec<String>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

/// Optional bounds forwarded to the downloader's `--chapter-range` flag.
///
/// Bounds are kept as the user typed them; the downloader interprets them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChapterRange {
    pub min: Option<String>,
    pub max: Option<String>,
}

impl ChapterRange {
    /// Blank bounds count as absent.
    pub fn new(min: Option<String>, max: Option<String>) -> Self {
        let non_blank = |bound: Option<String>| bound.filter(|b| !b.trim().is_empty());
        Self {
            min: non_blank(min),
            max: non_blank(max),
        }
    }

    /// Renders `start-end`, `start-` or `-end`; `None` when unbounded.
    pub fn to_argument(&self) -> Option<String> {
        match (self.min.as_deref(), self.max.as_deref()) {
            (Some(min), Some(max)) => Some(format!("{min}-{max}")),
            (Some(min), None) => Some(format!("{min}-")),
            (None, Some(max)) => Some(format!("-{max}")),
            (None, None) => None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

impl fmt::Display for ChapterRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min.as_deref(), self.max.as_deref()) {
            (Some(min), Some(max)) => write!(f, "chapters from {min} to {max}"),
            (Some(min), None) => write!(f, "chapters from {min} onwards"),
            (None, Some(max)) => write!(f, "chapters up to {max}"),
            (None, None) => write!(f, "all chapters"),
        }
    }
}

/// Stages of a run, in the only order they can happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PipelineStage {
    Preflight,
    Cleanup,
    Download,
    Discovery,
    Batching,
    Conversion,
    FinalCleanup,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineStage::Preflight => "Preflight",
            PipelineStage::Cleanup => "Cleanup",
            PipelineStage::Download => "Download",
            PipelineStage::Discovery => "Discovery",
            PipelineStage::Batching => "Batching",
            PipelineStage::Conversion => "Conversion",
            PipelineStage::FinalCleanup => "Final Cleanup",
            PipelineStage::Done => "Done",
        };
        f.write_str(label)
    }
}

/// Result of converting a single batch.
///
/// A failed conversion is an ordinary value, not an error: the pipeline
/// records it and moves on to the next batch.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ConversionOutcome {
    Converted {
        batch: String,
    },
    Failed {
        batch: String,
        exit_code: Option<i32>,
        diagnostics: String,
    },
}

impl ConversionOutcome {
    pub fn batch(&self) -> &str {
        match self {
            ConversionOutcome::Converted { batch } => batch,
            ConversionOutcome::Failed { batch, .. } => batch,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ConversionOutcome::Converted { .. })
    }
}

/// A batch whose conversion failed, as kept in the [`RunReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FailedBatch {
    pub batch: String,
    pub exit_code: Option<i32>,
    pub diagnostics: String,
}

/// Summary of a run that reached final cleanup.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RunReport {
    pub manga_name: String,
    pub total_chapters: usize,
    pub batches_created: usize,
    pub converted: Vec<String>,
    pub failed: Vec<FailedBatch>,
    pub output_root: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub(crate) fn new(manga_name: String, output_root: &Path, started_at: DateTime<Utc>) -> Self {
        Self {
            manga_name,
            total_chapters: 0,
            batches_created: 0,
            converted: Vec::new(),
            failed: Vec::new(),
            output_root: output_root.to_path_buf(),
            started_at,
            finished_at: started_at,
        }
    }

    pub(crate) fn record(&mut self, outcome: ConversionOutcome) {
        match outcome {
            ConversionOutcome::Converted { batch } => self.converted.push(batch),
            ConversionOutcome::Failed {
                batch,
                exit_code,
                diagnostics,
            } => self.failed.push(FailedBatch {
                batch,
                exit_code,
                diagnostics,
            }),
        }
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// How a run ended without a fatal error. Every variant exits with code 0.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PipelineOutcome {
    /// All stages ran; some batch conversions may still have failed.
    Completed(RunReport),
    /// The output root existed and the user chose to keep it.
    CleanupDeclined,
    /// The download produced no chapter directories.
    NoChapters,
    /// Batching produced no batch folders.
    NoBatches,
}

impl PipelineOutcome {
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            PipelineOutcome::Completed(report) => Some(report),
            _ => None,
        }
    }
}
