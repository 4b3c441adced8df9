//! manga-batcher - Download, batch and convert manga chapters to EPUB
//!
//! This crate drives two external tools: a downloader (gallery-dl) that fetches
//! every chapter of a manga as a folder of images, and a converter (Kindle
//! Comic Converter) that turns a folder of chapters into an EPUB. In between it
//! sorts the downloaded chapters, splits them into fixed-size batches and
//! moves each batch into its own folder, so every EPUB covers a contiguous run
//! of chapters.
//!
//! # Getting Started
//!
//! ```rust,no_run
//! use manga_batcher::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> manga_batcher::error::Result<()> {
//!     let config = PipelineConfig::builder()
//!         .manga_url("https://weebcentral.com/series/example")
//!         .converter_path(PathBuf::from("/opt/kcc/kcc-c2e"))
//!         .batch_size(20usize)
//!         .chapter_range(ChapterRange::new(Some("10".to_string()), None))
//!         .build()?;
//!
//!     match config.run(&mut StdinPrompter).await? {
//!         PipelineOutcome::Completed(report) => {
//!             println!("{} EPUBs written to {:?}", report.converted.len(), report.output_root);
//!             for failed in &report.failed {
//!                 println!("failed: {}", failed.batch);
//!             }
//!         }
//!         other => println!("Nothing to convert: {:?}", other),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The building blocks are usable on their own: [`chapter`] parses chapter
//! numbers, [`collector`] discovers and orders chapter folders, and
//! [`batcher`] partitions and moves them.

pub mod batcher;
pub mod chapter;
pub mod collector;
pub mod error;
pub mod path_utils;
pub mod pipeline;
pub mod process;
pub mod prompt;
pub mod types;

pub use pipeline::{PipelineConfig, PipelineConfigBuilder, Toolchain};

pub use types::{
    Batch, ChapterDir, ChapterRange, ConversionOutcome, FailedBatch, PipelineOutcome,
    PipelineStage, RunReport,
};

/// Prelude module for convenient imports.
///
/// Re-exports the types needed to configure and run a pipeline with a single
/// `use manga_batcher::prelude::*;` statement.
pub mod prelude {
    pub use super::{
        Batch, ChapterDir, ChapterRange, ConversionOutcome, FailedBatch, PipelineConfig,
        PipelineConfigBuilder, PipelineOutcome, PipelineStage, RunReport, Toolchain, error,
        types,
    };
    pub use crate::batcher::Batcher;
    pub use crate::collector::Collector;
    pub use crate::process::{BatchConverter, ChapterSource, GalleryDl, Kcc};
    pub use crate::prompt::{Prompter, StdinPrompter};
    pub use std::path::{Path, PathBuf};
}
