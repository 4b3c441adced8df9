use chrono::Utc;
use log::{info, warn};
use std::path::PathBuf;
use tokio::fs;

use crate::batcher::Batcher;
use crate::collector::Collector;
use crate::error::{Error, Result};
use crate::path_utils::{absolute_path, remove_dir_if_exists};
use crate::process::{BatchConverter, ChapterSource, GalleryDl, Kcc};
use crate::prompt::Prompter;
use crate::types::{ChapterRange, ConversionOutcome, PipelineOutcome, PipelineStage, RunReport};

/// Chapters per batch folder when none is given.
pub const DEFAULT_BATCH_SIZE: usize = 20;
/// Converter output width when none is given.
pub const DEFAULT_CUSTOM_WIDTH: u32 = 1264;
/// Converter output height when none is given.
pub const DEFAULT_CUSTOM_HEIGHT: u32 = 1680;
/// Transient directory the downloader writes into.
pub const DEFAULT_DOWNLOAD_DIR: &str = "./manga_downloads";
/// Persistent directory receiving the EPUB files.
pub const DEFAULT_OUTPUT_DIR: &str = "./epubs";
/// Per-site directory the downloader creates under the download root.
pub const DEFAULT_SITE_DIR: &str = "weebcentral";

/// Configuration of one pipeline run, built declaratively with the builder pattern.
///
/// A run downloads a manga with the external downloader, regroups its chapter
/// directories into batches of [`batch_size`](PipelineConfig::batch_size)
/// chapters, converts every batch to EPUB and finally removes the download
/// root. Entry points:
///
/// - [`run`](PipelineConfig::run): resolves the real tools from `PATH` and runs everything
/// - [`run_with`](PipelineConfig::run_with): runs with caller-supplied downloader and converter
///
/// ```rust,no_run
/// # use manga_batcher::prelude::*;
/// # #[tokio::main]
/// # async fn main() -> manga_batcher::error::Result<()> {
/// let config = PipelineConfig::builder()
///     .manga_url("https://weebcentral.com/series/example")
///     .converter_path(PathBuf::from("/opt/kcc/kcc-c2e"))
///     .batch_size(10usize)
///     .build()?;
///
/// match config.run(&mut StdinPrompter).await? {
///     PipelineOutcome::Completed(report) => println!("{} batches", report.batches_created),
///     other => println!("Nothing converted: {:?}", other),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, derive_builder::Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct PipelineConfig {
    /// URL of the manga handed to the downloader.
    pub manga_url: String,

    /// Path to the converter executable. Must be an existing file.
    pub converter_path: PathBuf,

    /// Run the converter under wine.
    #[builder(default = "false")]
    pub use_wine: bool,

    /// Maximum number of chapters per batch folder (and per EPUB).
    #[builder(default = "DEFAULT_BATCH_SIZE")]
    pub batch_size: usize,

    /// Optional chapter bounds forwarded to the downloader.
    #[builder(default)]
    pub chapter_range: ChapterRange,

    /// Converter output width in pixels.
    #[builder(default = "DEFAULT_CUSTOM_WIDTH")]
    pub width: u32,

    /// Converter output height in pixels.
    #[builder(default = "DEFAULT_CUSTOM_HEIGHT")]
    pub height: u32,

    /// Transient download directory, wiped at the start and end of a run.
    #[builder(default = "PathBuf::from(DEFAULT_DOWNLOAD_DIR)")]
    pub download_root: PathBuf,

    /// Directory receiving the EPUB files. Survives the run.
    #[builder(default = "PathBuf::from(DEFAULT_OUTPUT_DIR)")]
    pub output_root: PathBuf,

    /// Directory the downloader creates for the site under `download_root`.
    #[builder(default = "DEFAULT_SITE_DIR.to_string()")]
    pub site_dir: String,

    /// Downloader executable, looked up on `PATH`.
    #[builder(default = "PathBuf::from(\"gallery-dl\")")]
    pub downloader_program: PathBuf,

    /// Compatibility layer executable, looked up on `PATH` when `use_wine` is set.
    #[builder(default = "PathBuf::from(\"wine\")")]
    pub wine_program: PathBuf,

    /// Delete an existing output root without asking.
    #[builder(default = "false")]
    pub assume_yes: bool,
}

/// Executables resolved on `PATH` during preflight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub downloader: PathBuf,
    pub wine: Option<PathBuf>,
}

impl PipelineConfig {
    /// Creates a new builder for configuring `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validates the configuration without touching the file system beyond
    /// checking that the converter exists.
    ///
    /// Runs before anything destructive happens; [`run_with`](Self::run_with)
    /// calls it first.
    pub fn preflight_check(&self) -> Result<&Self> {
        if self.manga_url.trim().is_empty() {
            return Err(Error::InvalidConfig("Manga URL is required.".to_string()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig(
                "Batch size must be a positive number.".to_string(),
            ));
        }
        if self.width == 0 {
            return Err(Error::InvalidConfig(
                "Custom width must be a positive number.".to_string(),
            ));
        }
        if self.height == 0 {
            return Err(Error::InvalidConfig(
                "Custom height must be a positive number.".to_string(),
            ));
        }
        if !self.converter_path.is_file() {
            return Err(Error::MissingDependency(format!(
                "Converter executable not found at {}. Please provide a valid path.",
                self.converter_path.display()
            )));
        }
        Ok(self)
    }

    /// Looks up the downloader and, if requested, wine on `PATH`.
    pub fn resolve_tools(&self) -> Result<Toolchain> {
        let downloader = which::which(&self.downloader_program).map_err(|_| {
            Error::MissingDependency(format!(
                "{} command not found. Please install it.",
                self.downloader_program.display()
            ))
        })?;

        let wine = if self.use_wine {
            let wine = which::which(&self.wine_program).map_err(|_| {
                Error::MissingDependency(format!(
                    "{} command not found. Please install it.",
                    self.wine_program.display()
                ))
            })?;
            Some(wine)
        } else {
            None
        };

        Ok(Toolchain { downloader, wine })
    }

    /// Runs the whole pipeline with gallery-dl and KCC.
    ///
    /// # Returns
    ///
    /// * `Ok(PipelineOutcome)` - The run ended normally, possibly early and possibly
    ///   with some failed batch conversions
    /// * `Err(Error)` - A fatal configuration, dependency, download or layout error
    pub async fn run(&self, prompter: &mut dyn Prompter) -> Result<PipelineOutcome> {
        self.preflight_check()?;
        let tools = self.resolve_tools()?;

        let source = GalleryDl::new(tools.downloader, self.chapter_range.clone());
        let converter = Kcc::new(
            self.converter_path.clone(),
            tools.wine,
            self.width,
            self.height,
        );

        self.run_with(&source, &converter, prompter).await
    }

    /// Runs the pipeline stages in order with the given collaborators.
    ///
    /// `Preflight → Cleanup → Download → Discovery → Batching → Conversion →
    /// FinalCleanup → Done`. Each stage completes before the next starts.
    pub async fn run_with(
        &self,
        source: &dyn ChapterSource,
        converter: &dyn BatchConverter,
        prompter: &mut dyn Prompter,
    ) -> Result<PipelineOutcome> {
        let started_at = Utc::now();

        Self::enter(PipelineStage::Preflight);
        self.preflight_check()?;

        Self::enter(PipelineStage::Cleanup);
        if !self.prepare_workspace(prompter).await? {
            return Ok(PipelineOutcome::CleanupDeclined);
        }
        info!("Cleanup finished.");

        Self::enter(PipelineStage::Download);
        fs::create_dir_all(&self.download_root).await?;
        source.download(&self.manga_url, &self.download_root).await?;
        info!("Download process finished.");

        Self::enter(PipelineStage::Discovery);
        let collector = Collector::new(&self.download_root, &self.site_dir);
        let manga_dir = collector.locate_manga_dir().await?;
        let manga_name = Collector::manga_name(&manga_dir);
        info!("Found manga: {} in {:?}", manga_name, manga_dir);

        let chapters = collector.collect_chapters(&manga_dir).await?;
        if chapters.is_empty() {
            info!(
                "No chapter folders found starting with 'c' in {:?}. No chapters to rearrange.",
                manga_dir
            );
            self.remove_download_root().await?;
            return Ok(PipelineOutcome::NoChapters);
        }
        let total_chapters = chapters.len();
        info!("Found {} chapter folders.", total_chapters);

        Self::enter(PipelineStage::Batching);
        let batches = Batcher::new(&manga_dir, &manga_name, self.batch_size)
            .materialize(chapters)
            .await?;
        if batches.is_empty() {
            info!("No batch folders were created or found to process.");
            self.remove_download_root().await?;
            return Ok(PipelineOutcome::NoBatches);
        }
        info!("Rearranging finished.");

        Self::enter(PipelineStage::Conversion);
        fs::create_dir_all(&self.output_root).await?;
        let output_dir = absolute_path(&self.output_root).await?;
        info!("Found {} batch folders to process.", batches.len());
        info!("EPUB files will be saved to: {:?}", output_dir);

        let mut report = RunReport::new(manga_name, &output_dir, started_at);
        report.total_chapters = total_chapters;
        report.batches_created = batches.len();

        for batch in &batches {
            info!("Processing folder: {}", batch.name);
            let outcome = converter.convert(batch, &output_dir).await;
            match &outcome {
                ConversionOutcome::Converted { .. } => {
                    info!("Finished processing {}.", batch.name)
                }
                ConversionOutcome::Failed {
                    exit_code,
                    diagnostics,
                    ..
                } => {
                    warn!(
                        "Conversion might have failed for {} (exit code {:?}).",
                        batch.name, exit_code
                    );
                    if !diagnostics.is_empty() {
                        warn!("  Converter stderr: {}", diagnostics);
                    }
                }
            }
            report.record(outcome);
        }
        info!("Conversion finished.");

        Self::enter(PipelineStage::FinalCleanup);
        self.remove_download_root().await?;
        report.finished_at = Utc::now();

        Self::enter(PipelineStage::Done);
        info!(
            "Converted {} of {} batches in {}s. EPUBs are in {:?}",
            report.converted.len(),
            report.batches_created,
            report.elapsed().num_seconds(),
            report.output_root
        );
        Ok(PipelineOutcome::Completed(report))
    }

    // --- Private helper methods for pipeline steps ---

    fn enter(stage: PipelineStage) {
        info!("--- Starting {} ---", stage);
    }

    /// Wipes the download root and settles what happens to an existing output root.
    ///
    /// Returns `false` when the user wants to keep the output root, in which
    /// case the run must stop.
    async fn prepare_workspace(&self, prompter: &mut dyn Prompter) -> Result<bool> {
        info!(
            "Removing previous {:?} directory (if it exists)...",
            self.download_root
        );
        remove_dir_if_exists(&self.download_root).await?;

        if !self.output_root.exists() {
            info!(
                "{:?} directory does not exist, no need to remove.",
                self.output_root
            );
            return Ok(true);
        }

        let confirmed = if self.assume_yes {
            true
        } else {
            let question = format!(
                "The directory {} already exists. Do you want to delete it?",
                self.output_root.display()
            );
            match prompter.confirm(&question)? {
                Some(answer) => answer,
                None => return Err(Error::ConfirmationUnavailable(self.output_root.clone())),
            }
        };

        if !confirmed {
            info!("Exiting without cleanup.");
            return Ok(false);
        }

        remove_dir_if_exists(&self.output_root).await?;
        info!("Removed {:?} directory.", self.output_root);
        Ok(true)
    }

    async fn remove_download_root(&self) -> Result<()> {
        info!("Removing {:?} directory...", self.download_root);
        remove_dir_if_exists(&self.download_root).await?;
        Ok(())
    }
}

impl PipelineConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(url) = &self.manga_url {
            if url.trim().is_empty() {
                return Err("Manga URL is required.".to_string());
            }
        }
        if let Some(0) = self.batch_size {
            return Err("Batch size must be a positive number.".to_string());
        }
        if let Some(0) = self.width {
            return Err("Custom width must be a positive number.".to_string());
        }
        if let Some(0) = self.height {
            return Err("Custom height must be a positive number.".to_string());
        }
        Ok(())
    }
}
