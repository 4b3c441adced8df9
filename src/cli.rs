//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use manga_batcher::pipeline::{
    DEFAULT_BATCH_SIZE, DEFAULT_CUSTOM_HEIGHT, DEFAULT_CUSTOM_WIDTH, DEFAULT_DOWNLOAD_DIR,
    DEFAULT_OUTPUT_DIR, DEFAULT_SITE_DIR,
};
use manga_batcher::{ChapterRange, PipelineConfig, PipelineConfigBuilder};

/// Download manga chapters, batch them, and convert to EPUB.
#[derive(Parser, Debug)]
#[command(name = "manga-batcher")]
#[command(author, version, about)]
pub struct Args {
    /// URL of the manga (e.g., https://weebcentral.com/series/...)
    #[arg(short = 'u', long)]
    pub manga_url: String,

    /// Path to the KCC (Kindle Comic Converter) executable
    #[arg(short = 'k', long)]
    pub kcc: PathBuf,

    /// Run KCC under Wine
    #[arg(long)]
    pub wine: bool,

    /// Number of chapters per EPUB
    #[arg(short = 'b', long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Minimum chapter number to download
    #[arg(short = 'm', long)]
    pub min_chapter: Option<String>,

    /// Maximum chapter number to download
    #[arg(short = 'x', long)]
    pub max_chapter: Option<String>,

    /// Custom width for KCC processing
    #[arg(short = 'w', long, default_value_t = DEFAULT_CUSTOM_WIDTH)]
    pub custom_width: u32,

    /// Custom height for KCC processing
    #[arg(short = 'e', long, default_value_t = DEFAULT_CUSTOM_HEIGHT)]
    pub custom_height: u32,

    /// Transient download directory, wiped at start and end of the run
    #[arg(long, default_value = DEFAULT_DOWNLOAD_DIR)]
    pub download_dir: PathBuf,

    /// Directory receiving the EPUB files
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Site directory gallery-dl creates inside the download directory
    #[arg(long, default_value = DEFAULT_SITE_DIR)]
    pub site: String,

    /// Delete an existing output directory without asking
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }

    /// Builder pre-filled from the command line.
    pub fn to_builder(&self) -> PipelineConfigBuilder {
        let mut builder = PipelineConfig::builder();
        builder
            .manga_url(self.manga_url.clone())
            .converter_path(self.kcc.clone())
            .use_wine(self.wine)
            .batch_size(self.batch_size)
            .chapter_range(ChapterRange::new(
                self.min_chapter.clone(),
                self.max_chapter.clone(),
            ))
            .width(self.custom_width)
            .height(self.custom_height)
            .download_root(self.download_dir.clone())
            .output_root(self.output_dir.clone())
            .site_dir(self.site.clone())
            .assume_yes(self.yes);
        builder
    }
}
