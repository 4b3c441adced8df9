//! External process invocation.
//!
//! Two tools are driven from here, each with its own failure policy:
//!
//! - the downloader ([`ChapterSource`]) runs once per pipeline and any failure
//!   aborts the run, so it reports through `Result`;
//! - the converter ([`BatchConverter`]) runs once per batch and a failure only
//!   loses that batch, so it reports a [`ConversionOutcome`] instead.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use log::{debug, info};
use tokio::process::Command;

use crate::error::{Error, Result};
use crate::types::{Batch, ChapterRange, ConversionOutcome};

/// Environment override that silences wine's own diagnostics.
pub const WINE_DEBUG_ENV: (&str, &str) = ("WINEDEBUG", "-all");

/// Fetches a manga's chapters into a destination directory.
#[async_trait]
pub trait ChapterSource: Send + Sync {
    /// Downloads everything for `url` into `destination`.
    ///
    /// Any error is fatal to the pipeline.
    async fn download(&self, url: &str, destination: &Path) -> Result<()>;
}

/// Converts one batch folder into an ebook inside `output_dir`.
#[async_trait]
pub trait BatchConverter: Send + Sync {
    /// Converts `batch`. Never fails the pipeline: problems are reported as
    /// [`ConversionOutcome::Failed`].
    async fn convert(&self, batch: &Batch, output_dir: &Path) -> ConversionOutcome;
}

/// Renders a command line for progress output.
pub fn describe_command<S: AsRef<OsStr>>(program: &Path, args: &[S]) -> String {
    std::iter::once(program.as_os_str())
        .chain(args.iter().map(AsRef::as_ref))
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

/// gallery-dl driven as a [`ChapterSource`].
#[derive(Debug, Clone)]
pub struct GalleryDl {
    program: PathBuf,
    chapter_range: ChapterRange,
}

impl GalleryDl {
    pub fn new(program: PathBuf, chapter_range: ChapterRange) -> Self {
        Self {
            program,
            chapter_range,
        }
    }

    /// Arguments passed to the downloader, URL last.
    pub fn command_args(&self, url: &str, destination: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-d".into(), destination.as_os_str().to_owned()];
        if let Some(range) = self.chapter_range.to_argument() {
            args.push("--chapter-range".into());
            args.push(range.into());
        }
        args.push(url.into());
        args
    }
}

#[async_trait]
impl ChapterSource for GalleryDl {
    async fn download(&self, url: &str, destination: &Path) -> Result<()> {
        let args = self.command_args(url, destination);
        let command_line = describe_command(&self.program, &args);

        if self.chapter_range.is_unbounded() {
            info!("Attempting to download all chapters.");
        } else {
            info!("Attempting to download {}.", self.chapter_range);
        }
        info!("Running: {}", command_line);

        // Progress goes straight to the terminal; stderr is kept for the error report.
        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                Error::MissingDependency(format!(
                    "Command '{}' could not be started: {}",
                    self.program.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(Error::DownloadFailed {
                command: command_line,
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(())
    }
}

/// Kindle Comic Converter driven as a [`BatchConverter`].
#[derive(Debug, Clone)]
pub struct Kcc {
    program: PathBuf,
    /// Compatibility layer to run the converter under, if it needs one.
    wine: Option<PathBuf>,
    width: u32,
    height: u32,
}

impl Kcc {
    pub fn new(program: PathBuf, wine: Option<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            program,
            wine,
            width,
            height,
        }
    }

    /// Program actually spawned and its full argument list.
    ///
    /// Under wine the converter path becomes the first argument.
    pub fn command_line(&self, batch_dir: &Path, output_dir: &Path) -> (PathBuf, Vec<OsString>) {
        let mut args: Vec<OsString> = vec![
            "--manga-style".into(),
            "--profile=OTHER".into(),
            "--splitter=2".into(),
            "--cropping=2".into(),
            format!("--customwidth={}", self.width).into(),
            format!("--customheight={}", self.height).into(),
            "--format=EPUB".into(),
            "--stretch".into(),
            "-o".into(),
            output_dir.as_os_str().to_owned(),
            batch_dir.as_os_str().to_owned(),
        ];

        match &self.wine {
            Some(wine) => {
                args.insert(0, self.program.as_os_str().to_owned());
                (wine.clone(), args)
            }
            None => (self.program.clone(), args),
        }
    }
}

#[async_trait]
impl BatchConverter for Kcc {
    async fn convert(&self, batch: &Batch, output_dir: &Path) -> ConversionOutcome {
        let batch_dir = match tokio::fs::canonicalize(&batch.path).await {
            Ok(path) => path,
            Err(e) => {
                return ConversionOutcome::Failed {
                    batch: batch.name.clone(),
                    exit_code: None,
                    diagnostics: format!("Batch folder {:?} is not accessible: {}", batch.path, e),
                };
            }
        };

        let (program, args) = self.command_line(&batch_dir, output_dir);
        debug!("Running: {}", describe_command(&program, &args));

        let mut command = Command::new(&program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        if self.wine.is_some() {
            command.env(WINE_DEBUG_ENV.0, WINE_DEBUG_ENV.1);
        }

        match command.output().await {
            Ok(output) if output.status.success() => ConversionOutcome::Converted {
                batch: batch.name.clone(),
            },
            Ok(output) => ConversionOutcome::Failed {
                batch: batch.name.clone(),
                exit_code: output.status.code(),
                diagnostics: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            },
            Err(e) => ConversionOutcome::Failed {
                batch: batch.name.clone(),
                exit_code: None,
                diagnostics: format!("Command '{}' could not be started: {}", program.display(), e),
            },
        }
    }
}
