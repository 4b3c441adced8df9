//! Common test utilities for the manga-batcher crate.
//!
//! Provides functions for setting up isolated test directories, laying out
//! fake downloader output, and fake collaborators for pipeline runs.

use async_trait::async_trait;
use manga_batcher::error::{Error, Result};
use manga_batcher::prelude::*;
use manga_batcher::prompt::Prompter;
use rand::{Rng, distributions::Alphanumeric};
use std::collections::HashSet;
use std::sync::Mutex;
use tokio::fs;

#[allow(dead_code)]
pub const TEST_TMP_DIR: &str = "tests/tmp";
#[allow(dead_code)]
pub const SITE_DIR: &str = "weebcentral";
#[allow(dead_code)]
pub const MANGA_NAME: &str = "Series";

/// Paths used by a single test.
#[allow(dead_code)]
pub struct TestDirs {
    pub test_dir: PathBuf,
    pub download_root: PathBuf,
    pub output_root: PathBuf,
    pub converter_path: PathBuf,
}

/// Creates a unique, empty test directory with a dummy converter file in it.
/// The download and output roots are not created.
#[allow(dead_code)]
pub async fn setup_test_dirs(sub_path: &str) -> TestDirs {
    let rand_string: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    let unique_sub_path = format!("{}-{}", sub_path, rand_string);
    let test_dir = PathBuf::from(TEST_TMP_DIR).join(unique_sub_path);
    if test_dir.exists() {
        fs::remove_dir_all(&test_dir).await.unwrap();
    }
    fs::create_dir_all(&test_dir).await.unwrap();

    let converter_path = test_dir.join("kcc-c2e");
    fs::write(&converter_path, b"").await.unwrap();

    TestDirs {
        download_root: test_dir.join("manga_downloads"),
        output_root: test_dir.join("epubs"),
        converter_path,
        test_dir,
    }
}

/// Creates one directory per name under `parent`, each holding one page.
#[allow(dead_code)]
pub async fn create_chapter_dirs(parent: &Path, names: &[String]) -> Result<()> {
    for name in names {
        let chapter = parent.join(name);
        fs::create_dir_all(&chapter).await?;
        fs::write(chapter.join("001.jpg"), b"page").await?;
    }
    Ok(())
}

/// `c1`..=`cN`.
#[allow(dead_code)]
pub fn numbered_chapters(count: usize) -> Vec<String> {
    (1..=count).map(|n| format!("c{n}")).collect()
}

/// Names of the subdirectories of `dir`, sorted.
#[allow(dead_code)]
pub async fn dir_names(dir: &Path) -> Vec<String> {
    let mut names = Vec::new();
    let mut entries = fs::read_dir(dir).await.unwrap();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    names.sort();
    names
}

/// Pipeline configuration pointing at the test directories.
#[allow(dead_code)]
pub fn config_for(dirs: &TestDirs) -> PipelineConfigBuilder {
    let mut builder = PipelineConfig::builder();
    builder
        .manga_url("https://weebcentral.com/series/test")
        .converter_path(dirs.converter_path.clone())
        .download_root(dirs.download_root.clone())
        .output_root(dirs.output_root.clone())
        .site_dir(SITE_DIR);
    builder
}

/// Downloader stand-in that lays out chapter folders like gallery-dl does.
#[allow(dead_code)]
pub struct FakeSource {
    pub chapters: Vec<String>,
    pub fail: bool,
    pub calls: Mutex<usize>,
}

#[allow(dead_code)]
impl FakeSource {
    pub fn with_chapters(chapters: Vec<String>) -> Self {
        Self {
            chapters,
            fail: false,
            calls: Mutex::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            chapters: Vec::new(),
            fail: true,
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ChapterSource for FakeSource {
    async fn download(&self, url: &str, destination: &Path) -> Result<()> {
        *self.calls.lock().unwrap() += 1;
        if self.fail {
            return Err(Error::DownloadFailed {
                command: format!("gallery-dl -d {} {}", destination.display(), url),
                exit_code: Some(1),
                stderr: "unsupported URL".to_string(),
            });
        }
        let manga_dir = destination.join(SITE_DIR).join(MANGA_NAME);
        fs::create_dir_all(&manga_dir).await?;
        create_chapter_dirs(&manga_dir, &self.chapters).await
    }
}

/// Converter stand-in that writes `<batch>.epub` and fails on chosen batches.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeConverter {
    pub failing_batches: HashSet<String>,
    pub converted: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeConverter {
    pub fn failing_on(batches: &[&str]) -> Self {
        Self {
            failing_batches: batches.iter().map(|b| b.to_string()).collect(),
            converted: Mutex::new(Vec::new()),
        }
    }

    pub fn invocations(&self) -> Vec<String> {
        self.converted.lock().unwrap().clone()
    }
}

#[async_trait]
impl BatchConverter for FakeConverter {
    async fn convert(&self, batch: &Batch, output_dir: &Path) -> ConversionOutcome {
        self.converted.lock().unwrap().push(batch.name.clone());
        if self.failing_batches.contains(&batch.name) {
            return ConversionOutcome::Failed {
                batch: batch.name.clone(),
                exit_code: Some(2),
                diagnostics: "corrupt image".to_string(),
            };
        }
        let target = output_dir.join(format!("{}.epub", batch.name));
        match fs::write(&target, b"epub").await {
            Ok(()) => ConversionOutcome::Converted {
                batch: batch.name.clone(),
            },
            Err(e) => ConversionOutcome::Failed {
                batch: batch.name.clone(),
                exit_code: None,
                diagnostics: e.to_string(),
            },
        }
    }
}

/// Prompter returning a fixed answer and remembering whether it was asked.
#[allow(dead_code)]
pub struct ScriptedPrompter {
    pub answer: Option<bool>,
    pub asked: bool,
}

#[allow(dead_code)]
impl ScriptedPrompter {
    pub fn answering(answer: Option<bool>) -> Self {
        Self {
            answer,
            asked: false,
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, _question: &str) -> Result<Option<bool>> {
        self.asked = true;
        Ok(self.answer)
    }
}
