//! Chapter discovery and ordering.
//!
//! The downloader lays its results out as
//! `download_root/<site>/<manga>/<chapter>/...`. This module finds the manga
//! directory inside that tree and lists its chapter directories in reading
//! order.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use tokio::fs::{ReadDir, read_dir};

use crate::chapter::is_chapter_dir_name;
use crate::error::{Error, Result};
use crate::path_utils::{get_file_name_lossy, is_hidden_file};
use crate::types::ChapterDir;

/// Locates and lists chapter directories in a finished download.
#[derive(Debug)]
pub struct Collector<'a> {
    download_root: &'a Path,
    site_dir: &'a str,
}

impl<'a> Collector<'a> {
    /// Creates a new Collector for the given download root.
    ///
    /// # Arguments
    ///
    /// * `download_root` - Directory the downloader wrote into
    /// * `site_dir` - Name of the per-site directory the downloader creates (e.g. "weebcentral")
    pub fn new(download_root: &'a Path, site_dir: &'a str) -> Self {
        Self {
            download_root,
            site_dir,
        }
    }

    /// Directory expected to hold one subdirectory per manga title.
    pub fn site_root(&self) -> PathBuf {
        self.download_root.join(self.site_dir)
    }

    /// Finds the manga directory under the site root.
    ///
    /// When several titles are present the lexicographically first one wins,
    /// so the choice does not depend on directory listing order.
    ///
    /// # Returns
    ///
    /// * `Result<PathBuf>` - Path of the manga directory
    pub async fn locate_manga_dir(&self) -> Result<PathBuf> {
        let site_root = self.site_root();
        if !site_root.is_dir() {
            return Err(Error::UnexpectedLayout(
                site_root,
                "expected download directory not found".to_string(),
            ));
        }

        let mut candidates = Self::collect_dirs(&site_root).await?;
        candidates.sort();

        if candidates.len() > 1 {
            warn!(
                "Found {} title directories in {:?}, using the first: {:?}",
                candidates.len(),
                site_root,
                candidates[0]
            );
        }

        candidates.into_iter().next().ok_or_else(|| {
            Error::UnexpectedLayout(
                site_root,
                "could not find the manga directory. No chapters downloaded or unexpected structure"
                    .to_string(),
            )
        })
    }

    /// Lists the chapter directories of a manga, sorted by chapter key.
    ///
    /// Only directories whose name starts with `c` or `C` count. Chapters with
    /// equal keys are ordered by name. An empty result is not an error.
    ///
    /// # Arguments
    ///
    /// * `manga_dir` - Directory returned by [`Collector::locate_manga_dir`]
    pub async fn collect_chapters(&self, manga_dir: &Path) -> Result<Vec<ChapterDir>> {
        let mut chapters: Vec<ChapterDir> = Self::collect_dirs(manga_dir)
            .await?
            .into_iter()
            .filter(|path| is_chapter_dir_name(&get_file_name_lossy(path)))
            .map(ChapterDir::from_path)
            .collect();

        chapters.sort_by(|a, b| a.key.cmp(&b.key).then_with(|| a.name.cmp(&b.name)));
        debug!("Collected {} chapter directories in {:?}", chapters.len(), manga_dir);
        Ok(chapters)
    }

    /// Name of the manga, taken from its directory.
    pub fn manga_name(manga_dir: &Path) -> String {
        get_file_name_lossy(manga_dir)
    }

    /// Collects the non-hidden subdirectories of `directory`.
    pub async fn collect_dirs(directory: &Path) -> Result<Vec<PathBuf>> {
        let mut entries: Vec<PathBuf> = Vec::new();
        let mut paths: ReadDir = read_dir(directory).await?;

        while let Some(entry) = paths.next_entry().await? {
            let path = entry.path();
            if is_hidden_file(&path) {
                continue;
            }
            if path.is_dir() {
                entries.push(path);
            }
        }

        Ok(entries)
    }
}
