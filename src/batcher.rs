//! Batch partitioning.
//!
//! Splits the ordered chapter list into contiguous groups of at most
//! `batch_size` chapters and moves each group into its own folder named
//! `{manga}_{first}_{last}`. Moving is destructive: once a chapter has been
//! moved, its old location is gone and the operation cannot be re-run.

use std::collections::HashSet;
use std::ops::Range;
use std::path::Path;

use log::{debug, info};
use tokio::fs;

use crate::chapter::chapter_number;
use crate::error::{Error, Result};
use crate::types::{Batch, ChapterDir};

/// Index ranges of each batch over a list of `len` ordered chapters.
///
/// Group `k` covers `[k * batch_size, min((k + 1) * batch_size, len))`, so
/// there are `ceil(len / batch_size)` groups and only the last may be short.
pub fn partition(len: usize, batch_size: usize) -> Result<Vec<Range<usize>>> {
    if batch_size == 0 {
        return Err(Error::InvalidConfig(
            "Batch size must be a positive number.".to_string(),
        ));
    }

    Ok((0..len)
        .step_by(batch_size)
        .map(|start| start..(start + batch_size).min(len))
        .collect())
}

/// Builds the folder name of a batch from its first and last chapter names.
///
/// The numerals are copied literally, so a batch starting at `c12.5` is named
/// `{manga}_12.5_...` even though it sorts as chapter 12.
pub fn batch_folder_name(manga_name: &str, first: &str, last: &str) -> Result<String> {
    let (first_number, last_number) = range_numbers(first, last)?;
    Ok(format!("{manga_name}_{first_number}_{last_number}"))
}

fn range_numbers<'n>(first: &'n str, last: &'n str) -> Result<(&'n str, &'n str)> {
    let first_number = chapter_number(first)
        .ok_or_else(|| Error::UnparsableChapterName(first.to_string()))?;
    let last_number =
        chapter_number(last).ok_or_else(|| Error::UnparsableChapterName(last.to_string()))?;
    Ok((first_number, last_number))
}

/// Materializes batches inside a manga directory.
#[derive(Debug)]
pub struct Batcher<'a> {
    manga_dir: &'a Path,
    manga_name: &'a str,
    batch_size: usize,
}

impl<'a> Batcher<'a> {
    pub fn new(manga_dir: &'a Path, manga_name: &'a str, batch_size: usize) -> Self {
        Self {
            manga_dir,
            manga_name,
            batch_size,
        }
    }

    /// Creates the batch folders and moves every chapter into its batch.
    ///
    /// Takes ownership of `chapters`: each [`ChapterDir`] is consumed as its
    /// directory is moved. All batch names are computed before anything is
    /// touched on disk, so an unparsable chapter name or two batches sharing
    /// a folder name fail without moving anything.
    ///
    /// # Arguments
    ///
    /// * `chapters` - Chapters in reading order, as returned by the collector
    ///
    /// # Returns
    ///
    /// * `Result<Vec<Batch>>` - Created batches, in order
    pub async fn materialize(&self, chapters: Vec<ChapterDir>) -> Result<Vec<Batch>> {
        let ranges = partition(chapters.len(), self.batch_size)?;

        let mut plan: Vec<Batch> = Vec::with_capacity(ranges.len());
        for range in &ranges {
            let first = &chapters[range.start].name;
            let last = &chapters[range.end - 1].name;
            let (first_number, last_number) = range_numbers(first, last)?;
            let name = batch_folder_name(self.manga_name, first, last)?;
            plan.push(Batch {
                path: self.manga_dir.join(&name),
                name,
                first_number: first_number.to_string(),
                last_number: last_number.to_string(),
                chapters: Vec::with_capacity(range.len()),
            });
        }

        let mut seen = HashSet::with_capacity(plan.len());
        if let Some(duplicate) = plan.iter().find(|batch| !seen.insert(batch.name.as_str())) {
            return Err(Error::DuplicateBatchName(duplicate.name.clone()));
        }

        let mut remaining = chapters.into_iter();
        let mut batches = Vec::with_capacity(plan.len());

        for (range, mut batch) in ranges.into_iter().zip(plan) {
            fs::create_dir_all(&batch.path).await?;
            info!("Creating batch folder: {}", batch.name);

            for chapter in remaining.by_ref().take(range.len()) {
                let moved = Self::move_chapter(chapter, &batch.path, &batch.name).await?;
                batch.chapters.push(moved);
            }
            batches.push(batch);
        }

        Ok(batches)
    }

    /// Moves one chapter directory into a batch folder and returns its name.
    async fn move_chapter(
        chapter: ChapterDir,
        batch_path: &Path,
        batch_name: &str,
    ) -> Result<String> {
        let ChapterDir { name, path, .. } = chapter;
        let destination = batch_path.join(&name);
        debug!("  Moving {} to {}/", name, batch_name);
        fs::rename(&path, &destination).await?;
        Ok(name)
    }
}
