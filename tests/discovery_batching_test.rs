//! Tests for chapter discovery and batch materialization on a real file system.

use manga_batcher::chapter::CHAPTER_KEY_SENTINEL;
use manga_batcher::error::{Error, Result};
use manga_batcher::prelude::*;
use tokio::fs;

mod common;
use common::{
    MANGA_NAME, SITE_DIR, create_chapter_dirs, dir_names, numbered_chapters, setup_test_dirs,
};

async fn lay_out_manga(download_root: &Path, chapters: &[String]) -> Result<PathBuf> {
    let manga_dir = download_root.join(SITE_DIR).join(MANGA_NAME);
    fs::create_dir_all(&manga_dir).await?;
    create_chapter_dirs(&manga_dir, chapters).await?;
    Ok(manga_dir)
}

#[tokio::test]
async fn test_locate_manga_dir_requires_site_root() -> Result<()> {
    let dirs = setup_test_dirs("missing_site_root").await;
    fs::create_dir_all(&dirs.download_root).await?;

    let collector = Collector::new(&dirs.download_root, SITE_DIR);
    let err = collector.locate_manga_dir().await.unwrap_err();
    assert!(matches!(err, Error::UnexpectedLayout(_, _)));
    assert!(err.to_string().contains("expected download directory not found"));
    Ok(())
}

#[tokio::test]
async fn test_locate_manga_dir_requires_a_title_directory() -> Result<()> {
    let dirs = setup_test_dirs("empty_site_root").await;
    let site_root = dirs.download_root.join(SITE_DIR);
    fs::create_dir_all(&site_root).await?;
    // Files are not titles
    fs::write(site_root.join("log.txt"), b"").await?;

    let collector = Collector::new(&dirs.download_root, SITE_DIR);
    let err = collector.locate_manga_dir().await.unwrap_err();
    assert!(err.to_string().contains("could not find the manga directory"));
    Ok(())
}

#[tokio::test]
async fn test_locate_manga_dir_picks_lexicographically_first_title() -> Result<()> {
    let dirs = setup_test_dirs("several_titles").await;
    let site_root = dirs.download_root.join(SITE_DIR);
    for title in ["Zeta", "Alpha", "Mid"] {
        fs::create_dir_all(site_root.join(title)).await?;
    }
    fs::create_dir_all(site_root.join(".hidden")).await?;

    let collector = Collector::new(&dirs.download_root, SITE_DIR);
    let manga_dir = collector.locate_manga_dir().await?;
    assert_eq!(Collector::manga_name(&manga_dir), "Alpha");
    Ok(())
}

#[tokio::test]
async fn test_collect_chapters_sorts_by_key() -> Result<()> {
    let dirs = setup_test_dirs("sort_by_key").await;
    let names: Vec<String> = ["c3", "c1.5", "c2"].iter().map(|s| s.to_string()).collect();
    let manga_dir = lay_out_manga(&dirs.download_root, &names).await?;

    let collector = Collector::new(&dirs.download_root, SITE_DIR);
    let chapters = collector.collect_chapters(&manga_dir).await?;

    let ordered: Vec<&str> = chapters.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(ordered, vec!["c1.5", "c2", "c3"]);
    let keys: Vec<u64> = chapters.iter().map(|c| c.key).collect();
    assert_eq!(keys, vec![1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn test_collect_chapters_filters_non_chapters() -> Result<()> {
    let dirs = setup_test_dirs("filter_non_chapters").await;
    let names: Vec<String> = ["c10", "C2", "cover", "extras", "1"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let manga_dir = lay_out_manga(&dirs.download_root, &names).await?;
    // A plain file starting with "c" is ignored as well
    fs::write(manga_dir.join("c99.txt"), b"").await?;

    let collector = Collector::new(&dirs.download_root, SITE_DIR);
    let chapters = collector.collect_chapters(&manga_dir).await?;

    let ordered: Vec<&str> = chapters.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(ordered, vec!["C2", "c10", "cover"]);
    assert_eq!(chapters[2].key, CHAPTER_KEY_SENTINEL);
    Ok(())
}

#[tokio::test]
async fn test_materialize_45_chapters_in_batches_of_20() -> Result<()> {
    let dirs = setup_test_dirs("batch_45_by_20").await;
    let manga_dir = lay_out_manga(&dirs.download_root, &numbered_chapters(45)).await?;

    let collector = Collector::new(&dirs.download_root, SITE_DIR);
    let chapters = collector.collect_chapters(&manga_dir).await?;
    let batches = Batcher::new(&manga_dir, MANGA_NAME, 20)
        .materialize(chapters)
        .await?;

    let names: Vec<&str> = batches.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["Series_1_20", "Series_21_40", "Series_41_45"]);
    assert_eq!(
        batches.iter().map(Batch::len).collect::<Vec<_>>(),
        vec![20, 20, 5]
    );

    // The manga directory now only holds the batch folders
    assert_eq!(
        dir_names(&manga_dir).await,
        vec!["Series_1_20", "Series_21_40", "Series_41_45"]
    );

    // Every chapter landed in exactly one batch, in order
    let members: Vec<String> = batches.iter().flat_map(|b| b.chapters.clone()).collect();
    assert_eq!(members, numbered_chapters(45));
    for batch in &batches {
        for chapter in &batch.chapters {
            assert!(batch.path.join(chapter).join("001.jpg").is_file());
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_materialize_names_keep_fractional_numbers() -> Result<()> {
    let dirs = setup_test_dirs("fractional_names").await;
    let names: Vec<String> = ["c1.5", "c2", "c3", "c3.5"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let manga_dir = lay_out_manga(&dirs.download_root, &names).await?;

    let collector = Collector::new(&dirs.download_root, SITE_DIR);
    let chapters = collector.collect_chapters(&manga_dir).await?;
    let batches = Batcher::new(&manga_dir, MANGA_NAME, 2)
        .materialize(chapters)
        .await?;

    assert_eq!(batches[0].name, "Series_1.5_2");
    assert_eq!(batches[1].name, "Series_3_3.5");
    assert_eq!(batches[1].first_number, "3");
    assert_eq!(batches[1].last_number, "3.5");
    Ok(())
}

#[tokio::test]
async fn test_materialize_fails_on_unparsable_chapter_name() -> Result<()> {
    let dirs = setup_test_dirs("unparsable_chapter").await;
    let names: Vec<String> = ["c1", "c2", "cover"].iter().map(|s| s.to_string()).collect();
    let manga_dir = lay_out_manga(&dirs.download_root, &names).await?;

    let collector = Collector::new(&dirs.download_root, SITE_DIR);
    let chapters = collector.collect_chapters(&manga_dir).await?;
    let err = Batcher::new(&manga_dir, MANGA_NAME, 2)
        .materialize(chapters)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnparsableChapterName(name) if name == "cover"));

    // Nothing was moved
    assert_eq!(dir_names(&manga_dir).await, vec!["c1", "c2", "cover"]);
    Ok(())
}

#[tokio::test]
async fn test_materialize_fails_when_batches_share_a_folder_name() -> Result<()> {
    let dirs = setup_test_dirs("duplicate_batch_name").await;
    let names: Vec<String> = ["c5", "c5 extra", "c6"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let manga_dir = lay_out_manga(&dirs.download_root, &names).await?;

    let collector = Collector::new(&dirs.download_root, SITE_DIR);
    let chapters = collector.collect_chapters(&manga_dir).await?;
    let err = Batcher::new(&manga_dir, MANGA_NAME, 1)
        .materialize(chapters)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateBatchName(name) if name == "Series_5_5"));

    // Nothing was created or moved
    assert_eq!(dir_names(&manga_dir).await, vec!["c5", "c5 extra", "c6"]);
    Ok(())
}

#[tokio::test]
async fn test_materialize_allows_shared_numerals_inside_one_batch() -> Result<()> {
    let dirs = setup_test_dirs("shared_numeral_one_batch").await;
    let names: Vec<String> = ["c5", "c5 extra", "c6"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let manga_dir = lay_out_manga(&dirs.download_root, &names).await?;

    let collector = Collector::new(&dirs.download_root, SITE_DIR);
    let chapters = collector.collect_chapters(&manga_dir).await?;
    let batches = Batcher::new(&manga_dir, MANGA_NAME, 2)
        .materialize(chapters)
        .await?;

    let names: Vec<&str> = batches.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["Series_5_5", "Series_6_6"]);
    assert_eq!(batches[0].chapters, vec!["c5", "c5 extra"]);
    Ok(())
}

#[tokio::test]
async fn test_rediscovery_after_partial_batching_sees_only_unmoved_chapters() -> Result<()> {
    let dirs = setup_test_dirs("partial_batching").await;
    let manga_dir = lay_out_manga(&dirs.download_root, &numbered_chapters(5)).await?;
    let collector = Collector::new(&dirs.download_root, SITE_DIR);

    // Batch only the first three chapters
    let mut chapters = collector.collect_chapters(&manga_dir).await?;
    let rest = chapters.split_off(3);
    drop(rest);
    let batches = Batcher::new(&manga_dir, MANGA_NAME, 3)
        .materialize(chapters)
        .await?;
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].name, "Series_1_3");

    let remaining = collector.collect_chapters(&manga_dir).await?;
    let names: Vec<&str> = remaining.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["c4", "c5"]);
    Ok(())
}
