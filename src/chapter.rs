//! Chapter identifier parsing.
//!
//! Chapter folders produced by the downloader are named like `c12` or
//! `c12.5 Some Title`. The numeral after the `c` drives both the ordering of
//! chapters and the names of the batch folders built from them.

use lazy_static::lazy_static;
use regex::Regex;

/// Ordering key given to names that carry no usable chapter number.
/// Sorts after every real chapter.
pub const CHAPTER_KEY_SENTINEL: u64 = u64::MAX;

lazy_static! {
    /// Leading chapter numeral: an optional `c` (any case) followed by
    /// digits and at most one fractional part, e.g. "c12", "C7.5", "3".
    pub static ref CHAPTER_NUMBER_REGEX: Regex = Regex::new(r"^(?i:c)?(\d+(?:\.\d+)?)").unwrap();
}

/// Returns the literal chapter numeral at the start of `name`, if any.
///
/// The numeral keeps its fractional part: `"c12.5"` yields `"12.5"`.
pub fn chapter_number(name: &str) -> Option<&str> {
    CHAPTER_NUMBER_REGEX
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Computes the ordering key of a chapter directory name.
///
/// The key is the integer part of the chapter numeral, so `c12.5` and `c12.9`
/// both sort as `12`. Names without a numeral, or whose integer part does not
/// fit in a `u64`, get [`CHAPTER_KEY_SENTINEL`]. Never fails.
pub fn chapter_key(name: &str) -> u64 {
    chapter_number(name)
        .and_then(|numeral| numeral.split('.').next())
        .and_then(|integer| integer.parse::<u64>().ok())
        .unwrap_or(CHAPTER_KEY_SENTINEL)
}

/// Whether a directory name follows the downloader's chapter convention
/// (starts with `c` or `C`).
pub fn is_chapter_dir_name(name: &str) -> bool {
    name.starts_with(['c', 'C'])
}
