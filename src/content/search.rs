//! Content search: per-file matching, context-window merging, and chunk
//! rendering. Count mode rides the same pipeline.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::cancel::CancelToken;
use crate::content::matcher::PatternMatcher;
use crate::content::reader;
use crate::model::{CountEntry, FileChunk, FileEntry};
use crate::scanner::paths;

/// Search every candidate in parallel on the caller-provided pool.
/// Entries come back sorted case-insensitively by path.
pub fn search_files(
    pool: &rayon::ThreadPool,
    candidates: &[PathBuf],
    root: &Path,
    matcher: &PatternMatcher,
    pad: usize,
    line_numbers: bool,
    cancel: &CancelToken,
) -> Vec<FileEntry> {
    let mut entries: Vec<FileEntry> = pool.install(|| {
        candidates
            .par_iter()
            .filter_map(|path| {
                if cancel.is_cancelled() {
                    return None;
                }
                scan_file(path, root, matcher, pad, line_numbers, cancel)
            })
            .collect()
    });
    entries.sort_by_key(|e| paths::sort_key(&e.path));
    entries
}

/// Count matching lines per file. Zero-count files are suppressed.
/// Returns the sorted entries and the grand total.
pub fn count_matches(
    pool: &rayon::ThreadPool,
    candidates: &[PathBuf],
    root: &Path,
    matcher: &PatternMatcher,
    cancel: &CancelToken,
) -> (Vec<CountEntry>, usize) {
    let mut entries: Vec<CountEntry> = pool.install(|| {
        candidates
            .par_iter()
            .filter_map(|path| {
                if cancel.is_cancelled() {
                    return None;
                }
                let content = reader::read_text(path).ok().flatten()?;
                let count = content.lines().filter(|line| matcher.is_match(line)).count();
                if count == 0 {
                    return None;
                }
                Some(CountEntry { path: paths::root_relative(root, path), count })
            })
            .collect()
    });
    let total = entries.iter().map(|e| e.count).sum();
    entries.sort_by_key(|e| paths::sort_key(&e.path));
    (entries, total)
}

fn scan_file(
    path: &Path,
    root: &Path,
    matcher: &PatternMatcher,
    pad: usize,
    line_numbers: bool,
    cancel: &CancelToken,
) -> Option<FileEntry> {
    let relative = paths::root_relative(root, path);

    let content = match reader::read_text(path) {
        Ok(Some(content)) => content,
        Ok(None) => return None,
        Err(e) => return Some(FileEntry::failed(relative, e.to_string())),
    };

    let lines: Vec<&str> = content.lines().collect();
    let hits: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| matcher.is_match(line))
        .map(|(i, _)| i)
        .collect();
    if hits.is_empty() {
        return None;
    }

    let windows = merge_windows(&hits, pad, lines.len());
    let chunks = render_chunks(&lines, &windows, line_numbers, cancel);
    Some(entry_from_chunks(relative, chunks, lines.len()))
}

/// Expand each 0-based match index by `pad` lines on both sides and merge
/// windows that touch or overlap. Input indices must be sorted ascending;
/// the result is a minimal set of disjoint, non-adjacent 0-based ranges.
pub fn merge_windows(hits: &[usize], pad: usize, line_count: usize) -> Vec<(usize, usize)> {
    let mut windows: Vec<(usize, usize)> = Vec::with_capacity(hits.len());
    let last_line = line_count.saturating_sub(1);
    for &hit in hits {
        let start = hit.saturating_sub(pad);
        let end = (hit + pad).min(last_line);
        if let Some(previous) = windows.last_mut() {
            if start <= previous.1 + 1 {
                previous.1 = previous.1.max(end);
                continue;
            }
        }
        windows.push((start, end));
    }
    windows
}

/// Render 0-based ranges into chunks with 1-based inclusive bounds. Each
/// line gets a `"{n}.  "` prefix when line numbering is on.
pub fn render_chunks(
    lines: &[&str],
    windows: &[(usize, usize)],
    line_numbers: bool,
    cancel: &CancelToken,
) -> Vec<FileChunk> {
    let mut chunks = Vec::with_capacity(windows.len());
    for &(start, end) in windows {
        if cancel.is_cancelled() {
            break;
        }
        let mut content = String::new();
        for (offset, line) in lines[start..=end.min(lines.len() - 1)].iter().enumerate() {
            if line_numbers {
                content.push_str(&(start + offset + 1).to_string());
                content.push_str(".  ");
            }
            content.push_str(line);
            content.push('\n');
        }
        chunks.push(FileChunk {
            start_line: start + 1,
            end_line: end.min(lines.len() - 1) + 1,
            content,
        });
    }
    chunks
}

/// Whole-file collapse: a single chunk spanning `[1, line_count]` becomes
/// `contents`; anything else stays `chunks`.
pub fn entry_from_chunks(path: String, chunks: Vec<FileChunk>, line_count: usize) -> FileEntry {
    if chunks.len() == 1 && chunks[0].start_line == 1 && chunks[0].end_line == line_count {
        let content = chunks.into_iter().next().map(|c| c.content).unwrap_or_default();
        FileEntry::whole(path, content)
    } else {
        FileEntry::chunked(path, chunks)
    }
}
