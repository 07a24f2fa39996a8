//! Exact line-range extraction from known files.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use rayon::prelude::*;

use crate::cancel::CancelToken;
use crate::content::reader;
use crate::content::search;
use crate::error::{Result, ScanError};
use crate::model::FileEntry;
use crate::scanner::paths;

/// A parsed `path:start:end` request, 1-based inclusive, start ≤ end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSpec {
    pub path: String,
    pub start: usize,
    pub end: usize,
}

/// Parse raw specs. The path may itself contain `:` (drive letters), so the
/// two line fields are taken from the right. `start > end` swaps silently;
/// zero or non-integer fields are configuration errors.
pub fn parse_specs(raw: &[String], root: &Path) -> Result<Vec<LineSpec>> {
    let mut specs = Vec::with_capacity(raw.len());
    for spec in raw {
        let mut fields = spec.rsplitn(3, ':');
        let end_text = fields.next().unwrap_or("");
        let start_text = fields.next();
        let path_text = fields.next();
        let (Some(start_text), Some(path_text)) = (start_text, path_text) else {
            return Err(ScanError::LineSpec(format!(
                "'{spec}' does not match path:start:end"
            )));
        };

        let start: usize = start_text.parse().map_err(|_| {
            ScanError::LineSpec(format!("'{spec}' start line '{start_text}' is not an integer"))
        })?;
        let end: usize = end_text.parse().map_err(|_| {
            ScanError::LineSpec(format!("'{spec}' end line '{end_text}' is not an integer"))
        })?;
        if start == 0 || end == 0 {
            return Err(ScanError::LineSpec(format!("'{spec}' line numbers are 1-based")));
        }
        let (start, end) = if start > end { (end, start) } else { (start, end) };

        let resolved = root.join(path_text);
        specs.push(LineSpec {
            path: paths::root_relative(root, &resolved),
            start,
            end,
        });
    }
    Ok(specs)
}

/// Extract the requested ranges. Specs are grouped per file; each file is
/// read once and its ranges clamped, merged, and rendered in order.
pub fn extract_lines(
    pool: &rayon::ThreadPool,
    specs: &[LineSpec],
    root: &Path,
    line_numbers: bool,
    cancel: &CancelToken,
) -> Vec<FileEntry> {
    let mut grouped: HashMap<&str, Vec<(usize, usize)>> = HashMap::new();
    for spec in specs {
        grouped
            .entry(spec.path.as_str())
            .or_default()
            .push((spec.start, spec.end));
    }
    let groups: Vec<(&str, Vec<(usize, usize)>)> = grouped.into_iter().collect();

    let mut entries: Vec<FileEntry> = pool.install(|| {
        groups
            .par_iter()
            .filter_map(|(path, ranges)| {
                if cancel.is_cancelled() {
                    return None;
                }
                extract_file(root, path, ranges, line_numbers, cancel)
            })
            .collect()
    });
    entries.sort_by_key(|e| paths::sort_key(&e.path));
    entries
}

fn extract_file(
    root: &Path,
    relative: &str,
    ranges: &[(usize, usize)],
    line_numbers: bool,
    cancel: &CancelToken,
) -> Option<FileEntry> {
    let full = root.join(relative);

    if let Err(e) = fs::metadata(&full) {
        let message = if e.kind() == ErrorKind::NotFound {
            format!("File not found: {relative}")
        } else {
            e.to_string()
        };
        return Some(FileEntry::failed(relative.to_owned(), message));
    }

    let content = match reader::read_text(&full) {
        Ok(Some(content)) => content,
        Ok(None) => return None,
        Err(e) => return Some(FileEntry::failed(relative.to_owned(), e.to_string())),
    };

    let lines: Vec<&str> = content.lines().collect();
    let merged = clamp_and_merge(ranges, lines.len());
    if merged.is_empty() {
        return None;
    }

    // render_chunks works on 0-based indices
    let zero_based: Vec<(usize, usize)> = merged.iter().map(|&(s, e)| (s - 1, e - 1)).collect();
    let chunks = search::render_chunks(&lines, &zero_based, line_numbers, cancel);
    Some(search::entry_from_chunks(relative.to_owned(), chunks, lines.len()))
}

/// Clamp 1-based ranges to `[1, line_count]`, sort by start, and merge
/// overlapping or adjacent ranges.
fn clamp_and_merge(ranges: &[(usize, usize)], line_count: usize) -> Vec<(usize, usize)> {
    if line_count == 0 {
        return Vec::new();
    }
    let mut clamped: Vec<(usize, usize)> = ranges
        .iter()
        .map(|&(start, end)| {
            let start = start.clamp(1, line_count);
            let end = end.clamp(1, line_count);
            if start > end {
                (end, start)
            } else {
                (start, end)
            }
        })
        .collect();
    clamped.sort_by_key(|&(start, _)| start);

    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(clamped.len());
    for (start, end) in clamped {
        if let Some(previous) = merged.last_mut() {
            if start <= previous.1 + 1 {
                previous.1 = previous.1.max(end);
                continue;
            }
        }
        merged.push((start, end));
    }
    merged
}
