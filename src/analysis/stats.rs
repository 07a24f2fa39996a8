//! Per-extension codebase statistics. Byte sizes come from metadata; line
//! counts from scanning for `\n`, with binary files counted as zero lines.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use rayon::prelude::*;

use crate::cancel::CancelToken;
use crate::content::reader::{is_binary, BINARY_SNIFF_LEN, MMAP_THRESHOLD};
use crate::model::{LanguageStats, LargestFile, StatsReport, StatsTotals};
use crate::scanner::paths;

struct FileFacts {
    path: String,
    extension: String,
    lines: usize,
    bytes: u64,
}

pub fn compute_stats(
    candidates: &[PathBuf],
    root: &Path,
    cancel: &CancelToken,
) -> StatsReport {
    let facts: Vec<FileFacts> = candidates
        .par_iter()
        .filter_map(|path| {
            if cancel.is_cancelled() {
                return None;
            }
            file_facts(path, root)
        })
        .collect();

    let mut by_extension: HashMap<&str, (usize, usize, u64)> = HashMap::new();
    let mut totals = StatsTotals { files: 0, lines: 0, bytes: 0 };
    for fact in &facts {
        let bucket = by_extension.entry(fact.extension.as_str()).or_default();
        bucket.0 += 1;
        bucket.1 += fact.lines;
        bucket.2 += fact.bytes;
        totals.files += 1;
        totals.lines += fact.lines;
        totals.bytes += fact.bytes;
    }

    let mut languages: Vec<LanguageStats> = by_extension
        .into_iter()
        .map(|(extension, (files, lines, bytes))| LanguageStats {
            extension: extension.to_owned(),
            files,
            lines,
            bytes,
        })
        .collect();
    languages.sort_by(|a, b| {
        b.lines.cmp(&a.lines).then_with(|| a.extension.cmp(&b.extension))
    });

    let mut ranked: Vec<&FileFacts> = facts.iter().collect();
    ranked.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.path.cmp(&b.path)));
    let largest: Vec<LargestFile> = ranked
        .iter()
        .take(10)
        .map(|fact| LargestFile {
            path: fact.path.clone(),
            lines: fact.lines,
            bytes: fact.bytes,
        })
        .collect();

    StatsReport { languages, totals, largest }
}

fn file_facts(path: &Path, root: &Path) -> Option<FileFacts> {
    let metadata = std::fs::metadata(path).ok()?;
    let bytes = metadata.len();
    Some(FileFacts {
        path: paths::root_relative(root, path),
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase(),
        lines: count_lines(path, bytes),
        bytes,
    })
}

fn count_lines(path: &Path, bytes: u64) -> usize {
    if bytes == 0 {
        return 0;
    }
    if bytes >= MMAP_THRESHOLD {
        if let Ok(file) = File::open(path) {
            if let Ok(map) = unsafe { Mmap::map(&file) } {
                if is_binary(&map) {
                    return 0;
                }
                return newline_count(&map);
            }
        }
        return 0;
    }

    let Ok(file) = File::open(path) else {
        return 0;
    };
    let mut reader = BufReader::with_capacity(64 * 1024, file);
    let mut sniff = [0u8; BINARY_SNIFF_LEN];
    let Ok(sniffed) = reader.read(&mut sniff) else {
        return 0;
    };
    if is_binary(&sniff[..sniffed]) {
        return 0;
    }

    let mut count = count_byte(b'\n', &sniff[..sniffed]);
    let mut last = sniff.get(sniffed.wrapping_sub(1)).copied();
    let mut buf = [0u8; 32 * 1024];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                count += count_byte(b'\n', &buf[..n]);
                last = Some(buf[n - 1]);
            }
            Err(_) => break,
        }
    }
    if last.is_some_and(|b| b != b'\n') {
        count += 1;
    }
    count
}

fn newline_count(data: &[u8]) -> usize {
    let mut count = count_byte(b'\n', data);
    if data.last().is_some_and(|&b| b != b'\n') {
        count += 1;
    }
    count
}

fn count_byte(needle: u8, haystack: &[u8]) -> usize {
    haystack.iter().filter(|&&b| b == needle).count()
}
