//! Symbol extraction across candidate files. Dispatch is by extension;
//! files no binding claims are skipped silently.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::cancel::CancelToken;
use crate::content::reader;
use crate::model::{SymbolEntry, SymbolFile};
use crate::scanner::paths;
use crate::REGISTRY;

pub fn collect_symbols(
    candidates: &[PathBuf],
    root: &Path,
    cancel: &CancelToken,
) -> Vec<SymbolFile> {
    let mut files: Vec<SymbolFile> = candidates
        .par_iter()
        .filter_map(|path| {
            if cancel.is_cancelled() {
                return None;
            }
            file_symbols(path, root)
        })
        .collect();

    files.sort_by_key(|f| paths::sort_key(&f.path));
    files
}

fn file_symbols(path: &Path, root: &Path) -> Option<SymbolFile> {
    let extension = path.extension()?.to_str()?;
    let extractor = REGISTRY.symbols_for(extension)?;
    let relative = paths::root_relative(root, path);

    let content = match reader::read_text(path) {
        Ok(Some(content)) => content,
        Ok(None) => return None,
        Err(e) => {
            return Some(SymbolFile {
                path: relative,
                error: Some(e.to_string()),
                symbols: Vec::new(),
            })
        }
    };

    let symbols: Vec<SymbolEntry> = extractor
        .extract_symbols(&content)
        .into_iter()
        .map(|span| SymbolEntry {
            kind: span.kind,
            name: span.name,
            line: span.line,
            visibility: span.visibility,
            parent: span.parent,
            signature: span.signature,
        })
        .collect();

    if symbols.is_empty() {
        return None;
    }
    Some(SymbolFile { path: relative, error: None, symbols })
}
