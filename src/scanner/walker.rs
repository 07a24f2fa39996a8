use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;

use ignore::{WalkBuilder, WalkState};
use rayon::prelude::*;

use crate::cancel::CancelToken;
use crate::config;
use crate::model::DirNode;
use crate::scanner::exclusion::ExclusionFilter;
use crate::scanner::glob;
use crate::scanner::paths;

/// Which files a flat enumeration should keep.
#[derive(Debug, Clone)]
pub enum FileTarget {
    /// Basename matches any of the supplied glob patterns.
    Globs(Vec<String>),
    /// Extension belongs to the recognized-source-extensions set.
    Sources,
}

impl FileTarget {
    fn keeps(&self, name: &str) -> bool {
        match self {
            FileTarget::Globs(patterns) => glob::matches_any(name, patterns),
            FileTarget::Sources => config::is_source_file(name),
        }
    }
}

/// Parallel directory enumerator with exclusion pruning.
///
/// `scan_tree` produces the hierarchy of source-bearing directories;
/// `find_files` produces a flat, sorted list of candidate paths.
pub struct FileWalker {
    filter: Arc<ExclusionFilter>,
    cancel: Arc<CancelToken>,
}

impl FileWalker {
    pub fn new(filter: Arc<ExclusionFilter>, cancel: Arc<CancelToken>) -> Self {
        Self { filter, cancel }
    }

    /// Recursively scan `root`, keeping only directories that hold at least
    /// one recognized source file somewhere beneath them. Subdirectories are
    /// visited in parallel; children and files come back sorted.
    pub fn scan_tree(&self, root: &Path) -> DirNode {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.to_string_lossy().into_owned());

        if self.cancel.is_cancelled() {
            return DirNode::empty(name);
        }

        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(_) => return DirNode::empty(name),
        };

        let mut files = Vec::new();
        let mut subdirs = Vec::new();
        for entry in entries.flatten() {
            let file_type = match entry.file_type() {
                Ok(t) => t,
                Err(_) => continue,
            };
            let entry_name = entry.file_name().to_string_lossy().into_owned();
            if file_type.is_file() {
                if config::is_source_file(&entry_name) && !self.filter.is_excluded(&entry_name) {
                    files.push(entry_name);
                }
            } else if file_type.is_dir() && !self.filter.is_excluded(&entry_name) {
                subdirs.push(entry.path());
            }
        }

        let mut children: Vec<DirNode> = subdirs
            .par_iter()
            .filter_map(|dir| {
                if self.cancel.is_cancelled() {
                    return None;
                }
                let child = self.scan_tree(dir);
                if child.is_populated() {
                    Some(child)
                } else {
                    None
                }
            })
            .collect();

        children.sort_by_key(|c| paths::sort_key(&c.name));
        files.sort_by_key(|f| paths::sort_key(f));

        DirNode {
            name,
            children: (!children.is_empty()).then_some(children),
            files: (!files.is_empty()).then_some(files),
        }
    }

    /// Enumerate all files under `root` kept by `target`, pruning excluded
    /// directories before descent. Unreadable directories are skipped.
    pub fn find_files(&self, root: &Path, target: &FileTarget) -> Vec<PathBuf> {
        let (tx, rx) = mpsc::channel::<PathBuf>();

        let filter = Arc::clone(&self.filter);
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .threads(threads)
            .filter_entry(move |entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let is_dir = entry.file_type().map_or(false, |t| t.is_dir());
                if !is_dir {
                    return true;
                }
                !filter.is_excluded(&entry.file_name().to_string_lossy())
            })
            .build_parallel();

        walker.run(|| {
            let tx = tx.clone();
            let cancel = &self.cancel;
            let name_filter = &self.filter;
            Box::new(move |entry| {
                if cancel.is_cancelled() {
                    return WalkState::Quit;
                }
                if let Ok(entry) = entry {
                    if entry.file_type().map_or(false, |t| t.is_file()) {
                        let name = entry.file_name().to_string_lossy();
                        if target.keeps(&name) && !name_filter.is_excluded(&name) {
                            let _ = tx.send(entry.into_path());
                        }
                    }
                }
                WalkState::Continue
            })
        });
        drop(tx);

        let mut found: Vec<PathBuf> = rx.into_iter().collect();
        found.sort_by_key(|p| paths::sort_key(&p.to_string_lossy()));
        tracing::debug!(count = found.len(), "enumerated candidate files");
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    fn walker(excludes: &[&str]) -> FileWalker {
        let excludes: Vec<String> = excludes.iter().map(|s| s.to_string()).collect();
        FileWalker::new(
            Arc::new(ExclusionFilter::new(&excludes, false)),
            CancelToken::new(),
        )
    }

    #[test]
    fn tree_keeps_source_bearing_dirs() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "src/a.rs", "fn a() {}");
        create_file(temp.path(), "vendor/b.rs", "fn b() {}");

        let tree = walker(&["vendor"]).scan_tree(temp.path());
        let children = tree.children.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "src");
        assert_eq!(children[0].files.as_deref(), Some(&["a.rs".to_owned()][..]));
    }

    #[test]
    fn tree_prunes_default_exclusions() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "src/main.rs", "");
        create_file(temp.path(), "node_modules/pkg/index.js", "");
        create_file(temp.path(), "target/debug/out.rs", "");

        let tree = walker(&[]).scan_tree(temp.path());
        let children = tree.children.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "src");
    }

    #[test]
    fn tree_prunes_empty_subtrees() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "src/main.rs", "");
        fs::create_dir_all(temp.path().join("empty/nested")).unwrap();
        create_file(temp.path(), "assets/logo.png", "");

        let tree = walker(&[]).scan_tree(temp.path());
        let children = tree.children.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "src");
    }

    #[test]
    fn tree_sorts_case_insensitively() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "Zeta/a.rs", "");
        create_file(temp.path(), "alpha/b.rs", "");
        create_file(temp.path(), "Beta/c.rs", "");

        let tree = walker(&[]).scan_tree(temp.path());
        let names: Vec<&str> = tree
            .children
            .as_ref()
            .unwrap()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["alpha", "Beta", "Zeta"]);
    }

    #[test]
    fn tree_root_carries_basename() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "a.rs", "");
        let tree = walker(&[]).scan_tree(temp.path());
        assert_eq!(
            tree.name,
            temp.path().file_name().unwrap().to_string_lossy()
        );
    }

    #[test]
    fn find_files_matches_globs() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "src/main.rs", "");
        create_file(temp.path(), "src/app.ts", "");
        create_file(temp.path(), "readme.md", "");

        let target = FileTarget::Globs(vec!["*.rs".to_owned(), "*.ts".to_owned()]);
        let found = walker(&[]).find_files(temp.path(), &target);
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"main.rs".to_owned()));
        assert!(names.contains(&"app.ts".to_owned()));
    }

    #[test]
    fn find_files_star_takes_everything() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "a.rs", "");
        create_file(temp.path(), "noext", "");

        let target = FileTarget::Globs(vec!["*".to_owned()]);
        let found = walker(&[]).find_files(temp.path(), &target);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn find_files_source_target_uses_extension_set() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "a.rs", "");
        create_file(temp.path(), "b.bin", "");
        create_file(temp.path(), "Makefile", "");

        let found = walker(&[]).find_files(temp.path(), &FileTarget::Sources);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn find_files_respects_exclusions() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "src/keep.rs", "");
        create_file(temp.path(), "node_modules/drop.rs", "");

        let target = FileTarget::Globs(vec!["*.rs".to_owned()]);
        let found = walker(&[]).find_files(temp.path(), &target);
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("src/keep.rs"));
    }

    #[test]
    fn find_files_sorted_case_insensitively() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "Beta.rs", "");
        create_file(temp.path(), "alpha.rs", "");

        let target = FileTarget::Globs(vec!["*.rs".to_owned()]);
        let found = walker(&[]).find_files(temp.path(), &target);
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["alpha.rs", "Beta.rs"]);
    }

    #[test]
    fn cancelled_walk_returns_early() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "src/a.rs", "");

        let cancel = CancelToken::new();
        cancel.cancel();
        let walker = FileWalker::new(
            Arc::new(ExclusionFilter::new(&[], false)),
            Arc::clone(&cancel),
        );
        let tree = walker.scan_tree(temp.path());
        assert!(!tree.is_populated());
    }
}
