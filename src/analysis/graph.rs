//! Project-internal import graph. Raw references from the language
//! bindings are resolved against the immutable project file set; only
//! paths that actually exist in the project survive.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::cancel::CancelToken;
use crate::model::GraphEntry;
use crate::scanner::paths;
use crate::REGISTRY;

pub fn build_graph(
    candidates: &[PathBuf],
    root: &Path,
    cancel: &CancelToken,
) -> Vec<GraphEntry> {
    let project_files: HashSet<String> = candidates
        .iter()
        .map(|path| paths::root_relative(root, path))
        .collect();

    let mut entries: Vec<GraphEntry> = candidates
        .par_iter()
        .filter_map(|path| {
            if cancel.is_cancelled() {
                return None;
            }
            file_entry(path, root, &project_files)
        })
        .collect();

    entries.sort_by_key(|e| paths::sort_key(&e.file));
    entries
}

fn file_entry(
    path: &Path,
    root: &Path,
    project_files: &HashSet<String>,
) -> Option<GraphEntry> {
    let extension = path.extension()?.to_str()?;
    let extractor = REGISTRY.imports_for(extension)?;
    let relative = paths::root_relative(root, path);

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Some(GraphEntry { file: relative, imports: Vec::new() }),
    };

    let references = extractor.extract_imports(&content, Path::new(&relative), root);

    let mut imports = Vec::new();
    let mut seen = HashSet::new();
    for reference in &references {
        let normalized = paths::normalize_reference(reference);
        if normalized == relative {
            continue;
        }
        if normalized.ends_with('/') {
            for project_file in project_files {
                if project_file.starts_with(&normalized) && seen.insert(project_file.clone()) {
                    imports.push(project_file.clone());
                }
            }
        } else if project_files.contains(&normalized) && seen.insert(normalized.clone()) {
            imports.push(normalized);
        }
    }

    imports.sort_by_key(|i| paths::sort_key(i));
    Some(GraphEntry { file: relative, imports })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn rust_mod_and_use_resolve() {
        let temp = TempDir::new().unwrap();
        let main = write(
            temp.path(),
            "src/main.rs",
            "mod cli;\nuse crate::util::X;\n\nfn main() {}\n",
        );
        let cli = write(temp.path(), "src/cli.rs", "");
        let util = write(temp.path(), "src/util.rs", "pub struct X;\n");

        let graph = build_graph(&[main, cli, util], temp.path(), &CancelToken::new());
        let entry = graph.iter().find(|e| e.file == "src/main.rs").unwrap();
        assert_eq!(entry.imports, vec!["src/cli.rs", "src/util.rs"]);
    }

    #[test]
    fn typescript_relative_import_resolves() {
        let temp = TempDir::new().unwrap();
        let app = write(temp.path(), "lib/app.ts", "import { u } from './util';\n");
        let util = write(temp.path(), "lib/util.ts", "export const u = 1;\n");

        let graph = build_graph(&[app, util], temp.path(), &CancelToken::new());
        let entry = graph.iter().find(|e| e.file == "lib/app.ts").unwrap();
        assert_eq!(entry.imports, vec!["lib/util.ts"]);
    }

    #[test]
    fn go_module_import_expands_directory() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("go.mod"), "module example.com/p\n").unwrap();
        let x = write(
            temp.path(),
            "internal/a/x.go",
            "package a\n\nimport \"example.com/p/internal/b\"\n",
        );
        let y = write(temp.path(), "internal/b/y.go", "package b\n");
        let z = write(temp.path(), "internal/b/z.go", "package b\n");

        let graph = build_graph(&[x, y, z], temp.path(), &CancelToken::new());
        let entry = graph.iter().find(|e| e.file == "internal/a/x.go").unwrap();
        assert_eq!(entry.imports, vec!["internal/b/y.go", "internal/b/z.go"]);
    }

    #[test]
    fn python_relative_import_resolves() {
        let temp = TempDir::new().unwrap();
        let main = write(temp.path(), "pkg/main.py", "from .helpers import run\n");
        let helpers = write(temp.path(), "pkg/helpers.py", "def run():\n    pass\n");

        let graph = build_graph(&[main, helpers], temp.path(), &CancelToken::new());
        let entry = graph.iter().find(|e| e.file == "pkg/main.py").unwrap();
        assert_eq!(entry.imports, vec!["pkg/helpers.py"]);
    }

    #[test]
    fn files_without_imports_get_empty_list() {
        let temp = TempDir::new().unwrap();
        let lone = write(temp.path(), "src/lone.rs", "fn nothing() {}\n");

        let graph = build_graph(&[lone], temp.path(), &CancelToken::new());
        assert_eq!(graph.len(), 1);
        assert!(graph[0].imports.is_empty());
    }

    #[test]
    fn unknown_extensions_are_skipped() {
        let temp = TempDir::new().unwrap();
        let readme = write(temp.path(), "README.md", "# docs\n");

        let graph = build_graph(&[readme], temp.path(), &CancelToken::new());
        assert!(graph.is_empty());
    }

    #[test]
    fn imports_only_contain_project_files() {
        let temp = TempDir::new().unwrap();
        let main = write(temp.path(), "src/main.rs", "mod gone;\nmod cli;\n");
        let cli = write(temp.path(), "src/cli.rs", "");

        let graph = build_graph(&[main, cli], temp.path(), &CancelToken::new());
        let entry = graph.iter().find(|e| e.file == "src/main.rs").unwrap();
        assert_eq!(entry.imports, vec!["src/cli.rs"]);
    }

    #[test]
    fn self_references_are_dropped() {
        let temp = TempDir::new().unwrap();
        let init = write(temp.path(), "pkg/__init__.py", "from . import helpers\n");
        let helpers = write(temp.path(), "pkg/helpers.py", "");

        let graph = build_graph(&[init, helpers], temp.path(), &CancelToken::new());
        let entry = graph.iter().find(|e| e.file == "pkg/__init__.py").unwrap();
        assert!(!entry.imports.contains(&"pkg/__init__.py".to_owned()));
    }

    #[test]
    fn entries_sorted_by_file() {
        let temp = TempDir::new().unwrap();
        let b = write(temp.path(), "src/zeta.rs", "");
        let a = write(temp.path(), "src/Alpha.rs", "");

        let graph = build_graph(&[b, a], temp.path(), &CancelToken::new());
        let order: Vec<&str> = graph.iter().map(|e| e.file.as_str()).collect();
        assert_eq!(order, vec!["src/Alpha.rs", "src/zeta.rs"]);
    }
}
