//! End-to-end scenarios over the library surface: a fixture tree is built
//! in a TempDir, the components run against it, and the assembled
//! envelopes are checked down to the serialized output.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use code_scanner::analysis::{graph, stats, symbols};
use code_scanner::content::{self, lines, search, PatternMatcher};
use code_scanner::model::OutputEnvelope;
use code_scanner::output::{self, OutputFormat};
use code_scanner::{CancelToken, ExclusionFilter, FileTarget, FileWalker, MetaInfo};

fn create_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn walker(excludes: &[&str]) -> FileWalker {
    let excludes: Vec<String> = excludes.iter().map(|s| s.to_string()).collect();
    FileWalker::new(
        Arc::new(ExclusionFilter::new(&excludes, false)),
        CancelToken::new(),
    )
}

fn globs(patterns: &[&str]) -> FileTarget {
    FileTarget::Globs(patterns.iter().map(|s| s.to_string()).collect())
}

fn render_yaml(envelope: &OutputEnvelope) -> String {
    String::from_utf8(output::render(envelope, OutputFormat::Yaml).unwrap()).unwrap()
}

#[test]
fn tree_scan_excludes_vendor_dirs() {
    let temp = TempDir::new().unwrap();
    create_file(temp.path(), "src/a.rs", "fn a() {}\n");
    create_file(temp.path(), "vendor/b.rs", "fn b() {}\n");

    let tree = walker(&["vendor"]).scan_tree(temp.path());
    let children = tree.children.as_ref().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "src");
    assert_eq!(children[0].files.as_deref(), Some(&["a.rs".to_owned()][..]));

    let yaml = render_yaml(&OutputEnvelope { tree: Some(tree), ..Default::default() });
    assert!(yaml.contains("- name: src\n"));
    assert!(!yaml.contains("vendor"));
}

#[test]
fn glob_find_with_pad_merges_context_windows() {
    let temp = TempDir::new().unwrap();
    create_file(temp.path(), "lib/a.ts", "// TODO x\nok\n// FIXME y\n");
    create_file(temp.path(), "lib/b.ts", "nothing\n");
    create_file(temp.path(), "lib/c.rs", "// TODO ignored by glob\n");

    let w = walker(&[]);
    let candidates = w.find_files(temp.path(), &globs(&["*.ts"]));
    assert_eq!(candidates.len(), 2);

    let matcher = PatternMatcher::build("TODO|FIXME", false).unwrap();
    let pool = content::worker_pool().unwrap();
    let entries = search::search_files(
        &pool,
        &candidates,
        temp.path(),
        &matcher,
        1,
        true,
        &CancelToken::new(),
    );

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].path, "lib/a.ts");
    // the two windows touch, merge, and cover the file, so it collapses
    assert_eq!(
        entries[0].contents.as_deref(),
        Some("1.  // TODO x\n2.  ok\n3.  // FIXME y\n")
    );
    assert!(entries[0].chunks.is_none());
}

#[test]
fn search_without_collapse_keeps_chunks() {
    let temp = TempDir::new().unwrap();
    create_file(
        temp.path(),
        "a.rs",
        "hit one\nquiet\nquiet\nquiet\nhit two\nquiet\n",
    );

    let matcher = PatternMatcher::build("hit", false).unwrap();
    let pool = content::worker_pool().unwrap();
    let entries = search::search_files(
        &pool,
        &[temp.path().join("a.rs")],
        temp.path(),
        &matcher,
        0,
        false,
        &CancelToken::new(),
    );

    let chunks = entries[0].chunks.as_ref().unwrap();
    assert_eq!(chunks.len(), 2);
    assert_eq!((chunks[0].start_line, chunks[0].end_line), (1, 1));
    assert_eq!((chunks[1].start_line, chunks[1].end_line), (5, 5));
    // invariant: chunks are strictly ordered and non-adjacent
    assert!(chunks[0].end_line + 1 < chunks[1].start_line);
}

#[test]
fn line_extraction_merges_and_clamps() {
    let temp = TempDir::new().unwrap();
    create_file(temp.path(), "a.rs", "l1\nl2\nl3\nl4\nl5\n");
    create_file(temp.path(), "b.rs", "m1\nm2\nm3\nm4\nm5\n");

    let raw: Vec<String> = ["a.rs:1:2", "a.rs:2:3", "b.rs:10:8"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let specs = lines::parse_specs(&raw, temp.path()).unwrap();
    let pool = content::worker_pool().unwrap();
    let entries = lines::extract_lines(&pool, &specs, temp.path(), false, &CancelToken::new());

    assert_eq!(entries.len(), 2);
    let a = &entries[0];
    assert_eq!(a.path, "a.rs");
    let chunks = a.chunks.as_ref().unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!((chunks[0].start_line, chunks[0].end_line), (1, 3));

    let b = &entries[1];
    let chunks = b.chunks.as_ref().unwrap();
    assert_eq!((chunks[0].start_line, chunks[0].end_line), (5, 5));
    assert_eq!(chunks[0].content, "m5\n");
}

#[test]
fn count_mode_totals_and_order() {
    let temp = TempDir::new().unwrap();
    create_file(temp.path(), "a.rs", &"import x\n".repeat(8));
    create_file(temp.path(), "b.rs", &"import y\n".repeat(6));
    create_file(temp.path(), "c.rs", &"import z\n".repeat(5));

    let w = walker(&[]);
    let candidates = w.find_files(temp.path(), &globs(&["*.rs"]));
    let matcher = PatternMatcher::build("import", false).unwrap();
    let pool = content::worker_pool().unwrap();
    let (counts, total) =
        search::count_matches(&pool, &candidates, temp.path(), &matcher, &CancelToken::new());

    assert_eq!(total, 19);
    let pairs: Vec<(&str, usize)> = counts.iter().map(|e| (e.path.as_str(), e.count)).collect();
    assert_eq!(pairs, vec![("a.rs", 8), ("b.rs", 6), ("c.rs", 5)]);
    assert_eq!(total, counts.iter().map(|e| e.count).sum::<usize>());

    let envelope = OutputEnvelope {
        meta: Some(MetaInfo {
            elapsed_ms: 1,
            files_scanned: 3,
            files_matched: 3,
            total_matches: Some(total),
            ..Default::default()
        }),
        counts: Some(counts),
        ..Default::default()
    };
    let yaml = render_yaml(&envelope);
    assert!(yaml.contains("totalMatches: 19"));
    assert!(yaml.contains("files:\n- path: a.rs\n  count: 8\n"));
}

#[test]
fn rust_graph_scenario() {
    let temp = TempDir::new().unwrap();
    create_file(temp.path(), "src/main.rs", "mod cli;\nuse crate::util::X;\n");
    create_file(temp.path(), "src/cli.rs", "pub fn parse() {}\n");
    create_file(temp.path(), "src/util.rs", "pub struct X;\n");

    let w = walker(&[]);
    let candidates = w.find_files(temp.path(), &FileTarget::Sources);
    let entries = graph::build_graph(&candidates, temp.path(), &CancelToken::new());

    let main = entries.iter().find(|e| e.file == "src/main.rs").unwrap();
    assert_eq!(main.imports, vec!["src/cli.rs", "src/util.rs"]);
}

#[test]
fn go_graph_scenario_expands_package_imports() {
    let temp = TempDir::new().unwrap();
    create_file(temp.path(), "go.mod", "module example.com/p\n\ngo 1.22\n");
    create_file(
        temp.path(),
        "internal/a/x.go",
        "package a\n\nimport \"example.com/p/internal/b\"\n",
    );
    create_file(temp.path(), "internal/b/y.go", "package b\n");
    create_file(temp.path(), "internal/b/z.go", "package b\n");

    let w = walker(&[]);
    let candidates = w.find_files(temp.path(), &globs(&["*.go"]));
    let entries = graph::build_graph(&candidates, temp.path(), &CancelToken::new());

    let x = entries.iter().find(|e| e.file == "internal/a/x.go").unwrap();
    assert_eq!(x.imports, vec!["internal/b/y.go", "internal/b/z.go"]);
}

#[test]
fn stats_scenario_orders_languages_and_largest() {
    let temp = TempDir::new().unwrap();
    create_file(temp.path(), "a.rs", &"a long line of rust source code\n".repeat(100));
    create_file(temp.path(), "b.rs", &"short line\n".repeat(50));
    create_file(temp.path(), "c.md", &"doc line\n".repeat(10));

    let w = walker(&[]);
    let candidates = w.find_files(temp.path(), &FileTarget::Sources);
    let report = stats::compute_stats(&candidates, temp.path(), &CancelToken::new());

    assert_eq!(report.languages[0].extension, "rs");
    assert_eq!(report.languages[0].files, 2);
    assert_eq!(report.languages[0].lines, 150);
    assert_eq!(report.languages[1].extension, "md");
    assert_eq!(report.languages[1].lines, 10);
    assert_eq!(report.totals.files, 3);
    assert_eq!(report.totals.lines, 160);
    assert_eq!(report.largest[0].path, "a.rs");
}

#[test]
fn symbols_across_languages() {
    let temp = TempDir::new().unwrap();
    create_file(
        temp.path(),
        "src/engine.rs",
        "pub struct Engine;\n\nimpl Engine {\n    pub fn start(&self) {}\n}\n",
    );
    create_file(
        temp.path(),
        "web/app.ts",
        "export class App {\n  boot() {\n  }\n}\n",
    );
    create_file(
        temp.path(),
        "svc/Service.cs",
        "namespace MyApp;\n\npublic class Service\n{\n    public void Handle()\n    {\n    }\n}\n",
    );

    let w = walker(&[]);
    let candidates = w.find_files(temp.path(), &FileTarget::Sources);
    let files = symbols::collect_symbols(&candidates, temp.path(), &CancelToken::new());

    let rust = files.iter().find(|f| f.path == "src/engine.rs").unwrap();
    assert!(rust.symbols.iter().any(|s| s.kind == "struct" && s.name == "Engine"));
    assert!(rust
        .symbols
        .iter()
        .any(|s| s.kind == "method" && s.parent.as_deref() == Some("Engine")));

    let ts = files.iter().find(|f| f.path == "web/app.ts").unwrap();
    assert!(ts.symbols.iter().any(|s| s.kind == "class" && s.name == "App"));
    assert!(ts.symbols.iter().any(|s| s.kind == "method" && s.name == "boot"));

    let cs = files.iter().find(|f| f.path == "svc/Service.cs").unwrap();
    assert!(cs.symbols.iter().any(|s| s.kind == "namespace"));
    assert!(cs.symbols.iter().any(|s| s.kind == "method" && s.name == "Handle"));
}

#[test]
fn determinism_same_scan_twice() {
    let temp = TempDir::new().unwrap();
    create_file(temp.path(), "src/one.rs", "fn a() { hit() }\n");
    create_file(temp.path(), "src/two.rs", "fn b() { hit() }\n");
    create_file(temp.path(), "docs/three.md", "hit\n");

    let run = || {
        let w = walker(&[]);
        let candidates = w.find_files(temp.path(), &globs(&["*"]));
        let matcher = PatternMatcher::build("hit", false).unwrap();
        let pool = content::worker_pool().unwrap();
        let entries = search::search_files(
            &pool,
            &candidates,
            temp.path(),
            &matcher,
            1,
            true,
            &CancelToken::new(),
        );
        let envelope = OutputEnvelope { files: Some(entries), ..Default::default() };
        render_yaml(&envelope)
    };

    assert_eq!(run(), run());
}

#[test]
fn cancelled_scan_returns_partial_results() {
    let temp = TempDir::new().unwrap();
    create_file(temp.path(), "src/a.rs", "fn a() {}\n");

    let cancel = CancelToken::new();
    cancel.cancel();
    let w = FileWalker::new(
        Arc::new(ExclusionFilter::new(&[], false)),
        Arc::clone(&cancel),
    );
    let found = w.find_files(temp.path(), &globs(&["*.rs"]));
    assert!(found.len() <= 1);

    let matcher = PatternMatcher::build("fn", false).unwrap();
    let pool = content::worker_pool().unwrap();
    let entries = search::search_files(&pool, &found, temp.path(), &matcher, 0, true, &cancel);
    assert!(entries.is_empty());
}

#[test]
fn files_matched_never_exceeds_files_scanned() {
    let temp = TempDir::new().unwrap();
    create_file(temp.path(), "a.rs", "match here\n");
    create_file(temp.path(), "b.rs", "nothing\n");
    create_file(temp.path(), "c.rs", "match there\n");

    let w = walker(&[]);
    let candidates = w.find_files(temp.path(), &globs(&["*.rs"]));
    let matcher = PatternMatcher::build("match", false).unwrap();
    let pool = content::worker_pool().unwrap();
    let entries = search::search_files(
        &pool,
        &candidates,
        temp.path(),
        &matcher,
        0,
        false,
        &CancelToken::new(),
    );
    assert!(entries.len() <= candidates.len());
    assert_eq!(entries.len(), 2);
}

#[test]
fn excluded_directories_leave_no_trace_in_any_section() {
    let temp = TempDir::new().unwrap();
    create_file(temp.path(), "src/keep.rs", "fn keep() {}\n");
    create_file(temp.path(), "node_modules/drop.rs", "fn drop_me() {}\n");

    let w = walker(&[]);
    let candidates = w.find_files(temp.path(), &FileTarget::Sources);
    assert!(candidates.iter().all(|p| !p.to_string_lossy().contains("node_modules")));

    let tree = w.scan_tree(temp.path());
    let yaml = render_yaml(&OutputEnvelope { tree: Some(tree), ..Default::default() });
    assert!(!yaml.contains("node_modules"));

    let files = symbols::collect_symbols(&candidates, temp.path(), &CancelToken::new());
    assert!(files.iter().all(|f| !f.path.contains("node_modules")));
}
