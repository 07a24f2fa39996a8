//! Mode orchestration: candidate collection, component invocation, and
//! envelope assembly. Dispatch priority: lines > graph > symbols > stats >
//! count > find > glob listing > tree.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use code_scanner::analysis::{graph, stats, symbols};
use code_scanner::cancel::CancelToken;
use code_scanner::content::{self, lines, search, PatternMatcher};
use code_scanner::model::{FileEntry, MetaInfo, OutputEnvelope};
use code_scanner::output::{self, OutputFormat};
use code_scanner::scanner::paths;
use code_scanner::scanner::{ExclusionFilter, FileTarget, FileWalker};

use crate::cli::Cli;

pub fn run(cli: Cli) -> i32 {
    let format = cli.output_format();

    let root = cli
        .dir
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    if !root.is_dir() {
        let envelope =
            OutputEnvelope::config_error(format!("Directory not found: {}", root.display()));
        return finish(&envelope, format, cli.output.as_deref(), 1);
    }

    let cancel = CancelToken::new();
    {
        let token = Arc::clone(&cancel);
        if let Err(e) = ctrlc::set_handler(move || token.interrupt()) {
            tracing::warn!("interrupt handler unavailable: {e}");
        }
    }
    if let Some(secs) = cli.timeout {
        cancel.arm_deadline(secs);
    }

    let filter = Arc::new(ExclusionFilter::new(&cli.exclude, cli.no_defaults));
    let walker = FileWalker::new(filter, Arc::clone(&cancel));
    let started = Instant::now();
    let ctx = ModeContext { cli: &cli, root: &root, walker, cancel, started, format };

    if !cli.lines.is_empty() {
        run_lines(&ctx)
    } else if cli.graph {
        run_graph(&ctx)
    } else if cli.symbols {
        run_symbols(&ctx)
    } else if cli.stats {
        run_stats(&ctx)
    } else if let Some(pattern) = &cli.find {
        if cli.count {
            run_count(&ctx, pattern)
        } else {
            run_search(&ctx, pattern)
        }
    } else if !cli.glob.is_empty() {
        run_listing(&ctx)
    } else {
        run_tree(&ctx)
    }
}

struct ModeContext<'a> {
    cli: &'a Cli,
    root: &'a Path,
    walker: FileWalker,
    cancel: Arc<CancelToken>,
    started: Instant,
    format: OutputFormat,
}

impl ModeContext<'_> {
    fn meta(&self, scanned: usize, matched: usize) -> MetaInfo {
        MetaInfo {
            elapsed_ms: self.started.elapsed().as_millis(),
            timeout: self.cancel.is_cancelled(),
            files_scanned: scanned,
            files_matched: matched,
            files_errored: 0,
            total_matches: None,
        }
    }

    fn cancel_notice(&self, partial: bool) -> Option<String> {
        if !self.cancel.is_cancelled() {
            return None;
        }
        let what = if self.cancel.was_interrupted() {
            "Operation cancelled"
        } else {
            "Operation timed out"
        };
        if partial {
            Some(format!("{what} - partial results may be incomplete"))
        } else {
            Some(what.to_owned())
        }
    }

    fn exit_code(&self) -> i32 {
        if self.cancel.was_interrupted() {
            130
        } else if self.cancel.is_cancelled() {
            2
        } else {
            0
        }
    }

    fn emit(&self, envelope: &OutputEnvelope) -> i32 {
        finish(envelope, self.format, self.cli.output.as_deref(), self.exit_code())
    }

    /// Candidate files for content search: explicit globs, or every file.
    fn search_candidates(&self) -> Vec<PathBuf> {
        let target = if self.cli.glob.is_empty() {
            FileTarget::Globs(vec!["*".to_owned()])
        } else {
            FileTarget::Globs(self.cli.glob.clone())
        };
        self.walker.find_files(self.root, &target)
    }

    /// Candidate files for graph, symbols, and stats: explicit globs, or
    /// the recognized source extensions.
    fn source_candidates(&self) -> Vec<PathBuf> {
        let target = if self.cli.glob.is_empty() {
            FileTarget::Sources
        } else {
            FileTarget::Globs(self.cli.glob.clone())
        };
        self.walker.find_files(self.root, &target)
    }

    /// Early partial envelope when the walk itself was cancelled.
    fn cancelled_early(&self, scanned: usize, partial: bool) -> i32 {
        let envelope = OutputEnvelope {
            meta: Some(self.meta(scanned, 0)),
            error: self.cancel_notice(partial),
            ..Default::default()
        };
        self.emit(&envelope)
    }
}

fn finish(
    envelope: &OutputEnvelope,
    format: OutputFormat,
    output: Option<&Path>,
    code: i32,
) -> i32 {
    match output {
        Some(path) => {
            if let Err(e) = output::emit_to_file(envelope, format, path) {
                eprintln!("Failed to write output to {}: {e}", path.display());
            }
        }
        None => output::emit(envelope, format),
    }
    code
}

fn apply_limit<T>(items: Vec<T>, limit: Option<usize>) -> Vec<T> {
    match limit {
        Some(cap) if cap < items.len() => items.into_iter().take(cap).collect(),
        _ => items,
    }
}

fn entry_errors(entries: &[FileEntry]) -> Vec<String> {
    entries
        .iter()
        .filter_map(|e| e.error.as_ref().map(|message| format!("{}: {message}", e.path)))
        .collect()
}

fn run_tree(ctx: &ModeContext) -> i32 {
    let tree = ctx.walker.scan_tree(ctx.root);
    let envelope = OutputEnvelope {
        meta: Some(ctx.meta(0, 0)),
        tree: Some(tree),
        error: ctx.cancel_notice(false),
        ..Default::default()
    };
    ctx.emit(&envelope)
}

fn run_listing(ctx: &ModeContext) -> i32 {
    let found = ctx.search_candidates();
    let scanned = found.len();

    let entries: Vec<FileEntry> = found
        .iter()
        .map(|path| FileEntry::bare(paths::root_relative(ctx.root, path)))
        .collect();
    let entries = apply_limit(entries, ctx.cli.limit);
    let matched = entries.len();

    let envelope = OutputEnvelope {
        meta: Some(ctx.meta(scanned, matched)),
        files: Some(entries),
        error: ctx.cancel_notice(false),
        ..Default::default()
    };
    ctx.emit(&envelope)
}

fn run_search(ctx: &ModeContext, pattern: &str) -> i32 {
    let matcher = match PatternMatcher::build(pattern, ctx.cli.regex) {
        Ok(matcher) => matcher,
        Err(e) => {
            let envelope = OutputEnvelope::config_error(e.to_string());
            return finish(&envelope, ctx.format, ctx.cli.output.as_deref(), 1);
        }
    };
    let pool = match content::worker_pool() {
        Ok(pool) => pool,
        Err(e) => {
            let envelope = OutputEnvelope::config_error(e.to_string());
            return finish(&envelope, ctx.format, ctx.cli.output.as_deref(), 1);
        }
    };

    let candidates = ctx.search_candidates();
    let scanned = candidates.len();
    if ctx.cancel.is_cancelled() {
        return ctx.cancelled_early(scanned, true);
    }

    let entries = search::search_files(
        &pool,
        &candidates,
        ctx.root,
        &matcher,
        ctx.cli.pad,
        ctx.cli.line_numbers_enabled(),
        &ctx.cancel,
    );
    let errors = entry_errors(&entries);
    let entries = apply_limit(entries, ctx.cli.limit);

    let mut meta = ctx.meta(scanned, entries.len());
    meta.files_errored = errors.len();

    let envelope = OutputEnvelope {
        meta: Some(meta),
        files: Some(entries),
        errors: (!errors.is_empty()).then_some(errors),
        error: ctx.cancel_notice(true),
        ..Default::default()
    };
    ctx.emit(&envelope)
}

fn run_count(ctx: &ModeContext, pattern: &str) -> i32 {
    let matcher = match PatternMatcher::build(pattern, ctx.cli.regex) {
        Ok(matcher) => matcher,
        Err(e) => {
            let envelope = OutputEnvelope::config_error(e.to_string());
            return finish(&envelope, ctx.format, ctx.cli.output.as_deref(), 1);
        }
    };
    let pool = match content::worker_pool() {
        Ok(pool) => pool,
        Err(e) => {
            let envelope = OutputEnvelope::config_error(e.to_string());
            return finish(&envelope, ctx.format, ctx.cli.output.as_deref(), 1);
        }
    };

    let candidates = ctx.search_candidates();
    let scanned = candidates.len();
    if ctx.cancel.is_cancelled() {
        return ctx.cancelled_early(scanned, true);
    }

    let (counts, total) =
        search::count_matches(&pool, &candidates, ctx.root, &matcher, &ctx.cancel);
    let counts = apply_limit(counts, ctx.cli.limit);

    let mut meta = ctx.meta(scanned, counts.len());
    meta.total_matches = Some(total);

    let envelope = OutputEnvelope {
        meta: Some(meta),
        counts: Some(counts),
        error: ctx.cancel_notice(true),
        ..Default::default()
    };
    ctx.emit(&envelope)
}

fn run_lines(ctx: &ModeContext) -> i32 {
    let specs = match lines::parse_specs(&ctx.cli.line_specs(), ctx.root) {
        Ok(specs) => specs,
        Err(e) => {
            let envelope = OutputEnvelope::config_error(e.to_string());
            return finish(&envelope, ctx.format, ctx.cli.output.as_deref(), 1);
        }
    };
    let pool = match content::worker_pool() {
        Ok(pool) => pool,
        Err(e) => {
            let envelope = OutputEnvelope::config_error(e.to_string());
            return finish(&envelope, ctx.format, ctx.cli.output.as_deref(), 1);
        }
    };

    let entries = lines::extract_lines(
        &pool,
        &specs,
        ctx.root,
        ctx.cli.line_numbers_enabled(),
        &ctx.cancel,
    );
    let errors = entry_errors(&entries);
    let entries = apply_limit(entries, ctx.cli.limit);

    let mut meta = ctx.meta(0, entries.len());
    meta.files_errored = errors.len();

    let envelope = OutputEnvelope {
        meta: Some(meta),
        files: Some(entries),
        errors: (!errors.is_empty()).then_some(errors),
        error: ctx.cancel_notice(false),
        ..Default::default()
    };
    ctx.emit(&envelope)
}

fn run_graph(ctx: &ModeContext) -> i32 {
    let candidates = ctx.source_candidates();
    let scanned = candidates.len();
    if ctx.cancel.is_cancelled() {
        return ctx.cancelled_early(scanned, false);
    }

    let entries = graph::build_graph(&candidates, ctx.root, &ctx.cancel);
    let entries = apply_limit(entries, ctx.cli.limit);

    let envelope = OutputEnvelope {
        meta: Some(ctx.meta(scanned, entries.len())),
        graph: Some(entries),
        error: ctx.cancel_notice(false),
        ..Default::default()
    };
    ctx.emit(&envelope)
}

fn run_symbols(ctx: &ModeContext) -> i32 {
    let candidates = ctx.source_candidates();
    let scanned = candidates.len();
    if ctx.cancel.is_cancelled() {
        return ctx.cancelled_early(scanned, false);
    }

    let files = symbols::collect_symbols(&candidates, ctx.root, &ctx.cancel);
    let errors: Vec<String> = files
        .iter()
        .filter_map(|f| f.error.as_ref().map(|message| format!("{}: {message}", f.path)))
        .collect();
    let files = apply_limit(files, ctx.cli.limit);

    let mut meta = ctx.meta(scanned, files.len());
    meta.files_errored = errors.len();

    let envelope = OutputEnvelope {
        meta: Some(meta),
        symbols: Some(files),
        errors: (!errors.is_empty()).then_some(errors),
        error: ctx.cancel_notice(false),
        ..Default::default()
    };
    ctx.emit(&envelope)
}

fn run_stats(ctx: &ModeContext) -> i32 {
    let candidates = ctx.source_candidates();
    let scanned = candidates.len();
    if ctx.cancel.is_cancelled() {
        return ctx.cancelled_early(scanned, false);
    }

    let report = stats::compute_stats(&candidates, ctx.root, &ctx.cancel);

    let envelope = OutputEnvelope {
        meta: Some(ctx.meta(scanned, scanned)),
        stats: Some(report),
        error: ctx.cancel_notice(false),
        ..Default::default()
    };
    ctx.emit(&envelope)
}
