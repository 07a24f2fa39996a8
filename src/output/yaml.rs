//! Block-style YAML emission for the output envelope. The grammar is
//! deliberately narrow: two-space indents, `|` block scalars for
//! multi-line text, and plain scalars quoted only when YAML would
//! otherwise misread them.

use std::io::{self, Write};

use crate::model::{
    CountEntry, DirNode, FileChunk, FileEntry, GraphEntry, LanguageStats,
    LargestFile, MetaInfo, OutputEnvelope, StatsReport, SymbolEntry, SymbolFile,
};

pub fn write_envelope(w: &mut impl Write, envelope: &OutputEnvelope) -> io::Result<()> {
    if let Some(meta) = &envelope.meta {
        write_meta(w, meta)?;
    }
    if let Some(error) = &envelope.error {
        write!(w, "error: ")?;
        write_scalar(w, error)?;
        writeln!(w)?;
    }
    if let Some(tree) = &envelope.tree {
        writeln!(w, "tree:")?;
        write_node_body(w, tree, 2)?;
    }
    if let Some(graph) = &envelope.graph {
        write_graph(w, graph)?;
    }
    if let Some(symbols) = &envelope.symbols {
        write_symbols(w, symbols)?;
    }
    if let Some(counts) = &envelope.counts {
        write_counts(w, counts)?;
    }
    if let Some(stats) = &envelope.stats {
        write_stats(w, stats)?;
    }
    if let Some(files) = &envelope.files {
        if !files.is_empty() {
            write_files(w, files)?;
        }
    }
    if let Some(errors) = &envelope.errors {
        writeln!(w, "errors:")?;
        for error in errors {
            write!(w, "- ")?;
            write_scalar(w, error)?;
            writeln!(w)?;
        }
    }
    Ok(())
}

fn write_meta(w: &mut impl Write, meta: &MetaInfo) -> io::Result<()> {
    writeln!(w, "meta:")?;
    if meta.elapsed_ms != 0 {
        writeln!(w, "  elapsedMs: {}", meta.elapsed_ms)?;
    }
    if meta.timeout {
        writeln!(w, "  timeout: true")?;
    }
    if meta.files_scanned != 0 {
        writeln!(w, "  filesScanned: {}", meta.files_scanned)?;
    }
    if meta.files_matched != 0 {
        writeln!(w, "  filesMatched: {}", meta.files_matched)?;
    }
    if meta.files_errored != 0 {
        writeln!(w, "  filesErrored: {}", meta.files_errored)?;
    }
    if let Some(total) = meta.total_matches {
        writeln!(w, "  totalMatches: {total}")?;
    }
    Ok(())
}

/// The fields of a tree node, each line indented by `indent`. List items
/// recurse with the body shifted two columns past the `- ` marker.
fn write_node_body(w: &mut impl Write, node: &DirNode, indent: usize) -> io::Result<()> {
    write_indent(w, indent)?;
    write!(w, "name: ")?;
    write_scalar(w, &node.name)?;
    writeln!(w)?;

    if let Some(files) = &node.files {
        if !files.is_empty() {
            write_indent(w, indent)?;
            writeln!(w, "files:")?;
            for file in files {
                write_indent(w, indent)?;
                write!(w, "- ")?;
                write_scalar(w, file)?;
                writeln!(w)?;
            }
        }
    }

    if let Some(children) = &node.children {
        if !children.is_empty() {
            write_indent(w, indent)?;
            writeln!(w, "children:")?;
            for child in children {
                write_indent(w, indent)?;
                write!(w, "- name: ")?;
                write_scalar(w, &child.name)?;
                writeln!(w)?;
                write_child_rest(w, child, indent + 2)?;
            }
        }
    }
    Ok(())
}

fn write_child_rest(w: &mut impl Write, node: &DirNode, indent: usize) -> io::Result<()> {
    if let Some(files) = &node.files {
        if !files.is_empty() {
            write_indent(w, indent)?;
            writeln!(w, "files:")?;
            for file in files {
                write_indent(w, indent)?;
                write!(w, "- ")?;
                write_scalar(w, file)?;
                writeln!(w)?;
            }
        }
    }
    if let Some(children) = &node.children {
        if !children.is_empty() {
            write_indent(w, indent)?;
            writeln!(w, "children:")?;
            for child in children {
                write_indent(w, indent)?;
                write!(w, "- name: ")?;
                write_scalar(w, &child.name)?;
                writeln!(w)?;
                write_child_rest(w, child, indent + 2)?;
            }
        }
    }
    Ok(())
}

fn write_graph(w: &mut impl Write, graph: &[GraphEntry]) -> io::Result<()> {
    writeln!(w, "graph:")?;
    for entry in graph {
        write!(w, "- file: ")?;
        write_scalar(w, &entry.file)?;
        writeln!(w)?;
        if entry.imports.is_empty() {
            writeln!(w, "  imports: []")?;
        } else {
            writeln!(w, "  imports:")?;
            for import in &entry.imports {
                write!(w, "  - ")?;
                write_scalar(w, import)?;
                writeln!(w)?;
            }
        }
    }
    Ok(())
}

fn write_symbols(w: &mut impl Write, files: &[SymbolFile]) -> io::Result<()> {
    writeln!(w, "symbols:")?;
    for file in files {
        write!(w, "- path: ")?;
        write_scalar(w, &file.path)?;
        writeln!(w)?;
        if let Some(error) = &file.error {
            write!(w, "  error: ")?;
            write_scalar(w, error)?;
            writeln!(w)?;
        }
        if !file.symbols.is_empty() {
            writeln!(w, "  symbols:")?;
            for symbol in &file.symbols {
                write_symbol(w, symbol)?;
            }
        }
    }
    Ok(())
}

fn write_symbol(w: &mut impl Write, symbol: &SymbolEntry) -> io::Result<()> {
    writeln!(w, "  - kind: {}", symbol.kind)?;
    write!(w, "    name: ")?;
    write_scalar(w, &symbol.name)?;
    writeln!(w)?;
    writeln!(w, "    line: {}", symbol.line)?;
    if let Some(visibility) = symbol.visibility {
        writeln!(w, "    visibility: {visibility}")?;
    }
    if let Some(parent) = &symbol.parent {
        write!(w, "    parent: ")?;
        write_scalar(w, parent)?;
        writeln!(w)?;
    }
    write!(w, "    signature: ")?;
    write_scalar(w, &symbol.signature)?;
    writeln!(w)
}

fn write_counts(w: &mut impl Write, counts: &[CountEntry]) -> io::Result<()> {
    writeln!(w, "files:")?;
    for entry in counts {
        write!(w, "- path: ")?;
        write_scalar(w, &entry.path)?;
        writeln!(w)?;
        writeln!(w, "  count: {}", entry.count)?;
    }
    Ok(())
}

fn write_stats(w: &mut impl Write, stats: &StatsReport) -> io::Result<()> {
    writeln!(w, "languages:")?;
    for language in &stats.languages {
        write_language(w, language)?;
    }
    writeln!(w, "totals:")?;
    writeln!(w, "  files: {}", stats.totals.files)?;
    writeln!(w, "  lines: {}", stats.totals.lines)?;
    writeln!(w, "  bytes: {}", stats.totals.bytes)?;
    writeln!(w, "largest:")?;
    for file in &stats.largest {
        write_largest(w, file)?;
    }
    Ok(())
}

fn write_language(w: &mut impl Write, language: &LanguageStats) -> io::Result<()> {
    write!(w, "- extension: ")?;
    write_scalar(w, &language.extension)?;
    writeln!(w)?;
    writeln!(w, "  files: {}", language.files)?;
    writeln!(w, "  lines: {}", language.lines)?;
    writeln!(w, "  bytes: {}", language.bytes)
}

fn write_largest(w: &mut impl Write, file: &LargestFile) -> io::Result<()> {
    write!(w, "- path: ")?;
    write_scalar(w, &file.path)?;
    writeln!(w)?;
    writeln!(w, "  lines: {}", file.lines)?;
    writeln!(w, "  bytes: {}", file.bytes)
}

fn write_files(w: &mut impl Write, files: &[FileEntry]) -> io::Result<()> {
    writeln!(w, "files:")?;
    for file in files {
        write!(w, "- path: ")?;
        write_scalar(w, &file.path)?;
        writeln!(w)?;
        if let Some(error) = &file.error {
            write!(w, "  error: ")?;
            write_scalar(w, error)?;
            writeln!(w)?;
        }
        if let Some(contents) = &file.contents {
            write_block_scalar(w, "contents", contents, 2)?;
        }
        if let Some(chunks) = &file.chunks {
            if !chunks.is_empty() {
                writeln!(w, "  chunks:")?;
                for chunk in chunks {
                    write_chunk(w, chunk)?;
                }
            }
        }
    }
    Ok(())
}

fn write_chunk(w: &mut impl Write, chunk: &FileChunk) -> io::Result<()> {
    writeln!(w, "  - startLine: {}", chunk.start_line)?;
    writeln!(w, "    endLine: {}", chunk.end_line)?;
    write_block_scalar(w, "content", &chunk.content, 4)
}

fn write_block_scalar(
    w: &mut impl Write,
    key: &str,
    content: &str,
    indent: usize,
) -> io::Result<()> {
    write_indent(w, indent)?;
    writeln!(w, "{key}: |")?;
    for line in content.lines() {
        if line.is_empty() {
            writeln!(w)?;
        } else {
            write_indent(w, indent + 2)?;
            writeln!(w, "{line}")?;
        }
    }
    Ok(())
}

fn write_scalar(w: &mut impl Write, value: &str) -> io::Result<()> {
    if value.is_empty() {
        return write!(w, "''");
    }
    if !needs_quoting(value) {
        return write!(w, "{value}");
    }
    write!(w, "\"")?;
    for c in value.chars() {
        match c {
            '"' => write!(w, "\\\"")?,
            '\\' => write!(w, "\\\\")?,
            '\n' => write!(w, "\\n")?,
            '\r' => write!(w, "\\r")?,
            '\t' => write!(w, "\\t")?,
            other => write!(w, "{other}")?,
        }
    }
    write!(w, "\"")
}

fn needs_quoting(value: &str) -> bool {
    let Some(&first) = value.as_bytes().first() else {
        return true;
    };
    if matches!(
        first,
        b'-' | b'[' | b']' | b'{' | b'}' | b'\'' | b'"' | b'!' | b'&' | b'*'
            | b'|' | b'>' | b'%' | b'@' | b'`' | b',' | b'?' | b'#'
    ) {
        return true;
    }
    let lowered = value.to_ascii_lowercase();
    if matches!(lowered.as_str(), "true" | "false" | "null" | "yes" | "no" | "on" | "off") {
        return true;
    }
    value.chars().any(|c| matches!(c, ':' | '#' | '\n' | '\r'))
}

fn write_indent(w: &mut impl Write, n: usize) -> io::Result<()> {
    const SPACES: [u8; 32] = [b' '; 32];
    if n <= SPACES.len() {
        w.write_all(&SPACES[..n])
    } else {
        for _ in 0..n {
            w.write_all(b" ")?;
        }
        Ok(())
    }
}
