use std::path::Path;

use crate::languages::{ImportExtractor, SymbolExtractor, SymbolSpan};

pub struct RubyAnalyzer;

/// Common stdlib and bundler requires that never name project files.
const STDLIB_REQUIRES: &[&str] = &[
    "json", "yaml", "set", "date", "time", "uri", "net/http", "fileutils",
    "pathname", "logger", "securerandom", "digest", "base64", "erb",
    "optparse", "ostruct", "stringio", "tempfile", "open3", "socket",
    "bundler/setup", "rubygems",
];

impl ImportExtractor for RubyAnalyzer {
    fn extensions(&self) -> &[&'static str] {
        &["rb", "rake"]
    }

    fn extract_imports(&self, content: &str, rel_path: &Path, _root: &Path) -> Vec<String> {
        let file_dir = rel_path.parent().unwrap_or_else(|| Path::new(""));
        let mut references = Vec::new();

        for line in content.lines() {
            let trimmed = line.trim();
            if let Some(target) = quoted_argument(trimmed, "require_relative ") {
                let joined = file_dir.join(with_rb_extension(&target));
                references.push(slashed(&joined));
            } else if let Some(target) = quoted_argument(trimmed, "require ") {
                if !STDLIB_REQUIRES.contains(&target.as_str()) {
                    references.push(with_rb_extension(&target));
                }
            }
        }
        references
    }
}

impl SymbolExtractor for RubyAnalyzer {
    fn extensions(&self) -> &[&'static str] {
        &["rb", "rake"]
    }

    fn extract_symbols(&self, content: &str) -> Vec<SymbolSpan> {
        let mut symbols = Vec::new();
        let mut scopes: Vec<(String, &'static str)> = Vec::new();
        let mut block_depth: usize = 0;
        let mut in_block_comment = false;

        for (index, line) in content.lines().enumerate() {
            let line_num = index + 1;
            let trimmed = line.trim();

            if in_block_comment {
                if trimmed == "=end" {
                    in_block_comment = false;
                }
                continue;
            }
            if trimmed == "=begin" {
                in_block_comment = true;
                continue;
            }
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if trimmed == "end" || trimmed.starts_with("end ") || trimmed.starts_with("end;") {
                if block_depth > 0 {
                    block_depth -= 1;
                } else {
                    scopes.pop();
                }
                continue;
            }
            if opens_plain_block(trimmed) {
                block_depth += 1;
                continue;
            }

            let (visibility, rest) = split_visibility(trimmed);

            if let Some(name) = scope_name(rest, "module ") {
                symbols.push(SymbolSpan {
                    kind: "mod",
                    name: name.clone(),
                    line: line_num,
                    visibility,
                    parent: scopes.last().map(|(n, _)| n.clone()),
                    signature: trimmed.to_owned(),
                });
                scopes.push((name, "module"));
                continue;
            }

            if let Some(after) = rest.strip_prefix("class ") {
                let after = after.trim();
                if after.starts_with("<<") {
                    // singleton class block, still needs its `end`
                    block_depth += 1;
                    continue;
                }
                if let Some(name) = constant_path(after) {
                    symbols.push(SymbolSpan {
                        kind: "class",
                        name: name.clone(),
                        line: line_num,
                        visibility,
                        parent: scopes.last().map(|(n, _)| n.clone()),
                        signature: trimmed.to_owned(),
                    });
                    scopes.push((name, "class"));
                }
                continue;
            }

            if let Some(name) = method_name(rest) {
                let (kind, parent) = match scopes.last() {
                    Some((scope, _)) => ("method", Some(scope.clone())),
                    None => ("fn", None),
                };
                symbols.push(SymbolSpan {
                    kind,
                    name,
                    line: line_num,
                    visibility,
                    parent,
                    signature: trimmed.to_owned(),
                });
                block_depth += 1;
                continue;
            }

            if !scopes.is_empty() && block_depth == 0 {
                if let Some(name) = constant_assignment(rest) {
                    symbols.push(SymbolSpan {
                        kind: "const",
                        name,
                        line: line_num,
                        visibility,
                        parent: scopes.last().map(|(n, _)| n.clone()),
                        signature: trimmed.to_owned(),
                    });
                }
            }
        }

        symbols
    }
}

fn quoted_argument(trimmed: &str, prefix: &str) -> Option<String> {
    let rest = trimmed.strip_prefix(prefix)?.trim();
    let quote = match rest.chars().next() {
        Some(q @ ('\'' | '"')) => q,
        _ => return None,
    };
    let inner = &rest[1..];
    let end = inner.find(quote)?;
    let value = &inner[..end];
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

fn with_rb_extension(path: &str) -> String {
    if path.ends_with(".rb") {
        path.to_owned()
    } else {
        format!("{path}.rb")
    }
}

fn split_visibility(trimmed: &str) -> (Option<&'static str>, &str) {
    for (keyword, label) in [("private ", "private"), ("protected ", "protected")] {
        if let Some(rest) = trimmed.strip_prefix(keyword) {
            if rest.starts_with("def ") || rest.starts_with("class ") {
                return (Some(label), rest);
            }
        }
    }
    (None, trimmed)
}

fn scope_name(rest: &str, keyword: &str) -> Option<String> {
    constant_path(rest.strip_prefix(keyword)?.trim())
}

/// `Name` or `Outer::Inner`, stopping at the first unexpected character.
fn constant_path(text: &str) -> Option<String> {
    let end = text
        .find(|c: char| !c.is_alphanumeric() && c != '_' && c != ':')
        .unwrap_or(text.len());
    let name = text[..end].trim_end_matches(':');
    if name.is_empty() {
        None
    } else {
        Some(name.to_owned())
    }
}

fn method_name(rest: &str) -> Option<String> {
    let after = rest.strip_prefix("def ")?.trim();
    let after = after.strip_prefix("self.").unwrap_or(after);
    let end = after
        .find(|c: char| !c.is_alphanumeric() && c != '_' && c != '?' && c != '!')
        .unwrap_or(after.len());
    let name = &after[..end];
    if name.is_empty() {
        None
    } else {
        Some(name.to_owned())
    }
}

fn constant_assignment(rest: &str) -> Option<String> {
    let (name, value) = rest.split_once('=')?;
    if value.starts_with('=') {
        return None;
    }
    let name = name.trim();
    if name.len() < 2
        || !name.chars().next()?.is_uppercase()
        || !name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c == '_' || c.is_ascii_digit())
    {
        return None;
    }
    Some(name.to_owned())
}

/// Keyword blocks that consume an `end` without declaring anything.
fn opens_plain_block(trimmed: &str) -> bool {
    const OPENERS: &[&str] = &[
        "if ", "unless ", "case ", "while ", "until ", "for ", "begin",
    ];
    if trimmed == "begin" || trimmed == "do" {
        return true;
    }
    if OPENERS.iter().any(|k| trimmed.starts_with(k)) {
        return true;
    }
    trimmed.ends_with(" do") || trimmed.contains(" do |")
}

fn slashed(path: &Path) -> String {
    let text = path.to_string_lossy();
    if text.contains('\\') {
        text.replace('\\', "/")
    } else {
        text.into_owned()
    }
}
