use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use once_cell::sync::Lazy;

use crate::languages::common::{self, CommentTracker};
use crate::languages::{ImportExtractor, SymbolExtractor, SymbolSpan};

pub struct GoAnalyzer;

/// Module paths parsed out of `go.mod`, keyed by the directory that holds
/// the file. Read-only after first lookup for a given directory.
static MODULE_CACHE: Lazy<Mutex<HashMap<PathBuf, Option<String>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

impl ImportExtractor for GoAnalyzer {
    fn extensions(&self) -> &[&'static str] {
        &["go"]
    }

    fn extract_imports(&self, content: &str, rel_path: &Path, root: &Path) -> Vec<String> {
        let absolute = root.join(rel_path);
        let Some(module) = module_path_for(&absolute) else {
            return Vec::new();
        };

        let mut references = Vec::new();
        for import in parse_import_paths(content) {
            if let Some(rest) = import.strip_prefix(module.as_str()) {
                let rel = rest.strip_prefix('/').unwrap_or(rest);
                if !rel.is_empty() {
                    references.push(format!("{rel}/"));
                }
            }
        }
        references
    }
}

fn module_path_for(file: &Path) -> Option<String> {
    let module_dir = nearest_go_mod_dir(file)?;
    let mut cache = MODULE_CACHE.lock().ok()?;
    if let Some(cached) = cache.get(&module_dir) {
        return cached.clone();
    }
    let parsed = parse_module_decl(&module_dir.join("go.mod"));
    cache.insert(module_dir, parsed.clone());
    parsed
}

fn nearest_go_mod_dir(file: &Path) -> Option<PathBuf> {
    let mut dir = if file.is_file() {
        file.parent()?.to_path_buf()
    } else {
        file.to_path_buf()
    };
    loop {
        if dir.join("go.mod").is_file() {
            return Some(dir);
        }
        if !dir.pop() {
            return None;
        }
    }
}

fn parse_module_decl(go_mod: &Path) -> Option<String> {
    let content = std::fs::read_to_string(go_mod).ok()?;
    content.lines().find_map(|line| {
        let module = line.trim().strip_prefix("module ")?.trim();
        if module.is_empty() {
            None
        } else {
            Some(module.to_owned())
        }
    })
}

fn parse_import_paths(content: &str) -> Vec<String> {
    let mut imports = Vec::new();
    let mut in_block = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if in_block {
            if trimmed.starts_with(')') {
                in_block = false;
                continue;
            }
            if trimmed.is_empty() || trimmed.starts_with("//") {
                continue;
            }
            if let Some(path) = first_quoted(trimmed) {
                imports.push(path.to_owned());
            }
        } else if trimmed.starts_with("import (") {
            in_block = true;
        } else if trimmed.starts_with("import ") {
            if let Some(path) = first_quoted(trimmed) {
                imports.push(path.to_owned());
            }
        }
    }
    imports
}

fn first_quoted(line: &str) -> Option<&str> {
    let start = line.find('"')? + 1;
    let rest = &line[start..];
    let end = rest.find('"')?;
    let path = &rest[..end];
    if path.is_empty() {
        None
    } else {
        Some(path)
    }
}

impl SymbolExtractor for GoAnalyzer {
    fn extensions(&self) -> &[&'static str] {
        &["go"]
    }

    fn extract_symbols(&self, content: &str) -> Vec<SymbolSpan> {
        let mut symbols = Vec::new();
        let mut comments = CommentTracker::new();
        let mut block_kind: Option<&'static str> = None;
        let mut paren_depth: i32 = 0;

        for (index, line) in content.lines().enumerate() {
            let line_num = index + 1;
            let trimmed = line.trim();

            if trimmed.is_empty() || comments.is_comment(trimmed, "//") {
                continue;
            }

            if let Some(kind) = block_kind {
                for c in trimmed.chars() {
                    match c {
                        '(' => paren_depth += 1,
                        ')' => paren_depth -= 1,
                        _ => {}
                    }
                }
                if paren_depth <= 0 {
                    block_kind = None;
                    continue;
                }
                if trimmed.starts_with(')') {
                    continue;
                }
                if let Some(name) = grouped_decl_name(trimmed) {
                    symbols.push(SymbolSpan {
                        kind,
                        name: name.to_owned(),
                        line: line_num,
                        visibility: exported(name),
                        parent: None,
                        signature: trimmed.to_owned(),
                    });
                }
                continue;
            }

            if trimmed.starts_with("func ") {
                if let Some(span) = parse_func(trimmed, line_num) {
                    symbols.push(span);
                }
            } else if trimmed.starts_with("type ") {
                if let Some(span) = parse_type(trimmed, line_num) {
                    symbols.push(span);
                }
            } else if trimmed.starts_with("const (") {
                block_kind = Some("const");
                paren_depth = 1;
            } else if trimmed.starts_with("var (") {
                block_kind = Some("var");
                paren_depth = 1;
            } else if let Some(after) = trimmed.strip_prefix("const ") {
                if let Some(name) = common::leading_ident(after) {
                    symbols.push(SymbolSpan {
                        kind: "const",
                        name: name.to_owned(),
                        line: line_num,
                        visibility: exported(name),
                        parent: None,
                        signature: common::signature_to_brace(trimmed),
                    });
                }
            } else if let Some(after) = trimmed.strip_prefix("var ") {
                if let Some(name) = common::leading_ident(after) {
                    symbols.push(SymbolSpan {
                        kind: "var",
                        name: name.to_owned(),
                        line: line_num,
                        visibility: exported(name),
                        parent: None,
                        signature: common::signature_to_brace(trimmed),
                    });
                }
            }
        }

        symbols
    }
}

fn parse_func(trimmed: &str, line_num: usize) -> Option<SymbolSpan> {
    let after = trimmed.strip_prefix("func ")?;

    if let Some(receiver_body) = after.strip_prefix('(') {
        let close = receiver_body.find(')')?;
        let parent = receiver_type(&receiver_body[..close]);
        let rest = receiver_body[close + 1..].trim();
        let paren = rest.find('(')?;
        let name = rest[..paren].trim();
        if name.is_empty() {
            return None;
        }
        return Some(SymbolSpan {
            kind: "method",
            name: name.to_owned(),
            line: line_num,
            visibility: exported(name),
            parent,
            signature: common::signature_to_brace(trimmed),
        });
    }

    let paren = after.find('(')?;
    let name = after[..paren].trim();
    if name.is_empty() {
        return None;
    }
    Some(SymbolSpan {
        kind: "fn",
        name: name.to_owned(),
        line: line_num,
        visibility: exported(name),
        parent: None,
        signature: common::signature_to_brace(trimmed),
    })
}

fn receiver_type(receiver: &str) -> Option<String> {
    let last = receiver.split_whitespace().last()?;
    let name = last.trim_start_matches('*');
    if name.is_empty() {
        None
    } else {
        Some(name.to_owned())
    }
}

fn parse_type(trimmed: &str, line_num: usize) -> Option<SymbolSpan> {
    let after = trimmed.strip_prefix("type ")?.trim();
    let name = common::leading_ident(after)?;
    let rest = after[name.len()..].trim_start();
    let kind = if rest.starts_with("struct") {
        "struct"
    } else if rest.starts_with("interface") {
        "interface"
    } else {
        "type"
    };
    Some(SymbolSpan {
        kind,
        name: name.to_owned(),
        line: line_num,
        visibility: exported(name),
        parent: None,
        signature: common::signature_to_brace(trimmed),
    })
}

fn grouped_decl_name(trimmed: &str) -> Option<&str> {
    let name = common::leading_ident(trimmed)?;
    if name == "_" {
        None
    } else {
        Some(name)
    }
}

fn exported(name: &str) -> Option<&'static str> {
    name.chars()
        .next()
        .filter(|c| c.is_uppercase())
        .map(|_| "pub")
}
