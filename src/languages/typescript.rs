use std::path::Path;

use crate::languages::common::{self, CommentTracker};
use crate::languages::{ImportExtractor, SymbolExtractor, SymbolSpan};

pub struct TypeScriptAnalyzer;

const EXTENSIONS: &[&'static str] = &["ts", "tsx", "js", "jsx", "mjs", "mts"];

impl ImportExtractor for TypeScriptAnalyzer {
    fn extensions(&self) -> &[&'static str] {
        EXTENSIONS
    }

    fn extract_imports(&self, content: &str, rel_path: &Path, _root: &Path) -> Vec<String> {
        let file_dir = rel_path.parent().unwrap_or_else(|| Path::new(""));
        let mut references = Vec::new();

        for line in content.lines() {
            let trimmed = line.trim();
            if let Some(target) = import_target(trimmed).or_else(|| require_target(trimmed)) {
                if target.starts_with("./") || target.starts_with("../") {
                    references.extend(module_candidates(file_dir, target));
                }
            }
        }

        references
    }
}

impl SymbolExtractor for TypeScriptAnalyzer {
    fn extensions(&self) -> &[&'static str] {
        EXTENSIONS
    }

    fn extract_symbols(&self, content: &str) -> Vec<SymbolSpan> {
        let mut symbols = Vec::new();
        let mut comments = CommentTracker::new();
        let mut current_class: Option<String> = None;
        let mut class_depth: i32 = 0;

        for (index, line) in content.lines().enumerate() {
            let line_num = index + 1;
            let trimmed = line.trim();

            if trimmed.is_empty() || comments.is_comment(trimmed, "//") {
                if current_class.is_some() {
                    common::track_braces(trimmed, &mut class_depth);
                    if class_depth <= 0 {
                        current_class = None;
                    }
                }
                continue;
            }

            if let Some(class_name) = &current_class {
                if class_depth == 1 {
                    if let Some(name) = member_method_name(trimmed) {
                        symbols.push(SymbolSpan {
                            kind: "method",
                            name,
                            line: line_num,
                            visibility: None,
                            parent: Some(class_name.clone()),
                            signature: common::signature_to_brace(trimmed),
                        });
                    }
                }
                common::track_braces(trimmed, &mut class_depth);
                if class_depth <= 0 {
                    current_class = None;
                }
                continue;
            }

            let (visibility, rest) = split_export(trimmed);
            let rest = strip_decl_modifiers(rest);

            if let Some(name) = fn_decl_name(rest) {
                symbols.push(SymbolSpan {
                    kind: "fn",
                    name: name.to_owned(),
                    line: line_num,
                    visibility,
                    parent: None,
                    signature: common::signature_to_brace(trimmed),
                });
                continue;
            }

            if let Some(name) = common::keyword_name(rest, "class ") {
                symbols.push(SymbolSpan {
                    kind: "class",
                    name: name.to_owned(),
                    line: line_num,
                    visibility,
                    parent: None,
                    signature: common::signature_to_brace(trimmed),
                });
                let mut depth = 0;
                common::track_braces(trimmed, &mut depth);
                if depth > 0 {
                    current_class = Some(name.to_owned());
                    class_depth = depth;
                }
                continue;
            }

            let keyword_kinds: &[(&str, &'static str)] = &[
                ("interface ", "interface"),
                ("const enum ", "enum"),
                ("enum ", "enum"),
                ("type ", "type"),
            ];
            let mut matched = false;
            for &(keyword, kind) in keyword_kinds {
                if let Some(name) = common::keyword_name(rest, keyword) {
                    symbols.push(SymbolSpan {
                        kind,
                        name: name.to_owned(),
                        line: line_num,
                        visibility,
                        parent: None,
                        signature: common::signature_to_brace(trimmed),
                    });
                    matched = true;
                    break;
                }
            }
            if matched {
                continue;
            }

            if let Some(name) = common::keyword_name(rest, "const ") {
                symbols.push(SymbolSpan {
                    kind: "const",
                    name: name.to_owned(),
                    line: line_num,
                    visibility,
                    parent: None,
                    signature: common::signature_to_brace(trimmed),
                });
            }
        }

        symbols
    }
}

fn split_export(trimmed: &str) -> (Option<&'static str>, &str) {
    match trimmed.strip_prefix("export ") {
        Some(rest) => {
            let rest = rest.strip_prefix("default ").unwrap_or(rest);
            (Some("export"), rest)
        }
        None => (None, trimmed),
    }
}

fn strip_decl_modifiers(rest: &str) -> &str {
    let mut s = rest;
    loop {
        if let Some(r) = s.strip_prefix("declare ") {
            s = r;
        } else if let Some(r) = s.strip_prefix("abstract ") {
            s = r;
        } else if let Some(r) = s.strip_prefix("async ") {
            s = r;
        } else {
            break;
        }
    }
    s
}

fn fn_decl_name(rest: &str) -> Option<&str> {
    let after = rest.strip_prefix("function")?;
    if !after.starts_with(' ') && !after.starts_with('*') {
        return None;
    }
    let after = after.trim_start_matches(['*', ' ']);
    common::leading_ident(after)
}

/// Class-member method: `name(...)` after optional member modifiers, with
/// statement keywords excluded.
fn member_method_name(trimmed: &str) -> Option<String> {
    let mut rest = trimmed;
    for modifier in [
        "public ", "private ", "protected ", "readonly ", "static ", "async ",
        "override ", "get ", "set ", "*",
    ] {
        while let Some(r) = rest.strip_prefix(modifier) {
            rest = r;
        }
    }

    let paren = rest.find('(')?;
    let name = rest[..paren].trim();
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$') {
        return None;
    }
    const STATEMENTS: &[&str] = &[
        "if", "for", "while", "switch", "return", "catch", "function", "new", "super",
    ];
    if STATEMENTS.contains(&name) {
        return None;
    }
    Some(name.to_owned())
}

fn import_target(line: &str) -> Option<&str> {
    if !line.starts_with("import ") && !line.starts_with("export ") {
        return None;
    }
    let from = line.find(" from ")?;
    quoted_string(&line[from + 6..])
}

fn require_target(line: &str) -> Option<&str> {
    let call = line.find("require(")?;
    quoted_string(&line[call + 8..])
}

fn quoted_string(text: &str) -> Option<&str> {
    let text = text.trim_start();
    let quote = match text.chars().next() {
        Some(q @ ('\'' | '"')) => q,
        _ => return None,
    };
    let inner = &text[1..];
    let end = inner.find(quote)?;
    let value = &inner[..end];
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Extension probing: `./x` may be any of the handled extensions or a
/// directory with an index module.
fn module_candidates(base: &Path, target: &str) -> Vec<String> {
    let stem = slashed(&base.join(target));
    let mut candidates: Vec<String> = EXTENSIONS
        .iter()
        .map(|ext| format!("{stem}.{ext}"))
        .collect();
    for ext in ["ts", "tsx", "js", "jsx"] {
        candidates.push(format!("{stem}/index.{ext}"));
    }
    candidates
}

fn slashed(path: &Path) -> String {
    let text = path.to_string_lossy();
    if text.contains('\\') {
        text.replace('\\', "/")
    } else {
        text.into_owned()
    }
}
