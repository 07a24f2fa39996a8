use std::path::Path;

use crate::languages::common::{self, CommentTracker};
use crate::languages::{ImportExtractor, SymbolExtractor, SymbolSpan};

pub struct RustAnalyzer;

impl ImportExtractor for RustAnalyzer {
    fn extensions(&self) -> &[&'static str] {
        &["rs"]
    }

    fn extract_imports(&self, content: &str, rel_path: &Path, _root: &Path) -> Vec<String> {
        let file_dir = rel_path.parent().unwrap_or_else(|| Path::new(""));
        let mut references = Vec::new();

        for line in content.lines() {
            let trimmed = line.trim();
            let (_, rest) = split_visibility(trimmed);

            if let Some(after) = rest.strip_prefix("mod ") {
                if let Some(name) = module_decl_name(after) {
                    if name != "tests" {
                        references.push(slashed(&file_dir.join(format!("{name}.rs"))));
                        references.push(slashed(&file_dir.join(name).join("mod.rs")));
                    }
                }
            } else if let Some(after) = rest.strip_prefix("use crate::") {
                if let Some(segments) = use_path_segments(after) {
                    references.extend(crate_candidates(&segments));
                }
            } else if let Some(after) = rest.strip_prefix("use super::") {
                if let Some(segments) = use_path_segments(after) {
                    let parent = file_dir.parent().unwrap_or_else(|| Path::new(""));
                    references.extend(relative_candidates(parent, &segments));
                }
            } else if let Some(after) = rest.strip_prefix("use self::") {
                if let Some(segments) = use_path_segments(after) {
                    references.extend(relative_candidates(file_dir, &segments));
                }
            }
        }

        references
    }
}

impl SymbolExtractor for RustAnalyzer {
    fn extensions(&self) -> &[&'static str] {
        &["rs"]
    }

    fn extract_symbols(&self, content: &str) -> Vec<SymbolSpan> {
        let mut symbols = Vec::new();
        let mut comments = CommentTracker::new();
        let mut current_impl: Option<String> = None;
        let mut impl_depth: i32 = 0;

        for (index, line) in content.lines().enumerate() {
            let line_num = index + 1;
            let trimmed = line.trim();

            if trimmed.is_empty() || comments.is_comment(trimmed, "//") {
                continue;
            }

            if let Some(impl_name) = &current_impl {
                if impl_depth == 1 {
                    let (visibility, rest) = split_visibility(trimmed);
                    if let Some(name) = fn_name(rest) {
                        symbols.push(SymbolSpan {
                            kind: "method",
                            name: name.to_owned(),
                            line: line_num,
                            visibility,
                            parent: Some(impl_name.clone()),
                            signature: common::signature_to_brace(trimmed),
                        });
                    }
                }
                common::track_braces(trimmed, &mut impl_depth);
                if impl_depth <= 0 {
                    current_impl = None;
                }
                continue;
            }

            // declarations are only recognized at the top level
            let indent = line.len() - line.trim_start().len();
            if indent != 0 {
                continue;
            }

            let (visibility, rest) = split_visibility(trimmed);
            let rest = strip_item_modifiers(rest);

            if is_impl_header(rest) {
                if let Some(target) = impl_target(rest) {
                    let mut depth = 0;
                    common::track_braces(trimmed, &mut depth);
                    if depth > 0 {
                        current_impl = Some(target);
                        impl_depth = depth;
                    }
                }
                continue;
            }

            if let Some(name) = fn_name(rest) {
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

            let keyword_kinds: &[(&str, &'static str)] = &[
                ("struct ", "struct"),
                ("enum ", "enum"),
                ("trait ", "trait"),
                ("type ", "type"),
                ("mod ", "mod"),
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

/// `pub`, `pub(crate)`, `pub(super)`, `pub(in …)` all surface as `pub`.
fn split_visibility(trimmed: &str) -> (Option<&'static str>, &str) {
    if let Some(rest) = trimmed.strip_prefix("pub(") {
        if let Some(close) = rest.find(')') {
            return (Some("pub"), rest[close + 1..].trim_start());
        }
    }
    if let Some(rest) = trimmed.strip_prefix("pub ") {
        return (Some("pub"), rest);
    }
    (None, trimmed)
}

fn strip_item_modifiers(rest: &str) -> &str {
    let mut s = rest;
    loop {
        if let Some(r) = s.strip_prefix("unsafe ") {
            s = r;
        } else if let Some(r) = s.strip_prefix("async ") {
            s = r;
        } else if s.starts_with("extern \"") {
            match s.find("\" ") {
                Some(pos) => s = s[pos + 2..].trim_start(),
                None => break,
            }
        } else {
            break;
        }
    }
    s
}

fn fn_name(rest: &str) -> Option<&str> {
    let rest = strip_item_modifiers(rest);
    let rest = rest.strip_prefix("const ").unwrap_or(rest);
    let rest = strip_item_modifiers(rest);
    common::leading_ident(rest.strip_prefix("fn ")?)
}

fn is_impl_header(rest: &str) -> bool {
    rest == "impl" || rest.starts_with("impl ") || rest.starts_with("impl<")
}

/// The implementing type: last path segment before `{`, or the segment
/// after `for` in trait impls, generics stripped.
fn impl_target(rest: &str) -> Option<String> {
    let after = rest.strip_prefix("impl")?;
    let after = skip_generics(after);
    let header = after.split('{').next().unwrap_or(after);
    let target = match header.find(" for ") {
        Some(pos) => &header[pos + 5..],
        None => header,
    };
    let target = target.trim_start_matches(['&', ' ']);
    common::leading_ident(target).map(str::to_owned)
}

fn skip_generics(s: &str) -> &str {
    let rest = s.trim_start();
    if !rest.starts_with('<') {
        return s;
    }
    let mut depth = 0i32;
    for (i, c) in rest.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return &rest[i + 1..];
                }
            }
            _ => {}
        }
    }
    rest
}

fn module_decl_name(after: &str) -> Option<&str> {
    let name = after.trim().strip_suffix(';')?.trim();
    if name.is_empty() || name.contains(' ') || name.contains('{') {
        return None;
    }
    Some(name)
}

/// Path segments of a `use` target up to the first `;`, `{`, or space,
/// with any trailing `::` dropped.
fn use_path_segments(after: &str) -> Option<Vec<&str>> {
    let end = after.find([';', '{', ' '])?;
    let path = after[..end].trim_end_matches(':');
    if path.is_empty() {
        return None;
    }
    Some(path.split("::").collect())
}

/// `use crate::a::b::C` may point at `src/a/b/C.rs` or at an item inside
/// `src/a/b.rs`; both are offered for resolution.
fn crate_candidates(segments: &[&str]) -> Vec<String> {
    let mut candidates = Vec::new();
    candidates.push(format!("src/{}.rs", segments.join("/")));
    if segments.len() > 1 {
        candidates.push(format!("src/{}.rs", segments[..segments.len() - 1].join("/")));
    }
    candidates
}

fn relative_candidates(base: &Path, segments: &[&str]) -> Vec<String> {
    let mut candidates = Vec::new();
    candidates.push(slashed(&base.join(format!("{}.rs", segments.join("/")))));
    if segments.len() > 1 {
        candidates.push(slashed(
            &base.join(format!("{}.rs", segments[..segments.len() - 1].join("/"))),
        ));
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
