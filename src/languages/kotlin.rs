use std::path::Path;

use crate::languages::common::{self, CommentTracker};
use crate::languages::{ImportExtractor, SymbolExtractor, SymbolSpan};

pub struct KotlinAnalyzer;

impl ImportExtractor for KotlinAnalyzer {
    fn extensions(&self) -> &[&'static str] {
        &["kt", "kts"]
    }

    fn extract_imports(&self, content: &str, _rel_path: &Path, _root: &Path) -> Vec<String> {
        let mut references = Vec::new();
        for line in content.lines() {
            let trimmed = line.trim();
            let Some(rest) = trimmed.strip_prefix("import ") else {
                continue;
            };
            let path = rest.trim().trim_end_matches(';');
            if path.is_empty() || is_stdlib(path) {
                continue;
            }
            references.push(import_to_path(path));
        }
        references
    }
}

impl SymbolExtractor for KotlinAnalyzer {
    fn extensions(&self) -> &[&'static str] {
        &["kt", "kts"]
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
                continue;
            }
            if trimmed.starts_with("import ")
                || trimmed.starts_with("package ")
                || trimmed.starts_with('@')
            {
                continue;
            }

            let in_class = current_class.is_some();
            if in_class {
                common::track_braces(trimmed, &mut class_depth);
                if class_depth <= 0 {
                    current_class = None;
                    // the closing line may still start a new declaration
                    if trimmed == "}" {
                        continue;
                    }
                }
            }

            let (visibility, rest) = split_visibility(trimmed);
            let rest_clean = strip_modifiers(rest);

            if let Some((kind, name)) = type_decl(rest_clean) {
                symbols.push(SymbolSpan {
                    kind,
                    name: name.clone(),
                    line: line_num,
                    visibility,
                    parent: None,
                    signature: common::signature_to_brace(trimmed),
                });
                if trimmed.contains('{') && current_class.is_none() {
                    current_class = Some(name);
                    class_depth = 0;
                    common::track_braces(trimmed, &mut class_depth);
                }
                continue;
            }

            if let Some(name) = object_decl(rest_clean) {
                symbols.push(SymbolSpan {
                    kind: "class",
                    name,
                    line: line_num,
                    visibility,
                    parent: current_class.clone(),
                    signature: common::signature_to_brace(trimmed),
                });
                continue;
            }

            if rest_clean.starts_with("fun ") || rest_clean.starts_with("fun<") {
                if let Some(name) = fun_name(rest_clean) {
                    let (kind, parent) = if current_class.is_some() {
                        ("method", current_class.clone())
                    } else {
                        ("fn", None)
                    };
                    symbols.push(SymbolSpan {
                        kind,
                        name,
                        line: line_num,
                        visibility,
                        parent,
                        signature: common::signature_to_brace(trimmed),
                    });
                    continue;
                }
            }

            if current_class.is_some() && class_depth == 1 {
                if let Some(name) = property_name(rest_clean) {
                    symbols.push(SymbolSpan {
                        kind: "const",
                        name,
                        line: line_num,
                        visibility,
                        parent: current_class.clone(),
                        signature: trimmed.to_owned(),
                    });
                }
            }
        }

        symbols
    }
}

fn split_visibility(trimmed: &str) -> (Option<&'static str>, &str) {
    if let Some(rest) = trimmed.strip_prefix("public ") {
        (Some("public"), rest)
    } else if let Some(rest) = trimmed.strip_prefix("private ") {
        (Some("private"), rest)
    } else if let Some(rest) = trimmed.strip_prefix("protected ") {
        (Some("protected"), rest)
    } else if let Some(rest) = trimmed.strip_prefix("internal ") {
        (Some("internal"), rest)
    } else {
        (None, trimmed)
    }
}

fn strip_modifiers(rest: &str) -> &str {
    let mut s = rest;
    for modifier in [
        "open ", "final ", "abstract ", "sealed ", "data ", "inner ",
        "override ", "inline ", "noinline ", "crossinline ", "external ",
        "operator ", "infix ", "suspend ", "tailrec ", "actual ", "expect ",
        "companion ", "lateinit ", "const ", "enum ", "annotation ", "value ",
    ] {
        while let Some(r) = s.strip_prefix(modifier) {
            s = r;
        }
    }
    s
}

fn type_decl(rest: &str) -> Option<(&'static str, String)> {
    let (after, kind) = if let Some(after) = rest.strip_prefix("class ") {
        (after, "class")
    } else if let Some(after) = rest.strip_prefix("interface ") {
        (after, "interface")
    } else {
        return None;
    };
    let name = common::leading_ident(after)?;
    Some((kind, name.to_owned()))
}

fn object_decl(rest: &str) -> Option<String> {
    let after = rest.strip_prefix("object ")?;
    if after.starts_with(':') || after.starts_with('{') {
        return None;
    }
    common::leading_ident(after).map(str::to_owned)
}

/// Function name, skipping generic parameter lists and taking the member
/// name of extension functions (`fun String.shout()` → `shout`).
fn fun_name(rest: &str) -> Option<String> {
    let after = rest.strip_prefix("fun")?;
    let after = if let Some(generics) = after.strip_prefix('<') {
        let close = generics.find('>')?;
        &generics[close + 1..]
    } else {
        after
    };
    let after = after.trim_start();

    let paren = after.find('(').unwrap_or(after.len());
    if let Some(dot) = after.find('.') {
        if dot < paren {
            return common::leading_ident(&after[dot + 1..]).map(str::to_owned);
        }
    }
    common::leading_ident(after).map(str::to_owned)
}

fn property_name(rest: &str) -> Option<String> {
    let after = rest.strip_prefix("val ").or_else(|| rest.strip_prefix("var "))?;
    common::leading_ident(after).map(str::to_owned)
}

fn is_stdlib(path: &str) -> bool {
    path.starts_with("kotlin.")
        || path.starts_with("java.")
        || path.starts_with("javax.")
        || path.starts_with("kotlinx.coroutines.")
}

fn import_to_path(import: &str) -> String {
    let clean = import.find(" as ").map_or(import, |pos| &import[..pos]);
    if let Some(package) = clean.strip_suffix(".*") {
        return format!("{}/", package.replace('.', "/"));
    }
    match clean.rsplit_once('.') {
        Some((package, name)) => format!("{}/{name}.kt", package.replace('.', "/")),
        None => format!("{clean}.kt"),
    }
}
