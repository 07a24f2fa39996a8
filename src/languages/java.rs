use std::path::Path;

use crate::languages::common::{self, CommentTracker};
use crate::languages::{ImportExtractor, SymbolExtractor, SymbolSpan};

pub struct JavaAnalyzer;

impl ImportExtractor for JavaAnalyzer {
    fn extensions(&self) -> &[&'static str] {
        &["java"]
    }

    fn extract_imports(&self, content: &str, _rel_path: &Path, _root: &Path) -> Vec<String> {
        let mut references = Vec::new();
        for line in content.lines() {
            let trimmed = line.trim();
            let Some(rest) = trimmed.strip_prefix("import ") else {
                continue;
            };
            let rest = rest.strip_prefix("static ").unwrap_or(rest);
            let Some(path) = rest.strip_suffix(';') else {
                continue;
            };
            let path = path.trim();
            if !path.is_empty() && !is_jdk_package(path) {
                references.push(import_to_path(path));
            }
        }
        references
    }
}

impl SymbolExtractor for JavaAnalyzer {
    fn extensions(&self) -> &[&'static str] {
        &["java"]
    }

    fn extract_symbols(&self, content: &str) -> Vec<SymbolSpan> {
        let mut symbols = Vec::new();
        let mut comments = CommentTracker::new();
        let mut current_class: Option<String> = None;
        let mut class_depth: i32 = 0;
        let mut class_open = false;

        for (index, line) in content.lines().enumerate() {
            let line_num = index + 1;
            let trimmed = line.trim();

            if trimmed.is_empty() || comments.is_comment(trimmed, "//") {
                continue;
            }
            if trimmed.starts_with("import ") || trimmed.starts_with("package ") {
                continue;
            }
            if trimmed.starts_with('@') && !trimmed.starts_with("@interface ") {
                continue;
            }

            let (visibility, rest) = split_visibility(trimmed);
            let rest_clean = strip_modifiers(rest);

            // type declarations are recognized anywhere; the first class
            // becomes the parent scope for members
            let type_kinds: &[(&str, &'static str)] = &[
                ("class ", "class"),
                ("interface ", "interface"),
                ("enum ", "enum"),
                ("@interface ", "interface"),
                ("record ", "class"),
            ];
            let mut declared_type = false;
            let mut entered_scope = false;
            for &(keyword, kind) in type_kinds {
                if let Some(name) = common::keyword_name(rest_clean, keyword) {
                    symbols.push(SymbolSpan {
                        kind,
                        name: name.to_owned(),
                        line: line_num,
                        visibility,
                        parent: None,
                        signature: common::signature_to_brace(trimmed),
                    });
                    if kind == "class" && current_class.is_none() {
                        current_class = Some(name.to_owned());
                        class_depth = 0;
                        class_open = false;
                        common::track_braces(trimmed, &mut class_depth);
                        if class_depth >= 1 {
                            class_open = true;
                        }
                        entered_scope = true;
                    }
                    declared_type = true;
                    break;
                }
            }
            if declared_type {
                // nested declarations still count toward the enclosing
                // class's brace depth
                if !entered_scope && current_class.is_some() {
                    common::track_braces(trimmed, &mut class_depth);
                    if class_depth >= 1 {
                        class_open = true;
                    }
                    if class_open && class_depth <= 0 {
                        current_class = None;
                        class_open = false;
                    }
                }
                continue;
            }

            if let Some(class_name) = current_class.clone() {
                if class_open && class_depth == 1 {
                    if let Some(name) = member_method(rest_clean)
                        .or_else(|| constructor_name(rest_clean, &class_name))
                    {
                        symbols.push(SymbolSpan {
                            kind: "method",
                            name,
                            line: line_num,
                            visibility,
                            parent: Some(class_name.clone()),
                            signature: common::signature_to_brace(trimmed),
                        });
                    } else if let Some(name) = constant_field(rest) {
                        symbols.push(SymbolSpan {
                            kind: "const",
                            name,
                            line: line_num,
                            visibility,
                            parent: Some(class_name.clone()),
                            signature: trimmed.to_owned(),
                        });
                    }
                }
                common::track_braces(trimmed, &mut class_depth);
                if class_depth >= 1 {
                    class_open = true;
                }
                if class_open && class_depth <= 0 {
                    current_class = None;
                    class_open = false;
                }
            }
        }

        symbols
    }
}

fn split_visibility(trimmed: &str) -> (Option<&'static str>, &str) {
    if let Some(rest) = trimmed.strip_prefix("public ") {
        (Some("public"), rest)
    } else if let Some(rest) = trimmed.strip_prefix("protected ") {
        (Some("protected"), rest)
    } else if let Some(rest) = trimmed.strip_prefix("private ") {
        (Some("private"), rest)
    } else {
        (None, trimmed)
    }
}

fn strip_modifiers(rest: &str) -> &str {
    let mut s = rest;
    for modifier in [
        "static ", "final ", "abstract ", "synchronized ", "native ",
        "strictfp ", "transient ", "volatile ", "sealed ", "non-sealed ",
        "default ",
    ] {
        while let Some(r) = s.strip_prefix(modifier) {
            s = r;
        }
    }
    s
}

/// `ReturnType name(params…` with statement keywords filtered out.
fn member_method(rest: &str) -> Option<String> {
    const STATEMENTS: &[&str] = &[
        "if", "for", "while", "switch", "return", "throw", "new", "catch",
    ];
    for statement in STATEMENTS {
        if rest.strip_prefix(statement).is_some_and(|r| r.starts_with([' ', '('])) {
            return None;
        }
    }

    let paren = rest.find('(')?;
    let header = rest[..paren].trim();
    let tokens: Vec<&str> = header.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }
    let name = *tokens.last()?;
    if name.contains('.') || name.contains('<') {
        return None;
    }
    common::leading_ident(name).map(str::to_owned)
}

fn constructor_name(rest: &str, class_name: &str) -> Option<String> {
    let paren = rest.find('(')?;
    if rest[..paren].trim() == class_name {
        Some(class_name.to_owned())
    } else {
        None
    }
}

/// `static final UPPER_SNAKE` fields read as constants.
fn constant_field(rest: &str) -> Option<String> {
    if !rest.starts_with("static ") && !rest.contains("final ") {
        return None;
    }
    let cleaned = strip_modifiers(rest);
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }
    let name = tokens[1].trim_end_matches([';', '=']);
    if name.len() > 1
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c == '_' || c.is_ascii_digit())
    {
        Some(name.to_owned())
    } else {
        None
    }
}

fn is_jdk_package(path: &str) -> bool {
    const JDK_PREFIXES: &[&str] = &[
        "java.", "javax.", "sun.", "com.sun.", "jdk.", "org.w3c.", "org.xml.",
        "org.ietf.",
    ];
    JDK_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// `a.b.C` → `a/b/C.java`; wildcard imports become directory prefixes.
fn import_to_path(import: &str) -> String {
    if let Some(package) = import.strip_suffix(".*") {
        return format!("{}/", package.replace('.', "/"));
    }
    match import.rsplit_once('.') {
        Some((package, class)) => format!("{}/{class}.java", package.replace('.', "/")),
        None => format!("{import}.java"),
    }
}
