use std::path::Path;

use crate::languages::{ImportExtractor, SymbolExtractor, SymbolSpan};

pub struct PythonAnalyzer;

struct ImportLine {
    module: String,
    leading_dots: usize,
}

impl ImportExtractor for PythonAnalyzer {
    fn extensions(&self) -> &[&'static str] {
        &["py"]
    }

    fn extract_imports(&self, content: &str, rel_path: &Path, _root: &Path) -> Vec<String> {
        let file_dir = rel_path.parent().unwrap_or_else(|| Path::new(""));
        let mut references = Vec::new();

        for import in parse_import_lines(content) {
            if import.leading_dots > 0 {
                references.extend(relative_candidates(
                    file_dir,
                    import.leading_dots,
                    &import.module,
                ));
            } else {
                references.extend(absolute_candidates(&import.module));
            }
        }
        references
    }
}

/// Module references from `import a.b` and `from x import y` lines, with
/// docstrings and comments ignored.
fn parse_import_lines(content: &str) -> Vec<ImportLine> {
    let mut imports = Vec::new();
    let mut in_triple: Option<&str> = None;

    for line in content.lines() {
        let trimmed = line.trim();

        if let Some(delimiter) = in_triple {
            if trimmed.contains(delimiter) {
                in_triple = None;
            }
            continue;
        }
        if let Some(delimiter) = ["\"\"\"", "'''"]
            .into_iter()
            .find(|d| trimmed.contains(d))
        {
            if trimmed.matches(delimiter).count() == 1 {
                in_triple = Some(delimiter);
            }
            continue;
        }
        if trimmed.starts_with('#') {
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("from ") {
            let rest = rest.trim();
            if let Some(import_at) = rest.find(" import ") {
                let module_part = rest[..import_at].trim();
                let dots = module_part.chars().take_while(|&c| c == '.').count();
                imports.push(ImportLine {
                    module: module_part[dots..].to_owned(),
                    leading_dots: dots,
                });
            }
        } else if let Some(rest) = trimmed.strip_prefix("import ") {
            let rest = rest.trim();
            let module = rest.find(" as ").map_or(rest, |pos| &rest[..pos]);
            let module = module.split(',').next().unwrap_or("").trim();
            if !module.is_empty() {
                imports.push(ImportLine { module: module.to_owned(), leading_dots: 0 });
            }
        }
    }
    imports
}

/// `from .sibling import x` in `pkg/mod.py` → `pkg/sibling.py` or the
/// package directory's `__init__.py`. Each extra dot climbs one directory.
fn relative_candidates(file_dir: &Path, dots: usize, module: &str) -> Vec<String> {
    let mut base = file_dir.to_path_buf();
    for _ in 0..dots.saturating_sub(1) {
        base = base.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
    }
    let target = if module.is_empty() {
        base
    } else {
        base.join(module.replace('.', "/"))
    };
    let stem = slashed(&target);
    vec![format!("{stem}.py"), format!("{stem}/__init__.py")]
}

/// Absolute imports probe the full dotted path and every ancestor package.
fn absolute_candidates(module: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    let segments: Vec<&str> = module.split('.').collect();
    for take in (1..=segments.len()).rev() {
        let stem = segments[..take].join("/");
        candidates.push(format!("{stem}.py"));
        candidates.push(format!("{stem}/__init__.py"));
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

impl SymbolExtractor for PythonAnalyzer {
    fn extensions(&self) -> &[&'static str] {
        &["py"]
    }

    fn extract_symbols(&self, content: &str) -> Vec<SymbolSpan> {
        let mut symbols = Vec::new();
        let mut current_class: Option<(String, usize)> = None;

        for (index, line) in content.lines().enumerate() {
            let line_num = index + 1;
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('@') {
                continue;
            }

            let indent = line.len() - line.trim_start().len();
            if let Some((_, class_indent)) = &current_class {
                if indent <= *class_indent {
                    current_class = None;
                }
            }

            if trimmed.starts_with("class ") {
                if let Some(name) = class_name(trimmed) {
                    symbols.push(SymbolSpan {
                        kind: "class",
                        name: name.clone(),
                        line: line_num,
                        visibility: None,
                        parent: None,
                        signature: signature_to_colon(trimmed),
                    });
                    current_class = Some((name, indent));
                }
                continue;
            }

            let def_line = trimmed.strip_prefix("async ").unwrap_or(trimmed);
            if def_line.starts_with("def ") {
                if let Some(name) = def_name(def_line) {
                    let (kind, parent) = match &current_class {
                        Some((class_name, class_indent)) if indent > *class_indent => {
                            ("method", Some(class_name.clone()))
                        }
                        _ => ("fn", None),
                    };
                    symbols.push(SymbolSpan {
                        kind,
                        name,
                        line: line_num,
                        visibility: None,
                        parent,
                        signature: signature_to_colon(trimmed),
                    });
                }
                continue;
            }

            if indent == 0 && current_class.is_none() {
                if let Some(name) = upper_snake_const(trimmed) {
                    symbols.push(SymbolSpan {
                        kind: "const",
                        name,
                        line: line_num,
                        visibility: None,
                        parent: None,
                        signature: trimmed.to_owned(),
                    });
                }
            }
        }

        symbols
    }
}

fn class_name(trimmed: &str) -> Option<String> {
    let after = trimmed.strip_prefix("class ")?;
    let end = after.find(|c: char| !c.is_alphanumeric() && c != '_')?;
    let name = &after[..end];
    if name.is_empty() {
        None
    } else {
        Some(name.to_owned())
    }
}

fn def_name(def_line: &str) -> Option<String> {
    let after = def_line.strip_prefix("def ")?;
    let paren = after.find('(')?;
    let name = after[..paren].trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_owned())
    }
}

/// Top-level `UPPER_SNAKE = …` assignments, excluding comparisons.
fn upper_snake_const(trimmed: &str) -> Option<String> {
    let eq = trimmed.find('=')?;
    if eq == 0 || trimmed.as_bytes().get(eq + 1) == Some(&b'=') {
        return None;
    }
    if matches!(trimmed.as_bytes()[eq - 1], b'!' | b'<' | b'>') {
        return None;
    }
    let name = trimmed[..eq].trim();
    if name.is_empty()
        || name.starts_with('_')
        || name.starts_with(|c: char| c.is_ascii_digit())
        || !name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c == '_' || c.is_ascii_digit())
    {
        return None;
    }
    Some(name.to_owned())
}

fn signature_to_colon(trimmed: &str) -> String {
    match trimmed.rfind(':') {
        Some(pos) => trimmed[..=pos].to_owned(),
        None => trimmed.to_owned(),
    }
}
