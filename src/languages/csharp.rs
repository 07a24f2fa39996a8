use std::path::Path;

use crate::languages::common::{self, CommentTracker};
use crate::languages::{ImportExtractor, SymbolExtractor, SymbolSpan};

pub struct CSharpAnalyzer;

/// Namespaces provided by the BCL or ubiquitous packages; `using` lines for
/// these never point at project files.
const EXTERNAL_NAMESPACES: &[&str] = &[
    "System", "Microsoft", "Newtonsoft", "NuGet", "Xunit", "Moq",
    "AutoMapper", "FluentValidation", "Serilog", "MediatR", "Polly", "Dapper",
];

impl ImportExtractor for CSharpAnalyzer {
    fn extensions(&self) -> &[&'static str] {
        &["cs"]
    }

    fn extract_imports(&self, content: &str, _rel_path: &Path, _root: &Path) -> Vec<String> {
        let mut references = Vec::new();
        for line in content.lines() {
            let trimmed = line.trim();
            if let Some(namespace) = using_namespace(trimmed) {
                if !is_external(namespace) {
                    references.push(namespace_prefix(namespace));
                }
            }
        }
        references
    }
}

impl SymbolExtractor for CSharpAnalyzer {
    fn extensions(&self) -> &[&'static str] {
        &["cs"]
    }

    fn extract_symbols(&self, content: &str) -> Vec<SymbolSpan> {
        let mut symbols = Vec::new();
        let mut comments = CommentTracker::new();
        let mut current_type: Option<String> = None;
        let mut type_depth: i32 = 0;
        let mut type_open = false;

        for (index, line) in content.lines().enumerate() {
            let line_num = index + 1;
            let trimmed = line.trim();

            if trimmed.is_empty() || comments.is_comment(trimmed, "//") {
                continue;
            }
            if trimmed.starts_with("using ") || trimmed.starts_with('[') {
                continue;
            }

            if let Some(type_name) = current_type.clone() {
                if type_open && type_depth == 1 {
                    let (visibility, rest) = split_visibility(trimmed);
                    let rest = strip_member_modifiers(rest);
                    if let Some(name) = method_name(rest, &type_name) {
                        symbols.push(SymbolSpan {
                            kind: "method",
                            name,
                            line: line_num,
                            visibility,
                            parent: Some(type_name.clone()),
                            signature: common::signature_to_brace(trimmed),
                        });
                    }
                }
                common::track_braces(trimmed, &mut type_depth);
                if type_depth >= 1 {
                    type_open = true;
                }
                if type_open && type_depth <= 0 {
                    current_type = None;
                    type_open = false;
                }
                continue;
            }

            let (visibility, rest) = split_visibility(trimmed);
            let rest = strip_member_modifiers(rest);

            if let Some(name) = common::keyword_name(rest, "namespace ") {
                // both block-style and file-scoped (`namespace X;`) forms
                let name = qualified_tail(rest, name);
                symbols.push(SymbolSpan {
                    kind: "namespace",
                    name,
                    line: line_num,
                    visibility,
                    parent: None,
                    signature: common::signature_to_brace(trimmed),
                });
                continue;
            }

            let type_kinds: &[(&str, &'static str)] = &[
                ("class ", "class"),
                ("interface ", "interface"),
                ("struct ", "struct"),
                ("record ", "class"),
                ("enum ", "enum"),
            ];
            for &(keyword, kind) in type_kinds {
                if let Some(name) = common::keyword_name(rest, keyword) {
                    symbols.push(SymbolSpan {
                        kind,
                        name: name.to_owned(),
                        line: line_num,
                        visibility,
                        parent: None,
                        signature: common::signature_to_brace(trimmed),
                    });
                    if kind != "enum" && !trimmed.ends_with(';') {
                        current_type = Some(name.to_owned());
                        type_depth = 0;
                        type_open = false;
                        common::track_braces(trimmed, &mut type_depth);
                        if type_depth >= 1 {
                            type_open = true;
                        }
                    }
                    break;
                }
            }
        }

        symbols
    }
}

fn using_namespace(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("using ")?;
    if rest.starts_with("static ") || rest.starts_with("var ") || rest.contains('=') {
        return None;
    }
    let namespace = rest.strip_suffix(';')?.trim();
    if namespace.is_empty() {
        None
    } else {
        Some(namespace)
    }
}

fn is_external(namespace: &str) -> bool {
    EXTERNAL_NAMESPACES
        .iter()
        .any(|prefix| namespace == *prefix || namespace.starts_with(&format!("{prefix}.")))
}

/// `My.App.Services` → `App/Services/`: the leading segment names the
/// project, the rest mirrors the directory layout.
fn namespace_prefix(namespace: &str) -> String {
    let segments: Vec<&str> = namespace.split('.').collect();
    if segments.len() <= 1 {
        format!("{namespace}/")
    } else {
        format!("{}/", segments[1..].join("/"))
    }
}

fn split_visibility(trimmed: &str) -> (Option<&'static str>, &str) {
    if let Some(rest) = trimmed.strip_prefix("public ") {
        (Some("public"), rest)
    } else if let Some(rest) = trimmed.strip_prefix("private ") {
        (Some("private"), rest)
    } else if let Some(rest) = trimmed.strip_prefix("protected internal ") {
        (Some("protected"), rest)
    } else if let Some(rest) = trimmed.strip_prefix("protected ") {
        (Some("protected"), rest)
    } else if let Some(rest) = trimmed.strip_prefix("internal ") {
        (Some("internal"), rest)
    } else {
        (None, trimmed)
    }
}

fn strip_member_modifiers(rest: &str) -> &str {
    let mut s = rest;
    for modifier in [
        "static ", "sealed ", "abstract ", "partial ", "virtual ", "override ",
        "async ", "readonly ", "unsafe ", "new ", "extern ",
    ] {
        while let Some(r) = s.strip_prefix(modifier) {
            s = r;
        }
    }
    s
}

fn qualified_tail(rest: &str, first: &str) -> String {
    let after = rest.strip_prefix("namespace ").unwrap_or(rest).trim();
    let end = after
        .find(|c: char| !c.is_alphanumeric() && c != '_' && c != '.')
        .unwrap_or(after.len());
    let name = after[..end].trim_end_matches('.');
    if name.is_empty() {
        first.to_owned()
    } else {
        name.to_owned()
    }
}

/// A member whose parenthesized parameter list follows at least a return
/// type and a name, or a constructor named after the type.
fn method_name(rest: &str, type_name: &str) -> Option<String> {
    const STATEMENTS: &[&str] = &[
        "if", "for", "foreach", "while", "switch", "return", "throw", "new",
        "catch", "using", "lock", "base", "this",
    ];
    let paren = rest.find('(')?;
    let header = rest[..paren].trim();
    let tokens: Vec<&str> = header.split_whitespace().collect();

    let candidate = match tokens.as_slice() {
        [] => return None,
        [only] => {
            // no return type: only constructors qualify
            if *only == type_name {
                *only
            } else {
                return None;
            }
        }
        [.., last] => *last,
    };
    if STATEMENTS.contains(&candidate) || tokens.iter().any(|t| STATEMENTS.contains(t)) {
        return None;
    }
    let clean = candidate
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .next()
        .unwrap_or("");
    if clean.is_empty() {
        None
    } else {
        Some(clean.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imports(content: &str) -> Vec<String> {
        CSharpAnalyzer.extract_imports(content, Path::new("Services/Billing.cs"), Path::new("/r"))
    }

    fn symbols(content: &str) -> Vec<SymbolSpan> {
        CSharpAnalyzer.extract_symbols(content)
    }

    #[test]
    fn using_maps_to_directory_prefix() {
        let refs = imports("using MyApp.Services.Billing;\n");
        assert_eq!(refs, vec!["Services/Billing/"]);
    }

    #[test]
    fn single_segment_namespace_keeps_name() {
        let refs = imports("using MyApp;\n");
        assert_eq!(refs, vec!["MyApp/"]);
    }

    #[test]
    fn bcl_namespaces_are_skipped() {
        let refs = imports("using System;\nusing System.Linq;\nusing Microsoft.Extensions.Logging;\n");
        assert!(refs.is_empty());
    }

    #[test]
    fn using_static_and_aliases_are_skipped() {
        let refs = imports("using static MyApp.Util;\nusing Alias = MyApp.Long.Name;\n");
        assert!(refs.is_empty());
    }

    #[test]
    fn class_with_methods_and_visibility() {
        let content = "public class OrderService\n{\n    public void Submit(Order order)\n    {\n    }\n\n    private bool Validate(Order order)\n    {\n        return true;\n    }\n}\n";
        let syms = symbols(content);
        assert_eq!(syms[0].kind, "class");
        assert_eq!(syms[0].name, "OrderService");
        assert_eq!(syms[0].visibility, Some("public"));
        let methods: Vec<&SymbolSpan> = syms.iter().filter(|s| s.kind == "method").collect();
        assert_eq!(methods.len(), 2);
        assert!(methods.iter().all(|m| m.parent.as_deref() == Some("OrderService")));
        assert!(methods.iter().any(|m| m.name == "Submit" && m.visibility == Some("public")));
        assert!(methods.iter().any(|m| m.name == "Validate" && m.visibility == Some("private")));
    }

    #[test]
    fn constructor_is_a_method() {
        let content = "public class Widget\n{\n    public Widget(int size)\n    {\n    }\n}\n";
        let syms = symbols(content);
        assert!(syms.iter().any(|s| s.kind == "method" && s.name == "Widget"));
    }

    #[test]
    fn namespace_declaration() {
        let syms = symbols("namespace MyApp.Services\n{\n}\n");
        assert_eq!(syms[0].kind, "namespace");
        assert_eq!(syms[0].name, "MyApp.Services");
    }

    #[test]
    fn file_scoped_namespace() {
        let syms = symbols("namespace MyApp.Services;\n\npublic class A\n{\n}\n");
        assert_eq!(syms[0].kind, "namespace");
        assert_eq!(syms[0].name, "MyApp.Services");
        assert!(syms.iter().any(|s| s.kind == "class" && s.name == "A"));
    }

    #[test]
    fn interface_struct_enum() {
        let content = "public interface IRepo\n{\n}\ninternal struct Point\n{\n}\npublic enum Color\n{\n    Red,\n}\n";
        let syms = symbols(content);
        let kinds: Vec<(&str, &str)> = syms.iter().map(|s| (s.kind, s.name.as_str())).collect();
        assert!(kinds.contains(&("interface", "IRepo")));
        assert!(kinds.contains(&("struct", "Point")));
        assert!(kinds.contains(&("enum", "Color")));
    }

    #[test]
    fn record_reads_as_class() {
        let syms = symbols("public record Money(decimal Amount, string Currency);\n");
        assert_eq!(syms[0].kind, "class");
        assert_eq!(syms[0].name, "Money");
    }

    #[test]
    fn control_flow_is_not_a_method() {
        let content = "public class A\n{\n    public void Run()\n    {\n        if (x) { }\n        foreach (var y in z) { }\n    }\n}\n";
        let syms = symbols(content);
        let methods: Vec<&SymbolSpan> = syms.iter().filter(|s| s.kind == "method").collect();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].name, "Run");
    }

    #[test]
    fn attributes_and_comments_are_skipped() {
        let content = "// public class Ghost {}\n[Serializable]\npublic class Real\n{\n}\n";
        let syms = symbols(content);
        assert_eq!(syms.len(), 1);
        assert_eq!(syms[0].name, "Real");
    }
}
