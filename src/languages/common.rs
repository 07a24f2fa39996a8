//! Shared line-level parsing primitives for the language bindings.

/// Tracks `/* ... */` block comments across lines so declaration keywords
/// inside them are ignored.
pub struct CommentTracker {
    in_block: bool,
}

impl CommentTracker {
    pub fn new() -> Self {
        Self { in_block: false }
    }

    /// True when the whole line is comment text. `line_prefix` is the
    /// single-line marker, `"//"` or `"#"`.
    pub fn is_comment(&mut self, trimmed: &str, line_prefix: &str) -> bool {
        if self.in_block {
            if let Some(pos) = trimmed.find("*/") {
                self.in_block = false;
                let rest = trimmed[pos + 2..].trim();
                return rest.is_empty() || rest.starts_with(line_prefix);
            }
            return true;
        }
        if trimmed.starts_with("/*") {
            if !trimmed.contains("*/") {
                self.in_block = true;
            }
            return true;
        }
        trimmed.starts_with(line_prefix) || trimmed.starts_with('*')
    }
}

impl Default for CommentTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Add `{`/`}` occurrences on this line to a running depth counter.
pub fn track_braces(trimmed: &str, depth: &mut i32) {
    for c in trimmed.chars() {
        match c {
            '{' => *depth += 1,
            '}' => *depth -= 1,
            _ => {}
        }
    }
}

/// The declaration line truncated at the opening brace.
pub fn signature_to_brace(trimmed: &str) -> String {
    match trimmed.find('{') {
        Some(pos) => trimmed[..=pos].trim().to_owned(),
        None => trimmed.to_owned(),
    }
}

/// Leading identifier of `text` (`[A-Za-z0-9_]+`), if any.
pub fn leading_ident(text: &str) -> Option<&str> {
    let text = text.trim_start();
    let end = text
        .find(|c: char| !c.is_alphanumeric() && c != '_')
        .unwrap_or(text.len());
    let name = &text[..end];
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// `<keyword><name>` where the name runs to the first non-identifier char.
pub fn keyword_name<'t>(text: &'t str, keyword: &str) -> Option<&'t str> {
    leading_ident(text.strip_prefix(keyword)?)
}
