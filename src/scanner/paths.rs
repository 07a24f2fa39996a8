use std::path::Path;

/// Path relative to `root` with `/` separators. Idempotent: a path already
/// outside `root` (or already relative) is returned normalized as-is.
pub fn root_relative(root: &Path, full: &Path) -> String {
    let rel = full.strip_prefix(root).unwrap_or(full);
    let text = rel.to_string_lossy();
    if text.contains('\\') {
        text.replace('\\', "/")
    } else {
        text.into_owned()
    }
}

/// Collapse `.` and `..` segments and normalize separators. Used on raw
/// import references before matching against the project file set.
pub fn normalize_reference(candidate: &str) -> String {
    let unified = candidate.replace('\\', "/");
    let mut kept: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "." => {}
            ".." => {
                kept.pop();
            }
            other => kept.push(other),
        }
    }
    kept.join("/")
}

/// Case-insensitive ordering key used everywhere output is sorted.
pub fn sort_key(text: &str) -> String {
    text.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_root_prefix() {
        let root = Path::new("/work/project");
        let full = Path::new("/work/project/src/main.rs");
        assert_eq!(root_relative(root, full), "src/main.rs");
    }

    #[test]
    fn idempotent_on_relative_input() {
        let root = Path::new("/work/project");
        assert_eq!(root_relative(root, Path::new("src/main.rs")), "src/main.rs");
    }

    #[test]
    fn normalize_collapses_dot_segments() {
        assert_eq!(normalize_reference("src/./cli.rs"), "src/cli.rs");
        assert_eq!(normalize_reference("src/sub/../util.rs"), "src/util.rs");
        assert_eq!(normalize_reference("a/b/../../c"), "c");
    }

    #[test]
    fn normalize_keeps_plain_paths() {
        assert_eq!(normalize_reference("lib/app.ts"), "lib/app.ts");
        assert_eq!(normalize_reference("internal/b/"), "internal/b/");
    }
}
