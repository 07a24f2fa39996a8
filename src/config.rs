//! Compile-time configuration: the recognized-source-extensions set and the
//! built-in exclusion list. Engine behavior is correct for any such sets.

/// File extensions treated as source for tree, stats, and symbol scoping.
pub const SOURCE_EXTENSIONS: &[&str] = &[
    "cs", "ts", "tsx", "js", "jsx", "mjs", "mts", "py", "rb", "rake", "go",
    "rs", "java", "kt", "kts", "scala", "swift", "m", "mm", "c", "cpp", "cc",
    "cxx", "h", "hpp", "hxx", "lua", "pl", "pm", "php", "r", "dart", "ex",
    "exs", "erl", "hs", "fs", "fsx", "fsi", "ml", "mli", "v", "sv", "vhd",
    "vhdl", "sql", "sh", "bash", "zsh", "ps1", "psm1", "bat", "cmd", "yaml",
    "yml", "json", "xml", "html", "htm", "css", "scss", "sass", "less",
    "vue", "svelte", "astro", "md", "mdx", "rst", "txt", "toml", "ini",
    "cfg", "conf", "env", "dockerfile", "tf", "tfvars", "hcl", "proto",
    "graphql", "gql", "razor", "cshtml", "csproj", "sln", "gradle", "cmake",
    "makefile", "mk",
];

/// Directory names pruned by default during traversal.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "node_modules", ".git", "bin", "obj", "dist", ".vs", "__pycache__",
    ".idea", ".vscode", ".svn", ".hg", "coverage", ".next", ".nuxt",
    "target", "build", "packages", ".cache", ".output", ".parcel-cache",
];

/// Extensionless files that still count as source.
const WELL_KNOWN_FILES: &[&str] = &["makefile", "dockerfile", "rakefile", "gemfile"];

pub fn is_source_file(name: &str) -> bool {
    match name.rfind('.') {
        Some(dot) => {
            let ext = &name[dot + 1..];
            SOURCE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e))
        }
        None => {
            let lower = name.to_ascii_lowercase();
            WELL_KNOWN_FILES.contains(&lower.as_str())
        }
    }
}
