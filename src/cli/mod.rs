mod commands;

pub use commands::run;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use code_scanner::OutputFormat;

#[derive(Parser)]
#[command(name = "code-scanner")]
#[command(about = "Fast structured interrogation of source trees")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Directory hierarchy of source-bearing folders
    code-scanner

    # List all Rust files
    code-scanner -g '*.rs'

    # Find TODOs with two lines of context
    code-scanner -f 'TODO|FIXME' --pad 2

    # Count import statements per TypeScript file
    code-scanner -g '*.ts' -f import --count

    # Pull exact line ranges
    code-scanner --lines "src/main.rs:1:20 src/cli.rs:18:40"

    # Project-internal dependency graph, Rust only
    code-scanner --graph -g '*.rs'

    # Symbol declarations as JSON
    code-scanner --symbols --json

    # Codebase statistics
    code-scanner --stats
"#)]
pub struct Cli {
    /// Root directory to scan
    #[arg(long = "dir", short = 'd', alias = "root", value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// File glob pattern, repeatable (* and ? over basenames)
    #[arg(long = "glob", short = 'g', alias = "r", value_name = "PATTERN")]
    pub glob: Vec<String>,

    /// Search file contents for a pattern (use | for OR)
    #[arg(long = "find", short = 'f', alias = "f", value_name = "PATTERN")]
    pub find: Option<String>,

    /// Line specs "path:start:end", space separated, repeatable
    #[arg(long, value_name = "SPECS")]
    pub lines: Vec<String>,

    /// Emit the project-internal dependency graph
    #[arg(long)]
    pub graph: bool,

    /// Extract symbol declarations from source files
    #[arg(long, short = 's', alias = "s")]
    pub symbols: bool,

    /// Show match counts per file (requires --find)
    #[arg(long, short = 'c')]
    pub count: bool,

    /// Codebase statistics: files, lines, bytes by extension
    #[arg(long, short = 'S', alias = "st")]
    pub stats: bool,

    /// Treat the --find pattern as a regular expression
    #[arg(long, short = 'E')]
    pub regex: bool,

    /// Context lines before and after each match
    #[arg(long, alias = "context", short_alias = 'C', default_value_t = 0, value_name = "N")]
    pub pad: usize,

    /// Pass "off" to suppress per-line number prefixes
    #[arg(long = "line-numbers", value_name = "off")]
    pub line_numbers: Option<String>,

    /// Suppress per-line number prefixes
    #[arg(long)]
    pub no_line_numbers: bool,

    /// Cap the number of file entries in the output
    #[arg(long, short = 'L', value_name = "N")]
    pub limit: Option<usize>,

    /// Additional excluded directory names, repeatable
    #[arg(long, value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Disable the built-in exclusions (node_modules, .git, ...)
    #[arg(long)]
    pub no_defaults: bool,

    /// Maximum execution time in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(long, short = 'F', value_enum, default_value = "yaml")]
    pub format: FormatArg,

    /// Shorthand for --format json
    #[arg(long)]
    pub json: bool,

    /// Write output to a file instead of stdout
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Yaml,
    Json,
}

impl Cli {
    /// Cross-flag checks clap cannot express: mode exclusivity and value
    /// constraints.
    pub fn validate(&self) -> Result<(), String> {
        if self.count && self.find.is_none() {
            return Err("--count requires --find <pattern>".into());
        }

        let mut modes = Vec::new();
        if self.find.is_some() {
            modes.push(if self.count { "--find --count" } else { "--find" });
        }
        if !self.lines.is_empty() {
            modes.push("--lines");
        }
        if self.graph {
            modes.push("--graph");
        }
        if self.symbols {
            modes.push("--symbols");
        }
        if self.stats {
            modes.push("--stats");
        }
        if modes.len() > 1 {
            return Err(format!(
                "{} are mutually exclusive and cannot be combined.",
                modes.join(" and ")
            ));
        }

        if let Some(value) = &self.line_numbers {
            if value != "off" {
                return Err(format!(
                    "Invalid value for --line-numbers: '{value}'. Only 'off' is supported."
                ));
            }
        }
        Ok(())
    }

    pub fn line_numbers_enabled(&self) -> bool {
        !self.no_line_numbers && self.line_numbers.as_deref() != Some("off")
    }

    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            return OutputFormat::Json;
        }
        match self.format {
            FormatArg::Yaml => OutputFormat::Yaml,
            FormatArg::Json => OutputFormat::Json,
        }
    }

    /// Line specs arrive as space-separated groups; flatten them.
    pub fn line_specs(&self) -> Vec<String> {
        self.lines
            .iter()
            .flat_map(|group| group.split_whitespace())
            .map(str::to_owned)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        let mut full = vec!["code-scanner"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full)
    }

    #[test]
    fn defaults_select_tree_mode() {
        let cli = parse(&[]).unwrap();
        assert!(cli.find.is_none());
        assert!(cli.glob.is_empty());
        assert!(!cli.graph && !cli.symbols && !cli.stats && !cli.count);
        assert!(cli.lines.is_empty());
        assert_eq!(cli.pad, 0);
        assert!(cli.line_numbers_enabled());
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn globs_accumulate() {
        let cli = parse(&["-g", "*.rs", "--glob", "*.ts"]).unwrap();
        assert_eq!(cli.glob, vec!["*.rs", "*.ts"]);
    }

    #[test]
    fn legacy_aliases_parse() {
        let cli = parse(&["--r", "*.rs", "--f", "pub fn", "--s"]).unwrap();
        assert_eq!(cli.glob, vec!["*.rs"]);
        assert_eq!(cli.find.as_deref(), Some("pub fn"));
        assert!(cli.symbols);

        let cli = parse(&["--st"]).unwrap();
        assert!(cli.stats);

        let cli = parse(&["--root", "/tmp"]).unwrap();
        assert_eq!(cli.dir.as_deref(), Some(std::path::Path::new("/tmp")));
    }

    #[test]
    fn pad_aliases() {
        assert_eq!(parse(&["--pad", "3"]).unwrap().pad, 3);
        assert_eq!(parse(&["--context", "2"]).unwrap().pad, 2);
        assert_eq!(parse(&["-C", "4"]).unwrap().pad, 4);
    }

    #[test]
    fn count_requires_find() {
        let cli = parse(&["--count"]).unwrap();
        let message = cli.validate().unwrap_err();
        assert!(message.contains("--count requires --find"));

        let cli = parse(&["-f", "x", "-c"]).unwrap();
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn modes_are_mutually_exclusive() {
        for args in [
            &["-f", "x", "--graph"][..],
            &["-f", "x", "--symbols"][..],
            &["--graph", "--stats"][..],
            &["--lines", "f:1:2", "--graph"][..],
            &["--symbols", "--stats"][..],
        ] {
            let cli = parse(args).unwrap();
            let message = cli.validate().unwrap_err();
            assert!(message.contains("mutually exclusive"), "{args:?}");
        }
    }

    #[test]
    fn globs_combine_with_any_mode() {
        for args in [
            &["-g", "*.rs", "-f", "x"][..],
            &["-g", "*.rs", "--graph"][..],
            &["-g", "*.rs", "--stats"][..],
        ] {
            assert!(parse(args).unwrap().validate().is_ok(), "{args:?}");
        }
    }

    #[test]
    fn line_numbers_off_values() {
        let cli = parse(&["--line-numbers", "off"]).unwrap();
        assert!(cli.validate().is_ok());
        assert!(!cli.line_numbers_enabled());

        let cli = parse(&["--no-line-numbers"]).unwrap();
        assert!(!cli.line_numbers_enabled());

        let cli = parse(&["--line-numbers", "yes"]).unwrap();
        assert!(cli.validate().is_err());
    }

    #[test]
    fn json_shorthand_wins() {
        let cli = parse(&["--json"]).unwrap();
        assert_eq!(cli.output_format(), OutputFormat::Json);

        let cli = parse(&["--format", "json"]).unwrap();
        assert_eq!(cli.output_format(), OutputFormat::Json);

        let cli = parse(&["-F", "yaml"]).unwrap();
        assert_eq!(cli.output_format(), OutputFormat::Yaml);
    }

    #[test]
    fn unknown_format_is_a_parse_error() {
        assert!(parse(&["--format", "xml"]).is_err());
    }

    #[test]
    fn line_specs_flatten_groups() {
        let cli = parse(&["--lines", "a.rs:1:2 b.rs:3:4", "--lines", "c.rs:5:6"]).unwrap();
        assert_eq!(cli.line_specs(), vec!["a.rs:1:2", "b.rs:3:4", "c.rs:5:6"]);
    }

    #[test]
    fn numeric_options_parse() {
        let cli = parse(&["--timeout", "30", "--limit", "5"]).unwrap();
        assert_eq!(cli.timeout, Some(30));
        assert_eq!(cli.limit, Some(5));
        assert!(parse(&["--timeout", "abc"]).is_err());
        assert!(parse(&["--pad", "x"]).is_err());
    }

    #[test]
    fn missing_values_are_parse_errors() {
        for args in [
            &["--dir"][..],
            &["--glob"][..],
            &["--find"][..],
            &["--lines"][..],
            &["--exclude"][..],
            &["--timeout"][..],
        ] {
            assert!(parse(args).is_err(), "{args:?}");
        }
    }
}
