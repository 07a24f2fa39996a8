//! Output data model. One envelope per invocation; everything here is
//! built during the scan, serialized once, and dropped.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Wall-clock and volume counters for the run. Zero-valued fields are
/// omitted from output.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaInfo {
    #[serde(skip_serializing_if = "is_zero_u128")]
    pub elapsed_ms: u128,
    #[serde(skip_serializing_if = "is_false")]
    pub timeout: bool,
    #[serde(skip_serializing_if = "is_zero")]
    pub files_scanned: usize,
    #[serde(skip_serializing_if = "is_zero")]
    pub files_matched: usize,
    #[serde(skip_serializing_if = "is_zero")]
    pub files_errored: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_matches: Option<usize>,
}

/// A contiguous, inclusive line range rendered as one content block.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChunk {
    pub start_line: usize,
    pub end_line: usize,
    pub content: String,
}

/// One file in search, listing, or line-extraction output. At most one of
/// `contents`, `chunks`, `error` is set.
#[derive(Debug, Serialize)]
pub struct FileEntry {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks: Option<Vec<FileChunk>>,
}

impl FileEntry {
    pub fn bare(path: String) -> Self {
        Self { path, error: None, contents: None, chunks: None }
    }

    pub fn failed(path: String, message: String) -> Self {
        Self { path, error: Some(message), contents: None, chunks: None }
    }

    pub fn whole(path: String, contents: String) -> Self {
        Self { path, error: None, contents: Some(contents), chunks: None }
    }

    pub fn chunked(path: String, chunks: Vec<FileChunk>) -> Self {
        Self { path, error: None, contents: None, chunks: Some(chunks) }
    }
}

/// A directory in the tree view. Present only when it (or a descendant)
/// holds at least one recognized source file.
#[derive(Debug, Serialize)]
pub struct DirNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DirNode>>,
}

impl DirNode {
    pub fn empty(name: String) -> Self {
        Self { name, files: None, children: None }
    }

    pub fn is_populated(&self) -> bool {
        self.files.is_some() || self.children.is_some()
    }
}

#[derive(Debug, Serialize)]
pub struct CountEntry {
    pub path: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct GraphEntry {
    pub file: String,
    pub imports: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SymbolEntry {
    pub kind: &'static str,
    pub name: String,
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub signature: String,
}

#[derive(Debug, Serialize)]
pub struct SymbolFile {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub symbols: Vec<SymbolEntry>,
}

#[derive(Debug, Serialize)]
pub struct LanguageStats {
    pub extension: String,
    pub files: usize,
    pub lines: usize,
    pub bytes: u64,
}

#[derive(Debug, Serialize)]
pub struct StatsTotals {
    pub files: usize,
    pub lines: usize,
    pub bytes: u64,
}

#[derive(Debug, Serialize)]
pub struct LargestFile {
    pub path: String,
    pub lines: usize,
    pub bytes: u64,
}

#[derive(Debug)]
pub struct StatsReport {
    pub languages: Vec<LanguageStats>,
    pub totals: StatsTotals,
    pub largest: Vec<LargestFile>,
}

/// The single result shape shared by every mode.
#[derive(Debug, Default)]
pub struct OutputEnvelope {
    pub meta: Option<MetaInfo>,
    pub error: Option<String>,
    pub tree: Option<DirNode>,
    pub graph: Option<Vec<GraphEntry>>,
    pub symbols: Option<Vec<SymbolFile>>,
    pub counts: Option<Vec<CountEntry>>,
    pub stats: Option<StatsReport>,
    pub files: Option<Vec<FileEntry>>,
    pub errors: Option<Vec<String>>,
}

impl OutputEnvelope {
    pub fn config_error(message: String) -> Self {
        Self { error: Some(message), ..Default::default() }
    }
}

// Count entries serialize under the `files` key, and stats sections are
// flattened to the envelope root, so the envelope needs a hand-written map.
impl Serialize for OutputEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(meta) = &self.meta {
            map.serialize_entry("meta", meta)?;
        }
        if let Some(error) = &self.error {
            map.serialize_entry("error", error)?;
        }
        if let Some(tree) = &self.tree {
            map.serialize_entry("tree", tree)?;
        }
        if let Some(graph) = &self.graph {
            map.serialize_entry("graph", graph)?;
        }
        if let Some(symbols) = &self.symbols {
            map.serialize_entry("symbols", symbols)?;
        }
        if let Some(counts) = &self.counts {
            map.serialize_entry("files", counts)?;
        }
        if let Some(stats) = &self.stats {
            map.serialize_entry("languages", &stats.languages)?;
            map.serialize_entry("totals", &stats.totals)?;
            map.serialize_entry("largest", &stats.largest)?;
        }
        if let Some(files) = &self.files {
            if !files.is_empty() {
                map.serialize_entry("files", files)?;
            }
        }
        if let Some(errors) = &self.errors {
            map.serialize_entry("errors", errors)?;
        }
        map.end()
    }
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

fn is_zero_u128(n: &u128) -> bool {
    *n == 0
}

fn is_false(b: &bool) -> bool {
    !*b
}
