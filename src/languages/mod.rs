//! Language bindings for import and symbol analysis.
//!
//! A binding may implement either capability or both; handlers are picked
//! by lowercased file extension, at most one per capability per extension.

pub mod common;
pub mod csharp;
pub mod go;
pub mod java;
pub mod kotlin;
pub mod python;
pub mod ruby;
pub mod rust;
pub mod typescript;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// A symbol declaration found in a file, before the orchestrator attaches
/// the file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSpan {
    pub kind: &'static str,
    pub name: String,
    pub line: usize,
    pub visibility: Option<&'static str>,
    pub parent: Option<String>,
    pub signature: String,
}

/// Extracts raw import references from file content. A reference is either
/// a root-relative file path or a directory prefix ending in `/`; the graph
/// orchestrator resolves both against the project file set.
pub trait ImportExtractor: Send + Sync {
    fn extensions(&self) -> &[&'static str];
    fn extract_imports(&self, content: &str, rel_path: &Path, root: &Path) -> Vec<String>;
}

/// Extracts symbol declarations from file content.
pub trait SymbolExtractor: Send + Sync {
    fn extensions(&self) -> &[&'static str];
    fn extract_symbols(&self, content: &str) -> Vec<SymbolSpan>;
}

pub struct LanguageRegistry {
    imports: HashMap<&'static str, Arc<dyn ImportExtractor>>,
    symbols: HashMap<&'static str, Arc<dyn SymbolExtractor>>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        let mut registry = Self { imports: HashMap::new(), symbols: HashMap::new() };

        registry.register_both(Arc::new(rust::RustAnalyzer));
        registry.register_both(Arc::new(typescript::TypeScriptAnalyzer));
        registry.register_both(Arc::new(csharp::CSharpAnalyzer));
        registry.register_both(Arc::new(go::GoAnalyzer));
        registry.register_both(Arc::new(python::PythonAnalyzer));
        registry.register_both(Arc::new(java::JavaAnalyzer));
        registry.register_both(Arc::new(kotlin::KotlinAnalyzer));
        registry.register_both(Arc::new(ruby::RubyAnalyzer));

        registry
    }

    fn register_both<A>(&mut self, analyzer: Arc<A>)
    where
        A: ImportExtractor + SymbolExtractor + 'static,
    {
        let as_imports: Arc<dyn ImportExtractor> = analyzer.clone();
        for &ext in ImportExtractor::extensions(&*analyzer) {
            self.imports.insert(ext, as_imports.clone());
        }
        let as_symbols: Arc<dyn SymbolExtractor> = analyzer.clone();
        for &ext in SymbolExtractor::extensions(&*analyzer) {
            self.symbols.insert(ext, as_symbols.clone());
        }
    }

    pub fn imports_for(&self, extension: &str) -> Option<&dyn ImportExtractor> {
        let key = extension.to_ascii_lowercase();
        self.imports.get(key.as_str()).map(|a| a.as_ref())
    }

    pub fn symbols_for(&self, extension: &str) -> Option<&dyn SymbolExtractor> {
        let key = extension.to_ascii_lowercase();
        self.symbols.get(key.as_str()).map(|a| a.as_ref())
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}
