pub mod yaml;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::model::OutputEnvelope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Yaml,
    Json,
}

pub fn render(envelope: &OutputEnvelope, format: OutputFormat) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(4 * 1024);
    match format {
        OutputFormat::Yaml => yaml::write_envelope(&mut buffer, envelope)?,
        OutputFormat::Json => serde_json::to_writer(&mut buffer, envelope)?,
    }
    Ok(buffer)
}

/// Write the envelope to stdout.
pub fn emit(envelope: &OutputEnvelope, format: OutputFormat) {
    let stdout = io::stdout();
    let mut writer = BufWriter::with_capacity(64 * 1024, stdout.lock());
    if let Ok(rendered) = render(envelope, format) {
        let _ = writer.write_all(&rendered);
    }
    let _ = writer.flush();
}

/// Write the envelope to a file sink instead of stdout.
pub fn emit_to_file(
    envelope: &OutputEnvelope,
    format: OutputFormat,
    path: &Path,
) -> io::Result<()> {
    let rendered = render(envelope, format)?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&rendered)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FileEntry, MetaInfo};
    use tempfile::TempDir;

    fn sample() -> OutputEnvelope {
        OutputEnvelope {
            meta: Some(MetaInfo { elapsed_ms: 7, files_matched: 1, ..Default::default() }),
            files: Some(vec![FileEntry::bare("src/main.rs".into())]),
            ..Default::default()
        }
    }

    #[test]
    fn yaml_rendering() {
        let out = String::from_utf8(render(&sample(), OutputFormat::Yaml).unwrap()).unwrap();
        assert!(out.starts_with("meta:\n"));
        assert!(out.contains("files:\n- path: src/main.rs\n"));
    }

    #[test]
    fn json_rendering() {
        let out = String::from_utf8(render(&sample(), OutputFormat::Json).unwrap()).unwrap();
        assert!(out.starts_with('{'));
        assert!(out.contains("\"meta\""));
        assert!(out.contains("\"elapsedMs\":7"));
        assert!(out.contains("\"filesMatched\":1"));
    }

    #[test]
    fn file_sink_receives_same_bytes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.yaml");
        emit_to_file(&sample(), OutputFormat::Yaml, &path).unwrap();
        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, render(&sample(), OutputFormat::Yaml).unwrap());
    }
}
