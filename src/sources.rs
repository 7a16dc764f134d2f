use crate::quiz::{SourceFile, SourceKind};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Reads one study document. PDFs are carried as base64 so they can travel
/// as inline data in the generation request; anything else is treated as
/// text and folded into the prompt.
pub fn load_source<P: AsRef<Path>>(path: P) -> io::Result<SourceFile> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);

    if is_pdf {
        let bytes = fs::read(path)?;
        Ok(SourceFile {
            name,
            content: BASE64.encode(bytes),
            kind: SourceKind::Pdf,
        })
    } else {
        let content = fs::read_to_string(path)?;
        Ok(SourceFile {
            name,
            content,
            kind: SourceKind::Text,
        })
    }
}

pub fn load_sources(paths: &[PathBuf]) -> io::Result<Vec<SourceFile>> {
    paths.iter().map(load_source).collect()
}
