//! GLB encoding and atomic file output

use crate::assemble::AssembledDocument;
use crate::error::ExportError;
use morph_glb::assemble_glb;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Encode an assembled document as GLB bytes.
///
/// Non-finite bounds or weights fail here, before any file is touched.
pub fn encode_glb(document: &AssembledDocument) -> Result<Vec<u8>, ExportError> {
    assemble_glb(&document.root, &document.buffer).map_err(ExportError::SerializationFailure)
}

/// Write `bytes` to `path` atomically, creating parent directories.
///
/// Data goes to a temporary file in the destination directory which is then
/// renamed over `path`; on failure no partial file is left behind. Every
/// `Io` error names `path`, whichever step failed.
pub fn write_glb(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| ExportError::io(path, e))?;

    let mut file = NamedTempFile::new_in(&dir).map_err(|e| ExportError::io(path, e))?;
    file.write_all(bytes)
        .and_then(|_| file.as_file().sync_all())
        .map_err(|e| ExportError::io(path, e))?;
    file.persist(path)
        .map_err(|e| ExportError::io(path, e.error))?;

    tracing::debug!("Wrote {} bytes to {:?}", bytes.len(), path);
    Ok(())
}
