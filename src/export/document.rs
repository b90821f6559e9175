//! All-or-nothing output files.

use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::ExportError;

/// Renders a document into a temporary file beside `path`, then renames it
/// into place.
///
/// If `render` fails the temporary file is removed and `path` is left
/// untouched, so readers never observe a truncated document.
pub fn write_document<T, F>(path: &Path, render: F) -> Result<T, ExportError>
where
    F: FnOnce(&mut dyn Write) -> Result<T, ExportError>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = NamedTempFile::new_in(dir).map_err(ExportError::Io)?;
    let mut out = BufWriter::new(temp);
    let value = render(&mut out)?;

    let temp = out.into_inner().map_err(|err| ExportError::Io(err.into_error()))?;
    temp.persist(path).map_err(|err| ExportError::Io(err.error))?;
    Ok(value)
}
