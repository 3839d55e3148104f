use std::path::Path;

use common::error::AppError;
use tracing::info;

/// A source document read verbatim from disk, tagged with its filename.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub text: String,
    pub source: String,
}

/// Reads every `.md` file in `dir` (non-recursive) as UTF-8 text.
///
/// Fails with `AppError::NotFound` when the directory is absent and with
/// `AppError::Io` when any single file cannot be read; there is no
/// partial-success mode. Enumeration order is whatever the filesystem yields.
pub fn load_markdown_dir(dir: &Path) -> Result<Vec<RawDocument>, AppError> {
    if !dir.is_dir() {
        return Err(AppError::NotFound(format!(
            "markdown directory not found: {}",
            dir.display()
        )));
    }

    let paths = list_markdown_files(dir)?;
    let total = paths.len();
    info!("markdown files found: {total}");

    let mut documents = Vec::with_capacity(total);
    for (index, path) in paths.iter().enumerate() {
        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("loading ({}/{}): {}", index + 1, total, source);
        let text = std::fs::read_to_string(path)?;
        documents.push(RawDocument { text, source });
    }

    Ok(documents)
}

/// Lists the `.md` files in `dir` without reading them. Shared by the
/// ingestion pipeline and the stats endpoint.
pub fn list_markdown_files(dir: &Path) -> Result<Vec<std::path::PathBuf>, AppError> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            paths.push(path);
        }
    }
    Ok(paths)
}
