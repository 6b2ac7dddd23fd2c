use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use crate::analyzer::detect_language;
use crate::data_models::IndexedDocument;
use crate::db::{DocumentStore, MemoryDocuments};

/// File extensions picked up when walking a directory.
const INDEXABLE_EXTENSIONS: &[&str] = &["txt", "text", "md"];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IndexReport {
    pub indexed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Reads text files from disk and stores them, one document per file.
pub struct Indexer {
    store: Arc<dyn DocumentStore>,
}

impl Indexer {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Indexes a single file or every indexable file below a directory.
    /// A file that cannot be read or stored is logged and counted as failed; the run goes on.
    pub async fn index_path(&self, path: &Path) -> Result<IndexReport> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("cannot access {}", path.display()))?;
        let mut report = IndexReport::default();

        if metadata.is_file() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            self.index_file(path, name, &mut report).await;
            return Ok(report);
        }

        log::info!("indexing directory {}", path.display());
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::error!("error walking {}: {:#}", path.display(), e);
                    report.failed += 1;
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if !is_indexable(entry.path()) {
                log::debug!("skipping {}", entry.path().display());
                report.skipped += 1;
                continue;
            }
            let name = relative_name(path, entry.path());
            self.index_file(entry.path(), name, &mut report).await;
        }

        log::info!(
            "indexed {} documents ({} skipped, {} failed)",
            report.indexed,
            report.skipped,
            report.failed
        );
        Ok(report)
    }

    async fn index_file(&self, path: &Path, filename: String, report: &mut IndexReport) {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                log::error!("Error indexing document {}: {}", path.display(), e);
                report.failed += 1;
                return;
            }
        };
        let language = detect_language(&text);
        let document = IndexedDocument::new(filename, text, language);
        match self.store.upsert_document(document).await {
            Ok(id) => {
                log::debug!("indexed {} as {} ({})", path.display(), id, language);
                report.indexed += 1;
            }
            Err(e) => {
                log::error!("Error indexing document {}: {:#}", path.display(), e);
                report.failed += 1;
            }
        }
    }
}

/// Loads every indexable file under `path` into an in-memory store.
pub async fn load_corpus(path: &Path) -> Result<(Arc<MemoryDocuments>, IndexReport)> {
    let store = Arc::new(MemoryDocuments::new());
    let report = Indexer::new(store.clone()).index_path(path).await?;
    Ok((store, report))
}

fn is_indexable(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| INDEXABLE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn relative_name(root: &Path, path: &Path) -> String {
    let relative: PathBuf = path.strip_prefix(root).unwrap_or(path).to_path_buf();
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
