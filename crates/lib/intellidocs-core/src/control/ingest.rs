use std::{
    error::Error,
    fmt,
    fs,
    io,
    path::{Path, PathBuf},
};

use intellidocs_store::models::{CorpusManifest, CorpusSpec};
use intellidocs_store::schema::MANIFEST_FILE_NAME;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::store::DocStore;

use super::indexer::{CorpusIndexer, IndexOutcome};
use super::{ControlError, DocsControlPlane};

/// Input payload for merging one corpus into its family store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusIngestRequest {
    /// Corpus directory name under the docs root, e.g. `jquery`.
    pub language: String,
    /// Family store the corpus feeds, e.g. `Javascript`.
    pub family: String,
}

impl From<CorpusSpec> for CorpusIngestRequest {
    fn from(spec: CorpusSpec) -> Self {
        Self {
            language: spec.language,
            family: spec.family,
        }
    }
}

/// Summary of a corpus ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusIngestReport {
    pub language: String,
    pub family: String,
    pub store_path: PathBuf,
    pub manifest_entries: usize,
    /// Keys in the family store after the merge.
    pub store_keys: usize,
    pub outcome: IndexOutcome,
}

#[derive(Debug)]
pub enum ManifestError {
    Io { path: PathBuf, source: io::Error },
    Json { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read manifest {}: {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "invalid manifest {}: {source}", path.display())
            }
        }
    }
}

impl Error for ManifestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

/// Reads a corpus `index.json`.
///
/// # Errors
/// Returns `ManifestError` if the file is missing or malformed.
pub fn load_manifest(path: &Path) -> Result<CorpusManifest, ManifestError> {
    let json = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    CorpusManifest::from_json(&json).map_err(|source| ManifestError::Json {
        path: path.to_path_buf(),
        source,
    })
}

impl DocsControlPlane {
    /// Merges one corpus into its family store and persists the store.
    ///
    /// Records from earlier corpora of the same family are kept unless this
    /// corpus documents the same name.
    ///
    /// # Errors
    /// Returns `ControlError` if the family has no rules, the manifest cannot be
    /// loaded, or the store cannot be written. Nothing is written on a manifest
    /// failure.
    pub fn ingest_corpus(
        &self,
        request: CorpusIngestRequest,
    ) -> Result<CorpusIngestReport, ControlError> {
        let CorpusIngestRequest { language, family } = request;

        let rules = self
            .rules
            .get(&family)
            .ok_or_else(|| ControlError::UnknownFamily(family.clone()))?;

        let corpus_dir = self.docs_dir.join(&language);
        let manifest = load_manifest(&corpus_dir.join(MANIFEST_FILE_NAME))?;

        let store_path = self.registry.store_path(&family);
        let mut store = DocStore::load_or_default(&store_path);

        let mut indexer = CorpusIndexer::new(language.as_str(), corpus_dir, &rules);
        let outcome = indexer.index(&manifest, &mut store);

        store.save(&store_path)?;
        self.registry.invalidate(&family);

        if !outcome.no_match.is_empty() {
            warn!(
                %language,
                count = outcome.no_match.len(),
                "no syntax match: {}",
                outcome.no_match.join(", ")
            );
        }
        info!(
            %language,
            %family,
            records = outcome.records,
            aliases = outcome.aliases,
            skipped = outcome.skipped,
            sections = outcome.sections,
            fragments = indexer.cached_fragments(),
            "indexed corpus into {}",
            store_path.display()
        );

        Ok(CorpusIngestReport {
            language,
            family,
            store_path,
            manifest_entries: manifest.entries.len(),
            store_keys: store.len(),
            outcome,
        })
    }
}
