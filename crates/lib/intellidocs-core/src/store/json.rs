use std::{
    collections::BTreeMap,
    error::Error,
    fmt,
    fs,
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use intellidocs_store::models::DocRecord;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use tracing::{debug, warn};

const JSON_INDENT: &[u8] = b"    ";

#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: io::Error },
    Json { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "store I/O error at {}: {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "store JSON error at {}: {source}", path.display())
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Records of one documentation family keyed by symbol name.
///
/// Alias keys hold a clone of the canonical `Arc`, so both keys resolve to the
/// same allocation until the store is written and read back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocStore {
    records: BTreeMap<String, Arc<DocRecord>>,
}

impl DocStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<DocRecord>> {
        self.records.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// Stores a record under its own name, replacing any previous one.
    pub fn insert(&mut self, record: DocRecord) -> Arc<DocRecord> {
        let record = Arc::new(record);
        self.records.insert(record.name.clone(), Arc::clone(&record));
        record
    }

    /// Adds `alias` as another key for an already shared record.
    pub fn insert_alias(&mut self, alias: impl Into<String>, record: &Arc<DocRecord>) {
        self.records.insert(alias.into(), Arc::clone(record));
    }

    /// Iterates keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Reads a store file.
    ///
    /// # Errors
    /// Returns `StoreError` if the file cannot be read or is not a store.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let json = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads a store file, starting empty when it is missing or unreadable.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(store) => store,
            Err(StoreError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no existing store, starting empty");
                Self::default()
            }
            Err(err) => {
                warn!("discarding existing store: {err}");
                Self::default()
            }
        }
    }

    /// Serializes with sorted keys and four-space indentation.
    ///
    /// # Errors
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        let mut buffer = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(JSON_INDENT));
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Writes the store, replacing whatever the file held before.
    ///
    /// # Errors
    /// Returns `StoreError` if serialization or the write fails.
    pub fn save(&self, path: &Path) -> StoreResult<()> {
        let json = self.to_json_string().map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        let io_error = |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(path, json).map_err(io_error)
    }
}
