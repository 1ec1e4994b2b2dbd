use std::{
    error::Error,
    fmt,
    path::PathBuf,
    sync::Arc,
};

use crate::parsers::{RuleError, RuleTable};
use crate::services::StoreRegistry;
use crate::store::StoreError;

pub mod data;
pub mod indexer;
pub mod ingest;
pub mod links;

pub use data::lookup;
pub use indexer::{CorpusIndexer, FragmentCache, IndexOutcome};
pub use ingest::{CorpusIngestReport, CorpusIngestRequest, ManifestError};
pub use links::{HelpLink, HelpLinks, LinkError};

#[derive(Debug)]
pub enum ControlError {
    UnknownFamily(String),
    Rules(RuleError),
    Manifest(ManifestError),
    Store(StoreError),
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFamily(family) => write!(f, "no extraction rules for family {family}"),
            Self::Rules(err) => write!(f, "{err}"),
            Self::Manifest(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControlError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnknownFamily(_) => None,
            Self::Rules(err) => Some(err),
            Self::Manifest(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<RuleError> for ControlError {
    fn from(err: RuleError) -> Self {
        Self::Rules(err)
    }
}

impl From<ManifestError> for ControlError {
    fn from(err: ManifestError) -> Self {
        Self::Manifest(err)
    }
}

impl From<StoreError> for ControlError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Entry point shared by the batch driver and the editor shell.
///
/// Clones share the rule table, the store registry and the help links.
#[derive(Debug, Clone)]
pub struct DocsControlPlane {
    docs_dir: PathBuf,
    rules: Arc<RuleTable>,
    registry: Arc<StoreRegistry>,
    links: Arc<HelpLinks>,
}

impl DocsControlPlane {
    /// Builds a control plane with the built-in family rules.
    ///
    /// # Errors
    /// Returns `ControlError` if a built-in pattern fails to compile.
    pub fn new(docs_dir: impl Into<PathBuf>, db_dir: impl Into<PathBuf>) -> Result<Self, ControlError> {
        Ok(Self::with_rules(docs_dir, db_dir, RuleTable::builtin()?))
    }

    #[must_use]
    pub fn with_rules(
        docs_dir: impl Into<PathBuf>,
        db_dir: impl Into<PathBuf>,
        rules: RuleTable,
    ) -> Self {
        Self {
            docs_dir: docs_dir.into(),
            rules: Arc::new(rules),
            registry: Arc::new(StoreRegistry::new(db_dir)),
            links: Arc::new(HelpLinks::default()),
        }
    }

    #[must_use]
    pub fn with_help_links(mut self, links: HelpLinks) -> Self {
        self.links = Arc::new(links);
        self
    }

    #[must_use]
    pub fn registry(&self) -> &StoreRegistry {
        &self.registry
    }
}
