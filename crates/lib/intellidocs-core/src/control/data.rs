use std::sync::Arc;

use intellidocs_store::models::DocRecord;

use crate::resolver::resolve_candidates;
use crate::store::DocStore;

use super::DocsControlPlane;
use super::links::HelpLink;

/// Returns the record of the first candidate present in `store`.
#[must_use]
pub fn lookup<S: AsRef<str>>(store: &DocStore, candidates: &[S]) -> Option<Arc<DocRecord>> {
    candidates
        .iter()
        .find_map(|candidate| store.get(candidate.as_ref()))
        .cloned()
}

impl DocsControlPlane {
    /// Returns the family store for `language`, loading it on first use.
    ///
    /// A language without a store file yields an empty store.
    #[must_use]
    pub fn load_store(&self, language: &str) -> Arc<DocStore> {
        self.registry.get_or_load(language)
    }

    /// Resolves the symbol at `cursor` and looks it up in the language store.
    #[must_use]
    pub fn hint_at(&self, language: &str, buffer: &str, cursor: usize) -> Option<Arc<DocRecord>> {
        let candidates = resolve_candidates(buffer, cursor);
        lookup(&self.load_store(language), &candidates)
    }

    /// Lists the help links configured for a record's path.
    #[must_use]
    pub fn links_for(&self, record: &DocRecord) -> Vec<HelpLink> {
        self.links.resolve_all(record)
    }
}
