use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use intellidocs_store::models::{CorpusManifest, ManifestEntry};
use intellidocs_store::schema::{
    FRAGMENT_EXTENSION, FRAGMENT_MARKER, NAME_SUFFIXES, NAME_TRIM_CHARS, RESERVED_PATH_CHAR,
    RESERVED_PATH_REPLACEMENT, SECTION_SEPARATOR,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::parsers::{Extraction, HtmlFragmentParser, RuleSet};
use crate::store::DocStore;

/// Counters collected while merging one corpus into a family store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexOutcome {
    pub records: usize,
    pub aliases: usize,
    pub skipped: usize,
    pub sections: usize,
    /// Names whose fragment yielded no syntax, in manifest order.
    pub no_match: Vec<String>,
}

/// Fragment file contents memoized per resolved path for one run.
///
/// `None` marks a file that could not be read.
#[derive(Debug, Default)]
pub struct FragmentCache {
    files: HashMap<PathBuf, Option<String>>,
}

impl FragmentCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_read(&mut self, path: &Path) -> Option<&str> {
        self.files
            .entry(path.to_path_buf())
            .or_insert_with(|| match fs::read_to_string(path) {
                Ok(contents) => Some(contents),
                Err(err) => {
                    warn!(path = %path.display(), "cannot read fragment: {err}");
                    None
                }
            })
            .as_deref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Walks one corpus manifest and merges its records into a family store.
pub struct CorpusIndexer<'a> {
    corpus: String,
    fragment_root: PathBuf,
    rules: &'a RuleSet,
    cache: FragmentCache,
}

impl<'a> CorpusIndexer<'a> {
    #[must_use]
    pub fn new(corpus: impl Into<String>, fragment_root: impl Into<PathBuf>, rules: &'a RuleSet) -> Self {
        Self {
            corpus: corpus.into(),
            fragment_root: fragment_root.into(),
            rules,
            cache: FragmentCache::new(),
        }
    }

    /// Extracts every manifest entry and writes the results into `store`.
    ///
    /// Later entries replace earlier ones with the same name, including
    /// records already present in the store.
    pub fn index(&mut self, manifest: &CorpusManifest, store: &mut DocStore) -> IndexOutcome {
        let mut outcome = IndexOutcome::default();

        for raw in &manifest.entries {
            if raw.name.contains(SECTION_SEPARATOR) {
                debug!(name = %raw.name, "section entry");
                outcome.sections += 1;
                continue;
            }

            let entry = ManifestEntry::new(clean_name(&raw.name), raw.path.clone(), raw.kind.clone());
            if self.rules.is_skipped(&entry.name) {
                debug!(name = %entry.name, "skipped entry");
                outcome.skipped += 1;
                continue;
            }

            let path = self.fragment_root.join(fragment_file(&entry.path));
            let Some(fragment) = self.cache.get_or_read(&path) else {
                outcome.no_match.push(entry.name);
                continue;
            };

            match HtmlFragmentParser::extract(&entry, &self.corpus, fragment, self.rules) {
                Extraction::Record(record) => {
                    let record = store.insert(record);
                    outcome.records += 1;

                    let aliases = self
                        .rules
                        .alias_for(&entry.name)
                        .into_iter()
                        .chain(self.rules.namespace_alias_for(&entry.name));
                    for alias in aliases {
                        debug!(name = %entry.name, %alias, "alias");
                        store.insert_alias(alias, &record);
                        outcome.aliases += 1;
                    }
                }
                Extraction::Skipped => outcome.skipped += 1,
                Extraction::NoMatch => {
                    debug!(name = %entry.name, "no syntax match");
                    outcome.no_match.push(entry.name);
                }
            }
        }

        outcome
    }

    #[must_use]
    pub fn cached_fragments(&self) -> usize {
        self.cache.len()
    }
}

/// Strips decorative suffixes and call punctuation from a manifest name.
#[must_use]
pub fn clean_name(name: &str) -> String {
    NAME_SUFFIXES
        .iter()
        .fold(name.to_string(), |name, suffix| name.replace(suffix, ""))
        .trim_matches(NAME_TRIM_CHARS)
        .to_string()
}

/// Maps a manifest path onto its fragment file, relative to the corpus root.
#[must_use]
pub fn fragment_file(entry_path: &str) -> String {
    let page = entry_path
        .replace(RESERVED_PATH_CHAR, &RESERVED_PATH_REPLACEMENT.to_string());
    let page = page
        .split_once(FRAGMENT_MARKER)
        .map_or(page.as_str(), |(page, _)| page);
    format!("{page}.{FRAGMENT_EXTENSION}")
}
