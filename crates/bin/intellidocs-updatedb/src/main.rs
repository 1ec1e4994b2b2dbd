//! Batch driver that rebuilds the intellidocs family stores.
//!
//! Reads each configured devdocs corpus in order and merges it into the store
//! of its family, so corpora sharing a family accumulate in one file.

mod config;

use std::error::Error;
use std::fmt;

use intellidocs_core::control::DocsControlPlane;
use intellidocs_core::parsers::RuleTable;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::UpdateDbConfig;

#[derive(Debug)]
struct FailedCorpora(Vec<String>);

impl fmt::Display for FailedCorpora {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed corpora: {}", self.0.join(", "))
    }
}

impl Error for FailedCorpora {}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = UpdateDbConfig::from_args()?;

    let mut rules = RuleTable::builtin()?;
    for (family, definition) in &config.families {
        rules.insert(family, definition)?;
    }
    let control = DocsControlPlane::with_rules(&config.docs_dir, &config.db_dir, rules);

    let mut failed = Vec::new();
    for corpus in &config.corpora {
        match control.ingest_corpus(corpus.clone().into()) {
            Ok(report) => info!(
                language = %report.language,
                family = %report.family,
                keys = report.store_keys,
                no_match = report.outcome.no_match.len(),
                "corpus done"
            ),
            Err(err) => {
                error!(language = %corpus.language, family = %corpus.family, "{err}");
                failed.push(corpus.language.clone());
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(Box::new(FailedCorpora(failed)))
    }
}
