use clap::Parser;
use intellidocs_core::parsers::rules::{RuleDefinition, builtin_definitions};
use intellidocs_store::models::CorpusSpec;
use intellidocs_store::schema::{
    FAMILY_GO, FAMILY_JAVASCRIPT, FAMILY_LUA_LOVE, FAMILY_PHP, FAMILY_PYTHON,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const DEFAULT_DOCS_DIR: &str = "docs";
const DEFAULT_DB_DIR: &str = "db";

/// Corpus runs in the order they are merged when nothing else is configured.
pub const DEFAULT_CORPORA: &[(&str, &str)] = &[
    ("dom", FAMILY_JAVASCRIPT),
    ("go", FAMILY_GO),
    ("javascript", FAMILY_JAVASCRIPT),
    ("jquery", FAMILY_JAVASCRIPT),
    ("php", FAMILY_PHP),
    ("python", FAMILY_PYTHON),
    ("love", FAMILY_LUA_LOVE),
];

#[derive(Parser, Debug)]
#[command(
    name = "intellidocs-updatedb",
    version,
    about = "Rebuilds intellidocs family stores from local devdocs dumps."
)]
struct CliArgs {
    /// Directory holding one extracted devdocs dump per corpus.
    #[arg(long, env = "INTELLIDOCS_DOCS_DIR")]
    docs_dir: Option<PathBuf>,

    /// Directory receiving one `<family>.json` store per family.
    #[arg(long, env = "INTELLIDOCS_DB_DIR")]
    db_dir: Option<PathBuf>,

    /// TOML file declaring corpora and extra family rules.
    #[arg(long, env = "INTELLIDOCS_CONFIG")]
    config: Option<PathBuf>,

    /// Corpus to index as `language=Family`; repeat to run several in order.
    #[arg(long = "corpus", value_name = "LANGUAGE=FAMILY")]
    corpora: Vec<String>,
}

/// Settings read from the optional TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    docs_dir: Option<PathBuf>,
    db_dir: Option<PathBuf>,
    #[serde(default, rename = "corpus")]
    corpora: Vec<CorpusSpec>,
    #[serde(default)]
    families: BTreeMap<String, RuleDefinition>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Runtime configuration for one batch run.
#[derive(Debug, Clone)]
pub struct UpdateDbConfig {
    pub docs_dir: PathBuf,
    pub db_dir: PathBuf,
    pub corpora: Vec<CorpusSpec>,
    /// Families added to or replacing the built-in rule table.
    pub families: BTreeMap<String, RuleDefinition>,
}

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "cannot read config {}: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config {}: {source}", path.display())
            }
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidSetting { .. } => None,
        }
    }
}

impl UpdateDbConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }

    /// Names every family a corpus may target.
    fn known_families(&self) -> Vec<&str> {
        builtin_definitions()
            .into_iter()
            .map(|(family, _)| family)
            .chain(self.families.keys().map(String::as_str))
            .collect()
    }
}

impl TryFrom<CliArgs> for UpdateDbConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let file = args
            .config
            .as_deref()
            .map(FileConfig::load)
            .transpose()?
            .unwrap_or_default();
        resolve(args, file)
    }
}

/// Merges CLI values over the file, and the file over the defaults.
fn resolve(args: CliArgs, file: FileConfig) -> Result<UpdateDbConfig, ConfigError> {
    let corpora = if !args.corpora.is_empty() {
        args.corpora
            .iter()
            .map(|value| parse_corpus(value))
            .collect::<Result<Vec<_>, _>>()?
    } else if !file.corpora.is_empty() {
        file.corpora
    } else {
        DEFAULT_CORPORA
            .iter()
            .map(|(language, family)| CorpusSpec::new(*language, *family))
            .collect()
    };

    let config = UpdateDbConfig {
        docs_dir: args
            .docs_dir
            .or(file.docs_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCS_DIR)),
        db_dir: args
            .db_dir
            .or(file.db_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_DIR)),
        corpora,
        families: file.families,
    };

    let known = config.known_families();
    for corpus in &config.corpora {
        if corpus.language.trim().is_empty() || !known.contains(&corpus.family.as_str()) {
            return Err(ConfigError::InvalidSetting {
                name: "corpus",
                value: format!("{}={}", corpus.language, corpus.family),
            });
        }
    }

    Ok(config)
}

fn parse_corpus(value: &str) -> Result<CorpusSpec, ConfigError> {
    value
        .split_once('=')
        .map(|(language, family)| CorpusSpec::new(language.trim(), family.trim()))
        .ok_or_else(|| ConfigError::InvalidSetting {
            name: "--corpus",
            value: value.to_string(),
        })
}
