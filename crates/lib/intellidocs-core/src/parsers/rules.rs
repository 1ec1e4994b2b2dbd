//! Extraction rules, one immutable rule set per documentation family.
//!
//! Families are data: adding one means adding a [`RuleDefinition`] to the
//! table, never branching on a family name in the extractor.

use std::{borrow::Cow, collections::HashMap, error::Error, fmt, sync::Arc};

use intellidocs_store::schema::{
    FAMILY_GO,
    FAMILY_JAVASCRIPT,
    FAMILY_LUA_LOVE,
    FAMILY_PHP,
    FAMILY_PYTHON,
};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Placeholder in a `doc` pattern replaced by the escaped lookup key.
pub const DOC_KEY_PLACEHOLDER: &str = "{name}";

/// Post-processing applied to a normalized syntax string, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxPostProcess {
    /// `")Returns:"` becomes `") Returns:"`.
    ReturnsLabelSpacing,
    /// Splits repeated `");"` terminators into alternative call forms.
    SplitOverloads,
}

/// Prefix replacement that yields an extra lookup key, e.g. `jQuery.` -> `$.`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceAlias {
    pub prefix: String,
    pub replacement: String,
}

impl NamespaceAlias {
    pub fn new(prefix: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            replacement: replacement.into(),
        }
    }

    /// Returns the aliased name when `name` starts with the prefix.
    #[must_use]
    pub fn apply(&self, name: &str) -> Option<String> {
        let rest = name.strip_prefix(self.prefix.as_str())?;
        let alias = format!("{}{rest}", self.replacement);
        (alias != name).then_some(alias)
    }
}

/// Source form of a family's rules, as written in a table or config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub descr: String,
    pub syntax: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_alias: Option<NamespaceAlias>,
    #[serde(default = "default_postprocess")]
    pub postprocess: Vec<SyntaxPostProcess>,
}

impl RuleDefinition {
    pub fn new(descr: impl Into<String>, syntax: impl Into<String>) -> Self {
        Self {
            descr: descr.into(),
            syntax: syntax.into(),
            params: None,
            doc: None,
            alias: None,
            skip: None,
            namespace_alias: None,
            postprocess: default_postprocess(),
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: impl Into<String>) -> Self {
        self.params = Some(params.into());
        self
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    #[must_use]
    pub fn with_skip(mut self, skip: impl Into<String>) -> Self {
        self.skip = Some(skip.into());
        self
    }

    #[must_use]
    pub fn with_namespace_alias(mut self, alias: NamespaceAlias) -> Self {
        self.namespace_alias = Some(alias);
        self
    }

    #[must_use]
    pub fn with_postprocess(mut self, steps: Vec<SyntaxPostProcess>) -> Self {
        self.postprocess = steps;
        self
    }
}

fn default_postprocess() -> Vec<SyntaxPostProcess> {
    vec![
        SyntaxPostProcess::ReturnsLabelSpacing,
        SyntaxPostProcess::SplitOverloads,
    ]
}

/// Error raised when a rule pattern does not compile.
#[derive(Debug)]
pub struct RuleError {
    pub family: String,
    pub field: &'static str,
    source: regex::Error,
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} pattern for family {}: {}",
            self.field, self.family, self.source
        )
    }
}

impl Error for RuleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Isolates the part of a fragment that documents one symbol.
#[derive(Debug, Clone)]
pub enum DocPattern {
    Fixed(Regex),
    /// Pattern source containing [`DOC_KEY_PLACEHOLDER`].
    Keyed(String),
}

impl DocPattern {
    fn compile(source: &str) -> Result<Self, regex::Error> {
        if source.contains(DOC_KEY_PLACEHOLDER) {
            build_regex(&source.replace(DOC_KEY_PLACEHOLDER, "key"))?;
            Ok(Self::Keyed(source.to_string()))
        } else {
            build_regex(source).map(Self::Fixed)
        }
    }

    /// Returns the regex for `key`, escaping it into the placeholder.
    ///
    /// # Errors
    /// Returns `regex::Error` if the keyed pattern exceeds the regex limits.
    pub fn regex_for(&self, key: &str) -> Result<Cow<'_, Regex>, regex::Error> {
        match self {
            Self::Fixed(regex) => Ok(Cow::Borrowed(regex)),
            Self::Keyed(template) => {
                let source = template.replace(DOC_KEY_PLACEHOLDER, &regex::escape(key));
                build_regex(&source).map(Cow::Owned)
            }
        }
    }
}

/// Compiled extraction rules for one family.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub family: String,
    pub descr: Regex,
    pub syntax: Regex,
    pub params: Option<Regex>,
    pub doc: Option<DocPattern>,
    pub alias: Option<Regex>,
    pub skip: Option<Regex>,
    pub namespace_alias: Option<NamespaceAlias>,
    pub postprocess: Vec<SyntaxPostProcess>,
}

impl RuleSet {
    /// Compiles a rule definition. Every pattern matches across newlines.
    ///
    /// # Errors
    /// Returns `RuleError` naming the first pattern that fails to compile.
    pub fn compile(family: &str, definition: &RuleDefinition) -> Result<Self, RuleError> {
        let wrap = |field: &'static str| {
            move |source: regex::Error| RuleError {
                family: family.to_string(),
                field,
                source,
            }
        };
        let optional = |pattern: Option<&str>, field: &'static str| {
            pattern.map(build_regex).transpose().map_err(wrap(field))
        };

        Ok(Self {
            family: family.to_string(),
            descr: build_regex(&definition.descr).map_err(wrap("descr"))?,
            syntax: build_regex(&definition.syntax).map_err(wrap("syntax"))?,
            params: optional(definition.params.as_deref(), "params")?,
            doc: definition
                .doc
                .as_deref()
                .map(DocPattern::compile)
                .transpose()
                .map_err(wrap("doc"))?,
            alias: optional(definition.alias.as_deref(), "alias")?,
            skip: optional(definition.skip.as_deref(), "skip")?,
            namespace_alias: definition.namespace_alias.clone(),
            postprocess: definition.postprocess.clone(),
        })
    }

    /// Returns true when the family drops `name` entirely.
    #[must_use]
    pub fn is_skipped(&self, name: &str) -> bool {
        self.skip.as_ref().is_some_and(|skip| skip.is_match(name))
    }

    /// Returns the prefix-stripped alias of `name`, when it differs.
    #[must_use]
    pub fn alias_for(&self, name: &str) -> Option<String> {
        let alias = self.alias.as_ref()?.replace(name, "");
        (alias != name && !alias.is_empty()).then(|| alias.into_owned())
    }

    /// Returns the namespace alias of `name`, when the family defines one.
    #[must_use]
    pub fn namespace_alias_for(&self, name: &str) -> Option<String> {
        self.namespace_alias.as_ref()?.apply(name)
    }
}

/// Strategy table mapping a family identifier to its compiled rules.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    families: HashMap<String, Arc<RuleSet>>,
}

impl RuleTable {
    /// Compiles the built-in rules for the devdocs families.
    ///
    /// # Errors
    /// Returns `RuleError` if a built-in pattern fails to compile.
    pub fn builtin() -> Result<Self, RuleError> {
        let mut table = Self::default();
        for (family, definition) in builtin_definitions() {
            table.insert(family, &definition)?;
        }
        Ok(table)
    }

    /// Adds or replaces the rules of one family.
    ///
    /// # Errors
    /// Returns `RuleError` if a pattern fails to compile.
    pub fn insert(&mut self, family: &str, definition: &RuleDefinition) -> Result<(), RuleError> {
        let rules = RuleSet::compile(family, definition)?;
        self.families.insert(family.to_string(), Arc::new(rules));
        Ok(())
    }

    #[must_use]
    pub fn get(&self, family: &str) -> Option<Arc<RuleSet>> {
        self.families.get(family).cloned()
    }

    /// Lists family names in sorted order.
    #[must_use]
    pub fn families(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.families.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Rule definitions for the families shipped with the devdocs dumps.
#[must_use]
pub fn builtin_definitions() -> Vec<(&'static str, RuleDefinition)> {
    vec![
        (
            FAMILY_GO,
            RuleDefinition::new(r"<p>(.*?)</p>", r"<pre\b[^>]*>(.*?)</pre>")
                .with_doc(r#"\sid="{name}">(.*?)<(?:h[1234]|div)\b"#)
                .with_alias(concat!(
                    r"^(?:bufio|builtin|bytes|context|crypto|encoding|errors|expvar|flag|fmt|",
                    r"hash|html|image|io|log|math|mime|net|os|path|plugin|reflect|regexp|",
                    r"runtime|sort|strconv|strings|sync|syscall|testing|time|unicode|unsafe)\."
                )),
        ),
        (
            FAMILY_PHP,
            RuleDefinition::new(r"rdfs-comment.*?>(.*?)</p>", r"methodsynopsis.*?>(.*?)</pre>")
                .with_params(r"<dt>(.*?)<dd>(.*?)</dd>"),
        ),
        (
            FAMILY_PYTHON,
            RuleDefinition::new(r"<p>(.*?)</p>", r"<code>(.*?)</code>")
                .with_doc(r#"\sid="{name}">(.*?)</dd>"#)
                .with_alias(
                    r"^(?:str|dict|int|float|list|bytes|bytearray|array\.array|array|re\.match)\.",
                ),
        ),
        (
            FAMILY_JAVASCRIPT,
            RuleDefinition::new(
                r"<h1[\s>].*?<p>(.*?)</p>",
                r"(?:[sS]yntax|section).*?<(?:code|pre|span).*?>(.*?\).*?)</(?:p|pre|code|h2)>",
            )
            .with_params(
                r"(?:<dt>(.*?)<dd>(.*?)</dd>|<li>.{5,30}<strong>(.*?)</strong>(.*?)</li>)",
            )
            .with_alias(
                r"^(?:[aA]rray|[sS]tring|[dD]ate|[fF]unction|[oO]bject|[rR]egExp|[nN]umber|window)\.",
            )
            .with_namespace_alias(NamespaceAlias::new("jQuery.", "$.")),
        ),
        (
            FAMILY_LUA_LOVE,
            RuleDefinition::new(r"<p>(.*?)</p>", r"Synopsis</h3>\s*<pre [^>]+>([^<]+)")
                // everything before the second variant of a function page
                .with_doc(r#"\A(?:(.*?)."Function_2"|(.+))"#)
                .with_params(r"<dt>\s*<code>\s*<a [^>]+>(.+?)<dd>(.*?)</dd>")
                .with_alias(concat!(
                    r"^(?:enet|love\.audio|love\.event|love\.filesystem|love\.font|",
                    r"love\.graphics|love\.image|love\.joystick|love\.keyboard|love\.math|",
                    r"love\.mouse|love\.physics|love\.sound|love\.system|love\.thread|",
                    r"love\.timer|love\.touch|love\.video|love\.window|love|Lua)\."
                )),
        ),
    ]
}

fn build_regex(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).dot_matches_new_line(true).build()
}
