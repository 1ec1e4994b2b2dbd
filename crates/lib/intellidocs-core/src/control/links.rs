//! Help links from record paths to online documentation.
//!
//! A table maps a path pattern, matched at the start of `DocRecord::path`, to a
//! URL template. Templates may use `{name}`, `{path}`, `{type}`, `{syntax}` and
//! `{descr}`.

use std::{collections::BTreeMap, error::Error, fmt};

use intellidocs_store::models::DocRecord;
use regex::Regex;
use serde::{Deserialize, Serialize};

const HOST_PREFIX: &str = "//";

/// Resolved link for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpLink {
    /// Host part of the URL, shown as the link label.
    pub host: String,
    pub url: String,
}

#[derive(Debug)]
pub enum LinkError {
    Pattern { pattern: String, source: regex::Error },
    MissingHost { pattern: String, template: String },
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern { pattern, source } => {
                write!(f, "invalid help link pattern {pattern}: {source}")
            }
            Self::MissingHost { pattern, template } => {
                write!(f, "help link for {pattern} has no host: {template}")
            }
        }
    }
}

impl Error for LinkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Pattern { source, .. } => Some(source),
            Self::MissingHost { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
struct LinkRule {
    matcher: Regex,
    host: String,
    template: String,
}

/// Ordered pattern to URL template table.
#[derive(Debug, Clone, Default)]
pub struct HelpLinks {
    rules: Vec<LinkRule>,
}

impl HelpLinks {
    /// Compiles a table; rules are tried in pattern order.
    ///
    /// # Errors
    /// Returns `LinkError` if a pattern is invalid or a template has no host.
    pub fn from_map(links: &BTreeMap<String, String>) -> Result<Self, LinkError> {
        let rules = links
            .iter()
            .map(|(pattern, template)| {
                let matcher = Regex::new(&format!("^(?:{pattern})")).map_err(|source| {
                    LinkError::Pattern {
                        pattern: pattern.clone(),
                        source,
                    }
                })?;
                let host = host_of(template).ok_or_else(|| LinkError::MissingHost {
                    pattern: pattern.clone(),
                    template: template.clone(),
                })?;
                Ok(LinkRule {
                    matcher,
                    host: host.to_string(),
                    template: template.clone(),
                })
            })
            .collect::<Result<Vec<_>, LinkError>>()?;
        Ok(Self { rules })
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the link of the first pattern matching the record path.
    #[must_use]
    pub fn resolve(&self, record: &DocRecord) -> Option<HelpLink> {
        self.matching(record).next()
    }

    /// Returns the links of every matching pattern, in pattern order.
    #[must_use]
    pub fn resolve_all(&self, record: &DocRecord) -> Vec<HelpLink> {
        self.matching(record).collect()
    }

    fn matching<'a>(&'a self, record: &'a DocRecord) -> impl Iterator<Item = HelpLink> + 'a {
        self.rules
            .iter()
            .filter(|rule| rule.matcher.is_match(&record.path))
            .map(|rule| HelpLink {
                host: rule.host.clone(),
                url: fill_template(&rule.template, record),
            })
    }
}

fn host_of(template: &str) -> Option<&str> {
    let (_, rest) = template.split_once(HOST_PREFIX)?;
    rest.split_once('/').map(|(host, _)| host)
}

fn fill_template(template: &str, record: &DocRecord) -> String {
    [
        ("{name}", record.name.as_str()),
        ("{path}", record.path.as_str()),
        ("{type}", record.kind.as_str()),
        ("{syntax}", record.syntax.as_str()),
        ("{descr}", record.descr.as_str()),
    ]
    .iter()
    .fold(template.to_string(), |url, (placeholder, value)| {
        url.replace(placeholder, value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str) -> DocRecord {
        DocRecord {
            name: "str.replace".to_string(),
            path: path.to_string(),
            kind: "Built-in Types".to_string(),
            syntax: "str.replace(old, new[, count])".to_string(),
            descr: String::new(),
            params: Vec::new(),
        }
    }

    fn table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(pattern, template)| ((*pattern).to_string(), (*template).to_string()))
            .collect()
    }

    #[test]
    fn first_matching_pattern_wins() {
        let links = HelpLinks::from_map(&table(&[
            ("python/", "https://docs.python.org/3/{path}.html"),
            ("p", "https://devdocs.io/{path}"),
            ("go/", "https://golang.org/pkg/{name}"),
        ]))
        .expect("valid links");
        assert_eq!(links.len(), 3);
        assert!(HelpLinks::default().is_empty());

        let link = links
            .resolve(&record("python/library/stdtypes#str.replace"))
            .expect("python link");
        assert_eq!(link.host, "devdocs.io");
        assert_eq!(link.url, "https://devdocs.io/python/library/stdtypes#str.replace");
        assert_eq!(links.resolve_all(&record("python/library")).len(), 2);
    }

    #[test]
    fn patterns_anchor_at_path_start() {
        let links = HelpLinks::from_map(&table(&[("library", "https://example.org/{name}")]))
            .expect("valid links");
        assert!(links.resolve(&record("python/library/stdtypes")).is_none());
    }

    #[test]
    fn templates_fill_every_field() {
        let links = HelpLinks::from_map(&table(&[(
            "python",
            "https://search.example.com/q?n={name}&t={type}&s={syntax}",
        )]))
        .expect("valid links");
        let link = links.resolve(&record("python/x")).expect("link");

        assert_eq!(link.host, "search.example.com");
        assert_eq!(
            link.url,
            "https://search.example.com/q?n=str.replace&t=Built-in Types&s=str.replace(old, new[, count])"
        );
    }

    #[test]
    fn invalid_entries_are_rejected() {
        let bad_pattern = HelpLinks::from_map(&table(&[("(", "https://a.b/")]));
        assert!(matches!(bad_pattern, Err(LinkError::Pattern { .. })));

        let no_host = HelpLinks::from_map(&table(&[("go", "golang.org/pkg")]));
        assert!(matches!(no_host, Err(LinkError::MissingHost { .. })));
    }
}
