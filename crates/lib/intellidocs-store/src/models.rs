use serde::{Deserialize, Serialize};

/// Normalized documentation record for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
///
/// Fields are declared in key order so store files come out fully sorted.
pub struct DocRecord {
    pub descr: String,
    pub name: String,
    #[serde(default)]
    pub params: Vec<DocParam>,
    /// Corpus-relative locator, `<corpus>/<entry path>`.
    pub path: String,
    pub syntax: String,
    /// Type tag copied from the corpus manifest.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Parameter documentation entry, in source order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocParam {
    pub descr: String,
    pub name: String,
}

/// One symbol listed in a corpus manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl ManifestEntry {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: kind.into(),
        }
    }

    /// Returns the fragment identifier of the entry path, if any.
    #[must_use]
    pub fn fragment_id(&self) -> Option<&str> {
        self.path.split_once('#').map(|(_, id)| id)
    }
}

/// Index of every symbol documented by one corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorpusManifest {
    #[serde(default)]
    pub entries: Vec<ManifestEntry>,
}

impl CorpusManifest {
    /// Parses a manifest from its JSON text.
    ///
    /// # Errors
    /// Returns `serde_json::Error` if the text is not a valid manifest.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Maps one corpus directory onto the family store it feeds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorpusSpec {
    pub language: String,
    pub family: String,
}

impl CorpusSpec {
    #[must_use]
    pub fn new(language: impl Into<String>, family: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            family: family.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_ignores_unknown_fields() {
        let json = r#"{
            "entries": [
                {"name": "Array.slice", "path": "global_objects/array/slice", "type": "Array"},
                {"name": "fmt.Println", "path": "fmt/index#Println", "type": "fmt"}
            ],
            "types": [{"name": "Array", "count": 1, "slug": "array"}]
        }"#;

        let manifest = CorpusManifest::from_json(json).expect("manifest should parse");

        assert_eq!(manifest.entries.len(), 2);
        assert_eq!(manifest.entries[0].kind, "Array");
        assert_eq!(manifest.entries[1].fragment_id(), Some("Println"));
        assert_eq!(manifest.entries[0].fragment_id(), None);
    }

    #[test]
    fn record_serializes_kind_as_type() {
        let record = DocRecord {
            name: "strlen".to_string(),
            path: "php/function.strlen".to_string(),
            kind: "Strings".to_string(),
            syntax: "strlen ( string $string ) : int".to_string(),
            descr: "Get string length".to_string(),
            params: vec![DocParam {
                name: "string".to_string(),
                descr: "The string being measured for length.".to_string(),
            }],
        };

        let value = serde_json::to_value(&record).expect("record should serialize");

        assert_eq!(value["type"], "Strings");
        assert!(value.get("kind").is_none());
        assert_eq!(value["params"][0]["name"], "string");
    }
}
