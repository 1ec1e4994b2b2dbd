pub const MANIFEST_FILE_NAME: &str = "index.json";
pub const FRAGMENT_EXTENSION: &str = "html";
pub const STORE_EXTENSION: &str = "json";

/// Manifest names containing this character denote sections, not symbols.
pub const SECTION_SEPARATOR: char = '/';
/// Separates a page path from the fragment identifier of one symbol.
pub const FRAGMENT_MARKER: char = '#';
/// Character that devdocs keeps in paths but never in fragment file names.
pub const RESERVED_PATH_CHAR: char = '*';
pub const RESERVED_PATH_REPLACEMENT: char = '_';

/// Decorative suffixes stripped from manifest display names.
pub const NAME_SUFFIXES: &[&str] = &[" constants", " variables", " (class)"];
/// Characters trimmed from both ends of manifest display names.
pub const NAME_TRIM_CHARS: &[char] = &['(', ')', '.'];

pub const FAMILY_GO: &str = "Go";
pub const FAMILY_JAVASCRIPT: &str = "Javascript";
pub const FAMILY_LUA_LOVE: &str = "Lua (Love)";
pub const FAMILY_PHP: &str = "PHP";
pub const FAMILY_PYTHON: &str = "Python";

/// Builds the store file name for a family, e.g. `Javascript.json`.
#[must_use]
pub fn store_file_name(family: &str) -> String {
    format!("{family}.{STORE_EXTENSION}")
}

/// Builds the stored record path for an entry of a corpus.
#[must_use]
pub fn make_record_path(corpus: &str, entry_path: &str) -> String {
    format!("{corpus}/{entry_path}")
}
