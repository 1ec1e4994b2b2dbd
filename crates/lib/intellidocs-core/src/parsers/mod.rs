//! Parsers for devdocs documentation fragments.
//!
//! The extractor applies a family's [`RuleSet`] to one HTML fragment and
//! normalizes what it finds into a record for the canonical data model.

pub mod html_fragment;
pub mod rules;
pub mod text;

pub use html_fragment::{Extraction, HtmlFragmentParser};
pub use rules::{
    DocPattern,
    NamespaceAlias,
    RuleDefinition,
    RuleError,
    RuleSet,
    RuleTable,
    SyntaxPostProcess,
};
