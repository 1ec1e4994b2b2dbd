use intellidocs_store::models::{DocParam, DocRecord, ManifestEntry};
use intellidocs_store::schema::make_record_path;
use regex::{Captures, Regex};
use tracing::warn;

use super::rules::{RuleSet, SyntaxPostProcess};
use super::text::{first_sentence, normalize};

/// Call terminator that separates overloads inside one syntax block.
const CALL_TERMINATOR: &str = ");";
const OVERLOAD_SEPARATOR: &str = "); or ";

/// Outcome of extracting one manifest entry from its fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Record(DocRecord),
    /// The family's skip rule matched the entry name.
    Skipped,
    /// The syntax pattern found nothing in the working fragment.
    NoMatch,
}

/// Extracts documentation records from devdocs HTML fragments.
pub struct HtmlFragmentParser;

impl HtmlFragmentParser {
    /// Decomposes the part of `fragment` documenting `entry` into a record.
    ///
    /// `corpus` is the corpus directory name and prefixes the record path.
    pub fn extract(
        entry: &ManifestEntry,
        corpus: &str,
        fragment: &str,
        rules: &RuleSet,
    ) -> Extraction {
        if rules.is_skipped(&entry.name) {
            return Extraction::Skipped;
        }

        let doc = isolate_doc(entry, fragment, rules);

        let Some(raw_syntax) = first_capture(&rules.syntax, doc) else {
            return Extraction::NoMatch;
        };
        let syntax = postprocess_syntax(normalize(raw_syntax), &rules.postprocess);

        let descr = first_capture(&rules.descr, doc)
            .map(normalize)
            .unwrap_or_default();

        let params = rules
            .params
            .as_ref()
            .map(|pattern| extract_params(pattern, doc))
            .unwrap_or_default();

        Extraction::Record(DocRecord {
            name: entry.name.clone(),
            path: make_record_path(corpus, &entry.path),
            kind: entry.kind.clone(),
            syntax,
            descr,
            params,
        })
    }
}

/// Narrows the fragment to the region anchored at the entry's id.
///
/// The key is the path's fragment identifier, or the entry name when the path
/// has none. A missing region yields an empty working fragment.
fn isolate_doc<'a>(entry: &ManifestEntry, fragment: &'a str, rules: &RuleSet) -> &'a str {
    let Some(pattern) = rules.doc.as_ref() else {
        return fragment;
    };

    let key = entry.fragment_id().unwrap_or(&entry.name);
    let regex = match pattern.regex_for(key) {
        Ok(regex) => regex,
        Err(err) => {
            warn!(family = %rules.family, name = %entry.name, "doc pattern rejected key: {err}");
            return "";
        }
    };

    first_capture(&regex, fragment).unwrap_or("")
}

fn first_capture<'t>(regex: &Regex, text: &'t str) -> Option<&'t str> {
    regex.captures(text).as_ref().and_then(capture_text)
}

/// First participating group, or the whole match for group-less patterns.
fn capture_text<'t>(captures: &Captures<'t>) -> Option<&'t str> {
    captures
        .iter()
        .skip(1)
        .flatten()
        .next()
        .or_else(|| captures.get(0))
        .map(|found| found.as_str())
}

/// Collects parameters in match order.
///
/// Groups are read as `(name, descr)` slots: `(1, 2)`, `(3, 4)`, ... The first
/// slot with both sides non-empty wins; matches without one are ignored.
fn extract_params(pattern: &Regex, doc: &str) -> Vec<DocParam> {
    pattern
        .captures_iter(doc)
        .filter_map(|captures| {
            (1..captures.len()).step_by(2).find_map(|index| {
                let name = captures.get(index)?.as_str();
                let descr = captures.get(index + 1)?.as_str();
                (!name.is_empty() && !descr.is_empty()).then(|| DocParam {
                    name: normalize(name),
                    descr: first_sentence(&normalize(descr)),
                })
            })
        })
        .collect()
}

fn postprocess_syntax(mut syntax: String, steps: &[SyntaxPostProcess]) -> String {
    for step in steps {
        syntax = match step {
            SyntaxPostProcess::ReturnsLabelSpacing => syntax.replace(")Returns:", ") Returns:"),
            SyntaxPostProcess::SplitOverloads => split_overloads(syntax),
        };
    }
    syntax
}

/// Rewrites `a(x); b(y);` as `a(x); or b(y);`.
///
/// Only applies when the terminator occurs more than once. Text after the
/// last terminator becomes a form of its own.
fn split_overloads(syntax: String) -> String {
    if syntax.matches(CALL_TERMINATOR).count() < 2 {
        return syntax;
    }

    let forms: Vec<&str> = syntax
        .split(CALL_TERMINATOR)
        .map(str::trim)
        .filter(|form| !form.is_empty())
        .collect();
    let mut joined = forms.join(OVERLOAD_SEPARATOR);
    joined.push_str(CALL_TERMINATOR);
    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::rules::{RuleDefinition, RuleTable};
    use intellidocs_store::schema::{
        FAMILY_GO,
        FAMILY_JAVASCRIPT,
        FAMILY_LUA_LOVE,
        FAMILY_PHP,
        FAMILY_PYTHON,
    };

    fn builtin(family: &str) -> std::sync::Arc<RuleSet> {
        RuleTable::builtin()
            .expect("builtin rules should compile")
            .get(family)
            .expect("family should exist")
    }

    fn record(extraction: Extraction) -> DocRecord {
        match extraction {
            Extraction::Record(record) => record,
            other => panic!("expected a record, got {other:?}"),
        }
    }

    #[test]
    fn javascript_slice_scenario() {
        let rules = builtin(FAMILY_JAVASCRIPT);
        let entry = ManifestEntry::new("Array.slice", "global_objects/array/slice", "Array");
        let fragment =
            "<h1>Array.prototype.slice()</h1><p>desc</p>Syntax<code>arr.slice(begin)</code>";

        let record = record(HtmlFragmentParser::extract(
            &entry,
            "javascript",
            fragment,
            &rules,
        ));

        assert_eq!(record.syntax, "arr.slice(begin)");
        assert_eq!(record.descr, "desc");
        assert!(record.params.is_empty());
        assert_eq!(record.path, "javascript/global_objects/array/slice");
        assert_eq!(record.kind, "Array");
        assert_eq!(normalize(&record.syntax), record.syntax);
    }

    #[test]
    fn javascript_params_pick_first_complete_slot() {
        let rules = builtin(FAMILY_JAVASCRIPT);
        let entry = ManifestEntry::new("String.padEnd", "global_objects/string/padend", "String");
        let fragment = concat!(
            "<h1>String.prototype.padEnd()</h1><p>Pads the current string.</p>",
            "<h2>Syntax</h2><pre>str.padEnd(targetLength, padString)</pre>",
            "<h3>Parameters</h3><dl><dt><code>targetLength</code></dt>",
            "<dd>The length of the resulting string once the current string has been padded.</dd></dl>",
            "<ul><li>Since: <strong>padString</strong> Optional. The string to pad the current string with.</li></ul>"
        );

        let record = record(HtmlFragmentParser::extract(
            &entry,
            "javascript",
            fragment,
            &rules,
        ));

        assert_eq!(record.syntax, "str.padEnd(targetLength, padString)");
        assert_eq!(record.descr, "Pads the current string.");
        assert_eq!(
            record.params,
            vec![
                DocParam {
                    name: "targetLength".to_string(),
                    descr: "The length of the resulting string once the current string has been padded."
                        .to_string(),
                },
                DocParam {
                    name: "padString".to_string(),
                    descr: "Optional. The string to pad the current string with.".to_string(),
                },
            ]
        );
    }

    #[test]
    fn skip_rule_short_circuits() {
        let definition =
            RuleDefinition::new(r"<p>(.*?)</p>", r"<pre>(.*?)</pre>").with_skip(r".*::");
        let rules = RuleSet::compile("Test", &definition).expect("rules should compile");
        let entry = ManifestEntry::new("Foo::bar", "foo", "class");

        let extraction =
            HtmlFragmentParser::extract(&entry, "test", "<pre>Foo::bar()</pre>", &rules);

        assert_eq!(extraction, Extraction::Skipped);
    }

    #[test]
    fn missing_syntax_is_no_match_even_with_description() {
        let rules = builtin(FAMILY_PHP);
        let entry = ManifestEntry::new("strlen", "function.strlen", "Strings");
        let fragment = r#"<p class="para rdfs-comment">Returns the length.</p>"#;

        let extraction = HtmlFragmentParser::extract(&entry, "php", fragment, &rules);

        assert_eq!(extraction, Extraction::NoMatch);
    }

    #[test]
    fn php_synopsis_and_params() {
        let rules = builtin(FAMILY_PHP);
        let entry = ManifestEntry::new("strlen", "function.strlen", "Strings");
        let fragment = concat!(
            r#"<pre class="methodsynopsis dc-description"><span class="methodname"><strong>strlen</strong></span>"#,
            r#" ( <span class="methodparam"><span class="type">string</span> <code class="parameter">$string</code></span> )"#,
            r#" : <span class="type">int</span></pre>"#,
            r#"<p class="para rdfs-comment">Returns the length of the given <code>string</code>.</p>"#,
            r#"<dl><dt><code class="parameter">string</code></dt>"#,
            r#"<dd><p class="para">The string being measured for length.</p></dd></dl>"#
        );

        let record = record(HtmlFragmentParser::extract(&entry, "php", fragment, &rules));

        assert_eq!(record.syntax, "strlen ( string $string ) : int");
        assert_eq!(record.descr, "Returns the length of the given string.");
        assert_eq!(record.params.len(), 1);
        assert_eq!(record.params[0].name, "string");
        assert_eq!(record.params[0].descr, "The string being measured for length.");
    }

    #[test]
    fn go_doc_region_uses_fragment_id() {
        let rules = builtin(FAMILY_GO);
        let entry = ManifestEntry::new("fmt.Printf", "fmt/index#Printf", "fmt");
        let fragment = concat!(
            "<h2 id=\"Println\">func Println</h2>\n",
            "<pre>func Println(a ...any) (n int, err error)</pre>\n",
            "<p>Println formats using the default formats.</p>\n",
            "<h2 id=\"Printf\">func Printf</h2>\n",
            "<pre>func Printf(format string, a ...any) (n int, err error)</pre>\n",
            "<p>Printf formats according to a format specifier.</p>\n",
            "<h2 id=\"Sprint\">func Sprint</h2>\n"
        );

        let record = record(HtmlFragmentParser::extract(&entry, "go", fragment, &rules));

        assert_eq!(
            record.syntax,
            "func Printf(format string, a ...any) (n int, err error)"
        );
        assert_eq!(record.descr, "Printf formats according to a format specifier.");
        assert_eq!(record.path, "go/fmt/index#Printf");
    }

    #[test]
    fn missing_doc_region_is_no_match() {
        let rules = builtin(FAMILY_GO);
        let entry = ManifestEntry::new("fmt.Errorf", "fmt/index#Errorf", "fmt");
        let fragment = "<h2 id=\"Println\">func Println</h2><pre>func Println()</pre><h2>";

        let extraction = HtmlFragmentParser::extract(&entry, "go", fragment, &rules);

        assert_eq!(extraction, Extraction::NoMatch);
    }

    #[test]
    fn python_doc_region_uses_name_as_key() {
        let rules = builtin(FAMILY_PYTHON);
        let entry = ManifestEntry::new("str.replace", "library/stdtypes", "Built-in Types");
        let fragment = concat!(
            r#"<dl class="method"><dt id="str.upper"><code>str.upper()</code></dt><dd><p>Upper.</p></dd></dl>"#,
            r#"<dl class="method"><dt id="str.replace"><code>str.replace(old, new[, count])</code></dt>"#,
            r#"<dd><p>Return a copy of the string with all occurrences of substring <em>old</em> replaced by <em>new</em>.</p></dd></dl>"#
        );

        let record = record(HtmlFragmentParser::extract(&entry, "python", fragment, &rules));

        assert_eq!(record.syntax, "str.replace(old, new[, count])");
        assert_eq!(
            record.descr,
            "Return a copy of the string with all occurrences of substring old replaced by new."
        );
    }

    #[test]
    fn love_doc_region_stops_before_second_variant() {
        let rules = builtin(FAMILY_LUA_LOVE);
        let entry = ManifestEntry::new("love.graphics.draw", "love.graphics.draw", "love.graphics");
        let fragment = concat!(
            "<p>Draws a Drawable object on the screen.</p>",
            "<h3>Synopsis</h3><pre class=\"lua\">love.graphics.draw( drawable, x, y )</pre>",
            "<dl><dt><code><a href=\"Drawable\">Drawable</a> drawable</code></dt>",
            "<dd>A drawable object.</dd></dl>",
            "<h2 id=\"Function_2\">Function</h2>",
            "<h3>Synopsis</h3><pre class=\"lua\">love.graphics.draw( texture, quad, x, y )</pre>",
            "<dl><dt><code><a href=\"Texture\">Texture</a> texture</code></dt>",
            "<dd>A texture.</dd></dl>"
        );

        let record = record(HtmlFragmentParser::extract(&entry, "love", fragment, &rules));

        assert_eq!(record.syntax, "love.graphics.draw( drawable, x, y )");
        assert_eq!(record.descr, "Draws a Drawable object on the screen.");
        assert_eq!(
            record.params,
            vec![DocParam {
                name: "Drawable drawable".to_string(),
                descr: "A drawable object.".to_string(),
            }]
        );
    }

    #[test]
    fn overloads_split_into_alternatives() {
        let definition = RuleDefinition::new(r"<p>(.*?)</p>", r"<pre>(.*?)</pre>");
        let rules = RuleSet::compile("Test", &definition).expect("rules should compile");
        let entry = ManifestEntry::new("setTimeout", "settimeout", "window");
        let fragment = "<pre>setTimeout(code, delay);\n setTimeout(func, delay, arg1);</pre>";

        let record = record(HtmlFragmentParser::extract(&entry, "dom", fragment, &rules));

        assert_eq!(
            record.syntax,
            "setTimeout(code, delay); or setTimeout(func, delay, arg1);"
        );
        assert_eq!(normalize(&record.syntax), record.syntax);
    }

    #[test]
    fn overload_split_can_be_disabled() {
        let definition = RuleDefinition::new(r"<p>(.*?)</p>", r"<pre>(.*?)</pre>")
            .with_postprocess(vec![SyntaxPostProcess::ReturnsLabelSpacing]);
        let rules = RuleSet::compile("Test", &definition).expect("rules should compile");
        let entry = ManifestEntry::new("setTimeout", "settimeout", "window");
        let fragment = "<pre>setTimeout(code, delay); setTimeout(func, delay);</pre>";

        let record = record(HtmlFragmentParser::extract(&entry, "dom", fragment, &rules));

        assert_eq!(record.syntax, "setTimeout(code, delay); setTimeout(func, delay);");
    }

    #[test]
    fn single_terminator_is_left_alone() {
        assert_eq!(split_overloads("foo(a);".to_string()), "foo(a);");
    }

    #[test]
    fn returns_label_gets_a_space() {
        let steps = [SyntaxPostProcess::ReturnsLabelSpacing];
        assert_eq!(
            postprocess_syntax("jQuery.ajax( url [, settings ] )Returns: jqXHR".to_string(), &steps),
            "jQuery.ajax( url [, settings ] ) Returns: jqXHR"
        );
    }
}
