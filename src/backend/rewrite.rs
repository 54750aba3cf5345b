//! QueryRewriter (spec.md §4.5): normalize De Morgan-style negations.

use once_cell::sync::Lazy;
use regex::Regex;

const FIELD: &str = r"[A-Za-z_-]+";

static NOT_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"NOT \(({FIELD}) (LIKE '[^']*')\)")).unwrap()
});
static NOT_IN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"NOT \(({FIELD}) (IN \([^)]*\))\)")).unwrap()
});
static NOT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r#"NOT \(({FIELD}) (MATCH REGEX\("[^"]*"\))\)"#)).unwrap()
});
static NOT_EQ: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"NOT \(({FIELD})=('[^']*')\)")).unwrap()
});
static NOT_NULL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"NOT \(({FIELD}) IS NULL\)")).unwrap()
});

/// Rewrite every `NOT (...)` occurrence into the BDCL native negation form.
/// Idempotent: once rewritten, no `NOT (` substring this function recognizes
/// remains, so a second pass is a no-op.
pub fn rewrite(input: &str) -> String {
    let s = NOT_LIKE.replace_all(input, "($1 NOT $2)");
    let s = NOT_IN.replace_all(&s, "($1 NOT $2)");
    let s = NOT_REGEX.replace_all(&s, "($1 NOT $2)");
    let s = NOT_EQ.replace_all(&s, "($1 != $2)");
    let s = NOT_NULL.replace_all(&s, "($1 IS NOT NULL)");
    s.into_owned()
}
