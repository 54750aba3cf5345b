//! ValueFormatter (spec.md §4.1): escape/quote/wildcard-normalize scalar values.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CompileError, Result};
use crate::model::SigmaValue;

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});

static WRAPPED_REGEX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/.*/$").unwrap());
static HAS_ALPHA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z]").unwrap());

/// Result of `case_insensitive_value`.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseInsensitiveValue {
    pub is_regex: bool,
    pub value: String,
}

/// Double any single backslash not immediately followed by `\`, `*`, or `?`.
fn double_lone_backslashes(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    for i in 0..chars.len() {
        let c = chars[i];
        if c == '\\' {
            let prev_is_backslash = i > 0 && chars[i - 1] == '\\';
            let next_is_special = matches!(chars.get(i + 1), Some('\\') | Some('*') | Some('?'));
            if !prev_is_backslash && !next_is_special {
                out.push('\\');
            }
        }
        out.push(c);
    }
    out
}

/// Replace `*` with `%` unless it is preceded by an odd number of backslashes
/// or is part of a `**` run; never rewrite a single-character string.
fn rewrite_wildcard_star(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 1 {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    for i in 0..chars.len() {
        let c = chars[i];
        if c != '*' {
            out.push(c);
            continue;
        }
        let prev_star = i > 0 && chars[i - 1] == '*';
        let next_star = chars.get(i + 1) == Some(&'*');
        if prev_star || next_star {
            out.push('*');
            continue;
        }
        let mut trailing_backslashes = 0usize;
        for oc in out.chars().rev() {
            if oc == '\\' {
                trailing_backslashes += 1;
            } else {
                break;
            }
        }
        if trailing_backslashes % 2 == 0 {
            out.push('%');
        } else {
            out.push('*');
        }
    }
    out
}

/// `cleanValue` (spec.md §4.1): escape/wildcard-normalize a raw string value.
pub fn clean_value(val: &str) -> String {
    let step1 = double_lone_backslashes(val);
    let step2 = step1.replace('_', "\\_");
    let step3 = step2.replace('%', "\\%");
    rewrite_wildcard_star(&step3)
}

/// Stringify + quote a scalar value for use as a BDCL literal.
pub fn generate_value_node(value: &SigmaValue) -> Option<String> {
    match value {
        SigmaValue::Str(s) => Some(format!("'{}'", clean_value(s))),
        SigmaValue::Int(i) => Some(format!("'{}'", i)),
        SigmaValue::Regex(r) => Some(r.clone()),
        SigmaValue::Null | SigmaValue::List(_) => None,
    }
}

/// The raw (unquoted) cleaned text, used by wildcard detection.
fn clean_display(value: &SigmaValue) -> Option<String> {
    match value {
        SigmaValue::Str(s) => Some(clean_value(s)),
        SigmaValue::Int(i) => Some(i.to_string()),
        SigmaValue::Regex(r) => Some(r.clone()),
        SigmaValue::Null | SigmaValue::List(_) => None,
    }
}

fn has_wildcard_chars(cleaned: &str) -> bool {
    let chars: Vec<char> = cleaned.chars().collect();
    for i in 0..chars.len() {
        match chars[i] {
            '%' | '_' | '*' | '?' => return true,
            '\\' => {
                if matches!(chars.get(i + 1), Some('\\') | Some('*') | Some('?')) {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

/// Whether `value`'s cleaned text would need a `LIKE` rather than `=`.
/// A single-character string value is never treated as a wildcard
/// (spec.md §4.3).
pub fn has_wildcard(value: &SigmaValue) -> bool {
    if let SigmaValue::Str(s) = value {
        if s.chars().count() == 1 {
            return false;
        }
    }
    clean_display(value).map(|c| has_wildcard_chars(&c)).unwrap_or(false)
}

/// `generateTypedValueNode` (spec.md §4.1): regex values render verbatim,
/// with no escaping beyond stringification.
pub fn generate_typed_value_node(regex_src: &str) -> String {
    format!("MATCH REGEX(\"{}\")", regex_src)
}

/// `generateListNode` (spec.md §4.1): rejects non-scalar elements.
pub fn generate_list_node(values: &[SigmaValue]) -> Result<String> {
    let mut rendered = Vec::with_capacity(values.len());
    for v in values {
        match v {
            SigmaValue::Str(_) | SigmaValue::Int(_) => {
                rendered.push(generate_value_node(v).expect("scalar always renders"));
            }
            other => {
                return Err(CompileError::MalformedList(format!("{:?}", other)));
            }
        }
    }
    Ok(format!("({})", rendered.join(", ")))
}

/// `makeCaseInSensitiveValue` from the original backend
/// (examples/original_source/tools/sigma/backends/blackdiamond.py):
/// decide whether a literal should be promoted to a case-insensitive regex.
pub fn case_insensitive_value(value: &str) -> Result<CaseInsensitiveValue> {
    if value.is_empty()
        || value == "null"
        || WRAPPED_REGEX_RE.is_match(value)
        || !HAS_ALPHA_RE.is_match(value)
        || UUID_RE.is_match(value)
    {
        return Ok(CaseInsensitiveValue {
            is_regex: false,
            value: value.to_string(),
        });
    }

    let mut escaped = String::with_capacity(value.len());
    let chars: Vec<char> = value.chars().collect();
    for i in 0..chars.len() {
        let c = chars[i];
        if matches!(c, '@' | '?' | '&' | '~' | '<' | '>') && (i == 0 || chars[i - 1] != '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    Regex::new(&escaped).map_err(|source| CompileError::InvalidRegex {
        pattern: escaped.clone(),
        source,
    })?;

    Ok(CaseInsensitiveValue {
        is_regex: true,
        value: escaped,
    })
}
