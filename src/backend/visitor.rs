//! NodeVisitor (spec.md §4.3): walk the condition AST, emit BDCL fragments.

use once_cell::sync::Lazy;
use regex::Regex;

use super::field;
use super::rewrite;
use super::value;
use crate::config::SigmaConfig;
use crate::error::{CompileError, Result};
use crate::model::{ConditionNode, Logsource, SigmaValue};

static DOUBLE_WRAPPED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(\(.*\)\)$").unwrap());

/// Entry point: walk `node`, producing `None` when the subtree contributes
/// nothing (an empty AND/OR), and running the final rewrite pass once more
/// on the assembled body (spec.md §4.5: "applied ... once more on the final
/// WHERE body").
pub fn generate_where(
    node: &ConditionNode,
    config: &SigmaConfig,
    logsource: &Logsource,
    fts_field: &str,
) -> Result<Option<String>> {
    let body = generate_node(node, config, logsource, fts_field)?;
    Ok(body.map(|b| rewrite::rewrite(&b)))
}

fn generate_node(
    node: &ConditionNode,
    config: &SigmaConfig,
    logsource: &Logsource,
    fts_field: &str,
) -> Result<Option<String>> {
    match node {
        ConditionNode::And(children) => {
            generate_combinator(children, " AND ", config, logsource, fts_field)
        }
        ConditionNode::Or(children) => {
            generate_combinator(children, " OR ", config, logsource, fts_field)
        }
        ConditionNode::Not(child) => generate_not(child, config, logsource, fts_field),
        ConditionNode::Subexpression(child) => {
            let inner = generate_node(child, config, logsource, fts_field)?;
            Ok(inner.map(|i| format!("({})", i)))
        }
        ConditionNode::MapItem { field: f, value: v } => {
            Ok(Some(generate_map_item(f, v, config, logsource)?))
        }
        ConditionNode::Keyword(v) => {
            let as_map_item = ConditionNode::MapItem {
                field: fts_field.to_string(),
                value: wildcard_wrap(v),
            };
            generate_node(&as_map_item, config, logsource, fts_field)
        }
    }
}

/// Treat a bare keyword leaf as a wildcarded match against the FTS field
/// (spec.md §4.3: `(<fulltextSearchField>, "*<s>*")`).
fn wildcard_wrap(v: &SigmaValue) -> SigmaValue {
    match v.as_display() {
        Some(s) => SigmaValue::Str(format!("*{}*", s)),
        None => v.clone(),
    }
}

fn generate_combinator(
    children: &[ConditionNode],
    joiner: &str,
    config: &SigmaConfig,
    logsource: &Logsource,
    fts_field: &str,
) -> Result<Option<String>> {
    let mut fragments = Vec::with_capacity(children.len());
    for child in children {
        if let Some(fragment) = generate_node(child, config, logsource, fts_field)? {
            fragments.push(fragment);
        }
    }
    if fragments.is_empty() {
        Ok(None)
    } else {
        Ok(Some(fragments.join(joiner)))
    }
}

fn generate_not(
    child: &ConditionNode,
    config: &SigmaConfig,
    logsource: &Logsource,
    fts_field: &str,
) -> Result<Option<String>> {
    let inner = match generate_node(child, config, logsource, fts_field)? {
        Some(i) => i,
        None => return Ok(None),
    };
    // A nested Subexpression can leave the fragment double-wrapped; strip one
    // layer so the rewriter's single-paren patterns can match.
    let unwrapped = if DOUBLE_WRAPPED.is_match(&inner) {
        inner[1..inner.len() - 1].to_string()
    } else {
        inner
    };
    let negated = format!("NOT ({})", unwrapped);
    Ok(Some(rewrite::rewrite(&negated)))
}

fn generate_map_item(
    raw_field: &str,
    sigma_value: &SigmaValue,
    config: &SigmaConfig,
    logsource: &Logsource,
) -> Result<String> {
    let resolved_field = field::resolve(raw_field, config, logsource);

    if let SigmaValue::List(items) = sigma_value {
        return generate_map_item_list(&resolved_field, items);
    }

    if let SigmaValue::Regex(pattern) = sigma_value {
        return Ok(format!(
            "{} {}",
            resolved_field,
            value::generate_typed_value_node(pattern)
        ));
    }

    if let SigmaValue::Str(_) | SigmaValue::Int(_) = sigma_value {
        let literal = value::generate_value_node(sigma_value).expect("scalar always renders");
        return if value::has_wildcard(sigma_value) {
            Ok(format!("{} LIKE {}", resolved_field, literal))
        } else {
            Ok(format!("{}={}", resolved_field, literal))
        };
    }

    // Unreachable for any value this crate models: every scalar already
    // returned above, lists and regexes returned earlier still, so only
    // `Null` can reach here. Kept to mirror blackdiamond.py's `elif
    // "sourcetype" in fieldname` branch, which sits in the same dead spot
    // in the original dispatch chain.
    if resolved_field.contains("sourcetype") {
        let literal = value::generate_value_node(sigma_value).ok_or_else(|| {
            CompileError::UnsupportedMapValue {
                field: resolved_field.clone(),
                detail: "sourcetype field requires a scalar value".to_string(),
            }
        })?;
        return Ok(format!("{}={}", resolved_field, literal));
    }

    match sigma_value {
        SigmaValue::Null => Ok(format!("{} IS NULL", resolved_field)),
        other => Err(CompileError::UnsupportedMapValue {
            field: resolved_field,
            detail: format!("{:?}", other),
        }),
    }
}

fn generate_map_item_list(field: &str, items: &[SigmaValue]) -> Result<String> {
    let mut clauses = Vec::with_capacity(items.len());
    for item in items {
        match item {
            SigmaValue::Str(_) | SigmaValue::Int(_) => {
                let literal = value::generate_value_node(item).expect("scalar always renders");
                clauses.push(format!("{} LIKE {}", field, literal));
            }
            other => return Err(CompileError::MalformedList(format!("{:?}", other))),
        }
    }
    Ok(format!("({})", clauses.join(" OR ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> (SigmaConfig, Logsource) {
        (SigmaConfig::default(), Logsource::default())
    }

    #[test]
    fn simple_equality() {
        let (c, l) = cfg();
        let node = ConditionNode::MapItem {
            field: "EventID".into(),
            value: SigmaValue::Int(4624),
        };
        let out = generate_where(&node, &c, &l, "message").unwrap().unwrap();
        assert_eq!(out, "EventID='4624'");
    }

    #[test]
    fn wildcard_map_item() {
        let (c, l) = cfg();
        let node = ConditionNode::MapItem {
            field: "Image".into(),
            value: SigmaValue::str("*\\\\cmd.exe"),
        };
        let out = generate_where(&node, &c, &l, "message").unwrap().unwrap();
        assert_eq!(out, "Image LIKE '%\\\\cmd.exe'");
    }

    #[test]
    fn list_of_values() {
        let (c, l) = cfg();
        let node = ConditionNode::MapItem {
            field: "User".into(),
            value: SigmaValue::List(vec![SigmaValue::str("alice"), SigmaValue::str("bob")]),
        };
        let out = generate_where(&node, &c, &l, "message").unwrap().unwrap();
        assert_eq!(out, "(User LIKE 'alice' OR User LIKE 'bob')");
    }

    #[test]
    fn negation_of_equality_flips_to_native_form() {
        let (c, l) = cfg();
        let node = ConditionNode::Not(Box::new(ConditionNode::Subexpression(Box::new(
            ConditionNode::MapItem {
                field: "User".into(),
                value: SigmaValue::str("admin"),
            },
        ))));
        let out = generate_where(&node, &c, &l, "message").unwrap().unwrap();
        assert_eq!(out, "(User != 'admin')");
        assert!(!out.contains("NOT ("));
    }

    #[test]
    fn wildcarded_sourcetype_field_still_uses_like() {
        let (c, l) = cfg();
        let node = ConditionNode::MapItem {
            field: "sourcetype".into(),
            value: SigmaValue::str("*nix*"),
        };
        let out = generate_where(&node, &c, &l, "message").unwrap().unwrap();
        assert_eq!(out, "sourcetype LIKE '%nix%'");
    }

    #[test]
    fn empty_and_yields_none() {
        let (c, l) = cfg();
        let node = ConditionNode::And(vec![]);
        assert!(generate_where(&node, &c, &l, "message").unwrap().is_none());
    }
}
