//! Backend: the tree-walking compiler (spec.md §2, §4).
//!
//! Submodules are ordered leaves-first, matching the component table in
//! spec.md §2: `value` and `field` have no internal dependencies, `visitor`
//! composes them (plus `rewrite`), `envelope`/`tenant` post-process the
//! visitor's output, and `mod.rs` (the Orchestrator) drives all of it.

pub mod csv;
pub mod envelope;
pub mod field;
pub mod fts;
pub mod rewrite;
pub mod tenant;
pub mod value;
pub mod visitor;

use crate::config::{Options, SigmaConfig};
use crate::error::{CompileError, Result};
use crate::model::ParsedRule;

const UNION_SEPARATOR: &str = "\nUNION OR\n";

/// Compile every condition parse on `rule` into its own BDCL clause.
/// `logsource` is rebound per condition, never stored on a shared instance
/// (spec.md §5, §9 "Global-ish state").
fn compile_conditions(rule: &ParsedRule, config: &SigmaConfig, options: &Options) -> Result<Vec<String>> {
    let mut clauses = Vec::with_capacity(rule.conditions.len());
    for parse in &rule.conditions {
        let raw_where = visitor::generate_where(
            &parse.parsed_search,
            config,
            &rule.logsource,
            &options.general.full_text_search_field,
        )?;

        let body = match raw_where {
            Some(body) => tenant::append(
                &body,
                &rule.logsource,
                &options.others,
                &options.general.additional_where_clause,
            ),
            None => {
                tracing::warn!(rule_id = %rule.id, "condition produced an empty WHERE body");
                String::new()
            }
        };

        let clause = envelope::build(
            &body,
            parse.parsed_agg.as_ref(),
            rule.detection.timeframe.as_deref(),
            rule.level.as_deref(),
            &options.general,
        );
        clauses.push(clause);
    }
    Ok(clauses)
}

/// `compile(parsed_rule, config, options) -> Result<String, CompileError>`
/// (spec.md §6): the library's single public entry point.
pub fn compile(rule: &ParsedRule, config: &SigmaConfig, options: &Options) -> Result<String> {
    if rule.conditions.is_empty() {
        return Err(CompileError::AstShapeError(format!(
            "rule '{}' has no condition parses",
            rule.id
        )));
    }

    tracing::debug!(rule_id = %rule.id, conditions = rule.conditions.len(), "compiling rule");

    let clauses = compile_conditions(rule, config, options)?;
    let joined = clauses.join(UNION_SEPARATOR);

    if options.output_csv {
        let severity_num = rule
            .level
            .as_deref()
            .and_then(|lvl| options.general.sev_mapping_as_num.get(lvl))
            .map(|n| n.to_string())
            .unwrap_or_default();
        Ok(csv::emit(rule, &joined, &severity_num))
    } else {
        Ok(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Aggregation, ConditionNode, ConditionParse, Logsource, SigmaValue};

    fn base_options() -> Options {
        let mut options = Options::default();
        options.general.full_text_search_field = "message".into();
        options.general.having_clause_fields = vec!["tenantname".into(), "obsname".into(), "obsip".into()];
        options
    }

    fn rule_with(conditions: Vec<ConditionParse>) -> ParsedRule {
        ParsedRule {
            id: "r1".into(),
            title: "t".into(),
            conditions,
            ..Default::default()
        }
    }

    #[test]
    fn simple_equality_rule_compiles() {
        let rule = rule_with(vec![ConditionParse {
            parsed_search: ConditionNode::MapItem {
                field: "EventID".into(),
                value: SigmaValue::Int(4624),
            },
            parsed_agg: None,
        }]);
        let out = compile(&rule, &SigmaConfig::default(), &base_options()).unwrap();
        assert_eq!(
            out,
            "WHEN 1 event\n\tWHERE (EventID='4624')\n\tHAVING SAME tenantname,obsname,obsip"
        );
    }

    #[test]
    fn multi_condition_rule_joins_with_union_or() {
        let parse = ConditionParse {
            parsed_search: ConditionNode::MapItem {
                field: "EventID".into(),
                value: SigmaValue::Int(1),
            },
            parsed_agg: None,
        };
        let rule = rule_with(vec![parse.clone(), parse]);
        let out = compile(&rule, &SigmaConfig::default(), &base_options()).unwrap();
        assert_eq!(out.matches("\nUNION OR\n").count(), 1);
    }

    #[test]
    fn aggregation_threshold_scenario() {
        let rule = rule_with(vec![ConditionParse {
            parsed_search: ConditionNode::MapItem {
                field: "SourceIp".into(),
                value: SigmaValue::str("10.0.0.1"),
            },
            parsed_agg: Some(Aggregation {
                aggfunc: "COUNT".into(),
                aggfield: None,
                groupfield: Some("SourceIp".into()),
                cond_op: ">".into(),
                condition: "5".into(),
            }),
        }]);
        let out = compile(&rule, &SigmaConfig::default(), &base_options()).unwrap();
        assert!(out.starts_with("WHEN 6 events"));
        assert!(out.contains("HAVING SAME tenantname,obsname,obsip,SourceIp"));
    }

    #[test]
    fn rule_with_no_conditions_is_an_ast_shape_error() {
        let rule = rule_with(vec![]);
        let err = compile(&rule, &SigmaConfig::default(), &base_options());
        assert!(matches!(err, Err(CompileError::AstShapeError(_))));
    }

    #[test]
    fn logsource_is_rebound_per_condition() {
        let rule = ParsedRule {
            id: "r2".into(),
            title: "t".into(),
            logsource: Logsource {
                product: Some("windows".into()),
                ..Default::default()
            },
            conditions: vec![ConditionParse {
                parsed_search: ConditionNode::MapItem {
                    field: "Image".into(),
                    value: SigmaValue::str("*cmd.exe"),
                },
                parsed_agg: None,
            }],
            ..Default::default()
        };
        let out = compile(&rule, &SigmaConfig::default(), &base_options()).unwrap();
        assert!(out.contains("Image LIKE '%cmd.exe'"));
    }
}
