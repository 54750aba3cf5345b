//! Literal scenario tests (spec.md §8).

use sigma_bdcl::config::{GeneralOptions, Options, SigmaConfig};
use sigma_bdcl::model::{Aggregation, ConditionNode, ConditionParse, Logsource, ParsedRule, SigmaValue};

fn options() -> Options {
    let mut o = Options::default();
    o.general = GeneralOptions {
        full_text_search_field: "message".into(),
        having_clause_fields: vec!["tenantname".into(), "obsname".into(), "obsip".into()],
        ..Default::default()
    };
    o
}

fn rule(conditions: Vec<ConditionParse>) -> ParsedRule {
    ParsedRule {
        id: "rule-1".into(),
        title: "test rule".into(),
        conditions,
        ..Default::default()
    }
}

fn compile(r: &ParsedRule) -> String {
    sigma_bdcl::compile(r, &SigmaConfig::default(), &options()).expect("compile")
}

fn subexpr(field: &str, value: SigmaValue) -> ConditionNode {
    ConditionNode::Subexpression(Box::new(ConditionNode::MapItem {
        field: field.to_string(),
        value,
    }))
}

#[test]
fn simple_equality() {
    let r = rule(vec![ConditionParse {
        parsed_search: subexpr("EventID", SigmaValue::Int(4624)),
        parsed_agg: None,
    }]);
    let out = compile(&r);
    assert!(out.starts_with(
        "WHEN 1 event\n\tWHERE (EventID='4624')\n\tHAVING SAME tenantname,obsname,obsip"
    ));
}

#[test]
fn wildcard_map() {
    let r = rule(vec![ConditionParse {
        parsed_search: subexpr("Image", SigmaValue::str("*\\\\cmd.exe")),
        parsed_agg: None,
    }]);
    let out = compile(&r);
    assert!(out.contains("(Image LIKE '%\\\\cmd.exe')"));
}

#[test]
fn list_of_values() {
    let r = rule(vec![ConditionParse {
        parsed_search: ConditionNode::MapItem {
            field: "User".into(),
            value: SigmaValue::List(vec![SigmaValue::str("alice"), SigmaValue::str("bob")]),
        },
        parsed_agg: None,
    }]);
    let out = compile(&r);
    assert!(out.contains("(User LIKE 'alice' OR User LIKE 'bob')"));
}

#[test]
fn negation_of_equality() {
    let r = rule(vec![ConditionParse {
        parsed_search: ConditionNode::Not(Box::new(ConditionNode::Subexpression(Box::new(
            ConditionNode::MapItem {
                field: "User".into(),
                value: SigmaValue::str("admin"),
            },
        )))),
        parsed_agg: None,
    }]);
    let out = compile(&r);
    assert!(out.contains("(User != 'admin')"));
    assert!(!out.contains("NOT ("));
}

#[test]
fn aggregation_threshold() {
    let r = rule(vec![ConditionParse {
        parsed_search: ConditionNode::MapItem {
            field: "SourceIp".into(),
            value: SigmaValue::str("10.1.1.1"),
        },
        parsed_agg: Some(Aggregation {
            aggfunc: "COUNT".into(),
            aggfield: None,
            groupfield: Some("SourceIp".into()),
            cond_op: ">".into(),
            condition: "5".into(),
        }),
    }]);
    let out = compile(&r);
    assert!(out.starts_with("WHEN 6 events"));
    assert!(out.contains("HAVING SAME tenantname,obsname,obsip,SourceIp"));
}

#[test]
fn multi_condition_union() {
    let parse = ConditionParse {
        parsed_search: ConditionNode::MapItem {
            field: "EventID".into(),
            value: SigmaValue::Int(1),
        },
        parsed_agg: None,
    };
    let r = rule(vec![parse.clone(), parse]);
    let out = compile(&r);
    assert_eq!(out.matches("\nUNION OR\n").count(), 1);
}

#[test]
fn logsource_conditional_field_mapping() {
    use sigma_bdcl::config::FieldMapping;
    use std::collections::HashMap;

    let mut by_value = HashMap::new();
    by_value.insert("windows".to_string(), "win_user_name".to_string());
    let mut conditions = HashMap::new();
    conditions.insert("product".to_string(), by_value);

    let mut config = SigmaConfig::default();
    config
        .fieldmappings
        .insert("User".into(), FieldMapping::Conditional(conditions));

    let r = ParsedRule {
        id: "rule-2".into(),
        title: "t".into(),
        logsource: Logsource {
            product: Some("windows".into()),
            ..Default::default()
        },
        conditions: vec![ConditionParse {
            parsed_search: ConditionNode::MapItem {
                field: "User".into(),
                value: SigmaValue::str("admin"),
            },
            parsed_agg: None,
        }],
        ..Default::default()
    };

    let out = sigma_bdcl::compile(&r, &config, &options()).unwrap();
    assert!(out.contains("win_user_name='admin'"));
}
