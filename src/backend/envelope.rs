//! EnvelopeBuilder (spec.md §4.6): combine aggregation/severity/timeframe
//! metadata with the WHERE body into the WHEN/WITHIN/HAVING/SUPPRESS clause.

use crate::config::GeneralOptions;
use crate::model::Aggregation;

/// Build the full BDCL clause around an already-rewritten WHERE body.
pub fn build(
    where_body: &str,
    agg: Option<&Aggregation>,
    timeframe: Option<&str>,
    level: Option<&str>,
    general: &GeneralOptions,
) -> String {
    let mut having = general.having_clause_fields.clone();

    let is_count = agg.map(|a| a.aggfunc == "COUNT").unwrap_or(false);
    let supported_cond_op = agg
        .map(|a| matches!(a.cond_op.as_str(), ">" | ">="))
        .unwrap_or(false);

    if is_count {
        if let Some(groupfield) = agg.and_then(|a| a.groupfield.as_deref()) {
            having.push(groupfield.to_string());
        }
    }

    let when = if is_count && supported_cond_op {
        let a = agg.unwrap();
        match a.cond_op.as_str() {
            ">=" => {
                let threshold_is_one = if general.legacy_ge_threshold_bug {
                    false // reproduces the source's `int(agg.condition == 1)` bug
                } else {
                    a.condition.parse::<i64>().map(|n| n == 1).unwrap_or(false)
                };
                if threshold_is_one {
                    format!("{} event", a.condition)
                } else {
                    format!("{} events", a.condition)
                }
            }
            ">" => {
                let n: i64 = a.condition.parse().unwrap_or(0);
                format!("{} events", n + 1)
            }
            _ => unreachable!("supported_cond_op guards to >/>="),
        }
    } else {
        "1 event".to_string()
    };

    let mut out = format!("WHEN {}\n\tWHERE {}", when, where_body);
    if let Some(tf) = timeframe {
        out.push_str(&format!("\n\tWITHIN {}", tf));
    }
    out.push_str(&format!("\n\tHAVING SAME {}", having.join(",")));
    if let Some(lvl) = level {
        if let Some(duration) = general.sev_mapping.get(lvl) {
            out.push_str(&format!("\n\tSUPPRESS {}", duration));
        }
    }
    out
}
