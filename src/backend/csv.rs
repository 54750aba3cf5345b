//! CsvEmitter (spec.md §4.8): wrap a compiled rule in a fixed-shape CSV row.
//!
//! Hand-built with `format!`, not the `csv` crate: every field is always
//! quoted regardless of content, and embedded commas are replaced with `;`
//! rather than quoted, which a general-purpose CSV writer won't do (see
//! DESIGN.md).

use crate::model::ParsedRule;

/// The 27-column header row a caller should write once per fresh CSV file.
pub const CSV_HEADER: &str = "InfoId,Tenant,Name,Description,FalsePositiveCheck,Analysis,Recommendation,Severity,Rule,IsExp,EvtSt,EvtObj,EvtCon,EvtAct,OutObj,OutCon,OutPro,Status,EvtTime,Suppression,SMStatus,ThresholdType,BucketSize,ThresholdFirstValue,ThresholdSecondValue,TmStatus,DrillDownQuery";

/// `formatStringInCSV`: escape free text for embedding in a quoted field.
fn format_string_in_csv(s: &str) -> String {
    s.replace('"', "\"\"").replace(',', ";")
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", s)
}

/// Quote a BDCL query string, doubling embedded `"` but leaving commas
/// alone — commas inside the query are structural (HAVING SAME lists,
/// value lists), not free text.
fn quoted_query(query: &str) -> String {
    format!("\"{}\"", query.replace('"', "\"\""))
}

/// Build the full CSV record for `rule` wrapping `bdcl`.
pub fn emit(rule: &ParsedRule, bdcl: &str, severity_num: &str) -> String {
    let is_experimental = if rule.status == "experimental" { "true" } else { "false" };
    let falsepositives = rule.falsepositives.join(", ");

    let fields = [
        quoted(&format_string_in_csv(&rule.id)),
        quoted("0"),
        quoted(&format_string_in_csv(&rule.title)),
        quoted(&format_string_in_csv(&rule.description)),
        quoted(&format_string_in_csv(&falsepositives)),
        quoted(""),
        quoted(""),
        quoted(severity_num),
        quoted_query(bdcl),
        quoted(is_experimental),
        quoted("0"),
        quoted("0"),
        quoted("0"),
        quoted("0"),
        quoted("0"),
        quoted("0"),
        quoted("0"),
        quoted("0"),
        quoted("0"),
        quoted("N"),
        quoted("-"),
        quoted("0"),
        quoted("0"),
        quoted("0"),
        quoted("0"),
        quoted("N"),
        quoted("[]"),
    ];
    fields.join(",")
}
