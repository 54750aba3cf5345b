//! Data model for parsed Sigma rules.
//!
//! These types are the contract the (out-of-scope) Sigma frontend parser is
//! assumed to produce: a condition AST plus the handful of rule-level fields
//! the backend needs. Nothing here parses Sigma's condition grammar or YAML
//! detection blocks — callers build or deserialize these directly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A scalar or compound value attached to a `MapItem` leaf or used bare as a
/// keyword-only match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SigmaValue {
    Str(String),
    Int(i64),
    /// Scalar elements only (string or int) — mixed/compound lists are a
    /// backend error at compile time, not a parse-time guarantee.
    List(Vec<SigmaValue>),
    /// A value wrapped in a Sigma `|re` modifier.
    Regex(String),
    Null,
}

impl SigmaValue {
    pub fn str(s: impl Into<String>) -> Self {
        SigmaValue::Str(s.into())
    }

    /// Stringify a scalar the way Python's `str()` would for the purposes of
    /// `cleanValue`/`generateValueNode`. Not valid for `List`.
    pub fn as_display(&self) -> Option<String> {
        match self {
            SigmaValue::Str(s) => Some(s.clone()),
            SigmaValue::Int(i) => Some(i.to_string()),
            SigmaValue::Regex(r) => Some(r.clone()),
            SigmaValue::Null | SigmaValue::List(_) => None,
        }
    }
}

/// Condition AST node. Mirrors spec.md §3's recursive algebraic structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum ConditionNode {
    And(Vec<ConditionNode>),
    Or(Vec<ConditionNode>),
    Not(Box<ConditionNode>),
    /// A parenthetical grouping containing exactly one child.
    Subexpression(Box<ConditionNode>),
    MapItem { field: String, value: SigmaValue },
    /// Bare scalar at a boolean position: a keyword-only match with no field.
    Keyword(SigmaValue),
}

/// `aggfunc` is only ever `COUNT` in a supported rule; other values are kept
/// so the backend can reject them with `CompileError::UnsupportedAggregation`
/// rather than failing to deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub aggfunc: String,
    #[serde(default)]
    pub aggfield: Option<String>,
    #[serde(default)]
    pub groupfield: Option<String>,
    pub cond_op: String,
    /// Numeric threshold, kept as a string per the data model in spec.md §3.
    pub condition: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionParse {
    pub parsed_search: ConditionNode,
    #[serde(default)]
    pub parsed_agg: Option<Aggregation>,
}

impl Default for ConditionNode {
    fn default() -> Self {
        ConditionNode::And(Vec::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Logsource {
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Logsource {
    /// `(logsource_key, logsource_value)` pairs present on this rule, in a
    /// fixed order (product, service, category) — used by FieldResolver and
    /// TenantAppender, both of which need deterministic iteration.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        let mut out = Vec::with_capacity(3);
        if let Some(p) = &self.product {
            out.push(("product", p.as_str()));
        }
        if let Some(s) = &self.service {
            out.push(("service", s.as_str()));
        }
        if let Some(c) = &self.category {
            out.push(("category", c.as_str()));
        }
        out
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Detection {
    #[serde(default)]
    pub timeframe: Option<String>,
}

/// The immutable record the backend compiles. `raw` carries any YAML/JSON
/// fields the backend doesn't have a typed accessor for, so callers can
/// still round-trip a full Sigma document without this crate modeling every
/// field of it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedRule {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub falsepositives: Vec<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub logsource: Logsource,
    #[serde(default)]
    pub detection: Detection,
    pub conditions: Vec<ConditionParse>,
    #[serde(default)]
    pub raw: BTreeMap<String, serde_json::Value>,
}
