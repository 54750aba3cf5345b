//! Backend configuration: field mappings and the options surface (spec.md §3, §6).
//!
//! Structured the way `siem_unified_pipeline`'s `config.rs` builds its
//! configuration surface — plain `serde`-derived structs, loaded from YAML.
//! Loading a full, validating configuration layer is out of scope (spec.md
//! §1); this is the thin convenience loader an ambient config stack still
//! gets regardless.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{CompileError, Result};

/// A logical-field → backend-field mapping, either a flat rename or one
/// keyed by the rule's active logsource (spec.md §9 REDESIGN FLAG).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldMapping {
    Simple(String),
    /// `logsource_key -> logsource_value -> replacement_field`.
    Conditional(HashMap<String, HashMap<String, String>>),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SigmaConfig {
    #[serde(default)]
    pub fieldmappings: HashMap<String, FieldMapping>,
}

impl SigmaConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(CompileError::Io)?;
        serde_yaml::from_str(&text).map_err(CompileError::Yaml)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GeneralOptions {
    #[serde(default = "default_fts_field")]
    pub full_text_search_field: String,
    #[serde(default)]
    pub sev_mapping: HashMap<String, String>,
    #[serde(default)]
    pub sev_mapping_as_num: HashMap<String, i64>,
    #[serde(default)]
    pub having_clause_fields: Vec<String>,
    #[serde(default)]
    pub additional_where_clause: String,
    /// Reproduce the original backend's `int(agg.condition == 1)` bug (an
    /// always-false string comparison, so the `>=` WHEN phrase is always
    /// "N events") instead of the evident-intent fix. Off by default; see
    /// spec.md §9 Open Question and DESIGN.md.
    #[serde(default)]
    pub legacy_ge_threshold_bug: bool,
}

fn default_fts_field() -> String {
    "message".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OthersOptions {
    #[serde(default)]
    pub product: HashMap<String, String>,
    #[serde(default)]
    pub service: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Options {
    #[serde(default)]
    pub general: GeneralOptions,
    #[serde(default)]
    pub others: OthersOptions,
    #[serde(default)]
    pub output_csv: bool,
}

impl Options {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(CompileError::Io)?;
        serde_yaml::from_str(&text).map_err(CompileError::Yaml)
    }
}
