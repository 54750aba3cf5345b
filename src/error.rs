//! Compiler error taxonomy (spec.md §7).
//!
//! One variant per failure class, `thiserror`-derived, matching how
//! `siem_unified_pipeline::error::PipelineError` is structured. Every
//! variant here is fatal to the rule being compiled, never to the batch —
//! callers (the CLI driver, or any embedding application) catch `CompileError`
//! per rule and move on.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompileError>;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("list contains a non-scalar value: {0}")]
    MalformedList(String),

    #[error("unsupported map value for field '{field}': {detail}")]
    UnsupportedMapValue { field: String, detail: String },

    #[error("unsupported type modifier: {0}")]
    UnsupportedTypeModifier(String),

    #[error("invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("unsupported aggregation function: {0}")]
    UnsupportedAggregation(String),

    #[error("condition AST shape error: {0}")]
    AstShapeError(String),

    #[error("config/options IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config/options YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
