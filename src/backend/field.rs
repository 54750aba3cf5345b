//! FieldResolver (spec.md §4.2): map logical field names to backend names.

use crate::config::{FieldMapping, SigmaConfig};
use crate::model::Logsource;

/// `fieldNameMapping`: resolve `field` against `sigmaconfig.fieldmappings`,
/// honouring conditional mappings keyed by the rule's active logsource.
/// Returns the original field name unchanged when nothing applies.
pub fn resolve(field: &str, config: &SigmaConfig, logsource: &Logsource) -> String {
    let mapping = config
        .fieldmappings
        .get(field)
        .or_else(|| {
            field
                .split_once('|')
                .and_then(|(prefix, _)| config.fieldmappings.get(prefix))
        });

    match mapping {
        Some(FieldMapping::Simple(replacement)) => replacement.clone(),
        Some(FieldMapping::Conditional(conditions)) => logsource
            .entries()
            .into_iter()
            .find_map(|(key, value)| {
                conditions
                    .get(key)
                    .and_then(|by_value| by_value.get(value))
                    .filter(|replacement| !replacement.is_empty())
                    .cloned()
            })
            .unwrap_or_else(|| field.to_string()),
        None => field.to_string(),
    }
}
