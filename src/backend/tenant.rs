//! TenantAppender (spec.md §4.7): append tenant/product/service predicates.

use crate::config::OthersOptions;
use crate::model::Logsource;

/// Append tenant predicates to an already-rewritten WHERE body. A no-op when
/// there is nothing to append (no configured `additionalWhereClause` and no
/// matching product/service), so rules with no tenant context round-trip
/// unchanged.
pub fn append(where_body: &str, logsource: &Logsource, others: &OthersOptions, additional_where_clause: &str) -> String {
    let product_clause = logsource
        .product
        .as_deref()
        .and_then(|p| others.product.get(p))
        .map(|clause| format!(" AND {}", clause))
        .unwrap_or_default();
    let service_clause = logsource
        .service
        .as_deref()
        .and_then(|s| others.service.get(s))
        .map(|clause| format!(" AND {}", clause))
        .unwrap_or_default();

    if additional_where_clause.is_empty() && product_clause.is_empty() && service_clause.is_empty() {
        return where_body.to_string();
    }

    let suffix = format!(" AND {}{}{}", additional_where_clause, product_clause, service_clause);
    if let Some(stripped) = where_body.strip_suffix(')') {
        format!("{}{})", stripped, suffix)
    } else {
        format!("{}{}", where_body, suffix)
    }
}
