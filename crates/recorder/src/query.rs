//! PromQL query construction
//!
//! Pure string builders. Nothing here validates the expressions; the
//! backend reports malformed queries as errors.

use sleeker_config::Ttl;

use crate::spec::MetricSpec;

fn by_clause(spec: &MetricSpec) -> String {
    spec.labels().join(", ")
}

/// `<op> by (<labels>) (<input><filter>)`
pub fn aggregation_query(spec: &MetricSpec) -> String {
    format!(
        "{} by ({}) ({}{})",
        spec.operation(),
        by_clause(spec),
        spec.input(),
        spec.filtering()
    )
}

/// `<op> by (<labels>) (max_over_time(<input><filter>[<ttl>]))`
///
/// Returns a row for every series that reported at least once within `ttl`.
pub fn liveness_query(spec: &MetricSpec, ttl: &Ttl) -> String {
    format!(
        "{} by ({}) (max_over_time({}{}[{}]))",
        spec.operation(),
        by_clause(spec),
        spec.input(),
        spec.filtering(),
        ttl
    )
}

/// The derived counter as already exposed
pub fn recatch_query(spec: &MetricSpec) -> String {
    spec.output().to_string()
}
