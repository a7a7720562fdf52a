//! 🪚 Flattener: one canonical incident → one row per (operator, route).
//!
//! Operator-major, route-minor. O operators and R routes give exactly O×R rows.
//! No operators or no routes gives zero rows: no placeholder row with `None`s.

use crate::common::{FlatIncidentRow, IncidentRecord};

/// 🔄 Expand the operators × routes product into flat rows.
pub fn flatten(record: &IncidentRecord) -> Vec<FlatIncidentRow> {
    let routes = record.routes_affected.as_deref().unwrap_or_default();
    let mut rows = Vec::with_capacity(record.operators_affected.len() * routes.len());

    for operator in &record.operators_affected {
        for route in routes {
            rows.push(FlatIncidentRow {
                creation_time: record.creation_time.clone(),
                incident_number: record.incident_number.clone(),
                version: record.version.clone(),
                planned: record.planned,
                start_time: record.start_time.clone(),
                end_time: record.end_time.clone(),
                info_link: record.info_link.clone(),
                summary: record.summary.clone(),
                incident_priority: record.incident_priority,
                affected_operator_ref: operator.affected_operator_ref.clone(),
                affected_operator_name: operator.affected_operator_name.clone(),
                route_affected: route.clone(),
            });
        }
    }

    rows
}
