//! 🧹 Field transformer: [`RawIncident`] → [`IncidentRecord`].
//!
//! Total function. Every rule stands alone; one bad field never takes the others
//! down with it. Unparseable means `None`, full stop.

use crate::common::{IncidentRecord, RawIncident};
use crate::transforms::timestamp::normalize_timestamp;

const ROUTE_DELIMITER: &str = " / ";

/// 🎭 Boolean-of-a-string, the way the feed's first consumers read it.
///
/// Any non-empty string is `true`. Yes, including `"false"`. An empty string is
/// `false`, and a missing value stays `None`. Kept as its own named function so
/// the quirk is visible and gets its own tests instead of hiding in a cast.
pub fn truthy_string_to_bool(raw: Option<&str>) -> Option<bool> {
    raw.map(|text| !text.is_empty())
}

/// 🔢 Integer priority, tolerant of surrounding whitespace.
fn parse_priority(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|text| text.trim().parse::<i64>().ok())
}

/// 🛤️ `<p>Route A / Route B</p>` → `["Route A", "Route B"]`.
fn split_routes(raw: Option<&str>) -> Option<Vec<String>> {
    let stripped = raw?.replace("<p>", "").replace("</p>", "");
    Some(
        stripped
            .split(ROUTE_DELIMITER)
            .map(|route| route.trim().to_string())
            .collect(),
    )
}

/// 🔄 Normalize a raw incident into its canonical record. Never fails.
pub fn transform(raw: RawIncident) -> IncidentRecord {
    IncidentRecord {
        creation_time: normalize_timestamp(raw.creation_time.as_deref()),
        start_time: normalize_timestamp(raw.start_time.as_deref()),
        end_time: normalize_timestamp(raw.end_time.as_deref()),
        planned: truthy_string_to_bool(raw.planned.as_deref()),
        incident_priority: parse_priority(raw.incident_priority.as_deref()),
        routes_affected: split_routes(raw.routes_affected.as_deref()),
        incident_number: raw.incident_number,
        version: raw.version,
        info_link: raw.info_link,
        summary: raw.summary,
        operators_affected: raw.operators_affected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::AffectedOperator;

    #[test]
    fn the_one_where_false_is_true_because_strings_are_like_that() {
        assert_eq!(truthy_string_to_bool(Some("true")), Some(true));
        assert_eq!(truthy_string_to_bool(Some("false")), Some(true));
        assert_eq!(truthy_string_to_bool(Some("")), Some(false));
        assert_eq!(truthy_string_to_bool(None), None);
    }

    #[test]
    fn the_one_where_priority_must_be_a_number() {
        assert_eq!(parse_priority(Some("2")), Some(2));
        assert_eq!(parse_priority(Some(" 3 \n")), Some(3));
        assert_eq!(parse_priority(Some("urgent")), None);
        assert_eq!(parse_priority(Some("2.5")), None);
        assert_eq!(parse_priority(None), None);
    }

    #[test]
    fn the_one_where_routes_lose_their_paragraph_tags() {
        assert_eq!(
            split_routes(Some("<p>Route A / Route B</p>")),
            Some(vec!["Route A".to_string(), "Route B".to_string()])
        );
        assert_eq!(
            split_routes(Some("between Liverpool Street and Shenfield")),
            Some(vec!["between Liverpool Street and Shenfield".to_string()])
        );
        assert_eq!(split_routes(None), None);
    }

    #[test]
    fn the_one_where_a_route_list_survives_the_round_trip() {
        let the_routes = vec!["Route A".to_string(), "Route B".to_string()];
        let the_wire = format!("<p>{}</p>", the_routes.join(ROUTE_DELIMITER));
        assert_eq!(split_routes(Some(&the_wire)), Some(the_routes));
    }

    #[test]
    fn the_one_where_bad_fields_fail_alone() {
        // 🧪 every scalar is garbage except the ones that pass through untouched
        let the_raw = RawIncident {
            creation_time: Some("yesterday-ish".to_string()),
            incident_number: Some("INC9".to_string()),
            version: Some("4".to_string()),
            planned: None,
            start_time: Some("2023-09-10T00:00:00.000+01:00".to_string()),
            end_time: Some("soon".to_string()),
            info_link: None,
            summary: Some("Trespass".to_string()),
            incident_priority: Some("high".to_string()),
            operators_affected: vec![AffectedOperator::default()],
            routes_affected: None,
        };

        let the_record = transform(the_raw);

        assert_eq!(the_record.creation_time, None);
        assert_eq!(the_record.start_time.as_deref(), Some("2023-09-10 00:00:00"));
        assert_eq!(the_record.end_time, None);
        assert_eq!(the_record.planned, None);
        assert_eq!(the_record.incident_priority, None);
        assert_eq!(the_record.routes_affected, None);
        assert_eq!(the_record.incident_number.as_deref(), Some("INC9"));
        assert_eq!(the_record.summary.as_deref(), Some("Trespass"));
        assert_eq!(the_record.operators_affected.len(), 1);
    }
}
