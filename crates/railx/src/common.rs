//! 📦 Common data structures: the three shapes an incident wears on its way to the database.
//!
//! 🎬 COLD OPEN. INT. SIGNAL BOX, 06:12 AM
//!
//! A points failure at Bishop's Stortford. Somewhere, a content editor types
//! "Disruption between Stansted Airport and Cambridge" into a CMS. Seconds later
//! an XML document is born, pushed down a STOMP topic, and lands here.
//!
//! It arrives as a [`RawIncident`]: every field a hopeful `Option<String>`.
//! It leaves the transformer as an [`IncidentRecord`]: typed, trimmed, normalized.
//! It gets flattened into [`FlatIncidentRow`]s: one per (operator, route) pair,
//! ready for a relational table that never asked for nested lists. 🦆
//!
//! ⚠️ `version` stays a `String`. The feed sends digits, but the feed also once sent
//! a summary in all caps, so we trust nothing.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// 🚆 One train operating company touched by an incident.
///
/// Both halves are optional because the XML is allowed to be weird. Duplicates are
/// kept as-is: if the feed lists Greater Anglia twice, Greater Anglia gets two rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AffectedOperator {
    /// 🏷️ Short operator code, e.g. `LE`.
    pub affected_operator_ref: Option<String>,
    /// 📛 Display name, e.g. `Greater Anglia`.
    pub affected_operator_name: Option<String>,
}

/// 📥 An incident straight out of the XML parser, nothing coerced yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct RawIncident {
    pub creation_time: Option<String>,
    pub incident_number: Option<String>,
    pub version: Option<String>,
    pub planned: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub info_link: Option<String>,
    pub summary: Option<String>,
    pub incident_priority: Option<String>,
    pub operators_affected: Vec<AffectedOperator>,
    /// 🧻 The raw `<p>Route A / Route B</p>` blob, markup and all.
    pub routes_affected: Option<String>,
}

/// ✅ The canonical incident: typed fields, normalized timestamps, routes split into a list.
///
/// Built fresh per message, handed to the notifier, then flattened and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct IncidentRecord {
    /// 🕰️ `YYYY-MM-DD HH:MM:SS` in the feed's own offset, or `None`.
    pub creation_time: Option<String>,
    pub incident_number: Option<String>,
    pub version: Option<String>,
    pub planned: Option<bool>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub info_link: Option<String>,
    pub summary: Option<String>,
    pub incident_priority: Option<i64>,
    pub operators_affected: Vec<AffectedOperator>,
    pub routes_affected: Option<Vec<String>>,
}

/// 🧱 One relational row: every scalar incident field plus exactly one operator and one route.
///
/// Field names are the column names the loaders expect. Do not rename casually;
/// somewhere a dashboard query is holding its breath.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatIncidentRow {
    pub creation_time: Option<String>,
    pub incident_number: Option<String>,
    pub version: Option<String>,
    pub planned: Option<bool>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub info_link: Option<String>,
    pub summary: Option<String>,
    pub incident_priority: Option<i64>,
    pub affected_operator_ref: Option<String>,
    pub affected_operator_name: Option<String>,
    pub route_affected: String,
}

impl FlatIncidentRow {
    /// 🔑 The storage idempotency key: (incident_number, version).
    pub fn version_key(&self) -> (Option<&str>, Option<&str>) {
        (self.incident_number.as_deref(), self.version.as_deref())
    }

    /// 🫥 Neither incident number nor version: nothing to deduplicate on.
    pub fn is_unidentified(&self) -> bool {
        self.incident_number.is_none() && self.version.is_none()
    }
}

/// 🔢 Compare two incident versions.
///
/// Numeric when both sides parse as integers (the feed's usual `yyyymmddHHMMSS`
/// digits), lexicographic otherwise. A missing version sorts below everything.
pub fn compare_versions(left: Option<&str>, right: Option<&str>) -> Ordering {
    match (left, right) {
        (Some(l), Some(r)) => match (l.trim().parse::<u128>(), r.trim().parse::<u128>()) {
            (Ok(l_num), Ok(r_num)) => l_num.cmp(&r_num),
            _ => l.cmp(r),
        },
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// 🏁 Keep only the rows that belong to the latest version of each incident.
///
/// The read-side counterpart of "latest wins": group by `incident_number`, find the
/// max version, drop everything older. Input order is preserved among survivors.
pub fn latest_version_rows(rows: &[FlatIncidentRow]) -> Vec<FlatIncidentRow> {
    let mut latest: HashMap<Option<&str>, Option<&str>> = HashMap::new();
    for row in rows {
        let entry = latest
            .entry(row.incident_number.as_deref())
            .or_insert(row.version.as_deref());
        if compare_versions(row.version.as_deref(), *entry) == Ordering::Greater {
            *entry = row.version.as_deref();
        }
    }

    rows.iter()
        .filter(|row| {
            latest
                .get(&row.incident_number.as_deref())
                .is_some_and(|max| compare_versions(row.version.as_deref(), *max) == Ordering::Equal)
        })
        .cloned()
        .collect()
}
