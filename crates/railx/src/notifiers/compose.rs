use serde::{Deserialize, Serialize};

use crate::common::IncidentRecord;

/// 📟 Operators whose passengers signed up for texts. Everyone else gets silence.
pub const DEFAULT_ALLOWED_OPERATOR_CODES: [&str; 29] = [
    "LO", "VT", "CC", "CS", "CH", "XC", "EM", "XR", "ES", "GC", "LE", "GW", "HX", "HT", "GR",
    "LD", "ME", "NT", "SR", "SE", "TP", "AW", "LM", "GX", "GN", "SN", "TL", "SW", "IL",
];

fn default_allowed_operator_codes() -> Vec<String> {
    DEFAULT_ALLOWED_OPERATOR_CODES
        .iter()
        .map(|code| code.to_string())
        .collect()
}

fn default_topic_template() -> String {
    "rail-incidents-{operator_code}".to_string()
}

/// 🎯 Who gets told, and where the message goes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NotificationPolicy {
    #[serde(default = "default_allowed_operator_codes")]
    pub allowed_operator_codes: Vec<String>,
    /// `{operator_code}` is replaced with the operator's code.
    #[serde(default = "default_topic_template")]
    pub topic_template: String,
}

impl Default for NotificationPolicy {
    fn default() -> Self {
        Self {
            allowed_operator_codes: default_allowed_operator_codes(),
            topic_template: default_topic_template(),
        }
    }
}

/// 📨 One SMS-sized message for one operator's subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    #[serde(skip)]
    pub operator_code: String,
    pub topic: String,
    pub message: String,
}

/// 📣 Fan one canonical record out into per-operator notifications.
///
/// One notification per distinct allowed operator code, in first-seen order. An
/// operator listed twice in the record is still only texted once. Works on the
/// record before flattening, so the message lists every route in one go.
pub fn compose_notifications(
    record: &IncidentRecord,
    policy: &NotificationPolicy,
) -> Vec<Notification> {
    let mut notified: Vec<&str> = Vec::new();
    let mut notifications = Vec::new();

    for operator in &record.operators_affected {
        let Some(code) = operator.affected_operator_ref.as_deref() else {
            continue;
        };
        if notified.contains(&code) || !policy.allowed_operator_codes.iter().any(|c| c == code) {
            continue;
        }
        notified.push(code);

        let operator_name = operator.affected_operator_name.as_deref().unwrap_or(code);
        notifications.push(Notification {
            operator_code: code.to_string(),
            topic: policy.topic_template.replace("{operator_code}", code),
            message: render_message(record, operator_name),
        });
    }

    notifications
}

fn render_message(record: &IncidentRecord, operator_name: &str) -> String {
    let mut text = format!("\n\n🚄 {operator_name} incident 🚄:");
    text.push_str(&format!(
        "\n\nSummary: {}",
        record.summary.as_deref().unwrap_or("Unknown")
    ));
    text.push_str(&format!(
        "\n\nPriority: {}",
        record
            .incident_priority
            .map(|priority| priority.to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    ));
    text.push_str(&format!(
        "\n\nRoutes affected: {}",
        record
            .routes_affected
            .as_ref()
            .map(|routes| routes.join(", "))
            .unwrap_or_else(|| "Unknown".to_string())
    ));

    match (record.start_time.as_deref(), record.end_time.as_deref()) {
        (Some(start), Some(end)) => text.push_str(&format!("\n\nDuration: {start} to {end}")),
        (Some(start), None) => {
            text.push_str(&format!("\n\nStart time: {start} End time: Unknown"))
        }
        // 🤷 no start time, no duration line. We don't make up train times.
        (None, _) => {}
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::AffectedOperator;

    fn operator(code: &str, name: &str) -> AffectedOperator {
        AffectedOperator {
            affected_operator_ref: Some(code.to_string()),
            affected_operator_name: Some(name.to_string()),
        }
    }

    fn record(operators: Vec<AffectedOperator>) -> IncidentRecord {
        IncidentRecord {
            summary: Some("Signal failure at Shenfield".to_string()),
            incident_priority: Some(1),
            start_time: Some("2023-09-10 07:00:00".to_string()),
            end_time: Some("2023-09-10 12:00:00".to_string()),
            operators_affected: operators,
            routes_affected: Some(vec!["Route A".to_string(), "Route B".to_string()]),
            ..IncidentRecord::default()
        }
    }

    #[test]
    fn the_one_where_only_the_allow_listed_operators_get_a_text() {
        // 🧪 SX (Stansted Express) is not on the default list. LE is.
        let the_record = record(vec![
            operator("LE", "Greater Anglia"),
            operator("SX", "Stansted Express"),
        ]);

        let the_notifications = compose_notifications(&the_record, &NotificationPolicy::default());

        assert_eq!(the_notifications.len(), 1);
        assert_eq!(the_notifications[0].operator_code, "LE");
        assert_eq!(the_notifications[0].topic, "rail-incidents-LE");
    }

    #[test]
    fn the_one_where_a_repeated_operator_is_only_texted_once() {
        let the_record = record(vec![
            operator("GW", "Great Western Railway"),
            operator("GW", "Great Western Railway"),
            operator("LE", "Greater Anglia"),
        ]);

        let the_codes: Vec<String> =
            compose_notifications(&the_record, &NotificationPolicy::default())
                .into_iter()
                .map(|n| n.operator_code)
                .collect();
        assert_eq!(the_codes, vec!["GW".to_string(), "LE".to_string()]);
    }

    #[test]
    fn the_one_where_the_message_reads_like_an_sms() {
        let the_record = record(vec![operator("LE", "Greater Anglia")]);
        let the_notifications = compose_notifications(&the_record, &NotificationPolicy::default());
        let the_message = &the_notifications[0].message;

        assert!(the_message.contains("🚄 Greater Anglia incident 🚄:"));
        assert!(the_message.contains("Summary: Signal failure at Shenfield"));
        assert!(the_message.contains("Priority: 1"));
        assert!(the_message.contains("Routes affected: Route A, Route B"));
        assert!(the_message.contains("Duration: 2023-09-10 07:00:00 to 2023-09-10 12:00:00"));
    }

    #[test]
    fn the_one_where_nobody_knows_when_it_ends() {
        let mut the_record = record(vec![operator("LE", "Greater Anglia")]);
        the_record.end_time = None;
        let the_notifications = compose_notifications(&the_record, &NotificationPolicy::default());
        let the_message = &the_notifications[0].message;
        assert!(the_message.contains("Start time: 2023-09-10 07:00:00 End time: Unknown"));
        assert!(!the_message.contains("Duration:"));
    }

    #[test]
    fn the_one_where_a_custom_policy_rewrites_the_topic() {
        let the_policy = NotificationPolicy {
            allowed_operator_codes: vec!["SX".to_string()],
            topic_template: "alerts/{operator_code}/sms".to_string(),
        };
        let the_record = record(vec![
            operator("LE", "Greater Anglia"),
            operator("SX", "Stansted Express"),
        ]);

        let the_notifications = compose_notifications(&the_record, &the_policy);
        assert_eq!(the_notifications.len(), 1);
        assert_eq!(the_notifications[0].topic, "alerts/SX/sms");
    }
}
