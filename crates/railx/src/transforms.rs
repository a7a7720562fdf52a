//! 🔄 Transforms: the assembly line between "XML blob" and "rows a database will accept" 🎭🚆
//!
//! 🎬 COLD OPEN. INT. CONTROL CENTRE, 2:47 AM
//!
//! A Knowledgebase incident arrives. It has namespaces. It has a routes field with
//! HTML escaped inside XML. It says `<Planned>true</Planned>` and means it, probably.
//! Nobody downstream wants any of that. Downstream wants rows.
//!
//! ## Architecture 📐
//!
//! ```text
//!   XML text ──▶ incident_xml::parse_incident ──▶ RawIncident
//!                                                   │
//!                          fields::transform ◀──────┘
//!                                  │
//!                                  ▼
//!                            IncidentRecord ──▶ notifier (pre-flatten)
//!                                  │
//!                      flatten::flatten (operators × routes)
//!                                  │
//!                                  ▼
//!                        Vec<FlatIncidentRow> ──▶ sink
//! ```
//!
//! Everything in here is pure and synchronous. No I/O, no clocks, no shared state.
//! Same input, same output, every time. The one place in this crate you can trust. 🦆

pub(crate) mod fields;
pub(crate) mod flatten;
pub(crate) mod incident_xml;
pub(crate) mod timestamp;

pub use fields::{transform, truthy_string_to_bool};
pub use flatten::flatten;
pub use incident_xml::{IncidentNamespaces, ParserConfig, parse_incident};
pub use timestamp::normalize_timestamp;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::AffectedOperator;

    /// 🧪 The Grand Integration Test: XML → RawIncident → IncidentRecord → rows.
    #[test]
    fn the_one_where_a_two_route_incident_travels_the_whole_line() -> anyhow::Result<()> {
        let the_xml = r#"<?xml version="1.0"?>
<ns3:PtIncident xmlns:ns2="http://nationalrail.co.uk/xml/common" xmlns:ns3="http://nationalrail.co.uk/xml/incident">
  <ns3:CreationTime>2024-01-02T08:15:00.000Z</ns3:CreationTime>
  <ns3:IncidentNumber>ABC123</ns3:IncidentNumber>
  <ns3:Version>7</ns3:Version>
  <ns3:Planned>false</ns3:Planned>
  <ns3:ValidityPeriod><ns2:StartTime>2024-01-02T09:00:00.000Z</ns2:StartTime></ns3:ValidityPeriod>
  <ns3:Summary>Signalling problems at Leeds</ns3:Summary>
  <ns3:IncidentPriority>1</ns3:IncidentPriority>
  <ns3:Affects>
    <ns3:Operators>
      <ns3:AffectedOperator><ns3:OperatorRef>NT</ns3:OperatorRef><ns3:OperatorName>Northern</ns3:OperatorName></ns3:AffectedOperator>
    </ns3:Operators>
    <ns3:RoutesAffected>&lt;p&gt;Leeds to York / Leeds to Harrogate&lt;/p&gt;</ns3:RoutesAffected>
  </ns3:Affects>
</ns3:PtIncident>"#;

        let the_raw = parse_incident(the_xml, &ParserConfig::default())?;
        let the_record = transform(the_raw);

        // 🎭 "false" is a non-empty string, therefore true. Welcome to the quirk.
        assert_eq!(the_record.planned, Some(true));
        assert_eq!(the_record.creation_time.as_deref(), Some("2024-01-02 08:15:00"));
        assert_eq!(the_record.end_time, None);
        assert_eq!(
            the_record.operators_affected,
            vec![AffectedOperator {
                affected_operator_ref: Some("NT".to_string()),
                affected_operator_name: Some("Northern".to_string()),
            }]
        );

        let the_rows = flatten(&the_record);
        let the_routes: Vec<&str> = the_rows.iter().map(|r| r.route_affected.as_str()).collect();
        assert_eq!(the_routes, vec!["Leeds to York", "Leeds to Harrogate"]);
        assert!(the_rows.iter().all(|r| r.incident_priority == Some(1)));
        Ok(())
    }
}
