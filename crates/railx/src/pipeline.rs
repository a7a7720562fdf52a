//! 🚂 The incident pipeline: parse → transform → flatten, one message at a time.
//!
//! Stateless. Every call builds fresh values and forgets them afterwards. Two
//! versions of the same incident arriving out of order are both processed; deciding
//! which one is "latest" is the storage side's problem (see
//! [`crate::common::latest_version_rows`]).

use anyhow::Result;

use crate::common::{FlatIncidentRow, IncidentRecord};
use crate::transforms::{ParserConfig, flatten, parse_incident, transform};

/// 🚂 The orchestrator. Holds the parser configuration and nothing else.
#[derive(Debug, Clone, Default)]
pub struct IncidentPipeline {
    parser_config: ParserConfig,
}

impl IncidentPipeline {
    pub fn new(parser_config: ParserConfig) -> Self {
        Self { parser_config }
    }

    /// 📜 Parse and normalize one message into its canonical record.
    ///
    /// The notifier wants this shape, before any flattening happens.
    pub fn canonicalize(&self, xml_text: &str) -> Result<IncidentRecord> {
        let raw = parse_incident(xml_text, &self.parser_config)?;
        Ok(transform(raw))
    }

    /// 🧱 Full run for one message: the rows a sink should store.
    ///
    /// # Errors
    /// 💀 Malformed XML. Nothing else in here can fail.
    pub fn process_message(&self, xml_text: &str) -> Result<Vec<FlatIncidentRow>> {
        let record = self.canonicalize(xml_text)?;
        Ok(flatten(&record))
    }
}

/// 🧱 [`IncidentPipeline::process_message`] with the default parser configuration.
pub fn process_message(xml_text: &str) -> Result<Vec<FlatIncidentRow>> {
    IncidentPipeline::default().process_message(xml_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../fixtures/incident_le_sx.xml");

    #[test]
    fn the_one_where_greater_anglia_and_stansted_express_share_a_bad_day() -> Result<()> {
        let the_rows = process_message(SAMPLE)?;

        assert_eq!(the_rows.len(), 2, "two operators × one route");
        let operators: Vec<(Option<&str>, Option<&str>)> = the_rows
            .iter()
            .map(|row| {
                (
                    row.affected_operator_ref.as_deref(),
                    row.affected_operator_name.as_deref(),
                )
            })
            .collect();
        assert_eq!(
            operators,
            vec![
                (Some("LE"), Some("Greater Anglia")),
                (Some("SX"), Some("Stansted Express")),
            ]
        );

        for row in &the_rows {
            assert_eq!(row.incident_priority, Some(2));
            assert_eq!(row.planned, Some(true));
            assert_eq!(row.route_affected, "between Stansted Airport and Cambridge");
            assert_eq!(row.start_time.as_deref(), Some("2023-09-10 00:00:00"));
            assert_eq!(row.end_time.as_deref(), Some("2023-09-10 23:59:00"));
            assert_eq!(row.creation_time.as_deref(), Some("2023-09-08 10:21:34"));
        }

        // 🧪 identical except for the operator
        let mut first = the_rows[0].clone();
        first.affected_operator_ref = the_rows[1].affected_operator_ref.clone();
        first.affected_operator_name = the_rows[1].affected_operator_name.clone();
        assert_eq!(first, the_rows[1]);
        Ok(())
    }

    #[test]
    fn the_one_where_processing_twice_gives_the_same_answer() -> Result<()> {
        assert_eq!(process_message(SAMPLE)?, process_message(SAMPLE)?);
        Ok(())
    }

    #[test]
    fn the_one_where_no_operators_means_zero_rows_and_zero_drama() -> Result<()> {
        let no_operators = r#"<ns3:PtIncident xmlns:ns3="http://nationalrail.co.uk/xml/incident">
            <ns3:IncidentNumber>NOOP</ns3:IncidentNumber>
            <ns3:Affects>
              <ns3:RoutesAffected>&lt;p&gt;Route A / Route B&lt;/p&gt;</ns3:RoutesAffected>
            </ns3:Affects>
        </ns3:PtIncident>"#;

        assert!(process_message(no_operators)?.is_empty());
        Ok(())
    }

    #[test]
    fn the_one_where_legacy_mode_collapses_the_sample_to_one_row() -> Result<()> {
        let the_pipeline = IncidentPipeline::new(ParserConfig {
            legacy_duplicate_mode: true,
            ..ParserConfig::default()
        });
        let the_rows = the_pipeline.process_message(SAMPLE)?;
        assert_eq!(the_rows.len(), 1);
        assert_eq!(the_rows[0].affected_operator_ref.as_deref(), Some("LE"));
        Ok(())
    }

    #[test]
    fn the_one_where_garbage_in_means_error_out() {
        assert!(process_message("this is not xml, it's a timetable PDF").is_err());
    }
}
