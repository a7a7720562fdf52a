//! 📜 Incident XML parser: one Knowledgebase incident document → [`RawIncident`].
//!
//! 🧠 Knowledge graph:
//! - Namespaces come in through [`ParserConfig`]. No global dictionary, no ambient state.
//! - Every scalar is "first matching descendant below the root, or `None`".
//! - Malformed XML is the only failure. A missing element is just a `None`.
//! - Two operator extraction modes, see [`ParserConfig::legacy_duplicate_mode`].

use anyhow::{Context, Result};
use roxmltree::{Document, Node};
use serde::Deserialize;
use tracing::trace;

use crate::common::{AffectedOperator, RawIncident};

fn default_common_namespace() -> String {
    "http://nationalrail.co.uk/xml/common".to_string()
}

fn default_incident_namespace() -> String {
    "http://nationalrail.co.uk/xml/incident".to_string()
}

/// 🏷️ The two namespace URIs an incident document speaks.
///
/// `common` owns the validity period start/end times; `incident` owns everything else.
/// Prefixes (`ns2`, `ns3`) are irrelevant: matching happens on the URI.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct IncidentNamespaces {
    #[serde(default = "default_common_namespace")]
    pub common: String,
    #[serde(default = "default_incident_namespace")]
    pub incident: String,
}

impl Default for IncidentNamespaces {
    fn default() -> Self {
        Self {
            common: default_common_namespace(),
            incident: default_incident_namespace(),
        }
    }
}

/// 🔧 Everything the parser needs to know, passed in explicitly.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ParserConfig {
    #[serde(default)]
    pub namespaces: IncidentNamespaces,
    /// 🐛 Reproduce the historical operator extraction: for every `Operators`
    /// container, re-read the *first* `OperatorRef`/`OperatorName` pair in the whole
    /// document. A two-operator incident therefore yields one entry (the first operator),
    /// and N containers yield N identical entries.
    ///
    /// `false` (the default) reads each `AffectedOperator` element's own pair.
    #[serde(default)]
    pub legacy_duplicate_mode: bool,
}

/// 🔄 Parse one incident document.
///
/// # Errors
/// 💀 Only when the text is not well-formed XML. Everything else degrades to `None`.
pub fn parse_incident(xml_text: &str, config: &ParserConfig) -> Result<RawIncident> {
    let document = Document::parse(xml_text).context(
        "💀 The incident message is not well-formed XML. \
         The feed sent us something shaped like a document, but the parser disagrees.",
    )?;
    let root = document.root_element();
    let incident_ns = config.namespaces.incident.as_str();
    let common_ns = config.namespaces.common.as_str();

    let incident_text = |name: &str| first_text(root, incident_ns, name);

    let operators_affected = if config.legacy_duplicate_mode {
        extract_operators_legacy(root, incident_ns)
    } else {
        extract_operators(root, incident_ns)
    };

    let raw = RawIncident {
        creation_time: incident_text("CreationTime"),
        incident_number: incident_text("IncidentNumber"),
        version: incident_text("Version"),
        planned: incident_text("Planned"),
        start_time: first_text(root, common_ns, "StartTime"),
        end_time: first_text(root, common_ns, "EndTime"),
        info_link: incident_text("Uri"),
        summary: incident_text("Summary"),
        incident_priority: incident_text("IncidentPriority"),
        operators_affected,
        routes_affected: incident_text("RoutesAffected"),
    };

    trace!(
        "📜 parsed incident {:?} v{:?} with {} operator entries",
        raw.incident_number,
        raw.version,
        raw.operators_affected.len()
    );
    Ok(raw)
}

/// 🔍 First element strictly below `node` with the given expanded name.
fn first_descendant<'a, 'input>(
    node: Node<'a, 'input>,
    namespace: &str,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .find(|candidate| candidate.is_element() && candidate.has_tag_name((namespace, name)))
}

/// 📝 Text of the first matching descendant. An element with no text counts as absent.
fn first_text(node: Node<'_, '_>, namespace: &str, name: &str) -> Option<String> {
    first_descendant(node, namespace, name)
        .and_then(|element| element.text())
        .map(str::to_string)
}

fn operator_from(node: Node<'_, '_>, namespace: &str) -> AffectedOperator {
    AffectedOperator {
        affected_operator_ref: first_text(node, namespace, "OperatorRef"),
        affected_operator_name: first_text(node, namespace, "OperatorName"),
    }
}

fn extract_operators(root: Node<'_, '_>, namespace: &str) -> Vec<AffectedOperator> {
    root.descendants()
        .filter(|node| node.is_element() && node.has_tag_name((namespace, "AffectedOperator")))
        .map(|affected| operator_from(affected, namespace))
        .collect()
}

fn extract_operators_legacy(root: Node<'_, '_>, namespace: &str) -> Vec<AffectedOperator> {
    let container_count = root
        .descendants()
        .skip(1)
        .filter(|node| node.is_element() && node.has_tag_name((namespace, "Operators")))
        .count();
    // -- same pair, once per container. yes, really.
    let first_pair = operator_from(root, namespace);
    vec![first_pair; container_count]
}
