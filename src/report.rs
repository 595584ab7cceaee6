use crate::analyzer::SPECIAL_PAGES;
use crate::error::ReportError;
use crate::export::{FlowDefinition, PageDefinition, RouteGroupDefinition};
use crate::graph::Graph;
use ahash::{AHashMap, AHashSet};
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};

/// Fully-qualified IDs for a flow and the pages inside it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlowPages {
    pub id: String,
    pub pages: AHashMap<String, String>,
}

/// Fully-qualified IDs for a flow and its transition route groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlowRouteGroups {
    pub id: String,
    pub route_groups: AHashMap<String, String>,
}

/// Webhook usage of a single page, kept after the page itself is discarded.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookStatus {
    pub has_webhook: bool,
    pub has_webhook_event_handler: bool,
}

/// A parameter preset found in a route's fulfillment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParameterPreset {
    pub parameter: String,
    /// The preset value rendered as JSON text, `None` when the action carries no value.
    pub value: Option<String>,
}

/// Everything learned about an agent in one analysis pass.
///
/// All per-flow maps are keyed by flow display name. The raw definition logs
/// (`flows`, `pages`, `route_groups`) are kept in memory for downstream tooling
/// but are not part of the persisted form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub agent_id: String,
    /// Page names the analysis treated as special and left out of every page set.
    pub special_pages: Vec<String>,
    /// The agent-wide graph, accumulated across every flow.
    pub graph: Graph,

    #[serde(skip)]
    pub flows: Vec<FlowDefinition>,
    #[serde(skip)]
    pub pages: AHashMap<String, Vec<PageDefinition>>,
    #[serde(skip)]
    pub route_groups: AHashMap<String, Vec<RouteGroupDefinition>>,

    pub flows_map: AHashMap<String, String>,
    pub flow_page_map: AHashMap<String, FlowPages>,
    pub route_groups_map: AHashMap<String, FlowRouteGroups>,
    pub intents_map: AHashMap<String, String>,
    pub webhooks_map: AHashMap<String, String>,

    /// `(intent, page)` pairs, one per route or handler referencing an intent.
    pub active_intents: AHashMap<String, Vec<(String, String)>>,
    pub active_pages: AHashMap<String, AHashSet<String>>,
    pub dangling_pages: AHashMap<String, AHashSet<String>>,
    pub unreachable_pages: AHashMap<String, AHashSet<String>>,
    pub unused_pages: AHashMap<String, AHashSet<String>>,

    pub webhook_pages: AHashMap<String, AHashMap<String, WebhookStatus>>,
    pub route_parameters: AHashMap<String, AHashMap<String, Vec<ParameterPreset>>>,

    pub total_flows: usize,
    pub total_pages: usize,
    pub total_route_groups: usize,
    pub total_intents: usize,
    pub total_webhooks: usize,
}

impl AnalysisReport {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            special_pages: SPECIAL_PAGES.iter().map(|p| p.to_string()).collect(),
            ..Self::default()
        }
    }

    /// `"<agent_id>/flows/<resource_id>"`.
    pub fn flow_id(&self, resource_id: &str) -> String {
        format!("{}/flows/{}", self.agent_id, resource_id)
    }

    /// Flow display names in sorted order.
    pub fn flow_names(&self) -> Vec<&str> {
        self.flows_map.keys().map(String::as_str).sorted().collect()
    }

    /// `(flow, page)` for every page that calls a webhook but never handles `webhook.error`.
    pub fn pages_missing_webhook_error_handler(&self) -> Vec<(String, String)> {
        self.webhook_pages
            .iter()
            .flat_map(|(flow, pages)| {
                pages
                    .iter()
                    .filter(|(_, status)| status.has_webhook && !status.has_webhook_event_handler)
                    .map(move |(page, _)| (flow.clone(), page.clone()))
            })
            .sorted()
            .collect()
    }

    /// Serializes the report with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ReportError> {
        encode_to_vec(self, standard())
            .map_err(|e| ReportError::Serialization(format!("Serialization failed: {}", e)))
    }

    /// Saves the report to a file using the bincode format.
    pub fn save(&self, path: &str) -> Result<(), ReportError> {
        let bytes = self.to_bytes()?;
        let mut file = fs::File::create(path).map_err(|e| ReportError::Io {
            path: path.to_string(),
            message: format!("Could not create file: {}", e),
        })?;
        file.write_all(&bytes).map_err(|e| ReportError::Io {
            path: path.to_string(),
            message: format!("Could not write to file: {}", e),
        })?;
        Ok(())
    }

    /// Loads a report previously written with [`AnalysisReport::save`].
    pub fn from_file(path: &str) -> Result<Self, ReportError> {
        let mut file = fs::File::open(path).map_err(|e| ReportError::Io {
            path: path.to_string(),
            message: format!("Could not open file: {}", e),
        })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(|e| ReportError::Io {
            path: path.to_string(),
            message: format!("Could not read from file: {}", e),
        })?;
        Self::from_bytes(&bytes)
    }

    /// Deserializes a report from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReportError> {
        decode_from_slice(bytes, standard())
            .map(|(report, _)| report) // bincode 2 returns (data, bytes_read)
            .map_err(|e| ReportError::Serialization(format!("Deserialization failed: {}", e)))
    }
}
