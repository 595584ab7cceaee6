use crate::error::{AnalysisError, ConversionError};
use crate::export::{AgentExport, IntoAgentExport};
use crate::report::AnalysisReport;
use tracing::info;

pub mod flow;
pub mod fulfillment;
pub mod loader;
pub mod types;

pub use flow::{FlowAnalyzer, remove_flow_pages_from_set};
pub use fulfillment::RouteProcessor;
pub use types::{
    Flow, Fulfillment, FulfillmentType, Page, SPECIAL_PAGES, START_PAGE, Target, Trigger,
    start_page_name,
};

/// Builds the page graph of an agent export and computes its structural health.
///
/// An `Analyzer` runs a single pass over an export. Each flow gets its own graph
/// and result sets; every flow also writes into one agent-wide graph kept in the
/// resulting [`AnalysisReport`].
pub struct Analyzer {
    export: AgentExport,
    agent_id: String,
    flow_analyzer: FlowAnalyzer,
}

pub struct AnalyzerBuilder {
    export: AgentExport,
    agent_id: String,
    special_pages: Option<Vec<String>>,
    strict: bool,
}

impl AnalyzerBuilder {
    pub fn new(export: AgentExport) -> Self {
        Self {
            export,
            agent_id: String::new(),
            special_pages: None,
            strict: true,
        }
    }

    /// Prefix used for every fully-qualified flow, page and intent ID.
    pub fn agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = agent_id.into();
        self
    }

    /// Replaces the built-in special page names.
    pub fn special_pages<I, S>(mut self, pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.special_pages = Some(pages.into_iter().map(Into::into).collect());
        self
    }

    /// When disabled, a flow whose start page routes nowhere is reported with a
    /// warning instead of failing the whole run.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn build(self) -> Analyzer {
        let flow_analyzer = match self.special_pages {
            Some(pages) => FlowAnalyzer::new(pages, self.strict),
            None => FlowAnalyzer::new(
                SPECIAL_PAGES.iter().map(|p| p.to_string()).collect(),
                self.strict,
            ),
        };
        Analyzer {
            export: self.export,
            agent_id: self.agent_id,
            flow_analyzer,
        }
    }
}

impl Analyzer {
    pub fn builder(export: AgentExport) -> AnalyzerBuilder {
        AnalyzerBuilder::new(export)
    }

    /// Converts any supported source, such as an [`ExportDirectory`](crate::export::ExportDirectory),
    /// and returns a builder for it.
    pub fn from_source<S: IntoAgentExport>(source: S) -> Result<AnalyzerBuilder, ConversionError> {
        Ok(AnalyzerBuilder::new(source.into_export()?))
    }

    pub fn flow_analyzer(&self) -> &FlowAnalyzer {
        &self.flow_analyzer
    }

    /// Processes every flow, intent and webhook and returns the finished report.
    pub fn analyze(self) -> Result<AnalysisReport, AnalysisError> {
        let mut report = AnalysisReport::new(self.agent_id);
        report.special_pages = self.flow_analyzer.special_pages().to_vec();

        info!(flows = self.export.flows.len(), "Processing agent");
        loader::process_flows(&self.export.flows, &mut report, &self.flow_analyzer)?;
        loader::process_intents(&self.export.intents, &mut report);
        loader::process_webhooks(&self.export.webhooks, &mut report);
        info!(
            flows = report.total_flows,
            pages = report.total_pages,
            intents = report.total_intents,
            webhooks = report.total_webhooks,
            "Processing complete"
        );

        Ok(report)
    }
}
