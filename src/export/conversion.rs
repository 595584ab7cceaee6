use super::definition::{
    FlowDefinition, IntentDefinition, PageDefinition, RouteGroupDefinition, WebhookDefinition,
};
use crate::error::ConversionError;

/// The complete, canonical content of an agent export, ready for analysis.
/// This is the target structure for any custom storage format.
#[derive(Debug, Clone, Default)]
pub struct AgentExport {
    pub flows: Vec<FlowExport>,
    pub intents: Vec<IntentExport>,
    pub webhooks: Vec<WebhookExport>,
}

/// One flow directory: the flow object plus its pages and route groups.
#[derive(Debug, Clone, Default)]
pub struct FlowExport {
    /// The raw directory name. The flow's display name is derived from it.
    pub dir_name: String,
    pub start_page: FlowDefinition,
    pub pages: Vec<PageExport>,
    pub route_groups: Vec<RouteGroupDefinition>,
}

/// One page file. The page's display name is derived from the file stem.
#[derive(Debug, Clone, Default)]
pub struct PageExport {
    pub file_stem: String,
    pub definition: PageDefinition,
}

/// One intent directory. Metadata is optional, as exports can omit it.
#[derive(Debug, Clone, Default)]
pub struct IntentExport {
    pub dir_name: String,
    pub definition: Option<IntentDefinition>,
}

/// One webhook file. The file stem names the webhook when it has no display name.
#[derive(Debug, Clone, Default)]
pub struct WebhookExport {
    pub file_stem: String,
    pub definition: WebhookDefinition,
}

impl AgentExport {
    /// An export holding only flows.
    pub fn from_flows(flows: Vec<FlowExport>) -> Self {
        Self {
            flows,
            ..Self::default()
        }
    }
}

impl FlowExport {
    pub fn new(dir_name: impl Into<String>, start_page: FlowDefinition) -> Self {
        Self {
            dir_name: dir_name.into(),
            start_page,
            pages: Vec::new(),
            route_groups: Vec::new(),
        }
    }

    pub fn with_page(mut self, file_stem: impl Into<String>, definition: PageDefinition) -> Self {
        self.pages.push(PageExport {
            file_stem: file_stem.into(),
            definition,
        });
        self
    }

    pub fn with_route_group(mut self, definition: RouteGroupDefinition) -> Self {
        self.route_groups.push(definition);
        self
    }
}

/// A trait for custom storage formats that can be converted into a shindan `AgentExport`.
///
/// This is the extension point that keeps the analyzer independent of where an
/// export lives. [`ExportDirectory`](super::ExportDirectory) implements it for the
/// standard unzipped layout; callers holding exports in a database, an archive or
/// memory implement it for their own types.
///
/// # Example
///
/// ```rust,no_run
/// use shindan::export::{AgentExport, FlowDefinition, FlowExport, IntoAgentExport};
/// use shindan::error::ConversionError;
///
/// struct StoredFlow { name: String, json: String }
/// struct StoredAgent { flows: Vec<StoredFlow> }
///
/// impl IntoAgentExport for StoredAgent {
///     fn into_export(self) -> Result<AgentExport, ConversionError> {
///         let mut flows = Vec::new();
///         for stored in self.flows {
///             let start_page: FlowDefinition = serde_json::from_str(&stored.json)
///                 .map_err(|e| ConversionError::ValidationError(e.to_string()))?;
///             flows.push(FlowExport::new(stored.name, start_page));
///         }
///         Ok(AgentExport::from_flows(flows))
///     }
/// }
/// ```
pub trait IntoAgentExport {
    /// Consumes the object and converts it into the canonical export model.
    fn into_export(self) -> Result<AgentExport, ConversionError>;
}

impl IntoAgentExport for AgentExport {
    fn into_export(self) -> Result<AgentExport, ConversionError> {
        Ok(self)
    }
}
