use crate::export::{
    FlowDefinition, FormParameterDefinition, FulfillmentDefinition, PageDefinition,
    RouteDefinition, RouteGroupDefinition,
};
use crate::graph::{Graph, NodeKind};
use ahash::AHashSet;
use std::fmt;

/// Suffix of the synthetic node standing in for a flow's start page.
pub const START_PAGE: &str = "Start Page";

/// Page names that are built into every flow and never reported.
pub const SPECIAL_PAGES: [&str; 5] = [
    "End Session",
    "End Flow",
    "Start Page",
    "Current Page",
    "Previous Page",
];

/// `"<flow>: Start Page"`, the root of every flow traversal.
pub fn start_page_name(flow_display_name: &str) -> String {
    format!("{}: {}", flow_display_name, START_PAGE)
}

/// Per-flow working state. Created fresh for every flow directory.
#[derive(Debug, Clone, Default)]
pub struct Flow {
    pub display_name: String,
    pub resource_id: Option<String>,
    pub graph: Graph,
    /// Every declared page in the flow. The synthetic start page is not included.
    pub all_pages: AHashSet<String>,
    pub active_pages: AHashSet<String>,
    pub dangling_pages: AHashSet<String>,
    pub unreachable_pages: AHashSet<String>,
    pub unused_pages: AHashSet<String>,
}

impl Flow {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Self::default()
        }
    }

    pub fn start_page_name(&self) -> String {
        start_page_name(&self.display_name)
    }
}

/// A route owner: a page, a flow's start page, or a route group.
///
/// Borrows its slices from the export definition and only lives for the
/// duration of one flow's load.
#[derive(Debug, Clone)]
pub struct Page<'a> {
    pub display_name: String,
    pub kind: NodeKind,
    pub resource_id: Option<&'a str>,
    pub entry: Option<&'a FulfillmentDefinition>,
    pub routes: &'a [RouteDefinition],
    pub events: &'a [RouteDefinition],
    pub route_groups: &'a [String],
    pub parameters: &'a [FormParameterDefinition],
    pub has_webhook: bool,
    pub has_webhook_event_handler: bool,
}

impl<'a> Page<'a> {
    fn empty(display_name: String, kind: NodeKind) -> Self {
        Self {
            display_name,
            kind,
            resource_id: None,
            entry: None,
            routes: &[],
            events: &[],
            route_groups: &[],
            parameters: &[],
            has_webhook: false,
            has_webhook_event_handler: false,
        }
    }

    pub fn from_start_page(flow_display_name: &str, data: &'a FlowDefinition) -> Self {
        Self {
            resource_id: data.name.as_deref(),
            routes: &data.transition_routes,
            events: &data.event_handlers,
            route_groups: &data.transition_route_groups,
            ..Self::empty(start_page_name(flow_display_name), NodeKind::Page)
        }
    }

    pub fn from_page(display_name: impl Into<String>, data: &'a PageDefinition) -> Self {
        Self {
            resource_id: data.name.as_deref(),
            entry: data.entry_fulfillment.as_ref(),
            routes: &data.transition_routes,
            events: &data.event_handlers,
            route_groups: &data.transition_route_groups,
            parameters: data
                .form
                .as_ref()
                .map(|form| form.parameters.as_slice())
                .unwrap_or_default(),
            ..Self::empty(display_name.into(), NodeKind::Page)
        }
    }

    pub fn from_route_group(data: &'a RouteGroupDefinition) -> Self {
        Self {
            resource_id: data.name.as_deref(),
            routes: &data.transition_routes,
            ..Self::empty(
                data.display_name.clone().unwrap_or_default(),
                NodeKind::RouteGroup,
            )
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FulfillmentType {
    TransitionRoute,
    Event,
    RepromptHandler,
    Entry,
}

/// What causes a fulfillment to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Route { intent: bool, condition: bool },
    Event { event: Option<String> },
    RepromptHandler { parameter: Option<String>, event: Option<String> },
    Entry,
}

impl Trigger {
    /// True for `webhook.error` and its specializations such as `webhook.error.timeout`.
    pub fn is_webhook_error(&self) -> bool {
        let event = match self {
            Trigger::Event { event } | Trigger::RepromptHandler { event, .. } => event.as_deref(),
            _ => None,
        };
        event.is_some_and(|e| e == "webhook.error" || e.starts_with("webhook.error."))
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let or_none = |value: &Option<String>| value.clone().unwrap_or_else(|| "None".to_string());
        match self {
            Trigger::Route { intent, condition } => {
                let parts: Vec<&str> = [(*intent, "intent"), (*condition, "condition")]
                    .into_iter()
                    .filter_map(|(present, name)| present.then_some(name))
                    .collect();
                write!(f, "route : {}", parts.join("+"))
            }
            Trigger::Event { event } => write!(f, "event : {}", or_none(event)),
            Trigger::RepromptHandler { parameter, event } => {
                write!(f, "{} : event : {}", or_none(parameter), or_none(event))
            }
            Trigger::Entry => write!(f, "entry"),
        }
    }
}

/// Where a route sends the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Page(String),
    Flow(String),
}

impl Target {
    /// The graph node name of this target. Flow targets are tagged `"FLOW: <name>"`.
    pub fn node_name(&self) -> String {
        match self {
            Target::Page(page) => page.clone(),
            Target::Flow(flow) => format!("FLOW: {}", flow),
        }
    }

    pub fn node_kind(&self) -> NodeKind {
        match self {
            Target::Page(_) => NodeKind::Page,
            Target::Flow(_) => NodeKind::FlowTransition,
        }
    }
}

/// One transition route, event handler, reprompt handler or entry fulfillment, normalized.
#[derive(Debug, Clone)]
pub struct Fulfillment {
    /// Display name of the owning page or route group.
    pub page: String,
    pub fulfillment_type: FulfillmentType,
    pub trigger: Trigger,
    pub intent: Option<String>,
    pub target_page: Option<String>,
    pub target_flow: Option<String>,
    /// Form parameter display name, reprompt handlers only.
    pub parameter: Option<String>,
    /// Every literal text response seen while scanning messages, in order.
    pub texts: Vec<String>,
}

impl Fulfillment {
    fn from_route(
        page: &str,
        fulfillment_type: FulfillmentType,
        trigger: Trigger,
        data: &RouteDefinition,
    ) -> Self {
        Self {
            page: page.to_string(),
            fulfillment_type,
            trigger,
            intent: data.intent.clone(),
            target_page: data.target_page.clone(),
            target_flow: data.target_flow.clone(),
            parameter: None,
            texts: Vec::new(),
        }
    }

    pub fn transition_route(page: &str, data: &RouteDefinition) -> Self {
        let trigger = Trigger::Route {
            intent: data.intent.is_some(),
            condition: data.condition.is_some(),
        };
        Self::from_route(page, FulfillmentType::TransitionRoute, trigger, data)
    }

    pub fn event(page: &str, data: &RouteDefinition) -> Self {
        let trigger = Trigger::Event {
            event: data.event.clone(),
        };
        Self::from_route(page, FulfillmentType::Event, trigger, data)
    }

    pub fn reprompt_handler(page: &str, parameter: Option<&str>, data: &RouteDefinition) -> Self {
        let trigger = Trigger::RepromptHandler {
            parameter: parameter.map(str::to_string),
            event: data.event.clone(),
        };
        Self {
            parameter: parameter.map(str::to_string),
            ..Self::from_route(page, FulfillmentType::RepromptHandler, trigger, data)
        }
    }

    pub fn entry(page: &str) -> Self {
        Self {
            page: page.to_string(),
            fulfillment_type: FulfillmentType::Entry,
            trigger: Trigger::Entry,
            intent: None,
            target_page: None,
            target_flow: None,
            parameter: None,
            texts: Vec::new(),
        }
    }

    /// Every target present on the route. Both are returned when both are set.
    pub fn targets(&self) -> Vec<Target> {
        let page = self.target_page.clone().map(Target::Page);
        let flow = self.target_flow.clone().map(Target::Flow);
        page.into_iter().chain(flow).collect()
    }

    /// The last literal text response, for callers that only want one.
    pub fn text(&self) -> Option<&str> {
        self.texts.last().map(String::as_str)
    }
}
