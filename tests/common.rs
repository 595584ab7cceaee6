//! Common test utilities for building agent exports.
use shindan::export::{FulfillmentDefinition, IntentDefinition, MessageDefinition, TextDefinition};
use shindan::prelude::*;

pub const AGENT_ID: &str = "projects/test/locations/global/agents/agent-1";

/// A route on an intent, optionally targeting a page.
#[allow(dead_code)]
pub fn intent_route(intent: &str, target_page: Option<&str>) -> RouteDefinition {
    RouteDefinition {
        intent: Some(intent.to_string()),
        target_page: target_page.map(str::to_string),
        ..Default::default()
    }
}

/// A route on a condition, optionally targeting a page.
#[allow(dead_code)]
pub fn condition_route(condition: &str, target_page: Option<&str>) -> RouteDefinition {
    RouteDefinition {
        condition: Some(condition.to_string()),
        target_page: target_page.map(str::to_string),
        ..Default::default()
    }
}

/// A route into another flow.
#[allow(dead_code)]
pub fn flow_route(intent: &str, target_flow: &str) -> RouteDefinition {
    RouteDefinition {
        intent: Some(intent.to_string()),
        target_flow: Some(target_flow.to_string()),
        ..Default::default()
    }
}

/// An event handler without a target.
#[allow(dead_code)]
pub fn event_handler(event: &str) -> RouteDefinition {
    RouteDefinition {
        event: Some(event.to_string()),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn text_fulfillment(text: &str) -> FulfillmentDefinition {
    FulfillmentDefinition {
        messages: vec![MessageDefinition {
            text: Some(TextDefinition {
                text: vec![text.to_string()],
            }),
            ..Default::default()
        }],
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn webhook_fulfillment() -> FulfillmentDefinition {
    FulfillmentDefinition {
        webhook: Some(serde_json::json!("projects/test/webhooks/billing")),
        tag: Some("lookup".to_string()),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn start_page(resource_id: &str, routes: Vec<RouteDefinition>) -> FlowDefinition {
    FlowDefinition {
        name: Some(resource_id.to_string()),
        transition_routes: routes,
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn page(resource_id: &str, routes: Vec<RouteDefinition>) -> PageDefinition {
    PageDefinition {
        name: Some(resource_id.to_string()),
        transition_routes: routes,
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn intent(dir_name: &str, resource_id: &str) -> IntentExport {
    IntentExport {
        dir_name: dir_name.to_string(),
        definition: Some(IntentDefinition {
            name: Some(resource_id.to_string()),
            display_name: Some(dir_name.to_string()),
            ..Default::default()
        }),
    }
}

/// Flow "Support": the start page routes on intent `I1` to "Billing", "Billing"
/// routes back to the start page on `true`, and "Orphan" is declared but never
/// referenced and has no routes of its own.
#[allow(dead_code)]
pub fn create_support_flow() -> FlowExport {
    FlowExport::new(
        "Support",
        start_page("flow-support", vec![intent_route("I1", Some("Billing"))]),
    )
    .with_page(
        "Billing",
        page(
            "page-billing",
            vec![condition_route("true", Some("Support: Start Page"))],
        ),
    )
    .with_page("Orphan", page("page-orphan", vec![]))
}

#[allow(dead_code)]
pub fn create_support_export() -> AgentExport {
    AgentExport {
        flows: vec![create_support_flow()],
        intents: vec![intent("I1", "intent-1"), intent("I2", "intent-2")],
        webhooks: vec![],
    }
}

/// Analyzes `export` with the default configuration.
#[allow(dead_code)]
pub fn analyze(export: AgentExport) -> AnalysisReport {
    Analyzer::builder(export)
        .agent_id(AGENT_ID)
        .build()
        .analyze()
        .expect("Analysis should succeed")
}

/// Sorted contents of one of the report's per-flow page sets.
#[allow(dead_code)]
pub fn sorted(
    sets: &ahash::AHashMap<String, ahash::AHashSet<String>>,
    flow: &str,
) -> Vec<String> {
    let mut pages: Vec<String> = sets
        .get(flow)
        .map(|set| set.iter().cloned().collect())
        .unwrap_or_default();
    pages.sort();
    pages
}

#[allow(dead_code)]
pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
