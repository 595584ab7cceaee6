use super::types::{Flow, Fulfillment, Page, Trigger};
use crate::export::{FormParameterDefinition, FulfillmentDefinition, MessageDefinition};
use crate::graph::NodeKind;
use crate::report::{AnalysisReport, ParameterPreset, WebhookStatus};
use tracing::{debug, warn};

/// Turns one page's routes, handlers and entry fulfillment into graph edges
/// and intent usage records.
///
/// Every edge is written twice: once into the flow-local graph and once into
/// the agent-wide graph held by the report.
pub struct RouteProcessor<'r> {
    flow: &'r mut Flow,
    report: &'r mut AnalysisReport,
}

impl<'r> RouteProcessor<'r> {
    pub fn new(flow: &'r mut Flow, report: &'r mut AnalysisReport) -> Self {
        Self { flow, report }
    }

    /// Declares `name` as a node in both graphs.
    pub fn declare_node(&mut self, name: &str) {
        self.flow.graph.add_node(name);
        self.report.graph.add_node(name);
    }

    pub fn process_routes(&mut self, page: &mut Page<'_>) -> Vec<Fulfillment> {
        let routes = page.routes;
        let mut processed = Vec::with_capacity(routes.len());

        for data in routes {
            let mut route = Fulfillment::transition_route(&page.display_name, data);
            if route.trigger == (Trigger::Route { intent: false, condition: false }) {
                warn!(
                    flow = %self.flow.display_name,
                    page = %page.display_name,
                    "Transition route has neither an intent nor a condition"
                );
            }
            self.set_route_targets(&route);
            self.process_intents_in_routes(&route);

            if let Some(path) = data.fulfillment() {
                check_for_webhook(page, path);
                self.process_fulfillment_type(&mut route, &path.messages);
                // Parameter presets
                self.process_fulfillment_type(&mut route, &path.set_parameter_actions);
            }
            processed.push(route);
        }
        processed
    }

    pub fn process_events(&mut self, page: &mut Page<'_>) -> Vec<Fulfillment> {
        let events = page.events;
        let mut processed = Vec::with_capacity(events.len());

        for data in events {
            let mut route = Fulfillment::event(&page.display_name, data);
            self.set_route_targets(&route);
            self.process_intents_in_routes(&route);

            let path = data.fulfillment();
            if path.is_some() || data.event.is_some() {
                check_for_webhook_event_handlers(page, &route);
                if let Some(path) = path {
                    self.process_fulfillment_type(&mut route, &path.messages);
                }
            }
            processed.push(route);
        }
        processed
    }

    /// Reprompt handlers act on a form parameter rather than on the page itself,
    /// but their edges and webhook flags still belong to the owning page.
    pub fn process_reprompt_handlers(
        &mut self,
        page: &mut Page<'_>,
        parameter: &FormParameterDefinition,
    ) -> Vec<Fulfillment> {
        let handlers = parameter.reprompt_handlers();
        let mut processed = Vec::with_capacity(handlers.len());

        for data in handlers {
            let mut route = Fulfillment::reprompt_handler(
                &page.display_name,
                parameter.display_name.as_deref(),
                data,
            );
            self.set_route_targets(&route);
            self.process_intents_in_routes(&route);

            if let Some(path) = data.fulfillment() {
                check_for_webhook(page, path);
                self.process_fulfillment_type(&mut route, &path.messages);
            }
            processed.push(route);
        }
        processed
    }

    /// Entry fulfillments execute in place and never target another page.
    pub fn process_entry(&mut self, page: &mut Page<'_>) -> Option<Fulfillment> {
        let entry = page.entry.filter(|entry| !entry.is_empty())?;
        let mut route = Fulfillment::entry(&page.display_name);

        check_for_webhook(page, entry);
        self.process_fulfillment_type(&mut route, &entry.messages);
        Some(route)
    }

    pub fn set_route_targets(&mut self, route: &Fulfillment) {
        for target in route.targets() {
            self.link(&route.page, &target.node_name(), target.node_kind());
        }
    }

    /// Route groups live in the same namespace as pages and flow transitions.
    pub fn set_route_group_targets(&mut self, page: &Page<'_>) {
        for route_group in page.route_groups {
            self.link(&page.display_name, route_group, NodeKind::RouteGroup);
        }
    }

    /// Keeps the page's webhook flags once the page itself is dropped.
    pub fn record_webhook_status(&mut self, page: &Page<'_>) {
        if !page.has_webhook {
            return;
        }
        self.report
            .webhook_pages
            .entry(self.flow.display_name.clone())
            .or_default()
            .insert(
                page.display_name.clone(),
                WebhookStatus {
                    has_webhook: page.has_webhook,
                    has_webhook_event_handler: page.has_webhook_event_handler,
                },
            );
    }

    fn link(&mut self, source: &str, target: &str, kind: NodeKind) {
        for graph in [&mut self.flow.graph, &mut self.report.graph] {
            graph.add_edge(source, target);
            graph.add_used_node(target);
            if kind != NodeKind::Page {
                graph.tag_node(target, kind);
            }
        }
        debug!(flow = %self.flow.display_name, source, target, ?kind, "Recorded edge");
    }

    fn process_intents_in_routes(&mut self, route: &Fulfillment) {
        if let Some(intent) = route.intent.as_ref().filter(|intent| !intent.is_empty()) {
            self.report
                .active_intents
                .entry(self.flow.display_name.clone())
                .or_default()
                .push((intent.clone(), route.page.clone()));
        }
    }

    fn process_fulfillment_type(&mut self, route: &mut Fulfillment, items: &[MessageDefinition]) {
        for item in items {
            if let Some(text) = &item.text {
                route.texts.extend(text.text.iter().cloned());
            }
            if item.parameter.is_some() {
                self.update_route_parameters(route, item);
            }
        }
    }

    fn update_route_parameters(&mut self, route: &Fulfillment, item: &MessageDefinition) {
        let preset = ParameterPreset {
            parameter: item.parameter.clone().unwrap_or_default(),
            value: item.value.as_ref().map(|value| value.to_string()),
        };
        self.report
            .route_parameters
            .entry(self.flow.display_name.clone())
            .or_default()
            .entry(route.page.clone())
            .or_default()
            .push(preset);
    }
}

/// Flags the page when the fulfillment carries a `webhook` key, whatever its value.
pub fn check_for_webhook(page: &mut Page<'_>, path: &FulfillmentDefinition) {
    if path.has_webhook() {
        page.has_webhook = true;
    }
}

/// Flags a webhook error handler, but only on a page already known to call a webhook.
pub fn check_for_webhook_event_handlers(page: &mut Page<'_>, route: &Fulfillment) {
    if page.has_webhook && !page.has_webhook_event_handler && route.trigger.is_webhook_error() {
        page.has_webhook_event_handler = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{PageDefinition, RouteDefinition, TextDefinition};

    fn text(message: &str) -> MessageDefinition {
        MessageDefinition {
            text: Some(TextDefinition {
                text: vec![message.to_string()],
            }),
            ..Default::default()
        }
    }

    #[test]
    fn texts_accumulate_instead_of_overwriting() {
        let data = PageDefinition {
            transition_routes: vec![RouteDefinition {
                condition: Some("true".to_string()),
                trigger_fulfillment: Some(FulfillmentDefinition {
                    messages: vec![text("first"), text("second")],
                    ..Default::default()
                }),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut flow = Flow::new("Support");
        let mut report = AnalysisReport::default();
        let mut page = Page::from_page("Billing", &data);

        let routes = RouteProcessor::new(&mut flow, &mut report).process_routes(&mut page);
        assert_eq!(routes[0].texts, vec!["first".to_string(), "second".to_string()]);
        assert_eq!(routes[0].text(), Some("second"));
    }

    #[test]
    fn parameter_presets_are_recorded_per_page() {
        let data = PageDefinition {
            transition_routes: vec![RouteDefinition {
                intent: Some("I1".to_string()),
                trigger_fulfillment: Some(FulfillmentDefinition {
                    set_parameter_actions: vec![MessageDefinition {
                        parameter: Some("tier".to_string()),
                        value: Some(serde_json::json!("gold")),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut flow = Flow::new("Support");
        let mut report = AnalysisReport::default();
        let mut page = Page::from_page("Billing", &data);

        RouteProcessor::new(&mut flow, &mut report).process_routes(&mut page);
        let presets = &report.route_parameters["Support"]["Billing"];
        assert_eq!(presets.len(), 1);
        assert_eq!(presets[0].parameter, "tier");
        assert_eq!(presets[0].value.as_deref(), Some("\"gold\""));
    }

    #[test]
    fn empty_intent_is_not_recorded() {
        let data = PageDefinition {
            transition_routes: vec![
                RouteDefinition {
                    intent: Some(String::new()),
                    target_page: Some("Help".to_string()),
                    ..Default::default()
                },
                RouteDefinition {
                    intent: Some("I1".to_string()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let mut flow = Flow::new("Support");
        let mut report = AnalysisReport::default();
        let mut page = Page::from_page("Billing", &data);

        RouteProcessor::new(&mut flow, &mut report).process_routes(&mut page);
        assert_eq!(
            report.active_intents["Support"],
            vec![("I1".to_string(), "Billing".to_string())]
        );
        assert!(
            flow.graph
                .children("Billing")
                .is_some_and(|children| children.contains("Help"))
        );
    }
}
