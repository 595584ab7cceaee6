use super::flow::FlowAnalyzer;
use super::fulfillment::RouteProcessor;
use super::types::{Flow, Page};
use crate::error::AnalysisError;
use crate::export::{
    FlowDefinition, FlowExport, IntentExport, PageExport, RouteGroupDefinition, WebhookExport,
    clean_display_name,
};
use crate::report::{AnalysisReport, FlowPages, FlowRouteGroups};
use tracing::{debug, info};

/// Processes the flow object as the flow's synthetic start page.
pub fn process_start_page(flow: &mut Flow, data: &FlowDefinition, report: &mut AnalysisReport) {
    let mut page = Page::from_start_page(&flow.display_name, data);
    report.flows.push(data.clone());
    flow.resource_id = data.name.clone();

    {
        let mut routes = RouteProcessor::new(flow, report);
        routes.declare_node(&page.display_name);

        // Routes first, so a webhook error handler sees a webhook set by a route.
        routes.process_routes(&mut page);
        routes.process_events(&mut page);

        if !page.route_groups.is_empty() {
            routes.set_route_group_targets(&page);
        }
        routes.record_webhook_status(&page);
    }

    let full_flow_id = report.flow_id(flow.resource_id.as_deref().unwrap_or_default());
    report
        .flows_map
        .insert(flow.display_name.clone(), full_flow_id.clone());
    report.flow_page_map.insert(
        flow.display_name.clone(),
        FlowPages {
            id: full_flow_id,
            ..FlowPages::default()
        },
    );
}

/// Processes one page file. The page's display name comes from its file stem.
pub fn process_page(flow: &mut Flow, export: &PageExport, report: &mut AnalysisReport) {
    let data = &export.definition;
    let display_name = clean_display_name(&export.file_stem);
    flow.all_pages.insert(display_name.clone());

    let mut page = Page::from_page(display_name, data);
    let parameters = page.parameters;

    {
        let mut routes = RouteProcessor::new(flow, report);
        routes.declare_node(&page.display_name);

        routes.process_entry(&mut page);
        routes.process_routes(&mut page);
        routes.process_events(&mut page);
        for parameter in parameters {
            routes.process_reprompt_handlers(&mut page, parameter);
        }

        if !page.route_groups.is_empty() {
            routes.set_route_group_targets(&page);
        }
        routes.record_webhook_status(&page);
    }

    let full_flow_id = report.flow_id(flow.resource_id.as_deref().unwrap_or_default());
    let full_page_id = format!(
        "{}/pages/{}",
        full_flow_id,
        page.resource_id.unwrap_or_default()
    );
    report
        .pages
        .entry(flow.display_name.clone())
        .or_default()
        .push(data.clone());
    report
        .flow_page_map
        .entry(flow.display_name.clone())
        .or_default()
        .pages
        .insert(page.display_name.clone(), full_page_id);
    report.total_pages += 1;

    debug!(flow = %flow.display_name, page = %page.display_name, "Processed page");
}

pub fn process_pages(flow: &mut Flow, pages: &[PageExport], report: &mut AnalysisReport) {
    for page in pages {
        process_page(flow, page, report);
    }
}

/// A route group owns its routes the way a page does, so its edges start at the group's node.
pub fn process_route_group(
    flow: &mut Flow,
    data: &RouteGroupDefinition,
    report: &mut AnalysisReport,
) {
    let mut group = Page::from_route_group(data);
    RouteProcessor::new(flow, report).process_routes(&mut group);

    let full_flow_id = report.flow_id(flow.resource_id.as_deref().unwrap_or_default());
    let full_group_id = format!(
        "{}/transitionRouteGroups/{}",
        full_flow_id,
        group.resource_id.unwrap_or_default()
    );
    report
        .route_groups_map
        .entry(flow.display_name.clone())
        .or_insert_with(|| FlowRouteGroups {
            id: full_flow_id,
            ..FlowRouteGroups::default()
        })
        .route_groups
        .insert(group.display_name.clone(), full_group_id);
    report
        .route_groups
        .entry(flow.display_name.clone())
        .or_default()
        .push(data.clone());
}

pub fn process_route_groups(
    flow: &mut Flow,
    groups: &[RouteGroupDefinition],
    report: &mut AnalysisReport,
) {
    if groups.is_empty() {
        return;
    }
    report.total_route_groups += groups.len();
    for group in groups {
        process_route_group(flow, group, report);
    }
}

/// Loads one flow directory into a fresh flow graph, then runs the analysis passes
/// and copies their results into the report.
pub fn process_flow(
    export: &FlowExport,
    report: &mut AnalysisReport,
    analyzer: &FlowAnalyzer,
) -> Result<Flow, AnalysisError> {
    let mut flow = Flow::new(clean_display_name(&export.dir_name));
    report.pages.insert(flow.display_name.clone(), Vec::new());
    report
        .active_intents
        .insert(flow.display_name.clone(), Vec::new());

    process_start_page(&mut flow, &export.start_page, report);
    process_pages(&mut flow, &export.pages, report);
    process_route_groups(&mut flow, &export.route_groups, report);

    analyzer.analyze(&mut flow)?;

    let name = flow.display_name.clone();
    report
        .active_pages
        .insert(name.clone(), flow.active_pages.clone());
    report
        .dangling_pages
        .insert(name.clone(), flow.dangling_pages.clone());
    report
        .unused_pages
        .insert(name.clone(), flow.unused_pages.clone());
    report
        .unreachable_pages
        .insert(name.clone(), flow.unreachable_pages.clone());

    info!(
        flow = %name,
        pages = flow.all_pages.len(),
        active = flow.active_pages.len(),
        dangling = flow.dangling_pages.len(),
        unused = flow.unused_pages.len(),
        unreachable = flow.unreachable_pages.len(),
        "Processed flow"
    );
    Ok(flow)
}

/// Processes every flow in export order.
pub fn process_flows(
    flows: &[FlowExport],
    report: &mut AnalysisReport,
    analyzer: &FlowAnalyzer,
) -> Result<(), AnalysisError> {
    report.total_flows = flows.len();
    for export in flows {
        process_flow(export, report, analyzer)?;
    }
    Ok(())
}

/// Registers every declared intent under `"<agent_id>/intents/<resource_id>"`.
pub fn process_intents(intents: &[IntentExport], report: &mut AnalysisReport) {
    for intent in intents {
        let display_name = clean_display_name(&intent.dir_name);
        let resource_id = intent
            .definition
            .as_ref()
            .and_then(|definition| definition.name.as_deref())
            .unwrap_or_default();
        let full_intent_id = format!("{}/intents/{}", report.agent_id, resource_id);
        report.intents_map.insert(display_name, full_intent_id);
        report.total_intents += 1;
    }
}

/// Registers every webhook under `"<agent_id>/webhooks/<resource_id>"`.
///
/// The webhook's display name wins over its file stem.
pub fn process_webhooks(webhooks: &[WebhookExport], report: &mut AnalysisReport) {
    for webhook in webhooks {
        let definition = &webhook.definition;
        let display_name = definition
            .display_name
            .clone()
            .unwrap_or_else(|| clean_display_name(&webhook.file_stem));
        let full_webhook_id = format!(
            "{}/webhooks/{}",
            report.agent_id,
            definition.name.as_deref().unwrap_or_default()
        );
        debug!(
            webhook = %display_name,
            service = definition.service_type(),
            "Registered webhook"
        );
        report.webhooks_map.insert(display_name, full_webhook_id);
        report.total_webhooks += 1;
    }
}
