use crate::report::AnalysisReport;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;

/// Formats analysis reports into human-readable summaries.
pub struct ReportFormatter;

impl ReportFormatter {
    /// One block per flow, flows and pages in sorted order.
    pub fn format_report(report: &AnalysisReport) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Agent '{}': {} flow(s), {} page(s), {} route group(s), {} intent(s), {} webhook(s)\n",
            report.agent_id,
            report.total_flows,
            report.total_pages,
            report.total_route_groups,
            report.total_intents,
            report.total_webhooks
        ));

        for flow in report.flow_names() {
            out.push_str(&format!("\nFlow: {}\n", flow));
            Self::format_section(&mut out, "Active", &report.active_pages, flow);
            Self::format_section(&mut out, "Dangling", &report.dangling_pages, flow);
            Self::format_section(&mut out, "Unreachable", &report.unreachable_pages, flow);
            Self::format_section(&mut out, "Unused", &report.unused_pages, flow);

            let intents = report
                .active_intents
                .get(flow)
                .into_iter()
                .flatten()
                .map(|(intent, _)| intent)
                .unique()
                .count();
            out.push_str(&format!("  Intents referenced: {}\n", intents));
        }

        if !report.webhooks_map.is_empty() {
            out.push_str(&format!(
                "\nWebhooks ({}): {}\n",
                report.webhooks_map.len(),
                report.webhooks_map.keys().sorted().join(", ")
            ));
        }

        let missing = report.pages_missing_webhook_error_handler();
        if !missing.is_empty() {
            out.push_str("\nPages calling a webhook without a webhook.error handler:\n");
            for (flow, page) in missing {
                out.push_str(&format!("  - {} / {}\n", flow, page));
            }
        }
        out
    }

    fn format_section(
        out: &mut String,
        label: &str,
        sets: &AHashMap<String, AHashSet<String>>,
        flow: &str,
    ) {
        let pages = sets.get(flow).into_iter().flatten().sorted().collect_vec();
        if pages.is_empty() {
            out.push_str(&format!("  {} pages: none\n", label));
        } else {
            out.push_str(&format!(
                "  {} pages ({}): {}\n",
                label,
                pages.len(),
                pages.iter().join(", ")
            ));
        }
    }
}
