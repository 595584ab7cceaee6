//! Integration tests for shindan
//!
//! End-to-end tests that read an export from disk, analyze it and persist the report.
mod common;
use common::*;
use serde_json::json;
use shindan::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(path: &Path, value: serde_json::Value) {
    fs::create_dir_all(path.parent().expect("Path has a parent")).expect("Failed to create dir");
    fs::write(path, serde_json::to_string_pretty(&value).expect("Valid JSON"))
        .expect("Failed to write file");
}

/// Writes the "Support" scenario in the unzipped export layout.
fn write_support_export(root: &Path) {
    let flow = root.join("flows").join("Support");
    write(
        &flow.join("Support.json"),
        json!({
            "name": "flow-support",
            "displayName": "Support",
            "transitionRoutes": [{"intent": "I1", "targetPage": "Billing"}],
            "eventHandlers": [{"event": "sys.no-match-default", "triggerFulfillment": {}}]
        }),
    );
    write(
        &flow.join("pages").join("Billing.json"),
        json!({
            "name": "page-billing",
            "displayName": "Billing",
            "entryFulfillment": {
                "messages": [{"text": {"text": ["Let me check your invoice."]}}],
                "webhook": "projects/test/webhooks/billing"
            },
            "transitionRoutes": [{"condition": "true", "targetPage": "Support: Start Page"}],
            "eventHandlers": [{"event": "webhook.error", "targetPage": "End Session"}]
        }),
    );
    write(
        &flow.join("pages").join("Orphan.json"),
        json!({"name": "page-orphan", "displayName": "Orphan"}),
    );
    write(
        &root.join("intents").join("I1").join("I1.json"),
        json!({"name": "intent-1", "displayName": "I1", "labels": {"topic": "billing"}}),
    );
    // An intent without metadata still counts as declared.
    fs::create_dir_all(root.join("intents").join("I2")).expect("Failed to create dir");
    write(
        &root.join("webhooks").join("billing.json"),
        json!({
            "name": "webhook-1",
            "displayName": "billing-lookup",
            "genericWebService": {"uri": "https://example.com/billing"},
            "timeout": {"seconds": 5}
        }),
    );
    write(
        &root.join("webhooks").join("audit%3a log.json"),
        json!({"name": "webhook-2"}),
    );
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_directory_export_end_to_end() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        write_support_export(dir.path());

        let export = ExportDirectory::new(dir.path())
            .load()
            .expect("Export should load");
        assert_eq!(export.flows.len(), 1);
        assert_eq!(export.flows[0].pages.len(), 2);
        assert_eq!(export.intents.len(), 2);
        assert!(export.intents[1].definition.is_none());

        let report = analyze(export);
        assert_eq!(sorted(&report.unused_pages, "Support"), strings(&["Orphan"]));
        assert_eq!(
            sorted(&report.active_pages, "Support"),
            strings(&["Billing", "End Session", "Support: Start Page"])
        );
        assert!(report.pages_missing_webhook_error_handler().is_empty());
        assert_eq!(report.intents_map["I2"], format!("{}/intents/", AGENT_ID));

        let checker = AgentChecker::new(report);
        assert_eq!(
            checker.active_pages("Support").expect("Flow exists"),
            strings(&["Billing", "Support: Start Page"])
        );
        assert!(checker.dangling_pages("Support").expect("Flow exists").is_empty());
        assert_eq!(checker.unused_intents(), strings(&["I2"]));
    }

    #[test]
    fn test_analyzer_from_path_source() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        write_support_export(dir.path());

        let report = Analyzer::from_source(dir.path())
            .expect("Export should convert")
            .agent_id(AGENT_ID)
            .build()
            .analyze()
            .expect("Analysis should succeed");
        assert_eq!(report.total_pages, 2);
        assert_eq!(report.pages["Support"].len(), 2);
        assert_eq!(report.flows.len(), 1);
    }

    #[test]
    fn test_webhooks_are_registered() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        write_support_export(dir.path());

        let export = ExportDirectory::new(dir.path())
            .load()
            .expect("Export should load");
        assert_eq!(export.webhooks.len(), 2);
        let billing = export
            .webhooks
            .iter()
            .find(|webhook| webhook.file_stem == "billing")
            .expect("Billing webhook is loaded");
        assert_eq!(billing.definition.service_type(), "Generic Web Service");
        assert_eq!(
            billing.definition.timeout.as_ref().and_then(|t| t.seconds),
            Some(5)
        );

        let report = analyze(export);
        assert_eq!(report.total_webhooks, 2);
        assert_eq!(
            report.webhooks_map["billing-lookup"],
            format!("{}/webhooks/webhook-1", AGENT_ID)
        );
        // Without a display name the decoded file stem names the webhook.
        assert_eq!(
            report.webhooks_map["audit: log"],
            format!("{}/webhooks/webhook-2", AGENT_ID)
        );

        let text = ReportFormatter::format_report(&report);
        assert!(text.contains("2 webhook(s)"));
        assert!(text.contains("Webhooks (2): audit: log, billing-lookup"));
    }

    #[test]
    fn test_report_save_and_load() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let report = analyze(create_support_export());

        let path = dir.path().join("report.bin");
        let path = path.to_str().expect("UTF-8 temp path");
        report.save(path).expect("Failed to save report");

        let loaded = AnalysisReport::from_file(path).expect("Failed to load report");
        assert_eq!(loaded.agent_id, report.agent_id);
        assert_eq!(loaded.graph.nodes, report.graph.nodes);
        assert_eq!(loaded.graph.edges, report.graph.edges);
        assert_eq!(loaded.unused_pages, report.unused_pages);
        assert_eq!(loaded.flows_map, report.flows_map);
        assert_eq!(loaded.total_pages, report.total_pages);
        // Raw definitions are not persisted.
        assert!(loaded.flows.is_empty());

        let checker = AgentChecker::new(loaded);
        assert_eq!(checker.unused_intents(), strings(&["I2"]));
    }

    #[test]
    fn test_corrupt_report_is_rejected() {
        let result = AnalysisReport::from_bytes(&[0xff, 0xff, 0xff]);
        assert!(matches!(result, Err(ReportError::Serialization(_))));
    }

    #[test]
    fn test_missing_flows_directory() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let result = ExportDirectory::new(dir.path()).load();
        assert!(matches!(result, Err(ExportError::MissingDirectory(_))));
    }

    #[test]
    fn test_invalid_json_names_the_file() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        write_support_export(dir.path());
        let broken = dir
            .path()
            .join("flows")
            .join("Support")
            .join("pages")
            .join("Broken.json");
        fs::write(&broken, "{ not json").expect("Failed to write file");

        match ExportDirectory::new(dir.path()).load() {
            Err(ExportError::JsonParse { path, .. }) => assert!(path.ends_with("Broken.json")),
            other => panic!("Expected a JSON parse error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_formatted_report() {
        let report = analyze(create_support_export());
        let text = ReportFormatter::format_report(&report);

        assert!(text.contains("Agent 'projects/test/locations/global/agents/agent-1'"));
        assert!(text.contains("Flow: Support"));
        assert!(text.contains("Unused pages (1): Orphan"));
        assert!(text.contains("Dangling pages: none"));
        assert!(text.contains("Active pages (2): Billing, Support: Start Page"));
    }

    #[test]
    fn test_report_renders_as_json() {
        let report = analyze(create_support_export());
        let value = serde_json::to_value(&report).expect("Report should serialize");
        assert_eq!(value["total_flows"], json!(1));
        assert!(value.get("flows").is_none());
    }
}
