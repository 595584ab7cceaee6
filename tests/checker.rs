//! Tests for the report query facade.
mod common;
use common::*;
use shindan::prelude::*;

/// "Chain": Start Page -> A -> B -> C, and the start page also ends the session.
fn create_chain_export() -> AgentExport {
    let flow = FlowExport::new(
        "Chain",
        start_page(
            "flow-chain",
            vec![
                intent_route("I1", Some("A")),
                condition_route("$session.params.done = true", Some("End Session")),
            ],
        ),
    )
    .with_page("A", page("page-a", vec![intent_route("I2", Some("B"))]))
    .with_page("B", page("page-b", vec![intent_route("I1", Some("C"))]))
    .with_page("C", page("page-c", vec![]));
    AgentExport {
        flows: vec![flow],
        intents: vec![intent("I1", "intent-1"), intent("I2", "intent-2")],
        webhooks: vec![],
    }
}

fn create_two_flow_export() -> AgentExport {
    let billing = FlowExport::new(
        "Billing",
        start_page("flow-billing", vec![intent_route("I1", Some("Invoice"))]),
    )
    .with_page("Invoice", page("page-invoice", vec![]));
    AgentExport {
        flows: vec![create_support_flow(), billing],
        intents: vec![
            intent("I1", "intent-1"),
            intent("I2", "intent-2"),
            intent("I3", "intent-3"),
        ],
        webhooks: vec![],
    }
}

#[test]
fn test_reachable_pages_depth_bounds() {
    let checker = AgentChecker::new(analyze(create_chain_export()));

    let depth_zero = checker
        .get_reachable_pages("Chain", "Start Page", Some(0), true)
        .expect("Flow exists");
    assert_eq!(depth_zero, strings(&["Chain: Start Page"]));

    let depth_one = checker
        .get_reachable_pages("Chain", "Start Page", Some(1), true)
        .expect("Flow exists");
    assert_eq!(depth_one, strings(&["A", "Chain: Start Page"]));

    let depth_two = checker
        .get_reachable_pages("Chain", "Start Page", Some(2), true)
        .expect("Flow exists");
    assert_eq!(depth_two, strings(&["A", "B", "Chain: Start Page"]));

    let unbounded = checker
        .get_reachable_pages("Chain", "Start Page", None, true)
        .expect("Flow exists");
    assert_eq!(unbounded, strings(&["A", "B", "C", "Chain: Start Page"]));
}

#[test]
fn test_special_pages_are_skipped_not_fatal() {
    let checker = AgentChecker::new(analyze(create_chain_export()));

    let filtered = checker
        .reachable_pages("Chain")
        .max_depth(None)
        .run()
        .expect("Flow exists");
    assert!(!filtered.contains(&"End Session".to_string()));
    assert!(filtered.contains(&"C".to_string()));

    let unfiltered = checker
        .reachable_pages("Chain")
        .max_depth(Some(1))
        .filter_special_pages(false)
        .run()
        .expect("Flow exists");
    assert_eq!(
        unfiltered,
        strings(&["A", "Chain: Start Page", "End Session"])
    );
}

#[test]
fn test_reachable_pages_from_named_page() {
    let checker = AgentChecker::new(analyze(create_chain_export()));
    let pages = checker
        .reachable_pages("Chain")
        .from_page("B")
        .max_depth(Some(5))
        .run()
        .expect("Flow exists");
    assert_eq!(pages, strings(&["B", "C"]));
}

#[test]
fn test_unknown_flow_is_an_error() {
    let checker = AgentChecker::new(analyze(create_chain_export()));

    assert!(matches!(
        checker.active_pages("Nope"),
        Err(AnalysisError::UnknownFlow(ref flow)) if flow == "Nope"
    ));
    assert!(checker.reachable_pages("Nope").run().is_err());
    assert!(checker.reachable_intents("Nope").is_err());
}

#[test]
fn test_page_lists_hide_non_pages() {
    let checker = AgentChecker::new(analyze(create_chain_export()));

    let active = checker.active_pages("Chain").expect("Flow exists");
    assert_eq!(active, strings(&["A", "B", "C"]));
    assert_eq!(checker.dangling_pages("Chain").expect("Flow exists"), strings(&["C"]));
    assert!(checker.unused_pages("Chain").expect("Flow exists").is_empty());
    assert!(checker.unreachable_pages("Chain").expect("Flow exists").is_empty());
}

#[test]
fn test_page_tables_span_flows() {
    let checker = AgentChecker::new(analyze(create_two_flow_export()));

    let unused = checker.unused_pages_table();
    assert_eq!(
        unused,
        vec![PageRow {
            flow_name: "Support".to_string(),
            page_name: "Orphan".to_string(),
        }]
    );

    let reachable = checker.reachable_pages_table();
    let names: Vec<(&str, &str)> = reachable
        .iter()
        .map(|row| (row.flow_name.as_str(), row.page_name.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![
            ("Billing", "Invoice"),
            ("Support", "Billing"),
            ("Support", "Support: Start Page"),
        ]
    );
    assert!(checker.unreachable_pages_table().is_empty());
}

#[test]
fn test_intent_tables() {
    let checker = AgentChecker::new(analyze(create_two_flow_export()));

    assert_eq!(
        checker.active_intents_table(),
        vec![
            IntentRow {
                intent: "I1".to_string(),
                flow: "Billing".to_string(),
            },
            IntentRow {
                intent: "I1".to_string(),
                flow: "Support".to_string(),
            },
        ]
    );
    assert_eq!(
        checker.reachable_intents("Support").expect("Flow exists"),
        strings(&["I1"])
    );
    assert_eq!(checker.unused_intents(), strings(&["I2", "I3"]));
}

#[test]
fn test_checker_hands_back_report() {
    let checker = AgentChecker::new(analyze(create_chain_export()));
    assert_eq!(checker.report().total_flows, 1);

    let report = checker.into_report();
    assert_eq!(report.agent_id, AGENT_ID);
}

#[test]
fn test_checker_follows_report_special_pages() {
    let report = Analyzer::builder(create_chain_export())
        .agent_id(AGENT_ID)
        .special_pages(["C", "End Session"])
        .build()
        .analyze()
        .expect("Analysis should succeed");
    assert_eq!(report.special_pages, strings(&["C", "End Session"]));

    let checker = AgentChecker::new(report);
    assert_eq!(
        checker.active_pages("Chain").expect("Flow exists"),
        strings(&["A", "B"])
    );
    let reachable = checker
        .reachable_pages("Chain")
        .max_depth(None)
        .run()
        .expect("Flow exists");
    assert_eq!(reachable, strings(&["A", "B", "Chain: Start Page"]));
}
