//! # Shindan - Structural Analysis for Conversational Agent Exports
//!
//! **Shindan** reads the unzipped export of a flow-based conversational agent
//! (flows, pages, transition route groups and intents stored as JSON) and builds a
//! directed graph of every conversational state. From that graph it reports pages
//! that are never used, pages that are dead ends, pages whose reachability and use
//! disagree, and intents that no route references.
//!
//! ## Core Workflow
//!
//! The analyzer is storage-agnostic. It operates on a canonical in-memory model of
//! an export, the [`AgentExport`](export::AgentExport). The primary workflow is:
//!
//! 1.  **Load the export**: Read an unzipped export with [`ExportDirectory`](export::ExportDirectory), or implement `IntoAgentExport` for your own storage.
//! 2.  **Analyze**: Use `Analyzer::builder` to configure the agent ID, the special page names and strictness, then call `analyze`.
//! 3.  **Query**: Wrap the resulting `AnalysisReport` in an `AgentChecker` to list pages and intents per flow or across the agent.
//! 4.  **Persist**: Save the report with bincode and reload it later without re-reading the export.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shindan::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let export = ExportDirectory::new("exports/my-agent").load()?;
//!
//!     let report = Analyzer::builder(export)
//!         .agent_id("projects/demo/locations/global/agents/1234")
//!         .build()
//!         .analyze()?;
//!     println!("{}", ReportFormatter::format_report(&report));
//!
//!     let checker = AgentChecker::new(report);
//!     let nearby = checker
//!         .reachable_pages("Default Start Flow")
//!         .max_depth(Some(2))
//!         .run()?;
//!     println!("Within two hops of the start page: {:?}", nearby);
//!
//!     for row in checker.unused_pages_table() {
//!         println!("unused: {} / {}", row.flow_name, row.page_name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod checker;
pub mod error;
pub mod export;
pub mod format;
pub mod graph;
pub mod prelude;
pub mod report;
