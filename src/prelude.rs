//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the shindan crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use shindan::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let export = ExportDirectory::new("path/to/agent").load()?;
//! let report = Analyzer::builder(export).agent_id("projects/p/locations/global/agents/a").build().analyze()?;
//!
//! let checker = AgentChecker::new(report);
//! println!("Unused intents: {:?}", checker.unused_intents());
//! # Ok(())
//! # }
//! ```

// Analysis and queries
pub use crate::analyzer::{Analyzer, AnalyzerBuilder, FlowAnalyzer};
pub use crate::checker::{AgentChecker, IntentRow, PageRow, ReachabilityQuery};

// Export model
pub use crate::export::{
    AgentExport, ExportDirectory, FlowDefinition, FlowExport, IntentExport, IntoAgentExport,
    PageDefinition, PageExport, RouteDefinition, RouteGroupDefinition, WebhookDefinition,
    WebhookExport,
};

// Graph and report
pub use crate::graph::{Graph, NodeKind};
pub use crate::report::AnalysisReport;

// Error types
pub use crate::error::{AnalysisError, ConversionError, ExportError, ReportError};

// Report formatting
pub use crate::format::ReportFormatter;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
