use thiserror::Error;

/// Errors that can occur while reading an agent export from storage.
#[derive(Error, Debug, Clone)]
pub enum ExportError {
    #[error("Failed to read '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse export JSON in '{path}': {message}")]
    JsonParse { path: String, message: String },

    #[error("Path '{path}' does not match the export layout, expected {expected}")]
    InvalidPath { path: String, expected: String },

    #[error("Export directory '{0}' has no 'flows' directory")]
    MissingDirectory(String),
}

/// Errors that can occur during the graph analysis phase.
#[derive(Error, Debug, Clone)]
pub enum AnalysisError {
    #[error(
        "Flow '{flow}' has no usable start page '{start_page}', reachability cannot be computed"
    )]
    MalformedAgentExport { flow: String, start_page: String },

    #[error("Flow '{0}' was not found in the analyzed agent")]
    UnknownFlow(String),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Errors that can occur when persisting or restoring an analysis report.
#[derive(Error, Debug, Clone)]
pub enum ReportError {
    #[error("Report serialization failed: {0}")]
    Serialization(String),

    #[error("Report I/O failed for '{path}': {message}")]
    Io { path: String, message: String },
}

/// Errors that can occur when converting a custom storage format into a shindan `AgentExport`.
#[derive(Error, Debug, Clone)]
pub enum ConversionError {
    #[error("Invalid custom data: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Export(#[from] ExportError),
}
