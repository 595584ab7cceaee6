use super::conversion::{
    AgentExport, FlowExport, IntentExport, IntoAgentExport, PageExport, WebhookExport,
};
use super::definition::{FlowDefinition, IntentDefinition, RouteGroupDefinition};
use crate::error::{ConversionError, ExportError};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const FLOWS_DIR: &str = "flows";
const PAGES_DIR: &str = "pages";
const ROUTE_GROUPS_DIR: &str = "transitionRouteGroups";
const INTENTS_DIR: &str = "intents";
const WEBHOOKS_DIR: &str = "webhooks";

/// An unzipped agent export on the local filesystem.
///
/// Expected layout:
///
/// ```text
/// <root>/flows/<flow>/<flow>.json
/// <root>/flows/<flow>/pages/<page>.json
/// <root>/flows/<flow>/transitionRouteGroups/<group>.json
/// <root>/intents/<intent>/<intent>.json
/// <root>/webhooks/<webhook>.json
/// ```
///
/// Directory listings are sorted by name so repeated loads process flows and
/// pages in the same order.
#[derive(Debug, Clone)]
pub struct ExportDirectory {
    root: PathBuf,
}

impl ExportDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads every flow, intent and webhook under the root.
    pub fn load(&self) -> Result<AgentExport, ExportError> {
        let flows_root = self.root.join(FLOWS_DIR);
        if !flows_root.is_dir() {
            return Err(ExportError::MissingDirectory(display(&self.root)));
        }

        let flows = list_dir(&flows_root)?
            .into_iter()
            .filter(|path| path.is_dir())
            .map(|path| self.load_flow(&path))
            .collect::<Result<Vec<_>, _>>()?;

        let intents_root = self.root.join(INTENTS_DIR);
        let intents = if intents_root.is_dir() {
            list_dir(&intents_root)?
                .into_iter()
                .filter(|path| path.is_dir())
                .map(|path| self.load_intent(&path))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            Vec::new()
        };

        let webhooks_root = self.root.join(WEBHOOKS_DIR);
        let mut webhooks = Vec::new();
        if webhooks_root.is_dir() {
            for path in json_files(&webhooks_root)? {
                webhooks.push(WebhookExport {
                    file_stem: file_stem(&path)?,
                    definition: read_json(&path)?,
                });
            }
        }

        info!(
            root = %self.root.display(),
            flows = flows.len(),
            intents = intents.len(),
            webhooks = webhooks.len(),
            "Loaded agent export"
        );
        Ok(AgentExport {
            flows,
            intents,
            webhooks,
        })
    }

    fn load_flow(&self, flow_dir: &Path) -> Result<FlowExport, ExportError> {
        let dir_name = file_name(flow_dir)?;
        let start_page: FlowDefinition =
            read_json(&flow_dir.join(format!("{}.json", dir_name)))?;

        let mut flow = FlowExport::new(dir_name, start_page);

        let pages_dir = flow_dir.join(PAGES_DIR);
        if pages_dir.is_dir() {
            for path in json_files(&pages_dir)? {
                flow.pages.push(PageExport {
                    file_stem: file_stem(&path)?,
                    definition: read_json(&path)?,
                });
            }
        }

        let route_groups_dir = flow_dir.join(ROUTE_GROUPS_DIR);
        if route_groups_dir.is_dir() {
            for path in json_files(&route_groups_dir)? {
                let group: RouteGroupDefinition = read_json(&path)?;
                flow.route_groups.push(group);
            }
        }

        debug!(
            flow = %flow.dir_name,
            pages = flow.pages.len(),
            route_groups = flow.route_groups.len(),
            "Loaded flow directory"
        );
        Ok(flow)
    }

    fn load_intent(&self, intent_dir: &Path) -> Result<IntentExport, ExportError> {
        let dir_name = file_name(intent_dir)?;
        let metadata = intent_dir.join(format!("{}.json", dir_name));

        // Missing metadata is tolerated; the intent still counts as declared.
        let definition = if metadata.is_file() {
            Some(read_json::<IntentDefinition>(&metadata)?)
        } else {
            None
        };

        Ok(IntentExport {
            dir_name,
            definition,
        })
    }
}

impl IntoAgentExport for ExportDirectory {
    fn into_export(self) -> Result<AgentExport, ConversionError> {
        Ok(self.load()?)
    }
}

impl IntoAgentExport for &Path {
    fn into_export(self) -> Result<AgentExport, ConversionError> {
        ExportDirectory::new(self).into_export()
    }
}

/// Reads and deserializes a single JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ExportError> {
    let content = fs::read_to_string(path).map_err(|e| ExportError::Io {
        path: display(path),
        message: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| ExportError::JsonParse {
        path: display(path),
        message: e.to_string(),
    })
}

fn list_dir(dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
    let io_error = |e: std::io::Error| ExportError::Io {
        path: display(dir),
        message: e.to_string(),
    };
    let mut paths = fs::read_dir(dir)
        .map_err(io_error)?
        .map(|entry| entry.map(|e| e.path()).map_err(io_error))
        .collect::<Result<Vec<_>, _>>()?;
    paths.sort();
    Ok(paths)
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
    Ok(list_dir(dir)?
        .into_iter()
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect())
}

fn file_name(path: &Path) -> Result<String, ExportError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| ExportError::InvalidPath {
            path: display(path),
            expected: "a UTF-8 directory name".to_string(),
        })
}

fn file_stem(path: &Path) -> Result<String, ExportError> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| ExportError::InvalidPath {
            path: display(path),
            expected: "a UTF-8 '<name>.json' file".to_string(),
        })
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
