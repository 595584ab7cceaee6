use super::types::{Flow, SPECIAL_PAGES};
use crate::error::AnalysisError;
use crate::graph::Graph;
use ahash::{AHashMap, AHashSet};
use tracing::warn;

/// Runs the three graph queries over a fully loaded flow.
///
/// The passes share state and must run in a fixed order: unused pages first,
/// then dangling pages (which also produces the active pages), then
/// unreachable pages, which consumes the active pages.
#[derive(Debug, Clone)]
pub struct FlowAnalyzer {
    special_pages: Vec<String>,
    strict: bool,
}

impl Default for FlowAnalyzer {
    fn default() -> Self {
        Self::new(SPECIAL_PAGES.iter().map(|p| p.to_string()).collect(), true)
    }
}

impl FlowAnalyzer {
    pub fn new(special_pages: Vec<String>, strict: bool) -> Self {
        Self {
            special_pages,
            strict,
        }
    }

    pub fn special_pages(&self) -> &[String] {
        &self.special_pages
    }

    pub fn is_special_page(&self, page: &str) -> bool {
        self.special_pages.iter().any(|special| special == page)
    }

    /// Runs all passes in order.
    ///
    /// Fails in strict mode when the flow has no usable root: the start page node
    /// is missing, or the flow declares pages while its start page routes nowhere.
    pub fn analyze(&self, flow: &mut Flow) -> Result<(), AnalysisError> {
        let start_page = flow.start_page_name();
        let malformed = self.has_no_root(flow, &start_page);
        if malformed {
            if self.strict {
                return Err(AnalysisError::MalformedAgentExport {
                    flow: flow.display_name.clone(),
                    start_page,
                });
            }
            warn!(
                flow = %flow.display_name,
                start_page = %start_page,
                "Start page routes nowhere, no page will be reported as active"
            );
        }

        self.find_unused_pages(flow);
        // Without a root there is nothing to walk; active and dangling stay empty.
        if !malformed {
            self.find_dangling_pages(flow);
        }
        self.find_unreachable_pages(flow);
        Ok(())
    }

    fn has_no_root(&self, flow: &Flow, start_page: &str) -> bool {
        if !flow.graph.nodes.contains(start_page) {
            return true;
        }
        let declares_pages = flow
            .all_pages
            .iter()
            .any(|page| !self.is_special_page(page));
        declares_pages && !flow.graph.has_outgoing_edges(start_page)
    }

    /// Declared pages that nothing routes to.
    ///
    /// A page that is never targeted but has routes of its own is the root of an
    /// unreachable subgraph rather than unused, so it goes to `unreachable_pages`.
    pub fn find_unused_pages(&self, flow: &mut Flow) {
        for page in &self.special_pages {
            flow.all_pages.remove(page);
        }

        let prelim_unused: Vec<String> = flow
            .all_pages
            .difference(&flow.graph.used_nodes)
            .cloned()
            .collect();

        let mut unused = AHashSet::new();
        for page in prelim_unused {
            if flow.graph.has_outgoing_edges(&page) {
                flow.unreachable_pages.insert(page);
            } else {
                unused.insert(page);
            }
        }
        flow.unused_pages = unused;
    }

    /// Depth-first walk collecting every visited page and every dead end.
    ///
    /// A page is marked visited before its own children are explored, which is
    /// what lets cycles terminate.
    pub fn recurse_edges(
        edges: &AHashMap<String, AHashSet<String>>,
        page: &str,
        dangling: &mut AHashSet<String>,
        visited: &mut AHashSet<String>,
    ) {
        match edges.get(page) {
            Some(children) => {
                for child in children {
                    if visited.insert(child.clone()) {
                        Self::recurse_edges(edges, child, dangling, visited);
                    }
                }
            }
            None => {
                dangling.insert(page.to_string());
            }
        }
    }

    /// Pages reachable from the start page that have no outgoing edge.
    /// Fills `active_pages` as a byproduct.
    pub fn find_dangling_pages(&self, flow: &mut Flow) {
        let start_page = flow.start_page_name();
        let mut dangling = std::mem::take(&mut flow.dangling_pages);
        let mut visited = std::mem::take(&mut flow.active_pages);

        Self::recurse_edges(&flow.graph.edges, &start_page, &mut dangling, &mut visited);

        for page in &self.special_pages {
            dangling.remove(page);
        }
        flow.dangling_pages = remove_flow_pages_from_set(&flow.graph, dangling);
        flow.active_pages = visited;
    }

    /// Pages whose reachability from the start page and use as a route target disagree.
    pub fn find_unreachable_pages(&self, flow: &mut Flow) {
        let disagreement: AHashSet<String> = flow
            .active_pages
            .symmetric_difference(&flow.graph.used_nodes)
            .cloned()
            .collect();
        let filtered = remove_flow_pages_from_set(&flow.graph, disagreement);
        flow.unreachable_pages.extend(filtered);
    }
}

/// Drops flow-transition nodes. They are not pages and never belong in a page report.
pub fn remove_flow_pages_from_set(graph: &Graph, pages: AHashSet<String>) -> AHashSet<String> {
    pages
        .into_iter()
        .filter(|page| !graph.is_flow_transition(page))
        .collect()
}
