use crate::analyzer::{START_PAGE, start_page_name};
use crate::error::AnalysisError;
use crate::graph::NodeKind;
use crate::report::AnalysisReport;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::warn;

/// A `(flow, page)` row of a page report.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PageRow {
    pub flow_name: String,
    pub page_name: String,
}

/// An `(intent, flow)` row. An intent used in N flows yields N rows.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct IntentRow {
    pub intent: String,
    pub flow: String,
}

/// Query facade over a finished [`AnalysisReport`].
///
/// All list results are sorted, so they can be compared and printed directly.
pub struct AgentChecker {
    report: AnalysisReport,
    special_pages: Vec<String>,
}

impl AgentChecker {
    /// Uses the special pages the report was analyzed with.
    pub fn new(report: AnalysisReport) -> Self {
        Self {
            special_pages: report.special_pages.clone(),
            report,
        }
    }

    pub fn with_special_pages<I, S>(mut self, pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.special_pages = pages.into_iter().map(Into::into).collect();
        self
    }

    pub fn report(&self) -> &AnalysisReport {
        &self.report
    }

    pub fn into_report(self) -> AnalysisReport {
        self.report
    }

    fn is_special_page(&self, page: &str) -> bool {
        self.special_pages.iter().any(|special| special == page)
    }

    /// True for real pages: not special, not a flow transition, not a route group.
    fn is_reportable_page(&self, page: &str) -> bool {
        !self.is_special_page(page) && self.report.graph.kind(page) == NodeKind::Page
    }

    fn ensure_flow(&self, flow: &str) -> Result<(), AnalysisError> {
        if self.report.flows_map.contains_key(flow) {
            Ok(())
        } else {
            warn!(flow, "Query against a flow that was not analyzed");
            Err(AnalysisError::UnknownFlow(flow.to_string()))
        }
    }

    /// Starts a bounded reachability query over the agent-wide graph.
    pub fn reachable_pages(&self, flow: &str) -> ReachabilityQuery<'_> {
        ReachabilityQuery {
            checker: self,
            flow: flow.to_string(),
            from_page: START_PAGE.to_string(),
            max_depth: Some(1),
            filter_special_pages: true,
        }
    }

    /// Pages reachable from `page` in at most `max_depth` transitions (`None` is unbounded).
    ///
    /// The origin is always part of the result. `"Start Page"` is resolved to the
    /// flow's own start page node. With `filter_special_pages`, special pages are
    /// neither recorded nor expanded, while their siblings still are.
    pub fn get_reachable_pages(
        &self,
        flow: &str,
        page: &str,
        max_depth: Option<usize>,
        filter_special_pages: bool,
    ) -> Result<Vec<String>, AnalysisError> {
        self.ensure_flow(flow)?;
        let origin = if page == START_PAGE {
            start_page_name(flow)
        } else {
            page.to_string()
        };

        let edges = &self.report.graph.edges;
        let mut visited = AHashSet::new();
        visited.insert(origin.clone());
        let mut queue = VecDeque::from([(origin, 0usize)]);

        while let Some((current, depth)) = queue.pop_front() {
            if max_depth.is_some_and(|max| depth >= max) {
                continue;
            }
            let Some(children) = edges.get(&current) else {
                continue;
            };
            for child in children {
                if filter_special_pages && self.is_special_page(child) {
                    continue;
                }
                if visited.insert(child.clone()) {
                    queue.push_back((child.clone(), depth + 1));
                }
            }
        }

        Ok(visited.into_iter().sorted().collect())
    }

    fn flow_pages(
        &self,
        map: &AHashMap<String, AHashSet<String>>,
        flow: &str,
    ) -> Result<Vec<String>, AnalysisError> {
        self.ensure_flow(flow)?;
        Ok(map
            .get(flow)
            .into_iter()
            .flatten()
            .filter(|page| self.is_reportable_page(page))
            .cloned()
            .sorted()
            .collect())
    }

    fn page_table(&self, map: &AHashMap<String, AHashSet<String>>) -> Vec<PageRow> {
        map.iter()
            .flat_map(|(flow, pages)| {
                pages
                    .iter()
                    .filter(|page| self.is_reportable_page(page))
                    .map(move |page| PageRow {
                        flow_name: flow.clone(),
                        page_name: page.clone(),
                    })
            })
            .sorted()
            .collect()
    }

    /// Pages reachable from the flow's start page.
    pub fn active_pages(&self, flow: &str) -> Result<Vec<String>, AnalysisError> {
        self.flow_pages(&self.report.active_pages, flow)
    }

    pub fn dangling_pages(&self, flow: &str) -> Result<Vec<String>, AnalysisError> {
        self.flow_pages(&self.report.dangling_pages, flow)
    }

    pub fn unreachable_pages(&self, flow: &str) -> Result<Vec<String>, AnalysisError> {
        self.flow_pages(&self.report.unreachable_pages, flow)
    }

    pub fn unused_pages(&self, flow: &str) -> Result<Vec<String>, AnalysisError> {
        self.flow_pages(&self.report.unused_pages, flow)
    }

    pub fn reachable_pages_table(&self) -> Vec<PageRow> {
        self.page_table(&self.report.active_pages)
    }

    pub fn unreachable_pages_table(&self) -> Vec<PageRow> {
        self.page_table(&self.report.unreachable_pages)
    }

    pub fn unused_pages_table(&self) -> Vec<PageRow> {
        self.page_table(&self.report.unused_pages)
    }

    /// Intents referenced by any route or handler in `flow`.
    pub fn reachable_intents(&self, flow: &str) -> Result<Vec<String>, AnalysisError> {
        self.ensure_flow(flow)?;
        Ok(self
            .report
            .active_intents
            .get(flow)
            .into_iter()
            .flatten()
            .map(|(intent, _)| intent.clone())
            .unique()
            .sorted()
            .collect())
    }

    /// One row per `(intent, flow)` pair with at least one reference.
    pub fn active_intents_table(&self) -> Vec<IntentRow> {
        self.report
            .active_intents
            .iter()
            .flat_map(|(flow, pairs)| {
                pairs.iter().map(move |(intent, _)| IntentRow {
                    intent: intent.clone(),
                    flow: flow.clone(),
                })
            })
            .unique()
            .sorted()
            .collect()
    }

    /// Declared intents that no route or handler in any flow references.
    pub fn unused_intents(&self) -> Vec<String> {
        let active: AHashSet<String> = self
            .active_intents_table()
            .into_iter()
            .map(|row| row.intent)
            .collect();
        self.report
            .intents_map
            .keys()
            .filter(|intent| !active.contains(*intent))
            .cloned()
            .sorted()
            .collect()
    }
}

/// Builder for [`AgentChecker::get_reachable_pages`].
pub struct ReachabilityQuery<'c> {
    checker: &'c AgentChecker,
    flow: String,
    from_page: String,
    max_depth: Option<usize>,
    filter_special_pages: bool,
}

impl ReachabilityQuery<'_> {
    pub fn from_page(mut self, page: impl Into<String>) -> Self {
        self.from_page = page.into();
        self
    }

    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn filter_special_pages(mut self, filter: bool) -> Self {
        self.filter_special_pages = filter;
        self
    }

    pub fn run(self) -> Result<Vec<String>, AnalysisError> {
        self.checker.get_reachable_pages(
            &self.flow,
            &self.from_page,
            self.max_depth,
            self.filter_special_pages,
        )
    }
}
